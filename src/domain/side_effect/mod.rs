//! Terminal side effects
//!
//! Each request type may declare at most one terminal action executed when
//! its approval chain completes (e.g. termination deactivates the referenced
//! provider). Handlers are injected collaborators; the dispatcher only
//! guarantees a single invocation after full approval has been recorded.

mod dispatcher;

pub use dispatcher::{ProviderRegistry, SideEffectDispatcher, SideEffectHandler};
