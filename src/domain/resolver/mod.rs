//! Approver resolution
//!
//! Maps a flow stage plus a request's organizational context to the set of
//! identities authorized to act. Resolution is a pure function of the stage
//! and the directory's current state, re-invoked on every authorization
//! check; results are never cached beyond a single call.

mod resolver;

pub use resolver::{ApproverResolver, RequestContext, ResolvedApprovers};
