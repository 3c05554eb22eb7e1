//! Side-effect handler implementations

mod provider;

pub use provider::{DeactivateProviderHandler, InMemoryProviderRegistry};
