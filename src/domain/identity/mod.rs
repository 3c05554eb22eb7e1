//! Acting identities supplied by the session collaborator

mod entity;

pub use entity::{validate_identity, Actor, Identity, MAX_IDENTITY_LENGTH};
