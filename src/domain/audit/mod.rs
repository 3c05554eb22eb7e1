//! Audit events
//!
//! The engine emits one event per state transition. Delivery and formatting
//! belong to the external audit/notification collaborator behind
//! [`AuditSink`].

mod event;

pub use event::{AuditEvent, AuditSink};
