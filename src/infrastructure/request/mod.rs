//! Approval ledger infrastructure

mod in_memory_repository;

pub use in_memory_repository::InMemoryApprovalLedger;
