//! Organization directory infrastructure

mod in_memory_directory;

pub use in_memory_directory::InMemoryDirectory;
