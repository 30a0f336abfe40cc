//! Document store implementations for contributors, gallery, and history.

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::InMemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
