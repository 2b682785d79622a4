//! In-process adapters for tests and database-less runs.

mod in_memory_user_store;

pub use in_memory_user_store::InMemoryUserStore;
