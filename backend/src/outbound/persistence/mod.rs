//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; the rest of the crate sees only the
//! [`DieselUserStore`] port implementation and the pool.
//!
//! # Example
//!
//! ```ignore
//! use user_directory::outbound::persistence::{DbPool, DieselUserStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let store = DieselUserStore::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_user_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_store::DieselUserStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
