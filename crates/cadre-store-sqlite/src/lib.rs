//! SQLite backend for the cadre registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every operation reports through the
//! core error taxonomy; SQLite failures are classified at the boundary in
//! [`error`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
