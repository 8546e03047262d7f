//! Core types and trait definitions for the cadre research-programme
//! registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod activity;
pub mod catalog;
pub mod course;
pub mod error;
pub mod letter;
pub mod link;
pub mod patch;
pub mod person;
pub mod project;
pub mod query;
pub mod store;
pub mod temporal;
pub mod term;

pub use error::{EntityKind, Error, Result};
pub use patch::Patch;
