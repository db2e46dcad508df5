//! Persistence layer
//!
//! One independent collection per entity type. References between records
//! are plain ids, never joins.

mod database;
mod file_store;
mod repository;

pub use database::Database;
pub use file_store::FileCollection;
pub use repository::{Filter, Record, Repository};
