//! Repository interface shared by every document collection

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::Result;

/// A document stored in its own collection, keyed by a generated id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, also used as the file stem on disk.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    /// Bump the modification timestamp.
    fn touch(&mut self);
}

/// Predicate used by `find` and `update_many`.
pub type Filter<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

/// Repository interface for document CRUD operations
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Insert a new record
    async fn insert(&self, record: T) -> Result<T>;

    /// Get a record by ID
    async fn get(&self, id: Uuid) -> Result<Option<T>>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<T>>;

    /// Records matching `filter`, newest first
    async fn find(&self, filter: Filter<'_, T>) -> Result<Vec<T>>;

    /// Replace an existing record
    async fn update(&self, record: T) -> Result<T>;

    /// Apply `apply` to every record matching `filter`, returning how many changed
    async fn update_many(
        &self,
        filter: Filter<'_, T>,
        apply: &(dyn for<'r> Fn(&'r mut T) + Send + Sync),
    ) -> Result<usize>;

    /// Delete a record by ID
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
