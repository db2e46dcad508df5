//! File-based collection storage
//!
//! Each collection is a JSON array in its own file, mirrored by an
//! in-memory cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{Filter, Record, Repository};
use crate::{Error, Result};

/// File-based document collection using JSON
pub struct FileCollection<T: Record> {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of records
    cache: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> FileCollection<T> {
    /// Open the collection stored at `path`.
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                let records: Vec<T> = serde_json::from_str(&content)?;
                records.into_iter().map(|r| (r.id(), r)).collect()
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(
            collection = T::COLLECTION,
            records = cache.len(),
            "collection loaded"
        );

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Open `<dir>/<collection>.json`.
    pub async fn open_in(dir: &Path) -> Result<Self> {
        Self::open(dir.join(format!("{}.json", T::COLLECTION))).await
    }

    /// Write the cache to disk. Called with the write lock held so
    /// concurrent writers cannot interleave file contents.
    async fn persist(&self, cache: &HashMap<Uuid, T>) -> Result<()> {
        let mut records: Vec<&T> = cache.values().collect();
        records.sort_by_key(|r| r.created_at());
        let content = serde_json::to_string_pretty(&records)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

fn newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

#[async_trait]
impl<T: Record> Repository<T> for FileCollection<T> {
    async fn insert(&self, record: T) -> Result<T> {
        let mut cache = self.cache.write().await;
        if cache.contains_key(&record.id()) {
            return Err(Error::Storage(format!(
                "{} record {} already exists",
                T::COLLECTION,
                record.id()
            )));
        }
        cache.insert(record.id(), record.clone());
        self.persist(&cache).await?;
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>> {
        let cache = self.cache.read().await;
        Ok(cache.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>> {
        let cache = self.cache.read().await;
        let mut records: Vec<T> = cache.values().cloned().collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn find(&self, filter: Filter<'_, T>) -> Result<Vec<T>> {
        let cache = self.cache.read().await;
        let mut records: Vec<T> = cache.values().filter(|r| filter(r)).cloned().collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn update(&self, mut record: T) -> Result<T> {
        record.touch();
        let mut cache = self.cache.write().await;
        if !cache.contains_key(&record.id()) {
            return Err(Error::NotFound(format!("{} {}", T::COLLECTION, record.id())));
        }
        cache.insert(record.id(), record.clone());
        self.persist(&cache).await?;
        Ok(record)
    }

    async fn update_many(
        &self,
        filter: Filter<'_, T>,
        apply: &(dyn for<'r> Fn(&'r mut T) + Send + Sync),
    ) -> Result<usize> {
        let mut cache = self.cache.write().await;
        let mut changed = 0;
        for record in cache.values_mut().filter(|r| filter(r)) {
            apply(record);
            record.touch();
            changed += 1;
        }
        if changed > 0 {
            self.persist(&cache).await?;
        }
        Ok(changed)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut cache = self.cache.write().await;
        let removed = cache.remove(&id).is_some();
        if removed {
            self.persist(&cache).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Memo {
        id: Uuid,
        text: String,
        done: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Memo {
        fn new(text: &str) -> Self {
            let now = Utc::now();
            Self {
                id: Uuid::new_v4(),
                text: text.to_string(),
                done: false,
                created_at: now,
                updated_at: now,
            }
        }
    }

    impl Record for Memo {
        const COLLECTION: &'static str = "memos";

        fn id(&self) -> Uuid {
            self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }

        fn touch(&mut self) {
            self.updated_at = Utc::now();
        }
    }

    async fn create_test_store() -> (FileCollection<Memo>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCollection::open_in(temp_dir.path()).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (store, _temp) = create_test_store().await;

        let memo = Memo::new("call back");
        let id = memo.id;
        store.insert(memo).await.unwrap();

        let retrieved = store.get(id).await.unwrap();
        assert_eq!(retrieved.unwrap().text, "call back");
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (store, _temp) = create_test_store().await;

        let mut older = Memo::new("older");
        older.created_at = Utc::now() - Duration::minutes(5);
        store.insert(older).await.unwrap();
        store.insert(Memo::new("newer")).await.unwrap();

        let memos = store.list().await.unwrap();
        assert_eq!(memos[0].text, "newer");
        assert_eq!(memos[1].text, "older");
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let (store, _temp) = create_test_store().await;

        let result = store.update(Memo::new("ghost")).await;
        match result.unwrap_err() {
            Error::NotFound(_) => {}
            e => panic!("Expected NotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_many_counts_changes() {
        let (store, _temp) = create_test_store().await;

        store.insert(Memo::new("a")).await.unwrap();
        store.insert(Memo::new("b")).await.unwrap();

        let changed = store
            .update_many(&|m: &Memo| !m.done, &|m: &mut Memo| m.done = true)
            .await
            .unwrap();
        assert_eq!(changed, 2);

        let changed_again = store
            .update_many(&|m: &Memo| !m.done, &|m: &mut Memo| m.done = true)
            .await
            .unwrap();
        assert_eq!(changed_again, 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _temp) = create_test_store().await;

        let memo = Memo::new("to delete");
        let id = memo.id;
        store.insert(memo).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let id;

        {
            let store: FileCollection<Memo> = FileCollection::open_in(temp_dir.path()).await.unwrap();
            let memo = Memo::new("survives reload");
            id = memo.id;
            store.insert(memo).await.unwrap();
        }

        {
            let store: FileCollection<Memo> = FileCollection::open_in(temp_dir.path()).await.unwrap();
            let memo = store.get(id).await.unwrap().unwrap();
            assert_eq!(memo.text, "survives reload");
        }
    }

    #[tokio::test]
    async fn test_duplicate_insert_error() {
        let (store, _temp) = create_test_store().await;

        let memo = Memo::new("once");
        store.insert(memo.clone()).await.unwrap();

        match store.insert(memo).await.unwrap_err() {
            Error::Storage(msg) => assert!(msg.contains("already exists")),
            e => panic!("Expected Storage error, got: {:?}", e),
        }
    }
}
