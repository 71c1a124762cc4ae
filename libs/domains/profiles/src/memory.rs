use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProfileError, ProfileResult};
use crate::models::ProfileRecord;
use crate::store::{ProfilePage, ProfileStore, ProfileWriter};

/// In-memory profile store (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProfileStore {
    records: Arc<RwLock<BTreeMap<Uuid, ProfileRecord>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ProfileRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: Uuid) -> ProfileResult<Option<ProfileRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_page(&self, after: Option<Uuid>, limit: usize) -> ProfileResult<ProfilePage> {
        if limit == 0 {
            return Err(ProfileError::InvalidPageSize(limit));
        }

        let records = self.records.read().await;
        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);

        let mut page: Vec<ProfileRecord> = records
            .range((lower, Bound::Unbounded))
            .take(limit + 1)
            .map(|(_, r)| r.clone())
            .collect();

        let next = if page.len() > limit {
            page.truncate(limit);
            page.last().map(|r| r.id)
        } else {
            None
        };

        Ok(ProfilePage {
            records: page,
            next,
        })
    }

    async fn ping(&self) -> ProfileResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ProfileWriter for InMemoryProfileStore {
    async fn save(&self, record: ProfileRecord) -> ProfileResult<()> {
        let id = record.id;
        self.records.write().await.insert(id, record);
        tracing::info!(profile_id = %id, "Saved profile");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> ProfileResult<bool> {
        let removed = self.records.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(profile_id = %id, "Deleted profile");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<ProfileRecord> {
        (0..n).map(|_| ProfileRecord::new(Uuid::new_v4())).collect()
    }

    #[tokio::test]
    async fn test_pages_cover_every_record_once() {
        let all = records(7);
        let store = InMemoryProfileStore::with_records(all.clone());

        let mut seen = Vec::new();
        let mut after = None;
        loop {
            let page = store.list_page(after, 3).await.unwrap();
            assert!(page.records.len() <= 3);
            seen.extend(page.records.iter().map(|r| r.id));
            match page.next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        let mut expected: Vec<Uuid> = all.iter().map(|r| r.id).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_empty_page() {
        let store = InMemoryProfileStore::with_records(records(4));

        let first = store.list_page(None, 2).await.unwrap();
        let second = store.list_page(first.next, 2).await.unwrap();
        assert_eq!(second.records.len(), 2);
        assert_eq!(second.next, None);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let store = InMemoryProfileStore::new();
        assert!(matches!(
            store.list_page(None, 0).await,
            Err(ProfileError::InvalidPageSize(0))
        ));
    }

    #[tokio::test]
    async fn test_save_replaces_and_delete_removes() {
        let store = InMemoryProfileStore::new();
        let id = Uuid::new_v4();

        let mut record = ProfileRecord::new(id);
        store.save(record.clone()).await.unwrap();
        record.city = Some("Split".into());
        store.save(record.clone()).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(id).await.unwrap(), Some(record));
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.is_empty().await);
    }
}
