use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ProfileResult;
use crate::models::ProfileRecord;
use crate::store::{ProfilePage, ProfileStore, ProfileWriter};

/// Reacts to committed profile changes.
///
/// Listeners run after the store write has succeeded. They cannot fail the
/// write; they are expected to log and account for their own failures.
#[async_trait]
pub trait ProfileChangeListener: Send + Sync {
    async fn profile_saved(&self, record: &ProfileRecord);

    /// `previous` is the record as it was before deletion.
    async fn profile_deleted(&self, previous: &ProfileRecord);
}

/// Wraps a store so every write is followed by listener notifications.
///
/// Saving a record whose username changed also reports the old record as
/// deleted, so derived entries keyed by username do not linger.
///
/// Writes through one writer are serialized, from reading the previous record
/// to the last notification. Writers in other processes are not coordinated
/// with; a stale entry left by such a race is removed by the next full resync.
pub struct NotifyingProfileWriter<S> {
    inner: S,
    listeners: Vec<Arc<dyn ProfileChangeListener>>,
    write_lock: Mutex<()>,
}

impl<S> NotifyingProfileWriter<S>
where
    S: ProfileStore + ProfileWriter,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            listeners: Vec::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProfileChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S> ProfileWriter for NotifyingProfileWriter<S>
where
    S: ProfileStore + ProfileWriter,
{
    async fn save(&self, record: ProfileRecord) -> ProfileResult<()> {
        let _guard = self.write_lock.lock().await;
        let previous = self.inner.get(record.id).await?;
        self.inner.save(record.clone()).await?;

        let renamed = previous
            .as_ref()
            .filter(|prev| prev.username.is_some() && prev.username != record.username);

        for listener in &self.listeners {
            if let Some(prev) = renamed {
                listener.profile_deleted(prev).await;
            }
            listener.profile_saved(&record).await;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> ProfileResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(previous) = self.inner.get(id).await? else {
            return Ok(false);
        };

        let removed = self.inner.delete(id).await?;
        if removed {
            for listener in &self.listeners {
                listener.profile_deleted(&previous).await;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl<S> ProfileStore for NotifyingProfileWriter<S>
where
    S: ProfileStore + ProfileWriter,
{
    async fn get(&self, id: Uuid) -> ProfileResult<Option<ProfileRecord>> {
        self.inner.get(id).await
    }

    async fn list_page(&self, after: Option<Uuid>, limit: usize) -> ProfileResult<ProfilePage> {
        self.inner.list_page(after, limit).await
    }

    async fn ping(&self) -> ProfileResult<()> {
        self.inner.ping().await
    }
}
