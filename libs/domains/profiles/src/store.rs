use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProfileResult;
use crate::models::ProfileRecord;

/// One page of a keyset-paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePage {
    pub records: Vec<ProfileRecord>,
    /// Cursor for the following page; `None` once the listing is exhausted.
    pub next: Option<Uuid>,
}

/// Read access to the profile record store.
///
/// Listings are ordered by id and resumed with the `next` cursor of the
/// previous page, so a full walk visits every record exactly once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a record by user id
    async fn get(&self, id: Uuid) -> ProfileResult<Option<ProfileRecord>>;

    /// Up to `limit` records with id greater than `after`
    async fn list_page(&self, after: Option<Uuid>, limit: usize) -> ProfileResult<ProfilePage>;

    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> ProfileResult<()>;
}

/// Write access, used by the profile service and by tooling.
#[async_trait]
pub trait ProfileWriter: Send + Sync {
    /// Insert or replace the record with the same id
    async fn save(&self, record: ProfileRecord) -> ProfileResult<()>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> ProfileResult<bool>;
}
