use async_stream::try_stream;
use futures::Stream;
use std::sync::Arc;

use crate::error::ProfileResult;
use crate::models::ProfileRecord;
use crate::store::ProfileStore;

/// Lazily walks the whole store one page at a time.
///
/// Only the current page is held in memory. The stream ends after the last
/// page and stops at the first store error. Calling it again restarts the walk
/// from the beginning.
pub fn profile_pages(
    store: Arc<dyn ProfileStore>,
    page_size: usize,
) -> impl Stream<Item = ProfileResult<Vec<ProfileRecord>>> + Send {
    try_stream! {
        let mut after = None;
        loop {
            let page = store.list_page(after, page_size).await?;
            if !page.records.is_empty() {
                yield page.records;
            }
            match page.next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use crate::memory::InMemoryProfileStore;
    use crate::store::{MockProfileStore, ProfilePage};
    use futures::TryStreamExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_stream_yields_all_pages() {
        let records: Vec<ProfileRecord> =
            (0..5).map(|_| ProfileRecord::new(Uuid::new_v4())).collect();
        let store: Arc<dyn ProfileStore> =
            Arc::new(InMemoryProfileStore::with_records(records));

        let pages: Vec<Vec<ProfileRecord>> =
            profile_pages(store, 2).try_collect().await.unwrap();
        let sizes: Vec<usize> = pages.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_empty_store_yields_nothing() {
        let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
        let pages: Vec<Vec<ProfileRecord>> =
            profile_pages(store, 10).try_collect().await.unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_store_error_ends_stream_with_error() {
        let first = ProfileRecord::new(Uuid::new_v4());
        let cursor = first.id;

        let mut mock = MockProfileStore::new();
        mock.expect_list_page()
            .withf(|after, _| after.is_none())
            .returning(move |_, _| {
                Ok(ProfilePage {
                    records: vec![first.clone()],
                    next: Some(cursor),
                })
            });
        mock.expect_list_page()
            .withf(move |after, _| *after == Some(cursor))
            .returning(|_, _| Err(ProfileError::Unavailable("timeout".into())));

        let store: Arc<dyn ProfileStore> = Arc::new(mock);
        let mut stream = Box::pin(profile_pages(store, 1));

        assert_eq!(stream.try_next().await.unwrap().unwrap().len(), 1);
        assert!(matches!(
            stream.try_next().await,
            Err(ProfileError::Unavailable(_))
        ));
    }
}
