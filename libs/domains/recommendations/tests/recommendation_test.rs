//! End-to-end recommendation flow over in-memory backends.
//!
//! Ingests profiles into an in-memory cosine index with the hashing embedder,
//! then checks the ranked results served for each requester.

use async_trait::async_trait;
use domain_profiles::{InMemoryProfileStore, ProfileRecord, ProfileStore};
use domain_recommendations::*;
use std::sync::Arc;
use uuid::Uuid;

fn profile(n: u128, username: &str, age: i32, city: &str, interests: &[&str]) -> ProfileRecord {
    ProfileRecord {
        id: Uuid::from_u128(n),
        username: Some(username.to_string()),
        name: Some(username.to_uppercase()),
        age: Some(age),
        city: Some(city.to_string()),
        interests: Some(interests.iter().map(|s| s.to_string()).collect()),
    }
}

struct Fixture {
    store: Arc<dyn ProfileStore>,
    index: Arc<InMemoryIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Fixture {
    async fn new(records: Vec<ProfileRecord>) -> Self {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashingProvider::default());
        let index = Arc::new(InMemoryIndex::new("user_profiles"));
        ensure_collection(index.as_ref(), &embedder.model())
            .await
            .unwrap();

        Self {
            store: Arc::new(InMemoryProfileStore::with_records(records)),
            index,
            embedder,
        }
    }

    fn job(&self) -> IngestionJob {
        IngestionJob::new(
            Arc::clone(&self.store),
            Arc::clone(&self.embedder),
            self.index.clone(),
            2,
        )
    }

    fn service(&self) -> RecommendationService {
        RecommendationService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.embedder),
            self.index.clone(),
            &RecommendationConfig::new("user_profiles"),
        )
    }
}

fn crowd() -> Vec<ProfileRecord> {
    vec![
        profile(1, "ana", 29, "Zagreb", &["hiking", "chess"]),
        profile(2, "ivo", 30, "Zagreb", &["hiking", "chess"]),
        profile(3, "eva", 61, "Osijek", &["opera", "gardening"]),
        profile(4, "luka", 24, "Split", &["sailing", "football"]),
        profile(5, "maja", 33, "Zagreb", &["chess", "jazz"]),
    ]
}

#[tokio::test]
async fn test_near_identical_profiles_match_first() {
    let fixture = Fixture::new(vec![
        profile(1, "ana", 29, "Zagreb", &["hiking", "chess"]),
        profile(2, "ivo", 30, "Zagreb", &["hiking", "chess"]),
    ])
    .await;
    fixture.job().run().await.unwrap();

    let results = fixture
        .service()
        .recommend(&Identity::new(Uuid::from_u128(1), "ana"), Some(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].username, "ivo");
    assert_eq!(results[0].city, "Zagreb");
    assert_eq!(results[0].interests, vec!["hiking", "chess"]);
    assert!(results[0].match_percentage > 80.0);
}

#[tokio::test]
async fn test_results_exclude_self_and_are_bounded_and_ordered() {
    let fixture = Fixture::new(crowd()).await;
    fixture.job().run().await.unwrap();
    let service = fixture.service();

    for record in crowd() {
        let username = record.username.clone().unwrap();
        let results = service
            .recommend(&Identity::new(record.id, username.clone()), Some(3))
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.username != username));
        assert!(
            results
                .iter()
                .all(|r| (0.0..=100.0).contains(&r.match_percentage))
        );
        assert!(
            results
                .windows(2)
                .all(|w| w[0].match_percentage >= w[1].match_percentage)
        );
    }
}

#[tokio::test]
async fn test_default_limit_returns_everyone_else() {
    let fixture = Fixture::new(crowd()).await;
    fixture.job().run().await.unwrap();

    let results = fixture
        .service()
        .recommend(&Identity::new(Uuid::from_u128(5), "maja"), None)
        .await
        .unwrap();

    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn test_ingestion_is_idempotent() {
    let fixture = Fixture::new(crowd()).await;

    let first = fixture.job().run().await.unwrap();
    let count_after_first = fixture.index.count().await.unwrap();
    let service = fixture.service();
    let ana = Identity::new(Uuid::from_u128(1), "ana");
    let before = service.recommend(&ana, Some(4)).await.unwrap();

    let second = fixture.job().run().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(count_after_first, 5);
    assert_eq!(fixture.index.count().await.unwrap(), count_after_first);
    assert_eq!(service.recommend(&ana, Some(4)).await.unwrap(), before);
}

#[tokio::test]
async fn test_ingestion_skips_profile_missing_city() {
    let mut incomplete = profile(1, "ana", 29, "Zagreb", &["hiking"]);
    incomplete.city = None;
    let fixture = Fixture::new(vec![incomplete]).await;

    let report = fixture.job().run().await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.valid, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.upserted, 0);
    assert_eq!(fixture.index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_requester_is_profile_not_found() {
    let fixture = Fixture::new(crowd()).await;
    fixture.job().run().await.unwrap();

    let err = fixture
        .service()
        .recommend(&Identity::new(Uuid::from_u128(42), "ghost"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::ProfileNotFound(_)));
}

#[tokio::test]
async fn test_incomplete_requester_profile() {
    let mut records = crowd();
    records[0].interests = None;
    let fixture = Fixture::new(records).await;
    fixture.job().run().await.unwrap();

    let err = fixture
        .service()
        .recommend(&Identity::new(Uuid::from_u128(1), "ana"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::IncompleteProfile(_)));
}

#[tokio::test]
async fn test_query_before_collection_exists() {
    let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::with_records(crowd()));
    let service = RecommendationService::new(
        store,
        Arc::new(HashingProvider::default()),
        Arc::new(InMemoryIndex::new("user_profiles")),
        &RecommendationConfig::default(),
    );

    let err = service
        .recommend(&Identity::new(Uuid::from_u128(1), "ana"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RecommendationError::CollectionMissing(_)));
    assert!(service.check_index().await.is_err());
}

#[tokio::test]
async fn test_write_hook_keeps_index_current() {
    use domain_profiles::{NotifyingProfileWriter, ProfileWriter};

    let fixture = Fixture::new(vec![]).await;
    let indexer = Arc::new(ProfileIndexer::new(
        Arc::clone(&fixture.embedder),
        fixture.index.clone(),
    ));
    let writer = Arc::new(
        NotifyingProfileWriter::new(InMemoryProfileStore::new()).with_listener(indexer),
    );
    let service = RecommendationService::new(
        writer.clone(),
        Arc::clone(&fixture.embedder),
        fixture.index.clone(),
        &RecommendationConfig::default(),
    );

    for record in crowd() {
        writer.save(record).await.unwrap();
    }
    assert_eq!(fixture.index.count().await.unwrap(), 5);

    let ana = Identity::new(Uuid::from_u128(1), "ana");
    assert_eq!(service.recommend(&ana, Some(1)).await.unwrap()[0].username, "ivo");

    writer.delete(Uuid::from_u128(2)).await.unwrap();
    assert_eq!(fixture.index.count().await.unwrap(), 4);
    assert_ne!(service.recommend(&ana, Some(1)).await.unwrap()[0].username, "ivo");
}

/// Hashing vectors reported under another model name of the same size.
struct RenamedModel(HashingProvider);

#[async_trait]
impl EmbeddingProvider for RenamedModel {
    fn model(&self) -> EmbeddingModelInfo {
        EmbeddingModelInfo::new("all-MiniLM-L6-v2", self.0.model().dimension)
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> RecommendationResult<Vec<f32>> {
        self.0.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> RecommendationResult<Vec<Vec<f32>>> {
        self.0.embed_batch(texts).await
    }
}

#[tokio::test]
async fn test_model_switch_with_same_dimension_is_refused_until_reingested() {
    let fixture = Fixture::new(crowd()).await;
    fixture.job().run().await.unwrap();

    let renamed: Arc<dyn EmbeddingProvider> = Arc::new(RenamedModel(HashingProvider::default()));
    let err = ensure_collection(fixture.index.as_ref(), &renamed.model())
        .await
        .unwrap_err();
    assert!(matches!(err, RecommendationError::ModelMismatch(_)));

    prepare_collection(fixture.index.as_ref(), &renamed.model())
        .await
        .unwrap();
    IngestionJob::new(
        Arc::clone(&fixture.store),
        Arc::clone(&renamed),
        fixture.index.clone(),
        2,
    )
    .run()
    .await
    .unwrap();

    ensure_collection(fixture.index.as_ref(), &renamed.model())
        .await
        .unwrap();
    let service = RecommendationService::new(
        Arc::clone(&fixture.store),
        renamed,
        fixture.index.clone(),
        &RecommendationConfig::new("user_profiles"),
    );
    let results = service
        .recommend(&Identity::new(Uuid::from_u128(1), "ana"), Some(3))
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].username, "ivo");
}
