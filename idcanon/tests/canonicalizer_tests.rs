//! Canonicalizer Tests
//!
//! Persisting scan results and resolving names against the cache

mod helpers;

use helpers::{names, record, FailingCache, FakeResolver};
use idcanon::identity::{Canonicalizer, Category, IdentityScanner, NamesByCategory};
use idcanon_common::{KeyValueCache, MemoryCache, SqliteCache};
use std::sync::Arc;
use tempfile::TempDir;

fn composer_result() -> idcanon::ScanResult {
    IdentityScanner::new().scan(&names(
        Category::Composer,
        &[
            "Beethoven",
            "Beethoven",
            "Ludwig van Beethoven",
            "Ludwig van Beethoven",
            "J.S. Bach",
            "Johann Sebastian Bach",
        ],
    ))
}

#[tokio::test]
async fn test_persist_writes_cluster_and_variant_keys() {
    let cache = Arc::new(MemoryCache::new());
    let canonicalizer = Canonicalizer::new(cache.clone());

    let written = canonicalizer.persist(&composer_result()).await.unwrap();

    let entries = cache.snapshot().await;
    assert_eq!(written, 4);
    assert_eq!(entries.len(), 4);
    assert_eq!(entries["composer::beethoven"], "Beethoven");
    assert_eq!(entries["composer::ludwigvanbeethoven"], "Beethoven");
    assert_eq!(entries["composer::jsbach"], "Johann Sebastian Bach");
    assert_eq!(entries["composer::johannsebastianbach"], "Johann Sebastian Bach");
}

#[tokio::test]
async fn test_same_token_variants_share_one_entry() {
    let cache = Arc::new(MemoryCache::new());
    let canonicalizer = Canonicalizer::new(cache.clone());

    let result = IdentityScanner::new().scan(&names(
        Category::Artist,
        &["Miles Davis", "Miles Davis", "miles davis", "MILES DAVIS"],
    ));
    let written = canonicalizer.persist(&result).await.unwrap();

    assert_eq!(written, 1);
    assert_eq!(cache.snapshot().await["artist::milesdavis"], "Miles Davis");
}

#[tokio::test]
async fn test_resolve_after_persist() {
    let canonicalizer = Canonicalizer::new(Arc::new(MemoryCache::new()));
    canonicalizer.persist(&composer_result()).await.unwrap();

    assert_eq!(
        canonicalizer.resolve("ludwig van beethoven", Category::Composer).await,
        "Beethoven"
    );
    assert_eq!(
        canonicalizer.resolve(" J.S. BACH ", Category::Composer).await,
        "Johann Sebastian Bach"
    );
    assert_eq!(canonicalizer.resolve("Mozart", Category::Composer).await, "Mozart");
    assert_eq!(canonicalizer.resolve("Beethoven", Category::Artist).await, "Beethoven");
}

#[tokio::test]
async fn test_resolve_multi_never_joins_with_comma() {
    let canonicalizer = Canonicalizer::new(Arc::new(MemoryCache::new()));
    canonicalizer.persist(&composer_result()).await.unwrap();

    let joined = canonicalizer
        .resolve_multi("J.S. Bach, Ludwig van Beethoven, beethoven", Category::Composer)
        .await;
    assert_eq!(joined, "Johann Sebastian Bach; Beethoven");
    assert!(!joined.contains(','));
}

#[tokio::test]
async fn test_persist_refreshes_memo() {
    let canonicalizer = Canonicalizer::new(Arc::new(MemoryCache::new()));

    let first = IdentityScanner::new().scan(&names(Category::Artist, &["MILES DAVIS"]));
    canonicalizer.persist(&first).await.unwrap();
    assert_eq!(canonicalizer.resolve("miles davis", Category::Artist).await, "MILES DAVIS");

    let second = IdentityScanner::new().scan(&names(Category::Artist, &["Miles Davis"]));
    canonicalizer.persist(&second).await.unwrap();
    assert_eq!(canonicalizer.resolve("miles davis", Category::Artist).await, "Miles Davis");
}

#[tokio::test]
async fn test_write_failure_is_surfaced() {
    let canonicalizer = Canonicalizer::new(Arc::new(FailingCache));
    let result = canonicalizer.persist(&composer_result()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_read_failure_falls_back_to_input() {
    let canonicalizer = Canonicalizer::new(Arc::new(FailingCache));
    assert_eq!(
        canonicalizer.resolve("  Miles Davis ", Category::Artist).await,
        "Miles Davis"
    );
    assert_eq!(
        canonicalizer.resolve_multi("Miles Davis & John Coltrane", Category::Artist).await,
        "Miles Davis; John Coltrane"
    );
}

#[tokio::test]
async fn test_mappings_survive_reopen_of_sqlite_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("cache.db");

    {
        let cache: Arc<dyn KeyValueCache> = Arc::new(SqliteCache::open(&path).await.unwrap());
        let written = Canonicalizer::new(cache).persist(&composer_result()).await.unwrap();
        assert_eq!(written, 4);
    }

    let cache: Arc<dyn KeyValueCache> = Arc::new(SqliteCache::open(&path).await.unwrap());
    let canonicalizer = Canonicalizer::new(cache);
    assert_eq!(
        canonicalizer.resolve("Johann Sebastian Bach", Category::Composer).await,
        "Johann Sebastian Bach"
    );
    assert_eq!(
        canonicalizer.resolve("L. van Beethoven", Category::Composer).await,
        "L. van Beethoven"
    );
}

#[tokio::test]
async fn test_empty_result_persists_nothing() {
    let cache = Arc::new(MemoryCache::new());
    let canonicalizer = Canonicalizer::new(cache.clone());

    let result = IdentityScanner::new().scan(&NamesByCategory::new());
    assert_eq!(canonicalizer.persist(&result).await.unwrap(), 0);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_alias_never_overwrites_another_clusters_key() {
    let resolver = FakeResolver::new().with(
        "Charlie Parker",
        record("mbid-parker", "Charlie Parker", &["Bird"], 1.0),
    );
    let result = IdentityScanner::new()
        .scan_with_resolver(&names(Category::Artist, &["Bird", "Charlie Parker"]), &resolver)
        .await;

    let clusters = result.clusters(Category::Artist);
    assert_eq!(clusters["bird"].canonical, "Bird");
    assert!(clusters["charlieparker"].variants.contains("Bird"));

    let cache = Arc::new(MemoryCache::new());
    let canonicalizer = Canonicalizer::new(cache.clone());
    let written = canonicalizer.persist(&result).await.unwrap();

    let entries = cache.snapshot().await;
    assert_eq!(written, 2);
    assert_eq!(entries["artist::bird"], "Bird");
    assert_eq!(entries["artist::charlieparker"], "Charlie Parker");
    assert_eq!(canonicalizer.resolve("Bird", Category::Artist).await, "Bird");
}
