//! Integration tests for `CachingGeoLocator`.
//!
//! The delegates here are scripted in-process locators; stores are either
//! in memory or a temp directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use geotrace_core::{GeoLocation, ParamValue, StringSubject};
use geotrace_locate::{
    CacheStore, CachingGeoLocator, FileCacheStore, GeoLocator, LocateError, MemoryCacheStore,
};
use tokio::sync::Notify;

fn subject(s: &str) -> StringSubject {
    StringSubject::new(s).unwrap()
}

/// Answers the first `budget` calls, then fails every call after that.
struct LimitedLocator {
    budget: usize,
    calls: AtomicUsize,
    flushes: AtomicUsize,
}

impl LimitedLocator {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            calls: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoLocator<StringSubject> for LimitedLocator {
    async fn locate(&self, subject: &StringSubject) -> Result<GeoLocation<StringSubject>, LocateError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.budget {
            return Err(LocateError::ApiError {
                provider: "limited",
                message: format!("unexpected call for {subject}"),
            });
        }
        Ok(match subject.value() {
            "test1" => GeoLocation::with_validity(subject.clone(), 10.0, 20.0, true)
                .set_parameter("key1", 10_i32)
                .set_parameter("key2", "test")
                .set_parameter("key3", 1.23_f32)
                .set_parameter("key4", 4.56_f64)
                .set_parameter("key5", 7_i64),
            _ => GeoLocation::with_validity(subject.clone(), 30.0, 40.0, false),
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn flush_caches(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shares a [`MemoryCacheStore`] between several locators.
#[derive(Clone)]
struct SharedStore(Arc<MemoryCacheStore>);

#[async_trait]
impl CacheStore for SharedStore {
    async fn load(&self) -> std::io::Result<Option<Vec<u8>>> {
        self.0.load().await
    }

    async fn store(&self, bytes: &[u8]) -> std::io::Result<()> {
        self.0.store(bytes).await
    }

    fn describe(&self) -> String {
        self.0.describe()
    }
}

#[tokio::test]
async fn cache_hit_never_reaches_delegate() {
    let locator = CachingGeoLocator::new(LimitedLocator::new(1), MemoryCacheStore::new());

    let first = locator.locate(&subject("test1")).await.unwrap();
    let second = locator.locate(&subject("test1")).await.unwrap();

    assert_eq!(locator.delegate().calls(), 1);
    assert_eq!(first.coordinate(), second.coordinate());
    assert_eq!(second.parameters(), first.parameters());
}

#[tokio::test]
async fn dispose_persists_and_flush_reloads_from_store() {
    let store = SharedStore(Arc::new(MemoryCacheStore::new()));
    let locator = CachingGeoLocator::new(LimitedLocator::new(2), store.clone());

    locator.locate(&subject("test1")).await.unwrap();
    locator.locate(&subject("test2")).await.unwrap();
    locator.dispose().await.unwrap();
    assert_eq!(store.0.write_count(), 1);

    locator.flush_caches().await;
    assert!(!locator.is_loaded().await);
    assert_eq!(locator.delegate().flushes.load(Ordering::SeqCst), 1);

    // The delegate's budget is spent; both answers must come from the store.
    let read = locator.locate(&subject("test1")).await.unwrap();
    assert!(read.has_valid_coordinates());
    assert_eq!(read.parameter("key1"), Some(&ParamValue::I32(10)));
    assert_eq!(read.parameter("key3"), Some(&ParamValue::F32(1.23)));
    assert_eq!(read.parameter("key4"), Some(&ParamValue::F64(4.56)));
    assert_eq!(read.parameter("key5"), Some(&ParamValue::I64(7)));

    let read = locator.locate(&subject("test2")).await.unwrap();
    assert!(!read.has_valid_coordinates());
    assert_eq!(locator.delegate().calls(), 2);
    assert_eq!(locator.cached_len().await, 2);
}

#[tokio::test]
async fn dispose_before_any_lookup_writes_nothing() {
    let store = SharedStore(Arc::new(MemoryCacheStore::new()));
    let locator = CachingGeoLocator::new(LimitedLocator::new(0), store.clone());

    locator.dispose().await.unwrap();

    assert_eq!(store.0.write_count(), 0);
    assert!(store.0.contents().is_none());
}

#[tokio::test]
async fn corrupt_store_is_treated_as_empty() {
    let store = MemoryCacheStore::with_contents(b"[{\"subject\": {\"value\": \"test1\"".to_vec());
    let locator = CachingGeoLocator::new(LimitedLocator::new(1), store);

    let location = locator.locate(&subject("test1")).await.unwrap();

    assert!(location.has_valid_coordinates());
    assert_eq!(locator.delegate().calls(), 1);
}

#[tokio::test]
async fn unknown_parameter_tag_discards_whole_cache() {
    let bytes = br#"[
        {"subject": {"value": "test1"}, "coords": {"lat": 1.0, "long": 2.0}, "valid": true, "parameters": {}},
        {"subject": {"value": "test2"}, "coords": {"lat": 1.0, "long": 2.0}, "valid": true,
         "parameters": {"x": {"t": "z", "v": 1}}}
    ]"#;
    let locator = CachingGeoLocator::new(LimitedLocator::new(1), MemoryCacheStore::with_contents(bytes.to_vec()));

    // test1 was well-formed on disk, but the bad record poisons the load.
    locator.locate(&subject("test1")).await.unwrap();
    assert_eq!(locator.delegate().calls(), 1);
}

#[tokio::test]
async fn file_cache_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geolocation.cache");

    let first_run = CachingGeoLocator::with_file(LimitedLocator::new(1), &path);
    first_run.locate(&subject("test1")).await.unwrap();
    first_run.dispose().await.unwrap();

    let second_run = CachingGeoLocator::with_file(LimitedLocator::new(0), &path);
    let location = second_run.locate(&subject("test1")).await.unwrap();
    assert_eq!(location.parameter("key2"), Some(&ParamValue::Str("test".to_string())));
    assert_eq!(second_run.delegate().calls(), 0);
}

#[tokio::test]
async fn persist_failure_surfaces_from_dispose() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCacheStore::new(dir.path().join("missing-dir").join("geolocation.cache"));
    let locator = CachingGeoLocator::new(LimitedLocator::new(1), store);

    locator.locate(&subject("test1")).await.unwrap();
    let err = locator.dispose().await.unwrap_err();

    assert!(matches!(err, LocateError::CachePersist { .. }), "got {err:?}");
    // The in-memory cache is untouched.
    assert_eq!(locator.cached_len().await, 1);
}

#[tokio::test]
async fn delegate_errors_are_not_cached() {
    let locator = CachingGeoLocator::new(LimitedLocator::new(0), MemoryCacheStore::new());

    assert!(locator.locate(&subject("test1")).await.is_err());
    assert!(locator.locate(&subject("test1")).await.is_err());
    assert_eq!(locator.delegate().calls(), 2);
    assert_eq!(locator.cached_len().await, 0);
}

/// The first call parks until released; later calls answer immediately.
/// Latitude records which call produced a result.
struct GatedLocator {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl GeoLocator<StringSubject> for GatedLocator {
    async fn locate(&self, subject: &StringSubject) -> Result<GeoLocation<StringSubject>, LocateError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == 1 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        #[allow(clippy::cast_precision_loss)]
        let latitude = n as f64;
        Ok(GeoLocation::new(subject.clone(), latitude, 0.0))
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn concurrent_misses_keep_first_inserted_result() {
    let locator = Arc::new(CachingGeoLocator::new(
        GatedLocator {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        },
        MemoryCacheStore::new(),
    ));

    let slow = {
        let locator = Arc::clone(&locator);
        tokio::spawn(async move { locator.locate(&subject("1.2.3.4")).await })
    };
    locator.delegate().entered.notified().await;

    // The second caller misses too, but its result lands in the cache first.
    let fast = locator.locate(&subject("1.2.3.4")).await.unwrap();
    assert!((fast.latitude() - 2.0).abs() < f64::EPSILON);

    locator.delegate().release.notify_one();
    let slow = slow.await.unwrap().unwrap();

    assert!((slow.latitude() - 2.0).abs() < f64::EPSILON);
    assert_eq!(locator.delegate().calls.load(Ordering::SeqCst), 2);
    assert_eq!(locator.cached_len().await, 1);
}

#[tokio::test]
async fn batch_lookup_goes_through_the_cache() {
    let locator = CachingGeoLocator::new(LimitedLocator::new(2), MemoryCacheStore::new());
    let subjects = [subject("test1"), subject("test2"), subject("test1")];

    let results = locator.locate_all(&subjects, &mut |_, _| true).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(locator.delegate().calls(), 2);
}
