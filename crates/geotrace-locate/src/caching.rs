//! Persistent cache in front of another locator.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use geotrace_core::{GeoLocation, Subject};
use tokio::sync::Mutex;

use crate::cache_codec;
use crate::cache_store::{CacheStore, FileCacheStore};
use crate::error::LocateError;
use crate::locator::GeoLocator;

type CacheMap<S> = HashMap<S, GeoLocation<S>>;

/// Answers lookups from a subject-keyed cache, asking `delegate` only on a miss.
///
/// The cache is read from its [`CacheStore`] on first use and written back
/// only by [`GeoLocator::dispose`]. A store that cannot be read or decoded is
/// logged and treated as empty.
///
/// The delegate is called without holding the cache lock, so slow lookups do
/// not block hits for other subjects. Two concurrent misses for one subject
/// may both reach the delegate; whichever result is inserted first is kept
/// and returned to both callers.
pub struct CachingGeoLocator<S: Subject, L> {
    delegate: L,
    store: Box<dyn CacheStore>,
    // `None` until loaded, and again after a flush.
    state: Mutex<Option<CacheMap<S>>>,
}

impl<S: Subject, L: GeoLocator<S>> CachingGeoLocator<S, L> {
    pub fn new(delegate: L, store: impl CacheStore + 'static) -> Self {
        Self {
            delegate,
            store: Box::new(store),
            state: Mutex::new(None),
        }
    }

    /// Caches to a JSON file at `path`.
    pub fn with_file(delegate: L, path: impl Into<PathBuf>) -> Self {
        Self::new(delegate, FileCacheStore::new(path))
    }

    pub fn delegate(&self) -> &L {
        &self.delegate
    }

    /// Number of cached entries, or 0 while the cache is not loaded.
    pub async fn cached_len(&self) -> usize {
        self.state.lock().await.as_ref().map_or(0, HashMap::len)
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.is_some()
    }

    async fn loaded<'a>(&self, state: &'a mut Option<CacheMap<S>>) -> &'a mut CacheMap<S> {
        if state.is_none() {
            *state = Some(self.read_store().await);
        }
        state.get_or_insert_with(HashMap::new)
    }

    async fn read_store(&self) -> CacheMap<S> {
        let started = Instant::now();
        let entries = match self.store.load().await {
            Ok(None) => HashMap::new(),
            Ok(Some(bytes)) => match cache_codec::decode(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(store = %self.store.describe(), error = %e, "discarding unreadable location cache");
                    HashMap::new()
                }
            },
            Err(e) => {
                tracing::warn!(store = %self.store.describe(), error = %e, "failed to read location cache");
                HashMap::new()
            }
        };
        tracing::info!(
            entries = entries.len(),
            elapsed_ms = started.elapsed().as_millis(),
            store = %self.store.describe(),
            "loaded location cache"
        );
        entries
    }
}

#[async_trait]
impl<S: Subject, L: GeoLocator<S>> GeoLocator<S> for CachingGeoLocator<S, L> {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError> {
        {
            let mut state = self.state.lock().await;
            if let Some(hit) = self.loaded(&mut *state).await.get(subject) {
                tracing::debug!(subject = %subject, "cache hit");
                return Ok(hit.shallow_copy());
            }
        }

        tracing::debug!(subject = %subject, "cache miss");
        let located = self.delegate.locate(subject).await?;

        let mut state = self.state.lock().await;
        let cache = self.loaded(&mut *state).await;
        match cache.entry(subject.clone()) {
            Entry::Occupied(existing) => Ok(existing.get().shallow_copy()),
            Entry::Vacant(slot) => {
                slot.insert(located.shallow_copy());
                tracing::debug!(subject = %subject, entries = cache.len(), "cache updated");
                Ok(located)
            }
        }
    }

    fn is_available(&self) -> bool {
        self.delegate.is_available()
    }

    async fn flush_caches(&self) {
        *self.state.lock().await = None;
        tracing::debug!("location cache flushed");
        self.delegate.flush_caches().await;
    }

    async fn dispose(&self) -> Result<(), LocateError> {
        let state = self.state.lock().await;
        let Some(cache) = state.as_ref() else {
            tracing::debug!("location cache never loaded; nothing to persist");
            return Ok(());
        };

        let started = Instant::now();
        let bytes = cache_codec::encode(cache.values()).map_err(LocateError::CacheEncode)?;
        self.store
            .store(&bytes)
            .await
            .map_err(|source| LocateError::CachePersist {
                target: self.store.describe(),
                source,
            })?;
        tracing::info!(
            entries = cache.len(),
            elapsed_ms = started.elapsed().as_millis(),
            store = %self.store.describe(),
            "persisted location cache"
        );
        Ok(())
    }
}
