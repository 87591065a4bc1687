use async_trait::async_trait;
use geotrace_core::{GeoLocation, Subject};

use crate::error::LocateError;

/// Batch progress callback: `(done, total)`. Returning `false` cancels the batch.
pub type Progress<'a> = dyn FnMut(usize, usize) -> bool + Send + 'a;

/// Resolves subjects to geographic locations.
///
/// An unlocatable subject is not an error: implementations return
/// [`GeoLocation::invalid`] and callers check validity before trusting the
/// coordinates.
#[async_trait]
pub trait GeoLocator<S: Subject>: Send + Sync {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError>;

    /// Locates `subjects` in order, reporting progress between items.
    ///
    /// `progress(0, total)` is reported first and `progress(total, total)`
    /// last. After every item but the final one, `progress(done, total)` is
    /// asked whether to continue; a `false` answer discards everything located
    /// so far and the call returns an empty list. Cancellation is checked only
    /// between items.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`GeoLocator::locate`]; earlier results are dropped.
    async fn locate_all(
        &self,
        subjects: &[S],
        progress: &mut Progress<'_>,
    ) -> Result<Vec<GeoLocation<S>>, LocateError> {
        let total = subjects.len();
        let mut located = Vec::with_capacity(total);
        progress(0, total);

        for (index, subject) in subjects.iter().enumerate() {
            located.push(self.locate(subject).await?);
            let done = index + 1;
            if done < total && !progress(done, total) {
                tracing::info!(done, total, "batch lookup cancelled");
                located.clear();
                break;
            }
        }

        progress(total, total);
        Ok(located)
    }

    fn is_available(&self) -> bool;

    /// Drops in-memory state so the next lookup starts fresh.
    async fn flush_caches(&self) {}

    /// Releases resources, persisting state where the locator keeps any.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::CachePersist`] when state could not be written.
    async fn dispose(&self) -> Result<(), LocateError> {
        Ok(())
    }
}

#[async_trait]
impl<S: Subject, L: GeoLocator<S> + ?Sized> GeoLocator<S> for std::sync::Arc<L> {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError> {
        (**self).locate(subject).await
    }

    async fn locate_all(
        &self,
        subjects: &[S],
        progress: &mut Progress<'_>,
    ) -> Result<Vec<GeoLocation<S>>, LocateError> {
        (**self).locate_all(subjects, progress).await
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn flush_caches(&self) {
        (**self).flush_caches().await;
    }

    async fn dispose(&self) -> Result<(), LocateError> {
        (**self).dispose().await
    }
}
