use async_trait::async_trait;
use geotrace_core::{GeoLocation, Subject};

use crate::error::LocateError;
use crate::locator::{GeoLocator, Progress};

/// Routes every call to the first candidate that reports itself available.
///
/// Availability is checked on each call, so a provider that goes away (or
/// comes back) is picked up without rebuilding the chain. There is no
/// fallback within a call: if the chosen candidate fails, the call fails.
pub struct DelegatingGeoLocator<S: Subject> {
    candidates: Vec<Box<dyn GeoLocator<S>>>,
}

impl<S: Subject> DelegatingGeoLocator<S> {
    #[must_use]
    pub fn new(candidates: Vec<Box<dyn GeoLocator<S>>>) -> Self {
        Self { candidates }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn select(&self) -> Option<&dyn GeoLocator<S>> {
        self.candidates
            .iter()
            .map(|candidate| &**candidate)
            .find(|candidate| candidate.is_available())
    }

    fn require(&self) -> Result<&dyn GeoLocator<S>, LocateError> {
        self.select().ok_or(LocateError::NoLocatorAvailable)
    }
}

#[async_trait]
impl<S: Subject> GeoLocator<S> for DelegatingGeoLocator<S> {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError> {
        self.require()?.locate(subject).await
    }

    async fn locate_all(
        &self,
        subjects: &[S],
        progress: &mut Progress<'_>,
    ) -> Result<Vec<GeoLocation<S>>, LocateError> {
        self.require()?.locate_all(subjects, progress).await
    }

    fn is_available(&self) -> bool {
        self.select().is_some()
    }

    async fn flush_caches(&self) {
        match self.select() {
            Some(candidate) => candidate.flush_caches().await,
            None => tracing::warn!("no geo-locator available; nothing to flush"),
        }
    }

    async fn dispose(&self) -> Result<(), LocateError> {
        self.require()?.dispose().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use geotrace_core::StringSubject;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        available: AtomicBool,
        locates: AtomicUsize,
        flushes: AtomicUsize,
    }

    struct RecordingLocator(Arc<Recorder>);

    #[async_trait]
    impl GeoLocator<StringSubject> for RecordingLocator {
        async fn locate(&self, subject: &StringSubject) -> Result<GeoLocation<StringSubject>, LocateError> {
            self.0.locates.fetch_add(1, Ordering::SeqCst);
            Ok(GeoLocation::new(subject.clone(), 0.0, 0.0))
        }

        fn is_available(&self) -> bool {
            self.0.available.load(Ordering::SeqCst)
        }

        async fn flush_caches(&self) {
            self.0.flushes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn chain(availability: &[bool]) -> (DelegatingGeoLocator<StringSubject>, Vec<Arc<Recorder>>) {
        let recorders: Vec<Arc<Recorder>> = availability
            .iter()
            .map(|&available| {
                let recorder = Arc::new(Recorder::default());
                recorder.available.store(available, Ordering::SeqCst);
                recorder
            })
            .collect();
        let candidates = recorders
            .iter()
            .map(|p| Box::new(RecordingLocator(Arc::clone(p))) as Box<dyn GeoLocator<StringSubject>>)
            .collect();
        (DelegatingGeoLocator::new(candidates), recorders)
    }

    fn subject() -> StringSubject {
        StringSubject::new("8.8.8.8").unwrap()
    }

    #[tokio::test]
    async fn routes_to_first_available_candidate_only() {
        let (locator, recorders) = chain(&[false, false, true]);
        locator.locate(&subject()).await.unwrap();

        assert_eq!(recorders[0].locates.load(Ordering::SeqCst), 0);
        assert_eq!(recorders[1].locates.load(Ordering::SeqCst), 0);
        assert_eq!(recorders[2].locates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn availability_is_re_evaluated_per_call() {
        let (locator, recorders) = chain(&[true, true]);
        locator.locate(&subject()).await.unwrap();
        recorders[0].available.store(false, Ordering::SeqCst);
        locator.locate(&subject()).await.unwrap();

        assert_eq!(recorders[0].locates.load(Ordering::SeqCst), 1);
        assert_eq!(recorders[1].locates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_available_candidate_is_a_distinct_error() {
        let (locator, _recorders) = chain(&[false, false]);
        assert!(!locator.is_available());
        let err = locator.locate(&subject()).await.unwrap_err();
        assert!(matches!(err, LocateError::NoLocatorAvailable));
        let err = locator
            .locate_all(&[subject()], &mut |_, _| true)
            .await
            .unwrap_err();
        assert!(matches!(err, LocateError::NoLocatorAvailable));
        assert!(matches!(
            locator.dispose().await,
            Err(LocateError::NoLocatorAvailable)
        ));
    }

    #[tokio::test]
    async fn flush_goes_to_selected_candidate_and_tolerates_none() {
        let (locator, recorders) = chain(&[false, true]);
        locator.flush_caches().await;
        assert_eq!(recorders[0].flushes.load(Ordering::SeqCst), 0);
        assert_eq!(recorders[1].flushes.load(Ordering::SeqCst), 1);

        let (empty, _) = chain(&[]);
        empty.flush_caches().await;
        assert!(empty.is_empty());
    }
}
