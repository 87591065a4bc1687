use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use geotrace_core::{GeoLocation, Subject};
use maxminddb::{geoip2, MaxMindDBError, Reader};
use tokio::sync::Mutex;

use super::located;
use crate::error::LocateError;
use crate::locator::GeoLocator;

const PROVIDER: &str = "maxmind";

/// Locator backed by a local GeoLite2/GeoIP2 City database (`.mmdb`).
///
/// Available while the database file exists. The file is opened on the first
/// lookup and kept until [`GeoLocator::dispose`].
pub struct MaxMindLocator {
    path: PathBuf,
    reader: Mutex<Option<Arc<Reader<Vec<u8>>>>>,
}

impl MaxMindLocator {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn database_error(&self, reason: impl ToString) -> LocateError {
        LocateError::Database {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    async fn reader(&self) -> Result<Arc<Reader<Vec<u8>>>, LocateError> {
        let mut slot = self.reader.lock().await;
        if let Some(reader) = slot.as_ref() {
            return Ok(Arc::clone(reader));
        }

        let path = self.path.clone();
        let reader = tokio::task::spawn_blocking(move || Reader::open_readfile(path))
            .await
            .map_err(|e| self.database_error(e))?
            .map_err(|e| self.database_error(e))?;
        tracing::info!(provider = PROVIDER, path = %self.path.display(), "opened geo database");

        let reader = Arc::new(reader);
        *slot = Some(Arc::clone(&reader));
        Ok(reader)
    }

    /// Maps a database lookup to a location; an address with no record is unlocatable.
    fn location_for<S: Subject>(
        &self,
        subject: S,
        lookup: Result<geoip2::City<'_>, MaxMindDBError>,
    ) -> Result<GeoLocation<S>, LocateError> {
        match lookup {
            Ok(record) => Ok(from_record(subject, &record)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => {
                tracing::debug!(provider = PROVIDER, subject = %subject, "address not in database");
                Ok(GeoLocation::invalid(subject))
            }
            Err(e) => Err(self.database_error(e)),
        }
    }
}

fn english_name(names: Option<&BTreeMap<&str, &str>>) -> Option<String> {
    names.and_then(|n| n.get("en")).map(|name| (*name).to_owned())
}

fn from_record<S: Subject>(subject: S, record: &geoip2::City<'_>) -> GeoLocation<S> {
    let coordinates = record
        .location
        .as_ref()
        .and_then(|l| Some((l.latitude?, l.longitude?)));
    let Some((latitude, longitude)) = coordinates else {
        return GeoLocation::invalid(subject);
    };
    located(
        subject,
        english_name(record.country.as_ref().and_then(|c| c.names.as_ref())),
        english_name(record.city.as_ref().and_then(|c| c.names.as_ref())),
        latitude,
        longitude,
    )
}

#[async_trait]
impl<S: Subject> GeoLocator<S> for MaxMindLocator {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError> {
        let reader = self.reader().await?;
        let Ok(address) = subject.to_string().parse::<IpAddr>() else {
            tracing::debug!(provider = PROVIDER, subject = %subject, "subject is not an IP address");
            return Ok(GeoLocation::invalid(subject.clone()));
        };
        tracing::debug!(provider = PROVIDER, subject = %subject, "looking up location");
        self.location_for(subject.clone(), reader.lookup::<geoip2::City<'_>>(address))
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    async fn dispose(&self) -> Result<(), LocateError> {
        self.reader.lock().await.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geotrace_core::{StringSubject, KEY_CITY, KEY_COUNTRY};

    use super::*;

    fn subject(s: &str) -> StringSubject {
        StringSubject::new(s).unwrap()
    }

    fn locator() -> MaxMindLocator {
        MaxMindLocator::new("/nonexistent/GeoLite2-City.mmdb")
    }

    #[test]
    fn record_with_coordinates_sets_city_and_country() {
        let record: geoip2::City<'_> = serde_json::from_str(
            r#"{"city":{"names":{"en":"Berlin","de":"Berlin"}},
                "country":{"iso_code":"DE","names":{"en":"Germany","de":"Deutschland"}},
                "location":{"latitude":52.5,"longitude":13.4}}"#,
        )
        .unwrap();

        let location = locator().location_for(subject("1.2.3.4"), Ok(record)).unwrap();
        assert!(location.has_valid_coordinates());
        assert!((location.latitude() - 52.5).abs() < 1e-9);
        assert_eq!(location.parameter(KEY_CITY).and_then(|v| v.as_str()), Some("Berlin"));
        assert_eq!(location.parameter(KEY_COUNTRY).and_then(|v| v.as_str()), Some("Germany"));
    }

    #[test]
    fn record_without_location_is_invalid() {
        let record: geoip2::City<'_> =
            serde_json::from_str(r#"{"country":{"names":{"en":"Germany"}}}"#).unwrap();
        let location = locator().location_for(subject("1.2.3.4"), Ok(record)).unwrap();
        assert!(!location.has_valid_coordinates());
    }

    #[test]
    fn address_not_found_is_invalid() {
        let lookup = Err(MaxMindDBError::AddressNotFoundError("no record".to_string()));
        let location = locator().location_for(subject("10.0.0.1"), lookup).unwrap();
        assert!(!location.has_valid_coordinates());
        assert!(location.parameters().is_empty());
    }

    #[test]
    fn corrupt_database_is_an_error() {
        let lookup = Err(MaxMindDBError::InvalidDatabaseError("bad tree".to_string()));
        let err = locator().location_for(subject("1.2.3.4"), lookup).unwrap_err();
        assert!(matches!(err, LocateError::Database { .. }), "got {err:?}");
    }
}
