use async_trait::async_trait;
use geotrace_core::config::DEFAULT_FREEGEOIP_URL;
use geotrace_core::{GeoLocation, Subject};
use reqwest::{Client, Url};

use super::types::FreeGeoIpResponse;
use super::{located, normalise_base_url, read_body, ProviderSettings};
use crate::error::LocateError;
use crate::locator::GeoLocator;
use crate::throttle::RequestThrottle;

const PROVIDER: &str = "freegeoip";

/// Locator for freegeoip-style services: `GET {base}/{address}` returning JSON.
///
/// Needs no credentials and always reports itself available.
pub struct FreeGeoIpLocator {
    client: Client,
    base_url: Url,
    throttle: RequestThrottle,
}

impl FreeGeoIpLocator {
    /// # Errors
    ///
    /// Returns [`LocateError::Http`] if the HTTP client cannot be constructed.
    pub fn new(settings: &ProviderSettings) -> Result<Self, LocateError> {
        Self::with_base_url(settings, DEFAULT_FREEGEOIP_URL)
    }

    /// Creates a locator against a custom endpoint (self-hosted mirrors, wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Http`] if the HTTP client cannot be constructed,
    /// or [`LocateError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(settings: &ProviderSettings, base_url: &str) -> Result<Self, LocateError> {
        Ok(Self {
            client: settings.build_client()?,
            base_url: normalise_base_url(base_url)?,
            throttle: RequestThrottle::new(settings.throttle),
        })
    }

    fn url_for(&self, address: &str) -> Result<Url, LocateError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LocateError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot take a path".to_string(),
            })?
            .pop_if_empty()
            .push(address);
        Ok(url)
    }
}

#[async_trait]
impl<S: Subject> GeoLocator<S> for FreeGeoIpLocator {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError> {
        let url = self.url_for(&subject.to_string())?;
        self.throttle.wait_for_slot().await;
        tracing::debug!(provider = PROVIDER, subject = %subject, "requesting location");

        let response = self.client.get(url.clone()).send().await?;
        let body = read_body(PROVIDER, response, &url).await?;
        let parsed: FreeGeoIpResponse =
            serde_json::from_str(&body).map_err(|e| LocateError::Deserialize {
                context: format!("{PROVIDER} response for {subject}"),
                source: e,
            })?;

        Ok(located(
            subject.clone(),
            parsed.country_name,
            parsed.city,
            parsed.latitude,
            parsed.longitude,
        ))
    }

    fn is_available(&self) -> bool {
        true
    }
}
