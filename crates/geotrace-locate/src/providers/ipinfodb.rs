use async_trait::async_trait;
use geotrace_core::config::DEFAULT_IPINFODB_URL;
use geotrace_core::{GeoLocation, Subject};
use reqwest::{Client, Url};

use super::types::{IpInfoDbResponse, IpInfoDbStatus};
use super::{located, normalise_base_url, read_body, ProviderSettings};
use crate::error::LocateError;
use crate::locator::GeoLocator;
use crate::throttle::RequestThrottle;

const PROVIDER: &str = "ipinfodb";

/// Locator for the IPInfoDB `ip-city` API. Available only with an API key.
pub struct IpInfoDbLocator {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    throttle: RequestThrottle,
}

impl std::fmt::Debug for IpInfoDbLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpInfoDbLocator")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl IpInfoDbLocator {
    /// # Errors
    ///
    /// Returns [`LocateError::Http`] if the HTTP client cannot be constructed.
    pub fn new(settings: &ProviderSettings, api_key: Option<String>) -> Result<Self, LocateError> {
        Self::with_base_url(settings, api_key, DEFAULT_IPINFODB_URL)
    }

    /// # Errors
    ///
    /// Returns [`LocateError::Http`] if the HTTP client cannot be constructed,
    /// or [`LocateError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        settings: &ProviderSettings,
        api_key: Option<String>,
        base_url: &str,
    ) -> Result<Self, LocateError> {
        Ok(Self {
            client: settings.build_client()?,
            base_url: normalise_base_url(base_url)?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            throttle: RequestThrottle::new(settings.throttle),
        })
    }

    fn build_url(&self, api_key: &str, address: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("key", api_key)
            .append_pair("ip", address);
        url
    }
}

#[async_trait]
impl<S: Subject> GeoLocator<S> for IpInfoDbLocator {
    async fn locate(&self, subject: &S) -> Result<GeoLocation<S>, LocateError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LocateError::MissingApiKey { provider: PROVIDER })?;
        let url = self.build_url(api_key, &subject.to_string());
        self.throttle.wait_for_slot().await;
        tracing::debug!(provider = PROVIDER, subject = %subject, "requesting location");

        let response = self.client.get(url.clone()).send().await?;
        let body = read_body(PROVIDER, response, &url).await?;
        let parse_error = |e: serde_json::Error| LocateError::Deserialize {
            context: format!("{PROVIDER} response for {subject}"),
            source: e,
        };
        let status: IpInfoDbStatus = serde_json::from_str(&body).map_err(parse_error)?;
        if status
            .status_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case("ERROR"))
        {
            return Err(LocateError::ApiError {
                provider: PROVIDER,
                message: status.status_message.unwrap_or_default(),
            });
        }

        let parsed: IpInfoDbResponse = serde_json::from_str(&body).map_err(parse_error)?;
        Ok(located(
            subject.clone(),
            parsed.country_name,
            parsed.city_name,
            parsed.latitude,
            parsed.longitude,
        ))
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
