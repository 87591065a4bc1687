//! HTTP geo-location providers.

mod freegeoip;
mod ipinfodb;
mod maxmind;
mod types;

use std::time::Duration;

use geotrace_core::{AppConfig, GeoLocation, Subject, KEY_CITY, KEY_COUNTRY};
use reqwest::{Client, Response, StatusCode, Url};

use crate::error::LocateError;

pub use freegeoip::FreeGeoIpLocator;
pub use ipinfodb::IpInfoDbLocator;
pub use maxmind::MaxMindLocator;

/// Country name providers report for reserved or private address blocks.
const RESERVED_COUNTRY: &str = "Reserved";

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Connection settings shared by all providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Minimum spacing between two requests from the same provider instance.
    pub throttle: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "geotrace/0.1 (ip-mapper)".to_string(),
            throttle: Duration::from_millis(300),
        }
    }
}

impl ProviderSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            throttle: Duration::from_millis(config.throttle_ms),
        }
    }

    fn build_client(&self) -> Result<Client, LocateError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?)
    }
}

/// Parses `base_url`, ensuring it ends with exactly one slash.
fn normalise_base_url(base_url: &str) -> Result<Url, LocateError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| LocateError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// `url` without its query string, for error messages (queries may carry API keys).
fn display_url(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

/// Maps HTTP failures to [`LocateError`] and returns the body of a 2xx response.
async fn read_body(provider: &'static str, response: Response, url: &Url) -> Result<String, LocateError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(LocateError::RateLimited {
            provider,
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(LocateError::UnexpectedStatus {
            status: status.as_u16(),
            url: display_url(url),
        });
    }

    Ok(response.text().await?)
}

/// Builds the result for a provider answer; reserved address blocks are unlocatable.
fn located<S: Subject>(
    subject: S,
    country: Option<String>,
    city: Option<String>,
    latitude: f64,
    longitude: f64,
) -> GeoLocation<S> {
    let country = country.unwrap_or_default();
    if country == RESERVED_COUNTRY {
        tracing::debug!(subject = %subject, "address is in a reserved block");
        return GeoLocation::invalid(subject);
    }
    GeoLocation::new(subject, latitude, longitude)
        .set_parameter(KEY_CITY, city.unwrap_or_default())
        .set_parameter(KEY_COUNTRY, country)
}
