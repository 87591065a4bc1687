//! Response shapes of the supported providers.

use serde::{Deserialize, Deserializer};

/// `GET {base}/{ip}` on freegeoip-compatible services.
#[derive(Debug, Deserialize)]
pub(super) struct FreeGeoIpResponse {
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

/// Status fields every IPInfoDB answer carries, error answers included.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IpInfoDbStatus {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// IPInfoDB `ip-city` response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IpInfoDbResponse {
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts `51.0`, `51`, and `"51.0"`. `NaN` and infinities are rejected.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!("coordinate must be finite, got {value}")))
    }
}
