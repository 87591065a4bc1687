use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_FREEGEOIP_URL: &str = "http://freegeoip.net/json/";
pub const DEFAULT_IPINFODB_URL: &str = "http://api.ipinfodb.com/v3/ip-city/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("GEOTRACE_LOG_LEVEL", "info");
    let cache_path = PathBuf::from(or_default("GEOTRACE_CACHE_PATH", "geolocation.cache"));
    let maps_path = optional("GEOTRACE_MAPS_PATH").map(PathBuf::from);
    let map_name = or_default("GEOTRACE_MAP", "miller");

    let request_timeout_secs = parse_u64("GEOTRACE_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GEOTRACE_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("GEOTRACE_USER_AGENT", "geotrace/0.1 (ip-mapper)");
    let throttle_ms = parse_u64("GEOTRACE_THROTTLE_MS", "300")?;

    let freegeoip_url = or_default("GEOTRACE_FREEGEOIP_URL", DEFAULT_FREEGEOIP_URL);
    let ipinfodb_url = or_default("GEOTRACE_IPINFODB_URL", DEFAULT_IPINFODB_URL);
    let ipinfodb_api_key = optional("IPINFODB_API_KEY");
    let maxmind_db_path = optional("GEOTRACE_MAXMIND_DB").map(PathBuf::from);

    Ok(AppConfig {
        log_level,
        cache_path,
        maps_path,
        map_name,
        request_timeout_secs,
        user_agent,
        throttle_ms,
        freegeoip_url,
        ipinfodb_url,
        ipinfodb_api_key,
        maxmind_db_path,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
