use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.cache_path, PathBuf::from("geolocation.cache"));
    assert!(cfg.maps_path.is_none());
    assert_eq!(cfg.map_name, "miller");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "geotrace/0.1 (ip-mapper)");
    assert_eq!(cfg.throttle_ms, 300);
    assert_eq!(cfg.freegeoip_url, DEFAULT_FREEGEOIP_URL);
    assert_eq!(cfg.ipinfodb_url, DEFAULT_IPINFODB_URL);
    assert!(cfg.ipinfodb_api_key.is_none());
    assert!(cfg.maxmind_db_path.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("GEOTRACE_CACHE_PATH", "/tmp/geo.cache");
    map.insert("GEOTRACE_MAPS_PATH", "./config/maps.yaml");
    map.insert("GEOTRACE_MAP", "robinson");
    map.insert("GEOTRACE_THROTTLE_MS", "1000");
    map.insert("IPINFODB_API_KEY", "secret");
    map.insert("GEOTRACE_MAXMIND_DB", "/var/lib/GeoLite2-City.mmdb");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.cache_path, PathBuf::from("/tmp/geo.cache"));
    assert_eq!(cfg.maps_path, Some(PathBuf::from("./config/maps.yaml")));
    assert_eq!(cfg.map_name, "robinson");
    assert_eq!(cfg.throttle_ms, 1000);
    assert_eq!(cfg.ipinfodb_api_key.as_deref(), Some("secret"));
    assert_eq!(cfg.maxmind_db_path, Some(PathBuf::from("/var/lib/GeoLite2-City.mmdb")));
}

#[test]
fn blank_api_key_is_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("IPINFODB_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.ipinfodb_api_key.is_none());
}

#[test]
fn invalid_throttle_is_rejected() {
    let mut map = HashMap::new();
    map.insert("GEOTRACE_THROTTLE_MS", "fast");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GEOTRACE_THROTTLE_MS"),
        "expected InvalidEnvVar(GEOTRACE_THROTTLE_MS), got: {result:?}"
    );
}

#[test]
fn zero_request_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("GEOTRACE_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GEOTRACE_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(GEOTRACE_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("IPINFODB_API_KEY", "super-secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("super-secret-key"));
    assert!(debug.contains("[redacted]"));
}
