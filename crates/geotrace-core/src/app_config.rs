use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub cache_path: PathBuf,
    pub maps_path: Option<PathBuf>,
    pub map_name: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub throttle_ms: u64,
    pub freegeoip_url: String,
    pub ipinfodb_url: String,
    pub ipinfodb_api_key: Option<String>,
    /// GeoLite2/GeoIP2 City database consulted before the HTTP providers.
    pub maxmind_db_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("cache_path", &self.cache_path)
            .field("maps_path", &self.maps_path)
            .field("map_name", &self.map_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("throttle_ms", &self.throttle_ms)
            .field("freegeoip_url", &self.freegeoip_url)
            .field("ipinfodb_url", &self.ipinfodb_url)
            .field(
                "ipinfodb_api_key",
                &self.ipinfodb_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("maxmind_db_path", &self.maxmind_db_path)
            .finish()
    }
}
