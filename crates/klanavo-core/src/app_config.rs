use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub ors_api_key: Option<String>,
    pub ors_base_url: String,
    pub nominatim_base_url: String,
    pub listings_base_url: String,
    pub country_code: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub geocoder_user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_concurrent_fetches: usize,
    pub admission_interval_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "ors_api_key",
                &self.ors_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ors_base_url", &self.ors_base_url)
            .field("nominatim_base_url", &self.nominatim_base_url)
            .field("listings_base_url", &self.listings_base_url)
            .field("country_code", &self.country_code)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .field("admission_interval_ms", &self.admission_interval_ms)
            .finish()
    }
}
