use serde::{Deserialize, Serialize};

/// Tunables for the shared HTTP client.
///
/// All durations are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpSettings {
    pub timeout: u32,
    #[serde(rename = "connectTimeout")]
    pub connect_timeout: u32,
    #[serde(rename = "idleConnTimeout")]
    pub idle_conn_timeout: u32,
    #[serde(rename = "maxIdleConnsPerHost")]
    pub max_idle_conns_per_host: u32,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            // Transfers stream through the same client, so the overall
            // timeout has to cover a large upload.
            timeout: 3600,
            connect_timeout: 10,
            idle_conn_timeout: 90,
            max_idle_conns_per_host: 8,
            user_agent: concat!("drivesh/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}
