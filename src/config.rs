use std::env;
use std::time::Duration;

/// Which mechanism the status fetcher uses against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Plain HTTP GET with a browser user-agent.
    Direct,
    /// Headless Chrome rendering the endpoint as a page.
    Browser,
}

impl FetchStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "browser" => Some(Self::Browser),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    // Upstream identifiers
    pub guild_id: String,
    pub fivem_server_id: String,

    // Upstream endpoints
    pub registry_base_url: String,
    pub community_api_url: String,
    pub community_token: String,

    // Broadcast cadence and status fetch behaviour
    pub update_interval_ms: u64,
    pub status_timeout_secs: u64,
    pub fetch_strategy: FetchStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            guild_id: String::new(),
            fivem_server_id: String::new(),
            registry_base_url: "https://servers-frontend.fivem.net".to_string(),
            community_api_url: "https://discord.com/api/v10".to_string(),
            community_token: String::new(),
            update_interval_ms: 5000,
            status_timeout_secs: 5,
            fetch_strategy: FetchStrategy::Direct,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            guild_id: env::var("GUILD_ID").unwrap_or_default(),

            fivem_server_id: env::var("FIVEM_SERVER_ID").unwrap_or_default(),

            registry_base_url: env::var("REGISTRY_BASE_URL")
                .unwrap_or_else(|_| "https://servers-frontend.fivem.net".to_string()),

            community_api_url: env::var("COMMUNITY_API_URL")
                .unwrap_or_else(|_| "https://discord.com/api/v10".to_string()),

            community_token: env::var("COMMUNITY_TOKEN").unwrap_or_default(),

            update_interval_ms: env::var("UPDATE_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),

            status_timeout_secs: env::var("STATUS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            fetch_strategy: env::var("FETCH_STRATEGY")
                .ok()
                .and_then(|v| FetchStrategy::parse(&v))
                .unwrap_or(FetchStrategy::Direct),
        }
    }

    pub fn update_interval(&self) -> Duration {
        // tokio panics on a zero interval
        Duration::from_millis(self.update_interval_ms.max(1))
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }
}
