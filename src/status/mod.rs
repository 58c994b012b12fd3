// src/status/mod.rs
//
// "Fetch external status" is one capability with two interchangeable
// mechanisms behind it: a direct HTTP call, and a headless-browser render
// for deployments where the registry blocks machine clients. Which one runs
// is picked once from configuration; callers never see the difference.
pub mod browser;
pub mod direct;

use std::time::Duration;

use log::error;

use crate::config::{Config, FetchStrategy};
use crate::models::snapshot::StatusResult;

pub(crate) fn endpoint(base_url: &str, server_id: &str) -> String {
    format!("{}/api/servers/single/{}", base_url, server_id)
}

/// Anything that can resolve a server identifier to a status result. The
/// snapshot builder only depends on this.
pub trait StatusSource {
    async fn fetch(&self, server_id: &str) -> StatusResult;
}

/// Live status client, built once at startup and shared across connections.
pub struct StatusClient {
    strategy: FetchStrategy,
    direct: direct::DirectFetcher,
    base_url: String,
    timeout: Duration,
}

impl StatusClient {
    pub fn new(config: &Config) -> Self {
        Self {
            strategy: config.fetch_strategy,
            direct: direct::DirectFetcher::new(
                config.registry_base_url.clone(),
                config.status_timeout(),
            ),
            base_url: config.registry_base_url.clone(),
            timeout: config.status_timeout(),
        }
    }
}

impl StatusSource for StatusClient {
    async fn fetch(&self, server_id: &str) -> StatusResult {
        let result = match self.strategy {
            FetchStrategy::Direct => self.direct.fetch(server_id).await,
            FetchStrategy::Browser => {
                browser::fetch(&self.base_url, server_id, self.timeout).await
            }
        };

        match result {
            Ok(payload) => StatusResult::Payload(payload),
            Err(e) => {
                error!("status fetch for {} failed: {}", server_id, e);
                StatusResult::Error
            }
        }
    }
}
