//! E2E Test Harness
//!
//! Wraps an [`ApiClient`] configured from `PROVISIONING_*` environment
//! variables and waits for the server to answer before tests start.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use provisioning_e2e::telemetry::init_tracing;
use provisioning_e2e::{ApiClient, HarnessConfig};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// E2E test harness for a deployed provisioning server
#[derive(Clone)]
pub struct E2EHarness {
    /// Typed API client
    pub client: ApiClient,
    /// Configuration the client was built from
    pub config: HarnessConfig,
}

/// Body of `GET /api/status`
#[derive(Debug, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub api_version: Option<u32>,
}

impl E2EHarness {
    /// Create harness from environment variables
    pub fn from_env() -> Self {
        let config = HarnessConfig::from_env().expect("Invalid PROVISIONING_* configuration");
        Self::with_config(config)
    }

    /// Create a harness for an explicit configuration
    pub fn with_config(config: HarnessConfig) -> Self {
        init_tracing(&config).expect("Failed to initialize logging");
        let client = ApiClient::new(&config).expect("Failed to create API client");
        Self { client, config }
    }

    /// Fetch server status
    pub async fn status(&self) -> Result<ServerStatus> {
        Ok(self.client.get("status").await?)
    }

    /// Wait for the server to answer its status endpoint
    ///
    /// Polls every 500ms until the status call succeeds or timeout expires.
    pub async fn wait_reachable(&self, timeout: Duration) -> Result<ServerStatus> {
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            if let Ok(status) = self.status().await {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        Err(anyhow!(
            "Server at {} not reachable within timeout",
            self.config.base_url
        ))
    }
}
