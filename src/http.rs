//! HTTP transport for drive metadata and content requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{DriveError, Result};

/// reqwest-backed [`Client`] talking to the configured drive endpoints.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client for the default endpoints.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new HTTP client from a configuration.
    ///
    /// The proxy option is only honoured on native targets (not WASM).
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().timeout(config.timeout());

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| DriveError::InvalidConfig(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| DriveError::InvalidConfig(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl Client for HttpClient {
    fn metadata_url(&self, path: &str) -> String {
        join_url(&self.config.metadata_url, path)
    }

    fn content_url(&self, path: &str) -> String {
        join_url(&self.config.content_url, path)
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(self.client.execute(request).await?)
    }

    fn check_response(&self, response: &Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::HttpError(status.as_u16()));
        }
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.config.timeout()
    }
}
