//! HTTP chart registry client
//!
//! Registries are plain HTTP servers exposing `<name>-<version>.tgz` files.

use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::error::{FetchError, Result};
use crate::fetcher::{ChartFetcher, archive_url};

/// Fetches chart archives over HTTP(S), blocking until the body is read
#[derive(Debug, Clone)]
pub struct HttpChartFetcher {
    client: Client,
}

impl HttpChartFetcher {
    /// Fetcher with default transport settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpChartFetcherBuilder {
        HttpChartFetcherBuilder::default()
    }
}

/// Transport settings for [`HttpChartFetcher`]
#[derive(Debug, Clone, Default)]
pub struct HttpChartFetcherBuilder {
    insecure_skip_tls: bool,
}

impl HttpChartFetcherBuilder {
    /// Skip TLS verification (insecure, for self-signed internal registries)
    pub fn insecure_skip_tls(mut self, skip: bool) -> Self {
        self.insecure_skip_tls = skip;
        self
    }

    pub fn build(self) -> Result<HttpChartFetcher> {
        let client = Client::builder()
            .user_agent(concat!("ankh/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(self.insecure_skip_tls)
            .build().map_err(|e| FetchError::Client {
            message: e.to_string(),
        })?;

        Ok(HttpChartFetcher { client })
    }
}

impl ChartFetcher for HttpChartFetcher {
    fn fetch(&self, registry: &str, name: &str, version: &str) -> Result<Vec<u8>> {
        let url = archive_url(registry, name, version)?;
        let url_str = url.to_string();

        tracing::info!(chart = name, version, url = %url_str, "fetching chart archive");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::from_reqwest(&url_str, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { url: url_str });
        }
        if !status.is_success() {
            return Err(FetchError::HttpError {
                status: status.as_u16(),
                url: url_str,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::from_reqwest(&url_str, e))?;

        tracing::debug!(chart = name, bytes = bytes.len(), "fetched chart archive");

        Ok(bytes.to_vec())
    }
}
