//! The artifact fetcher seam

use url::Url;

use crate::error::{FetchError, Result};

/// Retrieves packaged charts from a registry
///
/// Implementations own their transport settings (TLS trust).
pub trait ChartFetcher {
    /// Fetch the `<name>-<version>.tgz` archive from `registry`
    fn fetch(&self, registry: &str, name: &str, version: &str) -> Result<Vec<u8>>;
}

impl<T: ChartFetcher + ?Sized> ChartFetcher for &T {
    fn fetch(&self, registry: &str, name: &str, version: &str) -> Result<Vec<u8>> {
        (**self).fetch(registry, name, version)
    }
}

/// File name of a packaged chart
pub fn archive_file_name(name: &str, version: &str) -> String {
    format!("{}-{}.tgz", name, version)
}

/// Full URL of a packaged chart in a registry
pub fn archive_url(registry: &str, name: &str, version: &str) -> Result<Url> {
    let base = registry.trim_end_matches('/');
    let raw = format!("{}/{}", base, archive_file_name(name, version));

    let url = Url::parse(&raw).map_err(|e| FetchError::InvalidRegistryUrl {
        url: registry.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidRegistryUrl {
            url: registry.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
