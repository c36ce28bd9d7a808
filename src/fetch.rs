//! HTTP fetcher for the pull-example-site action

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{Error, Result};

/// Fetches a remote resource over HTTP.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SiteFetcher: Send + Sync {
    /// Fetch the body at `url`, failing on non-success status
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher
pub struct HttpSiteFetcher {
    client: reqwest::Client,
}

impl HttpSiteFetcher {
    /// Create a fetcher with default client settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpSiteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteFetcher for HttpSiteFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        Ok(body.to_vec())
    }
}
