//! Blocking HTTP client for the PanelApp API.

use super::{CatalogPanel, Panel, PanelProvider};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://panelapp.genomicsengland.co.uk/api/v1";

/// One page of the paginated `/panels/` listing.
#[derive(Debug, Clone, serde::Deserialize)]
struct CatalogPage {
    /// URL of the next page, if any.
    next: Option<String>,
    /// Catalog entries of this page.
    results: Vec<CatalogPanel>,
}

/// PanelApp client issuing serial, blocking requests.
///
/// The client implements no retry or backoff; failures propagate to the
/// caller.
pub struct PanelAppClient {
    /// API base URL without trailing slash.
    base_url: String,
    /// The underlying HTTP client.
    client: reqwest::blocking::Client,
}

impl PanelAppClient {
    /// Construct a client for the given API base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for PanelAppClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl PanelProvider for PanelAppClient {
    fn get_panel(&self, panel: &str, version: Option<&str>) -> Result<Option<Panel>, anyhow::Error> {
        let url = format!("{}/panels/{}/", self.base_url, panel);
        tracing::debug!("fetching panel from {}", &url);
        let mut request = self.client.get(&url);
        if let Some(version) = version {
            request = request.query(&[("version", version)]);
        }
        let response = request
            .send()
            .map_err(|e| anyhow::anyhow!("panel request failed: {}", e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let panel = response
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("panel request failed: {}", e))?
            .json()
            .map_err(|e| anyhow::anyhow!("problem parsing panel response: {}", e))?;
        Ok(Some(panel))
    }

    fn list_panels(&self) -> Result<Vec<CatalogPanel>, anyhow::Error> {
        let mut url = format!("{}/panels/", self.base_url);
        let mut result = Vec::new();
        // Follow the pagination links in serving order.
        loop {
            tracing::debug!("fetching catalog page {}", &url);
            let page: CatalogPage = self
                .client
                .get(&url)
                .send()
                .map_err(|e| anyhow::anyhow!("catalog request failed: {}", e))?
                .error_for_status()
                .map_err(|e| anyhow::anyhow!("catalog request failed: {}", e))?
                .json()
                .map_err(|e| anyhow::anyhow!("problem parsing catalog page: {}", e))?;
            result.extend(page.results);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        tracing::debug!("catalog has {} panels", result.len());
        Ok(result)
    }
}
