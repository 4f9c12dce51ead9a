use crate::{SearchOracle, SearchRequest};
use async_trait::async_trait;
use homesense_core::{CandidateRow, HomesenseError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Search oracle backed by an HTTP listing-search service.
///
/// The service answers `GET {base}/search?location=..&listing_type=a,b` with a
/// JSON array of row objects keyed by field name.
#[derive(Debug)]
pub struct HomeHarvestOracle {
    client: Client,
    base_url: Url,
}

impl HomeHarvestOracle {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    pub fn search_url(&self, request: &SearchRequest) -> Result<Url> {
        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("location", &request.location)
            .append_pair("listing_type", &request.statuses_param());
        Ok(url)
    }
}

#[async_trait]
impl SearchOracle for HomeHarvestOracle {
    fn name(&self) -> &'static str {
        "homeharvest"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateRow>> {
        let url = self.search_url(request)?;
        info!("Requesting {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HomesenseError::OracleFault(e.to_string()))?
            .error_for_status()
            .map_err(|e| HomesenseError::OracleFault(e.to_string()))?;

        let rows = response
            .json::<Vec<CandidateRow>>()
            .await
            .map_err(|e| HomesenseError::OracleFault(e.to_string()))?;

        debug!("Received {} rows for '{}'", rows.len(), request.location);
        Ok(rows)
    }
}
