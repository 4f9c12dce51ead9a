pub mod homeharvest;
pub mod snapshot;

use async_trait::async_trait;
use homesense_core::{
    extract_query, normalize, select_best, CandidateRow, Comparable, HomesenseError, ListingQuery,
    NormalizedListing, Result,
};
use std::fmt;
use tracing::{debug, info, warn};

pub use homeharvest::HomeHarvestOracle;
pub use snapshot::SnapshotOracle;

/// Listing statuses the search oracle can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    ForSale,
    Pending,
    Sold,
    OffMarket,
}

impl ListingStatus {
    /// Status set for single-listing lookups, so sold or pending homes are
    /// still found by address.
    pub const LOOKUP: [ListingStatus; 4] = [
        ListingStatus::ForSale,
        ListingStatus::Pending,
        ListingStatus::Sold,
        ListingStatus::OffMarket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::ForSale => "for_sale",
            ListingStatus::Pending => "pending",
            ListingStatus::Sold => "sold",
            ListingStatus::OffMarket => "off_market",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub location: String,
    pub statuses: Vec<ListingStatus>,
}

impl SearchRequest {
    pub fn new(location: impl Into<String>, statuses: &[ListingStatus]) -> Self {
        Self {
            location: location.into(),
            statuses: statuses.to_vec(),
        }
    }

    /// Request used to resolve one listing from its derived address.
    pub fn listing_lookup(query: &ListingQuery) -> Self {
        Self::new(query.search_text(), &ListingStatus::LOOKUP)
    }

    /// Request for homes currently for sale in a city.
    pub fn area(city: &str, state: &str) -> Self {
        Self::new(format!("{}, {}", city, state), &[ListingStatus::ForSale])
    }

    pub fn statuses_param(&self) -> String {
        self.statuses
            .iter()
            .map(ListingStatus::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Outcome of resolving a listing URL.
#[derive(Debug, Clone)]
pub struct ListingLookup {
    pub query: ListingQuery,
    pub listing: NormalizedListing,
    pub match_index: usize,
    pub match_score: u32,
    pub candidates: usize,
}

/// Upper bound of the comps price filter never drops below this.
const MIN_COMPS_PRICE_CAP: f64 = 1_000_000.0;
const COMPS_PRICE_CAP_FACTOR: f64 = 5.0;

/// External listing search: a location text and statuses in, raw rows out.
#[async_trait]
pub trait SearchOracle: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs one search. Any error is an oracle fault.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateRow>>;

    /// Runs a search under an explicit failure policy. Critical callers get
    /// faults as [`HomesenseError::OracleFault`]; best-effort callers get an
    /// empty result instead.
    async fn search_with_policy(
        &self,
        request: &SearchRequest,
        critical: bool,
    ) -> Result<Vec<CandidateRow>> {
        match self.search(request).await {
            Ok(rows) => Ok(rows),
            Err(err) if critical => Err(match err {
                HomesenseError::OracleFault(_) => err,
                other => HomesenseError::OracleFault(other.to_string()),
            }),
            Err(err) => {
                warn!("{} search for '{}' failed, continuing without results: {}", self.name(), request.location, err);
                Ok(Vec::new())
            }
        }
    }

    /// Resolves a listing URL to one normalized listing.
    async fn lookup_listing(&self, url: &str) -> Result<ListingLookup> {
        let query = extract_query(url)?;
        info!("Searching {} for: {}", self.name(), query.search_text());

        let rows = self
            .search_with_policy(&SearchRequest::listing_lookup(&query), true)
            .await?;
        debug!("{} returned {} candidates", self.name(), rows.len());

        let best = select_best(&rows, &query)?;
        info!("Selected candidate {} of {} with score {}", best.index, rows.len(), best.score);

        Ok(ListingLookup {
            listing: normalize(best.row),
            match_index: best.index,
            match_score: best.score,
            candidates: rows.len(),
            query,
        })
    }

    /// Comparable homes for sale in the same city. Best effort: faults and
    /// missing locations yield an empty list.
    async fn area_comps(&self, city: &str, state: &str, max_results: usize) -> Vec<Comparable> {
        if is_placeholder(city) || is_placeholder(state) {
            return Vec::new();
        }

        let rows = self
            .search_with_policy(&SearchRequest::area(city, state), false)
            .await
            .unwrap_or_default();

        select_comps(&rows, max_results)
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("unknown") || value.eq_ignore_ascii_case("n/a")
}

/// Keeps priced rows below `max(median * 5, 1_000_000)`, in input order.
pub fn select_comps(rows: &[CandidateRow], max_results: usize) -> Vec<Comparable> {
    let comps: Vec<Comparable> = rows.iter().filter_map(Comparable::from_row).collect();

    let mut prices: Vec<f64> = comps.iter().map(|c| c.price).collect();
    let price_cap = median(&mut prices)
        .map(|typical| (typical * COMPS_PRICE_CAP_FACTOR).max(MIN_COMPS_PRICE_CAP));

    comps
        .into_iter()
        .filter(|c| price_cap.map_or(true, |cap| c.price <= cap))
        .take(max_results)
        .collect()
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
