use async_trait::async_trait;
use homesense_core::{CandidateRow, HomesenseError, Result};
use homesense_scrapers::{ListingStatus, SearchOracle, SearchRequest, SnapshotOracle};
use std::sync::Mutex;

const PROVO_URL: &str =
    "https://www.zillow.com/homedetails/1616-N-2100-W-Provo-UT-84604/11901038_zpid/";

/// Records every request and answers with a fixed result set.
struct RecordingOracle {
    rows: Vec<CandidateRow>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl RecordingOracle {
    fn new(rows: Vec<CandidateRow>) -> Self {
        Self {
            rows,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchOracle for RecordingOracle {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateRow>> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.rows.clone())
    }
}

/// Fails every search, like a blocked or rate-limited service.
struct FailingOracle;

#[async_trait]
impl SearchOracle for FailingOracle {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn search(&self, _request: &SearchRequest) -> Result<Vec<CandidateRow>> {
        Err(HomesenseError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

fn provo_row(street: &str, price: f64, property_url: &str) -> CandidateRow {
    CandidateRow::new()
        .with("street", street)
        .with("city", "Provo")
        .with("state", "UT")
        .with("zip_code", "84604")
        .with("list_price", price)
        .with("status", "FOR_SALE")
        .with("property_url", property_url)
}

#[tokio::test]
async fn test_lookup_prefers_identifier_over_address() {
    let oracle = RecordingOracle::new(vec![
        provo_row("1616 N 2100 W", 425000.0, "https://www.zillow.com/homedetails/a/99999999_zpid/"),
        provo_row("1600 N 2100 W", 410000.0, "https://www.zillow.com/homedetails/b/11901038_zpid/"),
    ]);

    let lookup = oracle.lookup_listing(PROVO_URL).await.unwrap();

    assert_eq!(lookup.match_index, 1);
    assert_eq!(lookup.listing.street, "1600 N 2100 W");
    assert_eq!(lookup.query.identifier(), Some("11901038"));

    let requests = oracle.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].location, "1616 N 2100 W Provo UT 84604");
    assert_eq!(requests[0].statuses, ListingStatus::LOOKUP.to_vec());
}

#[tokio::test]
async fn test_lookup_estimates_missing_tax() {
    let oracle = SnapshotOracle::new(vec![provo_row("1616 N 2100 W", 300000.0, "")]);

    let lookup = oracle.lookup_listing(PROVO_URL).await.unwrap();
    assert!(lookup.listing.tax_estimated);
    assert_eq!(lookup.listing.tax_annual, 3600.0);
}

#[tokio::test]
async fn test_lookup_with_no_results() {
    let oracle = SnapshotOracle::default();
    let result = oracle.lookup_listing(PROVO_URL).await;
    assert!(matches!(result, Err(HomesenseError::NoCandidates(_))));
}

#[tokio::test]
async fn test_lookup_rejects_unsupported_url_before_searching() {
    let oracle = RecordingOracle::new(vec![provo_row("1616 N 2100 W", 425000.0, "")]);

    let result = oracle.lookup_listing("https://www.zillow.com/homes/Provo,-UT_rb/").await;
    assert!(matches!(result, Err(HomesenseError::UnparseableUrl(_))));
    assert!(oracle.requests().is_empty());
}

#[tokio::test]
async fn test_lookup_propagates_oracle_fault() {
    let result = FailingOracle.lookup_listing(PROVO_URL).await;
    assert!(matches!(result, Err(HomesenseError::OracleFault(_))));
}

#[tokio::test]
async fn test_policy_wrapper() {
    let request = SearchRequest::area("Provo", "UT");

    let critical = FailingOracle.search_with_policy(&request, true).await;
    assert!(matches!(critical, Err(HomesenseError::OracleFault(_))));

    let best_effort = FailingOracle.search_with_policy(&request, false).await.unwrap();
    assert!(best_effort.is_empty());
}

#[tokio::test]
async fn test_area_comps_are_best_effort() {
    assert!(FailingOracle.area_comps("Provo", "UT", 5).await.is_empty());
}

#[tokio::test]
async fn test_area_comps_search_city_for_sale() {
    let oracle = RecordingOracle::new(vec![
        provo_row("22 Oak Ave", 389000.0, ""),
        provo_row("5 Pine St", f64::NAN, ""),
        provo_row("7 Elm St", 415000.0, ""),
    ]);

    let comps = oracle.area_comps("Provo", "UT", 5).await;
    assert_eq!(comps.len(), 2);
    assert_eq!(comps[0].street, "22 Oak Ave");

    let requests = oracle.requests();
    assert_eq!(requests[0].location, "Provo, UT");
    assert_eq!(requests[0].statuses, vec![ListingStatus::ForSale]);
}

#[tokio::test]
async fn test_area_comps_skip_unknown_location() {
    let oracle = RecordingOracle::new(vec![provo_row("22 Oak Ave", 389000.0, "")]);

    assert!(oracle.area_comps("Unknown", "UT", 5).await.is_empty());
    assert!(oracle.area_comps("Provo", "N/A", 5).await.is_empty());
    assert!(oracle.requests().is_empty());
}
