use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod db;
mod display;
mod error;
pub mod extract;
pub mod matcher;
pub mod normalize;
pub mod report;
mod row;

pub use db::Database;
pub use display::{create_client_table, create_comps_table, create_history_table, format_listing};
pub use error::{HomesenseError, Result};
pub use extract::{extract_query, ListingQuery};
pub use matcher::{score_candidate, select_best, MatchResult};
pub use normalize::{estimate_tax, normalize, NormalizedListing};
pub use report::{generate_report, ListingReport};
pub use row::{read_csv_rows, CandidateRow, FieldValue};

/// Financial inputs used for the affordability fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub income: f64,
    pub monthly_debt: f64,
    pub savings: f64,
    pub credit_score: u16,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            income: 0.0,
            monthly_debt: 0.0,
            savings: 0.0,
            credit_score: 700,
        }
    }
}

/// A realtor's client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Option<i64>,
    pub realtor_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub profile: ClientProfile,
    pub preferences: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(realtor_id: impl Into<String>, name: impl Into<String>, profile: ClientProfile) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            realtor_id: realtor_id.into(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            profile,
            preferences: String::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A saved listing analysis: the URL, the normalized listing and its report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: Option<i64>,
    pub realtor_id: String,
    pub client_id: i64,
    pub url: String,
    pub listing: NormalizedListing,
    pub result: ListingReport,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    pub fn new(
        realtor_id: impl Into<String>,
        client_id: i64,
        url: impl Into<String>,
        listing: NormalizedListing,
        result: ListingReport,
    ) -> Self {
        Self {
            id: None,
            realtor_id: realtor_id.into(),
            client_id,
            url: url.into(),
            listing,
            result,
            created_at: Utc::now(),
        }
    }
}

/// A nearby listing offered as an alternative in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparable {
    pub street: String,
    pub price: f64,
    pub beds: i64,
    pub baths: f64,
    pub sqft: i64,
    pub status: String,
}

impl Comparable {
    /// Summary of a raw area-search row; `None` when it has no positive price.
    pub fn from_row(row: &CandidateRow) -> Option<Self> {
        let price = row.number("list_price").filter(|p| *p > 0.0)?;
        Some(Self {
            street: row.text("street").unwrap_or_else(|| "Unknown".to_string()),
            price,
            beds: row.get("beds").as_i64().unwrap_or(0),
            baths: row.number("full_baths").unwrap_or(0.0),
            sqft: row.get("sqft").as_i64().unwrap_or(0),
            status: row.text("status").unwrap_or_default().to_uppercase(),
        })
    }
}
