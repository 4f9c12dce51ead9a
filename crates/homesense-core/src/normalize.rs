use crate::{CandidateRow, FieldValue};
use serde::{Deserialize, Serialize};

const TEXAS_TAX_RATE: f64 = 0.021;
const DEFAULT_TAX_RATE: f64 = 0.012;

/// Listing record with every field resolved to a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    pub price: f64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub beds: i64,
    pub baths: f64,
    pub sqft: i64,
    pub year_built: i64,
    pub status: String,
    pub hoa_monthly: f64,
    pub fips_code: String,
    pub days_on_mls: i64,
    pub tax_annual: f64,
    pub tax_estimated: bool,
    pub nearby_schools: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub property_url: String,
}

impl NormalizedListing {
    pub fn address_line(&self) -> String {
        let street = if self.street.is_empty() { "Unknown street" } else { &self.street };
        format!("{}, {}, {} {}", street, self.city, self.state, self.zip_code)
    }

    /// Raw row equivalent of this record. An estimated tax is left out so that
    /// normalizing the row estimates it again.
    pub fn to_row(&self) -> CandidateRow {
        let mut row = CandidateRow::new()
            .with("list_price", self.price)
            .with("street", self.street.as_str())
            .with("city", self.city.as_str())
            .with("state", self.state.as_str())
            .with("zip_code", self.zip_code.as_str())
            .with("beds", self.beds)
            .with("full_baths", self.baths)
            .with("sqft", self.sqft)
            .with("year_built", self.year_built)
            .with("status", self.status.as_str())
            .with("hoa_fee", self.hoa_monthly)
            .with("fips_code", self.fips_code.as_str())
            .with("days_on_mls", self.days_on_mls)
            .with("nearby_schools", self.nearby_schools.clone())
            .with("latitude", self.latitude)
            .with("longitude", self.longitude)
            .with("property_url", self.property_url.as_str());
        if !self.tax_estimated {
            row.insert("tax", self.tax_annual);
        }
        row
    }
}

/// Rough annual property tax for listings that do not report one.
pub fn estimate_tax(price: f64, state: &str) -> f64 {
    if state == "TX" {
        price * TEXAS_TAX_RATE
    } else {
        price * DEFAULT_TAX_RATE
    }
}

/// Coerces a raw row into a [`NormalizedListing`]. Never fails: anything
/// missing or unparseable takes its default.
pub fn normalize(row: &CandidateRow) -> NormalizedListing {
    let price = row.number("list_price").unwrap_or(0.0);
    let state = text_or(row, "state", "N/A");

    let (tax_annual, tax_estimated) = match row.number("tax") {
        Some(tax) => (tax, false),
        None => (estimate_tax(price, &state), true),
    };

    NormalizedListing {
        price,
        street: text_or(row, "street", ""),
        city: text_or(row, "city", "Unknown"),
        zip_code: text_or(row, "zip_code", "N/A"),
        beds: int_or_zero(row, "beds"),
        baths: row.number("full_baths").unwrap_or(0.0),
        sqft: int_or_zero(row, "sqft"),
        year_built: int_or_zero(row, "year_built"),
        status: text_or(row, "status", "UNKNOWN").to_uppercase(),
        hoa_monthly: row.number("hoa_fee").unwrap_or(0.0),
        fips_code: text_or(row, "fips_code", "N/A"),
        days_on_mls: int_or_zero(row, "days_on_mls"),
        tax_annual,
        tax_estimated,
        nearby_schools: school_names(row.get("nearby_schools")),
        latitude: row.number("latitude").unwrap_or(0.0),
        longitude: row.number("longitude").unwrap_or(0.0),
        property_url: text_or(row, "property_url", ""),
        state,
    }
}

fn text_or(row: &CandidateRow, field: &str, default: &str) -> String {
    row.text(field).unwrap_or_else(|| default.to_string())
}

fn int_or_zero(row: &CandidateRow, field: &str) -> i64 {
    row.get(field).as_i64().unwrap_or(0)
}

fn school_names(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::List(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                serde_json::Value::String(name) => name.clone(),
                other => other.to_string(),
            })
            .collect(),
        FieldValue::Text(text) if !value.is_unknown() => text
            .split([';', ','])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
