use crate::{HomesenseError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Suffix that follows the numeric listing id in identifier-bearing URLs.
pub const IDENTIFIER_SUFFIX: &str = "_zpid";

static LISTING_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:homedetails|realestateandhomes-detail)/([^?#]+)")
        .expect("listing slug pattern is valid")
});

static LISTING_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)_zpid").expect("identifier pattern is valid"));

/// Search inputs derived from a listing URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    raw_url: String,
    search_text: String,
    identifier: Option<String>,
    house_number: Option<String>,
}

impl ListingQuery {
    /// Builds a query from already-known parts; `house_number` is derived.
    pub fn from_parts(
        raw_url: impl Into<String>,
        search_text: impl Into<String>,
        identifier: Option<String>,
    ) -> Self {
        let search_text = search_text.into();
        let house_number = leading_number(&search_text);
        Self {
            raw_url: raw_url.into(),
            search_text,
            identifier,
            house_number,
        }
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn house_number(&self) -> Option<&str> {
        self.house_number.as_deref()
    }
}

/// Turns a listing URL into a search query.
///
/// Supports the `/homedetails/<slug>` and `/realestateandhomes-detail/<slug>`
/// shapes. The slug is cut at its first `/` or `_` and hyphens become spaces,
/// so `1616-N-2100-W-Provo-UT-84604` reads back as `1616 N 2100 W Provo UT 84604`.
pub fn extract_query(url: &str) -> Result<ListingQuery> {
    let slug = LISTING_SLUG
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| HomesenseError::UnparseableUrl(url.to_string()))?;

    let slug = slug.split(['/', '_']).next().unwrap_or_default();
    let search_text = slug.replace('-', " ");
    if search_text.trim().is_empty() {
        return Err(HomesenseError::UnparseableUrl(url.to_string()));
    }

    Ok(ListingQuery::from_parts(url, search_text, extract_identifier(url)))
}

/// Finds the numeric listing id (`.../<digits>_zpid/`) anywhere in the URL.
pub fn extract_identifier(url: &str) -> Option<String> {
    LISTING_IDENTIFIER
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lower-cases and keeps only ASCII letters and digits.
pub fn normalize_address(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Splits text into lower-cased alphanumeric tokens.
pub fn address_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn leading_number(text: &str) -> Option<String> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}
