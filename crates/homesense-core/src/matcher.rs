use crate::extract::{address_tokens, normalize_address, IDENTIFIER_SUFFIX};
use crate::{CandidateRow, HomesenseError, ListingQuery, Result};
use std::collections::HashSet;
use tracing::debug;

/// The row's URL carries the requested listing id. Outweighs every address
/// signal combined.
pub const IDENTIFIER_MATCH: u32 = 1000;
/// Normalized row address equals the normalized search text.
pub const ADDRESS_EXACT: u32 = 100;
/// One normalized address contains the other (extra unit or directional tokens).
pub const ADDRESS_CONTAINS: u32 = 25;
/// Row street starts with the requested house number.
pub const HOUSE_NUMBER_MATCH: u32 = 20;
/// Upper bound on the shared-token fallback signal.
pub const MAX_TOKEN_OVERLAP: u32 = 50;
/// Row has a usable list price.
pub const PRICE_PRESENT: u32 = 1;

/// The single row picked for a query.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub row: &'a CandidateRow,
    pub index: usize,
    pub score: u32,
}

/// Picks the highest-scoring candidate. Ties keep the earliest row.
///
/// A score of zero is still a winner when nothing scored higher, so callers
/// must not read a non-zero score as confidence.
pub fn select_best<'a>(
    candidates: &'a [CandidateRow],
    query: &ListingQuery,
) -> Result<MatchResult<'a>> {
    let mut best: Option<MatchResult<'a>> = None;

    for (index, row) in candidates.iter().enumerate() {
        let score = score_candidate(row, query);
        debug!("Candidate {} scored {}", index, score);

        if best.map_or(true, |current| score > current.score) {
            best = Some(MatchResult { row, index, score });
        }
    }

    best.ok_or_else(|| HomesenseError::NoCandidates(query.search_text().to_string()))
}

/// Additive match score of one row against the query.
pub fn score_candidate(row: &CandidateRow, query: &ListingQuery) -> u32 {
    let mut score = 0;

    if identifier_matches(row, query) {
        score += IDENTIFIER_MATCH;
    }

    score += address_score(row, query);

    if house_number_matches(row, query) {
        score += HOUSE_NUMBER_MATCH;
    }

    if row.number("list_price").is_some() {
        score += PRICE_PRESENT;
    }

    score
}

fn identifier_matches(row: &CandidateRow, query: &ListingQuery) -> bool {
    let Some(identifier) = query.identifier() else {
        return false;
    };
    row.text("property_url")
        .map(|url| url.to_lowercase().contains(&format!("/{identifier}{IDENTIFIER_SUFFIX}")))
        .unwrap_or(false)
}

fn row_address(row: &CandidateRow) -> String {
    ["street", "city", "state", "zip_code"]
        .iter()
        .map(|field| row.text(field).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

fn address_score(row: &CandidateRow, query: &ListingQuery) -> u32 {
    let full_address = row_address(row);
    let row_normalized = normalize_address(&full_address);
    let target = normalize_address(query.search_text());

    if !row_normalized.is_empty() && !target.is_empty() {
        if row_normalized == target {
            return ADDRESS_EXACT;
        }
        if row_normalized.contains(&target) || target.contains(&row_normalized) {
            return ADDRESS_CONTAINS;
        }
    }

    let row_tokens: HashSet<String> = address_tokens(&full_address).into_iter().collect();
    let shared = address_tokens(query.search_text())
        .into_iter()
        .collect::<HashSet<_>>()
        .intersection(&row_tokens)
        .count() as u32;
    shared.min(MAX_TOKEN_OVERLAP)
}

fn house_number_matches(row: &CandidateRow, query: &ListingQuery) -> bool {
    let (Some(number), Some(street)) = (query.house_number(), row.text("street")) else {
        return false;
    };
    street
        .trim_start()
        .strip_prefix(number)
        .map(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_query;

    const PROVO_URL: &str =
        "https://www.zillow.com/homedetails/1616-N-2100-W-Provo-UT-84604/11901038_zpid/";

    fn provo_row(street: &str) -> CandidateRow {
        CandidateRow::new()
            .with("street", street)
            .with("city", "Provo")
            .with("state", "UT")
            .with("zip_code", "84604")
            .with("list_price", 425000.0)
    }

    #[test]
    fn test_empty_candidates() {
        let query = extract_query(PROVO_URL).unwrap();
        assert!(matches!(
            select_best(&[], &query),
            Err(HomesenseError::NoCandidates(_))
        ));
    }

    #[test]
    fn test_identifier_dominates_address() {
        let query = extract_query(PROVO_URL).unwrap();
        let candidates = vec![
            provo_row("1616 N 2100 W"),
            CandidateRow::new()
                .with("street", "9 Unrelated Ln")
                .with("city", "Orem")
                .with("property_url", "https://www.zillow.com/homedetails/x/11901038_zpid/"),
        ];

        let best = select_best(&candidates, &query).unwrap();
        assert_eq!(best.index, 1);
        assert!(best.score >= IDENTIFIER_MATCH);
    }

    #[test]
    fn test_exact_address_beats_token_overlap() {
        let query = ListingQuery::from_parts("", "1616 N 2100 W Provo UT 84604", None);
        let candidates = vec![
            provo_row("1620 N 2100 W"),
            provo_row("1616 N 2100 W"),
        ];

        let best = select_best(&candidates, &query).unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.score, ADDRESS_EXACT + HOUSE_NUMBER_MATCH + PRICE_PRESENT);
    }

    #[test]
    fn test_containment_with_unit_number() {
        let query = ListingQuery::from_parts("", "1616 N 2100 W Provo UT 84604", None);
        let row = provo_row("1616 N 2100 W Unit 4");
        assert_eq!(
            score_candidate(&row, &query),
            HOUSE_NUMBER_MATCH + PRICE_PRESENT + token_count("1616 N 2100 W Provo UT 84604")
        );

        let query = ListingQuery::from_parts("", "1616 N 2100 W", None);
        let row = provo_row("1616 N 2100 W");
        assert_eq!(
            score_candidate(&row, &query),
            ADDRESS_CONTAINS + HOUSE_NUMBER_MATCH + PRICE_PRESENT
        );
    }

    fn token_count(text: &str) -> u32 {
        address_tokens(text).into_iter().collect::<HashSet<_>>().len() as u32
    }

    #[test]
    fn test_house_number_avoids_same_street_neighbour() {
        let query = ListingQuery::from_parts("", "1616 N 2100 W", None);
        let candidates = vec![
            CandidateRow::new().with("street", "16160 N 2100 W Apt 2"),
            CandidateRow::new().with("street", "1616 N 2100 W Apt 2"),
        ];

        let best = select_best(&candidates, &query).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn test_price_breaks_ties() {
        let query = ListingQuery::from_parts("", "1616 N 2100 W Provo UT 84604", None);
        let mut without_price = provo_row("1616 N 2100 W");
        without_price.insert("list_price", f64::NAN);
        let candidates = vec![without_price, provo_row("1616 N 2100 W")];

        let best = select_best(&candidates, &query).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn test_ties_keep_first_row() {
        let query = ListingQuery::from_parts("", "22 Oak Ave", None);
        let candidates = vec![
            CandidateRow::new().with("street", "5 Pine St"),
            CandidateRow::new().with("street", "7 Elm St"),
        ];

        let best = select_best(&candidates, &query).unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.score, 0);
    }

    #[test]
    fn test_identifier_needs_suffix() {
        let query = extract_query(PROVO_URL).unwrap();
        let row = CandidateRow::new()
            .with("property_url", "https://www.realtor.com/realestateandhomes-detail/M11901038");
        assert_eq!(score_candidate(&row, &query), 0);
    }

    #[test]
    fn test_identifier_outweighs_best_address() {
        let best_address = ADDRESS_EXACT + HOUSE_NUMBER_MATCH + PRICE_PRESENT;
        let best_overlap = MAX_TOKEN_OVERLAP + HOUSE_NUMBER_MATCH + PRICE_PRESENT;
        assert!(IDENTIFIER_MATCH > best_address.max(best_overlap));
    }
}
