use crate::{ClientProfile, Comparable, NormalizedListing};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Share of gross monthly income that may go to housing and other debt.
const DEBT_TO_INCOME_LIMIT: f64 = 0.36;
/// Very rough all-in monthly cost per dollar of list price.
const MONTHLY_COST_FACTOR: f64 = 0.0065;
const BASE_FIT_SCORE: i32 = 50;

pub const RULES_ONLY_MODEL: &str = "rules-only";

static SINGLE_CHARACTER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]$").expect("single character pattern is valid"));
static IF_YOU_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bif you['’]d like\b[^.?!]*[.?!]").expect("follow-up pattern is valid")
});
static FOLLOW_UP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(let me know|would you like|can I)\b[^.?!]*[.?!]")
        .expect("follow-up pattern is valid")
});
static EXTRA_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingReport {
    pub fit_score: u8,
    pub estimated_monthly_cost: f64,
    pub max_recommended_monthly: f64,
    pub report_markdown: String,
    pub model_used: String,
    pub created_at: DateTime<Utc>,
}

/// Largest monthly payment the client can carry after existing debt.
pub fn monthly_budget(profile: &ClientProfile) -> f64 {
    (profile.income / 12.0 * DEBT_TO_INCOME_LIMIT - profile.monthly_debt).max(0.0)
}

pub fn estimated_monthly_cost(price: f64) -> f64 {
    price * MONTHLY_COST_FACTOR
}

/// Affordability fit between 1 and 100.
pub fn fit_score(profile: &ClientProfile, listing: &NormalizedListing) -> u8 {
    let mut score = BASE_FIT_SCORE;
    let budget = monthly_budget(profile);
    let monthly_cost = estimated_monthly_cost(listing.price);

    if monthly_cost > 0.0 && budget > 0.0 {
        let ratio = monthly_cost / budget;
        if ratio <= 0.85 {
            score += 25;
        } else if ratio <= 1.0 {
            score += 10;
        } else if ratio > 1.15 {
            score -= 20;
        }
    }

    if profile.credit_score >= 740 {
        score += 10;
    } else if profile.credit_score < 640 {
        score -= 10;
    }

    if profile.savings >= listing.price * 0.1 {
        score += 10;
    }

    score.clamp(1, 100) as u8
}

/// Deterministic markdown report used when no language model drafts one.
pub fn generate_report(
    profile: &ClientProfile,
    listing: &NormalizedListing,
    comps: &[Comparable],
) -> ListingReport {
    let fit_score = fit_score(profile, listing);
    let budget = monthly_budget(profile);
    let monthly_cost = estimated_monthly_cost(listing.price);

    let comp_lines = if comps.is_empty() {
        "- No nearby comparable listings were available at analysis time.".to_string()
    } else {
        comps
            .iter()
            .take(3)
            .map(|c| {
                format!(
                    "- {}: ${}, {} bd, {} ba, {} sqft",
                    c.street,
                    group_thousands(c.price.round() as i64),
                    c.beds,
                    c.baths,
                    group_thousands(c.sqft)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let tax_note = if listing.tax_estimated {
        format!(
            "- Annual property tax is **estimated** at ${} (not reported by the listing).",
            group_thousands(listing.tax_annual.round() as i64)
        )
    } else {
        format!(
            "- Reported annual property tax: ${}.",
            group_thousands(listing.tax_annual.round() as i64)
        )
    };

    let markdown = format!(
        "### Executive Summary
This listing at {address} has a **fit score of {fit_score}/100** for this client profile.

### Fit Assessment
- Estimated monthly carrying cost (very rough): **${cost}/mo**.
- Client max recommended monthly payment: **${budget}/mo**.
{tax_note}
- The final recommendation should be validated with lender pre-approval and full tax/insurance quotes.

### Location Intelligence
- Validate neighborhood crime trends through a local public safety source.
- Review school ratings and district boundaries with official district tools.
- Ask about weather-related historical claims (hail, flooding, wind) in this ZIP.

### Property Risk Watchlist
- If older property, request roof age and permit history.
- Ask for HVAC service records and expected replacement timeline.
- Confirm foundation/water intrusion history and recent inspections.

### Suggested Nearby Alternatives
{comp_lines}

### Realtor Next Steps
1. Verify taxes, HOA dues, and insurance quote.
2. Confirm school assignment and commute time.
3. Request disclosures focused on roof, HVAC, plumbing, and major repairs.",
        address = listing.address_line(),
        cost = group_thousands(monthly_cost.round() as i64),
        budget = group_thousands(budget.round() as i64),
    );

    ListingReport {
        fit_score,
        estimated_monthly_cost: monthly_cost,
        max_recommended_monthly: budget,
        report_markdown: clean_report_markdown(&markdown),
        model_used: RULES_ONLY_MODEL.to_string(),
        created_at: Utc::now(),
    }
}

/// Repairs spacing artifacts in generated markdown and strips follow-up offers.
pub fn clean_report_markdown(report: &str) -> String {
    let mut cleaned: Vec<String> = Vec::new();
    let mut letters = String::new();

    for raw_line in report.lines() {
        if SINGLE_CHARACTER_LINE.is_match(raw_line.trim()) {
            letters.push_str(raw_line.trim());
            continue;
        }
        if !letters.is_empty() {
            cleaned.push(std::mem::take(&mut letters));
        }
        cleaned.push(raw_line.to_string());
    }
    if !letters.is_empty() {
        cleaned.push(letters);
    }

    let text = cleaned.join("\n");
    let text = IF_YOU_LIKE.replace_all(&text, "");
    let text = FOLLOW_UP.replace_all(&text, "");
    let text = EXTRA_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
