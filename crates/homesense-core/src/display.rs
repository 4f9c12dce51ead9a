use crate::{Analysis, Client, Comparable, NormalizedListing};
use colored::Colorize;
use tabled::settings::{object::Columns, Modify, Style, Width};
use tabled::{Table, Tabled};

#[derive(Tabled)]
pub struct ClientTableRow {
    #[tabled(rename = "ID", display_with = "display_right_5")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Income", display_with = "display_right_12")]
    pub income: String,
    #[tabled(rename = "Credit", display_with = "display_right_5")]
    pub credit_score: String,
}

#[derive(Tabled)]
pub struct AnalysisTableRow {
    #[tabled(rename = "ID", display_with = "display_right_5")]
    pub id: String,
    #[tabled(rename = "Fit", display_with = "display_right_5")]
    pub fit_score: String,
    #[tabled(rename = "Price", display_with = "display_right_12")]
    pub price: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Saved")]
    pub created_at: String,
}

#[derive(Tabled)]
pub struct ComparableTableRow {
    #[tabled(rename = "Street")]
    pub street: String,
    #[tabled(rename = "Price", display_with = "display_right_12")]
    pub price: String,
    #[tabled(rename = "Beds", display_with = "display_right_5")]
    pub beds: String,
    #[tabled(rename = "Baths", display_with = "display_right_5")]
    pub baths: String,
    #[tabled(rename = "Sqft", display_with = "display_right_8")]
    pub sqft: String,
}

fn display_right_12(s: &str) -> String {
    format!("{:>12}", s)
}

fn display_right_5(s: &str) -> String {
    format!("{:>5}", s)
}

fn display_right_8(s: &str) -> String {
    format!("{:>8}", s)
}

fn dollars_k(value: f64) -> String {
    format!("${}k", (value / 1000.0).round() as i64)
}

impl From<&Client> for ClientTableRow {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            name: client.name.clone(),
            email: if client.email.is_empty() {
                "no email".to_string()
            } else {
                client.email.clone()
            },
            income: dollars_k(client.profile.income),
            credit_score: client.profile.credit_score.to_string(),
        }
    }
}

impl From<&Analysis> for AnalysisTableRow {
    fn from(analysis: &Analysis) -> Self {
        Self {
            id: analysis.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            fit_score: analysis.result.fit_score.to_string(),
            price: dollars_k(analysis.listing.price),
            address: analysis.listing.address_line(),
            created_at: analysis.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl From<&Comparable> for ComparableTableRow {
    fn from(comp: &Comparable) -> Self {
        Self {
            street: comp.street.clone(),
            price: dollars_k(comp.price),
            beds: comp.beds.to_string(),
            baths: comp.baths.to_string(),
            sqft: comp.sqft.to_string(),
        }
    }
}

pub fn create_client_table(clients: &[Client]) -> String {
    let rows: Vec<ClientTableRow> = clients.iter().map(ClientTableRow::from).collect();
    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(1)).with(Width::truncate(30)))
        .with(Modify::new(Columns::single(2)).with(Width::truncate(30)));
    table.to_string()
}

pub fn create_history_table(analyses: &[Analysis]) -> String {
    let rows: Vec<AnalysisTableRow> = analyses.iter().map(AnalysisTableRow::from).collect();
    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(3)).with(Width::wrap(50)));
    table.to_string()
}

pub fn create_comps_table(comps: &[Comparable]) -> String {
    let rows: Vec<ComparableTableRow> = comps.iter().map(ComparableTableRow::from).collect();
    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(0)).with(Width::truncate(40)));
    table.to_string()
}

/// Short multi-line summary of a matched listing.
pub fn format_listing(listing: &NormalizedListing) -> String {
    let mut result = String::new();

    result.push_str(&format!(
        "{} - {} ({})\n",
        listing.address_line().bold(),
        dollars_k(listing.price),
        listing.status
    ));
    result.push_str(&format!(
        "{} bd, {} ba, {} sqft, built {}\n",
        listing.beds,
        listing.baths,
        listing.sqft,
        if listing.year_built > 0 {
            listing.year_built.to_string()
        } else {
            "N/A".to_string()
        }
    ));

    let tax_label = if listing.tax_estimated { "estimated" } else { "reported" };
    result.push_str(&format!(
        "Tax: ${:.0}/yr ({}), HOA: ${:.0}/mo\n",
        listing.tax_annual, tax_label, listing.hoa_monthly
    ));

    if !listing.nearby_schools.is_empty() {
        result.push_str(&format!("Schools: {}\n", listing.nearby_schools.join(", ")));
    }

    result
}
