use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use homesense_core::db::AnalysisQueryBuilder;
use homesense_core::{
    create_client_table, create_comps_table, create_history_table, format_listing,
    generate_report, Analysis, Client, ClientProfile, Database, HomesenseError,
    Result,
};
use homesense_scrapers::{HomeHarvestOracle, SearchOracle, SnapshotOracle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a listing URL for a client and save the report
    #[command(about = "Analyze a listing URL for a client and save the report")]
    #[command(long_about = "Resolve a Zillow or Realtor.com listing URL through the search service, score it against the client's finances and save the report to the client's history.")]
    Analyze(AnalyzeCommand),

    /// Pick the matching row for a URL from a CSV export
    #[command(about = "Pick the matching row for a URL from a CSV export")]
    #[command(long_about = "Run the listing matcher offline against a CSV export of search results and print the normalized listing.")]
    Match(MatchCommand),

    /// Manage clients
    #[command(subcommand)]
    Client(ClientCommand),

    /// Show saved analyses for a client
    #[command(about = "Show saved analyses for a client")]
    History(HistoryCommand),
}

#[derive(Args)]
struct StoreArgs {
    /// Database file path (-d, --database)
    #[arg(short = 'd', long, env = "HOMESENSE_DATABASE", default_value = "homesense.db")]
    database: PathBuf,

    /// Realtor the clients belong to (-r, --realtor)
    #[arg(short = 'r', long, env = "HOMESENSE_REALTOR", default_value = "default")]
    realtor: String,
}

#[derive(Args)]
struct AnalyzeCommand {
    /// Listing URL (-u, --url)
    #[arg(short = 'u', long)]
    url: String,

    /// Client id (-c, --client)
    #[arg(short = 'c', long)]
    client: i64,

    /// Base URL of the listing search service (-s, --oracle-url)
    #[arg(short = 's', long, env = "HOMESENSE_ORACLE_URL", default_value = "http://localhost:8000/")]
    oracle_url: String,

    /// Use a CSV export instead of the search service (-f, --snapshot)
    #[arg(short = 'f', long)]
    snapshot: Option<PathBuf>,

    /// Number of area comparables to include (-n, --comps)
    #[arg(short = 'n', long, default_value_t = 5)]
    comps: usize,

    /// Print the report without saving it
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
struct MatchCommand {
    /// Listing URL (-u, --url)
    #[arg(short = 'u', long)]
    url: String,

    /// CSV file with one candidate row per line (-f, --candidates)
    #[arg(short = 'f', long)]
    candidates: PathBuf,

    /// Print the normalized listing as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ClientCommand {
    /// Add a client
    Add(AddClientCommand),
    /// List clients, newest first
    List(ListClientsCommand),
    /// Delete a client and its saved analyses
    Delete(DeleteClientCommand),
}

#[derive(Args)]
struct AddClientCommand {
    /// Client name (-n, --name)
    #[arg(short = 'n', long)]
    name: String,

    /// Client email (-e, --email)
    #[arg(short = 'e', long, default_value = "")]
    email: String,

    /// Client phone (-p, --phone)
    #[arg(short = 'p', long, default_value = "")]
    phone: String,

    /// Annual income in USD (-i, --income)
    #[arg(short = 'i', long, default_value_t = 0.0)]
    income: f64,

    /// Monthly debt payments in USD (-m, --monthly-debt)
    #[arg(short = 'm', long, default_value_t = 0.0)]
    monthly_debt: f64,

    /// Savings available in USD (-s, --savings)
    #[arg(short = 's', long, default_value_t = 0.0)]
    savings: f64,

    /// Credit score (-c, --credit-score)
    #[arg(short = 'c', long, default_value_t = 700, value_parser = clap::value_parser!(u16).range(300..=850))]
    credit_score: u16,

    /// Housing, lifestyle and school preferences
    #[arg(long, default_value = "")]
    preferences: String,

    /// Realtor notes
    #[arg(long, default_value = "")]
    notes: String,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
struct ListClientsCommand {
    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
struct DeleteClientCommand {
    /// Client id (-c, --client)
    #[arg(short = 'c', long)]
    client: i64,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
struct HistoryCommand {
    /// Client id (-c, --client)
    #[arg(short = 'c', long)]
    client: i64,

    /// Maximum number of analyses to display (-l, --limit)
    #[arg(short = 'l', long)]
    limit: Option<i64>,

    /// Only show analyses with at least this fit score
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    min_fit: Option<u8>,

    /// Print the full report of this analysis id
    #[arg(long)]
    show: Option<i64>,

    #[command(flatten)]
    store: StoreArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(cmd) => analyze(cmd).await?,
        Commands::Match(cmd) => {
            let oracle = SnapshotOracle::from_csv(&cmd.candidates)?;
            let lookup = oracle.lookup_listing(&cmd.url).await?;

            info!(
                "Matched row {} of {} (score {})",
                lookup.match_index, lookup.candidates, lookup.match_score
            );
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&lookup.listing)?);
            } else {
                print!("{}", format_listing(&lookup.listing));
            }
        }
        Commands::Client(ClientCommand::Add(cmd)) => {
            let db = Database::new(&cmd.store.database).await?;
            let profile = ClientProfile {
                income: cmd.income,
                monthly_debt: cmd.monthly_debt,
                savings: cmd.savings,
                credit_score: cmd.credit_score,
            };
            let mut client = Client::new(cmd.store.realtor.clone(), cmd.name, profile);
            client.email = cmd.email;
            client.phone = cmd.phone;
            client.preferences = cmd.preferences;
            client.notes = cmd.notes;

            db.create_client(&mut client).await?;
            println!("Client created with id {}", client.id.unwrap_or_default());
        }
        Commands::Client(ClientCommand::List(cmd)) => {
            let db = Database::new(&cmd.store.database).await?;
            let clients = db.list_clients(&cmd.store.realtor).await?;
            if clients.is_empty() {
                println!("No clients yet. Add one to begin.");
            } else {
                println!("{}", create_client_table(&clients));
            }
        }
        Commands::Client(ClientCommand::Delete(cmd)) => {
            let db = Database::new(&cmd.store.database).await?;
            if !db.delete_client(&cmd.store.realtor, cmd.client).await? {
                return Err(HomesenseError::NotFound(format!("client {}", cmd.client)));
            }
            println!("Client deleted.");
        }
        Commands::History(cmd) => {
            let db = Database::new(&cmd.store.database).await?;
            let analyses = AnalysisQueryBuilder::new()
                .with_realtor(&cmd.store.realtor)
                .with_client(cmd.client)
                .with_min_fit_score(cmd.min_fit)
                .newest_first()
                .with_limit(cmd.limit)
                .execute(db.pool())
                .await?;

            if analyses.is_empty() {
                println!("No analyses saved for this client yet.");
            } else if let Some(id) = cmd.show {
                let analysis = analyses
                    .iter()
                    .find(|a| a.id == Some(id))
                    .ok_or_else(|| HomesenseError::NotFound(format!("analysis {}", id)))?;
                println!("{}", analysis.url.bold());
                println!("Model: {}\n", analysis.result.model_used);
                println!("{}", analysis.result.report_markdown);
            } else {
                println!("{}", create_history_table(&analyses));
            }
        }
    }

    Ok(())
}

async fn analyze(cmd: AnalyzeCommand) -> Result<()> {
    let db = Database::new(&cmd.store.database).await?;
    let client = db
        .get_client(&cmd.store.realtor, cmd.client)
        .await?
        .ok_or_else(|| HomesenseError::NotFound(format!("client {}", cmd.client)))?;

    let oracle: Arc<dyn SearchOracle> = match &cmd.snapshot {
        Some(path) => Arc::new(SnapshotOracle::from_csv(path)?),
        None => Arc::new(HomeHarvestOracle::new(&cmd.oracle_url)?),
    };

    let url = cmd.url.trim();
    if url.is_empty() {
        return Err(HomesenseError::InvalidInput("Please provide a listing URL.".to_string()));
    }

    info!("Analyzing {} for {}", url, client.name);
    let lookup = oracle.lookup_listing(url).await?;
    let comps = oracle
        .area_comps(&lookup.listing.city, &lookup.listing.state, cmd.comps)
        .await;
    let report = generate_report(&client.profile, &lookup.listing, &comps);

    print!("{}", format_listing(&lookup.listing));
    if !comps.is_empty() {
        println!("{}", create_comps_table(&comps));
    }
    println!("\n{}", report.report_markdown);

    if cmd.dry_run {
        return Ok(());
    }

    let client_id = client
        .id
        .ok_or_else(|| HomesenseError::NotFound(format!("client {}", cmd.client)))?;
    let mut analysis = Analysis::new(
        cmd.store.realtor.clone(),
        client_id,
        url,
        lookup.listing,
        report,
    );
    db.save_analysis(&mut analysis).await?;
    println!("\nAnalysis saved to client history (id {}).", analysis.id.unwrap_or_default());

    Ok(())
}
