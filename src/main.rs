use analytics::{Performance, Valuation};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, LogLevel, init_logging, load_config, load_config_from};
use core_types::{Client, ClientId, Holding, PortfolioEntry, SymbolSet};
use database::{DbRepository, connect, run_migrations};
use engine::PortfolioService;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use validation::SupportedSymbolsFile;

/// The main entry point for the Stockfolio application.
#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file, if there is one.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Manage client stock portfolios and query analytics over recent prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new client owning the given holdings.
    Create(EntriesArgs),
    /// Replace every holding of a client.
    Replace(ClientEntriesArgs),
    /// Adjust holdings of a client; an amount of 0 removes the holding.
    Update(ClientEntriesArgs),
    /// Show the holdings of a client, or of every client with --all.
    Holdings(HoldingsArgs),
    /// Value a client's portfolio at the latest prices.
    Value(ClientArgs),
    /// Find the held symbol that rose the most.
    TopPerformer(WindowArgs),
    /// Find the held symbol whose price moved the least.
    MostStable(WindowArgs),
    /// Find the highest-priced symbol the client does not own.
    BestUnowned(ClientArgs),
    /// List every client and its holdings.
    Clients,
    /// List the symbols clients may hold.
    Symbols,
}

#[derive(Args)]
struct HoldingsArgs {
    /// The client's id.
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    client_id: Option<ClientId>,

    /// Show every stored holding instead.
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct ClientArgs {
    /// The client's id.
    client_id: ClientId,
}

#[derive(Args)]
struct WindowArgs {
    /// The client's id.
    client_id: ClientId,

    /// How many of the most recent prices to consider.
    #[arg(long, default_value_t = 30)]
    days: usize,
}

#[derive(Args)]
struct EntriesArgs {
    /// Holdings given as SYMBOL=AMOUNT (e.g. "AAPL=10").
    #[arg(value_name = "SYMBOL=AMOUNT", required_unless_present = "file")]
    entries: Vec<PortfolioEntry>,

    /// A JSON file holding `[{"symbol": "AAPL", "amount": 10}, ...]`.
    #[arg(long, conflicts_with = "entries")]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct ClientEntriesArgs {
    /// The client's id.
    client_id: ClientId,

    #[command(flatten)]
    entries: EntriesArgs,
}

impl EntriesArgs {
    fn resolve(self) -> anyhow::Result<Vec<PortfolioEntry>> {
        match self.file {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)?;
                Ok(serde_json::from_str(&contents)?)
            }
            None => Ok(self.entries),
        }
    }
}

// ==============================================================================
// Command Dispatch
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_logging(&config.logging)?;

    // Needs only the symbols file, so it runs before connecting.
    if let Commands::Symbols = cli.command {
        return list_symbols(&config);
    }

    let service = build_service(&config).await?;

    match cli.command {
        Commands::Create(args) => {
            let client_id = service.create_portfolio(&args.resolve()?).await?;
            println!("Created client {client_id}");
        }
        Commands::Replace(args) => {
            let client_id = args.client_id;
            service
                .replace_portfolio(client_id, &args.entries.resolve()?)
                .await?;
            print_holdings(&service.client_holdings(client_id).await?);
        }
        Commands::Update(args) => {
            let client_id = args.client_id;
            service
                .update_portfolio(client_id, &args.entries.resolve()?)
                .await?;
            print_holdings(&service.client_holdings(client_id).await?);
        }
        Commands::Holdings(args) => match args.client_id {
            Some(client_id) => print_holdings(&service.client_holdings(client_id).await?),
            None => print_all_holdings(&service.list_holdings().await?),
        },
        Commands::Value(args) => {
            print_valuation(&service.portfolio_value(args.client_id).await?);
        }
        Commands::TopPerformer(args) => {
            match service.most_performing(args.client_id, args.days).await? {
                Performance::Rose { symbol, delta } => {
                    println!("{symbol} rose by {delta} over the last {} prices", args.days)
                }
                Performance::NoneRose => {
                    println!("None of the held symbols rose over the last {} prices", args.days)
                }
            }
        }
        Commands::MostStable(args) => {
            let stable = service.most_stable(args.client_id, args.days).await?;
            println!(
                "{} moved within a range of {} over the last {} prices",
                stable.symbol, stable.fluctuation, args.days
            );
        }
        Commands::BestUnowned(args) => match service.best_unowned(args.client_id).await? {
            Some(best) => println!("{} at {}", best.symbol, best.price),
            None => println!("Client {} already owns every listed symbol", args.client_id),
        },
        Commands::Clients => print_clients(&service.list_clients().await?),
        Commands::Symbols => list_symbols(&config)?,
    }

    Ok(())
}

fn list_symbols(config: &Config) -> anyhow::Result<()> {
    let symbols = SupportedSymbolsFile::from_settings(&config.supported_symbols).load()?;
    print_symbols(&symbols);
    Ok(())
}

/// Connects to the database and wires the portfolio service over it.
async fn build_service(config: &Config) -> anyhow::Result<PortfolioService> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    tracing::debug!("Database ready.");

    let store = Arc::new(DbRepository::new(db_pool));
    Ok(PortfolioService::from_config(config, store))
}

// ==============================================================================
// Output
// ==============================================================================

fn print_holdings(holdings: &[Holding]) {
    let mut table = Table::new();
    table.set_header(vec!["Symbol", "Amount"]);
    for holding in holdings {
        table.add_row(vec![holding.symbol.to_string(), holding.amount.to_string()]);
    }
    println!("{table}");
}

fn print_all_holdings(holdings: &[Holding]) {
    let mut table = Table::new();
    table.set_header(vec!["Client", "Symbol", "Amount"]);
    for holding in holdings {
        table.add_row(vec![
            holding.owner.to_string(),
            holding.symbol.to_string(),
            holding.amount.to_string(),
        ]);
    }
    println!("{table}");
}

fn print_valuation(valuation: &Valuation) {
    let mut table = Table::new();
    table.set_header(vec!["Symbol", "Amount", "Price", "Value"]);
    for position in &valuation.positions {
        table.add_row(vec![
            position.symbol.to_string(),
            position.amount.to_string(),
            position.price.to_string(),
            position.value.to_string(),
        ]);
    }
    println!("{table}");
    println!("Total: {}", valuation.total);
}

fn print_clients(clients: &[Client]) {
    let mut table = Table::new();
    table.set_header(vec!["Client", "Holdings"]);
    for client in clients {
        let holdings = client
            .holdings
            .iter()
            .map(|h| format!("{}={}", h.symbol, h.amount))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![client.client_id.to_string(), holdings]);
    }
    println!("{table}");
}

fn print_symbols(symbols: &SymbolSet) {
    let mut table = Table::new();
    table.set_header(vec!["Symbol"]);
    for symbol in symbols {
        table.add_row(vec![symbol.to_string()]);
    }
    println!("{table}");
}
