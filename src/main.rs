use analytics::{AnalyticsEngine, DailyPnl, EquityPoint, TradeStats};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use configuration::{init_tracing, load_config, Config, LedgerConfig, StorageBackend};
use core_types::Trade;
use journal::Journal;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// The main entry point for the Tradebook application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(backend) = cli.storage {
        config.storage.backend = backend;
    }
    // Held until exit so buffered file logs are flushed.
    let _guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Stats => handle_stats(&config).await,
        Commands::Trades(args) => handle_trades(args, &config).await,
        Commands::Daily(args) => handle_daily(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A personal trading journal: ledger, notes, analytics and AI pattern insights.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, global = true, default_value = "tradebook.toml")]
    config: PathBuf,

    /// Overrides the configured storage backend.
    #[arg(long, global = true, value_enum)]
    storage: Option<StorageBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print the headline statistics of the ledger. Never seeds or writes storage.
    Stats,
    /// List trades, newest first. Never seeds or writes storage.
    Trades(TradesArgs),
    /// Print realized P/L per exit day. Never seeds or writes storage.
    Daily(DailyArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct TradesArgs {
    /// Show at most this many trades.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Parser)]
struct DailyArgs {
    /// Also show the running account equity.
    #[arg(long)]
    equity: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;
    web_server::run_server(&config).await
}

/// Opens the journal for reporting. The sample ledger is never seeded here, so an
/// empty store stays empty.
async fn open_journal(config: &Config) -> anyhow::Result<Journal> {
    let storage = database::open_store(&config.storage).await?;
    tracing::debug!(storage = %storage.describe(), "Storage opened.");
    let ledger = LedgerConfig {
        seed_sample_trades: false,
    };
    Ok(Journal::open(storage, &ledger).await)
}

async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let journal = open_journal(config).await?;
    let trades = journal.ledger().trades().await;
    let stats = AnalyticsEngine::new().calculate_stats(&trades)?;
    println!("{}", stats_table(&stats));
    Ok(())
}

async fn handle_trades(args: TradesArgs, config: &Config) -> anyhow::Result<()> {
    let journal = open_journal(config).await?;
    let trades = match args.limit {
        Some(limit) => journal.ledger().recent(limit).await,
        None => journal.ledger().trades().await,
    };
    if trades.is_empty() {
        println!("No trades recorded.");
        return Ok(());
    }
    println!("{}", trades_table(&trades));
    Ok(())
}

async fn handle_daily(args: DailyArgs, config: &Config) -> anyhow::Result<()> {
    let journal = open_journal(config).await?;
    let trades = journal.ledger().trades().await;
    let engine = AnalyticsEngine::new();

    let daily = engine.process_trade_data(&trades)?;
    if daily.is_empty() {
        println!("No closed trades yet.");
        return Ok(());
    }
    let equity = if args.equity {
        Some(engine.equity_curve(&trades, config.analytics.initial_capital)?)
    } else {
        None
    };
    println!("{}", daily_table(&daily, equity.as_deref()));
    Ok(())
}

// ==============================================================================
// Table Rendering
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pnl_cell(pnl: Decimal) -> Cell {
    let color = if pnl > Decimal::ZERO {
        Color::Green
    } else if pnl < Decimal::ZERO {
        Color::Red
    } else {
        Color::Reset
    };
    Cell::new(format!("{:.2}", pnl))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

fn stats_table(stats: &TradeStats) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total P/L"), pnl_cell(stats.total_pnl)]);
    table.add_row(vec![
        Cell::new("Win rate"),
        Cell::new(format!("{:.1}%", stats.win_rate)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![Cell::new("Avg profit"), pnl_cell(stats.avg_profit)]);
    table.add_row(vec![Cell::new("Avg loss"), pnl_cell(stats.avg_loss)]);
    table.add_row(vec![
        Cell::new("Closed / open"),
        Cell::new(format!("{} / {}", stats.closed_trades, stats.open_trades))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Wins / losses"),
        Cell::new(format!("{} / {}", stats.winning_trades, stats.losing_trades))
            .set_alignment(CellAlignment::Right),
    ]);
    table
}

fn trades_table(trades: &[Trade]) -> Table {
    let mut table = new_table(vec![
        "ID", "Instrument", "Type", "Entry", "Exit", "Size", "Entry date", "P/L",
    ]);
    for trade in trades {
        let exit = trade
            .exit_price
            .map(|price| price.to_string())
            .unwrap_or_else(|| "-".to_string());
        let pnl = match trade.pnl {
            Some(pnl) => pnl_cell(pnl),
            None => Cell::new("open").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&trade.id),
            Cell::new(&trade.instrument),
            Cell::new(format!("{:?}", trade.trade_type)),
            Cell::new(trade.entry_price),
            Cell::new(exit),
            Cell::new(trade.size),
            Cell::new(trade.entry_date.format("%Y-%m-%d %H:%M")),
            pnl,
        ]);
    }
    table
}

fn daily_table(daily: &[DailyPnl], equity: Option<&[EquityPoint]>) -> Table {
    let mut header = vec!["Date", "P/L"];
    if equity.is_some() {
        header.push("Equity");
    }
    let mut table = new_table(header);
    for (index, day) in daily.iter().enumerate() {
        let mut row = vec![Cell::new(day.date), pnl_cell(day.pnl)];
        if let Some(point) = equity.and_then(|points| points.get(index)) {
            row.push(Cell::new(format!("{:.2}", point.equity)).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }
    table
}
