use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use naija_odds_bridge::config::Config;
use naija_odds_bridge::data::{save_matches_to_csv, save_to_json};
use naija_odds_bridge::{BookmakerOdds, BookmakerSlot, BridgeContext, Bookmaker, League, MatchOdds, MatchRecord};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "naija-odds", about = "Nigerian bookmaker odds, normalized to decimal 1X2")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape one bookmaker for a league
    Odds {
        bookmaker: String,
        league: String,
        /// Save the response as JSON
        #[arg(long)]
        json: Option<String>,
        /// Save the matches as CSV
        #[arg(long)]
        csv: Option<String>,
    },
    /// Scrape every bookmaker for a league
    All {
        league: String,
        #[arg(long)]
        json: Option<String>,
    },
    /// Look up sharp odds for one fixture
    Sharp {
        league: String,
        home: String,
        away: String,
    },
}

fn parse_league(raw: &str) -> Result<League> {
    raw.parse().map_err(|e: String| anyhow!(e))
}

fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("{:.2}", p))
}

fn format_odds(odds: &MatchOdds) -> String {
    format!(
        "1: {:>6}  X: {:>6}  2: {:>6}",
        format_price(odds.home),
        format_price(odds.draw),
        format_price(odds.away)
    )
}

fn print_matches(matches: &[MatchRecord]) {
    if matches.is_empty() {
        println!("No matches found.");
        return;
    }
    for (i, record) in matches.iter().enumerate() {
        println!(
            "{}. {} vs {} ({})\n   {}",
            i + 1,
            record.home_team,
            record.away_team,
            record.kickoff,
            format_odds(&record.odds)
        );
    }
}

async fn odds(
    ctx: &BridgeContext,
    bookmaker: &str,
    league: &str,
    json: Option<String>,
    csv: Option<String>,
) -> Result<()> {
    let league = parse_league(league)?;
    let bookmaker: Bookmaker = bookmaker.parse().map_err(|e: String| anyhow!(e))?;

    println!("Fetching {} odds for {}...\n", bookmaker, league);
    let matches = ctx
        .scrapers
        .fetch_matches(bookmaker, league)
        .await
        .with_context(|| format!("Failed to fetch {} odds", bookmaker))?;
    print_matches(&matches);

    if ctx.sink.is_configured() {
        for record in &matches {
            ctx.sink.reconcile(record, bookmaker, league).await;
        }
        println!("\nReconciled {} matches", matches.len());
    }

    let response = BookmakerOdds::new(bookmaker, league, matches);
    if let Some(path) = json {
        save_to_json(&response, &path)?;
        println!("\nSaved response to {}", path);
    }
    if let Some(path) = csv {
        save_matches_to_csv(&response.matches, &path)?;
        println!("\nSaved matches to {}", path);
    }

    Ok(())
}

async fn all(ctx: &BridgeContext, league: &str, json: Option<String>) -> Result<()> {
    let league = parse_league(league)?;

    println!("Fetching every bookmaker for {}...", league);
    let response = ctx.fetch_all_bookmakers(league).await;

    for (bookmaker, slot) in &response.bookmakers {
        println!("\n{}\n", bookmaker.key().to_uppercase());
        match slot {
            BookmakerSlot::Ok(odds) => print_matches(&odds.matches),
            BookmakerSlot::Failed { error, .. } => println!("Failed: {}", error),
        }
    }

    if let Some(path) = json {
        save_to_json(&response, &path)?;
        println!("\nSaved response to {}", path);
    }

    Ok(())
}

async fn sharp(ctx: &BridgeContext, league: &str, home: &str, away: &str) -> Result<()> {
    let league = parse_league(league)?;
    if !ctx.sharp.is_configured() {
        return Err(anyhow!("ODDS_API_KEY not set in .env file"));
    }

    let odds = ctx.sharp.resolve(league, home, away).await;
    if odds.is_empty() {
        println!("No sharp odds found for {} vs {}", home, away);
    } else {
        println!("{} vs {} ({})\n   {}", home, away, ctx.sharp.sport_key(league), format_odds(&odds));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let ctx = BridgeContext::new(Config::from_env()?)?;

    match cli.command {
        Command::Odds {
            bookmaker,
            league,
            json,
            csv,
        } => odds(&ctx, &bookmaker, &league, json, csv).await,
        Command::All { league, json } => all(&ctx, &league, json).await,
        Command::Sharp { league, home, away } => sharp(&ctx, &league, &home, &away).await,
    }
}
