pub mod api;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod utils;

pub use api::*;
pub use models::*;
pub use scrapers::*;
pub use utils::*;

use anyhow::{Context, Result};
use chrono::Utc;
use config::Config;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// Everything a request needs, built once per process from `Config`
pub struct BridgeContext {
    pub config: Config,
    pub scrapers: Scrapers,
    pub sharp: Arc<SharpOddsResolver>,
    pub sink: ReconciliationSink,
}

impl BridgeContext {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let sharp = Arc::new(SharpOddsResolver::new(&config, client.clone()));
        let sink = ReconciliationSink::new(config.supabase.clone(), client.clone(), sharp.clone());
        let scrapers = Scrapers::new(&config, client);

        if !sharp.is_configured() {
            info!("ODDS_API_KEY not set, sharp odds will resolve to null");
        }
        if !sink.is_configured() {
            info!("Supabase not configured, reconciliation is disabled");
        }

        Ok(Self {
            config,
            scrapers,
            sharp,
            sink,
        })
    }

    fn reconcile_all(&self, bookmaker: Bookmaker, league: League, matches: &[MatchRecord]) {
        self.sink.submit_batch(matches.to_vec(), bookmaker, league);
    }

    /// One bookmaker's matches for a league. Scrape failures give an empty list.
    pub async fn fetch_bookmaker_odds(&self, bookmaker: Bookmaker, league: League) -> BookmakerOdds {
        let matches = self.scrapers.scrape(bookmaker, league).await;
        self.reconcile_all(bookmaker, league, &matches);
        BookmakerOdds::new(bookmaker, league, matches)
    }

    async fn fetch_slot(&self, bookmaker: Bookmaker, league: League) -> BookmakerSlot {
        match self.scrapers.fetch_matches(bookmaker, league).await {
            Ok(matches) => {
                self.reconcile_all(bookmaker, league, &matches);
                BookmakerSlot::Ok(BookmakerOdds::new(bookmaker, league, matches))
            }
            Err(e) => {
                error!(bookmaker = %bookmaker, league = %league, "Failed to fetch bookmaker: {}", e);
                BookmakerSlot::failed(e)
            }
        }
    }

    /// Every bookmaker for a league, fetched concurrently. A failing
    /// bookmaker gets an error slot and never affects the others.
    pub async fn fetch_all_bookmakers(&self, league: League) -> AllBookmakersOdds {
        let (bet9ja, betking, sportybet) = tokio::join!(
            self.fetch_slot(Bookmaker::Bet9ja, league),
            self.fetch_slot(Bookmaker::BetKing, league),
            self.fetch_slot(Bookmaker::SportyBet, league),
        );

        let bookmakers = BTreeMap::from([
            (Bookmaker::Bet9ja, bet9ja),
            (Bookmaker::BetKing, betking),
            (Bookmaker::SportyBet, sportybet),
        ]);

        AllBookmakersOdds {
            league,
            timestamp: Utc::now(),
            bookmakers,
        }
    }
}
