use crate::config::Config;
use crate::models::{League, MatchOdds, Outcome, SharpOddsSnapshot};
use crate::utils::matching::teams_match;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Response from The Odds API for a single game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsApiEvent {
    pub id: String,
    pub sport_title: String,
    pub commence_time: String,
    pub home_team: String,
    pub away_team: String,
    pub bookmakers: Vec<OddsApiBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsApiBookmaker {
    pub key: String,
    pub title: String,
    pub markets: Vec<OddsApiMarket>,
}

/// Market data (h2h, spreads, totals) from The Odds API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsApiMarket {
    pub key: String,
    pub outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsApiOutcome {
    pub name: String,
    pub price: f64,
}

/// Sharp-odds lookups against The Odds API, cached per league.
///
/// Refreshes are serialized per sport key: concurrent lookups on a cold or
/// expired league wait for the first fetch and then read its snapshot.
/// A failed fetch is not cached, so the next waiter tries again.
pub struct SharpOddsResolver {
    api_key: Option<String>,
    base_url: String,
    bookmaker: String,
    fallback_sport_key: String,
    ttl: chrono::Duration,
    client: reqwest::Client,
    cache: RwLock<HashMap<String, Arc<SharpOddsSnapshot>>>,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SharpOddsResolver {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            api_key: config.odds_api_key.clone(),
            base_url: config.odds_api_base_url.clone(),
            bookmaker: config.sharp_bookmaker.clone(),
            fallback_sport_key: config.sharp_fallback_sport_key.clone(),
            ttl: chrono::Duration::from_std(config.sharp_cache_ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(15)),
            client,
            cache: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Aggregator sport key for a league, or the configured fallback
    pub fn sport_key(&self, league: League) -> &str {
        league
            .odds_api_sport_key()
            .unwrap_or(self.fallback_sport_key.as_str())
    }

    /// Best-known sharp 1X2 prices for a fixture. Anything that goes wrong
    /// resolves to an all-null triple.
    pub async fn resolve(&self, league: League, home_team: &str, away_team: &str) -> MatchOdds {
        let Some(snapshot) = self.league_snapshot(league).await else {
            return MatchOdds::default();
        };

        find_sharp_odds(&snapshot.events, home_team, away_team, &self.bookmaker)
            .unwrap_or_default()
    }

    async fn cached_snapshot(&self, sport_key: &str) -> Option<Arc<SharpOddsSnapshot>> {
        let cache = self.cache.read().await;
        let snapshot = cache.get(sport_key)?;
        snapshot
            .is_fresh(Utc::now(), self.ttl)
            .then(|| snapshot.clone())
    }

    async fn refresh_lock(&self, sport_key: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .lock()
            .await
            .entry(sport_key.to_string())
            .or_default()
            .clone()
    }

    async fn league_snapshot(&self, league: League) -> Option<Arc<SharpOddsSnapshot>> {
        let api_key = self.api_key.as_deref()?;
        let sport_key = self.sport_key(league).to_string();

        if let Some(snapshot) = self.cached_snapshot(&sport_key).await {
            debug!(sport_key = %sport_key, "Sharp odds cache hit");
            return Some(snapshot);
        }

        let lock = self.refresh_lock(&sport_key).await;
        let _refreshing = lock.lock().await;

        // Filled by whoever held the lock before us
        if let Some(snapshot) = self.cached_snapshot(&sport_key).await {
            debug!(sport_key = %sport_key, "Sharp odds refreshed while waiting");
            return Some(snapshot);
        }

        match self.fetch_events(api_key, &sport_key).await {
            Ok(events) => {
                info!(
                    sport_key = %sport_key,
                    events = events.len(),
                    "Fetched sharp odds from The Odds API"
                );
                let snapshot = Arc::new(SharpOddsSnapshot::new(events));
                self.cache
                    .write()
                    .await
                    .insert(sport_key, snapshot.clone());
                Some(snapshot)
            }
            Err(e) => {
                warn!(sport_key = %sport_key, "Sharp odds lookup failed: {:#}", e);
                None
            }
        }
    }

    async fn fetch_events(&self, api_key: &str, sport_key: &str) -> Result<Vec<OddsApiEvent>> {
        let url = format!("{}/sports/{}/odds", self.base_url, sport_key);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("regions", "uk,eu"),
                ("markets", "h2h"), // h2h = 1X2 for soccer
                ("oddsFormat", "decimal"),
                ("bookmakers", self.bookmaker.as_str()),
            ])
            .send()
            .await
            .context("Failed to fetch odds from The Odds API")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds API returned error: {}", response.status());
        }

        if let Some(remaining) = response.headers().get("x-requests-remaining") {
            debug!("Odds API requests remaining: {:?}", remaining);
        }

        response
            .json()
            .await
            .context("Failed to parse Odds API response")
    }
}

/// Find the first event matching both team names and read the sharp
/// bookmaker's h2h prices from it
pub fn find_sharp_odds(
    events: &[OddsApiEvent],
    home_team: &str,
    away_team: &str,
    bookmaker: &str,
) -> Option<MatchOdds> {
    let event = events.iter().find(|e| {
        teams_match(&e.home_team, home_team) && teams_match(&e.away_team, away_team)
    })?;

    let market = event
        .bookmakers
        .iter()
        .filter(|b| b.key == bookmaker)
        .flat_map(|b| b.markets.iter())
        .find(|m| m.key == "h2h")?;

    let mut odds = MatchOdds::default();
    for outcome in &market.outcomes {
        let side = if outcome.name.to_lowercase().contains("draw") {
            Outcome::Draw
        } else if teams_match(&outcome.name, &event.home_team) {
            Outcome::Home
        } else if teams_match(&outcome.name, &event.away_team) {
            Outcome::Away
        } else {
            continue;
        };
        odds.set(side, outcome.price);
    }

    Some(odds)
}
