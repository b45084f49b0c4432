pub mod bet9ja;
pub mod betking;
pub mod headers;
pub mod sportybet;

use crate::config::Config;
use crate::models::{Bookmaker, League, MatchRecord};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

pub use bet9ja::Bet9jaScraper;
pub use betking::BetKingScraper;
pub use sportybet::SportyBetScraper;

/// Why a bookmaker feed could not be turned into matches
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {bookmaker} failed: {source}")]
    Transport {
        bookmaker: Bookmaker,
        #[source]
        source: reqwest::Error,
    },
    #[error("{bookmaker} returned HTTP {status}")]
    Status {
        bookmaker: Bookmaker,
        status: reqwest::StatusCode,
    },
    #[error("{bookmaker} returned malformed JSON: {source}")]
    Decode {
        bookmaker: Bookmaker,
        #[source]
        source: reqwest::Error,
    },
    #[error("{bookmaker} response has no event list: {detail}")]
    Shape {
        bookmaker: Bookmaker,
        detail: String,
    },
}

/// Send a prepared request and decode its JSON body
pub(crate) async fn send_json(
    bookmaker: Bookmaker,
    request: reqwest::RequestBuilder,
) -> Result<Value, ScrapeError> {
    let response = request
        .send()
        .await
        .map_err(|source| ScrapeError::Transport { bookmaker, source })?;

    if !response.status().is_success() {
        return Err(ScrapeError::Status {
            bookmaker,
            status: response.status(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|source| ScrapeError::Decode { bookmaker, source })
}

/// Array at a path of object keys, e.g. `["D", "E"]`
pub(crate) fn array_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    path.iter()
        .try_fold(value, |v, key| v.get(*key))
        .and_then(Value::as_array)
}

/// One adapter per bookmaker, built once from config
pub struct Scrapers {
    pub bet9ja: Bet9jaScraper,
    pub betking: BetKingScraper,
    pub sportybet: SportyBetScraper,
}

impl Scrapers {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            bet9ja: Bet9jaScraper::new(&config.bet9ja_base_url, client.clone()),
            betking: BetKingScraper::new(&config.betking_base_url, client.clone()),
            sportybet: SportyBetScraper::new(&config.sportybet_base_url, client),
        }
    }

    /// Fetch one bookmaker, reporting failures to the caller
    pub async fn fetch_matches(
        &self,
        bookmaker: Bookmaker,
        league: League,
    ) -> Result<Vec<MatchRecord>, ScrapeError> {
        info!(bookmaker = %bookmaker, league = %league, "Scraping bookmaker");
        let matches = match bookmaker {
            Bookmaker::Bet9ja => self.bet9ja.fetch_matches(league).await,
            Bookmaker::BetKing => self.betking.fetch_matches(league).await,
            Bookmaker::SportyBet => self.sportybet.fetch_matches(league).await,
        }?;
        info!(
            bookmaker = %bookmaker,
            league = %league,
            matches = matches.len(),
            "Scrape complete"
        );
        Ok(matches)
    }

    /// Fetch one bookmaker; failures are logged and yield no matches
    pub async fn scrape(&self, bookmaker: Bookmaker, league: League) -> Vec<MatchRecord> {
        match self.fetch_matches(bookmaker, league).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(bookmaker = %bookmaker, league = %league, "Scrape failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_at() {
        let value = json!({"D": {"E": [1, 2]}, "data": "nope"});
        assert_eq!(array_at(&value, &["D", "E"]).map(Vec::len), Some(2));
        assert!(array_at(&value, &["data"]).is_none());
        assert!(array_at(&value, &["missing", "E"]).is_none());
    }

    #[test]
    fn test_status_error_message() {
        let err = ScrapeError::Status {
            bookmaker: Bookmaker::BetKing,
            status: reqwest::StatusCode::FORBIDDEN,
        };
        assert_eq!(err.to_string(), "betking returned HTTP 403 Forbidden");
    }
}
