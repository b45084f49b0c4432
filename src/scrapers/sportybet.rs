use super::headers::HeaderRotator;
use super::{array_at, send_json, ScrapeError};
use crate::models::{Bookmaker, League, MatchRecord, Outcome};
use crate::utils::normalizer::{normalize_events, OddsScale, SourceProfile};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

const FOOTBALL_SPORT_ID: &str = "sr:sport:1";

/// SportyBet groups events per tournament and prices outcomes in
/// ten-thousandths inside a `markets` array
pub const SPORTYBET_PROFILE: SourceProfile = SourceProfile {
    name: "sportybet",
    id_fields: &["eventId", "id"],
    home_fields: &["homeTeamName", "homeTeam", "home_team"],
    away_fields: &["awayTeamName", "awayTeam", "away_team"],
    kickoff_fields: &["estimateStartTime", "startTime", "kickoff"],
    teams_field: None,
    odds_fields: &["odds"],
    market_fields: &["markets"],
    outcome_ids: &[("1", Outcome::Home), ("2", Outcome::Draw), ("3", Outcome::Away)],
    scale: OddsScale::TenThousandths,
};

pub struct SportyBetScraper {
    base_url: String,
    client: reqwest::Client,
    headers: HeaderRotator,
}

impl SportyBetScraper {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            headers: HeaderRotator::new("https://www.sportybet.com/ng/sport/football/")
                .with_header("clientid", "web")
                .with_header("platform", "web")
                .with_header("operid", "2"),
        }
    }

    /// POST the tournament event query, falling back once to the
    /// all-football prematch listing
    pub async fn fetch_matches(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        match self.fetch_tournament(league).await {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(league = %league, "SportyBet pcEvents failed, trying prematch listing: {}", e);
                self.fetch_prematch(league).await
            }
        }
    }

    async fn fetch_tournament(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        let url = format!("{}/api/ng/factsCenter/pcEvents", self.base_url);
        let timestamp = Utc::now().timestamp_millis().to_string();

        let request = self
            .client
            .post(&url)
            .headers(self.headers.next_headers())
            .query(&[("_t", timestamp.as_str())])
            .json(&json!([{
                "sportId": FOOTBALL_SPORT_ID,
                "marketId": "1",
                "tournamentId": [[league.sportybet_tournament_id()]]
            }]));

        let body = send_json(Bookmaker::SportyBet, request).await?;
        let events = tournament_events(&body, None)?;
        Ok(normalize_events(&events, &SPORTYBET_PROFILE))
    }

    async fn fetch_prematch(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        let url = format!("{}/api/ng/factsCenter/liveOrPrematchEvents", self.base_url);

        let request = self
            .client
            .get(&url)
            .headers(self.headers.next_headers())
            .query(&[("sportId", FOOTBALL_SPORT_ID)]);

        let body = send_json(Bookmaker::SportyBet, request).await?;
        let events = tournament_events(&body, Some(league.sportybet_tournament_id()))?;
        Ok(normalize_events(&events, &SPORTYBET_PROFILE))
    }
}

/// Flatten `data[].events[]`, keeping only one tournament when asked
fn tournament_events(body: &Value, tournament_id: Option<&str>) -> Result<Vec<Value>, ScrapeError> {
    let tournaments = array_at(body, &["data"]).ok_or_else(|| ScrapeError::Shape {
        bookmaker: Bookmaker::SportyBet,
        detail: format!(
            "missing data (bizCode {})",
            body.get("bizCode").cloned().unwrap_or(Value::Null)
        ),
    })?;

    Ok(tournaments
        .iter()
        .filter(|t| match tournament_id {
            Some(id) => t.get("id").and_then(Value::as_str) == Some(id),
            None => true,
        })
        .filter_map(|t| t.get("events").and_then(Value::as_array))
        .flatten()
        .cloned()
        .collect())
}
