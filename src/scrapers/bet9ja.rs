use super::headers::HeaderRotator;
use super::{array_at, send_json, ScrapeError};
use crate::models::{Bookmaker, League, MatchRecord};
use crate::utils::normalizer::{normalize_events, OddsScale, SourceProfile};

const EVENTS_PATH: &str = "/desktop/feapi/PalimpsestAjax/GetEventsInGroupV2";

/// Bet9ja's feed names teams in `DS` ("Home - Away") and prices in `O`,
/// keyed `S_1X2_1` / `S_1X2_X` / `S_1X2_2`
pub const BET9JA_PROFILE: SourceProfile = SourceProfile {
    name: "bet9ja",
    id_fields: &["ID", "id"],
    home_fields: &["HN", "home_team", "homeTeam"],
    away_fields: &["AN", "away_team", "awayTeam"],
    kickoff_fields: &["STARTDATE", "start_time", "kickoff"],
    teams_field: Some(("DS", " - ")),
    odds_fields: &["O", "odds"],
    market_fields: &["markets"],
    outcome_ids: &[],
    scale: OddsScale::Decimal,
};

pub struct Bet9jaScraper {
    base_url: String,
    client: reqwest::Client,
    headers: HeaderRotator,
}

impl Bet9jaScraper {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            headers: HeaderRotator::new("https://sports.bet9ja.com/"),
        }
    }

    pub async fn fetch_matches(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        let url = format!("{}{}", self.base_url, EVENTS_PATH);

        let request = self
            .client
            .get(&url)
            .headers(self.headers.next_headers())
            .query(&[
                ("GROUPID", league.bet9ja_group_id()),
                ("DISP", "0"),
                ("GROUPMARKETID", "1"),
                ("matches", "true"),
            ]);

        let body = send_json(Bookmaker::Bet9ja, request).await?;
        let events = array_at(&body, &["D", "E"]).ok_or_else(|| ScrapeError::Shape {
            bookmaker: Bookmaker::Bet9ja,
            detail: "missing D.E".to_string(),
        })?;

        Ok(normalize_events(events, &BET9JA_PROFILE))
    }
}
