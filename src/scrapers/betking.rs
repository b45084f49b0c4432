use super::headers::HeaderRotator;
use super::{array_at, send_json, ScrapeError};
use crate::models::{Bookmaker, League, MatchRecord};
use crate::utils::normalizer::{normalize_events, OddsScale, SourceProfile};
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::warn;

/// BetKing prices are integers in hundredths (`210` is 2.10)
pub const BETKING_PROFILE: SourceProfile = SourceProfile {
    name: "betking",
    id_fields: &["id", "eventId", "matchId"],
    home_fields: &["homeTeam", "home_team", "home"],
    away_fields: &["awayTeam", "away_team", "away"],
    kickoff_fields: &["startDate", "eventDate", "kickoff"],
    teams_field: Some(("name", " - ")),
    odds_fields: &["odds"],
    market_fields: &["markets"],
    outcome_ids: &[],
    scale: OddsScale::Hundredths,
};

pub struct BetKingScraper {
    base_url: String,
    client: reqwest::Client,
    headers: HeaderRotator,
}

impl BetKingScraper {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            headers: HeaderRotator::new("https://www.betking.com/sports/prematch/football"),
        }
    }

    /// Query the JSON feed, falling back once to the server-rendered page
    pub async fn fetch_matches(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        match self.fetch_feed(league).await {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(league = %league, "BetKing feed failed, trying page fallback: {}", e);
                self.fetch_page(league).await
            }
        }
    }

    async fn fetch_feed(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        let url = format!(
            "{}/api/feeds/prematch/{}/events",
            self.base_url,
            league.betking_tournament()
        );
        let request = self.client.get(&url).headers(self.headers.next_headers());

        let body = send_json(Bookmaker::BetKing, request).await?;
        let events = array_at(&body, &["data", "events"]).ok_or_else(|| ScrapeError::Shape {
            bookmaker: Bookmaker::BetKing,
            detail: "missing data.events".to_string(),
        })?;

        Ok(normalize_events(events, &BETKING_PROFILE))
    }

    async fn fetch_page(&self, league: League) -> Result<Vec<MatchRecord>, ScrapeError> {
        let url = format!(
            "{}/sports/prematch/football/{}",
            self.base_url,
            league.betking_tournament()
        );

        let response = self
            .client
            .get(&url)
            .headers(self.headers.next_headers())
            .send()
            .await
            .map_err(|source| ScrapeError::Transport {
                bookmaker: Bookmaker::BetKing,
                source,
            })?;

        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                bookmaker: Bookmaker::BetKing,
                status: response.status(),
            });
        }

        let html = response.text().await.map_err(|source| ScrapeError::Decode {
            bookmaker: Bookmaker::BetKing,
            source,
        })?;

        let events = embedded_events(&html).ok_or_else(|| ScrapeError::Shape {
            bookmaker: Bookmaker::BetKing,
            detail: "no __NEXT_DATA__ events in page".to_string(),
        })?;

        Ok(normalize_events(&events, &BETKING_PROFILE))
    }
}

/// Events embedded in the page's `__NEXT_DATA__` script
fn embedded_events(html: &str) -> Option<Vec<Value>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;

    let script = document.select(&selector).next()?;
    let json: Value = serde_json::from_str(&script.text().collect::<String>()).ok()?;

    array_at(&json, &["props", "pageProps", "events"]).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head></head><body>
        <div id="root"></div>
        <script id="__NEXT_DATA__" type="application/json">
        {"props": {"pageProps": {"events": [
            {"id": 77, "name": "Juventus - Napoli", "startDate": "2026-02-02T19:45:00Z",
             "markets": [{"name": "1X2", "selections": [
                {"name": "1", "odds": 215}, {"name": "X", "odds": 310}, {"name": "2", "odds": 360}
             ]}]}
        ]}}}
        </script></body></html>"#;

    #[test]
    fn test_embedded_events() {
        let events = embedded_events(PAGE).unwrap();
        assert_eq!(events.len(), 1);
        assert!(embedded_events("<html><body>blocked</body></html>").is_none());
    }

    #[tokio::test]
    async fn test_feed_scaling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/feeds/prematch/italy/serie-a/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"events": [
                    {"id": 1, "homeTeam": "Juventus", "awayTeam": "Napoli",
                     "markets": [{"name": "1X2", "selections": [
                        {"name": "1", "odds": 215}, {"name": "X", "odds": 310}, {"name": "2", "odds": 360}
                     ]}]}
                ]}
            })))
            .mount(&server)
            .await;

        let scraper = BetKingScraper::new(&server.uri(), reqwest::Client::new());
        let matches = scraper.fetch_matches(League::SerieA).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].odds.home, Some(2.15));
        assert_eq!(matches[0].odds.draw, Some(3.1));
        assert_eq!(matches[0].odds.away, Some(3.6));
    }

    #[tokio::test]
    async fn test_falls_back_to_page_when_feed_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/feeds/prematch/italy/serie-a/events"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sports/prematch/football/italy/serie-a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let scraper = BetKingScraper::new(&server.uri(), reqwest::Client::new());
        let matches = scraper.fetch_matches(League::SerieA).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].home_team, "Juventus");
        assert_eq!(matches[0].away_team, "Napoli");
        assert_eq!(matches[0].odds.home, Some(2.15));
    }
}
