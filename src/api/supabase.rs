use crate::api::odds_api::SharpOddsResolver;
use crate::config::SupabaseConfig;
use crate::models::{reconciliation_match_id, Bookmaker, League, MatchRecord, ReconciledBet};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Merges bookmaker odds with sharp odds and upserts them through a Supabase RPC.
/// Persistence is best-effort: failures are logged and swallowed.
#[derive(Clone)]
pub struct ReconciliationSink {
    store: Option<SupabaseConfig>,
    client: reqwest::Client,
    sharp: Arc<SharpOddsResolver>,
}

impl ReconciliationSink {
    pub fn new(
        store: Option<SupabaseConfig>,
        client: reqwest::Client,
        sharp: Arc<SharpOddsResolver>,
    ) -> Self {
        Self {
            store,
            client,
            sharp,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Fire-and-forget reconciliation of one scrape. A single task works
    /// through the batch so the league's sharp odds are fetched once.
    pub fn submit_batch(&self, records: Vec<MatchRecord>, bookmaker: Bookmaker, league: League) {
        if !self.is_configured() || records.is_empty() {
            return;
        }
        let sink = self.clone();
        tokio::spawn(async move {
            for record in &records {
                sink.reconcile(record, bookmaker, league).await;
            }
            debug!(bookmaker = %bookmaker, league = %league, count = records.len(), "Reconciled batch");
        });
    }

    /// Resolve sharp odds for the record and upsert the pair.
    /// A no-op when no datastore is configured.
    pub async fn reconcile(&self, record: &MatchRecord, bookmaker: Bookmaker, league: League) {
        let Some(store) = &self.store else {
            return;
        };

        let sharp_odds = self
            .sharp
            .resolve(league, &record.home_team, &record.away_team)
            .await;

        let bet = ReconciledBet {
            match_id: reconciliation_match_id(
                &record.home_team,
                &record.away_team,
                Utc::now().date_naive(),
            ),
            league,
            kickoff: record.kickoff.clone(),
            bookmaker,
            bookmaker_odds: record.odds,
            sharp_odds,
        };

        match self.upsert(store, &bet).await {
            Ok(()) => debug!(match_id = %bet.match_id, bookmaker = %bookmaker, "Upserted reconciled bet"),
            Err(e) => error!(match_id = %bet.match_id, "Failed to upsert reconciled bet: {:#}", e),
        }
    }

    async fn upsert(&self, store: &SupabaseConfig, bet: &ReconciledBet) -> Result<()> {
        let url = format!("{}/rest/v1/rpc/{}", store.url, store.upsert_rpc);

        let response = self
            .client
            .post(&url)
            .header("apikey", &store.service_key)
            .header("Authorization", format!("Bearer {}", store.service_key))
            .json(&json!({
                "p_match_id": bet.match_id,
                "p_league": bet.league,
                "p_kickoff": bet.kickoff,
                "p_bookmaker": bet.bookmaker,
                "p_bookmaker_odds": bet.bookmaker_odds,
                "p_sharp_odds": bet.sharp_odds,
            }))
            .send()
            .await
            .context("Failed to reach Supabase")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Supabase RPC returned {}: {}", status, body);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::MatchOdds;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> MatchRecord {
        MatchRecord {
            id: "sr:match:42".to_string(),
            home_team: "Man United".to_string(),
            away_team: "Aston Villa".to_string(),
            kickoff: "1768838400000".to_string(),
            odds: MatchOdds {
                home: Some(2.05),
                draw: Some(3.5),
                away: Some(3.4),
            },
        }
    }

    fn sink(store: Option<SupabaseConfig>) -> ReconciliationSink {
        sink_with_config(store, &Config::default())
    }

    fn sink_with_config(store: Option<SupabaseConfig>, config: &Config) -> ReconciliationSink {
        let client = reqwest::Client::new();
        let sharp = Arc::new(SharpOddsResolver::new(config, client.clone()));
        ReconciliationSink::new(store, client, sharp)
    }

    #[tokio::test]
    async fn test_unconfigured_sink_is_noop() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        // Sharp odds are reachable, only the store is missing
        let config = Config {
            odds_api_key: Some("test_key".to_string()),
            odds_api_base_url: server.uri(),
            ..Config::default()
        };
        let sink = sink_with_config(None, &config);
        assert!(!sink.is_configured());

        sink.reconcile(&record(), Bookmaker::SportyBet, League::PremierLeague)
            .await;
        sink.submit_batch(vec![record(), record()], Bookmaker::SportyBet, League::PremierLeague);
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_upserts_with_match_id() {
        let server = MockServer::start().await;
        let expected_id = format!(
            "ManUnited_AstonVilla_{}",
            Utc::now().date_naive().format("%Y%m%d")
        );

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/upsert_reconciled_bet"))
            .and(header("apikey", "service-key"))
            .and(body_partial_json(serde_json::json!({
                "p_match_id": expected_id,
                "p_bookmaker": "sportybet",
                "p_league": "premierleague",
                "p_bookmaker_odds": {"home": 2.05, "draw": 3.5, "away": 3.4},
                "p_sharp_odds": {"home": null, "draw": null, "away": null}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink(Some(SupabaseConfig {
            url: server.uri(),
            service_key: "service-key".to_string(),
            upsert_rpc: "upsert_reconciled_bet".to_string(),
        }));

        sink.reconcile(&record(), Bookmaker::SportyBet, League::PremierLeague)
            .await;
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink(Some(SupabaseConfig {
            url: server.uri(),
            service_key: "service-key".to_string(),
            upsert_rpc: "upsert_reconciled_bet".to_string(),
        }));

        sink.reconcile(&record(), Bookmaker::Bet9ja, League::Npfl).await;
    }
}
