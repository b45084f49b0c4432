use crate::models::{MatchOdds, MatchRecord, Outcome};
use serde_json::Value;
use tracing::debug;

/// Labels that identify the 1X2 market inside a markets array
const MATCH_RESULT_MARKETS: &[&str] = &[
    "1x2",
    "1",
    "3way",
    "match result",
    "match winner",
    "full time result",
    "fulltime result",
];

const MARKET_LABEL_FIELDS: &[&str] = &["desc", "name", "marketName", "id"];
const SELECTION_FIELDS: &[&str] = &["outcomes", "selections", "odds"];
const SELECTION_LABEL_FIELDS: &[&str] = &["desc", "name", "label", "outcome", "typeName"];
const PRICE_FIELDS: &[&str] = &["odds", "price", "value", "odd"];

/// How a provider encodes decimal prices on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddsScale {
    Decimal,
    /// `210` means 2.10
    Hundredths,
    /// `21000` means 2.10
    TenThousandths,
}

impl OddsScale {
    fn divisor(&self) -> f64 {
        match self {
            OddsScale::Decimal => 1.0,
            OddsScale::Hundredths => 100.0,
            OddsScale::TenThousandths => 10_000.0,
        }
    }

    /// Convert a raw wire value to a decimal price. Values below the divisor
    /// are already decimals and pass through.
    pub fn apply(&self, raw: f64) -> Option<f64> {
        if !raw.is_finite() || raw <= 0.0 {
            return None;
        }
        let divisor = self.divisor();
        if divisor > 1.0 && raw >= divisor {
            Some(((raw / divisor) * 100.0).round() / 100.0)
        } else {
            Some(raw)
        }
    }
}

/// Field-name knowledge for one upstream source
#[derive(Debug, Clone)]
pub struct SourceProfile {
    /// Prefix for generated ids when the event has none
    pub name: &'static str,
    pub id_fields: &'static [&'static str],
    pub home_fields: &'static [&'static str],
    pub away_fields: &'static [&'static str],
    pub kickoff_fields: &'static [&'static str],
    /// Single field holding "Home - Away", with its separator
    pub teams_field: Option<(&'static str, &'static str)>,
    /// Objects keyed by outcome label
    pub odds_fields: &'static [&'static str],
    /// Arrays of markets carrying outcome lists
    pub market_fields: &'static [&'static str],
    /// Provider outcome ids, read only when a selection has no usable label
    pub outcome_ids: &'static [(&'static str, Outcome)],
    pub scale: OddsScale,
}

/// Map an outcome label onto home/draw/away.
///
/// Recognises `1`/`X`/`2`, `home`/`draw`/`away`, and prefixed provider keys
/// such as `S_1X2_1`, where the segment before the last `_` must be `1x2`.
pub fn outcome_from_label(label: &str) -> Option<Outcome> {
    let label = label.trim().to_lowercase();
    let tail = match label.rsplit_once('_') {
        Some((market, tail)) => {
            if market.rsplit('_').next() != Some("1x2") {
                return None;
            }
            tail
        }
        None => label.as_str(),
    };

    match tail {
        "1" | "home" | "h" | "home team" => Some(Outcome::Home),
        "x" | "draw" | "d" | "tie" => Some(Outcome::Draw),
        "2" | "away" | "a" | "away team" => Some(Outcome::Away),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// First alias present on the object, in priority order
fn first_text(event: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| event.get(*f).and_then(as_text))
}

fn first_price(selection: &Value, scale: OddsScale) -> Option<f64> {
    PRICE_FIELDS
        .iter()
        .find_map(|f| selection.get(*f).and_then(as_price))
        .and_then(|raw| scale.apply(raw))
}

fn odds_from_map(map: &serde_json::Map<String, Value>, scale: OddsScale, odds: &mut MatchOdds) {
    for (label, raw) in map {
        let Some(outcome) = outcome_from_label(label) else {
            continue;
        };
        if let Some(price) = as_price(raw).and_then(|r| scale.apply(r)) {
            odds.set(outcome, price);
        }
    }
}

fn market_labels(market: &Value) -> impl Iterator<Item = String> + '_ {
    MARKET_LABEL_FIELDS
        .iter()
        .filter_map(|f| market.get(*f).and_then(as_text))
}

fn is_match_result_market(market: &Value) -> bool {
    market_labels(market).any(|label| MATCH_RESULT_MARKETS.contains(&label.to_lowercase().as_str()))
}

fn selection_outcome(selection: &Value, profile: &SourceProfile) -> Option<Outcome> {
    let labelled = SELECTION_LABEL_FIELDS
        .iter()
        .filter_map(|f| selection.get(*f).and_then(as_text))
        .find_map(|label| outcome_from_label(&label));
    if labelled.is_some() {
        return labelled;
    }

    let id = selection.get("id").and_then(as_text)?;
    profile
        .outcome_ids
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, outcome)| *outcome)
}

fn odds_from_markets(markets: &[Value], profile: &SourceProfile, odds: &mut MatchOdds) {
    // A lone market is taken as 1X2 only when nothing labels it otherwise
    let market = markets.iter().find(|m| is_match_result_market(m)).or_else(|| {
        match markets {
            [only] if market_labels(only).next().is_none() => Some(only),
            _ => None,
        }
    });
    let Some(market) = market else {
        return;
    };

    let selections = SELECTION_FIELDS
        .iter()
        .find_map(|f| market.get(*f).and_then(Value::as_array));
    let Some(selections) = selections else {
        return;
    };

    for selection in selections {
        let outcome = selection_outcome(selection, profile);
        if let (Some(outcome), Some(price)) = (outcome, first_price(selection, profile.scale)) {
            odds.set(outcome, price);
        }
    }
}

/// Pull a 1X2 odds triple out of an event using every convention the profile allows
pub fn extract_odds(event: &Value, profile: &SourceProfile) -> MatchOdds {
    let mut odds = MatchOdds::default();

    for field in profile.odds_fields {
        if let Some(map) = event.get(*field).and_then(Value::as_object) {
            odds_from_map(map, profile.scale, &mut odds);
        }
    }

    if odds.is_empty() {
        for field in profile.market_fields {
            if let Some(markets) = event.get(*field).and_then(Value::as_array) {
                odds_from_markets(markets, profile, &mut odds);
            }
        }
    }

    odds
}

fn split_teams(event: &Value, profile: &SourceProfile) -> Option<(String, String)> {
    let (field, separator) = profile.teams_field?;
    let combined = event.get(field).and_then(as_text)?;
    let (home, away) = combined.split_once(separator)?;
    Some((home.trim().to_string(), away.trim().to_string()))
}

/// Convert one upstream event into a record. Unusable events give `None`.
pub fn normalize_event(event: &Value, profile: &SourceProfile, index: usize) -> Option<MatchRecord> {
    let (mut home_team, mut away_team) = (
        first_text(event, profile.home_fields).unwrap_or_default(),
        first_text(event, profile.away_fields).unwrap_or_default(),
    );
    if home_team.is_empty() && away_team.is_empty() {
        if let Some((home, away)) = split_teams(event, profile) {
            home_team = home;
            away_team = away;
        }
    }

    let record = MatchRecord {
        id: first_text(event, profile.id_fields)
            .unwrap_or_else(|| format!("{}_{}", profile.name, index)),
        home_team,
        away_team,
        kickoff: first_text(event, profile.kickoff_fields).unwrap_or_default(),
        odds: extract_odds(event, profile),
    };

    if record.is_usable() {
        Some(record)
    } else {
        debug!(
            source = profile.name,
            id = %record.id,
            "Dropping event without both team names and at least one price"
        );
        None
    }
}

pub fn normalize_events(events: &[Value], profile: &SourceProfile) -> Vec<MatchRecord> {
    events
        .iter()
        .enumerate()
        .filter_map(|(i, event)| normalize_event(event, profile, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GENERIC: SourceProfile = SourceProfile {
        name: "generic",
        id_fields: &["id"],
        home_fields: &["home_team", "homeTeam", "home"],
        away_fields: &["away_team", "awayTeam", "away"],
        kickoff_fields: &["kickoff", "start_time"],
        teams_field: Some(("DS", " - ")),
        odds_fields: &["odds", "O"],
        market_fields: &["markets"],
        outcome_ids: &[],
        scale: OddsScale::Decimal,
    };

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_from_label("1"), Some(Outcome::Home));
        assert_eq!(outcome_from_label("X"), Some(Outcome::Draw));
        assert_eq!(outcome_from_label("2"), Some(Outcome::Away));
        assert_eq!(outcome_from_label("Home"), Some(Outcome::Home));
        assert_eq!(outcome_from_label("draw"), Some(Outcome::Draw));
        assert_eq!(outcome_from_label("S_1X2_2"), Some(Outcome::Away));
        assert_eq!(outcome_from_label("S_1X2_X"), Some(Outcome::Draw));
        // Other markets that happen to end in a 1X2 token
        assert_eq!(outcome_from_label("S_HT1X2_1"), None);
        assert_eq!(outcome_from_label("S_DC_1X"), None);
        assert_eq!(outcome_from_label("Over 2.5"), None);
    }

    #[test]
    fn test_scale_divides_large_integers() {
        assert_eq!(OddsScale::TenThousandths.apply(21000.0), Some(2.1));
        assert_eq!(OddsScale::Hundredths.apply(345.0), Some(3.45));
        // Already a decimal
        assert_eq!(OddsScale::TenThousandths.apply(2.1), Some(2.1));
        assert_eq!(OddsScale::Decimal.apply(0.0), None);
    }

    #[test]
    fn test_aliases_in_priority_order() {
        let event = json!({
            "id": "e1",
            "homeTeam": "Arsenal",
            "home": "ignored",
            "away_team": "Chelsea",
            "start_time": "2026-01-19T15:00:00Z",
            "odds": {"home": 1.85, "draw": "3.40", "away": 4.2}
        });
        let record = normalize_event(&event, &GENERIC, 0).unwrap();
        assert_eq!(record.home_team, "Arsenal");
        assert_eq!(record.away_team, "Chelsea");
        assert_eq!(record.kickoff, "2026-01-19T15:00:00Z");
        assert_eq!(record.odds.draw, Some(3.4));
        assert_eq!(record.odds.away, Some(4.2));
    }

    #[test]
    fn test_missing_team_is_dropped() {
        let event = json!({
            "home_team": "Enyimba",
            "odds": {"1": 1.9, "X": 3.1, "2": 3.8}
        });
        assert!(normalize_event(&event, &GENERIC, 0).is_none());
    }

    #[test]
    fn test_event_without_prices_is_dropped() {
        let event = json!({"home_team": "Enyimba", "away_team": "Rivers United", "odds": {}});
        assert!(normalize_event(&event, &GENERIC, 0).is_none());
    }

    #[test]
    fn test_combined_teams_and_prefixed_keys() {
        let event = json!({
            "ID": 991,
            "DS": "Real Madrid - Barcelona",
            "O": {"S_1X2_1": "2.10", "S_1X2_X": "3.60", "S_1X2_2": "3.25", "S_OU@2.5_O": "1.70"}
        });
        let record = normalize_event(&event, &GENERIC, 4).unwrap();
        assert_eq!(record.id, "generic_4");
        assert_eq!(record.home_team, "Real Madrid");
        assert_eq!(record.away_team, "Barcelona");
        assert_eq!(record.odds.home, Some(2.1));
        assert_eq!(record.odds.away, Some(3.25));
    }

    #[test]
    fn test_markets_array_with_scaled_prices() {
        let profile = SourceProfile {
            scale: OddsScale::TenThousandths,
            ..GENERIC
        };
        let event = json!({
            "id": "sr:match:1",
            "home": "Inter",
            "away": "Milan",
            "markets": [
                {"id": "18", "desc": "Over/Under", "outcomes": [{"desc": "Over 2.5", "odds": "19000"}]},
                {"id": "1", "desc": "1X2", "outcomes": [
                    {"id": "1", "desc": "Home", "odds": "21000"},
                    {"id": "2", "desc": "Draw", "odds": "33000"},
                    {"id": "3", "desc": "Away", "odds": "36500"}
                ]}
            ]
        });
        let record = normalize_event(&event, &profile, 0).unwrap();
        assert_eq!(record.odds.home, Some(2.1));
        assert_eq!(record.odds.draw, Some(3.3));
        assert_eq!(record.odds.away, Some(3.65));
    }

    #[test]
    fn test_outcome_ids_follow_the_profile() {
        let markets = json!([
            {"id": "1", "outcomes": [
                {"id": "1", "odds": "21000"},
                {"id": "2", "odds": "33000"},
                {"id": "3", "odds": "36500"}
            ]}
        ]);
        let event = json!({"id": "sr:match:7", "home": "Lazio", "away": "Roma", "markets": markets});

        let profile = SourceProfile {
            scale: OddsScale::TenThousandths,
            outcome_ids: &[("1", Outcome::Home), ("2", Outcome::Draw), ("3", Outcome::Away)],
            ..GENERIC
        };
        let record = normalize_event(&event, &profile, 0).unwrap();
        assert_eq!(record.odds.home, Some(2.1));
        assert_eq!(record.odds.draw, Some(3.3));
        assert_eq!(record.odds.away, Some(3.65));

        // Without an id table, bare ids are not guessed at
        assert!(normalize_event(&event, &GENERIC, 0).is_none());
    }

    #[test]
    fn test_lone_labelled_market_must_be_match_result() {
        let half_time = json!({
            "home": "Lazio",
            "away": "Roma",
            "markets": [{"desc": "1st Half - 1X2", "outcomes": [
                {"desc": "Home", "odds": 2.9}, {"desc": "Draw", "odds": 2.0}
            ]}]
        });
        assert!(normalize_event(&half_time, &GENERIC, 0).is_none());

        let unlabelled = json!({
            "home": "Lazio",
            "away": "Roma",
            "markets": [{"outcomes": [{"desc": "Home", "odds": 2.1}]}]
        });
        let record = normalize_event(&unlabelled, &GENERIC, 0).unwrap();
        assert_eq!(record.odds.home, Some(2.1));
    }

    #[test]
    fn test_normalize_events_keeps_only_usable() {
        let events = vec![
            json!({"home": "Kano Pillars", "away": "Shooting Stars", "odds": {"1": 2.0}}),
            json!({"home": "Remo Stars", "odds": {"1": 2.0}}),
            json!("not an object"),
        ];
        let records = normalize_events(&events, &GENERIC);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "generic_0");
    }
}
