use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::odds_api::OddsApiEvent;

/// Football competitions the bridge knows how to scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    PremierLeague,
    LaLiga,
    SerieA,
    Bundesliga,
    Ligue1,
    Npfl,
    Ucl,
    Europa,
}

impl League {
    pub const ALL: [League; 8] = [
        League::PremierLeague,
        League::LaLiga,
        League::SerieA,
        League::Bundesliga,
        League::Ligue1,
        League::Npfl,
        League::Ucl,
        League::Europa,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            League::PremierLeague => "premierleague",
            League::LaLiga => "laliga",
            League::SerieA => "seriea",
            League::Bundesliga => "bundesliga",
            League::Ligue1 => "ligue1",
            League::Npfl => "npfl",
            League::Ucl => "ucl",
            League::Europa => "europa",
        }
    }

    pub fn supported_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.key()).collect()
    }

    /// Sport key on The Odds API, if it lists the competition at all
    pub fn odds_api_sport_key(&self) -> Option<&'static str> {
        match self {
            League::PremierLeague => Some("soccer_epl"),
            League::LaLiga => Some("soccer_spain_la_liga"),
            League::SerieA => Some("soccer_italy_serie_a"),
            League::Bundesliga => Some("soccer_germany_bundesliga"),
            League::Ligue1 => Some("soccer_france_ligue_one"),
            League::Npfl => None,
            League::Ucl => Some("soccer_uefa_champs_league"),
            League::Europa => Some("soccer_uefa_europa_league"),
        }
    }

    pub fn bet9ja_group_id(&self) -> &'static str {
        match self {
            League::PremierLeague => "170880",
            League::LaLiga => "180928",
            League::SerieA => "167856",
            League::Bundesliga => "180923",
            League::Ligue1 => "950503",
            League::Npfl => "1136424",
            League::Ucl => "1185641",
            League::Europa => "1185689",
        }
    }

    pub fn sportybet_tournament_id(&self) -> &'static str {
        match self {
            League::PremierLeague => "sr:tournament:17",
            League::LaLiga => "sr:tournament:8",
            League::SerieA => "sr:tournament:23",
            League::Bundesliga => "sr:tournament:35",
            League::Ligue1 => "sr:tournament:34",
            League::Npfl => "sr:tournament:2029",
            League::Ucl => "sr:tournament:7",
            League::Europa => "sr:tournament:679",
        }
    }

    pub fn betking_tournament(&self) -> &'static str {
        match self {
            League::PremierLeague => "england/premier-league",
            League::LaLiga => "spain/laliga",
            League::SerieA => "italy/serie-a",
            League::Bundesliga => "germany/bundesliga",
            League::Ligue1 => "france/ligue-1",
            League::Npfl => "nigeria/npfl",
            League::Ucl => "international-clubs/uefa-champions-league",
            League::Europa => "international-clubs/uefa-europa-league",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        League::ALL
            .iter()
            .copied()
            .find(|l| l.key() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unsupported league '{}'. Use one of: {}",
                    s,
                    League::supported_keys().join(", ")
                )
            })
    }
}

/// Nigerian retail bookmakers with an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bookmaker {
    Bet9ja,
    BetKing,
    SportyBet,
}

impl Bookmaker {
    pub const ALL: [Bookmaker; 3] = [Bookmaker::Bet9ja, Bookmaker::BetKing, Bookmaker::SportyBet];

    pub fn key(&self) -> &'static str {
        match self {
            Bookmaker::Bet9ja => "bet9ja",
            Bookmaker::BetKing => "betking",
            Bookmaker::SportyBet => "sportybet",
        }
    }

    pub fn supported_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|b| b.key()).collect()
    }
}

impl fmt::Display for Bookmaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Bookmaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Bookmaker::ALL
            .iter()
            .copied()
            .find(|b| b.key() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unsupported bookmaker '{}'. Use one of: {}, all",
                    s,
                    Bookmaker::supported_keys().join(", ")
                )
            })
    }
}

/// One side of a 1X2 market
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

/// Decimal prices for a 1X2 market, each side independently unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl MatchOdds {
    pub fn set(&mut self, outcome: Outcome, price: f64) {
        match outcome {
            Outcome::Home => self.home = Some(price),
            Outcome::Draw => self.draw = Some(price),
            Outcome::Away => self.away = Some(price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.draw.is_none() && self.away.is_none()
    }
}

/// A bookmaker's view of one fixture, normalized from its upstream JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub kickoff: String, // Source-specific format, passed through untouched
    pub odds: MatchOdds,
}

impl MatchRecord {
    pub fn is_usable(&self) -> bool {
        !self.home_team.trim().is_empty()
            && !self.away_team.trim().is_empty()
            && !self.odds.is_empty()
    }
}

/// League-level response from the sharp odds provider, servable until it expires
#[derive(Debug, Clone)]
pub struct SharpOddsSnapshot {
    pub captured_at: DateTime<Utc>,
    pub events: Vec<OddsApiEvent>,
}

impl SharpOddsSnapshot {
    pub fn new(events: Vec<OddsApiEvent>) -> Self {
        Self {
            captured_at: Utc::now(),
            events,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.captured_at < ttl
    }
}

/// Bookmaker odds paired with sharp odds, as persisted to the datastore
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledBet {
    pub match_id: String,
    pub league: League,
    pub kickoff: String,
    pub bookmaker: Bookmaker,
    pub bookmaker_odds: MatchOdds,
    pub sharp_odds: MatchOdds,
}

/// Deterministic `home_away_YYYYMMDD` identifier used as the upsert key.
/// Two fixtures between the same teams on the same day share an id.
pub fn reconciliation_match_id(home_team: &str, away_team: &str, date: NaiveDate) -> String {
    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    format!(
        "{}_{}_{}",
        strip(home_team),
        strip(away_team),
        date.format("%Y%m%d")
    )
}

/// Response for a single bookmaker and league
#[derive(Debug, Clone, Serialize)]
pub struct BookmakerOdds {
    pub bookmaker: Bookmaker,
    pub league: League,
    pub matches: Vec<MatchRecord>,
    pub timestamp: DateTime<Utc>,
    pub count: usize,
}

impl BookmakerOdds {
    pub fn new(bookmaker: Bookmaker, league: League, matches: Vec<MatchRecord>) -> Self {
        Self {
            bookmaker,
            league,
            count: matches.len(),
            matches,
            timestamp: Utc::now(),
        }
    }
}

/// One bookmaker's slot in the aggregate response
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BookmakerSlot {
    Ok(BookmakerOdds),
    Failed { error: String, status: &'static str },
}

impl BookmakerSlot {
    pub fn failed(error: impl fmt::Display) -> Self {
        BookmakerSlot::Failed {
            error: error.to_string(),
            status: "failed",
        }
    }
}

/// Response for every bookmaker in a league
#[derive(Debug, Clone, Serialize)]
pub struct AllBookmakersOdds {
    pub league: League,
    pub timestamp: DateTime<Utc>,
    pub bookmakers: std::collections::BTreeMap<Bookmaker, BookmakerSlot>,
}
