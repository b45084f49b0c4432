use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const DEFAULT_BET9JA_BASE_URL: &str = "https://sports.bet9ja.com";
pub const DEFAULT_BETKING_BASE_URL: &str = "https://sportsapi.betking.com";
pub const DEFAULT_SPORTYBET_BASE_URL: &str = "https://www.sportybet.com";

/// Supabase project used as the system of record for reconciled bets
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub upsert_rpc: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Deadline applied to every outbound request
    pub request_timeout: Duration,

    pub odds_api_key: Option<String>,
    pub odds_api_base_url: String,
    pub sharp_bookmaker: String,
    pub sharp_fallback_sport_key: String,
    pub sharp_cache_ttl: Duration,

    pub supabase: Option<SupabaseConfig>,

    pub bet9ja_base_url: String,
    pub betking_base_url: String,
    pub sportybet_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            request_timeout: Duration::from_secs(20),
            odds_api_key: None,
            odds_api_base_url: DEFAULT_ODDS_API_BASE_URL.to_string(),
            sharp_bookmaker: "pinnacle".to_string(),
            sharp_fallback_sport_key: "soccer_epl".to_string(),
            sharp_cache_ttl: Duration::from_secs(15 * 60),
            supabase: None,
            bet9ja_base_url: DEFAULT_BET9JA_BASE_URL.to_string(),
            betking_base_url: DEFAULT_BETKING_BASE_URL.to_string(),
            sportybet_base_url: DEFAULT_SPORTYBET_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Build configuration from the environment (call `dotenv` first).
    /// Missing credentials disable the matching feature rather than failing.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let supabase = match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                service_key,
                upsert_rpc: non_empty("SUPABASE_UPSERT_RPC")
                    .unwrap_or_else(|| "upsert_reconciled_bet".to_string()),
            }),
            _ => None,
        };

        let allowed_origins = non_empty("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port)?,
            allowed_origins,
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            odds_api_key: non_empty("ODDS_API_KEY"),
            odds_api_base_url: base_url("ODDS_API_BASE_URL", defaults.odds_api_base_url),
            sharp_bookmaker: non_empty("SHARP_BOOKMAKER").unwrap_or(defaults.sharp_bookmaker),
            sharp_fallback_sport_key: non_empty("SHARP_FALLBACK_SPORT_KEY")
                .unwrap_or(defaults.sharp_fallback_sport_key),
            sharp_cache_ttl: Duration::from_secs(parse_or(
                "SHARP_CACHE_TTL_SECS",
                defaults.sharp_cache_ttl.as_secs(),
            )?),
            supabase,
            bet9ja_base_url: base_url("BET9JA_BASE_URL", defaults.bet9ja_base_url),
            betking_base_url: base_url("BETKING_BASE_URL", defaults.betking_base_url),
            sportybet_base_url: base_url("SPORTYBET_BASE_URL", defaults.sportybet_base_url),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_url(key: &str, default: String) -> String {
    non_empty(key)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or(default)
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.sharp_cache_ttl, Duration::from_secs(900));
        assert_eq!(config.sharp_bookmaker, "pinnacle");
        assert!(config.supabase.is_none());
        assert!(config.odds_api_key.is_none());
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("NAIJA_TEST_BAD_PORT", "eighty");
        assert!(parse_or::<u16>("NAIJA_TEST_BAD_PORT", 8000).is_err());
        env::set_var("NAIJA_TEST_BAD_PORT", " ");
        assert_eq!(parse_or::<u16>("NAIJA_TEST_BAD_PORT", 8000).unwrap(), 8000);
        env::remove_var("NAIJA_TEST_BAD_PORT");
    }
}
