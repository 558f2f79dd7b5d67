use std::time::Duration;

use crate::error::ConfigError;

pub const TOKEN_VAR: &str = "FOOTBALL_DATA_API_KEY";
pub const BASE_URL_VAR: &str = "FOOTBALL_DATA_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org/v4";

/// Settings shared by every request. Built once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_token: String,
    pub base_url: String,
    pub competition: String,
    pub freshness: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("competition", &self.competition)
            .field("freshness", &self.freshness)
            .finish()
    }
}

impl Config {
    pub fn from_env(competition: &str, freshness: Duration) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), competition, freshness)
    }

    pub fn from_lookup<F>(lookup: F, competition: &str, freshness: Duration) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup(TOKEN_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingToken(TOKEN_VAR))?;

        let base_url = lookup(BASE_URL_VAR)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_token,
            base_url,
            competition: competition.trim().to_ascii_uppercase(),
            freshness,
        })
    }

    pub fn competition_url(&self, endpoint: &str) -> String {
        format!("{}/competitions/{}{}", self.base_url, self.competition, endpoint)
    }

    pub fn team_url(&self, team_id: u64) -> String {
        format!("{}/teams/{}", self.base_url, team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[]), "PL", Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken(TOKEN_VAR)));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let res = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "  ")]), "PL", Duration::from_secs(60));
        assert!(res.is_err());
    }

    #[test]
    fn builds_urls_from_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc")]), "pl", Duration::from_secs(60)).unwrap();
        assert_eq!(cfg.competition_url("/standings"), "https://api.football-data.org/v4/competitions/PL/standings");
        assert_eq!(cfg.team_url(57), "https://api.football-data.org/v4/teams/57");
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let cfg = Config::from_lookup(
            lookup_from(&[(TOKEN_VAR, "abc"), (BASE_URL_VAR, "http://localhost:8080/v4/")]),
            "PL",
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(cfg.team_url(1), "http://localhost:8080/v4/teams/1");
    }

    #[test]
    fn debug_hides_token() {
        let cfg = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "secret")]), "PL", Duration::ZERO).unwrap();
        assert!(!format!("{:?}", cfg).contains("secret"));
    }
}
