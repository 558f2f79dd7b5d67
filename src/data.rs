use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use image::DynamicImage;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::model::{
    Match, MatchesResponse, Scorer, ScorersResponse, StandingRow, StandingsResponse, TeamDetail,
};

const AUTH_HEADER: &str = "X-Auth-Token";
const USER_AGENT: &str = concat!("pl-dash/", env!("CARGO_PKG_VERSION"));

/// Upstream reads behind the pages and the crest downloads.
pub trait FootballSource: Send + Sync {
    fn standings(&self) -> impl Future<Output = Result<Vec<StandingRow>, FetchError>> + Send;
    fn matches(&self) -> impl Future<Output = Result<Vec<Match>, FetchError>> + Send;
    fn scorers(&self) -> impl Future<Output = Result<Vec<Scorer>, FetchError>> + Send;
    fn team(&self, team_id: u64) -> impl Future<Output = Result<TeamDetail, FetchError>> + Send;
    fn crest(&self, url: &str) -> impl Future<Output = Result<DynamicImage, FetchError>> + Send;

    /// Forget reused responses so the next reads go to the network.
    fn expire(&self) {}
}

pub struct DataClient {
    client: Client,
    config: Config,
    cache: Mutex<ResponseCache>,
}

impl DataClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            cache: Mutex::new(ResponseCache::new(config.freshness)),
            config: config.clone(),
        })
    }

    pub async fn fetch_standings(&self) -> Result<Vec<StandingRow>, FetchError> {
        let body = self.get(&self.config.competition_url("/standings")).await?;
        parse_standings(&body)
    }

    pub async fn fetch_scorers(&self) -> Result<Vec<Scorer>, FetchError> {
        let body = self.get(&self.config.competition_url("/scorers")).await?;
        parse_scorers(&body)
    }

    pub async fn fetch_matches(&self) -> Result<Vec<Match>, FetchError> {
        let body = self.get(&self.config.competition_url("/matches?status=SCHEDULED")).await?;
        parse_matches(&body)
    }

    pub async fn fetch_team(&self, team_id: u64) -> Result<TeamDetail, FetchError> {
        let body = self.get(&self.config.team_url(team_id)).await.inspect_err(|e| {
            warn!(team_id, status = ?e.status_code(), error = %e, "team request failed");
        })?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Crests live on a public CDN, so no credential is sent.
    pub async fn fetch_crest(&self, url: &str) -> Result<DynamicImage, FetchError> {
        let resp = self.client.get(url).send().await?;
        check_status(resp.status())?;
        let bytes = resp.bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let cached = self.lock_cache().get(url, Instant::now());
        if let Some(body) = cached {
            debug!(%url, "serving cached response");
            return Ok(body);
        }

        info!(%url, "requesting");
        let started = Instant::now();
        let resp = self
            .client
            .get(url)
            .header(AUTH_HEADER, &self.config.api_token)
            .send()
            .await?;

        let status = resp.status();
        if let Err(e) = check_status(status) {
            warn!(%url, status = status.as_u16(), "upstream returned an error status");
            return Err(e);
        }

        let body = resp.text().await?;
        self.lock_cache().insert(url, body.clone(), started);
        Ok(body)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FootballSource for DataClient {
    async fn standings(&self) -> Result<Vec<StandingRow>, FetchError> {
        self.fetch_standings().await
    }

    async fn matches(&self) -> Result<Vec<Match>, FetchError> {
        self.fetch_matches().await
    }

    async fn scorers(&self) -> Result<Vec<Scorer>, FetchError> {
        self.fetch_scorers().await
    }

    async fn team(&self, team_id: u64) -> Result<TeamDetail, FetchError> {
        self.fetch_team(team_id).await
    }

    async fn crest(&self, url: &str) -> Result<DynamicImage, FetchError> {
        self.fetch_crest(url).await
    }

    fn expire(&self) {
        debug!("expiring cached responses");
        self.lock_cache().clear();
    }
}

/// Maps a non-success status onto the failure kinds the views know about.
pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited);
    }
    Err(FetchError::Status {
        code: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

pub fn parse_standings(body: &str) -> Result<Vec<StandingRow>, FetchError> {
    let data: StandingsResponse = serde_json::from_str(body)?;
    let mut groups = data.standings;
    let total = groups
        .iter()
        .position(|group| group.kind.as_deref() == Some("TOTAL"))
        .unwrap_or(0);
    let table = (total < groups.len())
        .then(|| groups.swap_remove(total).table)
        .ok_or_else(|| FetchError::Shape("standings response has no table".to_string()))?;
    validate_table(&table)?;
    Ok(table)
}

pub fn parse_matches(body: &str) -> Result<Vec<Match>, FetchError> {
    let data: MatchesResponse = serde_json::from_str(body)?;
    Ok(data.matches)
}

pub fn parse_scorers(body: &str) -> Result<Vec<Scorer>, FetchError> {
    let data: ScorersResponse = serde_json::from_str(body)?;
    Ok(data.scorers)
}

/// Positions must be exactly 1..=N and every goal difference must add up.
fn validate_table(table: &[StandingRow]) -> Result<(), FetchError> {
    let mut positions: Vec<u32> = table.iter().map(|row| row.position).collect();
    positions.sort_unstable();
    if positions.iter().zip(1u32..).any(|(&p, expected)| p != expected) {
        return Err(FetchError::Shape(format!(
            "standings positions are not contiguous: {:?}",
            positions
        )));
    }

    for row in table {
        let expected = row.goals_for as i64 - row.goals_against as i64;
        if row.goal_difference as i64 != expected {
            return Err(FetchError::Shape(format!(
                "goal difference for {} is {} but goals are {}-{}",
                row.team.name, row.goal_difference, row.goals_for, row.goals_against
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CachedBody {
    body: String,
    fetched_at: Instant,
}

/// Response bodies keyed by URL, reusable for one freshness window.
#[derive(Debug)]
pub struct ResponseCache {
    window: Duration,
    entries: HashMap<String, CachedBody>,
}

impl ResponseCache {
    pub fn new(window: Duration) -> Self {
        Self { window, entries: HashMap::new() }
    }

    pub fn get(&self, url: &str, now: Instant) -> Option<String> {
        let entry = self.entries.get(url)?;
        if now.saturating_duration_since(entry.fetched_at) < self.window {
            Some(entry.body.clone())
        } else {
            None
        }
    }

    pub fn insert(&mut self, url: &str, body: String, now: Instant) {
        if self.window.is_zero() {
            return;
        }
        let window = self.window;
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.fetched_at) < window);
        self.entries.insert(url.to_string(), CachedBody { body, fetched_at: now });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
