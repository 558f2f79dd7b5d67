use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::data::FootballSource;
use crate::error::FetchError;
use crate::model::{Match, Scorer, StandingRow, TeamDetail};
use crate::stats::{self, SquadGrouping};

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub standings: Vec<StandingRow>,
    pub matches: Vec<Match>,
    pub scorers: Vec<Scorer>,
}

impl Dashboard {
    pub fn next_fixture(&self, now: DateTime<Utc>) -> Option<&Match> {
        stats::next_fixture(&self.matches, now)
    }

    pub fn upcoming(&self) -> &[Match] {
        &self.matches[..self.matches.len().min(stats::DASHBOARD_LIST_LEN)]
    }

    pub fn top_scorers(&self) -> &[Scorer] {
        &self.scorers[..self.scorers.len().min(stats::DASHBOARD_LIST_LEN)]
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamPage {
    pub team: TeamDetail,
    pub squad: SquadGrouping,
    pub goals: HashMap<u64, u32>,
}

impl TeamPage {
    pub fn goals_for(&self, player_id: u64) -> Option<u32> {
        self.goals.get(&player_id).copied()
    }
}

/// All three reads or nothing: the first failure fails the page.
pub async fn load_dashboard<S: FootballSource>(source: &S) -> Result<Dashboard, FetchError> {
    let (standings, matches, scorers) =
        tokio::try_join!(source.standings(), source.matches(), source.scorers())?;
    Ok(Dashboard { standings, matches, scorers })
}

pub async fn load_team_page<S: FootballSource>(
    source: &S,
    team_id: u64,
) -> Result<TeamPage, FetchError> {
    let (team, scorers) = tokio::try_join!(source.team(team_id), source.scorers())?;
    let squad = stats::group_squad(team.squad.as_deref());
    let goals = stats::scorer_goals(&scorers);
    Ok(TeamPage { team, squad, goals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_matches, parse_scorers, parse_standings};
    use crate::model::Player;
    use image::DynamicImage;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        fail_standings: bool,
        fail_matches: bool,
        fail_scorers: bool,
        rate_limited_team: bool,
        calls: AtomicUsize,
    }

    fn fixture(name: &str) -> String {
        fs::read_to_string(format!("fixtures/{}", name)).expect("Failed to read fixture")
    }

    fn failure() -> FetchError {
        FetchError::Status { code: 500, reason: "Internal Server Error".to_string() }
    }

    impl FootballSource for FakeSource {
        async fn standings(&self) -> Result<Vec<StandingRow>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_standings {
                return Err(failure());
            }
            parse_standings(&fixture("standings.json"))
        }

        async fn matches(&self) -> Result<Vec<Match>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_matches {
                return Err(FetchError::RateLimited);
            }
            parse_matches(&fixture("matches.json"))
        }

        async fn scorers(&self) -> Result<Vec<Scorer>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_scorers {
                return Err(failure());
            }
            parse_scorers(&fixture("scorers.json"))
        }

        async fn team(&self, team_id: u64) -> Result<TeamDetail, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.rate_limited_team {
                return Err(FetchError::RateLimited);
            }
            let mut team: TeamDetail = serde_json::from_str(&fixture("team.json"))?;
            team.id = team_id;
            Ok(team)
        }

        async fn crest(&self, _url: &str) -> Result<DynamicImage, FetchError> {
            Err(FetchError::Shape("no crests here".to_string()))
        }
    }

    #[tokio::test]
    async fn dashboard_loads_all_three() {
        let source = FakeSource::default();
        let dashboard = load_dashboard(&source).await.expect("dashboard should load");
        assert_eq!(dashboard.standings.len(), 20);
        assert_eq!(dashboard.matches.len(), 3);
        assert_eq!(dashboard.scorers.len(), 3);
        assert_eq!(dashboard.upcoming().len(), 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn any_failed_read_fails_the_dashboard() {
        for source in [
            FakeSource { fail_standings: true, ..Default::default() },
            FakeSource { fail_matches: true, ..Default::default() },
            FakeSource { fail_scorers: true, ..Default::default() },
        ] {
            assert!(load_dashboard(&source).await.is_err());
        }

        let source = FakeSource { fail_matches: true, ..Default::default() };
        let err = load_dashboard(&source).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn team_page_groups_squad_and_attaches_goals() {
        let source = FakeSource::default();
        let page = load_team_page(&source, 57).await.expect("team page should load");
        assert_eq!(page.team.id, 57);
        assert_eq!(page.squad.len(), 7);
        assert_eq!(page.squad.goalkeeper.len(), 1);
        assert_eq!(page.squad.defence.len(), 2);
        assert_eq!(page.squad.midfield.len(), 1);
        assert_eq!(page.squad.offence.len(), 2);
        assert_eq!(page.squad.unknown.len(), 1);
        assert_eq!(page.goals_for(7978), Some(8));
        assert_eq!(page.goals_for(3754), Some(5));
        assert_eq!(page.goals_for(8004), None);
    }

    #[tokio::test]
    async fn team_page_surfaces_rate_limit() {
        let source = FakeSource { rate_limited_team: true, ..Default::default() };
        let err = load_team_page(&source, 57).await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded. Please wait 1 minute.");
    }

    #[test]
    fn dashboard_lists_are_capped() {
        let scorers = (0..8)
            .map(|i| Scorer { goals: 10 - i, ..Default::default() })
            .collect();
        let dashboard = Dashboard { scorers, ..Default::default() };
        assert_eq!(dashboard.top_scorers().len(), 5);
        assert_eq!(dashboard.top_scorers()[0].goals, 10);
        assert!(dashboard.upcoming().is_empty());
    }

    #[test]
    fn team_without_squad_has_empty_groups() {
        let team = TeamDetail { squad: None, ..Default::default() };
        let squad = stats::group_squad(team.squad.as_deref());
        assert!(squad.is_empty());
        let team = TeamDetail { squad: Some(vec![Player::default()]), ..Default::default() };
        assert_eq!(stats::group_squad(team.squad.as_deref()).unknown.len(), 1);
    }
}
