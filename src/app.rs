use std::collections::HashMap;

use chrono::Utc;
use crossterm::event::KeyCode;
use image::DynamicImage;
use ratatui::widgets::TableState;
use tracing::{debug, info};

use crate::countdown::CountdownTimer;
use crate::error::FetchError;
use crate::model::Team;
use crate::pages::{Dashboard, TeamPage};
use crate::worker::{Request, Update};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Team(u64),
}

#[derive(Debug)]
pub enum Load<T> {
    Loading,
    Ready(T),
    Failed(FetchError),
}

impl<T> Load<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub dashboard: Load<Dashboard>,
    pub team: Load<TeamPage>,
    pub table_state: TableState,
    pub squad_scroll: u16,
    pub countdown: Option<CountdownTimer>,
    pub crests: HashMap<u64, DynamicImage>,
    pub show_crests: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            should_quit: false,
            screen: Screen::Dashboard,
            dashboard: Load::Loading,
            team: Load::Loading,
            table_state: TableState::default(),
            squad_scroll: 0,
            countdown: None,
            crests: HashMap::new(),
            show_crests: true,
        }
    }
}

impl App {
    /// The app plus the requests needed to fill its first screen.
    pub fn new(start_team: Option<u64>) -> (Self, Vec<Request>) {
        let mut app = Self::default();
        app.table_state.select(Some(0));
        let mut requests = vec![Request::Dashboard { fresh: false }];
        if let Some(team_id) = start_team {
            requests.extend(app.open_team(team_id));
        }
        (app, requests)
    }

    pub fn on_key(&mut self, code: KeyCode) -> Vec<Request> {
        match code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('l') => {
                self.show_crests = !self.show_crests;
                Vec::new()
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                Vec::new()
            }
            KeyCode::Enter => match (self.screen, self.selected_team().map(|t| t.id)) {
                (Screen::Dashboard, Some(team_id)) => self.open_team(team_id),
                _ => Vec::new(),
            },
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.back(),
            _ => Vec::new(),
        }
    }

    pub fn apply(&mut self, update: Update) -> Vec<Request> {
        match update {
            Update::Dashboard(Ok(dashboard)) => {
                let rows = dashboard.standings.len();
                self.dashboard = Load::Ready(dashboard);
                match self.table_state.selected() {
                    Some(i) if rows > 0 && i >= rows => self.table_state.select(Some(rows - 1)),
                    None if rows > 0 => self.table_state.select(Some(0)),
                    _ => {}
                }
                self.mount_countdown();
                self.fixture_crests()
            }
            Update::Dashboard(Err(e)) => {
                self.dashboard = Load::Failed(e);
                if self.screen == Screen::Dashboard {
                    self.countdown = None;
                }
                Vec::new()
            }
            Update::Team(team_id, result) => {
                if self.screen != Screen::Team(team_id) {
                    debug!(team_id, "discarding team page for a screen no longer shown");
                    return Vec::new();
                }
                match result {
                    Ok(page) => {
                        let crest = page.team.crest.clone().map(|url| Request::Crest { team_id, url });
                        self.team = Load::Ready(page);
                        crest.into_iter().collect()
                    }
                    Err(e) => {
                        self.team = Load::Failed(e);
                        Vec::new()
                    }
                }
            }
            Update::Crest(team_id, img) => {
                self.crests.insert(team_id, img);
                Vec::new()
            }
        }
    }

    pub fn selected_team(&self) -> Option<&Team> {
        let dashboard = self.dashboard.ready()?;
        let row = dashboard.standings.get(self.table_state.selected()?)?;
        Some(&row.team)
    }

    fn open_team(&mut self, team_id: u64) -> Vec<Request> {
        info!(team_id, "opening team page");
        self.screen = Screen::Team(team_id);
        self.team = Load::Loading;
        self.squad_scroll = 0;
        // Leaving the dashboard tears its countdown down.
        self.countdown = None;
        vec![Request::Team(team_id)]
    }

    fn back(&mut self) -> Vec<Request> {
        if self.screen == Screen::Dashboard {
            return Vec::new();
        }
        self.screen = Screen::Dashboard;
        self.team = Load::Loading;
        if matches!(self.dashboard, Load::Ready(_)) {
            self.mount_countdown();
            Vec::new()
        } else {
            self.dashboard = Load::Loading;
            vec![Request::Dashboard { fresh: false }]
        }
    }

    fn reload(&mut self) -> Vec<Request> {
        match self.screen {
            Screen::Dashboard => {
                if !matches!(self.dashboard, Load::Ready(_)) {
                    self.dashboard = Load::Loading;
                }
                vec![Request::Dashboard { fresh: true }]
            }
            Screen::Team(team_id) => {
                self.team = Load::Loading;
                vec![Request::Team(team_id)]
            }
        }
    }

    /// Starts a countdown for the next fixture while the dashboard is shown,
    /// keeping the running one if it already targets that kickoff.
    fn mount_countdown(&mut self) {
        if self.screen != Screen::Dashboard {
            return;
        }
        let Some(dashboard) = self.dashboard.ready() else {
            self.countdown = None;
            return;
        };
        let Some(kickoff) = dashboard.next_fixture(Utc::now()).map(|m| m.utc_date) else {
            self.countdown = None;
            return;
        };
        if self.countdown.as_ref().is_some_and(|c| c.target() == kickoff) {
            return;
        }
        self.countdown = CountdownTimer::start(kickoff, Utc::now);
    }

    fn fixture_crests(&self) -> Vec<Request> {
        let Some(fixture) = self.dashboard.ready().and_then(|d| d.next_fixture(Utc::now())) else {
            return Vec::new();
        };
        [&fixture.home_team, &fixture.away_team]
            .into_iter()
            .filter_map(|team| {
                team.crest.clone().map(|url| Request::Crest { team_id: team.id, url })
            })
            .collect()
    }

    fn next(&mut self) {
        match self.screen {
            Screen::Dashboard => {
                let rows = self.dashboard.ready().map_or(0, |d| d.standings.len());
                if rows == 0 {
                    return;
                }
                let i = match self.table_state.selected() {
                    Some(i) if i >= rows - 1 => 0,
                    Some(i) => i + 1,
                    None => 0,
                };
                self.table_state.select(Some(i));
            }
            Screen::Team(_) => self.squad_scroll = self.squad_scroll.saturating_add(1),
        }
    }

    fn previous(&mut self) {
        match self.screen {
            Screen::Dashboard => {
                let rows = self.dashboard.ready().map_or(0, |d| d.standings.len());
                if rows == 0 {
                    return;
                }
                let i = match self.table_state.selected() {
                    Some(0) | None => rows - 1,
                    Some(i) => i - 1,
                };
                self.table_state.select(Some(i));
            }
            Screen::Team(_) => self.squad_scroll = self.squad_scroll.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_scorers, parse_standings};
    use crate::model::{Match, TeamDetail};
    use crate::stats;
    use std::fs;

    fn dashboard(kickoff_in: chrono::Duration) -> Dashboard {
        let standings = parse_standings(&fs::read_to_string("fixtures/standings.json").unwrap()).unwrap();
        let scorers = parse_scorers(&fs::read_to_string("fixtures/scorers.json").unwrap()).unwrap();
        let home = standings[0].team.clone();
        let away = standings[3].team.clone();
        let matches = vec![Match {
            id: 1,
            utc_date: Utc::now() + kickoff_in,
            home_team: home,
            away_team: away,
            ..Default::default()
        }];
        Dashboard { standings, matches, scorers }
    }

    fn team_page(team_id: u64) -> TeamPage {
        let team: TeamDetail =
            serde_json::from_str(&fs::read_to_string("fixtures/team.json").unwrap()).unwrap();
        TeamPage {
            squad: stats::group_squad(team.squad.as_deref()),
            team: TeamDetail { id: team_id, ..team },
            goals: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn starts_by_requesting_the_dashboard() {
        let (app, requests) = App::new(None);
        assert_eq!(requests, vec![Request::Dashboard { fresh: false }]);
        assert!(matches!(app.dashboard, Load::Loading));

        let (app, requests) = App::new(Some(57));
        assert_eq!(requests, vec![Request::Dashboard { fresh: false }, Request::Team(57)]);
        assert_eq!(app.screen, Screen::Team(57));
    }

    #[tokio::test]
    async fn ready_dashboard_mounts_countdown_and_asks_for_crests() {
        let (mut app, _) = App::new(None);
        let requests = app.apply(Update::Dashboard(Ok(dashboard(chrono::Duration::hours(2)))));
        assert!(app.countdown.as_ref().is_some_and(|c| c.is_running()));
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| matches!(r, Request::Crest { .. })));
    }

    #[tokio::test]
    async fn no_countdown_without_future_fixture() {
        let (mut app, _) = App::new(None);
        app.apply(Update::Dashboard(Ok(dashboard(chrono::Duration::hours(-2)))));
        assert!(app.countdown.is_none());
    }

    #[tokio::test]
    async fn entering_a_team_drops_the_countdown_and_back_restores_it() {
        let (mut app, _) = App::new(None);
        app.apply(Update::Dashboard(Ok(dashboard(chrono::Duration::hours(2)))));
        app.on_key(KeyCode::Down);

        let requests = app.on_key(KeyCode::Enter);
        assert_eq!(requests, vec![Request::Team(65)]);
        assert_eq!(app.screen, Screen::Team(65));
        assert!(app.countdown.is_none());

        let requests = app.on_key(KeyCode::Esc);
        assert!(requests.is_empty());
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.countdown.is_some());
    }

    #[tokio::test]
    async fn failed_dashboard_shows_error_and_no_countdown() {
        let (mut app, _) = App::new(None);
        app.apply(Update::Dashboard(Ok(dashboard(chrono::Duration::hours(2)))));
        app.apply(Update::Dashboard(Err(FetchError::RateLimited)));
        assert!(matches!(app.dashboard, Load::Failed(FetchError::RateLimited)));
        assert!(app.countdown.is_none());
        assert_eq!(app.on_key(KeyCode::Char('r')), vec![Request::Dashboard { fresh: true }]);
        assert!(matches!(app.dashboard, Load::Loading));
    }

    #[tokio::test]
    async fn stale_team_result_is_discarded() {
        let (mut app, _) = App::new(Some(57));
        app.apply(Update::Team(61, Ok(team_page(61))));
        assert!(matches!(app.team, Load::Loading));

        let requests = app.apply(Update::Team(57, Ok(team_page(57))));
        assert!(matches!(app.team, Load::Ready(_)));
        assert_eq!(
            requests,
            vec![Request::Crest { team_id: 57, url: "https://crests.football-data.org/57.png".to_string() }]
        );
    }

    #[tokio::test]
    async fn team_error_returns_to_dashboard_on_esc() {
        let (mut app, _) = App::new(Some(57));
        app.apply(Update::Team(57, Err(FetchError::RateLimited)));
        assert!(matches!(app.team, Load::Failed(_)));
        // The dashboard never loaded, so going back asks for it again.
        assert_eq!(app.on_key(KeyCode::Backspace), vec![Request::Dashboard { fresh: false }]);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[tokio::test]
    async fn selection_wraps() {
        let (mut app, _) = App::new(None);
        app.apply(Update::Dashboard(Ok(dashboard(chrono::Duration::hours(2)))));
        app.on_key(KeyCode::Up);
        assert_eq!(app.table_state.selected(), Some(19));
        app.on_key(KeyCode::Char('j'));
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.selected_team().map(|t| t.id), Some(57));
    }
}
