use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub standings: Vec<StandingGroup>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingGroup {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub table: Vec<StandingRow>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub position: u32,
    pub team: Team,
    pub played_games: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub form: Option<String>, // "W,L,W,D,W"
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u64,
    pub name: String,
    pub short_name: Option<String>,
    pub tla: Option<String>,
    pub crest: Option<String>,
}

impl Team {
    /// Three-letter code, falling back to the start of the name.
    pub fn code(&self) -> String {
        match &self.tla {
            Some(tla) if !tla.is_empty() => tla.clone(),
            _ => self.name.chars().take(3).collect::<String>().to_uppercase(),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    pub matches: Vec<Match>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u64,
    pub utc_date: DateTime<Utc>,
    pub status: String, // "SCHEDULED", "TIMED", ...
    pub matchday: Option<u32>,
    pub home_team: Team,
    pub away_team: Team,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorersResponse {
    pub scorers: Vec<Scorer>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorer {
    pub player: ScorerPlayer,
    pub team: Team,
    pub goals: u32,
    pub assists: Option<u32>,
    pub penalties: Option<u32>,
    pub played_matches: Option<u32>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorerPlayer {
    pub id: u64,
    pub name: String,
    pub section: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    pub id: u64,
    pub name: String,
    pub short_name: Option<String>,
    pub tla: Option<String>,
    pub crest: Option<String>,
    pub venue: Option<String>,
    pub founded: Option<i32>,
    pub club_colors: Option<String>,
    pub website: Option<String>,
    pub coach: Option<Coach>,
    pub squad: Option<Vec<Player>>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub name: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub position: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub shirt_number: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_deserialize_team_fixture() {
        let content = fs::read_to_string("fixtures/team.json").expect("Failed to read team fixture");
        let team: TeamDetail = serde_json::from_str(&content).expect("Failed to deserialize");
        assert_eq!(team.name, "Arsenal FC");
        assert_eq!(team.coach.and_then(|c| c.name).as_deref(), Some("Mikel Arteta"));
        let squad = team.squad.expect("fixture has a squad");
        assert_eq!(squad.len(), 7);
        assert_eq!(squad[0].date_of_birth, NaiveDate::from_ymd_opt(1998, 5, 14));
        assert!(squad.iter().any(|p| p.position.is_none()));
    }

    #[test]
    fn team_code_falls_back_to_name() {
        let team = Team { name: "Brentford FC".to_string(), ..Default::default() };
        assert_eq!(team.code(), "BRE");
        let team = Team { tla: Some("ARS".to_string()), name: "Arsenal FC".to_string(), ..Default::default() };
        assert_eq!(team.code(), "ARS");
    }

    #[test]
    fn scorer_assists_may_be_null() {
        let raw = r#"{"player":{"id":7,"name":"A"},"team":{"id":1,"name":"X"},"goals":3,"assists":null}"#;
        let scorer: Scorer = serde_json::from_str(raw).unwrap();
        assert_eq!(scorer.assists, None);
        assert_eq!(scorer.goals, 3);
    }
}
