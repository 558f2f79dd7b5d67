//! Pure reshaping of fetched collections into what the screens display.

use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::model::{Match, Player, Scorer};

/// Fixtures and scorers shown on the dashboard.
pub const DASHBOARD_LIST_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionGroup {
    Goalkeeper,
    Defence,
    Midfield,
    Offence,
    Unknown,
}

impl PositionGroup {
    pub fn classify(position: Option<&str>) -> Self {
        match position.map(str::trim) {
            Some("Goalkeeper") => PositionGroup::Goalkeeper,
            Some("Defence" | "Defender" | "Centre-Back" | "Left-Back" | "Right-Back") => {
                PositionGroup::Defence
            }
            Some("Midfield" | "Midfielder" | "Defensive Midfield" | "Attacking Midfield") => {
                PositionGroup::Midfield
            }
            Some("Offence" | "Forward" | "Centre-Forward" | "Right Winger" | "Left Winger") => {
                PositionGroup::Offence
            }
            _ => PositionGroup::Unknown,
        }
    }
}

/// A team's squad split into five disjoint groups, input order kept within each.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SquadGrouping {
    pub goalkeeper: Vec<Player>,
    pub defence: Vec<Player>,
    pub midfield: Vec<Player>,
    pub offence: Vec<Player>,
    pub unknown: Vec<Player>,
}

impl SquadGrouping {
    pub fn group(&self, group: PositionGroup) -> &[Player] {
        match group {
            PositionGroup::Goalkeeper => &self.goalkeeper,
            PositionGroup::Defence => &self.defence,
            PositionGroup::Midfield => &self.midfield,
            PositionGroup::Offence => &self.offence,
            PositionGroup::Unknown => &self.unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.goalkeeper.len()
            + self.defence.len()
            + self.midfield.len()
            + self.offence.len()
            + self.unknown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group_squad(squad: Option<&[Player]>) -> SquadGrouping {
    let mut grouping = SquadGrouping::default();
    for player in squad.unwrap_or_default() {
        let bucket = match PositionGroup::classify(player.position.as_deref()) {
            PositionGroup::Goalkeeper => &mut grouping.goalkeeper,
            PositionGroup::Defence => &mut grouping.defence,
            PositionGroup::Midfield => &mut grouping.midfield,
            PositionGroup::Offence => &mut grouping.offence,
            PositionGroup::Unknown => &mut grouping.unknown,
        };
        bucket.push(player.clone());
    }
    grouping
}

/// Goals by player id. A repeated id overwrites the earlier entry.
pub fn scorer_goals(scorers: &[Scorer]) -> HashMap<u64, u32> {
    scorers.iter().map(|s| (s.player.id, s.goals)).collect()
}

/// `round(won / played * 100)`, or 0 before any game is played.
pub fn win_rate(won: u32, played: u32) -> u32 {
    if played == 0 {
        return 0;
    }
    let (won, played) = (won as u64, played as u64);
    ((200 * won + played) / (2 * played)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

pub fn goal_difference_label(goal_difference: i32) -> (String, Tone) {
    match goal_difference {
        gd if gd > 0 => (format!("+{}", gd), Tone::Positive),
        gd if gd < 0 => (gd.to_string(), Tone::Negative),
        _ => ("0".to_string(), Tone::Neutral),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Continental,
    Relegation,
}

pub fn tier(position: u32) -> Option<Tier> {
    match position {
        1..=4 => Some(Tier::Continental),
        p if p >= 18 => Some(Tier::Relegation),
        _ => None,
    }
}

/// Earliest fixture that has not kicked off yet.
pub fn next_fixture(matches: &[Match], now: DateTime<Utc>) -> Option<&Match> {
    matches
        .iter()
        .filter(|m| m.utc_date > now)
        .min_by_key(|m| m.utc_date)
}

/// e.g. "Sat 12:30" in the given zone.
pub fn format_kickoff<Tz>(kickoff: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    kickoff.with_timezone(tz).format("%a %H:%M").to_string()
}

/// Completed years between birth and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

pub fn nationality_code(nationality: &str) -> String {
    nationality.chars().take(3).collect::<String>().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

/// Splits "W,D,L" into results; unrecognised entries are skipped.
pub fn form_results(form: &str) -> Vec<FormResult> {
    form.split(',')
        .filter_map(|r| match r.trim() {
            "W" => Some(FormResult::Win),
            "D" => Some(FormResult::Draw),
            "L" => Some(FormResult::Loss),
            _ => None,
        })
        .collect()
}
