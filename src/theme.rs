use ratatui::style::Color;

use crate::stats::{FormResult, Tier, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const NEUTRAL: Theme = Theme { primary: rgb(0x262626), secondary: rgb(0x0a0a0a) };

const TEAM_THEMES: &[(&str, Theme)] = &[
    ("Arsenal FC", Theme { primary: rgb(0xdc2626), secondary: rgb(0x7f1d1d) }),
    ("Aston Villa FC", Theme { primary: rgb(0x9f1239), secondary: rgb(0x0c4a6e) }),
    ("AFC Bournemouth", Theme { primary: rgb(0xdc2626), secondary: rgb(0x0f172a) }),
    ("Brentford FC", Theme { primary: rgb(0xef4444), secondary: rgb(0xc2410c) }),
    ("Brighton & Hove Albion FC", Theme { primary: rgb(0x06b6d4), secondary: rgb(0x2563eb) }),
    ("Burnley FC", Theme { primary: rgb(0x6c1d45), secondary: rgb(0x0369a1) }),
    ("Chelsea FC", Theme { primary: rgb(0x2563eb), secondary: rgb(0x1e3a8a) }),
    ("Crystal Palace FC", Theme { primary: rgb(0x1d4ed8), secondary: rgb(0xb91c1c) }),
    ("Everton FC", Theme { primary: rgb(0x1d4ed8), secondary: rgb(0x0f172a) }),
    ("Fulham FC", Theme { primary: rgb(0x64748b), secondary: rgb(0x0f172a) }),
    ("Ipswich Town FC", Theme { primary: rgb(0x2563eb), secondary: rgb(0x1e40af) }),
    ("Leeds United FC", Theme { primary: rgb(0xe2e8f0), secondary: rgb(0x1e40af) }),
    ("Leicester City FC", Theme { primary: rgb(0x3b82f6), secondary: rgb(0x1d4ed8) }),
    ("Liverpool FC", Theme { primary: rgb(0xb91c1c), secondary: rgb(0x450a0a) }),
    ("Manchester City FC", Theme { primary: rgb(0x38bdf8), secondary: rgb(0x0369a1) }),
    ("Manchester United FC", Theme { primary: rgb(0xb91c1c), secondary: rgb(0x000000) }),
    ("Newcastle United FC", Theme { primary: rgb(0x334155), secondary: rgb(0x000000) }),
    ("Nottingham Forest FC", Theme { primary: rgb(0xef4444), secondary: rgb(0x991b1b) }),
    ("Southampton FC", Theme { primary: rgb(0xef4444), secondary: rgb(0xb91c1c) }),
    ("Sunderland AFC", Theme { primary: rgb(0xdc2626), secondary: rgb(0x0f172a) }),
    ("Tottenham Hotspur FC", Theme { primary: rgb(0x334155), secondary: rgb(0x0f172a) }),
    ("West Ham United FC", Theme { primary: rgb(0x9f1239), secondary: rgb(0x0c4a6e) }),
    ("Wolverhampton Wanderers FC", Theme { primary: rgb(0xf59e0b), secondary: rgb(0xb45309) }),
];

/// Header colours for a club; unknown clubs fall back to their listed
/// club colours, then to neutral greys.
pub fn team_theme(name: &str, club_colors: Option<&str>) -> Theme {
    if let Some((_, theme)) = TEAM_THEMES.iter().find(|(team, _)| *team == name) {
        return *theme;
    }
    let mut parsed = club_colors
        .unwrap_or_default()
        .split('/')
        .filter_map(|c| named_color(c.trim()));
    match (parsed.next(), parsed.next()) {
        (Some(primary), Some(secondary)) => Theme { primary, secondary },
        (Some(primary), None) => Theme { primary, secondary: NEUTRAL.secondary },
        _ => NEUTRAL,
    }
}

/// Highlight for the selected standings row.
pub fn accent(name: &str) -> Color {
    if name.contains("Arsenal") {
        rgb(0xef4444)
    } else if name.contains("City") {
        rgb(0x38bdf8)
    } else if name.contains("Liverpool") {
        rgb(0xdc2626)
    } else if name.contains("Chelsea") {
        rgb(0x2563eb)
    } else if name.contains("United") && name.contains("Manchester") {
        rgb(0xb91c1c)
    } else if name.contains("Villa") {
        rgb(0x9f1239)
    } else if name.contains("Tottenham") {
        rgb(0xf8fafc)
    } else {
        Color::White
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name.to_ascii_lowercase().as_str() {
        "red" => rgb(0xdc2626),
        "white" => rgb(0xf8fafc),
        "black" => rgb(0x000000),
        "blue" | "royal blue" => rgb(0x2563eb),
        "navy blue" | "navy" => rgb(0x1e3a8a),
        "sky blue" => rgb(0x38bdf8),
        "claret" | "maroon" => rgb(0x6c1d45),
        "yellow" | "gold" => rgb(0xfacc15),
        "amber" | "orange" => rgb(0xf59e0b),
        "green" => rgb(0x16a34a),
        "grey" | "gray" | "silver" => rgb(0x64748b),
        _ => return None,
    };
    Some(color)
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Positive => Color::Green,
        Tone::Negative => Color::Red,
        Tone::Neutral => Color::DarkGray,
    }
}

pub fn tier_color(tier: Option<Tier>) -> Color {
    match tier {
        Some(Tier::Continental) => Color::LightBlue,
        Some(Tier::Relegation) => Color::LightRed,
        None => Color::Gray,
    }
}

pub fn form_color(result: FormResult) -> Color {
    match result {
        FormResult::Win => Color::Green,
        FormResult::Draw => Color::Gray,
        FormResult::Loss => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_team_uses_table() {
        let theme = team_theme("Chelsea FC", Some("Royal Blue / White"));
        assert_eq!(theme.primary, Color::Rgb(0x25, 0x63, 0xeb));
    }

    #[test]
    fn unknown_team_falls_back_to_club_colors() {
        let theme = team_theme("Hull City AFC", Some("Amber / Black"));
        assert_eq!(theme, Theme { primary: rgb(0xf59e0b), secondary: rgb(0x000000) });
        assert_eq!(team_theme("Nowhere FC", None), NEUTRAL);
        assert_eq!(team_theme("Nowhere FC", Some("Puce")), NEUTRAL);
    }

    #[test]
    fn accent_matches_name_fragments() {
        assert_eq!(accent("Manchester City FC"), rgb(0x38bdf8));
        assert_eq!(accent("Manchester United FC"), rgb(0xb91c1c));
        assert_eq!(accent("Everton FC"), Color::White);
    }
}
