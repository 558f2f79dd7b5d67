use chrono::{Local, Utc};
use image::{DynamicImage, GenericImageView};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Wrap,
    },
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::app::{App, Load, Screen};
use crate::error::FetchError;
use crate::model::{Player, StandingRow};
use crate::pages::{Dashboard, TeamPage};
use crate::stats::{self, PositionGroup};
use crate::theme;

const CREST_WIDTH: u16 = 22;
const HELP_DASHBOARD: &str = " q quit  j/k move  Enter team  r reload  l crests ";
const HELP_TEAM: &str = " q quit  j/k scroll  Esc dashboard  r reload  l crests ";

pub fn ui(f: &mut Frame, app: &mut App, competition: &str) {
    match app.screen {
        Screen::Dashboard => draw_dashboard_screen(f, app, competition),
        Screen::Team(_) => draw_team_screen(f, app),
    }
}

fn draw_dashboard_screen(f: &mut Frame, app: &mut App, competition: &str) {
    let size = f.area();
    match app.dashboard {
        Load::Loading => draw_loading(f, size),
        Load::Failed(ref e) => draw_error(f, size, "Could not load data", e, "Press r to retry, q to quit"),
        Load::Ready(_) => draw_dashboard(f, app, competition),
    }
}

fn draw_team_screen(f: &mut Frame, app: &App) {
    let size = f.area();
    match &app.team {
        Load::Loading => draw_loading(f, size),
        Load::Failed(e) => draw_error(
            f,
            size,
            "Could not load team data",
            e,
            "Press Esc to return to the dashboard",
        ),
        Load::Ready(page) => draw_team(f, app, page),
    }
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let p = Paragraph::new("Loading…")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, centered(area, 40, 3));
}

fn draw_error(f: &mut Frame, area: Rect, headline: &str, err: &FetchError, hint: &str) {
    let mut lines = vec![
        Line::from(Span::styled("⚠", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(headline.to_string(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Gray))),
    ];
    if let (Some(code), false) = (err.status_code(), err.is_rate_limited()) {
        lines.push(Line::from(Span::styled(
            format!("Status: {}", code),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {} ", hint),
        Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD),
    )));

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
    f.render_widget(p, centered(area, 70, 12));
}

fn draw_dashboard(f: &mut Frame, app: &mut App, competition: &str) {
    let size = f.area();
    let has_countdown = app.countdown.is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                     // Header
            Constraint::Length(if has_countdown { 11 } else { 0 }),   // Countdown
            Constraint::Min(0),                                        // Tables
            Constraint::Length(1),                                     // Help
        ])
        .split(size);

    draw_header(f, competition, chunks[0]);
    if has_countdown {
        draw_countdown(f, app, chunks[1]);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(chunks[2]);
    draw_standings(f, app, body[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(stats::DASHBOARD_LIST_LEN as u16 + 2),
            Constraint::Min(0),
        ])
        .split(body[1]);
    if let Some(dashboard) = app.dashboard.ready() {
        draw_fixtures(f, dashboard, side[0]);
        draw_scorers(f, dashboard, side[1]);
    }

    f.render_widget(Paragraph::new(HELP_DASHBOARD).style(Style::default().fg(Color::DarkGray)), chunks[3]);
}

fn draw_header(f: &mut Frame, competition: &str, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", competition_name(competition)),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Season Data Hub", Style::default().fg(Color::DarkGray)),
    ]);
    let live = Line::from(Span::styled(
        "● LIVE UPDATES ",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Right);

    let block = Block::default().borders(Borders::BOTTOM);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);
    f.render_widget(Paragraph::new(title), halves[0]);
    f.render_widget(Paragraph::new(live), halves[1]);
}

fn competition_name(code: &str) -> &str {
    match code {
        "PL" => "Premier League",
        "ELC" => "Championship",
        "PD" => "La Liga",
        "BL1" => "Bundesliga",
        "SA" => "Serie A",
        "FL1" => "Ligue 1",
        "DED" => "Eredivisie",
        "PPL" => "Primeira Liga",
        "CL" => "Champions League",
        other => other,
    }
}

fn draw_countdown(f: &mut Frame, app: &App, area: Rect) {
    let (Some(timer), Some(dashboard)) = (&app.countdown, app.dashboard.ready()) else {
        return;
    };
    let Some(fixture) = dashboard.matches.iter().find(|m| m.utc_date == timer.target()) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    // --- Matchup ---
    let crest_width = if app.show_crests { CREST_WIDTH } else { 0 };
    let matchup = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(crest_width),
            Constraint::Min(0),
            Constraint::Length(crest_width),
        ])
        .split(halves[0]);

    if app.show_crests {
        if let Some(img) = app.crests.get(&fixture.home_team.id) {
            render_crest(f, img, matchup[0]);
        }
        if let Some(img) = app.crests.get(&fixture.away_team.id) {
            render_crest(f, img, matchup[2]);
        }
    }

    let codes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(4), Constraint::Length(1), Constraint::Min(0)])
        .split(matchup[1]);
    let versus = format!("{} v {}", fixture.home_team.code(), fixture.away_team.code());
    if codes[1].width < 40 {
        let p = Paragraph::new(versus)
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(p, codes[1]);
    } else {
        let big = BigText::builder()
            .pixel_size(PixelSize::Quadrant)
            .style(Style::default().fg(Color::White))
            .lines(vec![versus.into()])
            .alignment(Alignment::Center)
            .build();
        f.render_widget(big, codes[1]);
    }
    let kickoff = stats::format_kickoff(&fixture.utc_date, &Local);
    let detail = match fixture.matchday {
        Some(day) => format!("{}  ·  Matchday {}", kickoff, day),
        None => kickoff,
    };
    f.render_widget(
        Paragraph::new(detail).alignment(Alignment::Center).style(Style::default().fg(Color::Gray)),
        codes[2],
    );

    // --- Timer ---
    let timer_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Label
            Constraint::Length(1), // Spacer
            Constraint::Length(4), // Digits
            Constraint::Length(1), // Units
            Constraint::Min(0),
        ])
        .split(halves[1]);

    let label_style = if timer.is_running() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(
        Paragraph::new(Span::styled("● KICKOFF COUNTDOWN", label_style)).alignment(Alignment::Center),
        timer_area[0],
    );

    let digits = timer.time_left().to_string();
    if timer_area[2].width < 48 {
        let p = Paragraph::new(digits)
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(p, timer_area[2]);
    } else {
        let big = BigText::builder()
            .pixel_size(PixelSize::Quadrant)
            .style(Style::default().fg(Color::White))
            .lines(vec![digits.into()])
            .alignment(Alignment::Center)
            .build();
        f.render_widget(big, timer_area[2]);
    }
    f.render_widget(
        Paragraph::new("DAYS     HRS      MIN      SEC")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        timer_area[3],
    );
}

fn draw_standings(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(dashboard) = app.dashboard.ready() else {
        return;
    };
    let accent = app
        .selected_team()
        .map(|t| theme::accent(&t.name))
        .unwrap_or(Color::White);

    let header = Row::new(["Pos", "Club", "MP", "W", "D", "L", "GD", "Pts", "Win %", "Form"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .bottom_margin(1);
    let rows: Vec<Row> = dashboard.standings.iter().map(standing_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(15),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().title(" LEAGUE STANDINGS ").borders(Borders::ALL))
    .row_highlight_style(Style::default().bg(Color::DarkGray).fg(accent).add_modifier(Modifier::BOLD))
    .highlight_symbol("▌");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn standing_row(row: &StandingRow) -> Row<'static> {
    let (gd, tone) = stats::goal_difference_label(row.goal_difference);
    let rate = stats::win_rate(row.won, row.played_games);
    let form: Vec<Span> = row
        .form
        .as_deref()
        .map(stats::form_results)
        .unwrap_or_default()
        .into_iter()
        .map(|r| {
            let ch = match r {
                stats::FormResult::Win => "W ",
                stats::FormResult::Draw => "D ",
                stats::FormResult::Loss => "L ",
            };
            Span::styled(ch, Style::default().fg(theme::form_color(r)))
        })
        .collect();
    let name = row.team.short_name.clone().unwrap_or_else(|| row.team.name.clone());

    Row::new(vec![
        Cell::from(format!("{:>3}", row.position))
            .style(Style::default().fg(theme::tier_color(stats::tier(row.position))).add_modifier(Modifier::BOLD)),
        Cell::from(name),
        Cell::from(row.played_games.to_string()),
        Cell::from(row.won.to_string()),
        Cell::from(row.draw.to_string()),
        Cell::from(row.lost.to_string()),
        Cell::from(gd).style(Style::default().fg(theme::tone_color(tone))),
        Cell::from(row.points.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(Line::from(vec![
            Span::styled(win_bar(rate, 10), Style::default().fg(Color::Blue)),
            Span::raw(format!(" {:>3}", rate)),
        ])),
        Cell::from(Line::from(form)),
    ])
}

/// Ten-cell bar filled in proportion to a 0..=100 percentage.
fn win_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn draw_fixtures(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let items: Vec<ListItem> = dashboard
        .upcoming()
        .iter()
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4}", m.home_team.code()), Style::default().fg(Color::White)),
                Span::styled("  vs  ", Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<4}", m.away_team.code()), Style::default().fg(Color::White)),
                Span::styled(
                    format!(" {} ", stats::format_kickoff(&m.utc_date, &Local)),
                    Style::default().bg(Color::Rgb(0x38, 0x00, 0x3c)).fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().title(" FIXTURES ").borders(Borders::ALL));
    f.render_widget(list, area);
}

fn draw_scorers(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let items: Vec<ListItem> = dashboard
        .top_scorers()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let badge = if i == 0 {
                Style::default().bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            };
            let team = s.team.short_name.clone().unwrap_or_else(|| s.team.name.clone());
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", i + 1), badge),
                    Span::styled(format!(" {}", s.player.name), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", s.goals), Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD)),
                ]),
                Line::from(Span::styled(
                    match s.assists {
                        Some(assists) => format!("    {}  ·  {} assists", team, assists),
                        None => format!("    {}", team),
                    },
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(Block::default().title(" TOP SCORERS ").borders(Borders::ALL));
    f.render_widget(list, area);
}

fn draw_team(f: &mut Frame, app: &App, page: &TeamPage) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Header
            Constraint::Min(0),    // Squad
            Constraint::Length(1), // Help
        ])
        .split(size);

    // --- Header ---
    let team = &page.team;
    let colors = theme::team_theme(&team.name, team.club_colors.as_deref());
    let header = Block::default().bg(colors.secondary).borders(Borders::BOTTOM).border_style(Style::default().fg(colors.primary));
    let header_inner = header.inner(chunks[0]);
    f.render_widget(header, chunks[0]);

    let crest_width = if app.show_crests { CREST_WIDTH } else { 0 };
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(crest_width), Constraint::Min(0)])
        .split(header_inner);
    if app.show_crests {
        if let Some(img) = app.crests.get(&team.id) {
            render_crest(f, img, header_chunks[0]);
        }
    }

    let mut facts = Vec::new();
    if let Some(venue) = &team.venue {
        facts.push(format!("⌂ {}", venue));
    }
    if let Some(coach) = team.coach.as_ref().and_then(|c| c.name.as_ref()) {
        facts.push(format!("Coach: {}", coach));
    }
    if let Some(founded) = team.founded {
        facts.push(format!("Founded {}", founded));
    }
    let mut lines = vec![
        Line::from(Span::styled("← DASHBOARD (Esc)", Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled(
            team.name.to_uppercase(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(facts.join("    "), Style::default().fg(Color::Gray))),
    ];
    let extra: Vec<&str> = [team.club_colors.as_deref(), team.website.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !extra.is_empty() {
        lines.push(Line::from(Span::styled(extra.join("    "), Style::default().fg(Color::DarkGray))));
    }
    f.render_widget(Paragraph::new(lines).style(Style::default().bg(colors.secondary)), header_chunks[1]);

    // --- Squad ---
    let squad = Paragraph::new(squad_lines(page))
        .block(Block::default().title(format!(" SQUAD ({}) ", page.squad.len())).borders(Borders::ALL))
        .scroll((app.squad_scroll, 0));
    f.render_widget(squad, chunks[1]);

    f.render_widget(Paragraph::new(HELP_TEAM).style(Style::default().fg(Color::DarkGray)), chunks[2]);
}

fn squad_lines(page: &TeamPage) -> Vec<Line<'static>> {
    let sections = [
        ("ATTACKERS", PositionGroup::Offence, Color::Red),
        ("MIDFIELDERS", PositionGroup::Midfield, Color::Green),
        ("DEFENDERS", PositionGroup::Defence, Color::Blue),
        ("GOALKEEPERS", PositionGroup::Goalkeeper, Color::Yellow),
        ("OTHERS", PositionGroup::Unknown, Color::Gray),
    ];
    let today = Utc::now().date_naive();
    let mut lines = Vec::new();

    for (title, group, color) in sections {
        let players = page.squad.group(group);
        if players.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for player in players {
            lines.push(player_line(player, page.goals_for(player.id), color, today));
        }
        lines.push(Line::from(""));
    }

    if page.squad.is_empty() {
        lines.push(Line::from(Span::styled(" No squad listed ", Style::default().fg(Color::DarkGray))));
    }
    lines
}

fn player_line(player: &Player, goals: Option<u32>, color: Color, today: chrono::NaiveDate) -> Line<'static> {
    let number = player.shirt_number.map_or_else(|| "-".to_string(), |n| n.to_string());
    let nation = player.nationality.as_deref().map(stats::nationality_code).unwrap_or_default();
    let age = player
        .date_of_birth
        .and_then(|dob| stats::age_on(dob, today))
        .map_or_else(|| "N/A".to_string(), |a| a.to_string());

    let mut spans = vec![
        Span::styled(format!(" {:>3} ", number), Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{:<28}", player.name.to_uppercase()), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{:<20}", player.position.clone().unwrap_or_default()), Style::default().fg(color)),
        Span::styled(format!("{:<5}", nation), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("Age {:>3}", age)),
    ];
    if let Some(goals) = goals {
        spans.push(Span::styled(
            format!("   Goals {}", goals),
            Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

/// Paints a crest with braille dots, skipping transparent pixels.
fn render_crest(f: &mut Frame, img: &DynamicImage, area: Rect) {
    let canvas = Canvas::default()
        .block(Block::default())
        .marker(Marker::Braille)
        .x_bounds([0.0, 40.0])
        .y_bounds([0.0, 20.0])
        .paint(|ctx| {
            let (w, h) = img.dimensions();
            for y in 0..40 {
                for x in 0..80 {
                    let img_x = (x as f64 / 80.0 * w as f64) as u32;
                    let img_y = (y as f64 / 40.0 * h as f64) as u32;
                    if img_x < w && img_y < h {
                        let p = img.get_pixel(img_x, img_y);
                        if p[3] > 128 {
                            ctx.draw(&Points {
                                coords: &[(x as f64 / 2.0, 20.0 - (y as f64 / 2.0))],
                                color: Color::Rgb(p[0], p[1], p[2]),
                            });
                        }
                    }
                }
            }
        });
    f.render_widget(canvas, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
