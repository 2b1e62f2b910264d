//! The enemy roster table and the detail pane for the selected member.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::roster::{EnemyMember, SortColumn};
use crate::ui::styles;
use crate::utils::{format_duration, thousands};
use crate::utils::links::{player_attack_link, player_profile_link};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_table(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let rows_data = app.roster_rows();
    let now = Utc::now().timestamp();

    // Build header with sort indicators
    let sort_indicator = |col: SortColumn| {
        if app.sort_column == col {
            if app.sort_ascending { " ▲" } else { " ▼" }
        } else {
            ""
        }
    };

    let header_cells = [
        Cell::from(" "),
        Cell::from(format!("Online{}", sort_indicator(SortColumn::Online))),
        Cell::from(format!("Name{}", sort_indicator(SortColumn::Name))),
        Cell::from(format!("Lvl{}", sort_indicator(SortColumn::Level))),
        Cell::from(format!("Status{}", sort_indicator(SortColumn::Status))),
        Cell::from(format!("FF{}", sort_indicator(SortColumn::FairFight))),
        Cell::from(format!("Stats{}", sort_indicator(SortColumn::BattleStats))),
        Cell::from(format!("Last Action{}", sort_indicator(SortColumn::LastAction))),
    ];

    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|row| {
            let pin_marker = if row.pinned { "●" } else { " " };

            let online = Cell::from(Span::styled(
                row.member.last_action.status.label(),
                Style::default().fg(styles::online_color(row.member.last_action.status)),
            ));

            let status = Cell::from(Span::styled(
                status_text(row, now),
                Style::default().fg(styles::state_color(row.member.status.state)),
            ));

            let ff = match row.fair_fight() {
                Some(ff) => Cell::from(Span::styled(
                    format!("{:.2}", ff),
                    Style::default().fg(styles::ff_color(ff)),
                )),
                None => Cell::from(Span::styled("N/A", styles::muted_style())),
            };

            let stats = match row.ffs.as_ref().and_then(|f| f.bs_estimate_human.clone()) {
                Some(human) => Cell::from(human),
                None => Cell::from(Span::styled("N/A", styles::muted_style())),
            };

            Row::new(vec![
                Cell::from(Span::styled(pin_marker, styles::highlight_style())),
                online,
                Cell::from(row.member.name.clone()),
                Cell::from(format!("{:>3}", row.member.level)),
                status,
                ff,
                stats,
                Cell::from(row.member.last_action.relative.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(1),      // Pin marker
        Constraint::Length(9),      // Online
        Constraint::Fill(2),        // Name
        Constraint::Length(4),      // Level
        Constraint::Fill(3),        // Status
        Constraint::Length(6),      // FF
        Constraint::Length(7),      // Stats
        Constraint::Fill(2),        // Last action
    ];

    let title = match app.enemy_faction {
        Some(ref faction) => {
            let mut title = format!(
                " {} - {} [{}] ({} members) ",
                faction.tag,
                faction.name,
                faction.id,
                faction.members.len()
            );
            let active = app.config.filters.active_count();
            if active > 0 {
                title.push_str(&format!("- {} filters ", active));
            }
            title
        }
        None => " No opposing faction - waiting for a ranked war ".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.roster_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

/// The status cell text, with a live countdown for hospital stays.
fn status_text(row: &EnemyMember, now: i64) -> String {
    let status = &row.member.status;
    let description = {
        let cleaned = status.clean_description();
        if cleaned.is_empty() {
            status.state.label().to_string()
        } else {
            cleaned
        }
    };

    if status.until > 0 {
        let remaining = status.seconds_remaining(now);
        if remaining > 0 {
            return format!("{} ({})", description, format_duration(remaining));
        }
        return format!("{} (Out now)", description);
    }

    description
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_row();

    let content = match selected {
        Some(row) => {
            let now = Utc::now().timestamp();
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("{} [{}]", row.member.name, row.id),
                    styles::title_style(),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Level:       ", styles::muted_style()),
                    Span::raw(row.member.level.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Position:    ", styles::muted_style()),
                    Span::raw(row.member.position.clone()),
                ]),
                Line::from(vec![
                    Span::styled("In faction:  ", styles::muted_style()),
                    Span::raw(format!("{} days", row.member.days_in_faction)),
                ]),
                Line::from(vec![
                    Span::styled("Status:      ", styles::muted_style()),
                    Span::styled(
                        status_text(&row, now),
                        Style::default().fg(styles::state_color(row.member.status.state)),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Last action: ", styles::muted_style()),
                    Span::raw(row.member.last_action.relative.clone()),
                ]),
                Line::from(""),
            ];

            match row.ffs {
                Some(ref ffs) => {
                    lines.push(Line::from(Span::styled(
                        "Stat estimate",
                        styles::highlight_style(),
                    )));
                    if let Some(ff) = ffs.fair_fight {
                        lines.push(Line::from(vec![
                            Span::styled("Fair fight:  ", styles::muted_style()),
                            Span::styled(
                                format!("{:.2}", ff),
                                Style::default().fg(styles::ff_color(ff)),
                            ),
                        ]));
                    }
                    if let Some(bs) = ffs.bs_estimate {
                        let human = ffs
                            .bs_estimate_human
                            .clone()
                            .unwrap_or_else(|| thousands(bs));
                        lines.push(Line::from(vec![
                            Span::styled("Battle stats:", styles::muted_style()),
                            Span::raw(format!(" {}", human)),
                        ]));
                    }
                }
                None => {
                    lines.push(Line::from(Span::styled(
                        "No stat estimate",
                        styles::muted_style(),
                    )));
                }
            }

            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Profile: ", styles::muted_style()),
                Span::raw(player_profile_link(row.id)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Attack:  ", styles::muted_style()),
                Span::raw(player_attack_link(row.id)),
            ]));

            lines
        }
        None => vec![Line::from(Span::styled(
            "No member selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Target ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}
