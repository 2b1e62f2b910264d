use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, CredentialFocus, FilterOption, ValidationState};
use crate::auth::mask_key;
use crate::utils::format_duration;

use super::styles;
use super::tabs::{overview, roster};

pub fn render(frame: &mut Frame, app: &App) {
    let cards_height = if app.collapsed_cards { 0 } else { 6 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),            // Title bar
            Constraint::Length(cards_height), // Overview cards
            Constraint::Min(10),              // Roster
            Constraint::Length(2),            // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    if !app.collapsed_cards {
        overview::render(frame, app, chunks[1]);
    }
    roster::render(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::EditingCredentials) {
        render_credentials_overlay(frame, app);
    }

    if matches!(app.state, AppState::Filtering) {
        render_filter_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Tornwatch";
    let war_summary = match (&app.own_faction, &app.enemy_faction) {
        (Some(us), Some(them)) => format!("{} vs {}", us.name, them.name),
        _ => String::new(),
    };
    let help_hint = "[?] Help";

    let padding = (area.width as usize)
        .saturating_sub(title.len() + war_summary.len() + help_hint.len() + 4);

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding / 2)),
        Span::styled(war_summary, styles::highlight_style()),
        Span::raw(" ".repeat(padding - padding / 2)),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match app.last_refresh {
            Some(last) => {
                let ago = (chrono::Utc::now() - last).num_seconds().max(0);
                format!(" Updated {} ago ", format_duration(ago))
            }
            None => " Waiting for first refresh ".to_string(),
        }
    };

    let center_text = if app.credentials.has_torn_key() {
        format!(
            "Next refresh in {}",
            format_duration(app.seconds_until_refresh())
        )
    } else {
        "No API key - press 'k' to set one".to_string()
    };

    let right_text = " [f]ilter [p]in [k]eys [q]uit ";

    let width = area.width as usize;
    let center_start = (width.saturating_sub(center_text.len())) / 2;
    let left_pad = center_start.saturating_sub(left_text.len());
    let right_start = center_start + center_text.len();
    let right_pad = width
        .saturating_sub(right_start)
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(left_pad)),
        Span::styled(center_text, styles::muted_style()),
        Span::raw(" ".repeat(right_pad)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 26, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("            T O R N W A T C H", styles::title_style())),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key("↑/↓", "Move roster selection"),
        key("PgUp/PgDn", "Move a page at a time"),
        key("Home/End", "Jump to first/last row"),
        Line::from(""),
        Line::from(Span::styled(" Sorting", styles::highlight_style())),
        key("o/n/l/s", "Sort by online/name/level/status"),
        key("F/b/a", "Sort by FF/battle stats/last action"),
        key("0", "Reset to targeting priority"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        key("p", "Pin/unpin selected member"),
        key("f", "Edit roster filters"),
        key("u", "Refresh now"),
        key("k", "Edit API keys"),
        key("c", "Collapse/expand overview cards"),
        key("+/-", "Adjust refresh interval"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

fn render_credentials_overlay(frame: &mut Frame, app: &App) {
    let height = if app.credential_error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  API Keys", styles::title_style())),
        Line::from(""),
    ];

    let field = |label: &'static str,
                 value: &str,
                 focused: bool,
                 validation: ValidationState| {
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        // Show the key while editing it, mask it otherwise
        let shown = if focused {
            value.to_string()
        } else {
            mask_key(value)
        };
        let display = format!("{:<24}", shown);
        let cursor = if focused { "▌" } else { "" };
        let validation_style = match validation {
            ValidationState::Valid => styles::success_style(),
            ValidationState::Invalid => styles::error_style(),
            _ => styles::muted_style(),
        };
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<11}[", label), styles::muted_style()),
            Span::styled(format!("{}{}", display, cursor), style),
            Span::styled("] ", styles::muted_style()),
            Span::styled(validation.label(), validation_style),
        ])
    };

    lines.push(field(
        "Torn:",
        &app.torn_key_input,
        app.credential_focus == CredentialFocus::TornKey,
        app.torn_key_validation,
    ));
    lines.push(Line::from(""));
    lines.push(field(
        "FFScouter:",
        &app.ffscouter_key_input,
        app.credential_focus == CredentialFocus::FfScouterKey,
        app.ffscouter_key_validation,
    ));
    lines.push(Line::from(Span::styled(
        "             (optional, enables stat estimates)",
        styles::muted_style(),
    )));
    lines.push(Line::from(""));

    let button_focused = app.credential_focus == CredentialFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button_label = if button_focused { " ▶ Save ◀ " } else { "   Save   " };
    lines.push(Line::from(vec![
        Span::raw("                 ["),
        Span::styled(button_label, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.credential_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_filter_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(44, 20, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Roster Filters", styles::title_style())),
    ];

    let mut last_group = "";
    for (i, option) in FilterOption::ALL.iter().enumerate() {
        if option.group() != last_group {
            last_group = option.group();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}", last_group),
                styles::highlight_style(),
            )));
        }

        let checkbox = if option.is_active(&app.config.filters) {
            "[x]"
        } else {
            "[ ]"
        };
        let style = if i == app.filter_selection {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(format!("{} {}", checkbox, option.label()), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Space", styles::help_key_style()),
        Span::styled(" toggle  ", styles::muted_style()),
        Span::styled("c", styles::help_key_style()),
        Span::styled(" clear  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" close", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("  Tornwatch", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
