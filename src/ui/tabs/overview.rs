//! Overview cards: the user's own condition and both factions' chains.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::FactionChain;
use crate::ui::styles;
use crate::utils::format_duration;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_user_card(frame, app, chunks[0]);
    render_chain_card(frame, app, chunks[1]);
}

fn render_user_card(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(ref user) = app.user else {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "Waiting for profile data...",
            styles::muted_style(),
        )));
        frame.render_widget(placeholder, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Name and state
            Constraint::Length(1), // Life gauge
            Constraint::Length(1), // Energy gauge
            Constraint::Length(1), // Medical cooldown
        ])
        .split(inner);

    let state_color = styles::state_color(user.status.state);
    let header = Line::from(vec![
        Span::styled(
            format!("{} [{}]", user.name, user.player_id),
            styles::title_style(),
        ),
        Span::raw("  Lv "),
        Span::raw(user.level.to_string()),
        Span::raw("  "),
        Span::styled(user.status.description.clone(), Style::default().fg(state_color)),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let life_pct = user.life.percent();
    let life = Gauge::default()
        .gauge_style(Style::default().fg(Color::Red))
        .ratio((life_pct / 100.0).clamp(0.0, 1.0))
        .label(format!("Life {}/{}", user.life.current, user.life.maximum));
    frame.render_widget(life, rows[1]);

    if let Some(ref energy) = user.energy {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio((energy.percent() / 100.0).clamp(0.0, 1.0))
            .label(format!("Energy {}/{}", energy.current, energy.maximum));
        frame.render_widget(gauge, rows[2]);
    }

    let (remaining, standard) = user.cooldowns.medical_progress();
    if remaining > 0 {
        let ratio = 1.0 - (remaining as f64 / standard as f64).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(ratio)
            .label(format!("Medical cd {}", format_duration(remaining)));
        frame.render_widget(gauge, rows[3]);
    } else {
        let line = Line::from(Span::styled(
            "Medical cooldown ready",
            styles::success_style(),
        ));
        frame.render_widget(Paragraph::new(line), rows[3]);
    }
}

fn render_chain_card(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Chains ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Own chain
            Constraint::Length(2), // Enemy chain
        ])
        .split(inner);

    // Ticked copies so the countdown moves between refreshes
    let own = app.own_chain_now();
    let enemy = app.enemy_chain_now();
    render_chain_line(frame, "Us  ", own.as_ref(), rows[0]);
    render_chain_line(frame, "Them", enemy.as_ref(), rows[1]);
}

fn render_chain_line(frame: &mut Frame, label: &str, chain: Option<&FactionChain>, area: Rect) {
    let Some(chain) = chain else {
        let line = Line::from(vec![
            Span::styled(format!("{}  ", label), styles::muted_style()),
            Span::styled("no chain data", styles::muted_style()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    if !chain.is_active() {
        // A chain with hits but no time left has just dropped
        let word = if chain.current > 0 { "expired" } else { "idle" };
        let mut spans = vec![
            Span::styled(format!("{}  ", label), styles::muted_style()),
            Span::raw(word),
        ];
        if chain.cooldown > 0 {
            spans.push(Span::styled(
                format!("  (cooldown {})", format_duration(chain.cooldown)),
                styles::muted_style(),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    // Short timeouts are the ones that matter, make them loud.
    let timeout_style = if chain.timeout <= 60 {
        styles::error_style()
    } else {
        styles::highlight_style()
    };

    let header = Line::from(vec![
        Span::styled(format!("{}  ", label), styles::muted_style()),
        Span::styled(format!("{}/{}", chain.current, chain.max), styles::title_style()),
        Span::raw(format!("  x{:.2}  ", chain.modifier)),
        Span::styled(
            format!("drops in {}", format_duration(chain.timeout)),
            timeout_style,
        ),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(styles::PRIMARY))
        .ratio((chain.percent() / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", chain.percent()));
    frame.render_widget(gauge, rows[1]);
}
