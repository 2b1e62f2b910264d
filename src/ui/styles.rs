// Allow dead code: Style functions defined for consistent UI
#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

use crate::models::{MemberState, OnlineStatus};

// Color palette
pub const PRIMARY: Color = Color::Rgb(192, 64, 64);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Color for a member's physical state.
pub fn state_color(state: MemberState) -> Color {
    match state {
        MemberState::Okay => Color::Green,
        MemberState::Hospital => Color::Red,
        MemberState::Traveling => Color::Blue,
        MemberState::Abroad => Color::Yellow,
        _ => Color::Gray,
    }
}

/// Color for an online indicator.
pub fn online_color(status: OnlineStatus) -> Color {
    match status {
        OnlineStatus::Online => Color::Green,
        OnlineStatus::Idle => Color::Yellow,
        _ => Color::Gray,
    }
}

/// Color for a fair-fight value, matching the filter buckets.
pub fn ff_color(ff: f64) -> Color {
    if ff < 2.0 {
        Color::Blue
    } else if ff < 4.0 {
        Color::Green
    } else if ff < 6.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
