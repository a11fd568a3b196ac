//! Main frame rendering and layout.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use campuscache_core::utils::truncate_string;

use crate::app::{App, AppState, Tab};

use super::styles;
use super::tabs::{staff, timings};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(12),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  campuscache";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4) as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Timings, Tab::Staff];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let selected = *tab == app.current_tab;
        let style = if selected {
            styles::tab_style(true)
        } else {
            styles::muted_style()
        };
        spans.push(Span::styled(tab.title(), style));
    }
    spans.push(Span::styled("   ([Tab] switches)", styles::muted_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Timings => timings::render(frame, app, area),
        Tab::Staff => staff::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        // Summarize which role rosters have a cached copy
        let cached: Vec<String> = app
            .cache
            .role_ages()
            .into_iter()
            .filter_map(|(role, age)| age.map(|a| format!("{} {}", role, a)))
            .collect();
        if cached.is_empty() {
            " No cached rosters yet - [p] fetches all roles ".to_string()
        } else {
            format!(" Cached: {} ", cached.join(", "))
        }
    };

    let right_text = " [p]refetch | [q]uit ";
    let left_width = area.width.saturating_sub(right_text.len() as u16) as usize;

    let line = Line::from(vec![
        Span::styled(truncate_string(&left_text, left_width), styles::status_bar_style()),
        Span::styled(
            " ".repeat(left_width.saturating_sub(left_text.len().min(left_width))),
            styles::status_bar_style(),
        ),
        Span::styled(right_text, styles::status_bar_style()),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Centered overlay rectangle of the given size, clamped to the frame.
fn centered_rect(frame: &Frame, width: u16, height: u16) -> Rect {
    let area = frame.area();
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn render_help_overlay(frame: &mut Frame) {
    let bindings: [(&str, &str); 10] = [
        ("Tab", "switch between Timings and Staff"),
        ("Left/Right", "move between cascade columns"),
        ("Up/Down", "move inside a column"),
        ("Enter", "pick the highlighted option"),
        ("/", "search (schools by name, staff by name)"),
        ("1-4", "role-wide staff lookup (Staff tab)"),
        ("p", "prefetch all role rosters into the cache"),
        ("Esc", "leave search"),
        ("?", "toggle this help"),
        ("q", "quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, desc) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }

    let rect = centered_rect(frame, 56, bindings.len() as u16 + 4);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(" Help ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn render_quit_overlay(frame: &mut Frame) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Quit campuscache?", styles::title_style())).centered(),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" yes   "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" no"),
        ])
        .centered(),
    ];

    let rect = centered_rect(frame, 30, 6);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
