//! Staff Directory tab - cascade into the remote personnel lookup.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use campuscache_core::directory::ViewState;
use campuscache_core::models::{Role, StaffRecord};

use crate::app::App;
use crate::ui::styles;

use super::{layout_screen, level_columns, render_level_column, render_search_bar, render_suggestions};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (search_area, columns_area, result_area) = layout_screen(area);

    let placeholder = if app.staff.has_search_universe() {
        "search staff by name"
    } else {
        "search by name (pick a role first: [1]-[4])"
    };
    render_search_bar(frame, app, search_area, placeholder);

    let columns = level_columns(columns_area, 3);
    for (level, name) in ["Zone", "School", "Role"].iter().enumerate() {
        render_level_column(frame, app, columns[level], level, name);
    }

    render_result(frame, app, result_area);
    render_suggestions(frame, app, search_area);
}

fn result_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    match app.view() {
        ViewState::StaffList(records) => render_staff_table(frame, app, area, &records),
        ViewState::StaffDetail(record) => render_staff_detail(frame, area, &record),
        ViewState::Loading => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Loading...",
                styles::highlight_style(),
            )))
            .block(result_block(" Staff ", false))
            .centered();
            frame.render_widget(paragraph, area);
        }
        ViewState::NoInformation => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "No information available",
                styles::error_style(),
            )))
            .block(result_block(" Staff ", false))
            .centered();
            frame.render_widget(paragraph, area);
        }
        ViewState::LookupFailed(reason) => {
            let lines = vec![
                Line::from(Span::styled("Lookup failed", styles::error_style())),
                Line::from(Span::styled(reason, styles::muted_style())),
            ];
            let paragraph = Paragraph::new(lines)
                .block(result_block(" Staff ", false))
                .centered();
            frame.render_widget(paragraph, area);
        }
        _ => {
            let hint = format!(
                "Pick zone, school and role - or press [1]-[4] for a role-wide lookup ({})",
                Role::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, r)| format!("[{}] {}", i + 1, r))
                    .collect::<Vec<_>>()
                    .join("  ")
            );
            let paragraph = Paragraph::new(Line::from(Span::styled(hint, styles::muted_style())))
                .block(result_block(" Staff ", false))
                .centered();
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_staff_table(frame: &mut Frame, app: &App, area: Rect, records: &[StaffRecord]) {
    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Contact"),
        Cell::from("School"),
        Cell::from("Location"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            Row::new([
                Cell::from(record.name.clone()),
                Cell::from(record.contact_display()),
                Cell::from(record.school.clone()),
                Cell::from(record.location.clone()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Length(16),
        Constraint::Fill(2),
        Constraint::Fill(2),
    ];

    let role = app
        .chain_key(2)
        .or_else(|| records.first().map(|r| r.role.clone()))
        .unwrap_or_else(|| "Staff".to_string());
    let title = format!(" {} ({}) ", role, records.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(result_block(&title, false));

    frame.render_widget(table, area);
}

fn render_staff_detail(frame: &mut Frame, area: Rect, record: &StaffRecord) {
    let field = |name: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{:<10}", name), styles::muted_style()),
            Span::raw(if value.is_empty() { "-".to_string() } else { value.to_string() }),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(record.name.clone(), styles::title_style())),
        Line::from(""),
        field("Contact:", &record.contact_display()),
        field("School:", &record.school),
        field("Role:", &record.role),
        field("Location:", &record.location),
    ];

    let paragraph = Paragraph::new(lines).block(result_block(" Staff ", false));
    frame.render_widget(paragraph, area);
}
