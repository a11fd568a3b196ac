//! Class Timings tab - local cascade over the bundled timetable.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use campuscache_core::directory::ViewState;
use campuscache_core::models::timetable::TIMING_LEVELS;

use crate::app::App;
use crate::ui::styles;

use super::{layout_screen, level_columns, render_level_column, render_search_bar, render_suggestions};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (search_area, columns_area, result_area) = layout_screen(area);

    render_search_bar(frame, app, search_area, "search a school by name");

    let columns = level_columns(columns_area, TIMING_LEVELS.len());
    for (level, name) in ["Zone", "School", "Grade", "Section"].iter().enumerate() {
        render_level_column(frame, app, columns[level], level, name);
    }

    render_result(frame, app, result_area);

    // Drawn last so the dropdown sits on top of the columns
    render_suggestions(frame, app, search_area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    match app.view() {
        ViewState::Timings(pairs) => render_timings_table(frame, app, area, &pairs),
        _ => {
            let block = Block::default()
                .title(" Timetable ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false));
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Please select all options",
                styles::muted_style(),
            )))
            .block(block)
            .centered();
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_timings_table(frame: &mut Frame, app: &App, area: Rect, pairs: &[(String, String)]) {
    let header = Row::new([Cell::from("Subject"), Cell::from("Time")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = pairs
        .iter()
        .map(|(subject, time)| {
            Row::new([Cell::from(subject.clone()), Cell::from(time.clone())])
                .style(styles::list_item_style())
        })
        .collect();

    let widths = [Constraint::Percentage(55), Constraint::Percentage(45)];

    let title = match (app.chain_key(2), app.chain_key(3)) {
        (Some(grade), Some(section)) => {
            format!(" Timetable - Grade {} Section {} ", grade, section)
        }
        _ => " Timetable ".to_string(),
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}
