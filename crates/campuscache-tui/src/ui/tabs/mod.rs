//! Tab-specific content rendering.
//!
//! Both tabs share the same skeleton: a search bar, one column per cascade
//! level, and a result panel underneath. The helpers here render the shared
//! pieces; `timings` and `staff` fill in their own result panels.

pub mod staff;
pub mod timings;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

use super::styles;

/// Maximum height of the suggestion dropdown (rows incl. borders)
const MAX_SUGGESTION_ROWS: u16 = 8;

/// Split a tab's area into search bar, cascade columns and result panel.
pub(crate) fn layout_screen(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Search bar
            Constraint::Percentage(45), // Cascade columns
            Constraint::Min(6),         // Result panel
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

pub(crate) fn render_search_bar(frame: &mut Frame, app: &App, area: Rect, placeholder: &str) {
    let searching = matches!(app.state, AppState::Searching);
    let text = app.search_text();

    let line = if text.is_empty() && !searching {
        Line::from(Span::styled(
            format!("[/] {}", placeholder),
            styles::muted_style(),
        ))
    } else {
        let cursor = if searching { "_" } else { "" };
        Line::from(vec![Span::styled(
            format!("{}{}", text, cursor),
            styles::search_style(),
        )])
    };

    let block = Block::default()
        .title(" Search ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Suggestion dropdown, drawn over whatever sits below the search bar.
/// Nothing is drawn without matches, so a committed pick leaves no trace.
pub(crate) fn render_suggestions(frame: &mut Frame, app: &App, anchor: Rect) {
    if !matches!(app.state, AppState::Searching) {
        return;
    }
    let labels = app.match_labels();
    if labels.is_empty() {
        return;
    }

    let height = (labels.len() as u16 + 2).min(MAX_SUGGESTION_ROWS);
    let rect = Rect {
        x: anchor.x + 2,
        y: anchor.y + anchor.height.saturating_sub(1),
        width: anchor.width.saturating_sub(4),
        height,
    }
    .intersection(frame.area());
    if rect.height < 3 || rect.width < 4 {
        return;
    }

    frame.render_widget(Clear, rect);

    let items: Vec<ListItem> = labels
        .iter()
        .map(|label| ListItem::new(label.clone()).style(styles::list_item_style()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .highlight_style(styles::selected_style())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.suggestion_selection.min(labels.len() - 1)));
    frame.render_stateful_widget(list, rect, &mut state);
}

/// One cascade level as a vertical pick list.
pub(crate) fn render_level_column(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    level: usize,
    name: &str,
) {
    let reachable = level <= app.level_depth();
    let focused = matches!(app.state, AppState::Normal) && app.focus_level == level && reachable;
    let options = app.options_at(level);
    let picked = app.chain_key(level);

    let title = match picked
        .as_ref()
        .and_then(|key| options.iter().find(|c| &c.value == key))
    {
        Some(choice) => format!(" {}: {} ", name, choice.label),
        None => format!(" {} ", name),
    };

    let block = Block::default()
        .title(title)
        .title_style(if picked.is_some() {
            styles::picked_style()
        } else {
            styles::muted_style()
        })
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if !reachable || options.is_empty() {
        // An absent level is simply disabled, never an error
        let hint = if reachable { "(nothing here)" } else { "-" };
        let paragraph = Paragraph::new(Line::from(Span::styled(hint, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = options
        .iter()
        .map(|choice| {
            let style = if Some(&choice.value) == picked.as_ref() {
                styles::picked_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(choice.label.clone()).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.option_selection.min(options.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Equal-width column areas for the cascade levels.
pub(crate) fn level_columns(area: Rect, count: usize) -> Vec<Rect> {
    let constraints: Vec<Constraint> =
        (0..count).map(|_| Constraint::Ratio(1, count as u32)).collect();
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}
