pub mod brands;
pub mod catalog;
pub mod evaluations;
pub mod filters;
pub mod header;
pub mod help;
pub mod learn;
pub mod notifications;
pub mod report;
pub mod scores;
pub mod theme;

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::Dashboard;
use crate::filters::Dimension;
use crate::query::FetchState;
use crate::route::View;
use theme::ColorScheme;

pub fn draw(frame: &mut Frame, app: &Dashboard, api_url: &str, colors: &ColorScheme) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header + view tabs
            Constraint::Length(3), // filter bar
            Constraint::Min(10),   // page body
            Constraint::Length(1), // help bar
        ])
        .split(frame.area());

    header::draw(frame, outer[0], app, api_url, colors);
    filters::draw(frame, outer[1], app, colors);

    match app.view() {
        View::Overview => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(outer[2]);
            brands::draw(frame, body[0], app, colors);
            scores::draw(frame, body[1], app, colors);
        }
        View::Evaluations => evaluations::draw(frame, outer[2], app, colors),
        View::History => report::draw_history(frame, outer[2], app, colors),
        View::Prompts => catalog::draw(frame, outer[2], app, colors),
        View::Learn => learn::draw(frame, outer[2], app, colors),
        View::Report => report::draw_report(frame, outer[2], app, colors),
    }

    help::draw(frame, outer[3], app, colors);

    if app.ui.show_notifications {
        notifications::draw(frame, frame.area(), app, colors);
    }
}

pub(crate) fn panel<'a>(title: String, focused: bool, colors: &ColorScheme) -> Block<'a> {
    let border = if focused { colors.border_focused } else { colors.border_normal };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border))
}

/// What to show instead of data: the error when there is nothing cached,
/// the loading text on first load, or the empty text.
pub(crate) fn placeholder<T>(
    app: &Dashboard,
    state: &FetchState<T>,
    is_empty: bool,
    colors: &ColorScheme,
) -> Option<Line<'static>> {
    if !is_empty {
        return None;
    }
    let line = match (&state.error, state.loading) {
        (Some(err), _) => Line::from(Span::styled(
            format!("  {}", err),
            Style::default().fg(colors.status_error),
        )),
        (None, true) => Line::from(Span::styled(
            format!("  {}", app.t("state.loading")),
            Style::default().fg(colors.text_secondary),
        )),
        (None, false) => Line::from(Span::styled(
            format!("  {}", app.t("state.empty")),
            Style::default().fg(colors.text_disabled),
        )),
    };
    Some(line)
}

pub(crate) fn draw_placeholder(frame: &mut Frame, area: Rect, block: Block, line: Line) {
    let paragraph = Paragraph::new(line).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(paragraph, area);
}

/// Title suffix when a refetch failed but older data is still shown.
pub(crate) fn stale_marker<T>(state: &FetchState<T>) -> &'static str {
    if state.error.is_some() {
        " \u{26a0}"
    } else if state.loading {
        " \u{21bb}"
    } else {
        ""
    }
}

/// Rows to draw so the selected one stays on screen.
pub(crate) fn visible_window(len: usize, selected: usize, height: usize) -> Range<usize> {
    if height == 0 || len <= height {
        return 0..len;
    }
    let start = (selected + 1).saturating_sub(height).min(len - height);
    start..start + height
}

pub(crate) fn dimension_key(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Visibility => "score.visibility",
        Dimension::Citation => "score.citation",
        Dimension::Representation => "score.representation",
        Dimension::Intent => "score.intent",
    }
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}\u{2026}", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_selection() {
        assert_eq!(visible_window(5, 4, 10), 0..5);
        assert_eq!(visible_window(20, 0, 5), 0..5);
        assert_eq!(visible_window(20, 7, 5), 3..8);
        assert_eq!(visible_window(20, 19, 5), 15..20);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer line", 6), "a lon\u{2026}");
    }
}
