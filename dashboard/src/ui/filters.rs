use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{Dashboard, InputMode};
use crate::filters::{DatePreset, Dimension, AI_MODELS};
use super::theme::ColorScheme;

/// "all" when every option is selected, else the selected names.
fn selection(app: &Dashboard, selected: &[String], total: usize) -> String {
    if selected.len() == total {
        app.t("filter.all").to_string()
    } else {
        selected.join(",")
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let f = app.filters.filters();
    let label = Style::default().fg(colors.text_secondary);
    let value = Style::default().fg(colors.text_primary).add_modifier(Modifier::BOLD);
    let sep = Span::styled("  \u{2502}  ", Style::default().fg(colors.help_separator));

    let range = match DatePreset::matching(&f.date_range) {
        Some(preset) => format!("{}m", preset.months()),
        None => format!("{} \u{2013} {}", f.date_range.start, f.date_range.end),
    };
    let dims: Vec<String> = f
        .dimensions
        .iter()
        .map(|d| d.label().to_string())
        .collect();

    let mut spans = vec![
        Span::styled(format!("{} ", app.t("filter.range")), label),
        Span::styled(range, value),
        sep.clone(),
        Span::styled(format!("{} ", app.t("filter.models")), label),
        Span::styled(selection(app, &f.models, AI_MODELS.len()), value),
        sep.clone(),
        Span::styled(format!("{} ", app.t("filter.dims")), label),
        Span::styled(selection(app, &dims, Dimension::ALL.len()), value),
        sep.clone(),
        Span::styled(format!("{} ", app.t("filter.pinned")), label),
        Span::styled(f.brands.len().to_string(), value),
        sep.clone(),
        Span::styled(format!("{} ", app.t("filter.sort")), label),
        Span::styled(f.sort.label(), value),
        sep,
        Span::styled(format!("{} ", app.t("filter.search")), label),
    ];

    if app.ui.input_mode == InputMode::Search {
        spans.push(Span::styled(
            format!("{}\u{2581}", app.ui.search_buffer),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        ));
    } else if f.search.is_empty() {
        spans.push(Span::styled("-", Style::default().fg(colors.text_disabled)));
    } else {
        spans.push(Span::styled(format!("\"{}\"", f.search), Style::default().fg(colors.accent)));
    }

    let border = if app.ui.input_mode == InputMode::Search {
        colors.border_focused
    } else {
        colors.border_normal
    };
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.t("panel.filters")))
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, area);
}
