use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::app::Dashboard;
use super::theme::ColorScheme;
use super::{draw_placeholder, panel, placeholder, stale_marker, truncate, visible_window};

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.articles.state();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let block = panel(
        format!(" {} ({}){} ", app.t("panel.articles"), state.data.len(), stale_marker(&state)),
        true,
        colors,
    );
    if let Some(line) = placeholder(app, &state, state.data.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Title"),
        Cell::from("Category"),
        Cell::from("Min"),
        Cell::from("Published"),
    ])
    .style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );
    let height = rows[0].height.saturating_sub(3) as usize;
    let window = visible_window(state.data.len(), app.ui.article_selected, height);
    let table_rows: Vec<Row> = state
        .data
        .iter()
        .enumerate()
        .take(window.end)
        .skip(window.start)
        .map(|(i, a)| {
            let style = if i == app.ui.article_selected {
                Style::default().bg(colors.row_selected_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if a.is_featured { "\u{2605}" } else { " " })
                    .style(Style::default().fg(colors.accent_brand)),
                Cell::from(truncate(&a.title, 60)).style(Style::default().fg(colors.text_primary)),
                Cell::from(a.category.clone()).style(Style::default().fg(colors.accent)),
                Cell::from(a.reading_time_min.to_string()),
                Cell::from(a.published_at.chars().take(10).collect::<String>())
                    .style(Style::default().fg(colors.text_secondary)),
            ])
            .style(style)
        })
        .collect();
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(2),
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(4),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, rows[0]);

    let Some(article) = state.data.get(app.ui.article_selected) else {
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(
            article.title.clone(),
            Style::default().fg(colors.text_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(article.summary.clone(), Style::default().fg(colors.text_secondary))),
    ];
    if let Some(url) = &article.source_url {
        let source = article.source_name.as_deref().unwrap_or("source");
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", source), Style::default().fg(colors.text_secondary)),
            Span::styled(url.clone(), Style::default().fg(colors.accent)),
        ]));
    }
    if let Some(tags) = article.tags.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(Span::styled(format!("#{}", tags.replace(',', " #")), Style::default().fg(colors.accent_model))));
    }
    let detail = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border_normal)),
    );
    frame.render_widget(detail, rows[1]);
}
