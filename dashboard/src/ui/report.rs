use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};

use crate::analytics::ScoreDisplay;
use crate::app::Dashboard;
use super::scores::draw_dimensions;
use super::theme::ColorScheme;
use super::{draw_placeholder, panel, placeholder, stale_marker, truncate, visible_window};

pub fn draw_history(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.diagnosis_history.state();
    let block = panel(
        format!(" {} ({}){} ", app.t("panel.history"), state.data.len(), stale_marker(&state)),
        true,
        colors,
    );
    if let Some(line) = placeholder(app, &state, state.data.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Brand"),
        Cell::from("Category"),
        Cell::from("Score"),
        Cell::from("Models"),
        Cell::from("Date"),
    ])
    .style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );
    let height = area.height.saturating_sub(3) as usize;
    let window = visible_window(state.data.len(), app.ui.history_selected, height);
    let rows: Vec<Row> = state
        .data
        .iter()
        .enumerate()
        .take(window.end)
        .skip(window.start)
        .map(|(i, h)| {
            let style = if i == app.ui.history_selected {
                Style::default().bg(colors.row_selected_bg)
            } else if i % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(h.brand_name.clone()).style(Style::default().fg(colors.accent_brand)),
                Cell::from(h.category.clone().unwrap_or_default()),
                Cell::from(format!("{:.0}", h.composite_score))
                    .style(Style::default().fg(colors.score(h.composite_score)).add_modifier(Modifier::BOLD)),
                Cell::from(truncate(&h.models_used.join(", "), 32)).style(Style::default().fg(colors.accent_model)),
                Cell::from(h.created_at.chars().take(10).collect::<String>())
                    .style(Style::default().fg(colors.text_secondary)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(16),
            Constraint::Length(6),
            Constraint::Length(34),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

pub fn draw_report(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.report.state();
    let Some(report) = &state.data else {
        let block = panel(format!(" {} ", app.t("panel.report")), true, colors);
        let line = placeholder(app, &state, true, colors).unwrap_or_default();
        draw_placeholder(frame, area, block, line);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let display = ScoreDisplay::new(&report.score);
    let headline = vec![
        Line::from(vec![
            Span::styled(
                format!("  {} ", app.t("score.composite")),
                Style::default().fg(colors.text_primary),
            ),
            Span::styled(
                display.composite.clone(),
                Style::default()
                    .fg(colors.score(report.score.composite_score))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} {}", app.t("score.grade"), display.grade),
                Style::default().fg(colors.accent),
            ),
        ]),
        Line::from(Span::styled(
            format!("  {}", report.domain.as_deref().unwrap_or("-")),
            Style::default().fg(colors.accent),
        )),
        Line::from(Span::styled(
            format!("  {}", report.category),
            Style::default().fg(colors.text_secondary),
        )),
    ];
    let block = panel(
        format!(" {}: {}{} ", app.t("panel.report"), report.brand_name, stale_marker(&state)),
        true,
        colors,
    );
    frame.render_widget(Paragraph::new(headline).block(block), top[0]);
    draw_dimensions(frame, top[1], app, &report.score, colors);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    draw_bullets(frame, bottom[0], app.t("panel.insights"), &report.insights, colors);
    draw_bullets(frame, bottom[1], app.t("panel.recommendations"), &report.recommendations, colors);
}

fn draw_bullets(frame: &mut Frame, area: Rect, title: &str, items: &[String], colors: &ColorScheme) {
    let lines: Vec<Line> = items
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::styled(" \u{2022} ", Style::default().fg(colors.accent)),
                Span::styled(item.clone(), Style::default().fg(colors.text_primary)),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(panel(format!(" {} ", title), false, colors));
    frame.render_widget(paragraph, area);
}
