use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::app::Dashboard;
use super::theme::ColorScheme;
use super::{draw_placeholder, panel, placeholder, stale_marker, truncate, visible_window};

/// Prompt research page: prompt list on the left, model catalog and
/// industry categories on the right.
pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    draw_prompts(frame, cols[0], app, colors);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(cols[1]);
    draw_models(frame, right[0], app, colors);
    draw_industry(frame, right[1], app, colors);
}

fn draw_prompts(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.prompts.state();
    let category = app
        .ui
        .prompt_category
        .clone()
        .unwrap_or_else(|| app.t("filter.all").to_string());
    let title = format!(
        " {} [{}] ({}/{}){} ",
        app.t("panel.prompts"),
        category,
        state.data.prompts.len(),
        state.data.total,
        stale_marker(&state),
    );
    let block = panel(title, true, colors);
    if let Some(line) = placeholder(app, &state, state.data.prompts.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let header = Row::new(vec![Cell::from("Prompt"), Cell::from("Intent"), Cell::from("W")]).style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );
    let height = area.height.saturating_sub(3) as usize;
    let window = visible_window(state.data.prompts.len(), app.ui.prompt_selected, height);
    let rows: Vec<Row> = state
        .data
        .prompts
        .iter()
        .enumerate()
        .take(window.end)
        .skip(window.start)
        .map(|(i, p)| {
            let style = if i == app.ui.prompt_selected {
                Style::default().bg(colors.row_selected_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(truncate(&p.text, 60)).style(Style::default().fg(colors.text_primary)),
                Cell::from(p.intent_category.clone()).style(Style::default().fg(colors.accent)),
                Cell::from(p.weight.to_string()).style(Style::default().fg(colors.accent_count)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(24), Constraint::Length(20), Constraint::Length(3)])
        .header(header)
        .block(block);
    frame.render_widget(table, area);
}

fn draw_models(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.models.state();
    let block = panel(format!(" {}{} ", app.t("panel.catalog"), stale_marker(&state)), false, colors);
    if let Some(line) = placeholder(app, &state, state.data.models.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let mut lines = Vec::new();
    for m in state.data.available() {
        lines.push(Line::from(vec![
            Span::styled(" \u{25cf} ", Style::default().fg(colors.status_ok)),
            Span::styled(m.name.clone(), Style::default().fg(colors.text_primary)),
            Span::styled(format!("  {}", m.model), Style::default().fg(colors.accent_model)),
        ]));
    }
    for m in state.data.unavailable() {
        lines.push(Line::from(vec![
            Span::styled(" \u{25cb} ", Style::default().fg(colors.text_disabled)),
            Span::styled(m.name.clone(), Style::default().fg(colors.text_disabled)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_industry(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.industry.state();
    let block = panel(format!(" {}{} ", app.t("panel.categories"), stale_marker(&state)), false, colors);
    if let Some(line) = placeholder(app, &state, state.data.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Category"),
        Cell::from("Brands"),
        Cell::from("Evals"),
        Cell::from("Avg"),
    ])
    .style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = state
        .data
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(c.category.clone()).style(Style::default().fg(colors.text_primary)),
                Cell::from(c.brand_count.to_string()),
                Cell::from(c.eval_count.to_string()),
                Cell::from(format!("{:.0}", c.avg_composite)).style(Style::default().fg(colors.score(c.avg_composite))),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [Constraint::Min(12), Constraint::Length(7), Constraint::Length(6), Constraint::Length(5)],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}
