use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Gauge, Paragraph, Row, Table, Wrap};

use crate::analytics::{self, FunnelStage, ResultSummary};
use crate::app::{Dashboard, Focus};
use crate::model::{EvaluationResult, EvaluationRun, EvaluationStatus};
use super::theme::ColorScheme;
use super::{draw_placeholder, panel, placeholder, stale_marker, truncate, visible_window};

fn status_color(status: EvaluationStatus, colors: &ColorScheme) -> Color {
    match status {
        EvaluationStatus::Completed => colors.status_ok,
        EvaluationStatus::Running => colors.accent,
        EvaluationStatus::Pending => colors.status_warn,
        EvaluationStatus::Failed => colors.status_error,
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    draw_runs(frame, cols[0], app, colors);
    draw_detail(frame, cols[1], app, colors);
}

fn draw_runs(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.runs.state();
    let is_focused = app.ui.focus == Focus::List;
    let filter = app
        .ui
        .status_filter
        .map_or_else(|| app.t("filter.all").to_string(), |s| s.as_str().to_string());
    let title = format!(
        " {} [{}] ({}){} ",
        app.t("panel.runs"),
        filter,
        state.data.len(),
        stale_marker(&state)
    );
    let block = panel(title, is_focused, colors);
    if let Some(line) = placeholder(app, &state, state.data.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Run"),
        Cell::from("Brand"),
        Cell::from("Status"),
        Cell::from("Progress"),
        Cell::from("Models"),
    ])
    .style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );

    let height = area.height.saturating_sub(3) as usize;
    let window = visible_window(state.data.len(), app.ui.run_selected, height);
    let rows: Vec<Row> = state
        .data
        .iter()
        .enumerate()
        .take(window.end)
        .skip(window.start)
        .map(|(i, run)| {
            let row_style = if i == app.ui.run_selected && is_focused {
                Style::default().bg(colors.row_selected_bg)
            } else if i % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(truncate(&run.label(), 24)).style(Style::default().fg(colors.text_primary)),
                Cell::from(run.brand_name.clone().unwrap_or_default())
                    .style(Style::default().fg(colors.accent_brand)),
                Cell::from(run.status.as_str()).style(Style::default().fg(status_color(run.status, colors))),
                Cell::from(progress_bar(run.progress, 10)).style(Style::default().fg(colors.accent)),
                Cell::from(run.models_used.len().to_string()).style(Style::default().fg(colors.accent_model)),
            ])
            .style(row_style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(15),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!(
        "{}{} {:>3.0}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(width - filled),
        progress
    )
}

fn draw_detail(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.run_detail.state();
    let is_focused = app.ui.focus == Focus::Detail;
    let block = panel(
        format!(" {}{}{} ", app.t("panel.results"), filter_tags(app), stale_marker(&state)),
        is_focused,
        colors,
    );
    let Some(detail) = &state.data else {
        let line = placeholder(app, &state, true, colors).unwrap_or_default();
        draw_placeholder(frame, area, block, line);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // run summary
            Constraint::Length(1), // progress
            Constraint::Length(1), // counts
            Constraint::Min(4),    // results
            Constraint::Length(8), // response + funnel
        ])
        .split(inner);

    draw_run_summary(frame, rows[0], &detail.run, colors);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(status_color(detail.run.status, colors)).bg(colors.gauge_bg))
        .percent(detail.run.progress.clamp(0.0, 100.0).round() as u16)
        .label(format!("{:.0}%", detail.run.progress));
    frame.render_widget(gauge, rows[1]);

    draw_counts(frame, rows[2], app, &analytics::result_summary(&detail.results), colors);

    let results = app.result_rows();
    draw_results(frame, rows[3], app, &results, is_focused, colors);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[4]);
    draw_response(frame, bottom[0], app, results.get(app.ui.result_selected), colors);
    let refs: Vec<&EvaluationResult> = results.iter().collect();
    draw_funnel(frame, bottom[1], app, &analytics::mention_funnel(&refs), colors);
}

/// Active brand and prompt filters, appended to the results title.
fn filter_tags(app: &Dashboard) -> String {
    let mut tags = String::new();
    if let Some(id) = &app.ui.result_brand {
        tags.push_str(&format!(" [{}: {}]", app.t("filter.brand"), app.brand_name(id)));
    }
    if !app.ui.result_search.trim().is_empty() {
        tags.push_str(&format!(" [{}: {}]", app.t("filter.prompt"), app.ui.result_search.trim()));
    }
    tags
}

fn draw_counts(frame: &mut Frame, area: Rect, app: &Dashboard, summary: &ResultSummary, colors: &ColorScheme) {
    let spans: Vec<Span> = [
        ("results.total", summary.total),
        ("results.mentioned", summary.mentioned),
        ("results.cited", summary.cited),
        ("results.brands", summary.brands),
        ("results.prompts", summary.prompts),
    ]
    .iter()
    .flat_map(|(key, n)| {
        [
            Span::styled(format!("{} ", app.t(key)), Style::default().fg(colors.text_secondary)),
            Span::styled(format!("{}   ", n), Style::default().fg(colors.accent_count)),
        ]
    })
    .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_results(
    frame: &mut Frame,
    area: Rect,
    app: &Dashboard,
    results: &[EvaluationResult],
    is_focused: bool,
    colors: &ColorScheme,
) {
    let state = app.results.state();
    if let Some(line) = placeholder(app, &state, results.is_empty(), colors) {
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Model"),
        Cell::from("Prompt"),
        Cell::from("Mentioned"),
        Cell::from("Rank"),
        Cell::from("Cited"),
        Cell::from("Sentiment"),
    ])
    .style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );

    let height = area.height.saturating_sub(1) as usize;
    let window = visible_window(results.len(), app.ui.result_selected, height);
    let result_rows: Vec<Row> = results
        .iter()
        .enumerate()
        .take(window.end)
        .skip(window.start)
        .map(|(i, r)| {
            let row_style = if i == app.ui.result_selected && is_focused {
                Style::default().bg(colors.row_selected_bg)
            } else {
                Style::default()
            };
            let check = |yes: bool| {
                if yes {
                    Cell::from("\u{2713}").style(Style::default().fg(colors.status_ok))
                } else {
                    Cell::from("\u{2717}").style(Style::default().fg(colors.text_disabled))
                }
            };
            Row::new(vec![
                Cell::from(r.model_name.clone()).style(Style::default().fg(colors.accent_model)),
                Cell::from(truncate(&r.prompt_text, 40)).style(Style::default().fg(colors.text_primary)),
                check(r.is_mentioned),
                Cell::from(r.mention_rank.map_or_else(|| "-".to_string(), |n| format!("#{}", n))),
                check(r.is_cited),
                sentiment_cell(r.sentiment.as_deref(), colors),
            ])
            .style(row_style)
        })
        .collect();

    let table = Table::new(
        result_rows,
        [
            Constraint::Length(11),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header);
    frame.render_widget(table, area);
}

fn sentiment_cell(sentiment: Option<&str>, colors: &ColorScheme) -> Cell<'static> {
    let Some(s) = sentiment else {
        return Cell::from("-").style(Style::default().fg(colors.text_disabled));
    };
    let color = match s.to_ascii_lowercase().as_str() {
        "positive" => colors.status_ok,
        "negative" => colors.status_error,
        _ => colors.text_secondary,
    };
    Cell::from(s.to_string()).style(Style::default().fg(color))
}

/// Response text of the selected result, with the mention context on top.
fn draw_response(
    frame: &mut Frame,
    area: Rect,
    app: &Dashboard,
    result: Option<&EvaluationResult>,
    colors: &ColorScheme,
) {
    let block = panel(format!(" {} ", app.t("panel.response")), false, colors);
    let Some(r) = result else {
        let line = Line::from(Span::styled(
            format!("  {}", app.t("state.empty")),
            Style::default().fg(colors.text_disabled),
        ));
        draw_placeholder(frame, area, block, line);
        return;
    };
    let mut lines = Vec::new();
    if let Some(context) = &r.mention_context {
        lines.push(Line::from(Span::styled(context.clone(), Style::default().fg(colors.accent))));
    }
    lines.push(Line::from(Span::styled(r.response_text.clone(), Style::default().fg(colors.text_primary))));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn draw_funnel(frame: &mut Frame, area: Rect, app: &Dashboard, stages: &[FunnelStage], colors: &ColorScheme) {
    let block = panel(format!(" {} ", app.t("panel.funnel")), false, colors);
    if stages.is_empty() {
        let line = Line::from(Span::styled(
            format!("  {}", app.t("state.empty")),
            Style::default().fg(colors.text_disabled),
        ));
        draw_placeholder(frame, area, block, line);
        return;
    }
    let rows: Vec<Row> = stages
        .iter()
        .map(|stage| {
            let filled = (stage.percentage / 10.0).round() as usize;
            Row::new(vec![
                Cell::from(app.t(stage.key)).style(Style::default().fg(colors.text_primary)),
                Cell::from("\u{2588}".repeat(filled)).style(Style::default().fg(colors.accent)),
                Cell::from(format!("{} ({:.0}%)", stage.count, stage.percentage))
                    .style(Style::default().fg(colors.accent_count)),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(12), Constraint::Length(10), Constraint::Min(8)]).block(block);
    frame.render_widget(table, area);
}

fn draw_run_summary(frame: &mut Frame, area: Rect, run: &EvaluationRun, colors: &ColorScheme) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(run.label(), Style::default().fg(colors.text_primary).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(run.status.as_str(), Style::default().fg(status_color(run.status, colors))),
            Span::styled(format!("  {} prompts", run.prompt_count), Style::default().fg(colors.text_secondary)),
        ]),
        Line::from(Span::styled(run.models_used.join(", "), Style::default().fg(colors.accent_model))),
    ];
    if let Some(err) = &run.error_message {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(colors.status_error))));
    } else {
        let started = run.started_at.as_deref().unwrap_or("-");
        let finished = run.completed_at.as_deref().unwrap_or("-");
        lines.push(Line::from(Span::styled(
            format!("{} \u{2192} {}", started, finished),
            Style::default().fg(colors.text_secondary),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}
