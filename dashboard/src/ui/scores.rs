//! Score panel for the selected brand: headline score, dimension gauges,
//! trend chart, per-model bars, brand comparison and share of voice.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table,
};

use crate::analytics::{self, ScoreDisplay, TrendDirection};
use crate::app::{Dashboard, Focus};
use crate::filters::Dimension;
use crate::model::{BrandWithScore, GeoScore, ScoreCard};
use super::theme::{ColorScheme, SERIES};
use super::{dimension_key, draw_placeholder, panel, placeholder, stale_marker};

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let focused = app.ui.focus == Focus::Detail;
    let Some(selected) = app.selected_brand() else {
        let state = app.brands.state();
        let block = panel(format!(" {} ", app.t("panel.score")), focused, colors);
        let line = placeholder(app, &state, true, colors).unwrap_or_default();
        draw_placeholder(frame, area, block, line);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),  // headline + dimensions
            Constraint::Min(8),     // trend
            Constraint::Length(8),  // brand comparison
            Constraint::Length(10), // models + share of voice
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let history = app.history_rows();
    draw_headline(frame, top[0], app, &selected, &history, focused, colors);
    match &selected.score {
        Some(card) => draw_dimensions(frame, top[1], app, &card.score, colors),
        None => {
            let block = panel(format!(" {} ", app.t("panel.dimensions")), false, colors);
            let line = Line::from(Span::styled(
                format!("  {}", app.t("state.no_score")),
                Style::default().fg(colors.text_disabled),
            ));
            draw_placeholder(frame, top[1], block, line);
        }
    }

    draw_trend(frame, rows[1], app, &history, colors);
    draw_compare(frame, rows[2], app, colors);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[3]);
    draw_models(frame, bottom[0], app, &selected, colors);
    draw_share_of_voice(frame, bottom[1], app, colors);
}

fn draw_headline(
    frame: &mut Frame,
    area: Rect,
    app: &Dashboard,
    selected: &BrandWithScore,
    history: &[ScoreCard],
    focused: bool,
    colors: &ColorScheme,
) {
    let block = panel(format!(" {} ", selected.brand.name), focused, colors);
    let Some(card) = &selected.score else {
        let line = Line::from(Span::styled(
            format!("  {}", app.t("state.no_score")),
            Style::default().fg(colors.text_disabled),
        ));
        draw_placeholder(frame, area, block, line);
        return;
    };

    let display = ScoreDisplay::new(&card.score);
    let refs: Vec<&ScoreCard> = history.iter().collect();
    let trend = analytics::history_trend(&refs).map(|t| {
        let color = match t.direction {
            TrendDirection::Up => colors.status_ok,
            TrendDirection::Down => colors.status_error,
            TrendDirection::Stable => colors.text_secondary,
        };
        Span::styled(format!("  {} {:.1}", t.direction.arrow(), t.change), Style::default().fg(color))
    });

    let mut score_line = vec![
        Span::styled(format!("  {} ", app.t("score.composite")), Style::default().fg(colors.text_primary)),
        Span::styled(
            display.composite.clone(),
            Style::default()
                .fg(colors.score(card.score.composite_score))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} {}", app.t("score.grade"), display.grade),
            Style::default().fg(colors.accent),
        ),
    ];
    score_line.extend(trend);

    let rank = card.avg_rank.map_or_else(|| "-".to_string(), |r| format!("{:.1}", r));
    let lines = vec![
        Line::from(score_line),
        Line::from(vec![
            Span::styled(format!("  {}: ", app.t("score.mentions")), Style::default().fg(colors.text_primary)),
            Span::styled(card.total_mentions.to_string(), Style::default().fg(colors.accent_count)),
            Span::styled(format!("   rank {}", rank), Style::default().fg(colors.text_secondary)),
        ]),
        Line::from(Span::styled(
            format!(
                "  {} \u{2502} {}",
                selected.brand.category,
                card.last_evaluation_date.as_deref().unwrap_or(&card.created_at)
            ),
            Style::default().fg(colors.text_secondary),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// One gauge per dimension, labelled with its percentage.
pub fn draw_dimensions(frame: &mut Frame, area: Rect, app: &Dashboard, score: &GeoScore, colors: &ColorScheme) {
    let block = panel(format!(" {} ", app.t("panel.dimensions")), false, colors);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let display = ScoreDisplay::new(score);
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(Dimension::ALL.iter().map(|_| Constraint::Length(1)))
        .split(inner);

    for (slot, d) in slots.iter().zip(Dimension::ALL) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(10)])
            .split(*slot);
        let value = d.value(score);
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", app.t(dimension_key(d))), Style::default().fg(colors.text_primary))),
            cols[0],
        );
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(colors.score(value)).bg(colors.gauge_bg))
            .percent(value.clamp(0.0, 100.0).round() as u16)
            .label(display.dimension(d).to_string());
        frame.render_widget(gauge, cols[1]);
    }
}

fn draw_trend(frame: &mut Frame, area: Rect, app: &Dashboard, history: &[ScoreCard], colors: &ColorScheme) {
    let state = app.history.state();
    let range = &app.filters.filters().date_range;
    let title = format!(
        " {} {} \u{2013} {}{} ",
        app.t("panel.trend"),
        range.start,
        range.end,
        stale_marker(&state),
    );
    let block = panel(title, false, colors);
    if let Some(line) = placeholder(app, &state, history.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let refs: Vec<&ScoreCard> = history.iter().collect();
    let series = analytics::dimension_series(&refs, &app.filters.filters().dimensions);
    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Dataset::default()
                .name(s.name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES[i % SERIES.len()]))
                .data(&s.points)
        })
        .collect();

    let last = history.len().saturating_sub(1) as f64;
    let first_label = history.first().map(|c| c.created_at.chars().take(10).collect::<String>()).unwrap_or_default();
    let last_label = history.last().map(|c| c.created_at.chars().take(10).collect::<String>()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(colors.text_secondary))
                .bounds([0.0, last.max(1.0)])
                .labels(vec![first_label, last_label]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(colors.text_secondary))
                .bounds([0.0, 100.0])
                .labels(vec!["0", "50", "100"]),
        );
    frame.render_widget(chart, area);
}

fn draw_models(frame: &mut Frame, area: Rect, app: &Dashboard, selected: &BrandWithScore, colors: &ColorScheme) {
    let block = panel(format!(" {} ", app.t("panel.models")), false, colors);
    let bars = selected
        .score
        .as_ref()
        .map(|card| analytics::model_comparison(card, app.filters.filters()))
        .unwrap_or_default();
    if bars.is_empty() {
        let line = Line::from(Span::styled(
            format!("  {}", app.t("state.empty")),
            Style::default().fg(colors.text_disabled),
        ));
        draw_placeholder(frame, area, block, line);
        return;
    }

    let bars: Vec<Bar> = bars
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.score.round().max(0.0) as u64)
                .label(Line::from(b.model.clone()))
                .text_value(format!("{:.0}", b.score))
                .style(Style::default().fg(colors.score(b.score)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(9)
        .bar_gap(2)
        .max(100)
        .value_style(Style::default().fg(colors.text_primary).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(colors.accent_model))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Dimensions down, compared brands across. Pinned brands win over the
/// top of the list.
fn draw_compare(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let rows = app.brand_rows();
    let brands = analytics::comparison_brands(app.filters.filters(), &rows, 3);
    let points = analytics::radar(&brands);

    let block = panel(format!(" {} ", app.t("panel.compare")), false, colors);
    let names: Vec<String> = points
        .first()
        .map(|p| p.values.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default();
    if names.is_empty() {
        let line = Line::from(Span::styled(
            format!("  {}", app.t("state.empty")),
            Style::default().fg(colors.text_disabled),
        ));
        draw_placeholder(frame, area, block, line);
        return;
    }

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(names.iter().enumerate().map(|(i, name)| {
                Cell::from(name.clone()).style(Style::default().fg(SERIES[i % SERIES.len()]))
            })),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let table_rows: Vec<Row> = points
        .iter()
        .map(|p| {
            Row::new(
                std::iter::once(
                    Cell::from(app.t(dimension_key(p.dimension))).style(Style::default().fg(colors.text_primary)),
                )
                .chain(p.values.iter().map(|(_, v)| {
                    Cell::from(analytics::percent(*v)).style(Style::default().fg(colors.score(*v)))
                })),
            )
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(14)).chain(names.iter().map(|_| Constraint::Min(12)));
    let table = Table::new(table_rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn draw_share_of_voice(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let rows = app.brand_rows();
    let refs: Vec<&BrandWithScore> = rows.iter().collect();
    let shares = analytics::share_of_voice(&refs, 5);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.t("panel.sov")))
        .border_style(Style::default().fg(colors.border_normal));
    if shares.is_empty() {
        let line = Line::from(Span::styled(
            format!("  {}", app.t("state.empty")),
            Style::default().fg(colors.text_disabled),
        ));
        draw_placeholder(frame, area, block, line);
        return;
    }

    let table_rows: Vec<Row> = shares
        .iter()
        .map(|s| {
            let filled = (s.percentage / 5.0).round() as usize;
            Row::new(vec![
                Cell::from(s.name.clone()).style(Style::default().fg(colors.text_primary)),
                Cell::from("\u{2588}".repeat(filled)).style(Style::default().fg(colors.accent)),
                Cell::from(format!("{:.1}%", s.percentage)).style(Style::default().fg(colors.accent_count)),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [Constraint::Min(12), Constraint::Length(20), Constraint::Length(7)],
    )
    .block(block);
    frame.render_widget(table, area);
}
