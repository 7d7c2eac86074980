use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Cell, Row, Table};

use crate::analytics::ScoreDisplay;
use crate::app::{Dashboard, Focus};
use crate::filters::Dimension;
use super::theme::ColorScheme;
use super::{dimension_key, draw_placeholder, panel, placeholder, stale_marker, truncate, visible_window};

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let state = app.brands.state();
    let rows = app.brand_rows();
    let is_focused = app.ui.focus == Focus::List;
    let title = format!(
        " {} ({}/{}){} ",
        app.t("panel.brands"),
        rows.len(),
        state.data.len(),
        stale_marker(&state),
    );
    let block = panel(title, is_focused, colors);

    if let Some(line) = placeholder(app, &state, rows.is_empty(), colors) {
        draw_placeholder(frame, area, block, line);
        return;
    }

    let filters = app.filters.filters();
    let dimensions: Vec<Dimension> = Dimension::ALL
        .iter()
        .copied()
        .filter(|d| filters.dimensions.contains(d))
        .collect();

    let mut header_cells = vec![
        Cell::from(""),
        Cell::from(app.t("nav.brands")),
        Cell::from(app.t("score.composite")),
    ];
    for d in &dimensions {
        header_cells.push(Cell::from(app.t(dimension_key(*d))));
    }
    header_cells.push(Cell::from(app.t("score.grade")));
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );

    // borders + header
    let height = area.height.saturating_sub(3) as usize;
    let selected_id = app.selected_brand().map(|b| b.brand.id);
    let window = visible_window(rows.len(), app.ui.brand_selected, height);

    let mut table_rows = Vec::with_capacity(window.len());
    for (i, b) in rows.iter().enumerate().take(window.end).skip(window.start) {
        let pinned = filters.brands.contains(&b.brand.id);
        let is_selected = selected_id.as_deref() == Some(b.brand.id.as_str());
        let row_style = if is_selected && is_focused {
            Style::default().bg(colors.row_selected_bg)
        } else if i % 2 == 1 {
            Style::default().bg(colors.row_alt_bg)
        } else {
            Style::default()
        };

        let mut cells = vec![
            Cell::from(if pinned { "\u{2605}" } else { " " })
                .style(Style::default().fg(colors.accent_brand)),
            Cell::from(truncate(&b.brand.name, 22)).style(Style::default().fg(colors.text_primary)),
        ];
        match &b.score {
            Some(card) => {
                let display = ScoreDisplay::new(&card.score);
                cells.push(
                    Cell::from(display.composite.clone()).style(
                        Style::default()
                            .fg(colors.score(card.score.composite_score))
                            .add_modifier(Modifier::BOLD),
                    ),
                );
                for d in &dimensions {
                    cells.push(
                        Cell::from(display.dimension(*d).to_string())
                            .style(Style::default().fg(colors.score(d.value(&card.score)))),
                    );
                }
                cells.push(Cell::from(display.grade.to_string()).style(Style::default().fg(colors.accent)));
            }
            None => {
                cells.push(Cell::from("-").style(Style::default().fg(colors.text_disabled)));
                for _ in &dimensions {
                    cells.push(Cell::from("-").style(Style::default().fg(colors.text_disabled)));
                }
                cells.push(Cell::from(""));
            }
        }
        table_rows.push(Row::new(cells).style(row_style));
    }

    let mut widths = vec![Constraint::Length(2), Constraint::Min(14), Constraint::Length(9)];
    widths.extend(dimensions.iter().map(|_| Constraint::Length(8)));
    widths.push(Constraint::Length(5));

    let table = Table::new(table_rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
