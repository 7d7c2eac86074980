use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::Dashboard;
use super::theme::ColorScheme;

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

/// Notification list drawn over the page, newest first.
pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let popup = centered(area, 60, 60);
    let items = app.notifications.notifications();
    let title = format!(
        " {} ({} unread) ",
        app.t("panel.notifications"),
        app.notifications.unread_count()
    );

    let mut lines = Vec::new();
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", app.t("notify.none")),
            Style::default().fg(colors.text_disabled),
        )));
    }
    for n in &items {
        let title_style = if n.read {
            Style::default().fg(colors.text_secondary)
        } else {
            Style::default().fg(colors.text_primary).add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", n.kind.icon()), Style::default().fg(colors.notification(n.kind))),
            Span::styled(n.title.clone(), title_style),
            Span::styled(
                format!("  {}", n.timestamp.format("%H:%M:%S")),
                Style::default().fg(colors.text_disabled),
            ),
        ]));
        if !n.message.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {}", n.message),
                Style::default().fg(colors.text_secondary),
            )));
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(" a: mark read  c: clear  Esc: close ")
            .border_style(Style::default().fg(colors.border_focused)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}
