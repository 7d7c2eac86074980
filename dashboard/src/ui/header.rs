use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::Dashboard;
use crate::route::View;
use super::theme::ColorScheme;

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, api_url: &str, colors: &ColorScheme) {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let connected = app.connected();
    let status_color = if connected {
        colors.status_ok
    } else {
        colors.status_error
    };
    let status_text = if connected {
        app.t("status.connected")
    } else {
        app.t("status.offline")
    };

    let user = match app.auth.user() {
        Some(user) => user.display_name().to_string(),
        None => app.t("status.signed_out").to_string(),
    };

    let unread = app.notifications.unread_count();
    let bell_style = if unread > 0 {
        Style::default().fg(colors.status_warn).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text_secondary)
    };

    let line = Line::from(vec![
        Span::styled("API: ", Style::default().fg(colors.text_primary)),
        Span::styled(api_url, Style::default().fg(colors.accent)),
        Span::raw("  "),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  \u{2502}  "),
        Span::styled(user, Style::default().fg(colors.accent_brand)),
        Span::raw("  \u{2502}  "),
        Span::styled(format!("\u{25cf} {}", unread), bell_style),
        Span::raw("  \u{2502}  "),
        Span::styled(app.translator.locale().code(), Style::default().fg(colors.text_secondary)),
        Span::raw("  \u{2502}  "),
        Span::styled(now, Style::default().fg(colors.text_secondary)),
    ]);

    let mut tabs = Vec::new();
    for (i, view) in View::ALL.iter().enumerate() {
        let style = if *view == app.view() {
            Style::default().fg(colors.border_focused).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text_secondary)
        };
        tabs.push(Span::styled(format!(" {} {} ", i + 1, app.t(view.title_key())), style));
    }

    let header = Paragraph::new(vec![line, Line::from(tabs)])
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} \u{2502} {} ", app.t("app.title"), app.route))
                .border_style(Style::default().fg(colors.border_focused)),
        );

    frame.render_widget(header, area);
}
