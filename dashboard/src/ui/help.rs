use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{Dashboard, InputMode};
use crate::route::View;
use super::theme::ColorScheme;

pub fn draw(frame: &mut Frame, area: Rect, app: &Dashboard, colors: &ColorScheme) {
    let key_style = Style::default()
        .fg(colors.accent)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(colors.text_secondary);
    let sep_style = Style::default().fg(colors.help_separator);

    let keys: Vec<(&str, &str)> = if app.ui.input_mode == InputMode::Search {
        vec![("Enter", app.t("filter.search")), ("Esc", app.t("help.back"))]
    } else {
        let mut keys = vec![
            ("1-6", app.t("help.views")),
            ("\u{2191}\u{2193}/jk", app.t("help.move")),
            ("Enter", app.t("help.open")),
            ("\u{232b}", app.t("help.back")),
            ("r", app.t("help.refresh")),
            ("/", app.t("help.search")),
        ];
        match app.view() {
            View::Overview => keys.push(("o g m d p x", app.t("help.filters"))),
            View::Evaluations => keys.extend([
                ("f m", app.t("help.filters")),
                ("b", app.t("help.brand")),
                ("N", app.t("help.new_run")),
            ]),
            View::Prompts => keys.push(("f", app.t("help.filters"))),
            _ => {}
        }
        keys.extend([
            ("e", app.t("help.export")),
            ("n", app.t("help.notifications")),
            ("L", app.t("help.locale")),
            ("q", app.t("help.quit")),
        ]);
        keys
    };

    let mut spans = Vec::with_capacity(keys.len() * 3);
    for (i, (key, desc)) in keys.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("\u{2502}", sep_style));
        }
        spans.push(Span::styled(format!(" {}", key), key_style));
        spans.push(Span::styled(format!(" {} ", desc), desc_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
