use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::data::progress::{Progress, ProgressTracker};
use crate::theme::THEME;

pub struct StatusBar {
    progress: Arc<ProgressTracker>,
    pub toast_count: usize,
}

const HINTS: &[(&str, &str)] = &[
    (" \u{2191}\u{2193}", ":Navigate  "),
    ("Enter", ":Open  "),
    ("m", ":More  "),
    ("Esc", ":Back  "),
    ("/", ":Search  "),
    ("?", ":Help  "),
    ("q", ":Quit"),
];

impl StatusBar {
    pub fn new(progress: Arc<ProgressTracker>) -> Self {
        Self {
            progress,
            toast_count: 0,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        let left_content = if self.progress.is_active(Progress::Global) {
            Line::from(Span::styled(
                " Loading...",
                Style::default().fg(THEME.text_accent),
            ))
        } else {
            let spans: Vec<Span> = HINTS
                .iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(*key, Style::default().fg(THEME.text_accent)),
                        Span::styled(*label, Style::default().fg(THEME.text_muted)),
                    ]
                })
                .collect();
            Line::from(spans)
        };
        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        if self.toast_count > 0 {
            let right_content = Line::from(vec![
                Span::styled(
                    format!("{} notice(s) ", self.toast_count),
                    THEME.warning_style(),
                ),
                Span::styled("x", THEME.accent_style()),
                Span::styled(":Dismiss ", THEME.muted_style()),
            ]);
            let right = Paragraph::new(right_content)
                .alignment(Alignment::Right)
                .style(THEME.header_style());
            frame.render_widget(right, chunks[1]);
        }
    }
}
