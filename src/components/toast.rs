use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

const MAX_VISIBLE: usize = 4;
/// Oldest notices are dropped past this.
const MAX_KEPT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Stack of notifications. They stay until dismissed, newest on top.
pub struct Toasts {
    stack: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.stack.push(Toast {
            level,
            message: message.into(),
        });
        if self.stack.len() > MAX_KEPT {
            let excess = self.stack.len() - MAX_KEPT;
            self.stack.drain(..excess);
        }
    }

    /// Remove the newest toast. Returns false if there was none.
    pub fn dismiss(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(50);
        let x = area.x + area.width.saturating_sub(width + 1);
        let mut y = area.y + 1;

        for toast in self.stack.iter().rev().take(MAX_VISIBLE) {
            if y + 3 > area.bottom() {
                break;
            }
            let popup = Rect::new(x, y, width, 3);
            let (title, color) = match toast.level {
                ToastLevel::Warning => (" Notice [x] ", THEME.warning),
                ToastLevel::Error => (" Error [x] ", THEME.error),
            };

            frame.render_widget(Clear, popup);
            let paragraph = Paragraph::new(toast.message.as_str())
                .style(Style::default().fg(THEME.text))
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color))
                        .style(Style::default().bg(THEME.surface)),
                );
            frame.render_widget(paragraph, popup);
            y += 3;
        }

        let hidden = self.stack.len().saturating_sub(MAX_VISIBLE);
        if hidden > 0 && y < area.bottom() {
            let more = Paragraph::new(format!("+{hidden} more"))
                .style(THEME.muted_style())
                .alignment(Alignment::Right);
            frame.render_widget(more, Rect::new(x, y, width, 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dismiss_newest_first() {
        let mut toasts = Toasts::new();
        toasts.push(ToastLevel::Error, "first");
        toasts.push(ToastLevel::Warning, "second");

        assert!(toasts.dismiss());
        assert_eq!(toasts.stack.len(), 1);
        assert_eq!(toasts.stack[0].message, "first");

        assert!(toasts.dismiss());
        assert_eq!(toasts.len(), 0);
        assert!(!toasts.dismiss());
    }

    #[test]
    fn test_toasts_do_not_expire() {
        let mut toasts = Toasts::new();
        for i in 0..6 {
            toasts.push(ToastLevel::Error, format!("failure {i}"));
        }
        assert_eq!(toasts.stack.len(), 6);
        assert_eq!(toasts.stack[5].level, ToastLevel::Error);
    }

    #[test]
    fn test_oldest_dropped_past_limit() {
        let mut toasts = Toasts::new();
        for i in 0..MAX_KEPT + 5 {
            toasts.push(ToastLevel::Error, format!("failure {i}"));
        }
        assert_eq!(toasts.len(), MAX_KEPT);
        assert_eq!(toasts.stack[0].message, "failure 5");
        assert_eq!(toasts.stack[MAX_KEPT - 1].message, format!("failure {}", MAX_KEPT + 4));
    }
}
