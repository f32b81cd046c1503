use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

const HISTORY_LEN: usize = 20;

/// Search popup. Accepts a block number, a block/parcel/transaction hash or
/// a platform/asset address.
pub struct SearchBar {
    pub active: bool,
    pub input: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
    pub error: Option<String>,
    history: Vec<String>,
    /// Index into `history` while browsing it with Up/Down.
    recalled: Option<usize>,
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            active: false,
            input: String::new(),
            cursor: 0,
            error: None,
            history: Vec::new(),
            recalled: None,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.set_input(String::new());
        self.error = None;
        self.recalled = None;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.error = None;
        self.recalled = None;
    }

    /// Reopen with the failed query so it can be corrected.
    pub fn show_error(&mut self, query: String, error: String) {
        self.active = true;
        self.set_input(query);
        self.error = Some(error);
    }

    fn set_input(&mut self, input: String) {
        self.cursor = input.chars().count();
        self.input = input;
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn remember(&mut self, query: &str) {
        self.history.retain(|q| q != query);
        self.history.push(query.to_string());
        if self.history.len() > HISTORY_LEN {
            self.history.remove(0);
        }
    }

    fn recall(&mut self, older: bool) {
        if self.history.is_empty() {
            return;
        }
        let last = self.history.len() - 1;
        let next = match (self.recalled, older) {
            (None, true) => Some(last),
            (None, false) => None,
            (Some(i), true) => Some(i.saturating_sub(1)),
            (Some(i), false) if i < last => Some(i + 1),
            (Some(_), false) => None,
        };
        self.recalled = next;
        let input = next.map(|i| self.history[i].clone()).unwrap_or_default();
        self.set_input(input);
    }

    /// Some(query) on Enter, Some("") on Esc, None while typing.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        if !self.active {
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                let query = self.input.trim().to_string();
                if !query.is_empty() {
                    self.remember(&query);
                }
                self.active = false;
                self.recalled = None;
                Some(query)
            }
            KeyCode::Esc => {
                self.deactivate();
                Some(String::new())
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.input.remove(at);
                }
                self.error = None;
                None
            }
            KeyCode::Delete => {
                if self.cursor < self.input.chars().count() {
                    let at = self.byte_index(self.cursor);
                    self.input.remove(at);
                }
                self.error = None;
                None
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.input.chars().count());
                None
            }
            KeyCode::Home => {
                self.cursor = 0;
                None
            }
            KeyCode::End => {
                self.cursor = self.input.chars().count();
                None
            }
            KeyCode::Up => {
                self.recall(true);
                None
            }
            KeyCode::Down => {
                self.recall(false);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.set_input(String::new());
                self.error = None;
                None
            }
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.input.insert(at, c);
                self.cursor += 1;
                self.error = None;
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }

        let width = area.width.min(76);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let popup_area = Rect::new(x, area.y + 2, width, 3);

        frame.render_widget(Clear, popup_area);

        let (border_style, title) = match &self.error {
            Some(err) => (THEME.error_style(), format!(" Search - {err} ")),
            None => (
                THEME.border_focused_style(),
                " Search (block # / hash / address) ".to_string(),
            ),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .title_bottom(Line::from(" \u{2191}\u{2193} history ").right_aligned())
            .style(Style::default().bg(THEME.surface));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let display_text = if self.input.is_empty() {
            Span::styled("42, 0x1f2e.., tccq.., tcaq..", THEME.muted_style())
        } else {
            Span::styled(&self.input, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(display_text), inner);

        let cursor_x = inner.x.saturating_add(u16::try_from(self.cursor).unwrap_or(u16::MAX));
        if cursor_x < inner.right() {
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(bar: &mut SearchBar, s: &str) {
        for c in s.chars() {
            assert!(bar.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn test_submit_trims_query() {
        let mut bar = SearchBar::new();
        bar.activate();
        type_str(&mut bar, " 42 ");
        assert_eq!(bar.handle_key(key(KeyCode::Enter)).as_deref(), Some("42"));
        assert!(!bar.active);
    }

    #[test]
    fn test_show_error_keeps_query() {
        let mut bar = SearchBar::new();
        bar.show_error("0xdead".to_string(), "not found".to_string());
        assert!(bar.active);
        assert_eq!(bar.input, "0xdead");
        assert!(bar.handle_key(key(KeyCode::Backspace)).is_none());
        assert_eq!(bar.input, "0xdea");
        assert!(bar.error.is_none());
    }

    #[test]
    fn test_edit_in_middle_of_multibyte_input() {
        let mut bar = SearchBar::new();
        bar.activate();
        type_str(&mut bar, "é1");
        bar.handle_key(key(KeyCode::Left));
        type_str(&mut bar, "x");
        assert_eq!(bar.input, "éx1");
        bar.handle_key(key(KeyCode::Home));
        bar.handle_key(key(KeyCode::Delete));
        assert_eq!(bar.input, "x1");
    }

    #[test]
    fn test_history_recall() {
        let mut bar = SearchBar::new();
        for q in ["1", "2", "1"] {
            bar.activate();
            type_str(&mut bar, q);
            bar.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(bar.history, vec!["2", "1"]);

        bar.activate();
        bar.handle_key(key(KeyCode::Up));
        assert_eq!(bar.input, "1");
        bar.handle_key(key(KeyCode::Up));
        assert_eq!(bar.input, "2");
        bar.handle_key(key(KeyCode::Up));
        assert_eq!(bar.input, "2");
        bar.handle_key(key(KeyCode::Down));
        assert_eq!(bar.input, "1");
        bar.handle_key(key(KeyCode::Down));
        assert_eq!(bar.input, "");
    }
}
