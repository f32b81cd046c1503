use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::pagination::Paginator;
use crate::events::LoadMoreTarget;
use crate::theme::THEME;

/// What a key press on a paged table asks its owner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Open(usize),
    LoadMore(LoadMoreTarget),
}

/// Selectable table over the visible window of a [`Paginator`], with a
/// "load more" affordance in the bottom border.
pub struct PagedTable {
    paginator: Paginator<LoadMoreTarget>,
    state: TableState,
    load_label: &'static str,
    busy: bool,
}

impl PagedTable {
    pub fn new(paginator: Paginator<LoadMoreTarget>, load_label: &'static str) -> Self {
        Self {
            paginator,
            state: TableState::default(),
            load_label,
            busy: false,
        }
    }

    pub fn paginator(&self) -> &Paginator<LoadMoreTarget> {
        &self.paginator
    }

    pub fn paginator_mut(&mut self) -> &mut Paginator<LoadMoreTarget> {
        &mut self.paginator
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        self.paginator.visible(items)
    }

    /// Show a loading label in place of the affordance.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn reset(&mut self) {
        self.paginator.reset();
        self.state.select(None);
        self.busy = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent, total: usize) -> Option<ListAction> {
        let visible = self.paginator.visible_len(total);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if visible > 0 {
                    let next = self.state.selected().map_or(0, |i| (i + 1).min(visible - 1));
                    self.state.select(Some(next));
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if visible > 0 {
                    let prev = self.state.selected().unwrap_or(0).saturating_sub(1);
                    self.state.select(Some(prev));
                }
                None
            }
            KeyCode::Char('g') => {
                if visible > 0 {
                    self.state.select(Some(0));
                }
                None
            }
            KeyCode::Char('G') => {
                if visible > 0 {
                    self.state.select(Some(visible - 1));
                }
                None
            }
            KeyCode::Enter => self
                .state
                .selected()
                .filter(|&i| i < visible)
                .map(ListAction::Open),
            KeyCode::Char('m') if !self.busy => {
                self.paginator.load_more(total).map(ListAction::LoadMore)
            }
            _ => None,
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        table: Table<'_>,
        block: Block<'_>,
        total: usize,
    ) {
        let block = if self.busy {
            block.title_bottom(
                Line::from(" Loading... ")
                    .alignment(Alignment::Right)
                    .style(THEME.muted_style()),
            )
        } else if self.paginator.has_more(total) {
            block.title_bottom(
                Line::from(format!(" [m] {} ", self.load_label))
                    .alignment(Alignment::Right)
                    .style(THEME.accent_style()),
            )
        } else {
            block
        };

        let table = table
            .block(block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn table(per_page: usize) -> PagedTable {
        let paginator = Paginator::client_slice(NonZeroUsize::new(per_page).unwrap());
        PagedTable::new(paginator, "Load items")
    }

    #[test]
    fn test_selection_stays_inside_visible_window() {
        let mut t = table(3);
        for _ in 0..10 {
            t.handle_key(key(KeyCode::Char('j')), 10);
        }
        assert_eq!(t.handle_key(key(KeyCode::Enter), 10), Some(ListAction::Open(2)));

        t.handle_key(key(KeyCode::Char('k')), 10);
        assert_eq!(t.handle_key(key(KeyCode::Enter), 10), Some(ListAction::Open(1)));
    }

    #[test]
    fn test_enter_without_selection() {
        let mut t = table(3);
        assert_eq!(t.handle_key(key(KeyCode::Enter), 10), None);
    }

    #[test]
    fn test_client_slice_load_more_grows_in_place() {
        let mut t = table(3);
        assert_eq!(t.handle_key(key(KeyCode::Char('m')), 10), None);
        assert_eq!(t.visible(&[0; 10]).len(), 6);
    }

    #[test]
    fn test_delegated_load_more_is_reported() {
        let mut t = PagedTable::new(Paginator::delegated(LoadMoreTarget::Blocks), "Load blocks");
        assert_eq!(
            t.handle_key(key(KeyCode::Char('m')), 6),
            Some(ListAction::LoadMore(LoadMoreTarget::Blocks))
        );

        t.set_busy(true);
        assert_eq!(t.handle_key(key(KeyCode::Char('m')), 12), None);
    }

    #[test]
    fn test_reset_clears_selection_and_page() {
        let mut t = table(2);
        t.handle_key(key(KeyCode::Char('m')), 10);
        t.handle_key(key(KeyCode::Char('j')), 10);
        t.reset();
        assert_eq!(t.paginator().page(), 1);
        assert_eq!(t.handle_key(key(KeyCode::Enter), 10), None);
    }
}
