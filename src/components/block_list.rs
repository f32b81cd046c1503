use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::data::types::BlockDoc;
use crate::events::{AppEvent, BlockId, LoadMoreTarget, View};
use crate::theme::THEME;
use crate::utils;

/// Paged table of blocks. Holds no block data; the owning page passes it in.
pub struct BlockList {
    table: PagedTable,
}

impl BlockList {
    pub fn new(paginator: Paginator<LoadMoreTarget>) -> Self {
        Self {
            table: PagedTable::new(paginator, "Load blocks"),
        }
    }

    pub fn reset(&mut self) {
        self.table.reset();
    }

    pub fn paginator(&self) -> &Paginator<LoadMoreTarget> {
        self.table.paginator()
    }

    pub fn paginator_mut(&mut self) -> &mut Paginator<LoadMoreTarget> {
        self.table.paginator_mut()
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.table.set_busy(busy);
    }

    pub fn handle_key(&mut self, key: KeyEvent, blocks: &[BlockDoc]) -> Option<AppEvent> {
        match self.table.handle_key(key, blocks.len())? {
            ListAction::Open(idx) => blocks
                .get(idx)
                .map(|b| AppEvent::Navigate(View::BlockDetail(BlockId::Number(b.number)))),
            ListAction::LoadMore(target) => Some(AppEvent::LoadMore(target)),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        blocks: &[BlockDoc],
        focused: bool,
    ) {
        let border_style = if focused {
            THEME.border_focused_style()
        } else {
            THEME.border_style()
        };
        let outer_block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(border_style);

        let header = Row::new(vec![
            Cell::from("Block #"),
            Cell::from("Hash"),
            Cell::from("Time"),
            Cell::from("Parcels"),
            Cell::from("Author"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows = build_rows(self.table.visible(blocks));
        let widths = [
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Min(16),
        ];

        let table = Table::new(rows, widths).header(header);
        self.table.render(frame, area, table, outer_block, blocks.len());
    }
}

fn build_rows(blocks: &[BlockDoc]) -> Vec<Row<'static>> {
    blocks
        .iter()
        .map(|b| {
            Row::new(vec![
                Cell::from(utils::format_number(b.number)).style(THEME.accent_style()),
                Cell::from(utils::truncate_hash(&b.hash)).style(THEME.hash_style()),
                Cell::from(utils::format_time_ago(b.timestamp)).style(THEME.muted_style()),
                Cell::from(b.parcels.len().to_string()),
                Cell::from(utils::truncate_hash(&b.author)).style(THEME.address_style()),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;

    use super::*;

    fn blocks(n: u64) -> Vec<BlockDoc> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({
                    "hash": format!("{i:064x}"),
                    "number": 100 - i,
                    "timestamp": 1530000000 + i,
                    "author": "tccq9h7vnl68frvqapzv3tujrxtxtwqdnxw6yamrrgd"
                }))
                .unwrap()
            })
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_open_selected_block() {
        let blocks = blocks(4);
        let mut list = BlockList::new(Paginator::client_slice(NonZeroUsize::new(3).unwrap()));
        list.handle_key(key(KeyCode::Char('j')), &blocks);
        list.handle_key(key(KeyCode::Char('j')), &blocks);
        let event = list.handle_key(key(KeyCode::Enter), &blocks);
        assert!(matches!(
            event,
            Some(AppEvent::Navigate(View::BlockDetail(BlockId::Number(99))))
        ));
    }

    #[test]
    fn test_load_blocks_until_exhausted() {
        let blocks = blocks(10);
        let mut list = BlockList::new(Paginator::client_slice(NonZeroUsize::new(3).unwrap()));
        assert!(list.paginator().has_more(blocks.len()));

        for _ in 0..3 {
            assert!(list.handle_key(key(KeyCode::Char('m')), &blocks).is_none());
        }
        assert_eq!(list.paginator().visible(&blocks).len(), 10);
        assert!(!list.paginator().has_more(blocks.len()));
    }

    #[test]
    fn test_delegated_list_asks_parent() {
        let blocks = blocks(6);
        let mut list = BlockList::new(Paginator::delegated(LoadMoreTarget::Blocks));
        assert!(matches!(
            list.handle_key(key(KeyCode::Char('m')), &blocks),
            Some(AppEvent::LoadMore(LoadMoreTarget::Blocks))
        ));
    }

    #[test]
    fn test_dashboard_preview_hides_affordance() {
        let blocks = blocks(10);
        let mut list = BlockList::new(
            Paginator::client_slice(NonZeroUsize::new(5).unwrap()).with_hide_more(),
        );
        assert!(list.handle_key(key(KeyCode::Char('m')), &blocks).is_none());
        assert_eq!(list.paginator().visible(&blocks).len(), 5);
    }
}
