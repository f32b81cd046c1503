use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::components::block_list::BlockList;
use crate::components::pagination::Paginator;
use crate::components::{failure, render_placeholder, Component};
use crate::data::endpoints::{BlockCount, BlockPage};
use crate::data::request::{DataRequest, FetchOutcome, Ticket};
use crate::data::types::BlockDoc;
use crate::data::DataService;
use crate::events::{AppEvent, LoadMoreTarget};
use crate::theme::THEME;
use crate::utils;

/// The global block list, paged by the server.
pub struct BlocksPage {
    items_per_page: usize,
    page_req: DataRequest<usize>,
    count_req: DataRequest<()>,
    total: Option<u64>,
    blocks: Vec<BlockDoc>,
    list: BlockList,
}

impl BlocksPage {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page,
            page_req: DataRequest::new(),
            count_req: DataRequest::new(),
            total: None,
            blocks: Vec::new(),
            list: BlockList::new(Paginator::delegated(LoadMoreTarget::Blocks)),
        }
    }

    /// Fetch the current page unless it is already loaded.
    pub fn mount(&mut self, service: &DataService) {
        self.request_page(service);
        if let Some(ticket) = self.count_req.mount(()) {
            service.request(BlockCount, ticket, AppEvent::BlockCount);
        }
    }

    pub fn unmount(&mut self) {
        self.page_req.unmount();
        self.count_req.unmount();
        self.list.set_busy(false);
    }

    /// The list advanced its page; fetch it.
    pub fn load_more(&mut self, service: &DataService) {
        self.request_page(service);
    }

    fn request_page(&mut self, service: &DataService) {
        let page = self.list.paginator().page();
        if let Some(ticket) = self.page_req.mount(page) {
            self.list.set_busy(true);
            let endpoint = BlockPage {
                page,
                items_per_page: self.items_per_page,
            };
            service.request(endpoint, ticket, AppEvent::BlockPage);
        }
    }

    pub fn on_page(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<BlockDoc>>,
    ) -> Option<AppEvent> {
        let outcome = self.page_req.resolve(ticket, outcome)?;
        self.list.set_busy(false);
        match outcome {
            FetchOutcome::Delivered(blocks) => {
                if blocks.len() < self.items_per_page {
                    self.list.paginator_mut().mark_exhausted();
                }
                self.blocks.extend(blocks);
                None
            }
            FetchOutcome::NotFound => {
                self.list.paginator_mut().mark_exhausted();
                None
            }
            FetchOutcome::Failed(e) => {
                self.list.paginator_mut().mark_exhausted();
                failure("blocks", &e)
            }
        }
    }

    pub fn on_count(&mut self, ticket: &Ticket, outcome: FetchOutcome<u64>) -> Option<AppEvent> {
        match self.count_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(total) => {
                self.total = Some(total);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("block count", &e),
        }
    }
}

impl Component for BlocksPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        self.list.handle_key(key, &self.blocks)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.total {
            Some(total) => format!("Blocks (Total {} blocks)", utils::format_number(total)),
            None => "Blocks".to_string(),
        };
        self.list.render(frame, area, &title, &self.blocks, true);

        if self.blocks.is_empty() {
            let message = if self.page_req.is_loading() {
                "Loading..."
            } else {
                "No blocks"
            };
            render_placeholder(frame, area, message, THEME.muted_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::data::client::test_server::serve_routes;
    use crate::data::client::ApiClient;
    use crate::data::progress::ProgressTracker;

    fn page_body(numbers: std::ops::Range<u64>) -> String {
        let blocks: Vec<_> = numbers
            .map(|n| json!({"hash": format!("{n:064x}"), "number": n, "timestamp": 1, "author": "tccq"}))
            .collect();
        serde_json::Value::Array(blocks).to_string()
    }

    #[tokio::test]
    async fn test_pages_append_until_short_page() {
        let routes = vec![
            ("/api/blocks?page=1&itemsPerPage=3", "200 OK", page_body(0..3)),
            ("/api/blocks?page=2&itemsPerPage=3", "200 OK", page_body(3..5)),
            ("/api/blocks/totalCount", "200 OK", "5".to_string()),
        ];
        let (base, _seen) = serve_routes(routes, 3).await;
        let client = ApiClient::new(&base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = DataService::new(client, tx);

        let mut page = BlocksPage::new(3);
        page.mount(&service);
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                AppEvent::BlockPage(t, o) => assert!(page.on_page(&t, o).is_none()),
                AppEvent::BlockCount(t, o) => assert!(page.on_count(&t, o).is_none()),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(page.blocks.len(), 3);
        assert_eq!(page.total, Some(5));
        assert!(page.list.paginator().has_more(3));

        let load = page.handle_key(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE));
        assert!(matches!(load, Some(AppEvent::LoadMore(LoadMoreTarget::Blocks))));
        page.load_more(&service);

        match rx.recv().await.unwrap() {
            AppEvent::BlockPage(t, o) => assert!(page.on_page(&t, o).is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
        let numbers: Vec<u64> = page.blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, [0, 1, 2, 3, 4]);
        assert!(!page.list.paginator().has_more(numbers.len()));
    }

    #[tokio::test]
    async fn test_remount_does_not_refetch_loaded_page() {
        let routes = vec![
            ("/api/blocks?page=1&itemsPerPage=3", "200 OK", page_body(0..3)),
            ("/api/blocks/totalCount", "200 OK", "3".to_string()),
        ];
        let (base, mut seen) = serve_routes(routes, 2).await;
        let client = ApiClient::new(&base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = DataService::new(client, tx);

        let mut page = BlocksPage::new(3);
        page.mount(&service);
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                AppEvent::BlockPage(t, o) => {
                    page.on_page(&t, o);
                }
                AppEvent::BlockCount(t, o) => {
                    page.on_count(&t, o);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        page.unmount();
        page.mount(&service);

        let extra = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err());
        seen.recv().await.unwrap();
        seen.recv().await.unwrap();
        assert!(seen.try_recv().is_err());
    }
}
