use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::{failure, render_placeholder, Component};
use crate::data::endpoints::{TransactionCount, TransactionPage};
use crate::data::request::{DataRequest, FetchOutcome, Ticket};
use crate::data::types::TransactionDoc;
use crate::data::DataService;
use crate::events::{AppEvent, LoadMoreTarget, View};
use crate::theme::THEME;
use crate::utils;

/// Every asset transaction, paged by the server.
pub struct TransactionsPage {
    items_per_page: usize,
    page_req: DataRequest<usize>,
    count_req: DataRequest<()>,
    total: Option<u64>,
    transactions: Vec<TransactionDoc>,
    table: PagedTable,
}

impl TransactionsPage {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page,
            page_req: DataRequest::new(),
            count_req: DataRequest::new(),
            total: None,
            transactions: Vec::new(),
            table: PagedTable::new(
                Paginator::delegated(LoadMoreTarget::Transactions),
                "Load transactions",
            ),
        }
    }

    pub fn mount(&mut self, service: &DataService) {
        self.request_page(service);
        if let Some(ticket) = self.count_req.mount(()) {
            service.request(TransactionCount, ticket, AppEvent::TransactionCount);
        }
    }

    pub fn unmount(&mut self) {
        self.page_req.unmount();
        self.count_req.unmount();
        self.table.set_busy(false);
    }

    pub fn load_more(&mut self, service: &DataService) {
        self.request_page(service);
    }

    fn request_page(&mut self, service: &DataService) {
        let page = self.table.paginator().page();
        if let Some(ticket) = self.page_req.mount(page) {
            self.table.set_busy(true);
            let endpoint = TransactionPage {
                page,
                items_per_page: self.items_per_page,
            };
            service.request(endpoint, ticket, AppEvent::TransactionPage);
        }
    }

    pub fn on_page(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<TransactionDoc>>,
    ) -> Option<AppEvent> {
        let outcome = self.page_req.resolve(ticket, outcome)?;
        self.table.set_busy(false);
        match outcome {
            FetchOutcome::Delivered(transactions) => {
                if transactions.len() < self.items_per_page {
                    self.table.paginator_mut().mark_exhausted();
                }
                self.transactions.extend(transactions);
                None
            }
            FetchOutcome::NotFound => {
                self.table.paginator_mut().mark_exhausted();
                None
            }
            FetchOutcome::Failed(e) => {
                self.table.paginator_mut().mark_exhausted();
                failure("transactions", &e)
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
            FetchOutcome::Failed(e) => failure("transaction count", &e),
        }
    }
}

/// Hash / type / block / inputs / outputs, shared with the asset address page.
pub(crate) fn transaction_table(transactions: &[TransactionDoc]) -> Table<'static> {
    let header = Row::new(vec![
        Cell::from("Hash"),
        Cell::from("Type"),
        Cell::from("Block"),
        Cell::from("Inputs"),
        Cell::from("Outputs"),
    ])
    .style(THEME.table_header_style())
    .bottom_margin(0);

    let rows: Vec<Row> = transactions
        .iter()
        .map(|tx| {
            let block = tx
                .data
                .block_number
                .map(utils::format_number)
                .unwrap_or_else(|| "pending".to_string());
            Row::new(vec![
                Cell::from(utils::truncate_hash(&tx.data.hash)).style(THEME.hash_style()),
                Cell::from(tx.kind_label().to_string()).style(THEME.accent_style()),
                Cell::from(block),
                Cell::from(tx.data.inputs.len().to_string()),
                Cell::from(tx.data.outputs.len().to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(15),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    Table::new(rows, widths).header(header)
}

impl Component for TransactionsPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match self.table.handle_key(key, self.transactions.len())? {
            ListAction::Open(idx) => self
                .transactions
                .get(idx)
                .map(|tx| AppEvent::Navigate(View::TransactionDetail(tx.data.hash.clone()))),
            ListAction::LoadMore(target) => Some(AppEvent::LoadMore(target)),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.total {
            Some(total) => format!(
                " Transactions (Total {} transactions) ",
                utils::format_number(total)
            ),
            None => " Transactions ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        let table = transaction_table(self.table.visible(&self.transactions));
        self.table
            .render(frame, area, table, block, self.transactions.len());

        if self.transactions.is_empty() {
            let message = if self.page_req.is_loading() {
                "Loading..."
            } else {
                "No transactions"
            };
            render_placeholder(frame, area, message, THEME.muted_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::sync::mpsc;

    use super::*;
    use crate::data::client::test_server::serve_routes;
    use crate::data::client::ApiClient;
    use crate::data::progress::ProgressTracker;

    fn tx_list(hashes: &[&str]) -> String {
        let txs: Vec<String> = hashes
            .iter()
            .map(|h| format!(r#"{{"type":"assetMint","data":{{"hash":"{h}","blockNumber":4}}}}"#))
            .collect();
        format!("[{}]", txs.join(","))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_pages_append_until_short_page() {
        let routes = vec![
            ("/api/txs?page=1&itemsPerPage=2", "200 OK", tx_list(&["t1", "t2"])),
            ("/api/txs?page=2&itemsPerPage=2", "200 OK", tx_list(&["t3"])),
            ("/api/txs/totalCount", "200 OK", "3".to_string()),
        ];
        let (base, _seen) = serve_routes(routes, 3).await;
        let client = ApiClient::new(&base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = DataService::new(client, tx);

        let mut page = TransactionsPage::new(2);
        page.mount(&service);
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                AppEvent::TransactionPage(t, o) => assert!(page.on_page(&t, o).is_none()),
                AppEvent::TransactionCount(t, o) => assert!(page.on_count(&t, o).is_none()),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(page.total, Some(3));
        assert!(page.table.paginator().has_more(2));

        let load = page.handle_key(key(KeyCode::Char('m')));
        assert!(matches!(
            load,
            Some(AppEvent::LoadMore(LoadMoreTarget::Transactions))
        ));
        page.load_more(&service);
        // Busy while the page is in flight.
        assert!(page.handle_key(key(KeyCode::Char('m'))).is_none());

        match rx.recv().await.unwrap() {
            AppEvent::TransactionPage(t, o) => assert!(page.on_page(&t, o).is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
        let hashes: Vec<&str> = page.transactions.iter().map(|t| t.data.hash.as_str()).collect();
        assert_eq!(hashes, ["t1", "t2", "t3"]);
        assert!(!page.table.paginator().has_more(3));

        page.handle_key(key(KeyCode::Char('G')));
        assert!(matches!(
            page.handle_key(key(KeyCode::Enter)),
            Some(AppEvent::Navigate(View::TransactionDetail(h))) if h == "t3"
        ));
    }

    #[tokio::test]
    async fn test_failed_page_raises_toast_and_stops_paging() {
        let routes = vec![
            ("/api/txs?page=1&itemsPerPage=2", "500 Internal Server Error", "boom".to_string()),
            ("/api/txs/totalCount", "200 OK", "9".to_string()),
        ];
        let (base, _seen) = serve_routes(routes, 2).await;
        let client = ApiClient::new(&base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = DataService::new(client, tx);

        let mut page = TransactionsPage::new(2);
        page.mount(&service);
        let mut toast = None;
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                AppEvent::TransactionPage(t, o) => toast = page.on_page(&t, o),
                AppEvent::TransactionCount(t, o) => {
                    page.on_count(&t, o);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(matches!(toast, Some(AppEvent::Error(msg)) if msg.contains("transactions")));
        assert!(page.transactions.is_empty());
        assert!(!page.table.paginator().has_more(0));
        assert!(page.handle_key(key(KeyCode::Char('m'))).is_none());
    }
}
