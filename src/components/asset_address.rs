use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::asset_type::asset_name;
use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::transactions::transaction_table;
use crate::components::{failure, render_placeholder, Component};
use crate::data::endpoints::{AssetAddressTransactions, AssetAddressUtxo, ASSET_TXS_PROGRESS};
use crate::data::progress::{Progress, ProgressTracker};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{AggsUtxoDoc, TransactionDoc};
use crate::data::DataService;
use crate::events::{AppEvent, LoadMoreTarget, View};
use crate::theme::THEME;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Panel {
    Utxo,
    Transactions,
}

/// An asset address: unspent outputs grouped by asset type, and its
/// transactions paged by the server.
pub struct AssetAddressPage {
    items_per_page: usize,
    progress: Arc<ProgressTracker>,
    address: Option<String>,
    utxo_req: DataRequest<String>,
    txs_req: DataRequest<(String, usize)>,
    utxo: Vec<AggsUtxoDoc>,
    transactions: Vec<TransactionDoc>,
    utxo_state: TableState,
    tx_table: PagedTable,
    active_panel: Panel,
}

impl AssetAddressPage {
    pub fn new(items_per_page: usize, progress: Arc<ProgressTracker>) -> Self {
        Self {
            items_per_page,
            progress,
            address: None,
            utxo_req: DataRequest::new(),
            txs_req: DataRequest::new(),
            utxo: Vec::new(),
            transactions: Vec::new(),
            utxo_state: TableState::default(),
            tx_table: PagedTable::new(
                Paginator::delegated(LoadMoreTarget::AssetTransactions),
                "Load transactions",
            ),
            active_panel: Panel::Transactions,
        }
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn mount(&mut self, address: String, service: &DataService) {
        if self.address() != Some(address.as_str()) {
            self.transactions.clear();
            self.utxo.clear();
            self.tx_table.reset();
            self.utxo_state.select(None);
            self.address = Some(address.clone());
        }

        if let Some(ticket) = self.utxo_req.mount(address.clone()) {
            let endpoint = AssetAddressUtxo {
                address: address.clone(),
            };
            service.request(endpoint, ticket, AppEvent::AssetUtxo);
        }
        self.request_transactions(address, service);
    }

    pub fn unmount(&mut self) {
        self.utxo_req.unmount();
        self.txs_req.unmount();
    }

    /// The transaction list advanced its page; fetch it.
    pub fn load_more(&mut self, service: &DataService) {
        if let Some(address) = self.address().map(str::to_string) {
            self.request_transactions(address, service);
        }
    }

    fn request_transactions(&mut self, address: String, service: &DataService) {
        let page = self.tx_table.paginator().page();
        if let Some(ticket) = self.txs_req.mount((address.clone(), page)) {
            let endpoint = AssetAddressTransactions {
                address,
                page,
                items_per_page: self.items_per_page,
            };
            service.request(endpoint, ticket, AppEvent::AssetTransactions);
        }
    }

    pub fn on_utxo(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<AggsUtxoDoc>>,
    ) -> Option<AppEvent> {
        match self.utxo_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(utxo) => {
                self.utxo = utxo;
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("UTXO", &e),
        }
    }

    pub fn on_transactions(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<TransactionDoc>>,
    ) -> Option<AppEvent> {
        match self.txs_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(transactions) => {
                if transactions.len() < self.items_per_page {
                    self.tx_table.paginator_mut().mark_exhausted();
                }
                self.transactions.extend(transactions);
                None
            }
            FetchOutcome::NotFound => {
                self.tx_table.paginator_mut().mark_exhausted();
                None
            }
            FetchOutcome::Failed(e) => {
                self.tx_table.paginator_mut().mark_exhausted();
                failure("transactions", &e)
            }
        }
    }

    fn render_utxo(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.active_panel == Panel::Utxo {
            THEME.border_focused_style()
        } else {
            THEME.border_style()
        };
        let block = Block::default()
            .title(format!(" Assets ({}) ", self.utxo.len()))
            .borders(Borders::ALL)
            .border_style(border_style);

        let header = Row::new(vec![
            Cell::from("Asset Type"),
            Cell::from("Name"),
            Cell::from("Quantity"),
            Cell::from("UTXOs"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows: Vec<Row> = self
            .utxo
            .iter()
            .map(|u| {
                let name = u
                    .asset_scheme
                    .as_ref()
                    .and_then(|s| asset_name(&s.metadata))
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(utils::truncate_hash(&u.asset_type)).style(THEME.hash_style()),
                    Cell::from(name),
                    Cell::from(utils::format_amount(&u.total_asset_quantity.0))
                        .style(THEME.amount_style()),
                    Cell::from(u.utxo_quantity.to_string()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(16),
            Constraint::Min(12),
            Constraint::Length(20),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");
        frame.render_stateful_widget(table, area, &mut self.utxo_state);
    }

    fn render_transactions(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.active_panel == Panel::Transactions {
            THEME.border_focused_style()
        } else {
            THEME.border_style()
        };
        let block = Block::default()
            .title(" Transactions ")
            .borders(Borders::ALL)
            .border_style(border_style);

        let table = transaction_table(self.tx_table.visible(&self.transactions));
        self.tx_table
            .render(frame, area, table, block, self.transactions.len());
    }
}

impl Component for AssetAddressPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if key.code == KeyCode::Tab {
            self.active_panel = match self.active_panel {
                Panel::Utxo => Panel::Transactions,
                Panel::Transactions => Panel::Utxo,
            };
            return None;
        }

        match self.active_panel {
            Panel::Utxo => {
                let len = self.utxo.len();
                match key.code {
                    KeyCode::Char('j') | KeyCode::Down if len > 0 => {
                        let next = self.utxo_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                        self.utxo_state.select(Some(next));
                    }
                    KeyCode::Char('k') | KeyCode::Up if len > 0 => {
                        let prev = self.utxo_state.selected().unwrap_or(0).saturating_sub(1);
                        self.utxo_state.select(Some(prev));
                    }
                    KeyCode::Enter => {
                        let idx = self.utxo_state.selected()?;
                        let asset_type = self.utxo.get(idx)?.asset_type.clone();
                        return Some(AppEvent::Navigate(View::AssetType(asset_type)));
                    }
                    _ => {}
                }
                None
            }
            Panel::Transactions => {
                self.tx_table.set_busy(self.txs_req.is_loading());
                match self.tx_table.handle_key(key, self.transactions.len())? {
                    ListAction::Open(idx) => self
                        .transactions
                        .get(idx)
                        .map(|tx| AppEvent::Navigate(View::TransactionDetail(tx.data.hash.clone()))),
                    ListAction::LoadMore(target) => Some(AppEvent::LoadMore(target)),
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let address = self.address().unwrap_or_default().to_string();
        let outer_block = Block::default()
            .title(format!(" Asset Address {address} "))
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let utxo_height = (self.utxo.len() as u16).clamp(1, 8) + 3;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(utxo_height), Constraint::Min(0)])
            .split(inner);

        self.render_utxo(frame, chunks[0]);
        if self.utxo.is_empty() {
            let message = match self.utxo_req.state() {
                RequestState::Requesting => "Loading...",
                RequestState::Failed => "Could not load assets",
                _ => "No assets",
            };
            render_placeholder(frame, chunks[0], message, THEME.muted_style());
        }

        let busy = self.progress.is_active(Progress::Target(ASSET_TXS_PROGRESS))
            || self.txs_req.is_loading();
        self.tx_table.set_busy(busy);
        self.render_transactions(frame, chunks[1]);
        if self.transactions.is_empty() && !busy {
            render_placeholder(frame, chunks[1], "No transactions", THEME.muted_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyModifiers;
    use tokio::sync::mpsc;

    use super::*;
    use crate::data::client::test_server::serve_routes;
    use crate::data::client::ApiClient;

    fn tx_list(hashes: &[&str]) -> String {
        let txs: Vec<String> = hashes
            .iter()
            .map(|h| format!(r#"{{"type":"assetTransfer","data":{{"hash":"{h}"}}}}"#))
            .collect();
        format!("[{}]", txs.join(","))
    }

    async fn setup(
        routes: Vec<(&'static str, &'static str, String)>,
        connections: usize,
    ) -> (DataService, mpsc::UnboundedReceiver<AppEvent>, mpsc::UnboundedReceiver<String>) {
        let (base, seen) = serve_routes(routes, connections).await;
        let client = ApiClient::new(&base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (DataService::new(client, tx), rx, seen)
    }

    fn deliver(page: &mut AssetAddressPage, event: AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::AssetUtxo(t, o) => page.on_utxo(&t, o),
            AppEvent::AssetTransactions(t, o) => page.on_transactions(&t, o),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_five_transactions_delivered_once() {
        let routes = vec![
            (
                "/api/addr-asset-txs/0xabc?page=1&itemsPerPage=3",
                "200 OK",
                tx_list(&["t1", "t2", "t3", "t4", "t5"]),
            ),
            ("/api/aggs-utxo?address=0xabc", "200 OK", r#"{"data":[]}"#.to_string()),
        ];
        let (service, mut rx, mut seen) = setup(routes, 2).await;

        let mut page = AssetAddressPage::new(3, ProgressTracker::new());
        page.mount("0xabc".to_string(), &service);

        let mut tx_ticket = None;
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            if let AppEvent::AssetTransactions(ticket, _) = &event {
                tx_ticket = Some(ticket.clone());
            }
            assert!(deliver(&mut page, event).is_none());
        }

        let hashes: Vec<&str> = page.transactions.iter().map(|t| t.data.hash.as_str()).collect();
        assert_eq!(hashes, ["t1", "t2", "t3", "t4", "t5"]);

        // A second delivery on the same ticket is ignored.
        let ticket = tx_ticket.unwrap();
        assert!(page
            .on_transactions(&ticket, FetchOutcome::Delivered(Vec::new()))
            .is_none());
        assert_eq!(page.transactions.len(), 5);
        assert_eq!(page.address(), Some("0xabc"));

        let mut targets = vec![seen.recv().await.unwrap(), seen.recv().await.unwrap()];
        targets.sort();
        assert_eq!(
            targets,
            [
                "/api/addr-asset-txs/0xabc?page=1&itemsPerPage=3",
                "/api/aggs-utxo?address=0xabc"
            ]
        );
    }

    #[tokio::test]
    async fn test_load_more_requests_next_page() {
        let routes = vec![
            (
                "/api/addr-asset-txs/tca1?page=1&itemsPerPage=2",
                "200 OK",
                tx_list(&["a", "b"]),
            ),
            (
                "/api/addr-asset-txs/tca1?page=2&itemsPerPage=2",
                "200 OK",
                tx_list(&["c"]),
            ),
            ("/api/aggs-utxo?address=tca1", "200 OK", r#"{"data":[]}"#.to_string()),
        ];
        let (service, mut rx, _seen) = setup(routes, 3).await;

        let mut page = AssetAddressPage::new(2, ProgressTracker::new());
        page.mount("tca1".to_string(), &service);
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            deliver(&mut page, event);
        }

        let key = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE);
        assert!(matches!(
            page.handle_key(key),
            Some(AppEvent::LoadMore(LoadMoreTarget::AssetTransactions))
        ));
        page.load_more(&service);

        // Busy while the page is in flight.
        assert!(page.handle_key(key).is_none());

        let event = rx.recv().await.unwrap();
        deliver(&mut page, event);
        let hashes: Vec<&str> = page.transactions.iter().map(|t| t.data.hash.as_str()).collect();
        assert_eq!(hashes, ["a", "b", "c"]);
        assert!(!page.tx_table.paginator().has_more(3));
    }

    #[tokio::test]
    async fn test_new_address_starts_over() {
        let routes = vec![
            ("/api/addr-asset-txs/tca1?page=1&itemsPerPage=3", "200 OK", tx_list(&["a"])),
            ("/api/aggs-utxo?address=tca1", "200 OK", r#"{"data":[]}"#.to_string()),
        ];
        let (service, mut rx, _seen) = setup(routes, 4).await;

        let mut page = AssetAddressPage::new(3, ProgressTracker::new());
        page.mount("tca1".to_string(), &service);
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            deliver(&mut page, event);
        }
        assert_eq!(page.transactions.len(), 1);
        assert!(!page.tx_table.paginator().has_more(1));

        page.mount("tca2".to_string(), &service);
        assert!(page.transactions.is_empty());
        assert_eq!(page.tx_table.paginator().page(), 1);
        assert!(page.tx_table.paginator().has_more(0));
        assert_eq!(page.address(), Some("tca2"));
    }

    #[test]
    fn test_open_asset_type_from_utxo_panel() {
        let mut page = AssetAddressPage::new(3, ProgressTracker::new());
        page.utxo = serde_json::from_str(
            r#"[{"assetType":"5300aa","totalAssetQuantity":"5","utxoQuantity":1},
                {"assetType":"5300bb","totalAssetQuantity":"9","utxoQuantity":2}]"#,
        )
        .unwrap();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        page.handle_key(key(KeyCode::Tab));
        assert!(page.handle_key(key(KeyCode::Enter)).is_none());
        page.handle_key(key(KeyCode::Down));
        page.handle_key(key(KeyCode::Down));
        assert!(matches!(
            page.handle_key(key(KeyCode::Enter)),
            Some(AppEvent::Navigate(View::AssetType(t))) if t == "5300bb"
        ));
    }
}
