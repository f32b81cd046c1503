use std::num::NonZeroUsize;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::{failure, field_row, render_placeholder, Component};
use crate::data::endpoints::{normalize_hash, Parcel, PendingParcel};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{ActionDoc, ParcelDoc, PendingParcelDoc, TransactionDoc};
use crate::data::DataService;
use crate::events::{AppEvent, BlockId, View};
use crate::theme::THEME;
use crate::utils;

const TRANSACTIONS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => panic!("page size must be non-zero"),
};

#[derive(Debug)]
enum LoadedParcel {
    Confirmed(ParcelDoc),
    Pending(PendingParcelDoc),
}

impl LoadedParcel {
    fn parcel(&self) -> &ParcelDoc {
        match self {
            LoadedParcel::Confirmed(p) => p,
            LoadedParcel::Pending(p) => &p.parcel,
        }
    }
}

/// A parcel by hash. Confirmed parcels are looked up first; a miss falls back
/// to the pending pool before the parcel is reported as not found.
pub struct ParcelDetailPage {
    confirmed: DataRequest<String>,
    pending: DataRequest<String>,
    loaded: Option<LoadedParcel>,
    transactions: PagedTable,
}

impl ParcelDetailPage {
    pub fn new() -> Self {
        Self {
            confirmed: DataRequest::new(),
            pending: DataRequest::new(),
            loaded: None,
            transactions: PagedTable::new(
                Paginator::client_slice(TRANSACTIONS_PER_PAGE),
                "Load Transactions",
            ),
        }
    }

    pub fn mount(&mut self, hash: String, service: &DataService) {
        let hash = normalize_hash(&hash);
        if let Some(ticket) = self.confirmed.mount(hash.clone()) {
            self.pending = DataRequest::new();
            self.loaded = None;
            self.transactions.reset();
            service.request(Parcel { hash }, ticket, AppEvent::Parcel);
        } else if self.confirmed.state() == RequestState::NotFound {
            // Left while the pending lookup was in flight.
            self.request_pending(hash, service);
        }
    }

    pub fn unmount(&mut self) {
        self.confirmed.unmount();
        self.pending.unmount();
    }

    fn request_pending(&mut self, hash: String, service: &DataService) {
        if let Some(ticket) = self.pending.mount(hash.clone()) {
            service.request(PendingParcel { hash }, ticket, AppEvent::PendingParcel);
        }
    }

    pub fn on_confirmed(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<ParcelDoc>,
        service: &DataService,
    ) -> Option<AppEvent> {
        match self.confirmed.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(parcel) => {
                self.loaded = Some(LoadedParcel::Confirmed(parcel));
                None
            }
            FetchOutcome::NotFound => {
                let hash = self.confirmed.key()?.clone();
                self.request_pending(hash, service);
                None
            }
            FetchOutcome::Failed(e) => failure("parcel", &e),
        }
    }

    pub fn on_pending(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<PendingParcelDoc>,
    ) -> Option<AppEvent> {
        match self.pending.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(pending) => {
                self.loaded = Some(LoadedParcel::Pending(pending));
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("pending parcel", &e),
        }
    }

    fn is_not_found(&self) -> bool {
        self.pending.state() == RequestState::NotFound
    }

    fn has_failed(&self) -> bool {
        self.confirmed.state() == RequestState::Failed || self.pending.state() == RequestState::Failed
    }

    fn transaction_list(&self) -> &[TransactionDoc] {
        self.loaded
            .as_ref()
            .map(|l| l.parcel().transactions())
            .unwrap_or(&[])
    }
}

fn info_rows(loaded: &LoadedParcel) -> Vec<Row<'static>> {
    let parcel = loaded.parcel();
    let status = match loaded {
        LoadedParcel::Confirmed(_) => Cell::from("Confirmed").style(THEME.success_style()),
        LoadedParcel::Pending(p) => {
            Cell::from(format!("Pending ({})", p.status)).style(THEME.warning_style())
        }
    };

    let mut rows = vec![
        field_row("Hash", parcel.hash.clone(), THEME.hash_style()),
        Row::new(vec![Cell::from("Status").style(THEME.muted_style()), status]),
        field_row("Action", parcel.action.name().to_string(), THEME.accent_style()),
        field_row("Signer", parcel.signer.clone(), THEME.address_style()),
        field_row("Fee", utils::format_amount(&parcel.fee.0), THEME.amount_style()),
        field_row("Seq", parcel.seq.to_string(), Style::default().fg(THEME.text)),
        field_row("Network", parcel.network_id.clone(), Style::default().fg(THEME.text)),
    ];

    if let Some(number) = parcel.block_number {
        let index = parcel
            .parcel_index
            .map(|i| format!(" (index {i})"))
            .unwrap_or_default();
        rows.push(field_row(
            "Block",
            format!("#{}{index}", utils::format_number(number)),
            THEME.accent_style(),
        ));
    }
    if parcel.timestamp > 0 {
        rows.push(field_row(
            "Timestamp",
            utils::format_timestamp(parcel.timestamp),
            Style::default().fg(THEME.text),
        ));
    }

    match &parcel.action {
        ActionDoc::Payment { receiver, amount } => {
            rows.push(field_row("Receiver", receiver.clone(), THEME.address_style()));
            rows.push(field_row("Amount", utils::format_amount(&amount.0), THEME.amount_style()));
        }
        ActionDoc::SetRegularKey { key } => {
            rows.push(field_row("Key", key.clone(), THEME.hash_style()));
        }
        ActionDoc::ChangeShardState { .. } | ActionDoc::Unknown => {}
    }

    rows
}

fn transaction_rows(transactions: &[TransactionDoc]) -> Vec<Row<'static>> {
    transactions
        .iter()
        .map(|tx| {
            Row::new(vec![
                Cell::from(utils::truncate_hash(&tx.data.hash)).style(THEME.hash_style()),
                Cell::from(tx.kind_label().to_string()).style(THEME.accent_style()),
                Cell::from(tx.data.inputs.len().to_string()),
                Cell::from(tx.data.outputs.len().to_string()),
            ])
        })
        .collect()
}

impl Component for ParcelDetailPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if key.code == KeyCode::Char('b') {
            let number = self.loaded.as_ref()?.parcel().block_number?;
            return Some(AppEvent::Navigate(View::BlockDetail(BlockId::Number(number))));
        }

        let total = self.transaction_list().len();
        match self.transactions.handle_key(key, total)? {
            ListAction::Open(idx) => self
                .transaction_list()
                .get(idx)
                .map(|tx| AppEvent::Navigate(View::TransactionDetail(tx.data.hash.clone()))),
            ListAction::LoadMore(_) => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::default()
            .title(" Parcel ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let Some(loaded) = &self.loaded else {
            let (message, style) = if self.is_not_found() {
                let hash = self.confirmed.key().map(String::as_str).unwrap_or_default();
                (format!("Parcel {hash} does not exist"), THEME.warning_style())
            } else if self.has_failed() {
                ("Could not load parcel".to_string(), THEME.error_style())
            } else {
                ("Loading...".to_string(), THEME.muted_style())
            };
            render_placeholder(frame, inner, &message, style);
            return;
        };

        let info = info_rows(loaded);
        let transactions = loaded.parcel().transactions();
        let has_txs = matches!(loaded.parcel().action, ActionDoc::ChangeShardState { .. });

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(info.len() as u16), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(
            Table::new(info, [Constraint::Length(12), Constraint::Min(20)]),
            chunks[0],
        );

        if !has_txs {
            return;
        }

        let tx_block = Block::default()
            .title(format!(" Transactions ({}) ", transactions.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());
        let header = Row::new(vec![
            Cell::from("Hash"),
            Cell::from("Type"),
            Cell::from("Inputs"),
            Cell::from("Outputs"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows = transaction_rows(self.transactions.visible(transactions));
        let widths = [
            Constraint::Length(16),
            Constraint::Length(15),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        let table = Table::new(rows, widths).header(header);
        self.transactions
            .render(frame, chunks[1], table, tx_block, transactions.len());
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

    const PENDING: &str = r#"{
        "parcel": {"hash":"ab12","action":{"action":"payment","receiver":"tcc","amount":"5"}},
        "status": "pending",
        "timestamp": 1530000000
    }"#;

    fn shard_parcel(n: usize) -> String {
        let txs: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"type":"assetTransfer","data":{{"hash":"t{i}"}}}}"#))
            .collect();
        format!(
            r#"{{"hash":"ab12","blockNumber":4,"action":{{"action":"changeShardState","transactions":[{}]}}}}"#,
            txs.join(",")
        )
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

    fn deliver(page: &mut ParcelDetailPage, event: AppEvent, service: &DataService) -> Option<AppEvent> {
        match event {
            AppEvent::Parcel(t, o) => page.on_confirmed(&t, o, service),
            AppEvent::PendingParcel(t, o) => page.on_pending(&t, o),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_confirmed_parcel_skips_pending_lookup() {
        let routes = vec![("/api/parcel/ab12", "200 OK", shard_parcel(4))];
        let (service, mut rx, mut seen) = setup(routes, 1).await;

        let mut page = ParcelDetailPage::new();
        page.mount("ab12".to_string(), &service);
        let event = rx.recv().await.unwrap();
        assert!(deliver(&mut page, event, &service).is_none());

        assert!(matches!(page.loaded, Some(LoadedParcel::Confirmed(_))));
        assert_eq!(page.pending.state(), RequestState::Idle);
        assert_eq!(seen.recv().await.unwrap(), "/api/parcel/ab12");

        // Transactions are revealed three at a time.
        assert_eq!(page.transactions.visible(page.transaction_list()).len(), 3);
        page.handle_key(key(KeyCode::Char('m')));
        assert_eq!(page.transactions.visible(page.transaction_list()).len(), 4);

        assert!(matches!(
            page.handle_key(key(KeyCode::Char('b'))),
            Some(AppEvent::Navigate(View::BlockDetail(BlockId::Number(4))))
        ));
    }

    #[tokio::test]
    async fn test_falls_back_to_pending() {
        let routes = vec![
            ("/api/parcel/ab12", "200 OK", "null".to_string()),
            ("/api/parcel/pending/ab12", "200 OK", PENDING.to_string()),
        ];
        let (service, mut rx, _seen) = setup(routes, 2).await;

        let mut page = ParcelDetailPage::new();
        page.mount("ab12".to_string(), &service);
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            assert!(deliver(&mut page, event, &service).is_none());
        }

        match &page.loaded {
            Some(LoadedParcel::Pending(p)) => assert_eq!(p.status, "pending"),
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(!page.is_not_found());
    }

    #[tokio::test]
    async fn test_not_found_after_both_lookups() {
        let (service, mut rx, mut seen) = setup(Vec::new(), 2).await;

        let mut page = ParcelDetailPage::new();
        page.mount("ffff".to_string(), &service);
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            assert!(deliver(&mut page, event, &service).is_none());
        }

        assert!(page.loaded.is_none());
        assert!(page.is_not_found());
        assert_eq!(seen.recv().await.unwrap(), "/api/parcel/ffff");
        assert_eq!(seen.recv().await.unwrap(), "/api/parcel/pending/ffff");
    }

    #[tokio::test]
    async fn test_failure_does_not_fall_back() {
        let routes = vec![("/api/parcel/ab12", "500 Internal Server Error", "boom".to_string())];
        let (service, mut rx, _seen) = setup(routes, 1).await;

        let mut page = ParcelDetailPage::new();
        page.mount("ab12".to_string(), &service);
        let event = rx.recv().await.unwrap();
        assert!(matches!(
            deliver(&mut page, event, &service),
            Some(AppEvent::Error(_))
        ));
        assert!(page.has_failed());
        assert_eq!(page.pending.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_prefixed_hash_is_the_same_parcel() {
        let routes = vec![("/api/parcel/ab12", "200 OK", shard_parcel(1))];
        let (service, mut rx, mut seen) = setup(routes, 1).await;

        let mut page = ParcelDetailPage::new();
        page.mount("0xAB12".to_string(), &service);
        let event = rx.recv().await.unwrap();
        assert!(deliver(&mut page, event, &service).is_none());
        assert_eq!(seen.recv().await.unwrap(), "/api/parcel/ab12");

        page.unmount();
        page.mount("ab12".to_string(), &service);
        assert_eq!(page.confirmed.state(), RequestState::Delivered);
        assert_eq!(page.confirmed.key().map(String::as_str), Some("ab12"));
        assert!(seen.try_recv().is_err());
    }
}
