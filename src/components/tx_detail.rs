use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::{failure, field_row, render_placeholder, Component};
use crate::data::endpoints::{normalize_hash, Transaction};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{AssetOutputDoc, TransactionDoc};
use crate::data::DataService;
use crate::events::{AppEvent, BlockId, View};
use crate::theme::THEME;
use crate::utils;

pub struct TxDetailPage {
    request: DataRequest<String>,
    transaction: Option<TransactionDoc>,
    output_state: TableState,
}

impl TxDetailPage {
    pub fn new() -> Self {
        Self {
            request: DataRequest::new(),
            transaction: None,
            output_state: TableState::default(),
        }
    }

    pub fn mount(&mut self, hash: String, service: &DataService) {
        let hash = normalize_hash(&hash);
        if let Some(ticket) = self.request.mount(hash.clone()) {
            self.transaction = None;
            self.output_state.select(None);
            service.request(Transaction { hash }, ticket, AppEvent::Transaction);
        }
    }

    pub fn unmount(&mut self) {
        self.request.unmount();
    }

    pub fn on_transaction(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<TransactionDoc>,
    ) -> Option<AppEvent> {
        match self.request.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(tx) => {
                self.transaction = Some(tx);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("transaction", &e),
        }
    }

    /// Outputs of the transaction; a mint has its single output outside the list.
    fn outputs(&self) -> Vec<&AssetOutputDoc> {
        let Some(tx) = &self.transaction else {
            return Vec::new();
        };
        tx.data.output.iter().chain(tx.data.outputs.iter()).collect()
    }
}

fn output_rows(outputs: &[&AssetOutputDoc]) -> Vec<Row<'static>> {
    outputs
        .iter()
        .map(|o| {
            Row::new(vec![
                Cell::from(utils::truncate_hash(&o.asset_type)).style(THEME.hash_style()),
                Cell::from(utils::format_amount(&o.amount.0)).style(THEME.amount_style()),
                Cell::from(o.owner.clone().unwrap_or_else(|| "-".to_string()))
                    .style(THEME.address_style()),
            ])
        })
        .collect()
}

impl Component for TxDetailPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        let len = self.outputs().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    let next = self.output_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                    self.output_state.select(Some(next));
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if len > 0 {
                    let prev = self.output_state.selected().unwrap_or(0).saturating_sub(1);
                    self.output_state.select(Some(prev));
                }
                None
            }
            KeyCode::Enter => {
                let idx = self.output_state.selected()?;
                let owner = self.outputs().get(idx)?.owner.clone()?;
                Some(AppEvent::Navigate(View::AssetAddress(owner)))
            }
            KeyCode::Char('a') => {
                let idx = self.output_state.selected()?;
                let asset_type = self.outputs().get(idx)?.asset_type.clone();
                Some(AppEvent::Navigate(View::AssetType(asset_type)))
            }
            KeyCode::Char('p') => {
                let parcel = self.transaction.as_ref()?.data.parcel_hash.clone()?;
                Some(AppEvent::Navigate(View::ParcelDetail(parcel)))
            }
            KeyCode::Char('b') => {
                let number = self.transaction.as_ref()?.data.block_number?;
                Some(AppEvent::Navigate(View::BlockDetail(BlockId::Number(number))))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::default()
            .title(" Transaction ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let Some(tx) = &self.transaction else {
            let (message, style) = match self.request.state() {
                RequestState::NotFound => ("Transaction not found", THEME.warning_style()),
                RequestState::Failed => ("Could not load transaction", THEME.error_style()),
                _ => ("Loading...", THEME.muted_style()),
            };
            render_placeholder(frame, inner, message, style);
            return;
        };

        let text = Style::default().fg(THEME.text);
        let mut info = vec![
            field_row("Hash", tx.data.hash.clone(), THEME.hash_style()),
            field_row("Type", tx.kind_label().to_string(), THEME.accent_style()),
            field_row("Network", tx.data.network_id.clone(), text),
        ];
        if let Some(parcel) = &tx.data.parcel_hash {
            info.push(field_row("Parcel", format!("{parcel}  [p]"), THEME.hash_style()));
        }
        if let Some(number) = tx.data.block_number {
            info.push(field_row(
                "Block",
                format!("#{}  [b]", utils::format_number(number)),
                THEME.accent_style(),
            ));
        }
        if let Some(ts) = tx.data.timestamp {
            info.push(field_row("Timestamp", utils::format_timestamp(ts), text));
        }
        if let Some(metadata) = &tx.data.metadata {
            info.push(field_row("Metadata", metadata.clone(), THEME.muted_style()));
        }

        let inputs: Vec<Row> = tx
            .data
            .inputs
            .iter()
            .map(|i| {
                Row::new(vec![
                    Cell::from(utils::truncate_hash(&i.prev_out.asset_type)).style(THEME.hash_style()),
                    Cell::from(utils::format_amount(&i.prev_out.amount.0)).style(THEME.amount_style()),
                    Cell::from(i.prev_out.owner.clone().unwrap_or_else(|| "-".to_string()))
                        .style(THEME.address_style()),
                ])
            })
            .collect();
        let input_count = inputs.len();

        let info_height = info.len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(info_height),
                Constraint::Length(input_count as u16 + 3),
                Constraint::Min(4),
            ])
            .split(inner);

        frame.render_widget(
            Table::new(info, [Constraint::Length(12), Constraint::Min(20)]),
            chunks[0],
        );

        let header = || {
            Row::new(vec![Cell::from("Asset Type"), Cell::from("Amount"), Cell::from("Owner")])
                .style(THEME.table_header_style())
                .bottom_margin(0)
        };
        let widths = [Constraint::Length(16), Constraint::Length(20), Constraint::Min(20)];

        let input_table = Table::new(inputs, widths).header(header()).block(
            Block::default()
                .title(format!(" Inputs ({input_count}) "))
                .borders(Borders::ALL)
                .border_style(THEME.border_style()),
        );
        frame.render_widget(input_table, chunks[1]);

        let outputs = self.outputs();
        let output_table = Table::new(output_rows(&outputs), widths)
            .header(header())
            .block(
                Block::default()
                    .title(format!(" Outputs ({}) ", outputs.len()))
                    .title_bottom(
                        Line::from(" [Enter] owner  [a] asset ")
                            .alignment(Alignment::Right)
                            .style(THEME.muted_style()),
                    )
                    .borders(Borders::ALL)
                    .border_style(THEME.border_style()),
            )
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");
        frame.render_stateful_widget(output_table, chunks[2], &mut self.output_state);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn page_with(tx: serde_json::Value) -> TxDetailPage {
        let mut page = TxDetailPage::new();
        page.transaction = Some(serde_json::from_value(tx).unwrap());
        page
    }

    #[test]
    fn test_mint_output_listed_first() {
        let page = page_with(json!({
            "type": "assetMint",
            "data": {
                "hash": "t1",
                "output": {"assetType": "5300aa", "amount": "100", "owner": "tcaqmint"}
            }
        }));
        let outputs = page.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].owner.as_deref(), Some("tcaqmint"));
    }

    #[test]
    fn test_open_output_owner() {
        let mut page = page_with(json!({
            "type": "assetTransfer",
            "data": {
                "hash": "t2",
                "parcelHash": "ab12",
                "blockNumber": 9,
                "outputs": [
                    {"assetType": "5300aa", "amount": 1, "owner": "tcaqone"},
                    {"assetType": "5300aa", "amount": 2, "owner": "tcaqtwo"}
                ]
            }
        }));
        page.handle_key(key(KeyCode::Char('j')));
        page.handle_key(key(KeyCode::Char('j')));
        assert!(matches!(
            page.handle_key(key(KeyCode::Enter)),
            Some(AppEvent::Navigate(View::AssetAddress(a))) if a == "tcaqtwo"
        ));
        assert!(matches!(
            page.handle_key(key(KeyCode::Char('a'))),
            Some(AppEvent::Navigate(View::AssetType(t))) if t == "5300aa"
        ));
        assert!(matches!(
            page.handle_key(key(KeyCode::Char('p'))),
            Some(AppEvent::Navigate(View::ParcelDetail(h))) if h == "ab12"
        ));
        assert!(matches!(
            page.handle_key(key(KeyCode::Char('b'))),
            Some(AppEvent::Navigate(View::BlockDetail(BlockId::Number(9))))
        ));
    }

    #[test]
    fn test_stale_outcome_ignored() {
        let mut page = TxDetailPage::new();
        let mut other = DataRequest::new();
        let foreign = other.mount("x".to_string()).unwrap();
        page.request.mount("t1".to_string());

        let outcome = page.on_transaction(&foreign, FetchOutcome::NotFound);
        assert!(outcome.is_none());
        assert_eq!(page.request.state(), RequestState::Requesting);
    }

    #[tokio::test]
    async fn test_hash_spellings_share_one_request() {
        use std::time::Duration;

        use tokio::sync::mpsc;

        use crate::data::client::test_server::serve_routes;
        use crate::data::client::ApiClient;
        use crate::data::progress::ProgressTracker;

        let routes = vec![(
            "/api/tx/beef",
            "200 OK",
            r#"{"type":"assetTransfer","data":{"hash":"beef"}}"#.to_string(),
        )];
        let (base, mut seen) = serve_routes(routes, 1).await;
        let client = ApiClient::new(&base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = DataService::new(client, tx);

        let mut page = TxDetailPage::new();
        page.mount("0xBEEF".to_string(), &service);
        page.mount("beef".to_string(), &service);
        match rx.recv().await.unwrap() {
            AppEvent::Transaction(t, o) => assert!(page.on_transaction(&t, o).is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(seen.recv().await.unwrap(), "/api/tx/beef");
        assert!(seen.try_recv().is_err());
        assert_eq!(page.transaction.as_ref().map(|t| t.data.hash.as_str()), Some("beef"));
    }
}
