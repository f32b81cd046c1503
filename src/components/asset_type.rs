use std::num::NonZeroUsize;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::{failure, field_row, render_placeholder, Component};
use crate::data::endpoints::{normalize_hash, AssetScheme, AssetTypeUtxo};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{AggsUtxoDoc, AssetSchemeDoc};
use crate::data::DataService;
use crate::events::{AppEvent, View};
use crate::theme::THEME;
use crate::utils;

const HOLDERS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => panic!("page size must be non-zero"),
};

/// One asset type: its scheme and the addresses holding unspent outputs of it.
pub struct AssetTypePage {
    scheme_req: DataRequest<String>,
    holders_req: DataRequest<String>,
    scheme: Option<AssetSchemeDoc>,
    holders: Vec<AggsUtxoDoc>,
    holder_table: PagedTable,
}

impl AssetTypePage {
    pub fn new() -> Self {
        Self {
            scheme_req: DataRequest::new(),
            holders_req: DataRequest::new(),
            scheme: None,
            holders: Vec::new(),
            holder_table: PagedTable::new(Paginator::client_slice(HOLDERS_PER_PAGE), "Load holders"),
        }
    }

    pub fn mount(&mut self, asset_type: String, service: &DataService) {
        let asset_type = normalize_hash(&asset_type);
        if let Some(ticket) = self.scheme_req.mount(asset_type.clone()) {
            self.scheme = None;
            let endpoint = AssetScheme {
                asset_type: asset_type.clone(),
            };
            service.request(endpoint, ticket, AppEvent::AssetScheme);
        }
        if let Some(ticket) = self.holders_req.mount(asset_type.clone()) {
            self.holders.clear();
            self.holder_table.reset();
            service.request(AssetTypeUtxo { asset_type }, ticket, AppEvent::AssetHolders);
        }
    }

    pub fn unmount(&mut self) {
        self.scheme_req.unmount();
        self.holders_req.unmount();
    }

    pub fn on_scheme(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<AssetSchemeDoc>,
    ) -> Option<AppEvent> {
        match self.scheme_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(scheme) => {
                self.scheme = Some(scheme);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("asset scheme", &e),
        }
    }

    pub fn on_holders(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<AggsUtxoDoc>>,
    ) -> Option<AppEvent> {
        match self.holders_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(holders) => {
                self.holders = holders;
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("asset holders", &e),
        }
    }

    fn render_scheme(&self, frame: &mut Frame, area: Rect, asset_type: &str) {
        let Some(scheme) = &self.scheme else {
            let (message, style) = match self.scheme_req.state() {
                RequestState::NotFound => ("Asset not found", THEME.warning_style()),
                RequestState::Failed => ("Could not load asset", THEME.error_style()),
                _ => ("Loading...", THEME.muted_style()),
            };
            render_placeholder(frame, area, message, style);
            return;
        };

        let text = Style::default().fg(THEME.text);
        let mut rows = vec![field_row("Asset Type", asset_type.to_string(), THEME.hash_style())];
        if let Some(name) = asset_name(&scheme.metadata) {
            rows.push(field_row("Name", name, THEME.accent_style()));
        }
        rows.push(field_row(
            "Supply",
            utils::format_amount(&scheme.amount.0),
            THEME.amount_style(),
        ));
        rows.push(field_row(
            "Registrar",
            scheme.registrar.clone().unwrap_or_else(|| "none".to_string()),
            text,
        ));
        rows.push(field_row("Metadata", scheme.metadata.clone(), THEME.muted_style()));

        frame.render_widget(Table::new(rows, [Constraint::Length(12), Constraint::Min(20)]), area);
    }

    fn render_holders(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Holders ({}) ", self.holders.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        let header = Row::new(vec![
            Cell::from("Address"),
            Cell::from("Quantity"),
            Cell::from("UTXOs"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows: Vec<Row> = self
            .holder_table
            .visible(&self.holders)
            .iter()
            .map(|h| {
                Row::new(vec![
                    Cell::from(h.address.clone().unwrap_or_else(|| "-".to_string()))
                        .style(THEME.address_style()),
                    Cell::from(utils::format_amount(&h.total_asset_quantity.0))
                        .style(THEME.amount_style()),
                    Cell::from(h.utxo_quantity.to_string()),
                ])
            })
            .collect();

        let widths = [Constraint::Min(20), Constraint::Length(20), Constraint::Length(6)];
        let table = Table::new(rows, widths).header(header);
        self.holder_table
            .render(frame, area, table, block, self.holders.len());
    }
}

/// Asset scheme metadata is usually a JSON object with a `name` field.
pub(crate) fn asset_name(metadata: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(metadata).ok()?;
    value.get("name")?.as_str().map(str::to_string)
}

impl Component for AssetTypePage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match self.holder_table.handle_key(key, self.holders.len())? {
            ListAction::Open(idx) => {
                let address = self.holders.get(idx)?.address.clone()?;
                Some(AppEvent::Navigate(View::AssetAddress(address)))
            }
            ListAction::LoadMore(target) => Some(AppEvent::LoadMore(target)),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let asset_type = self.scheme_req.key().cloned().unwrap_or_default();
        let outer_block = Block::default()
            .title(" Asset ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(inner);

        self.render_scheme(frame, chunks[0], &asset_type);
        self.render_holders(frame, chunks[1]);
        if self.holders.is_empty() {
            let message = match self.holders_req.state() {
                RequestState::Requesting => "Loading...",
                RequestState::Failed => "Could not load holders",
                _ => "No holders",
            };
            render_placeholder(frame, chunks[1], message, THEME.muted_style());
        }
    }
}
