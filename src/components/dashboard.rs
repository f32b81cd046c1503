use std::num::NonZeroUsize;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::block_list::BlockList;
use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::{failure, render_placeholder, Component};
use crate::data::endpoints::{BlockPage, LatestBlockNumber, LatestParcels};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{BlockDoc, ParcelDoc};
use crate::data::DataService;
use crate::events::{AppEvent, View};
use crate::theme::THEME;
use crate::utils;

const PREVIEW_LEN: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => panic!("preview length must be non-zero"),
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DashboardPanel {
    Blocks,
    Parcels,
}

/// Latest block number, latest blocks and latest parcels. Every visit refetches.
pub struct Dashboard {
    visit: u64,
    best_number_req: DataRequest<u64>,
    blocks_req: DataRequest<u64>,
    parcels_req: DataRequest<u64>,
    best_number: Option<u64>,
    blocks: Vec<BlockDoc>,
    parcels: Vec<ParcelDoc>,
    block_list: BlockList,
    parcel_table: PagedTable,
    active_panel: DashboardPanel,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            visit: 0,
            best_number_req: DataRequest::new(),
            blocks_req: DataRequest::new(),
            parcels_req: DataRequest::new(),
            best_number: None,
            blocks: Vec::new(),
            parcels: Vec::new(),
            block_list: BlockList::new(Paginator::client_slice(PREVIEW_LEN).with_hide_more()),
            parcel_table: PagedTable::new(
                Paginator::client_slice(PREVIEW_LEN).with_hide_more(),
                "Load parcels",
            ),
            active_panel: DashboardPanel::Blocks,
        }
    }

    pub fn best_number(&self) -> Option<u64> {
        self.best_number
    }

    pub fn mount(&mut self, service: &DataService) {
        self.visit += 1;
        let visit = self.visit;

        if let Some(ticket) = self.best_number_req.mount(visit) {
            service.request(LatestBlockNumber, ticket, AppEvent::LatestBlockNumber);
        }
        if let Some(ticket) = self.blocks_req.mount(visit) {
            let endpoint = BlockPage {
                page: 1,
                items_per_page: PREVIEW_LEN.get(),
            };
            service.request(endpoint, ticket, AppEvent::LatestBlocks);
        }
        if let Some(ticket) = self.parcels_req.mount(visit) {
            let endpoint = LatestParcels {
                count: PREVIEW_LEN.get(),
            };
            service.request(endpoint, ticket, AppEvent::LatestParcels);
        }
    }

    pub fn unmount(&mut self) {
        self.best_number_req.unmount();
        self.blocks_req.unmount();
        self.parcels_req.unmount();
    }

    pub fn on_best_number(&mut self, ticket: &Ticket, outcome: FetchOutcome<u64>) -> Option<AppEvent> {
        match self.best_number_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(number) => {
                self.best_number = Some(number);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("latest block number", &e),
        }
    }

    pub fn on_blocks(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<BlockDoc>>,
    ) -> Option<AppEvent> {
        match self.blocks_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(blocks) => {
                self.blocks = blocks;
                None
            }
            FetchOutcome::NotFound => {
                self.blocks.clear();
                None
            }
            FetchOutcome::Failed(e) => failure("latest blocks", &e),
        }
    }

    pub fn on_parcels(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<ParcelDoc>>,
    ) -> Option<AppEvent> {
        match self.parcels_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(parcels) => {
                self.parcels = parcels;
                None
            }
            FetchOutcome::NotFound => {
                self.parcels.clear();
                None
            }
            FetchOutcome::Failed(e) => failure("latest parcels", &e),
        }
    }

    fn render_parcels(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            THEME.border_focused_style()
        } else {
            THEME.border_style()
        };
        let block = Block::default()
            .title(" Latest Parcels ")
            .borders(Borders::ALL)
            .border_style(border_style);

        let header = Row::new(vec![
            Cell::from("Hash"),
            Cell::from("Action"),
            Cell::from("Signer"),
            Cell::from("Fee"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows: Vec<Row> = self
            .parcel_table
            .visible(&self.parcels)
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(utils::truncate_hash(&p.hash)).style(THEME.hash_style()),
                    Cell::from(p.action.name()).style(THEME.accent_style()),
                    Cell::from(utils::truncate_hash(&p.signer)).style(THEME.address_style()),
                    Cell::from(utils::format_amount(&p.fee.0)).style(THEME.amount_style()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(16),
            Constraint::Length(17),
            Constraint::Min(16),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths).header(header);
        self.parcel_table.render(frame, area, table, block, self.parcels.len());
    }
}

impl Component for Dashboard {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if key.code == KeyCode::Tab {
            self.active_panel = match self.active_panel {
                DashboardPanel::Blocks => DashboardPanel::Parcels,
                DashboardPanel::Parcels => DashboardPanel::Blocks,
            };
            return None;
        }

        match self.active_panel {
            DashboardPanel::Blocks => self.block_list.handle_key(key, &self.blocks),
            DashboardPanel::Parcels => {
                match self.parcel_table.handle_key(key, self.parcels.len())? {
                    ListAction::Open(idx) => self
                        .parcels
                        .get(idx)
                        .map(|p| AppEvent::Navigate(View::ParcelDetail(p.hash.clone()))),
                    ListAction::LoadMore(_) => None,
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let best = match self.best_number {
            Some(n) => Span::styled(format!("#{}", utils::format_number(n)), THEME.accent_style()),
            None => Span::styled("-", THEME.muted_style()),
        };
        let summary = Paragraph::new(Line::from(vec![
            Span::styled(" Best block: ", THEME.muted_style()),
            best,
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(THEME.border_style()),
        );
        frame.render_widget(summary, rows[0]);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let blocks_focused = self.active_panel == DashboardPanel::Blocks;
        self.block_list
            .render(frame, chunks[0], "Latest Blocks", &self.blocks, blocks_focused);
        self.render_parcels(frame, chunks[1], !blocks_focused);

        if self.blocks_req.state() == RequestState::Requesting && self.blocks.is_empty() {
            render_placeholder(frame, chunks[0], "Loading...", THEME.muted_style());
        }
        if self.parcels_req.state() == RequestState::Requesting && self.parcels.is_empty() {
            render_placeholder(frame, chunks[1], "Loading...", THEME.muted_style());
        }
    }
}
