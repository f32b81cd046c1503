use std::num::NonZeroUsize;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::{failure, field_row, render_placeholder, Component};
use crate::data::endpoints::{normalize_hash, Block as BlockEndpoint};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::BlockDoc;
use crate::data::DataService;
use crate::events::{AppEvent, BlockId, View};
use crate::theme::THEME;
use crate::utils;

const PARCELS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => panic!("page size must be non-zero"),
};

pub struct BlockDetailPage {
    request: DataRequest<BlockId>,
    block: Option<BlockDoc>,
    parcels: PagedTable,
}

impl BlockDetailPage {
    pub fn new() -> Self {
        Self {
            request: DataRequest::new(),
            block: None,
            parcels: PagedTable::new(Paginator::client_slice(PARCELS_PER_PAGE), "Load parcels"),
        }
    }

    pub fn mount(&mut self, id: BlockId, service: &DataService) {
        let id = match id {
            BlockId::Hash(hash) => BlockId::Hash(normalize_hash(&hash)),
            number => number,
        };
        if let Some(ticket) = self.request.mount(id.clone()) {
            self.block = None;
            self.parcels.reset();
            service.request(BlockEndpoint(id), ticket, AppEvent::Block);
        }
    }

    pub fn unmount(&mut self) {
        self.request.unmount();
    }

    pub fn on_block(&mut self, ticket: &Ticket, outcome: FetchOutcome<BlockDoc>) -> Option<AppEvent> {
        match self.request.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(block) => {
                self.block = Some(block);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("block", &e),
        }
    }
}

fn info_rows(block: &BlockDoc) -> Vec<Row<'static>> {
    vec![
        field_row("Block Height", utils::format_number(block.number), THEME.accent_style()),
        field_row("Hash", block.hash.clone(), THEME.hash_style()),
        field_row("Parent Hash", block.parent_hash.clone(), THEME.hash_style()),
        field_row(
            "Timestamp",
            format!(
                "{} ({})",
                utils::format_timestamp(block.timestamp),
                utils::format_time_ago(block.timestamp)
            ),
            Style::default().fg(THEME.text),
        ),
        field_row("Author", block.author.clone(), THEME.address_style()),
        field_row("Parcels Root", block.parcels_root.clone(), THEME.hash_style()),
        field_row("State Root", block.state_root.clone(), THEME.hash_style()),
        field_row("Invoices Root", block.invoices_root.clone(), THEME.hash_style()),
        field_row("Score", utils::format_amount(&block.score.0), Style::default().fg(THEME.text)),
    ]
}

impl Component for BlockDetailPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        let block = self.block.as_ref()?;
        match self.parcels.handle_key(key, block.parcels.len())? {
            ListAction::Open(idx) => block
                .parcels
                .get(idx)
                .map(|p| AppEvent::Navigate(View::ParcelDetail(p.hash.clone()))),
            ListAction::LoadMore(_) => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.request.key() {
            Some(id) => format!(" Block {id} "),
            None => " Block ".to_string(),
        };
        let outer_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let block = match (&self.block, self.request.state()) {
            (Some(b), _) => b,
            (None, RequestState::NotFound) => {
                render_placeholder(frame, inner, "Block not found", THEME.warning_style());
                return;
            }
            (None, RequestState::Failed) => {
                render_placeholder(frame, inner, "Could not load block", THEME.error_style());
                return;
            }
            (None, _) => {
                render_placeholder(frame, inner, "Loading...", THEME.muted_style());
                return;
            }
        };

        let info = info_rows(block);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(info.len() as u16), Constraint::Min(5)])
            .split(inner);

        let info_table = Table::new(info, [Constraint::Length(15), Constraint::Min(20)]);
        frame.render_widget(info_table, chunks[0]);

        let parcel_block = Block::default()
            .title(format!(" Parcels ({}) ", block.parcels.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        let header = Row::new(vec![
            Cell::from("Hash"),
            Cell::from("Action"),
            Cell::from("Signer"),
            Cell::from("Fee"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows: Vec<Row> = self
            .parcels
            .visible(&block.parcels)
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
        self.parcels
            .render(frame, chunks[1], table, parcel_block, block.parcels.len());
    }
}
