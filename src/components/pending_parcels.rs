use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::paged_table::{ListAction, PagedTable};
use crate::components::pagination::Paginator;
use crate::components::{failure, render_placeholder, Component};
use crate::data::endpoints::{PendingParcelCount, PendingParcelPage};
use crate::data::request::{DataRequest, FetchOutcome, Ticket};
use crate::data::types::PendingParcelDoc;
use crate::data::DataService;
use crate::events::{AppEvent, LoadMoreTarget, View};
use crate::theme::THEME;
use crate::utils;

/// Parcels waiting in the node's pool. The pool drains as blocks are
/// produced, so each visit starts from the first page again.
pub struct PendingParcelsPage {
    items_per_page: usize,
    visit: u64,
    page_req: DataRequest<(u64, usize)>,
    count_req: DataRequest<u64>,
    total: Option<u64>,
    parcels: Vec<PendingParcelDoc>,
    table: PagedTable,
}

impl PendingParcelsPage {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page,
            visit: 0,
            page_req: DataRequest::new(),
            count_req: DataRequest::new(),
            total: None,
            parcels: Vec::new(),
            table: PagedTable::new(
                Paginator::delegated(LoadMoreTarget::PendingParcels),
                "Load parcels",
            ),
        }
    }

    pub fn mount(&mut self, service: &DataService) {
        self.visit += 1;
        self.parcels.clear();
        self.table.reset();
        self.request_page(service);
        if let Some(ticket) = self.count_req.mount(self.visit) {
            service.request(PendingParcelCount, ticket, AppEvent::PendingParcelCount);
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
        if let Some(ticket) = self.page_req.mount((self.visit, page)) {
            self.table.set_busy(true);
            let endpoint = PendingParcelPage {
                page,
                items_per_page: self.items_per_page,
            };
            service.request(endpoint, ticket, AppEvent::PendingParcelPage);
        }
    }

    pub fn on_page(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<Vec<PendingParcelDoc>>,
    ) -> Option<AppEvent> {
        let outcome = self.page_req.resolve(ticket, outcome)?;
        self.table.set_busy(false);
        match outcome {
            FetchOutcome::Delivered(parcels) => {
                if parcels.len() < self.items_per_page {
                    self.table.paginator_mut().mark_exhausted();
                }
                self.parcels.extend(parcels);
                None
            }
            FetchOutcome::NotFound => {
                self.table.paginator_mut().mark_exhausted();
                None
            }
            FetchOutcome::Failed(e) => {
                self.table.paginator_mut().mark_exhausted();
                failure("pending parcels", &e)
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
            FetchOutcome::Failed(e) => failure("pending parcel count", &e),
        }
    }
}

fn build_rows(parcels: &[PendingParcelDoc]) -> Vec<Row<'static>> {
    parcels
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(utils::truncate_hash(&p.parcel.hash)).style(THEME.hash_style()),
                Cell::from(p.parcel.action.name()).style(THEME.accent_style()),
                Cell::from(p.status.clone()).style(THEME.warning_style()),
                Cell::from(utils::format_amount(&p.parcel.fee.0)).style(THEME.amount_style()),
                Cell::from(utils::format_time_ago(p.timestamp)).style(THEME.muted_style()),
                Cell::from(utils::truncate_hash(&p.parcel.signer)).style(THEME.address_style()),
            ])
        })
        .collect()
}

impl Component for PendingParcelsPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match self.table.handle_key(key, self.parcels.len())? {
            ListAction::Open(idx) => self
                .parcels
                .get(idx)
                .map(|p| AppEvent::Navigate(View::ParcelDetail(p.parcel.hash.clone()))),
            ListAction::LoadMore(target) => Some(AppEvent::LoadMore(target)),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.total {
            Some(total) => format!(" Pending Parcels ({}) ", utils::format_number(total)),
            None => " Pending Parcels ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        let header = Row::new(vec![
            Cell::from("Hash"),
            Cell::from("Action"),
            Cell::from("Status"),
            Cell::from("Fee"),
            Cell::from("Seen"),
            Cell::from("Signer"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);
        let widths = [
            Constraint::Length(16),
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(9),
            Constraint::Min(16),
        ];
        let table = Table::new(build_rows(self.table.visible(&self.parcels)), widths).header(header);
        self.table.render(frame, area, table, block, self.parcels.len());

        if self.parcels.is_empty() {
            let message = if self.page_req.is_loading() {
                "Loading..."
            } else {
                "No pending parcels"
            };
            render_placeholder(frame, area, message, THEME.muted_style());
        }
    }
}
