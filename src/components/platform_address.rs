use std::num::NonZeroUsize;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::block_list::BlockList;
use crate::components::pagination::Paginator;
use crate::components::{failure, field_row, render_placeholder, Component};
use crate::data::endpoints::{AuthoredBlocks, PlatformAccount};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{BlockDoc, PlatformAccountDoc};
use crate::data::DataService;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

const BLOCKS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => panic!("page size must be non-zero"),
};

/// A platform (CCC) account: balance, sequence and the blocks it authored.
pub struct PlatformAddressPage {
    account_req: DataRequest<String>,
    blocks_req: DataRequest<String>,
    account: Option<PlatformAccountDoc>,
    blocks: Vec<BlockDoc>,
    list: BlockList,
}

impl PlatformAddressPage {
    pub fn new() -> Self {
        Self {
            account_req: DataRequest::new(),
            blocks_req: DataRequest::new(),
            account: None,
            blocks: Vec::new(),
            list: BlockList::new(Paginator::client_slice(BLOCKS_PER_PAGE)),
        }
    }

    pub fn mount(&mut self, address: String, service: &DataService) {
        if let Some(ticket) = self.account_req.mount(address.clone()) {
            self.account = None;
            let endpoint = PlatformAccount {
                address: address.clone(),
            };
            service.request(endpoint, ticket, AppEvent::PlatformAccount);
        }
        if let Some(ticket) = self.blocks_req.mount(address.clone()) {
            self.blocks.clear();
            self.list.reset();
            service.request(AuthoredBlocks { address }, ticket, AppEvent::AuthoredBlocks);
        }
    }

    pub fn unmount(&mut self) {
        self.account_req.unmount();
        self.blocks_req.unmount();
    }

    pub fn on_account(
        &mut self,
        ticket: &Ticket,
        outcome: FetchOutcome<PlatformAccountDoc>,
    ) -> Option<AppEvent> {
        match self.account_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(account) => {
                self.account = Some(account);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("platform account", &e),
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
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("authored blocks", &e),
        }
    }
}

impl Component for PlatformAddressPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        self.list.handle_key(key, &self.blocks)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let address = self.account_req.key().cloned().unwrap_or_default();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let account_block = Block::default()
            .title(" Platform Address ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = account_block.inner(chunks[0]);
        frame.render_widget(account_block, chunks[0]);

        match (&self.account, self.account_req.state()) {
            (Some(account), _) => {
                let rows = vec![
                    field_row("Address", address, THEME.address_style()),
                    field_row("Balance", utils::format_amount(&account.balance.0), THEME.amount_style()),
                    field_row("Seq", account.seq.to_string(), Style::default().fg(THEME.text)),
                ];
                frame.render_widget(
                    Table::new(rows, [Constraint::Length(10), Constraint::Min(20)]),
                    inner,
                );
            }
            (None, RequestState::NotFound) => {
                render_placeholder(frame, inner, "No account for this address", THEME.warning_style());
            }
            (None, RequestState::Failed) => {
                render_placeholder(frame, inner, "Could not load account", THEME.error_style());
            }
            (None, _) => render_placeholder(frame, inner, "Loading...", THEME.muted_style()),
        }

        let title = format!("Authored Blocks ({})", self.blocks.len());
        self.list.render(frame, chunks[1], &title, &self.blocks, true);
    }
}
