use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::{failure, field_row, render_placeholder, Component};
use crate::data::endpoints::{NodeStatus, SyncStatus};
use crate::data::request::{DataRequest, FetchOutcome, RequestState, Ticket};
use crate::data::types::{NodeStatusDoc, SyncStatusDoc};
use crate::data::DataService;
use crate::events::{AppEvent, BlockId, View};
use crate::theme::THEME;
use crate::utils;

/// Indexer sync progress and the node it follows. Every visit refetches.
pub struct StatusPage {
    visit: u64,
    sync_req: DataRequest<u64>,
    node_req: DataRequest<u64>,
    sync: Option<SyncStatusDoc>,
    node: Option<NodeStatusDoc>,
}

impl StatusPage {
    pub fn new() -> Self {
        Self {
            visit: 0,
            sync_req: DataRequest::new(),
            node_req: DataRequest::new(),
            sync: None,
            node: None,
        }
    }

    pub fn mount(&mut self, service: &DataService) {
        self.visit += 1;
        if let Some(ticket) = self.sync_req.mount(self.visit) {
            service.request(SyncStatus, ticket, AppEvent::SyncStatus);
        }
        if let Some(ticket) = self.node_req.mount(self.visit) {
            service.request(NodeStatus, ticket, AppEvent::NodeStatus);
        }
    }

    pub fn unmount(&mut self) {
        self.sync_req.unmount();
        self.node_req.unmount();
    }

    pub fn on_sync(&mut self, ticket: &Ticket, outcome: FetchOutcome<SyncStatusDoc>) -> Option<AppEvent> {
        match self.sync_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(sync) => {
                self.sync = Some(sync);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("sync status", &e),
        }
    }

    pub fn on_node(&mut self, ticket: &Ticket, outcome: FetchOutcome<NodeStatusDoc>) -> Option<AppEvent> {
        match self.node_req.resolve(ticket, outcome)? {
            FetchOutcome::Delivered(node) => {
                self.node = Some(node);
                None
            }
            FetchOutcome::NotFound => None,
            FetchOutcome::Failed(e) => failure("node status", &e),
        }
    }

    fn render_sync(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Sync ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .title_bottom(
                Line::from(" [b] indexed block ")
                    .alignment(Alignment::Right)
                    .style(THEME.muted_style()),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(sync) = &self.sync else {
            render_placeholder(frame, inner, placeholder(self.sync_req.state()), THEME.muted_style());
            return;
        };

        let lag = sync.lag();
        let lag_style = if lag == 0 {
            THEME.success_style()
        } else {
            THEME.warning_style()
        };
        let rows = vec![
            field_row(
                "Node best",
                format!("#{}", utils::format_number(sync.codechain_best_block_number)),
                THEME.accent_style(),
            ),
            field_row("", sync.codechain_best_block_hash.clone(), THEME.hash_style()),
            field_row(
                "Indexed",
                format!("#{}", utils::format_number(sync.indexed_block_number)),
                THEME.accent_style(),
            ),
            field_row("", sync.indexed_block_hash.clone(), THEME.hash_style()),
            field_row("Behind", format!("{} blocks", utils::format_number(lag)), lag_style),
        ];
        frame.render_widget(Table::new(rows, [Constraint::Length(12), Constraint::Min(20)]), inner);
    }

    fn render_node(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Node ")
            .borders(Borders::ALL)
            .border_style(THEME.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(node) = &self.node else {
            render_placeholder(frame, inner, placeholder(self.node_req.state()), THEME.muted_style());
            return;
        };

        let text = Style::default().fg(THEME.text);
        let rows = vec![
            field_row("Version", node.node_version.clone(), text),
            field_row("Commit", node.commit_hash.clone(), THEME.hash_style()),
            field_row("Network", node.network_id.clone(), text),
            field_row("Peers", node.peer_count.to_string(), THEME.accent_style()),
        ];
        frame.render_widget(Table::new(rows, [Constraint::Length(12), Constraint::Min(20)]), inner);
    }
}

fn placeholder(state: RequestState) -> &'static str {
    match state {
        RequestState::NotFound => "Not reported",
        RequestState::Failed => "Could not load status",
        _ => "Loading...",
    }
}

impl Component for StatusPage {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('b') => {
                let number = self.sync.as_ref()?.indexed_block_number;
                Some(AppEvent::Navigate(View::BlockDetail(BlockId::Number(number))))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(6)])
            .split(area);
        self.render_sync(frame, chunks[0]);
        self.render_node(frame, chunks[1]);
    }
}
