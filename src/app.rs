use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::components::asset_address::AssetAddressPage;
use crate::components::asset_type::AssetTypePage;
use crate::components::block_detail::BlockDetailPage;
use crate::components::blocks::BlocksPage;
use crate::components::dashboard::Dashboard;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::parcel_detail::ParcelDetailPage;
use crate::components::pending_parcels::PendingParcelsPage;
use crate::components::platform_address::PlatformAddressPage;
use crate::components::search::SearchBar;
use crate::components::status::StatusPage;
use crate::components::status_bar::StatusBar;
use crate::components::toast::{ToastLevel, Toasts};
use crate::components::transactions::TransactionsPage;
use crate::components::tx_detail::TxDetailPage;
use crate::components::Component;
use crate::data::progress::ProgressTracker;
use crate::data::DataService;
use crate::events::{AppEvent, LoadMoreTarget, View};
use crate::theme::THEME;

pub struct App {
    // Navigation
    view_stack: Vec<View>,
    current_view: View,

    // Pages
    dashboard: Dashboard,
    blocks: BlocksPage,
    block_detail: BlockDetailPage,
    parcel_detail: ParcelDetailPage,
    tx_detail: TxDetailPage,
    platform_address: PlatformAddressPage,
    asset_address: AssetAddressPage,
    asset_type: AssetTypePage,
    transactions: TransactionsPage,
    pending_parcels: PendingParcelsPage,
    status: StatusPage,

    // Chrome
    header: Header,
    status_bar: StatusBar,
    search_bar: SearchBar,
    help: HelpOverlay,
    toasts: Toasts,
    last_query: String,

    // Data
    data_service: DataService,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(
        data_service: DataService,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        progress: Arc<ProgressTracker>,
        api_url: &str,
        items_per_page: usize,
        tick_rate_ms: u64,
    ) -> Self {
        Self {
            view_stack: Vec::new(),
            current_view: View::Dashboard,
            dashboard: Dashboard::new(),
            blocks: BlocksPage::new(items_per_page),
            block_detail: BlockDetailPage::new(),
            parcel_detail: ParcelDetailPage::new(),
            tx_detail: TxDetailPage::new(),
            platform_address: PlatformAddressPage::new(),
            asset_address: AssetAddressPage::new(items_per_page, Arc::clone(&progress)),
            asset_type: AssetTypePage::new(),
            transactions: TransactionsPage::new(items_per_page),
            pending_parcels: PendingParcelsPage::new(items_per_page),
            status: StatusPage::new(),
            header: Header::new(api_url),
            status_bar: StatusBar::new(progress),
            search_bar: SearchBar::new(),
            help: HelpOverlay::new(),
            toasts: Toasts::new(),
            last_query: String::new(),
            data_service,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Start with a search, as if it had been typed into the search bar.
    pub fn search(&mut self, query: String) {
        self.last_query = query.clone();
        self.data_service.search(query);
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        self.mount_current();

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        self.unmount_current();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        match &self.current_view {
            View::Dashboard => self.dashboard.render(frame, chunks[1]),
            View::Blocks => self.blocks.render(frame, chunks[1]),
            View::BlockDetail(_) => self.block_detail.render(frame, chunks[1]),
            View::ParcelDetail(_) => self.parcel_detail.render(frame, chunks[1]),
            View::TransactionDetail(_) => self.tx_detail.render(frame, chunks[1]),
            View::PlatformAddress(_) => self.platform_address.render(frame, chunks[1]),
            View::AssetAddress(_) => self.asset_address.render(frame, chunks[1]),
            View::AssetType(_) => self.asset_type.render(frame, chunks[1]),
            View::Transactions => self.transactions.render(frame, chunks[1]),
            View::PendingParcels => self.pending_parcels.render(frame, chunks[1]),
            View::Status => self.status.render(frame, chunks[1]),
        }

        self.status_bar.toast_count = self.toasts.len();
        self.status_bar.render(frame, chunks[2]);

        // Overlays
        self.toasts.render(frame, chunks[1]);
        self.search_bar.render(frame, area);
        self.help.render(frame, area);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Press only; release/repeat arrive on some platforms
            if key.kind != KeyEventKind::Press {
                return;
            }

            if self.help.handle_key(key) {
                return;
            }

            if self.search_bar.active {
                if let Some(query) = self.search_bar.handle_key(key) {
                    if !query.is_empty() {
                        self.search(query);
                    }
                }
                return;
            }

            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('/') => {
                    self.search_bar.activate();
                    return;
                }
                KeyCode::Char('?') => {
                    self.help.toggle();
                    return;
                }
                KeyCode::Char('x') => {
                    self.toasts.dismiss();
                    return;
                }
                KeyCode::Char('1') => {
                    self.navigate_to(View::Dashboard);
                    return;
                }
                KeyCode::Char('2') => {
                    self.navigate_to(View::Blocks);
                    return;
                }
                KeyCode::Char('3') => {
                    self.navigate_to(View::Transactions);
                    return;
                }
                KeyCode::Char('4') => {
                    self.navigate_to(View::PendingParcels);
                    return;
                }
                KeyCode::Char('5') => {
                    self.navigate_to(View::Status);
                    return;
                }
                KeyCode::Esc | KeyCode::Backspace => {
                    self.go_back();
                    return;
                }
                _ => {}
            }

            let app_event = match &self.current_view {
                View::Dashboard => self.dashboard.handle_key(key),
                View::Blocks => self.blocks.handle_key(key),
                View::BlockDetail(_) => self.block_detail.handle_key(key),
                View::ParcelDetail(_) => self.parcel_detail.handle_key(key),
                View::TransactionDetail(_) => self.tx_detail.handle_key(key),
                View::PlatformAddress(_) => self.platform_address.handle_key(key),
                View::AssetAddress(_) => self.asset_address.handle_key(key),
                View::AssetType(_) => self.asset_type.handle_key(key),
                View::Transactions => self.transactions.handle_key(key),
                View::PendingParcels => self.pending_parcels.handle_key(key),
                View::Status => self.status.handle_key(key),
            };

            if let Some(event) = app_event {
                self.handle_app_event(event);
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        let service = &self.data_service;
        let follow_up = match event {
            AppEvent::LatestBlockNumber(ticket, outcome) => {
                let follow_up = self.dashboard.on_best_number(&ticket, outcome);
                if let Some(number) = self.dashboard.best_number() {
                    self.header.latest_block = Some(number);
                }
                follow_up
            }
            AppEvent::LatestBlocks(ticket, outcome) => self.dashboard.on_blocks(&ticket, outcome),
            AppEvent::LatestParcels(ticket, outcome) => self.dashboard.on_parcels(&ticket, outcome),
            AppEvent::BlockPage(ticket, outcome) => self.blocks.on_page(&ticket, outcome),
            AppEvent::BlockCount(ticket, outcome) => self.blocks.on_count(&ticket, outcome),
            AppEvent::TransactionPage(ticket, outcome) => {
                self.transactions.on_page(&ticket, outcome)
            }
            AppEvent::TransactionCount(ticket, outcome) => {
                self.transactions.on_count(&ticket, outcome)
            }
            AppEvent::PendingParcelPage(ticket, outcome) => {
                self.pending_parcels.on_page(&ticket, outcome)
            }
            AppEvent::PendingParcelCount(ticket, outcome) => {
                self.pending_parcels.on_count(&ticket, outcome)
            }
            AppEvent::Block(ticket, outcome) => self.block_detail.on_block(&ticket, outcome),
            AppEvent::Parcel(ticket, outcome) => {
                self.parcel_detail.on_confirmed(&ticket, outcome, service)
            }
            AppEvent::PendingParcel(ticket, outcome) => {
                self.parcel_detail.on_pending(&ticket, outcome)
            }
            AppEvent::Transaction(ticket, outcome) => {
                self.tx_detail.on_transaction(&ticket, outcome)
            }
            AppEvent::PlatformAccount(ticket, outcome) => {
                self.platform_address.on_account(&ticket, outcome)
            }
            AppEvent::AuthoredBlocks(ticket, outcome) => {
                self.platform_address.on_blocks(&ticket, outcome)
            }
            AppEvent::AssetUtxo(ticket, outcome) => self.asset_address.on_utxo(&ticket, outcome),
            AppEvent::AssetTransactions(ticket, outcome) => {
                self.asset_address.on_transactions(&ticket, outcome)
            }
            AppEvent::AssetScheme(ticket, outcome) => self.asset_type.on_scheme(&ticket, outcome),
            AppEvent::AssetHolders(ticket, outcome) => {
                self.asset_type.on_holders(&ticket, outcome)
            }
            AppEvent::SyncStatus(ticket, outcome) => self.status.on_sync(&ticket, outcome),
            AppEvent::NodeStatus(ticket, outcome) => self.status.on_node(&ticket, outcome),
            AppEvent::LoadMore(target) => {
                debug!(?target, "load more");
                match target {
                    LoadMoreTarget::Blocks => self.blocks.load_more(service),
                    LoadMoreTarget::Transactions => self.transactions.load_more(service),
                    LoadMoreTarget::PendingParcels => self.pending_parcels.load_more(service),
                    LoadMoreTarget::AssetTransactions => self.asset_address.load_more(service),
                }
                None
            }
            AppEvent::SearchNotFound(message) => {
                info!(query = %self.last_query, "search found nothing");
                self.toasts.push(ToastLevel::Warning, message.clone());
                self.search_bar
                    .show_error(std::mem::take(&mut self.last_query), message);
                None
            }
            AppEvent::Navigate(view) => {
                self.navigate_to(view);
                None
            }
            AppEvent::Error(message) => {
                self.toasts.push(ToastLevel::Error, message);
                None
            }
        };

        if let Some(event) = follow_up {
            self.handle_app_event(event);
        }
    }

    fn navigate_to(&mut self, view: View) {
        info!(?view, "navigate");
        self.unmount_current();
        let old_view = std::mem::replace(&mut self.current_view, view);
        self.view_stack.push(old_view);
        self.mount_current();
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_stack.pop() {
            self.unmount_current();
            self.current_view = prev_view;
            self.mount_current();
        }
    }

    fn mount_current(&mut self) {
        let service = &self.data_service;
        self.header.current_tab = match &self.current_view {
            View::Dashboard => 0,
            View::Blocks | View::BlockDetail(_) => 1,
            View::Transactions | View::TransactionDetail(_) => 2,
            View::PendingParcels => 3,
            View::Status => 4,
            _ => self.header.current_tab,
        };

        match &self.current_view {
            View::Dashboard => self.dashboard.mount(service),
            View::Blocks => self.blocks.mount(service),
            View::BlockDetail(id) => self.block_detail.mount(id.clone(), service),
            View::ParcelDetail(hash) => self.parcel_detail.mount(hash.clone(), service),
            View::TransactionDetail(hash) => self.tx_detail.mount(hash.clone(), service),
            View::PlatformAddress(address) => {
                self.platform_address.mount(address.clone(), service)
            }
            View::AssetAddress(address) => self.asset_address.mount(address.clone(), service),
            View::AssetType(asset_type) => self.asset_type.mount(asset_type.clone(), service),
            View::Transactions => self.transactions.mount(service),
            View::PendingParcels => self.pending_parcels.mount(service),
            View::Status => self.status.mount(service),
        }
    }

    fn unmount_current(&mut self) {
        match &self.current_view {
            View::Dashboard => self.dashboard.unmount(),
            View::Blocks => self.blocks.unmount(),
            View::BlockDetail(_) => self.block_detail.unmount(),
            View::ParcelDetail(_) => self.parcel_detail.unmount(),
            View::TransactionDetail(_) => self.tx_detail.unmount(),
            View::PlatformAddress(_) => self.platform_address.unmount(),
            View::AssetAddress(_) => self.asset_address.unmount(),
            View::AssetType(_) => self.asset_type.unmount(),
            View::Transactions => self.transactions.unmount(),
            View::PendingParcels => self.pending_parcels.unmount(),
            View::Status => self.status.unmount(),
        }
    }
}
