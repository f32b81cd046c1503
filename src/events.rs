use std::fmt;

use crate::data::request::{FetchOutcome, Ticket};
use crate::data::types::{
    AggsUtxoDoc, AssetSchemeDoc, BlockDoc, NodeStatusDoc, ParcelDoc, PendingParcelDoc,
    PlatformAccountDoc, SyncStatusDoc, TransactionDoc,
};

/// A block is addressed either by height or by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    Hash(String),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Number(n) => write!(f, "#{n}"),
            BlockId::Hash(h) => write!(f, "{h}"),
        }
    }
}

/// Views the user can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Blocks,
    BlockDetail(BlockId),
    ParcelDetail(String),
    TransactionDetail(String),
    PlatformAddress(String),
    AssetAddress(String),
    AssetType(String),
    Transactions,
    PendingParcels,
    Status,
}

/// Target identified from a search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    BlockNumber(u64),
    /// 32-byte hash; could name a block, a parcel or a transaction.
    Hash(String),
    PlatformAddress(String),
    AssetAddress(String),
}

impl SearchTarget {
    pub fn parse(input: &str) -> Option<SearchTarget> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(num) = input.parse::<u64>() {
            return Some(SearchTarget::BlockNumber(num));
        }

        let hex = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(SearchTarget::Hash(hex.to_lowercase()));
        }

        let is_word = input.chars().all(|c| c.is_ascii_alphanumeric());
        if is_word && input.len() > 3 {
            if input.starts_with("ccc") || input.starts_with("tcc") {
                return Some(SearchTarget::PlatformAddress(input.to_string()));
            }
            if input.starts_with("cca") || input.starts_with("tca") {
                return Some(SearchTarget::AssetAddress(input.to_string()));
            }
        }

        None
    }
}

/// Which parent action a delegated list's "load more" asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreTarget {
    Blocks,
    Transactions,
    PendingParcels,
    AssetTransactions,
}

/// Events sent from background data tasks to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    // Dashboard
    LatestBlockNumber(Ticket, FetchOutcome<u64>),
    LatestBlocks(Ticket, FetchOutcome<Vec<BlockDoc>>),
    LatestParcels(Ticket, FetchOutcome<Vec<ParcelDoc>>),

    // Blocks
    BlockPage(Ticket, FetchOutcome<Vec<BlockDoc>>),
    BlockCount(Ticket, FetchOutcome<u64>),

    // Transactions and the pending pool
    TransactionPage(Ticket, FetchOutcome<Vec<TransactionDoc>>),
    TransactionCount(Ticket, FetchOutcome<u64>),
    PendingParcelPage(Ticket, FetchOutcome<Vec<PendingParcelDoc>>),
    PendingParcelCount(Ticket, FetchOutcome<u64>),

    // Detail pages
    Block(Ticket, FetchOutcome<BlockDoc>),
    Parcel(Ticket, FetchOutcome<ParcelDoc>),
    PendingParcel(Ticket, FetchOutcome<PendingParcelDoc>),
    Transaction(Ticket, FetchOutcome<TransactionDoc>),

    // Addresses
    PlatformAccount(Ticket, FetchOutcome<PlatformAccountDoc>),
    AuthoredBlocks(Ticket, FetchOutcome<Vec<BlockDoc>>),
    AssetUtxo(Ticket, FetchOutcome<Vec<AggsUtxoDoc>>),
    AssetTransactions(Ticket, FetchOutcome<Vec<TransactionDoc>>),

    // Asset types
    AssetScheme(Ticket, FetchOutcome<AssetSchemeDoc>),
    AssetHolders(Ticket, FetchOutcome<Vec<AggsUtxoDoc>>),

    // Indexer status
    SyncStatus(Ticket, FetchOutcome<SyncStatusDoc>),
    NodeStatus(Ticket, FetchOutcome<NodeStatusDoc>),

    // Pagination
    LoadMore(LoadMoreTarget),

    // Search
    SearchNotFound(String),

    // Navigation
    Navigate(View),

    // Status
    Error(String),
}
