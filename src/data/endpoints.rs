use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::data::progress::Progress;
use crate::data::types::*;
use crate::events::BlockId;

/// Confirmed blocks and parcels never change once indexed.
const CONFIRMED_TTL: Duration = Duration::from_secs(3600);

/// One indexer resource: how to address it and how to turn its body into a document.
pub trait Endpoint: Send + Sync + 'static {
    /// Wire shape of the response body.
    type Response: DeserializeOwned + Send;
    /// What the requesting view receives.
    type Output: Send + 'static;

    /// Path relative to the API root, query string included.
    fn path(&self) -> String;

    /// Map the decoded body to the delivered document. `None` means the entity does not exist.
    fn decode(&self, response: Self::Response) -> Option<Self::Output>;

    fn progress(&self) -> Progress {
        Progress::Global
    }

    /// How long a non-null response may be served from the cache.
    fn cache_ttl(&self) -> Option<Duration> {
        None
    }
}

/// Strip an optional `0x` prefix and lowercase a hash for use in request paths.
pub fn normalize_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_lowercase()
}

pub struct LatestBlockNumber;

impl Endpoint for LatestBlockNumber {
    type Response = Option<u64>;
    type Output = u64;

    fn path(&self) -> String {
        "blockNumber".to_string()
    }

    fn decode(&self, response: Option<u64>) -> Option<u64> {
        response
    }

    fn progress(&self) -> Progress {
        Progress::Hidden
    }
}

pub struct Block(pub BlockId);

impl Endpoint for Block {
    type Response = Option<BlockDoc>;
    type Output = BlockDoc;

    fn path(&self) -> String {
        match &self.0 {
            BlockId::Number(n) => format!("block/{n}"),
            BlockId::Hash(h) => format!("block/{}", normalize_hash(h)),
        }
    }

    fn decode(&self, response: Option<BlockDoc>) -> Option<BlockDoc> {
        response
    }

    fn cache_ttl(&self) -> Option<Duration> {
        Some(CONFIRMED_TTL)
    }
}

/// One server-side page of the global block list.
pub struct BlockPage {
    pub page: usize,
    pub items_per_page: usize,
}

impl Endpoint for BlockPage {
    type Response = Option<Vec<BlockDoc>>;
    type Output = Vec<BlockDoc>;

    fn path(&self) -> String {
        format!(
            "blocks?page={}&itemsPerPage={}",
            self.page, self.items_per_page
        )
    }

    fn decode(&self, response: Option<Vec<BlockDoc>>) -> Option<Vec<BlockDoc>> {
        Some(response.unwrap_or_default())
    }
}

pub struct BlockCount;

impl Endpoint for BlockCount {
    type Response = Option<u64>;
    type Output = u64;

    fn path(&self) -> String {
        "blocks/totalCount".to_string()
    }

    fn decode(&self, response: Option<u64>) -> Option<u64> {
        response
    }

    fn progress(&self) -> Progress {
        Progress::Hidden
    }
}

pub struct LatestParcels {
    pub count: usize,
}

impl Endpoint for LatestParcels {
    type Response = Option<Vec<ParcelDoc>>;
    type Output = Vec<ParcelDoc>;

    fn path(&self) -> String {
        format!("parcels?page=1&itemsPerPage={}", self.count)
    }

    fn decode(&self, response: Option<Vec<ParcelDoc>>) -> Option<Vec<ParcelDoc>> {
        Some(response.unwrap_or_default())
    }
}

pub struct Parcel {
    pub hash: String,
}

impl Endpoint for Parcel {
    type Response = Option<ParcelDoc>;
    type Output = ParcelDoc;

    fn path(&self) -> String {
        format!("parcel/{}", normalize_hash(&self.hash))
    }

    fn decode(&self, response: Option<ParcelDoc>) -> Option<ParcelDoc> {
        response
    }

    fn cache_ttl(&self) -> Option<Duration> {
        Some(CONFIRMED_TTL)
    }
}

pub struct PendingParcel {
    pub hash: String,
}

impl Endpoint for PendingParcel {
    type Response = Option<PendingParcelDoc>;
    type Output = PendingParcelDoc;

    fn path(&self) -> String {
        format!("parcel/pending/{}", normalize_hash(&self.hash))
    }

    fn decode(&self, response: Option<PendingParcelDoc>) -> Option<PendingParcelDoc> {
        response
    }
}

pub struct Transaction {
    pub hash: String,
}

impl Endpoint for Transaction {
    type Response = Option<TransactionDoc>;
    type Output = TransactionDoc;

    fn path(&self) -> String {
        format!("tx/{}", normalize_hash(&self.hash))
    }

    fn decode(&self, response: Option<TransactionDoc>) -> Option<TransactionDoc> {
        response
    }
}

/// Asset transactions touching an address, one server-side page at a time.
pub struct AssetAddressTransactions {
    pub address: String,
    pub page: usize,
    pub items_per_page: usize,
}

pub const ASSET_TXS_PROGRESS: &str = "asset-address-transactions";

impl Endpoint for AssetAddressTransactions {
    type Response = Option<Vec<TransactionDoc>>;
    type Output = Vec<TransactionDoc>;

    fn path(&self) -> String {
        format!(
            "addr-asset-txs/{}?page={}&itemsPerPage={}",
            self.address, self.page, self.items_per_page
        )
    }

    fn decode(&self, response: Option<Vec<TransactionDoc>>) -> Option<Vec<TransactionDoc>> {
        Some(response.unwrap_or_default())
    }

    fn progress(&self) -> Progress {
        Progress::Target(ASSET_TXS_PROGRESS)
    }
}

pub struct AssetAddressUtxo {
    pub address: String,
}

impl Endpoint for AssetAddressUtxo {
    type Response = Option<AggsUtxoResponse>;
    type Output = Vec<AggsUtxoDoc>;

    fn path(&self) -> String {
        format!("aggs-utxo?address={}", self.address)
    }

    fn decode(&self, response: Option<AggsUtxoResponse>) -> Option<Vec<AggsUtxoDoc>> {
        response.map(|r| r.data)
    }
}

/// Registration details of an asset type.
pub struct AssetScheme {
    pub asset_type: String,
}

impl Endpoint for AssetScheme {
    type Response = Option<AssetSchemeDoc>;
    type Output = AssetSchemeDoc;

    fn path(&self) -> String {
        format!("asset/{}", normalize_hash(&self.asset_type))
    }

    fn decode(&self, response: Option<AssetSchemeDoc>) -> Option<AssetSchemeDoc> {
        response
    }
}

/// Unspent outputs of one asset type, aggregated per holding address.
pub struct AssetTypeUtxo {
    pub asset_type: String,
}

impl Endpoint for AssetTypeUtxo {
    type Response = Option<AggsUtxoResponse>;
    type Output = Vec<AggsUtxoDoc>;

    fn path(&self) -> String {
        format!("aggs-utxo?assetType={}", normalize_hash(&self.asset_type))
    }

    fn decode(&self, response: Option<AggsUtxoResponse>) -> Option<Vec<AggsUtxoDoc>> {
        Some(response.map(|r| r.data).unwrap_or_default())
    }
}

/// One server-side page of all asset transactions, newest first.
pub struct TransactionPage {
    pub page: usize,
    pub items_per_page: usize,
}

impl Endpoint for TransactionPage {
    type Response = Option<Vec<TransactionDoc>>;
    type Output = Vec<TransactionDoc>;

    fn path(&self) -> String {
        format!("txs?page={}&itemsPerPage={}", self.page, self.items_per_page)
    }

    fn decode(&self, response: Option<Vec<TransactionDoc>>) -> Option<Vec<TransactionDoc>> {
        Some(response.unwrap_or_default())
    }
}

pub struct TransactionCount;

impl Endpoint for TransactionCount {
    type Response = Option<u64>;
    type Output = u64;

    fn path(&self) -> String {
        "txs/totalCount".to_string()
    }

    fn decode(&self, response: Option<u64>) -> Option<u64> {
        response
    }

    fn progress(&self) -> Progress {
        Progress::Hidden
    }
}

/// One server-side page of the pending parcel pool.
pub struct PendingParcelPage {
    pub page: usize,
    pub items_per_page: usize,
}

impl Endpoint for PendingParcelPage {
    type Response = Option<Vec<PendingParcelDoc>>;
    type Output = Vec<PendingParcelDoc>;

    fn path(&self) -> String {
        format!(
            "parcels/pending?page={}&itemsPerPage={}",
            self.page, self.items_per_page
        )
    }

    fn decode(&self, response: Option<Vec<PendingParcelDoc>>) -> Option<Vec<PendingParcelDoc>> {
        Some(response.unwrap_or_default())
    }
}

pub struct PendingParcelCount;

impl Endpoint for PendingParcelCount {
    type Response = Option<u64>;
    type Output = u64;

    fn path(&self) -> String {
        "parcels/pending/totalCount".to_string()
    }

    fn decode(&self, response: Option<u64>) -> Option<u64> {
        response
    }

    fn progress(&self) -> Progress {
        Progress::Hidden
    }
}

pub struct SyncStatus;

impl Endpoint for SyncStatus {
    type Response = Option<SyncStatusDoc>;
    type Output = SyncStatusDoc;

    fn path(&self) -> String {
        "status/sync".to_string()
    }

    fn decode(&self, response: Option<SyncStatusDoc>) -> Option<SyncStatusDoc> {
        response
    }
}

pub struct NodeStatus;

impl Endpoint for NodeStatus {
    type Response = Option<NodeStatusDoc>;
    type Output = NodeStatusDoc;

    fn path(&self) -> String {
        "status/codechain".to_string()
    }

    fn decode(&self, response: Option<NodeStatusDoc>) -> Option<NodeStatusDoc> {
        response
    }
}

pub struct PlatformAccount {
    pub address: String,
}

impl Endpoint for PlatformAccount {
    type Response = Option<PlatformAccountDoc>;
    type Output = PlatformAccountDoc;

    fn path(&self) -> String {
        format!("addr-platform-account/{}", self.address)
    }

    fn decode(&self, response: Option<PlatformAccountDoc>) -> Option<PlatformAccountDoc> {
        response
    }
}

/// Every block authored by a platform address.
pub struct AuthoredBlocks {
    pub address: String,
}

impl Endpoint for AuthoredBlocks {
    type Response = Option<Vec<BlockDoc>>;
    type Output = Vec<BlockDoc>;

    fn path(&self) -> String {
        format!("addr-platform-blocks/{}", self.address)
    }

    fn decode(&self, response: Option<Vec<BlockDoc>>) -> Option<Vec<BlockDoc>> {
        Some(response.unwrap_or_default())
    }
}
