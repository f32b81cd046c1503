use serde::{Deserialize, Deserializer};

/// A token quantity. The indexer sends large values as decimal strings and
/// small ones as JSON numbers; both are kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount(pub String);

impl Default for Amount {
    fn default() -> Self {
        Amount("0".to_string())
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Amount(s)),
            serde_json::Value::Number(n) => Ok(Amount(n.to_string())),
            serde_json::Value::Null => Ok(Amount::default()),
            other => Err(serde::de::Error::custom(format!(
                "expected amount, found {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDoc {
    pub hash: String,
    pub number: u64,
    pub timestamp: u64,
    pub author: String,
    #[serde(default)]
    pub parent_hash: String,
    #[serde(default)]
    pub parcels_root: String,
    #[serde(default)]
    pub state_root: String,
    #[serde(default)]
    pub invoices_root: String,
    #[serde(default)]
    pub score: Amount,
    #[serde(default)]
    pub parcels: Vec<ParcelDoc>,
    #[serde(default)]
    pub is_retracted: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelDoc {
    pub hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub parcel_index: Option<u64>,
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub fee: Amount,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub signer: String,
    #[serde(default)]
    pub sig: String,
    pub action: ActionDoc,
    #[serde(default)]
    pub timestamp: u64,
}

impl ParcelDoc {
    /// Transactions embedded in a ChangeShardState parcel; empty for other actions.
    pub fn transactions(&self) -> &[TransactionDoc] {
        match &self.action {
            ActionDoc::ChangeShardState { transactions } => transactions.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionDoc {
    ChangeShardState {
        #[serde(default)]
        transactions: Vec<TransactionDoc>,
    },
    Payment {
        receiver: String,
        amount: Amount,
    },
    SetRegularKey {
        key: String,
    },
    #[serde(other)]
    Unknown,
}

impl ActionDoc {
    pub fn name(&self) -> &'static str {
        match self {
            ActionDoc::ChangeShardState { .. } => "ChangeShardState",
            ActionDoc::Payment { .. } => "Payment",
            ActionDoc::SetRegularKey { .. } => "SetRegularKey",
            ActionDoc::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingParcelDoc {
    pub parcel: ParcelDoc,
    pub status: String,
    #[serde(default)]
    pub timestamp: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionDoc {
    /// `assetMint` or `assetTransfer`.
    #[serde(rename = "type")]
    pub kind: String,
    pub data: TransactionData,
}

impl TransactionDoc {
    pub fn kind_label(&self) -> &str {
        match self.kind.as_str() {
            "assetMint" => "AssetMint",
            "assetTransfer" => "AssetTransfer",
            other => other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub parcel_hash: Option<String>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub inputs: Vec<AssetInputDoc>,
    #[serde(default)]
    pub outputs: Vec<AssetOutputDoc>,
    /// Present on mints.
    #[serde(default)]
    pub output: Option<AssetOutputDoc>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInputDoc {
    pub prev_out: AssetOutputDoc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetOutputDoc {
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggsUtxoDoc {
    pub asset_type: String,
    /// Set when aggregating by asset type, one row per holder.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub total_asset_quantity: Amount,
    #[serde(default)]
    pub utxo_quantity: u64,
    #[serde(default)]
    pub asset_scheme: Option<AssetSchemeDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSchemeDoc {
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub registrar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggsUtxoResponse {
    pub data: Vec<AggsUtxoDoc>,
}

/// How far the indexer has caught up with its node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusDoc {
    pub codechain_best_block_number: u64,
    #[serde(default)]
    pub codechain_best_block_hash: String,
    pub indexed_block_number: u64,
    #[serde(default)]
    pub indexed_block_hash: String,
}

impl SyncStatusDoc {
    /// Blocks the node has that the indexer has not stored yet.
    pub fn lag(&self) -> u64 {
        self.codechain_best_block_number
            .saturating_sub(self.indexed_block_number)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatusDoc {
    #[serde(default)]
    pub node_version: String,
    #[serde(default)]
    pub commit_hash: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub peer_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformAccountDoc {
    pub balance: Amount,
    #[serde(default)]
    pub seq: u64,
}
