//! Typed request and response records of the lite protocol.
//!
//! Field layouts follow the protocol's TL schema. Binary encoding belongs to
//! the transport; these records only fix the shape and the JSON form, in which
//! shard masks travel as signed 64-bit decimal strings.

use serde::{Serialize, Deserialize};

use crate::block::{BlockId, BlockRef, Hash256, ShardId};

/// `liteServer.lookupBlock` mode bit: look up by seqno
pub const LOOKUP_BY_SEQNO: u32 = 1;

/// Protocol methods this client issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteMethod {
    GetMasterchainInfo,
    GetTime,
    GetVersion,
    LookupBlock,
    GetBlockHeader,
    GetAllShardsInfo,
    GetAccountState,
    GetOneTransaction,
    GetTransactions,
    ListBlockTransactions,
}

impl LiteMethod {
    /// TL constructor id of the query
    pub fn constructor_id(&self) -> u32 {
        match self {
            LiteMethod::GetMasterchainInfo => 0x89b5e62e,
            LiteMethod::GetTime => 0x16ad5a34,
            LiteMethod::GetVersion => 0x232b940b,
            LiteMethod::LookupBlock => 0xfac8f71e,
            LiteMethod::GetBlockHeader => 0x21ec069e,
            LiteMethod::GetAllShardsInfo => 0x74d3fd6b,
            LiteMethod::GetAccountState => 0x6b890e25,
            LiteMethod::GetOneTransaction => 0xd40f24ea,
            LiteMethod::GetTransactions => 0x1c40e7a1,
            LiteMethod::ListBlockTransactions => 0xadfcc7da,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiteMethod::GetMasterchainInfo => "getMasterchainInfo",
            LiteMethod::GetTime => "getTime",
            LiteMethod::GetVersion => "getVersion",
            LiteMethod::LookupBlock => "lookupBlock",
            LiteMethod::GetBlockHeader => "getBlockHeader",
            LiteMethod::GetAllShardsInfo => "getAllShardsInfo",
            LiteMethod::GetAccountState => "getAccountState",
            LiteMethod::GetOneTransaction => "getOneTransaction",
            LiteMethod::GetTransactions => "getTransactions",
            LiteMethod::ListBlockTransactions => "listBlockTransactions",
        }
    }
}

/// Signed decimal string form of a shard mask
pub mod shard_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(shard: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&(*shard as i64).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<i64>()
            .map(|signed| signed as u64)
            .map_err(serde::de::Error::custom)
    }
}

/// Optional 256-bit hash as a hex string, `null` when absent
pub mod hash_option {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::block::Hash256;

    pub fn serialize<S: Serializer>(hash: &Option<Hash256>, serializer: S) -> Result<S::Ok, S::Error> {
        match hash {
            Some(hash) => serializer.serialize_some(&hex::encode(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Hash256>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let mut hash = [0u8; 32];
        hex::decode_to_slice(&raw, &mut hash).map_err(serde::de::Error::custom)?;
        Ok(Some(hash))
    }
}

/// `tonNode.blockId`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockIdRaw {
    pub workchain: i32,
    #[serde(with = "shard_string")]
    pub shard: u64,
    pub seqno: u32,
}

impl From<BlockRef> for BlockIdRaw {
    fn from(block: BlockRef) -> Self {
        Self {
            workchain: block.shard.workchain,
            shard: block.shard.shard,
            seqno: block.seqno,
        }
    }
}

impl From<BlockIdRaw> for BlockRef {
    fn from(raw: BlockIdRaw) -> Self {
        BlockRef::new(ShardId::new(raw.workchain, raw.shard), raw.seqno)
    }
}

/// `tonNode.blockIdExt`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockIdExtRaw {
    pub workchain: i32,
    #[serde(with = "shard_string")]
    pub shard: u64,
    pub seqno: u32,
    #[serde(with = "hex")]
    pub root_hash: Hash256,
    #[serde(with = "hex")]
    pub file_hash: Hash256,
}

impl From<BlockId> for BlockIdExtRaw {
    fn from(id: BlockId) -> Self {
        Self {
            workchain: id.shard.workchain,
            shard: id.shard.shard,
            seqno: id.seqno,
            root_hash: id.root_hash,
            file_hash: id.file_hash,
        }
    }
}

impl From<BlockIdExtRaw> for BlockId {
    fn from(raw: BlockIdExtRaw) -> Self {
        BlockId {
            shard: ShardId::new(raw.workchain, raw.shard),
            seqno: raw.seqno,
            root_hash: raw.root_hash,
            file_hash: raw.file_hash,
        }
    }
}

/// `liteServer.accountId`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountIdRaw {
    pub workchain: i32,
    #[serde(with = "hex")]
    pub id: Hash256,
}

/// `liteServer.transactionId3`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionId3Raw {
    #[serde(with = "hex")]
    pub account: Hash256,
    pub lt: u64,
}

/// `liteServer.transactionId`; fields are present according to the request mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionIdRaw {
    pub mode: u32,
    #[serde(default, with = "hash_option")]
    pub account: Option<Hash256>,
    pub lt: Option<u64>,
    #[serde(default, with = "hash_option")]
    pub hash: Option<Hash256>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupBlockRequest {
    pub mode: u32,
    pub id: BlockIdRaw,
    pub lt: Option<u64>,
    pub utime: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetBlockHeaderRequest {
    pub id: BlockIdExtRaw,
    pub mode: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetAllShardsInfoRequest {
    pub id: BlockIdExtRaw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetAccountStateRequest {
    pub id: BlockIdExtRaw,
    pub account: AccountIdRaw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetOneTransactionRequest {
    pub id: BlockIdExtRaw,
    pub account: AccountIdRaw,
    pub lt: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetTransactionsRequest {
    pub count: u32,
    pub account: AccountIdRaw,
    pub lt: u64,
    #[serde(with = "hex")]
    pub hash: Hash256,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListBlockTransactionsRequest {
    pub id: BlockIdExtRaw,
    pub mode: u32,
    pub count: u32,
    pub after: Option<TransactionId3Raw>,
    pub reverse_order: Option<bool>,
    pub want_proof: Option<bool>,
}

/// Query payloads, one variant per remote procedure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "@type", rename_all = "camelCase")]
pub enum LiteRequest {
    GetMasterchainInfo,
    GetTime,
    GetVersion,
    LookupBlock(LookupBlockRequest),
    GetBlockHeader(GetBlockHeaderRequest),
    GetAllShardsInfo(GetAllShardsInfoRequest),
    GetAccountState(GetAccountStateRequest),
    GetOneTransaction(GetOneTransactionRequest),
    GetTransactions(GetTransactionsRequest),
    ListBlockTransactions(ListBlockTransactionsRequest),
}

impl LiteRequest {
    pub fn method(&self) -> LiteMethod {
        match self {
            LiteRequest::GetMasterchainInfo => LiteMethod::GetMasterchainInfo,
            LiteRequest::GetTime => LiteMethod::GetTime,
            LiteRequest::GetVersion => LiteMethod::GetVersion,
            LiteRequest::LookupBlock(_) => LiteMethod::LookupBlock,
            LiteRequest::GetBlockHeader(_) => LiteMethod::GetBlockHeader,
            LiteRequest::GetAllShardsInfo(_) => LiteMethod::GetAllShardsInfo,
            LiteRequest::GetAccountState(_) => LiteMethod::GetAccountState,
            LiteRequest::GetOneTransaction(_) => LiteMethod::GetOneTransaction,
            LiteRequest::GetTransactions(_) => LiteMethod::GetTransactions,
            LiteRequest::ListBlockTransactions(_) => LiteMethod::ListBlockTransactions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZeroStateIdRaw {
    pub workchain: i32,
    #[serde(with = "hex")]
    pub root_hash: Hash256,
    #[serde(with = "hex")]
    pub file_hash: Hash256,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterchainInfoResponse {
    pub last: BlockIdExtRaw,
    #[serde(with = "hex")]
    pub state_root_hash: Hash256,
    pub init: ZeroStateIdRaw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentTimeResponse {
    pub now: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionResponse {
    pub mode: u32,
    pub version: i32,
    pub capabilities: u64,
    pub now: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeaderResponse {
    pub id: BlockIdExtRaw,
    pub mode: u32,
    pub header_proof: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllShardsInfoResponse {
    pub id: BlockIdExtRaw,
    pub proof: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountStateResponse {
    pub id: BlockIdExtRaw,
    pub shardblk: BlockIdExtRaw,
    pub shard_proof: Vec<u8>,
    pub proof: Vec<u8>,
    pub state: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionInfoResponse {
    pub id: BlockIdExtRaw,
    pub proof: Vec<u8>,
    pub transaction: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionListResponse {
    pub ids: Vec<BlockIdExtRaw>,
    pub transactions: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockTransactionsResponse {
    pub id: BlockIdExtRaw,
    pub req_count: u32,
    pub incomplete: bool,
    pub ids: Vec<TransactionIdRaw>,
    pub proof: Vec<u8>,
}

/// Remote error envelope, `liteServer.error`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiteServerError {
    pub code: i32,
    pub message: String,
}

/// Decoded responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "@type", rename_all = "camelCase")]
pub enum LiteResponse {
    MasterchainInfo(MasterchainInfoResponse),
    CurrentTime(CurrentTimeResponse),
    Version(VersionResponse),
    BlockHeader(BlockHeaderResponse),
    AllShardsInfo(AllShardsInfoResponse),
    AccountState(AccountStateResponse),
    TransactionInfo(TransactionInfoResponse),
    TransactionList(TransactionListResponse),
    BlockTransactions(BlockTransactionsResponse),
    Error(LiteServerError),
}

impl LiteResponse {
    /// Name of the response constructor, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            LiteResponse::MasterchainInfo(_) => "masterchainInfo",
            LiteResponse::CurrentTime(_) => "currentTime",
            LiteResponse::Version(_) => "version",
            LiteResponse::BlockHeader(_) => "blockHeader",
            LiteResponse::AllShardsInfo(_) => "allShardsInfo",
            LiteResponse::AccountState(_) => "accountState",
            LiteResponse::TransactionInfo(_) => "transactionInfo",
            LiteResponse::TransactionList(_) => "transactionList",
            LiteResponse::BlockTransactions(_) => "blockTransactions",
            LiteResponse::Error(_) => "error",
        }
    }
}
