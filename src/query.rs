/*!
# Query Layer

Maps each domain operation onto exactly one transport call and shapes the
response. Every call:

- carries an explicit budget (per-call override or the client default) enforced
  with `tokio::time::timeout`
- checks the response variant; anything unexpected is `MalformedResponse`
- checks that block identities echoed by the remote match the request; a
  mismatch is `ProofMismatch`
- maps remote error envelopes to `NotFound` or `Transport`
*/

use std::sync::Arc;
use std::time::Duration;
use metrics::{counter, histogram};
use serde::{Serialize, Deserialize};
use tokio::time::Instant;
use tracing::debug;

use crate::account::AccountAddress;
use crate::block::{BlockHeader, BlockId, BlockRef, Hash256, ShardsSnapshot};
use crate::cells::CellParser;
use crate::network::schema::{
    AccountIdRaw, GetAccountStateRequest, GetAllShardsInfoRequest, GetBlockHeaderRequest,
    GetOneTransactionRequest, GetTransactionsRequest, ListBlockTransactionsRequest, LiteMethod,
    LiteRequest, LiteResponse, LiteServerError, LookupBlockRequest, TransactionId3Raw,
    LOOKUP_BY_SEQNO,
};
use crate::network::Transport;
use crate::transaction::{
    BlockTransactionsPage, ListBlockTransactionsOptions, TransactionInfo, TransactionList,
};
use crate::{LiteError, Result};

/// Remote error code for data the server does not have (yet)
pub const ERROR_CODE_NOT_READY: i32 = 651;

/// Raw account state with its proofs, as returned by `getAccountState`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawAccountState {
    pub block: BlockId,
    pub shard_block: BlockId,
    pub shard_proof: Vec<u8>,
    pub proof: Vec<u8>,
    pub state: Vec<u8>,
}

/// Identity of the zero state the remote's chain starts from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZeroStateId {
    pub workchain: i32,
    pub root_hash: Hash256,
    pub file_hash: Hash256,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterchainInfo {
    pub last: BlockId,
    pub state_root_hash: Hash256,
    pub init: ZeroStateId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerVersion {
    pub mode: u32,
    pub version: i32,
    pub capabilities: u64,
    pub now: u32,
}

/// Thin typed layer over a [`Transport`]
#[derive(Clone)]
pub struct QueryLayer {
    transport: Arc<dyn Transport>,
    parser: Arc<dyn CellParser>,
    default_timeout: Duration,
}

impl QueryLayer {
    pub fn new(
        transport: Arc<dyn Transport>,
        parser: Arc<dyn CellParser>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            parser,
            default_timeout,
        }
    }

    pub fn parser(&self) -> &dyn CellParser {
        self.parser.as_ref()
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    async fn call(&self, request: LiteRequest, timeout: Option<Duration>) -> Result<LiteResponse> {
        let method = request.method();
        let budget = timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();

        counter!("lite_query.query.calls", 1, "method" => method.name());
        debug!(method = method.name(), ?budget, "issuing lite query");

        let outcome = match tokio::time::timeout(budget, self.transport.query(request, budget)).await {
            Ok(result) => result,
            Err(_) => Err(LiteError::Timeout {
                method: method.name(),
                after: budget,
            }),
        };
        let outcome = outcome.and_then(|response| match response {
            LiteResponse::Error(error) => Err(server_error(method, error)),
            response => Ok(response),
        });

        histogram!(
            "lite_query.query.latency_ms",
            started.elapsed().as_secs_f64() * 1000.0,
            "method" => method.name()
        );
        if let Err(error) = &outcome {
            counter!("lite_query.query.failures", 1, "method" => method.name());
            debug!(method = method.name(), %error, "lite query failed");
        }

        outcome
    }

    /// Resolve block coordinates to an authenticated block id
    pub async fn lookup_block(&self, block: BlockRef, timeout: Option<Duration>) -> Result<BlockId> {
        let request = LiteRequest::LookupBlock(LookupBlockRequest {
            mode: LOOKUP_BY_SEQNO,
            id: block.into(),
            lt: None,
            utime: None,
        });

        match self.call(request, timeout).await? {
            LiteResponse::BlockHeader(header) => {
                let id = BlockId::from(header.id);
                if id.block_ref() != block {
                    return Err(LiteError::mismatch(format!(
                        "lookup of {} returned {}",
                        block, id
                    )));
                }
                Ok(id)
            }
            other => Err(unexpected(LiteMethod::LookupBlock, &other)),
        }
    }

    pub async fn get_block_header(&self, id: BlockId, timeout: Option<Duration>) -> Result<BlockHeader> {
        let request = LiteRequest::GetBlockHeader(GetBlockHeaderRequest {
            id: id.into(),
            mode: 0,
        });

        match self.call(request, timeout).await? {
            LiteResponse::BlockHeader(header) => {
                let returned = BlockId::from(header.id);
                ensure_same_block(&id, &returned)?;
                Ok(BlockHeader {
                    id: returned,
                    mode: header.mode,
                    header_proof: header.header_proof,
                })
            }
            other => Err(unexpected(LiteMethod::GetBlockHeader, &other)),
        }
    }

    /// Fetch and parse the shard configuration of a master block
    pub async fn get_all_shards_info(&self, id: BlockId, timeout: Option<Duration>) -> Result<ShardsSnapshot> {
        let request = LiteRequest::GetAllShardsInfo(GetAllShardsInfoRequest { id: id.into() });

        match self.call(request, timeout).await? {
            LiteResponse::AllShardsInfo(info) => {
                ensure_same_block(&id, &BlockId::from(info.id))?;
                let tips = self
                    .parser
                    .parse_shard_config(&info.data)
                    .map_err(|e| parse_failure("shard configuration", e))?;
                ShardsSnapshot::from_tips(id, tips, info.data, info.proof)
            }
            other => Err(unexpected(LiteMethod::GetAllShardsInfo, &other)),
        }
    }

    pub async fn get_account_state(
        &self,
        address: &AccountAddress,
        id: BlockId,
        timeout: Option<Duration>,
    ) -> Result<RawAccountState> {
        let request = LiteRequest::GetAccountState(GetAccountStateRequest {
            id: id.into(),
            account: account_id(address),
        });

        match self.call(request, timeout).await? {
            LiteResponse::AccountState(state) => {
                let block = BlockId::from(state.id);
                ensure_same_block(&id, &block)?;
                Ok(RawAccountState {
                    block,
                    shard_block: state.shardblk.into(),
                    shard_proof: state.shard_proof,
                    proof: state.proof,
                    state: state.state,
                })
            }
            other => Err(unexpected(LiteMethod::GetAccountState, &other)),
        }
    }

    pub async fn get_one_transaction(
        &self,
        address: &AccountAddress,
        lt: u64,
        id: BlockId,
        timeout: Option<Duration>,
    ) -> Result<TransactionInfo> {
        let request = LiteRequest::GetOneTransaction(GetOneTransactionRequest {
            id: id.into(),
            account: account_id(address),
            lt,
        });

        match self.call(request, timeout).await? {
            LiteResponse::TransactionInfo(info) => {
                let block = BlockId::from(info.id);
                ensure_same_block(&id, &block)?;
                Ok(TransactionInfo {
                    block,
                    proof: info.proof,
                    transaction: info.transaction,
                })
            }
            other => Err(unexpected(LiteMethod::GetOneTransaction, &other)),
        }
    }

    /// Up to `count` account transactions, walking back from `(lt, hash)`
    pub async fn list_transactions(
        &self,
        address: &AccountAddress,
        count: u32,
        lt: u64,
        hash: Hash256,
        timeout: Option<Duration>,
    ) -> Result<TransactionList> {
        let request = LiteRequest::GetTransactions(GetTransactionsRequest {
            count,
            account: account_id(address),
            lt,
            hash,
        });

        match self.call(request, timeout).await? {
            LiteResponse::TransactionList(list) => Ok(TransactionList {
                blocks: list.ids.into_iter().map(BlockId::from).collect(),
                transactions: list.transactions,
            }),
            other => Err(unexpected(LiteMethod::GetTransactions, &other)),
        }
    }

    /// Fetch one page of a block's transaction index
    pub async fn list_block_transactions(
        &self,
        id: BlockId,
        options: &ListBlockTransactionsOptions,
        timeout: Option<Duration>,
    ) -> Result<BlockTransactionsPage> {
        let request = LiteRequest::ListBlockTransactions(ListBlockTransactionsRequest {
            id: id.into(),
            mode: options.wire_mode().bits(),
            count: options.count,
            after: options.after.map(|cursor| TransactionId3Raw {
                account: cursor.account,
                lt: cursor.lt,
            }),
            reverse_order: options.reverse_order.then_some(true),
            want_proof: options.want_proof.then_some(true),
        });

        match self.call(request, timeout).await? {
            LiteResponse::BlockTransactions(page) => {
                let block = BlockId::from(page.id);
                ensure_same_block(&id, &block)?;
                Ok(BlockTransactionsPage {
                    block,
                    req_count: page.req_count,
                    incomplete: page.incomplete,
                    ids: page.ids.into_iter().map(Into::into).collect(),
                    proof: page.proof,
                })
            }
            other => Err(unexpected(LiteMethod::ListBlockTransactions, &other)),
        }
    }

    pub async fn get_masterchain_info(&self, timeout: Option<Duration>) -> Result<MasterchainInfo> {
        match self.call(LiteRequest::GetMasterchainInfo, timeout).await? {
            LiteResponse::MasterchainInfo(info) => {
                let last = BlockId::from(info.last);
                if !last.shard.is_masterchain() {
                    return Err(LiteError::malformed(format!(
                        "last masterchain block {} is not on the master chain",
                        last
                    )));
                }
                Ok(MasterchainInfo {
                    last,
                    state_root_hash: info.state_root_hash,
                    init: ZeroStateId {
                        workchain: info.init.workchain,
                        root_hash: info.init.root_hash,
                        file_hash: info.init.file_hash,
                    },
                })
            }
            other => Err(unexpected(LiteMethod::GetMasterchainInfo, &other)),
        }
    }

    /// Remote unix time
    pub async fn get_time(&self, timeout: Option<Duration>) -> Result<u32> {
        match self.call(LiteRequest::GetTime, timeout).await? {
            LiteResponse::CurrentTime(time) => Ok(time.now),
            other => Err(unexpected(LiteMethod::GetTime, &other)),
        }
    }

    pub async fn get_version(&self, timeout: Option<Duration>) -> Result<ServerVersion> {
        match self.call(LiteRequest::GetVersion, timeout).await? {
            LiteResponse::Version(version) => Ok(ServerVersion {
                mode: version.mode,
                version: version.version,
                capabilities: version.capabilities,
                now: version.now,
            }),
            other => Err(unexpected(LiteMethod::GetVersion, &other)),
        }
    }
}

fn account_id(address: &AccountAddress) -> AccountIdRaw {
    AccountIdRaw {
        workchain: address.workchain,
        id: address.hash,
    }
}

fn ensure_same_block(requested: &BlockId, returned: &BlockId) -> Result<()> {
    if requested != returned {
        return Err(LiteError::mismatch(format!(
            "requested {} but remote answered for {}",
            requested, returned
        )));
    }
    Ok(())
}

fn unexpected(method: LiteMethod, response: &LiteResponse) -> LiteError {
    LiteError::malformed(format!(
        "{} answered with unexpected {}",
        method.name(),
        response.kind()
    ))
}

pub(crate) fn parse_failure(what: &str, error: LiteError) -> LiteError {
    match error {
        LiteError::MalformedResponse(_) => error,
        other => LiteError::malformed(format!("cannot parse {}: {}", what, other)),
    }
}

fn server_error(method: LiteMethod, error: LiteServerError) -> LiteError {
    let message = error.message.to_lowercase();
    if error.code == ERROR_CODE_NOT_READY
        || message.contains("not found")
        || message.contains("not in db")
    {
        LiteError::NotFound(format!("{}: {}", method.name(), error.message))
    } else {
        LiteError::Transport(format!(
            "{} failed with code {}: {}",
            method.name(),
            error.code,
            error.message
        ))
    }
}
