/*!
# Lite Client

Public surface of the crate. A `LiteClient` owns one query layer, the three
batched caches in front of it, the account resolver and the full block
reconstructor. Clones share the same caches; separately constructed clients
share nothing.

```rust,ignore
let client = LiteClient::new(transport, parser, ClientConfig::default())?;
let info = client.get_masterchain_info().await?;
let snapshot = client.get_full_block(info.last.seqno).await?;
for block in &snapshot.blocks {
    println!("{} has {} transactions", block.id, block.transactions.len());
}
```
*/

use std::sync::Arc;
use tracing::info;

use crate::account::{AccountAddress, AccountResolver, AccountSnapshot};
use crate::block::{
    BlockHeader, BlockId, BlockRef, FullBlockReconstructor, FullBlockSnapshot, Hash256, ShardId,
    ShardsSnapshot,
};
use crate::cache::{
    BatchStats, BatchedCache, BlockHeaderCache, BlockHeaderLoader, BlockLookupCache,
    BlockLookupLoader, ShardsInfoCache, ShardsInfoLoader,
};
use crate::cells::CellParser;
use crate::config::ClientConfig;
use crate::network::Transport;
use crate::query::{MasterchainInfo, QueryLayer, ServerVersion};
use crate::transaction::{
    BlockTransactionsPage, ListBlockTransactionsOptions, TransactionInfo, TransactionList,
};
use crate::Result;

/// Statistics of the client's caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientCacheStats {
    pub lookups: BatchStats,
    pub headers: BatchStats,
    pub shards: BatchStats,
}

/// Read-only lite protocol client
#[derive(Clone)]
pub struct LiteClient {
    config: ClientConfig,
    query: QueryLayer,
    lookups: BlockLookupCache,
    headers: BlockHeaderCache,
    shards: ShardsInfoCache,
    accounts: AccountResolver,
    full_blocks: FullBlockReconstructor,
}

impl LiteClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        parser: Arc<dyn CellParser>,
        config: ClientConfig,
    ) -> Result<Self> {
        config.validate()?;

        let batch_limit = config.batch_limit()?;

        let query = QueryLayer::new(transport, parser, config.default_timeout());
        let lookups = BatchedCache::new(BlockLookupLoader::new(query.clone()), batch_limit);
        let headers = BatchedCache::new(BlockHeaderLoader::new(query.clone()), batch_limit);
        let shards = BatchedCache::new(ShardsInfoLoader::new(query.clone()), batch_limit);
        let accounts = AccountResolver::new(query.clone(), config.proof_miss_policy);
        let full_blocks = FullBlockReconstructor::new(
            query.clone(),
            lookups.clone(),
            shards.clone(),
            config.transactions_page_size,
        );

        info!(
            timeout_ms = config.default_timeout_ms,
            batch_size = config.batch_size,
            "lite client created"
        );

        Ok(Self {
            config,
            query,
            lookups,
            headers,
            shards,
            accounts,
            full_blocks,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Uncached query layer, for calls that need an explicit timeout
    pub fn query(&self) -> &QueryLayer {
        &self.query
    }

    pub async fn lookup_block_by_coordinates(&self, shard: ShardId, seqno: u32) -> Result<BlockId> {
        self.lookups.load(BlockRef::new(shard, seqno)).await
    }

    pub async fn get_block_header(&self, id: BlockId) -> Result<BlockHeader> {
        self.headers.load(id).await
    }

    pub async fn get_all_shards_info(&self, id: BlockId) -> Result<ShardsSnapshot> {
        self.shards.load(id).await
    }

    pub async fn get_account_state(
        &self,
        address: &AccountAddress,
        id: BlockId,
    ) -> Result<AccountSnapshot> {
        self.accounts.resolve(address, id, None).await
    }

    pub async fn get_account_transaction(
        &self,
        address: &AccountAddress,
        lt: u64,
        id: BlockId,
    ) -> Result<TransactionInfo> {
        self.query.get_one_transaction(address, lt, id, None).await
    }

    /// Up to `count` transactions of an account, newest first, starting at `(lt, hash)`
    pub async fn get_account_transactions(
        &self,
        address: &AccountAddress,
        lt: u64,
        hash: Hash256,
        count: u32,
    ) -> Result<TransactionList> {
        self.query.list_transactions(address, count, lt, hash, None).await
    }

    pub async fn list_block_transactions(
        &self,
        id: BlockId,
        options: &ListBlockTransactionsOptions,
    ) -> Result<BlockTransactionsPage> {
        self.query.list_block_transactions(id, options, None).await
    }

    /// Master block `master_seqno` and every shard block it newly finalized,
    /// with complete transaction lists
    pub async fn get_full_block(&self, master_seqno: u32) -> Result<FullBlockSnapshot> {
        self.full_blocks.reconstruct(master_seqno).await
    }

    pub async fn get_masterchain_info(&self) -> Result<MasterchainInfo> {
        self.query.get_masterchain_info(None).await
    }

    pub async fn get_time(&self) -> Result<u32> {
        self.query.get_time(None).await
    }

    pub async fn get_version(&self) -> Result<ServerVersion> {
        self.query.get_version(None).await
    }

    pub fn cache_stats(&self) -> ClientCacheStats {
        ClientCacheStats {
            lookups: self.lookups.stats(),
            headers: self.headers.stats(),
            shards: self.shards.stats(),
        }
    }
}
