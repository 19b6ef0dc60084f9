/*!
# Full Block Reconstruction

Builds the snapshot of everything finalized by one master block: the master
block itself plus every shard block committed between master block `N - 1` and
master block `N`, each with its complete transaction list.

## Algorithm

1. Resolve the ids of master blocks `N` and `N - 1` (cached)
2. Fetch the shard configuration of both (cached)
3. Plan the work list: the master block, then for every shard known at `N` the
   seqnos in `(seqno at N - 1, seqno at N]`
4. For every planned block, concurrently: resolve its id and walk its
   transaction index page by page, each page continuing after the last item of
   the previous one. A page that repeats an already listed transaction is
   malformed, so a remote that never advances cannot stall the walk.

A shard that does not exist at `N - 1` contributes no blocks: its previous seqno
is taken to be its current one. Shards that split or merged between the two
master blocks are therefore skipped rather than listed twice.

Any failed call aborts the reconstruction; partial snapshots are never returned.
*/

use std::collections::{BTreeMap, HashSet};
use futures::future::{try_join, try_join_all};
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::block::{BlockId, BlockRef, ShardId};
use crate::cache::{BlockLookupCache, ShardsInfoCache};
use crate::query::QueryLayer;
use crate::transaction::{ListBlockTransactionsOptions, TransactionIdMode, TransactionRef};
use crate::{LiteError, Result};

/// One block of a full snapshot with all of its transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockTransactions {
    pub id: BlockId,
    /// In the order the remote lists them
    pub transactions: Vec<TransactionRef>,
}

impl BlockTransactions {
    pub fn shard(&self) -> ShardId {
        self.id.shard
    }

    pub fn seqno(&self) -> u32 {
        self.id.seqno
    }
}

/// Everything finalized by one master block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullBlockSnapshot {
    pub master_seqno: u32,
    pub master: BlockId,
    /// Master block first, then shard blocks ordered by shard and seqno
    pub blocks: Vec<BlockTransactions>,
}

impl FullBlockSnapshot {
    pub fn transaction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.transactions.len()).sum()
    }

    pub fn block(&self, shard: ShardId, seqno: u32) -> Option<&BlockTransactions> {
        self.blocks
            .iter()
            .find(|b| b.id.shard == shard && b.id.seqno == seqno)
    }
}

/// Blocks newly finalized by master block `master_seqno`, master block first.
///
/// For every shard in `current`, yields the seqnos in `(previous, current]`. A
/// shard absent from `previous` yields nothing. A shard whose seqno went
/// backwards is malformed.
pub fn plan_new_blocks(
    master_seqno: u32,
    previous: &BTreeMap<ShardId, u32>,
    current: &BTreeMap<ShardId, u32>,
) -> Result<Vec<BlockRef>> {
    let mut work = vec![BlockRef::masterchain(master_seqno)];

    for (shard, &current_seqno) in current {
        let previous_seqno = previous.get(shard).copied().unwrap_or(current_seqno);
        if previous_seqno > current_seqno {
            return Err(LiteError::malformed(format!(
                "shard {} went back from seqno {} to {} at master block {}",
                shard, previous_seqno, current_seqno, master_seqno
            )));
        }
        work.extend((previous_seqno..current_seqno).map(|seqno| BlockRef::new(*shard, seqno + 1)));
    }

    Ok(work)
}

/// Reconstructs full block snapshots through the shared caches
#[derive(Clone)]
pub struct FullBlockReconstructor {
    query: QueryLayer,
    lookups: BlockLookupCache,
    shards: ShardsInfoCache,
    page_size: u32,
}

impl FullBlockReconstructor {
    pub fn new(
        query: QueryLayer,
        lookups: BlockLookupCache,
        shards: ShardsInfoCache,
        page_size: u32,
    ) -> Self {
        Self {
            query,
            lookups,
            shards,
            page_size,
        }
    }

    pub async fn reconstruct(&self, master_seqno: u32) -> Result<FullBlockSnapshot> {
        let current_ref = BlockRef::masterchain(master_seqno);

        let (master, current, previous) = match master_seqno.checked_sub(1) {
            Some(previous_seqno) => {
                let (master, previous_master) = try_join(
                    self.lookups.load(current_ref),
                    self.lookups.load(BlockRef::masterchain(previous_seqno)),
                )
                .await?;
                let (current, previous) =
                    try_join(self.shards.load(master), self.shards.load(previous_master)).await?;
                (master, current, Some(previous))
            }
            None => {
                let master = self.lookups.load(current_ref).await?;
                let current = self.shards.load(master).await?;
                (master, current, None)
            }
        };

        let no_shards = BTreeMap::new();
        let previous_shards = previous
            .as_ref()
            .map(|snapshot| &snapshot.shards)
            .unwrap_or(&no_shards);
        let work = plan_new_blocks(master_seqno, previous_shards, &current.shards)?;
        debug!(master_seqno, blocks = work.len(), "planned full block");

        let blocks = try_join_all(work.into_iter().map(|block| self.load_block(block))).await?;

        let snapshot = FullBlockSnapshot {
            master_seqno,
            master,
            blocks,
        };
        info!(
            master_seqno,
            blocks = snapshot.blocks.len(),
            transactions = snapshot.transaction_count(),
            "reconstructed full block"
        );
        Ok(snapshot)
    }

    async fn load_block(&self, block: BlockRef) -> Result<BlockTransactions> {
        let id = self.lookups.load(block).await?;
        let transactions = self.collect_transactions(id).await?;
        Ok(BlockTransactions { id, transactions })
    }

    /// Walk a block's transaction index to the end
    pub async fn collect_transactions(&self, id: BlockId) -> Result<Vec<TransactionRef>> {
        let mut options = ListBlockTransactionsOptions {
            mode: TransactionIdMode::FULL_IDS,
            count: self.page_size,
            ..Default::default()
        };
        let mut transactions = Vec::new();
        let mut listed = HashSet::new();

        loop {
            let page = self.query.list_block_transactions(id, &options, None).await?;

            let mut last = None;
            for item in &page.ids {
                let transaction = item.to_ref()?;
                // A repeated position means the listing stopped advancing.
                if !listed.insert(transaction.cursor()) {
                    return Err(LiteError::malformed(format!(
                        "transaction {}:{} of {} was listed twice",
                        hex::encode(transaction.account),
                        transaction.lt,
                        id
                    )));
                }
                last = Some(transaction);
                transactions.push(transaction);
            }

            if !page.incomplete {
                break;
            }
            match last {
                Some(transaction) => options.after = Some(transaction.cursor()),
                None => {
                    return Err(LiteError::malformed(format!(
                        "empty page of transactions for {} is marked incomplete",
                        id
                    )));
                }
            }
        }

        Ok(transactions)
    }
}
