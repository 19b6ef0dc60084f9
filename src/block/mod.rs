//! Block identities, shard snapshots and full block reconstruction.

pub mod full;
pub mod shards;
pub mod types;

pub use full::{plan_new_blocks, BlockTransactions, FullBlockReconstructor, FullBlockSnapshot};
pub use shards::ShardsSnapshot;
pub use types::{
    BlockHeader, BlockId, BlockRef, Hash256, ShardId, MASTERCHAIN_WORKCHAIN, SHARD_FULL,
};
