use async_trait::async_trait;
use futures::future::join_all;

use crate::block::{BlockHeader, BlockId, BlockRef, ShardsSnapshot};
use crate::query::QueryLayer;
use crate::Result;

use super::BatchLoader;

/// `lookupBlock` by coordinates
pub struct BlockLookupLoader {
    query: QueryLayer,
}

impl BlockLookupLoader {
    pub fn new(query: QueryLayer) -> Self {
        Self { query }
    }
}

#[async_trait]
impl BatchLoader for BlockLookupLoader {
    type Key = BlockRef;
    type Value = BlockId;

    fn name(&self) -> &'static str {
        "block_lookup"
    }

    async fn load(&self, keys: &[BlockRef]) -> Vec<Result<BlockId>> {
        join_all(keys.iter().map(|block| self.query.lookup_block(*block, None))).await
    }
}

/// `getBlockHeader` by authenticated id
pub struct BlockHeaderLoader {
    query: QueryLayer,
}

impl BlockHeaderLoader {
    pub fn new(query: QueryLayer) -> Self {
        Self { query }
    }
}

#[async_trait]
impl BatchLoader for BlockHeaderLoader {
    type Key = BlockId;
    type Value = BlockHeader;

    fn name(&self) -> &'static str {
        "block_header"
    }

    async fn load(&self, keys: &[BlockId]) -> Vec<Result<BlockHeader>> {
        join_all(keys.iter().map(|id| self.query.get_block_header(*id, None))).await
    }
}

/// `getAllShardsInfo` by master block id
pub struct ShardsInfoLoader {
    query: QueryLayer,
}

impl ShardsInfoLoader {
    pub fn new(query: QueryLayer) -> Self {
        Self { query }
    }
}

#[async_trait]
impl BatchLoader for ShardsInfoLoader {
    type Key = BlockId;
    type Value = ShardsSnapshot;

    fn name(&self) -> &'static str {
        "shards_info"
    }

    async fn load(&self, keys: &[BlockId]) -> Vec<Result<ShardsSnapshot>> {
        join_all(keys.iter().map(|id| self.query.get_all_shards_info(*id, None))).await
    }
}
