use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::block::{BlockId, ShardId};
use crate::cells::ShardTip;
use crate::{LiteError, Result};

/// Latest finalized seqno of every shard as of one master block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardsSnapshot {
    /// Master block the mapping was read from
    pub block: BlockId,
    pub shards: BTreeMap<ShardId, u32>,
    /// Raw shard configuration bytes
    pub data: Vec<u8>,
    pub proof: Vec<u8>,
}

impl ShardsSnapshot {
    /// Build a snapshot from parsed shard tips. A shard listed twice is malformed.
    pub fn from_tips(
        block: BlockId,
        tips: impl IntoIterator<Item = ShardTip>,
        data: Vec<u8>,
        proof: Vec<u8>,
    ) -> Result<Self> {
        let mut shards = BTreeMap::new();
        for tip in tips {
            if shards.insert(tip.shard, tip.seqno).is_some() {
                return Err(LiteError::malformed(format!(
                    "shard {} listed twice in configuration of {}",
                    tip.shard, block
                )));
            }
        }

        Ok(Self {
            block,
            shards,
            data,
            proof,
        })
    }

    pub fn seqno(&self, shard: &ShardId) -> Option<u32> {
        self.shards.get(shard).copied()
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}
