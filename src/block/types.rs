/*!
# Block Types

Identifiers for shards and blocks.

A `BlockRef` is a pair of coordinates that has not been proven to exist. A
`BlockId` carries the root and file hashes reported by the remote and is the
authenticated identity of a block: equality, hashing and cache keys all include
both hashes, so two ids that share coordinates but disagree on hashes never
collapse into one.

```rust
use lite_query::block::{BlockRef, ShardId};

let master = BlockRef::new(ShardId::MASTERCHAIN, 1000);
assert!(master.shard.is_masterchain());
assert_eq!(master.to_string(), "(-1,8000000000000000,1000)");
```
*/

use std::fmt;
use serde::{Serialize, Deserialize};

/// 32-byte digest
pub type Hash256 = [u8; 32];

/// Workchain id of the master chain
pub const MASTERCHAIN_WORKCHAIN: i32 = -1;

/// Shard mask covering the whole workchain
pub const SHARD_FULL: u64 = 0x8000_0000_0000_0000;

/// Shard chain identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ShardId {
    pub workchain: i32,
    pub shard: u64,
}

impl ShardId {
    /// The master chain shard
    pub const MASTERCHAIN: ShardId = ShardId {
        workchain: MASTERCHAIN_WORKCHAIN,
        shard: SHARD_FULL,
    };

    pub fn new(workchain: i32, shard: u64) -> Self {
        Self { workchain, shard }
    }

    pub fn is_masterchain(&self) -> bool {
        self.workchain == MASTERCHAIN_WORKCHAIN
    }

    /// Shard mask as the signed integer used on the wire
    pub fn shard_signed(&self) -> i64 {
        self.shard as i64
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:016x}", self.workchain, self.shard)
    }
}

/// Block coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct BlockRef {
    pub shard: ShardId,
    pub seqno: u32,
}

impl BlockRef {
    pub fn new(shard: ShardId, seqno: u32) -> Self {
        Self { shard, seqno }
    }

    pub fn masterchain(seqno: u32) -> Self {
        Self::new(ShardId::MASTERCHAIN, seqno)
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.shard, self.seqno)
    }
}

/// Authenticated block identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub shard: ShardId,
    pub seqno: u32,
    pub root_hash: Hash256,
    pub file_hash: Hash256,
}

impl BlockId {
    pub fn new(block_ref: BlockRef, root_hash: Hash256, file_hash: Hash256) -> Self {
        Self {
            shard: block_ref.shard,
            seqno: block_ref.seqno,
            root_hash,
            file_hash,
        }
    }

    /// Coordinates of this block, dropping the hashes
    pub fn block_ref(&self) -> BlockRef {
        BlockRef::new(self.shard, self.seqno)
    }

    pub fn root_hash_hex(&self) -> String {
        hex::encode(self.root_hash)
    }

    pub fn file_hash_hex(&self) -> String {
        hex::encode(self.file_hash)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}):{}:{}",
            self.shard,
            self.seqno,
            hex::encode_upper(self.root_hash),
            hex::encode_upper(self.file_hash)
        )
    }
}

/// Block header as returned by the remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: BlockId,
    pub mode: u32,
    /// Merkle proof of the header cells
    pub header_proof: Vec<u8>,
}
