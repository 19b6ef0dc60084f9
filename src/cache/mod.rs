/*!
# Cache Module

Batching and memoization in front of the cacheable lite queries.

## Core Components

### Batched Cache
`BatchedCache` coalesces concurrent loads:
- equal keys share one in-flight result
- distinct keys queued in the same scheduling turn travel in one batch
- batches are capped at `batch_size` keys
- successes are memoized for the cache's lifetime, failures are not

### Loaders
- `BlockLookupLoader`: coordinates to authenticated block id
- `BlockHeaderLoader`: block id to header
- `ShardsInfoLoader`: master block id to shard snapshot

## Keys

Keys are compared through their canonical string form. Coordinates render as
`workchain::shard::seqno` with the shard as a signed decimal. Authenticated ids
append both hashes, so ids that disagree on hashes are cached separately.

```rust
use lite_query::block::{BlockId, BlockRef};
use lite_query::cache::CacheKey;

let coords = BlockRef::masterchain(12);
assert_eq!(coords.cache_key(), "-1::-9223372036854775808::12");

let id = BlockId::new(coords, [0xaa; 32], [0xbb; 32]);
assert!(id.cache_key().starts_with("-1::-9223372036854775808::12::aaaa"));
```

## Lifetime

Each client instance owns its caches; nothing is process-global. Entries are
never evicted. Only successful lookups are memoized, so coordinates the remote
could not resolve yet are asked again on the next load.
*/

pub mod batch;
pub mod loaders;

pub use batch::{BatchLoader, BatchStats, BatchedCache, CacheKey};
pub use loaders::{BlockHeaderLoader, BlockLookupLoader, ShardsInfoLoader};

use crate::block::{BlockId, BlockRef};

impl CacheKey for BlockRef {
    fn cache_key(&self) -> String {
        format!(
            "{}::{}::{}",
            self.shard.workchain,
            self.shard.shard_signed(),
            self.seqno
        )
    }
}

impl CacheKey for BlockId {
    fn cache_key(&self) -> String {
        format!(
            "{}::{}::{}",
            self.block_ref().cache_key(),
            self.root_hash_hex(),
            self.file_hash_hex()
        )
    }
}

/// Cache in front of `lookupBlock`
pub type BlockLookupCache = BatchedCache<BlockLookupLoader>;

/// Cache in front of `getBlockHeader`
pub type BlockHeaderCache = BatchedCache<BlockHeaderLoader>;

/// Cache in front of `getAllShardsInfo`
pub type ShardsInfoCache = BatchedCache<ShardsInfoLoader>;
