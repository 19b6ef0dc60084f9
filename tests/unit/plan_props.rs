use std::collections::{BTreeMap, BTreeSet};
use proptest::prelude::*;

use lite_query::block::{plan_new_blocks, BlockRef, ShardId};

fn shard_ids() -> impl Strategy<Value = ShardId> {
    (0i32..2, prop::sample::select(vec![
        0x2000_0000_0000_0000u64,
        0x6000_0000_0000_0000,
        0xa000_0000_0000_0000,
        0xe000_0000_0000_0000,
    ]))
        .prop_map(|(workchain, shard)| ShardId::new(workchain, shard))
}

/// Shard tips at N - 1 and N, where each shard only moves forward
fn tip_pairs() -> impl Strategy<Value = (BTreeMap<ShardId, u32>, BTreeMap<ShardId, u32>)> {
    prop::collection::btree_map(shard_ids(), (0u32..10_000, 0u32..20, any::<bool>()), 0..8).prop_map(
        |tips| {
            let mut previous = BTreeMap::new();
            let mut current = BTreeMap::new();
            for (shard, (seqno, advance, existed)) in tips {
                if existed {
                    previous.insert(shard, seqno);
                }
                current.insert(shard, seqno + advance);
            }
            (previous, current)
        },
    )
}

proptest! {
    #[test]
    fn plan_lists_exactly_the_new_range((previous, current) in tip_pairs(), master in 1u32..1_000_000) {
        let work = plan_new_blocks(master, &previous, &current).unwrap();

        prop_assert_eq!(work[0], BlockRef::masterchain(master));

        let planned: BTreeSet<BlockRef> = work[1..].iter().copied().collect();
        prop_assert_eq!(planned.len(), work.len() - 1);

        let mut expected = BTreeSet::new();
        for (shard, &to) in &current {
            if let Some(&from) = previous.get(shard) {
                for seqno in from + 1..=to {
                    expected.insert(BlockRef::new(*shard, seqno));
                }
            }
        }
        prop_assert_eq!(planned, expected);
    }

    #[test]
    fn plan_never_lists_the_previous_tip((previous, current) in tip_pairs()) {
        let work = plan_new_blocks(7, &previous, &current).unwrap();
        for (shard, &seqno) in &previous {
            prop_assert!(!work.contains(&BlockRef::new(*shard, seqno)));
        }
    }

    #[test]
    fn plan_rejects_shards_going_back(seqno in 1u32..10_000, back in 1u32..100) {
        let shard = ShardId::new(0, 0x8000_0000_0000_0000);
        let previous = BTreeMap::from([(shard, seqno + back)]);
        let current = BTreeMap::from([(shard, seqno)]);
        prop_assert!(plan_new_blocks(3, &previous, &current).is_err());
    }
}
