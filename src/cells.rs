//! Cell parser seam.
//!
//! Bag-of-cells decoding and proof tree walking live outside this crate. The
//! client consumes them through [`CellParser`] and the plain records below.

use std::collections::BTreeMap;
use num_bigint::BigUint;
use serde::{Serialize, Deserialize};

use crate::account::{LastTransaction, ParsedAccount};
use crate::block::{Hash256, ShardId};
use crate::Result;

/// Index of the shard-state root inside an account state proof
pub const SHARD_STATE_PROOF_ROOT: usize = 1;

/// Latest seqno of one shard as recorded in a master block's shard configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardTip {
    pub shard: ShardId,
    pub seqno: u32,
}

/// Per-account last transaction pointers from a shard-state proof,
/// keyed the way the accounts dictionary indexes them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardAccounts {
    entries: BTreeMap<BigUint, LastTransaction>,
}

impl ShardAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, account: &Hash256, last: LastTransaction) {
        self.entries.insert(account_key(account), last);
    }

    pub fn get(&self, account: &Hash256) -> Option<&LastTransaction> {
        self.entries.get(&account_key(account))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Hash256, LastTransaction)> for ShardAccounts {
    fn from_iter<I: IntoIterator<Item = (Hash256, LastTransaction)>>(iter: I) -> Self {
        let mut accounts = ShardAccounts::new();
        for (account, last) in iter {
            accounts.insert(&account, last);
        }
        accounts
    }
}

/// 256-bit unsigned key of an account in the shard accounts dictionary
pub fn account_key(account: &Hash256) -> BigUint {
    BigUint::from_bytes_be(account)
}

/// Parser for the cell trees carried in lite protocol responses
pub trait CellParser: Send + Sync {
    /// Decode a master block's shard configuration
    fn parse_shard_config(&self, data: &[u8]) -> Result<Vec<ShardTip>>;

    /// Decode an account state; `None` for an account that was never initialized
    fn parse_account(&self, state: &[u8]) -> Result<Option<ParsedAccount>>;

    /// Decode the shard-state tree found at `root` of a proof blob
    fn parse_shard_state_tree(&self, proof: &[u8], root: usize) -> Result<ShardAccounts>;
}
