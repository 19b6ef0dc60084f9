use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Serialize, Deserialize};

use crate::block::{BlockId, Hash256};
use crate::LiteError;

/// Account address in raw `workchain:hex` form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AccountAddress {
    pub workchain: i32,
    pub hash: Hash256,
}

impl AccountAddress {
    pub fn new(workchain: i32, hash: Hash256) -> Self {
        Self { workchain, hash }
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl FromStr for AccountAddress {
    type Err = LiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, hash) = s
            .split_once(':')
            .ok_or_else(|| LiteError::Config(format!("address {s} is not in workchain:hex form")))?;
        let workchain = workchain
            .parse::<i32>()
            .map_err(|e| LiteError::Config(format!("bad workchain in {s}: {e}")))?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hash, &mut bytes)
            .map_err(|e| LiteError::Config(format!("bad account hash in {s}: {e}")))?;
        Ok(Self::new(workchain, bytes))
    }
}

/// Native coins plus extra currencies
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub coins: BigUint,
    pub extra: BTreeMap<u32, BigUint>,
}

impl Balance {
    pub fn from_coins(coins: impl Into<BigUint>) -> Self {
        Self {
            coins: coins.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coins.is_zero() && self.extra.values().all(Zero::is_zero)
    }
}

/// Storage state of an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountStorage {
    Uninit,
    Active {
        code: Option<Vec<u8>>,
        data: Option<Vec<u8>>,
    },
    Frozen {
        state_hash: Hash256,
    },
}

/// Account record as decoded by the cell parser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedAccount {
    pub address: AccountAddress,
    pub balance: Balance,
    pub storage: AccountStorage,
    pub last_trans_lt: u64,
}

/// Pointer to an account's latest transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LastTransaction {
    pub lt: u64,
    pub hash: Hash256,
}

/// Account state at a specific block, with the raw material for proof checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// `None` when the account was never initialized
    pub state: Option<ParsedAccount>,
    pub balance: Balance,
    pub last_transaction: Option<LastTransaction>,
    pub raw_state: Vec<u8>,
    pub proof: Vec<u8>,
    pub block: BlockId,
    pub shard_block: BlockId,
    pub shard_proof: Vec<u8>,
}

impl AccountSnapshot {
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }
}
