/*!
# Transaction Types

Transaction identifiers and the paging options of `listBlockTransactions`.

Logical time orders the transactions of one account and doubles as the paging
cursor: a page request carries the `(account, lt)` of the last item already
seen, and the remote continues strictly after it. Items are kept in the order
the remote emits them.
*/

use serde::{Serialize, Deserialize};

use crate::block::{BlockId, Hash256};
use crate::network::schema::TransactionIdRaw;
use crate::{LiteError, Result};

/// Field selection and flags of a block transactions request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TransactionIdMode(pub u32);

impl TransactionIdMode {
    pub const ACCOUNT: TransactionIdMode = TransactionIdMode(1);
    pub const LT: TransactionIdMode = TransactionIdMode(2);
    pub const HASH: TransactionIdMode = TransactionIdMode(4);
    pub const WANT_PROOF: TransactionIdMode = TransactionIdMode(32);
    pub const REVERSE_ORDER: TransactionIdMode = TransactionIdMode(64);
    pub const AFTER: TransactionIdMode = TransactionIdMode(128);

    /// Account, logical time and hash of every transaction
    pub const FULL_IDS: TransactionIdMode = TransactionIdMode(1 | 2 | 4);

    pub fn contains(self, other: TransactionIdMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for TransactionIdMode {
    type Output = TransactionIdMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        TransactionIdMode(self.0 | rhs.0)
    }
}

/// Fully identified transaction of a block
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TransactionRef {
    pub account: Hash256,
    pub lt: u64,
    pub hash: Hash256,
}

impl TransactionRef {
    /// Cursor that continues a listing after this transaction
    pub fn cursor(&self) -> TransactionCursor {
        TransactionCursor {
            account: self.account,
            lt: self.lt,
        }
    }
}

/// Position in a block's transaction index
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TransactionCursor {
    pub account: Hash256,
    pub lt: u64,
}

/// Transaction id as listed by a block; fields present according to the mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockTransactionId {
    pub account: Option<Hash256>,
    pub lt: Option<u64>,
    pub hash: Option<Hash256>,
}

impl BlockTransactionId {
    /// Require every field, as listed with [`TransactionIdMode::FULL_IDS`]
    pub fn to_ref(&self) -> Result<TransactionRef> {
        match (self.account, self.lt, self.hash) {
            (Some(account), Some(lt), Some(hash)) => Ok(TransactionRef { account, lt, hash }),
            _ => Err(LiteError::malformed(format!(
                "transaction id is missing fields: {:?}",
                self
            ))),
        }
    }

    pub fn cursor(&self) -> Option<TransactionCursor> {
        Some(TransactionCursor {
            account: self.account?,
            lt: self.lt?,
        })
    }
}

impl From<TransactionIdRaw> for BlockTransactionId {
    fn from(raw: TransactionIdRaw) -> Self {
        Self {
            account: raw.account,
            lt: raw.lt,
            hash: raw.hash,
        }
    }
}

/// Options of a single `listBlockTransactions` page request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListBlockTransactionsOptions {
    pub mode: TransactionIdMode,
    pub count: u32,
    pub after: Option<TransactionCursor>,
    pub reverse_order: bool,
    pub want_proof: bool,
}

impl Default for ListBlockTransactionsOptions {
    fn default() -> Self {
        Self {
            mode: TransactionIdMode::FULL_IDS,
            count: 50,
            after: None,
            reverse_order: false,
            want_proof: false,
        }
    }
}

impl ListBlockTransactionsOptions {
    /// Mode bits as sent on the wire, flags derived from the options
    pub fn wire_mode(&self) -> TransactionIdMode {
        let mut mode = self.mode;
        if self.after.is_some() {
            mode = mode | TransactionIdMode::AFTER;
        }
        if self.reverse_order {
            mode = mode | TransactionIdMode::REVERSE_ORDER;
        }
        if self.want_proof {
            mode = mode | TransactionIdMode::WANT_PROOF;
        }
        mode
    }
}

/// One page of a block's transaction index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockTransactionsPage {
    pub block: BlockId,
    pub req_count: u32,
    /// More pages remain after this one
    pub incomplete: bool,
    pub ids: Vec<BlockTransactionId>,
    pub proof: Vec<u8>,
}

/// A single account transaction with its proof
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionInfo {
    pub block: BlockId,
    pub proof: Vec<u8>,
    /// Serialized transaction cell
    pub transaction: Vec<u8>,
}

/// Recent account transactions, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionList {
    /// Block of every transaction, in the order of the serialized list
    pub blocks: Vec<BlockId>,
    pub transactions: Vec<u8>,
}
