//! Account state resolution.
//!
//! The remote returns an account's state and, separately, a proof containing
//! the shard state the account lives in. The last transaction pointer is only
//! recorded in the shard state, so a snapshot is assembled from both.

pub mod resolver;
pub mod types;

pub use resolver::AccountResolver;
pub use types::{
    AccountAddress, AccountSnapshot, AccountStorage, Balance, LastTransaction, ParsedAccount,
};
