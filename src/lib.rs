pub mod account;
pub mod block;
pub mod cache;
pub mod cells;
pub mod client;
pub mod config;
pub mod network;
pub mod query;
pub mod telemetry;
pub mod transaction;

// Re-exports
pub use account::{AccountAddress, AccountSnapshot};
pub use block::{BlockId, BlockRef, FullBlockSnapshot, ShardId, ShardsSnapshot};
pub use cells::CellParser;
pub use client::LiteClient;
pub use config::{ClientConfig, ProofMissPolicy};
pub use network::Transport;
pub use transaction::TransactionRef;

// Core types
pub type Result<T> = std::result::Result<T, LiteError>;
pub use error::{ErrorSeverity, LiteError};

pub mod error;
