/*!
# Client Configuration Module

Settings for one lite query client instance.

## Settings
- `default_timeout_ms`: budget of every physical call unless overridden per call
- `batch_size`: maximum number of keys carried by one physical batch
- `transactions_page_size`: page size used when walking a block's transactions
- `proof_miss_policy`: what to do when an account is missing from its own proof

```rust
use lite_query::config::{ClientConfig, ProofMissPolicy};

let config = ClientConfig::from_json(r#"{ "batch_size": 20 }"#).unwrap();
assert_eq!(config.batch_size, 20);
assert_eq!(config.default_timeout_ms, 5000);
assert_eq!(config.proof_miss_policy, ProofMissPolicy::Reject);
```
*/

use serde::{Serialize, Deserialize};
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::{LiteError, Result};

/// Largest page the remote accepts for `listBlockTransactions`
pub const MAX_TRANSACTIONS_PAGE: u32 = 256;

/// Handling of an account present in state but absent from the shard-state proof
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProofMissPolicy {
    /// Fail with `ProofMismatch`
    #[default]
    Reject,
    /// Return the snapshot without a last transaction pointer
    TreatAsAbsent,
}

/// Core configuration of a lite query client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Default timeout of a physical call, in milliseconds
    pub default_timeout_ms: u64,
    /// Maximum keys per physical batch
    pub batch_size: usize,
    /// Transactions requested per page during block reconstruction
    pub transactions_page_size: u32,
    /// Account proof miss handling
    pub proof_miss_policy: ProofMissPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 5000,
            batch_size: 100,
            transactions_page_size: 50,
            proof_miss_policy: ProofMissPolicy::Reject,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Largest number of keys one cache batch may carry
    pub fn batch_limit(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| LiteError::Config("Batch size cannot be 0".into()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_ms == 0 {
            return Err(LiteError::Config("Default timeout cannot be 0".into()));
        }
        self.batch_limit()?;
        if self.transactions_page_size == 0 || self.transactions_page_size > MAX_TRANSACTIONS_PAGE {
            return Err(LiteError::Config(format!(
                "Transactions page size must be between 1 and {}",
                MAX_TRANSACTIONS_PAGE
            )));
        }
        Ok(())
    }
}
