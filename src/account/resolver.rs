use std::time::Duration;
use tracing::{debug, warn};

use crate::account::{AccountAddress, AccountSnapshot, Balance};
use crate::block::BlockId;
use crate::cells::SHARD_STATE_PROOF_ROOT;
use crate::config::ProofMissPolicy;
use crate::query::{parse_failure, QueryLayer};
use crate::{LiteError, Result};

/// Builds account snapshots from a raw state fetch and its shard-state proof
#[derive(Clone)]
pub struct AccountResolver {
    query: QueryLayer,
    proof_miss_policy: ProofMissPolicy,
}

impl AccountResolver {
    pub fn new(query: QueryLayer, proof_miss_policy: ProofMissPolicy) -> Self {
        Self {
            query,
            proof_miss_policy,
        }
    }

    /// Resolve an account as of `block`.
    ///
    /// An account that was never initialized resolves to an empty snapshot with
    /// zero balance. An initialized account must be present in the shard-state
    /// proof; a miss is a `ProofMismatch` unless the policy is `TreatAsAbsent`.
    pub async fn resolve(
        &self,
        address: &AccountAddress,
        block: BlockId,
        timeout: Option<Duration>,
    ) -> Result<AccountSnapshot> {
        let raw = self.query.get_account_state(address, block, timeout).await?;

        let state = self
            .query
            .parser()
            .parse_account(&raw.state)
            .map_err(|e| parse_failure("account state", e))?;

        let Some(account) = state else {
            debug!(%address, %block, "account is not initialized");
            return Ok(AccountSnapshot {
                state: None,
                balance: Balance::default(),
                last_transaction: None,
                raw_state: raw.state,
                proof: raw.proof,
                block: raw.block,
                shard_block: raw.shard_block,
                shard_proof: raw.shard_proof,
            });
        };

        let accounts = self
            .query
            .parser()
            .parse_shard_state_tree(&raw.proof, SHARD_STATE_PROOF_ROOT)
            .map_err(|e| parse_failure("shard state proof", e))?;

        let last_transaction = match accounts.get(&address.hash) {
            Some(last) => Some(*last),
            None => match self.proof_miss_policy {
                ProofMissPolicy::Reject => {
                    return Err(LiteError::mismatch(format!(
                        "account {} is present in state but missing from the shard state proof of {}",
                        address, block
                    )));
                }
                ProofMissPolicy::TreatAsAbsent => {
                    warn!(%address, %block, "account missing from shard state proof");
                    None
                }
            },
        };

        Ok(AccountSnapshot {
            balance: account.balance.clone(),
            state: Some(account),
            last_transaction,
            raw_state: raw.state,
            proof: raw.proof,
            block: raw.block,
            shard_block: raw.shard_block,
            shard_proof: raw.shard_proof,
        })
    }
}
