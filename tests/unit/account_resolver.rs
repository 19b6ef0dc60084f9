use std::sync::Arc;
use std::time::Duration;
use mockall::mock;
use num_bigint::BigUint;
use pretty_assertions::assert_eq;

use lite_query::account::{AccountResolver, LastTransaction, ParsedAccount};
use lite_query::block::BlockRef;
use lite_query::cells::{CellParser, ShardAccounts, ShardTip, SHARD_STATE_PROOF_ROOT};
use lite_query::query::QueryLayer;
use lite_query::{LiteError, ProofMissPolicy, Result};

use crate::common::{
    test_account, test_block_id, test_parsed_account, JsonCellParser, ScriptedTransport,
};

mock! {
    pub Parser {}

    impl CellParser for Parser {
        fn parse_shard_config(&self, data: &[u8]) -> Result<Vec<ShardTip>>;
        fn parse_account(&self, state: &[u8]) -> Result<Option<ParsedAccount>>;
        fn parse_shard_state_tree(&self, proof: &[u8], root: usize) -> Result<ShardAccounts>;
    }
}

fn resolver(
    transport: &Arc<ScriptedTransport>,
    parser: Arc<dyn CellParser>,
    policy: ProofMissPolicy,
) -> AccountResolver {
    AccountResolver::new(
        QueryLayer::new(transport.clone(), parser, Duration::from_secs(2)),
        policy,
    )
}

fn last(lt: u64) -> LastTransaction {
    LastTransaction { lt, hash: [lt as u8; 32] }
}

#[tokio::test]
async fn test_uninitialized_account_is_empty() {
    let transport = ScriptedTransport::new();
    let address = test_account(1);
    let block = BlockRef::masterchain(50);
    transport.set_account(address, block, b"uninit".to_vec(), b"proof".to_vec());

    let mut parser = MockParser::new();
    parser.expect_parse_account().times(1).returning(|_| Ok(None));
    parser.expect_parse_shard_state_tree().never();

    let snapshot = resolver(&transport, Arc::new(parser), ProofMissPolicy::Reject)
        .resolve(&address, test_block_id(block), None)
        .await
        .unwrap();

    assert!(!snapshot.is_initialized());
    assert!(snapshot.balance.is_zero());
    assert_eq!(snapshot.last_transaction, None);
    assert_eq!(snapshot.raw_state, b"uninit".to_vec());
    assert_eq!(snapshot.block, test_block_id(block));
}

#[tokio::test]
async fn test_last_transaction_comes_from_shard_state_root() {
    let transport = ScriptedTransport::new();
    let address = test_account(2);
    let block = BlockRef::masterchain(51);
    let account = test_parsed_account(address, 1_500);

    // Root 0 is the block proof; only root 1 describes shard state.
    let proof = JsonCellParser::encode_proof(&[
        vec![(address.hash, last(1))],
        vec![(address.hash, last(42)), (test_account(3).hash, last(7))],
    ]);
    transport.set_account(
        address,
        block,
        JsonCellParser::encode_account(Some(&account)),
        proof,
    );

    let snapshot = resolver(&transport, JsonCellParser::new(), ProofMissPolicy::Reject)
        .resolve(&address, test_block_id(block), None)
        .await
        .unwrap();

    assert!(snapshot.is_initialized());
    assert_eq!(snapshot.balance.coins, BigUint::from(1_500u32));
    assert_eq!(snapshot.last_transaction, Some(last(42)));
    assert_eq!(snapshot.state, Some(account));
}

#[tokio::test]
async fn test_parser_is_asked_for_shard_state_root() {
    let transport = ScriptedTransport::new();
    let address = test_account(4);
    let block = BlockRef::masterchain(52);
    transport.set_account(address, block, vec![1], vec![2]);

    let account = test_parsed_account(address, 10);
    let mut parser = MockParser::new();
    parser
        .expect_parse_account()
        .returning(move |_| Ok(Some(account.clone())));
    parser
        .expect_parse_shard_state_tree()
        .withf(|proof, root| proof.to_vec() == vec![2u8] && *root == SHARD_STATE_PROOF_ROOT)
        .times(1)
        .returning(move |_, _| Ok([(address.hash, last(9))].into_iter().collect()));

    let snapshot = resolver(&transport, Arc::new(parser), ProofMissPolicy::Reject)
        .resolve(&address, test_block_id(block), None)
        .await
        .unwrap();
    assert_eq!(snapshot.last_transaction, Some(last(9)));
}

#[tokio::test]
async fn test_account_missing_from_proof_is_rejected() {
    let transport = ScriptedTransport::new();
    let address = test_account(5);
    let block = BlockRef::masterchain(53);
    let account = test_parsed_account(address, 99);
    transport.set_account(
        address,
        block,
        JsonCellParser::encode_account(Some(&account)),
        JsonCellParser::encode_proof(&[vec![], vec![(test_account(6).hash, last(3))]]),
    );

    let result = resolver(&transport, JsonCellParser::new(), ProofMissPolicy::Reject)
        .resolve(&address, test_block_id(block), None)
        .await;
    assert!(matches!(result, Err(LiteError::ProofMismatch(_))));
}

#[tokio::test]
async fn test_account_missing_from_proof_can_be_tolerated() {
    let transport = ScriptedTransport::new();
    let address = test_account(5);
    let block = BlockRef::masterchain(54);
    let account = test_parsed_account(address, 99);
    transport.set_account(
        address,
        block,
        JsonCellParser::encode_account(Some(&account)),
        JsonCellParser::encode_proof(&[vec![], vec![]]),
    );

    let snapshot = resolver(&transport, JsonCellParser::new(), ProofMissPolicy::TreatAsAbsent)
        .resolve(&address, test_block_id(block), None)
        .await
        .unwrap();
    assert!(snapshot.is_initialized());
    assert_eq!(snapshot.last_transaction, None);
    assert_eq!(snapshot.balance.coins, BigUint::from(99u32));
}

#[tokio::test]
async fn test_parser_failure_is_malformed() {
    let transport = ScriptedTransport::new();
    let address = test_account(8);
    let block = BlockRef::masterchain(55);
    transport.set_account(address, block, vec![0xff], vec![]);

    let mut parser = MockParser::new();
    parser
        .expect_parse_account()
        .returning(|_| Err(LiteError::Transport("bad cell".into())));

    let result = resolver(&transport, Arc::new(parser), ProofMissPolicy::Reject)
        .resolve(&address, test_block_id(block), None)
        .await;
    assert!(matches!(result, Err(LiteError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let transport = ScriptedTransport::new();
    let result = resolver(&transport, JsonCellParser::new(), ProofMissPolicy::Reject)
        .resolve(&test_account(9), test_block_id(BlockRef::masterchain(56)), None)
        .await;
    assert!(matches!(result, Err(LiteError::NotFound(_))));
}

#[test]
fn test_json_parser_picks_requested_root() {
    let proof = JsonCellParser::encode_proof(&[vec![], vec![([1; 32], last(5))]]);
    let accounts = JsonCellParser.parse_shard_state_tree(&proof, 1).unwrap();
    assert_eq!(accounts.get(&[1; 32]), Some(&last(5)));
    assert!(JsonCellParser.parse_shard_state_tree(&proof, 2).is_err());
}
