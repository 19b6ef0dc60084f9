use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use pretty_assertions::assert_eq;
use tokio::time::Instant;

use lite_query::account::LastTransaction;
use lite_query::block::BlockRef;
use lite_query::network::schema::LiteServerError;
use lite_query::network::{with_retry, LiteMethod, LiteResponse, RetryConfig};
use lite_query::telemetry::init_tracing;
use lite_query::transaction::ListBlockTransactionsOptions;
use lite_query::{ClientConfig, LiteClient, LiteError, ProofMissPolicy};

use crate::common::{
    test_account, test_block_id, test_parsed_account, test_shard, test_transactions,
    JsonCellParser, ScriptedTransport,
};

fn client(transport: &Arc<ScriptedTransport>, config: ClientConfig) -> LiteClient {
    LiteClient::new(transport.clone(), JsonCellParser::new(), config).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_concurrent_lookups_share_one_call() {
    let transport = ScriptedTransport::new();
    let client = client(&transport, ClientConfig::default());
    let shard = test_shard(0x8000_0000_0000_0000);

    let results = join_all((0..6).map(|_| client.lookup_block_by_coordinates(shard, 44))).await;

    for result in results {
        assert_eq!(result.unwrap(), test_block_id(BlockRef::new(shard, 44)));
    }
    assert_eq!(transport.calls(LiteMethod::LookupBlock), 1);
}

#[test_log::test(tokio::test)]
async fn test_headers_are_memoized() {
    let transport = ScriptedTransport::new();
    let client = client(&transport, ClientConfig::default());
    let id = test_block_id(BlockRef::masterchain(30));

    let first = client.get_block_header(id).await.unwrap();
    let second = client.get_block_header(id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls(LiteMethod::GetBlockHeader), 1);
    assert_eq!(client.cache_stats().headers.hits, 1);
}

#[test_log::test(tokio::test)]
async fn test_clones_share_caches_but_clients_do_not() {
    let transport = ScriptedTransport::new();
    let first = client(&transport, ClientConfig::default());
    let clone = first.clone();
    let second = client(&transport, ClientConfig::default());

    first.lookup_block_by_coordinates(test_shard(0x8000_0000_0000_0000), 1).await.unwrap();
    clone.lookup_block_by_coordinates(test_shard(0x8000_0000_0000_0000), 1).await.unwrap();
    assert_eq!(transport.calls(LiteMethod::LookupBlock), 1);

    second.lookup_block_by_coordinates(test_shard(0x8000_0000_0000_0000), 1).await.unwrap();
    assert_eq!(transport.calls(LiteMethod::LookupBlock), 2);
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_lookup_is_not_cached() {
    let transport = ScriptedTransport::new();
    transport.hang(LiteMethod::LookupBlock);
    let config = ClientConfig {
        default_timeout_ms: 100,
        ..Default::default()
    };
    let client = client(&transport, config);
    let block = BlockRef::masterchain(77);

    let started = Instant::now();
    let result = client.lookup_block_by_coordinates(block.shard, block.seqno).await;
    assert!(matches!(result, Err(LiteError::Timeout { .. })));
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(client.cache_stats().lookups.entries, 0);

    transport.unhang(LiteMethod::LookupBlock);
    let id = client.lookup_block_by_coordinates(block.shard, block.seqno).await.unwrap();
    assert_eq!(id, test_block_id(block));
    assert_eq!(transport.calls(LiteMethod::LookupBlock), 2);
}

#[test_log::test(tokio::test)]
async fn test_unresolved_block_is_asked_again() {
    let transport = ScriptedTransport::new();
    let client = client(&transport, ClientConfig::default());
    let block = BlockRef::masterchain(500);
    transport.set_missing(block);

    let result = client.lookup_block_by_coordinates(block.shard, block.seqno).await;
    assert!(matches!(result, Err(LiteError::NotFound(_))));

    transport.clear_missing(block);
    assert!(client.lookup_block_by_coordinates(block.shard, block.seqno).await.is_ok());
    assert_eq!(transport.calls(LiteMethod::LookupBlock), 2);
}

#[test_log::test(tokio::test)]
async fn test_account_state_follows_configured_policy() {
    let transport = ScriptedTransport::new();
    let address = test_account(12);
    let block = BlockRef::masterchain(60);
    transport.set_account(
        address,
        block,
        JsonCellParser::encode_account(Some(&test_parsed_account(address, 5))),
        JsonCellParser::encode_proof(&[vec![], vec![]]),
    );

    let strict = client(&transport, ClientConfig::default());
    let result = strict.get_account_state(&address, test_block_id(block)).await;
    assert!(matches!(result, Err(LiteError::ProofMismatch(_))));

    let config = ClientConfig::from_json(r#"{"proof_miss_policy": "treat_as_absent"}"#).unwrap();
    assert_eq!(config.proof_miss_policy, ProofMissPolicy::TreatAsAbsent);
    assert_eq!(config.batch_size, ClientConfig::default().batch_size);

    let lenient = client(&transport, config);
    let snapshot = lenient.get_account_state(&address, test_block_id(block)).await.unwrap();
    assert!(snapshot.is_initialized());
    assert_eq!(snapshot.last_transaction, None::<LastTransaction>);
}

#[test_log::test(tokio::test)]
async fn test_single_page_listing() {
    let transport = ScriptedTransport::new();
    let block = BlockRef::new(test_shard(0x8000_0000_0000_0000), 3);
    transport.set_transactions(block, test_transactions(block, 12));
    let client = client(&transport, ClientConfig::default());

    let options = ListBlockTransactionsOptions {
        count: 5,
        ..Default::default()
    };
    let page = client
        .list_block_transactions(test_block_id(block), &options)
        .await
        .unwrap();

    assert!(page.incomplete);
    assert_eq!(page.req_count, 5);
    let listed: Vec<_> = page.ids.iter().map(|id| id.to_ref().unwrap()).collect();
    assert_eq!(listed, test_transactions(block, 12)[..5].to_vec());
}

#[test_log::test(tokio::test)]
async fn test_chain_status_calls() {
    let transport = ScriptedTransport::new();
    transport.set_shards(900, &[(test_shard(0x8000_0000_0000_0000), 1200)]);
    let client = client(&transport, ClientConfig::default());

    let info = client.get_masterchain_info().await.unwrap();
    assert_eq!(info.last.seqno, 900);
    assert_eq!(client.get_time().await.unwrap(), 1_700_000_000);
    let version = client.get_version().await.unwrap();
    assert_eq!(version.version, 0x101);
    assert_eq!(version.capabilities, 7);
}

#[test_log::test]
fn test_invalid_config_is_rejected() {
    let config = ClientConfig {
        batch_size: 0,
        ..Default::default()
    };
    let result = LiteClient::new(ScriptedTransport::new(), JsonCellParser::new(), config);
    assert!(matches!(result, Err(LiteError::Config(_))));

    assert!(ClientConfig::from_json(r#"{"transactions_page_size": 1000}"#).is_err());
    assert!(ClientConfig::from_json("{not json").is_err());
}

#[tokio::test(start_paused = true)]
async fn test_retry_wraps_transient_failures_only() {
    let transport = ScriptedTransport::new();
    transport.override_response(
        LiteMethod::GetTime,
        LiteResponse::Error(LiteServerError {
            code: -400,
            message: "connection to validator lost".into(),
        }),
    );
    let client = client(&transport, ClientConfig::default());
    let retry = RetryConfig {
        max_attempts: 3,
        ..Default::default()
    };

    let result = with_retry(&retry, || client.get_time()).await;
    assert!(matches!(result, Err(LiteError::Transport(_))));
    assert_eq!(transport.calls(LiteMethod::GetTime), 3);

    let block = BlockRef::masterchain(8);
    transport.set_missing(block);
    let result = with_retry(&retry, || client.lookup_block_by_coordinates(block.shard, block.seqno)).await;
    assert!(matches!(result, Err(LiteError::NotFound(_))));
    assert_eq!(transport.calls(LiteMethod::LookupBlock), 1);
}

#[test]
fn test_tracing_installs_once() {
    let _ = init_tracing("lite_query=debug");
    assert!(matches!(init_tracing("lite_query=debug"), Err(LiteError::Config(_))));
}
