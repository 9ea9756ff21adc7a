//! End-to-end flows through the view-model with mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use tipjar_core::{
    AccountState, CapabilityError, CapabilityErrorKind, Connection, ConnectionStatus, ErrorKind,
    Messages, SessionState, TipJar, TxHash, TIP_RECIPIENT, U256,
};
use tipjar_testing::{
    EdgeCaseTipInputs, MockBalanceQuery, MockConnector, MockTransactionSender, MOCK_ADDRESS,
    MOCK_CHAIN_ID,
};

struct Harness {
    jar: TipJar,
    connector: Arc<MockConnector>,
    balances: Arc<MockBalanceQuery>,
    sender: Arc<MockTransactionSender>,
}

fn harness_with(connector: MockConnector, balances: MockBalanceQuery, sender: MockTransactionSender) -> Harness {
    let connector = Arc::new(connector);
    let balances = Arc::new(balances);
    let sender = Arc::new(sender);
    let jar = TipJar::new(connector.clone(), balances.clone(), sender.clone());
    Harness { jar, connector, balances, sender }
}

fn harness() -> Harness {
    harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::new())
}

async fn connected(h: &Harness) -> SessionState {
    h.jar.initiate_connection("injected").await;
    let state = h.jar.snapshot().await;
    assert!(state.is_connected());
    state
}

async fn wait_until(jar: &TipJar, predicate: impl Fn(&SessionState) -> bool) -> SessionState {
    let mut events = jar.subscribe();
    let current = jar.snapshot().await;
    if predicate(&current) {
        return current;
    }
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.expect("event stream closed");
            if predicate(&event.state) {
                return event.state;
            }
        }
    })
    .await
    .expect("state never matched")
}

// ============================================================================
// Connection
// ============================================================================

#[tokio::test]
async fn test_successful_connection() {
    let h = harness_with(
        MockConnector::new(),
        MockBalanceQuery::new().with_default(1_500_000_000_000_000_000),
        MockTransactionSender::new(),
    );
    h.connector
        .push_connect_outcome(Ok(Connection::new("0xAbc0000000000000000000000000000000001234", 1001)));

    h.jar.initiate_connection("injected").await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.connection_status, ConnectionStatus::Connected);
    assert_eq!(state.account.as_deref(), Some("0xAbc0000000000000000000000000000000001234"));
    assert_eq!(state.chain_id, Some(1001));
    assert_eq!(state.balance.unwrap().formatted(), "1.5 KAIA");
    assert!(state.last_error.is_none());
    assert_eq!(tipjar_core::shorten(state.account.as_deref().unwrap()), "0xAbc0...1234");
}

#[tokio::test]
async fn test_connection_failure_surfaces_message() {
    let h = harness();
    h.connector
        .push_connect_outcome(Err(CapabilityError::rejected("User rejected the request.")));

    h.jar.initiate_connection("metaMask").await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.connection_status, ConnectionStatus::Error);
    assert!(state.account.is_none());
    let err = state.last_error.unwrap();
    assert_eq!(err.kind, ErrorKind::Connection);
    assert_eq!(err.message, "User rejected the request.");
}

#[tokio::test]
async fn test_connection_failure_without_message_uses_fallback() {
    let h = harness();
    h.connector
        .push_connect_outcome(Err(CapabilityError::without_message(CapabilityErrorKind::Other)));

    h.jar.initiate_connection("injected").await;

    let err = h.jar.snapshot().await.last_error.unwrap();
    assert_eq!(err.message, Messages::ENGLISH.connection_fallback);
}

#[tokio::test]
async fn test_unknown_connector_is_not_contacted() {
    let h = harness();
    h.jar.initiate_connection("safe").await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.connection_status, ConnectionStatus::Error);
    assert_eq!(state.last_error.unwrap().message, Messages::ENGLISH.connector_unavailable);
    assert!(h.connector.connect_calls().is_empty());
}

#[tokio::test]
async fn test_retry_after_failure() {
    let h = harness();
    h.connector.push_connect_outcome(Err(CapabilityError::network("timeout")));
    h.jar.initiate_connection("injected").await;
    assert_eq!(h.jar.snapshot().await.connection_status, ConnectionStatus::Error);

    h.jar.initiate_connection("injected").await;
    let state = h.jar.snapshot().await;
    assert!(state.is_connected());
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_connect_while_connected_is_ignored() {
    let h = harness();
    connected(&h).await;
    h.jar.initiate_connection("metaMask").await;
    assert_eq!(h.connector.connect_calls(), vec!["injected".to_string()]);
}

#[tokio::test]
async fn test_disconnect_clears_account() {
    let h = harness();
    connected(&h).await;

    h.jar.disconnect().await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
    assert!(state.account.is_none());
    assert!(state.chain_id.is_none());
    assert!(state.balance.is_none());
    assert_eq!(h.connector.disconnect_calls(), 1);
}

#[tokio::test]
async fn test_disconnect_failure_keeps_session() {
    let h = harness();
    connected(&h).await;
    h.connector.push_disconnect_outcome(Err(CapabilityError::other("wallet busy")));

    h.jar.disconnect().await;

    let state = h.jar.snapshot().await;
    assert!(state.is_connected());
    assert_eq!(state.last_error.unwrap().message, "wallet busy");
}

#[tokio::test]
async fn test_stale_connection_result_is_dropped() {
    let h = harness_with(MockConnector::gated(), MockBalanceQuery::new(), MockTransactionSender::new());

    let connecting = tokio::spawn({
        let jar = h.jar.clone();
        async move { jar.initiate_connection("injected").await }
    });
    h.connector.wait_for_connects(1).await;
    assert_eq!(h.jar.snapshot().await.connection_status, ConnectionStatus::Connecting);

    // Wallet reports a different account before the handshake resolves
    h.jar.apply_account_state(AccountState::connected("0xOther", 1001)).await;
    assert!(h.connector.resolve_connect(0, Ok(Connection::new(MOCK_ADDRESS, MOCK_CHAIN_ID))));
    connecting.await.unwrap();

    let state = h.jar.snapshot().await;
    assert_eq!(state.account.as_deref(), Some("0xOther"));
}

#[tokio::test]
async fn test_unknown_connector_during_handshake_is_ignored() {
    let h = harness_with(MockConnector::gated(), MockBalanceQuery::new(), MockTransactionSender::new());

    let connecting = tokio::spawn({
        let jar = h.jar.clone();
        async move { jar.initiate_connection("injected").await }
    });
    h.connector.wait_for_connects(1).await;

    h.jar.initiate_connection("nope").await;
    let state = h.jar.snapshot().await;
    assert_eq!(state.connection_status, ConnectionStatus::Connecting);
    assert!(state.last_error.is_none());

    h.jar.initiate_connection("metaMask").await;
    assert_eq!(h.connector.connect_calls(), vec!["injected".to_string()]);

    assert!(h.connector.resolve_connect(0, Ok(Connection::new(MOCK_ADDRESS, MOCK_CHAIN_ID))));
    connecting.await.unwrap();
    let state = h.jar.snapshot().await;
    assert!(state.is_connected());
    assert_eq!(state.account.as_deref(), Some(MOCK_ADDRESS));
}

// ============================================================================
// Balance and account updates
// ============================================================================

#[tokio::test]
async fn test_balance_failure_leaves_loading() {
    let h = harness();
    h.balances.set_failure(MOCK_ADDRESS, CapabilityError::network("rpc down"));

    let state = connected(&h).await;

    assert!(state.balance.is_none());
    assert!(state.last_error.is_none());
    assert_eq!(h.balances.queries(), vec![MOCK_ADDRESS.to_string()]);
}

#[tokio::test]
async fn test_account_switch_refreshes_balance() {
    let h = harness();
    h.balances.set_balance("0xSecond", 2_000_000_000_000_000_000);
    connected(&h).await;

    h.jar.apply_account_state(AccountState::connected("0xSecond", 1001)).await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.account.as_deref(), Some("0xSecond"));
    assert_eq!(state.balance.unwrap().formatted(), "2.0 KAIA");
}

#[tokio::test]
async fn test_wallet_side_disconnect() {
    let h = harness();
    connected(&h).await;

    h.jar.apply_account_state(AccountState::disconnected()).await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
    assert!(state.account.is_none());
}

#[tokio::test]
async fn test_follow_account_updates() {
    let h = harness();
    let follower = h.jar.follow_account_updates().expect("mock connector pushes");
    connected(&h).await;

    h.connector.push_account(AccountState::connected("0xPushed", 1001));
    let state = wait_until(&h.jar, |s| s.account.as_deref() == Some("0xPushed")).await;
    assert!(state.is_connected());

    follower.abort();
}

#[tokio::test]
async fn test_sync_account_state_polls_connector() {
    let h = harness_with(MockConnector::new().without_push(), MockBalanceQuery::new(), MockTransactionSender::new());
    assert!(h.jar.follow_account_updates().is_none());

    h.connector.push_account(AccountState::connected("0xPolled", 8217));
    h.jar.sync_account_state().await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.account.as_deref(), Some("0xPolled"));
    assert_eq!(state.chain_id, Some(8217));
}

// ============================================================================
// Tipping
// ============================================================================

#[tokio::test]
async fn test_invalid_inputs_never_reach_sender() {
    let h = harness();
    connected(&h).await;

    for input in EdgeCaseTipInputs::invalid() {
        h.jar.update_tip_amount(input).await;
        h.jar.submit_tip().await;

        let state = h.jar.snapshot().await;
        let err = state.last_error.unwrap();
        assert_eq!(err.kind, ErrorKind::Validation, "input {input:?}");
        assert_eq!(err.message, Messages::ENGLISH.invalid_amount);
        assert!(!state.pending_transaction);
    }
    assert_eq!(h.sender.calls(), 0);
}

#[tokio::test]
async fn test_submit_while_disconnected_is_rejected() {
    let h = harness();
    h.jar.update_tip_amount("0.01").await;
    h.jar.submit_tip().await;

    let state = h.jar.snapshot().await;
    assert_eq!(state.last_error.unwrap().message, Messages::ENGLISH.not_connected);
    assert_eq!(h.sender.calls(), 0);
}

#[tokio::test]
async fn test_tip_success() {
    let h = harness();
    connected(&h).await;
    h.sender.push_outcome(Ok(TxHash::new("0xHASH")));

    h.jar.update_tip_amount("0.01").await;
    h.jar.submit_tip().await;

    let requests = h.sender.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].to, TIP_RECIPIENT);
    assert_eq!(requests[0].value, U256::from(10_000_000_000_000_000u64));

    let state = h.jar.snapshot().await;
    assert_eq!(state.last_tx_hash, Some(TxHash::new("0xHASH")));
    assert!(!state.pending_transaction);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_valid_edge_inputs_scale_exactly() {
    let h = harness();
    connected(&h).await;

    for (input, expected) in EdgeCaseTipInputs::valid() {
        h.jar.update_tip_amount(input).await;
        h.jar.submit_tip().await;
        assert_eq!(h.sender.requests().last().unwrap().value, U256::from(expected), "input {input:?}");
    }
}

#[tokio::test]
async fn test_tip_failure_without_message_uses_fallback() {
    let h = harness();
    connected(&h).await;
    h.sender
        .push_outcome(Err(CapabilityError::without_message(CapabilityErrorKind::Rejected)));

    h.jar.update_tip_amount("0.01").await;
    h.jar.submit_tip().await;

    let state = h.jar.snapshot().await;
    let err = state.last_error.unwrap();
    assert_eq!(err.kind, ErrorKind::Submission);
    assert_eq!(err.message, "An error occurred while sending.");
    assert!(!state.pending_transaction);
}

#[tokio::test]
async fn test_tip_failure_message_is_verbatim() {
    let h = harness();
    connected(&h).await;
    h.sender.push_outcome(Err(CapabilityError::other("insufficient funds for gas * price + value")));

    h.jar.update_tip_amount("5").await;
    h.jar.submit_tip().await;

    let err = h.jar.snapshot().await.last_error.unwrap();
    assert_eq!(err.message, "insufficient funds for gas * price + value");
}

#[tokio::test]
async fn test_new_attempt_clears_previous_outcome() {
    let h = harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::gated());
    connected(&h).await;
    h.jar.update_tip_amount("0.01").await;

    let first = tokio::spawn({
        let jar = h.jar.clone();
        async move { jar.submit_tip().await }
    });
    h.sender.wait_for_calls(1).await;
    h.sender.resolve(0, Ok(TxHash::new("0xFIRST")));
    first.await.unwrap();
    assert_eq!(h.jar.snapshot().await.last_tx_hash, Some(TxHash::new("0xFIRST")));

    let second = tokio::spawn({
        let jar = h.jar.clone();
        async move { jar.submit_tip().await }
    });
    h.sender.wait_for_calls(2).await;
    let pending = h.jar.snapshot().await;
    assert!(pending.pending_transaction);
    assert!(pending.last_tx_hash.is_none());
    assert!(pending.last_error.is_none());

    h.sender.resolve(1, Ok(TxHash::new("0xSECOND")));
    second.await.unwrap();
}

// ============================================================================
// Races
// ============================================================================

async fn spawn_submit(h: &Harness) -> tokio::task::JoinHandle<()> {
    let jar = h.jar.clone();
    tokio::spawn(async move { jar.submit_tip().await })
}

/// Attempt A is left in flight across a disconnect and reconnect, then
/// attempt B is started in the new session.
async fn two_pending_attempts(h: &Harness) -> (tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
    connected(h).await;
    h.jar.update_tip_amount("0.01").await;

    let a = spawn_submit(h).await;
    h.sender.wait_for_calls(1).await;

    h.jar.disconnect().await;
    let released = h.jar.snapshot().await;
    assert!(!released.pending_transaction);
    connected(h).await;

    let b = spawn_submit(h).await;
    h.sender.wait_for_calls(2).await;
    (a, b)
}

#[tokio::test]
async fn test_submit_while_pending_is_ignored() {
    let h = harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::gated());
    connected(&h).await;
    h.jar.update_tip_amount("0.01").await;

    let first = spawn_submit(&h).await;
    h.sender.wait_for_calls(1).await;
    let before = h.jar.snapshot().await;

    h.jar.submit_tip().await;
    h.jar.update_tip_amount("abc").await;
    h.jar.submit_tip().await;

    let state = h.jar.snapshot().await;
    assert_eq!(h.sender.calls(), 1);
    assert!(state.pending_transaction);
    assert_eq!(state.attempt, before.attempt);
    assert!(state.last_error.is_none());

    h.sender.resolve(0, Ok(TxHash::new("0xONLY")));
    first.await.unwrap();
    let state = h.jar.snapshot().await;
    assert_eq!(state.last_tx_hash, Some(TxHash::new("0xONLY")));
    assert!(state.last_error.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submits_send_once() {
    for _ in 0..50 {
        let h = harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::gated());
        connected(&h).await;
        h.jar.update_tip_amount("0.01").await;

        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let click = || {
            let jar = h.jar.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                jar.submit_tip().await;
            })
        };
        let mut a = click();
        let mut b = click();

        // The accepted submission stays parked on the gate, so the first
        // click to finish is the refused one.
        let a_done = tokio::select! {
            res = &mut a => { res.unwrap(); true }
            res = &mut b => { res.unwrap(); false }
        };
        h.sender.wait_for_calls(1).await;
        assert_eq!(h.sender.calls(), 1);
        assert!(h.jar.snapshot().await.pending_transaction);

        h.sender.resolve(0, Ok(TxHash::new("0xONCE")));
        if a_done { b.await.unwrap() } else { a.await.unwrap() };
        assert_eq!(h.sender.calls(), 1);
        assert_eq!(h.jar.snapshot().await.attempt, 1);
    }
}

#[tokio::test]
async fn test_stale_success_does_not_overwrite_newer_attempt() {
    let h = harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::gated());
    let (a, b) = two_pending_attempts(&h).await;

    h.sender.resolve(1, Ok(TxHash::new("0xB")));
    b.await.unwrap();
    h.sender.resolve(0, Ok(TxHash::new("0xA")));
    a.await.unwrap();

    let state = h.jar.snapshot().await;
    assert_eq!(state.attempt, 3);
    assert_eq!(state.last_tx_hash, Some(TxHash::new("0xB")));
    assert!(!state.pending_transaction);
}

#[tokio::test]
async fn test_stale_failure_does_not_overwrite_newer_attempt() {
    let h = harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::gated());
    let (a, b) = two_pending_attempts(&h).await;

    h.sender.resolve(1, Ok(TxHash::new("0xB")));
    b.await.unwrap();
    h.sender.resolve(0, Err(CapabilityError::rejected("late rejection")));
    a.await.unwrap();

    let state = h.jar.snapshot().await;
    assert_eq!(state.last_tx_hash, Some(TxHash::new("0xB")));
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_stale_result_does_not_resolve_newer_pending_attempt() {
    let h = harness_with(MockConnector::new(), MockBalanceQuery::new(), MockTransactionSender::gated());
    let (a, b) = two_pending_attempts(&h).await;

    h.sender.resolve(0, Ok(TxHash::new("0xA")));
    a.await.unwrap();

    let state = h.jar.snapshot().await;
    assert!(state.pending_transaction);
    assert!(state.last_tx_hash.is_none());

    h.sender.resolve(1, Ok(TxHash::new("0xB")));
    b.await.unwrap();
    assert_eq!(h.jar.snapshot().await.last_tx_hash, Some(TxHash::new("0xB")));
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_no_snapshot_mixes_pending_with_its_outcome() {
    let h = harness();
    let mut events = h.jar.subscribe();

    connected(&h).await;
    h.jar.update_tip_amount("0.01").await;
    h.jar.submit_tip().await;
    h.sender.push_outcome(Err(CapabilityError::other("boom")));
    h.jar.submit_tip().await;
    h.jar.update_tip_amount("abc").await;
    h.jar.submit_tip().await;
    h.jar.disconnect().await;

    let mut last_revision = 0;
    let mut saw_pending = false;
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.revision, last_revision + 1);
        last_revision = event.revision;
        let state = &event.state;
        assert!(state.invariants_hold(), "broken snapshot: {state:?}");
        if state.pending_transaction {
            saw_pending = true;
            assert!(state.last_tx_hash.is_none());
            assert!(state.last_error.is_none());
        }
    }
    assert!(saw_pending);
    assert_eq!(last_revision, h.jar.snapshot().await.revision);
}
