//! End-to-end cluster scenarios, driven over the wire.
//!
//! Each test uses its own base port range so parallel test execution never
//! collides on a listener.

use {
    crate::harness::TestCluster,
    benor_consensus::{BinaryValue, DeliveryOutcome, Vote},
    benor_net::{ProbeStatus, StartOutcome},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ═══════════════════════════════════════════════════════════════════════════
//  1. Unanimous cluster decides in round 0
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_unanimous_cluster_decides_in_round_zero() {
    init_logging();
    let values = [BinaryValue::One, BinaryValue::One, BinaryValue::One];
    let cluster = TestCluster::start(7711, &values, &[]).await;

    let starters = cluster.start_all();
    let snapshots = cluster.await_correct_decisions().await;

    for snapshot in &snapshots {
        assert_eq!(snapshot.decided, Some(true));
        assert_eq!(snapshot.value, Some(BinaryValue::One));
        assert_eq!(snapshot.round, Some(0));
    }
    for starter in starters {
        let response = starter.await.unwrap();
        assert!(
            matches!(
                response,
                benor_net::Response::Start(StartOutcome::Decided {
                    value: BinaryValue::One,
                    round: 0
                })
            ),
            "unexpected start response: {response:?}"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  2. Faulty minority: no round-0 majority, eventual convergence
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_faulty_minority_cluster_converges() {
    init_logging();
    // Process 3 is faulty and silent; the three correct processes start
    // split {0, 0, 1}. Each round-0 tally is 3 votes against a majority
    // threshold of 3, so no process can decide before the randomized
    // fallback aligns the proposals.
    let values = [
        BinaryValue::Zero,
        BinaryValue::Zero,
        BinaryValue::One,
        BinaryValue::Zero, // ignored: process 3 holds no proposal
    ];
    let cluster = TestCluster::start(7721, &values, &[3]).await;

    cluster.start_all();
    let snapshots = cluster.await_correct_decisions().await;

    let decided_value = snapshots[0].value.expect("correct process has a value");
    for snapshot in &snapshots {
        assert_eq!(snapshot.decided, Some(true));
        assert_eq!(snapshot.value, Some(decided_value));
        assert!(
            snapshot.round.expect("correct process has a round") >= 1,
            "a split start cannot decide in round 0: {snapshot:?}"
        );
    }

    // The faulty process never participated and exposes no protocol state.
    let faulty = cluster.wire_snapshot(3).await;
    assert_eq!(faulty.value, None);
    assert_eq!(faulty.decided, None);
    assert_eq!(faulty.round, None);
}

// ═══════════════════════════════════════════════════════════════════════════
//  3. Mid-protocol stop leaves the rest of the cluster intact
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_stopped_process_is_inert_while_others_decide() {
    init_logging();
    let values = [BinaryValue::One, BinaryValue::One, BinaryValue::One];
    let cluster = TestCluster::start(7731, &values, &[]).await;

    // Stop process 0 before the protocol starts anywhere.
    cluster.stop(0).await;
    assert_eq!(cluster.start_and_wait(0).await, StartOutcome::Stopped);

    // The two live processes see each other's One plus their own: 2 of 2
    // needed, decided in round 0 despite the silent stopped peer.
    cluster.spawn_start(1);
    cluster.spawn_start(2);
    let snapshots = cluster.await_decisions(&[1, 2]).await;
    for snapshot in &snapshots {
        assert_eq!(snapshot.value, Some(BinaryValue::One));
        assert_eq!(snapshot.round, Some(0));
    }

    // The stopped process is frozen: deliveries are informational no-ops
    // and its state never advanced.
    assert_eq!(
        cluster.deliver(0, Vote::new(BinaryValue::One, 0)).await,
        DeliveryOutcome::AlreadySettled
    );
    let stopped = cluster.wire_snapshot(0).await;
    assert!(stopped.stopped);
    assert_eq!(stopped.decided, Some(false));
    assert_eq!(stopped.round, Some(0));
}

// ═══════════════════════════════════════════════════════════════════════════
//  4. Wire-level control surface
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_probe_reports_fault_classification() {
    init_logging();
    let values = [BinaryValue::Zero, BinaryValue::Zero];
    let cluster = TestCluster::start(7741, &values, &[1]).await;

    assert_eq!(cluster.probe(0).await, ProbeStatus::Healthy);
    assert_eq!(cluster.probe(1).await, ProbeStatus::Unhealthy);
}

#[tokio::test]
async fn test_stale_round_vote_rejected_over_the_wire() {
    init_logging();
    let values = [BinaryValue::Zero, BinaryValue::One];
    let cluster = TestCluster::start(7751, &values, &[]).await;

    // Nothing started: both processes sit in round 0.
    assert_eq!(
        cluster.deliver(0, Vote::new(BinaryValue::One, 5)).await,
        DeliveryOutcome::InvalidRound { current: 0, got: 5 }
    );
    assert_eq!(
        cluster.deliver(0, Vote::new(BinaryValue::One, 0)).await,
        DeliveryOutcome::Accepted
    );
}

#[tokio::test]
async fn test_settled_process_answers_deliveries_informationally() {
    init_logging();
    let values = [BinaryValue::One];
    let cluster = TestCluster::start(7761, &values, &[]).await;

    // A single-process cluster decides its own value immediately.
    assert_eq!(
        cluster.start_and_wait(0).await,
        StartOutcome::Decided {
            value: BinaryValue::One,
            round: 0
        }
    );
    assert_eq!(
        cluster.deliver(0, Vote::new(BinaryValue::Zero, 0)).await,
        DeliveryOutcome::AlreadySettled
    );
    let snapshot = cluster.wire_snapshot(0).await;
    assert_eq!(snapshot.decided, Some(true));
    assert_eq!(snapshot.value, Some(BinaryValue::One));
}

#[tokio::test]
async fn test_stop_is_acknowledged_unconditionally() {
    init_logging();
    let values = [BinaryValue::Zero, BinaryValue::One];
    // Stopping works the same on correct and faulty processes, and twice
    // in a row.
    let cluster = TestCluster::start(7771, &values, &[1]).await;
    cluster.stop(0).await;
    cluster.stop(0).await;
    cluster.stop(1).await;
    assert!(cluster.wire_snapshot(0).await.stopped);
    assert!(cluster.wire_snapshot(1).await.stopped);
}
