//! Sync Progress Integration Tests
//!
//! Drives a wallet's sync notifier the way a network sync engine would and
//! checks what attached consumers observe.
//!
//! Run with: cargo test --test sync_progress_test -- --nocapture

mod common;

use assets_core::{
    AssetType, PassphraseType, ProgressReport, SyncProgress, SyncProgressListener, SyncStage,
    SyncStatusUpdate, WalletError,
};
use common::TestEnvironment;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[tokio::test]
async fn test_consumer_reads_events_in_order() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let wallet = env
        .manager
        .create_wallet(AssetType::Btc, "syncing", "1234", PassphraseType::Pin)?;

    let (listener, mut updates) = SyncProgress::new();
    wallet.add_sync_progress_listener(Arc::new(listener), "ui")?;

    let engine = wallet.sync_notifier();
    engine.on_sync_started();
    engine.on_peer_connected_or_disconnected(3);
    engine.on_sync_completed();

    assert_eq!(updates.recv().await, Some(SyncStatusUpdate::Started));
    assert_eq!(updates.recv().await, Some(SyncStatusUpdate::PeersConnected(3)));
    assert_eq!(updates.recv().await, Some(SyncStatusUpdate::Completed));
    assert!(updates.try_recv().is_err());

    Ok(())
}

#[test]
fn test_burst_never_blocks_the_engine() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let wallet = env
        .manager
        .create_wallet(AssetType::Dcr, "burst", "1234", PassphraseType::Pin)?;

    let (listener, mut updates) = SyncProgress::new();
    wallet.add_sync_progress_listener(Arc::new(listener), "slow-consumer")?;

    // Engine thread emits 100 updates while nobody drains the buffer
    let engine_wallet = Arc::clone(&wallet);
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    thread::spawn(move || {
        let engine = engine_wallet.sync_notifier();
        for peers in 0..100 {
            engine.on_peer_connected_or_disconnected(peers);
        }
        done_tx.send(()).ok();
    });

    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("sync engine must not block on a full buffer");

    // Oldest four kept, later ones dropped
    let mut received = Vec::new();
    while let Ok(update) = updates.try_recv() {
        received.push(update);
    }
    assert_eq!(
        received,
        (0..4).map(SyncStatusUpdate::PeersConnected).collect::<Vec<_>>()
    );

    // Notifier still knows the latest peer count
    assert_eq!(wallet.sync_notifier().connected_peers(), 99);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_consumer_sees_ordered_subsequence() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let wallet = env
        .manager
        .create_wallet(AssetType::Btc, "ordered", "1234", PassphraseType::Pin)?;

    let (listener, mut updates) = SyncProgress::new();
    wallet.add_sync_progress_listener(Arc::new(listener), "ui")?;

    let engine_wallet = Arc::clone(&wallet);
    let engine = thread::spawn(move || {
        let engine = engine_wallet.sync_notifier();
        engine.on_sync_started();
        for height in 1..=200u64 {
            let report = ProgressReport::estimate(height, 200, Duration::from_millis(height * 10));
            engine.on_headers_fetch_progress(&report);
        }
        engine.on_sync_completed();
    });

    let mut heights = Vec::new();
    let mut first = None;
    while let Ok(Some(update)) = tokio::time::timeout(Duration::from_millis(500), updates.recv()).await {
        first.get_or_insert(update.stage());
        if let Some(report) = update.progress_report() {
            heights.push(report.current);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    engine.join().expect("engine thread panicked");

    // Gaps are allowed, reordering is not
    assert_eq!(first, Some(SyncStage::Started));
    assert!(heights.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(wallet.sync_notifier().is_synced());

    Ok(())
}

#[test]
fn test_listener_ids_are_unique_per_wallet() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let first = env
        .manager
        .create_wallet(AssetType::Btc, "one", "1234", PassphraseType::Pin)?;
    let second = env
        .manager
        .create_wallet(AssetType::Btc, "two", "1234", PassphraseType::Pin)?;

    let (listener, _updates) = SyncProgress::new();
    first.add_sync_progress_listener(Arc::new(listener.clone()), "ui")?;
    second.add_sync_progress_listener(Arc::new(listener.clone()), "ui")?;

    assert!(matches!(
        first.add_sync_progress_listener(Arc::new(listener), "ui"),
        Err(WalletError::ListenerExists(_))
    ));

    first.remove_sync_progress_listener("ui");
    assert_eq!(first.sync_notifier().listener_count(), 0);
    assert_eq!(second.sync_notifier().listener_count(), 1);

    Ok(())
}

#[test]
fn test_canceled_sync_can_restart() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let wallet = env
        .manager
        .create_wallet(AssetType::Ltc, "restart", "1234", PassphraseType::Pin)?;

    let (listener, mut updates) = SyncProgress::new();
    wallet.add_sync_progress_listener(Arc::new(listener), "ui")?;

    let engine = wallet.sync_notifier();
    engine.on_sync_started();
    engine.on_sync_canceled(true);
    engine.on_sync_started();

    let stages: Vec<SyncStage> = std::iter::from_fn(|| updates.try_recv().ok())
        .map(|update| update.stage())
        .collect();
    assert_eq!(stages, vec![SyncStage::Started, SyncStage::Canceled, SyncStage::Started]);
    assert!(engine.is_syncing());

    Ok(())
}

#[test]
fn test_sync_error_produces_no_event() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let wallet = env
        .manager
        .create_wallet(AssetType::Btc, "failing", "1234", PassphraseType::Pin)?;

    let (listener, mut updates) = SyncProgress::new();
    wallet.add_sync_progress_listener(Arc::new(listener), "ui")?;

    let engine = wallet.sync_notifier();
    engine.on_sync_started();
    let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "all peers lost");
    engine.on_sync_ended_with_error(&err);

    assert_eq!(updates.try_recv().ok(), Some(SyncStatusUpdate::Started));
    assert!(updates.try_recv().is_err());
    assert_eq!(engine.current_stage(), SyncStage::Idle);

    Ok(())
}
