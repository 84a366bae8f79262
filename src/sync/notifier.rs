use super::listener::SyncProgressListener;
use super::types::{DebugInfo, ProgressReport, SyncStage};
use crate::error::WalletError;
use crate::wallet::{read_guard, write_guard, WalletId};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy)]
struct SyncState {
    stage: SyncStage,
    connected_peers: i32,
}

/// Per-wallet fan-out between the sync engine and attached listeners
///
/// Remembers the wallet's current stage so a consumer whose buffer dropped
/// updates can still ask where the sync is.
pub struct SyncNotifier {
    wallet_id: WalletId,
    listeners: RwLock<BTreeMap<String, Arc<dyn SyncProgressListener>>>,
    state: RwLock<SyncState>,
}

impl SyncNotifier {
    pub fn new(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            listeners: RwLock::new(BTreeMap::new()),
            state: RwLock::new(SyncState {
                stage: SyncStage::Idle,
                connected_peers: 0,
            }),
        }
    }

    pub fn add_listener(
        &self,
        unique_id: &str,
        listener: Arc<dyn SyncProgressListener>,
    ) -> Result<(), WalletError> {
        let mut listeners = write_guard(&self.listeners);
        if listeners.contains_key(unique_id) {
            return Err(WalletError::ListenerExists(unique_id.to_string()));
        }
        listeners.insert(unique_id.to_string(), listener);
        log::debug!("Wallet {}: added sync listener '{}'", self.wallet_id, unique_id);
        Ok(())
    }

    pub fn remove_listener(&self, unique_id: &str) {
        if write_guard(&self.listeners).remove(unique_id).is_some() {
            log::debug!("Wallet {}: removed sync listener '{}'", self.wallet_id, unique_id);
        }
    }

    pub fn listener_count(&self) -> usize {
        read_guard(&self.listeners).len()
    }

    pub fn current_stage(&self) -> SyncStage {
        read_guard(&self.state).stage
    }

    pub fn connected_peers(&self) -> i32 {
        read_guard(&self.state).connected_peers
    }

    pub fn is_syncing(&self) -> bool {
        self.current_stage().is_syncing()
    }

    pub fn is_synced(&self) -> bool {
        self.current_stage() == SyncStage::Completed
    }

    fn set_stage(&self, stage: SyncStage) {
        write_guard(&self.state).stage = stage;
    }

    fn notify(&self, callback: impl Fn(&dyn SyncProgressListener)) {
        // Snapshot so listeners run without holding the registry lock
        let listeners: Vec<_> = read_guard(&self.listeners).values().cloned().collect();
        for listener in listeners {
            callback(listener.as_ref());
        }
    }
}

impl SyncProgressListener for SyncNotifier {
    fn on_sync_started(&self) {
        log::info!("Wallet {}: sync started", self.wallet_id);
        self.set_stage(SyncStage::Started);
        self.notify(|l| l.on_sync_started());
    }

    fn on_peer_connected_or_disconnected(&self, connected_peers: i32) {
        {
            let mut state = write_guard(&self.state);
            state.connected_peers = connected_peers;
            if state.stage.is_syncing() {
                state.stage = SyncStage::PeersConnected;
            }
        }
        self.notify(|l| l.on_peer_connected_or_disconnected(connected_peers));
    }

    fn on_cfilters_fetch_progress(&self, report: &ProgressReport) {
        self.set_stage(SyncStage::CFiltersFetchProgress);
        self.notify(|l| l.on_cfilters_fetch_progress(report));
    }

    fn on_headers_fetch_progress(&self, report: &ProgressReport) {
        self.set_stage(SyncStage::HeadersFetchProgress);
        self.notify(|l| l.on_headers_fetch_progress(report));
    }

    fn on_address_discovery_progress(&self, report: &ProgressReport) {
        self.set_stage(SyncStage::AddressDiscoveryProgress);
        self.notify(|l| l.on_address_discovery_progress(report));
    }

    fn on_headers_rescan_progress(&self, report: &ProgressReport) {
        self.set_stage(SyncStage::HeadersRescanProgress);
        self.notify(|l| l.on_headers_rescan_progress(report));
    }

    fn on_sync_completed(&self) {
        log::info!("Wallet {}: sync completed", self.wallet_id);
        self.set_stage(SyncStage::Completed);
        self.notify(|l| l.on_sync_completed());
    }

    fn on_sync_canceled(&self, will_restart: bool) {
        log::info!("Wallet {}: sync canceled (restart: {})", self.wallet_id, will_restart);
        self.set_stage(SyncStage::Canceled);
        self.notify(|l| l.on_sync_canceled(will_restart));
    }

    fn on_sync_ended_with_error(&self, err: &(dyn std::error::Error + Send + Sync)) {
        log::warn!("Wallet {}: sync ended with error: {}", self.wallet_id, err);
        self.set_stage(SyncStage::Idle);
        self.notify(|l| l.on_sync_ended_with_error(err));
    }

    fn debug(&self, info: &DebugInfo) {
        self.notify(|l| l.debug(info));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{SyncProgress, SyncStatusUpdate};
    use std::time::Duration;

    #[test]
    fn test_fans_out_to_every_listener() {
        let notifier = SyncNotifier::new(1);
        let (first, mut first_rx) = SyncProgress::new();
        let (second, mut second_rx) = SyncProgress::new();
        notifier.add_listener("first", Arc::new(first)).unwrap();
        notifier.add_listener("second", Arc::new(second)).unwrap();

        notifier.on_sync_started();

        assert_eq!(first_rx.try_recv().unwrap(), SyncStatusUpdate::Started);
        assert_eq!(second_rx.try_recv().unwrap(), SyncStatusUpdate::Started);
    }

    #[test]
    fn test_duplicate_listener_id_is_rejected() {
        let notifier = SyncNotifier::new(1);
        let (listener, _rx) = SyncProgress::new();
        notifier.add_listener("ui", Arc::new(listener.clone())).unwrap();

        assert!(matches!(
            notifier.add_listener("ui", Arc::new(listener)),
            Err(WalletError::ListenerExists(id)) if id == "ui"
        ));

        notifier.remove_listener("ui");
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_tracks_stage_even_when_buffer_drops() {
        let notifier = SyncNotifier::new(7);
        let (listener, mut rx) = SyncProgress::new();
        notifier.add_listener("slow", Arc::new(listener)).unwrap();
        let report = ProgressReport::estimate(5, 10, Duration::from_secs(1));

        assert_eq!(notifier.current_stage(), SyncStage::Idle);
        notifier.on_sync_started();
        notifier.on_peer_connected_or_disconnected(2);
        for _ in 0..5 {
            notifier.on_headers_fetch_progress(&report);
        }
        notifier.on_sync_completed();

        assert!(notifier.is_synced());
        assert_eq!(notifier.connected_peers(), 2);

        // Consumer only saw the first four updates
        let mut seen = Vec::new();
        while let Ok(update) = rx.try_recv() {
            seen.push(update.stage());
        }
        assert_eq!(
            seen,
            vec![
                SyncStage::Started,
                SyncStage::PeersConnected,
                SyncStage::HeadersFetchProgress,
                SyncStage::HeadersFetchProgress
            ]
        );
    }

    #[test]
    fn test_restart_after_cancel() {
        let notifier = SyncNotifier::new(3);

        notifier.on_sync_started();
        notifier.on_sync_canceled(true);
        assert_eq!(notifier.current_stage(), SyncStage::Canceled);
        assert!(!notifier.is_syncing());

        // Peer churn while idle does not look like a sync
        notifier.on_peer_connected_or_disconnected(4);
        assert_eq!(notifier.current_stage(), SyncStage::Canceled);

        notifier.on_sync_started();
        assert!(notifier.is_syncing());
    }

    #[test]
    fn test_error_resets_to_idle() {
        let notifier = SyncNotifier::new(3);
        notifier.on_sync_started();

        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        notifier.on_sync_ended_with_error(&err);
        assert_eq!(notifier.current_stage(), SyncStage::Idle);
    }
}
