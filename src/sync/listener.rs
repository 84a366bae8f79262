use super::types::{DebugInfo, ProgressReport, SyncStatusUpdate};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Number of undelivered updates a `SyncProgress` buffers
pub const SYNC_STATUS_BUFFER: usize = 4;

/// Callbacks a wallet's network sync engine invokes
///
/// Called synchronously on the engine's own thread, so implementations must
/// return immediately.
pub trait SyncProgressListener: Send + Sync {
    fn on_sync_started(&self);

    fn on_peer_connected_or_disconnected(&self, connected_peers: i32);

    fn on_cfilters_fetch_progress(&self, report: &ProgressReport);

    fn on_headers_fetch_progress(&self, report: &ProgressReport);

    fn on_address_discovery_progress(&self, report: &ProgressReport);

    fn on_headers_rescan_progress(&self, report: &ProgressReport);

    fn on_sync_completed(&self);

    fn on_sync_canceled(&self, will_restart: bool);

    fn on_sync_ended_with_error(&self, err: &(dyn std::error::Error + Send + Sync));

    fn debug(&self, info: &DebugInfo);
}

/// Listener that republishes engine callbacks as a stream of updates
///
/// Updates go into a bounded buffer. When it is full the new update is
/// dropped; buffered updates are never evicted and the engine never waits.
#[derive(Clone)]
pub struct SyncProgress {
    sender: mpsc::Sender<SyncStatusUpdate>,
}

impl SyncProgress {
    pub fn new() -> (Self, mpsc::Receiver<SyncStatusUpdate>) {
        let (sender, receiver) = mpsc::channel(SYNC_STATUS_BUFFER);
        (Self { sender }, receiver)
    }

    fn send_notification(&self, update: SyncStatusUpdate) {
        match self.sender.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(update)) => {
                log::trace!("Sync status buffer full, dropping {:?}", update.stage());
            }
            Err(TrySendError::Closed(update)) => {
                log::trace!("Sync status receiver gone, dropping {:?}", update.stage());
            }
        }
    }
}

impl SyncProgressListener for SyncProgress {
    fn on_sync_started(&self) {
        self.send_notification(SyncStatusUpdate::Started);
    }

    fn on_peer_connected_or_disconnected(&self, connected_peers: i32) {
        self.send_notification(SyncStatusUpdate::PeersConnected(connected_peers));
    }

    fn on_cfilters_fetch_progress(&self, report: &ProgressReport) {
        self.send_notification(SyncStatusUpdate::CFiltersFetchProgress(report.clone()));
    }

    fn on_headers_fetch_progress(&self, report: &ProgressReport) {
        self.send_notification(SyncStatusUpdate::HeadersFetchProgress(report.clone()));
    }

    fn on_address_discovery_progress(&self, report: &ProgressReport) {
        self.send_notification(SyncStatusUpdate::AddressDiscoveryProgress(report.clone()));
    }

    fn on_headers_rescan_progress(&self, report: &ProgressReport) {
        self.send_notification(SyncStatusUpdate::HeadersRescanProgress(report.clone()));
    }

    fn on_sync_completed(&self) {
        self.send_notification(SyncStatusUpdate::Completed);
    }

    fn on_sync_canceled(&self, _will_restart: bool) {
        self.send_notification(SyncStatusUpdate::Canceled);
    }

    // Errors and debug timings are not forwarded to consumers.
    fn on_sync_ended_with_error(&self, err: &(dyn std::error::Error + Send + Sync)) {
        log::debug!("Sync ended with error: {}", err);
    }

    fn debug(&self, _info: &DebugInfo) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_full_buffer_drops_newest() {
        let (listener, mut receiver) = SyncProgress::new();

        listener.on_sync_started();
        for peers in 1..=10 {
            listener.on_peer_connected_or_disconnected(peers);
        }

        assert_eq!(receiver.try_recv().unwrap(), SyncStatusUpdate::Started);
        assert_eq!(receiver.try_recv().unwrap(), SyncStatusUpdate::PeersConnected(1));
        assert_eq!(receiver.try_recv().unwrap(), SyncStatusUpdate::PeersConnected(2));
        assert_eq!(receiver.try_recv().unwrap(), SyncStatusUpdate::PeersConnected(3));
        assert!(receiver.try_recv().is_err());

        // Space freed up again
        listener.on_sync_completed();
        assert_eq!(receiver.try_recv().unwrap(), SyncStatusUpdate::Completed);
    }

    #[test]
    fn test_error_and_debug_are_not_forwarded() {
        let (listener, mut receiver) = SyncProgress::new();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "peer banned");

        listener.on_sync_ended_with_error(&err);
        listener.debug(&DebugInfo::default());
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_progress_payload_is_forwarded() {
        let (listener, mut receiver) = SyncProgress::new();
        let report = ProgressReport::estimate(10, 40, Duration::from_secs(2));

        listener.on_cfilters_fetch_progress(&report);
        listener.on_headers_rescan_progress(&report);

        assert_eq!(
            receiver.try_recv().unwrap(),
            SyncStatusUpdate::CFiltersFetchProgress(report.clone())
        );
        assert_eq!(
            receiver.try_recv().unwrap(),
            SyncStatusUpdate::HeadersRescanProgress(report)
        );
    }

    #[test]
    fn test_closed_receiver_does_not_panic() {
        let (listener, receiver) = SyncProgress::new();
        drop(receiver);
        listener.on_sync_started();
        listener.on_sync_canceled(true);
    }
}
