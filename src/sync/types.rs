//! Sync status events and progress reports

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload-free sync stage, also used to track a wallet's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStage {
    Idle,
    Started,
    PeersConnected,
    CFiltersFetchProgress,
    HeadersFetchProgress,
    AddressDiscoveryProgress,
    HeadersRescanProgress,
    Completed,
    Canceled,
}

impl SyncStage {
    pub fn is_syncing(&self) -> bool {
        !matches!(self, SyncStage::Idle | SyncStage::Completed | SyncStage::Canceled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncStatusUpdate {
    Started,
    PeersConnected(i32),
    CFiltersFetchProgress(ProgressReport),
    HeadersFetchProgress(ProgressReport),
    AddressDiscoveryProgress(ProgressReport),
    HeadersRescanProgress(ProgressReport),
    Completed,
    Canceled,
}

impl SyncStatusUpdate {
    pub fn stage(&self) -> SyncStage {
        match self {
            SyncStatusUpdate::Started => SyncStage::Started,
            SyncStatusUpdate::PeersConnected(_) => SyncStage::PeersConnected,
            SyncStatusUpdate::CFiltersFetchProgress(_) => SyncStage::CFiltersFetchProgress,
            SyncStatusUpdate::HeadersFetchProgress(_) => SyncStage::HeadersFetchProgress,
            SyncStatusUpdate::AddressDiscoveryProgress(_) => SyncStage::AddressDiscoveryProgress,
            SyncStatusUpdate::HeadersRescanProgress(_) => SyncStage::HeadersRescanProgress,
            SyncStatusUpdate::Completed => SyncStage::Completed,
            SyncStatusUpdate::Canceled => SyncStage::Canceled,
        }
    }

    pub fn progress_report(&self) -> Option<&ProgressReport> {
        match self {
            SyncStatusUpdate::CFiltersFetchProgress(report)
            | SyncStatusUpdate::HeadersFetchProgress(report)
            | SyncStatusUpdate::AddressDiscoveryProgress(report)
            | SyncStatusUpdate::HeadersRescanProgress(report) => Some(report),
            _ => None,
        }
    }
}

/// Progress of one fetch / discovery / rescan stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Percent of the current stage, 0..=100
    pub stage_progress: u8,
    /// Percent of the whole sync, 0..=100
    pub total_sync_progress: u8,
    pub current: u64,
    pub target: u64,
    /// Items (filters, headers, blocks) per second
    pub rate: f64,
    pub eta: Duration,
}

impl ProgressReport {
    /// Estimate stage progress from processed / target counts
    pub fn estimate(current: u64, target: u64, elapsed: Duration) -> Self {
        let current = current.min(target);
        let stage_progress = if target == 0 {
            100
        } else {
            ((current as u128 * 100) / target as u128) as u8
        };

        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { current as f64 / secs } else { 0.0 };
        let remaining = target - current;
        let eta = if remaining == 0 {
            Duration::ZERO
        } else if rate > 0.0 {
            Duration::try_from_secs_f64(remaining as f64 / rate).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        };

        Self {
            stage_progress,
            total_sync_progress: stage_progress,
            current,
            target,
            rate,
            eta,
        }
    }

    /// Set overall progress when the stage is one of several
    pub fn with_total_progress(mut self, total_sync_progress: u8) -> Self {
        self.total_sync_progress = total_sync_progress.min(100);
        self
    }
}

/// Timing details passed to the debug sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub total_time_elapsed: Duration,
    pub total_time_remaining: Duration,
    pub current_stage_time_elapsed: Duration,
    pub current_stage_time_remaining: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_progress() {
        let report = ProgressReport::estimate(250, 1_000, Duration::from_secs(5));
        assert_eq!(report.stage_progress, 25);
        assert_eq!(report.rate, 50.0);
        assert_eq!(report.eta, Duration::from_secs(15));
    }

    #[test]
    fn test_estimate_edge_cases() {
        let done = ProgressReport::estimate(10, 0, Duration::from_secs(1));
        assert_eq!(done.stage_progress, 100);
        assert_eq!(done.eta, Duration::ZERO);

        let stalled = ProgressReport::estimate(0, 100, Duration::ZERO);
        assert_eq!(stalled.stage_progress, 0);
        assert_eq!(stalled.eta, Duration::MAX);

        let overshoot = ProgressReport::estimate(150, 100, Duration::from_secs(1));
        assert_eq!(overshoot.stage_progress, 100);
    }

    #[test]
    fn test_estimate_eta_saturates() {
        let report = ProgressReport::estimate(1, u64::MAX, Duration::from_secs(1_000_000_000));
        assert_eq!(report.stage_progress, 0);
        assert_eq!(report.eta, Duration::MAX);
    }

    #[test]
    fn test_stage_mapping() {
        let report = ProgressReport::estimate(1, 2, Duration::from_secs(1)).with_total_progress(140);
        assert_eq!(report.total_sync_progress, 100);

        let update = SyncStatusUpdate::HeadersFetchProgress(report);
        assert_eq!(update.stage(), SyncStage::HeadersFetchProgress);
        assert!(update.progress_report().is_some());
        assert!(SyncStatusUpdate::PeersConnected(3).progress_report().is_none());
        assert!(update.stage().is_syncing());
        assert!(!SyncStage::Canceled.is_syncing());
    }
}
