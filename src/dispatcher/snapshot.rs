use serde::Serialize;

use crate::controller::{PowerMode, PowerSource};

/// Observable controller status after the latest processed input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    /// Controller clock at the latest tick, RFC 3339
    pub clock_time: Option<String>,
    pub source: Option<PowerSource>,
    pub mode: PowerMode,
    pub ac_relay: bool,
    pub dc_relay: bool,
    pub export: bool,
    pub last_tick_epoch: Option<i64>,
    pub in_peak: bool,
    pub ticks: u64,
    pub events: u64,
}

/// Render epoch seconds for logs and snapshots
pub fn format_epoch(epoch: i64) -> String {
    chrono::DateTime::from_timestamp(epoch, 0)
        .map_or_else(|| epoch.to_string(), |dt| dt.to_rfc3339())
}

impl super::EventDispatcher {
    pub(super) fn build_snapshot(&self) -> ControllerSnapshot {
        let state = self.controller.state();
        ControllerSnapshot {
            clock_time: self.last_tick_epoch.map(format_epoch),
            source: state.source(),
            mode: state.mode,
            ac_relay: state.ac_on,
            dc_relay: state.dc_on,
            export: state.export_on,
            last_tick_epoch: self.last_tick_epoch,
            in_peak: self.in_peak,
            ticks: self.ticks,
            events: self.events,
        }
    }

    pub(super) fn publish_snapshot(&self) {
        let snapshot = self.build_snapshot();
        if let Ok(json) = serde_json::to_string(&snapshot) {
            self.logger.debug(&format!("Snapshot {}", json));
        }
        self.snapshot_tx.send_replace(snapshot);
    }

    /// Subscribe to snapshots published after every tick and event
    pub fn subscribe_snapshot(&self) -> tokio::sync::watch::Receiver<ControllerSnapshot> {
        self.snapshot_tx.subscribe()
    }
}
