//! One-cycle orchestration over the family trackers.
//!
//! [`SignalInfo`] is the long-lived aggregate the polling loop feeds: it
//! classifies the network type, runs whichever family policies apply, and
//! exposes the tracked cells plus a couple of derived summary figures for
//! rendering.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::fields::DeviceInfo;
use crate::lte::LteTracker;
use crate::network::NetworkKind;
use crate::nr::NrTracker;

const CONNECT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Identity-tracked model of the radio cells currently in use.
#[derive(Debug, Default)]
pub struct SignalInfo {
    network: NetworkKind,
    pub lte: LteTracker,
    pub nr: NrTracker,
    connected_since: Option<DateTime<Utc>>,
}

impl SignalInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one raw sample. Never fails: bad fields degrade to metrics
    /// that skip a cycle and self-correct on the next good sample.
    pub fn update(&mut self, info: &DeviceInfo) -> bool {
        self.network = NetworkKind::classify(&info.network_type, &info.wan_lte_ca);

        self.connected_since =
            NaiveDateTime::parse_from_str(&info.ppp_connect_time, CONNECT_TIME_FORMAT)
                .ok()
                .map(|t| t.and_utc());

        if self.network.is_lte() {
            self.lte.update(info);
        }
        if self.network.is_nr() {
            self.nr.update(self.network, info);
        }

        true
    }

    pub fn network(&self) -> NetworkKind {
        self.network
    }

    /// Time since the PPP session came up, when the router reported it.
    pub fn time_connected(&self) -> Option<TimeDelta> {
        self.connected_since.map(|t| Utc::now() - t)
    }

    /// Sum of the bandwidth of every tracked cell in the active families,
    /// in MHz; -1.0 as soon as any contributing cell has unknown bandwidth.
    pub fn total_bandwidth(&self) -> f32 {
        let mut total = 0.0;
        let mut unknown = false;

        if self.network.is_lte() {
            for cell in self.lte.cells.iter() {
                let bw = cell.bandwidth.get();
                if bw == -1.0 {
                    unknown = true;
                } else {
                    total += bw;
                }
            }
        }
        if self.network.is_nr() {
            for cell in self.nr.cells.iter() {
                let bw = cell.bandwidth.get();
                if bw == -1.0 {
                    unknown = true;
                } else {
                    total += bw;
                }
            }
        }

        if unknown { -1.0 } else { total }
    }

    /// One label per tracked cell, family-prefixed ("B3" / "n78"), with the
    /// bandwidth appended when it is known.
    pub fn band_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();

        if self.network.is_lte() {
            for cell in self.lte.cells.iter() {
                labels.push(band_label('B', cell.band.get(), cell.bandwidth.get()));
            }
        }
        if self.network.is_nr() {
            for cell in self.nr.cells.iter() {
                labels.push(band_label('n', cell.band.get(), cell.bandwidth.get()));
            }
        }

        labels
    }
}

fn band_label(prefix: char, band: i32, bandwidth: f32) -> String {
    if bandwidth > -1.0 {
        format!("{prefix}{band} ({bandwidth} MHz)")
    } else {
        format!("{prefix}{band}")
    }
}
