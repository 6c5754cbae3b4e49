//! 5G-NR cell tracking.
//!
//! The NR side needs two defenses the LTE side does not. The router's API
//! keeps stale carrier-aggregation fields around after a CA session ends:
//! `nr_ca_pcell_freq` goes on reporting the previous session's frequency,
//! and old secondary-cell records linger in `nr_multi_ca_scell_info`.
//! CA is therefore only believed when the action channel and the CA PCell
//! frequency agree, and surviving SCell records are additionally checked
//! against the configured band lock.

use crate::cell::{CellId, CellRole, CellTable, Tracked};
use crate::fields::DeviceInfo;
use crate::metric::Metric;
use crate::network::NetworkKind;
use crate::value::{first_number, one_of, ParseOpts, Value};

/// One tracked NR cell.
#[derive(Debug, Default)]
pub struct NrCell {
    pub id: CellId,
    pub role: CellRole,
    pub band: Value<i32>,
    /// MHz; -1 means unknown (always unknown for NSA).
    pub bandwidth: Value<f32>,
    pub rsrp1: Metric<f32>,
    pub rsrp2: Metric<f32>,
    pub rsrq: Metric<f32>,
    pub sinr: Metric<f32>,
}

impl NrCell {
    pub fn is_primary(&self) -> bool {
        self.role == CellRole::Primary
    }

    /// ARFCN is the NR name for the identity's frequency channel.
    pub fn arfcn(&self) -> i32 {
        self.id.freq
    }
}

impl Tracked for NrCell {
    fn new(id: CellId) -> Self {
        Self { id, ..Default::default() }
    }

    fn id(&self) -> CellId {
        self.id
    }
}

/// NR-family state that persists across update cycles.
#[derive(Debug, Default)]
pub struct NrTracker {
    pub cells: CellTable<NrCell>,
}

impl NrTracker {
    /// Apply one raw sample. `net` must be an NR-family classification.
    pub fn update(&mut self, net: NetworkKind, info: &DeviceInfo) {
        if net.is_nr_nsa() && !net.is_nr_nsa_active() {
            // NSA-capable base station but zero NR reception; there is
            // nothing to track until reception returns.
            self.cells.clear();
            self.cells.sweep_orphans();
            return;
        }

        let nsa = net.is_nr_nsa();

        // Stale-CA defense, part one: the CA PCell frequency can outlive
        // the CA session it belonged to. Only trust it while it matches
        // the live action channel.
        let is_ca = info.nr5g_action_channel == info.nr_ca_pcell_freq;

        let mut pci = Value::<i32>::default();
        let mut freq = Value::<i32>::default();
        pci.set(&info.nr5g_pci, ParseOpts::new().hex());
        freq.set(&info.nr5g_action_channel, ParseOpts::new());

        let cell = self.cells.entry(CellId { pci: pci.get(), freq: freq.get() });
        cell.role = CellRole::Primary;

        let band_src = if is_ca {
            &info.nr_ca_pcell_band
        } else if nsa {
            &info.nr5g_action_nsa_band
        } else {
            &info.nr5g_action_band
        };
        cell.band.set(band_src, ParseOpts::new().strip_non_numeric());

        // The shared bandwidth field is unreliable for NSA; force the
        // unknown sentinel there instead of trusting it.
        let bandwidth_src = if nsa { "-1" } else { info.bandwidth.as_str() };
        cell.bandwidth.set(bandwidth_src, ParseOpts::new().strip_non_numeric());

        cell.rsrp1.update(
            one_of(&[info.nr_rx0_rsrp.as_str(), info.z5g_rsrp.as_str()]),
            ParseOpts::new(),
        );
        cell.rsrp2.update(&info.nr_rx1_rsrp, ParseOpts::new());
        cell.rsrq.update(&info.z5g_rsrq, ParseOpts::new());
        cell.sinr.update(&info.z5g_sinr, ParseOpts::new().remove(&["-20.0", "-3276.8"]));

        if !is_ca || info.nr_multi_ca_scell_info.is_empty() {
            self.cells.sweep_orphans();
            return;
        }

        self.update_scells(nsa, info);
        self.cells.sweep_orphans();
    }

    /// Parse the packed secondary-cell records, dropping any whose band is
    /// outside the configured lock.
    ///
    /// Stale-CA defense, part two: even with the channel-equality check
    /// passing, individual records from a previous CA session can survive
    /// in the field. A band that is not currently locked/allowed cannot be
    /// a live secondary cell, so the whole record is discarded.
    fn update_scells(&mut self, nsa: bool, info: &DeviceInfo) {
        let lock = if nsa { &info.nr5g_nsa_band_lock } else { &info.nr5g_sa_band_lock };
        let allowed: Vec<&str> = lock.split(',').collect();

        for record in info.nr_multi_ca_scell_info.split(';').filter(|s| !s.is_empty()) {
            let parts: Vec<&str> = record.split(',').collect();
            if parts.len() < 10 {
                tracing::debug!(record, "short NR scell record skipped");
                continue;
            }

            let band = first_number(parts[3]);
            if !allowed.contains(&band) {
                tracing::debug!(band, "NR scell outside band lock dropped as stale");
                continue;
            }

            let mut pci = Value::<i32>::default();
            let mut freq = Value::<i32>::default();
            pci.set(parts[1], ParseOpts::new());
            freq.set(parts[4], ParseOpts::new());

            let cell = self.cells.entry(CellId { pci: pci.get(), freq: freq.get() });
            cell.role = CellRole::Secondary;
            cell.band.set(band, ParseOpts::new());
            cell.bandwidth.set(parts[5], ParseOpts::new().strip_non_numeric());
            cell.rsrp1.update(parts[7], ParseOpts::new().remove(&["0.0"]));
            cell.rsrq.update(parts[8], ParseOpts::new().remove(&["0.0"]));
            cell.sinr.update(parts[9], ParseOpts::new().remove(&["0.0", "-20.0", "-3276.8"]));
        }
    }
}
