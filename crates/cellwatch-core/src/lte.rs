//! LTE cell tracking.
//!
//! Runs once per cycle whenever the classifier reports an LTE-family
//! network (NSA included — the NSA anchor is an LTE cell). Builds the
//! primary cell from the flat fields, then parses the packed
//! secondary-cell records, and finally sweeps whatever the sample no
//! longer mentions.

use crate::cell::{CellId, CellRole, CellTable, Tracked};
use crate::fields::DeviceInfo;
use crate::metric::Metric;
use crate::value::{one_of, ParseOpts, Value};

/// One tracked LTE cell.
#[derive(Debug, Default)]
pub struct LteCell {
    pub id: CellId,
    pub role: CellRole,
    pub band: Value<i32>,
    /// MHz; -1 means unknown.
    pub bandwidth: Value<f32>,
    pub rssi: Metric<i32>,
    pub rsrp1: Metric<f32>,
    pub rsrp2: Metric<f32>,
    pub rsrp3: Metric<f32>,
    pub rsrp4: Metric<f32>,
    pub rsrq: Metric<f32>,
    pub sinr1: Metric<f32>,
    pub sinr2: Metric<f32>,
    pub sinr3: Metric<f32>,
    pub sinr4: Metric<f32>,
}

impl LteCell {
    pub fn is_primary(&self) -> bool {
        self.role == CellRole::Primary
    }

    /// EARFCN is the LTE name for the identity's frequency channel.
    pub fn earfcn(&self) -> i32 {
        self.id.freq
    }
}

impl Tracked for LteCell {
    fn new(id: CellId) -> Self {
        Self { id, ..Default::default() }
    }

    fn id(&self) -> CellId {
        self.id
    }
}

/// LTE-family state that persists across update cycles.
#[derive(Debug, Default)]
pub struct LteTracker {
    pub cells: CellTable<LteCell>,
    pub tx_power: Metric<i32>,
}

impl LteTracker {
    /// Apply one raw sample.
    pub fn update(&mut self, info: &DeviceInfo) {
        self.tx_power.update(&info.tx_power, ParseOpts::new());

        // Primary cell. The PCI is hex on the wire; this firmware reports
        // the serving EARFCN in wan_active_band, with the CA PCell
        // frequency as fallback.
        let mut pci = Value::<i32>::default();
        let mut freq = Value::<i32>::default();
        pci.set(&info.lte_pci, ParseOpts::new().hex());
        freq.set(
            one_of(&[info.wan_active_band.as_str(), info.lte_ca_pcell_freq.as_str()]),
            ParseOpts::new(),
        );

        let cell = self.cells.entry(CellId { pci: pci.get(), freq: freq.get() });
        cell.role = CellRole::Primary;
        cell.band.set(
            one_of(&[info.lte_ca_pcell_band.as_str(), info.lte_band.as_str()]),
            ParseOpts::new(),
        );
        cell.bandwidth.set(
            one_of(&[info.lte_ca_pcell_bandwidth.as_str(), info.bandwidth.as_str()]),
            ParseOpts::new().remove(&["MHz"]),
        );
        cell.rssi.update(&info.lte_rssi, ParseOpts::new());
        cell.rsrp1.update(&info.lte_rsrp_1, ParseOpts::new());
        cell.rsrp2.update(&info.lte_rsrp_2, ParseOpts::new());
        cell.rsrp3.update(&info.lte_rsrp_3, ParseOpts::new());
        cell.rsrp4.update(&info.lte_rsrp_4, ParseOpts::new());
        cell.rsrq.update(&info.lte_rsrq, ParseOpts::new());
        cell.sinr1.update(&info.lte_snr_1, ParseOpts::new());
        cell.sinr2.update(&info.lte_snr_2, ParseOpts::new());
        cell.sinr3.update(&info.lte_snr_3, ParseOpts::new());
        cell.sinr4.update(&info.lte_snr_4, ParseOpts::new());

        if info.lte_multi_ca_scell_info.is_empty() {
            // No secondary cells this cycle; the common non-CA case.
            self.cells.sweep_orphans();
            return;
        }

        self.update_scells(info);
        self.cells.sweep_orphans();
    }

    /// Parse the packed secondary-cell records.
    ///
    /// `lte_multi_ca_scell_info` is `;`-separated records of `,`-separated
    /// fields; `lte_multi_ca_scell_sig_info` carries the matching signal
    /// records at the same indices. A record with too few fields is
    /// skipped without affecting its siblings.
    fn update_scells(&mut self, info: &DeviceInfo) {
        let scell_infos: Vec<&str> = info
            .lte_multi_ca_scell_info
            .split(';')
            .filter(|s| !s.is_empty())
            .collect();
        let sig_infos: Vec<&str> = info
            .lte_multi_ca_scell_sig_info
            .split(';')
            .filter(|s| !s.is_empty())
            .collect();

        for (i, record) in scell_infos.iter().enumerate() {
            let parts: Vec<&str> = record.split(',').collect();
            if parts.len() < 6 {
                tracing::debug!(record, "short LTE scell record skipped");
                continue;
            }

            // SCell PCI and EARFCN are plain decimal here, unlike the
            // primary's hex PCI.
            let mut pci = Value::<i32>::default();
            let mut freq = Value::<i32>::default();
            pci.set(parts[1], ParseOpts::new());
            freq.set(parts[4], ParseOpts::new());

            let cell = self.cells.entry(CellId { pci: pci.get(), freq: freq.get() });
            cell.role = CellRole::Secondary;
            cell.band.set(parts[3], ParseOpts::new());
            cell.bandwidth.set(parts[5], ParseOpts::new());

            if let Some(sig) = sig_infos.get(i) {
                let sig_parts: Vec<&str> = sig.split(',').collect();
                if sig_parts.len() >= 3 {
                    cell.rsrp1.update(sig_parts[0], ParseOpts::new().remove(&["0.0", "-44.0"]));
                    cell.rsrq.update(sig_parts[1], ParseOpts::new().remove(&["0.0"]));
                    // In theory 0.0 could be a valid SINR value.
                    cell.sinr1.update(sig_parts[2], ParseOpts::new().remove(&["0.0"]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_sample() -> DeviceInfo {
        DeviceInfo {
            network_type: "LTE".into(),
            lte_pci: "16a".into(),
            wan_active_band: "1300".into(),
            lte_band: "3".into(),
            bandwidth: "20MHz".into(),
            lte_rssi: "-60".into(),
            lte_rsrp_1: "-85.5".into(),
            lte_rsrp_2: "-87.0".into(),
            lte_rsrq: "-9.5".into(),
            lte_snr_1: "12.3".into(),
            tx_power: "14".into(),
            ..Default::default()
        }
    }

    #[test]
    fn primary_cell_identity_decodes_hex_pci() {
        let mut lte = LteTracker::default();
        lte.update(&base_sample());

        assert_eq!(lte.cells.len(), 1);
        let cell = lte.cells.iter().next().unwrap();
        assert_eq!(cell.id.pci, 0x16a);
        assert_eq!(cell.id.freq, 1300);
        assert_eq!(cell.earfcn(), 1300);
        assert!(cell.is_primary());
        assert_eq!(cell.band.get(), 3);
        assert_eq!(cell.bandwidth.get(), 20.0);
        assert_eq!(cell.rsrp1.current(), -85.5);
        assert_eq!(lte.tx_power.current(), 14);
    }

    #[test]
    fn ca_pcell_fields_take_precedence() {
        let mut info = base_sample();
        info.lte_ca_pcell_band = "7".into();
        info.lte_ca_pcell_bandwidth = "15 MHz".into();

        let mut lte = LteTracker::default();
        lte.update(&info);

        let cell = lte.cells.iter().next().unwrap();
        assert_eq!(cell.band.get(), 7);
        assert_eq!(cell.bandwidth.get(), 15.0);
    }

    #[test]
    fn scells_parse_with_signal_records() {
        let mut info = base_sample();
        info.lte_multi_ca_scell_info = "1,101,0,7,2850,15;2,102,0,20,6300,10".into();
        info.lte_multi_ca_scell_sig_info = "-92.5,-10.0,8.0;-99.0,-12.5,3.5".into();

        let mut lte = LteTracker::default();
        lte.update(&info);

        // Primary plus two secondaries.
        assert_eq!(lte.cells.len(), 3);
        let scells: Vec<&LteCell> = lte.cells.iter().filter(|c| !c.is_primary()).collect();
        assert_eq!(scells.len(), 2);
        assert_eq!(scells[0].id, CellId { pci: 101, freq: 2850 });
        assert_eq!(scells[0].band.get(), 7);
        assert_eq!(scells[0].bandwidth.get(), 15.0);
        assert_eq!(scells[0].rsrp1.current(), -92.5);
        assert_eq!(scells[0].rsrq.current(), -10.0);
        assert_eq!(scells[0].sinr1.current(), 8.0);
        assert_eq!(scells[1].id, CellId { pci: 102, freq: 6300 });
    }

    #[test]
    fn scell_sentinel_values_do_not_update_metrics() {
        let mut info = base_sample();
        info.lte_multi_ca_scell_info = "1,101,0,7,2850,15".into();
        info.lte_multi_ca_scell_sig_info = "0.0,0.0,0.0".into();

        let mut lte = LteTracker::default();
        lte.update(&info);

        let scell = lte.cells.iter().find(|c| !c.is_primary()).unwrap();
        assert!(!scell.rsrp1.ok());
        assert!(!scell.rsrq.ok());
        assert!(!scell.sinr1.ok());

        // -44.0 is the other RSRP "no data" sentinel.
        info.lte_multi_ca_scell_sig_info = "-44.0,-10.0,8.0".into();
        lte.update(&info);
        let scell = lte.cells.iter().find(|c| !c.is_primary()).unwrap();
        assert!(!scell.rsrp1.ok());
        assert!(scell.rsrq.ok());
    }

    #[test]
    fn malformed_scell_record_is_skipped() {
        let mut info = base_sample();
        info.lte_multi_ca_scell_info = "1,101,0,7;2,102,0,20,6300,10".into();

        let mut lte = LteTracker::default();
        lte.update(&info);

        // First record has too few fields; the second still parses.
        assert_eq!(lte.cells.len(), 2);
        assert!(lte.cells.iter().any(|c| c.id.pci == 102));
        assert!(!lte.cells.iter().any(|c| c.id.pci == 101));
    }

    #[test]
    fn vanished_scell_is_swept() {
        let mut info = base_sample();
        info.lte_multi_ca_scell_info = "1,101,0,7,2850,15".into();

        let mut lte = LteTracker::default();
        lte.update(&info);
        assert_eq!(lte.cells.len(), 2);

        // Next cycle the router dropped the secondary carrier.
        lte.update(&base_sample());
        assert_eq!(lte.cells.len(), 1);
        assert!(lte.cells.iter().next().unwrap().is_primary());
    }

    #[test]
    fn histories_accumulate_across_cycles() {
        let info = base_sample();
        let mut lte = LteTracker::default();
        lte.update(&info);
        lte.update(&info);
        lte.update(&info);

        let cell = lte.cells.iter().next().unwrap();
        assert_eq!(cell.rsrp1.updates(), 3);
        assert_eq!(cell.rsrp1.average(), -85.5f32 as f64);
    }

    #[test]
    fn garbled_field_keeps_previous_metric() {
        let mut lte = LteTracker::default();
        lte.update(&base_sample());

        let mut bad = base_sample();
        bad.lte_rsrp_1 = "--".into();
        lte.update(&bad);

        let cell = lte.cells.iter().next().unwrap();
        assert_eq!(cell.rsrp1.updates(), 1);
        assert_eq!(cell.rsrp1.current(), -85.5);
    }
}
