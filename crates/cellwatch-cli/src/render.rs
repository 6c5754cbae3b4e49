//! Text rendering of the tracked signal state.
//!
//! Pure string builders so the layout is testable without a terminal; the
//! watch loop just repaints whatever these return.

use std::fmt::Write;

use cellwatch_core::metric::Metric;
use cellwatch_core::throughput::ThroughputGauge;
use cellwatch_core::value::Scalar;
use cellwatch_core::SignalInfo;

/// Render the full signal report for one cycle.
pub fn render_signal(signal: &SignalInfo, rx_rate: Option<&ThroughputGauge>) -> String {
    let mut out = String::with_capacity(2048);

    writeln!(out, "Signal Info:").unwrap();
    writeln!(out).unwrap();

    let connected = signal
        .time_connected()
        .map(|d| {
            let secs = d.num_seconds().max(0);
            format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
        })
        .unwrap_or_else(|| "N/A".to_string());
    writeln!(
        out,
        "Network Type: {}  Time Connected: {connected}",
        signal.network().label()
    )
    .unwrap();

    let total_bandwidth = signal.total_bandwidth();
    let bandwidth_suffix = if total_bandwidth > -1.0 {
        format!("  Total Bandwidth: {total_bandwidth} MHz")
    } else {
        String::new()
    };
    writeln!(out, "Bands: {}{bandwidth_suffix}", signal.band_labels().join(" + ")).unwrap();

    if let Some(rate) = rx_rate.filter(|r| r.ok()) {
        writeln!(out, "RX Throughput: {:.2} Mbit/s", rate.mbits_per_sec()).unwrap();
    }
    writeln!(out).unwrap();

    if signal.network().is_lte() {
        render_lte(&mut out, signal);
    }
    if signal.network().is_nr() {
        render_nr(&mut out, signal);
    }
    if signal.network().is_umts() {
        writeln!(out, "UMTS Signal:").unwrap();
        writeln!(out, "- Not implemented -").unwrap();
    }

    out
}

fn render_lte(out: &mut String, signal: &SignalInfo) {
    writeln!(out, "LTE Signal:").unwrap();
    writeln!(out).unwrap();

    for cell in signal.lte.cells.iter() {
        let prefix = if cell.is_primary() { "P" } else { "S" };
        writeln!(
            out,
            "-- {prefix}Cell: B{} - {} / {}{} --",
            cell.band.get(),
            cell.id.pci,
            cell.earfcn(),
            bandwidth_suffix(cell.bandwidth.get())
        )
        .unwrap();

        metric_line(out, if cell.is_primary() { "RSRP1" } else { "RSRP" }, &cell.rsrp1, "dBm");
        if cell.is_primary() {
            metric_line(out, "RSRP2", &cell.rsrp2, "dBm");
            metric_line(out, "RSRP3", &cell.rsrp3, "dBm");
            metric_line(out, "RSRP4", &cell.rsrp4, "dBm");
        }
        metric_line(out, "RSRQ", &cell.rsrq, "dB");
        metric_line(out, if cell.is_primary() { "SINR1" } else { "SINR" }, &cell.sinr1, "dB");
        if cell.is_primary() {
            metric_line(out, "SINR2", &cell.sinr2, "dB");
            metric_line(out, "SINR3", &cell.sinr3, "dB");
            metric_line(out, "SINR4", &cell.sinr4, "dB");
        }
        writeln!(out).unwrap();
    }
}

fn render_nr(out: &mut String, signal: &SignalInfo) {
    writeln!(out, "NR Signal:").unwrap();
    writeln!(out).unwrap();

    for cell in signal.nr.cells.iter() {
        // NSA cells ride on the LTE anchor, so they are all secondaries
        // from the NR point of view.
        let prefix = if signal.network().is_nr_nsa() || !cell.is_primary() { "S" } else { "P" };
        writeln!(
            out,
            "-- {prefix}Cell: n{} - {} / {}{} --",
            cell.band.get(),
            cell.id.pci,
            cell.arfcn(),
            bandwidth_suffix(cell.bandwidth.get())
        )
        .unwrap();

        metric_line(out, if cell.rsrp2.ok() { "RSRP1" } else { "RSRP" }, &cell.rsrp1, "dBm");
        if cell.rsrp2.ok() {
            metric_line(out, "RSRP2", &cell.rsrp2, "dBm");
        }
        metric_line(out, "SINR", &cell.sinr, "dB");
        writeln!(out).unwrap();
    }
}

fn bandwidth_suffix(bandwidth: f32) -> String {
    if bandwidth > -1.0 {
        format!(" ({bandwidth} MHz)")
    } else {
        String::new()
    }
}

fn metric_line<T: Scalar + std::fmt::Display>(
    out: &mut String,
    name: &str,
    metric: &Metric<T>,
    unit: &str,
) {
    writeln!(
        out,
        "{name}: {} {unit} (Min: {} {unit}, Max: {} {unit}, Avg: {} {unit})",
        metric.current(),
        metric.min(),
        metric.max(),
        round2(metric.average())
    )
    .unwrap();
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
