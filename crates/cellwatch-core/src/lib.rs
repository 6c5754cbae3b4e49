//! Cell-identity tracking and signal aggregation for ZTE cellular routers.
//!
//! The router exposes a flat, loosely typed snapshot of diagnostic fields;
//! this crate turns a stream of such snapshots into an identity-tracked
//! model of the LTE and 5G-NR cells currently in use, each carrying
//! sanitized metrics with bounded rolling history. Purely computational —
//! fetching the snapshot and rendering the result live elsewhere.

pub mod cell;
pub mod fields;
pub mod lte;
pub mod metric;
pub mod network;
pub mod nr;
pub mod signal;
pub mod throughput;
pub mod value;

pub use fields::DeviceInfo;
pub use network::NetworkKind;
pub use signal::SignalInfo;
