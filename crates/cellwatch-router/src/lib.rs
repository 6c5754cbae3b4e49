//! HTTP transport and session management for ZTE cellular routers.
//!
//! - Protocol probing and the `goform` request plumbing
//! - Login (nonce + double SHA-256), keepalive, session tracking
//! - Diagnostic field snapshots for the core engine
//! - Management commands: band locks, connect/disconnect, preference

pub mod client;
pub mod error;
pub mod hash;
pub mod http;

pub use client::{parse_bands_arg, RouterClient};
pub use error::RouterError;
