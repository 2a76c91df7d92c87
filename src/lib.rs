//! # Syslog Flood
//!
//! Fabricates security-appliance style log records (Cisco ASA, Snare, Windows
//! XML, AWS flow logs, Nessus, NetFlow, eStreamer, Check Point) and emits them
//! as UDP datagrams to a collector at a configurable pace.
//!
//! # Disclaimer
//!
//! - The software generates synthetic traffic for testing log pipelines you operate.
//! - Point it only at collectors you own or are authorized to load.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod pool;
pub mod selector;
pub mod sender;
pub mod simulation;
pub mod stats;
pub mod validation;
