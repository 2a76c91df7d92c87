use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::net::Ipv4Addr;

use crate::constants::{COMMON_PORTS, EPHEMERAL_PORT_MAX, EPHEMERAL_PORT_MIN};
use crate::pool::{generate_private_address, AddressPool};

/// Where the source address of an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Drawn from the fetched live list
    External,
    /// Freshly generated inside an RFC1918 block
    Synthesized,
    /// Live path was chosen but no live addresses exist; drawn from the
    /// stored private subset instead
    Fallback,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::External => write!(f, "external"),
            SourceKind::Synthesized => write!(f, "synthesized"),
            SourceKind::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTuple {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    pub source_kind: SourceKind,
}

/// Picks endpoints for simulated events
pub struct EndpointSelector {
    pool: AddressPool,
    live_fraction: f64,
    destination_ports: Vec<u16>,
}

impl EndpointSelector {
    /// `live_percentage` is clamped to 0..=100.
    pub fn new(pool: AddressPool, live_percentage: f64) -> Self {
        let live_fraction = if live_percentage.is_nan() {
            0.0
        } else {
            live_percentage.clamp(0.0, 100.0) / 100.0
        };

        Self {
            pool,
            live_fraction,
            destination_ports: COMMON_PORTS.to_vec(),
        }
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> EndpointTuple {
        let (source, source_kind) = self.select_source(rng);

        EndpointTuple {
            source,
            source_kind,
            destination: generate_private_address(rng),
            source_port: rng.gen_range(EPHEMERAL_PORT_MIN..=EPHEMERAL_PORT_MAX),
            destination_port: self.destination_ports.choose(rng).copied().unwrap_or(COMMON_PORTS[0]),
        }
    }

    fn select_source<R: Rng + ?Sized>(&self, rng: &mut R) -> (Ipv4Addr, SourceKind) {
        if rng.r#gen::<f64>() < self.live_fraction {
            if let Some(addr) = self.pool.choose_external(rng) {
                return (addr, SourceKind::External);
            }
            if let Some(addr) = self.pool.choose_private(rng) {
                return (addr, SourceKind::Fallback);
            }
        }
        (generate_private_address(rng), SourceKind::Synthesized)
    }

    pub fn pool(&self) -> &AddressPool {
        &self.pool
    }

    pub fn live_fraction(&self) -> f64 {
        self.live_fraction
    }

    pub fn get_destination_ports(&self) -> &[u16] {
        &self.destination_ports
    }
}
