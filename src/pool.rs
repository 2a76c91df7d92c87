//! Address pool construction
//!
//! Builds the set of source-address candidates for a run: an optional list of
//! "live" addresses fetched over HTTP, plus a small set of synthesized RFC1918
//! addresses that is never empty.

use rand::seq::SliceRandom;
use rand::Rng;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SimulatorConfig;
use crate::constants::RFC1918_RANGES;
use crate::error::{NetworkError, Result};

/// An inclusive block of IPv4 addresses, bounded octet by octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateRange {
    pub start: [u8; 4],
    pub end: [u8; 4],
}

impl PrivateRange {
    pub fn canonical() -> impl Iterator<Item = PrivateRange> {
        RFC1918_RANGES
            .iter()
            .map(|&(start, end)| PrivateRange { start, end })
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        addr.octets()
            .iter()
            .zip(self.start.iter().zip(self.end.iter()))
            .all(|(octet, (lo, hi))| lo <= octet && octet <= hi)
    }

    /// Each octet is drawn independently from `start[i]..=end[i]`.
    pub fn random_address<R: Rng + ?Sized>(&self, rng: &mut R) -> Ipv4Addr {
        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = rng.gen_range(self.start[i]..=self.end[i]);
        }
        Ipv4Addr::from(octets)
    }
}

/// A uniformly chosen address inside a uniformly chosen RFC1918 block.
pub fn generate_private_address<R: Rng + ?Sized>(rng: &mut R) -> Ipv4Addr {
    let (start, end) = RFC1918_RANGES[rng.gen_range(0..RFC1918_RANGES.len())];
    PrivateRange { start, end }.random_address(rng)
}

pub fn is_private_address(addr: Ipv4Addr) -> bool {
    PrivateRange::canonical().any(|range| range.contains(addr))
}

/// Parse a newline-delimited address list, keeping at most `max_count` entries.
pub fn parse_address_list(body: &str, max_count: usize) -> Vec<Ipv4Addr> {
    let mut skipped = 0usize;
    let addresses: Vec<Ipv4Addr> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.parse::<Ipv4Addr>() {
            Ok(addr) => Some(addr),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .take(max_count)
        .collect();

    if skipped > 0 {
        debug!("Skipped {} malformed lines in address list", skipped);
    }
    addresses
}

/// Fetch and parse the live address list.
pub async fn try_fetch_addresses(url: &str, max_count: usize, timeout: Duration) -> Result<Vec<Ipv4Addr>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|e| NetworkError::Fetch(format!("HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| NetworkError::Fetch(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::Fetch(format!("{} returned {}", url, status)).into());
    }

    let body = response
        .text()
        .await
        .map_err(|e| NetworkError::Fetch(format!("{}: reading body: {}", url, e)))?;

    Ok(parse_address_list(&body, max_count))
}

/// Fetch the live address list. Any failure is logged and yields an empty list.
pub async fn fetch_external_addresses(url: &str, max_count: usize, timeout: Duration) -> Vec<Ipv4Addr> {
    match try_fetch_addresses(url, max_count, timeout).await {
        Ok(addresses) if addresses.is_empty() => {
            warn!(url = %url, "Address list contained no usable IPv4 addresses");
            addresses
        }
        Ok(addresses) => {
            info!("Fetched {} live addresses from {}", addresses.len(), url);
            addresses
        }
        Err(e) => {
            warn!(error = %e, "Continuing without live addresses");
            Vec::new()
        }
    }
}

/// Source-address candidates for one run. Read-only once built.
#[derive(Debug, Clone)]
pub struct AddressPool {
    external: Vec<Ipv4Addr>,
    private: Vec<Ipv4Addr>,
}

impl AddressPool {
    /// Fetch live addresses and synthesize the private subset.
    pub async fn build(config: &SimulatorConfig) -> Self {
        let external = fetch_external_addresses(
            &config.source_url,
            config.max_addresses,
            config.fetch_timeout,
        ).await;

        let mut rng = rand::thread_rng();
        let private = (0..config.private_addresses)
            .map(|_| generate_private_address(&mut rng))
            .collect();

        let pool = Self { external, private };
        info!(
            "Address pool ready: {} live, {} private",
            pool.external.len(),
            pool.private.len()
        );
        pool
    }

    /// Assemble a pool from known addresses. An empty private set is topped
    /// up with one synthesized address.
    pub fn from_parts(external: Vec<Ipv4Addr>, mut private: Vec<Ipv4Addr>) -> Self {
        if private.is_empty() {
            private.push(generate_private_address(&mut rand::thread_rng()));
        }
        Self { external, private }
    }

    pub fn external(&self) -> &[Ipv4Addr] {
        &self.external
    }

    pub fn private(&self) -> &[Ipv4Addr] {
        &self.private
    }

    pub fn has_external(&self) -> bool {
        !self.external.is_empty()
    }

    pub fn choose_external<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Ipv4Addr> {
        self.external.choose(rng).copied()
    }

    pub fn choose_private<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Ipv4Addr> {
        self.private.choose(rng).copied()
    }
}
