use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::LogFormat;
use crate::selector::SourceKind;

/// Counters for one emission run
pub struct EmissionStats {
    pub messages_sent: Arc<AtomicU64>,
    pub messages_failed: Arc<AtomicU64>,
    pub bytes_sent: Arc<AtomicU64>,
    pub external_sources: Arc<AtomicU64>,
    pub synthesized_sources: Arc<AtomicU64>,
    pub fallback_sources: Arc<AtomicU64>,
    pub start_time: Instant,
    pub session_id: String,
    pub format_stats: Arc<HashMap<String, AtomicU64>>,
}

impl Default for EmissionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub messages_sent: u64,
    pub messages_failed: u64,
    pub bytes_sent: u64,
    pub duration_secs: f64,
    pub messages_per_second: f64,
    pub external_sources: u64,
    pub synthesized_sources: u64,
    pub fallback_sources: u64,
    pub format_breakdown: HashMap<String, u64>,
}

impl EmissionStats {
    pub fn new() -> Self {
        Self {
            messages_sent: Arc::new(AtomicU64::new(0)),
            messages_failed: Arc::new(AtomicU64::new(0)),
            bytes_sent: Arc::new(AtomicU64::new(0)),
            external_sources: Arc::new(AtomicU64::new(0)),
            synthesized_sources: Arc::new(AtomicU64::new(0)),
            fallback_sources: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
            session_id: Uuid::new_v4().to_string(),
            format_stats: Arc::new(Self::init_format_stats()),
        }
    }

    fn init_format_stats() -> HashMap<String, AtomicU64> {
        LogFormat::ALL
            .iter()
            .map(|format| (format.key().to_string(), AtomicU64::new(0)))
            .collect()
    }

    pub fn increment_sent(&self, bytes: u64, format: LogFormat) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);

        if let Some(counter) = self.format_stats.get(format.key()) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_failed(&self) {
        self.messages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_source(&self, kind: SourceKind) {
        let counter = match kind {
            SourceKind::External => &self.external_sources,
            SourceKind::Synthesized => &self.synthesized_sources,
            SourceKind::Fallback => &self.fallback_sources,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_events(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed) + self.messages_failed.load(Ordering::Relaxed)
    }

    pub fn print_stats(&self) {
        let snapshot = self.get_session_stats();

        println!(
            "📊 Stats - Sent: {}, Failed: {}, Rate: {:.2} msg/s, Bytes: {}",
            snapshot.messages_sent,
            snapshot.messages_failed,
            snapshot.messages_per_second,
            snapshot.bytes_sent
        );
        println!(
            "   Sources: external {}, synthesized {}, fallback {}",
            snapshot.external_sources, snapshot.synthesized_sources, snapshot.fallback_sources
        );

        for (format, count) in snapshot.format_breakdown.iter() {
            if *count > 0 {
                println!("   {}: {} messages", format, count);
            }
        }
    }

    pub fn get_session_stats(&self) -> SessionStats {
        let sent = self.messages_sent.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { sent as f64 / elapsed } else { 0.0 };

        let format_breakdown: HashMap<String, u64> = self
            .format_stats
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();

        SessionStats {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
            messages_sent: sent,
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            duration_secs: elapsed,
            messages_per_second: rate,
            external_sources: self.external_sources.load(Ordering::Relaxed),
            synthesized_sources: self.synthesized_sources.load(Ordering::Relaxed),
            fallback_sources: self.fallback_sources.load(Ordering::Relaxed),
            format_breakdown,
        }
    }

    /// Snapshot as a single JSON line, for the final log entry.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.get_session_stats()).unwrap_or_default()
    }
}
