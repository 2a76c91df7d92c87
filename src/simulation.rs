//! Simulation orchestration and lifecycle management
//!
//! The pacing loop is strictly sequential: one event is selected, rendered
//! and sent before the next one starts. Cancellation is observed while a
//! send is in flight and while sleeping between events.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::SimulatorConfig;
use crate::error::Result;
use crate::formatter::MessageFormatter;
use crate::pool::AddressPool;
use crate::selector::{EndpointSelector, SourceKind};
use crate::sender::{resolve_collector, UdpSender};
use crate::stats::EmissionStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Summary returned once the loop has stopped
#[derive(Debug, Clone)]
pub struct RunReport {
    pub session_id: String,
    pub events: u64,
    pub sent: u64,
    pub failed: u64,
    pub bytes: u64,
    pub final_state: LoopState,
}

/// High-level simulation controller
pub struct Simulation {
    config: SimulatorConfig,
    selector: EndpointSelector,
    formatter: MessageFormatter,
    stats: Arc<EmissionStats>,
    cancel: CancellationToken,
    rng: StdRng,
    state: LoopState,
}

impl Simulation {
    /// Build the address pool (fetching live addresses) and prepare a run.
    pub async fn new(config: SimulatorConfig) -> Self {
        let pool = AddressPool::build(&config).await;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: SimulatorConfig, pool: AddressPool) -> Self {
        let selector = EndpointSelector::new(pool, config.live_ip_percentage);

        Self {
            config,
            selector,
            formatter: MessageFormatter::new(),
            stats: Arc::new(EmissionStats::new()),
            cancel: CancellationToken::new(),
            rng: StdRng::from_entropy(),
            state: LoopState::Running,
        }
    }

    /// Token that stops the run when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stats(&self) -> Arc<EmissionStats> {
        self.stats.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run until cancelled. Consumes the simulation; the socket is released
    /// before this returns.
    pub async fn run(mut self) -> Result<RunReport> {
        self.print_simulation_info();

        let sender = if self.config.dry_run {
            info!("Dry-run mode: Skipping transport socket creation");
            None
        } else {
            let collector = resolve_collector(&self.config.collector_host, self.config.collector_port).await?;
            Some(UdpSender::bind(collector, self.config.send_timeout).await?)
        };

        self.spawn_duration_timer();
        self.pacing_loop(sender.as_ref()).await;

        if let Some(sender) = sender {
            sender.close();
        }
        self.state = LoopState::Stopped;

        Ok(self.finalize_simulation())
    }

    async fn pacing_loop(&mut self, sender: Option<&UdpSender>) {
        let cancel = self.cancel.clone();
        let format = self.config.format;
        let mut last_report = Instant::now();
        let mut fallback_warned = false;
        let mut send_failure_warned = false;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let tuple = self.selector.select(&mut self.rng);
            self.stats.record_source(tuple.source_kind);
            if tuple.source_kind == SourceKind::Fallback && !fallback_warned {
                warn!("No live addresses available; live-traffic events use the private pool instead");
                fallback_warned = true;
            }

            let message = self.formatter.render(
                &tuple,
                Some(format),
                &self.config.collector_host,
                Utc::now(),
            );

            match sender {
                Some(sender) => {
                    let result = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        result = sender.send(&message) => result,
                    };

                    match result {
                        Ok(bytes) => {
                            self.stats.increment_sent(bytes as u64, format);
                            trace!("Sent {} bytes: {}", bytes, message);
                        }
                        Err(e) => {
                            if send_failure_warned {
                                debug!("Dropped message: {}", e);
                            } else {
                                warn!("Dropped message: {} (further send failures are logged at debug level)", e);
                                send_failure_warned = true;
                            }
                            self.stats.increment_failed();
                        }
                    }
                }
                None => {
                    self.stats.increment_sent(message.len() as u64, format);
                    trace!("[DRY-RUN] {}", message);
                }
            }

            if last_report.elapsed() >= self.config.stats_interval {
                self.stats.print_stats();
                last_report = Instant::now();
            }

            match self.config.pacing.next_delay(&mut self.rng) {
                Some(delay) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = time::sleep(delay) => {}
                    }
                }
                None => tokio::task::yield_now().await,
            }
        }

        debug!("Pacing loop stopped after {} events", self.stats.total_events());
    }

    /// Spawn duration timer if specified
    fn spawn_duration_timer(&self) {
        if let Some(duration) = self.config.duration {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = time::sleep(duration) => {
                        info!("⏰ Duration reached, stopping...");
                        cancel.cancel();
                    }
                }
            });
        }
    }

    /// Print simulation start information
    fn print_simulation_info(&self) {
        let version = env!("CARGO_PKG_VERSION");

        if self.config.dry_run {
            info!("🔍 Starting Syslog Flood v{} (DRY-RUN)", version);
            info!("   ⚠️  DRY-RUN MODE: No datagrams will be sent!");
        } else {
            info!("🚀 Starting Syslog Flood v{}", version);
        }

        let pool = self.selector.pool();
        info!("   Session ID: {}", self.stats.session_id);
        info!("   Collector: {}:{}", self.config.collector_host, self.config.collector_port);
        info!("   Format: {}", self.config.format);
        info!("   Pacing: {}", self.config.pacing);
        info!(
            "   Live traffic: {:.2}% ({} live, {} private addresses)",
            self.config.live_ip_percentage,
            pool.external().len(),
            pool.private().len()
        );

        if let Some(d) = self.config.duration {
            info!("   Duration: {} seconds", d.as_secs());
        }

        info!("   Press Ctrl+C to stop gracefully");
    }

    fn finalize_simulation(&self) -> RunReport {
        let snapshot = self.stats.get_session_stats();

        info!("📈 Final Statistics:");
        self.stats.print_stats();
        debug!("Session summary: {}", self.stats.to_json());

        if self.config.dry_run {
            info!("✅ Simulation stopped (NO DATAGRAMS SENT)");
        } else {
            info!("✅ Simulation stopped, transport released");
        }

        RunReport {
            session_id: snapshot.session_id,
            events: snapshot.messages_sent + snapshot.messages_failed,
            sent: snapshot.messages_sent,
            failed: snapshot.messages_failed,
            bytes: snapshot.bytes_sent,
            final_state: self.state,
        }
    }
}

/// Cancel `token` on Ctrl+C.
pub fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        info!("🛑 Received Ctrl+C, shutting down gracefully...");
                        token.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
                }
            }
        }
    });
}
