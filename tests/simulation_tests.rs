//! Simulation module tests
//!
//! Tests for pacing, cancellation and end-to-end emission from the pacing loop.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use syslog_flood::config::{get_default_config, LogFormat, PacingPolicy, SimulatorConfig};
use syslog_flood::pool::AddressPool;
use syslog_flood::simulation::{LoopState, Simulation};
use tokio::net::UdpSocket;

fn create_test_config() -> SimulatorConfig {
    let mut config = SimulatorConfig::from_config(&get_default_config()).unwrap();
    config.dry_run = true; // Always use dry-run unless a test binds a collector
    config.pacing = PacingPolicy::Unthrottled;
    config
}

fn test_pool() -> AddressPool {
    AddressPool::from_parts(
        vec![Ipv4Addr::new(203, 0, 113, 1), Ipv4Addr::new(203, 0, 113, 2)],
        vec![Ipv4Addr::new(10, 0, 0, 1)],
    )
}

#[test]
fn test_unthrottled_has_no_delay() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(PacingPolicy::Unthrottled.next_delay(&mut rng), None);

    let zero = PacingPolicy::Interval { min_secs: 0.0, max_secs: 0.0 };
    for _ in 0..100 {
        assert_eq!(zero.next_delay(&mut rng), None);
    }
    assert!(zero.is_unthrottled());
}

#[test]
fn test_equal_bounds_give_exact_delay() {
    let mut rng = StdRng::seed_from_u64(2);
    let fixed = PacingPolicy::Interval { min_secs: 2.0, max_secs: 2.0 };

    for _ in 0..100 {
        assert_eq!(fixed.next_delay(&mut rng), Some(Duration::from_secs(2)));
    }
}

#[test]
fn test_interval_delay_within_bounds() {
    let mut rng = StdRng::seed_from_u64(3);
    let policy = PacingPolicy::Interval { min_secs: 0.5, max_secs: 1.0 };

    for _ in 0..1000 {
        let delay = policy.next_delay(&mut rng).unwrap();
        assert!(delay >= Duration::from_millis(500) && delay <= Duration::from_secs(1));
    }
    assert_eq!(policy.upper_bound(), Duration::from_secs(1));
}

#[test]
fn test_malformed_bounds_never_panic() {
    let mut rng = StdRng::seed_from_u64(4);

    let negative = PacingPolicy::Interval { min_secs: -3.0, max_secs: 0.2 };
    for _ in 0..100 {
        let delay = negative.next_delay(&mut rng).unwrap();
        assert!(delay <= Duration::from_millis(200));
    }

    let inverted = PacingPolicy::Interval { min_secs: 5.0, max_secs: 1.0 };
    assert_eq!(inverted.next_delay(&mut rng), Some(Duration::from_secs(1)));

    for policy in [
        PacingPolicy::Interval { min_secs: f64::NAN, max_secs: f64::NAN },
        PacingPolicy::Interval { min_secs: 0.0, max_secs: f64::INFINITY },
        PacingPolicy::Interval { min_secs: 1.0, max_secs: -1.0 },
    ] {
        assert_eq!(policy.next_delay(&mut rng), None);
        assert_eq!(policy.upper_bound(), Duration::ZERO);
    }

    let nan_min = PacingPolicy::Interval { min_secs: f64::NAN, max_secs: 0.5 };
    assert!(nan_min.next_delay(&mut rng).unwrap() <= Duration::from_millis(500));
}

#[tokio::test]
async fn test_simulation_starts_running() {
    let simulation = Simulation::with_pool(create_test_config(), test_pool());
    assert_eq!(simulation.state(), LoopState::Running);
    assert!(!simulation.cancel_token().is_cancelled());
}

#[tokio::test]
async fn test_cancel_before_run_emits_nothing() {
    let simulation = Simulation::with_pool(create_test_config(), test_pool());
    simulation.cancel_token().cancel();

    let report = simulation.run().await.unwrap();
    assert_eq!(report.events, 0);
    assert_eq!(report.final_state, LoopState::Stopped);
}

#[tokio::test]
async fn test_cancel_during_sleep_stops_within_one_interval() {
    let mut config = create_test_config();
    config.pacing = PacingPolicy::Interval { min_secs: 2.0, max_secs: 2.0 };

    let simulation = Simulation::with_pool(config, test_pool());
    let cancel = simulation.cancel_token();
    let handle = tokio::spawn(simulation.run());

    // First event goes out immediately, then the loop sleeps for 2s
    tokio::time::sleep(Duration::from_millis(200)).await;
    let cancelled_at = Instant::now();
    cancel.cancel();

    let report = tokio::time::timeout(Duration::from_millis(2500), handle)
        .await
        .expect("loop did not stop within one delay interval")
        .unwrap()
        .unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_secs(2));
    assert_eq!(report.events, 1);
    assert_eq!(report.final_state, LoopState::Stopped);
}

#[tokio::test]
async fn test_unthrottled_dry_run_counts_events() {
    let simulation = Simulation::with_pool(create_test_config(), test_pool());
    let cancel = simulation.cancel_token();
    let stats = simulation.stats();
    let handle = tokio::spawn(simulation.run());

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let report = handle.await.unwrap().unwrap();
    assert!(report.events > 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.session_id, stats.session_id);
    assert_eq!(stats.total_events(), report.events);
}

#[tokio::test]
async fn test_duration_timer_stops_run() {
    let mut config = create_test_config();
    config.pacing = PacingPolicy::Interval { min_secs: 0.05, max_secs: 0.05 };
    config.duration = Some(Duration::from_millis(300));

    let simulation = Simulation::with_pool(config, test_pool());
    let report = tokio::time::timeout(Duration::from_secs(3), simulation.run())
        .await
        .expect("duration timer did not stop the run")
        .unwrap();

    assert!(report.events >= 1);
    assert_eq!(report.final_state, LoopState::Stopped);
}

#[tokio::test]
async fn test_emits_datagrams_to_collector() {
    let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = collector.local_addr().unwrap().port();

    let mut config = create_test_config();
    config.dry_run = false;
    config.collector_host = "127.0.0.1".to_string();
    config.collector_port = port;
    config.format = LogFormat::CiscoAsa;
    config.pacing = PacingPolicy::Interval { min_secs: 0.01, max_secs: 0.01 };

    let simulation = Simulation::with_pool(config, test_pool());
    let cancel = simulation.cancel_token();
    let handle = tokio::spawn(simulation.run());

    let mut buf = [0u8; 4096];
    for _ in 0..5 {
        let len = tokio::time::timeout(Duration::from_secs(2), collector.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let message = std::str::from_utf8(&buf[..len]).unwrap();
        assert!(message.starts_with("<166>"));
        assert!(message.contains("%ASA-6-302013"));
        assert!(message.contains("127.0.0.1 : "));
    }

    cancel.cancel();
    let report = handle.await.unwrap().unwrap();
    assert!(report.sent >= 5);
    assert!(report.bytes > 0);
}

#[tokio::test]
async fn test_cancel_during_sleep_releases_socket() {
    let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let mut config = create_test_config();
    config.dry_run = false;
    config.collector_host = "127.0.0.1".to_string();
    config.collector_port = collector.local_addr().unwrap().port();
    config.pacing = PacingPolicy::Interval { min_secs: 2.0, max_secs: 2.0 };

    let simulation = Simulation::with_pool(config, test_pool());
    let cancel = simulation.cancel_token();
    let handle = tokio::spawn(simulation.run());

    let mut buf = [0u8; 4096];
    let (len, sender_addr) = tokio::time::timeout(Duration::from_secs(2), collector.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert!(len > 0);

    // The loop is now in its 2s sleep
    let cancelled_at = Instant::now();
    cancel.cancel();

    let report = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not stop during its sleep")
        .unwrap()
        .unwrap();
    assert!(cancelled_at.elapsed() < Duration::from_secs(2));
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.final_state, LoopState::Stopped);

    // The ephemeral port is free again once the sender is closed
    let rebound = UdpSocket::bind(sender_addr).await;
    assert!(rebound.is_ok(), "sender socket still bound: {:?}", rebound.err());

    let late = tokio::time::timeout(Duration::from_millis(500), collector.recv_from(&mut buf)).await;
    assert!(late.is_err(), "datagram arrived after the run stopped");
}
