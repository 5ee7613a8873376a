//! # Collector Integration Tests
//!
//! This runner exercises the full collection pipeline (configuration,
//! authentication headers, retry/backoff accounting, endpoint failover,
//! and backup recovery) against the scripted `MockTransport`, so it runs
//! deterministically with no network access.
//!
//! ## Purpose:
//! The unit suites cover each module in isolation; this runner walks the
//! same scenarios end to end the way an operator would see them, printing
//! a short transcript per scenario.
//!
//! These tests are executed asynchronously using `tokio::main`.

use std::sync::Arc;

use lib_collector::loggers::loggerlocal::LoggerLocal;
use lib_collector::retrieve::mock::{MockOutcome, MockTransport};
use lib_collector::retrieve::transport::HttpTransport;
use lib_collector::sysapi::collector::Collector;
use lib_collector::sysapi::config::CollectorConfig;
use lib_collector::sysapi::model::{AuthMode, Outcome, SystemInfo};
use lib_collector::sysapi::recovery::RecoveryContext;

/// Builds a fast test configuration over the given endpoints.
fn test_config(endpoints: &[&str]) -> CollectorConfig {
    CollectorConfig {
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
        backoff_unit_ms: 1,
        backup: SystemInfo::new(1, 1, "Lumen"),
        ..CollectorConfig::default()
    }
}

/// Builds a collector over a scripted transport with a silent logger.
fn collector(config: CollectorConfig, mock: &Arc<MockTransport>) -> Collector {
    let transport: Arc<dyn HttpTransport> = mock.clone();
    Collector::new(
        config,
        transport,
        Arc::new(LoggerLocal::disabled("test_collector".to_string())),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Starting Collector Integration Tests ---");

    // --- TEST 1: Healthy endpoint, full payload ---
    // The first endpoint answers immediately with every expected field.
    println!("\n[Test 1] Healthy endpoint...");
    let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
        200,
        br#"{"apimodel":7,"system":42,"osname":"Lumen"}"#.to_vec(),
    )]));
    let config = test_config(&["http://primary.internal/api/system-info"]);
    let mut ctx = RecoveryContext::new(config.backup.clone(), config.max_retries);

    let (info, outcome) = collector(config, &mock).collect(&mut ctx).await?;
    assert_eq!(outcome, Outcome::Success { degraded: false });
    assert_eq!(info, SystemInfo::new(7, 42, "Lumen"));
    assert_eq!(mock.call_count(), 1);
    println!("✅ Collected: {}", info);

    // --- TEST 2: Failover after exhausting the primary ---
    // The primary fails three times; the secondary answers on the first try.
    println!("\n[Test 2] Failover ordering...");
    let mock = Arc::new(MockTransport::scripted(vec![
        MockOutcome::Fail("connection refused".into()),
        MockOutcome::Fail("connection refused".into()),
        MockOutcome::Fail("connection refused".into()),
        MockOutcome::Respond(200, br#"{"apimodel":3,"system":9,"osname":"Lumen"}"#.to_vec()),
    ]));
    let config = test_config(&[
        "http://primary.internal/api/system-info",
        "http://secondary.internal/api/system-info",
    ]);
    let mut ctx = RecoveryContext::new(config.backup.clone(), config.max_retries);

    let (_, outcome) = collector(config, &mock).collect(&mut ctx).await?;
    assert_eq!(outcome, Outcome::Success { degraded: false });
    let calls = mock.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[..3]
        .iter()
        .all(|c| c.url.starts_with("http://primary")));
    assert!(calls[3].url.starts_with("http://secondary"));
    println!("✅ Primary retried {} times, then failover", calls.len() - 1);

    // --- TEST 3: Authentication failure stops everything ---
    // A 401 must not be retried and must not fail over.
    println!("\n[Test 3] 401 short-circuit...");
    let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(401, Vec::new())]));
    let mut config = test_config(&[
        "http://primary.internal/api/system-info",
        "http://secondary.internal/api/system-info",
    ]);
    config.auth = AuthMode::bearer("expired-token");
    let mut ctx = RecoveryContext::new(config.backup.clone(), config.max_retries);

    let (info, outcome) = collector(config, &mock).collect(&mut ctx).await?;
    assert_eq!(outcome, Outcome::AuthFailed);
    assert_eq!(info, SystemInfo::new(1, 1, "Lumen"));
    assert_eq!(mock.call_count(), 1);
    println!("✅ AuthFailed after exactly one call");

    // --- TEST 4: Total exhaustion recovers the backup ---
    // Every endpoint stays unreachable; the caller still gets the backup.
    println!("\n[Test 4] Backup recovery...");
    let mock = Arc::new(MockTransport::unreachable());
    let config = test_config(&[
        "http://primary.internal/api/system-info",
        "http://secondary.internal/api/system-info",
        "http://tertiary.internal/api/system",
    ]);
    let mut ctx = RecoveryContext::new(config.backup.clone(), config.max_retries);

    let (info, outcome) = collector(config, &mock).collect(&mut ctx).await?;
    assert_eq!(outcome, Outcome::RecoverySuccess);
    assert_eq!(info, SystemInfo::new(1, 1, "Lumen"));
    assert_eq!(mock.call_count(), 9);
    println!("✅ RecoverySuccess with backup after {} attempts", mock.call_count());

    // --- TEST 5: Degraded success keeps backup fields ---
    // A 200 with a partial body applies what it can and flags the rest.
    println!("\n[Test 5] Degraded success...");
    let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
        200,
        br#"{"apimodel":12}"#.to_vec(),
    )]));
    let config = test_config(&["http://primary.internal/api/system-info"]);
    let mut ctx = RecoveryContext::new(config.backup.clone(), config.max_retries);

    let (info, outcome) = collector(config, &mock).collect(&mut ctx).await?;
    assert_eq!(outcome, Outcome::Success { degraded: true });
    assert_eq!(info.api_model, 12);
    assert_eq!(info.system_id, 1);
    assert_eq!(info.os_name, "Lumen");
    println!("✅ Partial fields applied, backup retained for the rest");

    println!("\n--- All Tests Passed Successfully ---");
    Ok(())
}
