//! # System Info Collector
//!
//! The resilient collection loop: walks the configured endpoints in
//! failover order, retries each with exponentially increasing backoff and
//! escalating timeouts, short-circuits on authentication failure, and
//! substitutes the backup record when every endpoint is exhausted. The
//! caller always gets a usable record back; only configuration misuse,
//! re-entrancy, and cancellation surface as errors.

use std::sync::Arc;

use serde_json::json;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::loggers::loggerlocal::LoggerLocal;
use crate::retrieve::transport::HttpTransport;

use super::config::CollectorConfig;
use super::model::{Outcome, SystemInfo};
use super::payload;
use super::recovery::{backoff_delay, CollectError, RecoveryContext};

/// # Collector
///
/// Drives one or more collection runs against a fixed configuration and
/// transport. Each run owns its [`RecoveryContext`]; the collector itself
/// holds no per-run state, so independent runs may proceed concurrently on
/// distinct contexts.
pub struct Collector {
    /// Endpoints, auth, retry budget, and timeout/backoff policy.
    config: CollectorConfig,
    /// The HTTP boundary; real network or scripted mock.
    transport: Arc<dyn HttpTransport>,
    /// Standardized local logger.
    logger: Arc<LoggerLocal>,
    /// Optional cooperative cancellation signal.
    cancel: Option<CancellationToken>,
}

impl Collector {
    /// Creates a collector over the given configuration and transport.
    pub fn new(
        config: CollectorConfig,
        transport: Arc<dyn HttpTransport>,
        logger: Arc<LoggerLocal>,
    ) -> Self {
        Self {
            config,
            transport,
            logger,
            cancel: None,
        }
    }

    /// Attaches a cancellation token. Each backoff sleep and each attempt
    /// boundary becomes a cancellation point that aborts the run with
    /// [`CollectError::Cancelled`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The configuration this collector runs with.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// # Collect
    ///
    /// Runs one collection. Endpoints are tried in order; each gets up to
    /// the context's retry budget. Transport failures, unexpected statuses,
    /// empty bodies, and unparseable bodies all count as failed attempts
    /// and feed the backoff accounting. A 401 ends the run immediately with
    /// [`Outcome::AuthFailed`] and no failover. When every endpoint is
    /// exhausted the backup record is returned with
    /// [`Outcome::RecoverySuccess`], never an error.
    pub async fn collect(
        &self,
        ctx: &mut RecoveryContext,
    ) -> Result<(SystemInfo, Outcome), CollectError> {
        self.config.validate()?;

        let mut result = ctx.backup().clone();
        let endpoint_count = self.config.endpoints.len();

        for (index, endpoint) in self.config.endpoints.iter().enumerate() {
            ctx.reset_for_endpoint();

            while !ctx.exhausted() {
                self.check_cancelled()?;

                ctx.begin_attempt()?;
                let timeout = self.config.timeout_for_attempt(ctx.retry_count());
                let headers = self.config.auth.headers();
                let outcome = self
                    .transport
                    .get(endpoint, headers, timeout, self.config.connect_timeout())
                    .await;
                ctx.end_attempt();

                let failure_reason = match outcome {
                    Ok(response) if response.status == 401 => {
                        self.logger
                            .error(
                                "Authentication failed: 401 Unauthorized",
                                Some(json!({"endpoint": endpoint})),
                            )
                            .await;
                        return Ok((result, Outcome::AuthFailed));
                    }
                    Ok(response) if response.status == 200 && !response.body.is_empty() => {
                        match payload::decode(&response.body) {
                            Ok(value) => {
                                let degraded = payload::apply_fields(&mut result, &value);
                                if degraded {
                                    self.logger
                                        .warn(
                                            "System info collected with missing fields",
                                            Some(json!({"endpoint": endpoint})),
                                        )
                                        .await;
                                } else {
                                    self.logger
                                        .debug(
                                            "System info collected",
                                            Some(json!({"endpoint": endpoint})),
                                        )
                                        .await;
                                }
                                return Ok((result, Outcome::Success { degraded }));
                            }
                            Err(parse_err) => parse_err.to_string(),
                        }
                    }
                    Ok(response) if response.body.is_empty() && response.status == 200 => {
                        "empty response body".to_string()
                    }
                    Ok(response) => format!("HTTP status {}", response.status),
                    Err(transport_err) => transport_err.to_string(),
                };

                ctx.record_failure();
                let delay = backoff_delay(ctx.retry_count(), self.config.backoff_unit_ms);
                self.logger
                    .warn(
                        &format!(
                            "Attempt {}/{} failed for {}",
                            ctx.retry_count(),
                            ctx.max_retries(),
                            endpoint
                        ),
                        Some(json!({
                            "endpoint": endpoint,
                            "attempt": ctx.retry_count(),
                            "reason": failure_reason,
                            "backoff_ms": delay.as_millis() as u64,
                        })),
                    )
                    .await;

                // The literal behavior also waits after an endpoint's final
                // retry, doubling the wait before failover; the tunable
                // skips that extra sleep.
                if !ctx.exhausted() || self.config.backoff_between_endpoints {
                    self.pause(delay).await?;
                }
            }

            self.logger
                .error(
                    &format!("All retries failed for {}", endpoint),
                    Some(json!({
                        "endpoint": endpoint,
                        "retries": ctx.retry_count(),
                        "remaining_endpoints": endpoint_count - index - 1,
                    })),
                )
                .await;
        }

        self.logger
            .error(
                "All endpoints failed, restoring backup data",
                Some(json!({"endpoints": endpoint_count})),
            )
            .await;
        Ok((ctx.backup().clone(), Outcome::RecoverySuccess))
    }

    /// Observes the cancellation token, if any, at an attempt boundary.
    fn check_cancelled(&self) -> Result<(), CollectError> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(CollectError::Cancelled);
            }
        }
        Ok(())
    }

    /// Sleeps for one backoff delay, aborting early on cancellation.
    async fn pause(&self, delay: std::time::Duration) -> Result<(), CollectError> {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(CollectError::Cancelled),
                    _ = sleep(delay) => Ok(()),
                }
            }
            None => {
                sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::mock::{MockOutcome, MockTransport};
    use crate::sysapi::config::ConfigError;
    use crate::sysapi::model::{AuthMode, OS_NAME_MAX_BYTES};
    use reqwest::header::{ACCEPT, AUTHORIZATION};
    use std::time::Duration;

    const FULL_BODY: &[u8] = br#"{"apimodel":7,"system":42,"osname":"Lumen"}"#;

    fn backup() -> SystemInfo {
        SystemInfo::new(1, 1, "Lumen")
    }

    fn test_config(endpoints: &[&str]) -> CollectorConfig {
        CollectorConfig {
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            backoff_unit_ms: 1,
            backup: backup(),
            ..CollectorConfig::default()
        }
    }

    fn collector(config: CollectorConfig, mock: &Arc<MockTransport>) -> Collector {
        let transport: Arc<dyn HttpTransport> = mock.clone();
        Collector::new(
            config,
            transport,
            Arc::new(LoggerLocal::disabled("collector_test".to_string())),
        )
    }

    fn context(config: &CollectorConfig) -> RecoveryContext {
        RecoveryContext::new(config.backup.clone(), config.max_retries)
    }

    #[tokio::test]
    async fn full_response_round_trips() {
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            200,
            FULL_BODY.to_vec(),
        )]));
        let config = test_config(&["http://primary.internal/api/system-info"]);
        let mut ctx = context(&config);

        let (info, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Success { degraded: false });
        assert_eq!(info, SystemInfo::new(7, 42, "Lumen"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_endpoint_is_attempted_exactly_max_retries_times() {
        let mock = Arc::new(MockTransport::scripted(vec![
            MockOutcome::Fail("connection refused".into()),
            MockOutcome::Fail("connection refused".into()),
            MockOutcome::Fail("connection refused".into()),
            MockOutcome::Respond(200, FULL_BODY.to_vec()),
        ]));
        let config = test_config(&["http://primary/api", "http://secondary/api"]);
        let mut ctx = context(&config);

        let (_, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Success { degraded: false });
        let calls = mock.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[..3].iter().all(|c| c.url == "http://primary/api"));
        assert_eq!(calls[3].url, "http://secondary/api");
    }

    #[tokio::test]
    async fn unauthorized_short_circuits_without_failover() {
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            401,
            Vec::new(),
        )]));
        let config = test_config(&["http://primary/api", "http://secondary/api"]);
        let mut ctx = context(&config);

        let (info, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::AuthFailed);
        assert_eq!(info, backup());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn exhausting_every_endpoint_returns_the_backup() {
        let mock = Arc::new(MockTransport::unreachable());
        let config = test_config(&["http://primary/api", "http://secondary/api"]);
        let mut ctx = context(&config);

        let (info, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::RecoverySuccess);
        assert_eq!(info, backup());
        // max_retries per endpoint, both endpoints.
        assert_eq!(mock.call_count(), 6);
    }

    #[tokio::test]
    async fn partial_payload_keeps_backup_fields_and_degrades() {
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            200,
            br#"{"apimodel":7}"#.to_vec(),
        )]));
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);

        let (info, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Success { degraded: true });
        assert_eq!(info.api_model, 7);
        assert_eq!(info.system_id, 1);
        assert_eq!(info.os_name, "Lumen");
    }

    #[tokio::test]
    async fn unparseable_body_is_retried_like_a_transport_failure() {
        let mock = Arc::new(MockTransport::scripted(vec![
            MockOutcome::Respond(200, b"<html>gateway</html>".to_vec()),
            MockOutcome::Respond(200, FULL_BODY.to_vec()),
        ]));
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);

        let (_, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Success { degraded: false });
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn server_errors_and_empty_bodies_are_retried() {
        let mock = Arc::new(MockTransport::scripted(vec![
            MockOutcome::Respond(500, b"oops".to_vec()),
            MockOutcome::Respond(200, Vec::new()),
            MockOutcome::Respond(200, FULL_BODY.to_vec()),
        ]));
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);

        let (_, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Success { degraded: false });
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn timeout_escalates_with_each_retry() {
        let mock = Arc::new(MockTransport::unreachable());
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);

        let _ = collector(config, &mock).collect(&mut ctx).await.unwrap();

        let timeouts: Vec<Duration> = mock.calls().iter().map(|c| c.timeout).collect();
        assert_eq!(
            timeouts,
            vec![
                Duration::from_secs(10),
                Duration::from_secs(12),
                Duration::from_secs(14),
            ]
        );
        assert!(mock.calls().iter().all(|c| c.connect_timeout == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn auth_headers_reach_the_transport() {
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            200,
            FULL_BODY.to_vec(),
        )]));
        let mut config = test_config(&["http://primary/api"]);
        config.auth = AuthMode::bearer("tok-9");
        let mut ctx = context(&config);

        let _ = collector(config, &mock).collect(&mut ctx).await.unwrap();

        let headers = &mock.calls()[0].headers;
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer tok-9"
        );
        assert_eq!(
            headers.get(ACCEPT).unwrap().to_str().unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn empty_endpoint_list_is_rejected_before_any_attempt() {
        let mock = Arc::new(MockTransport::unreachable());
        let mut config = test_config(&["http://primary/api"]);
        config.endpoints.clear();
        let mut ctx = context(&config);

        let err = collector(config, &mock).collect(&mut ctx).await.unwrap_err();

        assert!(matches!(err, CollectError::Config(ConfigError::NoEndpoints)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn stuck_in_progress_flag_raises_reentrancy() {
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            200,
            FULL_BODY.to_vec(),
        )]));
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);
        // Simulate a context abandoned mid-attempt.
        ctx.begin_attempt().unwrap();

        let err = collector(config, &mock).collect(&mut ctx).await.unwrap_err();

        assert!(matches!(err, CollectError::Reentrancy));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn context_is_reusable_across_sequential_runs() {
        let mock = Arc::new(MockTransport::scripted(vec![
            MockOutcome::Respond(200, FULL_BODY.to_vec()),
            MockOutcome::Respond(200, FULL_BODY.to_vec()),
        ]));
        let config = test_config(&["http://primary/api"]);
        let collector = collector(config, &mock);
        let mut ctx = RecoveryContext::with_default_retries(backup());

        let (_, first) = collector.collect(&mut ctx).await.unwrap();
        let (_, second) = collector.collect(&mut ctx).await.unwrap();

        assert_eq!(first, Outcome::Success { degraded: false });
        assert_eq!(second, Outcome::Success { degraded: false });
    }

    #[tokio::test]
    async fn pre_cancelled_token_aborts_before_any_attempt() {
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            200,
            FULL_BODY.to_vec(),
        )]));
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);

        let token = CancellationToken::new();
        token.cancel();
        let collector = collector(config, &mock).with_cancellation(token);

        let err = collector.collect(&mut ctx).await.unwrap_err();
        assert!(matches!(err, CollectError::Cancelled));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn oversized_osname_is_bounded_in_the_result() {
        let body = format!(
            r#"{{"apimodel":7,"system":42,"osname":"{}"}}"#,
            "n".repeat(150)
        );
        let mock = Arc::new(MockTransport::scripted(vec![MockOutcome::Respond(
            200,
            body.into_bytes(),
        )]));
        let config = test_config(&["http://primary/api"]);
        let mut ctx = context(&config);

        let (info, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Success { degraded: false });
        assert_eq!(info.os_name.len(), OS_NAME_MAX_BYTES);
    }

    #[tokio::test]
    async fn skipping_the_inter_endpoint_wait_keeps_attempt_counts() {
        let mock = Arc::new(MockTransport::unreachable());
        let mut config = test_config(&["http://primary/api", "http://secondary/api"]);
        config.backoff_between_endpoints = false;
        let mut ctx = context(&config);

        let (info, outcome) = collector(config, &mock).collect(&mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::RecoverySuccess);
        assert_eq!(info, backup());
        assert_eq!(mock.call_count(), 6);
    }
}
