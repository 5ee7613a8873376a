//! # Collect Sysinfo
//!
//! Command-line entry point for one system-info collection run. Loads the
//! collector configuration (file, environment, or built-in defaults),
//! applies command-line overrides, runs the resilient collection, and
//! prints a status report. Ctrl-C cancels the run cooperatively.
//!
//! Exit codes: 0 for success and recovery (the caller still got a usable
//! record), 2 for authentication failure, 1 for hard failures.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use lib_collector::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use lib_collector::retrieve::transport::ReqwestTransport;
use lib_collector::sysapi::collector::Collector;
use lib_collector::sysapi::config::CollectorConfig;
use lib_collector::sysapi::model::{AuthMode, Outcome, SystemInfo};
use lib_collector::sysapi::recovery::RecoveryContext;
use lib_collector::utils::misc::utils::format_duration_hms;

/// Collects the system-info record from the configured endpoints, with
/// retry, failover, and backup fallback.
#[derive(Parser, Debug)]
#[command(name = "collect-sysinfo", version, about)]
struct Args {
    /// Path to a JSON configuration file; overrides the default search.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Candidate endpoint URL; repeat the flag to set the failover order.
    #[arg(long = "endpoint")]
    endpoints: Vec<String>,

    /// Username for HTTP Basic authentication.
    #[arg(long, requires = "password", conflicts_with = "bearer")]
    username: Option<String>,

    /// Password for HTTP Basic authentication.
    #[arg(long, requires = "username", conflicts_with = "bearer")]
    password: Option<String>,

    /// Bearer token for authentication.
    #[arg(long)]
    bearer: Option<String>,

    /// Retry budget per endpoint.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Suppress console logging; the final report is still printed.
    #[arg(long)]
    quiet: bool,
}

/// Prints the final report in the collector's classic format.
fn print_report(info: &SystemInfo, outcome: Outcome, ctx: &RecoveryContext, elapsed: std::time::Duration) {
    println!();
    println!("=== SYSTEM INFO COLLECTION ===");
    println!("Status: {}", outcome);
    println!("Retries used: {}/{}", ctx.retry_count(), ctx.max_retries());
    println!("Elapsed: {}", format_duration_hms(elapsed));
    println!(
        "Api model: {} | System id: {} | Os name: {}",
        info.api_model, info.system_id, info.os_name
    );
    println!("==============================");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logger = Arc::new(if args.quiet {
        LoggerLocal::disabled("collect-sysinfo".to_string())
    } else {
        LoggerLocal::new(
            "collect-sysinfo".to_string(),
            Some(LoggerLocalOptions {
                use_tty: Some(vec![6, 5, 4, 3]),
                use_file: None,
                log_dir: None,
            }),
        )
    });

    // Resolve configuration, then layer the command-line overrides on top.
    let mut config = match &args.config {
        Some(path) => CollectorConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CollectorConfig::load().context("loading collector configuration")?,
    };

    if !args.endpoints.is_empty() {
        config.endpoints = args.endpoints.clone();
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(token) = &args.bearer {
        config.auth = AuthMode::bearer(token);
    } else if let (Some(username), Some(password)) = (&args.username, &args.password) {
        config.auth = AuthMode::basic(username, password);
    }
    config.validate().context("validating collector configuration")?;

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let mut ctx = RecoveryContext::new(config.backup.clone(), config.max_retries);
    let collector = Collector::new(config, Arc::new(ReqwestTransport::new()), Arc::clone(&logger))
        .with_cancellation(token);

    logger.info("Starting system info collection", None).await;
    let started = Instant::now();

    match collector.collect(&mut ctx).await {
        Ok((info, outcome)) => {
            print_report(&info, outcome, &ctx, started.elapsed());
            if outcome == Outcome::AuthFailed {
                std::process::exit(2);
            }
            Ok(())
        }
        Err(err) => {
            logger
                .fatal(
                    &format!("Collection failed: {}", err),
                    Some(serde_json::json!({"error": err.to_string()})),
                )
                .await;
            std::process::exit(1);
        }
    }
}
