//! Entry point for statlog_agent. Parses the interval, opens the store, and
//! samples until Ctrl+C or SIGTERM.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use statlog_agent::cli::{parse_args, usage, Command};
use statlog_agent::scheduler::{self, shutdown_signal, Session};
use statlog_agent::{SqliteRecorder, SysinfoSampler, DEFAULT_STORE_PATH};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout is reserved for the per-sample lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let prog = env::args()
        .next()
        .unwrap_or_else(|| "statlog_agent".into());
    let interval = match parse_args(env::args()) {
        Ok(Command::Run { interval }) => interval,
        Ok(Command::Help) => {
            println!("{}", usage(&prog));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", usage(&prog));
            return ExitCode::from(2);
        }
    };

    match record(interval).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("statlog_agent: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn record(interval: Duration) -> anyhow::Result<()> {
    let shutdown = shutdown_signal();
    let recorder = SqliteRecorder::initialize(DEFAULT_STORE_PATH)
        .await
        .with_context(|| format!("failed to initialize store {DEFAULT_STORE_PATH}"))?;
    let sampler = SysinfoSampler::new();

    let mut session = Session::new(sampler, recorder);
    scheduler::run(&mut session, interval, shutdown).await;

    let (_, recorder) = session.into_parts();
    if let Err(e) = recorder.close().await {
        warn!("failed to close store cleanly: {e}");
    }
    Ok(())
}
