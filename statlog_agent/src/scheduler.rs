//! Tick loop: on a fixed period, sample the host and append the result.
//! Failures skip the tick; only the shutdown future ends the loop.

use std::future::Future;

use tokio::signal;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::error::StatError;
use crate::metrics::Sampler;
use crate::store::Recorder;
use crate::types::Sample;

// ~30 years, stands in for a first tick that would overflow Instant
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug)]
pub enum TickOutcome {
    Recorded(Sample),
    Skipped(StatError),
}

impl TickOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, TickOutcome::Recorded(_))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub recorded: u64,
    pub skipped: u64,
}

/// Everything a tick touches: the sampler, the open store, and counters.
pub struct Session<S, R> {
    sampler: S,
    recorder: R,
    stats: TickStats,
}

impl<S: Sampler, R: Recorder> Session<S, R> {
    pub fn new(sampler: S, recorder: R) -> Self {
        Self {
            sampler,
            recorder,
            stats: TickStats::default(),
        }
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    pub fn into_parts(self) -> (S, R) {
        (self.sampler, self.recorder)
    }

    /// One sample-and-persist pass. Never panics on a bad read or write;
    /// the error is logged and returned in the outcome.
    pub async fn tick(&mut self) -> TickOutcome {
        let sample = match self.sampler.read() {
            Ok(s) => s,
            Err(e) => return self.skip(e),
        };
        if let Err(e) = self.recorder.append(&sample).await {
            return self.skip(e);
        }
        println!("Recorded stats: {sample}");
        self.stats.recorded += 1;
        TickOutcome::Recorded(sample)
    }

    fn skip(&mut self, e: StatError) -> TickOutcome {
        warn!("{e}");
        self.stats.skipped += 1;
        TickOutcome::Skipped(e)
    }
}

/// Run ticks every `period` until `shutdown` resolves.
///
/// Fixed-period: ticks are scheduled from the start time, not from the end
/// of the previous tick's work. A tick that overruns causes the missed
/// boundaries to be skipped rather than replayed in a burst. The first tick
/// fires one `period` after the call.
pub async fn run<S, R, F>(session: &mut Session<S, R>, period: Duration, shutdown: F) -> TickStats
where
    S: Sampler,
    R: Recorder,
    F: Future<Output = ()>,
{
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now + FAR_FUTURE);
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(period_secs = period.as_secs_f64(), "sampling started");
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                session.tick().await;
            }
        }
    }
    let stats = session.stats();
    info!(recorded = stats.recorded, skipped = stats.skipped, "sampling stopped");
    stats
}

/// Installs the Ctrl+C and (unix) SIGTERM handlers immediately, so a signal
/// that arrives while the store is being opened is held rather than killing
/// the process. The returned future resolves on the first signal.
pub fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let handlers = {
        use signal::unix::{signal, SignalKind};
        let install = |kind: SignalKind| {
            signal(kind)
                .map_err(|e| warn!("failed to install signal handler: {e}"))
                .ok()
        };
        (install(SignalKind::interrupt()), install(SignalKind::terminate()))
    };

    async move {
        #[cfg(unix)]
        {
            let (mut interrupt, mut terminate) = handlers;
            tokio::select! {
                _ = recv_or_pending(interrupt.as_mut()) => info!("received Ctrl+C"),
                _ = recv_or_pending(terminate.as_mut()) => info!("received terminate signal"),
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
            info!("received Ctrl+C");
        }
    }
}

#[cfg(unix)]
async fn recv_or_pending(sig: Option<&mut signal::unix::Signal>) {
    match sig {
        Some(sig) => {
            sig.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}
