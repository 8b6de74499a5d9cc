use std::sync::Arc;
use std::time::Duration;

use agenda_agent::AgentRuntime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Sweeps idle sessions on a fixed cadence. Sessions mid-turn are skipped by
/// the store and picked up on a later tick.
pub fn spawn(runtime: Arc<AgentRuntime>, every: Duration) -> JoinHandle<()> {
    info!(
        event_name = "system.reaper.start",
        correlation_id = "bootstrap",
        interval_secs = every.as_secs(),
        ttl_secs = runtime.settings().session_ttl.as_secs(),
        "session reaper started"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let reaped = runtime.sweep_expired().await;
            let remaining = runtime.active_sessions().await;
            debug!(
                event_name = "system.reaper.swept",
                correlation_id = "reaper",
                reaped,
                remaining,
            );
        }
    })
}
