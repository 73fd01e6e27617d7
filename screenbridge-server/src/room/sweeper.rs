use crate::config::MIN_SWEEP_INTERVAL;
use crate::signaling::SignalingRelay;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Runs the expiry sweep every `period` until the returned task is aborted.
/// Periods below [`MIN_SWEEP_INTERVAL`] are raised to it.
pub fn spawn_sweeper(relay: SignalingRelay, period: Duration) -> JoinHandle<()> {
    if period < MIN_SWEEP_INTERVAL {
        warn!(?period, "Sweep period too short, using {:?}", MIN_SWEEP_INTERVAL);
    }
    let period = period.max(MIN_SWEEP_INTERVAL);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = relay.sweep_expired(Instant::now()).await;
            let rooms = relay.registry().room_count().await;
            debug!(removed, rooms, "Sweep tick");
        }
    })
}
