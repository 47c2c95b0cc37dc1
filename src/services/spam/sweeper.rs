use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::services::spam::clock::Clock;

/// Start the idle-user sweeper if one is configured
pub fn spawn_idle_sweeper<C>(data: Arc<Data<C>>) -> Option<JoinHandle<()>>
where
    C: Clock + 'static,
{
    let every = data.settings.sweep_interval()?;
    let max_idle = data.settings.idle_threshold();

    info!(
        "Started idle sweeper (every {:?}, idle after {:?})",
        every, max_idle
    );

    Some(tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            sweep_once(&data, max_idle);
        }
    }))
}

fn sweep_once<C: Clock>(data: &Data<C>, max_idle: Duration) -> usize {
    let swept = data.rate_limiter.sweep_idle(max_idle);
    if swept > 0 {
        debug!(
            "Swept {} idle users, {} still tracked",
            swept,
            data.rate_limiter.tracked_users()
        );
    }
    swept
}
