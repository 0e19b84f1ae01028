use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval};

/// What a subscription keeps fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollSource {
    Sessions,
    History { session_id: String },
}

/// A periodic trigger bound to one data source.
///
/// The first tick fires immediately. Dropping the subscription stops
/// further ticks; requests already spawned are not cancelled.
#[derive(Debug)]
pub struct PollingSubscription {
    source: PollSource,
    generation: u64,
    interval: Interval,
}

impl PollingSubscription {
    pub fn new(source: PollSource, generation: u64, period: Duration) -> Self {
        // tokio panics on a zero period
        let mut interval = interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            source,
            generation,
            interval,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session_id(&self) -> Option<&str> {
        match &self.source {
            PollSource::History { session_id } => Some(session_id),
            PollSource::Sessions => None,
        }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

/// Waits for the next tick of `subscription`, or forever when there is none.
pub async fn next_tick(subscription: &mut Option<PollingSubscription>) {
    match subscription {
        Some(active) => {
            active.interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
