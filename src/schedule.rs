use std::future::Future;
use std::time::Duration;

/// Suspends the caller between polling cycles
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer (honours `tokio::time::pause` in tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Fixed-interval retry schedule. There is no deadline: callers retry until their
/// condition holds or they give up on their own.
#[derive(Debug, Clone)]
pub struct RetrySchedule<P = TokioSleeper> {
    interval: Duration,
    sleeper: P,
    cycles: u64,
}

impl RetrySchedule<TokioSleeper> {
    pub fn new(interval: Duration) -> Self {
        Self::with_sleeper(interval, TokioSleeper)
    }
}

impl<P: Sleeper> RetrySchedule<P> {
    pub fn with_sleeper(interval: Duration, sleeper: P) -> Self {
        Self {
            interval,
            sleeper,
            cycles: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of pauses taken so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn sleeper(&self) -> &P {
        &self.sleeper
    }

    /// Wait one interval before the next attempt
    pub async fn pause(&mut self) {
        self.cycles += 1;
        self.sleeper.sleep(self.interval).await;
    }
}
