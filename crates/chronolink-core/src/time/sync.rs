use log::{info, warn};

use super::{Pause, TimeSample, TimeSourceClient, WallClock};
use crate::{config::TimeSyncConfig, status::Status};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_ATTEMPT_CEILING: u8 = 5;
pub const DEFAULT_PLAUSIBLE_YEAR: i32 = 2025;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncPolicy {
    pub poll_interval_ms: u64,
    pub attempt_ceiling: u8,
    pub plausible_year: i32,
}

impl SyncPolicy {
    pub const fn new() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            attempt_ceiling: DEFAULT_ATTEMPT_CEILING,
            plausible_year: DEFAULT_PLAUSIBLE_YEAR,
        }
    }

    /// Sleep-and-read polls one sync performs before giving up.
    ///
    /// The attempt counter is incremented before it is tested against the
    /// ceiling, so a ceiling of 5 yields 4 polls.
    pub const fn poll_budget(self) -> u8 {
        self.attempt_ceiling.saturating_sub(1)
    }
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncError {
    /// The time-source client refused its configuration or start request.
    Client,
    /// The clock never became plausible within the poll budget.
    TimedOut { polls: u8 },
}

impl SyncError {
    pub const fn status(self) -> Status {
        match self {
            Self::Client => Status::Internal,
            Self::TimedOut { .. } => Status::Timeout,
        }
    }
}

/// Polls the wall clock until a started time-source client has set it.
pub struct TimeSynchronizer<C, K> {
    client: C,
    clock: K,
    config: TimeSyncConfig,
}

impl<C, K> TimeSynchronizer<C, K>
where
    C: TimeSourceClient,
    K: WallClock,
{
    pub fn new(client: C, clock: K, config: TimeSyncConfig) -> Self {
        Self {
            client,
            clock,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Run one bounded sync. The client is stopped before returning, whatever
    /// the outcome.
    pub async fn sync_once<P: Pause>(&mut self, pause: &mut P) -> Result<TimeSample, SyncError> {
        let result = self.poll_until_plausible(pause).await;
        self.client.stop();

        match result {
            Ok(sample) => info!("time sync: time synchronized: {}", sample),
            Err(SyncError::TimedOut { polls }) => {
                warn!("time sync: time not synchronized after {} polls", polls)
            }
            Err(SyncError::Client) => warn!("time sync: time source client unavailable"),
        }
        result
    }

    async fn poll_until_plausible<P: Pause>(
        &mut self,
        pause: &mut P,
    ) -> Result<TimeSample, SyncError> {
        let policy = self.config.policy();

        if let Err(err) = self.client.set_server(self.config.server()) {
            warn!(
                "time sync: server {} rejected: {:?}",
                self.config.server(),
                err
            );
            return Err(SyncError::Client);
        }
        if let Err(err) = self.client.start() {
            warn!("time sync: client start failed: {:?}", err);
            return Err(SyncError::Client);
        }

        let mut sample: Option<TimeSample> = None;
        let mut attempt = 0u8;
        loop {
            if sample.is_some_and(|sample| sample.is_plausible(policy.plausible_year)) {
                break;
            }
            attempt = attempt.saturating_add(1);
            if attempt >= policy.attempt_ceiling {
                break;
            }

            info!(
                "time sync: waiting for system time to be set... ({}/{})",
                attempt, policy.attempt_ceiling
            );
            pause.pause_ms(policy.poll_interval_ms).await;
            sample = Some(self.clock.now());
        }

        match sample {
            Some(sample) if sample.is_plausible(policy.plausible_year) => Ok(sample),
            _ => Err(SyncError::TimedOut {
                polls: policy.poll_budget(),
            }),
        }
    }
}
