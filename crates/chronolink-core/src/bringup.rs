//! Boot-time sequence: join the configured network, then sync the clock once.

use log::info;

use crate::{
    config::JoinConfig,
    network::{ConnectionController, JoinReport, StartupError, StationDriver},
    status::Status,
    time::{Pause, SyncError, TimeSample, TimeSourceClient, TimeSynchronizer, WallClock},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BringUpReport {
    pub join: JoinReport,
    /// `None` unless the join connected.
    pub time: Option<Result<TimeSample, SyncError>>,
}

impl BringUpReport {
    pub fn status(&self) -> Status {
        match (self.join, self.time) {
            (JoinReport::Connected { .. }, Some(Err(err))) => err.status(),
            (join, _) => join.status(),
        }
    }

    pub fn synced_time(&self) -> Option<TimeSample> {
        self.time.and_then(Result::ok)
    }
}

pub async fn bring_up<D, C, K, P>(
    controller: &mut ConnectionController<'_>,
    driver: &mut D,
    config: &JoinConfig,
    synchronizer: &mut TimeSynchronizer<C, K>,
    pause: &mut P,
) -> Result<BringUpReport, StartupError<D::Error>>
where
    D: StationDriver,
    C: TimeSourceClient,
    K: WallClock,
    P: Pause,
{
    let join = controller.join(driver, config, pause).await?;

    let time = match join {
        JoinReport::Connected { address } => {
            info!(
                "bring-up: connected to ssid={} as {}",
                config.ssid(),
                address
            );
            Some(synchronizer.sync_once(pause).await)
        }
        JoinReport::Failed { retries } => {
            info!(
                "bring-up: failed to connect to ssid={} after {} retries",
                config.ssid(),
                retries
            );
            None
        }
        JoinReport::TimedOut => None,
    };

    Ok(BringUpReport { join, time })
}

#[cfg(test)]
mod tests;
