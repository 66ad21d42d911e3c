use core::net::Ipv4Addr;

use embassy_futures::select::{Either, select};
use log::{debug, error, info, warn};

use super::{
    ConnectionOutcome, JoinMachine, JoinStatusHandle, JoinStep, LinkEvent, LinkEventQueue,
    StartupError, StationDriver,
};
use crate::{config::JoinConfig, status::Status, time::Pause};

/// Result of one join cycle as seen by the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinReport {
    Connected { address: Ipv4Addr },
    Failed { retries: u8 },
    /// Neither outcome arrived within the wait timeout.
    TimedOut,
}

impl JoinReport {
    pub const fn outcome(self) -> ConnectionOutcome {
        match self {
            Self::Connected { .. } => ConnectionOutcome::Connected,
            Self::Failed { .. } => ConnectionOutcome::Failed,
            Self::TimedOut => ConnectionOutcome::Pending,
        }
    }

    pub const fn status(self) -> Status {
        match self {
            Self::Connected { .. } => Status::Success,
            Self::Failed { .. } => Status::Internal,
            Self::TimedOut => Status::Timeout,
        }
    }
}

/// Drives a station from idle to connected or failed, consuming link events
/// from a queue filled by the driver's own context.
pub struct ConnectionController<'a> {
    events: &'a LinkEventQueue,
    status: &'a JoinStatusHandle,
    machine: JoinMachine,
}

impl<'a> ConnectionController<'a> {
    pub const fn new(events: &'a LinkEventQueue, status: &'a JoinStatusHandle) -> Self {
        Self {
            events,
            status,
            machine: JoinMachine::new(0),
        }
    }

    pub const fn machine(&self) -> &JoinMachine {
        &self.machine
    }

    /// Run one join cycle.
    ///
    /// Every call starts from [`super::JoinState::Idle`] with a zero retry
    /// count. Driver configuration and start failures are returned as
    /// [`StartupError`]; association failures are reported in the
    /// [`JoinReport`].
    pub async fn join<D, P>(
        &mut self,
        driver: &mut D,
        config: &JoinConfig,
        pause: &mut P,
    ) -> Result<JoinReport, StartupError<D::Error>>
    where
        D: StationDriver,
        P: Pause,
    {
        self.machine.reset(config.max_retries());
        self.status.mark_idle();

        let stale = self.drain_stale_events();
        if stale > 0 {
            debug!("join: dropped {} stale link events", stale);
        }

        info!(
            "join: initializing station ssid={} auth_floor={} sae={} max_retries={}",
            config.ssid(),
            config.auth_floor().as_str(),
            config.sae_mode().as_str(),
            config.max_retries()
        );

        if let Err(err) = driver.configure(config) {
            error!("join: station configure failed: {:?}", err);
            return Err(StartupError::Configure(err));
        }
        if let Err(err) = driver.start().await {
            error!("join: station start failed: {:?}", err);
            return Err(StartupError::Start(err));
        }
        info!("join: station started; waiting for outcome");

        let waited = select(
            self.drive(driver),
            pause.pause_ms(config.wait_timeout_ms()),
        )
        .await;

        let report = match waited {
            Either::First(report) => report,
            Either::Second(()) => {
                error!(
                    "join: unexpected event: no outcome within {}ms (state={:?} retries={})",
                    config.wait_timeout_ms(),
                    self.machine.state(),
                    self.machine.retries()
                );
                JoinReport::TimedOut
            }
        };
        Ok(report)
    }

    async fn drive<D: StationDriver>(&mut self, driver: &mut D) -> JoinReport {
        loop {
            let event = self.events.receive().await;
            if let LinkEvent::Disassociated { reason } = event {
                info!("join: connect to the AP failed (reason={})", reason);
            }

            match self.machine.on_event(event) {
                JoinStep::Associate => {
                    self.status.mark_associating();
                    Self::associate(driver).await;
                }
                JoinStep::Retry { attempt } => {
                    info!(
                        "join: retry to connect to the AP ({}/{})",
                        attempt,
                        self.machine.max_retries()
                    );
                    self.status.record_retry(attempt);
                    Self::associate(driver).await;
                }
                JoinStep::Connected(address) => {
                    info!("join: got ip {}", address);
                    self.status.mark_connected(address);
                    return JoinReport::Connected { address };
                }
                JoinStep::Failed { retries } => {
                    warn!("join: giving up after {} retries", retries);
                    self.status.mark_failed(retries);
                    return JoinReport::Failed { retries };
                }
                JoinStep::Ignored => debug!("join: ignored {:?}", event),
            }
        }
    }

    async fn associate<D: StationDriver>(driver: &mut D) {
        if let Err(err) = driver.associate().await {
            warn!("join: associate request failed: {:?}", err);
        }
    }

    fn drain_stale_events(&self) -> usize {
        let mut drained = 0;
        while self.events.try_receive().is_ok() {
            drained += 1;
        }
        drained
    }
}
