//! Station association lifecycle: link events, the join state machine, and the
//! controller that waits on its outcome.

mod controller;
mod machine;
mod status;

pub use controller::{ConnectionController, JoinReport};
pub use machine::{ConnectionOutcome, JoinMachine, JoinState, JoinStep};
pub use status::{JoinStatusHandle, JoinStatusSnapshot};

use core::{fmt, future::Future, net::Ipv4Addr};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};

use crate::{config::JoinConfig, status::Status};

pub const LINK_EVENT_QUEUE_DEPTH: usize = 8;

/// Link-state change reported by the Wi-Fi driver or the IP stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkEvent {
    StationStarted,
    /// `reason` is the driver's raw disconnect reason code.
    Disassociated { reason: u8 },
    AddressAcquired(Ipv4Addr),
}

/// Cross-context queue from event producers to the connection controller.
pub type LinkEventQueue = Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_QUEUE_DEPTH>;

/// Wi-Fi station operations the controller drives.
pub trait StationDriver {
    type Error: fmt::Debug;

    /// Select station mode and apply credentials and security settings.
    fn configure(&mut self, config: &JoinConfig) -> Result<(), Self::Error>;

    /// Start the driver, restarting it if already running. A started driver
    /// reports [`LinkEvent::StationStarted`].
    fn start(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Initiate association. A failed attempt surfaces later as
    /// [`LinkEvent::Disassociated`].
    fn associate(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Unrecoverable driver failure while bringing the station up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartupError<E> {
    Configure(E),
    Start(E),
}

impl<E> StartupError<E> {
    pub const fn status(&self) -> Status {
        Status::Internal
    }
}
