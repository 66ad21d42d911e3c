use core::net::Ipv4Addr;

use super::LinkEvent;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ConnectionOutcome {
    Pending = 0,
    Connected = 1,
    Failed = 2,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum JoinState {
    Idle = 0,
    Associating = 1,
    Connected = 2,
    Failed = 3,
}

impl JoinState {
    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Associating,
            2 => Self::Connected,
            3 => Self::Failed,
            _ => Self::Idle,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::Failed)
    }

    pub const fn outcome(self) -> ConnectionOutcome {
        match self {
            Self::Idle | Self::Associating => ConnectionOutcome::Pending,
            Self::Connected => ConnectionOutcome::Connected,
            Self::Failed => ConnectionOutcome::Failed,
        }
    }
}

/// What the controller must do after feeding one event to the machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinStep {
    Associate,
    Retry { attempt: u8 },
    Connected(Ipv4Addr),
    Failed { retries: u8 },
    Ignored,
}

/// Retry-bounded association state for one join cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinMachine {
    state: JoinState,
    retries: u8,
    max_retries: u8,
}

impl JoinMachine {
    pub const fn new(max_retries: u8) -> Self {
        Self {
            state: JoinState::Idle,
            retries: 0,
            max_retries,
        }
    }

    pub fn reset(&mut self, max_retries: u8) {
        *self = Self::new(max_retries);
    }

    pub fn on_event(&mut self, event: LinkEvent) -> JoinStep {
        // Terminal states hold until the next reset.
        if self.state.is_terminal() {
            return JoinStep::Ignored;
        }

        match event {
            LinkEvent::StationStarted => {
                self.state = JoinState::Associating;
                JoinStep::Associate
            }
            // A disconnect before the station starts is the driver tearing
            // down the previous cycle's link.
            LinkEvent::Disassociated { .. } if self.state == JoinState::Idle => JoinStep::Ignored,
            LinkEvent::Disassociated { .. } if self.retries < self.max_retries => {
                self.retries += 1;
                self.state = JoinState::Associating;
                JoinStep::Retry {
                    attempt: self.retries,
                }
            }
            LinkEvent::Disassociated { .. } => {
                self.state = JoinState::Failed;
                JoinStep::Failed {
                    retries: self.retries,
                }
            }
            LinkEvent::AddressAcquired(address) => {
                self.retries = 0;
                self.state = JoinState::Connected;
                JoinStep::Connected(address)
            }
        }
    }

    pub const fn state(&self) -> JoinState {
        self.state
    }

    pub const fn outcome(&self) -> ConnectionOutcome {
        self.state.outcome()
    }

    pub const fn retries(&self) -> u8 {
        self.retries
    }

    pub const fn max_retries(&self) -> u8 {
        self.max_retries
    }
}
