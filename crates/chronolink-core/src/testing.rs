//! Scripted collaborators for host tests.

use core::cell::Cell;

use crate::{
    config::JoinConfig,
    network::{LinkEvent, LinkEventQueue, StationDriver},
    time::{Pause, TimeSample, TimeSourceClient, WallClock},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FakeError {
    Configure,
    Start,
    Rejected,
}

/// Station driver that answers each association request with the next
/// scripted link event.
pub(crate) struct ScriptedStation<'a> {
    events: &'a LinkEventQueue,
    replies: &'a [LinkEvent],
    cursor: usize,
    pub(crate) announce_start: bool,
    /// Report a disconnect from the previous link before announcing start.
    pub(crate) drop_link_on_start: bool,
    pub(crate) fail_configure: bool,
    pub(crate) fail_start: bool,
    pub(crate) configure_calls: usize,
    pub(crate) start_calls: usize,
    pub(crate) associate_calls: usize,
}

impl<'a> ScriptedStation<'a> {
    pub(crate) fn new(events: &'a LinkEventQueue, replies: &'a [LinkEvent]) -> Self {
        Self {
            events,
            replies,
            cursor: 0,
            announce_start: true,
            drop_link_on_start: false,
            fail_configure: false,
            fail_start: false,
            configure_calls: 0,
            start_calls: 0,
            associate_calls: 0,
        }
    }

    /// A driver that starts but never reports anything.
    pub(crate) fn silent(events: &'a LinkEventQueue) -> Self {
        let mut station = Self::new(events, &[]);
        station.announce_start = false;
        station
    }
}

impl StationDriver for ScriptedStation<'_> {
    type Error = FakeError;

    fn configure(&mut self, _config: &JoinConfig) -> Result<(), Self::Error> {
        self.configure_calls += 1;
        if self.fail_configure {
            return Err(FakeError::Configure);
        }
        Ok(())
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        self.start_calls += 1;
        if self.fail_start {
            return Err(FakeError::Start);
        }
        if self.drop_link_on_start {
            self.events
                .try_send(LinkEvent::Disassociated { reason: 8 })
                .unwrap();
        }
        if self.announce_start {
            self.events.try_send(LinkEvent::StationStarted).unwrap();
        }
        Ok(())
    }

    async fn associate(&mut self) -> Result<(), Self::Error> {
        self.associate_calls += 1;
        if let Some(reply) = self.replies.get(self.cursor).copied() {
            self.cursor += 1;
            self.events.try_send(reply).unwrap();
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingClient {
    pub(crate) server: Option<String>,
    pub(crate) reject_start: bool,
    pub(crate) starts: usize,
    pub(crate) stops: usize,
}

impl TimeSourceClient for RecordingClient {
    type Error = FakeError;

    fn set_server(&mut self, server: &str) -> Result<(), Self::Error> {
        self.server = Some(server.to_owned());
        Ok(())
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        if self.reject_start {
            return Err(FakeError::Rejected);
        }
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Clock returning scripted readings in order, repeating the last one.
pub(crate) struct ScriptedClock {
    readings: Vec<TimeSample>,
    pub(crate) reads: Cell<usize>,
}

impl ScriptedClock {
    pub(crate) fn new(readings: &[TimeSample]) -> Self {
        Self {
            readings: readings.to_vec(),
            reads: Cell::new(0),
        }
    }

    pub(crate) fn stuck_at_epoch() -> Self {
        Self::new(&[TimeSample::EPOCH])
    }
}

impl WallClock for ScriptedClock {
    fn now(&self) -> TimeSample {
        let index = self.reads.get();
        self.reads.set(index + 1);
        self.readings
            .get(index)
            .or(self.readings.last())
            .copied()
            .unwrap_or(TimeSample::EPOCH)
    }
}

/// Pause that completes immediately and records every requested duration.
#[derive(Default)]
pub(crate) struct RecordingPause {
    pub(crate) requested_ms: Vec<u64>,
}

impl Pause for RecordingPause {
    async fn pause_ms(&mut self, duration_ms: u64) {
        self.requested_ms.push(duration_ms);
    }
}

pub(crate) fn synced_sample() -> TimeSample {
    TimeSample::from_unix_seconds(1_747_477_323).unwrap()
}
