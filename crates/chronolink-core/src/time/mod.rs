//! Wall-clock sampling and the bounded post-join time sync.

mod sync;

pub use sync::{
    DEFAULT_ATTEMPT_CEILING, DEFAULT_PLAUSIBLE_YEAR, DEFAULT_POLL_INTERVAL_MS, SyncError,
    SyncPolicy, TimeSynchronizer,
};

use core::{fmt, future::Future};

use chrono::{DateTime, Datelike, Timelike};

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One calendar reading of the system clock (UTC).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeSample {
    pub year: i32,
    /// 1-based.
    pub month: u8,
    pub day: u8,
    /// Days since Monday.
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeSample {
    /// Reading of a clock that was never set.
    pub const EPOCH: Self = Self {
        year: 1970,
        month: 1,
        day: 1,
        weekday: 3,
        hour: 0,
        minute: 0,
        second: 0,
    };

    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        let at = DateTime::from_timestamp(seconds, 0)?;
        Some(Self {
            year: at.year(),
            month: at.month() as u8,
            day: at.day() as u8,
            weekday: at.weekday().num_days_from_monday() as u8,
            hour: at.hour() as u8,
            minute: at.minute() as u8,
            second: at.second() as u8,
        })
    }

    /// A clock still near its reset epoch reads before `threshold_year`.
    pub const fn is_plausible(&self, threshold_year: i32) -> bool {
        self.year >= threshold_year
    }
}

impl fmt::Display for TimeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weekday = WEEKDAY_NAMES.get(self.weekday as usize).unwrap_or(&"???");
        let month = MONTH_NAMES
            .get((self.month as usize).wrapping_sub(1))
            .unwrap_or(&"???");
        write!(
            f,
            "{} {} {:>2} {:02}:{:02}:{:02} {}",
            weekday, month, self.day, self.hour, self.minute, self.second, self.year
        )
    }
}

/// Source of the current calendar time.
pub trait WallClock {
    fn now(&self) -> TimeSample;
}

/// Network time client that sets the wall clock in the background once started.
pub trait TimeSourceClient {
    type Error: fmt::Debug;

    fn set_server(&mut self, server: &str) -> Result<(), Self::Error>;

    /// Begin polling the configured server.
    fn start(&mut self) -> Result<(), Self::Error>;

    fn stop(&mut self);
}

/// Suspends the calling task.
pub trait Pause {
    fn pause_ms(&mut self, duration_ms: u64) -> impl Future<Output = ()>;
}
