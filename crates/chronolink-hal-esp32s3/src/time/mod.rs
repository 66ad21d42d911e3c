//! RTC-backed wall clock, embassy-time pauses and the SNTP time source.

pub mod sntp;

use chronolink_core::time::{Pause, TimeSample, WallClock};
use embassy_time::Timer;
use esp_hal::rtc_cntl::Rtc;

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Wall clock read from the low-power RTC, which the SNTP runner sets.
#[derive(Clone, Copy)]
pub struct RtcWallClock<'a> {
    rtc: &'a Rtc<'a>,
}

impl<'a> RtcWallClock<'a> {
    pub const fn new(rtc: &'a Rtc<'a>) -> Self {
        Self { rtc }
    }
}

impl WallClock for RtcWallClock<'_> {
    fn now(&self) -> TimeSample {
        let seconds = self.rtc.current_time_us() / MICROS_PER_SECOND;
        i64::try_from(seconds)
            .ok()
            .and_then(TimeSample::from_unix_seconds)
            .unwrap_or(TimeSample::EPOCH)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyPause;

impl Pause for EmbassyPause {
    async fn pause_ms(&mut self, duration_ms: u64) {
        Timer::after_millis(duration_ms).await;
    }
}
