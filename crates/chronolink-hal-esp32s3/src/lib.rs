//! ESP32-S3 adapters for the chronolink core: esp-radio station driver, link
//! event sources, RTC wall clock and the SNTP client.

#![no_std]

pub mod network;
pub mod time;
