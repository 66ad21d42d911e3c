//! Hardware-free core of the station bring-up: configuration, the join state
//! machine and its controller, and the bounded time-sync routine.

#![cfg_attr(not(test), no_std)]

pub mod bringup;
pub mod config;
pub mod network;
pub mod status;
pub mod time;

#[cfg(test)]
mod testing;
