use core::net::Ipv4Addr;

use embassy_futures::block_on;

use super::*;
use crate::{
    config::TimeSyncConfig,
    network::{JoinStatusHandle, LinkEvent, LinkEventQueue},
    testing::{RecordingClient, RecordingPause, ScriptedClock, ScriptedStation, synced_sample},
};

const LEASE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 7);
const DROP: LinkEvent = LinkEvent::Disassociated { reason: 202 };

fn synchronizer(clock: ScriptedClock) -> TimeSynchronizer<RecordingClient, ScriptedClock> {
    TimeSynchronizer::new(
        RecordingClient::default(),
        clock,
        TimeSyncConfig::new("pool.ntp.org").unwrap(),
    )
}

#[test]
fn connected_join_syncs_time_exactly_once() {
    let events = LinkEventQueue::new();
    let status = JoinStatusHandle::new();
    let replies = [DROP, DROP, DROP, LinkEvent::AddressAcquired(LEASE)];
    let mut station = ScriptedStation::new(&events, &replies);
    let mut controller = ConnectionController::new(&events, &status);
    let mut sync = synchronizer(ScriptedClock::new(&[synced_sample()]));
    let mut pause = RecordingPause::default();
    let config = JoinConfig::new("net", "secret")
        .unwrap()
        .with_max_retries(3);

    let report = block_on(bring_up(
        &mut controller,
        &mut station,
        &config,
        &mut sync,
        &mut pause,
    ))
    .unwrap();

    assert_eq!(report.join, JoinReport::Connected { address: LEASE });
    assert_eq!(report.synced_time(), Some(synced_sample()));
    assert_eq!(report.status(), Status::Success);
    assert!(report.status().is_success());
    assert_eq!(controller.machine().retries(), 0);
    assert_eq!(sync.client().starts, 1);
    assert_eq!(sync.client().stops, 1);
}

#[test]
fn failed_join_never_syncs() {
    let events = LinkEventQueue::new();
    let status = JoinStatusHandle::new();
    let replies = [DROP, DROP, DROP];
    let mut station = ScriptedStation::new(&events, &replies);
    let mut controller = ConnectionController::new(&events, &status);
    let mut sync = synchronizer(ScriptedClock::new(&[synced_sample()]));
    let mut pause = RecordingPause::default();
    let config = JoinConfig::new("net", "secret")
        .unwrap()
        .with_max_retries(2);

    let report = block_on(bring_up(
        &mut controller,
        &mut station,
        &config,
        &mut sync,
        &mut pause,
    ))
    .unwrap();

    assert_eq!(report.join, JoinReport::Failed { retries: 2 });
    assert_eq!(report.time, None);
    assert_eq!(report.status(), Status::Internal);
    assert_eq!(sync.client().starts, 0);
    assert_eq!(sync.clock().reads.get(), 0);
}

#[test]
fn timed_out_join_never_syncs() {
    let events = LinkEventQueue::new();
    let status = JoinStatusHandle::new();
    let mut station = ScriptedStation::silent(&events);
    let mut controller = ConnectionController::new(&events, &status);
    let mut sync = synchronizer(ScriptedClock::new(&[synced_sample()]));
    let mut pause = RecordingPause::default();
    let config = JoinConfig::new("net", "secret").unwrap();

    let report = block_on(bring_up(
        &mut controller,
        &mut station,
        &config,
        &mut sync,
        &mut pause,
    ))
    .unwrap();

    assert_eq!(report.join, JoinReport::TimedOut);
    assert_eq!(report.status(), Status::Timeout);
    assert!(!report.status().is_success());
    assert_eq!(sync.client().starts, 0);
}

#[test]
fn unsynced_clock_reports_timeout_status() {
    let events = LinkEventQueue::new();
    let status = JoinStatusHandle::new();
    let replies = [LinkEvent::AddressAcquired(LEASE)];
    let mut station = ScriptedStation::new(&events, &replies);
    let mut controller = ConnectionController::new(&events, &status);
    let mut sync = synchronizer(ScriptedClock::stuck_at_epoch());
    let mut pause = RecordingPause::default();
    let config = JoinConfig::new("net", "secret").unwrap();

    let report = block_on(bring_up(
        &mut controller,
        &mut station,
        &config,
        &mut sync,
        &mut pause,
    ))
    .unwrap();

    assert_eq!(report.time, Some(Err(SyncError::TimedOut { polls: 4 })));
    assert_eq!(report.synced_time(), None);
    assert_eq!(report.status(), Status::Timeout);
    assert_eq!(report.status().code(), 0x0000_0400);
    assert_eq!(Status::from_code(0x0000_0400), Some(Status::Timeout));
    assert_eq!(sync.client().stops, 1);
}
