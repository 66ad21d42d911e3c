//! Join progress shared between the controller and observer tasks.

use core::{
    net::Ipv4Addr,
    sync::atomic::{AtomicU8, AtomicU32, Ordering},
};

use super::{ConnectionOutcome, JoinState};

/// Immutable join status snapshot for logging and other tasks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinStatusSnapshot {
    pub state: JoinState,
    pub retries: u8,
    pub address: Option<Ipv4Addr>,
    pub revision: u32,
}

impl JoinStatusSnapshot {
    pub const fn outcome(self) -> ConnectionOutcome {
        self.state.outcome()
    }
}

/// Lock-free shared join status.
///
/// Written only by the controller; the outcome stays published until the next
/// join cycle resets it.
#[derive(Debug)]
pub struct JoinStatusHandle {
    state: AtomicU8,
    retries: AtomicU8,
    address: AtomicU32,
    revision: AtomicU32,
}

impl JoinStatusHandle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(JoinState::Idle as u8),
            retries: AtomicU8::new(0),
            address: AtomicU32::new(0),
            revision: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> JoinStatusSnapshot {
        let address = self.address.load(Ordering::Acquire);
        JoinStatusSnapshot {
            state: JoinState::from_raw(self.state.load(Ordering::Acquire)),
            retries: self.retries.load(Ordering::Acquire),
            // DHCP never leases the unspecified address.
            address: (address != 0).then(|| Ipv4Addr::from_bits(address)),
            revision: self.revision.load(Ordering::Acquire),
        }
    }

    pub fn mark_idle(&self) {
        let mut changed = false;
        changed |= self.store_u32(&self.address, 0);
        changed |= self.store_u8(&self.retries, 0);
        changed |= self.store_u8(&self.state, JoinState::Idle as u8);
        if changed {
            self.bump_revision();
        }
    }

    pub fn mark_associating(&self) {
        if self.store_u8(&self.state, JoinState::Associating as u8) {
            self.bump_revision();
        }
    }

    pub fn record_retry(&self, retries: u8) {
        let mut changed = false;
        changed |= self.store_u8(&self.retries, retries);
        changed |= self.store_u8(&self.state, JoinState::Associating as u8);
        if changed {
            self.bump_revision();
        }
    }

    pub fn mark_connected(&self, address: Ipv4Addr) {
        let mut changed = false;
        changed |= self.store_u32(&self.address, address.to_bits());
        changed |= self.store_u8(&self.retries, 0);
        changed |= self.store_u8(&self.state, JoinState::Connected as u8);
        if changed {
            self.bump_revision();
        }
    }

    pub fn mark_failed(&self, retries: u8) {
        let mut changed = false;
        changed |= self.store_u8(&self.retries, retries);
        changed |= self.store_u8(&self.state, JoinState::Failed as u8);
        if changed {
            self.bump_revision();
        }
    }

    fn store_u8(&self, cell: &AtomicU8, next: u8) -> bool {
        cell.swap(next, Ordering::AcqRel) != next
    }

    fn store_u32(&self, cell: &AtomicU32, next: u32) -> bool {
        cell.swap(next, Ordering::AcqRel) != next
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for JoinStatusHandle {
    fn default() -> Self {
        Self::new()
    }
}
