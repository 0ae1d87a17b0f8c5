//! Backend liveness state.
//!
//! # States
//! - Unknown: never probed, not routable
//! - Alive: last probe answered 200 OK
//! - Down: last probe failed or answered anything else
//!
//! The policy is binary: there is no degraded state and no hysteresis.
//! Each probe result replaces the previous one.

use std::sync::atomic::{AtomicU8, Ordering};

/// Health State enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Alive = 1,
    Down = 2,
}

impl HealthState {
    /// Only a backend observed alive receives traffic.
    pub fn is_routable(self) -> bool {
        self == HealthState::Alive
    }

    fn from_probe(alive: bool) -> Self {
        if alive {
            HealthState::Alive
        } else {
            HealthState::Down
        }
    }
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Alive,
            2 => HealthState::Down,
            _ => HealthState::Unknown,
        }
    }
}

/// Lock-free cell holding the last observed `HealthState`.
#[derive(Debug)]
pub struct HealthCell(AtomicU8);

impl HealthCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(HealthState::Unknown as u8))
    }

    pub fn get(&self) -> HealthState {
        HealthState::from(self.0.load(Ordering::Acquire))
    }

    /// Record a probe result, returning the state it replaced.
    pub fn set(&self, alive: bool) -> HealthState {
        let next = HealthState::from_probe(alive) as u8;
        HealthState::from(self.0.swap(next, Ordering::AcqRel))
    }
}

impl Default for HealthCell {
    fn default() -> Self {
        Self::new()
    }
}
