//! Busy-cursor tracking driven by application startup notifications.
//!
//! Launchers announce every application start as a *startup sequence*
//! (initiated → changed* → completed | canceled).  While at least one
//! sequence is pending the root cursor shows a busy indicator.  Apps that
//! never report completion would leave the cursor stuck, so every
//! `Initiated` (re)arms a timeout that forces the tracker back to idle.
//!
//! The tracker has no clock or timer of its own: callers pass `now` with
//! each event and call [`BusyTracker::poll`] once the instant returned by
//! [`BusyTracker::deadline`] has passed.

use log::debug;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

/// How long a startup sequence may stay pending before it is forgotten.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Kind of a startup-notification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartupEventKind {
    Initiated,
    Changed,
    Completed,
    Canceled,
}

/// One startup-notification event.
///
/// Events without both a sequence id and a binary name are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupEvent {
    pub kind: StartupEventKind,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub binary_name: String,
}

impl StartupEvent {
    pub fn new(kind: StartupEventKind, id: impl Into<String>, binary_name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            binary_name: binary_name.into(),
        }
    }

    fn is_identified(&self) -> bool {
        !self.id.is_empty() && !self.binary_name.is_empty()
    }
}

/// Either nothing is starting, or `pending` sequences are in flight and
/// the tracker gives up on them at `deadline`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BusyState {
    #[default]
    Idle,
    Busy {
        pending: NonZeroU32,
        deadline: Instant,
    },
}

/// Counts in-flight startup sequences.
#[derive(Debug, Default)]
pub struct BusyTracker {
    state: BusyState,
}

impl BusyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BusyState {
        self.state
    }

    /// Number of pending startup sequences.
    pub fn pending(&self) -> u32 {
        match self.state {
            BusyState::Idle => 0,
            BusyState::Busy { pending, .. } => pending.get(),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, BusyState::Busy { .. })
    }

    /// When the running timeout fires, if one is running.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            BusyState::Idle => None,
            BusyState::Busy { deadline, .. } => Some(deadline),
        }
    }

    /// Feed one event received at `now`.
    ///
    /// Returns `Some(busy)` when the tracker switched between idle and busy,
    /// meaning the cursor needs updating.
    pub fn handle(&mut self, event: &StartupEvent, now: Instant) -> Option<bool> {
        if !event.is_identified() {
            debug!("ignoring anonymous startup event {:?}", event.kind);
            return None;
        }
        debug!(
            "startup {:?}: {} ({})",
            event.kind, event.id, event.binary_name
        );

        let was_busy = self.is_busy();
        self.state = match (self.state, event.kind) {
            (state, StartupEventKind::Changed) => state,
            (BusyState::Idle, StartupEventKind::Initiated) => BusyState::Busy {
                pending: NonZeroU32::MIN,
                deadline: now + STARTUP_TIMEOUT,
            },
            (BusyState::Busy { pending, .. }, StartupEventKind::Initiated) => BusyState::Busy {
                pending: pending.saturating_add(1),
                deadline: now + STARTUP_TIMEOUT,
            },
            (BusyState::Idle, StartupEventKind::Completed | StartupEventKind::Canceled) => {
                BusyState::Idle
            }
            (
                BusyState::Busy { pending, deadline },
                StartupEventKind::Completed | StartupEventKind::Canceled,
            ) => match NonZeroU32::new(pending.get() - 1) {
                Some(pending) => BusyState::Busy { pending, deadline },
                None => BusyState::Idle,
            },
        };
        self.changed(was_busy)
    }

    /// Fire the timeout if `now` is at or past the deadline.
    pub fn poll(&mut self, now: Instant) -> Option<bool> {
        match self.state {
            BusyState::Busy { pending, deadline } if now >= deadline => {
                debug!("startup timeout, forgetting {} pending sequence(s)", pending);
                self.state = BusyState::Idle;
                Some(false)
            }
            _ => None,
        }
    }

    fn changed(&self, was_busy: bool) -> Option<bool> {
        let busy = self.is_busy();
        (busy != was_busy).then_some(busy)
    }
}
