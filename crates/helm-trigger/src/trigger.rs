//! Dual-source activation state machine.
//!
//! Two independent input channels merge into one ACTIVE/INACTIVE state:
//! a debounced local press counter and a remotely polled boolean. Activation
//! is always derived, never stored:
//!
//! `active = remote_flag || (local_count > 0 && local_count % 3 == 0)`
//!
//! A locally caused activation must also be pushed to the remote side so
//! consumers that only watch the remote channel converge on the same state.
//! That cross-channel sync is a contract, not an accident; the state machine
//! reports it and the controller performs the push.

use tracing::debug;

/// Presses per activation cycle on the local channel.
pub const LOCAL_PRESSES_PER_CYCLE: u32 = 3;

/// Edge observed by `poll_transition` since the previous poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTransition {
    /// INACTIVE -> ACTIVE. `local_origin` is set when the local counter (and
    /// not an already-true remote flag) caused it; the caller then owes the
    /// remote side a "set trigger = true" push.
    Activated { local_origin: bool },
    /// ACTIVE -> INACTIVE.
    Deactivated,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct TriggerStateMachine {
    local_count: u32,
    remote_flag: bool,
    was_active: bool,
}

impl TriggerStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// One accepted (debounced) falling edge on the press input.
    pub fn record_press(&mut self) {
        self.local_count += 1;
        debug!(count = self.local_count, "trigger: local press");
    }

    /// Last successfully polled remote value. A failed or malformed poll must
    /// NOT call this; stale state is kept rather than cleared.
    pub fn apply_remote(&mut self, flag: bool) {
        self.remote_flag = flag;
    }

    pub fn local_count(&self) -> u32 {
        self.local_count
    }

    pub fn remote_flag(&self) -> bool {
        self.remote_flag
    }

    /// Derived activation, re-evaluated on every call.
    pub fn active(&self) -> bool {
        self.remote_flag
            || (self.local_count > 0 && self.local_count % LOCAL_PRESSES_PER_CYCLE == 0)
    }

    /// Compare the derived state against the previous poll and report the
    /// edge, if any.
    pub fn poll_transition(&mut self) -> TriggerTransition {
        let now_active = self.active();
        let local_satisfied =
            self.local_count > 0 && self.local_count % LOCAL_PRESSES_PER_CYCLE == 0;

        let t = match (self.was_active, now_active) {
            (false, true) => TriggerTransition::Activated {
                local_origin: local_satisfied && !self.remote_flag,
            },
            (true, false) => TriggerTransition::Deactivated,
            _ => TriggerTransition::Unchanged,
        };
        if t != TriggerTransition::Unchanged {
            debug!(?t, count = self.local_count, remote = self.remote_flag, "trigger: transition");
        }
        self.was_active = now_active;
        t
    }

    /// Terminal reset: clear BOTH channels. Used on arrival so navigation
    /// cannot immediately restart off a still-true remote flag or a counter
    /// stuck at a multiple of three. Requires the caller to also push the
    /// reset remotely (best-effort).
    pub fn reset(&mut self) {
        self.local_count = 0;
        self.remote_flag = false;
    }
}
