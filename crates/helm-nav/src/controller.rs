//! Navigation tick core.
//!
//! `NavigationController` owns the waypoint, the trigger state machine, the
//! arrival detector and the sector policy, and is the only place the geo math
//! is invoked from. It performs no I/O: external effects (the cross-channel
//! trigger push, the arrival reset) come back to the caller as `TriggerSync`
//! requests, and the fix arrives as an already-fetched `FixInput`.

use helm_geo::{bearing_deg, haversine_m, wrap_relative_deg};
use helm_geo::{ArrivalDetector, DirectionOutput, SectorPolicy};
use helm_proto::{NavReport, WaypointMsg};
use helm_trigger::{TriggerStateMachine, TriggerTransition};
use time::OffsetDateTime;
use tracing::info;

use crate::fix::{FixError, NavFix};

/// Current destination. Replaced wholesale on fetch; no history kept.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub set_by: String,
    pub set_at: OffsetDateTime,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64, set_by: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            set_by: set_by.into(),
            set_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn from_msg(msg: WaypointMsg) -> Self {
        let set_by = msg.set_by.unwrap_or_else(|| "unknown".to_string());
        Self::new(msg.latitude, msg.longitude, set_by)
    }
}

/// One complete navigation computation. Recomputed whole every tick, never
/// partially updated; `arrived == (distance_m <= radius)` by construction.
#[derive(Debug, Clone)]
pub struct NavComputation {
    pub direction: DirectionOutput,
    pub bearing_deg: f64,
    pub distance_m: f64,
    pub heading_diff_deg: f64,
    pub arrived: bool,
}

impl NavComputation {
    pub fn to_report(&self) -> NavReport {
        NavReport {
            direction: self.direction.to_string(),
            bearing: self.bearing_deg,
            distance: self.distance_m,
            heading_diff: self.heading_diff_deg,
            arrived: self.arrived,
        }
    }
}

/// Why the engine is active but not navigating this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    NeedsCompass,
    NoPosition,
    FixUnavailable,
}

impl From<FixError> for WaitReason {
    fn from(e: FixError) -> Self {
        match e {
            FixError::NeedsCompass => WaitReason::NeedsCompass,
            FixError::NoPosition => WaitReason::NoPosition,
        }
    }
}

impl std::fmt::Display for WaitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WaitReason::NeedsCompass => "needs compass",
            WaitReason::NoPosition => "waiting for position",
            WaitReason::FixUnavailable => "fix unavailable",
        };
        f.write_str(s)
    }
}

/// What display/LED consumers get each tick.
#[derive(Debug, Clone)]
pub enum DisplayState {
    /// Trigger inactive; navigation skipped entirely.
    Idle,
    /// Trigger active but no usable fix.
    Waiting(WaitReason),
    Navigating(NavComputation),
    /// Terminal: emitted once per arrival, after which both trigger channels
    /// are reset.
    Arrived(NavComputation),
}

/// Side effect the runtime owes the remote trigger source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSync {
    /// Local activation: set the remote variable true so remote-only
    /// observers converge.
    Activate,
    /// Arrival: clear the remote variable (best-effort).
    Reset,
}

/// Fix acquisition result for an active tick.
#[derive(Debug, Clone)]
pub enum FixInput {
    /// Fetch timed out or transport failed; stale state kept.
    Unavailable,
    Invalid(FixError),
    Valid(NavFix),
}

#[derive(Debug)]
pub struct PreTick {
    pub active: bool,
    pub sync: Option<TriggerSync>,
}

#[derive(Debug)]
pub struct NavOutcome {
    pub display: DisplayState,
    pub sync: Option<TriggerSync>,
}

pub struct NavigationController {
    policy: SectorPolicy,
    arrival: ArrivalDetector,
    trigger: TriggerStateMachine,
    waypoint: Waypoint,
    // One-shot latch: Arrived is emitted once per activation, not every tick
    // spent standing inside the radius.
    arrived_latched: bool,
}

impl NavigationController {
    pub fn new(waypoint: Waypoint, policy: SectorPolicy, arrival_radius_m: f64) -> Self {
        Self {
            policy,
            arrival: ArrivalDetector::new(arrival_radius_m),
            trigger: TriggerStateMachine::new(),
            waypoint,
            arrived_latched: false,
        }
    }

    pub fn waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn set_waypoint(&mut self, wp: Waypoint) {
        info!(lat = wp.lat, lon = wp.lon, set_by = %wp.set_by, "waypoint replaced");
        self.waypoint = wp;
        self.arrived_latched = false;
    }

    /// Accepted (debounced) button press from the local channel.
    pub fn on_press(&mut self) {
        self.trigger.record_press();
    }

    /// Successfully polled remote flag. Callers must not invoke this for a
    /// failed or malformed poll.
    pub fn on_remote_poll(&mut self, triggered: bool) {
        self.trigger.apply_remote(triggered);
    }

    pub fn active(&self) -> bool {
        self.trigger.active()
    }

    pub fn trigger(&self) -> &TriggerStateMachine {
        &self.trigger
    }

    /// Tick steps 1-2: re-derive activation, detect the edge, and decide
    /// whether a fix is worth fetching. When inactive the caller skips fix
    /// acquisition and geo math entirely.
    pub fn pre_tick(&mut self) -> PreTick {
        let sync = match self.trigger.poll_transition() {
            TriggerTransition::Activated { local_origin } => {
                info!(local_origin, "navigation activated");
                self.arrived_latched = false;
                local_origin.then_some(TriggerSync::Activate)
            }
            TriggerTransition::Deactivated => {
                info!("navigation deactivated");
                None
            }
            TriggerTransition::Unchanged => None,
        };
        PreTick {
            active: self.trigger.active(),
            sync,
        }
    }

    /// Tick steps 3-5 for an active engine.
    pub fn navigate(&mut self, fix: FixInput) -> NavOutcome {
        let fix = match fix {
            FixInput::Unavailable => {
                return NavOutcome {
                    display: DisplayState::Waiting(WaitReason::FixUnavailable),
                    sync: None,
                }
            }
            FixInput::Invalid(e) => {
                return NavOutcome {
                    display: DisplayState::Waiting(e.into()),
                    sync: None,
                }
            }
            FixInput::Valid(f) => f,
        };

        let comp = self.compute(&fix);
        if comp.arrived && !self.arrived_latched {
            self.arrived_latched = true;
            // Terminal state: clear BOTH channels and ask the runtime to
            // propagate the reset. A still-true remote flag would otherwise
            // restart navigation on the next poll.
            self.trigger.reset();
            info!(distance_m = comp.distance_m, "arrived at waypoint");
            return NavOutcome {
                display: DisplayState::Arrived(comp),
                sync: Some(TriggerSync::Reset),
            };
        }
        NavOutcome {
            display: DisplayState::Navigating(comp),
            sync: None,
        }
    }

    /// The full geo pipeline for one valid fix. Also used by the one-shot
    /// `direction` CLI command.
    pub fn compute(&self, fix: &NavFix) -> NavComputation {
        let bearing = bearing_deg(fix.lat, fix.lon, self.waypoint.lat, self.waypoint.lon);
        let distance = haversine_m(fix.lat, fix.lon, self.waypoint.lat, self.waypoint.lon);
        let heading_diff = wrap_relative_deg(bearing - fix.heading_deg);
        NavComputation {
            direction: self.policy.classify(heading_diff),
            bearing_deg: bearing,
            distance_m: distance,
            heading_diff_deg: heading_diff,
            arrived: self.arrival.arrived(distance),
        }
    }
}
