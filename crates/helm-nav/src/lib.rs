#![allow(async_fn_in_trait)]

pub mod controller;
pub mod doctor;
pub mod fix;
pub mod runtime;
pub mod sources;

pub use controller::{
    DisplayState, FixInput, NavComputation, NavigationController, TriggerSync, WaitReason,
    Waypoint,
};
pub use fix::{FixError, NavFix};
pub use runtime::{run, RuntimeConfig};
pub use sources::{FileTrigger, FixProvider, FixSource, StaticWaypoint, TriggerEndpoint, WaypointSource};
