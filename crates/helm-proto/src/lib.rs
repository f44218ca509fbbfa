pub mod extract;
pub mod wire;

pub use extract::extract_triggered;
pub use wire::{FixSample, NavReport, TriggerPush, WaypointMsg};
