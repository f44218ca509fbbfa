pub mod debounce;
pub mod trigger;

pub use debounce::{Debouncer, Edge, DEFAULT_DEBOUNCE_WINDOW};
pub use trigger::{TriggerStateMachine, TriggerTransition, LOCAL_PRESSES_PER_CYCLE};
