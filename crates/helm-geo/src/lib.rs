pub mod arrival;
pub mod direction;
pub mod geo;

pub use arrival::{ArrivalDetector, DEFAULT_ARRIVAL_RADIUS_M};
pub use direction::{
    classify_eight_way, classify_four_way, Direction, DirectionOutput, SectorFlags, SectorPolicy,
};
pub use geo::{bearing_deg, haversine_m, wrap_relative_deg};
