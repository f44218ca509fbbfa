//! Wire shapes exchanged with the excluded collaborators (fix provider,
//! waypoint source, remote trigger, display consumers). These are fixed
//! contracts; renaming a field breaks deployed producers.

use serde::{Deserialize, Serialize};

/// One position/heading sample from the external fix provider.
///
/// `azimuth` is the compass heading in degrees; a missing or NaN azimuth
/// means there is no compass lock and the sample is unusable for navigation
/// even when lat/lon are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub azimuth: Option<f64>,
    /// Producer timestamp, unix milliseconds.
    pub timestamp: i64,
}

/// Destination update from the waypoint source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointMsg {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub set_by: Option<String>,
}

/// Outbound "set trigger" call toward the remote trigger source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerPush {
    pub variable_name: String,
    pub triggered: bool,
    pub triggered_by: String,
}

/// Navigation result for display/LED consumers. `direction` is the label of
/// the configured sector policy ("FRONT", "N+E", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavReport {
    pub direction: String,
    pub bearing: f64,
    pub distance: f64,
    pub heading_diff: f64,
    pub arrived: bool,
}
