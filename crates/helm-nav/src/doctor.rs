//! Preflight sanity checks for a configured engine, run by `helmnav doctor`.

use anyhow::Result;
use std::path::Path;

pub fn check_waypoint(lat: f64, lon: f64) -> Result<()> {
    anyhow::ensure!(lat.is_finite() && lon.is_finite(), "waypoint coordinates not finite");
    anyhow::ensure!(lat.abs() <= 90.0, "waypoint.latitude out of range");
    anyhow::ensure!(lon.abs() <= 180.0, "waypoint.longitude out of range");
    Ok(())
}

pub fn check_arrival_radius(radius_m: f64) -> Result<()> {
    anyhow::ensure!(radius_m > 0.0, "nav.arrival_radius_m must be positive");
    anyhow::ensure!(radius_m <= 1000.0, "nav.arrival_radius_m implausibly large");
    Ok(())
}

pub fn check_timing(
    fix_interval_ms: u64,
    poll_interval_ms: u64,
    debounce_ms: u64,
    call_timeout_ms: u64,
) -> Result<()> {
    anyhow::ensure!(fix_interval_ms >= 100, "nav.fix_interval_ms too small (min 100)");
    anyhow::ensure!(poll_interval_ms >= 100, "trigger.poll_interval_ms too small (min 100)");
    anyhow::ensure!(
        (10..=500).contains(&debounce_ms),
        "trigger.debounce_ms should be 10..500"
    );
    anyhow::ensure!(call_timeout_ms >= 100, "nav.call_timeout_ms too small (min 100)");
    Ok(())
}

pub fn check_trigger_variable(name: &str) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "trigger.variable_name missing");
    Ok(())
}

pub fn check_replay_file(path: &str) -> Result<()> {
    anyhow::ensure!(
        Path::new(path).is_file(),
        "fix.replay_file not found: {}",
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reference_configuration() {
        check_waypoint(11.495456, 77.277199).unwrap();
        check_arrival_radius(4.0).unwrap();
        check_timing(1000, 1000, 50, 2000).unwrap();
        check_trigger_variable("start_navigation").unwrap();
    }

    #[test]
    fn rejects_bad_values() {
        assert!(check_waypoint(91.0, 0.0).is_err());
        assert!(check_waypoint(0.0, 181.0).is_err());
        assert!(check_waypoint(f64::NAN, 0.0).is_err());
        assert!(check_arrival_radius(0.0).is_err());
        assert!(check_timing(10, 1000, 50, 2000).is_err());
        assert!(check_timing(1000, 1000, 5, 2000).is_err());
        assert!(check_trigger_variable("  ").is_err());
    }
}
