//! Arrival detection: distance-to-target against a fixed radius.

/// Reference arrival radius for helmet navigation.
pub const DEFAULT_ARRIVAL_RADIUS_M: f64 = 4.0;

/// Level-triggered arrival check. The condition is re-evaluated every tick;
/// treating the not-arrived -> arrived transition as a one-shot event is the
/// controller's job.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalDetector {
    radius_m: f64,
}

impl ArrivalDetector {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn default() -> Self {
        Self::new(DEFAULT_ARRIVAL_RADIUS_M)
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Boundary inclusive: exactly at the radius counts as arrived.
    pub fn arrived(&self, distance_m: f64) -> bool {
        distance_m <= self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_inclusive() {
        let det = ArrivalDetector::default();
        assert!(det.arrived(3.9));
        assert!(det.arrived(4.0));
        assert!(!det.arrived(4.1));
    }

    #[test]
    fn custom_radius() {
        let det = ArrivalDetector::new(10.0);
        assert!(det.arrived(10.0));
        assert!(!det.arrived(10.5));
        assert_eq!(det.radius_m(), 10.0);
    }
}
