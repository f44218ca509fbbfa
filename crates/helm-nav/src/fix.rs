//! Fix validation: raw samples from the fix provider become `NavFix` only
//! when both position and compass heading are usable.

use helm_proto::FixSample;
use thiserror::Error;
use time::OffsetDateTime;

/// Why a sample cannot be navigated on. The two reasons are deliberately
/// distinct so display collaborators can show an accurate waiting message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FixError {
    /// Position present but no compass lock (missing or NaN azimuth).
    #[error("needs compass")]
    NeedsCompass,
    /// Latitude/longitude missing or non-finite.
    #[error("no position")]
    NoPosition,
}

/// A validated position + heading snapshot, immutable for its tick.
#[derive(Debug, Clone, PartialEq)]
pub struct NavFix {
    pub lat: f64,
    pub lon: f64,
    /// Compass heading, degrees in [0,360).
    pub heading_deg: f64,
    pub ts: OffsetDateTime,
}

impl TryFrom<FixSample> for NavFix {
    type Error = FixError;

    fn try_from(s: FixSample) -> Result<Self, FixError> {
        if !s.latitude.is_finite() || !s.longitude.is_finite() {
            return Err(FixError::NoPosition);
        }
        let heading = match s.azimuth {
            Some(a) if a.is_finite() => a.rem_euclid(360.0),
            _ => return Err(FixError::NeedsCompass),
        };
        let ts = OffsetDateTime::from_unix_timestamp_nanos(s.timestamp as i128 * 1_000_000)
            .unwrap_or_else(|_| OffsetDateTime::now_utc());
        Ok(NavFix {
            lat: s.latitude,
            lon: s.longitude,
            heading_deg: heading,
            ts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(azimuth: Option<f64>) -> FixSample {
        FixSample {
            latitude: 11.495050,
            longitude: 77.276972,
            azimuth,
            timestamp: 1_733_900_000_000,
        }
    }

    #[test]
    fn valid_sample_converts() {
        let fix = NavFix::try_from(sample(Some(25.0))).unwrap();
        assert_eq!(fix.heading_deg, 25.0);
        assert_eq!(fix.ts.unix_timestamp(), 1_733_900_000);
    }

    #[test]
    fn missing_azimuth_needs_compass() {
        assert_eq!(NavFix::try_from(sample(None)), Err(FixError::NeedsCompass));
    }

    #[test]
    fn nan_azimuth_needs_compass() {
        assert_eq!(
            NavFix::try_from(sample(Some(f64::NAN))),
            Err(FixError::NeedsCompass)
        );
    }

    #[test]
    fn nan_position_is_no_position() {
        let mut s = sample(Some(10.0));
        s.latitude = f64::NAN;
        assert_eq!(NavFix::try_from(s), Err(FixError::NoPosition));
    }

    #[test]
    fn heading_wraps_into_compass_domain() {
        let fix = NavFix::try_from(sample(Some(-90.0))).unwrap();
        assert_eq!(fix.heading_deg, 270.0);
        let fix = NavFix::try_from(sample(Some(360.0))).unwrap();
        assert_eq!(fix.heading_deg, 0.0);
    }
}
