//! Heading-relative direction classification.
//!
//! Two sector tables are in use by different display consumers: a 4-way
//! text-label table (FRONT/RIGHT/BACK/LEFT) and an 8-way LED table where
//! diagonal sectors light two cardinal outputs at once. They disagree on
//! boundaries on purpose and are kept as separate named strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::wrap_relative_deg;

/// Which sector table a consumer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectorPolicy {
    FourWay,
    EightWay,
}

impl SectorPolicy {
    pub fn classify(&self, heading_diff_deg: f64) -> DirectionOutput {
        match self {
            SectorPolicy::FourWay => DirectionOutput::FourWay(classify_four_way(heading_diff_deg)),
            SectorPolicy::EightWay => {
                DirectionOutput::EightWay(classify_eight_way(heading_diff_deg))
            }
        }
    }
}

/// 4-way label relative to the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Front,
    Right,
    Back,
    Left,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Front => "FRONT",
            Direction::Right => "RIGHT",
            Direction::Back => "BACK",
            Direction::Left => "LEFT",
        };
        f.write_str(s)
    }
}

/// 8-way output as cardinal LED flags. Diagonal sectors set two flags
/// (NE = north + east).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorFlags {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl SectorFlags {
    pub fn flag_count(&self) -> usize {
        [self.north, self.east, self.south, self.west]
            .iter()
            .filter(|f| **f)
            .count()
    }
}

impl fmt::Display for SectorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(2);
        if self.north {
            parts.push("N");
        }
        if self.south {
            parts.push("S");
        }
        if self.east {
            parts.push("E");
        }
        if self.west {
            parts.push("W");
        }
        f.write_str(&parts.join("+"))
    }
}

/// Classification result for either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionOutput {
    FourWay(Direction),
    EightWay(SectorFlags),
}

impl fmt::Display for DirectionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionOutput::FourWay(d) => d.fmt(f),
            DirectionOutput::EightWay(s) => s.fmt(f),
        }
    }
}

/// 4-way table. Inclusive boundaries: FRONT owns [-15,15], RIGHT owns
/// (15,90], LEFT owns [-90,-15), BACK owns the rest.
pub fn classify_four_way(heading_diff_deg: f64) -> Direction {
    let d = wrap_relative_deg(heading_diff_deg);
    if (-15.0..=15.0).contains(&d) {
        Direction::Front
    } else if d > 15.0 && d <= 90.0 {
        Direction::Right
    } else if d >= -90.0 && d < -15.0 {
        Direction::Left
    } else {
        Direction::Back
    }
}

/// 8-way table: 45-degree sectors centered on the cardinals and diagonals,
/// each owning its lower bound. South owns the +/-180 wrap (>= 157.5 and
/// < -157.5), so every boundary value belongs to exactly one sector.
pub fn classify_eight_way(heading_diff_deg: f64) -> SectorFlags {
    let d = wrap_relative_deg(heading_diff_deg);
    let mut out = SectorFlags::default();
    if (-22.5..22.5).contains(&d) {
        out.north = true;
    } else if (22.5..67.5).contains(&d) {
        out.north = true;
        out.east = true;
    } else if (67.5..112.5).contains(&d) {
        out.east = true;
    } else if (112.5..157.5).contains(&d) {
        out.south = true;
        out.east = true;
    } else if d >= 157.5 || d < -157.5 {
        out.south = true;
    } else if (-157.5..-112.5).contains(&d) {
        out.south = true;
        out.west = true;
    } else if (-112.5..-67.5).contains(&d) {
        out.west = true;
    } else {
        // [-67.5, -22.5)
        out.north = true;
        out.west = true;
    }
    out
}
