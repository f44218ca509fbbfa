//! Mechanical button debouncing.
//!
//! A raw transition starts (or restarts) the settle window; the new level is
//! accepted only once it has stayed put for the whole window. Bouncing inside
//! the window keeps restarting it and never double-counts. The clock is passed
//! in explicitly so the filter can be driven from tests and from the runtime's
//! debounce timer alike.

use std::time::{Duration, Instant};

/// Reference settle time for the helmet button.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// An accepted (debounced) level change. Falling = press on the active-low
/// button input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    // Most recent raw reading and when it last changed.
    last_raw: bool,
    last_change: Option<Instant>,
    // Last accepted level. Starts high (button released).
    stable: bool,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_raw: true,
            last_change: None,
            stable: true,
        }
    }

    pub fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }

    /// Feed one raw sample. Returns the accepted edge, if this sample settles
    /// a level change.
    pub fn sample(&mut self, raw_high: bool, now: Instant) -> Option<Edge> {
        if raw_high != self.last_raw {
            self.last_raw = raw_high;
            self.last_change = Some(now);
        }

        match self.last_change {
            Some(t0) if raw_high != self.stable && now.duration_since(t0) >= self.window => {
                self.stable = raw_high;
                self.last_change = None;
                Some(if raw_high { Edge::Rising } else { Edge::Falling })
            }
            _ => None,
        }
    }

    /// Re-evaluate the pending raw level without a new reading. The runtime
    /// calls this from its debounce timer so a settled level is accepted even
    /// when no further raw transitions arrive.
    pub fn poll(&mut self, now: Instant) -> Option<Edge> {
        self.sample(self.last_raw, now)
    }

    pub fn stable_high(&self) -> bool {
        self.stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms * MS)
    }

    #[test]
    fn clean_press_is_accepted_after_window() {
        let base = Instant::now();
        let mut d = Debouncer::default();
        assert_eq!(d.sample(false, at(base, 0)), None);
        assert_eq!(d.poll(at(base, 30)), None);
        assert_eq!(d.poll(at(base, 50)), Some(Edge::Falling));
        // Level already accepted; no repeat.
        assert_eq!(d.poll(at(base, 80)), None);
    }

    #[test]
    fn bounce_within_window_counts_once() {
        let base = Instant::now();
        let mut d = Debouncer::default();
        let mut presses = 0;
        // Raw chatter: down, up, down within 50ms, then quiet.
        for (ms, level) in [(0u64, false), (10, true), (20, false)] {
            if d.sample(level, at(base, ms)) == Some(Edge::Falling) {
                presses += 1;
            }
        }
        if d.poll(at(base, 80)) == Some(Edge::Falling) {
            presses += 1;
        }
        if d.poll(at(base, 200)) == Some(Edge::Falling) {
            presses += 1;
        }
        assert_eq!(presses, 1);
    }

    #[test]
    fn presses_apart_count_twice() {
        let base = Instant::now();
        let mut d = Debouncer::default();
        let mut presses = 0;
        let script = [
            (0u64, false),
            (60, false), // settles -> press 1
            (100, true),
            (160, true), // release settles
            (200, false),
            (260, false), // settles -> press 2
        ];
        for (ms, level) in script {
            if d.sample(level, at(base, ms)) == Some(Edge::Falling) {
                presses += 1;
            }
        }
        assert_eq!(presses, 2);
    }

    #[test]
    fn release_is_a_rising_edge_not_a_press() {
        let base = Instant::now();
        let mut d = Debouncer::default();
        d.sample(false, at(base, 0));
        assert_eq!(d.poll(at(base, 60)), Some(Edge::Falling));
        d.sample(true, at(base, 100));
        assert_eq!(d.poll(at(base, 160)), Some(Edge::Rising));
        assert!(d.stable_high());
    }
}
