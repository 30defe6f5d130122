use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Default length of one simulated day, in seconds (a 20 minute cycle).
pub const DEFAULT_DAY_LENGTH_SECONDS: f64 = 1200.0;

const WALL_CLOCK_DAY_SECONDS: f64 = 86_400.0;

/// Tracks elapsed simulated time and maps it to a normalized time-of-day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldClock {
    elapsed_seconds: f64,
    day_length_seconds: f64,
}

impl WorldClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance elapsed simulated time. Negative deltas are ignored.
    pub fn tick(&mut self, dt_seconds: f64) {
        if dt_seconds > 0.0 {
            self.elapsed_seconds += dt_seconds;
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Overwrite elapsed time. Used by the persistence layer on restore.
    pub fn set_elapsed_seconds(&mut self, seconds: f64) {
        self.elapsed_seconds = seconds.max(0.0);
    }

    pub fn day_length_seconds(&self) -> f64 {
        self.day_length_seconds
    }

    pub fn set_day_length_seconds(&mut self, seconds: f64) {
        self.day_length_seconds = seconds;
    }

    /// Normalized time-of-day in [0, 1): 0.0 is midnight, 0.5 is noon.
    ///
    /// With `use_wall_clock` the host's local time is mapped to the same
    /// range; otherwise simulated elapsed time is folded over the configured
    /// day length. A non-positive day length yields 0.0.
    pub fn time_of_day(&self, use_wall_clock: bool) -> f32 {
        if use_wall_clock {
            let now = chrono::Local::now();
            let seconds = f64::from(now.num_seconds_from_midnight())
                + f64::from(now.nanosecond()) * 1e-9;
            return (seconds / WALL_CLOCK_DAY_SECONDS) as f32;
        }
        if self.day_length_seconds <= 0.0 {
            return 0.0;
        }
        (self.elapsed_seconds.rem_euclid(self.day_length_seconds) / self.day_length_seconds) as f32
    }
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            elapsed_seconds: 0.0,
            day_length_seconds: DEFAULT_DAY_LENGTH_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_accumulates() {
        let mut clock = WorldClock::new();
        clock.tick(1.5);
        clock.tick(0.5);
        assert_eq!(clock.elapsed_seconds(), 2.0);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut clock = WorldClock::new();
        clock.tick(-10.0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
    }

    #[test]
    fn time_of_day_is_periodic() {
        let mut clock = WorldClock::new();
        clock.set_day_length_seconds(100.0);
        clock.tick(25.0);
        let quarter = clock.time_of_day(false);
        assert!((quarter - 0.25).abs() < 1e-6);

        // One full day later the value wraps back.
        clock.tick(100.0);
        assert!((clock.time_of_day(false) - quarter).abs() < 1e-6);
    }

    #[test]
    fn midnight_and_noon() {
        let mut clock = WorldClock::new();
        clock.set_day_length_seconds(200.0);
        assert_eq!(clock.time_of_day(false), 0.0);
        clock.tick(100.0);
        assert!((clock.time_of_day(false) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_day_length_is_guarded() {
        let mut clock = WorldClock::new();
        clock.set_day_length_seconds(0.0);
        clock.tick(42.0);
        assert_eq!(clock.time_of_day(false), 0.0);
    }

    #[test]
    fn wall_clock_in_unit_range() {
        let clock = WorldClock::new();
        let t = clock.time_of_day(true);
        assert!((0.0..1.0).contains(&t));
    }
}
