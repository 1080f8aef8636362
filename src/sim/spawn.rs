//! Enemy spawn pacing
//!
//! Time-based: a spawn fires once the time since the last spawn exceeds the
//! current interval, and every spawn shortens the interval down to a floor.

use crate::consts::{SPAWN_INTERVAL_MIN_MS, SPAWN_INTERVAL_START_MS, SPAWN_INTERVAL_STEP_MS};

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnScheduler {
    /// Current interval between spawns (ms)
    pub interval_ms: f64,
    /// Time since the last spawn (ms)
    pub elapsed_ms: f64,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self {
            interval_ms: SPAWN_INTERVAL_START_MS,
            elapsed_ms: 0.0,
        }
    }
}

impl SpawnScheduler {
    /// Advance the clock; returns true when a spawn is due
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms <= self.interval_ms {
            return false;
        }
        self.elapsed_ms = 0.0;
        self.interval_ms = (self.interval_ms - SPAWN_INTERVAL_STEP_MS).max(SPAWN_INTERVAL_MIN_MS);
        true
    }

    /// Back to starting pace
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use proptest::prelude::*;

    #[test]
    fn test_first_spawn_after_start_interval() {
        let mut spawner = SpawnScheduler::default();
        let mut ticks = 1;
        while !spawner.advance(TICK_MS) {
            ticks += 1;
            assert!(ticks < 1000, "spawn never fired");
        }
        // 3000 ms at 60 Hz, give or take float accumulation
        assert!((180..=181).contains(&ticks), "fired after {ticks} ticks");
        assert_eq!(spawner.elapsed_ms, 0.0);
        assert_eq!(
            spawner.interval_ms,
            SPAWN_INTERVAL_START_MS - SPAWN_INTERVAL_STEP_MS
        );
    }

    #[test]
    fn test_interval_reaches_floor_exactly() {
        let mut spawner = SpawnScheduler::default();
        for _ in 0..1000 {
            spawner.advance(SPAWN_INTERVAL_START_MS + 1.0);
        }
        assert_eq!(spawner.interval_ms, SPAWN_INTERVAL_MIN_MS);
    }

    #[test]
    fn test_reset_restores_start_pace() {
        let mut spawner = SpawnScheduler::default();
        spawner.advance(SPAWN_INTERVAL_START_MS + 1.0);
        spawner.advance(500.0);
        spawner.reset();
        assert_eq!(spawner, SpawnScheduler::default());
    }

    proptest! {
        #[test]
        fn prop_interval_monotonic_with_floor(steps in prop::collection::vec(0.0f64..5000.0, 1..400)) {
            let mut spawner = SpawnScheduler::default();
            let mut last = spawner.interval_ms;
            for dt in steps {
                spawner.advance(dt);
                prop_assert!(spawner.interval_ms <= last);
                prop_assert!(spawner.interval_ms >= SPAWN_INTERVAL_MIN_MS);
                last = spawner.interval_ms;
            }
        }
    }
}
