//! Frame timing harness
//!
//! Two independent clocks: the simulation clock turns host timestamps into
//! clamped deltas, the publish throttle limits how often the UI is told about
//! new state.

/// Converts monotonic frame timestamps into clamped simulation deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta_ms: f64,
}

impl FrameClock {
    pub fn new(max_delta_ms: f64) -> Self {
        Self {
            last_ms: None,
            max_delta_ms,
        }
    }

    /// Seconds since the previous frame, clamped to [0, max]. The first frame
    /// after a reset yields zero.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let last = self.last_ms.unwrap_or(now_ms);
        self.last_ms = Some(now_ms);
        let delta_ms = (now_ms - last).clamp(0.0, self.max_delta_ms);
        (delta_ms / 1000.0) as f32
    }

    /// Drop the baseline so the next frame starts fresh
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn is_ticking(&self) -> bool {
        self.last_ms.is_some()
    }
}

/// Drives the simulation only while there is something to simulate
#[derive(Debug, Clone)]
pub struct LoopDriver {
    clock: FrameClock,
}

impl LoopDriver {
    pub fn new(max_delta_ms: f64) -> Self {
        Self {
            clock: FrameClock::new(max_delta_ms),
        }
    }

    /// Called on every host frame. Returns the step delta when `active`;
    /// otherwise suspends and discards timing state so resuming never
    /// produces a catch-up jump.
    pub fn frame(&mut self, active: bool, now_ms: f64) -> Option<f32> {
        if !active {
            if self.clock.is_ticking() {
                log::debug!("Loop suspended");
            }
            self.clock.reset();
            return None;
        }
        Some(self.clock.advance(now_ms))
    }

    pub fn is_suspended(&self) -> bool {
        !self.clock.is_ticking()
    }
}

/// Rate limit for presentation updates
#[derive(Debug, Clone)]
pub struct PublishThrottle {
    last_ms: Option<f64>,
    interval_ms: f64,
}

impl PublishThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            last_ms: None,
            interval_ms,
        }
    }

    /// True (and records `now_ms`) if enough time passed since the last publish
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    /// Publish regardless of cadence (terminal frames)
    pub fn force(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new(50.0);
        assert_eq!(clock.advance(1234.0), 0.0);
        assert!((clock.advance(1250.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_delta_clamped() {
        let mut clock = FrameClock::new(50.0);
        clock.advance(0.0);
        // Long pause (e.g. backgrounded tab)
        assert!((clock.advance(10_000.0) - 0.05).abs() < 1e-6);
        // Timestamp going backwards
        assert_eq!(clock.advance(9_000.0), 0.0);
    }

    #[test]
    fn test_suspend_discards_baseline() {
        let mut driver = LoopDriver::new(50.0);
        assert_eq!(driver.frame(true, 0.0), Some(0.0));
        assert!(driver.frame(true, 16.0).is_some());

        assert_eq!(driver.frame(false, 32.0), None);
        assert!(driver.is_suspended());

        // Resume well after: no catch-up
        assert_eq!(driver.frame(true, 5_000.0), Some(0.0));
        assert!((driver.frame(true, 5_020.0).unwrap() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_throttle_cadence() {
        let mut throttle = PublishThrottle::new(33.0);
        assert!(throttle.ready(0.0));
        assert!(!throttle.ready(16.0));
        assert!(!throttle.ready(32.9));
        assert!(throttle.ready(33.0));
        assert!(!throttle.ready(50.0));

        throttle.force(60.0);
        assert!(!throttle.ready(80.0));
        assert!(throttle.ready(93.0));
    }
}
