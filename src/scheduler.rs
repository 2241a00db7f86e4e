// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

pub const DEFAULT_REFRESH_RATE: f64 = 20.0;

/// Self-sustaining frame chain: each completed frame arms the next one `delay`
/// later, so the rate is a ceiling and a slow frame pushes every later one back.
///
/// There is at most one pending frame. Arming replaces it, so a stop/start pair
/// between two frames never ends up with two chains running.
#[derive(Clone, Debug)]
pub struct FrameClock {
    delay: Duration,
    deadline: Option<Instant>,
}

impl FrameClock {
    pub fn new(refresh_rate: f64) -> Self {
        let delay = if refresh_rate.is_finite() && refresh_rate > 0.0 {
            Duration::from_secs_f64(1.0 / refresh_rate)
        } else {
            Duration::ZERO
        };
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn arm_now(&mut self, now: Instant) {
        self.deadline = Some(now);
    }

    /// Arms the next frame once the current one has completed.
    pub fn arm_after(&mut self, completed: Instant) {
        self.deadline = Some(completed + self.delay);
    }

    /// Consumes the pending frame if it is due. The chain stays disarmed until the
    /// caller arms it again.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// How long to wait for input before the next frame is due. `None` when disarmed.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_fps_waits_fifty_ms_after_completion() {
        let mut clock = FrameClock::new(DEFAULT_REFRESH_RATE);
        assert_eq!(clock.delay(), Duration::from_millis(50));

        let t0 = Instant::now();
        clock.arm_after(t0);
        assert!(!clock.take_due(t0 + Duration::from_millis(49)));
        assert!(clock.take_due(t0 + Duration::from_millis(50)));
        assert_eq!(clock.timeout(t0), None);
    }

    #[test]
    fn disarmed_clock_never_fires() {
        let mut clock = FrameClock::new(20.0);
        let t0 = Instant::now();
        assert_eq!(clock.timeout(t0), None);
        assert!(!clock.take_due(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn rearming_replaces_pending_frame() {
        let mut clock = FrameClock::new(20.0);
        let t0 = Instant::now();
        clock.arm_after(t0);
        clock.arm_now(t0);
        assert!(clock.take_due(t0));
        assert!(!clock.take_due(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn timeout_counts_down_to_deadline() {
        let mut clock = FrameClock::new(10.0);
        let t0 = Instant::now();
        clock.arm_after(t0);
        assert_eq!(
            clock.timeout(t0 + Duration::from_millis(30)),
            Some(Duration::from_millis(70))
        );
        assert_eq!(
            clock.timeout(t0 + Duration::from_millis(300)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn invalid_rate_means_no_delay() {
        assert_eq!(FrameClock::new(0.0).delay(), Duration::ZERO);
        assert_eq!(FrameClock::new(f64::NAN).delay(), Duration::ZERO);
    }
}
