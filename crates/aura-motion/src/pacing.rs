#![forbid(unsafe_code)]

//! Frame pacing: cap particle updates at one per `min_interval`.
//!
//! Display-refresh callbacks can arrive faster than the animation needs
//! (120 Hz panels). Callbacks closer than `min_interval` to the last update
//! are skipped entirely; the chain keeps running.

use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceDecision {
    Update,
    Skip,
}

#[derive(Debug, Clone)]
pub struct FramePacer {
    min_interval: Duration,
    last_update: Option<Duration>,
}

impl FramePacer {
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_update: None,
        }
    }

    #[inline]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    #[inline]
    pub const fn last_update(&self) -> Option<Duration> {
        self.last_update
    }

    /// Decide for a callback at `now`, recording it when it updates.
    ///
    /// The first callback after construction or [`reset`](Self::reset)
    /// always updates. A timestamp earlier than the last update (clock
    /// reset on the host side) also updates and restarts pacing from there.
    pub fn admit(&mut self, now: Duration) -> PaceDecision {
        match self.last_update {
            Some(last) if now >= last && now - last < self.min_interval => PaceDecision::Skip,
            _ => {
                self.last_update = Some(now);
                PaceDecision::Update
            }
        }
    }

    /// Forget the last update, e.g. after the chain was stopped.
    pub fn reset(&mut self) {
        self.last_update = None;
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_frame_updates() {
        let mut p = FramePacer::default();
        assert_eq!(p.admit(ms(3)), PaceDecision::Update);
        assert_eq!(p.last_update(), Some(ms(3)));
    }

    #[test]
    fn skips_below_interval_at_120hz() {
        let mut p = FramePacer::default();
        let decisions: Vec<_> = (0..6u64)
            .map(|i| p.admit(Duration::from_micros(i * 8_333)))
            .collect();
        assert_eq!(
            decisions,
            vec![
                PaceDecision::Update,
                PaceDecision::Skip,
                PaceDecision::Update,
                PaceDecision::Skip,
                PaceDecision::Update,
                PaceDecision::Skip,
            ]
        );
    }

    #[test]
    fn exactly_interval_updates() {
        let mut p = FramePacer::default();
        p.admit(ms(0));
        assert_eq!(p.admit(ms(16)), PaceDecision::Update);
    }

    #[test]
    fn clock_going_backwards_restarts() {
        let mut p = FramePacer::default();
        p.admit(ms(1_000));
        assert_eq!(p.admit(ms(5)), PaceDecision::Update);
        assert_eq!(p.admit(ms(10)), PaceDecision::Skip);
    }

    #[test]
    fn reset_forgets_last_update() {
        let mut p = FramePacer::default();
        p.admit(ms(0));
        p.reset();
        assert_eq!(p.admit(ms(1)), PaceDecision::Update);
    }
}
