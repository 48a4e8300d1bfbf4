#![forbid(unsafe_code)]

//! Trailing-edge resize debouncer.
//!
//! A burst of viewport changes collapses into one apply carrying the final
//! size, delivered once the burst has been quiet for `delay`.
//!
//! # Invariants
//!
//! - **Latest-wins**: the last size in a burst is the one applied.
//! - **Trailing edge**: nothing applies while events keep arriving faster
//!   than `delay`, unless `max_wait` is set and has elapsed since the first
//!   event of the burst.
//! - **Deterministic**: time is passed in by the host, so identical event
//!   sequences yield identical decisions.
//!
//! # Usage
//!
//! ```
//! use aura_motion::debounce::{DebounceAction, DebounceConfig, ResizeDebouncer};
//! use aura_motion::geometry::Viewport;
//! use core::time::Duration;
//!
//! let mut debouncer = ResizeDebouncer::new(DebounceConfig::default());
//! let ms = Duration::from_millis;
//! debouncer.handle_resize_at(Viewport::new(400.0, 300.0), ms(0));
//! assert_eq!(debouncer.tick_at(ms(100)), DebounceAction::None);
//! assert!(matches!(debouncer.tick_at(ms(150)), DebounceAction::Apply { .. }));
//! ```

use core::time::Duration;

use crate::geometry::Viewport;

/// Debounce timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after the last event.
    pub delay: Duration,
    /// Apply anyway once this long has passed since the first event of a burst.
    pub max_wait: Option<Duration>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(150),
            max_wait: None,
        }
    }
}

impl DebounceConfig {
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

/// Action returned by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceAction {
    /// Nothing to do.
    None,
    /// A resize is waiting for the burst to settle.
    Pending,
    /// Apply this viewport now.
    Apply {
        viewport: Viewport,
        /// Events folded into this apply.
        coalesced: u32,
        /// Time since the first event of the burst.
        waited: Duration,
        /// Whether `max_wait` forced the apply.
        forced: bool,
    },
}

/// Counters for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebounceStats {
    pub events: u64,
    pub applies: u64,
    pub skipped_same_size: u64,
}

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    config: DebounceConfig,
    pending: Option<Viewport>,
    last_applied: Option<Viewport>,
    last_event: Option<Duration>,
    window_start: Option<Duration>,
    events_in_window: u32,
    stats: DebounceStats,
}

impl ResizeDebouncer {
    #[must_use]
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            pending: None,
            last_applied: None,
            last_event: None,
            window_start: None,
            events_in_window: 0,
            stats: DebounceStats::default(),
        }
    }

    /// Seed the size already in effect so an identical event is skipped.
    #[must_use]
    pub fn with_last_applied(mut self, viewport: Viewport) -> Self {
        self.last_applied = Some(viewport);
        self
    }

    /// Record a size that was applied outside the debouncer.
    pub fn record_external_apply(&mut self, viewport: Viewport) {
        self.last_applied = Some(viewport);
        if self.pending == Some(viewport) {
            self.reset_window();
        }
    }

    #[inline]
    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    /// Record a resize event at host time `now`.
    pub fn handle_resize_at(&mut self, viewport: Viewport, now: Duration) -> DebounceAction {
        self.stats.events += 1;
        self.last_event = Some(now);

        if self.pending.is_none() && self.last_applied == Some(viewport) {
            self.stats.skipped_same_size += 1;
            return DebounceAction::None;
        }

        self.pending = Some(viewport);
        self.events_in_window = self.events_in_window.saturating_add(1);
        let start = *self.window_start.get_or_insert(now);

        if let Some(max_wait) = self.config.max_wait
            && now.saturating_sub(start) >= max_wait
        {
            return self.apply_pending_at(now, true);
        }

        DebounceAction::Pending
    }

    /// Advance host time; returns `Apply` once the burst has settled.
    pub fn tick_at(&mut self, now: Duration) -> DebounceAction {
        if self.pending.is_none() {
            return DebounceAction::None;
        }
        let (Some(last_event), Some(start)) = (self.last_event, self.window_start) else {
            return DebounceAction::None;
        };

        if let Some(max_wait) = self.config.max_wait
            && now.saturating_sub(start) >= max_wait
        {
            return self.apply_pending_at(now, true);
        }
        if now.saturating_sub(last_event) >= self.config.delay {
            return self.apply_pending_at(now, false);
        }
        DebounceAction::None
    }

    /// How long until `tick_at` would apply. `None` when nothing is pending.
    pub fn time_until_apply(&self, now: Duration) -> Option<Duration> {
        self.pending?;
        let last_event = self.last_event?;
        let mut remaining = self
            .config
            .delay
            .saturating_sub(now.saturating_sub(last_event));
        if let (Some(max_wait), Some(start)) = (self.config.max_wait, self.window_start) {
            remaining = remaining.min(max_wait.saturating_sub(now.saturating_sub(start)));
        }
        Some(remaining)
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn last_applied(&self) -> Option<Viewport> {
        self.last_applied
    }

    #[inline]
    pub fn stats(&self) -> DebounceStats {
        self.stats
    }

    /// Drop any pending resize without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.reset_window();
    }

    fn apply_pending_at(&mut self, now: Duration, forced: bool) -> DebounceAction {
        let Some(viewport) = self.pending.take() else {
            return DebounceAction::None;
        };
        let waited = self
            .window_start
            .map(|s| now.saturating_sub(s))
            .unwrap_or(Duration::ZERO);
        let coalesced = self.events_in_window;
        self.reset_window();
        self.last_applied = Some(viewport);
        self.stats.applies += 1;
        DebounceAction::Apply {
            viewport,
            coalesced,
            waited,
            forced,
        }
    }

    fn reset_window(&mut self) {
        self.pending = None;
        self.window_start = None;
        self.events_in_window = 0;
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}
