//! Tick-boundary packet limiter.
//!
//! The limiter counts sender frames (see [`crate::VmcMessage::Time`]) per
//! tick of the consuming loop. When the previous tick saw more frames than
//! the threshold, the sender is flooding or a backlog is being flushed, and
//! every message is dropped until the next tick boundary. The decision always
//! uses the last completed tick, so nothing is dropped before one full tick
//! has been counted.
//!
//! Compatibility constraint: the frame count is only as good as the sender's
//! convention of emitting exactly one `/VMC/Ext/T` per frame. A sender that
//! omits it is never limited; one that sends it per bone is limited early.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::DEFAULT_RATE_LIMIT_THRESHOLD;

#[derive(Debug)]
pub struct RateLimiter {
    enabled: AtomicBool,
    threshold: u32,
    frames_this_tick: AtomicU32,
    frames_last_tick: AtomicU32,
    dropped: AtomicU64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(true, DEFAULT_RATE_LIMIT_THRESHOLD)
    }
}

impl RateLimiter {
    pub fn new(enabled: bool, threshold: u32) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            threshold,
            frames_this_tick: AtomicU32::new(0),
            frames_last_tick: AtomicU32::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Gate one incoming message. Returns `false` (and counts a drop) when
    /// the last tick exceeded the threshold.
    pub fn admit(&self) -> bool {
        if self.enabled.load(Ordering::Relaxed)
            && self.frames_last_tick.load(Ordering::Acquire) > self.threshold
        {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Count one sender frame toward the current tick.
    pub fn record_frame(&self) {
        self.frames_this_tick.fetch_add(1, Ordering::AcqRel);
    }

    /// Close the current tick: its count becomes the gate for the next one.
    pub fn tick(&self) {
        let frames = self.frames_this_tick.swap(0, Ordering::AcqRel);
        self.frames_last_tick.store(frames, Ordering::Release);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn frames_this_tick(&self) -> u32 {
        self.frames_this_tick.load(Ordering::Acquire)
    }

    pub fn frames_last_tick(&self) -> u32 {
        self.frames_last_tick.load(Ordering::Acquire)
    }

    /// Messages dropped since the session started.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter_with_last_tick(frames: u32) -> RateLimiter {
        let limiter = RateLimiter::default();
        for _ in 0..frames {
            limiter.record_frame();
        }
        limiter.tick();
        limiter
    }

    #[test]
    fn first_tick_never_drops() {
        let limiter = RateLimiter::default();
        for _ in 0..1_000 {
            limiter.record_frame();
            assert!(limiter.admit());
        }
        assert_eq!(limiter.dropped(), 0);
    }

    #[test]
    fn drops_only_above_threshold() {
        let at_threshold = limiter_with_last_tick(30);
        assert!(at_threshold.admit());
        assert_eq!(at_threshold.dropped(), 0);

        let above = limiter_with_last_tick(31);
        assert!(!above.admit());
        assert_eq!(above.dropped(), 1);
        assert!(!above.admit());
        assert_eq!(above.dropped(), 2);
    }

    #[test]
    fn tick_rolls_counts_over() {
        let limiter = RateLimiter::default();
        for _ in 0..7 {
            limiter.record_frame();
        }
        assert_eq!(limiter.frames_this_tick(), 7);
        limiter.tick();
        assert_eq!(limiter.frames_last_tick(), 7);
        assert_eq!(limiter.frames_this_tick(), 0);
        limiter.tick();
        assert_eq!(limiter.frames_last_tick(), 0);
    }

    #[test]
    fn flood_is_released_after_a_quiet_tick() {
        let limiter = limiter_with_last_tick(40);
        assert!(!limiter.admit());
        limiter.tick();
        assert!(limiter.admit());
        assert_eq!(limiter.dropped(), 1);
    }

    #[test]
    fn disabled_limiter_admits_everything() {
        let limiter = limiter_with_last_tick(100);
        limiter.set_enabled(false);
        assert!(limiter.admit());
        assert_eq!(limiter.dropped(), 0);
        assert_eq!(limiter.threshold(), DEFAULT_RATE_LIMIT_THRESHOLD);
    }
}
