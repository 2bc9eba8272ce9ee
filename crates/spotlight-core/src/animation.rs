#![forbid(unsafe_code)]

//! Tween primitives for the overlay state machine.
//!
//! Time-based animations producing normalized `f32` progress (0.0–1.0),
//! advanced by the host's render tick. Nothing here owns a clock: callers feed
//! `dt` into [`Animation::tick`] and read values back.
//!
//! - [`Tween`]: a single eased progress clock.
//! - [`group::Track`] / [`group::TweenGroup`]: named numeric properties
//!   interpolated through keyframes and ticked together.
//! - [`callbacks::Callbacks`]: polled completion/cancellation events.
//!
//! Degenerate input never panics: a zero duration completes on the first tick
//! and non-finite keyframes jump straight to their end value.

pub mod callbacks;
pub mod group;

use std::time::Duration;

pub use callbacks::{AnimationEvent, Callbacks};
pub use group::{Track, TweenGroup};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end). Used as the "decelerate" curve.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cosine accelerate-decelerate: `cos((t + 1)π) / 2 + 0.5`.
#[inline]
pub fn accelerate_decelerate(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5
}

/// Material "fast out, slow in": cubic Bézier (0.4, 0.0, 0.2, 1.0).
///
/// Solved per call with a short Newton iteration on the x polynomial.
pub fn fast_out_slow_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    cubic_bezier(0.4, 0.0, 0.2, 1.0, t)
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    let bx = |s: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * x1 + 3.0 * inv * s * s * x2 + s * s * s
    };
    let by = |s: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * y1 + 3.0 * inv * s * s * y2 + s * s * s
    };
    let dbx = |s: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * x1 + 6.0 * inv * s * (x2 - x1) + 3.0 * s * s * (1.0 - x2)
    };

    let mut s = x;
    for _ in 0..8 {
        let err = bx(s) - x;
        if err.abs() < 1e-5 {
            break;
        }
        let slope = dbx(s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - err / slope).clamp(0.0, 1.0);
    }
    by(s).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);

    /// Jump to the end state without waiting for ticks.
    fn finish(&mut self);

    /// Time elapsed past completion.
    /// Returns [`Duration::ZERO`] for animations that never complete.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Progress from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Tracks elapsed time as [`Duration`] internally for precise accumulation
/// (no floating-point drift). A zero duration is already complete and reports
/// full progress.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Create a tween with the given duration and linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
            easing: linear,
        }
    }

    /// Set the easing function.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Configured duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        let eased = (self.easing)(self.raw_progress());
        if eased.is_finite() {
            eased.clamp(0.0, 1.0)
        } else {
            self.raw_progress()
        }
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn finish(&mut self) {
        self.elapsed = self.elapsed.max(self.duration);
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
