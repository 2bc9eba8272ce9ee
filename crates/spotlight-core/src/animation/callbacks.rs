#![forbid(unsafe_code)]

//! Milestone events for animations.
//!
//! [`Callbacks`] wraps any [`Animation`] and queues [`AnimationEvent`]s that
//! the owner polls with [`drain_events`](Callbacks::drain_events) after each
//! tick. Completion and cancellation are both reported, exactly once, so a
//! state machine can treat them as the same "this group is over" signal.
//!
//! # Design
//!
//! Events are collected into an internal queue and drained by the caller
//! instead of firing closures, which keeps completion handling in one
//! `match` at the call site.
//!
//! # Invariants
//!
//! 1. At most one terminal event (`Completed` or `Cancelled`) per play-through.
//! 2. `cancel()` jumps the inner animation to its end state before queueing
//!    `Cancelled`; ticking afterwards never yields `Completed`.
//! 3. `drain_events()` clears the queue.
//! 4. `reset()` clears tracking state so events can fire again.

use std::time::Duration;

use super::Animation;

/// An event emitted by a [`Callbacks`]-wrapped animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The animation ran to completion.
    Completed,
    /// The animation was cancelled; its end state has been applied.
    Cancelled,
}

impl AnimationEvent {
    /// Whether this event ends the play-through.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// An animation wrapper that queues milestone events.
pub struct Callbacks<A> {
    inner: A,
    ended: bool,
    events: Vec<AnimationEvent>,
}

impl<A: std::fmt::Debug> std::fmt::Debug for Callbacks<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("inner", &self.inner)
            .field("ended", &self.ended)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl<A: Animation> Callbacks<A> {
    /// Wrap an animation. Terminal events are always tracked.
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            ended: false,
            events: Vec::new(),
        }
    }

    /// Access the inner animation.
    #[must_use]
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Whether a terminal event has been queued.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Cancel: jump to the end state and queue `Cancelled`.
    ///
    /// No-op if the animation already ended.
    pub fn cancel(&mut self) {
        if self.ended {
            return;
        }
        self.inner.finish();
        self.ended = true;
        self.events.push(AnimationEvent::Cancelled);
    }

    /// Queue `Completed` for an animation that is complete before its first
    /// tick (zero duration). Returns whether an event was queued.
    pub fn poll_complete(&mut self) -> bool {
        if !self.ended && self.inner.is_complete() {
            self.ended = true;
            self.events.push(AnimationEvent::Completed);
            return true;
        }
        false
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<A: Animation> Animation for Callbacks<A> {
    fn tick(&mut self, dt: Duration) {
        if self.ended {
            return;
        }
        self.inner.tick(dt);
        self.poll_complete();
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        self.inner.value()
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.ended = false;
        self.events.clear();
    }

    fn finish(&mut self) {
        self.inner.finish();
        self.poll_complete();
    }

    fn overshoot(&self) -> Duration {
        self.inner.overshoot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Tween;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_250: Duration = Duration::from_millis(250);
    const MS_500: Duration = Duration::from_millis(500);

    #[test]
    fn completed_fires_once() {
        let mut anim = Callbacks::new(Tween::new(MS_500));
        anim.tick(MS_250);
        assert!(anim.drain_events().is_empty());

        anim.tick(MS_500);
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);

        anim.tick(MS_100);
        assert!(anim.drain_events().is_empty());
    }

    #[test]
    fn cancel_applies_end_state_and_suppresses_completion() {
        let mut anim = Callbacks::new(Tween::new(MS_500));
        anim.tick(MS_100);
        anim.cancel();
        assert!(anim.inner().is_complete());
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Cancelled]);

        anim.tick(MS_500);
        anim.cancel();
        assert!(anim.drain_events().is_empty());
    }

    #[test]
    fn cancel_after_completion_is_noop() {
        let mut anim = Callbacks::new(Tween::new(MS_100));
        anim.tick(MS_100);
        anim.cancel();
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
    }

    #[test]
    fn zero_duration_polls_complete_without_tick() {
        let mut anim = Callbacks::new(Tween::new(Duration::ZERO));
        assert!(anim.poll_complete());
        assert!(!anim.poll_complete());
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
    }

    #[test]
    fn reset_allows_events_to_fire_again() {
        let mut anim = Callbacks::new(Tween::new(MS_100));
        anim.tick(MS_100);
        let _ = anim.drain_events();
        anim.reset();
        assert!(!anim.has_ended());
        anim.tick(MS_100);
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
    }

    #[test]
    fn terminal_classification() {
        assert!(AnimationEvent::Completed.is_terminal());
        assert!(AnimationEvent::Cancelled.is_terminal());
    }

    #[test]
    fn debug_format() {
        let anim = Callbacks::new(Tween::new(MS_100));
        let dbg = format!("{anim:?}");
        assert!(dbg.contains("Callbacks"));
        assert!(dbg.contains("pending_events"));
    }
}
