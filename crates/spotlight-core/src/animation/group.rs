#![forbid(unsafe_code)]

//! Tween groups: several numeric properties animated together.
//!
//! A [`Track`] interpolates one property through a list of keyframes on its
//! own [`Tween`] clock. A [`TweenGroup`] owns one track per property, ticks
//! them on the same frame, and is complete when its slowest member is.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use spotlight_core::animation::{Animation, Track, TweenGroup, linear};
//!
//! let mut group = TweenGroup::new()
//!     .with(Track::new("left", 0.0, 10.0, Duration::from_millis(100)).easing(linear))
//!     .with(Track::keyframes("top", [5.0, 0.0, 5.0], Duration::from_millis(200)));
//!
//! group.tick(Duration::from_millis(100));
//! assert_eq!(group.current("left"), Some(10.0));
//! assert!(!group.is_complete());
//! ```
//!
//! # Invariants
//!
//! 1. Each property appears at most once; inserting a duplicate replaces it.
//! 2. `is_complete()` is true iff every track is complete (empty groups are).
//! 3. `finish()` leaves every track at its last keyframe.
//! 4. A track whose keyframes are empty or non-finite is degraded: it is
//!    complete from construction and reports its end value (the last finite
//!    keyframe, or 0.0).

use std::fmt;
use std::time::Duration;

use super::{Animation, EasingFn, Tween};

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// One property interpolated through keyframes.
#[derive(Clone)]
pub struct Track<P> {
    property: P,
    keyframes: Vec<f32>,
    clock: Tween,
    degraded: bool,
}

impl<P: fmt::Debug> fmt::Debug for Track<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("property", &self.property)
            .field("current", &self.current())
            .field("complete", &self.clock.is_complete())
            .field("degraded", &self.degraded)
            .finish()
    }
}

impl<P> Track<P> {
    /// Two-keyframe track from `from` to `to`.
    pub fn new(property: P, from: f32, to: f32, duration: Duration) -> Self {
        Self::keyframes(property, [from, to], duration)
    }

    /// Track through an arbitrary list of keyframes, evenly spaced in time.
    pub fn keyframes(property: P, keyframes: impl Into<Vec<f32>>, duration: Duration) -> Self {
        let keyframes: Vec<f32> = keyframes.into();
        let degraded = keyframes.is_empty() || keyframes.iter().any(|v| !v.is_finite());
        let mut clock = Tween::new(duration);
        let keyframes = if degraded {
            clock.finish();
            let end = keyframes
                .iter()
                .rev()
                .copied()
                .find(|v| v.is_finite())
                .unwrap_or(0.0);
            crate::debug!(
                target: crate::logging::TARGET,
                end,
                "degenerate track keyframes; jumping to end value"
            );
            vec![end]
        } else {
            keyframes
        };
        Self {
            property,
            keyframes,
            clock,
            degraded,
        }
    }

    /// Set the easing applied to the track's time progress.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.clock = self.clock.easing(easing);
        self
    }

    /// The property this track drives.
    pub fn property(&self) -> &P {
        &self.property
    }

    /// Whether construction had to degrade this track to an instant jump.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Final keyframe.
    pub fn end_value(&self) -> f32 {
        self.keyframes.last().copied().unwrap_or(0.0)
    }

    /// Interpolated property value at the current progress.
    pub fn current(&self) -> f32 {
        let n = self.keyframes.len();
        if n <= 1 || self.clock.is_complete() {
            return self.end_value();
        }
        let segments = (n - 1) as f32;
        let position = self.clock.value() * segments;
        let index = (position.floor() as usize).min(n - 2);
        let local = position - index as f32;
        let from = self.keyframes[index];
        let to = self.keyframes[index + 1];
        from + (to - from) * local
    }
}

impl<P> Animation for Track<P> {
    fn tick(&mut self, dt: Duration) {
        self.clock.tick(dt);
    }

    fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    fn value(&self) -> f32 {
        self.clock.value()
    }

    fn reset(&mut self) {
        if !self.degraded {
            self.clock.reset();
        }
    }

    fn finish(&mut self) {
        self.clock.finish();
    }

    fn overshoot(&self) -> Duration {
        self.clock.overshoot()
    }
}

// ---------------------------------------------------------------------------
// TweenGroup
// ---------------------------------------------------------------------------

/// Tracks ticked together; completes when the slowest member completes.
///
/// Implements [`Animation`]: `value()` is the mean progress of its tracks.
#[derive(Clone)]
pub struct TweenGroup<P> {
    tracks: Vec<Track<P>>,
}

impl<P: fmt::Debug> fmt::Debug for TweenGroup<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenGroup")
            .field("tracks", &self.tracks)
            .field("progress", &self.overall_progress())
            .finish()
    }
}

impl<P> Default for TweenGroup<P> {
    fn default() -> Self {
        Self { tracks: Vec::new() }
    }
}

impl<P: PartialEq> TweenGroup<P> {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track (builder pattern). Replaces an existing track for the
    /// same property.
    #[must_use]
    pub fn with(mut self, track: Track<P>) -> Self {
        self.insert(track);
        self
    }

    /// Insert a track, replacing an existing one for the same property.
    pub fn insert(&mut self, track: Track<P>) {
        if let Some(existing) = self
            .tracks
            .iter_mut()
            .find(|t| t.property == track.property)
        {
            *existing = track;
        } else {
            self.tracks.push(track);
        }
    }

    /// Current value of a property, if the group drives it.
    #[must_use]
    pub fn current(&self, property: P) -> Option<f32> {
        self.tracks
            .iter()
            .find(|t| t.property == property)
            .map(Track::current)
    }
}

impl<P> TweenGroup<P> {
    /// Number of tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the group has no tracks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Mean progress across all tracks (0.0 for an empty group).
    #[must_use]
    pub fn overall_progress(&self) -> f32 {
        if self.tracks.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.tracks.iter().map(Animation::value).sum();
        sum / self.tracks.len() as f32
    }

    /// Iterator over `(property, current value)` pairs.
    pub fn values(&self) -> impl Iterator<Item = (&P, f32)> {
        self.tracks.iter().map(|t| (&t.property, t.current()))
    }
}

impl<P> Animation for TweenGroup<P> {
    fn tick(&mut self, dt: Duration) {
        for track in &mut self.tracks {
            if !track.is_complete() {
                track.tick(dt);
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.tracks.iter().all(Animation::is_complete)
    }

    fn value(&self) -> f32 {
        self.overall_progress()
    }

    fn reset(&mut self) {
        for track in &mut self.tracks {
            track.reset();
        }
    }

    fn finish(&mut self) {
        for track in &mut self.tracks {
            track.finish();
        }
    }

    fn overshoot(&self) -> Duration {
        self.tracks
            .iter()
            .map(Animation::overshoot)
            .min()
            .unwrap_or(Duration::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::linear;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_200: Duration = Duration::from_millis(200);
    const MS_500: Duration = Duration::from_millis(500);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Prop {
        A,
        B,
    }

    #[test]
    fn empty_group_is_complete() {
        let group: TweenGroup<Prop> = TweenGroup::new();
        assert!(group.is_empty());
        assert!(group.is_complete());
        assert_eq!(group.overall_progress(), 0.0);
    }

    #[test]
    fn two_keyframe_track_interpolates() {
        let mut track = Track::new(Prop::A, 10.0, 20.0, MS_200).easing(linear);
        assert_eq!(track.current(), 10.0);
        track.tick(MS_100);
        assert!((track.current() - 15.0).abs() < 0.01);
        track.tick(MS_100);
        assert_eq!(track.current(), 20.0);
    }

    #[test]
    fn three_keyframes_bounce_and_return() {
        let mut track = Track::keyframes(Prop::A, [0.0, -10.0, 0.0], MS_200).easing(linear);
        track.tick(MS_100);
        assert!((track.current() + 10.0).abs() < 0.01);
        track.tick(Duration::from_millis(50));
        assert!((track.current() + 5.0).abs() < 0.01);
        track.tick(Duration::from_millis(50));
        assert_eq!(track.current(), 0.0);
    }

    #[test]
    fn group_completes_with_slowest_member() {
        let mut group = TweenGroup::new()
            .with(Track::new(Prop::A, 0.0, 1.0, MS_100))
            .with(Track::new(Prop::B, 0.0, 1.0, MS_500));
        group.tick(MS_200);
        assert!(!group.is_complete());
        assert_eq!(group.current(Prop::A), Some(1.0));
        group.tick(Duration::from_millis(300));
        assert!(group.is_complete());
    }

    #[test]
    fn duplicate_property_replaces() {
        let group = TweenGroup::new()
            .with(Track::new(Prop::A, 0.0, 1.0, MS_100))
            .with(Track::new(Prop::A, 5.0, 6.0, MS_100));
        assert_eq!(group.len(), 1);
        assert_eq!(group.current(Prop::A), Some(5.0));
    }

    #[test]
    fn finish_snaps_every_track_to_end() {
        let mut group = TweenGroup::new()
            .with(Track::new(Prop::A, 0.0, 4.0, MS_500))
            .with(Track::keyframes(Prop::B, [1.0, 9.0, 2.0], MS_500));
        group.tick(MS_100);
        group.finish();
        assert!(group.is_complete());
        assert_eq!(group.current(Prop::A), Some(4.0));
        assert_eq!(group.current(Prop::B), Some(2.0));
    }

    #[test]
    fn non_finite_keyframes_degrade_to_end_value() {
        let track = Track::new(Prop::A, 3.0, f32::NAN, MS_500);
        assert!(track.is_degraded());
        assert!(track.is_complete());
        assert_eq!(track.current(), 3.0);

        let track = Track::new(Prop::A, f32::INFINITY, 7.0, MS_500);
        assert_eq!(track.current(), 7.0);
    }

    #[test]
    fn empty_keyframes_degrade_to_zero() {
        let track = Track::keyframes(Prop::B, Vec::<f32>::new(), MS_500);
        assert!(track.is_complete());
        assert_eq!(track.current(), 0.0);
    }

    #[test]
    fn zero_duration_group_is_instant() {
        let group = TweenGroup::new().with(Track::new(Prop::A, 0.0, 8.0, Duration::ZERO));
        assert!(group.is_complete());
        assert_eq!(group.current(Prop::A), Some(8.0));
    }

    #[test]
    fn values_iterates_in_insertion_order() {
        let group = TweenGroup::new()
            .with(Track::new(Prop::B, 1.0, 2.0, MS_100))
            .with(Track::new(Prop::A, 3.0, 4.0, MS_100));
        let props: Vec<Prop> = group.values().map(|(p, _)| *p).collect();
        assert_eq!(props, vec![Prop::B, Prop::A]);
    }

    #[test]
    fn debug_format() {
        let group = TweenGroup::new().with(Track::new(Prop::A, 0.0, 1.0, MS_100));
        let dbg = format!("{group:?}");
        assert!(dbg.contains("TweenGroup"));
        assert!(dbg.contains("progress"));
    }
}
