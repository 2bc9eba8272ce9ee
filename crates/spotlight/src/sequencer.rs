#![forbid(unsafe_code)]

//! The walkthrough animation state machine.
//!
//! One tween group runs at a time. Each [`Phase`] owns the group it starts,
//! and when that group ends (completed or cancelled) the phase's bookkeeping
//! runs and the next phase begins:
//!
//! ```text
//! Closed -> EnteringBackground -> Growing -> Pulsing -> CaptionFading -> Steady
//!                                              ^                          |
//!                                              +-------- Moving <---------+
//!                                                                         |
//!                                   Closed <- Closing <-------------------+
//! ```
//!
//! User intents are only honored in `Steady`; everywhere else the machine is
//! transitioning and intents are dropped. [`AnimationSequencer::close`] is
//! the host's escape hatch and works from any running phase.
//!
//! The sequencer owns no targets. It borrows the [`TargetSequence`] on every
//! call and writes animated values into the live target's `bounds` and
//! caption opacity. A target's `resolved` rectangle is never animated, so a
//! page left mid-move can always be put back.

use std::time::Duration;

use bitflags::bitflags;
use spotlight_core::animation::{
    Animation, AnimationEvent, Callbacks, EasingFn, Track, TweenGroup, accelerate_decelerate,
    ease_in_out, ease_out, fast_out_slow_in, linear,
};
use spotlight_core::geometry::RectF;

use crate::config::SpotlightConfig;
use crate::target::{Advance, Retreat, TargetId, TargetSequence};

/// Where the walkthrough is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing running.
    #[default]
    Closed,
    /// Background alpha fading in.
    EnteringBackground,
    /// First hole growing from its seed.
    Growing,
    /// Hole edges bouncing out and back.
    Pulsing,
    /// Caption fading in.
    CaptionFading,
    /// Idle on a page, accepting intents.
    Steady,
    /// Hole travelling to another page.
    Moving,
    /// Hole expanding to the whole overlay.
    Closing,
}

/// A user request, already recognized from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Previous,
    Dismiss,
}

/// Something the host should hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// A page became live.
    PageChanged { is_last: bool },
    /// The close animation finished; the overlay is hidden.
    Closed,
    /// The host element behind `page` could not be measured.
    TargetUnresolved { page: usize },
}

bitflags! {
    /// Draw layers the renderer must skip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Suppressed: u8 {
        /// Border and glow strokes.
        const BORDER = 0b01;
        /// Caption text.
        const CAPTION = 0b10;
    }
}

/// Numeric properties the tween groups drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    Left,
    Top,
    Right,
    Bottom,
    Radius,
    BackgroundAlpha,
    CaptionOpacity,
}

type Group = Callbacks<TweenGroup<Property>>;

/// Drives the walkthrough phases from host ticks.
#[derive(Debug)]
pub struct AnimationSequencer {
    config: SpotlightConfig,
    phase: Phase,
    live: Option<TargetId>,
    destination: Option<TargetId>,
    running: Option<Group>,
    background_alpha: f32,
    corner_radius: f32,
    suppressed: Suppressed,
    frame: RectF,
    events: Vec<OverlayEvent>,
}

impl AnimationSequencer {
    pub fn new(config: SpotlightConfig) -> Self {
        let corner_radius = config.corner_radius;
        Self {
            config,
            phase: Phase::Closed,
            live: None,
            destination: None,
            running: None,
            background_alpha: 0.0,
            corner_radius,
            suppressed: Suppressed::empty(),
            frame: RectF::ZERO,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether an animation is in flight (every phase but `Steady` and `Closed`).
    pub fn is_transitioning(&self) -> bool {
        !matches!(self.phase, Phase::Steady | Phase::Closed)
    }

    /// The page whose hole is drawn.
    pub fn live(&self) -> Option<TargetId> {
        self.live
    }

    /// Current background alpha, 0 to `max_background_alpha`.
    pub fn background_alpha(&self) -> f32 {
        self.background_alpha
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn suppressed(&self) -> Suppressed {
        self.suppressed
    }

    pub fn config(&self) -> &SpotlightConfig {
        &self.config
    }

    /// Drain queued events.
    pub fn drain_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin the tour. `frame` is the overlay's local bounds, the rectangle
    /// the close animation expands to.
    ///
    /// Ignored unless the sequencer is `Closed`.
    pub fn start(&mut self, sequence: &mut TargetSequence, frame: RectF) -> bool {
        if self.phase != Phase::Closed {
            return false;
        }
        self.frame = frame;
        self.background_alpha = 0.0;
        self.live = None;
        self.destination = None;
        self.begin(Phase::EnteringBackground, sequence);
        true
    }

    /// Apply a user intent. Returns whether it started a transition.
    pub fn handle_intent(&mut self, intent: Intent, sequence: &mut TargetSequence) -> bool {
        if self.phase != Phase::Steady {
            tracing::trace!(
                target: spotlight_core::logging::TARGET,
                ?intent,
                phase = ?self.phase,
                "intent ignored"
            );
            return false;
        }
        let Some(live) = self.live else {
            return false;
        };

        match intent {
            Intent::Next => match sequence.advance_from(live) {
                Advance::To(id) => self.begin_move(id, sequence),
                Advance::Terminal => self.begin(Phase::Closing, sequence),
            },
            Intent::Previous => match sequence.retreat_from(live) {
                Retreat::To(id) => self.begin_move(id, sequence),
                Retreat::Boundary => {
                    tracing::trace!(
                        target: spotlight_core::logging::TARGET,
                        "already on the first page"
                    );
                    return false;
                }
            },
            Intent::Dismiss => self.begin(Phase::Closing, sequence),
        }
        true
    }

    /// Close from any running phase.
    ///
    /// The in-flight group is cancelled: it jumps to its end values and its
    /// phase's completion bookkeeping runs as if it had finished, then the
    /// close animation starts. No-op while `Closing` or `Closed`.
    pub fn close(&mut self, sequence: &mut TargetSequence) {
        if matches!(self.phase, Phase::Closing | Phase::Closed) {
            return;
        }
        if let Some(group) = self.running.as_mut() {
            group.cancel();
            let _ = group.drain_events();
            self.apply(sequence);
            self.running = None;
            let _ = self.complete_phase(sequence);
        }
        self.begin(Phase::Closing, sequence);
    }

    /// Advance the running group by `dt`.
    ///
    /// At most one phase ends per tick, so a zero-duration phase completes on
    /// the tick after it begins.
    pub fn tick(&mut self, dt: Duration, sequence: &mut TargetSequence) {
        let Some(group) = self.running.as_mut() else {
            return;
        };
        group.tick(dt);
        let ended = group
            .drain_events()
            .into_iter()
            .any(AnimationEvent::is_terminal);
        self.apply(sequence);

        if ended {
            self.running = None;
            let next = self.complete_phase(sequence);
            self.begin(next, sequence);
        }
    }

    /// Write the running group's values into the overlay state.
    fn apply(&mut self, sequence: &mut TargetSequence) {
        let Some(group) = self.running.as_ref() else {
            return;
        };
        let mut live = self.live.and_then(|id| sequence.get_mut(id));
        for (property, value) in group.inner().values() {
            match property {
                Property::BackgroundAlpha => self.background_alpha = value,
                Property::Radius => self.corner_radius = value,
                Property::CaptionOpacity => {
                    if let Some(target) = live.as_deref_mut() {
                        target.caption_opacity = value;
                    }
                }
                edge => {
                    if let Some(target) = live.as_deref_mut() {
                        let bounds = &mut target.bounds;
                        match edge {
                            Property::Left => bounds.left = value,
                            Property::Top => bounds.top = value,
                            Property::Right => bounds.right = value,
                            _ => bounds.bottom = value,
                        }
                    }
                }
            }
        }
    }

    /// Bookkeeping for the phase whose group just ended. Returns the phase
    /// that naturally follows.
    fn complete_phase(&mut self, sequence: &mut TargetSequence) -> Phase {
        match self.phase {
            Phase::Closed | Phase::Steady => self.phase,
            Phase::EnteringBackground => Phase::Growing,
            Phase::Growing => {
                self.suppressed.remove(Suppressed::BORDER);
                if let Some(target) = self.live.and_then(|id| sequence.get_mut(id)) {
                    target.restore_bounds();
                }
                Phase::Pulsing
            }
            Phase::Pulsing => Phase::CaptionFading,
            Phase::CaptionFading => Phase::Steady,
            Phase::Moving => {
                if let Some(outgoing) = self.live.and_then(|id| sequence.get_mut(id)) {
                    outgoing.restore_bounds();
                }
                if let Some(destination) = self.destination.take() {
                    self.live = Some(destination);
                    sequence.seek(destination);
                    if let Some(target) = sequence.get_mut(destination) {
                        target.restore_bounds();
                        self.events.push(OverlayEvent::PageChanged {
                            is_last: target.is_last(),
                        });
                    }
                }
                Phase::Pulsing
            }
            Phase::Closing => {
                if let Some(target) = self.live.take().and_then(|id| sequence.get_mut(id)) {
                    target.restore_bounds();
                    target.reset_caption();
                }
                self.destination = None;
                self.corner_radius = self.config.corner_radius;
                self.suppressed = Suppressed::empty();
                self.background_alpha = 0.0;
                self.events.push(OverlayEvent::Closed);
                Phase::Closed
            }
        }
    }

    fn begin_move(&mut self, destination: TargetId, sequence: &mut TargetSequence) {
        if let Some(outgoing) = self.live.and_then(|id| sequence.get_mut(id)) {
            outgoing.reset_caption();
        }
        self.destination = Some(destination);
        self.begin(Phase::Moving, sequence);
    }

    /// Enter `phase` and start its group.
    fn begin(&mut self, phase: Phase, sequence: &mut TargetSequence) {
        let from = self.phase;
        self.phase = phase;
        let config = &self.config;

        let group = match phase {
            Phase::Closed | Phase::Steady => None,
            Phase::EnteringBackground => Some(TweenGroup::new().with(
                Track::new(
                    Property::BackgroundAlpha,
                    0.0,
                    f32::from(config.max_background_alpha),
                    config.background_fade,
                )
                .easing(linear),
            )),
            Phase::Growing => {
                let head = sequence.head();
                self.live = Some(head);
                sequence.seek(head);
                self.suppressed.insert(Suppressed::BORDER);
                sequence.get_mut(head).map(|target| {
                    target.reset_caption();
                    let home = target.resolved;
                    let seed = home.scaled_about_center(config.grow_seed_ratio);
                    target.bounds = seed;
                    edge_tracks(seed, home, config.grow, accelerate_decelerate)
                })
            }
            Phase::Pulsing => self.live.and_then(|id| sequence.get(id)).map(|target| {
                pulse_tracks(target.resolved, config.pulse_amount, config.pulse)
            }),
            Phase::CaptionFading => {
                self.live.and_then(|id| sequence.get_mut(id)).map(|target| {
                    target.caption_visible = true;
                    target.caption_opacity = 0.0;
                    TweenGroup::new().with(
                        Track::new(Property::CaptionOpacity, 0.0, 1.0, config.caption_fade)
                            .easing(linear),
                    )
                })
            }
            Phase::Moving => {
                let from_rect = self.live.and_then(|id| sequence.get(id)).map(|t| t.bounds);
                let to_rect = self
                    .destination
                    .and_then(|id| sequence.get(id))
                    .map(|t| t.resolved);
                match (from_rect, to_rect) {
                    (Some(from_rect), Some(to_rect)) => Some(edge_tracks(
                        from_rect,
                        to_rect,
                        config.move_duration,
                        fast_out_slow_in,
                    )),
                    _ => None,
                }
            }
            Phase::Closing => {
                self.suppressed = Suppressed::BORDER | Suppressed::CAPTION;
                let radius = Track::new(Property::Radius, self.corner_radius, 0.0, config.close)
                    .easing(ease_out);
                let group = match self.live.and_then(|id| sequence.get(id)) {
                    Some(target) => edge_tracks(target.bounds, self.frame, config.close, ease_out),
                    None => TweenGroup::new(),
                };
                Some(group.with(radius))
            }
        };

        tracing::debug!(
            target: spotlight_core::logging::TARGET,
            from = ?from,
            to = ?phase,
            page = ?self.live.and_then(|id| sequence.get(id)).map(|t| t.page_index()),
            "phase transition"
        );

        self.running = group.map(Callbacks::new);
        if self.running.is_none() && !matches!(phase, Phase::Steady | Phase::Closed) {
            // Nothing to animate (no live target): finish the phase now.
            let next = self.complete_phase(sequence);
            self.begin(next, sequence);
        }
    }
}

/// Four edge tracks from `from` to `to`.
fn edge_tracks(
    from: RectF,
    to: RectF,
    duration: Duration,
    easing: EasingFn,
) -> TweenGroup<Property> {
    TweenGroup::new()
        .with(Track::new(Property::Left, from.left, to.left, duration).easing(easing))
        .with(Track::new(Property::Top, from.top, to.top, duration).easing(easing))
        .with(Track::new(Property::Right, from.right, to.right, duration).easing(easing))
        .with(Track::new(Property::Bottom, from.bottom, to.bottom, duration).easing(easing))
}

/// Each edge out by `amount` and back.
fn pulse_tracks(home: RectF, amount: f32, duration: Duration) -> TweenGroup<Property> {
    let track = |property, value: f32, offset: f32| {
        Track::keyframes(property, [value, value + offset, value], duration).easing(ease_in_out)
    };
    TweenGroup::new()
        .with(track(Property::Left, home.left, -amount))
        .with(track(Property::Top, home.top, -amount))
        .with(track(Property::Right, home.right, amount))
        .with(track(Property::Bottom, home.bottom, amount))
}
