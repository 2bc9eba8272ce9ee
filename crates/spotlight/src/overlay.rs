#![forbid(unsafe_code)]

//! The host-facing overlay.
//!
//! [`SpotlightOverlay`] ties the pieces together: the host hands it targets,
//! reports layout, forwards intents and ticks, and asks it to draw. Output is
//! polled with [`drain_events`](SpotlightOverlay::drain_events).
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use spotlight::{
//!     HostElement, Intent, OverlayEvent, OverlayFrame, Phase, PointF, SizeF, SpotlightOverlay,
//!     TargetSpec,
//! };
//!
//! struct Button(PointF);
//!
//! impl HostElement for Button {
//!     fn screen_position(&self) -> PointF { self.0 }
//!     fn size(&self) -> SizeF { SizeF::new(80.0, 32.0) }
//! }
//!
//! let button: Rc<dyn HostElement> = Rc::new(Button(PointF::new(40.0, 120.0)));
//! let mut overlay = SpotlightOverlay::default();
//! overlay
//!     .set_targets(vec![TargetSpec::new(Rc::downgrade(&button), "Save", "Stores your work.", 2)])
//!     .expect("one target");
//! overlay.notify_layout_changed(OverlayFrame::new(PointF::default(), SizeF::new(360.0, 640.0)));
//!
//! while overlay.phase() != Phase::Steady {
//!     overlay.tick(Duration::from_millis(16));
//! }
//! overlay.notify_intent(Intent::Next);
//! while overlay.is_visible() {
//!     overlay.tick(Duration::from_millis(16));
//! }
//! assert_eq!(
//!     overlay.drain_events(),
//!     vec![OverlayEvent::PageChanged { is_last: true }, OverlayEvent::Closed]
//! );
//! ```

use std::rc::Weak;
use std::time::Duration;

use spotlight_core::geometry::RectF;
use spotlight_text::{ContentBounds, TextFitEngine};

use crate::config::SpotlightConfig;
use crate::error::{Result, SpotlightError};
use crate::render::{Canvas, SpotlightRenderer};
use crate::resolver::{GeometryResolver, HostElement, OverlayFrame};
use crate::sequencer::{AnimationSequencer, Intent, OverlayEvent, Phase};
use crate::target::{HighlightTarget, TargetSequence};

/// One page as the host describes it.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub anchor: Weak<dyn HostElement>,
    pub title: String,
    pub subtitle: String,
    /// Subtitle line cap.
    pub max_lines: usize,
}

impl TargetSpec {
    pub fn new(
        anchor: Weak<dyn HostElement>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        max_lines: usize,
    ) -> Self {
        Self {
            anchor,
            title: title.into(),
            subtitle: subtitle.into(),
            max_lines,
        }
    }
}

/// A spotlight walkthrough over a host surface.
#[derive(Debug)]
pub struct SpotlightOverlay {
    resolver: GeometryResolver,
    fit: TextFitEngine,
    renderer: SpotlightRenderer,
    sequencer: AnimationSequencer,
    sequence: Option<TargetSequence>,
    frame: OverlayFrame,
    visible: bool,
    started: bool,
    events: Vec<OverlayEvent>,
}

impl Default for SpotlightOverlay {
    fn default() -> Self {
        Self::new(SpotlightConfig::default())
    }
}

impl SpotlightOverlay {
    pub fn new(config: SpotlightConfig) -> Self {
        Self {
            resolver: GeometryResolver::new(config.target_padding),
            fit: TextFitEngine::new(config.fit_metrics),
            renderer: SpotlightRenderer::new(&config),
            sequencer: AnimationSequencer::new(config),
            sequence: None,
            frame: OverlayFrame::default(),
            visible: false,
            started: false,
            events: Vec::new(),
        }
    }

    /// Load a tour and show the overlay. The entry animation waits for
    /// [`notify_layout_changed`](Self::notify_layout_changed).
    pub fn set_targets(&mut self, specs: Vec<TargetSpec>) -> Result<()> {
        if self.visible {
            return Err(SpotlightError::TourActive);
        }
        let targets = specs
            .into_iter()
            .map(|spec| HighlightTarget::new(spec.anchor, spec.title, spec.subtitle, spec.max_lines))
            .collect();
        let sequence = TargetSequence::link(targets)?;

        tracing::debug!(
            target: spotlight_core::logging::TARGET,
            pages = sequence.len(),
            "tour loaded"
        );
        self.sequence = Some(sequence);
        self.visible = true;
        self.started = false;
        Ok(())
    }

    /// Report the host's layout pass.
    ///
    /// The first call after [`set_targets`](Self::set_targets) measures every
    /// target, places every caption, and starts the entry animation. Later
    /// calls are ignored.
    pub fn notify_layout_changed(&mut self, frame: OverlayFrame) {
        if !self.visible || self.started {
            return;
        }
        let Some(sequence) = self.sequence.as_mut() else {
            return;
        };
        self.frame = frame;

        for page in self.resolver.resolve_sequence(sequence, &frame) {
            self.events.push(OverlayEvent::TargetUnresolved { page });
        }

        let bounds = ContentBounds::new(frame.size.width, frame.size.height);
        let ids: Vec<_> = sequence.iter().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(target) = sequence.get_mut(id) {
                let layout = self.fit.place(target.resolved, bounds, &target.caption_text());
                target.text_anchor = layout.anchor;
                target.caption = layout;
            }
        }

        let is_last = sequence
            .get(sequence.head())
            .is_some_and(HighlightTarget::is_last);
        self.events.push(OverlayEvent::PageChanged { is_last });

        self.started = self.sequencer.start(sequence, frame.local_bounds());
    }

    /// Forward a user intent. Returns whether it started a transition.
    pub fn notify_intent(&mut self, intent: Intent) -> bool {
        match self.sequence.as_mut() {
            Some(sequence) if self.started => self.sequencer.handle_intent(intent, sequence),
            _ => false,
        }
    }

    /// Close the tour from any state. Idempotent.
    ///
    /// Before layout has started the tour, the overlay hides immediately.
    pub fn close(&mut self) {
        if !self.visible {
            return;
        }
        match self.sequence.as_mut() {
            Some(sequence) if self.started => self.sequencer.close(sequence),
            _ => {
                self.events.push(OverlayEvent::Closed);
                self.hide();
            }
        }
    }

    /// Advance animations by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(sequence) = self.sequence.as_mut() {
            self.sequencer.tick(dt, sequence);
        }
        self.pump();
    }

    /// Draw the current frame. Draws nothing while hidden.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        if !self.visible {
            return;
        }
        if let Some(sequence) = self.sequence.as_ref() {
            self.renderer
                .draw(canvas, self.frame.local_bounds(), &self.sequencer, sequence);
        }
    }

    /// Drain pending events in the order they happened.
    pub fn drain_events(&mut self) -> Vec<OverlayEvent> {
        self.pump();
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether intents are currently being dropped.
    pub fn is_transitioning(&self) -> bool {
        self.sequencer.is_transitioning()
    }

    /// 1-based page of the live target.
    pub fn current_page(&self) -> Option<usize> {
        let sequence = self.sequence.as_ref()?;
        let live = self.sequencer.live()?;
        sequence.get(live).map(HighlightTarget::page_index)
    }

    /// Current hole rectangle.
    pub fn live_bounds(&self) -> Option<RectF> {
        let sequence = self.sequence.as_ref()?;
        let live = self.sequencer.live()?;
        sequence.get(live).map(|target| target.bounds)
    }

    /// The loaded tour, if any.
    pub fn sequence(&self) -> Option<&TargetSequence> {
        self.sequence.as_ref()
    }

    pub fn config(&self) -> &SpotlightConfig {
        self.sequencer.config()
    }

    /// Move sequencer events into the overlay queue and hide on close.
    fn pump(&mut self) {
        let events = self.sequencer.drain_events();
        let closed = events.contains(&OverlayEvent::Closed);
        self.events.extend(events);
        if closed {
            self.hide();
        }
    }

    fn hide(&mut self) {
        tracing::debug!(target: spotlight_core::logging::TARGET, "overlay hidden");
        self.visible = false;
        self.started = false;
        self.sequence = None;
    }
}
