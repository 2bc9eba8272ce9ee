#![forbid(unsafe_code)]

//! Spotlight walkthrough overlay.
//!
//! A translucent layer dims the host surface and punches a rounded hole
//! around one target element at a time, with a title and subtitle beside it.
//! The user steps forward or back through the pages; each change animates
//! the hole from one target to the next.
//!
//! # Role in the stack
//! - **Target sequence**: a validated chain of pages ([`TargetSequence`]).
//! - **Geometry**: host elements to overlay-local rectangles ([`GeometryResolver`]).
//! - **Captions**: wrapping and placement via `spotlight-text`.
//! - **Sequencer**: the phase machine that drives tweens ([`AnimationSequencer`]).
//! - **Renderer**: draws a frame onto a host [`Canvas`] ([`SpotlightRenderer`]).
//! - **Facade**: [`SpotlightOverlay`] wires the above to host calls.
//!
//! # Configuration
//! [`SpotlightConfig::from_env`] reads `SPOTLIGHT_*` overrides on top of the
//! defaults; invalid values are logged and replaced.

pub mod config;
pub mod error;
pub mod overlay;
pub mod render;
pub mod resolver;
pub mod sequencer;
pub mod target;

pub use config::{ConfigError, SpotlightConfig, SpotlightConfigParse};
pub use error::{Result, SpotlightError};
pub use overlay::{SpotlightOverlay, TargetSpec};
pub use render::{Canvas, DrawOp, RecordingCanvas, Rgba, SpotlightRenderer};
pub use resolver::{GeometryResolver, HostElement, OverlayFrame, resolve_rect};
pub use sequencer::{AnimationSequencer, Intent, OverlayEvent, Phase, Suppressed};
pub use target::{Advance, ChainViolation, HighlightTarget, Retreat, TargetId, TargetSequence};

pub use spotlight_core::geometry::{PointF, RectF, SizeF};
pub use spotlight_text::{BlockKind, TextAnchor};
