#![forbid(unsafe_code)]

//! Caption text handling for the spotlight overlay.
//!
//! - [`wrap`]: width-correct wrapping plus end and middle ellipsizing that
//!   never split a grapheme cluster.
//! - [`fit`]: the [`TextFitEngine`] that stacks title, subtitle, and page
//!   label above or below a highlighted rectangle and shrinks the subtitle
//!   until the stack fits.
//!
//! # Example
//! ```
//! use spotlight_core::geometry::RectF;
//! use spotlight_text::{CaptionText, ContentBounds, TextAnchor, TextFitEngine};
//!
//! let engine = TextFitEngine::default();
//! let caption = CaptionText::new("Search", "Find anything in the catalog.", 2).page(1, 3);
//! let layout = engine.place(
//!     RectF::new(20.0, 40.0, 200.0, 90.0),
//!     ContentBounds::new(400.0, 800.0),
//!     &caption,
//! );
//! assert_eq!(layout.anchor, TextAnchor::Bottom);
//! ```

pub mod fit;
pub mod wrap;

pub use fit::{
    BlockKind, BlockMetrics, CaptionLayout, CaptionText, ContentBounds, FitMetrics, PlacedBlock,
    SubtitleFit, TextAnchor, TextBlock, TextFitEngine,
};
pub use wrap::{display_width, ellipsize_middle, wrap_text};
