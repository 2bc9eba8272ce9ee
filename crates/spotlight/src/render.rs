#![forbid(unsafe_code)]

//! Frame drawing.
//!
//! The host supplies an immediate-mode [`Canvas`]; [`SpotlightRenderer`]
//! issues the same four layers every frame:
//!
//! 1. the translucent background over the whole overlay,
//! 2. the border stroke and its wider glow (skipped while suppressed),
//! 3. the rounded punch-out that makes the hole,
//! 4. the caption lines at the current caption opacity.
//!
//! [`RecordingCanvas`] keeps the op stream for tests and headless hosts.

use spotlight_core::geometry::{PointF, RectF};
use spotlight_text::BlockKind;

use crate::config::SpotlightConfig;
use crate::sequencer::{AnimationSequencer, Phase, Suppressed};
use crate::target::TargetSequence;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with alpha replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Multiply alpha by `factor`, clamped to [0, 1]. NaN counts as zero.
    #[must_use]
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        self.with_alpha((f32::from(self.a) * factor).round() as u8)
    }
}

/// A 2D immediate-mode drawing surface.
pub trait Canvas {
    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: RectF, color: Rgba);

    /// Stroke a rounded rectangle outline.
    fn stroke_round_rect(&mut self, rect: RectF, radius: f32, width: f32, color: Rgba);

    /// Clear a rounded rectangle to full transparency.
    fn clear_round_rect(&mut self, rect: RectF, radius: f32);

    /// Draw one line of caption text with its top-left at `origin`.
    fn draw_text(&mut self, origin: PointF, text: &str, kind: BlockKind, color: Rgba);
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: RectF,
        color: Rgba,
    },
    StrokeRoundRect {
        rect: RectF,
        radius: f32,
        width: f32,
        color: Rgba,
    },
    ClearRoundRect {
        rect: RectF,
        radius: f32,
    },
    Text {
        origin: PointF,
        text: String,
        kind: BlockKind,
        color: Rgba,
    },
}

/// A canvas that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Take the recorded ops, leaving the canvas empty.
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Recorded text lines, in draw order.
    pub fn text_lines(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: RectF, color: Rgba) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_round_rect(&mut self, rect: RectF, radius: f32, width: f32, color: Rgba) {
        self.ops.push(DrawOp::StrokeRoundRect {
            rect,
            radius,
            width,
            color,
        });
    }

    fn clear_round_rect(&mut self, rect: RectF, radius: f32) {
        self.ops.push(DrawOp::ClearRoundRect { rect, radius });
    }

    fn draw_text(&mut self, origin: PointF, text: &str, kind: BlockKind, color: Rgba) {
        self.ops.push(DrawOp::Text {
            origin,
            text: text.to_string(),
            kind,
            color,
        });
    }
}

/// Draws the overlay from sequencer state.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightRenderer {
    overlay_color: Rgba,
    border_color: Rgba,
    text_color: Rgba,
    border_width: f32,
    glow_factor: f32,
}

impl SpotlightRenderer {
    pub fn new(config: &SpotlightConfig) -> Self {
        Self {
            overlay_color: config.overlay_color,
            border_color: config.border_color,
            text_color: config.text_color,
            border_width: config.border_width,
            glow_factor: config.glow_factor,
        }
    }

    /// Draw one frame. Nothing is drawn while the sequencer is `Closed`.
    pub fn draw(
        &self,
        canvas: &mut dyn Canvas,
        frame: RectF,
        sequencer: &AnimationSequencer,
        sequence: &TargetSequence,
    ) {
        if sequencer.phase() == Phase::Closed {
            return;
        }

        let alpha = sequencer.background_alpha().clamp(0.0, 255.0).round() as u8;
        canvas.fill_rect(frame, self.overlay_color.with_alpha(alpha));

        let Some(target) = sequencer.live().and_then(|id| sequence.get(id)) else {
            return;
        };
        let rect = target.bounds;
        let radius = sequencer.corner_radius().max(0.0);
        let suppressed = sequencer.suppressed();

        if !suppressed.contains(Suppressed::BORDER) && self.border_width > 0.0 {
            canvas.stroke_round_rect(rect, radius, self.border_width, self.border_color);
            canvas.stroke_round_rect(
                rect,
                radius,
                self.border_width * self.glow_factor,
                self.border_color.scale_alpha(0.5),
            );
        }

        canvas.clear_round_rect(rect, radius);

        if suppressed.contains(Suppressed::CAPTION)
            || !target.caption_visible
            || target.caption_opacity <= 0.0
        {
            return;
        }
        let color = self.text_color.scale_alpha(target.caption_opacity);
        for placed in &target.caption.blocks {
            let block = &placed.block;
            for (row, line) in block.lines.iter().enumerate() {
                let origin = PointF::new(
                    placed.origin.x,
                    placed.origin.y + row as f32 * block.line_height,
                );
                canvas.draw_text(origin, line, block.kind, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::HostElement;
    use crate::target::HighlightTarget;
    use spotlight_core::geometry::SizeF;
    use std::rc::Rc;

    struct Dummy;

    impl HostElement for Dummy {
        fn screen_position(&self) -> PointF {
            PointF::default()
        }

        fn size(&self) -> SizeF {
            SizeF::default()
        }
    }

    #[test]
    fn scale_alpha_clamps() {
        let white = Rgba::WHITE;
        assert_eq!(white.scale_alpha(0.5).a, 128);
        assert_eq!(white.scale_alpha(2.0).a, 255);
        assert_eq!(white.scale_alpha(-1.0).a, 0);
        assert_eq!(white.scale_alpha(f32::NAN).a, 0);
    }

    #[test]
    fn recording_canvas_keeps_order() {
        let mut canvas = RecordingCanvas::new();
        canvas.fill_rect(RectF::ZERO, Rgba::BLACK);
        canvas.clear_round_rect(RectF::ZERO, 4.0);
        canvas.draw_text(PointF::default(), "hi", BlockKind::Title, Rgba::WHITE);
        assert_eq!(canvas.ops().len(), 3);
        assert!(matches!(canvas.ops()[0], DrawOp::FillRect { .. }));
        assert_eq!(canvas.text_lines(), vec!["hi"]);
        assert_eq!(canvas.take().len(), 3);
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn closed_sequencer_draws_nothing() {
        let config = SpotlightConfig::default();
        let renderer = SpotlightRenderer::new(&config);
        let sequencer = AnimationSequencer::new(config);
        let host: Rc<dyn HostElement> = Rc::new(Dummy);
        let target = HighlightTarget::new(Rc::downgrade(&host), "t", "", 1);
        let sequence = TargetSequence::link(vec![target]).expect("linked");

        let mut canvas = RecordingCanvas::new();
        renderer.draw(&mut canvas, RectF::ZERO, &sequencer, &sequence);
        assert!(canvas.ops().is_empty());
    }
}
