#![forbid(unsafe_code)]

//! Caption layout: stacking, subtitle truncation, and above/below placement.
//!
//! A caption is up to three blocks stacked top to bottom with a fixed
//! padding between them: the title, the subtitle, and the `page/count`
//! label. Text is measured in monospace cells, so a block's height is its
//! line count times its line height and nothing here needs a font.
//!
//! Placement prefers the space below the highlighted rectangle, then the
//! space above it. When neither side holds the full caption the subtitle
//! loses lines against the roomier side until it fits or disappears.
//! Every function is pure: identical input yields an identical layout.

use smallvec::SmallVec;
use spotlight_core::geometry::{PointF, RectF};

use crate::wrap::{ELLIPSIS, ellipsize_middle, wrap_text};

/// Cell metrics for one caption block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMetrics {
    /// Width of one display cell in surface units.
    pub cell_width: f32,
    /// Height of one line in surface units.
    pub line_height: f32,
}

impl BlockMetrics {
    /// Create block metrics.
    pub const fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }

    /// Wrap columns available in `content_width`. Zero for degenerate input.
    #[must_use]
    pub fn columns(&self, content_width: f32) -> usize {
        if !(self.cell_width > 0.0) || !(content_width > 0.0) {
            return 0;
        }
        let columns = (content_width / self.cell_width).floor();
        if columns.is_finite() {
            columns as usize
        } else {
            0
        }
    }
}

/// Metrics for the whole caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub title: BlockMetrics,
    pub subtitle: BlockMetrics,
    pub page_label: BlockMetrics,
    /// Gap between the rectangle and the stack, and between blocks.
    pub padding: f32,
    /// Horizontal inset on both sides of the caption.
    pub padding_left: f32,
}

impl Default for FitMetrics {
    fn default() -> Self {
        Self {
            title: BlockMetrics::new(13.0, 30.0),
            subtitle: BlockMetrics::new(10.0, 24.0),
            page_label: BlockMetrics::new(7.0, 16.0),
            padding: 16.0,
            padding_left: 16.0,
        }
    }
}

/// Text of one caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionText<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    /// Subtitle line cap before any shrinking.
    pub max_lines: usize,
    /// 1-based page index.
    pub page: usize,
    pub page_count: usize,
}

impl<'a> CaptionText<'a> {
    /// Caption for a single-page tour.
    pub fn new(title: &'a str, subtitle: &'a str, max_lines: usize) -> Self {
        Self {
            title,
            subtitle,
            max_lines,
            page: 1,
            page_count: 1,
        }
    }

    /// Set the page position (builder pattern).
    #[must_use]
    pub fn page(mut self, page: usize, page_count: usize) -> Self {
        self.page = page;
        self.page_count = page_count;
        self
    }

    /// `"page/count"`, present only for tours of two or more pages.
    #[must_use]
    pub fn page_label(&self) -> Option<String> {
        (self.page_count >= 2).then(|| format!("{}/{}", self.page, self.page_count))
    }
}

/// Where the content area ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBounds {
    /// Overlay width; the caption spans it minus the horizontal insets.
    pub width: f32,
    /// Lowest y the caption may reach.
    pub max_bottom: f32,
}

impl ContentBounds {
    pub const fn new(width: f32, max_bottom: f32) -> Self {
        Self { width, max_bottom }
    }
}

/// Which side of the rectangle the caption sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Stacked above the rectangle.
    Top,
    /// Stacked below the rectangle.
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    Subtitle,
    PageLabel,
}

/// A measured block of wrapped lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub lines: Vec<String>,
    pub line_height: f32,
}

impl TextBlock {
    /// Height of the block.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// A block positioned on the overlay. `origin` is the top-left of its
/// first line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub block: TextBlock,
    pub origin: PointF,
}

/// Result of the subtitle truncation loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleFit {
    /// `None` when the subtitle is empty or the cap reached zero.
    pub block: Option<TextBlock>,
    /// Lines in the block, zero when omitted. Never above the requested cap.
    pub cap: usize,
}

/// A fully placed caption.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptionLayout {
    pub anchor: TextAnchor,
    pub blocks: SmallVec<[PlacedBlock; 3]>,
    /// Subtitle cap after truncation and shrinking.
    pub subtitle_cap: usize,
    /// Top of the stack.
    pub origin_y: f32,
    /// Sum of `height + padding` over the blocks.
    pub extent: f32,
}

impl CaptionLayout {
    /// How far the far end of the stack lies below `rect.bottom`.
    ///
    /// For a caption below the rectangle this is `padding + extent`.
    #[must_use]
    pub fn total_offset_from_rect_bottom(&self, rect: RectF) -> f32 {
        self.origin_y + self.extent - rect.bottom
    }

    /// Whether the caption has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The placed block of the given kind, if any.
    #[must_use]
    pub fn block(&self, kind: BlockKind) -> Option<&PlacedBlock> {
        self.blocks.iter().find(|placed| placed.block.kind == kind)
    }
}

/// Unplaced blocks plus the subtitle cap they were built with.
#[derive(Debug, Clone)]
struct Stack {
    blocks: SmallVec<[TextBlock; 3]>,
    subtitle_cap: usize,
}

/// Lays captions out next to highlighted rectangles.
#[derive(Debug, Clone, Default)]
pub struct TextFitEngine {
    metrics: FitMetrics,
}

impl TextFitEngine {
    pub fn new(metrics: FitMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &FitMetrics {
        &self.metrics
    }

    /// Width left for text once both horizontal insets are removed.
    #[must_use]
    pub fn content_width(&self, overlay_width: f32) -> f32 {
        overlay_width - 2.0 * self.metrics.padding_left
    }

    /// Truncate a subtitle to at most `cap` lines of `columns` cells.
    ///
    /// Middle-ellipsizes to `columns * cap` cells and wraps; if word
    /// wrapping still needs more lines than the cap, the cap drops by one
    /// and the text is rebuilt. A cap of zero omits the subtitle. The
    /// returned cap is the number of lines the block holds.
    #[must_use]
    pub fn fit_subtitle(&self, subtitle: &str, columns: usize, cap: usize) -> SubtitleFit {
        if subtitle.is_empty() || columns == 0 {
            return SubtitleFit {
                block: None,
                cap: 0,
            };
        }

        let mut cap = cap;
        while cap > 0 {
            let text = ellipsize_middle(subtitle, columns.saturating_mul(cap), ELLIPSIS);
            let lines = wrap_text(&text, columns);
            if lines.len() <= cap {
                let cap = lines.len();
                return SubtitleFit {
                    block: Some(TextBlock {
                        kind: BlockKind::Subtitle,
                        lines,
                        line_height: self.metrics.subtitle.line_height,
                    }),
                    cap,
                };
            }
            cap -= 1;
        }
        SubtitleFit {
            block: None,
            cap: 0,
        }
    }

    /// Sum of `height + padding` over `blocks`.
    #[must_use]
    pub fn stack_extent(&self, blocks: &[TextBlock]) -> f32 {
        blocks
            .iter()
            .map(|block| block.height() + self.metrics.padding)
            .sum()
    }

    /// Whether `blocks` fit between `rect.bottom + padding` and `max_bottom`.
    #[must_use]
    pub fn fits_below(&self, rect: RectF, max_bottom: f32, blocks: &[TextBlock]) -> bool {
        rect.bottom + self.metrics.padding + self.stack_extent(blocks) <= max_bottom
    }

    /// Whether `blocks` fit between the overlay top and `rect.top - padding`.
    #[must_use]
    pub fn fits_above(&self, rect: RectF, blocks: &[TextBlock]) -> bool {
        rect.top - self.metrics.padding - self.stack_extent(blocks) >= 0.0
    }

    /// Stack the full-cap caption below `rect`, fitting or not.
    #[must_use]
    pub fn layout_below(
        &self,
        rect: RectF,
        bounds: ContentBounds,
        caption: &CaptionText<'_>,
    ) -> CaptionLayout {
        let stack = self.build(caption, bounds.width, caption.max_lines);
        self.stack(TextAnchor::Bottom, rect, stack)
    }

    /// Stack the full-cap caption above `rect`, fitting or not.
    #[must_use]
    pub fn layout_above(
        &self,
        rect: RectF,
        bounds: ContentBounds,
        caption: &CaptionText<'_>,
    ) -> CaptionLayout {
        let stack = self.build(caption, bounds.width, caption.max_lines);
        self.stack(TextAnchor::Top, rect, stack)
    }

    /// Choose a side for the caption and lay it out.
    ///
    /// Below if the full caption fits there, else above if it fits there.
    /// Otherwise the subtitle shrinks against whichever side has more room
    /// (below on a tie) until it fits or is gone, and that layout is used
    /// even if the title and label alone still overflow.
    #[must_use]
    pub fn place(
        &self,
        rect: RectF,
        bounds: ContentBounds,
        caption: &CaptionText<'_>,
    ) -> CaptionLayout {
        let full = self.build(caption, bounds.width, caption.max_lines);

        if self.fits_below(rect, bounds.max_bottom, &full.blocks) {
            spotlight_core::trace!(
                target: spotlight_core::logging::TARGET,
                page = caption.page,
                "caption placed below"
            );
            return self.stack(TextAnchor::Bottom, rect, full);
        }
        if self.fits_above(rect, &full.blocks) {
            spotlight_core::trace!(
                target: spotlight_core::logging::TARGET,
                page = caption.page,
                "caption placed above"
            );
            return self.stack(TextAnchor::Top, rect, full);
        }

        let room_below = bounds.max_bottom - rect.bottom - self.metrics.padding;
        let room_above = rect.top - self.metrics.padding;
        let anchor = if room_above > room_below {
            TextAnchor::Top
        } else {
            TextAnchor::Bottom
        };

        let mut stack = full;
        while stack.subtitle_cap > 0 && !self.fits(anchor, rect, bounds.max_bottom, &stack.blocks)
        {
            stack = self.build(caption, bounds.width, stack.subtitle_cap - 1);
        }

        spotlight_core::trace!(
            target: spotlight_core::logging::TARGET,
            page = caption.page,
            ?anchor,
            subtitle_cap = stack.subtitle_cap,
            "caption shrunk to fit"
        );
        self.stack(anchor, rect, stack)
    }

    fn fits(&self, anchor: TextAnchor, rect: RectF, max_bottom: f32, blocks: &[TextBlock]) -> bool {
        match anchor {
            TextAnchor::Top => self.fits_above(rect, blocks),
            TextAnchor::Bottom => self.fits_below(rect, max_bottom, blocks),
        }
    }

    fn build(&self, caption: &CaptionText<'_>, overlay_width: f32, cap: usize) -> Stack {
        let content_width = self.content_width(overlay_width);
        let mut blocks = SmallVec::new();

        let title_columns = self.metrics.title.columns(content_width);
        if !caption.title.is_empty() && title_columns > 0 {
            blocks.push(TextBlock {
                kind: BlockKind::Title,
                lines: wrap_text(caption.title, title_columns),
                line_height: self.metrics.title.line_height,
            });
        }

        let subtitle = self.fit_subtitle(
            caption.subtitle,
            self.metrics.subtitle.columns(content_width),
            cap,
        );
        if let Some(block) = subtitle.block {
            blocks.push(block);
        }

        if let Some(label) = caption.page_label() {
            blocks.push(TextBlock {
                kind: BlockKind::PageLabel,
                lines: vec![label],
                line_height: self.metrics.page_label.line_height,
            });
        }

        Stack {
            blocks,
            subtitle_cap: subtitle.cap,
        }
    }

    fn stack(&self, anchor: TextAnchor, rect: RectF, stack: Stack) -> CaptionLayout {
        let padding = self.metrics.padding;
        let extent = self.stack_extent(&stack.blocks);
        let origin_y = match anchor {
            TextAnchor::Bottom => rect.bottom + padding,
            TextAnchor::Top => rect.top - padding - extent,
        };

        let mut y = origin_y;
        let blocks = stack
            .blocks
            .into_iter()
            .map(|block| {
                let origin = PointF::new(self.metrics.padding_left, y);
                y += block.height() + padding;
                PlacedBlock { block, origin }
            })
            .collect();

        CaptionLayout {
            anchor,
            blocks,
            subtitle_cap: stack.subtitle_cap,
            origin_y,
            extent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10-unit cells, 20-unit lines, 10-unit padding everywhere.
    fn engine() -> TextFitEngine {
        let block = BlockMetrics::new(10.0, 20.0);
        TextFitEngine::new(FitMetrics {
            title: block,
            subtitle: block,
            page_label: block,
            padding: 10.0,
            padding_left: 10.0,
        })
    }

    // 220 wide minus 2 * 10 inset = 200 = 20 columns.
    const WIDTH: f32 = 220.0;

    #[test]
    fn columns_floor_and_degenerate() {
        let metrics = BlockMetrics::new(10.0, 20.0);
        assert_eq!(metrics.columns(200.0), 20);
        assert_eq!(metrics.columns(209.9), 20);
        assert_eq!(metrics.columns(-5.0), 0);
        assert_eq!(metrics.columns(f32::NAN), 0);
        assert_eq!(BlockMetrics::new(0.0, 20.0).columns(100.0), 0);
    }

    #[test]
    fn page_label_only_for_multi_page() {
        assert_eq!(CaptionText::new("a", "b", 1).page_label(), None);
        assert_eq!(
            CaptionText::new("a", "b", 1).page(2, 3).page_label(),
            Some("2/3".to_string())
        );
    }

    #[test]
    fn subtitle_middle_ellipsized_to_cap() {
        let fit = engine().fit_subtitle("abcdefghijklmnopqrstuvwxyz", 10, 2);
        assert_eq!(fit.cap, 2);
        let block = fit.block.expect("subtitle kept");
        assert_eq!(block.lines, vec!["abcdefghij", "…rstuvwxyz"]);
        assert_eq!(block.height(), 40.0);
    }

    #[test]
    fn subtitle_short_text_untouched() {
        let fit = engine().fit_subtitle("short", 10, 3);
        assert_eq!(fit.cap, 1);
        assert_eq!(fit.block.map(|b| b.lines), Some(vec!["short".to_string()]));
    }

    #[test]
    fn subtitle_cap_reports_lines_used() {
        let fit = engine().fit_subtitle("one two three four", 10, usize::MAX);
        assert_eq!(fit.block.map(|b| b.lines.len()), Some(2));
        assert_eq!(fit.cap, 2);
    }

    #[test]
    fn subtitle_cap_zero_or_empty_omits() {
        assert_eq!(engine().fit_subtitle("text", 10, 0).block, None);
        assert_eq!(engine().fit_subtitle("", 10, 3).block, None);
        assert_eq!(engine().fit_subtitle("text", 0, 3).block, None);
    }

    #[test]
    fn layout_below_stacks_from_rect_bottom() {
        let rect = RectF::new(20.0, 40.0, 200.0, 90.0);
        let caption = CaptionText::new("Search", "Find it", 2).page(1, 3);
        let layout = engine().layout_below(rect, ContentBounds::new(WIDTH, 800.0), &caption);

        assert_eq!(layout.anchor, TextAnchor::Bottom);
        let ys: Vec<f32> = layout.blocks.iter().map(|b| b.origin.y).collect();
        assert_eq!(ys, vec![100.0, 130.0, 160.0]);
        assert!(layout.blocks.iter().all(|b| b.origin.x == 10.0));
        assert_eq!(layout.extent, 90.0);
        assert_eq!(layout.total_offset_from_rect_bottom(rect), 100.0);
    }

    #[test]
    fn layout_above_ignores_overflow() {
        let rect = RectF::new(20.0, 40.0, 200.0, 90.0);
        let caption = CaptionText::new("Search", "Find it", 2).page(1, 3);
        let layout = engine().layout_above(rect, ContentBounds::new(WIDTH, 800.0), &caption);

        assert_eq!(layout.anchor, TextAnchor::Top);
        assert_eq!(layout.origin_y, -60.0);
        assert_eq!(layout.origin_y + layout.extent, rect.top - 10.0);
    }

    #[test]
    fn place_prefers_below() {
        let rect = RectF::new(20.0, 40.0, 200.0, 90.0);
        let caption = CaptionText::new("Search", "Find it", 2).page(1, 3);
        let layout = engine().place(rect, ContentBounds::new(WIDTH, 800.0), &caption);
        assert_eq!(layout.anchor, TextAnchor::Bottom);
        assert_eq!(layout.subtitle_cap, 1);
    }

    #[test]
    fn place_falls_back_above() {
        let rect = RectF::new(20.0, 600.0, 200.0, 700.0);
        let caption = CaptionText::new("Search", "Find it", 2).page(1, 3);
        let layout = engine().place(rect, ContentBounds::new(WIDTH, 720.0), &caption);

        assert_eq!(layout.anchor, TextAnchor::Top);
        // 600 - 10 - 3 * (20 + 10)
        assert_eq!(layout.origin_y, 500.0);
        let label = layout.block(BlockKind::PageLabel).expect("label placed");
        assert_eq!(label.block.lines, vec!["1/3"]);
        assert_eq!(label.origin.y, 560.0);
    }

    #[test]
    fn place_shrinks_subtitle_on_tie_below() {
        let rect = RectF::new(0.0, 100.0, 200.0, 200.0);
        let subtitle = "word ".repeat(40);
        let caption = CaptionText::new("T", &subtitle, 5);
        let engine = engine();
        let bounds = ContentBounds::new(WIDTH, 300.0);
        let layout = engine.place(rect, bounds, &caption);

        // 90 units of room each side: title 30 + subtitle (20k + 10) <= 90.
        assert_eq!(layout.anchor, TextAnchor::Bottom);
        assert!(layout.subtitle_cap <= 2);
        let sub = layout.block(BlockKind::Subtitle).expect("subtitle kept");
        assert!(sub.block.lines.len() <= layout.subtitle_cap);
        assert!(layout.origin_y + layout.extent <= bounds.max_bottom);
    }

    #[test]
    fn place_shrinks_toward_roomier_top() {
        let rect = RectF::new(0.0, 150.0, 200.0, 250.0);
        let subtitle = "word ".repeat(40);
        let caption = CaptionText::new("T", &subtitle, 5);
        let layout = engine().place(rect, ContentBounds::new(WIDTH, 300.0), &caption);
        assert_eq!(layout.anchor, TextAnchor::Top);
        assert!(layout.origin_y >= 0.0);
    }

    #[test]
    fn empty_texts_leave_label_alone() {
        let rect = RectF::new(20.0, 40.0, 200.0, 90.0);
        let caption = CaptionText::new("", "", 3).page(2, 2);
        let layout = engine().place(rect, ContentBounds::new(WIDTH, 800.0), &caption);
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].block.kind, BlockKind::PageLabel);
        assert_eq!(layout.blocks[0].origin.y, 100.0);
    }

    #[test]
    fn nothing_to_show_is_empty() {
        let rect = RectF::new(20.0, 40.0, 200.0, 90.0);
        let caption = CaptionText::new("", "", 3);
        let layout = engine().place(rect, ContentBounds::new(WIDTH, 800.0), &caption);
        assert!(layout.is_empty());
        assert_eq!(layout.extent, 0.0);
    }
}
