#![forbid(unsafe_code)]

//! Tour pages and their navigation chain.
//!
//! Targets live in an arena owned by [`TargetSequence`] and point at their
//! neighbors by [`TargetId`]. The chain is a doubly linked list over the
//! arena: `next == None` marks the last page, `previous == None` the first.
//!
//! # Invariants
//!
//! 1. `page_index` runs 1..=N along `next` and `page_count == N` everywhere.
//! 2. `a.next == Some(b)` iff `b.previous == Some(a)`.
//! 3. The chain from the head is acyclic and visits every target once.
//!
//! [`TargetSequence::link`] establishes all three; [`TargetSequence::validate`]
//! checks them after manual rewiring with [`TargetSequence::set_next`].

use std::fmt;
use std::rc::Weak;

use spotlight_core::geometry::RectF;
use spotlight_text::{CaptionLayout, CaptionText, TextAnchor};

use crate::error::{Result, SpotlightError};
use crate::resolver::HostElement;

/// Index of a target in its sequence's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    /// Position in the arena (page index minus one after linking).
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One page of the tour.
#[derive(Debug, Clone)]
pub struct HighlightTarget {
    /// Live rectangle, animated in place by the sequencer.
    pub bounds: RectF,
    /// Home rectangle from the last layout pass.
    pub resolved: RectF,
    pub title: String,
    pub subtitle: String,
    pub max_subtitle_lines: usize,
    /// Side of the hole the caption was placed on.
    pub text_anchor: TextAnchor,
    /// Placed caption from the last layout pass.
    pub caption: CaptionLayout,
    /// Caption opacity in [0, 1].
    pub caption_opacity: f32,
    /// Whether the caption is shown at all.
    pub caption_visible: bool,
    anchor: Weak<dyn HostElement>,
    page_index: usize,
    page_count: usize,
    previous: Option<TargetId>,
    next: Option<TargetId>,
}

impl HighlightTarget {
    /// Unlinked target with zero bounds.
    pub fn new(
        anchor: Weak<dyn HostElement>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        max_subtitle_lines: usize,
    ) -> Self {
        Self {
            bounds: RectF::ZERO,
            resolved: RectF::ZERO,
            title: title.into(),
            subtitle: subtitle.into(),
            max_subtitle_lines,
            text_anchor: TextAnchor::default(),
            caption: CaptionLayout::default(),
            caption_opacity: 0.0,
            caption_visible: false,
            anchor,
            page_index: 0,
            page_count: 0,
            previous: None,
            next: None,
        }
    }

    /// 1-based page number (0 before linking).
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn previous(&self) -> Option<TargetId> {
        self.previous
    }

    pub fn next(&self) -> Option<TargetId> {
        self.next
    }

    pub fn is_first(&self) -> bool {
        self.previous.is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }

    /// The host element this page highlights.
    pub fn anchor(&self) -> &Weak<dyn HostElement> {
        &self.anchor
    }

    /// Caption input for the fit engine.
    pub fn caption_text(&self) -> CaptionText<'_> {
        CaptionText::new(&self.title, &self.subtitle, self.max_subtitle_lines)
            .page(self.page_index, self.page_count)
    }

    /// Hide the caption and zero its opacity.
    pub fn reset_caption(&mut self) {
        self.caption_opacity = 0.0;
        self.caption_visible = false;
    }

    /// Put the live rectangle back on the home rectangle.
    pub fn restore_bounds(&mut self) {
        self.bounds = self.resolved;
    }
}

/// Outcome of stepping forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    To(TargetId),
    /// Already on the last page.
    Terminal,
}

/// Outcome of stepping backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    To(TargetId),
    /// Already on the first page.
    Boundary,
}

/// A broken chain found by [`TargetSequence::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainViolation {
    /// The head has a `previous` link.
    HeadHasPrevious,
    /// The chain revisits `at`.
    Cycle { at: TargetId },
    /// `from.next == to` but `to.previous != from`.
    Asymmetric { from: TargetId, to: TargetId },
    /// Page indices do not increase from `from` to `to`.
    PageOrder { from: TargetId, to: TargetId },
    /// `at` disagrees with the head's page count.
    PageCount { at: TargetId },
    /// Targets not reachable from the head.
    Unreachable { count: usize },
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeadHasPrevious => write!(f, "first page has a previous link"),
            Self::Cycle { at } => write!(f, "chain revisits target {}", at.index()),
            Self::Asymmetric { from, to } => write!(
                f,
                "target {} links to {} without a matching back link",
                from.index(),
                to.index()
            ),
            Self::PageOrder { from, to } => write!(
                f,
                "page index does not increase from target {} to {}",
                from.index(),
                to.index()
            ),
            Self::PageCount { at } => write!(f, "target {} has a stray page count", at.index()),
            Self::Unreachable { count } => write!(f, "{count} targets unreachable from the head"),
        }
    }
}

impl std::error::Error for ChainViolation {}

/// The ordered pages of a tour plus a cursor.
#[derive(Debug, Clone)]
pub struct TargetSequence {
    targets: Vec<HighlightTarget>,
    head: TargetId,
    cursor: TargetId,
}

impl TargetSequence {
    /// Link `targets` in order: pages 1..=N, neighbors wired both ways,
    /// cursor on the first page.
    pub fn link(mut targets: Vec<HighlightTarget>) -> Result<Self> {
        if targets.is_empty() {
            return Err(SpotlightError::EmptySequence);
        }
        let count = targets.len();
        for (index, target) in targets.iter_mut().enumerate() {
            target.page_index = index + 1;
            target.page_count = count;
            target.previous = index.checked_sub(1).map(TargetId);
            target.next = (index + 1 < count).then_some(TargetId(index + 1));
        }
        Ok(Self {
            targets,
            head: TargetId(0),
            cursor: TargetId(0),
        })
    }

    /// First page.
    pub fn head(&self) -> TargetId {
        self.head
    }

    pub fn current_id(&self) -> TargetId {
        self.cursor
    }

    pub fn current(&self) -> Option<&HighlightTarget> {
        self.get(self.cursor)
    }

    /// Move the cursor to `id`. Returns false for an unknown id.
    pub fn seek(&mut self, id: TargetId) -> bool {
        if self.get(id).is_some() {
            self.cursor = id;
            true
        } else {
            false
        }
    }

    /// Step the cursor forward.
    pub fn advance(&mut self) -> Advance {
        let step = self.advance_from(self.cursor);
        if let Advance::To(id) = step {
            self.cursor = id;
        }
        step
    }

    /// Step the cursor backward.
    pub fn retreat(&mut self) -> Retreat {
        let step = self.retreat_from(self.cursor);
        if let Retreat::To(id) = step {
            self.cursor = id;
        }
        step
    }

    /// The page after `id`, without moving the cursor.
    pub fn advance_from(&self, id: TargetId) -> Advance {
        match self.get(id).and_then(HighlightTarget::next) {
            Some(next) => Advance::To(next),
            None => Advance::Terminal,
        }
    }

    /// The page before `id`, without moving the cursor.
    pub fn retreat_from(&self, id: TargetId) -> Retreat {
        match self.get(id).and_then(HighlightTarget::previous) {
            Some(previous) => Retreat::To(previous),
            None => Retreat::Boundary,
        }
    }

    /// Point `id` at `next` and `next` back at `id`.
    ///
    /// Links the two displaced neighbors had are cleared. Returns false if
    /// either id is unknown; nothing changes in that case.
    pub fn set_next(&mut self, id: TargetId, next: Option<TargetId>) -> bool {
        if self.get(id).is_none() || next.is_some_and(|n| self.get(n).is_none()) {
            return false;
        }

        if let Some(old) = self.targets[id.0].next.take()
            && self.targets[old.0].previous == Some(id)
        {
            self.targets[old.0].previous = None;
        }
        if let Some(new) = next {
            if let Some(old_previous) = self.targets[new.0].previous
                && self.targets[old_previous.0].next == Some(new)
            {
                self.targets[old_previous.0].next = None;
            }
            self.targets[new.0].previous = Some(id);
        }
        self.targets[id.0].next = next;
        true
    }

    pub fn get(&self, id: TargetId) -> Option<&HighlightTarget> {
        self.targets.get(id.0)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut HighlightTarget> {
        self.targets.get_mut(id.0)
    }

    /// Targets in chain order, following `next` from the head.
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &HighlightTarget)> {
        let mut cursor = Some(self.head);
        let mut remaining = self.targets.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let id = cursor?;
            let target = self.get(id)?;
            cursor = target.next;
            Some((id, target))
        })
    }

    /// Every target in arena order.
    pub(crate) fn targets_mut(&mut self) -> impl Iterator<Item = &mut HighlightTarget> {
        self.targets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Check the chain invariants.
    pub fn validate(&self) -> std::result::Result<(), ChainViolation> {
        let Some(head) = self.get(self.head) else {
            return Ok(());
        };
        if head.previous.is_some() {
            return Err(ChainViolation::HeadHasPrevious);
        }

        let mut seen = vec![false; self.targets.len()];
        let mut visited = 0;
        let mut at = self.head;
        loop {
            if std::mem::replace(&mut seen[at.0], true) {
                return Err(ChainViolation::Cycle { at });
            }
            visited += 1;
            let target = &self.targets[at.0];
            if target.page_count != head.page_count {
                return Err(ChainViolation::PageCount { at });
            }
            let Some(next) = target.next else {
                break;
            };
            let Some(following) = self.get(next) else {
                return Err(ChainViolation::Asymmetric { from: at, to: next });
            };
            if following.previous != Some(at) {
                return Err(ChainViolation::Asymmetric { from: at, to: next });
            }
            if following.page_index <= target.page_index {
                return Err(ChainViolation::PageOrder { from: at, to: next });
            }
            at = next;
        }

        if visited < self.targets.len() {
            return Err(ChainViolation::Unreachable {
                count: self.targets.len() - visited,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlight_core::geometry::{PointF, SizeF};
    use std::rc::Rc;

    struct Fixed;

    impl HostElement for Fixed {
        fn screen_position(&self) -> PointF {
            PointF::new(0.0, 0.0)
        }

        fn size(&self) -> SizeF {
            SizeF::new(10.0, 10.0)
        }
    }

    fn make_targets(n: usize) -> (Rc<dyn HostElement>, Vec<HighlightTarget>) {
        let host: Rc<dyn HostElement> = Rc::new(Fixed);
        let targets = (0..n)
            .map(|i| HighlightTarget::new(Rc::downgrade(&host), format!("t{i}"), "", 2))
            .collect();
        (host, targets)
    }

    fn ids(seq: &TargetSequence) -> Vec<usize> {
        seq.iter().map(|(id, _)| id.index()).collect()
    }

    #[test]
    fn link_rejects_empty() {
        assert_eq!(
            TargetSequence::link(Vec::new()).map(|s| s.len()),
            Err(SpotlightError::EmptySequence)
        );
    }

    #[test]
    fn link_numbers_pages_and_wires_neighbors() {
        let (_host, targets) = make_targets(3);
        let seq = TargetSequence::link(targets).expect("linked");
        let pages: Vec<(usize, usize)> = seq
            .iter()
            .map(|(_, t)| (t.page_index(), t.page_count()))
            .collect();
        assert_eq!(pages, vec![(1, 3), (2, 3), (3, 3)]);
        assert!(seq.get(TargetId(0)).is_some_and(HighlightTarget::is_first));
        assert!(seq.get(TargetId(2)).is_some_and(HighlightTarget::is_last));
        assert_eq!(seq.validate(), Ok(()));
    }

    #[test]
    fn cursor_navigation() {
        let (_host, targets) = make_targets(2);
        let mut seq = TargetSequence::link(targets).expect("linked");
        assert_eq!(seq.retreat(), Retreat::Boundary);
        assert_eq!(seq.advance(), Advance::To(TargetId(1)));
        assert_eq!(seq.current_id(), TargetId(1));
        assert_eq!(seq.advance(), Advance::Terminal);
        assert_eq!(seq.current_id(), TargetId(1));
        assert_eq!(seq.retreat(), Retreat::To(TargetId(0)));
    }

    #[test]
    fn peeks_do_not_move_cursor() {
        let (_host, targets) = make_targets(3);
        let seq = TargetSequence::link(targets).expect("linked");
        assert_eq!(seq.advance_from(TargetId(1)), Advance::To(TargetId(2)));
        assert_eq!(seq.retreat_from(TargetId(1)), Retreat::To(TargetId(0)));
        assert_eq!(seq.advance_from(TargetId(9)), Advance::Terminal);
        assert_eq!(seq.current_id(), TargetId(0));
    }

    #[test]
    fn single_page_is_first_and_last() {
        let (_host, targets) = make_targets(1);
        let seq = TargetSequence::link(targets).expect("linked");
        let only = seq.current().expect("current");
        assert!(only.is_first() && only.is_last());
        assert_eq!(only.caption_text().page_label(), None);
    }

    #[test]
    fn set_next_is_symmetric() {
        let (_host, targets) = make_targets(3);
        let mut seq = TargetSequence::link(targets).expect("linked");

        // 0 -> 2 directly: 1 loses both links and becomes unreachable.
        assert!(seq.set_next(TargetId(0), Some(TargetId(2))));
        assert_eq!(
            seq.get(TargetId(2)).and_then(|t| t.previous()),
            Some(TargetId(0))
        );
        assert_eq!(seq.get(TargetId(1)).and_then(|t| t.previous()), None);
        assert_eq!(seq.get(TargetId(1)).and_then(|t| t.next()), None);
        assert_eq!(ids(&seq), vec![0, 2]);
        assert_eq!(seq.validate(), Err(ChainViolation::Unreachable { count: 1 }));
    }

    #[test]
    fn set_next_rejects_unknown_ids() {
        let (_host, targets) = make_targets(2);
        let mut seq = TargetSequence::link(targets).expect("linked");
        assert!(!seq.set_next(TargetId(0), Some(TargetId(7))));
        assert!(!seq.set_next(TargetId(7), None));
        assert_eq!(seq.validate(), Ok(()));
    }

    #[test]
    fn validate_detects_cycle_and_order() {
        let (_host, targets) = make_targets(3);
        let mut seq = TargetSequence::link(targets).expect("linked");
        seq.set_next(TargetId(2), Some(TargetId(1)));
        // 2 -> 1 also cut 0 -> 1, so the chain ends at 0.
        assert_eq!(seq.validate(), Err(ChainViolation::Unreachable { count: 2 }));

        let (_host, targets) = make_targets(2);
        let mut seq = TargetSequence::link(targets).expect("linked");
        seq.set_next(TargetId(1), Some(TargetId(0)));
        assert_eq!(seq.validate(), Err(ChainViolation::HeadHasPrevious));
    }

    #[test]
    fn iter_terminates_on_cycles() {
        let (_host, targets) = make_targets(2);
        let mut seq = TargetSequence::link(targets).expect("linked");
        seq.targets[1].next = Some(TargetId(0));
        assert_eq!(ids(&seq), vec![0, 1]);
        assert_eq!(
            seq.validate(),
            Err(ChainViolation::Asymmetric {
                from: TargetId(1),
                to: TargetId(0)
            })
        );
    }

    #[test]
    fn restore_bounds_returns_home() {
        let (_host, targets) = make_targets(1);
        let mut seq = TargetSequence::link(targets).expect("linked");
        let target = seq.get_mut(TargetId(0)).expect("target");
        target.resolved = RectF::new(1.0, 2.0, 3.0, 4.0);
        target.bounds = RectF::new(9.0, 9.0, 9.0, 9.0);
        target.restore_bounds();
        assert_eq!(target.bounds, target.resolved);
    }
}
