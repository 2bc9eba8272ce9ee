#![forbid(unsafe_code)]

//! Host element geometry to overlay-local highlight rectangles.
//!
//! Targets hold only a [`Weak`] reference to their host element. Resolution
//! upgrades it on every layout pass; a dropped or detached element is a
//! checked [`SpotlightError::UnresolvableTarget`], never a panic.

use std::rc::Weak;

use spotlight_core::geometry::{PointF, RectF, SizeF};

use crate::error::{Result, SpotlightError};
use crate::target::TargetSequence;

/// A measurable element on the host surface.
pub trait HostElement {
    /// Top-left corner in screen coordinates.
    fn screen_position(&self) -> PointF;

    /// Laid-out size.
    fn size(&self) -> SizeF;

    /// Whether the element is still part of the host's layout.
    fn is_attached(&self) -> bool {
        true
    }
}

/// The overlay's own placement on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayFrame {
    pub position: PointF,
    pub size: SizeF,
}

impl OverlayFrame {
    pub const fn new(position: PointF, size: SizeF) -> Self {
        Self { position, size }
    }

    /// Overlay bounds in overlay-local coordinates: `(0, 0, width, height)`.
    #[must_use]
    pub fn local_bounds(&self) -> RectF {
        RectF::from_size(self.size)
    }
}

/// Convert a target's screen geometry into an overlay-local rectangle,
/// padded on every side.
#[must_use]
pub fn resolve_rect(
    target_position: PointF,
    target_size: SizeF,
    overlay_position: PointF,
    padding: f32,
) -> RectF {
    let origin = PointF::new(
        target_position.x - overlay_position.x,
        target_position.y - overlay_position.y,
    );
    RectF::from_origin_size(origin, target_size).outset(padding)
}

/// Resolves host anchors against the overlay frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryResolver {
    padding: f32,
}

impl GeometryResolver {
    pub fn new(padding: f32) -> Self {
        Self { padding }
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Resolve one anchor for `page`.
    pub fn resolve(
        &self,
        anchor: &Weak<dyn HostElement>,
        frame: &OverlayFrame,
        page: usize,
    ) -> Result<RectF> {
        let element = anchor
            .upgrade()
            .filter(|element| element.is_attached())
            .ok_or(SpotlightError::UnresolvableTarget { page })?;

        let rect = resolve_rect(
            element.screen_position(),
            element.size(),
            frame.position,
            self.padding,
        );
        if rect.is_finite() {
            Ok(rect)
        } else {
            Err(SpotlightError::UnresolvableTarget { page })
        }
    }

    /// Refresh every target's home rectangle.
    ///
    /// Resolved targets get both `resolved` and `bounds` set. Unresolvable
    /// ones keep their stale (or zero) rectangles; their pages are returned.
    pub fn resolve_sequence(
        &self,
        sequence: &mut TargetSequence,
        frame: &OverlayFrame,
    ) -> Vec<usize> {
        let mut unresolved = Vec::new();
        for target in sequence.targets_mut() {
            let page = target.page_index();
            match self.resolve(target.anchor(), frame, page) {
                Ok(rect) => {
                    target.resolved = rect;
                    target.bounds = rect;
                }
                Err(err) => {
                    tracing::warn!(target: spotlight_core::logging::TARGET, page, "{err}");
                    unresolved.push(page);
                }
            }
        }
        unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Element {
        position: PointF,
        size: SizeF,
        attached: Cell<bool>,
    }

    impl HostElement for Element {
        fn screen_position(&self) -> PointF {
            self.position
        }

        fn size(&self) -> SizeF {
            self.size
        }

        fn is_attached(&self) -> bool {
            self.attached.get()
        }
    }

    fn element(x: f32, y: f32, w: f32, h: f32) -> Rc<Element> {
        Rc::new(Element {
            position: PointF::new(x, y),
            size: SizeF::new(w, h),
            attached: Cell::new(true),
        })
    }

    fn weak(element: &Rc<Element>) -> Weak<dyn HostElement> {
        let strong: Rc<dyn HostElement> = element.clone();
        Rc::downgrade(&strong)
    }

    #[test]
    fn resolve_rect_pads_every_edge() {
        let rect = resolve_rect(
            PointF::new(100.0, 200.0),
            SizeF::new(50.0, 60.0),
            PointF::new(10.0, 10.0),
            5.0,
        );
        assert_eq!(rect, RectF::new(85.0, 185.0, 145.0, 255.0));
    }

    #[test]
    fn resolve_live_element() {
        let el = element(100.0, 200.0, 50.0, 60.0);
        let frame = OverlayFrame::new(PointF::new(10.0, 10.0), SizeF::new(400.0, 800.0));
        let rect = GeometryResolver::new(5.0).resolve(&weak(&el), &frame, 1);
        assert_eq!(rect, Ok(RectF::new(85.0, 185.0, 145.0, 255.0)));
    }

    #[test]
    fn dropped_element_is_unresolvable() {
        let el = element(0.0, 0.0, 10.0, 10.0);
        let anchor = weak(&el);
        drop(el);
        let result = GeometryResolver::new(5.0).resolve(&anchor, &OverlayFrame::default(), 2);
        assert_eq!(result, Err(SpotlightError::UnresolvableTarget { page: 2 }));
    }

    #[test]
    fn detached_element_is_unresolvable() {
        let el = element(0.0, 0.0, 10.0, 10.0);
        el.attached.set(false);
        let result = GeometryResolver::new(5.0).resolve(&weak(&el), &OverlayFrame::default(), 4);
        assert_eq!(result, Err(SpotlightError::UnresolvableTarget { page: 4 }));
    }

    #[test]
    fn non_finite_geometry_is_unresolvable() {
        let el = element(f32::NAN, 0.0, 10.0, 10.0);
        let result = GeometryResolver::new(5.0).resolve(&weak(&el), &OverlayFrame::default(), 1);
        assert!(result.is_err());
    }

    #[test]
    fn local_bounds_start_at_origin() {
        let frame = OverlayFrame::new(PointF::new(30.0, 40.0), SizeF::new(300.0, 500.0));
        assert_eq!(frame.local_bounds(), RectF::new(0.0, 0.0, 300.0, 500.0));
    }
}
