#![forbid(unsafe_code)]

//! Property tests for the page chain.

use std::rc::Rc;

use proptest::prelude::*;
use spotlight::{
    Advance, ChainViolation, HighlightTarget, HostElement, PointF, Retreat, SizeF, TargetSequence,
};

struct Fixed;

impl HostElement for Fixed {
    fn screen_position(&self) -> PointF {
        PointF::default()
    }

    fn size(&self) -> SizeF {
        SizeF::new(1.0, 1.0)
    }
}

fn linked(pages: usize) -> (Rc<dyn HostElement>, TargetSequence) {
    let host: Rc<dyn HostElement> = Rc::new(Fixed);
    let targets = (0..pages)
        .map(|i| HighlightTarget::new(Rc::downgrade(&host), format!("page {i}"), "", 1))
        .collect();
    let sequence = TargetSequence::link(targets).expect("non-empty");
    (host, sequence)
}

proptest! {
    #[test]
    fn linking_numbers_pages_in_order(pages in 1usize..24) {
        let (_host, sequence) = linked(pages);
        prop_assert_eq!(sequence.validate(), Ok(()));

        let indices: Vec<usize> = sequence.iter().map(|(_, t)| t.page_index()).collect();
        prop_assert_eq!(indices, (1..=pages).collect::<Vec<_>>());
        for (_, target) in sequence.iter() {
            prop_assert_eq!(target.page_count(), pages);
        }

        let (_, first) = sequence.iter().next().expect("head");
        prop_assert!(first.is_first());
        let (_, last) = sequence.iter().last().expect("tail");
        prop_assert!(last.is_last());
    }

    #[test]
    fn neighbors_are_symmetric(pages in 1usize..24) {
        let (_host, sequence) = linked(pages);
        for (id, target) in sequence.iter() {
            if let Some(next) = target.next() {
                prop_assert_eq!(sequence.get(next).and_then(|t| t.previous()), Some(id));
            }
            if let Some(previous) = target.previous() {
                prop_assert_eq!(sequence.get(previous).and_then(|t| t.next()), Some(id));
            }
        }
    }

    #[test]
    fn cursor_walk_stays_on_chain(
        pages in 1usize..12,
        steps in proptest::collection::vec(any::<bool>(), 0..64),
    ) {
        let (_host, mut sequence) = linked(pages);
        let mut expected = 1usize;
        for forward in steps {
            if forward {
                match sequence.advance() {
                    Advance::To(_) => expected += 1,
                    Advance::Terminal => prop_assert_eq!(expected, pages),
                }
            } else {
                match sequence.retreat() {
                    Retreat::To(_) => expected -= 1,
                    Retreat::Boundary => prop_assert_eq!(expected, 1),
                }
            }
            let current = sequence.current().expect("cursor on a target");
            prop_assert_eq!(current.page_index(), expected);
        }
    }

    #[test]
    fn back_link_to_earlier_page_is_a_violation(pages in 2usize..12, target in 0usize..12) {
        let (_host, mut sequence) = linked(pages);
        let ids: Vec<_> = sequence.iter().map(|(id, _)| id).collect();
        let tail = ids[pages - 1];
        let to = ids[target % pages];

        prop_assert!(sequence.set_next(tail, Some(to)));
        prop_assert!(sequence.validate().is_err());
        prop_assert!(sequence.iter().count() <= pages);
    }
}

#[test]
fn cycle_through_head_is_reported() {
    let (_host, mut sequence) = linked(3);
    let ids: Vec<_> = sequence.iter().map(|(id, _)| id).collect();
    assert!(sequence.set_next(ids[2], Some(ids[0])));
    assert_eq!(sequence.validate(), Err(ChainViolation::HeadHasPrevious));
}
