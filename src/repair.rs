//! Deduction of forced cells.
//!
//! Every parent/children triple with exactly one unknown cell (and a
//! non-negative result) determines that cell. Rules are applied over the whole
//! pyramid repeatedly until a full pass fills nothing. Each successful rule
//! removes one unknown cell, so the loop always terminates.

use log::{debug, trace};

use crate::pyramid::{Cell, Pyramid, Value};

/// Which cell of a triple a rule filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deduction {
    Top(Value),
    Left(Value),
    Right(Value),
}

/// Apply the first matching rule to a (top, left, right) triple.
fn deduce(top: Cell, left: Cell, right: Cell) -> Option<Deduction> {
    match (top, left, right) {
        (Some(top), Some(left), None) => top
            .checked_sub(left)
            .filter(|value| *value >= 0)
            .map(Deduction::Right),
        (Some(top), None, Some(right)) => top
            .checked_sub(right)
            .filter(|value| *value >= 0)
            .map(Deduction::Left),
        (None, Some(left), Some(right)) => left.checked_add(right).map(Deduction::Top),
        _ => None,
    }
}

/// Fill every deducible cell in place. Returns the number of cells filled.
pub fn repair(pyramid: &mut Pyramid) -> usize {
    let mut filled = 0;
    let mut passes = 0;

    loop {
        passes += 1;
        let mut changed = false;

        for layer in 0..pyramid.height().saturating_sub(1) {
            for index in 0..=layer {
                let (left, right) = pyramid.children(layer, index);
                let Some(deduction) = deduce(pyramid.get(layer, index), left, right) else {
                    continue;
                };

                trace!("repair ({}, {}): {:?}", layer, index, deduction);
                match deduction {
                    Deduction::Top(value) => pyramid.set(layer, index, value),
                    Deduction::Left(value) => pyramid.set(layer + 1, index, value),
                    Deduction::Right(value) => pyramid.set(layer + 1, index + 1, value),
                }
                filled += 1;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    debug!(
        "repair: filled {} cells in {} passes, {} unknown left",
        filled,
        passes,
        pyramid.unknown_count()
    );
    filled
}

/// Owned variant of [`repair`].
pub fn repaired(mut pyramid: Pyramid) -> Pyramid {
    repair(&mut pyramid);
    pyramid
}
