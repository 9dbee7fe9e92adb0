//! Search space pruning for the guess engine.
//!
//! Children are non-negative addends of their parent, so no cell can exceed
//! either of its parents. That gives a cheap infeasibility test for partially
//! filled pyramids and an upper bound for the values worth guessing.

use crate::pyramid::{Pyramid, Value};

/// Check that no known child is larger than its known parent.
///
/// Passing this check does not mean the pyramid is solvable, only that it
/// is not trivially contradictory.
pub fn is_feasible(pyramid: &Pyramid) -> bool {
    pyramid.parent_positions().all(|(layer, index)| {
        let Some(top) = pyramid.get(layer, index) else {
            return true;
        };
        let (left, right) = pyramid.children(layer, index);
        left.map_or(true, |value| value <= top) && right.map_or(true, |value| value <= top)
    })
}

/// Upper bound for the cell at `(layer, index)`.
///
/// A known cell is its own bound. An unknown cell is bounded by the smaller of
/// the bounds of its two parents; a side with no parent, or a chain that runs
/// into the unknown apex, falls back to `global_max`.
pub fn max_value(pyramid: &Pyramid, layer: usize, index: usize, global_max: Value) -> Value {
    if layer >= pyramid.height() {
        return global_max;
    }

    // Bounds are resolved top-down one row at a time, each row only
    // looking at the row above it.
    let mut bounds: Vec<Value> = Vec::with_capacity(layer + 1);
    for row in 0..=layer {
        let above = bounds;
        bounds = (0..=row)
            .map(|i| {
                if let Some(value) = pyramid.get(row, i) {
                    return value;
                }
                let left = if row > 0 && i > 0 { above[i - 1] } else { global_max };
                let right = if row > 0 && i < row { above[i] } else { global_max };
                left.min(right)
            })
            .collect();
    }

    bounds.get(index).copied().unwrap_or(global_max)
}
