//! Pyramid representation and the JSON format it is read from.
//!
//! A pyramid is a list of layers, apex first. Layer `n` holds exactly `n + 1`
//! cells and every cell is either known or unknown. In a solved pyramid each
//! cell equals the sum of the two cells directly below it.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{PyramidError, ShapeViolation};

/// Numeric value held by a known cell.
pub type Value = i64;

/// A cell is `Some(value)` when known, `None` when still unknown.
pub type Cell = Option<Value>;

/// One row of the pyramid, stored inline up to eight cells.
pub type Layer = SmallVec<[Cell; 8]>;

/// A well-formed pyramid.
///
/// The only ways to build one from caller data are [`Pyramid::new`] and
/// [`Pyramid::from_json`], both of which reject malformed shapes, so every
/// `Pyramid` in circulation satisfies the layer-width invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "Vec<Vec<Cell>>")]
pub struct Pyramid {
    layers: Vec<Layer>,
}

impl Pyramid {
    /// Build a pyramid from plain rows, checking that layer `n` has `n + 1` cells.
    pub fn new(layers: Vec<Vec<Cell>>) -> Result<Self, PyramidError> {
        for (layer, cells) in layers.iter().enumerate() {
            check_width(layer, cells.len())?;
        }
        Ok(Self {
            layers: layers.into_iter().map(Layer::from_vec).collect(),
        })
    }

    /// A pyramid of the given height with every cell unknown.
    pub fn unknown(height: usize) -> Self {
        Self {
            layers: (0..height)
                .map(|layer| SmallVec::from_elem(None, layer + 1))
                .collect(),
        }
    }

    /// Parse a pyramid from JSON: an array of arrays whose entries are `null`
    /// (unknown) or integral numbers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PyramidError> {
        let rows = value.as_array().ok_or(ShapeViolation::NotALayerList)?;

        let mut layers = Vec::with_capacity(rows.len());
        for (layer, row) in rows.iter().enumerate() {
            let cells = row
                .as_array()
                .ok_or(ShapeViolation::LayerNotAList { layer })?;
            check_width(layer, cells.len())?;

            let parsed = cells
                .iter()
                .enumerate()
                .map(|(index, cell)| parse_cell(layer, index, cell))
                .collect::<Result<Layer, _>>()?;
            layers.push(parsed);
        }

        Ok(Self { layers })
    }

    /// Number of layers.
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get the cell at a position (bounds-checked, out of range reads as unknown)
    pub fn get(&self, layer: usize, index: usize) -> Cell {
        self.layers
            .get(layer)
            .and_then(|row| row.get(index))
            .copied()
            .flatten()
    }

    /// Set the cell at a position. Out-of-range positions are ignored.
    pub fn set(&mut self, layer: usize, index: usize, value: Value) {
        if let Some(cell) = self
            .layers
            .get_mut(layer)
            .and_then(|row| row.get_mut(index))
        {
            *cell = Some(value);
        }
    }

    /// Clone with a value written at a specific position
    pub fn with_value(&self, layer: usize, index: usize, value: Value) -> Self {
        let mut pyramid = self.clone();
        pyramid.set(layer, index, value);
        pyramid
    }

    pub fn layer(&self, layer: usize) -> &[Cell] {
        self.layers
            .get(layer)
            .map(|row| row.as_slice())
            .unwrap_or(&[])
    }

    pub fn layers(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.layers.iter().map(|row| row.as_slice())
    }

    /// Count cells that are still unknown
    pub fn unknown_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_none())
            .count()
    }

    /// Every cell is known, regardless of whether the sums hold.
    pub fn is_complete(&self) -> bool {
        self.unknown_count() == 0
    }

    /// Every cell is known and every parent equals the sum of its children.
    pub fn is_solved(&self) -> bool {
        self.is_complete()
            && self.parent_positions().all(|(layer, index)| {
                let (left, right) = self.children(layer, index);
                match (self.get(layer, index), left, right) {
                    (Some(top), Some(left), Some(right)) => left.checked_add(right) == Some(top),
                    _ => false,
                }
            })
    }

    /// Positions of all cells that have a row beneath them.
    pub(crate) fn parent_positions(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.height().saturating_sub(1))
            .flat_map(|layer| (0..=layer).map(move |index| (layer, index)))
    }

    /// The (left, right) children of a cell.
    pub(crate) fn children(&self, layer: usize, index: usize) -> (Cell, Cell) {
        (self.get(layer + 1, index), self.get(layer + 1, index + 1))
    }

    /// Render the pyramid roughly in its triangular shape, apex first.
    ///
    /// Cells of a layer are joined with `", "`, unknown cells show as `?`, and
    /// each line is left-padded to sit centered under the widest line.
    pub fn pretty(&self) -> String {
        let lines: Vec<String> = self
            .layers
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or_else(|| "?".to_string(), |value| value.to_string()))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();

        let widest = lines.iter().map(String::len).max().unwrap_or(0);

        lines
            .iter()
            .map(|line| format!("{}{}", " ".repeat((widest - line.len()) / 2), line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Pyramid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl TryFrom<serde_json::Value> for Pyramid {
    type Error = PyramidError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<Pyramid> for Vec<Vec<Cell>> {
    fn from(pyramid: Pyramid) -> Self {
        pyramid.layers.into_iter().map(SmallVec::into_vec).collect()
    }
}

fn check_width(layer: usize, found: usize) -> Result<(), ShapeViolation> {
    let expected = layer + 1;
    if found == expected {
        Ok(())
    } else {
        Err(ShapeViolation::WrongCellCount {
            layer,
            expected,
            found,
        })
    }
}

fn parse_cell(layer: usize, index: usize, cell: &serde_json::Value) -> Result<Cell, ShapeViolation> {
    let non_numeric = || ShapeViolation::NonNumericCell {
        layer,
        index,
        value: cell.to_string(),
    };

    match cell {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                return Ok(Some(value));
            }
            // Integral floats such as `3.0` are accepted, anything fractional
            // or outside the i64 range is not.
            match number.as_f64() {
                Some(float)
                    if float.fract() == 0.0
                        && float >= i64::MIN as f64
                        && float < i64::MAX as f64 =>
                {
                    Ok(Some(float as Value))
                }
                _ => Err(non_numeric()),
            }
        }
        _ => Err(non_numeric()),
    }
}

/// A puzzle file: a pyramid with an optional title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyramidPuzzle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub layers: Pyramid,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_log::test;

    use super::*;

    #[test]
    fn test_new_accepts_triangular_rows() {
        let pyramid = Pyramid::new(vec![vec![Some(3)], vec![Some(1), None]]).unwrap();
        assert_eq!(pyramid.height(), 2);
        assert_eq!(pyramid.get(0, 0), Some(3));
        assert_eq!(pyramid.get(1, 1), None);
        assert_eq!(pyramid.unknown_count(), 1);
    }

    #[test]
    fn test_new_rejects_wrong_cell_count() {
        let err = Pyramid::new(vec![vec![None], vec![None, None, None]]).unwrap_err();
        assert_eq!(
            err,
            PyramidError::InvalidShape(ShapeViolation::WrongCellCount {
                layer: 1,
                expected: 2,
                found: 3,
            })
        );

        // Too few cells is just as wrong
        assert!(Pyramid::new(vec![vec![None], vec![None]]).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_numeric_cells() {
        let err = Pyramid::from_json(&json!([[null], [1, "two"]])).unwrap_err();
        assert!(matches!(
            err,
            PyramidError::InvalidShape(ShapeViolation::NonNumericCell { layer: 1, index: 1, .. })
        ));

        assert!(Pyramid::from_json(&json!([[true]])).is_err());
        assert!(Pyramid::from_json(&json!([[1.5]])).is_err());
        assert!(Pyramid::from_json(&json!([[[1]]])).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_lists() {
        assert_eq!(
            Pyramid::from_json(&json!({"layers": []})).unwrap_err(),
            PyramidError::InvalidShape(ShapeViolation::NotALayerList)
        );
        assert_eq!(
            Pyramid::from_json(&json!([[1], 5])).unwrap_err(),
            PyramidError::InvalidShape(ShapeViolation::LayerNotAList { layer: 1 })
        );
    }

    #[test]
    fn test_from_json_accepts_integral_floats() {
        let pyramid = Pyramid::from_json(&json!([[3.0], [1, null]])).unwrap();
        assert_eq!(pyramid.get(0, 0), Some(3));
        assert_eq!(pyramid.get(1, 0), Some(1));
        assert_eq!(pyramid.get(1, 1), None);
    }

    #[test]
    fn test_serde_uses_nested_arrays() {
        let pyramid: Pyramid = serde_json::from_str("[[3],[1,null]]").unwrap();
        assert_eq!(serde_json::to_string(&pyramid).unwrap(), "[[3],[1,null]]");

        let err = serde_json::from_str::<Pyramid>("[[3],[1]]").unwrap_err();
        assert!(err.to_string().contains("layer 1 has 1 cells, expected 2"));
    }

    #[test]
    fn test_puzzle_file_with_title() {
        let puzzle: PyramidPuzzle =
            serde_json::from_str(r#"{"title": "tiny", "layers": [[null], [1, 2]]}"#).unwrap();
        assert_eq!(puzzle.title.as_deref(), Some("tiny"));
        assert_eq!(puzzle.layers.height(), 2);

        let untitled: PyramidPuzzle = serde_json::from_str(r#"{"layers": [[4]]}"#).unwrap();
        assert!(untitled.title.is_none());
    }

    #[test]
    fn test_is_solved() {
        let solved = Pyramid::new(vec![vec![Some(3)], vec![Some(1), Some(2)]]).unwrap();
        assert!(solved.is_solved());

        let wrong_sum = Pyramid::new(vec![vec![Some(4)], vec![Some(1), Some(2)]]).unwrap();
        assert!(wrong_sum.is_complete());
        assert!(!wrong_sum.is_solved());

        let partial = Pyramid::new(vec![vec![Some(3)], vec![Some(1), None]]).unwrap();
        assert!(!partial.is_solved());

        assert!(Pyramid::new(vec![vec![Some(7)]]).unwrap().is_solved());
        assert!(!Pyramid::unknown(1).is_solved());
    }

    #[test]
    fn test_set_and_with_value() {
        let mut pyramid = Pyramid::unknown(3);
        pyramid.set(2, 1, 5);
        pyramid.set(7, 0, 1); // ignored
        assert_eq!(pyramid.get(2, 1), Some(5));
        assert_eq!(pyramid.unknown_count(), 5);

        let copy = pyramid.with_value(0, 0, 9);
        assert_eq!(copy.get(0, 0), Some(9));
        assert_eq!(pyramid.get(0, 0), None);
    }

    #[test]
    fn test_pretty_centers_layers() {
        let pyramid = Pyramid::new(vec![
            vec![Some(10)],
            vec![Some(4), Some(6)],
            vec![Some(1), Some(3), None],
        ])
        .unwrap();

        assert_eq!(pyramid.pretty(), "  10\n 4, 6\n1, 3, ?");
        assert_eq!(pyramid.to_string(), pyramid.pretty());
        assert_eq!(Pyramid::unknown(0).pretty(), "");
    }
}
