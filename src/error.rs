//! Error types for pyramid construction.
//!
//! Solving itself never fails: once a [`Pyramid`](crate::Pyramid) exists it is
//! well-formed, so the only error is the one raised while building it.

use thiserror::Error;

/// The single error kind of the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PyramidError {
    #[error("invalid pyramid shape: {0}")]
    InvalidShape(#[from] ShapeViolation),
}

/// What exactly is wrong with a rejected pyramid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeViolation {
    #[error("pyramid must be a list of layers")]
    NotALayerList,

    #[error("layer {layer} must be a list of cells")]
    LayerNotAList { layer: usize },

    /// Layer `n` must hold exactly `n + 1` cells.
    #[error("layer {layer} has {found} cells, expected {expected}")]
    WrongCellCount {
        layer: usize,
        expected: usize,
        found: usize,
    },

    /// Cells are either `null` or an integral number.
    #[error("cell {index} of layer {layer} is not an integer: {value}")]
    NonNumericCell {
        layer: usize,
        index: usize,
        value: String,
    },
}
