use std::io;

use thiserror::Error;

/// Errors raised while decoding a frame from the text export.
#[derive(Debug, Error)]
pub enum ParseError {                                       // Everything that can go wrong between the raw bytes and a Frame
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),                                  // Input file could not be read

    #[error("unexpected end of input while reading {context} (byte offset {offset})")]
    UnexpectedEnd { context: &'static str, offset: usize }, // Header promised more lines than the buffer holds

    #[error("missing zone attribute `{0}`")]
    MissingZoneAttribute(&'static str),                     // N, E or VARLOCATION absent from the ZONE line

    #[error("malformed zone header: {0}")]
    MalformedZoneHeader(String),                            // ZONE line present but a value could not be decoded

    #[error("invalid variable range: {0}")]
    VariableRange(String),                                  // VARLOCATION range inconsistent with the variable list

    #[error("invalid number `{token}` at byte offset {offset}")]
    NumericParse { token: String, offset: usize },          // A data token is not a decimal number (strict policy)

    #[error("invalid connectivity: {0}")]
    Connectivity(String),                                   // Connectivity line with the wrong shape or a non-integer

    #[error(transparent)]
    Geometry(#[from] GeometryError),                        // Cell geometry could not produce valid weights
}

impl ParseError {
    /// True when the error only concerns the frame being decoded, so a
    /// multi-frame reader may skip ahead to the next frame.
    pub fn is_frame_local(&self) -> bool {
        !matches!(self, ParseError::Io(_))
    }
}

/// Errors from the cell-center and weight computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("cell {cell}: vertex slot {vertex} coincides with the cell center")]
    DegenerateCell { cell: usize, vertex: usize },

    #[error("cell {cell}: node index {index} outside [0, {node_count})")]
    NodeIndexOutOfRange { cell: usize, index: usize, node_count: usize },

    #[error("cell {cell}: interpolation weights are not finite")]
    NonFiniteWeight { cell: usize },

    #[error("expected {expected} vertices per cell, found {found}")]
    TopologyMismatch { expected: usize, found: usize },
}

/// Errors from the per-frame output writers.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("VTK error: {0}")]
    Vtk(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}
