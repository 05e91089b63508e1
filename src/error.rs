//! Central error types for fortran-flow.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.
//!
//! Errors here cover caller-invariant violations (analyzing a program unit
//! that was never run through the basic-block pass, malformed graphs handed
//! in by a collaborator). They are not recoverable conditions: the analysis
//! pipeline surfaces them and stops, it never returns partial results.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A program unit was analyzed before the basic-block pass populated
    /// its annotation with a block graph.
    #[error("program unit '{unit}' carries no basic-block graph")]
    MissingBasicBlocks { unit: String },

    /// Two AST-blocks in the same program file share an instruction label.
    #[error("duplicate instruction label {label}")]
    DuplicateLabel { label: usize },

    /// A block-graph edge references a node that does not exist.
    #[error("edge ({from}, {to}) references a node missing from the graph")]
    InvalidEdge { from: usize, to: usize },

    /// The block graph has no entry node 0.
    #[error("basic-block graph has no entry node 0")]
    MissingEntry,
}

/// Convenience type alias for Results using AnalysisError.
pub type Result<T> = std::result::Result<T, AnalysisError>;
