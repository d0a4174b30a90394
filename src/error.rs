//! Typed errors for loading and running a simulation.

use thiserror::Error;

/// Failures that can occur while reading input files or preparing the
/// graph for propagation. Returned from the `io` module and from
/// [`crate::as_graph::AsGraph::finalize`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed topology line {line_no}: {line}")]
    MalformedTopologyLine { line_no: usize, line: String },

    #[error("malformed seed row {row_no}: {reason}")]
    MalformedSeedRow { row_no: usize, reason: String },

    #[error("malformed ROV-deployment line {line_no}: {line}")]
    MalformedRovLine { line_no: usize, line: String },

    #[error("topology contains a provider-customer cycle")]
    TopologyCycle,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
