//! Error types for rollup evaluation.

use thiserror::Error;

use crate::operator::OperatorKind;

/// Configuration defects detected while binding, validating or evaluating
/// rollup operators.
///
/// Missing snapshot data is never an error: it resolves to `MARGINAL`. Every
/// variant here points at a deployment defect and should stop the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollupError {
    /// The operator kind name is not one of the built-in kinds.
    #[error("Unknown rollup operator kind: {0}")]
    UnknownOperatorKind(String),

    /// Wrong number of parameters for an operator kind.
    #[error("{kind} takes {expected} parameters but {found} were given")]
    ParameterCount {
        kind: OperatorKind,
        expected: usize,
        found: usize,
    },

    /// MIN_GOOD_OF thresholds must be non-negative.
    #[error("{kind} parameters must be non-negative, got {value}")]
    NegativeParameter { kind: OperatorKind, value: i64 },

    /// A node has neither leaves for the current tier nor children.
    #[error("{kind} operator has no operands to roll up")]
    EmptyOperands { kind: OperatorKind },

    /// The group tree references a station the group does not define.
    #[error("Group {group} references station {station} but has no rollup definition for it")]
    UndefinedStation { group: String, station: String },

    /// The station tree references a channel the station does not define.
    #[error("Station {station} references channel {channel} but has no rollup definition for it")]
    UndefinedChannel { station: String, channel: String },
}

/// Errors surfaced by the streaming rollup pipeline.
///
/// Upstream failures are passed through untouched; the pipeline neither
/// retries nor substitutes partial results.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    /// The station snapshot source failed before the batch completed.
    #[error("Station snapshot source failed: {0}")]
    Upstream(#[source] E),

    /// A group definition could not be evaluated.
    #[error(transparent)]
    Rollup(#[from] RollupError),
}

impl<E> PipelineError<E> {
    /// Returns the upstream error, if this is one.
    pub fn upstream(&self) -> Option<&E> {
        match self {
            PipelineError::Upstream(e) => Some(e),
            PipelineError::Rollup(_) => None,
        }
    }
}
