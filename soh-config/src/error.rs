//! Error types for deployment configuration loading.

use soh_rollup::{OperatorKind, RollupError};
use thiserror::Error;

use crate::tier::Tier;

/// Errors that can occur while loading or resolving a deployment
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or deserialized.
    #[error("Failed to load deployment configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A resolved definition failed engine validation.
    #[error(transparent)]
    Rollup(#[from] RollupError),

    #[error("operator_type is required")]
    MissingOperatorType,

    #[error("{kind} requires {field}")]
    MissingThreshold {
        kind: OperatorKind,
        field: &'static str,
    },

    #[error("{field} is only valid for MIN_GOOD_OF, not {kind}")]
    UnexpectedThreshold {
        kind: OperatorKind,
        field: &'static str,
    },

    /// A terminal operator lists leaves another tier reads.
    #[error("{field} is not allowed in a {tier} rollup")]
    OperandNotAllowed { tier: Tier, field: &'static str },

    /// An operator lists both nested operators and leaves.
    #[error("rollup_operator_operands cannot be combined with {field}")]
    MixedOperands { field: &'static str },

    #[error("Unknown monitor type: {0}")]
    UnknownMonitorType(String),

    #[error("Unknown operator reference: {0}")]
    UnknownReference(String),

    /// `reference` must be the only field of an operator config.
    #[error("Operator reference {0} cannot be combined with other fields")]
    ReferenceWithFields(String),

    #[error("Cyclic operator reference: {0}")]
    CyclicReference(String),

    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Group {group} refers to station {station}, which is not declared for the group")]
    UndeclaredStation { group: String, station: String },

    #[error("Station {station} refers to channel {channel}, which is not declared for the station")]
    UndeclaredChannel { station: String, channel: String },

    /// Wraps an error with the configuration path it was found at.
    #[error("{location}: {source}")]
    At {
        location: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Attach a configuration path to this error.
    pub fn at(self, location: impl Into<String>) -> Self {
        ConfigError::At {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, without location wrappers.
    pub fn root(&self) -> &ConfigError {
        match self {
            ConfigError::At { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
