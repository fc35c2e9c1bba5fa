//! Load-time errors. Once a battle is running nothing can fail.

use std::path::PathBuf;

/// Result alias for scenario loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal problems found while loading a scenario document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read scenario file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario: {context}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// `units` or `teams` is absent or empty
    #[error("'{0}' key is missing or empty")]
    MissingSection(&'static str),

    #[error("missing field '{field}' for unit type '{unit_type}'")]
    MissingUnitField {
        unit_type: String,
        field: &'static str,
    },

    #[error("missing field '{field}' for a member of team '{team}'")]
    MissingMemberField { team: String, field: &'static str },

    #[error("unknown unit type '{unit_type}' in team '{team}'")]
    UnknownUnitType { team: String, unit_type: String },

    #[error("invalid {field} {value} for unit type '{unit_type}'")]
    InvalidStat {
        unit_type: String,
        field: &'static str,
        value: f64,
    },
}

impl ConfigError {
    pub(crate) fn malformed(context: impl Into<String>, source: serde_json::Error) -> Self {
        ConfigError::Malformed {
            context: context.into(),
            source,
        }
    }
}
