use thiserror::Error;

/// Errors raised while validating and executing a pivot
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("property '{0}' not found in schema")]
    SchemaLookup(String),

    #[error("property '{property}' has type '{found}', which cannot be used as the {role} axis")]
    UnsupportedAxisType {
        property: String,
        found: String,
        role: AxisRole,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("data format error: {0}")]
    Format(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("TOML error")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// True for errors caused by a bad axis choice or missing input.
    ///
    /// Callers surface these as a "select a valid column" message rather
    /// than as a transient fault: repeating the call fails identically.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingInput(_) | Error::SchemaLookup(_) | Error::UnsupportedAxisType { .. }
        )
    }
}

/// Which side of the chart a property was requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    X,
    Y,
}

impl std::fmt::Display for AxisRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisRole::X => write!(f, "X"),
            AxisRole::Y => write!(f, "Y"),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
