//! Error types for step matching.

use thiserror::Error;

/// Error type for step registration and dispatch.
#[derive(Error, Debug)]
pub enum Error {
    /// A template with the same match expression is already registered.
    #[error("stepmatch: [{template}] conflicts with [{existing}]")]
    Conflict { template: String, existing: String },

    /// Two templates tie for the best score against the same text.
    #[error(
        "stepmatch: unable to determine which of [{best}] or [{alternative}] is more likely for [{text}]"
    )]
    Ambiguous {
        best: String,
        alternative: String,
        text: String,
    },

    /// No registered template matches the text.
    #[error("stepmatch: undefined step [{0}]")]
    UndefinedStep(String),

    /// The match expression is not a valid regular expression.
    #[error("stepmatch: invalid template [{template}]: {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A registry option has an unusable value.
    #[error("stepmatch: invalid option: {0}")]
    InvalidOption(String),

    /// A bound action reported a failure.
    #[error("stepmatch: action error: {0}")]
    Action(String),

    /// A step catalogue could not be read.
    #[error("stepmatch: catalogue error: {0}")]
    Catalogue(String),
}

impl Error {
    /// Whether this error was raised while registering templates.
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Error::Conflict { .. }
                | Error::InvalidTemplate { .. }
                | Error::InvalidOption(_)
                | Error::Catalogue(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Catalogue(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Catalogue(err.to_string())
    }
}

/// Result type for step matching operations.
pub type Result<T> = std::result::Result<T, Error>;
