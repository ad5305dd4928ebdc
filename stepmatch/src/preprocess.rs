//! Placeholder substitution for prefixed template syntax.

use regex::Regex;

use crate::error::{Error, Result};

/// Wildcard each placeholder is replaced with.
pub const WILDCARD: &str = "(.+)";

/// Rewrites `$name`-style placeholders into capturing wildcards.
///
/// A placeholder is `prefix` followed by one or more non-space characters.
/// Placeholders preceded by a backslash are left untouched.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    prefix: String,
    placeholder_re: Regex,
}

impl Preprocessor {
    /// Build a preprocessor for the given prefix.
    ///
    /// # Errors
    /// Returns `Error::InvalidOption` if `prefix` is empty.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(Error::InvalidOption("prefix must not be empty".to_string()));
        }
        let pattern = format!(r"(^|[^\\]){}[^ ]+", regex::escape(&prefix));
        let placeholder_re = Regex::new(&pattern).map_err(|source| Error::InvalidTemplate {
            template: pattern.clone(),
            source,
        })?;
        Ok(Self {
            prefix,
            placeholder_re,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Apply the substitution to a template string.
    pub fn apply(&self, template: &str) -> String {
        self.placeholder_re
            .replace_all(template, |caps: &regex::Captures| format!("{}{}", &caps[1], WILDCARD))
            .into_owned()
    }
}

/// One-shot form of [`Preprocessor::apply`].
pub fn substitute_placeholders(template: &str, prefix: &str) -> Result<String> {
    Ok(Preprocessor::new(prefix)?.apply(template))
}
