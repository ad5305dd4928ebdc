//! Given / When / Then keyword families.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The phase a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Given,
    When,
    Then,
}

impl Phase {
    /// Keyword alternation prepended to templates of this phase.
    ///
    /// `And` and `But` are accepted by every phase.
    pub fn keywords(self) -> &'static str {
        match self {
            Phase::Given => "(?:[Gg]iven|[Aa]nd|[Bb]ut) ",
            Phase::When => "(?:[Ww]hen|[Aa]nd|[Bb]ut) ",
            Phase::Then => "(?:[Tt]hen|[Ee]xpect|[Aa]nd|[Bb]ut) ",
        }
    }

    /// Prefix `template` with this phase's keywords.
    pub fn apply(self, template: &str) -> String {
        format!("{}{}", self.keywords(), template)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Given => "given",
            Phase::When => "when",
            Phase::Then => "then",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
