//! Step script parsing.
//!
//! A script is plain text with one step per line. Lines are trimmed; blank
//! lines, `#` comments, `@` tags and Gherkin section headers are skipped.

/// Gherkin headers that are not steps.
const HEADERS: &[&str] = &[
    "Feature:",
    "Rule:",
    "Background:",
    "Scenario:",
    "Scenario Outline:",
    "Scenario Template:",
    "Example:",
    "Examples:",
];

/// A step line from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    /// 1-based line number in the source.
    pub line: usize,
    pub text: String,
}

/// Extract the step lines of a script.
pub fn parse_script(source: &str) -> Vec<ScriptStep> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let text = raw.trim();
            if is_skipped(text) {
                None
            } else {
                Some(ScriptStep {
                    line: i + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

fn is_skipped(text: &str) -> bool {
    text.is_empty()
        || text.starts_with('#')
        || text.starts_with('@')
        || HEADERS.iter().any(|h| text.starts_with(h))
}
