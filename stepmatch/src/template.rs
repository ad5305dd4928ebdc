//! Step templates: a regex matcher bound to an action.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::action::Action;
use crate::context::Context;
use crate::distance::distance;
use crate::error::{Error, Result};

/// Ceiling for match scores. A match scores `MAX_SCORE - distance`.
///
/// Scores are not clamped: a text more than `MAX_SCORE` edits away from a
/// scoring form still ranks by distance, its score is just negative.
pub const MAX_SCORE: i64 = 1000;

/// A registered step template.
///
/// The match expression is both the registry key and the matcher. It is used
/// as authored: no anchors are added, so `"I have (\d+) cukes"` also matches
/// `"so I have 3 cukes today"`.
#[derive(Clone)]
pub struct Template {
    expression: String,
    regex: Regex,
    scoring_form: String,
    action: Arc<dyn Action>,
    context: Context,
}

impl Template {
    /// Compile a template from a match expression.
    ///
    /// # Errors
    /// Returns `Error::InvalidTemplate` if the expression is not a valid regex.
    pub fn new(
        expression: impl Into<String>,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<Self> {
        let expression = expression.into();
        let regex = Regex::new(&expression).map_err(|source| Error::InvalidTemplate {
            template: expression.clone(),
            source,
        })?;
        let scoring_form = scoring_form(&expression);

        Ok(Self {
            expression,
            regex,
            scoring_form,
            action,
            context,
        })
    }

    /// The match expression, as registered.
    pub fn match_expression(&self) -> &str {
        &self.expression
    }

    /// The expression with regex punctuation stripped, used for scoring.
    pub fn scoring_form(&self) -> &str {
        &self.scoring_form
    }

    /// Default context merged under the execution context at dispatch.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Number of capture groups, i.e. the number of arguments passed to the action.
    pub fn arity(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Whether the expression matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Scores `text` against this template.
    ///
    /// Returns `None` when the regex does not match. Otherwise returns
    /// `MAX_SCORE` minus the edit distance between `text` and the scoring
    /// form, so a closer scoring form always scores higher.
    pub fn score(&self, text: &str) -> Option<i64> {
        if !self.is_match(text) {
            return None;
        }
        let d = i64::try_from(distance(text, &self.scoring_form)).unwrap_or(i64::MAX);
        let score = MAX_SCORE.saturating_sub(d);
        trace!(template = %self.expression, score, "scored step");
        Some(score)
    }

    /// Returns the captured groups for `text`, excluding the whole match.
    ///
    /// Groups that did not take part in the match are returned as empty
    /// strings. Returns an empty vector if `text` does not match.
    pub fn extract_arguments(&self, text: &str) -> Vec<String> {
        match self.regex.captures(text) {
            Some(caps) => caps
                .iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Runs the bound action for `text`.
    ///
    /// The action sees the template's default context overlaid with
    /// `execution`; keys in `execution` win.
    pub fn run(&self, text: &str, execution: &Context) -> Result<Value> {
        let args = self.extract_arguments(text);
        let ctx = self.context.merged(execution);
        self.action.invoke(&ctx, &args)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("expression", &self.expression)
            .field("scoring_form", &self.scoring_form)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Strip everything but ASCII word characters and whitespace.
fn scoring_form(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}
