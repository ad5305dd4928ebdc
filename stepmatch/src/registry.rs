//! Template registry and best-match selection.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::action::Action;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::phase::Phase;
use crate::preprocess::Preprocessor;
use crate::template::Template;

/// Options for building a Registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryOptions {
    /// Placeholder prefix. When set, tokens starting with it are rewritten
    /// to `(.+)` before a template is compiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl RegistryOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Collection of step templates keyed by match expression.
///
/// Registration is expected to finish before dispatch starts. The registry
/// does no locking of its own.
///
/// # Example
///
/// ```
/// use giztoy_stepmatch::{action_fn, Context, Registry};
///
/// let mut registry = Registry::new();
/// registry
///     .add_step(r"I have (\d+) cukes", action_fn(|_, args| Ok(args[0].clone().into())), Context::new())
///     .unwrap();
///
/// let out = registry.dispatch("I have 42 cukes", &Context::new()).unwrap();
/// assert_eq!(out, "42");
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    templates: BTreeMap<String, Template>,
    options: RegistryOptions,
    preprocessor: Option<Preprocessor>,
}

impl Registry {
    /// Create an empty registry with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given options.
    ///
    /// # Errors
    /// Returns `Error::InvalidOption` if the prefix is empty.
    pub fn with_options(options: RegistryOptions) -> Result<Self> {
        let preprocessor = options.prefix.as_deref().map(Preprocessor::new).transpose()?;
        Ok(Self {
            templates: BTreeMap::new(),
            options,
            preprocessor,
        })
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Look up a template by its match expression.
    pub fn get(&self, expression: &str) -> Option<&Template> {
        self.templates.get(expression)
    }

    /// Iterate over all templates.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Register a template.
    ///
    /// If a prefix is configured, placeholders are rewritten first.
    ///
    /// # Errors
    /// Returns `Error::Conflict` if the resulting match expression is already
    /// registered, or `Error::InvalidTemplate` if it does not compile. The
    /// registry is unchanged in both cases.
    pub fn add_step(
        &mut self,
        template: &str,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<&mut Self> {
        let expression = match &self.preprocessor {
            Some(p) => p.apply(template),
            None => template.to_string(),
        };
        let candidate = Template::new(expression, action, context)?;
        self.insert(candidate)?;
        Ok(self)
    }

    /// Register several templates sharing one action and context.
    ///
    /// Equivalent to calling [`add_step`](Self::add_step) for each template in
    /// order. The first failure stops the batch; templates before it stay
    /// registered.
    pub fn add_steps<I, S>(
        &mut self,
        templates: I,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for template in templates {
            self.add_step(template.as_ref(), action.clone(), context.clone())?;
        }
        Ok(self)
    }

    /// Register a template for the given phase.
    pub fn add_phase_step(
        &mut self,
        phase: Phase,
        template: &str,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<&mut Self> {
        self.add_step(&phase.apply(template), action, context)
    }

    /// Register a `Given`/`And`/`But` step.
    pub fn given(
        &mut self,
        template: &str,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<&mut Self> {
        self.add_phase_step(Phase::Given, template, action, context)
    }

    /// Register a `When`/`And`/`But` step.
    pub fn when(
        &mut self,
        template: &str,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<&mut Self> {
        self.add_phase_step(Phase::When, template, action, context)
    }

    /// Register a `Then`/`Expect`/`And`/`But` step.
    pub fn then(
        &mut self,
        template: &str,
        action: Arc<dyn Action>,
        context: Context,
    ) -> Result<&mut Self> {
        self.add_phase_step(Phase::Then, template, action, context)
    }

    /// Copy every template of `other` into this registry.
    ///
    /// Templates keep their match expression, action and context; the
    /// prefix of this registry is not applied again. Each template is
    /// imported independently: conflicting ones are skipped and the rest
    /// are still imported.
    ///
    /// # Errors
    /// Returns the first `Error::Conflict` encountered, after all
    /// non-conflicting templates have been imported.
    pub fn import_from(&mut self, other: &Registry) -> Result<&mut Self> {
        let mut first_conflict = None;
        for template in other.templates() {
            if let Err(err) = self.insert(template.clone()) {
                warn!(template = %template, "skipped conflicting template on import");
                first_conflict.get_or_insert(err);
            }
        }
        match first_conflict {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    fn insert(&mut self, template: Template) -> Result<()> {
        match self.templates.entry(template.match_expression().to_string()) {
            Entry::Occupied(existing) => Err(Error::Conflict {
                template: template.match_expression().to_string(),
                existing: existing.get().match_expression().to_string(),
            }),
            Entry::Vacant(slot) => {
                debug!(template = %template, "registered step");
                slot.insert(template);
                Ok(())
            }
        }
    }

    /// Find the single best template for `text`.
    ///
    /// Every template is scored; the highest score wins. Returns `Ok(None)`
    /// when nothing matches.
    ///
    /// # Errors
    /// Returns `Error::Ambiguous` if two templates tie for the best score.
    /// With three or more tied, the best and the last tying one seen are
    /// reported.
    pub fn select(&self, text: &str) -> Result<Option<&Template>> {
        let mut best: Option<(i64, &Template)> = None;
        let mut alternative: Option<&Template> = None;

        for candidate in self.templates.values() {
            let Some(score) = candidate.score(text) else {
                continue;
            };
            match best {
                Some((best_score, _)) if score < best_score => {}
                Some((best_score, _)) if score == best_score => alternative = Some(candidate),
                _ => {
                    best = Some((score, candidate));
                    alternative = None;
                }
            }
        }

        match (best, alternative) {
            (Some((_, best)), Some(alternative)) => Err(Error::Ambiguous {
                best: best.match_expression().to_string(),
                alternative: alternative.match_expression().to_string(),
                text: text.to_string(),
            }),
            (best, _) => Ok(best.map(|(_, template)| template)),
        }
    }

    /// Every matching template with its score, best first.
    ///
    /// Ties keep registry order.
    pub fn rank(&self, text: &str) -> Vec<(i64, &Template)> {
        let mut ranked: Vec<(i64, &Template)> = self
            .templates
            .values()
            .filter_map(|t| t.score(text).map(|score| (score, t)))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked
    }

    /// Select the template for `text` and run its action.
    ///
    /// # Errors
    /// Returns `Error::UndefinedStep` if nothing matches, `Error::Ambiguous`
    /// on a tie, or whatever the action returns.
    pub fn dispatch(&self, text: &str, execution: &Context) -> Result<Value> {
        let Some(template) = self.select(text)? else {
            debug!("no step found for: {}", text);
            return Err(Error::UndefinedStep(text.to_string()));
        };
        debug!(template = %template, "dispatching step: {}", text);
        template.run(text, execution)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}
