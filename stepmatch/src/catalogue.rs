//! Declarative step catalogues.
//!
//! A catalogue lists step templates with their phase and default context so a
//! [`Registry`] can be built from a YAML or JSON file. Actions are not part of
//! the document; the caller binds one to each definition when building.
//!
//! ```yaml
//! prefix: "$"
//! steps:
//!   - given: "I have $count cukes"
//!     context: { unit: cuke }
//!   - when: ["I eat $n", "I munch $n"]
//!   - template: "^raw (\\d+)$"
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::phase::Phase;
use crate::registry::{Registry, RegistryOptions};

/// One template or a list of templates.
///
/// JSON/YAML supports:
/// - `"I eat $n"` (single template)
/// - `["I eat $n", "I munch $n"]` (several templates sharing one action)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Templates {
    One(String),
    Many(Vec<String>),
}

impl Templates {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Templates::One(t) => std::slice::from_ref(t),
            Templates::Many(ts) => ts,
        }
    }
}

/// A single step definition.
///
/// Exactly one of `given`, `when`, `then` or `template` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    /// Optional name, for binders that look actions up by name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<Templates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Templates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Templates>,

    /// Templates registered without a phase keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Templates>,

    /// Default context for the bound action.
    #[serde(default, skip_serializing_if = "Context::is_empty")]
    pub context: Context,
}

impl StepDef {
    /// Returns the phase (if any) and the raw templates of this definition.
    ///
    /// # Errors
    /// Returns `Error::Catalogue` unless exactly one template field is set.
    pub fn source(&self) -> Result<(Option<Phase>, &Templates)> {
        let fields = [
            (Some(Phase::Given), self.given.as_ref()),
            (Some(Phase::When), self.when.as_ref()),
            (Some(Phase::Then), self.then.as_ref()),
            (None, self.template.as_ref()),
        ];
        let mut set = fields
            .into_iter()
            .filter_map(|(phase, t)| t.map(|t| (phase, t)));

        match (set.next(), set.next()) {
            (Some(found), None) => Ok(found),
            (None, _) => Err(Error::Catalogue(format!(
                "step {:?}: one of given, when, then or template is required",
                self.name
            ))),
            (Some(_), Some(_)) => Err(Error::Catalogue(format!(
                "step {:?}: only one of given, when, then or template may be set",
                self.name
            ))),
        }
    }

    pub fn phase(&self) -> Result<Option<Phase>> {
        Ok(self.source()?.0)
    }

    /// The template strings to register, with phase keywords applied.
    pub fn templates(&self) -> Result<Vec<String>> {
        let (phase, templates) = self.source()?;
        Ok(templates
            .as_slice()
            .iter()
            .map(|t| match phase {
                Some(phase) => phase.apply(t),
                None => t.clone(),
            })
            .collect())
    }
}

/// A step catalogue document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(flatten)]
    pub options: RegistryOptions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepDef>,
}

impl Catalogue {
    /// Parse a catalogue from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Parse a catalogue from YAML bytes.
    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(data)?)
    }

    /// Build a registry, asking `bind` for the action of each definition.
    ///
    /// # Errors
    /// Returns the first invalid definition, invalid template or conflict.
    pub fn build<F>(&self, bind: F) -> Result<Registry>
    where
        F: FnMut(&StepDef) -> Arc<dyn Action>,
    {
        let mut registry = Registry::with_options(self.options.clone())?;
        self.register(&mut registry, bind)?;
        Ok(registry)
    }

    /// Register every definition into an existing registry.
    pub fn register<F>(&self, registry: &mut Registry, mut bind: F) -> Result<()>
    where
        F: FnMut(&StepDef) -> Arc<dyn Action>,
    {
        for def in &self.steps {
            let templates = def.templates()?;
            registry.add_steps(templates, bind(def), def.context.clone())?;
        }
        Ok(())
    }
}
