//! Step matching for behaviour-driven tests.
//!
//! This crate matches lines of step text (e.g. Gherkin steps) against a
//! registry of regex templates, picks the single best template, and runs the
//! action bound to it with the captured groups as arguments.
//!
//! Selection works in two stages:
//! - the template's regex must match the text, otherwise it is out;
//! - among matching templates, the one whose literal shape (the regex with
//!   punctuation stripped) is closest to the text by edit distance wins.
//!
//! A tie for the best score is an error rather than a silent pick.
//!
//! # Example
//!
//! ```rust
//! use giztoy_stepmatch::{action_fn, Context, Dispatcher, Registry};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry
//!     .given(r"I have (\d+) cukes", action_fn(|_, args| Ok(json!(args))), Context::new())
//!     .unwrap()
//!     .when(r"I eat (\d+) cukes", action_fn(|ctx, args| {
//!         Ok(json!({ "who": ctx.get_str("who"), "n": args[0] }))
//!     }), Context::new())
//!     .unwrap();
//!
//! let ctx = Context::new().with("who", "alice");
//! let results = Dispatcher::new(&registry)
//!     .run_all(["Given I have 5 cukes", "When I eat 2 cukes"], &ctx)
//!     .unwrap();
//!
//! assert_eq!(results[0], json!(["5"]));
//! assert_eq!(results[1], json!({ "who": "alice", "n": "2" }));
//! ```

mod action;
mod catalogue;
mod context;
mod dispatcher;
mod distance;
mod error;
mod phase;
mod preprocess;
mod registry;
mod template;

pub use action::{action_fn, noop, Action, ActionFunc};
pub use catalogue::{Catalogue, StepDef, Templates};
pub use context::Context;
pub use dispatcher::Dispatcher;
pub use distance::distance;
pub use error::{Error, Result};
pub use phase::Phase;
pub use preprocess::{substitute_placeholders, Preprocessor, WILDCARD};
pub use registry::{Registry, RegistryOptions};
pub use template::{Template, MAX_SCORE};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::{
        action_fn, Action, Catalogue, Context, Dispatcher, Error, Phase, Registry,
        RegistryOptions, Result, Template,
    };
}
