//! Runs lines of step text against a registry.

use serde_json::Value;
use tracing::debug;

use crate::context::Context;
use crate::error::Result;
use crate::registry::Registry;

/// Dispatches step text to the templates of a borrowed registry.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Swap the registry used for later dispatches.
    pub fn prime(&mut self, registry: &'r Registry) {
        self.registry = registry;
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Dispatch a single line.
    ///
    /// An empty line is a no-op and returns `Ok(None)`.
    pub fn run(&self, text: &str, ctx: &Context) -> Result<Option<Value>> {
        if text.is_empty() {
            return Ok(None);
        }
        self.registry.dispatch(text, ctx).map(Some)
    }

    /// Dispatch lines in order with the same context.
    ///
    /// Stops at the first line that fails and returns its error. Otherwise
    /// returns one action result per non-empty line, in order. Empty lines
    /// are skipped and produce no result.
    pub fn run_all<I, S>(&self, lines: I, ctx: &Context) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            debug!(line = i + 1, "running step: {}", line.as_ref());
            if let Some(value) = self.run(line.as_ref(), ctx)? {
                results.push(value);
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{action_fn, noop};
    use crate::error::Error;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_run_all_in_order_with_shared_context() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = Registry::new();

        for (phase, word) in [("given", "X"), ("when", "Y"), ("then", "Z")] {
            let calls = calls.clone();
            let action = action_fn(move |ctx, _| {
                calls.lock().unwrap().push((word, ctx.clone()));
                Ok(json!(word))
            });
            let defaults = Context::new().with("phase", phase);
            registry.add_step(&format!("{phase} {word}"), action, defaults).unwrap();
        }

        let exec = Context::new().with("world", "shared");
        let results = Dispatcher::new(&registry)
            .run_all(["given X", "when Y", "then Z"], &exec)
            .unwrap();
        assert_eq!(results, vec![json!("X"), json!("Y"), json!("Z")]);

        let calls = calls.lock().unwrap();
        let order: Vec<&str> = calls.iter().map(|(w, _)| *w).collect();
        assert_eq!(order, ["X", "Y", "Z"]);
        for ((_, ctx), phase) in calls.iter().zip(["given", "when", "then"]) {
            assert_eq!(ctx.get_str("world"), Some("shared"));
            assert_eq!(ctx.get_str("phase"), Some(phase));
            assert_eq!(ctx.len(), 2);
        }
    }

    #[test]
    fn test_run_all_stops_at_first_error() {
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let mut registry = Registry::new();
        registry
            .add_step(
                "step (\\d)",
                action_fn(move |_, _| {
                    *counter.lock().unwrap() += 1;
                    Ok(Value::Null)
                }),
                Context::new(),
            )
            .unwrap();

        let err = Dispatcher::new(&registry)
            .run_all(["step 1", "unknown", "step 2"], &Context::new())
            .unwrap_err();
        assert!(matches!(err, Error::UndefinedStep(ref t) if t == "unknown"));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let registry = Registry::new();
        let dispatcher = Dispatcher::new(&registry);

        assert_eq!(dispatcher.run("", &Context::new()).unwrap(), None);
        let none: [&str; 0] = [];
        assert!(dispatcher.run_all(none, &Context::new()).unwrap().is_empty());
    }

    #[test]
    fn test_run_all_skips_empty_lines() {
        let mut registry = Registry::new();
        registry
            .add_step(r"step (\d)", action_fn(|_, args| Ok(json!(args[0]))), Context::new())
            .unwrap();

        let results = Dispatcher::new(&registry)
            .run_all(["step 1", "", "step 2"], &Context::new())
            .unwrap();
        assert_eq!(results, vec![json!("1"), json!("2")]);
    }

    #[test]
    fn test_prime_swaps_registry() {
        let empty = Registry::new();
        let mut full = Registry::new();
        full.add_step("hello", noop(), Context::new()).unwrap();

        let mut dispatcher = Dispatcher::new(&empty);
        assert!(dispatcher.run("hello", &Context::new()).is_err());

        dispatcher.prime(&full);
        assert_eq!(dispatcher.run("hello", &Context::new()).unwrap(), Some(Value::Null));
        assert_eq!(dispatcher.registry().len(), 1);
    }
}
