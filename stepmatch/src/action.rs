//! Actions bound to step templates.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::Result;

/// Action trait for executing a matched step.
///
/// `args` holds the groups captured by the template, in order.
pub trait Action: Send + Sync {
    /// Run the step with the merged context and captured arguments.
    fn invoke(&self, ctx: &Context, args: &[String]) -> Result<Value>;
}

/// Action function type.
pub type ActionFunc = dyn Fn(&Context, &[String]) -> Result<Value> + Send + Sync;

/// Wrapper for action functions.
struct FnAction {
    f: Box<ActionFunc>,
}

impl Action for FnAction {
    fn invoke(&self, ctx: &Context, args: &[String]) -> Result<Value> {
        (self.f)(ctx, args)
    }
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action {{ ... }}")
    }
}

/// Wrap a closure as a shareable action.
///
/// # Example
///
/// ```
/// use giztoy_stepmatch::{action_fn, Action, Context};
///
/// let action = action_fn(|_ctx, args| Ok(args.len().into()));
/// let out = action.invoke(&Context::new(), &["a".into(), "b".into()]).unwrap();
/// assert_eq!(out, 2);
/// ```
pub fn action_fn<F>(f: F) -> Arc<dyn Action>
where
    F: Fn(&Context, &[String]) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(FnAction { f: Box::new(f) })
}

/// An action that does nothing and returns `null`.
pub fn noop() -> Arc<dyn Action> {
    action_fn(|_, _| Ok(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_action_fn_receives_context_and_args() {
        let action = action_fn(|ctx, args| {
            Ok(json!({
                "who": ctx.get_str("who"),
                "args": args,
            }))
        });

        let ctx = Context::new().with("who", "bob");
        let out = action.invoke(&ctx, &["1".to_string(), "two".to_string()]).unwrap();
        assert_eq!(out, json!({"who": "bob", "args": ["1", "two"]}));
    }

    #[test]
    fn test_action_error_propagates() {
        let action = action_fn(|_, _| Err(Error::Action("boom".to_string())));
        let err = action.invoke(&Context::new(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "stepmatch: action error: boom");
    }

    #[test]
    fn test_noop() {
        assert_eq!(noop().invoke(&Context::new(), &[]).unwrap(), Value::Null);
    }
}
