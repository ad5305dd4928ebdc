//! stepmatch - Resolve step scripts against a step catalogue.

mod script;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use giztoy_stepmatch::{action_fn, Action, Catalogue, Context, Dispatcher, Registry, StepDef};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use script::{parse_script, ScriptStep};

/// Resolve step scripts against a step catalogue.
///
/// Every step line is matched against the catalogue and dispatched to a
/// reporting action, which prints the matched step, its captured arguments
/// and the merged context. The first step that fails to resolve stops the run.
#[derive(Parser, Debug)]
#[command(name = "stepmatch")]
#[command(about = "Resolve step scripts against a step catalogue")]
#[command(version)]
struct Args {
    /// Step catalogue (YAML or JSON)
    #[arg(short, long)]
    steps: PathBuf,

    /// Placeholder prefix (overrides the catalogue's prefix)
    #[arg(long)]
    prefix: Option<String>,

    /// Execution context entry, KEY=VALUE (repeatable)
    #[arg(short = 'c', long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// Print every matching template with its score
    #[arg(long)]
    explain: bool,

    /// Output one JSON object per step
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Script files (default: stdin)
    scripts: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut catalogue = load_catalogue(&args.steps)?;
    if let Some(prefix) = &args.prefix {
        catalogue.options.prefix = Some(prefix.clone());
    }

    let registry = catalogue
        .build(report_action)
        .with_context(|| format!("failed to build registry from {}", args.steps.display()))?;
    tracing::debug!("loaded {} templates", registry.len());

    let ctx = parse_context(&args.context)?;

    if args.scripts.is_empty() {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        run_script("<stdin>", &source, &registry, &ctx, &args)?;
    } else {
        for path in &args.scripts {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            run_script(&path.display().to_string(), &source, &registry, &ctx, &args)?;
        }
    }

    Ok(())
}

/// Load a catalogue, choosing the format by file extension.
fn load_catalogue(path: &Path) -> Result<Catalogue> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    let catalogue = match ext {
        "json" => Catalogue::from_json(&data)?,
        "yaml" | "yml" => Catalogue::from_yaml(&data)?,
        _ => anyhow::bail!("unsupported catalogue format: {}", path.display()),
    };
    Ok(catalogue)
}

/// Parse KEY=VALUE pairs. Values that parse as JSON are kept typed.
fn parse_context(entries: &[String]) -> Result<Context> {
    let mut ctx = Context::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            anyhow::bail!("invalid context entry {:?}: expected KEY=VALUE", entry);
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid context entry {:?}: empty key", entry);
        }
        let value = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        ctx.insert(key, value);
    }
    Ok(ctx)
}

/// Action bound to every catalogue entry: reports what it was called with.
fn report_action(def: &StepDef) -> Arc<dyn Action> {
    let step = if def.name.is_empty() {
        def.templates().map(|t| t.join(" | ")).unwrap_or_default()
    } else {
        def.name.clone()
    };
    action_fn(move |ctx, args| {
        Ok(json!({
            "step": step,
            "args": args,
            "context": ctx,
        }))
    })
}

fn run_script(
    name: &str,
    source: &str,
    registry: &Registry,
    ctx: &Context,
    args: &Args,
) -> Result<()> {
    let dispatcher = Dispatcher::new(registry);

    for ScriptStep { line, text } in parse_script(source) {
        if args.explain {
            print_ranking(&text, registry, args.json);
        }

        let result = dispatcher
            .run(&text, ctx)
            .with_context(|| format!("{}:{}", name, line))?
            .unwrap_or(Value::Null);

        if args.json {
            let out = json!({
                "file": name,
                "line": line,
                "text": text,
                "result": result,
            });
            println!("{}", out);
        } else {
            println!(
                "{}:{}: {}\n    -> {} {}",
                name, line, text, result["step"].as_str().unwrap_or("?"), result["args"]
            );
        }
    }

    Ok(())
}

fn print_ranking(text: &str, registry: &Registry, as_json: bool) {
    let ranked = registry.rank(text);
    if as_json {
        let candidates: Vec<Value> = ranked
            .iter()
            .map(|(score, t)| json!({ "score": score, "template": t.match_expression() }))
            .collect();
        println!("{}", json!({ "text": text, "candidates": candidates }));
        return;
    }
    println!("{}", text);
    for (score, template) in &ranked {
        println!("    {:>5}  {}", score, template.match_expression());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_catalogue_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("steps.yaml");
        std::fs::File::create(&yaml)
            .unwrap()
            .write_all(b"steps:\n  - given: \"I have (\\\\d+) cukes\"\n")
            .unwrap();
        let cat = load_catalogue(&yaml).unwrap();
        assert_eq!(cat.steps.len(), 1);

        let json = dir.path().join("steps.json");
        std::fs::write(&json, r#"{"prefix": "$", "steps": [{"when": "I eat $n"}]}"#).unwrap();
        let cat = load_catalogue(&json).unwrap();
        assert_eq!(cat.options.prefix.as_deref(), Some("$"));

        let txt = dir.path().join("steps.txt");
        std::fs::write(&txt, "").unwrap();
        assert!(load_catalogue(&txt).is_err());

        assert!(load_catalogue(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_parse_context() {
        let ctx = parse_context(&[
            "user=alice".to_string(),
            "count=3".to_string(),
            "flags={\"a\":true}".to_string(),
            "eq=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(ctx.get_str("user"), Some("alice"));
        assert_eq!(ctx.get("count"), Some(&json!(3)));
        assert_eq!(ctx.get("flags"), Some(&json!({"a": true})));
        assert_eq!(ctx.get_str("eq"), Some("a=b"));

        assert!(parse_context(&["novalue".to_string()]).is_err());
        assert!(parse_context(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_report_action_end_to_end() {
        let cat = Catalogue::from_yaml(
            br#"
prefix: "$"
steps:
  - name: have
    given: "I have $n cukes"
    context: { unit: cuke }
  - when: "I eat $n"
"#,
        )
        .unwrap();
        let registry = cat.build(report_action).unwrap();
        let ctx = Context::new().with("user", "alice");

        let out = registry.dispatch("Given I have 4 cukes", &ctx).unwrap();
        assert_eq!(out["step"], "have");
        assert_eq!(out["args"], json!(["4"]));
        assert_eq!(out["context"], json!({"unit": "cuke", "user": "alice"}));

        let out = registry.dispatch("When I eat 2", &ctx).unwrap();
        assert_eq!(out["step"], "(?:[Ww]hen|[Aa]nd|[Bb]ut) I eat $n");
    }

    #[test]
    fn test_testdata_feature_resolves() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
        let registry = load_catalogue(&dir.join("cukes.yaml"))
            .unwrap()
            .build(report_action)
            .unwrap();
        let source = std::fs::read_to_string(dir.join("cukes.feature")).unwrap();

        let steps: Vec<String> = parse_script(&source).into_iter().map(|s| s.text).collect();
        let results = Dispatcher::new(&registry).run_all(&steps, &Context::new()).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r["step"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            ["have_cukes", "eat_cukes", "eat_cukes", "cukes_left", "belly"]
        );
        assert_eq!(results[4]["args"], json!(["happy"]));
    }
}
