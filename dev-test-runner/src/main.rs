//! Runs the JSON fixture corpus under `fixtures/` against the engine.
//!
//! A fixture holds a declaration document plus cases:
//! `{ "types": [...], "cases": [...], "rejected": [...] }`.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use adt_check::{Registry, TypeDecl, ValidateOptions, Validator};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    types: Vec<TypeDecl>,
    #[serde(default)]
    cases: Vec<Case>,
    #[serde(default)]
    rejected: Vec<Rejected>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    value: Value,
    #[serde(default)]
    legacy: bool,
    ok: bool,
    #[serde(default)]
    violations: Vec<Expected>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expected {
    path: String,
    kind: String,
}

/// A declaration that must fail to register, with a fragment of its message.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Rejected {
    decl: TypeDecl,
    error: String,
}

fn fixture_paths() -> Result<Vec<PathBuf>> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join("*.json");
    let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

/// Returns one message per failed expectation.
fn run_fixture(path: &Path) -> Result<Vec<String>> {
    let src = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let fixture: Fixture = adt_check::path_de::from_str_with_path(&src)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut registry = Registry::new();
    registry.register_all(fixture.types)?;

    let mut failures = Vec::new();
    for rejected in fixture.rejected {
        let name = rejected.decl.name().to_string();
        match registry.register(rejected.decl) {
            Ok(()) => failures.push(format!("`{name}` registered but should be rejected")),
            Err(error) if !error.to_string().contains(&rejected.error) => {
                failures.push(format!("`{name}` rejected with `{error}`, expected `{}`", rejected.error))
            }
            Err(_) => {}
        }
    }

    let registry = registry.seal();
    for case in fixture.cases {
        let options = if case.legacy { ValidateOptions::legacy() } else { ValidateOptions::default() };
        let result = Validator::with_options(&registry, options).validate_named(&case.type_name, &case.value)?;
        if result.ok != case.ok {
            failures.push(format!("{}: ok = {}, expected {}\n{}", case.name, result.ok, case.ok, result.report()));
            continue;
        }
        let got: Vec<(String, String)> = result
            .violations
            .iter()
            .map(|v| (v.path.to_string(), v.kind.to_string()))
            .collect();
        let want: Vec<(String, String)> = case.violations.into_iter().map(|e| (e.path, e.kind)).collect();
        if got != want {
            failures.push(format!("{}: violations {got:?}, expected {want:?}", case.name));
        }
    }
    Ok(failures)
}

fn run_corpus() -> Result<usize> {
    let mut failed = 0;
    for path in fixture_paths()? {
        let failures = run_fixture(&path)?;
        let label = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if failures.is_empty() {
            eprintln!("{} {label}", "✔".green());
        } else {
            eprintln!("{} {label}", "✘".red());
            for f in &failures {
                eprintln!("    {f}");
            }
            failed += failures.len();
        }
    }
    Ok(failed)
}

fn main() -> Result<()> {
    let failed = run_corpus()?;
    if failed > 0 {
        anyhow::bail!("{failed} fixture expectation(s) failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn corpus_passes() {
        assert!(!super::fixture_paths().unwrap().is_empty());
        assert_eq!(super::run_corpus().unwrap(), 0);
    }
}
