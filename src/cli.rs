//! Command-line front-end: load declarations, load candidates, validate, report.
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;

use crate::options::{ValidateOptions, ValidationMode, DEFAULT_MAX_DEPTH};
use crate::registry::{Registry, SealedRegistry};
use crate::report::FormattedReport;
use crate::validate::Validator;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON documents against declared product and sum types
#[derive(Parser, Debug)]
#[command(name = "adt-check", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate documents against one declared type
    Validate(ValidateCmd),
    /// print registered declarations
    Show(ShowCmd),
}

#[derive(Args, Debug, Clone)]
struct TypeSettings {
    /// JSON declaration document: `{ "types": [ ... ] }`
    #[arg(long, short = 't')]
    types: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is validated
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct ValidateCmd {
    #[command(flatten)]
    type_settings: TypeSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// name of the declared type every document must conform to
    #[arg(long = "type")]
    type_name: String,

    /// honor `optional` on variant fields and read `null` as absent
    #[arg(long, default_value_t = false)]
    legacy: bool,

    /// nesting bound for a single document
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ShowCmd {
    #[command(flatten)]
    type_settings: TypeSettings,

    /// only this type
    #[arg(long = "type")]
    type_name: Option<String>,
}

/// One candidate value and where it came from.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeSettings {
    fn load_registry(&self) -> Result<SealedRegistry> {
        let src = std::fs::read_to_string(&self.types)
            .with_context(|| format!("failed to read declarations {}", self.types.display()))?;
        let doc = crate::path_de::decl_document_from_str(&src)
            .with_context(|| format!("malformed declarations {}", self.types.display()))?;
        let mut registry = Registry::new();
        let count = registry
            .register_all(doc.types)
            .with_context(|| format!("rejected declarations {}", self.types.display()))?;
        log::info!("loaded {count} type(s) from {}", self.types.display());
        Ok(registry.seal())
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            for (label, value) in self.split_source(&source_path_str, &source)? {
                self.push_selected(&label, value, &mut documents)?;
            }
        }
        log::info!("loaded {} candidate document(s)", documents.len());
        Ok(documents)
    }

    fn split_source(&self, source_path_str: &str, source: &str) -> Result<Vec<(String, Value)>> {
        if !self.ndjson {
            let value = serde_json::from_str::<Value>(source)
                .with_context(|| format!("failed to parse JSON source file {source_path_str}"))?;
            return Ok(vec![(source_path_str.to_owned(), value)]);
        }
        let mut out = Vec::new();
        for (i, line) in source.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let label = format!("{source_path_str}:{}", i + 1);
            let value = serde_json::from_str::<Value>(line)
                .with_context(|| format!("failed to parse NDJSON line {label}"))?;
            out.push((label, value));
        }
        Ok(out)
    }

    fn push_selected(&self, label: &str, value: Value, documents: &mut Vec<Document>) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(ptr) => match value.pointer(ptr) {
                Some(sub) => sub.clone(),
                None => bail!("JSON pointer {ptr} selects nothing in {label}"),
            },
        };
        match self.jq_expr.as_deref() {
            None => documents.push(Document { source: label.to_owned(), value }),
            Some(jq_expr) => {
                let outputs = crate::jq_exec::apply_jq(jq_expr, &value)
                    .with_context(|| format!("failed to apply jq expression to {label}"))?;
                for (i, value) in outputs.into_iter().enumerate() {
                    documents.push(Document { source: format!("{label}#{i}"), value });
                }
            }
        }
        Ok(())
    }
}

impl ValidateCmd {
    fn options(&self) -> ValidateOptions {
        let mode = if self.legacy { ValidationMode::Legacy } else { ValidationMode::Strict };
        ValidateOptions { mode, max_depth: self.max_depth }
    }

    fn run(&self) -> Result<bool> {
        let registry = self.type_settings.load_registry()?;
        // fail before reading any input if the target is unknown
        registry.resolve(&self.type_name)?;

        let documents = self.input_settings.load_documents()?;
        let values: Vec<Value> = documents.iter().map(|d| d.value.clone()).collect();
        let results = Validator::with_options(&registry, self.options()).validate_batch(&self.type_name, &values)?;

        let all_ok = results.iter().all(|r| r.ok);
        let reports: Vec<(&Document, FormattedReport)> = documents
            .iter()
            .zip(results.iter().map(|r| r.report()))
            .collect();

        let rendered = match self.format {
            OutputFormat::Json => {
                let entries: Vec<Value> = reports
                    .iter()
                    .map(|(doc, report)| serde_json::json!({ "source": doc.source, "report": report }))
                    .collect();
                serde_json::to_string_pretty(&entries)?
            }
            OutputFormat::Text => {
                let colored_output = self.out.is_none();
                let mut text = String::new();
                for (doc, report) in &reports {
                    if colored_output {
                        let mark = if report.ok { "✔".green() } else { "✘".red() };
                        text.push_str(&format!("{mark} {}: {}", doc.source.bold(), report.render_colored()));
                    } else {
                        let mark = if report.ok { "✔" } else { "✘" };
                        text.push_str(&format!("{mark} {}: {report}", doc.source));
                    }
                }
                text
            }
        };
        write_output(self.out.as_ref(), &rendered)?;

        let failed = results.iter().filter(|r| !r.ok).count();
        if failed > 0 {
            log::warn!("{failed} of {} document(s) do not conform to `{}`", results.len(), self.type_name);
        }
        Ok(all_ok)
    }
}

impl ShowCmd {
    fn run(&self) -> Result<bool> {
        let registry = self.type_settings.load_registry()?;
        let rendered = match self.type_name.as_deref() {
            Some(name) => serde_json::to_string_pretty(registry.resolve(name)?)?,
            None => {
                let decls: Vec<_> = registry.decls().collect();
                serde_json::to_string_pretty(&serde_json::json!({ "types": decls }))?
            }
        };
        println!("{rendered}");
        Ok(true)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `Ok(false)` means every step ran but some document did not conform.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Validate(target) => target.run(),
            Command::Show(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, rendered: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched_any = false;
        for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern {pattern}"))? {
            out.push(entry?);
            matched_any = true;
        }
        if !matched_any {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TYPES: &str = r#"{"types": [
        {"kind": "product", "name": "Payload", "fields": [{"name": "status", "type": "string"}]},
        {"kind": "sum", "name": "Response", "discriminant": "state", "variants": [
            {"tag": "loading"},
            {"tag": "success", "fields": [{"name": "data", "type": "Payload"}]}
        ]}
    ]}"#;

    /// Fresh directory holding `types.json`, `good.json` and `bad.json`.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("adt-check-cli-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("types.json"), TYPES).unwrap();
        std::fs::write(dir.join("good.json"), r#"{"state": "success", "data": {"status": "OK"}}"#).unwrap();
        std::fs::write(dir.join("bad.json"), r#"{"state": "loading", "data": {"status": "OK"}}"#).unwrap();
        dir
    }

    fn run_cli(args: &[&str]) -> Result<bool> {
        let mut argv = vec!["adt-check"];
        argv.extend_from_slice(args);
        CommandLineInterface::try_parse_from(argv).unwrap().run()
    }

    fn s(p: &std::path::Path) -> String {
        p.to_string_lossy().into_owned()
    }

    #[test]
    fn validate_flags_map_onto_options() {
        let cli = CommandLineInterface::try_parse_from([
            "adt-check", "validate", "-t", "types.json", "--type", "Response",
            "-i", "a.json", "b.json", "--legacy", "--max-depth", "8", "--format", "json",
        ])
        .unwrap();
        let Command::Validate(cmd) = cli.cmd else { panic!("expected validate") };
        assert_eq!(cmd.type_name, "Response");
        assert_eq!(cmd.input_settings.input, ["a.json", "b.json"]);
        assert_eq!(cmd.format, OutputFormat::Json);
        assert_eq!(cmd.options(), ValidateOptions { mode: ValidationMode::Legacy, max_depth: 8 });
    }

    #[test]
    fn ndjson_lines_are_labelled() {
        let settings = InputSettings { ndjson: true, json_pointer: None, jq_expr: None, input: vec![] };
        let docs = settings.split_source("x.ndjson", "{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        let labels: Vec<_> = docs.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["x.ndjson:1", "x.ndjson:3"]);
    }

    #[test]
    fn json_pointer_selects_subnode() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: Some("/body".into()),
            jq_expr: None,
            input: vec![],
        };
        let mut docs = Vec::new();
        settings.push_selected("doc", serde_json::json!({"body": {"state": "loading"}}), &mut docs).unwrap();
        assert_eq!(docs[0].value, serde_json::json!({"state": "loading"}));
        assert!(settings.push_selected("doc", serde_json::json!({}), &mut docs).is_err());
    }

    #[test]
    fn conforming_input_passes() {
        let dir = scratch("pass");
        let out = dir.join("report.txt");
        let ok = run_cli(&[
            "validate", "-t", &s(&dir.join("types.json")), "--type", "Response",
            "-i", &s(&dir.join("good.json")), "-o", &s(&out),
        ])
        .unwrap();
        assert!(ok);
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("✔ "), "{text}");
        assert!(text.contains("ok"), "{text}");
    }

    #[test]
    fn one_bad_document_fails_the_run_with_a_json_report() {
        let dir = scratch("fail");
        let out = dir.join("nested").join("report.json");
        let ok = run_cli(&[
            "validate", "-t", &s(&dir.join("types.json")), "--type", "Response",
            "-i", &s(&dir.join("good.json")), &s(&dir.join("bad.json")),
            "--format", "json", "-o", &s(&out),
        ])
        .unwrap();
        assert!(!ok);

        let entries: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["source"], json!(s(&dir.join("good.json"))));
        assert_eq!(entries[0]["report"], json!({"ok": true, "total": 0, "groups": []}));

        let bad = &entries[1]["report"];
        assert_eq!(bad["ok"], json!(false));
        assert_eq!(bad["total"], json!(1));
        assert_eq!(bad["groups"][0]["prefix"], json!("$.data"));
        let line = bad["groups"][0]["lines"][0].as_str().unwrap();
        assert!(line.starts_with("$.data: ExtraneousVariantField"), "{line}");
    }

    #[test]
    fn glob_inputs_expand_in_order() {
        let dir = scratch("glob");
        let pattern = s(&dir.join("*.json"));
        let paths = resolve_file_path_patterns([pattern.as_str()]).unwrap();
        let names: Vec<_> = paths.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, ["bad.json", "good.json", "types.json"]);

        let none = s(&dir.join("*.ndjson"));
        assert!(resolve_file_path_patterns([none.as_str()]).is_err());
    }

    #[test]
    fn unknown_target_type_is_an_error() {
        let dir = scratch("unknown");
        let err = run_cli(&[
            "validate", "-t", &s(&dir.join("types.json")), "--type", "Nope",
            "-i", &s(&dir.join("good.json")),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Nope"), "{err}");
    }

    #[test]
    fn broken_declarations_are_an_error() {
        let dir = scratch("broken");
        std::fs::write(
            dir.join("types.json"),
            r#"{"types": [{"kind": "product", "name": "A", "fields": [{"name": "b", "type": "Missing"}]}]}"#,
        )
        .unwrap();
        assert!(run_cli(&["show", "-t", &s(&dir.join("types.json"))]).is_err());
        assert!(run_cli(&["show", "-t", &s(&dir.join("absent.json"))]).is_err());
    }

    #[test]
    fn show_loads_the_registry() {
        let dir = scratch("show");
        let types = s(&dir.join("types.json"));
        assert!(run_cli(&["show", "-t", &types]).unwrap());
        assert!(run_cli(&["show", "-t", &types, "--type", "Payload"]).unwrap());
        assert!(run_cli(&["show", "-t", &types, "--type", "Nope"]).is_err());
    }
}
