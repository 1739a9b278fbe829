//! Collecting and rendering violations.
use std::fmt;

use colored::Colorize;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::violation::{Path, ValidationResult, Violation, ViolationKind};

// ------------------------------ Collector --------------------------------- //

/// Accumulates violations in discovery order, keeping the first of any
/// `(path, kind)` pair.
#[derive(Debug, Default)]
pub struct Collector {
    seen: IndexMap<(Path, ViolationKind), Violation>,
}

impl Collector {
    pub fn new() -> Self { Self::default() }

    /// Returns `false` when the pair was already recorded.
    pub fn push(&mut self, path: &Path, kind: ViolationKind, detail: impl Into<String>) -> bool {
        match self.seen.entry((path.clone(), kind)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Violation { path: path.clone(), kind, detail: detail.into() });
                true
            }
        }
    }

    pub fn len(&self) -> usize { self.seen.len() }

    pub fn is_empty(&self) -> bool { self.seen.is_empty() }

    pub fn finish(self) -> ValidationResult {
        ValidationResult::from_violations(self.seen.into_values().collect())
    }
}

// ------------------------------- Report ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportGroup {
    /// First segment shared by every line in the group (`$` for the root).
    pub prefix: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedReport {
    pub ok: bool,
    pub total: usize,
    pub groups: Vec<ReportGroup>,
}

/// Sort by path then kind name, group by first path segment, one line each.
pub fn report(violations: &[Violation]) -> FormattedReport {
    let mut sorted: Vec<&Violation> = violations.iter().collect();
    sorted.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
            .then_with(|| a.detail.cmp(&b.detail))
    });

    let mut groups: Vec<ReportGroup> = Vec::new();
    for v in sorted {
        let prefix = v.path.head().to_string();
        let line = v.to_string();
        match groups.last_mut() {
            Some(g) if g.prefix == prefix => g.lines.push(line),
            _ => groups.push(ReportGroup { prefix, lines: vec![line] }),
        }
    }

    FormattedReport { ok: violations.is_empty(), total: violations.len(), groups }
}

impl FormattedReport {
    /// Same layout as `Display`, with terminal colour.
    pub fn render_colored(&self) -> String {
        if self.ok {
            return format!("{}\n", "ok".green().bold());
        }
        let mut out = format!("{} ({} violation{})\n", "failed".red().bold(), self.total, plural(self.total));
        for g in &self.groups {
            out.push_str(&format!("  {}\n", g.prefix.cyan()));
            for line in &g.lines {
                out.push_str(&format!("    {} {}\n", "-".red(), line));
            }
        }
        out
    }
}

impl fmt::Display for FormattedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            return writeln!(f, "ok");
        }
        writeln!(f, "failed ({} violation{})", self.total, plural(self.total))?;
        for g in &self.groups {
            writeln!(f, "  {}", g.prefix)?;
            for line in &g.lines {
                writeln!(f, "    - {line}")?;
            }
        }
        Ok(())
    }
}

fn plural(n: usize) -> &'static str { if n == 1 { "" } else { "s" } }

// ------------------------------- Tests ------------------------------------ //
