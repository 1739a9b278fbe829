//! What the validator reports: where, what kind, and a human detail.
use std::fmt;

use serde::{Deserialize, Serialize};

// ------------------------------- Paths ------------------------------------ //

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location inside a candidate value; empty is the value itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self { Self::default() }

    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(|f| PathSegment::Field(f.into())).collect())
    }

    pub fn child(&self, field: &str) -> Self {
        let mut segs = self.0.clone();
        segs.push(PathSegment::Field(field.to_owned()));
        Self(segs)
    }

    pub fn index(&self, i: usize) -> Self {
        let mut segs = self.0.clone();
        segs.push(PathSegment::Index(i));
        Self(segs)
    }

    pub fn segments(&self) -> &[PathSegment] { &self.0 }

    pub fn is_root(&self) -> bool { self.0.is_empty() }

    /// The path cut down to its first segment.
    pub fn head(&self) -> Self {
        Self(self.0.iter().take(1).cloned().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for seg in &self.0 {
            match seg {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Field(name) if is_plain(name) => write!(f, ".{name}")?,
                PathSegment::Field(name) => {
                    let quoted = serde_json::to_string(name).map_err(|_| fmt::Error)?;
                    write!(f, "[{quoted}]")?
                }
            }
        }
        Ok(())
    }
}

fn is_plain(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

// ----------------------------- Violations --------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    TypeMismatch,
    UnexpectedField,
    MissingField,
    InvalidDiscriminant,
    ExtraneousVariantField,
    /// A field names a type the registry cannot supply.
    UnknownType,
    /// Nesting went past `ValidateOptions::max_depth`.
    DepthExceeded,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::TypeMismatch           => "TypeMismatch",
            ViolationKind::UnexpectedField        => "UnexpectedField",
            ViolationKind::MissingField           => "MissingField",
            ViolationKind::InvalidDiscriminant    => "InvalidDiscriminant",
            ViolationKind::ExtraneousVariantField => "ExtraneousVariantField",
            ViolationKind::UnknownType            => "UnknownType",
            ViolationKind::DepthExceeded          => "DepthExceeded",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: Path,
    pub kind: ViolationKind,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.kind, self.detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self { ok: violations.is_empty(), violations }
    }

    pub fn kinds_at(&self, path: &Path) -> Vec<ViolationKind> {
        self.violations
            .iter()
            .filter(|v| &v.path == path)
            .map(|v| v.kind)
            .collect()
    }

    pub fn report(&self) -> crate::report::FormattedReport {
        crate::report::report(&self.violations)
    }
}
