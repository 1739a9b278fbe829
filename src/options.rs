//! Validation policy knobs.
use once_cell::sync::Lazy;
use regex::Regex;

// ------------------------------- Policy ---------------------------------- //

/// Nesting bound for a single validation call.
pub const DEFAULT_MAX_DEPTH: usize = 256;

pub(crate) static TYPE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("type name pattern is a valid regex")
});

/// Identifier-shaped and not a primitive keyword (those would never resolve).
pub fn is_valid_type_name(name: &str) -> bool {
    TYPE_NAME_PATTERN.is_match(name) && crate::decl::PrimitiveKind::from_keyword(name).is_none()
}

// ------------------------------- Options --------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Variant fields are always mandatory; `optional` is honored on products only.
    #[default]
    Strict,
    /// `optional` is honored everywhere and an explicit `null` there counts as absent.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    pub mode: ValidationMode,
    pub max_depth: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { mode: ValidationMode::Strict, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl ValidateOptions {
    pub fn legacy() -> Self {
        Self { mode: ValidationMode::Legacy, ..Self::default() }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) fn honors_optional_in_variants(&self) -> bool {
        self.mode == ValidationMode::Legacy
    }

    pub(crate) fn null_is_absent(&self) -> bool {
        self.mode == ValidationMode::Legacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_are_identifiers_but_not_keywords() {
        assert!(is_valid_type_name("Response"));
        assert!(is_valid_type_name("_private2"));
        assert!(!is_valid_type_name(""));
        assert!(!is_valid_type_name("2fast"));
        assert!(!is_valid_type_name("has space"));
        assert!(!is_valid_type_name("string"));
    }
}
