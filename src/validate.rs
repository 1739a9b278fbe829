//! Structural validation of candidate values against declared types.
//!
//! A walk over the value tree guided by the declaration graph:
//! - primitives compare runtime kinds;
//! - products are closed records, checked field by field in declaration order;
//! - sums pick a variant by discriminant, then check it as a product while
//!   flagging fields owned by the variants that were *not* selected.
//!
//! Non-conformance is data, never an error: every violation found is collected
//! and returned. The one early stop is a sum whose discriminant fails, since no
//! variant context exists to keep checking against.
mod product;
mod sum;

use rayon::prelude::*;
use serde_json::Value;

use crate::decl::{value_kind, PrimitiveKind, TypeDecl, TypeName, TypeRef};
use crate::error::LookupError;
use crate::options::ValidateOptions;
use crate::registry::Registry;
use crate::report::Collector;
use crate::violation::{Path, ValidationResult, ViolationKind};

// ------------------------------- Front API -------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r Registry,
    options: ValidateOptions,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry, options: ValidateOptions::default() }
    }

    pub fn with_options(registry: &'r Registry, options: ValidateOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ValidateOptions { &self.options }

    /// Check `value` against `decl`. `decl` need not be registered; if it is
    /// not, its self-references still resolve to it.
    pub fn validate(&self, decl: &TypeDecl, value: &Value) -> ValidationResult {
        let mut walk = Walk {
            registry: self.registry,
            options: self.options,
            root: decl,
            out: Collector::new(),
        };
        walk.check_decl(decl, value, &Path::root(), 0);
        let result = walk.out.finish();
        log::debug!(
            "validated value against `{}`: {} violation(s)",
            decl.name(),
            result.violations.len()
        );
        result
    }

    pub fn validate_named(&self, name: &str, value: &Value) -> Result<ValidationResult, LookupError> {
        let decl = self.registry.resolve(name)?;
        Ok(self.validate(decl, value))
    }

    /// Validate many values in parallel; results line up with `values`.
    pub fn validate_batch(&self, name: &str, values: &[Value]) -> Result<Vec<ValidationResult>, LookupError> {
        let decl = self.registry.resolve(name)?;
        Ok(values.par_iter().map(|v| self.validate(decl, v)).collect())
    }
}

/// Validate with default (strict) options.
pub fn validate(registry: &Registry, decl: &TypeDecl, value: &Value) -> ValidationResult {
    Validator::new(registry).validate(decl, value)
}

pub fn validate_named(registry: &Registry, name: &str, value: &Value) -> Result<ValidationResult, LookupError> {
    Validator::new(registry).validate_named(name, value)
}

// --------------------------------- Walk ----------------------------------- //

/// State of one validation call.
pub(crate) struct Walk<'a> {
    registry: &'a Registry,
    options: ValidateOptions,
    root: &'a TypeDecl,
    out: Collector,
}

impl<'a> Walk<'a> {
    fn lookup(&self, name: &TypeName) -> Option<&'a TypeDecl> {
        match self.registry.resolve(name.as_str()) {
            Ok(decl) => Some(decl),
            Err(_) => (self.root.name() == name).then_some(self.root),
        }
    }

    fn too_deep(&mut self, path: &Path, depth: usize) -> bool {
        if depth <= self.options.max_depth {
            return false;
        }
        self.out.push(
            path,
            ViolationKind::DepthExceeded,
            format!("nesting exceeds the limit of {}", self.options.max_depth),
        );
        true
    }

    pub(crate) fn mismatch(&mut self, path: &Path, detail: String) {
        self.out.push(path, ViolationKind::TypeMismatch, detail);
    }

    pub(crate) fn check_ref(&mut self, ty: &TypeRef, value: &Value, path: &Path, depth: usize) {
        if self.too_deep(path, depth) {
            return;
        }
        match ty {
            TypeRef::Primitive(kind) => self.check_primitive(*kind, None, value, path),
            TypeRef::Named(name) => match self.lookup(name) {
                Some(decl) => self.check_decl(decl, value, path, depth),
                None => {
                    self.out.push(path, ViolationKind::UnknownType, format!("type `{name}` is not registered"));
                }
            },
            TypeRef::List(item) => match value {
                Value::Array(items) => {
                    for (i, x) in items.iter().enumerate() {
                        self.check_ref(item, x, &path.index(i), depth + 1);
                    }
                }
                other => self.mismatch(path, format!("expected {ty}, got {}", value_kind(other))),
            },
        }
    }

    pub(crate) fn check_decl(&mut self, decl: &TypeDecl, value: &Value, path: &Path, depth: usize) {
        if self.too_deep(path, depth) {
            return;
        }
        match decl {
            TypeDecl::Primitive(alias) => self.check_primitive(alias.of, Some(&alias.name), value, path),
            TypeDecl::Product(p) => product::check_product(self, p, value, path, depth),
            TypeDecl::Sum(s) => sum::check_sum(self, s, value, path, depth),
        }
    }

    fn check_primitive(&mut self, kind: PrimitiveKind, alias: Option<&TypeName>, value: &Value, path: &Path) {
        if kind.accepts(value) {
            return;
        }
        let expected = match alias {
            Some(name) => format!("{name} ({kind})"),
            None => kind.to_string(),
        };
        self.mismatch(path, format!("expected {expected}, got {}", value_kind(value)));
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{PrimitiveAlias, ProductType, SumType, Variant};
    use crate::options::ValidationMode;
    use serde_json::json;

    /// `Response` is the three-state request lifecycle: loading, success, error.
    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(ProductType::new("Payload").field("status", PrimitiveKind::String)).unwrap();
        reg.register(PrimitiveAlias::new("Message", PrimitiveKind::String)).unwrap();
        reg.register(
            SumType::new("Response", "state")
                .variant(Variant::new("loading"))
                .variant(Variant::new("success").field("data", TypeRef::named("Payload")))
                .variant(Variant::new("error").field("error", TypeRef::named("Message"))),
        )
        .unwrap();
        reg
    }

    fn check(reg: &Registry, name: &str, value: Value) -> ValidationResult {
        validate_named(reg, name, &value).unwrap()
    }

    fn at(fields: &[&str]) -> Path {
        Path::from_fields(fields.iter().copied())
    }

    #[test]
    fn success_with_payload_is_ok() {
        let reg = registry();
        let r = check(&reg, "Response", json!({"state": "success", "data": {"status": "OK"}}));
        assert!(r.ok, "{:?}", r.violations);
        assert!(r.violations.is_empty());
    }

    #[test]
    fn success_without_payload_is_missing_field() {
        let reg = registry();
        let r = check(&reg, "Response", json!({"state": "success"}));
        assert!(!r.ok);
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].path, at(&["data"]));
        assert_eq!(r.violations[0].kind, ViolationKind::MissingField);
    }

    #[test]
    fn loading_with_payload_is_extraneous() {
        let reg = registry();
        let r = check(&reg, "Response", json!({"state": "loading", "data": {"status": "OK"}}));
        assert!(!r.ok);
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.kinds_at(&at(&["data"])), [ViolationKind::ExtraneousVariantField]);
        assert!(r.violations[0].detail.contains("`success`"));
    }

    #[test]
    fn nested_scalar_mismatch_points_at_leaf() {
        let reg = registry();
        let r = check(&reg, "Response", json!({"state": "success", "data": {"status": 42}}));
        assert!(!r.ok);
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].path, at(&["data", "status"]));
        assert_eq!(r.violations[0].kind, ViolationKind::TypeMismatch);
        assert_eq!(r.violations[0].detail, "expected string, got integer");
    }

    #[test]
    fn alias_mismatch_names_the_alias() {
        let reg = registry();
        let r = check(&reg, "Response", json!({"state": "error", "error": false}));
        assert_eq!(r.violations[0].detail, "expected Message (string), got boolean");
    }

    #[test]
    fn bad_discriminant_stops_the_sum() {
        let reg = registry();
        let r = check(&reg, "Response", json!({"state": "done", "data": 1, "junk": true}));
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].path, at(&["state"]));
        assert_eq!(r.violations[0].kind, ViolationKind::InvalidDiscriminant);

        let r = check(&reg, "Response", json!({"data": {"status": "OK"}}));
        assert_eq!(r.kinds_at(&at(&["state"])), [ViolationKind::InvalidDiscriminant]);
        assert_eq!(r.violations.len(), 1);
    }

    #[test]
    fn non_object_sum_has_no_discriminant() {
        let reg = registry();
        let r = check(&reg, "Response", json!("success"));
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.kinds_at(&at(&["state"])), [ViolationKind::InvalidDiscriminant]);
        assert!(r.violations[0].detail.contains("got string"), "{}", r.violations[0].detail);

        let r = check(&reg, "Response", json!([{"state": "loading"}]));
        assert_eq!(r.kinds_at(&at(&["state"])), [ViolationKind::InvalidDiscriminant]);
    }

    #[test]
    fn closed_world_flags_only_the_stranger() {
        let mut reg = Registry::new();
        reg.register(ProductType::new("Pair").field("a", PrimitiveKind::Integer).field("b", PrimitiveKind::String))
            .unwrap();
        let r = check(&reg, "Pair", json!({"a": 1, "b": "y", "c": null}));
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].path, at(&["c"]));
        assert_eq!(r.violations[0].kind, ViolationKind::UnexpectedField);
    }

    #[test]
    fn all_violations_are_collected_in_declaration_order() {
        let mut reg = Registry::new();
        reg.register(
            ProductType::new("Row")
                .field("id", PrimitiveKind::Integer)
                .field("name", PrimitiveKind::String)
                .field("score", PrimitiveKind::Number),
        )
        .unwrap();
        let r = check(&reg, "Row", json!({"extra": 1, "score": "high", "id": 1.5}));
        let got: Vec<_> = r.violations.iter().map(|v| (v.path.to_string(), v.kind)).collect();
        assert_eq!(got, [
            ("$.id".to_string(), ViolationKind::TypeMismatch),
            ("$.name".to_string(), ViolationKind::MissingField),
            ("$.score".to_string(), ViolationKind::TypeMismatch),
            ("$.extra".to_string(), ViolationKind::UnexpectedField),
        ]);
    }

    #[test]
    fn recursive_product_validates_depth_three() {
        let mut reg = Registry::new();
        reg.register(
            ProductType::new("Node")
                .field("value", PrimitiveKind::Integer)
                .optional_field("next", TypeRef::named("Node")),
        )
        .unwrap();

        let good = json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}});
        assert!(check(&reg, "Node", good).ok);

        let bad = json!({"value": 1, "next": {"value": 2, "next": {"value": "three"}}});
        let r = check(&reg, "Node", bad);
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].path, at(&["next", "next", "value"]));
    }

    #[test]
    fn unregistered_decl_resolves_itself() {
        let reg = Registry::new();
        let tree: TypeDecl = ProductType::new("Tree")
            .field("label", PrimitiveKind::String)
            .field("kids", TypeRef::list(TypeRef::named("Tree")))
            .into();
        let value = json!({"label": "a", "kids": [{"label": "b", "kids": []}, {"label": 3, "kids": []}]});
        let r = validate(&reg, &tree, &value);
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].path.to_string(), "$.kids[1].label");

        let orphan: TypeDecl = ProductType::new("Orphan").field("x", TypeRef::named("Missing")).into();
        let r = validate(&reg, &orphan, &json!({"x": 1}));
        assert_eq!(r.kinds_at(&at(&["x"])), [ViolationKind::UnknownType]);
    }

    #[test]
    fn list_fields_check_each_element() {
        let mut reg = Registry::new();
        reg.register(ProductType::new("Tags").field("tags", TypeRef::list(PrimitiveKind::String))).unwrap();
        assert!(check(&reg, "Tags", json!({"tags": []})).ok);
        let r = check(&reg, "Tags", json!({"tags": ["a", 1, "b", null]}));
        let paths: Vec<_> = r.violations.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, ["$.tags[1]", "$.tags[3]"]);
        let r = check(&reg, "Tags", json!({"tags": "a"}));
        assert_eq!(r.violations[0].detail, "expected list<string>, got string");
    }

    #[test]
    fn legacy_mode_honors_optional_variant_fields() {
        let mut reg = Registry::new();
        reg.register(
            SumType::new("Legacy", "state")
                .variant(Variant::new("loading"))
                .variant(Variant::new("success").optional_field("data", PrimitiveKind::Any)),
        )
        .unwrap();
        let value = json!({"state": "success", "data": null});
        let sparse = json!({"state": "success"});

        let strict = Validator::new(&reg);
        assert!(strict.validate_named("Legacy", &value).unwrap().ok);
        let r = strict.validate_named("Legacy", &sparse).unwrap();
        assert_eq!(r.kinds_at(&at(&["data"])), [ViolationKind::MissingField]);

        let legacy = Validator::with_options(&reg, ValidateOptions::legacy());
        assert_eq!(legacy.options().mode, ValidationMode::Legacy);
        assert!(legacy.validate_named("Legacy", &sparse).unwrap().ok);
        assert!(legacy.validate_named("Legacy", &value).unwrap().ok);
    }

    #[test]
    fn legacy_mode_treats_null_optional_as_absent() {
        let mut reg = Registry::new();
        reg.register(ProductType::new("P").optional_field("note", PrimitiveKind::String)).unwrap();
        let value = json!({"note": null});
        let strict = Validator::new(&reg).validate_named("P", &value).unwrap();
        assert_eq!(strict.kinds_at(&at(&["note"])), [ViolationKind::TypeMismatch]);
        let legacy = Validator::with_options(&reg, ValidateOptions::legacy()).validate_named("P", &value).unwrap();
        assert!(legacy.ok);
    }

    #[test]
    fn depth_limit_reports_instead_of_recursing() {
        let mut reg = Registry::new();
        reg.register(ProductType::new("Node").optional_field("next", TypeRef::named("Node"))).unwrap();
        let mut value = json!({});
        for _ in 0..10 {
            value = json!({"next": value});
        }
        let v = Validator::with_options(&reg, ValidateOptions::default().with_max_depth(4));
        let r = v.validate_named("Node", &value).unwrap();
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].kind, ViolationKind::DepthExceeded);
        assert_eq!(r.violations[0].path.segments().len(), 5);
    }

    #[test]
    fn same_input_same_report() {
        let reg = registry();
        let value = json!({"state": "loading", "data": {"status": 1}, "error": "x", "extra": 0});
        let a = check(&reg, "Response", value.clone()).report().to_string();
        let b = check(&reg, "Response", value).report().to_string();
        assert_eq!(a, b);
        assert!(a.starts_with("failed (3 violations)"));
    }

    #[test]
    fn batch_keeps_input_order() {
        let reg = registry().seal();
        let values = vec![
            json!({"state": "loading"}),
            json!({"state": "success"}),
            json!({"state": "error", "error": "boom"}),
        ];
        let results = Validator::new(&reg).validate_batch("Response", &values).unwrap();
        let oks: Vec<_> = results.iter().map(|r| r.ok).collect();
        assert_eq!(oks, [true, false, true]);
        assert_eq!(
            Validator::new(&reg).validate_batch("Nope", &values),
            Err(LookupError::NotFound("Nope".into()))
        );
    }
}
