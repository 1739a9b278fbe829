use serde_json::{Map, Value};

use super::Walk;
use crate::decl::{value_kind, FieldSpec, ProductType};
use crate::violation::{Path, ViolationKind};

pub(super) fn check_product(w: &mut Walk<'_>, p: &ProductType, value: &Value, path: &Path, depth: usize) {
    let Some(map) = value.as_object() else {
        w.mismatch(path, format!("expected object `{}`, got {}", p.name, value_kind(value)));
        return;
    };

    check_fields(w, &p.fields, true, map, path, depth);

    // closed world
    for key in map.keys() {
        if !p.fields.iter().any(|f| &f.name == key) {
            w.out.push(
                &path.child(key),
                ViolationKind::UnexpectedField,
                format!("`{key}` is not a field of `{}`", p.name),
            );
        }
    }
}

/// Presence and type of each declared field, in declaration order.
/// Undeclared keys are left to the caller.
pub(super) fn check_fields(
    w: &mut Walk<'_>,
    fields: &[FieldSpec],
    honor_optional: bool,
    map: &Map<String, Value>,
    path: &Path,
    depth: usize,
) {
    let null_is_absent = w.options.null_is_absent();
    for spec in fields {
        let skippable = honor_optional && spec.optional;
        let child = path.child(&spec.name);
        match map.get(&spec.name) {
            None if skippable => {}
            Some(Value::Null) if skippable && null_is_absent => {}
            None => {
                w.out.push(
                    &child,
                    ViolationKind::MissingField,
                    format!("required field `{}` ({}) is absent", spec.name, spec.type_ref),
                );
            }
            Some(sub) => w.check_ref(&spec.type_ref, sub, &child, depth + 1),
        }
    }
}
