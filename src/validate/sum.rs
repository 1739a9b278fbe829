use serde_json::Value;

use super::{product, Walk};
use crate::decl::{value_kind, SumType};
use crate::discriminate::discriminate;
use crate::violation::{Path, ViolationKind};

pub(super) fn check_sum(w: &mut Walk<'_>, s: &SumType, value: &Value, path: &Path, depth: usize) {
    let variant = match discriminate(s, value) {
        Ok(v) => v,
        Err(error) => {
            let got = match value {
                Value::Object(_) => String::new(),
                other => format!(" (got {})", value_kind(other)),
            };
            w.out.push(
                &path.child(&s.discriminant_field),
                ViolationKind::InvalidDiscriminant,
                format!("{error}{got}; expected one of {}", tag_list(s.variants.iter().map(|v| v.tag.as_str()))),
            );
            return;
        }
    };
    // a discriminant was found, so the value is an object
    let Some(map) = value.as_object() else { return };

    let honor_optional = w.options.honors_optional_in_variants();
    product::check_fields(w, &variant.fields, honor_optional, map, path, depth);

    // Fields of the variants not chosen must be absent; anything else is a stranger.
    for key in map.keys() {
        if key == &s.discriminant_field || variant.declares(key) {
            continue;
        }
        let owners: Vec<&str> = s
            .variants
            .iter()
            .filter(|v| v.declares(key))
            .map(|v| v.tag.as_str())
            .collect();
        if owners.is_empty() {
            w.out.push(
                &path.child(key),
                ViolationKind::UnexpectedField,
                format!("`{key}` is not a field of `{}::{}`", s.name, variant.tag),
            );
        } else {
            w.out.push(
                &path.child(key),
                ViolationKind::ExtraneousVariantField,
                format!(
                    "`{key}` belongs to {} of `{}`, not `{}`",
                    tag_list(owners.into_iter()),
                    s.name,
                    variant.tag
                ),
            );
        }
    }
}

fn tag_list<'a>(tags: impl Iterator<Item = &'a str>) -> String {
    tags.map(|t| format!("`{t}`")).collect::<Vec<_>>().join(", ")
}
