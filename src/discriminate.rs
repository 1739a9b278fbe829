//! Picking the one variant a value's discriminant names.
use serde_json::Value;

use crate::decl::{SumType, Variant};
use crate::error::DiscriminationError;

/// Tags are unique per sum, so this is a finite lookup that can only fail by
/// absence: of the discriminant, or of a matching tag. Never by ambiguity.
pub fn discriminate<'s>(sum: &'s SumType, value: &Value) -> Result<&'s Variant, DiscriminationError> {
    let field = sum.discriminant_field.as_str();
    let tag = value
        .as_object()
        .and_then(|map| map.get(field))
        .ok_or_else(|| DiscriminationError::MissingDiscriminant(field.to_owned()))?;

    let found = match tag {
        Value::String(s) => sum.variant_by_tag(s),
        _ => None,
    };
    match found {
        Some(variant) => {
            log::trace!("`{}` discriminated as `{}`", sum.name, variant.tag);
            Ok(variant)
        }
        None => Err(DiscriminationError::UnknownVariant(tag_text(tag))),
    }
}

fn tag_text(tag: &Value) -> String {
    match tag {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ------------------------------- Tests ------------------------------------ //
