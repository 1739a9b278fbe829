use thiserror::Error;

use crate::decl::TypeName;

/// Why a declaration was refused. Nothing is stored when any of these occur.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("type `{0}` is already registered")]
    DuplicateName(TypeName),

    #[error("`{owner}` field `{field}` refers to unknown type `{missing}`")]
    UnresolvedReference {
        owner: TypeName,
        field: String,
        missing: TypeName,
    },

    #[error("`{0}` is not a valid type name")]
    InvalidName(String),

    /// `scope` is the type name, or `Type::tag` for a variant.
    #[error("`{scope}` declares field `{field}` more than once")]
    DuplicateField { scope: String, field: String },

    #[error("sum `{owner}` declares variant `{tag}` more than once")]
    DuplicateTag { owner: TypeName, tag: String },

    #[error("variant `{owner}::{tag}` declares a field named like the discriminant `{field}`")]
    DiscriminantCollision {
        owner: TypeName,
        tag: String,
        field: String,
    },

    #[error("sum `{0}` declares no variants")]
    EmptySum(TypeName),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no type named `{0}` is registered")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscriminationError {
    /// Holds the name of the discriminant field that was looked for.
    #[error("discriminant field `{0}` is absent")]
    MissingDiscriminant(String),

    /// Holds the discriminant value that matched no tag.
    #[error("`{0}` is not a variant tag")]
    UnknownVariant(String),
}
