//! Product and sum type declarations, and structural validation of JSON values
//! against them.
//!
//! ```text
//! Registry::register ──▶ Registry::seal ──▶ Validator::validate ──▶ report
//!                                   (discriminate for sums)
//! ```
pub mod decl;
pub mod error;
pub mod options;
pub mod registry;
pub mod discriminate;
pub mod violation;
pub mod report;
pub mod validate;
pub mod path_de;
pub mod jq_exec;
pub mod cli;

pub use decl::{
    DeclDocument, FieldSpec, PrimitiveAlias, PrimitiveKind, ProductType, SumType, TypeDecl, TypeName,
    TypeRef, Variant,
};
pub use discriminate::discriminate;
pub use error::{DiscriminationError, LookupError, RegistrationError};
pub use options::{ValidateOptions, ValidationMode};
pub use registry::{Registry, SealedRegistry};
pub use report::{report, Collector, FormattedReport};
pub use validate::{validate, validate_named, Validator};
pub use violation::{Path, PathSegment, ValidationResult, Violation, ViolationKind};
