//! Declaration IR: products, sums and named primitive aliases.
//!
//! Declarations reference each other by name only (`TypeRef::Named`), never by
//! embedding, so a type may mention itself without becoming infinitely sized.
//! The registry is the arena; a name is the index into it.
use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// NAMES & PRIMITIVES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str { &self.0 }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self { Self(s) }
}

/// Scalar kinds understood without any declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    /// A JSON number representable as `i64` or `u64`.
    Integer,
    /// Any JSON number, integral or not.
    Number,
    Boolean,
    Null,
    /// Opaque payload; every value conforms.
    Any,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::String,
        PrimitiveKind::Integer,
        PrimitiveKind::Number,
        PrimitiveKind::Boolean,
        PrimitiveKind::Null,
        PrimitiveKind::Any,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::String  => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number  => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null    => "null",
            PrimitiveKind::Any     => "any",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn accepts(self, v: &Value) -> bool {
        match (self, v) {
            (PrimitiveKind::Any, _) => true,
            (PrimitiveKind::String, Value::String(_)) => true,
            (PrimitiveKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (PrimitiveKind::Number, Value::Number(_)) => true,
            (PrimitiveKind::Boolean, Value::Bool(_)) => true,
            (PrimitiveKind::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Runtime kind of a candidate value, as used in mismatch details.
pub fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(n) => if n.is_i64() || n.is_u64() { "integer" } else { "number" },
        Value::String(_) => "string",
        Value::Array(_)  => "list",
        Value::Object(_) => "object",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD TYPES
// ————————————————————————————————————————————————————————————————————————————

/// What a field holds. Written in declaration documents as a primitive keyword
/// (`"string"`), a type name (`"Payload"`), or `{"list": <ref>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTypeRef", into = "RawTypeRef")]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Named(TypeName),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<TypeName>) -> Self { TypeRef::Named(name.into()) }
    pub fn list(item: impl Into<TypeRef>) -> Self { TypeRef::List(Box::new(item.into())) }

    /// The declared type this reference ultimately points at, looking through lists.
    pub fn target_name(&self) -> Option<&TypeName> {
        match self {
            TypeRef::Primitive(_) => None,
            TypeRef::Named(name) => Some(name),
            TypeRef::List(item) => item.target_name(),
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(k: PrimitiveKind) -> Self { TypeRef::Primitive(k) }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(k) => write!(f, "{k}"),
            TypeRef::Named(n) => write!(f, "{n}"),
            TypeRef::List(item) => write!(f, "list<{item}>"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTypeRef {
    Name(String),
    List { list: Box<TypeRef> },
}

impl From<RawTypeRef> for TypeRef {
    fn from(raw: RawTypeRef) -> Self {
        match raw {
            RawTypeRef::Name(s) => match PrimitiveKind::from_keyword(&s) {
                Some(k) => TypeRef::Primitive(k),
                None => TypeRef::Named(TypeName(s)),
            },
            RawTypeRef::List { list } => TypeRef::List(list),
        }
    }
}

impl From<TypeRef> for RawTypeRef {
    fn from(ty: TypeRef) -> Self {
        match ty {
            TypeRef::Primitive(k) => RawTypeRef::Name(k.as_str().to_owned()),
            TypeRef::Named(n) => RawTypeRef::Name(n.0),
            TypeRef::List(item) => RawTypeRef::List { list: item },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Legacy encodings only; variant fields ignore this in strict mode.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

fn is_false(b: &bool) -> bool { !*b }

impl FieldSpec {
    pub fn required(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self { name: name.into(), type_ref: type_ref.into(), optional: false }
    }
    pub fn optional(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self { name: name.into(), type_ref: type_ref.into(), optional: true }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

/// Cartesian composition: every field present at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductType {
    pub name: TypeName,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ProductType {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldSpec::required(name, ty));
        self
    }
    pub fn optional_field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldSpec::optional(name, ty));
        self
    }
}

/// One alternative of a sum. Its fields exist if and only if it is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variant {
    pub tag: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl Variant {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), fields: Vec::new() }
    }
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldSpec::required(name, ty));
        self
    }
    pub fn optional_field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldSpec::optional(name, ty));
        self
    }
    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

/// Disjoint union tagged by `discriminant_field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SumType {
    pub name: TypeName,
    #[serde(rename = "discriminant")]
    pub discriminant_field: String,
    pub variants: Vec<Variant>,
}

impl SumType {
    pub fn new(name: impl Into<TypeName>, discriminant_field: impl Into<String>) -> Self {
        Self { name: name.into(), discriminant_field: discriminant_field.into(), variants: Vec::new() }
    }
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }
    pub fn variant_by_tag(&self, tag: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.tag == tag)
    }
}

/// A name for a bare scalar kind, e.g. `Status = string`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrimitiveAlias {
    pub name: TypeName,
    pub of: PrimitiveKind,
}

impl PrimitiveAlias {
    pub fn new(name: impl Into<TypeName>, of: PrimitiveKind) -> Self {
        Self { name: name.into(), of }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDecl {
    Product(ProductType),
    Sum(SumType),
    Primitive(PrimitiveAlias),
}

impl TypeDecl {
    pub fn name(&self) -> &TypeName {
        match self {
            TypeDecl::Product(p) => &p.name,
            TypeDecl::Sum(s) => &s.name,
            TypeDecl::Primitive(a) => &a.name,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            TypeDecl::Product(_) => "product",
            TypeDecl::Sum(_) => "sum",
            TypeDecl::Primitive(_) => "primitive",
        }
    }

    /// Every `(field, referenced type)` pair, in declaration order.
    pub fn references(&self) -> Vec<(&str, &TypeName)> {
        let fields: Box<dyn Iterator<Item = &FieldSpec> + '_> = match self {
            TypeDecl::Product(p) => Box::new(p.fields.iter()),
            TypeDecl::Sum(s) => Box::new(s.variants.iter().flat_map(|v| v.fields.iter())),
            TypeDecl::Primitive(_) => Box::new(std::iter::empty()),
        };
        fields
            .filter_map(|f| f.type_ref.target_name().map(|n| (f.name.as_str(), n)))
            .collect()
    }
}

impl From<ProductType> for TypeDecl {
    fn from(p: ProductType) -> Self { TypeDecl::Product(p) }
}

impl From<SumType> for TypeDecl {
    fn from(s: SumType) -> Self { TypeDecl::Sum(s) }
}

impl From<PrimitiveAlias> for TypeDecl {
    fn from(a: PrimitiveAlias) -> Self { TypeDecl::Primitive(a) }
}

/// On-disk shape of a declaration file: `{ "types": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclDocument {
    pub types: Vec<TypeDecl>,
}

// ------------------------------- Tests ------------------------------------ //
