//! Append-only store of declared types, keyed by name.
//!
//! Setup happens through `&mut Registry`; `seal` then freezes it into a cheaply
//! clonable snapshot that many validating threads can read at once.
use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::decl::{FieldSpec, TypeDecl, TypeName};
use crate::error::{LookupError, RegistrationError};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    decls: IndexMap<TypeName, TypeDecl>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    /// Store `decl` if it is well-formed and every name it mentions is either
    /// already registered or the declaration itself.
    pub fn register(&mut self, decl: impl Into<TypeDecl>) -> Result<(), RegistrationError> {
        let decl = decl.into();
        let name = decl.name();

        if !crate::options::is_valid_type_name(name.as_str()) {
            return Err(RegistrationError::InvalidName(name.to_string()));
        }
        if self.decls.contains_key(name) {
            return Err(RegistrationError::DuplicateName(name.clone()));
        }
        check_shape(&decl)?;
        for (field, target) in decl.references() {
            if target != name && !self.decls.contains_key(target) {
                return Err(RegistrationError::UnresolvedReference {
                    owner: name.clone(),
                    field: field.to_owned(),
                    missing: target.clone(),
                });
            }
        }

        log::debug!("registered {} `{}`", decl.kind_label(), name);
        self.decls.insert(name.clone(), decl);
        Ok(())
    }

    /// Register a batch whose members may refer to each other in any order.
    ///
    /// Each step takes the first pending declaration whose references are all
    /// satisfied; when none is, the first pending one is attempted so its error
    /// surfaces. Stops at the first error; earlier members stay registered.
    pub fn register_all<I>(&mut self, decls: I) -> Result<usize, RegistrationError>
    where
        I: IntoIterator<Item = TypeDecl>,
    {
        let mut pending: Vec<TypeDecl> = decls.into_iter().collect();
        let mut registered = 0;
        while !pending.is_empty() {
            let ready = pending.iter().position(|d| {
                d.references()
                    .iter()
                    .all(|(_, target)| *target == d.name() || self.decls.contains_key(*target))
            });
            let next = pending.remove(ready.unwrap_or(0));
            self.register(next)?;
            registered += 1;
        }
        Ok(registered)
    }

    pub fn resolve(&self, name: &str) -> Result<&TypeDecl, LookupError> {
        self.decls
            .get(name)
            .ok_or_else(|| LookupError::NotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool { self.decls.contains_key(name) }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &TypeName> { self.decls.keys() }

    pub fn decls(&self) -> impl Iterator<Item = &TypeDecl> { self.decls.values() }

    pub fn len(&self) -> usize { self.decls.len() }

    pub fn is_empty(&self) -> bool { self.decls.is_empty() }

    /// End the setup phase.
    pub fn seal(self) -> SealedRegistry {
        log::debug!("sealed registry with {} type(s)", self.decls.len());
        SealedRegistry(Arc::new(self))
    }
}

/// Read-only, shareable registry. Derefs to [`Registry`] for lookups and
/// validation, but offers no way to register.
#[derive(Debug, Clone)]
pub struct SealedRegistry(Arc<Registry>);

impl Deref for SealedRegistry {
    type Target = Registry;
    fn deref(&self) -> &Registry { &self.0 }
}

// ------------------------------ Well-formedness --------------------------- //

fn check_shape(decl: &TypeDecl) -> Result<(), RegistrationError> {
    match decl {
        TypeDecl::Primitive(_) => Ok(()),
        TypeDecl::Product(p) => unique_fields(p.name.as_str(), &p.fields),
        TypeDecl::Sum(s) => {
            if s.variants.is_empty() {
                return Err(RegistrationError::EmptySum(s.name.clone()));
            }
            let mut tags = HashSet::new();
            for v in &s.variants {
                if !tags.insert(v.tag.as_str()) {
                    return Err(RegistrationError::DuplicateTag {
                        owner: s.name.clone(),
                        tag: v.tag.clone(),
                    });
                }
                if v.declares(&s.discriminant_field) {
                    return Err(RegistrationError::DiscriminantCollision {
                        owner: s.name.clone(),
                        tag: v.tag.clone(),
                        field: s.discriminant_field.clone(),
                    });
                }
                unique_fields(&format!("{}::{}", s.name, v.tag), &v.fields)?;
            }
            Ok(())
        }
    }
}

fn unique_fields(scope: &str, fields: &[FieldSpec]) -> Result<(), RegistrationError> {
    let mut seen = HashSet::new();
    for f in fields {
        if !seen.insert(f.name.as_str()) {
            return Err(RegistrationError::DuplicateField {
                scope: scope.to_owned(),
                field: f.name.clone(),
            });
        }
    }
    Ok(())
}

// ------------------------------- Tests ------------------------------------ //
