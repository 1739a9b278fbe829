use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

use crate::decl::DeclDocument;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow!("at JSON path {path} → {}", err.into_inner())
    })
}

/// Parse a `{ "types": [...] }` declaration document.
pub fn decl_document_from_str(src: &str) -> Result<DeclDocument> {
    from_str_with_path::<DeclDocument>(src)
}
