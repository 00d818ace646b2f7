//! Descriptor Loading
//!
//! An in-memory [`TypeSource`] backed by JSON descriptor documents. A document
//! holds either a single type descriptor or an array of them.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

use super::{TypeDescriptor, TypeSource};
use crate::error::{MetatypeError, Result, SourceError};

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorDocument {
    Many(Vec<TypeDescriptor>),
    One(Box<TypeDescriptor>),
}

/// Type source holding descriptors by fully qualified name
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypeSource {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl InMemoryTypeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from descriptors, rejecting duplicate names
    pub fn with_types(types: impl IntoIterator<Item = TypeDescriptor>) -> Result<Self> {
        let mut source = Self::new();
        for ty in types {
            source.insert(ty)?;
        }
        Ok(source)
    }

    /// Register a descriptor
    pub fn insert(&mut self, ty: TypeDescriptor) -> Result<()> {
        if self.types.contains_key(&ty.name) {
            return Err(MetatypeError::DuplicateType(ty.name));
        }
        self.types.insert(ty.name.clone(), Arc::new(ty));
        Ok(())
    }

    /// Parse a JSON descriptor document and register its types
    pub fn add_json(&mut self, json: &str) -> Result<usize> {
        let types = match serde_json::from_str::<DescriptorDocument>(json)? {
            DescriptorDocument::Many(types) => types,
            DescriptorDocument::One(ty) => vec![*ty],
        };
        let count = types.len();
        for ty in types {
            self.insert(ty)?;
        }
        Ok(count)
    }

    /// Build a source from a single JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let mut source = Self::new();
        source.add_json(json)?;
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

impl TypeSource for InMemoryTypeSource {
    fn resolve(&self, name: &str) -> std::result::Result<Option<Arc<TypeDescriptor>>, SourceError> {
        Ok(self.types.get(name).cloned())
    }
}

/// Load descriptors from a single JSON file
pub fn load_from_file(path: &Path) -> Result<InMemoryTypeSource> {
    let mut source = InMemoryTypeSource::new();
    add_file(&mut source, path)?;
    Ok(source)
}

/// Load every `*.json` descriptor file below a directory
pub fn load_from_directory(dir: &Path) -> Result<InMemoryTypeSource> {
    let mut source = InMemoryTypeSource::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        add_file(&mut source, path)?;
    }

    debug!(types = source.len(), dir = %dir.display(), "loaded type descriptors");
    Ok(source)
}

fn add_file(source: &mut InMemoryTypeSource, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    source
        .add_json(&content)
        .map_err(|e| match e {
            MetatypeError::Json(err) => MetatypeError::InvalidDescriptor {
                path: path.display().to_string(),
                reason: err.to_string(),
            },
            other => other,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeKind;

    #[test]
    fn test_single_and_array_documents() {
        let mut source = InMemoryTypeSource::new();
        let added = source
            .add_json(r#"{"name": "com.acme.A", "kind": "interface"}"#)
            .unwrap();
        assert_eq!(added, 1);
        let added = source
            .add_json(r#"[{"name": "com.acme.B"}, {"name": "com.acme.C", "kind": "enum"}]"#)
            .unwrap();
        assert_eq!(added, 2);

        let c = source.resolve("com.acme.C").unwrap().unwrap();
        assert_eq!(c.kind, TypeKind::Enum);
        assert!(source.resolve("com.acme.Missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = InMemoryTypeSource::with_types(vec![
            TypeDescriptor::new("com.acme.A", TypeKind::Interface),
            TypeDescriptor::new("com.acme.A", TypeKind::Class),
        ]);
        assert!(matches!(result, Err(MetatypeError::DuplicateType(name)) if name == "com.acme.A"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"name": "com.acme.A", "kind": "interface"}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested/b.json"),
            r#"[{"name": "com.acme.B", "kind": "annotation"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = load_from_directory(dir.path()).unwrap();
        assert_eq!(source.len(), 2);
        assert!(source.contains("com.acme.B"));
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        match load_from_file(&path) {
            Err(MetatypeError::InvalidDescriptor { path: p, .. }) => assert!(p.ends_with("broken.json")),
            other => panic!("Expected InvalidDescriptor, got {:?}", other),
        }
    }
}
