//! Object class definition extraction
//!
//! [`OcdReader`] turns a type marked as an object class into an [`OcdDef`].
//! The root is visited first, then each reachable ancestor interface once;
//! every visited type contributes its members as attribute definitions.
//!
//! ```ignore
//! let reader = OcdReader::new(&source).with_options(Options::default().with(ExtractOption::Nested));
//! let extraction = reader.extract("com.acme.ServerConfig");
//! ```

pub mod collector;
pub mod mapping;
pub mod naming;
pub mod walker;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::descriptor::{TypeDescriptor, TypeSource};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Reporter};
use crate::extension::{ExtensionRecognizer, NoExtensions};
use crate::schema::OcdDef;
use crate::version::MetatypeVersion;

use collector::{ExtractionContext, OcdState, TypeCollector};
use walker::InheritanceWalker;

/// Package prefixes whose interfaces are never walked
pub const DEFAULT_PLATFORM_PACKAGES: [&str; 1] = ["java."];

/// Whether `name` lives under one of the platform package prefixes
pub fn is_platform(name: &str, platform_packages: &[String]) -> bool {
    platform_packages.iter().any(|p| name.starts_with(p.as_str()))
}

// =============================================================================
// Options
// =============================================================================

/// Extraction switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractOption {
    /// Accept interface-typed members as nested configuration
    Nested,
}

/// Set of enabled [`ExtractOption`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options(BTreeSet<ExtractOption>);

impl Options {
    pub fn with(mut self, option: ExtractOption) -> Self {
        self.0.insert(option);
        self
    }

    pub fn insert(&mut self, option: ExtractOption) {
        self.0.insert(option);
    }

    pub fn contains(&self, option: ExtractOption) -> bool {
        self.0.contains(&option)
    }

    pub fn nested(&self) -> bool {
        self.contains(ExtractOption::Nested)
    }
}

impl FromIterator<ExtractOption> for Options {
    fn from_iter<I: IntoIterator<Item = ExtractOption>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Result of extracting one root type
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    /// `None` when the root is not an object class
    pub ocd: Option<OcdDef>,
    pub diagnostics: Diagnostics,
}

impl Extraction {
    pub fn is_found(&self) -> bool {
        self.ocd.is_some()
    }
}

// =============================================================================
// OCD Reader
// =============================================================================

/// Reads object class definitions from a [`TypeSource`]
pub struct OcdReader<'a> {
    source: &'a dyn TypeSource,
    recognizer: &'a dyn ExtensionRecognizer,
    options: Options,
    min_version: MetatypeVersion,
    platform_packages: Vec<String>,
}

impl<'a> OcdReader<'a> {
    pub fn new(source: &'a dyn TypeSource) -> Self {
        Self {
            source,
            recognizer: &NoExtensions,
            options: Options::default(),
            min_version: MetatypeVersion::default(),
            platform_packages: DEFAULT_PLATFORM_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Lowest version the produced OCD may declare
    pub fn with_min_version(mut self, version: MetatypeVersion) -> Self {
        self.min_version = version;
        self
    }

    pub fn with_recognizer(mut self, recognizer: &'a dyn ExtensionRecognizer) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_platform_packages(mut self, packages: Vec<String>) -> Self {
        self.platform_packages = packages;
        self
    }

    /// Extract the OCD of `root`.
    ///
    /// Returns `None` if `root` does not carry an object-class marker, in
    /// which case no ancestor is looked at. Problems along the way go to
    /// `reporter`; they never abort the extraction.
    pub fn read(&self, root: &TypeDescriptor, reporter: &mut dyn Reporter) -> Option<OcdDef> {
        let ctx = ExtractionContext {
            source: self.source,
            recognizer: self.recognizer,
            options: &self.options,
            min_version: self.min_version,
            platform_packages: &self.platform_packages,
        };
        let mut state = OcdState::default();
        let root_name = root.name.as_str();

        let mut walker = InheritanceWalker::new(self.source, &self.platform_packages);
        walker.walk(root, reporter, &mut |ty, reporter| {
            let is_root = ty.name == root_name;
            let mut collector = TypeCollector::new(&ctx, &mut state, reporter, ty, is_root);
            ty.accept(&mut collector);
            state.ocd.is_some()
        });

        match &state.ocd {
            Some(ocd) => info!(
                id = %ocd.id,
                attributes = ocd.attributes.len(),
                version = %ocd.min_version,
                visited = walker.visited().len(),
                "extracted object class definition"
            ),
            None => debug!(type_name = root_name, "not an object class"),
        }
        state.ocd
    }

    /// Resolve `name` and extract its OCD
    pub fn read_type(&self, name: &str, reporter: &mut dyn Reporter) -> Option<OcdDef> {
        match self.source.resolve(name) {
            Ok(Some(root)) => self.read(&root, reporter),
            Ok(None) => {
                reporter.error(
                    DiagnosticCode::UnresolvedType,
                    format!("Could not find class {}", name),
                );
                None
            }
            Err(e) => {
                reporter.exception(
                    DiagnosticCode::SourceFailure,
                    &e,
                    format!("Could not load class {}", name),
                );
                None
            }
        }
    }

    /// Extract `name` into a self-contained [`Extraction`]
    pub fn extract(&self, name: &str) -> Extraction {
        let mut diagnostics = Diagnostics::new();
        let ocd = self.read_type(name, &mut diagnostics);
        Extraction { ocd, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{InMemoryTypeSource, Marker, MethodDecl, ObjectClassMarker, TypeKind};

    fn config_type(name: &str, parents: &[&str], marked: bool, members: &[(&str, &str)]) -> TypeDescriptor {
        let mut ty = TypeDescriptor::new(name, TypeKind::Interface);
        ty.interfaces = parents.iter().map(|p| p.to_string()).collect();
        if marked {
            ty.markers.push(Marker::ObjectClass(ObjectClassMarker::default()));
        }
        for (member, return_type) in members {
            ty.methods.push(MethodDecl {
                name: member.to_string(),
                return_type: return_type.to_string(),
                ..Default::default()
            });
        }
        ty
    }

    #[test]
    fn test_options() {
        let options = Options::default();
        assert!(!options.nested());
        let options = options.with(ExtractOption::Nested);
        assert!(options.nested());
        let collected: Options = [ExtractOption::Nested].into_iter().collect();
        assert_eq!(collected, options);
    }

    #[test]
    fn test_is_platform() {
        let packages = vec!["java.".to_string(), "org.vendor.".to_string()];
        assert!(is_platform("java.io.Serializable", &packages));
        assert!(is_platform("org.vendor.Base", &packages));
        assert!(!is_platform("com.acme.Config", &packages));
        assert!(!is_platform("javax.Thing", &packages[..1]));
    }

    #[test]
    fn test_ancestors_contribute_after_root() {
        let source = InMemoryTypeSource::with_types(vec![
            config_type("com.acme.Config", &["com.acme.Base"], true, &[("port", "int")]),
            config_type("com.acme.Base", &[], false, &[("host", "java.lang.String")]),
        ])
        .unwrap();

        let extraction = OcdReader::new(&source).extract("com.acme.Config");
        let ocd = extraction.ocd.unwrap();
        let ids: Vec<&str> = ocd.attributes.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["port", "host"]);
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_unmarked_root_does_not_walk() {
        let source = InMemoryTypeSource::with_types(vec![config_type(
            "com.acme.Config",
            &["com.acme.Missing"],
            false,
            &[("port", "int")],
        )])
        .unwrap();

        let extraction = OcdReader::new(&source).extract("com.acme.Config");
        assert!(!extraction.is_found());
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_root_reported() {
        let source = InMemoryTypeSource::new();
        let extraction = OcdReader::new(&source).extract("com.acme.Nope");
        assert!(extraction.ocd.is_none());
        assert!(extraction.diagnostics.contains(DiagnosticCode::UnresolvedType));
    }

    #[test]
    fn test_min_version_floor() {
        let source = InMemoryTypeSource::with_types(vec![config_type("com.acme.Config", &[], true, &[])]).unwrap();
        let ocd = OcdReader::new(&source)
            .with_min_version(MetatypeVersion::V1_3)
            .extract("com.acme.Config")
            .ocd
            .unwrap();
        assert_eq!(ocd.min_version, MetatypeVersion::V1_3);
    }

    #[test]
    fn test_custom_platform_packages() {
        let source = InMemoryTypeSource::with_types(vec![
            config_type("com.acme.Config", &["org.vendor.Base"], true, &[]),
            config_type("org.vendor.Base", &[], false, &[("ignored", "int")]),
        ])
        .unwrap();

        let ocd = OcdReader::new(&source)
            .with_platform_packages(vec!["java.".to_string(), "org.vendor.".to_string()])
            .extract("com.acme.Config")
            .ocd
            .unwrap();
        assert!(ocd.attributes.is_empty());
    }
}
