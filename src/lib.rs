//! Metatype Schemas
//!
//! Extracts component-configuration schemas (object class definitions) from
//! structural descriptions of compiled interface and annotation types.
//!
//! ## Features
//!
//! - **Inheritance**: attributes of ancestor interfaces are merged, each visited once
//! - **Type Mapping**: arrays, collections, primitives, enums and nested types
//! - **Property Naming**: identifier mangling, prefixes, single-element annotations
//! - **Version Watermark**: the lowest metatype revision the output needs
//! - **Diagnostics**: problems are reported, never fatal
//!
//! ## Architecture
//!
//! ```text
//! TypeSource ──► OcdReader ──► InheritanceWalker ──► TypeCollector (per type)
//!                                                      ├── TypeMapper
//!                                                      ├── naming
//!                                                      └── ExtensionRecognizer
//!                    │
//!                    └──► OcdDef + Diagnostics
//! ```

pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod extension;
pub mod metatype;
pub mod schema;
pub mod version;

pub use config::{MetatypeConfig, OutputFormat};
pub use descriptor::{InMemoryTypeSource, TypeDescriptor, TypeSource};
pub use diagnostics::{DiagnosticCode, Diagnostics, Reporter, Severity};
pub use error::{MetatypeError, Result, SourceError};
pub use extension::{ExtensionAttribute, ExtensionRecognizer, MarkerRecognizer, NoExtensions};
pub use metatype::{ExtractOption, Extraction, OcdReader, Options};
pub use schema::{AdDef, AttributeType, Cardinality, OcdDef};
pub use version::MetatypeVersion;
