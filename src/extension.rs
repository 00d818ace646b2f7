//! Extension attributes
//!
//! Markers the engine does not interpret may be claimed by a recognizer and
//! carried into the schema as namespaced extension attributes on the OCD or
//! on an attribute definition.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::descriptor::{AnnotationMarker, ConstantValue};

/// Namespaced attributes contributed by one extension marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAttribute {
    /// Marker type that produced the attributes
    pub marker: String,
    pub namespace: String,
    pub prefix: String,
    pub attributes: BTreeMap<String, String>,
}

/// Decides whether a marker is an extension attribute
pub trait ExtensionRecognizer {
    fn recognize(&self, marker: &AnnotationMarker) -> Option<ExtensionAttribute>;
}

/// Recognizer that claims nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensions;

impl ExtensionRecognizer for NoExtensions {
    fn recognize(&self, _marker: &AnnotationMarker) -> Option<ExtensionAttribute> {
        None
    }
}

#[derive(Debug, Clone)]
struct Registration {
    namespace: String,
    prefix: String,
}

/// Recognizer driven by a table of registered marker types
#[derive(Debug, Clone, Default)]
pub struct MarkerRecognizer {
    registrations: HashMap<String, Registration>,
}

impl MarkerRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a marker type under an XML namespace and prefix
    pub fn register(
        &mut self,
        marker: impl Into<String>,
        namespace: impl Into<String>,
        prefix: impl Into<String>,
    ) -> &mut Self {
        self.registrations.insert(
            marker.into(),
            Registration {
                namespace: namespace.into(),
                prefix: prefix.into(),
            },
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl ExtensionRecognizer for MarkerRecognizer {
    fn recognize(&self, marker: &AnnotationMarker) -> Option<ExtensionAttribute> {
        let registration = self.registrations.get(&marker.type_name)?;
        let attributes = marker
            .values
            .iter()
            .map(|(name, value)| (name.clone(), attribute_value(value)))
            .collect();
        Some(ExtensionAttribute {
            marker: marker.type_name.clone(),
            namespace: registration.namespace.clone(),
            prefix: registration.prefix.clone(),
            attributes,
        })
    }
}

// Arrays become comma separated lists
fn attribute_value(value: &ConstantValue) -> String {
    match value {
        ConstantValue::Array(values) => values
            .iter()
            .map(attribute_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
