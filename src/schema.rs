//! Object-class schema model
//!
//! Output of an extraction: one [`OcdDef`] per configurable component type,
//! owning its attribute definitions, designations and icons. The model is
//! serializable so it can be handed to a metatype document writer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extension::ExtensionAttribute;
use crate::version::MetatypeVersion;

// =============================================================================
// Attribute Type
// =============================================================================

/// Schema type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Boolean,
    Byte,
    #[serde(rename = "Character")]
    Char,
    Short,
    #[serde(rename = "Integer")]
    Int,
    Long,
    Float,
    Double,
    String,
}

impl AttributeType {
    /// Name used in metatype documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Char => "Character",
            Self::Short => "Short",
            Self::Int => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Cardinality
// =============================================================================

/// Attribute multiplicity.
///
/// `0` is a scalar, a positive value a bounded array, `i32::MAX` an unbounded
/// array, and a negative value a vector (collection); `i32::MIN` is an
/// unbounded vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cardinality(pub i32);

impl Cardinality {
    pub const SCALAR: Cardinality = Cardinality(0);
    pub const UNBOUNDED_ARRAY: Cardinality = Cardinality(i32::MAX);
    pub const VECTOR: Cardinality = Cardinality(i32::MIN);

    pub fn is_scalar(&self) -> bool {
        self.0 == 0
    }

    pub fn is_vector(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Option / Designate / Icon
// =============================================================================

/// A label/value choice offered for an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDef {
    pub label: String,
    pub value: String,
}

impl OptionDef {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Binding of a configuration pid to an object-class definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignateDef {
    /// Id of the bound OCD
    pub ocd_ref: String,
    pub pid: String,
    /// Factory-style binding (`factoryPid`)
    pub factory: bool,
}

/// An icon resource for an OCD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconDef {
    pub resource: String,
    pub size: i32,
}

// =============================================================================
// Attribute Definition
// =============================================================================

/// Schema of one configuration attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdDef {
    /// Property key
    pub id: String,
    /// Human readable label
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` when the declared type could not be mapped (always reported)
    #[serde(rename = "type")]
    pub attribute_type: Option<AttributeType>,
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Vec<String>>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionAttribute>,
}

impl Default for AdDef {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: None,
            attribute_type: None,
            cardinality: Cardinality::SCALAR,
            min: None,
            max: None,
            defaults: None,
            required: true,
            options: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

// =============================================================================
// Object Class Definition
// =============================================================================

/// Schema of a configurable component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcdDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub localization: String,
    pub attributes: Vec<AdDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub designates: Vec<DesignateDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<IconDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionAttribute>,
    /// Lowest metatype revision able to express this schema
    pub min_version: MetatypeVersion,
}

impl OcdDef {
    /// Create an OCD with the given identity and version floor
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        localization: impl Into<String>,
        min_version: MetatypeVersion,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            localization: localization.into(),
            attributes: Vec::new(),
            designates: Vec::new(),
            icons: Vec::new(),
            extensions: Vec::new(),
            min_version,
        }
    }

    /// Raise the version watermark; never lowers it
    pub fn update_version(&mut self, version: MetatypeVersion) {
        if version > self.min_version {
            self.min_version = version;
        }
    }

    /// Add a designation unless the same (pid, factory) pair is already bound
    pub fn add_designate(&mut self, pid: impl Into<String>, factory: bool) -> bool {
        let pid = pid.into();
        if self
            .designates
            .iter()
            .any(|d| d.pid == pid && d.factory == factory)
        {
            return false;
        }
        self.designates.push(DesignateDef {
            ocd_ref: self.id.clone(),
            pid,
            factory,
        });
        true
    }

    /// Get an attribute by property key
    pub fn attribute(&self, id: &str) -> Option<&AdDef> {
        self.attributes.iter().find(|ad| ad.id == id)
    }
}
