//! Type Descriptors
//!
//! Structural facts about compiled types: kind flags, declared interfaces,
//! superclass, members and the declarative markers attached to them.
//!
//! A [`TypeSource`] resolves type names to descriptors. A descriptor replays
//! its declarations through a [`DeclarationVisitor`] in a fixed order:
//!
//! ```text
//! type_start
//!   marker*                         (type-level markers)
//!   (field marker* member_end)*
//!   (method marker* annotation_default? member_end)*
//! type_end
//! ```

pub mod loader;

pub use loader::{load_from_directory, load_from_file, InMemoryTypeSource};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::SourceError;
use crate::schema::{AttributeType, OptionDef};

/// Java primitive type names
pub const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Check whether a type name denotes a primitive
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Strip array markers and generic arguments: `java.util.List<java.lang.String>[]` → `java.util.List`
pub fn raw_type(descriptor: &str) -> &str {
    let raw = descriptor.trim_end_matches("[]");
    match raw.find('<') {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

/// Convert an object descriptor (`Ljava/lang/String;`) to a dotted name.
/// Names that are not object descriptors are returned unchanged.
pub fn object_descriptor_to_fqn(descriptor: &str) -> String {
    match descriptor
        .strip_prefix('L')
        .and_then(|d| d.strip_suffix(';'))
    {
        Some(inner) => inner.replace('/', "."),
        None => descriptor.to_string(),
    }
}

// =============================================================================
// Type Source
// =============================================================================

/// Resolves type names to their structural facts.
///
/// `Ok(None)` means the type is not known to the source.
pub trait TypeSource {
    fn resolve(&self, name: &str) -> Result<Option<Arc<TypeDescriptor>>, SourceError>;
}

// =============================================================================
// Constant Values
// =============================================================================

/// A compile-time constant (field constant or annotation element default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class literal, by fully qualified name
    Type(String),
    /// An enum constant
    Enum { type_name: String, constant: String },
    Array(Vec<ConstantValue>),
}

impl ConstantValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

// Float text as the JVM prints it: plain within [1e-3, 1e7), else `1.5E-5`.
// `plain` is the Debug rendering, `scientific` the LowerExp rendering.
fn java_float(value: f64, plain: String, scientific: String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return plain;
    }
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::Short(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Float(v) => f.write_str(&java_float(f64::from(*v), format!("{:?}", v), format!("{:e}", v))),
            Self::Double(v) => f.write_str(&java_float(*v, format!("{:?}", v), format!("{:e}", v))),
            Self::String(v) => f.write_str(v),
            Self::Type(name) => f.write_str(name),
            Self::Enum { constant, .. } => f.write_str(constant),
            Self::Array(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

// =============================================================================
// Markers
// =============================================================================

/// A declarative marker (annotation) attached to a type or member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    /// Declares the type as an object-class definition
    ObjectClass(ObjectClassMarker),
    /// Overrides computed attribute metadata for a member
    AttributeDefinition(AttributeMarker),
    /// Any other marker; may be claimed as an extension attribute
    Other(AnnotationMarker),
}

/// Object-class marker. Only explicitly set elements are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectClassMarker {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub localization: Option<String>,
    pub pid: Option<Vec<String>>,
    pub factory_pid: Option<Vec<String>>,
    pub icon: Option<Vec<IconMarker>>,
}

/// Icon entry of an object-class marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconMarker {
    pub resource: String,
    pub size: i32,
}

/// Attribute-definition marker. Only explicitly set elements are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeMarker {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub attribute_type: Option<AttributeType>,
    pub cardinality: Option<i32>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub default_value: Option<Vec<String>>,
    pub required: Option<bool>,
    pub options: Option<Vec<OptionDef>>,
}

/// A marker the engine does not interpret itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMarker {
    /// Fully qualified name of the marker type
    pub type_name: String,
    /// Explicitly set elements
    #[serde(default)]
    pub values: BTreeMap<String, ConstantValue>,
}

// =============================================================================
// Members
// =============================================================================

/// A declared field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDecl {
    pub name: String,
    /// Declared type, fully qualified
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_static: bool,
    pub is_final: bool,
    /// Field is a constant of its declaring enum
    pub is_enum_constant: bool,
    pub constant: Option<ConstantValue>,
    pub markers: Vec<Marker>,
}

/// A declared method (or annotation element)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDecl {
    pub name: String,
    /// Generic return type, e.g. `java.util.List<java.lang.String>` or `int[]`
    pub return_type: String,
    pub parameters: Vec<String>,
    pub is_static: bool,
    pub is_constructor: bool,
    /// Annotation element default
    pub default_value: Option<ConstantValue>,
    pub markers: Vec<Marker>,
}

impl MethodDecl {
    /// Return type with array markers and generic arguments removed
    pub fn element_type(&self) -> &str {
        raw_type(&self.return_type)
    }
}

// =============================================================================
// Type Descriptor
// =============================================================================

/// Kind of a compiled type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Annotation,
    Enum,
}

/// Structural facts about one compiled type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDescriptor {
    /// Fully qualified name (`com.acme.Outer$Inner`)
    pub name: String,
    pub kind: TypeKind,
    /// Declared abstract (interfaces are always abstract)
    pub is_abstract: bool,
    pub interfaces: Vec<String>,
    pub superclass: Option<String>,
    pub public_no_arg_constructor: bool,
    pub markers: Vec<Marker>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Interfaces and annotation types
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }

    pub fn is_annotation(&self) -> bool {
        self.kind == TypeKind::Annotation
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract || self.is_interface()
    }

    /// Name without package or enclosing types
    pub fn simple_name(&self) -> &str {
        let start = self
            .name
            .rfind(|c: char| c == '.' || c == '$')
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.name[start..]
    }

    /// Names of the enum constants, in declaration order
    pub fn enum_constants(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_enum_constant)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Replay this type's declarations through a visitor
    pub fn accept(&self, visitor: &mut dyn DeclarationVisitor) {
        if !visitor.type_start(self) {
            return;
        }
        for marker in &self.markers {
            visitor.marker(marker);
        }
        for field in &self.fields {
            visitor.field(field);
            for marker in &field.markers {
                visitor.marker(marker);
            }
            visitor.member_end();
        }
        for method in &self.methods {
            visitor.method(method);
            for marker in &method.markers {
                visitor.marker(marker);
            }
            if let Some(value) = &method.default_value {
                visitor.annotation_default(method, value);
            }
            visitor.member_end();
        }
        visitor.type_end();
    }
}

// =============================================================================
// Declaration Visitor
// =============================================================================

/// Callbacks invoked while a type's declarations are replayed
pub trait DeclarationVisitor {
    /// Return `false` to skip the type
    fn type_start(&mut self, _ty: &TypeDescriptor) -> bool {
        true
    }
    fn field(&mut self, _field: &FieldDecl) {}
    fn method(&mut self, _method: &MethodDecl) {}
    /// A marker on the type, or on the current member between
    /// `field`/`method` and `member_end`
    fn marker(&mut self, _marker: &Marker) {}
    fn annotation_default(&mut self, _method: &MethodDecl, _value: &ConstantValue) {}
    fn member_end(&mut self) {}
    fn type_end(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl DeclarationVisitor for Recorder {
        fn type_start(&mut self, ty: &TypeDescriptor) -> bool {
            self.events.push(format!("start {}", ty.name));
            true
        }
        fn field(&mut self, field: &FieldDecl) {
            self.events.push(format!("field {}", field.name));
        }
        fn method(&mut self, method: &MethodDecl) {
            self.events.push(format!("method {}", method.name));
        }
        fn marker(&mut self, _marker: &Marker) {
            self.events.push("marker".to_string());
        }
        fn annotation_default(&mut self, method: &MethodDecl, value: &ConstantValue) {
            self.events.push(format!("default {}={}", method.name, value));
        }
        fn member_end(&mut self) {
            self.events.push("end".to_string());
        }
        fn type_end(&mut self) {
            self.events.push("type_end".to_string());
        }
    }

    #[test]
    fn test_accept_replays_in_declaration_order() {
        let mut ty = TypeDescriptor::new("com.acme.Config", TypeKind::Annotation);
        ty.markers.push(Marker::ObjectClass(ObjectClassMarker::default()));
        ty.fields.push(FieldDecl {
            name: "PREFIX_".to_string(),
            ..Default::default()
        });
        ty.methods.push(MethodDecl {
            name: "port".to_string(),
            return_type: "int".to_string(),
            default_value: Some(ConstantValue::Int(8080)),
            ..Default::default()
        });

        let mut recorder = Recorder::default();
        ty.accept(&mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "start com.acme.Config",
                "marker",
                "field PREFIX_",
                "end",
                "method port",
                "default port=8080",
                "end",
                "type_end",
            ]
        );
    }

    #[test]
    fn test_type_facts() {
        let ty = TypeDescriptor::new("com.acme.Outer$Inner", TypeKind::Annotation);
        assert_eq!(ty.simple_name(), "Inner");
        assert!(ty.is_interface());
        assert!(ty.is_abstract());
        assert!(!TypeDescriptor::new("Plain", TypeKind::Class).is_abstract());
        assert_eq!(TypeDescriptor::new("Plain", TypeKind::Class).simple_name(), "Plain");
    }

    #[test]
    fn test_element_type_strips_arrays_and_generics() {
        let method = MethodDecl {
            return_type: "java.util.List<java.lang.String>".to_string(),
            ..Default::default()
        };
        assert_eq!(method.element_type(), "java.util.List");
        let method = MethodDecl {
            return_type: "java.lang.Class[]".to_string(),
            ..Default::default()
        };
        assert_eq!(method.element_type(), "java.lang.Class");
    }

    #[test]
    fn test_constant_display() {
        assert_eq!(ConstantValue::Double(1.0).to_string(), "1.0");
        assert_eq!(ConstantValue::String("pre.".to_string()).as_str(), Some("pre."));
        assert_eq!(ConstantValue::Int(1).as_str(), None);
        assert_eq!(ConstantValue::Boolean(true).to_string(), "true");
        assert_eq!(
            ConstantValue::Enum {
                type_name: "com.acme.Mode".to_string(),
                constant: "FAST".to_string()
            }
            .to_string(),
            "FAST"
        );
        assert_eq!(object_descriptor_to_fqn("Ljava/lang/String;"), "java.lang.String");
        assert_eq!(object_descriptor_to_fqn("java.lang.String"), "java.lang.String");
    }

    #[test]
    fn test_float_display_matches_jvm_text() {
        assert_eq!(ConstantValue::Double(1234.5).to_string(), "1234.5");
        assert_eq!(ConstantValue::Double(0.001).to_string(), "0.001");
        assert_eq!(ConstantValue::Double(1e20).to_string(), "1.0E20");
        assert_eq!(ConstantValue::Double(1e7).to_string(), "1.0E7");
        assert_eq!(ConstantValue::Double(1.5e-5).to_string(), "1.5E-5");
        assert_eq!(ConstantValue::Double(-1e-4).to_string(), "-1.0E-4");
        assert_eq!(ConstantValue::Double(-0.0).to_string(), "-0.0");
        assert_eq!(ConstantValue::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(ConstantValue::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(ConstantValue::Float(0.25).to_string(), "0.25");
        assert_eq!(ConstantValue::Float(3.0e10).to_string(), "3.0E10");
    }

    #[test]
    fn test_marker_json_shape() {
        let marker: Marker = serde_json::from_str(
            r#"{"kind": "attribute_definition", "name": "Port", "cardinality": 3}"#,
        )
        .unwrap();
        match marker {
            Marker::AttributeDefinition(ad) => {
                assert_eq!(ad.name.as_deref(), Some("Port"));
                assert_eq!(ad.cardinality, Some(3));
                assert!(ad.required.is_none());
            }
            other => panic!("Expected AttributeDefinition, got {:?}", other),
        }
    }
}
