//! Return Type Mapping
//!
//! Maps a member's declared return type onto a metatype attribute type and
//! cardinality:
//! - `T[]` → unbounded array of `T`
//! - `C<T>` where `C` is a collection family interface, or a concrete type
//!   proven collection-like → vector of `T`
//! - primitives and their boxes → the matching scalar type
//! - `String`, `Class`, enums, concrete classes and (with the nested option)
//!   interfaces → `String`

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::trace;

use super::Options;
use crate::descriptor::{object_descriptor_to_fqn, TypeSource};
use crate::diagnostics::{DiagnosticCode, Reporter};
use crate::schema::{AttributeType, Cardinality};

/// Generic interfaces recognized as collections by name
const GENERIC_COLLECTIONS: [&str; 4] = [
    "java.util.Collection",
    "java.util.Set",
    "java.util.List",
    "java.lang.Iterable",
];

/// Interfaces that make an implementing type collection-like
const COLLECTION_FAMILY: [&str; 6] = [
    "java.util.Collection",
    "java.util.Set",
    "java.util.List",
    "java.util.Queue",
    "java.util.Stack",
    "java.util.Deque",
];

/// Platform collections accepted when the type source does not describe them
const PLATFORM_COLLECTIONS: [&str; 10] = [
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
    "java.util.ArrayDeque",
    "java.util.PriorityQueue",
    "java.util.Vector",
    "java.util.Stack",
    "java.util.concurrent.CopyOnWriteArrayList",
];

fn generic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^<]+)<(.+)>$").expect("valid generic pattern"))
}

// Split on commas outside of nested type arguments
fn has_single_argument(args: &str) -> bool {
    let mut depth = 0usize;
    for c in args.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    true
}

/// Result of mapping a return type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// `None` when the type cannot be expressed; the reason has been reported
    pub attribute_type: Option<AttributeType>,
    pub cardinality: Cardinality,
    /// Raw element type after unwrapping arrays and collections
    pub element: String,
}

// =============================================================================
// Collection Identifier
// =============================================================================

/// Decides whether a type is a concrete, no-arg constructible collection
pub struct CollectionIdentifier<'a> {
    source: &'a dyn TypeSource,
}

impl<'a> CollectionIdentifier<'a> {
    pub fn new(source: &'a dyn TypeSource) -> Self {
        Self { source }
    }

    pub fn is_collection_like(&self, name: &str) -> bool {
        let mut visited = HashSet::new();
        self.check(name, false, true, &mut visited)
    }

    fn check(
        &self,
        name: &str,
        interface_only: bool,
        top_level: bool,
        visited: &mut HashSet<String>,
    ) -> bool {
        if !visited.insert(name.to_string()) {
            return false;
        }
        let ty = match self.source.resolve(name) {
            Ok(Some(ty)) => ty,
            Ok(None) => return top_level && PLATFORM_COLLECTIONS.contains(&name),
            Err(e) => {
                trace!(type_name = name, error = %e, "collection check failed closed");
                return false;
            }
        };
        if top_level && ty.is_abstract() {
            return false;
        }
        if !((interface_only && ty.is_interface()) ^ ty.public_no_arg_constructor) {
            return false;
        }
        for interface in &ty.interfaces {
            if COLLECTION_FAMILY.contains(&interface.as_str())
                || self.check(interface, true, false, visited)
            {
                return true;
            }
        }
        match &ty.superclass {
            Some(superclass) => self.check(superclass, false, false, visited),
            None => false,
        }
    }
}

// =============================================================================
// Type Mapper
// =============================================================================

/// Maps return types of one OCD type's members
pub struct TypeMapper<'a> {
    source: &'a dyn TypeSource,
    options: &'a Options,
}

impl<'a> TypeMapper<'a> {
    pub fn new(source: &'a dyn TypeSource, options: &'a Options) -> Self {
        Self { source, options }
    }

    /// Map `return_type` of member `owner.member`
    pub fn map(
        &self,
        owner: &str,
        member: &str,
        return_type: &str,
        reporter: &mut dyn Reporter,
    ) -> MappedType {
        let mut rtype = return_type.trim().to_string();
        let mut cardinality = Cardinality::SCALAR;
        let mut conflict = false;

        if let Some(stripped) = rtype.strip_suffix("[]") {
            cardinality = Cardinality::UNBOUNDED_ARRAY;
            rtype = stripped.to_string();
        }

        let element = generic_pattern().captures(&rtype).and_then(|caps| {
            let raw = &caps[1];
            let argument = &caps[2];
            let collection = has_single_argument(argument)
                && (GENERIC_COLLECTIONS.contains(&raw)
                    || CollectionIdentifier::new(self.source).is_collection_like(raw));
            collection.then(|| object_descriptor_to_fqn(argument.trim()))
        });
        if let Some(element) = element {
            if !cardinality.is_scalar() {
                reporter.error(
                    DiagnosticCode::ArrayOfCollection,
                    format!(
                        "AD for {}.{} uses an array of collections in return type ({}), Metatype allows either Vector or array",
                        owner, member, return_type
                    ),
                );
                conflict = true;
            }
            rtype = element;
            cardinality = Cardinality::VECTOR;
        }

        if let Some(idx) = rtype.find('<') {
            rtype.truncate(idx);
        }
        trace!(owner, member, element = %rtype, %cardinality, "mapped return type");

        let attribute_type = if conflict {
            None
        } else {
            self.attribute_type(&rtype, reporter)
        };
        MappedType {
            attribute_type,
            cardinality,
            element: rtype,
        }
    }

    fn attribute_type(&self, rtype: &str, reporter: &mut dyn Reporter) -> Option<AttributeType> {
        if rtype.ends_with("[]") {
            reporter.error(
                DiagnosticCode::NestedArray,
                format!("Can only handle array of depth one, nested type {}", rtype),
            );
            return None;
        }

        match rtype {
            "boolean" | "java.lang.Boolean" => Some(AttributeType::Boolean),
            "byte" | "java.lang.Byte" => Some(AttributeType::Byte),
            "char" | "java.lang.Character" => Some(AttributeType::Char),
            "short" | "java.lang.Short" => Some(AttributeType::Short),
            "int" | "java.lang.Integer" => Some(AttributeType::Int),
            "long" | "java.lang.Long" => Some(AttributeType::Long),
            "float" | "java.lang.Float" => Some(AttributeType::Float),
            "double" | "java.lang.Double" => Some(AttributeType::Double),
            "java.lang.String" | "java.lang.Class" => Some(AttributeType::String),
            other if self.acceptable_type(other, reporter) => Some(AttributeType::String),
            _ => None,
        }
    }

    // Enums, concrete classes and opted-in interfaces render as strings
    fn acceptable_type(&self, rtype: &str, reporter: &mut dyn Reporter) -> bool {
        let ty = match self.source.resolve(rtype) {
            Ok(Some(ty)) => ty,
            Ok(None) => {
                reporter.error(
                    DiagnosticCode::UnresolvedType,
                    format!("Could not find class for return type {}", rtype),
                );
                return false;
            }
            Err(e) => {
                reporter.exception(
                    DiagnosticCode::SourceFailure,
                    &e,
                    format!("Could not examine class for return type {}", rtype),
                );
                return false;
            }
        };

        if ty.is_enum() {
            return true;
        }
        if !ty.is_abstract() || (ty.is_interface() && self.options.nested()) {
            return true;
        }
        if !ty.is_interface() {
            reporter.error(
                DiagnosticCode::AbstractType,
                format!("Abstract classes not allowed as interface method return values: {}", rtype),
            );
        } else {
            reporter.error(
                DiagnosticCode::NestedTypeNotEnabled,
                format!("Nested metatype only allowed with option: nested type {}", rtype),
            );
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{InMemoryTypeSource, TypeDescriptor, TypeKind};
    use crate::diagnostics::Diagnostics;
    use crate::metatype::ExtractOption;

    fn source() -> InMemoryTypeSource {
        let mut my_list = TypeDescriptor::new("com.acme.MyList", TypeKind::Class);
        my_list.public_no_arg_constructor = true;
        my_list.interfaces.push("com.acme.Bag".to_string());

        let mut bag = TypeDescriptor::new("com.acme.Bag", TypeKind::Interface);
        bag.interfaces.push("java.util.Collection".to_string());

        let mut derived = TypeDescriptor::new("com.acme.DerivedList", TypeKind::Class);
        derived.public_no_arg_constructor = true;
        derived.superclass = Some("com.acme.MyList".to_string());

        let mut abstract_list = TypeDescriptor::new("com.acme.AbstractBag", TypeKind::Class);
        abstract_list.is_abstract = true;
        abstract_list.public_no_arg_constructor = true;
        abstract_list.interfaces.push("java.util.List".to_string());

        let mut looping = TypeDescriptor::new("com.acme.Loop", TypeKind::Class);
        looping.public_no_arg_constructor = true;
        looping.superclass = Some("com.acme.Loop".to_string());

        let mut mode = TypeDescriptor::new("com.acme.Mode", TypeKind::Enum);
        mode.is_abstract = false;

        let mut shape = TypeDescriptor::new("com.acme.Shape", TypeKind::Class);
        shape.is_abstract = true;

        InMemoryTypeSource::with_types(vec![
            my_list,
            bag,
            derived,
            abstract_list,
            looping,
            mode,
            shape,
            TypeDescriptor::new("com.acme.Nested", TypeKind::Interface),
            TypeDescriptor::new("com.acme.Plain", TypeKind::Class),
        ])
        .unwrap()
    }

    fn map(return_type: &str, options: &Options) -> (MappedType, Diagnostics) {
        let source = source();
        let mut diagnostics = Diagnostics::new();
        let mapped = TypeMapper::new(&source, options).map("com.acme.Config", "m", return_type, &mut diagnostics);
        (mapped, diagnostics)
    }

    #[test]
    fn test_scalars_and_boxes() {
        let options = Options::default();
        for (rtype, expected) in [
            ("int", AttributeType::Int),
            ("java.lang.Integer", AttributeType::Int),
            ("char", AttributeType::Char),
            ("java.lang.Boolean", AttributeType::Boolean),
            ("double", AttributeType::Double),
            ("java.lang.String", AttributeType::String),
            ("java.lang.Class<?>", AttributeType::String),
        ] {
            let (mapped, diagnostics) = map(rtype, &options);
            assert_eq!(mapped.attribute_type, Some(expected), "mapping {}", rtype);
            assert_eq!(mapped.cardinality, Cardinality::SCALAR);
            assert!(diagnostics.is_empty());
        }
    }

    #[test]
    fn test_array_is_unbounded() {
        let (mapped, diagnostics) = map("long[]", &Options::default());
        assert_eq!(mapped.attribute_type, Some(AttributeType::Long));
        assert_eq!(mapped.cardinality, Cardinality::UNBOUNDED_ARRAY);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_nested_array_rejected() {
        let (mapped, diagnostics) = map("int[][]", &Options::default());
        assert_eq!(mapped.attribute_type, None);
        assert!(diagnostics.contains(DiagnosticCode::NestedArray));
    }

    #[test]
    fn test_known_collection_is_vector() {
        let (mapped, diagnostics) = map("java.util.List<java.lang.Integer>", &Options::default());
        assert_eq!(mapped.attribute_type, Some(AttributeType::Int));
        assert_eq!(mapped.cardinality, Cardinality::VECTOR);
        assert!(diagnostics.is_empty());

        let (mapped, _) = map("java.util.Set<Ljava/lang/String;>", &Options::default());
        assert_eq!(mapped.attribute_type, Some(AttributeType::String));
        assert_eq!(mapped.element, "java.lang.String");
    }

    #[test]
    fn test_array_of_collection_rejected() {
        let (mapped, diagnostics) = map("java.util.List<java.lang.String>[]", &Options::default());
        assert_eq!(mapped.attribute_type, None);
        assert!(diagnostics.contains(DiagnosticCode::ArrayOfCollection));
    }

    #[test]
    fn test_identified_collection() {
        let (mapped, diagnostics) = map("com.acme.MyList<java.lang.String>", &Options::default());
        assert_eq!(mapped.cardinality, Cardinality::VECTOR);
        assert_eq!(mapped.attribute_type, Some(AttributeType::String));
        assert!(diagnostics.is_empty());

        let (mapped, _) = map("java.util.ArrayList<java.lang.Short>", &Options::default());
        assert_eq!(mapped.cardinality, Cardinality::VECTOR);
        assert_eq!(mapped.attribute_type, Some(AttributeType::Short));
    }

    #[test]
    fn test_collection_identifier() {
        let source = source();
        let identifier = CollectionIdentifier::new(&source);
        assert!(identifier.is_collection_like("com.acme.MyList"));
        assert!(identifier.is_collection_like("com.acme.DerivedList"));
        assert!(!identifier.is_collection_like("com.acme.AbstractBag"));
        assert!(!identifier.is_collection_like("com.acme.Bag"));
        assert!(!identifier.is_collection_like("com.acme.Plain"));
        assert!(!identifier.is_collection_like("com.acme.Unknown"));
        assert!(!identifier.is_collection_like("com.acme.Loop"));
    }

    #[test]
    fn test_multi_argument_generic_is_not_a_collection() {
        let (mapped, diagnostics) = map("java.util.Map<java.lang.String,java.lang.String>", &Options::default());
        assert_eq!(mapped.cardinality, Cardinality::SCALAR);
        assert_eq!(mapped.element, "java.util.Map");
        assert_eq!(mapped.attribute_type, None);
        assert!(diagnostics.contains(DiagnosticCode::UnresolvedType));
    }

    #[test]
    fn test_reference_types() {
        let (mapped, diagnostics) = map("com.acme.Mode", &Options::default());
        assert_eq!(mapped.attribute_type, Some(AttributeType::String));
        assert!(diagnostics.is_empty());

        let (mapped, _) = map("com.acme.Plain", &Options::default());
        assert_eq!(mapped.attribute_type, Some(AttributeType::String));

        let (mapped, diagnostics) = map("com.acme.Shape", &Options::default());
        assert_eq!(mapped.attribute_type, None);
        assert!(diagnostics.contains(DiagnosticCode::AbstractType));
    }

    #[test]
    fn test_nested_interface_requires_option() {
        let (mapped, diagnostics) = map("com.acme.Nested", &Options::default());
        assert_eq!(mapped.attribute_type, None);
        assert!(diagnostics.contains(DiagnosticCode::NestedTypeNotEnabled));

        let options = Options::default().with(ExtractOption::Nested);
        let (mapped, diagnostics) = map("com.acme.Nested", &options);
        assert_eq!(mapped.attribute_type, Some(AttributeType::String));
        assert!(diagnostics.is_empty());
    }
}
