//! Attribute Collection
//!
//! A [`DeclarationVisitor`] run once per visited type. It records pending
//! attribute definitions while members are replayed and turns them into
//! [`AdDef`]s when the type ends. State that spans types (the OCD being built
//! and the root's property prefix) lives in [`OcdState`].

use tracing::{debug, trace};

use super::mapping::TypeMapper;
use super::naming::{identifier_to_property, single_element_key, un_camel};
use super::{is_platform, Options};
use crate::descriptor::{
    is_primitive, object_descriptor_to_fqn, AttributeMarker, ConstantValue,
    DeclarationVisitor, FieldDecl, Marker, MethodDecl, ObjectClassMarker, TypeDescriptor,
    TypeKind, TypeSource,
};
use crate::diagnostics::{DiagnosticCode, Reporter};
use crate::extension::{ExtensionAttribute, ExtensionRecognizer};
use crate::schema::{AdDef, Cardinality, IconDef, OcdDef, OptionDef};
use crate::version::MetatypeVersion;

/// Name of the static field carrying the property key prefix
pub const PREFIX_FIELD: &str = "PREFIX_";

/// Inputs shared by every type of one extraction
pub struct ExtractionContext<'a> {
    pub source: &'a dyn TypeSource,
    pub recognizer: &'a dyn ExtensionRecognizer,
    pub options: &'a Options,
    pub min_version: MetatypeVersion,
    pub platform_packages: &'a [String],
}

/// Results accumulated across the types of one extraction
#[derive(Debug, Default)]
pub struct OcdState {
    /// Set by the first object-class marker seen
    pub ocd: Option<OcdDef>,
    /// Prefix declared by the root type
    pub prefix: Option<String>,
}

impl OcdState {
    fn update_version(&mut self, version: MetatypeVersion) {
        if let Some(ocd) = self.ocd.as_mut() {
            ocd.update_version(version);
        }
    }
}

/// A member waiting for type-level finalization
#[derive(Debug)]
struct PendingAttribute {
    name: String,
    return_type: String,
    /// Return type without array markers or generic arguments
    element: String,
    parameters: usize,
    is_constructor: bool,
    marker: Option<AttributeMarker>,
    default_value: Option<ConstantValue>,
    extensions: Vec<ExtensionAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Between members; markers apply to the type
    Scanning,
    /// Inside a member; `Some` when it became a pending attribute
    InMember(Option<usize>),
    /// Type ended
    Finalized,
}

/// Collects the attributes of one type into the shared [`OcdState`]
pub struct TypeCollector<'a> {
    ctx: &'a ExtractionContext<'a>,
    state: &'a mut OcdState,
    reporter: &'a mut dyn Reporter,
    ty: &'a TypeDescriptor,
    is_root: bool,

    cursor: Cursor,
    pending: Vec<PendingAttribute>,
    type_extensions: Vec<ExtensionAttribute>,
    prefix_field: Option<FieldDecl>,
    /// Annotation elements other than `value` without a default
    lacking_default: i32,
    has_value: bool,
}

impl<'a> TypeCollector<'a> {
    pub fn new(
        ctx: &'a ExtractionContext<'a>,
        state: &'a mut OcdState,
        reporter: &'a mut dyn Reporter,
        ty: &'a TypeDescriptor,
        is_root: bool,
    ) -> Self {
        Self {
            ctx,
            state,
            reporter,
            ty,
            is_root,
            cursor: Cursor::Scanning,
            pending: Vec::new(),
            type_extensions: Vec::new(),
            prefix_field: None,
            lacking_default: 0,
            has_value: false,
        }
    }

    fn do_ocd(&mut self, marker: &ObjectClassMarker) {
        if self.state.ocd.is_some() {
            debug!(type_name = %self.ty.name, "object class already defined, ignoring marker");
            return;
        }
        if !self.ty.is_interface() {
            self.reporter.error(
                DiagnosticCode::NotAnInterface,
                format!(
                    "ObjectClassDefinition applied to non-interface, non-annotation class {}",
                    self.ty.name
                ),
            );
            return;
        }

        let ty = self.ty;
        let fqn = ty.name.as_str();
        let id = marker.id.clone().unwrap_or_else(|| fqn.to_string());
        let name = marker.name.clone().unwrap_or_else(|| un_camel(&id));
        let description = marker.description.clone().unwrap_or_default();
        let localization = marker
            .localization
            .clone()
            .unwrap_or_else(|| format!("OSGI-INF/l10n/{}", fqn));

        let mut ocd = OcdDef::new(id, name, description, localization, self.ctx.min_version);
        for (pids, factory) in [(&marker.pid, false), (&marker.factory_pid, true)] {
            for pid in pids.iter().flatten() {
                let pid = if pid == "$" { fqn } else { pid.as_str() };
                ocd.add_designate(pid, factory);
            }
        }
        for icon in marker.icon.iter().flatten() {
            ocd.icons.push(IconDef {
                resource: icon.resource.clone(),
                size: icon.size,
            });
        }
        debug!(id = %ocd.id, type_name = fqn, "object class definition found");
        self.state.ocd = Some(ocd);
    }

    fn do_extension(&mut self, extension: ExtensionAttribute) {
        match self.cursor {
            Cursor::InMember(Some(idx)) => self.pending[idx].extensions.push(extension),
            // Outside an attribute; only plain interfaces carry these on the OCD
            Cursor::Scanning | Cursor::InMember(None) if self.ty.kind == TypeKind::Interface => {
                self.type_extensions.push(extension)
            }
            _ => debug!(marker = %extension.marker, "extension attribute has no target"),
        }
    }

    fn finalize(&mut self) {
        self.cursor = Cursor::Finalized;
        if self.state.ocd.is_none() {
            return;
        }

        let extensions = std::mem::take(&mut self.type_extensions);
        if let Some(ocd) = self.state.ocd.as_mut() {
            ocd.extensions.extend(extensions);
        }

        if self.is_root {
            self.resolve_prefix();
        }

        let single_element = if self.has_value && self.lacking_default == 0 {
            self.state.update_version(MetatypeVersion::V1_4);
            Some(single_element_key(self.ty.simple_name()))
        } else {
            None
        };

        for pending in std::mem::take(&mut self.pending) {
            if let Some(ad) = self.finalize_attribute(pending, single_element.as_deref()) {
                if let Some(ocd) = self.state.ocd.as_mut() {
                    ocd.attributes.push(ad);
                }
            }
        }
    }

    fn resolve_prefix(&mut self) {
        let Some(field) = self.prefix_field.take() else {
            return;
        };
        match field.constant.as_ref().and_then(ConstantValue::as_str) {
            Some(prefix) if field.is_final && field.type_name == "java.lang.String" => {
                self.state.prefix = Some(prefix.to_string());
                self.state.update_version(MetatypeVersion::V1_4);
            }
            _ => self.reporter.warning(
                DiagnosticCode::InvalidPrefix,
                format!(
                    "Field {} in {} is not a static final String field with a compile-time constant value: {}",
                    PREFIX_FIELD,
                    self.ty.name,
                    field
                        .constant
                        .as_ref()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "null".to_string())
                ),
            ),
        }
    }

    fn finalize_attribute(&mut self, pending: PendingAttribute, single_element: Option<&str>) -> Option<AdDef> {
        let ty = self.ty;
        let owner = ty.name.as_str();
        if pending.is_constructor {
            self.reporter.error(
                DiagnosticCode::Constructor,
                format!(
                    "Constructor {} for {}.{} found; only interfaces and annotations allowed for OCDs",
                    pending.name, owner, pending.name
                ),
            );
            return None;
        }
        if pending.parameters > 0 {
            self.reporter.error(
                DiagnosticCode::ParameterizedMember,
                format!(
                    "Element {} for {}.{} has parameters; only no-parameter elements in an OCD interface allowed",
                    pending.name, owner, pending.name
                ),
            );
            return None;
        }

        let key = match single_element {
            Some(key) if pending.name == "value" => key.to_string(),
            _ => {
                let mangled = identifier_to_property(&pending.name);
                if let Some(version) = mangled.requires {
                    self.state.update_version(version);
                }
                mangled.key
            }
        };

        let mapped = TypeMapper::new(self.ctx.source, self.ctx.options).map(
            owner,
            &pending.name,
            &pending.return_type,
            &mut *self.reporter,
        );

        let mut ad = AdDef {
            id: match &self.state.prefix {
                Some(prefix) => format!("{}{}", prefix, key),
                None => key,
            },
            name: un_camel(&pending.name),
            attribute_type: mapped.attribute_type,
            cardinality: mapped.cardinality,
            required: true,
            extensions: pending.extensions,
            ..AdDef::default()
        };
        trace!(id = %ad.id, member = %pending.name, "attribute definition");

        self.enum_options(owner, &pending.name, &mapped.element, &mut ad.options);

        if let Some(marker) = &pending.marker {
            apply_marker(&mut ad, marker);
        }

        if ad.defaults.is_none() && self.ty.is_annotation() {
            if let Some(value) = &pending.default_value {
                ad.defaults = self.annotation_defaults(&pending.name, &pending.element, value);
            }
        }

        Some(ad)
    }

    fn enum_options(&mut self, owner: &str, member: &str, element: &str, options: &mut Vec<OptionDef>) {
        if is_primitive(element) {
            return;
        }
        match self.ctx.source.resolve(element) {
            Ok(Some(ty)) if ty.is_enum() => {
                options.extend(
                    ty.enum_constants()
                        .into_iter()
                        .map(|constant| OptionDef::new(constant, constant)),
                );
            }
            Ok(_) => {}
            Err(e) => self.reporter.exception(
                DiagnosticCode::SourceFailure,
                &e,
                format!("AD for {}.{} can not parse option values from type {}", owner, member, element),
            ),
        }
    }

    fn annotation_defaults(
        &mut self,
        member: &str,
        element: &str,
        value: &ConstantValue,
    ) -> Option<Vec<String>> {
        if !is_primitive(element) && !is_platform(element, self.ctx.platform_packages) {
            match self.ctx.source.resolve(element) {
                Ok(Some(ty)) if ty.is_annotation() => {
                    self.reporter.warning(
                        DiagnosticCode::NestedAnnotation,
                        format!("Nested annotation type found in member {}, {}", member, element),
                    );
                    return None;
                }
                Ok(_) => {}
                Err(e) => self.reporter.exception(
                    DiagnosticCode::SourceFailure,
                    &e,
                    format!(
                        "Exception looking at annotation type default for element {} with type {}",
                        member, element
                    ),
                ),
            }
        }

        let defaults = match value {
            ConstantValue::Array(values) => values.iter().map(value_to_property).collect(),
            single => vec![value_to_property(single)],
        };
        Some(defaults)
    }
}

// Class literals render as their fully qualified name
fn value_to_property(value: &ConstantValue) -> String {
    match value {
        ConstantValue::Type(name) => object_descriptor_to_fqn(name),
        other => other.to_string(),
    }
}

/// Overlay the explicitly set elements of an attribute marker
fn apply_marker(ad: &mut AdDef, marker: &AttributeMarker) {
    if let Some(name) = &marker.name {
        ad.name = name.clone();
    }
    if let Some(description) = &marker.description {
        ad.description = Some(description.clone());
    }
    if let Some(attribute_type) = marker.attribute_type {
        ad.attribute_type = Some(attribute_type);
    }
    if let Some(cardinality) = marker.cardinality {
        ad.cardinality = Cardinality(cardinality);
    }
    if let Some(max) = &marker.max {
        ad.max = Some(max.clone());
    }
    if let Some(min) = &marker.min {
        ad.min = Some(min.clone());
    }
    if let Some(defaults) = &marker.default_value {
        ad.defaults = Some(defaults.clone());
    }
    if let Some(required) = marker.required {
        ad.required = required;
    }
    if let Some(options) = &marker.options {
        ad.options = options.clone();
    }
}

impl DeclarationVisitor for TypeCollector<'_> {
    fn type_start(&mut self, ty: &TypeDescriptor) -> bool {
        trace!(type_name = %ty.name, root = self.is_root, "collecting type");
        self.cursor = Cursor::Scanning;
        self.pending.clear();
        self.type_extensions.clear();
        self.prefix_field = None;
        self.lacking_default = 0;
        self.has_value = false;
        true
    }

    fn field(&mut self, field: &FieldDecl) {
        self.cursor = Cursor::InMember(None);
        if field.is_static && field.name == PREFIX_FIELD {
            if self.is_root {
                self.prefix_field = Some(field.clone());
            } else {
                debug!(type_name = %self.ty.name, "ignoring inherited {}", PREFIX_FIELD);
            }
        }
    }

    fn method(&mut self, method: &MethodDecl) {
        if method.is_static {
            self.cursor = Cursor::InMember(None);
            return;
        }
        self.pending.push(PendingAttribute {
            name: method.name.clone(),
            return_type: method.return_type.clone(),
            element: method.element_type().to_string(),
            parameters: method.parameters.len(),
            is_constructor: method.is_constructor,
            marker: None,
            default_value: None,
            extensions: Vec::new(),
        });
        self.cursor = Cursor::InMember(Some(self.pending.len() - 1));

        if self.ty.is_annotation() {
            if method.name == "value" {
                self.has_value = true;
            } else {
                self.lacking_default += 1;
            }
        }
    }

    fn marker(&mut self, marker: &Marker) {
        match marker {
            Marker::ObjectClass(ocd) => match self.cursor {
                Cursor::Scanning => self.do_ocd(ocd),
                _ => debug!(type_name = %self.ty.name, "object class marker on a member ignored"),
            },
            Marker::AttributeDefinition(ad) => match self.cursor {
                Cursor::InMember(Some(idx)) => self.pending[idx].marker = Some(ad.clone()),
                _ => self.reporter.warning(
                    DiagnosticCode::MisplacedAttributeMarker,
                    format!(
                        "AttributeDefinition in {} is not attached to an element method",
                        self.ty.name
                    ),
                ),
            },
            Marker::Other(other) => {
                if let Some(extension) = self.ctx.recognizer.recognize(other) {
                    self.do_extension(extension);
                }
            }
        }
    }

    fn annotation_default(&mut self, method: &MethodDecl, value: &ConstantValue) {
        if self.ty.is_annotation() && method.name != "value" {
            self.lacking_default -= 1;
        }
        if let Cursor::InMember(Some(idx)) = self.cursor {
            self.pending[idx].default_value = Some(value.clone());
        }
    }

    fn member_end(&mut self) {
        self.cursor = Cursor::Scanning;
    }

    fn type_end(&mut self) {
        self.finalize();
    }
}
