//! Diagnostics
//!
//! Collects errors and warnings raised while extracting a schema. Nothing
//! reported here aborts an extraction; callers decide whether accumulated
//! errors should block use of the produced schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Structure ===
    /// Constructor found in an OCD type
    Constructor,
    /// Member declares parameters
    ParameterizedMember,
    /// Object-class marker on a class
    NotAnInterface,
    /// Attribute-definition marker outside of a member
    MisplacedAttributeMarker,
    /// PREFIX_ is not a static final String constant
    InvalidPrefix,

    // === Types ===
    /// Array of collections in a return type
    ArrayOfCollection,
    /// Array nested deeper than one level
    NestedArray,
    /// Abstract class used as an attribute type
    AbstractType,
    /// Interface attribute type without the nested option
    NestedTypeNotEnabled,
    /// Annotation-typed element default
    NestedAnnotation,

    // === Resolution ===
    /// Referenced type not known to the type source
    UnresolvedType,
    /// Type source failed while resolving
    SourceFailure,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constructor => "E001",
            Self::ParameterizedMember => "E002",
            Self::NotAnInterface => "E003",
            Self::MisplacedAttributeMarker => "W001",
            Self::InvalidPrefix => "W002",
            Self::ArrayOfCollection => "E004",
            Self::NestedArray => "E005",
            Self::AbstractType => "E006",
            Self::NestedTypeNotEnabled => "E007",
            Self::NestedAnnotation => "W003",
            Self::UnresolvedType => "E008",
            Self::SourceFailure => "E009",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Reporter
// =============================================================================

/// Sink for non-fatal extraction problems
pub trait Reporter {
    fn error(&mut self, code: DiagnosticCode, message: String);

    fn warning(&mut self, code: DiagnosticCode, message: String);

    /// An unexpected failure of a collaborator, wrapped with context
    fn exception(&mut self, code: DiagnosticCode, cause: &dyn std::error::Error, message: String);
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    pub code: DiagnosticCode,
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Additional context (e.g. the underlying cause)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.message)?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Ordered collection of diagnostics from one or more extractions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Check whether any item carries the given code
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|i| i.code == code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Reporter for Diagnostics {
    fn error(&mut self, code: DiagnosticCode, message: String) {
        error!(code = code.as_str(), "{}", message);
        self.push(DiagnosticItem::new(code, Severity::Error, message));
    }

    fn warning(&mut self, code: DiagnosticCode, message: String) {
        warn!(code = code.as_str(), "{}", message);
        self.push(DiagnosticItem::new(code, Severity::Warning, message));
    }

    fn exception(&mut self, code: DiagnosticCode, cause: &dyn std::error::Error, message: String) {
        error!(code = code.as_str(), cause = %cause, "{}", message);
        self.push(
            DiagnosticItem::new(code, Severity::Error, message).with_context(cause.to_string()),
        );
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}
