//! Interface Inheritance Walking
//!
//! Visits a root type and then every interface reachable through declared
//! interfaces, depth first, each at most once. Platform interfaces are
//! skipped and superclasses are never followed. An interface that cannot be
//! resolved is reported and skipped; its siblings are still visited.

use std::collections::HashSet;
use tracing::debug;

use super::is_platform;
use crate::descriptor::{TypeDescriptor, TypeSource};
use crate::diagnostics::{DiagnosticCode, Reporter};

/// Visitor applied to each reached type; returns `false` to stop descending
/// into that type's interfaces.
pub type TypeVisit<'v> = dyn FnMut(&TypeDescriptor, &mut dyn Reporter) -> bool + 'v;

/// Walks the interface graph of one extraction
pub struct InheritanceWalker<'a> {
    source: &'a dyn TypeSource,
    platform_packages: &'a [String],
    visited: HashSet<String>,
}

impl<'a> InheritanceWalker<'a> {
    pub fn new(source: &'a dyn TypeSource, platform_packages: &'a [String]) -> Self {
        Self {
            source,
            platform_packages,
            visited: HashSet::new(),
        }
    }

    /// Apply `visit` to `root`, then to its reachable ancestor interfaces
    pub fn walk(&mut self, root: &TypeDescriptor, reporter: &mut dyn Reporter, visit: &mut TypeVisit<'_>) {
        self.visited.insert(root.name.clone());
        if visit(root, reporter) {
            self.walk_interfaces(root, reporter, visit);
        }
    }

    /// Names of every type visited so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    fn walk_interfaces(&mut self, ty: &TypeDescriptor, reporter: &mut dyn Reporter, visit: &mut TypeVisit<'_>) {
        for name in &ty.interfaces {
            if is_platform(name, self.platform_packages) {
                debug!(interface = %name, of = %ty.name, "skipping platform interface");
                continue;
            }
            if !self.visited.insert(name.clone()) {
                debug!(interface = %name, "interface already visited");
                continue;
            }

            match self.source.resolve(name) {
                Ok(Some(parent)) => {
                    debug!(interface = %name, of = %ty.name, "visiting inherited interface");
                    if visit(&*parent, reporter) {
                        self.walk_interfaces(&*parent, reporter, visit);
                    }
                }
                Ok(None) => reporter.error(
                    DiagnosticCode::UnresolvedType,
                    format!("Could not obtain super interface {} of class {}", name, ty.name),
                ),
                Err(e) => reporter.exception(
                    DiagnosticCode::SourceFailure,
                    &e,
                    format!("Could not obtain super interface {} of class {}", name, ty.name),
                ),
            }
        }
    }
}
