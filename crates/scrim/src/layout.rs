#![forbid(unsafe_code)]

//! Named layout registry: symbolic layout names to presentation components.
//!
//! Presentation components are typically registered once at host startup,
//! so re-registering a name is a non-fatal override rather than an error.
//! Resolution of an unregistered name fails with
//! [`ModalError::LayoutNotFound`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::ModalError;
use crate::options::{ComponentRef, LayoutSpec};

/// Name of the builtin dialog layout.
pub const DIALOG: &str = "dialog";

/// Name of the builtin drawer layout.
pub const DRAWER: &str = "drawer";

/// Registry mapping layout names to presentation components.
///
/// Clones are cheap references to the same registry.
#[derive(Clone, Default)]
pub struct LayoutRegistry {
    inner: Rc<RefCell<HashMap<String, ComponentRef>>>,
}

impl LayoutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or override) the presentation component for `name`.
    pub fn register(&self, name: impl Into<String>, component: ComponentRef) {
        let name = name.into();
        if self
            .inner
            .borrow_mut()
            .insert(name.clone(), component)
            .is_some()
        {
            tracing::debug!(name, "layout overridden");
        }
    }

    /// Whether a layout is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.borrow().contains_key(name)
    }

    /// Look up the presentation component for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ComponentRef> {
        self.inner.borrow().get(name).cloned()
    }

    /// Resolve a layout spec to its presentation component.
    ///
    /// Embedded components pass through untouched; only named layouts go
    /// through the registry.
    pub fn resolve(&self, spec: &LayoutSpec) -> Result<ComponentRef, ModalError> {
        match spec {
            LayoutSpec::Embedded(component) => Ok(component.clone()),
            LayoutSpec::Named(name) => self
                .get(name)
                .ok_or_else(|| ModalError::LayoutNotFound(name.clone())),
        }
    }
}

impl fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutRegistry")
            .field("layouts", &self.inner.borrow().len())
            .finish()
    }
}
