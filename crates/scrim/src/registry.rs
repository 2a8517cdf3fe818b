#![forbid(unsafe_code)]

//! The `Modals` service: named-stack registry and the caller-facing `open`.
//!
//! One `Modals` instance is the process-wide coordination point, constructed
//! explicitly and handed to every collaborator that needs it (tests build as
//! many independent instances as they like). Display surfaces register
//! their stacks by name; callers route open-requests by name.
//!
//! The `"default"` stack is special: requesting it when nothing is
//! registered mounts a default surface on the spot, so simple consumers
//! need not wire up a surface at all. Every other name must be registered
//! explicitly before use.
//!
//! # Invariants
//!
//! - Stack names are unique. A duplicate registration is reported and the
//!   existing mapping is kept; last writer does not win.
//! - Unregistration only removes the mapping when the caller presents the
//!   registered instance itself.
//! - Lookup, check, and write on the name map happen under a single borrow;
//!   the default-surface factory runs with no borrow held.
//!
//! # Failure Modes
//!
//! - Unknown non-default name: `StackNotFound`, never auto-created.
//! - Default factory fails to self-register: `StackNotFound` instead of a
//!   hang.
//! - Duplicate registration / mismatched unregistration: warn-logged,
//!   non-fatal, mapping preserved.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::ModalError;
use crate::handle::ModalHandle;
use crate::layout::{self, LayoutRegistry};
use crate::options::{ComponentRef, ModalOptions};
use crate::stack::ModalStack;
use crate::surface::{DisplaySurface, HeadlessSurface};

/// Name of the implicitly created stack.
pub const DEFAULT_STACK: &str = "default";

/// Factory invoked to materialize the default surface.
///
/// Must mount a surface that registers a stack under
/// [`DEFAULT_STACK`] within the call; the returned surface is retained by
/// the service. `None` signals that creation failed.
pub type DefaultSurfaceFactory = Box<dyn Fn(&Modals) -> Option<Rc<dyn DisplaySurface>>>;

struct ModalsInner {
    stacks: RefCell<HashMap<String, ModalStack>>,
    layouts: LayoutRegistry,
    default_factory: DefaultSurfaceFactory,
    default_surface: RefCell<Option<Rc<dyn DisplaySurface>>>,
}

/// Process-wide modal coordination service.
///
/// Clones are cheap references to the same service.
#[derive(Clone)]
pub struct Modals {
    inner: Rc<ModalsInner>,
}

impl Modals {
    /// A service whose default stack is backed by a [`HeadlessSurface`].
    pub fn new() -> Self {
        Self::with_default_surface(Box::new(|modals| {
            match HeadlessSurface::mount(modals, DEFAULT_STACK) {
                Ok(surface) => {
                    let surface: Rc<dyn DisplaySurface> = surface;
                    Some(surface)
                }
                Err(error) => {
                    tracing::error!(%error, "failed to mount the default modal surface");
                    None
                }
            }
        }))
    }

    /// A service with a custom default-surface factory.
    pub fn with_default_surface(factory: DefaultSurfaceFactory) -> Self {
        Self {
            inner: Rc::new(ModalsInner {
                stacks: RefCell::new(HashMap::new()),
                layouts: LayoutRegistry::new(),
                default_factory: factory,
                default_surface: RefCell::new(None),
            }),
        }
    }

    // --- Stack registry ---

    /// The stack registered under `name`.
    ///
    /// For [`DEFAULT_STACK`] with nothing registered, the default surface is
    /// mounted on the spot and its stack returned. Any other missing name
    /// fails with [`ModalError::StackNotFound`].
    pub fn stack(&self, name: &str) -> Result<ModalStack, ModalError> {
        if let Some(stack) = self.lookup(name) {
            return Ok(stack);
        }
        if name == DEFAULT_STACK {
            tracing::warn!(
                "no modal stack named \"default\" is registered; mounting a default surface"
            );
            let surface = (self.inner.default_factory)(self);
            *self.inner.default_surface.borrow_mut() = surface;
            if let Some(stack) = self.lookup(name) {
                return Ok(stack);
            }
        }
        Err(ModalError::StackNotFound(name.to_string()))
    }

    fn lookup(&self, name: &str) -> Option<ModalStack> {
        self.inner.stacks.borrow().get(name).cloned()
    }

    /// Associate `name` with `stack`.
    ///
    /// A duplicate name with a different instance is reported and the
    /// existing mapping is kept. Re-registering the registered instance is
    /// a no-op.
    pub fn register_stack(&self, name: &str, stack: &ModalStack) -> Result<(), ModalError> {
        let mut stacks = self.inner.stacks.borrow_mut();
        if let Some(existing) = stacks.get(name) {
            if existing == stack {
                return Ok(());
            }
            tracing::warn!(
                name,
                "modal stack names must be unique; keeping the registered instance"
            );
            return Err(ModalError::DuplicateStackName(name.to_string()));
        }
        stacks.insert(name.to_string(), stack.clone());
        tracing::debug!(name, "modal stack registered");
        Ok(())
    }

    /// Remove the mapping for `name`, but only if `stack` is the registered
    /// instance. A mismatch is reported and the mapping is kept.
    pub fn unregister_stack(&self, name: &str, stack: &ModalStack) -> Result<(), ModalError> {
        let mut stacks = self.inner.stacks.borrow_mut();
        let registered = stacks.get(name).is_some_and(|existing| existing == stack);
        if registered {
            stacks.remove(name);
            tracing::debug!(name, "modal stack unregistered");
            Ok(())
        } else {
            tracing::warn!(
                name,
                "cannot unregister modal stack: not the registered instance"
            );
            Err(ModalError::StackMismatch(name.to_string()))
        }
    }

    // --- Caller-facing API ---

    /// Open a modal: resolve the target stack and push onto it.
    ///
    /// Resolution errors (`StackNotFound`, `LayoutNotFound`) surface here
    /// synchronously; everything after admission travels on the handle.
    pub fn open(&self, options: ModalOptions) -> Result<ModalHandle, ModalError> {
        let name = options
            .stack
            .clone()
            .unwrap_or_else(|| DEFAULT_STACK.to_string());
        let stack = self.stack(&name)?;
        stack.push(options)
    }

    // --- Layouts ---

    /// The layout registry shared with every stack this service creates.
    pub fn layouts(&self) -> LayoutRegistry {
        self.inner.layouts.clone()
    }

    /// Register (or override) a layout presentation component.
    pub fn register_layout(&self, name: impl Into<String>, component: ComponentRef) {
        self.inner.layouts.register(name, component);
    }

    /// Register the builtin presentation components under their fixed
    /// names, [`layout::DIALOG`] and [`layout::DRAWER`].
    pub fn register_builtin_layouts(&self, dialog: ComponentRef, drawer: ComponentRef) {
        self.register_layout(layout::DIALOG, dialog);
        self.register_layout(layout::DRAWER, drawer);
    }
}

impl Default for Modals {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Modals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modals")
            .field("stacks", &self.inner.stacks.borrow().len())
            .field("layouts", &self.inner.layouts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LayoutSpec;

    fn embedded() -> ModalOptions {
        ModalOptions::new(ComponentRef::new("content"))
            .layout(LayoutSpec::Embedded(ComponentRef::new("layout")))
    }

    #[test]
    fn default_stack_is_created_once_and_reused() {
        let modals = Modals::new();
        let first = modals.stack(DEFAULT_STACK).unwrap();
        let second = modals.stack(DEFAULT_STACK).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn named_stacks_are_never_auto_created() {
        let modals = Modals::new();
        assert_eq!(
            modals.stack("sidebar").err(),
            Some(ModalError::StackNotFound("sidebar".to_string()))
        );
        // The failed lookup must not have materialized anything.
        assert_eq!(
            modals.stack("sidebar").err(),
            Some(ModalError::StackNotFound("sidebar".to_string()))
        );
    }

    #[test]
    fn duplicate_registration_keeps_the_first_instance() {
        let modals = Modals::new();
        let first = ModalStack::new("panel", modals.layouts());
        let second = ModalStack::new("panel", modals.layouts());

        modals.register_stack("panel", &first).unwrap();
        assert_eq!(
            modals.register_stack("panel", &second).err(),
            Some(ModalError::DuplicateStackName("panel".to_string()))
        );
        assert_eq!(modals.stack("panel").unwrap(), first);
    }

    #[test]
    fn re_registering_the_same_instance_is_a_no_op() {
        let modals = Modals::new();
        let stack = ModalStack::new("panel", modals.layouts());
        modals.register_stack("panel", &stack).unwrap();
        modals.register_stack("panel", &stack).unwrap();
        assert_eq!(modals.stack("panel").unwrap(), stack);
    }

    #[test]
    fn unregister_requires_the_registered_instance() {
        let modals = Modals::new();
        let registered = ModalStack::new("panel", modals.layouts());
        let impostor = ModalStack::new("panel", modals.layouts());
        modals.register_stack("panel", &registered).unwrap();

        assert_eq!(
            modals.unregister_stack("panel", &impostor).err(),
            Some(ModalError::StackMismatch("panel".to_string()))
        );
        assert_eq!(modals.stack("panel").unwrap(), registered);

        modals.unregister_stack("panel", &registered).unwrap();
        assert_eq!(
            modals.stack("panel").err(),
            Some(ModalError::StackNotFound("panel".to_string()))
        );
    }

    #[test]
    fn unregister_of_unknown_name_is_a_mismatch() {
        let modals = Modals::new();
        let stack = ModalStack::new("panel", modals.layouts());
        assert_eq!(
            modals.unregister_stack("panel", &stack).err(),
            Some(ModalError::StackMismatch("panel".to_string()))
        );
    }

    #[test]
    fn open_routes_to_the_named_stack() {
        let modals = Modals::new();
        let stack = ModalStack::new("sidebar", modals.layouts());
        modals.register_stack("sidebar", &stack).unwrap();

        let handle = modals.open(embedded().stack("sidebar")).unwrap();
        assert!(stack.contains(handle.id()));
    }

    #[test]
    fn open_on_the_default_stack_auto_creates_it() {
        let modals = Modals::new();
        let handle = modals.open(embedded()).unwrap();
        let default = modals.stack(DEFAULT_STACK).unwrap();
        assert!(default.contains(handle.id()));
    }

    #[test]
    fn open_against_an_unknown_stack_fails_synchronously() {
        let modals = Modals::new();
        assert_eq!(
            modals.open(embedded().stack("nowhere")).err(),
            Some(ModalError::StackNotFound("nowhere".to_string()))
        );
    }

    #[test]
    fn failing_default_factory_reports_not_found() {
        let modals = Modals::with_default_surface(Box::new(|_| None));
        assert_eq!(
            modals.stack(DEFAULT_STACK).err(),
            Some(ModalError::StackNotFound(DEFAULT_STACK.to_string()))
        );
    }

    #[test]
    fn builtin_layouts_register_under_fixed_names() {
        let modals = Modals::new();
        modals.register_builtin_layouts(
            ComponentRef::new("dialog-presentation"),
            ComponentRef::new("drawer-presentation"),
        );
        assert!(modals.layouts().contains(layout::DIALOG));
        assert!(modals.layouts().contains(layout::DRAWER));

        // Plain dialog options resolve now.
        modals.open(ModalOptions::new(ComponentRef::new("content"))).unwrap();
    }
}
