#![forbid(unsafe_code)]

//! Ordered stack of active modals for one named display surface.
//!
//! The `ModalStack` owns the ordered sequence of open [`ModalHandle`]s:
//! insertion order is the visual stacking order, the last unremoved element
//! is topmost. Settlement drives removal synchronously, so the display layer
//! always observes a compact, duplicate-free sequence.
//!
//! # Invariants
//!
//! - Push admission is FIFO in call order; the sequence is never reordered.
//! - The sequence never contains a destroyed handle; removal compacts
//!   immediately (no tombstones, no gaps).
//! - No handle appears twice.
//! - Removal is idempotent: a handle may be force-closed by its owner's
//!   teardown concurrently with a normal close from its own UI.
//!
//! # Failure Modes
//!
//! - `push` with an unresolvable named layout: `LayoutNotFound`, nothing is
//!   admitted.
//! - Removing an id that is not present: no-op, not an error.
//! - Surface gone (weak reference dead): notifications are dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ModalError;
use crate::handle::{ModalHandle, ModalId};
use crate::layout::LayoutRegistry;
use crate::options::ModalOptions;
use crate::surface::DisplaySurface;

pub(crate) struct StackInner {
    name: String,
    layouts: LayoutRegistry,
    /// Active modals, bottom to top.
    modals: RefCell<Vec<ModalHandle>>,
    surface: RefCell<Option<Weak<dyn DisplaySurface>>>,
}

impl StackInner {
    /// Remove a settled handle from the sequence. Idempotent.
    pub(crate) fn remove(&self, id: ModalId) -> bool {
        let removed = {
            let mut modals = self.modals.borrow_mut();
            let before = modals.len();
            modals.retain(|handle| handle.id() != id);
            modals.len() != before
        };
        if removed {
            tracing::debug!(stack = %self.name, id = id.get(), "modal removed");
            if let Some(surface) = self.surface() {
                surface.on_remove(id);
            }
        }
        removed
    }

    fn surface(&self) -> Option<Rc<dyn DisplaySurface>> {
        self.surface.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// A named, ordered collection of currently active modals.
///
/// Clones are cheap references to the same stack; equality is instance
/// identity, which is what registration checks care about.
#[derive(Clone)]
pub struct ModalStack {
    inner: Rc<StackInner>,
}

impl ModalStack {
    /// Create an empty stack for the given surface name.
    pub fn new(name: impl Into<String>, layouts: LayoutRegistry) -> Self {
        Self {
            inner: Rc::new(StackInner {
                name: name.into(),
                layouts,
                modals: RefCell::new(Vec::new()),
                surface: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<StackInner>) -> Self {
        Self { inner }
    }

    /// The registry name of this stack.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // --- Stack Operations ---

    /// Open a modal on this stack.
    ///
    /// Resolves the layout (named layouts through the layout registry),
    /// appends a new handle in `Open` state as the topmost element, wires
    /// owner tracking when the options carry an owner, and notifies the
    /// attached surface. Returns the handle to the caller.
    pub fn push(&self, options: ModalOptions) -> Result<ModalHandle, ModalError> {
        let layout = self.inner.layouts.resolve(&options.layout)?;
        let id = ModalId::next();
        let handle = ModalHandle::new(id, options, layout, Rc::downgrade(&self.inner));

        if let Some(owner) = handle.options().owner.clone() {
            owner.track(handle.clone());
            handle.on_settle(move |_| owner.untrack(id));
        }

        self.inner.modals.borrow_mut().push(handle.clone());
        tracing::debug!(stack = %self.inner.name, id = id.get(), "modal pushed");
        if let Some(surface) = self.inner.surface() {
            surface.on_push(&handle);
        }
        Ok(handle)
    }

    /// Snapshot of the active handles, bottom to top.
    pub fn handles(&self) -> Vec<ModalHandle> {
        self.inner.modals.borrow().clone()
    }

    /// The topmost modal, if any.
    pub fn top(&self) -> Option<ModalHandle> {
        self.inner.modals.borrow().last().cloned()
    }

    /// The id of the topmost modal, if any.
    pub fn top_id(&self) -> Option<ModalId> {
        self.inner.modals.borrow().last().map(ModalHandle::id)
    }

    /// Whether a modal with the given id is active on this stack.
    pub fn contains(&self, id: ModalId) -> bool {
        self.inner
            .modals
            .borrow()
            .iter()
            .any(|handle| handle.id() == id)
    }

    /// Number of active modals.
    #[inline]
    pub fn depth(&self) -> usize {
        self.inner.modals.borrow().len()
    }

    /// Whether the stack has no active modals.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.modals.borrow().is_empty()
    }

    // --- Surface wiring ---

    /// Attach the display surface notified on push and remove.
    ///
    /// Held weakly; the surface owns the stack, not the other way round.
    pub fn set_surface(&self, surface: Weak<dyn DisplaySurface>) {
        *self.inner.surface.borrow_mut() = Some(surface);
    }

    /// Detach the display surface.
    pub fn clear_surface(&self) {
        *self.inner.surface.borrow_mut() = None;
    }
}

impl PartialEq for ModalStack {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ModalStack {}

impl fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStack")
            .field("name", &self.inner.name)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ComponentRef, LayoutSpec};
    use proptest::prelude::*;

    fn test_stack() -> ModalStack {
        ModalStack::new("test", LayoutRegistry::new())
    }

    fn embedded() -> ModalOptions {
        ModalOptions::new(ComponentRef::new("content"))
            .layout(LayoutSpec::Embedded(ComponentRef::new("layout")))
    }

    #[test]
    fn empty_stack() {
        let stack = test_stack();
        assert!(stack.is_empty());
        assert_eq!(stack.depth(), 0);
        assert!(stack.top().is_none());
        assert!(stack.top_id().is_none());
    }

    #[test]
    fn push_appends_topmost() {
        let stack = test_stack();
        let a = stack.push(embedded()).unwrap();
        let b = stack.push(embedded()).unwrap();

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top_id(), Some(b.id()));
        let ids: Vec<ModalId> = stack.handles().iter().map(ModalHandle::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn settling_a_middle_modal_compacts_the_sequence() {
        let stack = test_stack();
        let a = stack.push(embedded()).unwrap();
        let b = stack.push(embedded()).unwrap();
        let c = stack.push(embedded()).unwrap();

        b.destroy();

        let ids: Vec<ModalId> = stack.handles().iter().map(ModalHandle::id).collect();
        assert_eq!(ids, vec![a.id(), c.id()]);
        assert!(!stack.contains(b.id()));
        assert_eq!(stack.top_id(), Some(c.id()));
    }

    #[test]
    fn remove_is_idempotent() {
        let stack = test_stack();
        let handle = stack.push(embedded()).unwrap();
        handle.destroy();
        assert!(stack.is_empty());
        // A second settle path (owner teardown racing a UI close) hits an
        // already-absent id.
        handle.destroy();
        assert!(stack.is_empty());
    }

    #[test]
    fn unresolved_named_layout_admits_nothing() {
        let stack = test_stack();
        let result = stack.push(ModalOptions::new(ComponentRef::new("content")));
        assert_eq!(
            result.err(),
            Some(ModalError::LayoutNotFound("dialog".to_string()))
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn named_layout_resolves_through_the_registry() {
        let layouts = LayoutRegistry::new();
        let presentation = ComponentRef::new("drawer-presentation");
        layouts.register("drawer", presentation.clone());

        let stack = ModalStack::new("test", layouts);
        let handle = stack
            .push(ModalOptions::new(ComponentRef::new("content")).layout("drawer"))
            .unwrap();
        assert!(handle.layout().ptr_eq(&presentation));
    }

    #[test]
    fn clones_are_the_same_stack() {
        let stack = test_stack();
        let alias = stack.clone();
        assert_eq!(stack, alias);
        assert_ne!(stack, test_stack());

        alias.push(embedded()).unwrap();
        assert_eq!(stack.depth(), 1);
    }

    proptest! {
        /// The sequence always equals push order minus removed handles.
        #[test]
        fn push_order_preserved_minus_removals(
            ops in proptest::collection::vec(any::<(bool, usize)>(), 1..48)
        ) {
            let stack = test_stack();
            let mut model: Vec<ModalId> = Vec::new();

            for (push, pick) in ops {
                if push || model.is_empty() {
                    let handle = stack.push(embedded()).unwrap();
                    model.push(handle.id());
                } else {
                    let id = model.remove(pick % model.len());
                    let handle = stack
                        .handles()
                        .into_iter()
                        .find(|h| h.id() == id)
                        .unwrap();
                    handle.destroy();
                }

                let ids: Vec<ModalId> =
                    stack.handles().iter().map(ModalHandle::id).collect();
                prop_assert_eq!(ids, model.clone());
            }
        }
    }
}
