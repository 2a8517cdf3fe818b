#![forbid(unsafe_code)]

//! The seam between the coordination core and whatever renders the modals.
//!
//! A display surface owns one [`ModalStack`], registers it in the
//! [`Modals`](crate::Modals) service on mount, renders the stack's ordered
//! handle sequence, and unregisters on unmount. The core only pushes
//! notifications through the [`DisplaySurface`] trait; rendering itself is
//! the host framework's business.
//!
//! [`HeadlessSurface`] is the reference implementation: it performs the full
//! mount/unmount contract and records the notifications it receives. It
//! backs the implicitly created default stack and doubles as a probe in
//! tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ModalError;
use crate::handle::{ModalHandle, ModalId};
use crate::registry::Modals;
use crate::stack::ModalStack;

/// Callbacks a display surface receives from its stack.
pub trait DisplaySurface {
    /// A modal was appended as the new topmost element.
    fn on_push(&self, handle: &ModalHandle);

    /// A settled modal was removed from the sequence.
    fn on_remove(&self, id: ModalId);
}

/// Notification recorded by a [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Pushed(ModalId),
    Removed(ModalId),
}

/// A display surface with no rendering: the mount/unmount contract and
/// nothing else.
pub struct HeadlessSurface {
    stack: ModalStack,
    events: RefCell<Vec<SurfaceEvent>>,
}

impl HeadlessSurface {
    /// Create a stack for `name`, wire it to a new surface, and register it.
    ///
    /// Fails with `DuplicateStackName` if another instance already holds the
    /// name; nothing is mounted in that case.
    pub fn mount(modals: &Modals, name: impl Into<String>) -> Result<Rc<Self>, ModalError> {
        let name = name.into();
        let stack = ModalStack::new(name.clone(), modals.layouts());
        let surface = Rc::new(Self {
            stack: stack.clone(),
            events: RefCell::new(Vec::new()),
        });
        let dyn_surface: Rc<dyn DisplaySurface> = surface.clone();
        let weak: Weak<dyn DisplaySurface> = Rc::downgrade(&dyn_surface);
        stack.set_surface(weak);
        modals.register_stack(&name, &stack)?;
        tracing::debug!(name = %stack.name(), "modal surface mounted");
        Ok(surface)
    }

    /// Unregister this surface's stack (identity-checked).
    pub fn unmount(&self, modals: &Modals) -> Result<(), ModalError> {
        self.stack.clear_surface();
        modals.unregister_stack(self.stack.name(), &self.stack)
    }

    /// The stack this surface renders.
    pub fn stack(&self) -> &ModalStack {
        &self.stack
    }

    /// Snapshot of the notifications received so far.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded notifications.
    pub fn take_events(&self) -> Vec<SurfaceEvent> {
        self.events.take()
    }
}

impl DisplaySurface for HeadlessSurface {
    fn on_push(&self, handle: &ModalHandle) {
        self.events.borrow_mut().push(SurfaceEvent::Pushed(handle.id()));
    }

    fn on_remove(&self, id: ModalId) {
        self.events.borrow_mut().push(SurfaceEvent::Removed(id));
    }
}

impl fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessSurface")
            .field("stack", &self.stack)
            .field("events", &self.events.borrow().len())
            .finish()
    }
}
