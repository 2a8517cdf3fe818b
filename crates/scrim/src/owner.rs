#![forbid(unsafe_code)]

//! Lifetime-binding of modals to the caller that opened them.
//!
//! A host component that opens modals owns a [`CallerBinding`]; the weak
//! [`OwnerRef`] it hands out goes into [`ModalOptions`](crate::ModalOptions)
//! and ties each opened handle to the owner's lifetime. When the owner is
//! torn down (explicit [`CallerBinding::teardown`] or plain drop), every
//! still-open handle is force-closed with
//! [`ModalError::OwnerDestroyed`].
//!
//! Tracking is bookkeeping only; the stack stays the source of truth. A
//! handle leaves its owner's list the moment it settles, whatever caused
//! the settlement, so a UI-triggered close racing an owner-triggered
//! teardown lands on idempotent removal rather than a stale reference.
//!
//! # Invariants
//!
//! 1. A settled handle is never retained in the tracking list.
//! 2. Teardown iterates a snapshot, so untracking during the walk never
//!    invalidates the iteration.
//! 3. Handles that settled before teardown are skipped (destroy is
//!    idempotent).
//!
//! # Failure Modes
//!
//! - `OwnerRef` used after its binding was dropped: tracking silently does
//!   nothing; the modal simply outlives no one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ModalError;
use crate::handle::{ModalHandle, ModalId};
use crate::options::ModalOptions;
use crate::registry::Modals;

type TrackedList = Rc<RefCell<Vec<ModalHandle>>>;

/// Per-owner bookkeeping of the modals opened on its behalf.
///
/// Dropping the binding tears down every still-open tracked modal.
#[derive(Default)]
pub struct CallerBinding {
    tracked: TrackedList,
}

impl CallerBinding {
    /// Create a binding with no tracked modals.
    pub fn new() -> Self {
        Self::default()
    }

    /// A weak owner reference for [`ModalOptions`](crate::ModalOptions).
    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef {
            tracked: Rc::downgrade(&self.tracked),
        }
    }

    /// Open a modal bound to this owner.
    ///
    /// Shorthand for stamping [`owner_ref`](Self::owner_ref) into the
    /// options before [`Modals::open`].
    pub fn open(&self, modals: &Modals, options: ModalOptions) -> Result<ModalHandle, ModalError> {
        modals.open(options.owner(self.owner_ref()))
    }

    /// Number of currently tracked (unsettled) modals.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.tracked.borrow().len()
    }

    /// Force-close every tracked modal with
    /// [`ModalError::OwnerDestroyed`].
    ///
    /// Safe to call repeatedly. Iterates a snapshot of the tracked list:
    /// each destroy untracks the handle from the live list via its
    /// settlement observer, never from under the iteration.
    pub fn teardown(&self) {
        let snapshot: Vec<ModalHandle> = self.tracked.borrow().clone();
        if !snapshot.is_empty() {
            tracing::debug!(count = snapshot.len(), "owner torn down; destroying its modals");
        }
        for handle in snapshot {
            handle.destroy_with_error(ModalError::OwnerDestroyed);
        }
        self.tracked.borrow_mut().clear();
    }
}

impl Drop for CallerBinding {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for CallerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerBinding")
            .field("tracked", &self.tracked_count())
            .finish()
    }
}

/// Weak, non-owning reference to a [`CallerBinding`].
///
/// Cheap to clone; placed into modal options to bind the modal's lifetime
/// to the owner.
#[derive(Clone)]
pub struct OwnerRef {
    tracked: Weak<RefCell<Vec<ModalHandle>>>,
}

impl OwnerRef {
    /// Whether the owning binding is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.tracked.strong_count() > 0
    }

    /// Start tracking a newly opened handle.
    pub(crate) fn track(&self, handle: ModalHandle) {
        if let Some(tracked) = self.tracked.upgrade() {
            tracked.borrow_mut().push(handle);
        }
    }

    /// Stop tracking a handle. Idempotent; called on every settlement.
    pub(crate) fn untrack(&self, id: ModalId) {
        if let Some(tracked) = self.tracked.upgrade() {
            tracked.borrow_mut().retain(|handle| handle.id() != id);
        }
    }
}

impl fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}
