#![forbid(unsafe_code)]

//! The handle returned for every open modal.
//!
//! A [`ModalHandle`] is the caller's view of one overlay: its identity, the
//! options it was opened with, the resolved presentation component, and the
//! promise-like [`Settlement`] that eventually carries the result. The
//! handle holds only a weak back-reference to its stack; the stack's ordered
//! sequence remains the authoritative record of which modals exist.
//!
//! # Invariants
//!
//! 1. Ids are unique for the process lifetime and monotonically increasing.
//! 2. A handle settles at most once; `close`/`destroy` on a settled handle
//!    never change the outcome.
//! 3. `destroy` never fails and never panics, whatever the current state;
//!    it is the cancellation primitive.
//! 4. Within one settling call the order is: state to `Settled`, removal
//!    from the stack (surface notified), state to `Destroyed`, observers.
//!
//! # Failure Modes
//!
//! - `close` with the before-close hook vetoing: returns
//!   [`ModalError::PreCloseAborted`], handle stays `Open`.
//! - Settling without a value and without a configured default: the handle
//!   rejects with [`ModalError::NoDefaultResult`].
//! - Stack already gone (surface unmounted): removal is silently skipped.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ModalError;
use crate::options::{CloseDecision, ComponentRef, ModalOptions, ModalValue};
use crate::settlement::{SettleOutcome, Settlement};
use crate::stack::{ModalStack, StackInner};

/// Global counter for unique modal ids.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a modal within the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Allocate the next id.
    pub(crate) fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle state of a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    /// Visible, not yet settled.
    Open,
    /// Outcome applied, removal in progress.
    Settled,
    /// Removed from stack bookkeeping. Terminal.
    Destroyed,
}

pub(crate) struct HandleInner {
    id: ModalId,
    options: ModalOptions,
    layout: ComponentRef,
    stack: Weak<StackInner>,
    state: Cell<ModalState>,
    settlement: Settlement,
}

/// Promise-like handle to one open modal.
///
/// Clones are cheap and refer to the same modal.
#[derive(Clone)]
pub struct ModalHandle {
    inner: Rc<HandleInner>,
}

impl ModalHandle {
    pub(crate) fn new(
        id: ModalId,
        options: ModalOptions,
        layout: ComponentRef,
        stack: Weak<StackInner>,
    ) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                id,
                options,
                layout,
                stack,
                state: Cell::new(ModalState::Open),
                settlement: Settlement::new(),
            }),
        }
    }

    /// This modal's unique id.
    #[inline]
    pub fn id(&self) -> ModalId {
        self.inner.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModalState {
        self.inner.state.get()
    }

    /// The options this modal was opened with.
    pub fn options(&self) -> &ModalOptions {
        &self.inner.options
    }

    /// The resolved presentation component.
    pub fn layout(&self) -> &ComponentRef {
        &self.inner.layout
    }

    /// The stack this modal belongs to, while it still exists.
    pub fn stack(&self) -> Option<ModalStack> {
        self.inner.stack.upgrade().map(ModalStack::from_inner)
    }

    /// The settlement carrying this modal's eventual outcome.
    pub fn settlement(&self) -> &Settlement {
        &self.inner.settlement
    }

    /// Whether the modal has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.inner.settlement.is_settled()
    }

    /// The outcome, if settled.
    #[must_use]
    pub fn outcome(&self) -> Option<SettleOutcome> {
        self.inner.settlement.outcome()
    }

    /// Attach an observer for the outcome (fires immediately if settled).
    pub fn on_settle(&self, observer: impl FnOnce(&SettleOutcome) + 'static) {
        self.inner.settlement.on_settle(observer);
    }

    /// Attach an observer for successful settlement only.
    pub fn on_resolve(&self, observer: impl FnOnce(&ModalValue) + 'static) {
        self.on_settle(move |outcome| {
            if let Ok(value) = outcome {
                observer(value);
            }
        });
    }

    /// Attach an observer for rejection only.
    pub fn on_reject(&self, observer: impl FnOnce(&ModalError) + 'static) {
        self.on_settle(move |outcome| {
            if let Err(error) = outcome {
                observer(error);
            }
        });
    }

    // --- Settling ---

    /// Close the modal with its default result.
    ///
    /// No-op on an already settled handle. The before-close hook runs first;
    /// a veto aborts with [`ModalError::PreCloseAborted`] and the modal
    /// stays open. Settlement errors (such as a missing default) travel
    /// through the rejection channel, not this return value.
    pub fn close(&self) -> Result<(), ModalError> {
        self.close_inner(None)
    }

    /// Close the modal with an explicit result value.
    pub fn close_with(&self, value: ModalValue) -> Result<(), ModalError> {
        self.close_inner(Some(value))
    }

    fn close_inner(&self, value: Option<ModalValue>) -> Result<(), ModalError> {
        if self.is_settled() {
            return Ok(());
        }
        if let Some(hook) = self.inner.options.before_close.as_deref() {
            if let CloseDecision::Veto = hook(value.as_ref()) {
                tracing::debug!(id = self.inner.id.get(), "close vetoed by before-close hook");
                return Err(ModalError::PreCloseAborted);
            }
        }
        let outcome = self.resolve_value(value);
        self.finalize(Some(outcome));
        Ok(())
    }

    /// Force the modal shut, resolving with its default result.
    ///
    /// Bypasses the before-close hook. Idempotent and safe in any state,
    /// even when the handle is already gone from its stack.
    pub fn destroy(&self) {
        self.destroy_inner(None);
    }

    /// Force the modal shut, rejecting with `error`.
    ///
    /// Used for abnormal teardown (e.g. the owner was destroyed). Bypasses
    /// the before-close hook; idempotent.
    pub fn destroy_with_error(&self, error: ModalError) {
        self.destroy_inner(Some(error));
    }

    fn destroy_inner(&self, error: Option<ModalError>) {
        let outcome = if self.is_settled() {
            None
        } else {
            Some(match error {
                Some(error) => Err(error),
                None => self.resolve_value(None),
            })
        };
        self.finalize(outcome);
    }

    /// Explicit value, else the configured default, else rejection.
    fn resolve_value(&self, value: Option<ModalValue>) -> SettleOutcome {
        value
            .or_else(|| self.inner.options.default_result.clone())
            .ok_or(ModalError::NoDefaultResult)
    }

    /// Apply settlement (if any), remove from the stack, mark destroyed.
    ///
    /// Observers fire last, after the stack no longer lists the handle.
    fn finalize(&self, outcome: Option<SettleOutcome>) {
        if outcome.is_some() {
            self.inner.state.set(ModalState::Settled);
        }
        if let Some(stack) = self.inner.stack.upgrade() {
            stack.remove(self.inner.id);
        }
        self.inner.state.set(ModalState::Destroyed);
        if let Some(outcome) = outcome {
            self.inner.settlement.settle(outcome);
        }
    }
}

impl PartialEq for ModalHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ModalHandle {}

impl fmt::Debug for ModalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHandle")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.get())
            .finish()
    }
}
