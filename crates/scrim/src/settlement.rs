#![forbid(unsafe_code)]

//! Settle-once deferred primitive backing [`ModalHandle`](crate::ModalHandle).
//!
//! A [`Settlement`] is the "future" half of a modal: the identity and
//! metadata live on the handle, the eventual outcome lives here. Callers
//! attach observers; all of them are notified exactly once when the modal
//! settles, in registration order.
//!
//! # Invariants
//!
//! 1. A settlement transitions from pending to settled at most once;
//!    `settle` after the first call is a no-op returning `false`.
//! 2. Every observer is invoked exactly once with the final outcome.
//! 3. An observer attached after settlement is invoked immediately.
//! 4. Observers run with no internal borrow held, so they may re-enter
//!    stack or owner bookkeeping freely.
//!
//! # Failure Modes
//!
//! - Observer panic: propagates to the caller of `settle` (or of
//!   `on_settle` for late attachment); remaining observers are not run.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::ModalError;
use crate::options::ModalValue;

/// The final outcome of a modal: a result value, or a rejection error.
pub type SettleOutcome = Result<ModalValue, ModalError>;

type Observer = Box<dyn FnOnce(&SettleOutcome)>;

#[derive(Default)]
struct SettleInner {
    outcome: Option<SettleOutcome>,
    observers: Vec<Observer>,
}

/// Shared settle-once state of a single modal.
///
/// Cheap to clone; clones observe the same settlement.
#[derive(Clone, Default)]
pub struct Settlement {
    inner: Rc<RefCell<SettleInner>>,
}

impl Settlement {
    /// Create a pending settlement.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the settlement has an outcome.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.inner.borrow().outcome.is_some()
    }

    /// The outcome, if settled.
    #[must_use]
    pub fn outcome(&self) -> Option<SettleOutcome> {
        self.inner.borrow().outcome.clone()
    }

    /// Attach an observer for the settlement outcome.
    ///
    /// Fires immediately if the settlement already has an outcome.
    pub fn on_settle(&self, observer: impl FnOnce(&SettleOutcome) + 'static) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            match inner.outcome.clone() {
                Some(outcome) => outcome,
                None => {
                    inner.observers.push(Box::new(observer));
                    return;
                }
            }
        };
        observer(&outcome);
    }

    /// Apply the outcome and notify all observers.
    ///
    /// Returns `false` (and does nothing) if already settled. Observers are
    /// drained out of the shared state before any of them runs.
    pub(crate) fn settle(&self, outcome: SettleOutcome) -> bool {
        let observers = {
            let mut inner = self.inner.borrow_mut();
            if inner.outcome.is_some() {
                return false;
            }
            inner.outcome = Some(outcome.clone());
            std::mem::take(&mut inner.observers)
        };
        tracing::trace!(
            rejected = outcome.is_err(),
            observers = observers.len(),
            "modal settled"
        );
        for observer in observers {
            observer(&outcome);
        }
        true
    }
}

impl fmt::Debug for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settlement")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::value;
    use std::cell::Cell;

    #[test]
    fn starts_pending() {
        let settlement = Settlement::new();
        assert!(!settlement.is_settled());
        assert!(settlement.outcome().is_none());
    }

    #[test]
    fn settles_exactly_once() {
        let settlement = Settlement::new();
        assert!(settlement.settle(Ok(value(1i32))));
        assert!(!settlement.settle(Ok(value(2i32))));

        let outcome = settlement.outcome().unwrap().unwrap();
        assert_eq!(outcome.downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn all_observers_notified_once() {
        let settlement = Settlement::new();
        let count = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let count = Rc::clone(&count);
            settlement.on_settle(move |_| count.set(count.get() + 1));
        }

        settlement.settle(Err(ModalError::NoDefaultResult));
        assert_eq!(count.get(), 3);

        // Repeat settles do not re-notify.
        settlement.settle(Ok(value(())));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn late_observer_fires_immediately() {
        let settlement = Settlement::new();
        settlement.settle(Ok(value("done")));

        let seen = Rc::new(Cell::new(false));
        let probe = Rc::clone(&seen);
        settlement.on_settle(move |outcome| {
            assert!(outcome.is_ok());
            probe.set(true);
        });
        assert!(seen.get());
    }

    #[test]
    fn observers_may_attach_more_observers() {
        let settlement = Settlement::new();
        let count = Rc::new(Cell::new(0));

        let inner_count = Rc::clone(&count);
        let chained = settlement.clone();
        settlement.on_settle(move |_| {
            let inner_count = Rc::clone(&inner_count);
            // Attaching after settlement fires immediately.
            chained.on_settle(move |_| inner_count.set(inner_count.get() + 1));
        });

        settlement.settle(Err(ModalError::OwnerDestroyed));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn clones_share_the_same_outcome() {
        let settlement = Settlement::new();
        let alias = settlement.clone();
        settlement.settle(Err(ModalError::OwnerDestroyed));
        match alias.outcome() {
            Some(Err(error)) => assert_eq!(error, ModalError::OwnerDestroyed),
            other => panic!("expected a rejection, got {:?}", other.map(|o| o.is_ok())),
        }
    }
}
