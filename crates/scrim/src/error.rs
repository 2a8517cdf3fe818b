#![forbid(unsafe_code)]

//! Errors from modal registry, stack, and settlement operations.
//!
//! Registry and stack resolution errors are returned synchronously from
//! [`Modals::open`](crate::Modals::open) and friends. Settlement errors
//! (`NoDefaultResult`, `OwnerDestroyed`) are delivered through the handle's
//! rejection channel and never thrown from `close`/`destroy`.

use thiserror::Error;

/// Errors from modal operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    /// The requested named stack was never registered.
    #[error("no modal stack registered under name \"{0}\"")]
    StackNotFound(String),

    /// A different stack instance is already registered under this name.
    #[error("a modal stack named \"{0}\" is already registered")]
    DuplicateStackName(String),

    /// Unregistration was attempted with a stack that is not the one
    /// currently registered under this name.
    #[error("cannot unregister modal stack \"{0}\": a different instance is registered")]
    StackMismatch(String),

    /// A named layout was not found in the layout registry.
    #[error("no layout registered under name \"{0}\"")]
    LayoutNotFound(String),

    /// The modal settled without a value and no default result was
    /// configured in its options.
    #[error("modal closed without a value and no default result was configured")]
    NoDefaultResult,

    /// The owner that opened this modal was torn down.
    #[error("the owner of this modal was destroyed")]
    OwnerDestroyed,

    /// The before-close hook vetoed the close; the modal stays open.
    #[error("close was vetoed by the before-close hook")]
    PreCloseAborted,
}
