#![forbid(unsafe_code)]

//! Modal lifecycle and stack coordination for component-based UIs.
//!
//! `scrim` is the part of an overlay system that is not rendering: a
//! registry of named modal stacks, a per-modal state machine
//! (`Open → Settled → Destroyed`), and the promise-like handle a caller
//! gets back from an open-request. How a modal looks on screen is the host
//! framework's business; which modals exist, in what order, and what each
//! one eventually resolved to is this crate's.
//!
//! # Architecture
//!
//! - [`Modals`] is the explicitly constructed coordination service: stack
//!   registry, layout registry, and the caller-facing [`Modals::open`].
//! - [`ModalStack`] keeps the ordered sequence of active modals for one
//!   named display surface (push order is stacking order, last is topmost).
//! - [`ModalHandle`] is the caller's handle: metadata plus a settle-once
//!   [`Settlement`] that carries the result value or rejection error.
//! - [`CallerBinding`] ties modals to the component that opened them and
//!   force-closes leftovers when that component is torn down.
//! - [`LayoutRegistry`] maps symbolic layout names (`"dialog"`, `"drawer"`)
//!   to presentation components.
//!
//! Everything is single-threaded `Rc`/`RefCell` sharing: stack mutations
//! are synchronous in-process calls, and logical call chains interleave
//! only at settlement observation points.
//!
//! # Example
//!
//! ```
//! use scrim::{ComponentRef, Modals, ModalOptions, value};
//!
//! let modals = Modals::new();
//! modals.register_builtin_layouts(
//!     ComponentRef::new("dialog-presentation"),
//!     ComponentRef::new("drawer-presentation"),
//! );
//!
//! let handle = modals
//!     .open(ModalOptions::new(ComponentRef::new("confirm-box")).default_result(value(false)))
//!     .unwrap();
//!
//! handle.on_resolve(|choice| {
//!     let confirmed = choice.downcast_ref::<bool>().copied().unwrap_or(false);
//!     println!("confirmed: {confirmed}");
//! });
//!
//! handle.close_with(value(true)).unwrap();
//! assert!(handle.is_settled());
//! ```

pub mod error;
pub mod handle;
pub mod layout;
pub mod options;
pub mod owner;
pub mod registry;
pub mod settlement;
pub mod stack;
pub mod surface;

pub use error::ModalError;
pub use handle::{ModalHandle, ModalId, ModalState};
pub use layout::LayoutRegistry;
pub use options::{
    value, BeforeCloseHook, CloseDecision, ComponentRef, LayoutSpec, ModalOptions, ModalValue,
    PropMap, SizeConstraints,
};
pub use owner::{CallerBinding, OwnerRef};
pub use registry::{DefaultSurfaceFactory, Modals, DEFAULT_STACK};
pub use settlement::{SettleOutcome, Settlement};
pub use stack::ModalStack;
pub use surface::{DisplaySurface, HeadlessSurface, SurfaceEvent};
