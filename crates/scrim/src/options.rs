#![forbid(unsafe_code)]

//! Options describing a single modal request.
//!
//! [`ModalOptions`] is built by the caller, submitted to
//! [`Modals::open`](crate::Modals::open), and consumed to construct a
//! [`ModalHandle`](crate::ModalHandle). It carries no identity of its own;
//! once submitted it is immutable.
//!
//! Host-framework values cross this seam dynamically typed:
//! [`ModalValue`] and [`ComponentRef`] wrap `Rc<dyn Any>` so the core stays
//! agnostic to the host's component and message types.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::layout;
use crate::owner::OwnerRef;

/// An opaque, dynamically typed value (modal result, prop value).
pub type ModalValue = Rc<dyn Any>;

/// Props passed to the modal's content component.
pub type PropMap = HashMap<String, ModalValue>;

/// Wrap a concrete value as a [`ModalValue`].
pub fn value<T: Any>(value: T) -> ModalValue {
    Rc::new(value)
}

/// Decision returned by a before-close hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseDecision {
    /// Let the close proceed.
    #[default]
    Proceed,
    /// Abort the close; the modal stays open.
    Veto,
}

/// Hook invoked synchronously before a close is applied.
///
/// Receives the value the close was requested with (if any). Returning
/// [`CloseDecision::Veto`] aborts the close. `destroy` bypasses this hook.
pub type BeforeCloseHook = Rc<dyn Fn(Option<&ModalValue>) -> CloseDecision>;

/// Opaque reference to a host component (content or layout presentation).
#[derive(Clone)]
pub struct ComponentRef {
    inner: Rc<dyn Any>,
}

impl ComponentRef {
    /// Wrap a host component.
    pub fn new<T: Any>(component: T) -> Self {
        Self {
            inner: Rc::new(component),
        }
    }

    /// Downcast back to the concrete component type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Whether two references point at the same component instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComponentRef(..)")
    }
}

/// The presentation wrapper for a modal: a registered layout name, or a
/// component embedded directly in the options.
///
/// Only the named case goes through the
/// [`LayoutRegistry`](crate::LayoutRegistry).
#[derive(Debug, Clone)]
pub enum LayoutSpec {
    /// A name resolved through the layout registry (e.g. `"dialog"`).
    Named(String),
    /// A presentation component supplied inline.
    Embedded(ComponentRef),
}

impl From<&str> for LayoutSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for LayoutSpec {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<ComponentRef> for LayoutSpec {
    fn from(component: ComponentRef) -> Self {
        Self::Embedded(component)
    }
}

/// Size constraints the display surface applies when placing the modal.
///
/// All bounds are optional; `clamp` never exceeds the available area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeConstraints {
    pub width: Option<u16>,
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
    pub height: Option<u16>,
    pub min_height: Option<u16>,
    pub max_height: Option<u16>,
}

impl SizeConstraints {
    /// Create an unconstrained size spec.
    pub const fn new() -> Self {
        Self {
            width: None,
            min_width: None,
            max_width: None,
            height: None,
            min_height: None,
            max_height: None,
        }
    }

    /// Set preferred width.
    pub fn width(mut self, value: u16) -> Self {
        self.width = Some(value);
        self
    }

    /// Set minimum width.
    pub fn min_width(mut self, value: u16) -> Self {
        self.min_width = Some(value);
        self
    }

    /// Set maximum width.
    pub fn max_width(mut self, value: u16) -> Self {
        self.max_width = Some(value);
        self
    }

    /// Set preferred height.
    pub fn height(mut self, value: u16) -> Self {
        self.height = Some(value);
        self
    }

    /// Set minimum height.
    pub fn min_height(mut self, value: u16) -> Self {
        self.min_height = Some(value);
        self
    }

    /// Set maximum height.
    pub fn max_height(mut self, value: u16) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Clamp to these constraints without exceeding the available area.
    pub fn clamp(self, available_width: u16, available_height: u16) -> (u16, u16) {
        let mut width = self.width.unwrap_or(available_width).min(available_width);
        let mut height = self
            .height
            .unwrap_or(available_height)
            .min(available_height);

        if let Some(max_width) = self.max_width {
            width = width.min(max_width);
        }
        if let Some(max_height) = self.max_height {
            height = height.min(max_height);
        }
        if let Some(min_width) = self.min_width {
            width = width.max(min_width).min(available_width);
        }
        if let Some(min_height) = self.min_height {
            height = height.max(min_height).min(available_height);
        }

        (width, height)
    }
}

/// Everything a caller can say about the modal it is requesting.
///
/// Constructed with [`ModalOptions::new`] and the chained setters; consumed
/// by [`ModalStack::push`](crate::ModalStack::push).
#[derive(Clone)]
pub struct ModalOptions {
    /// Target stack name. `None` routes to the default stack.
    pub stack: Option<String>,
    /// Owner to bind this modal's lifetime to, if any.
    pub owner: Option<OwnerRef>,
    /// Presentation wrapper. Defaults to the `"dialog"` layout name.
    pub layout: LayoutSpec,
    /// The component rendered inside the modal.
    pub component: ComponentRef,
    /// Props handed to the content component when it is built.
    pub props: PropMap,
    /// Result used when the modal settles without an explicit value.
    pub default_result: Option<ModalValue>,
    /// Whether the surface should render a close button.
    pub show_close: bool,
    /// Whether the surface should render a dimmed backdrop.
    pub backdrop: bool,
    /// Whether clicking the backdrop closes the modal.
    pub close_on_backdrop: bool,
    /// Size constraints for the display surface.
    pub size: SizeConstraints,
    /// Hook consulted before a close is applied.
    pub before_close: Option<BeforeCloseHook>,
}

impl ModalOptions {
    /// Options for displaying `component` with the default presentation.
    pub fn new(component: ComponentRef) -> Self {
        Self {
            stack: None,
            owner: None,
            layout: LayoutSpec::Named(layout::DIALOG.to_string()),
            component,
            props: PropMap::new(),
            default_result: None,
            show_close: true,
            backdrop: true,
            close_on_backdrop: true,
            size: SizeConstraints::new(),
            before_close: None,
        }
    }

    /// Route to the named stack instead of the default one.
    pub fn stack(mut self, name: impl Into<String>) -> Self {
        self.stack = Some(name.into());
        self
    }

    /// Bind the modal's lifetime to an owner.
    pub fn owner(mut self, owner: OwnerRef) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Select the presentation wrapper (layout name or embedded component).
    pub fn layout(mut self, layout: impl Into<LayoutSpec>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Add a prop for the content component.
    pub fn prop(mut self, key: impl Into<String>, value: ModalValue) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Replace the whole prop map.
    pub fn props(mut self, props: PropMap) -> Self {
        self.props = props;
        self
    }

    /// Result used when the modal settles without an explicit value.
    pub fn default_result(mut self, value: ModalValue) -> Self {
        self.default_result = Some(value);
        self
    }

    /// Whether the surface should render a close button.
    pub fn show_close(mut self, show: bool) -> Self {
        self.show_close = show;
        self
    }

    /// Whether the surface should render a dimmed backdrop.
    pub fn backdrop(mut self, backdrop: bool) -> Self {
        self.backdrop = backdrop;
        self
    }

    /// Whether clicking the backdrop closes the modal.
    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    /// Size constraints for the display surface.
    pub fn size(mut self, size: SizeConstraints) -> Self {
        self.size = size;
        self
    }

    /// Hook consulted before a close is applied.
    pub fn before_close(
        mut self,
        hook: impl Fn(Option<&ModalValue>) -> CloseDecision + 'static,
    ) -> Self {
        self.before_close = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("stack", &self.stack)
            .field("layout", &self.layout)
            .field("props", &self.props.len())
            .field("has_default", &self.default_result.is_some())
            .field("show_close", &self.show_close)
            .field("backdrop", &self.backdrop)
            .field("close_on_backdrop", &self.close_on_backdrop)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
