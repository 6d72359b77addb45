#![forbid(unsafe_code)]

//! Host abstraction: the display environment the dispatcher runs against.
//!
//! The core never holds DOM types. A host supplies:
//! - the device pixel ratio (or `None` without a windowing context),
//! - the elements carrying the directive attribute,
//! - detached probe loads with a single-fire completion callback.
//!
//! Elements are shared handles, like DOM nodes: cloning one yields another
//! reference to the same node, and mutation goes through `&self`. This lets a
//! probe callback keep the element alive and update it once the load
//! settles, long after the dispatch loop has returned.

/// Completion callback for a probe load. Fires at most once.
pub type ProbeCallback = Box<dyn FnOnce(ProbeOutcome)>;

/// How a probe load settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The resource loaded; it is safe to show.
    Loaded,
    /// The resource failed to load (missing, network error, not an image).
    Failed,
}

/// What kind of element is being swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// An `<img>` tag: the `src` attribute is swapped.
    Image,
    /// Anything else: the inline `background-image` is swapped.
    Background,
}

impl ElementKind {
    /// Classify a tag name. Only `img` (any case) is an image.
    #[must_use]
    pub fn from_tag_name(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("img") {
            Self::Image
        } else {
            Self::Background
        }
    }

    /// Stable lowercase label, used in reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Background => "background",
        }
    }
}

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Zero-sized box.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are zero (not laid out, or hidden).
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// A markup element the dispatcher can read and mutate.
pub trait Element: Clone + 'static {
    /// Image or background element.
    fn kind(&self) -> ElementKind;

    /// Attribute value, or `None` when the attribute is absent.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Whether the attribute is present (any value, including empty).
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute. Hosts swallow rejections (e.g. invalid names).
    fn set_attribute(&self, name: &str, value: &str);

    /// Inline `background-image` style value; empty when unset.
    fn background_image(&self) -> String;

    /// Replace the inline `background-image` style value.
    fn set_background_image(&self, value: &str);

    /// Rendered box size (`offsetWidth` / `offsetHeight`).
    fn offset_size(&self) -> Size;

    /// Intrinsic size of the loaded image. Zero for non-images.
    fn natural_size(&self) -> Size;
}

/// The display environment.
pub trait Host {
    type Element: Element;

    /// Raw device pixel ratio, or `None` without a windowing context.
    fn device_pixel_ratio(&self) -> Option<f64>;

    /// All elements in the document carrying `attribute`, in document order.
    ///
    /// Hosts without a document return an empty list.
    fn query_attribute(&self, attribute: &str) -> Vec<Self::Element>;

    /// Start a detached load of `url`.
    ///
    /// `on_complete` runs later, from the host's event loop, once the load
    /// settles. It never runs before `probe` returns. A load that never
    /// settles never calls back.
    fn probe(&self, url: &str, on_complete: ProbeCallback);
}
