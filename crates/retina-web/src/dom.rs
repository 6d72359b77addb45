#![forbid(unsafe_code)]

//! `web-sys` implementations of the core host traits.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use retina_core::{Element, ElementKind, Host, ProbeCallback, ProbeOutcome, Size};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CssStyleDeclaration, HtmlElement, HtmlImageElement, SvgElement, Window};

const BACKGROUND_IMAGE: &str = "background-image";

/// A DOM element handle.
///
/// HTML and SVG elements are both accepted; only an HTML `<img>` takes the
/// image path, everything else swaps its inline `background-image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebElement {
    el: web_sys::Element,
}

impl WebElement {
    /// Wrap a DOM element.
    #[must_use]
    pub fn new(el: web_sys::Element) -> Self {
        Self { el }
    }

    /// Accept a JS value if it is an element. Text nodes and plain values
    /// yield `None`.
    #[must_use]
    pub fn from_js(value: JsValue) -> Option<Self> {
        value.dyn_into::<web_sys::Element>().ok().map(Self::new)
    }

    /// Inline style of an HTML or SVG element.
    fn style(&self) -> Option<CssStyleDeclaration> {
        if let Some(html) = self.el.dyn_ref::<HtmlElement>() {
            Some(html.style())
        } else {
            self.el.dyn_ref::<SvgElement>().map(SvgElement::style)
        }
    }
}

fn css_px(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl Element for WebElement {
    fn kind(&self) -> ElementKind {
        if self.el.is_instance_of::<HtmlImageElement>() {
            ElementKind::Image
        } else {
            ElementKind::Background
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.el.get_attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.el.has_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.el.set_attribute(name, value);
    }

    fn background_image(&self) -> String {
        self.style()
            .and_then(|style| style.get_property_value(BACKGROUND_IMAGE).ok())
            .unwrap_or_default()
    }

    fn set_background_image(&self, value: &str) {
        if let Some(style) = self.style() {
            let _ = style.set_property(BACKGROUND_IMAGE, value);
        }
    }

    fn offset_size(&self) -> Size {
        match self.el.dyn_ref::<HtmlElement>() {
            Some(html) => Size::new(css_px(html.offset_width()), css_px(html.offset_height())),
            None => Size::ZERO,
        }
    }

    fn natural_size(&self) -> Size {
        match self.el.dyn_ref::<HtmlImageElement>() {
            Some(img) => Size::new(img.natural_width(), img.natural_height()),
            None => Size::ZERO,
        }
    }
}

/// The browser window and its document.
///
/// Constructed outside a window (e.g. in a worker) it reports no pixel
/// ratio, finds no elements, and never completes a probe.
#[derive(Debug, Clone, Default)]
pub struct WebHost {
    window: Option<Window>,
}

impl WebHost {
    /// Bind to the global `window`, if there is one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
        }
    }

    /// The bound window.
    #[must_use]
    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

impl Host for WebHost {
    type Element = WebElement;

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.window.as_ref().map(Window::device_pixel_ratio)
    }

    fn query_attribute(&self, attribute: &str) -> Vec<WebElement> {
        let Some(document) = self.window.as_ref().and_then(Window::document) else {
            return Vec::new();
        };
        let Ok(list) = document.query_selector_all(&format!("[{attribute}]")) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(WebElement::new)
            .collect()
    }

    fn probe(&self, url: &str, on_complete: ProbeCallback) {
        if self.window.is_none() {
            return;
        }
        let Ok(probe) = HtmlImageElement::new() else {
            return;
        };

        // Whichever of load/error fires first takes the callback. The other
        // one-shot closure is never invoked and stays allocated.
        let slot = Rc::new(RefCell::new(Some(on_complete)));
        for (event, outcome) in [("load", ProbeOutcome::Loaded), ("error", ProbeOutcome::Failed)] {
            let slot = Rc::clone(&slot);
            let listener = Closure::once_into_js(move || {
                let callback = slot.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(outcome);
                }
            });
            let _ = probe.add_event_listener_with_callback(event, listener.unchecked_ref());
        }
        probe.set_src(url);
    }
}
