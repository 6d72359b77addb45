#![forbid(unsafe_code)]

//! Layout guard: pin an image's box before its source changes.
//!
//! A `@2x` asset has twice the intrinsic size of the original. Without
//! explicit `width`/`height`, an unstyled `<img>` would double in size the
//! moment the swap lands.

use crate::config::AttributeNames;
use crate::host::Element;

/// Write `width`/`height` attributes matching the element's current size.
///
/// Uses the rendered offset size, or the natural size when the element has
/// no rendered box yet (both offset dimensions zero). Does nothing when the
/// element carries the no-resize attribute. Returns `element` for chaining.
pub fn freeze_dimensions<'a, E: Element>(element: &'a E, attributes: &AttributeNames) -> &'a E {
    if element.has_attribute(&attributes.no_resize) {
        return element;
    }

    let offset = element.offset_size();
    let size = if offset.is_zero() {
        element.natural_size()
    } else {
        offset
    };

    element.set_attribute("width", &size.width.to_string());
    element.set_attribute("height", &size.height.to_string());
    element
}
