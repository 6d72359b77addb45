#![forbid(unsafe_code)]

//! Headless document host for native testing.
//!
//! [`HeadlessDocument`] implements [`Host`] without a browser. It is
//! designed for:
//!
//! - **Unit and integration tests** of the dispatcher on native targets
//! - **Deterministic probe scheduling**: probes queue up and settle only when
//!   the test says so, in whatever order the test chooses
//! - **Environment simulation**: any pixel ratio, no windowing context, or
//!   no document at all
//!
//! A probe loads if its URL was registered with [`HeadlessDocument::serve`]
//! or [`HeadlessDocument::serve_with_size`]; every other probe fails. An
//! `<img>` appended to the document takes the natural size registered for
//! its `src` whenever `src` changes, as a browser would after the load.
//!
//! # Example
//!
//! ```
//! use retina_core::headless::{HeadlessDocument, HeadlessElement};
//! use retina_core::{Element, Retina};
//!
//! let doc = HeadlessDocument::new().with_pixel_ratio(2.0);
//! let div = doc.append(
//!     HeadlessElement::new("div")
//!         .with_background_image("url(bg.png)")
//!         .with_attribute("data-rjs", "2"),
//! );
//!
//! Retina::detect(doc.clone()).run_document();
//! assert_eq!(doc.pending_probes(), ["bg@2x.png"]);
//!
//! // Not served: the probe fails and the element keeps its background.
//! doc.complete_all();
//! assert_eq!(div.background_image(), "url(bg.png)");
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::host::{Element, ElementKind, Host, ProbeCallback, ProbeOutcome, Size};

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

type AssetSizes = Rc<RefCell<HashMap<String, Size>>>;

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    background_image: String,
    offset: Size,
    natural: Size,
    assets: Option<AssetSizes>,
}

/// Shared handle to an in-memory element.
///
/// Clones point at the same element, like DOM node references.
#[derive(Clone, Default)]
pub struct HeadlessElement {
    data: Rc<RefCell<ElementData>>,
}

impl fmt::Debug for HeadlessElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("HeadlessElement")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("background_image", &data.background_image)
            .finish()
    }
}

impl HeadlessElement {
    /// Create an element with the given tag name.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            data: Rc::new(RefCell::new(ElementData {
                tag: tag.to_owned(),
                ..ElementData::default()
            })),
        }
    }

    /// Create an `<img>` with a `src`.
    #[must_use]
    pub fn img(src: &str) -> Self {
        Self::new("img").with_attribute("src", src)
    }

    /// Set an attribute (builder form).
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set the inline `background-image` value (builder form).
    #[must_use]
    pub fn with_background_image(self, value: &str) -> Self {
        self.set_background_image(value);
        self
    }

    /// Set the rendered box size.
    #[must_use]
    pub fn with_offset_size(self, width: u32, height: u32) -> Self {
        self.data.borrow_mut().offset = Size::new(width, height);
        self
    }

    /// Set the intrinsic image size.
    #[must_use]
    pub fn with_natural_size(self, width: u32, height: u32) -> Self {
        self.data.borrow_mut().natural = Size::new(width, height);
        self
    }

    /// Tag name as given at construction.
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.data.borrow().tag.clone()
    }

    /// Remove an attribute.
    pub fn remove_attribute(&self, name: &str) {
        self.data.borrow_mut().attributes.remove(name);
    }

    /// Whether two handles refer to the same element.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Element for HeadlessElement {
    fn kind(&self) -> ElementKind {
        ElementKind::from_tag_name(&self.data.borrow().tag)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut data = self.data.borrow_mut();
        if name == "src" && ElementKind::from_tag_name(&data.tag) == ElementKind::Image {
            let size = data
                .assets
                .as_ref()
                .and_then(|assets| assets.borrow().get(value).copied());
            if let Some(size) = size {
                data.natural = size;
            }
        }
        data.attributes.insert(name.to_owned(), value.to_owned());
    }

    fn background_image(&self) -> String {
        self.data.borrow().background_image.clone()
    }

    fn set_background_image(&self, value: &str) {
        self.data.borrow_mut().background_image = value.to_owned();
    }

    fn offset_size(&self) -> Size {
        self.data.borrow().offset
    }

    fn natural_size(&self) -> Size {
        let data = self.data.borrow();
        match ElementKind::from_tag_name(&data.tag) {
            ElementKind::Image => data.natural,
            ElementKind::Background => Size::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

struct PendingProbe {
    url: String,
    on_complete: ProbeCallback,
}

#[derive(Default)]
struct DocumentState {
    pixel_ratio: Cell<Option<f64>>,
    detached: Cell<bool>,
    elements: RefCell<Vec<HeadlessElement>>,
    served: RefCell<HashSet<String>>,
    assets: AssetSizes,
    pending: RefCell<VecDeque<PendingProbe>>,
    probe_log: RefCell<Vec<String>>,
}

/// In-memory document and display environment.
///
/// Cheap to clone; clones share state, so a test can hand one clone to
/// [`Retina`](crate::Retina) and keep another to drive probes.
#[derive(Clone, Default)]
pub struct HeadlessDocument {
    state: Rc<DocumentState>,
}

impl fmt::Debug for HeadlessDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessDocument")
            .field("pixel_ratio", &self.state.pixel_ratio.get())
            .field("detached", &self.state.detached.get())
            .field("elements", &self.state.elements.borrow().len())
            .field("pending_probes", &self.state.pending.borrow().len())
            .finish()
    }
}

impl HeadlessDocument {
    /// A document with no windowing context (pixel ratio unavailable).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `ratio` as the device pixel ratio.
    #[must_use]
    pub fn with_pixel_ratio(self, ratio: f64) -> Self {
        self.state.pixel_ratio.set(Some(ratio));
        self
    }

    /// Drop the document: queries return nothing.
    #[must_use]
    pub fn without_document(self) -> Self {
        self.state.detached.set(true);
        self
    }

    /// Append an element, returning a handle to it.
    ///
    /// From here on, setting the element's `src` to a URL registered with
    /// [`serve_with_size`](Self::serve_with_size) updates its natural size.
    pub fn append(&self, element: HeadlessElement) -> HeadlessElement {
        element.data.borrow_mut().assets = Some(Rc::clone(&self.state.assets));
        self.state.elements.borrow_mut().push(element.clone());
        element
    }

    /// All elements in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<HeadlessElement> {
        self.state.elements.borrow().clone()
    }

    /// Make probes of `url` succeed.
    pub fn serve(&self, url: &str) {
        self.state.served.borrow_mut().insert(url.to_owned());
    }

    /// Make probes of `url` succeed, and give it an intrinsic size that
    /// images pick up when their `src` is set to it.
    pub fn serve_with_size(&self, url: &str, width: u32, height: u32) {
        self.serve(url);
        self.state
            .assets
            .borrow_mut()
            .insert(url.to_owned(), Size::new(width, height));
    }

    /// URLs of probes issued but not yet settled, oldest first.
    #[must_use]
    pub fn pending_probes(&self) -> Vec<String> {
        self.state
            .pending
            .borrow()
            .iter()
            .map(|p| p.url.clone())
            .collect()
    }

    /// Every URL ever probed, in issue order.
    #[must_use]
    pub fn probe_log(&self) -> Vec<String> {
        self.state.probe_log.borrow().clone()
    }

    /// Settle the oldest pending probe.
    pub fn complete_next(&self) -> Option<(String, ProbeOutcome)> {
        let probe = self.state.pending.borrow_mut().pop_front()?;
        Some(self.settle(probe))
    }

    /// Settle the oldest pending probe of `url`, leaving the others queued.
    pub fn complete_url(&self, url: &str) -> Option<ProbeOutcome> {
        let probe = {
            let mut pending = self.state.pending.borrow_mut();
            let index = pending.iter().position(|p| p.url == url)?;
            pending.remove(index)?
        };
        Some(self.settle(probe).1)
    }

    /// Settle every pending probe, oldest first. Returns how many settled.
    pub fn complete_all(&self) -> usize {
        let mut settled = 0;
        while self.complete_next().is_some() {
            settled += 1;
        }
        settled
    }

    /// Drop every pending probe without calling back, as if the loads hung.
    pub fn abandon_pending(&self) -> usize {
        let mut pending = self.state.pending.borrow_mut();
        let count = pending.len();
        pending.clear();
        count
    }

    fn settle(&self, probe: PendingProbe) -> (String, ProbeOutcome) {
        let outcome = if self.state.served.borrow().contains(&probe.url) {
            ProbeOutcome::Loaded
        } else {
            ProbeOutcome::Failed
        };
        (probe.on_complete)(outcome);
        (probe.url, outcome)
    }
}

impl Host for HeadlessDocument {
    type Element = HeadlessElement;

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.state.pixel_ratio.get()
    }

    fn query_attribute(&self, attribute: &str) -> Vec<HeadlessElement> {
        if self.state.detached.get() {
            return Vec::new();
        }
        self.state
            .elements
            .borrow()
            .iter()
            .filter(|el| el.has_attribute(attribute))
            .cloned()
            .collect()
    }

    fn probe(&self, url: &str, on_complete: ProbeCallback) {
        self.state.probe_log.borrow_mut().push(url.to_owned());
        self.state.pending.borrow_mut().push_back(PendingProbe {
            url: url.to_owned(),
            on_complete,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_element_state() {
        let a = HeadlessElement::img("x.png");
        let b = a.clone();
        b.set_attribute("alt", "x");
        assert_eq!(a.attribute("alt").as_deref(), Some("x"));
        assert!(a.same_node(&b));
        assert!(!a.same_node(&HeadlessElement::img("x.png")));
    }

    #[test]
    fn query_filters_by_attribute_in_order() {
        let doc = HeadlessDocument::new();
        let first = doc.append(HeadlessElement::img("1.png").with_attribute("data-rjs", "2"));
        doc.append(HeadlessElement::img("2.png"));
        let third = doc.append(HeadlessElement::new("div").with_attribute("data-rjs", ""));

        let found = doc.query_attribute("data-rjs");
        assert_eq!(found.len(), 2);
        assert!(found[0].same_node(&first));
        assert!(found[1].same_node(&third));
    }

    #[test]
    fn detached_document_has_no_elements() {
        let doc = HeadlessDocument::new().without_document();
        doc.append(HeadlessElement::img("1.png").with_attribute("data-rjs", "2"));
        assert!(doc.query_attribute("data-rjs").is_empty());
    }

    #[test]
    fn probes_wait_for_the_test() {
        let doc = HeadlessDocument::new();
        doc.serve("ok.png");
        let settled = Rc::new(RefCell::new(Vec::new()));
        for url in ["ok.png", "missing.png"] {
            let sink = Rc::clone(&settled);
            doc.probe(url, Box::new(move |o: ProbeOutcome| sink.borrow_mut().push(o)));
        }
        assert!(settled.borrow().is_empty());
        assert_eq!(doc.pending_probes(), ["ok.png", "missing.png"]);

        assert_eq!(doc.complete_url("missing.png"), Some(ProbeOutcome::Failed));
        assert_eq!(
            doc.complete_next(),
            Some(("ok.png".to_owned(), ProbeOutcome::Loaded))
        );
        assert_eq!(*settled.borrow(), [ProbeOutcome::Failed, ProbeOutcome::Loaded]);
        assert_eq!(doc.complete_all(), 0);
        assert_eq!(doc.probe_log(), ["ok.png", "missing.png"]);
    }

    #[test]
    fn abandoned_probes_never_call_back() {
        let doc = HeadlessDocument::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        doc.probe("slow.png", Box::new(move |_: ProbeOutcome| flag.set(true)));
        assert_eq!(doc.abandon_pending(), 1);
        assert_eq!(doc.complete_all(), 0);
        assert!(!fired.get());
    }

    #[test]
    fn src_change_loads_served_natural_size() {
        let doc = HeadlessDocument::new();
        doc.serve_with_size("a@2x.png", 128, 96);
        let img = doc.append(HeadlessElement::img("a.png").with_natural_size(64, 48));
        let loose = HeadlessElement::img("a.png").with_natural_size(64, 48);

        img.set_attribute("src", "unknown.png");
        assert_eq!(img.natural_size(), Size::new(64, 48));
        img.set_attribute("src", "a@2x.png");
        assert_eq!(img.natural_size(), Size::new(128, 96));

        // Not in the document: no asset table to consult.
        loose.set_attribute("src", "a@2x.png");
        assert_eq!(loose.natural_size(), Size::new(64, 48));
    }

    #[test]
    fn background_elements_have_no_natural_size() {
        let div = HeadlessElement::new("div").with_natural_size(10, 10);
        assert_eq!(div.natural_size(), Size::ZERO);
        assert_eq!(div.kind(), ElementKind::Background);
    }
}
