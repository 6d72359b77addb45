#![forbid(unsafe_code)]

//! Element scanner and dispatcher.
//!
//! [`Retina`] owns a [`Host`] and a [`RetinaConfig`] and walks candidate
//! elements, sending each one down one of two paths:
//!
//! ```text
//! element
//!   ├─ already processed ─────────────→ skip
//!   ├─ no directive attribute ────────→ skip (left unmarked)
//!   ├─ numeric directive  → dynamic: cap = min(density, n)
//!   │                          cap > 1 && source → resolve @{cap}x → probe
//!   └─ anything else      → manual:  density > 1 → probe directive URL
//! ```
//!
//! Dispatch never fails and never blocks: probes settle later through the
//! host, and the element is marked processed the moment its probe is issued.
//! Nothing is activated implicitly; the embedding application decides when
//! to call [`Retina::run_document`] (typically from the page `load` event).

use std::rc::Rc;

use crate::config::RetinaConfig;
use crate::css_url::extract_css_url;
use crate::density::Density;
use crate::directive::{Directive, choose_cap};
use crate::host::{Element, ElementKind, Host};
use crate::probe::probe_and_swap;
use crate::resolve::resolve_url;

/// Which swap path an element took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapPath {
    /// Numeric directive: URL derived from the source.
    Dynamic,
    /// URL directive: used verbatim.
    Manual,
}

/// What dispatch did with one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Carried the processed marker; untouched.
    AlreadyProcessed,
    /// Had no directive attribute; untouched and not marked.
    NoDirective,
    /// A probe was issued for `url`; the element is now marked processed.
    Probed { path: SwapPath, url: String },
    /// No swap needed (standard density, cap ≤ 1, or no source); not marked.
    NotNeeded(SwapPath),
}

/// Tally of one dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Elements visited.
    pub scanned: usize,
    pub already_processed: usize,
    pub no_directive: usize,
    /// Probes issued on the dynamic path.
    pub dynamic_probes: usize,
    /// Probes issued on the manual path.
    pub manual_probes: usize,
    pub not_needed: usize,
}

impl DispatchReport {
    /// Probes issued on either path.
    #[must_use]
    pub fn probed(&self) -> usize {
        self.dynamic_probes + self.manual_probes
    }

    fn record(&mut self, disposition: &Disposition) {
        self.scanned += 1;
        match disposition {
            Disposition::AlreadyProcessed => self.already_processed += 1,
            Disposition::NoDirective => self.no_directive += 1,
            Disposition::Probed {
                path: SwapPath::Dynamic,
                ..
            } => self.dynamic_probes += 1,
            Disposition::Probed {
                path: SwapPath::Manual,
                ..
            } => self.manual_probes += 1,
            Disposition::NotNeeded(_) => self.not_needed += 1,
        }
    }
}

/// The retina dispatcher.
pub struct Retina<H: Host> {
    host: H,
    config: Rc<RetinaConfig>,
}

impl<H: Host> Retina<H> {
    /// Create a dispatcher with an explicit configuration.
    #[must_use]
    pub fn new(host: H, config: RetinaConfig) -> Self {
        Self {
            host,
            config: Rc::new(config),
        }
    }

    /// Create a dispatcher with default attributes and the host's density.
    #[must_use]
    pub fn detect(host: H) -> Self {
        let config = RetinaConfig::detect(&host);
        Self::new(host, config)
    }

    /// The host this dispatcher runs against.
    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The configuration.
    #[inline]
    pub fn config(&self) -> &RetinaConfig {
        &self.config
    }

    /// Environment density, fixed at construction.
    #[inline]
    pub fn density(&self) -> Density {
        self.config.density()
    }

    /// Dispatch `elements`, or every directive-bearing element in the
    /// document when `None`.
    pub fn retina(&self, elements: Option<Vec<H::Element>>) -> DispatchReport {
        match elements {
            Some(elements) => self.run(elements),
            None => self.run_document(),
        }
    }

    /// Dispatch every element in the document carrying the directive
    /// attribute. A host without a document yields an empty report.
    pub fn run_document(&self) -> DispatchReport {
        let elements = self.host.query_attribute(&self.config.attributes().directive);
        self.run(elements)
    }

    /// Dispatch an explicit collection of elements.
    pub fn run<I>(&self, elements: I) -> DispatchReport
    where
        I: IntoIterator<Item = H::Element>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("retina.dispatch", density = self.density().get()).entered();

        let mut report = DispatchReport::default();
        for element in elements {
            let disposition = self.dispatch(&element);
            report.record(&disposition);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            scanned = report.scanned,
            probed = report.probed(),
            skipped = report.no_directive + report.already_processed,
            "dispatch finished"
        );
        report
    }

    /// Dispatch a single element.
    pub fn dispatch(&self, element: &H::Element) -> Disposition {
        let attrs = self.config.attributes();
        if element.has_attribute(&attrs.processed) {
            return Disposition::AlreadyProcessed;
        }
        let Some(raw) = element.attribute(&attrs.directive) else {
            return Disposition::NoDirective;
        };

        let density = self.density();
        let disposition = match Directive::parse(&raw) {
            Directive::Cap(requested) => {
                let cap = choose_cap(density, requested);
                match source_of(element).and_then(|src| resolve_url(&src, cap)) {
                    Some(url) => self.probe(element, SwapPath::Dynamic, url),
                    None => Disposition::NotNeeded(SwapPath::Dynamic),
                }
            }
            Directive::Url(url) if density.is_high_density() => {
                self.probe(element, SwapPath::Manual, url)
            }
            Directive::Url(_) => Disposition::NotNeeded(SwapPath::Manual),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            kind = element.kind().as_str(),
            directive = %raw,
            disposition = ?disposition,
            "dispatched element"
        );
        disposition
    }

    fn probe(&self, element: &H::Element, path: SwapPath, url: String) -> Disposition {
        probe_and_swap(&self.host, element, &url, &self.config);
        Disposition::Probed { path, url }
    }
}

/// The current source of `element`: `src` for images, the inline
/// `background-image` URL otherwise. `None` when empty or absent.
fn source_of<E: Element>(element: &E) -> Option<String> {
    let src = match element.kind() {
        ElementKind::Image => element.attribute("src")?,
        ElementKind::Background => extract_css_url(&element.background_image()).into_owned(),
    };
    (!src.is_empty()).then_some(src)
}
