#![forbid(unsafe_code)]

//! Probe-and-swap: load a candidate off-screen, commit it only on success.
//!
//! The element is marked processed as soon as the probe is issued, not when
//! it settles. A failed probe therefore blocks the element for the rest of
//! the page's life, and a second dispatch running before the first probe
//! settles never issues a duplicate load.

use std::rc::Rc;

use crate::config::{ProbeFailure, RetinaConfig};
use crate::css_url::format_css_url;
use crate::host::{Element, ElementKind, Host, ProbeOutcome};
use crate::layout_guard::freeze_dimensions;

/// Value written to the processed-marker attribute.
pub const PROCESSED_VALUE: &str = "true";

/// Probe `candidate` and swap it into `element` once it loads.
pub fn probe_and_swap<H: Host + ?Sized>(
    host: &H,
    element: &H::Element,
    candidate: &str,
    config: &Rc<RetinaConfig>,
) {
    let target = element.clone();
    let url = candidate.to_owned();
    let config_for_load = Rc::clone(config);

    host.probe(
        candidate,
        Box::new(move |outcome: ProbeOutcome| match outcome {
            ProbeOutcome::Loaded => commit_swap(&target, &url, &config_for_load),
            ProbeOutcome::Failed => config_for_load.report_probe_failure(&ProbeFailure {
                url,
                kind: target.kind(),
            }),
        }),
    );

    element.set_attribute(&config.attributes().processed, PROCESSED_VALUE);
}

/// Point `element` at a loaded high-resolution `url`.
///
/// Images get the layout guard then a new `src`; everything else gets a new
/// inline `background-image`.
pub fn commit_swap<E: Element>(element: &E, url: &str, config: &RetinaConfig) {
    match element.kind() {
        ElementKind::Image => {
            freeze_dimensions(element, config.attributes()).set_attribute("src", url);
        }
        ElementKind::Background => element.set_background_image(&format_css_url(url)),
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(url, kind = element.kind().as_str(), "swapped to high-density source");
}
