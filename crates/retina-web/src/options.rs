#![forbid(unsafe_code)]

//! JS options and report shapes, kept free of JS types so they can be tested
//! natively.
//!
//! The wasm layer reads the JS options object into [`WebOptions`] with
//! `Reflect` and turns a [`DispatchReport`] into a plain object using
//! [`report_fields`].

use retina_core::{Density, DispatchReport, RetinaConfig, RetinaConfigBuilder};

/// Option key: directive attribute name.
pub const DIRECTIVE_ATTR_KEY: &str = "directiveAttr";
/// Option key: processed-marker attribute name.
pub const PROCESSED_ATTR_KEY: &str = "processedAttr";
/// Option key: layout-guard opt-out attribute name.
pub const NO_RESIZE_ATTR_KEY: &str = "noResizeAttr";
/// Option key: explicit density, overriding `devicePixelRatio`.
pub const DENSITY_KEY: &str = "density";
/// Option key: `(failure: { url, kind }) => void` observer.
pub const ON_PROBE_FAILURE_KEY: &str = "onProbeFailure";

/// Options accepted by `new Retina(options)`.
///
/// Every field is optional; `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebOptions {
    pub directive_attr: Option<String>,
    pub processed_attr: Option<String>,
    pub no_resize_attr: Option<String>,
    pub density: Option<f64>,
}

impl WebOptions {
    /// Start a config builder from these options.
    ///
    /// `detected` is the density read from the window; an explicit
    /// `density` option replaces it and is validated when the builder is
    /// built.
    #[must_use]
    pub fn into_builder(self, detected: Density) -> RetinaConfigBuilder {
        let mut builder = RetinaConfig::builder().density(detected);
        if let Some(factor) = self.density {
            builder = builder.density_factor(factor);
        }
        if let Some(name) = self.directive_attr {
            builder = builder.directive_attribute(name);
        }
        if let Some(name) = self.processed_attr {
            builder = builder.processed_attribute(name);
        }
        if let Some(name) = self.no_resize_attr {
            builder = builder.no_resize_attribute(name);
        }
        builder
    }
}

/// Fields of the object returned by `Retina.run()` and `window.retinajs()`.
#[must_use]
pub fn report_fields(report: &DispatchReport) -> [(&'static str, usize); 7] {
    [
        ("scanned", report.scanned),
        ("alreadyProcessed", report.already_processed),
        ("noDirective", report.no_directive),
        ("dynamicProbes", report.dynamic_probes),
        ("manualProbes", report.manual_probes),
        ("notNeeded", report.not_needed),
        ("probed", report.probed()),
    ]
}
