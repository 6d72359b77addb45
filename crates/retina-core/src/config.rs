#![forbid(unsafe_code)]

//! Dispatcher configuration.
//!
//! A [`RetinaConfig`] is built once at application start and handed to
//! [`Retina`](crate::Retina). It carries the environment density (read from
//! the host exactly once), the markup contract's attribute names, and an
//! optional observer for failed probes.
//!
//! # Example
//!
//! ```
//! use retina_core::{Density, RetinaConfig};
//!
//! let config = RetinaConfig::builder()
//!     .density(Density::new(2).unwrap())
//!     .directive_attribute("data-hd")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.attributes().directive, "data-hd");
//! assert_eq!(config.attributes().processed, "data-rjs-processed");
//! ```

use core::fmt;
use std::rc::Rc;

use crate::density::Density;
use crate::error::ConfigError;
use crate::host::{ElementKind, Host};

/// Default directive attribute.
pub const DIRECTIVE_ATTR: &str = "data-rjs";
/// Default processed-marker attribute.
pub const PROCESSED_ATTR: &str = "data-rjs-processed";
/// Default layout-guard opt-out attribute.
pub const NO_RESIZE_ATTR: &str = "data-no-resize";

/// Attribute names making up the markup contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    /// Density cap or explicit URL. Elements without it are ignored.
    pub directive: String,
    /// Written by the dispatcher; presence means "already handled".
    pub processed: String,
    /// Presence disables the layout guard.
    pub no_resize: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            directive: DIRECTIVE_ATTR.to_owned(),
            processed: PROCESSED_ATTR.to_owned(),
            no_resize: NO_RESIZE_ATTR.to_owned(),
        }
    }
}

impl AttributeNames {
    fn validate(&self) -> Result<(), ConfigError> {
        let roles = [
            ("directive", &self.directive),
            ("processed", &self.processed),
            ("no-resize", &self.no_resize),
        ];
        for (role, name) in roles {
            if name.is_empty() {
                return Err(ConfigError::EmptyAttributeName(role));
            }
            if !name.chars().all(is_attribute_char) {
                return Err(ConfigError::InvalidAttributeName {
                    role,
                    name: name.clone(),
                });
            }
        }
        for (i, (_, a)) in roles.iter().enumerate() {
            if roles[i + 1..].iter().any(|(_, b)| a.eq_ignore_ascii_case(b)) {
                return Err(ConfigError::DuplicateAttributeName((*a).clone()));
            }
        }
        Ok(())
    }
}

/// Attribute names end up inside `[name]` selectors, so keep them plain.
fn is_attribute_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// A probe that failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    /// Candidate URL that was probed.
    pub url: String,
    /// Element the candidate was meant for.
    pub kind: ElementKind,
}

/// Observer invoked for every failed probe.
pub type ProbeFailureHook = Rc<dyn Fn(&ProbeFailure)>;

/// Dispatcher configuration. Cheap to clone.
#[derive(Clone)]
pub struct RetinaConfig {
    density: Density,
    attributes: AttributeNames,
    probe_failure: Option<ProbeFailureHook>,
}

impl fmt::Debug for RetinaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetinaConfig")
            .field("density", &self.density)
            .field("attributes", &self.attributes)
            .field("probe_failure", &self.probe_failure.is_some())
            .finish()
    }
}

impl Default for RetinaConfig {
    fn default() -> Self {
        Self {
            density: Density::STANDARD,
            attributes: AttributeNames::default(),
            probe_failure: None,
        }
    }
}

impl RetinaConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> RetinaConfigBuilder {
        RetinaConfigBuilder::default()
    }

    /// Default attribute names and the density read from `host`.
    #[must_use]
    pub fn detect<H: Host + ?Sized>(host: &H) -> Self {
        Self {
            density: Density::detect(host),
            ..Self::default()
        }
    }

    /// Environment density.
    #[inline]
    #[must_use]
    pub fn density(&self) -> Density {
        self.density
    }

    /// Markup contract attribute names.
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeNames {
        &self.attributes
    }

    /// Report a failed probe to the observer, if any.
    pub fn report_probe_failure(&self, failure: &ProbeFailure) {
        #[cfg(feature = "tracing")]
        tracing::debug!(url = %failure.url, kind = failure.kind.as_str(), "probe failed");
        if let Some(hook) = &self.probe_failure {
            hook(failure);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DensitySource {
    Fixed(Density),
    Factor(f64),
}

/// Builder for [`RetinaConfig`].
#[derive(Default)]
pub struct RetinaConfigBuilder {
    density: Option<DensitySource>,
    attributes: AttributeNames,
    probe_failure: Option<ProbeFailureHook>,
}

impl fmt::Debug for RetinaConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetinaConfigBuilder")
            .field("density", &self.density)
            .field("attributes", &self.attributes)
            .field("probe_failure", &self.probe_failure.is_some())
            .finish()
    }
}

impl RetinaConfigBuilder {
    /// Use a fixed density.
    #[must_use]
    pub fn density(mut self, density: Density) -> Self {
        self.density = Some(DensitySource::Fixed(density));
        self
    }

    /// Use a density given as a number (e.g. from a JS options object).
    ///
    /// Must be finite and at least 1; rounded half-up. Checked by
    /// [`build`](Self::build).
    #[must_use]
    pub fn density_factor(mut self, factor: f64) -> Self {
        self.density = Some(DensitySource::Factor(factor));
        self
    }

    /// Read the density from `host`.
    #[must_use]
    pub fn detect<H: Host + ?Sized>(self, host: &H) -> Self {
        self.density(Density::detect(host))
    }

    /// Override the directive attribute (default `data-rjs`).
    #[must_use]
    pub fn directive_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.directive = name.into();
        self
    }

    /// Override the processed-marker attribute (default `data-rjs-processed`).
    #[must_use]
    pub fn processed_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.processed = name.into();
        self
    }

    /// Override the layout-guard opt-out attribute (default `data-no-resize`).
    #[must_use]
    pub fn no_resize_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.no_resize = name.into();
        self
    }

    /// Observe failed probes. Without an observer failures are silent.
    #[must_use]
    pub fn on_probe_failure(mut self, hook: impl Fn(&ProbeFailure) + 'static) -> Self {
        self.probe_failure = Some(Rc::new(hook));
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<RetinaConfig, ConfigError> {
        self.attributes.validate()?;
        let density = match self.density {
            None => Density::STANDARD,
            Some(DensitySource::Fixed(d)) => d,
            Some(DensitySource::Factor(f)) => {
                if !f.is_finite() || f < 1.0 {
                    return Err(ConfigError::InvalidDensity(f));
                }
                Density::from_pixel_ratio(Some(f))
            }
        };
        Ok(RetinaConfig {
            density,
            attributes: self.attributes,
            probe_failure: self.probe_failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn defaults_follow_markup_contract() {
        let config = RetinaConfig::builder().build().unwrap();
        assert_eq!(config.density(), Density::STANDARD);
        assert_eq!(config.attributes(), &AttributeNames::default());
        assert_eq!(config.attributes().directive, "data-rjs");
        assert_eq!(config.attributes().no_resize, "data-no-resize");
        assert!(format!("{config:?}").contains("probe_failure: false"));
    }

    #[test]
    fn empty_attribute_is_rejected() {
        let err = RetinaConfig::builder()
            .processed_attribute("")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyAttributeName("processed"));
    }

    #[test]
    fn selector_metacharacters_are_rejected() {
        let err = RetinaConfig::builder()
            .directive_attribute("data-rjs]")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAttributeName { role: "directive", .. }));
    }

    #[test]
    fn duplicate_roles_are_rejected() {
        let err = RetinaConfig::builder()
            .no_resize_attribute("DATA-RJS")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateAttributeName("data-rjs".into()));
    }

    #[test]
    fn density_factor_is_validated_and_rounded() {
        let config = RetinaConfig::builder().density_factor(2.6).build().unwrap();
        assert_eq!(config.density().get(), 3);

        for bad in [0.5, f64::NAN, f64::NEG_INFINITY] {
            let err = RetinaConfig::builder().density_factor(bad).build().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidDensity(_)));
        }
    }

    #[test]
    fn failure_hook_receives_reports() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let config = RetinaConfig::builder()
            .on_probe_failure(move |f| sink.borrow_mut().push(f.url.clone()))
            .build()
            .unwrap();
        config.report_probe_failure(&ProbeFailure {
            url: "a@2x.png".into(),
            kind: ElementKind::Image,
        });
        assert_eq!(*seen.borrow(), vec!["a@2x.png".to_owned()]);
    }

    #[test]
    fn debug_hides_hook_body() {
        let config = RetinaConfig::builder().on_probe_failure(|_| {}).build().unwrap();
        assert!(format!("{config:?}").contains("probe_failure: true"));
    }
}
