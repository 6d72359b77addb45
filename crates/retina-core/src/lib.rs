#![forbid(unsafe_code)]

//! Core: density detection, high-resolution URL resolution, probing, and
//! layout preservation for retina image swapping.
//!
//! # Role in Retina
//! `retina-core` holds every decision the swapper makes. It never touches a
//! real DOM: the display environment is reached through the [`Host`] and
//! [`Element`] traits, implemented by `retina-web` for browsers and by
//! [`headless::HeadlessDocument`] for deterministic native tests.
//!
//! # Primary responsibilities
//! - **Density**: the environment's pixel ratio, rounded once at startup.
//! - **Directive**: `data-rjs` values, either a numeric cap or an explicit URL.
//! - **Resolution**: `photo.png` + cap 2 → `photo@2x.png`.
//! - **Probe-and-swap**: load the candidate off-screen, commit on success.
//! - **Layout guard**: pin `width`/`height` before an `<img>` source changes.
//! - **Dispatch**: walk candidate elements and handle each exactly once.
//!
//! # Example
//!
//! ```
//! use retina_core::headless::{HeadlessDocument, HeadlessElement};
//! use retina_core::{Element, Retina, RetinaConfig};
//!
//! let doc = HeadlessDocument::new().with_pixel_ratio(2.0);
//! let img = doc.append(HeadlessElement::img("photo.png").with_attribute("data-rjs", "3"));
//! doc.serve("photo@2x.png");
//!
//! let retina = Retina::new(doc.clone(), RetinaConfig::detect(&doc));
//! let report = retina.run_document();
//! assert_eq!(report.probed(), 1);
//!
//! doc.complete_all();
//! assert_eq!(img.attribute("src").as_deref(), Some("photo@2x.png"));
//! ```

pub mod config;
pub mod css_url;
pub mod density;
pub mod directive;
pub mod dispatch;
pub mod error;
pub mod headless;
pub mod host;
pub mod layout_guard;
pub mod probe;
pub mod resolve;

pub use config::{AttributeNames, ProbeFailure, RetinaConfig, RetinaConfigBuilder};
pub use density::Density;
pub use directive::{Directive, choose_cap, parse_leading_int};
pub use dispatch::{Disposition, DispatchReport, Retina, SwapPath};
pub use error::ConfigError;
pub use host::{Element, ElementKind, Host, ProbeCallback, ProbeOutcome, Size};
pub use resolve::{insert_density_suffix, resolve_url};
