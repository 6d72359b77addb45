#![forbid(unsafe_code)]

//! Browser binding for `retina-core`.
//!
//! This crate provides the `web-sys` host ([`WebHost`], [`WebElement`]) and
//! a `wasm-bindgen`-exported `Retina` class for JavaScript. Nothing runs on
//! module load: the page calls `new Retina().install()` to swap once the
//! window has loaded (immediately, if it already has), or `run()` directly
//! for content added later.
//!
//! Option parsing and report shaping live in [`options`] so they can be
//! tested on native targets.

pub mod options;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::{WebElement, WebHost};
#[cfg(target_arch = "wasm32")]
pub use wasm::RetinaJs;
