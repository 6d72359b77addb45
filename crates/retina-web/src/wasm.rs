#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: the JS-facing `Retina` class.
//!
//! Only compiled on `wasm32` targets.
//!
//! ```js
//! import init, { Retina } from "retina-web";
//!
//! await init();
//! const retina = new Retina({ onProbeFailure: (f) => console.debug(f.url) });
//! retina.install(); // runs once the page has loaded, exposes window.retinajs
//! retina.run(document.querySelectorAll(".late-images [data-rjs]"));
//! ```

use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use retina_core::{Density, DispatchReport, ProbeFailure, Retina};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::{WebElement, WebHost};
use crate::options::{
    DENSITY_KEY, DIRECTIVE_ATTR_KEY, NO_RESIZE_ATTR_KEY, ON_PROBE_FAILURE_KEY,
    PROCESSED_ATTR_KEY, WebOptions, report_fields,
};

/// Name of the global installed on `window`.
const GLOBAL_NAME: &str = "retinajs";

/// `document.readyState` once the window `load` event has fired.
const READY_STATE_COMPLETE: &str = "complete";

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "retina panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("retina panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn get_option(options: &Option<JsValue>, key: &str) -> Option<JsValue> {
    options
        .as_ref()
        .and_then(|o| Reflect::get(o, &JsValue::from_str(key)).ok())
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn parse_options(options: &Option<JsValue>) -> WebOptions {
    WebOptions {
        directive_attr: get_option(options, DIRECTIVE_ATTR_KEY).and_then(|v| v.as_string()),
        processed_attr: get_option(options, PROCESSED_ATTR_KEY).and_then(|v| v.as_string()),
        no_resize_attr: get_option(options, NO_RESIZE_ATTR_KEY).and_then(|v| v.as_string()),
        density: get_option(options, DENSITY_KEY).and_then(|v| v.as_f64()),
    }
}

fn failure_to_js(failure: &ProbeFailure) -> JsValue {
    let obj = Object::new();
    let _ = Reflect::set(&obj, &"url".into(), &JsValue::from_str(&failure.url));
    let _ = Reflect::set(&obj, &"kind".into(), &failure.kind.as_str().into());
    obj.into()
}

fn report_to_js(report: &DispatchReport) -> JsValue {
    let obj = Object::new();
    for (key, value) in report_fields(report) {
        let _ = Reflect::set(&obj, &key.into(), &JsValue::from_f64(value as f64));
    }
    obj.into()
}

/// Normalize an array, `NodeList`, or array-like (jQuery selection) into
/// elements. `undefined`/`null` means "the whole document".
fn collect_elements(elements: Option<JsValue>) -> Option<Vec<WebElement>> {
    let elements = elements.filter(|v| !v.is_undefined() && !v.is_null())?;
    Some(
        Array::from(&elements)
            .iter()
            .filter_map(WebElement::from_js)
            .collect(),
    )
}

fn run_with(retina: &Retina<WebHost>, elements: Option<JsValue>) -> DispatchReport {
    retina.retina(collect_elements(elements))
}

/// Retina image swapper bound to the current window.
///
/// The density is read from `window.devicePixelRatio` once, at construction.
#[wasm_bindgen(js_name = Retina)]
pub struct RetinaJs {
    inner: Rc<Retina<WebHost>>,
    installed: bool,
}

#[wasm_bindgen(js_class = Retina)]
impl RetinaJs {
    /// Create a swapper. `options` may set `directiveAttr`, `processedAttr`,
    /// `noResizeAttr`, `density`, and `onProbeFailure`.
    ///
    /// Throws if the options are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<RetinaJs, JsValue> {
        install_panic_hook();
        let host = WebHost::new();
        let mut builder = parse_options(&options).into_builder(Density::detect(&host));
        if let Some(hook) =
            get_option(&options, ON_PROBE_FAILURE_KEY).and_then(|v| v.dyn_into::<Function>().ok())
        {
            builder = builder.on_probe_failure(move |failure| {
                let _ = hook.call1(&JsValue::NULL, &failure_to_js(failure));
            });
        }
        let config = builder
            .build()
            .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
        Ok(Self {
            inner: Rc::new(Retina::new(host, config)),
            installed: false,
        })
    }

    /// Swap `elements` (array, `NodeList`, or array-like), or every
    /// `[data-rjs]` element when omitted.
    ///
    /// Returns `{ scanned, alreadyProcessed, noDirective, dynamicProbes,
    /// manualProbes, notNeeded, probed }`.
    pub fn run(&self, elements: Option<JsValue>) -> JsValue {
        report_to_js(&run_with(&self.inner, elements))
    }

    /// Run once when the page has loaded and expose `window.retinajs`.
    ///
    /// If `load` already fired (the usual case after `await init()`), the
    /// document is swapped immediately; otherwise on the `load` event.
    /// Returns `false` without a window or when already installed.
    pub fn install(&mut self) -> Result<bool, JsValue> {
        if self.installed {
            return Ok(false);
        }
        let Some(window) = self.inner.host().window().cloned() else {
            return Ok(false);
        };

        let loaded = window
            .document()
            .is_some_and(|document| document.ready_state() == READY_STATE_COMPLETE);
        if loaded {
            self.inner.run_document();
        } else {
            let on_load = {
                let retina = Rc::clone(&self.inner);
                Closure::once_into_js(move || {
                    retina.run_document();
                })
            };
            window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
        }

        let global = {
            let retina = Rc::clone(&self.inner);
            Closure::<dyn FnMut(JsValue) -> JsValue>::new(move |elements: JsValue| {
                report_to_js(&run_with(&retina, Some(elements)))
            })
            .into_js_value()
        };
        Reflect::set(&window, &GLOBAL_NAME.into(), &global)?;

        self.installed = true;
        Ok(true)
    }

    /// Environment density in use.
    #[wasm_bindgen(getter)]
    pub fn density(&self) -> u32 {
        self.inner.density().get()
    }
}
