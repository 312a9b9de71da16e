use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::analytics::{AnalyticsSink, NoopSink};
use crate::host::timing::SystemClock;
use crate::host::web::{self, GtagSink, TimeoutScheduler, WebPage, WebStorage, CONTAINER_ID};
use crate::settings::TrackerSettings;
use crate::tracker::{commands, InteractionTracker};
use crate::utils::logging;
use crate::PageContext;

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

/// JS-facing handle to the running tracker. Keep it alive for the lifetime
/// of the page (e.g. `window.userTracker = boot()`).
#[wasm_bindgen]
pub struct TrackerHandle {
    tracker: Rc<InteractionTracker>,
}

#[wasm_bindgen]
impl TrackerHandle {
    #[wasm_bindgen(getter, js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.tracker.session().session_id.clone()
    }

    #[wasm_bindgen(getter, js_name = layoutVariant)]
    pub fn layout_variant(&self) -> String {
        self.tracker.session().layout.as_str().to_string()
    }

    /// Current session snapshot as a plain JS object.
    #[wasm_bindgen(js_name = exportUserData)]
    pub fn export_user_data(&self) -> Result<JsValue, JsValue> {
        let json = commands::export_user_data(&self.tracker).map_err(to_js)?;
        js_sys::JSON::parse(&json)
    }
}

/// Start tracking on the current document. Call once the DOM is ready.
/// `settings_json` overrides any subset of the defaults.
#[wasm_bindgen]
pub fn boot(settings_json: Option<String>) -> Result<TrackerHandle, JsValue> {
    logging::init();

    let settings = match settings_json {
        Some(raw) => TrackerSettings::from_json(&raw).map_err(to_js)?,
        None => TrackerSettings::default(),
    };

    let window = web::window().map_err(to_js)?;
    let page = WebPage::attach(CONTAINER_ID).map_err(to_js)?;
    let analytics: Rc<dyn AnalyticsSink> = match GtagSink::detect(&window) {
        Some(gtag) => Rc::new(gtag),
        None => Rc::new(NoopSink),
    };

    let ctx = PageContext {
        page: Rc::new(page),
        storage: Rc::new(WebStorage::local(&window)),
        clock: Rc::new(SystemClock),
        scheduler: Rc::new(TimeoutScheduler::new(window)),
        analytics,
    };

    Ok(TrackerHandle {
        tracker: crate::start(&ctx, settings),
    })
}

fn location() -> Result<web_sys::Location, JsValue> {
    Ok(web::window().map_err(to_js)?.location())
}

#[wasm_bindgen(js_name = abGetVariant)]
pub fn ab_get_variant() -> Result<String, JsValue> {
    Ok(commands::current_variant(&location()?.href()?))
}

#[wasm_bindgen(js_name = abGenerateTestUrls)]
pub fn ab_generate_test_urls() -> Result<JsValue, JsValue> {
    let urls = commands::layout_test_urls(&location()?.href()?).map_err(to_js)?;
    let json = serde_json::to_string(&urls).map_err(|err| to_js(err.into()))?;
    js_sys::JSON::parse(&json)
}

#[wasm_bindgen(js_name = abSwitchLayout)]
pub fn ab_switch_layout(layout: &str) -> Result<(), JsValue> {
    let location = location()?;
    let href = location.href()?;
    commands::switch_layout(&href, layout, |url| {
        location.set_href(url).map_err(web::js_err)
    })
    .map(|_| ())
    .map_err(to_js)
}
