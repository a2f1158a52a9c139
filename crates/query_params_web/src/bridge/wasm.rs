use std::rc::Rc;

use query_params::UrlParts;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable".to_string())
}

fn js_failure(operation: &str, err: JsValue) -> String {
    format!("{operation} failed: {err:?}")
}

fn history() -> Result<web_sys::History, String> {
    window()?
        .history()
        .map_err(|err| js_failure("window.history", err))
}

pub fn has_window() -> bool {
    web_sys::window().is_some()
}

pub fn location() -> Result<UrlParts, String> {
    let location = window()?.location();
    let search = location
        .search()
        .map_err(|err| js_failure("location.search", err))?;
    let hash = location
        .hash()
        .map_err(|err| js_failure("location.hash", err))?;
    Ok(UrlParts::new(&search, &hash))
}

pub fn push_state(url: &str) -> Result<(), String> {
    history()?
        .push_state_with_url(&JsValue::NULL, "", Some(url))
        .map_err(|err| js_failure("history.pushState", err))
}

pub fn replace_state(url: &str) -> Result<(), String> {
    history()?
        .replace_state_with_url(&JsValue::NULL, "", Some(url))
        .map_err(|err| js_failure("history.replaceState", err))
}

/// Registered `popstate` handler; removed from the window on drop.
pub struct PopStateBinding {
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for PopStateBinding {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "popstate",
                self.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

pub fn listen_popstate(callback: Rc<dyn Fn()>) -> Result<PopStateBinding, String> {
    let window = window()?;
    let closure =
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| callback());
    window
        .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
        .map_err(|err| js_failure("addEventListener(popstate)", err))?;
    Ok(PopStateBinding { callback: closure })
}

pub fn set_timeout(delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<i32, String> {
    let callback = Closure::once_into_js(move || task());
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            i32::try_from(delay_ms).unwrap_or(i32::MAX),
        )
        .map_err(|err| js_failure("setTimeout", err))
}

pub fn clear_timeout(handle: i32) {
    if let Some(window) = web_sys::window() {
        window.clear_timeout_with_handle(handle);
    }
}
