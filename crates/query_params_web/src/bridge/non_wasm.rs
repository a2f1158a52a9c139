use std::rc::Rc;

use query_params::UrlParts;

fn unsupported() -> String {
    "browser window APIs are only available when compiled for wasm32".to_string()
}

/// Inert stand-in for a registered `popstate` handler.
pub struct PopStateBinding;

pub fn has_window() -> bool {
    false
}

pub fn location() -> Result<UrlParts, String> {
    Err(unsupported())
}

pub fn push_state(_url: &str) -> Result<(), String> {
    Err(unsupported())
}

pub fn replace_state(_url: &str) -> Result<(), String> {
    Err(unsupported())
}

pub fn listen_popstate(_callback: Rc<dyn Fn()>) -> Result<PopStateBinding, String> {
    Ok(PopStateBinding)
}

pub fn set_timeout(_delay_ms: u32, _task: Box<dyn FnOnce()>) -> Result<i32, String> {
    Err(unsupported())
}

pub fn clear_timeout(_handle: i32) {}
