//! Browser window interop for the web adapters.
//!
//! Calls route to the `wasm32` implementation or to an inert native shim so the crate still
//! builds and tests on the host toolchain.

use std::rc::Rc;

use query_params::UrlParts;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub use imp::PopStateBinding;

pub fn has_window() -> bool {
    imp::has_window()
}

pub fn location() -> Result<UrlParts, String> {
    imp::location()
}

pub fn push_state(url: &str) -> Result<(), String> {
    imp::push_state(url)
}

pub fn replace_state(url: &str) -> Result<(), String> {
    imp::replace_state(url)
}

pub fn listen_popstate(callback: Rc<dyn Fn()>) -> Result<PopStateBinding, String> {
    imp::listen_popstate(callback)
}

pub fn set_timeout(delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<i32, String> {
    imp::set_timeout(delay_ms, task)
}

pub fn clear_timeout(handle: i32) {
    imp::clear_timeout(handle);
}
