//! `setTimeout`-backed [`Scheduler`].

use leptos::logging;
use query_params::{Scheduler, TaskId};

use crate::bridge;

/// Runs debounced writes through `window.setTimeout`.
///
/// A zero delay still yields to the event loop, so every synchronous mutation made while
/// handling one browser event lands in the same write.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TaskId> {
        match bridge::set_timeout(delay_ms, task) {
            Ok(handle) => Some(TaskId::from_raw(u64::from(handle.unsigned_abs()))),
            Err(err) => {
                logging::warn!("query params: scheduling URL write failed: {err}");
                None
            }
        }
    }

    fn cancel(&self, id: TaskId) {
        if let Ok(handle) = i32::try_from(id.raw()) {
            bridge::clear_timeout(handle);
        }
    }
}
