//! Browser (`wasm32`) implementations of the [`query_params`] host contracts.
//!
//! This crate wires the core store to a real page: window history with `popstate`, timers for
//! debounced writes, the `leptos_router` navigator, and Leptos signal bindings for tracked
//! reads. Native builds compile against inert bridge stubs and default to server strategy.
//!
//! Bridge bindings live under `bridge/` (wasm and non-wasm transport glue).

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and option factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod reactive;
pub mod router;
pub mod scheduler;
pub mod window;

pub use adapters::{
    default_options, host_strategy_name, router_options, selected_host_strategy, server_options,
    HostStrategy,
};
pub use reactive::{use_query_params, ReactiveQueryParams};
pub use router::LeptosNavigator;
pub use scheduler::TimeoutScheduler;
pub use window::WebWindow;
