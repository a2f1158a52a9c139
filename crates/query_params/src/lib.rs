//! Bidirectional synchronization between URL query parameters and typed, validated state.
//!
//! This crate is the host-agnostic core. It decodes and encodes query strings, dispatches raw
//! values through pluggable validators, keeps a reactive store whose writes to the URL are
//! debounced, and exposes a hook/accessor façade over that store. Browser adapters (window
//! history, timers, the Leptos router) live in `query_params_web`.
//!
//! ```
//! use std::rc::Rc;
//!
//! use query_params::{
//!     create_use_query_params, integer, HistoryHost, ManualScheduler, MemoryHistory,
//!     QueryParamsOptions, QuerySchema,
//! };
//!
//! let window = Rc::new(MemoryHistory::new("https://app.test/products"));
//! let scheduler = ManualScheduler::default();
//! let params = create_use_query_params(
//!     QuerySchema::fields().field("page", integer().with_default(1)),
//!     QueryParamsOptions::default()
//!         .with_window(Rc::clone(&window) as Rc<dyn HistoryHost>)
//!         .with_scheduler(Rc::new(scheduler.clone())),
//! )
//! .expect("hook")
//! .use_params();
//!
//! params.set_field("page", 3).expect("set");
//! scheduler.run_until_idle();
//! assert_eq!(window.href(), "https://app.test/products?page=3");
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod destination;
pub mod error;
pub mod listeners;
pub mod params;
pub mod schedule;
pub mod serialize;
pub mod store;
pub mod validate;

pub use codec::{decode, encode, QueryMap, QueryValue, UrlParts};
pub use destination::{
    Destination, DirectHistoryDestination, HistoryHost, MemoryHistory, NavigationMode, Navigator,
    RouterDestination, RouterNavigateOptions, ServerDestination,
};
pub use error::{QueryParamsError, ValidationError};
pub use listeners::{ListenerId, ListenerRegistry, NavigationListener};
pub use params::{
    create_use_query_params, QueryField, QueryParams, QueryParamsOptions, UseQueryParams,
};
pub use schedule::{Debouncer, ManualScheduler, Scheduler, TaskId};
pub use serialize::{default_serializer, encode_typed, Serializer};
pub use store::{QueryStore, WriteOutcome};
pub use validate::{
    boolean, from_fn, integer, number, parse_all, parse_value, run_schema, string, string_list,
    FieldKind, FieldParser, FnValidator, ParseSchema, QuerySchema, RunSchema, SchemaOutput,
    TypedParams, Validator, ValidatorKind,
};
