//! Leptos bindings: tracked reads and input handlers over a [`QueryParams`] accessor.

use leptos::{create_rw_signal, event_target_value, on_cleanup, RwSignal, SignalGet, SignalSet};
use query_params::{
    QueryField, QueryMap, QueryParams, QueryParamsError, TypedParams, UseQueryParams,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// [`QueryParams`] whose reads subscribe the current reactive scope.
///
/// Every store change bumps a version signal, so memos, effects, and views that read through
/// this wrapper rerun after local edits and external navigation alike. Writes are forwarded
/// untracked.
#[derive(Clone)]
pub struct ReactiveQueryParams {
    params: QueryParams,
    version: RwSignal<u64>,
}

impl ReactiveQueryParams {
    /// Mirrors `params` into a signal owned by the current reactive scope.
    pub fn new(params: QueryParams) -> Self {
        let version = create_rw_signal(params.version());
        let observer = params.subscribe(move |next| version.set(next));
        let owner = params.clone();
        on_cleanup(move || {
            owner.unsubscribe_observer(observer);
        });
        Self { params, version }
    }

    /// Untracked accessor.
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Tracked store version.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Tracked typed read.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn get(&self, key: &str) -> Result<Option<Value>, QueryParamsError> {
        self.version();
        self.params.get(key)
    }

    /// Tracked typed read converted into `T`.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived or the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, QueryParamsError> {
        self.version();
        self.params.get_as(key)
    }

    /// Tracked raw params.
    pub fn raw(&self) -> QueryMap {
        self.version();
        self.params.raw()
    }

    /// Tracked typed view.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn query(&self) -> Result<TypedParams, QueryParamsError> {
        self.version();
        self.params.query()
    }

    /// Tracked search string.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn search(&self) -> Result<String, QueryParamsError> {
        self.version();
        self.params.search()
    }

    /// Sets one field.
    ///
    /// # Errors
    ///
    /// Fails when `value` cannot be represented as JSON.
    pub fn set_field<T: Serialize>(&self, key: &str, value: T) -> Result<(), QueryParamsError> {
        self.params.set_field(key, value)
    }

    /// Field handle for two-way bindings.
    pub fn field(&self, key: impl Into<String>) -> QueryField {
        self.params.field(key)
    }

    /// `on:input` handler that stores the target's value under `key`.
    pub fn on_input(&self, key: impl Into<String>) -> impl Fn(web_sys::Event) + 'static {
        let field = self.params.field(key);
        move |event: web_sys::Event| field.set_from_input(&event_target_value(&event))
    }
}

/// Hands out a tracked accessor for a hook built with `create_use_query_params`.
pub fn use_query_params(hook: &UseQueryParams) -> ReactiveQueryParams {
    ReactiveQueryParams::new(hook.use_params())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use leptos::{create_memo, create_runtime};
    use pretty_assertions::assert_eq;
    use query_params::{
        create_use_query_params, integer, HistoryHost, ManualScheduler, MemoryHistory,
        QueryParamsOptions, QuerySchema,
    };

    use super::*;

    #[test]
    fn memos_follow_local_and_external_changes() {
        let runtime = create_runtime();
        let window = Rc::new(MemoryHistory::new("https://app.test/?page=2"));
        let scheduler = ManualScheduler::default();
        let hook = create_use_query_params(
            QuerySchema::fields().field("page", integer().with_default(1)),
            QueryParamsOptions::default()
                .with_window(Rc::clone(&window) as Rc<dyn HistoryHost>)
                .with_scheduler(Rc::new(scheduler.clone())),
        )
        .expect("hook");
        let reactive = use_query_params(&hook);
        let page = create_memo({
            let reactive = reactive.clone();
            move |_| reactive.get_as::<i64>("page").ok().flatten()
        });
        assert_eq!(page.get(), Some(2));

        reactive.set_field("page", 3).expect("set");
        assert_eq!(page.get(), Some(3));

        window.push_state("?page=8").expect("external push");
        assert_eq!(page.get(), Some(8));
        assert_eq!(reactive.version(), hook.use_params().version());

        runtime.dispose();
    }
}
