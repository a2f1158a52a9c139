//! Hook/accessor façade over a [`QueryStore`].

use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    codec::QueryMap,
    destination::{Destination, DirectHistoryDestination, HistoryHost, NavigationMode},
    error::QueryParamsError,
    listeners::ListenerId,
    schedule::Scheduler,
    serialize::{default_serializer, Serializer},
    store::{QueryStore, WriteOutcome},
    validate::{QuerySchema, TypedParams},
};

/// Options for [`create_use_query_params`].
#[derive(Clone, Default)]
pub struct QueryParamsOptions {
    /// Coalescing delay before a URL write; `0` writes on the next scheduler turn.
    pub debounce_ms: u32,
    /// Converts typed values into raw strings. Defaults to [`default_serializer`].
    pub serializer: Option<Serializer>,
    /// Where the URL lives. Takes precedence over `window`.
    pub destination: Option<Rc<dyn Destination>>,
    /// Browser-like window used to build the default direct-history destination.
    pub window: Option<Rc<dyn HistoryHost>>,
    /// Whether the default destination pushes or replaces history entries.
    pub navigation: NavigationMode,
    /// Timer service for debounced writes.
    pub scheduler: Option<Rc<dyn Scheduler>>,
}

impl QueryParamsOptions {
    /// Sets the debounce delay.
    pub fn with_debounce(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Overrides how typed values are turned into raw strings.
    pub fn with_serializer(mut self, serializer: impl Fn(&Value) -> String + 'static) -> Self {
        self.serializer = Some(Rc::new(serializer));
        self
    }

    /// Overrides the destination.
    pub fn with_destination(mut self, destination: Rc<dyn Destination>) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Overrides the browser-like window.
    pub fn with_window(mut self, window: Rc<dyn HistoryHost>) -> Self {
        self.window = Some(window);
        self
    }

    /// Sets push or replace navigation for the default destination.
    pub fn with_navigation(mut self, navigation: NavigationMode) -> Self {
        self.navigation = navigation;
        self
    }

    /// Sets the timer service.
    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    fn resolve_destination(&self) -> Result<Rc<dyn Destination>, QueryParamsError> {
        if let Some(destination) = &self.destination {
            return Ok(Rc::clone(destination));
        }
        let window = self.window.clone().ok_or_else(|| {
            QueryParamsError::Configuration(
                "either a destination or a window must be provided".to_string(),
            )
        })?;
        Ok(Rc::new(DirectHistoryDestination::new(window, self.navigation)?))
    }
}

/// Builds one store for `schema` and returns the hook that hands out accessors to it.
///
/// The store reads the destination and subscribes to external navigation right away.
///
/// # Errors
///
/// Returns [`QueryParamsError::Configuration`] when neither a destination nor a readable window
/// is configured, or when no scheduler is set.
pub fn create_use_query_params(
    schema: QuerySchema,
    options: QueryParamsOptions,
) -> Result<UseQueryParams, QueryParamsError> {
    let destination = options.resolve_destination()?;
    let scheduler = options.scheduler.clone().ok_or_else(|| {
        QueryParamsError::Configuration("a scheduler must be provided".to_string())
    })?;
    let serializer = options.serializer.clone().unwrap_or_else(default_serializer);
    let store = QueryStore::new(
        schema,
        serializer,
        destination,
        scheduler,
        options.debounce_ms,
    );
    store.init();
    Ok(UseQueryParams {
        params: QueryParams { store },
    })
}

/// Hook returned by [`create_use_query_params`].
#[derive(Clone)]
pub struct UseQueryParams {
    params: QueryParams,
}

impl UseQueryParams {
    /// Returns an accessor; every call views the same store.
    pub fn use_params(&self) -> QueryParams {
        self.params.clone()
    }
}

/// Live accessor over the shared store.
#[derive(Clone)]
pub struct QueryParams {
    store: Rc<QueryStore>,
}

impl QueryParams {
    /// Wraps an existing store.
    pub fn from_store(store: Rc<QueryStore>) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &Rc<QueryStore> {
        &self.store
    }

    /// Whether two accessors share a store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    /// Typed value of `key`.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn get(&self, key: &str) -> Result<Option<Value>, QueryParamsError> {
        self.store.get(key)
    }

    /// Typed value of `key` converted into `T`; absent and `null` values read as `None`.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived or the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, QueryParamsError> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
                QueryParamsError::Deserialize {
                    field: key.to_string(),
                    message: err.to_string(),
                }
            }),
        }
    }

    /// Sets `key` to `value`. Values serializing to `null` (such as `None`) remove the key.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamsError::Serialize`] when `value` cannot be represented as JSON.
    pub fn set_field<T: Serialize>(&self, key: &str, value: T) -> Result<(), QueryParamsError> {
        let value = to_json(value)?;
        self.store.set_field(key, &value);
        Ok(())
    }

    /// Handle bound to one field.
    pub fn field(&self, key: impl Into<String>) -> QueryField {
        QueryField {
            params: self.clone(),
            key: key.into(),
        }
    }

    /// Current raw params.
    pub fn raw(&self) -> QueryMap {
        self.store.raw()
    }

    /// Typed view: parsed schema fields plus unknown raw keys passed through.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn query(&self) -> Result<TypedParams, QueryParamsError> {
        self.store.typed()
    }

    /// Typed view with every raw key the validator dropped added back.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn all(&self) -> Result<TypedParams, QueryParamsError> {
        let mut all = self.query()?;
        for (key, value) in self.raw().iter() {
            if !all.contains_key(key) {
                all.insert(key.to_string(), value.to_json());
            }
        }
        Ok(all)
    }

    /// Canonical search string (`""` or `?...`).
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn search(&self) -> Result<String, QueryParamsError> {
        self.store.search()
    }

    /// Schema field names; for whole-object schemas, the raw keys.
    pub fn keys(&self) -> Vec<String> {
        let schema = self.store.schema();
        match schema {
            QuerySchema::Whole(_) => self.raw().keys().map(str::to_string).collect(),
            QuerySchema::Fields(_) => schema.keys(),
        }
    }

    /// `(key, typed value)` pairs for [`QueryParams::keys`].
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn entries(&self) -> Result<Vec<(String, Value)>, QueryParamsError> {
        let typed = self.query()?;
        Ok(self
            .keys()
            .into_iter()
            .map(|key| {
                let value = typed.get(&key).cloned().unwrap_or(Value::Null);
                (key, value)
            })
            .collect())
    }

    /// Replaces all params with `params`.
    ///
    /// # Errors
    ///
    /// Fails when `params` does not serialize to an object.
    pub fn set<T: Serialize>(&self, params: T) -> Result<(), QueryParamsError> {
        self.store.set(&to_json(params)?)
    }

    /// Merges `params` into the current params.
    ///
    /// # Errors
    ///
    /// Fails when `params` does not serialize to an object.
    pub fn update<T: Serialize>(&self, params: T) -> Result<(), QueryParamsError> {
        self.store.update(&to_json(params)?)
    }

    /// Removes the named keys.
    pub fn remove(&self, keys: &[&str]) -> bool {
        self.store.remove(keys)
    }

    /// Stops reacting to external navigation.
    pub fn unsubscribe(&self) {
        self.store.unsubscribe();
    }

    /// Runs a pending write now.
    pub fn flush(&self) -> Option<WriteOutcome> {
        self.store.flush()
    }

    /// Current change counter.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Calls `observer` with the new version after every change.
    pub fn subscribe(&self, observer: impl Fn(u64) + 'static) -> ListenerId {
        self.store.watch(observer)
    }

    /// Removes an observer registered with [`QueryParams::subscribe`].
    pub fn unsubscribe_observer(&self, id: ListenerId) -> bool {
        self.store.unwatch(id)
    }
}

/// Accessor bound to a single field.
#[derive(Clone)]
pub struct QueryField {
    params: QueryParams,
    key: String,
}

impl QueryField {
    /// Field name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Typed value.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn get(&self) -> Result<Option<Value>, QueryParamsError> {
        self.params.get(&self.key)
    }

    /// Typed value converted into `T`.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived or the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>, QueryParamsError> {
        self.params.get_as(&self.key)
    }

    /// Sets the field.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamsError::Serialize`] when `value` cannot be represented as JSON.
    pub fn set<T: Serialize>(&self, value: T) -> Result<(), QueryParamsError> {
        self.params.set_field(&self.key, value)
    }

    /// Removes the field from the URL.
    pub fn unset(&self) {
        self.params.store.set_field(&self.key, &Value::Null);
    }

    /// Stores text from an input element verbatim; empty text removes the field.
    pub fn set_from_input(&self, text: &str) {
        if text.is_empty() {
            self.unset();
        } else {
            self.params
                .store
                .set_field(&self.key, &Value::String(text.to_string()));
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, QueryParamsError> {
    serde_json::to_value(value).map_err(|err| QueryParamsError::Serialize(err.to_string()))
}
