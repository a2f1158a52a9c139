//! Reactive parameter store: the synchronization engine between the URL and typed params.
//!
//! Mutations update [`QueryMap`] immediately and bump a version counter; the typed view and the
//! canonical search string are derived lazily per version. Writes to the [`Destination`] go
//! through a [`Debouncer`], so several mutations inside one window reach the URL as a single
//! write carrying only the final state.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use leptos::logging;
use serde_json::Value;

use crate::{
    codec::{decode, QueryMap, UrlParts},
    destination::Destination,
    error::QueryParamsError,
    listeners::{ListenerId, ListenerRegistry},
    schedule::{Debouncer, Scheduler},
    serialize::{encode_typed, serialize_entry, serialize_object, Serializer},
    validate::{parse_all, QuerySchema, TypedParams},
};

/// Result of one URL write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The destination accepted the new search and hash.
    Persisted {
        /// Search that was written.
        search: String,
        /// Hash carried over from the current URL.
        hash: String,
    },
    /// The destination already showed the derived search.
    Unchanged,
    /// Deriving or persisting the search failed.
    Failed(String),
    /// The destination is not an interactive context, or the store is gone.
    Skipped,
}

#[derive(Debug, Default)]
struct StoreState {
    raw: QueryMap,
    version: u64,
}

struct Derived {
    version: u64,
    typed: Result<TypedParams, QueryParamsError>,
    search: Result<String, QueryParamsError>,
}

/// URL-synchronized parameter state shared by every accessor of one hook.
pub struct QueryStore {
    schema: QuerySchema,
    serializer: Serializer,
    destination: Rc<dyn Destination>,
    writer: Debouncer<WriteOutcome>,
    state: RefCell<StoreState>,
    derived: RefCell<Option<Rc<Derived>>>,
    observers: ListenerRegistry<u64>,
    navigation: Cell<Option<ListenerId>>,
    persisting: Cell<bool>,
    last_persisted: RefCell<Option<UrlParts>>,
    this: Weak<QueryStore>,
}

impl QueryStore {
    /// Builds an uninitialized store; call [`QueryStore::init`] to load the current URL.
    pub fn new(
        schema: QuerySchema,
        serializer: Serializer,
        destination: Rc<dyn Destination>,
        scheduler: Rc<dyn Scheduler>,
        debounce_ms: u32,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let owner = this.clone();
            let writer = Debouncer::new(scheduler, debounce_ms, move || {
                owner
                    .upgrade()
                    .map_or(WriteOutcome::Skipped, |store| store.write_now())
            });
            Self {
                schema,
                serializer,
                destination,
                writer,
                state: RefCell::new(StoreState::default()),
                derived: RefCell::new(None),
                observers: ListenerRegistry::default(),
                navigation: Cell::new(None),
                persisting: Cell::new(false),
                last_persisted: RefCell::new(None),
                this: this.clone(),
            }
        })
    }

    /// Reads the destination and starts listening for external navigation.
    ///
    /// Safe to call repeatedly: the raw params are re-read, the listener is registered once.
    pub fn init(&self) {
        self.reload();
        if self.navigation.get().is_some() || !self.destination.is_browser_context() {
            return;
        }
        let this = self.this.clone();
        let id = self.destination.subscribe(Rc::new(move || {
            if let Some(store) = this.upgrade() {
                store.on_external_change();
            }
        }));
        self.navigation.set(id);
    }

    /// Whether an external-navigation listener is registered.
    pub fn is_subscribed(&self) -> bool {
        self.navigation.get().is_some()
    }

    /// Stops reacting to external navigation. A pending write still fires.
    pub fn unsubscribe(&self) {
        if let Some(id) = self.navigation.take() {
            self.destination.unsubscribe(id);
        }
    }

    /// Re-derives state after a URL change this store did not make.
    ///
    /// Notifications raised while the store itself persists are ignored, as are later ones that
    /// find the URL still at this store's last write (a deferred echo). Otherwise any pending
    /// write is dropped: the external URL wins over unwritten local edits.
    pub fn on_external_change(&self) {
        if self.persisting.get() {
            return;
        }
        let current = self.destination.read_current();
        let echo = self.last_persisted.borrow().as_ref() == Some(&current);
        if echo {
            return;
        }
        self.last_persisted.replace(None);
        self.writer.cancel();
        self.reload();
    }

    /// Current raw params.
    pub fn raw(&self) -> QueryMap {
        self.state.borrow().raw.clone()
    }

    /// Monotonic change counter; bumps on every raw-params change.
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// Schema this store parses with.
    pub fn schema(&self) -> &QuerySchema {
        &self.schema
    }

    /// Typed view of the current raw params.
    ///
    /// # Errors
    ///
    /// Returns the validator dispatch or validation failure for the current raw params.
    pub fn typed(&self) -> Result<TypedParams, QueryParamsError> {
        self.derive().typed.clone()
    }

    /// Canonical search string derived from the typed view (`""` or `?...`).
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn search(&self) -> Result<String, QueryParamsError> {
        self.derive().search.clone()
    }

    /// Typed value of one field, `None` when absent.
    ///
    /// # Errors
    ///
    /// Fails when the typed view cannot be derived.
    pub fn get(&self, key: &str) -> Result<Option<Value>, QueryParamsError> {
        match &self.derive().typed {
            Ok(typed) => Ok(typed.get(key).cloned()),
            Err(err) => Err(err.clone()),
        }
    }

    /// Sets one field; `Value::Null` removes it.
    pub fn set_field(&self, key: &str, value: &Value) {
        let entry = serialize_entry(&self.serializer, value);
        self.mutate(|raw| match entry {
            Some(entry) => {
                raw.insert(key, entry);
                true
            }
            None => raw.remove(key).is_some(),
        });
    }

    /// Replaces every raw param with the serialized entries of `params`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamsError::NotAnObject`] unless `params` is a JSON object.
    pub fn set(&self, params: &Value) -> Result<(), QueryParamsError> {
        let Value::Object(object) = params else {
            return Err(QueryParamsError::NotAnObject { operation: "set" });
        };
        let next = serialize_object(&self.serializer, object);
        self.mutate(|raw| {
            *raw = next;
            true
        });
        Ok(())
    }

    /// Merges the serialized entries of `params` into the raw params.
    ///
    /// Nothing is written when the merge leaves the raw params equivalent to before.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamsError::NotAnObject`] unless `params` is a JSON object.
    pub fn update(&self, params: &Value) -> Result<(), QueryParamsError> {
        let Value::Object(object) = params else {
            return Err(QueryParamsError::NotAnObject {
                operation: "update",
            });
        };
        let patch = serialize_object(&self.serializer, object);
        self.mutate(|raw| {
            let mut merged = raw.clone();
            merged.merge(patch);
            if merged.equivalent(raw) {
                return false;
            }
            *raw = merged;
            true
        });
        Ok(())
    }

    /// Removes the named keys; returns whether anything was removed.
    pub fn remove(&self, keys: &[&str]) -> bool {
        self.mutate(|raw| {
            keys.iter()
                .fold(false, |removed, key| raw.remove(key).is_some() || removed)
        })
    }

    /// Runs any pending write immediately.
    ///
    /// Returns `None` when no write was pending.
    pub fn flush(&self) -> Option<WriteOutcome> {
        if !self.writer.cancel() {
            return None;
        }
        Some(self.write_now())
    }

    /// Whether a debounced write is waiting.
    pub fn is_write_pending(&self) -> bool {
        self.writer.is_pending()
    }

    /// Outcome of the most recent completed debounced write.
    pub fn last_write(&self) -> Option<WriteOutcome> {
        self.writer.last_result()
    }

    /// Registers an observer called with the new version after every change.
    pub fn watch(&self, observer: impl Fn(u64) + 'static) -> ListenerId {
        self.observers.add(Rc::new(observer))
    }

    /// Removes an observer; returns whether it was registered.
    pub fn unwatch(&self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    fn reload(&self) {
        let raw = decode(&self.destination.read_current().search);
        let version = {
            let mut state = self.state.borrow_mut();
            state.raw = raw;
            state.version += 1;
            state.version
        };
        self.observers.notify(version);
    }

    /// Applies `edit`; returns whether it changed anything.
    fn mutate(&self, edit: impl FnOnce(&mut QueryMap) -> bool) -> bool {
        let version = {
            let mut state = self.state.borrow_mut();
            if !edit(&mut state.raw) {
                return false;
            }
            state.version += 1;
            state.version
        };
        self.observers.notify(version);
        self.writer.call();
        true
    }

    fn derive(&self) -> Rc<Derived> {
        let (raw, version) = {
            let state = self.state.borrow();
            if let Some(derived) = self.derived.borrow().as_ref() {
                if derived.version == state.version {
                    return Rc::clone(derived);
                }
            }
            (state.raw.clone(), state.version)
        };

        let typed = parse_all(&raw, &self.schema);
        let search = typed
            .as_ref()
            .map(|typed| encode_typed(&self.serializer, typed))
            .map_err(|err| err.clone());
        let derived = Rc::new(Derived {
            version,
            typed,
            search,
        });
        *self.derived.borrow_mut() = Some(Rc::clone(&derived));
        derived
    }

    fn write_now(&self) -> WriteOutcome {
        if !self.destination.is_browser_context() {
            return WriteOutcome::Skipped;
        }
        let search = match self.search() {
            Ok(search) => search,
            Err(err) => {
                logging::warn!("query params: skipping URL write: {err}");
                return WriteOutcome::Failed(err.to_string());
            }
        };
        let current = self.destination.read_current();
        if current.search == search {
            return WriteOutcome::Unchanged;
        }

        self.persisting.set(true);
        let result = self.destination.persist(&search, &current.hash);
        self.persisting.set(false);

        match result {
            Ok(()) => {
                self.last_persisted
                    .replace(Some(UrlParts::new(&search, &current.hash)));
                WriteOutcome::Persisted {
                    search,
                    hash: current.hash,
                }
            }
            Err(err) => {
                logging::warn!("query params: URL write failed: {err}");
                WriteOutcome::Failed(err)
            }
        }
    }
}

impl Drop for QueryStore {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
