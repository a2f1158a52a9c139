//! In-memory browser-like window with a session history stack.

use std::cell::{Cell, RefCell};

use super::{HistoryHost, Navigator, RouterNavigateOptions};
use crate::{
    codec::UrlParts,
    listeners::{ListenerId, ListenerRegistry, NavigationListener},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    /// Scheme, host, and path: everything before the query.
    base: String,
    search: String,
    hash: String,
}

impl HistoryEntry {
    fn parse(href: &str) -> Self {
        let cut = href.find(['?', '#']).unwrap_or(href.len());
        let parts = UrlParts::parse(&href[cut..]);
        Self {
            base: href[..cut].to_string(),
            search: parts.search,
            hash: parts.hash,
        }
    }

    fn href(&self) -> String {
        format!("{}{}{}", self.base, self.search, self.hash)
    }

    /// Resolves `url` against this entry the way a browser resolves a relative reference.
    fn resolve(&self, url: &str) -> Self {
        if url.is_empty() {
            return Self {
                hash: String::new(),
                ..self.clone()
            };
        }
        if url.starts_with('#') {
            return Self {
                hash: UrlParts::new("", url).hash,
                ..self.clone()
            };
        }
        if url.starts_with('?') {
            let parts = UrlParts::parse(url);
            return Self {
                base: self.base.clone(),
                search: parts.search,
                hash: parts.hash,
            };
        }
        if url.contains("://") {
            return Self::parse(url);
        }
        let target = Self::parse(url);
        let base = if target.base.starts_with('/') {
            format!("{}{}", origin(&self.base), target.base)
        } else {
            let dir_end = self.base.rfind('/').map_or(0, |index| index + 1);
            format!("{}{}", &self.base[..dir_end], target.base)
        };
        Self { base, ..target }
    }
}

fn origin(base: &str) -> &str {
    let after_scheme = base.find("://").map_or(0, |index| index + 3);
    match base[after_scheme..].find('/') {
        Some(index) => &base[..after_scheme + index],
        None => base,
    }
}

#[derive(Debug)]
struct SessionHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl SessionHistory {
    fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }
}

/// Browser-like window kept entirely in memory.
///
/// `push_state`, `replace_state`, and traversal ([`MemoryHistory::back`],
/// [`MemoryHistory::forward`]) notify subscribers synchronously, like a window whose history
/// functions are observed. It can also act as a router [`Navigator`], and can be flagged as
/// non-interactive (server rendering) or prerendering.
#[derive(Debug)]
pub struct MemoryHistory {
    history: RefCell<SessionHistory>,
    listeners: ListenerRegistry,
    interactive: Cell<bool>,
    prerendering: Cell<bool>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("http://localhost/")
    }
}

impl MemoryHistory {
    /// Creates a window whose only history entry is `href`.
    pub fn new(href: &str) -> Self {
        Self {
            history: RefCell::new(SessionHistory {
                entries: vec![HistoryEntry::parse(href)],
                index: 0,
            }),
            listeners: ListenerRegistry::default(),
            interactive: Cell::new(true),
            prerendering: Cell::new(false),
        }
    }

    /// Full href of the current entry.
    pub fn href(&self) -> String {
        self.history.borrow().current().href()
    }

    /// Number of entries in the session history.
    pub fn len(&self) -> usize {
        self.history.borrow().entries.len()
    }

    /// Always `false`: a session history has at least one entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the current entry.
    pub fn index(&self) -> usize {
        self.history.borrow().index
    }

    /// Every entry's href, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.history
            .borrow()
            .entries
            .iter()
            .map(HistoryEntry::href)
            .collect()
    }

    /// Number of navigation subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Marks the window as interactive (browser) or not (server rendering).
    pub fn set_interactive(&self, interactive: bool) {
        self.interactive.set(interactive);
    }

    /// Marks the window as prerendering, where query params are unavailable.
    pub fn set_prerendering(&self, prerendering: bool) {
        self.prerendering.set(prerendering);
    }

    /// Moves one entry back; returns whether the location changed.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Moves one entry forward; returns whether the location changed.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Traverses `delta` entries, notifying subscribers like a `popstate` event.
    pub fn go(&self, delta: isize) -> bool {
        {
            let mut history = self.history.borrow_mut();
            let Some(target) = history.index.checked_add_signed(delta) else {
                return false;
            };
            if delta == 0 || target >= history.entries.len() {
                return false;
            }
            history.index = target;
        }
        self.listeners.notify(());
        true
    }

    fn navigate_to(&self, url: &str, replace: bool) {
        {
            let mut history = self.history.borrow_mut();
            let next = history.current().resolve(url);
            if replace {
                let index = history.index;
                history.entries[index] = next;
            } else {
                let keep = history.index + 1;
                history.entries.truncate(keep);
                history.entries.push(next);
                history.index = keep;
            }
        }
        self.listeners.notify(());
    }
}

impl HistoryHost for MemoryHistory {
    fn is_interactive(&self) -> bool {
        self.interactive.get()
    }

    fn location(&self) -> Result<UrlParts, String> {
        let history = self.history.borrow();
        let entry = history.current();
        Ok(UrlParts::new(&entry.search, &entry.hash))
    }

    fn push_state(&self, url: &str) -> Result<(), String> {
        self.navigate_to(url, false);
        Ok(())
    }

    fn replace_state(&self, url: &str) -> Result<(), String> {
        self.navigate_to(url, true);
        Ok(())
    }

    fn subscribe(&self, listener: NavigationListener) -> ListenerId {
        self.listeners.add_navigation(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

impl Navigator for MemoryHistory {
    fn is_interactive(&self) -> bool {
        self.interactive.get()
    }

    fn is_prerendering(&self) -> bool {
        self.prerendering.get()
    }

    fn current(&self) -> Result<UrlParts, String> {
        HistoryHost::location(self)
    }

    fn navigate(&self, href: &str, options: RouterNavigateOptions) -> Result<(), String> {
        self.navigate_to(href, options.replace);
        Ok(())
    }

    fn subscribe(&self, listener: NavigationListener) -> ListenerId {
        self.listeners.add_navigation(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}
