//! Destination contracts: where the authoritative URL lives and how it is written.
//!
//! The store only talks to [`Destination`]. External navigation is observed through
//! [`Destination::subscribe`] rather than by replacing the host's navigation functions, so any
//! number of stores can watch the same host and unsubscribing never has to restore function
//! pointers.
//!
//! Reference variants:
//! - [`DirectHistoryDestination`] over a browser-like [`HistoryHost`] (push or replace entries)
//! - [`RouterDestination`] over a client-side router [`Navigator`]
//! - [`ServerDestination`] for non-interactive server rendering
//! - [`MemoryHistory`], an in-memory browser-like window usable with the first two

mod history;
mod memory;
mod router;
mod server;

use crate::{
    codec::UrlParts,
    listeners::{ListenerId, NavigationListener},
};

pub use history::DirectHistoryDestination;
pub use memory::MemoryHistory;
pub use router::{Navigator, RouterDestination, RouterNavigateOptions};
pub use server::ServerDestination;

/// Which history entry a write creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationMode {
    /// Add a new history entry.
    #[default]
    Push,
    /// Overwrite the current history entry.
    Replace,
}

impl NavigationMode {
    /// Mode for a `replace` flag.
    pub const fn from_replace(replace: bool) -> Self {
        if replace {
            Self::Replace
        } else {
            Self::Push
        }
    }

    /// Whether this mode replaces the current entry.
    pub const fn is_replace(self) -> bool {
        matches!(self, Self::Replace)
    }
}

/// Where the URL lives.
pub trait Destination {
    /// Whether interactive navigation APIs are available.
    fn is_browser_context(&self) -> bool;

    /// Current search and hash.
    fn read_current(&self) -> UrlParts;

    /// Writes a new search and hash. Benign no-ops (server rendering) return `Ok`.
    ///
    /// Implementations must not call the store's external-change listener synchronously for
    /// this write; the store additionally ignores notifications raised while it persists.
    fn persist(&self, search: &str, hash: &str) -> Result<(), String>;

    /// Registers a callback for URL changes made by anyone, including back/forward.
    ///
    /// Returns `None` when this destination has no change source.
    fn subscribe(&self, listener: NavigationListener) -> Option<ListenerId> {
        let _ = listener;
        None
    }

    /// Removes a callback registered with [`Destination::subscribe`].
    fn unsubscribe(&self, id: ListenerId) {
        let _ = id;
    }
}

/// Browser-like window: location plus history navigation and change notification.
///
/// Every successful `push_state`/`replace_state` and every back/forward traversal notifies
/// subscribers after the location has changed.
pub trait HistoryHost {
    /// Whether this host represents an interactive browsing context.
    fn is_interactive(&self) -> bool {
        true
    }

    /// Current search and hash.
    fn location(&self) -> Result<UrlParts, String>;

    /// Navigates to `url` (resolved against the current location), adding an entry.
    fn push_state(&self, url: &str) -> Result<(), String>;

    /// Navigates to `url` (resolved against the current location), replacing the entry.
    fn replace_state(&self, url: &str) -> Result<(), String>;

    /// Registers a navigation callback.
    fn subscribe(&self, listener: NavigationListener) -> ListenerId;

    /// Removes a navigation callback.
    fn unsubscribe(&self, id: ListenerId);
}
