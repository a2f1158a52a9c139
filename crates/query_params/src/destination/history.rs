//! Direct-history destination over a browser-like window.

use std::rc::Rc;

use leptos::logging;

use super::{Destination, HistoryHost, NavigationMode};
use crate::{
    codec::UrlParts,
    error::QueryParamsError,
    listeners::{ListenerId, NavigationListener},
};

/// Reads `location` and writes through `history.pushState`/`history.replaceState`.
pub struct DirectHistoryDestination<H: ?Sized = dyn HistoryHost> {
    host: Rc<H>,
    mode: NavigationMode,
}

impl<H: HistoryHost + ?Sized> DirectHistoryDestination<H> {
    /// Builds the destination, failing fast when the host location cannot be read.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamsError::Configuration`] when the host is missing its location.
    pub fn new(host: Rc<H>, mode: NavigationMode) -> Result<Self, QueryParamsError> {
        host.location().map_err(|err| {
            QueryParamsError::Configuration(format!("window location is unavailable: {err}"))
        })?;
        Ok(Self { host, mode })
    }

    /// Configured navigation mode.
    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Underlying window host.
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }
}

impl<H: HistoryHost + ?Sized> Destination for DirectHistoryDestination<H> {
    fn is_browser_context(&self) -> bool {
        self.host.is_interactive()
    }

    fn read_current(&self) -> UrlParts {
        self.host.location().unwrap_or_else(|err| {
            logging::warn!("query params: reading window location failed: {err}");
            UrlParts::default()
        })
    }

    fn persist(&self, search: &str, hash: &str) -> Result<(), String> {
        if !self.host.is_interactive() {
            return Ok(());
        }
        let href = UrlParts::new(search, hash).href();
        match self.mode {
            NavigationMode::Push => self.host.push_state(&href),
            NavigationMode::Replace => self.host.replace_state(&href),
        }
    }

    fn subscribe(&self, listener: NavigationListener) -> Option<ListenerId> {
        Some(self.host.subscribe(listener))
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.host.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::destination::MemoryHistory;

    #[test]
    fn push_mode_adds_entries_and_keeps_hash() {
        let window = Rc::new(MemoryHistory::new("https://app.test/list?page=1#top"));
        let destination = DirectHistoryDestination::new(Rc::clone(&window), NavigationMode::Push)
            .expect("destination");

        destination.persist("?page=2", "#top").expect("persist");

        assert_eq!(window.len(), 2);
        assert_eq!(window.href(), "https://app.test/list?page=2#top");
        assert_eq!(
            destination.read_current(),
            UrlParts::new("?page=2", "#top")
        );
    }

    #[test]
    fn replace_mode_overwrites_the_current_entry() {
        let window = Rc::new(MemoryHistory::new("https://app.test/?a=1"));
        let destination =
            DirectHistoryDestination::new(Rc::clone(&window), NavigationMode::Replace)
                .expect("destination");

        destination.persist("", "").expect("persist");

        assert_eq!(window.len(), 1);
        assert_eq!(window.href(), "https://app.test/");
    }

    #[test]
    fn non_interactive_hosts_skip_writes() {
        let window = Rc::new(MemoryHistory::new("https://app.test/?a=1"));
        window.set_interactive(false);
        let destination = DirectHistoryDestination::new(Rc::clone(&window), NavigationMode::Push)
            .expect("destination");

        assert!(!destination.is_browser_context());
        destination.persist("?a=2", "").expect("no-op");
        assert_eq!(window.href(), "https://app.test/?a=1");
    }
}
