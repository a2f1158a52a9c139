//! `window.location` / `window.history` host with `popstate` observation.

use std::{cell::RefCell, rc::Rc};

use leptos::logging;
use query_params::{HistoryHost, ListenerId, ListenerRegistry, NavigationListener, UrlParts};

use crate::bridge::{self, PopStateBinding};

thread_local! {
    static SHARED_WINDOW: Rc<WebWindow> = Rc::new(WebWindow::default());
}

/// Browser window as a [`HistoryHost`].
///
/// History writes made through this host notify its subscribers directly; back/forward
/// traversal arrives through one `popstate` listener that is installed while anyone is
/// subscribed. Code that navigates programmatically should go through [`WebWindow::shared`] so
/// every store on the page observes it.
#[derive(Default)]
pub struct WebWindow {
    listeners: ListenerRegistry,
    popstate: RefCell<Option<PopStateBinding>>,
}

impl WebWindow {
    /// Returns the page-wide window host.
    pub fn shared() -> Rc<Self> {
        SHARED_WINDOW.with(Rc::clone)
    }

    /// Number of navigation subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn ensure_popstate(&self) {
        if self.popstate.borrow().is_some() {
            return;
        }
        let listeners = self.listeners.clone();
        match bridge::listen_popstate(Rc::new(move || listeners.notify(()))) {
            Ok(binding) => *self.popstate.borrow_mut() = Some(binding),
            Err(err) => logging::warn!("query params: popstate listener unavailable: {err}"),
        }
    }
}

impl HistoryHost for WebWindow {
    fn is_interactive(&self) -> bool {
        bridge::has_window()
    }

    fn location(&self) -> Result<UrlParts, String> {
        bridge::location()
    }

    fn push_state(&self, url: &str) -> Result<(), String> {
        bridge::push_state(url)?;
        self.listeners.notify(());
        Ok(())
    }

    fn replace_state(&self, url: &str) -> Result<(), String> {
        bridge::replace_state(url)?;
        self.listeners.notify(());
        Ok(())
    }

    fn subscribe(&self, listener: NavigationListener) -> ListenerId {
        self.ensure_popstate();
        self.listeners.add_navigation(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
        if self.listeners.is_empty() {
            let binding = self.popstate.borrow_mut().take();
            drop(binding);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use query_params::{DirectHistoryDestination, NavigationMode, QueryParamsError};

    use super::*;

    #[test]
    fn native_builds_have_no_location() {
        let window = WebWindow::shared();
        assert!(!window.is_interactive());
        assert!(window.push_state("?a=1").is_err());
        assert!(matches!(
            DirectHistoryDestination::new(window, NavigationMode::Push).err(),
            Some(QueryParamsError::Configuration(_))
        ));
    }

    #[test]
    fn popstate_binding_follows_subscribers() {
        let window = WebWindow::default();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let id = window.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        assert!(window.popstate.borrow().is_some());
        assert_eq!(window.subscriber_count(), 1);

        window.listeners.notify(());
        assert_eq!(calls.get(), 1);

        window.unsubscribe(id);
        assert!(window.popstate.borrow().is_none());
    }
}
