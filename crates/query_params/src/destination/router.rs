//! Router-backed destination: writes go through a client-side router's navigate call.

use std::rc::Rc;

use leptos::logging;

use super::Destination;
use crate::{
    codec::UrlParts,
    listeners::{ListenerId, NavigationListener},
};

/// Options passed to [`Navigator::navigate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterNavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
    /// Keep the currently focused element focused.
    pub keep_focus: bool,
    /// Leave the scroll position untouched.
    pub no_scroll: bool,
}

/// Client-side router surface.
pub trait Navigator {
    /// Whether the router runs in an interactive browsing context.
    fn is_interactive(&self) -> bool;

    /// Whether the page is being prerendered, where query params are not available.
    fn is_prerendering(&self) -> bool {
        false
    }

    /// Current search and hash as the router sees them.
    fn current(&self) -> Result<UrlParts, String>;

    /// Navigates to a relative href.
    fn navigate(&self, href: &str, options: RouterNavigateOptions) -> Result<(), String>;

    /// Registers a callback fired after every route change.
    fn subscribe(&self, listener: NavigationListener) -> ListenerId;

    /// Removes a route-change callback.
    fn unsubscribe(&self, id: ListenerId);
}

/// [`Destination`] that persists through a [`Navigator`] with focus and scroll kept.
pub struct RouterDestination<N: ?Sized = dyn Navigator> {
    navigator: Rc<N>,
    replace: bool,
}

impl<N: Navigator + ?Sized> RouterDestination<N> {
    /// Wraps a navigator; `replace` selects replace-state navigation.
    pub fn new(navigator: Rc<N>, replace: bool) -> Self {
        Self { navigator, replace }
    }

    /// Underlying navigator.
    pub fn navigator(&self) -> &Rc<N> {
        &self.navigator
    }
}

impl<N: Navigator + ?Sized> Destination for RouterDestination<N> {
    fn is_browser_context(&self) -> bool {
        self.navigator.is_interactive()
    }

    fn read_current(&self) -> UrlParts {
        if self.navigator.is_prerendering() {
            return UrlParts::default();
        }
        self.navigator.current().unwrap_or_else(|err| {
            logging::warn!("query params: reading router location failed: {err}");
            UrlParts::default()
        })
    }

    fn persist(&self, search: &str, hash: &str) -> Result<(), String> {
        if !self.navigator.is_interactive() {
            return Ok(());
        }
        let options = RouterNavigateOptions {
            replace: self.replace,
            keep_focus: true,
            no_scroll: true,
        };
        self.navigator
            .navigate(&UrlParts::new(search, hash).href(), options)
    }

    fn subscribe(&self, listener: NavigationListener) -> Option<ListenerId> {
        Some(self.navigator.subscribe(listener))
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.navigator.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::destination::MemoryHistory;

    struct RecordingNavigator {
        calls: RefCell<Vec<(String, RouterNavigateOptions)>>,
    }

    impl Navigator for RecordingNavigator {
        fn is_interactive(&self) -> bool {
            true
        }

        fn current(&self) -> Result<UrlParts, String> {
            Err("router not mounted".to_string())
        }

        fn navigate(&self, href: &str, options: RouterNavigateOptions) -> Result<(), String> {
            self.calls.borrow_mut().push((href.to_string(), options));
            Ok(())
        }

        fn subscribe(&self, _listener: NavigationListener) -> ListenerId {
            unreachable!("not subscribed in tests")
        }

        fn unsubscribe(&self, _id: ListenerId) {}
    }

    #[test]
    fn navigates_with_focus_and_scroll_kept() {
        let navigator = Rc::new(RecordingNavigator {
            calls: RefCell::new(Vec::new()),
        });
        let destination = RouterDestination::new(Rc::clone(&navigator), true);

        destination.persist("", "#details").expect("persist");

        assert_eq!(
            *navigator.calls.borrow(),
            vec![(
                "?#details".to_string(),
                RouterNavigateOptions {
                    replace: true,
                    keep_focus: true,
                    no_scroll: true,
                }
            )]
        );
        assert_eq!(destination.read_current(), UrlParts::default());
    }

    #[test]
    fn prerendering_reads_an_empty_url() {
        let window = Rc::new(MemoryHistory::new("https://app.test/?tab=2"));
        let destination = RouterDestination::new(Rc::clone(&window), false);
        assert_eq!(destination.read_current(), UrlParts::new("?tab=2", ""));

        window.set_prerendering(true);
        assert_eq!(destination.read_current(), UrlParts::default());
    }
}
