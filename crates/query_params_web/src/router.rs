//! `leptos_router` navigator for the framework-router destination.

use std::rc::Rc;

use leptos::{create_effect, SignalGetUntracked, SignalWith};
use leptos_router::{use_location, use_navigate, Location, NavigateOptions};
use query_params::{
    ListenerId, ListenerRegistry, NavigationListener, Navigator, RouterNavigateOptions, UrlParts,
};

/// [`Navigator`] over the enclosing `<Router/>`.
///
/// Route changes from any source, including links and back/forward, reach subscribers through
/// one effect on the router location.
pub struct LeptosNavigator {
    navigate: Rc<dyn Fn(&str, NavigateOptions)>,
    location: Location,
    listeners: ListenerRegistry,
}

impl LeptosNavigator {
    /// Captures the router from context. Call it while rendering inside a `<Router/>`.
    pub fn from_context() -> Rc<Self> {
        let navigate = use_navigate();
        let location = use_location();
        let listeners = ListenerRegistry::default();

        let notify = listeners.clone();
        let (search, hash) = (location.search, location.hash);
        create_effect(move |previous: Option<()>| {
            search.with(|_| ());
            hash.with(|_| ());
            if previous.is_some() {
                notify.notify(());
            }
        });

        Rc::new(Self {
            navigate: Rc::new(move |href: &str, options: NavigateOptions| navigate(href, options)),
            location,
            listeners,
        })
    }
}

fn route_options(options: RouterNavigateOptions) -> NavigateOptions {
    // The router does not move focus on navigation, so `keep_focus` needs no mapping.
    NavigateOptions {
        resolve: false,
        replace: options.replace,
        scroll: !options.no_scroll,
        ..NavigateOptions::default()
    }
}

impl Navigator for LeptosNavigator {
    fn is_interactive(&self) -> bool {
        cfg!(target_arch = "wasm32")
    }

    fn current(&self) -> Result<UrlParts, String> {
        Ok(UrlParts::new(
            &self.location.search.get_untracked(),
            &self.location.hash.get_untracked(),
        ))
    }

    fn navigate(&self, href: &str, options: RouterNavigateOptions) -> Result<(), String> {
        let pathname = self.location.pathname.get_untracked();
        (self.navigate)(&format!("{pathname}{href}"), route_options(options));
        Ok(())
    }

    fn subscribe(&self, listener: NavigationListener) -> ListenerId {
        self.listeners.add_navigation(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}
