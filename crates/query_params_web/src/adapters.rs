use std::rc::Rc;

use query_params::{
    Destination, HistoryHost, ManualScheduler, NavigationMode, QueryParamsOptions,
    RouterDestination, ServerDestination,
};

use crate::{LeptosNavigator, TimeoutScheduler, WebWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for default query-params wiring.
pub enum HostStrategy {
    /// Browser window history and `setTimeout`.
    Browser,
    /// Server rendering: the URL is read-only and writes are dropped.
    Server,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(target_arch = "wasm32")]
    {
        HostStrategy::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        HostStrategy::Server
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Server => "server",
    }
}

/// Options wired to the ambient host for the selected strategy.
pub fn default_options() -> QueryParamsOptions {
    options_for(selected_host_strategy())
}

/// Options that read `request_url` and never write, for server rendering.
pub fn server_options(request_url: &str) -> QueryParamsOptions {
    QueryParamsOptions::default()
        .with_destination(Rc::new(ServerDestination::from_request_url(request_url)))
        .with_scheduler(Rc::new(ManualScheduler::default()))
}

/// Options that persist through the enclosing `<Router/>`, keeping focus and scroll.
pub fn router_options(navigation: NavigationMode) -> QueryParamsOptions {
    let destination: Rc<dyn Destination> = Rc::new(RouterDestination::new(
        LeptosNavigator::from_context(),
        navigation.is_replace(),
    ));
    default_options().with_destination(destination)
}

pub(crate) fn options_for(strategy: HostStrategy) -> QueryParamsOptions {
    match strategy {
        HostStrategy::Browser => QueryParamsOptions::default()
            .with_window(WebWindow::shared() as Rc<dyn HistoryHost>)
            .with_scheduler(Rc::new(TimeoutScheduler)),
        HostStrategy::Server => server_options(""),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use query_params::{create_use_query_params, integer, QuerySchema};
    use serde_json::json;

    use super::*;

    #[test]
    fn selected_host_strategy_matches_target() {
        #[cfg(target_arch = "wasm32")]
        assert_eq!(selected_host_strategy(), HostStrategy::Browser);

        #[cfg(not(target_arch = "wasm32"))]
        assert_eq!(host_strategy_name(), "server");
    }

    #[test]
    fn server_options_read_the_request_and_drop_writes() {
        let params = create_use_query_params(
            QuerySchema::fields().field("page", integer().with_default(1)),
            server_options("https://app.test/list?page=3"),
        )
        .expect("hook")
        .use_params();

        assert_eq!(params.get("page").expect("page"), Some(json!(3)));
        params.set_field("page", 4).expect("set");
        assert_eq!(params.get("page").expect("page"), Some(json!(4)));
        assert_eq!(params.flush(), Some(query_params::WriteOutcome::Skipped));
    }

    #[test]
    fn browser_strategy_wires_window_and_timer() {
        let options = options_for(HostStrategy::Browser);
        assert!(options.window.is_some());
        assert!(options.scheduler.is_some());
        assert!(options.destination.is_none());
    }
}
