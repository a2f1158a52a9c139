use super::Destination;
use crate::codec::UrlParts;

/// Destination for server rendering: reads the request URL, never writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDestination {
    url: UrlParts,
}

impl ServerDestination {
    /// Uses the search and hash of the incoming request URL.
    pub fn from_request_url(url: &str) -> Self {
        Self {
            url: UrlParts::parse(url),
        }
    }
}

impl Destination for ServerDestination {
    fn is_browser_context(&self) -> bool {
        false
    }

    fn read_current(&self) -> UrlParts {
        self.url.clone()
    }

    fn persist(&self, _search: &str, _hash: &str) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_request_url_and_ignores_writes() {
        let destination = ServerDestination::from_request_url("https://app.test/items?sort=asc");

        destination.persist("?sort=desc", "").expect("no-op");

        assert!(!destination.is_browser_context());
        assert_eq!(destination.read_current(), UrlParts::new("?sort=asc", ""));
    }
}
