#![allow(dead_code)]
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use xiami_crawler::{ClientConfig, FetchedPage, PageFetcher, Result, XiamiClient, XiamiError};

/// Read a saved page from `tests/fixtures/`.
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path:?}: {e}"))
}

/// A [`PageFetcher`] that answers from a fixed script of URL routes and
/// records every URL it was asked for.
///
/// Routes are matched by substring in the order they were added. Requests
/// with no matching route fail like a transport error.
#[derive(Clone, Default)]
pub struct FixtureFetcher {
    routes: Vec<(String, FetchedPage)>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a fixture file as a `200` page for URLs containing `url_part`.
    pub fn page(self, url_part: &str, fixture_name: &str) -> Self {
        self.respond(url_part, FetchedPage::ok(fixture(fixture_name)))
    }

    /// Answer URLs containing `url_part` with a `302` to `location`.
    pub fn redirect(self, url_part: &str, location: &str) -> Self {
        self.respond(url_part, FetchedPage::redirect(location))
    }

    pub fn respond(mut self, url_part: &str, page: FetchedPage) -> Self {
        self.routes.push((url_part.to_string(), page));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// A client over this fetcher; the fetcher keeps seeing the client's requests.
    pub fn client(&self) -> XiamiClient {
        self.client_with_config(ClientConfig::default())
    }

    pub fn client_with_config(&self, config: ClientConfig) -> XiamiClient {
        XiamiClient::with_fetcher(Box::new(self.clone()), config)
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.routes
            .iter()
            .find(|(url_part, _)| url.contains(url_part.as_str()))
            .map(|(_, page)| page.clone())
            .ok_or_else(|| XiamiError::Http(format!("No fixture route for {url}")))
    }
}
