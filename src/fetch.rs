//! The page transport seam.
//!
//! Every operation reaches the network through [`PageFetcher`], which issues a
//! single GET and reports the status, the redirect target and the body. No
//! redirect is followed and nothing is retried: the resolution chain needs to
//! see redirects itself, and failures are surfaced to the caller as-is.

use crate::headers;
use crate::{Result, XiamiError};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use std::fs;
use std::path::Path;

/// A raw response, as far as the extractors care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// `Location` header, if the server sent one
    pub location: Option<String>,
    /// Response body decoded as UTF-8
    pub body: String,
}

impl FetchedPage {
    /// A `200 OK` page with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    /// A `302 Found` redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            location: Some(location.into()),
            body: String::new(),
        }
    }

    /// The body of a `200` response; any other status is a failure.
    pub fn into_body(self, url: &str) -> Result<String> {
        if self.status != 200 {
            return Err(XiamiError::UnexpectedStatus {
                url: url.to_string(),
                status: self.status,
            });
        }
        Ok(self.body)
    }

    /// The target of a `301`/`302` response; any other status is a failure.
    pub fn into_redirect(self, url: &str) -> Result<String> {
        if self.status != 301 && self.status != 302 {
            return Err(XiamiError::UnexpectedStatus {
                url: url.to_string(),
                status: self.status,
            });
        }
        self.location.ok_or_else(|| {
            XiamiError::Parse(format!("Redirect from {url} has no Location header"))
        })
    }
}

/// Issues one GET request per call.
///
/// Implementations must be safe to share between concurrent operations.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockPageFetcher`
/// that implements this trait using the `mockall` library.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` without following redirects.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// [`PageFetcher`] backed by any [`HttpClient`] implementation.
pub struct HttpPageFetcher {
    client: Box<dyn HttpClient>,
    debug_save_responses: bool,
}

impl HttpPageFetcher {
    /// Wrap an HTTP client.
    ///
    /// Setting `XIAMI_DEBUG_SAVE_RESPONSES` in the environment makes the
    /// fetcher dump every response body into `debug_responses/`.
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self {
            client,
            debug_save_responses: std::env::var("XIAMI_DEBUG_SAVE_RESPONSES").is_ok(),
        }
    }

    /// Save response to debug directory (optional debug feature)
    fn save_debug_response(&self, url: &str, status_code: u16, body: &str) {
        if let Err(e) = self.try_save_debug_response(url, status_code, body) {
            log::warn!("Failed to save debug response: {e}");
        }
    }

    fn try_save_debug_response(&self, url: &str, status_code: u16, body: &str) -> Result<()> {
        let debug_dir = Path::new("debug_responses");
        if !debug_dir.exists() {
            fs::create_dir_all(debug_dir)?;
        }

        let url_path = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let safe_path = url_path.replace(['/', '?', '&', '=', '%', '+', ':'], "_");

        let filename = format!("{timestamp}_{safe_path}_status{status_code}.html");
        let file_path = debug_dir.join(filename);
        fs::write(&file_path, body)?;

        log::debug!("Saved HTTP response to {file_path:?} (status: {status_code}, url: {url})");
        Ok(())
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = url
            .parse::<Url>()
            .map_err(|e| XiamiError::Http(format!("Invalid URL '{url}': {e}")))?;
        let referer = format!("{}/", parsed.origin().ascii_serialization());
        let mut request = Request::new(Method::Get, parsed);
        headers::add_get_headers(&mut request, Some(&referer));

        log::debug!("GET {url}");
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| XiamiError::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        let location = response
            .header("location")
            .and_then(|values| values.get(0))
            .map(|value| value.as_str().to_string());
        let body = response
            .body_string()
            .await
            .map_err(|e| XiamiError::Http(e.to_string()))?;

        log::debug!("{url}: {status} status, {} chars", body.len());
        if let Some(location) = &location {
            log::trace!("{url} redirects to {location}");
        }
        if self.debug_save_responses {
            self.save_debug_response(url, status, &body);
        }

        Ok(FetchedPage {
            status,
            location,
            body,
        })
    }
}

/// Fetch `url` and return its body, failing on anything but `200`.
pub(crate) async fn fetch_body(fetcher: &dyn PageFetcher, url: &str) -> Result<String> {
    fetcher.fetch(url).await?.into_body(url)
}

/// Fetch `url` and return its redirect target, failing on anything but `301`/`302`.
pub(crate) async fn fetch_redirect(fetcher: &dyn PageFetcher, url: &str) -> Result<String> {
    fetcher.fetch(url).await?.into_redirect(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_requires_200() {
        assert_eq!(FetchedPage::ok("<html/>").into_body("u").unwrap(), "<html/>");

        let not_found = FetchedPage {
            status: 404,
            location: None,
            body: String::new(),
        };
        assert!(matches!(
            not_found.into_body("http://www.xiami.com/collect/1"),
            Err(XiamiError::UnexpectedStatus { status: 404, .. })
        ));
    }

    #[test]
    fn redirect_requires_3xx_with_location() {
        assert_eq!(
            FetchedPage::redirect("/artist/1").into_redirect("u").unwrap(),
            "/artist/1"
        );
        assert!(matches!(
            FetchedPage::ok("body").into_redirect("u"),
            Err(XiamiError::UnexpectedStatus { status: 200, .. })
        ));

        let bare = FetchedPage {
            status: 301,
            location: None,
            body: String::new(),
        };
        assert!(matches!(bare.into_redirect("u"), Err(XiamiError::Parse(_))));
    }
}
