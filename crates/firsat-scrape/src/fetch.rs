// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, retrying HTML fetcher.
//!
//! Merchant pages front-load their metadata and structured-data blocks, so
//! the body is truncated at a configured cap and the connection aborted
//! once it is reached. Exhausted retries degrade to "no enrichment
//! available", never an error.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER};
use tracing::{debug, warn};
use url::Url;

use firsat_config::model::HttpConfig;
use firsat_core::FirsatError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

const ACCEPT_LANGUAGE_VALUE: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// Delay between retry attempts.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// A fetched page: the (possibly truncated) HTML and the URL the request
/// actually landed on after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub final_url: String,
}

/// HTTP client wrapper that fetches size-capped HTML snippets.
pub struct HtmlFetcher {
    client: reqwest::Client,
    max_bytes: usize,
    timeout: Duration,
}

impl HtmlFetcher {
    /// Builds a fetcher from the HTTP config section.
    pub fn new(config: &HttpConfig) -> Result<Self, FirsatError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FirsatError::Fetch {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            max_bytes: config.max_html_bytes,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Fetches a URL, retrying up to `max_retries` times on timeout or
    /// network error with a fixed backoff.
    ///
    /// Returns `None` when every attempt failed; callers treat that as
    /// "no enrichment available".
    pub async fn fetch_html(&self, url: &str, max_retries: usize) -> Option<FetchedPage> {
        for attempt in 0..=max_retries {
            match tokio::time::timeout(self.timeout, self.fetch_once(url)).await {
                Ok(Ok(page)) => {
                    debug!(url, bytes = page.html.len(), "fetched page");
                    return Some(page);
                }
                Ok(Err(e)) => {
                    warn!(
                        url,
                        attempt = attempt + 1,
                        total = max_retries + 1,
                        error = %e,
                        "fetch attempt failed"
                    );
                }
                Err(_) => {
                    warn!(
                        url,
                        attempt = attempt + 1,
                        total = max_retries + 1,
                        timeout = ?self.timeout,
                        "fetch attempt timed out"
                    );
                }
            }
            if attempt < max_retries {
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }
        None
    }

    /// One GET attempt: stream the body, truncate at the cap, abort the
    /// transfer once the cap is hit.
    async fn fetch_once(&self, url: &str) -> Result<FetchedPage, FirsatError> {
        let origin = Url::parse(url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default();

        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header(REFERER, origin)
            .send()
            .await
            .map_err(|e| FirsatError::Fetch {
                message: format!("request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FirsatError::Fetch {
                message: format!("HTTP {status} from {url}"),
                source: None,
            });
        }

        let final_url = response.url().to_string();
        let mut body: Vec<u8> = Vec::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| FirsatError::Fetch {
            message: format!("body read failed: {e}"),
            source: Some(Box::new(e)),
        })? {
            body.extend_from_slice(&chunk);
            if body.len() >= self.max_bytes {
                body.truncate(self.max_bytes);
                // Dropping the response aborts the remaining transfer.
                break;
            }
        }

        Ok(FetchedPage {
            html: String::from_utf8_lossy(&body).into_owned(),
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_with(max_bytes: usize, timeout_secs: u64) -> HtmlFetcher {
        HtmlFetcher::new(&HttpConfig {
            timeout_secs,
            max_retries: 0,
            max_html_bytes: max_bytes,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_body_and_reports_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/urun"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher_with(200_000, 5);
        let page = fetcher
            .fetch_html(&format!("{}/urun", server.uri()), 0)
            .await
            .unwrap();
        assert_eq!(page.html, "<html>ok</html>");
        assert!(page.final_url.ends_with("/urun"));
    }

    #[tokio::test]
    async fn truncates_oversized_bodies() {
        let server = MockServer::start().await;
        let big = "x".repeat(50_000);
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_string(big))
            .mount(&server)
            .await;

        let fetcher = fetcher_with(10_000, 5);
        let page = fetcher
            .fetch_html(&format!("{}/big", server.uri()), 0)
            .await
            .unwrap();
        assert_eq!(page.html.len(), 10_000);
    }

    #[tokio::test]
    async fn http_error_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher_with(200_000, 5);
        let page = fetcher
            .fetch_html(&format!("{}/missing", server.uri()), 1)
            .await;
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_degrades_to_none() {
        let fetcher = fetcher_with(200_000, 1);
        // Reserved TEST-NET address; nothing listens there.
        let page = fetcher.fetch_html("http://192.0.2.1:9/none", 0).await;
        assert!(page.is_none());
    }
}
