//! Headline retrieval from RSS feeds
//!
//! [`HttpFetcher`] performs one bounded HTTP GET per refresh and hands the
//! body to [`parse_headlines`], a streaming `quick-xml` pass that collects
//! `rss/channel/item/title` text. Parsing stops as soon as the headline limit
//! is reached, so the rest of a large feed is never decoded.
//!
//! Failures come back as typed [`FetchError`]s. The session turns them into a
//! single diagnostic headline with [`headlines_or_diagnostic`] so a broken
//! feed never ends the terminal session.

use crate::error::FetchError;
use crate::transliterate::transliterate;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Placeholder shown when a feed has no usable titles
pub const NO_HEADLINES: &str = "(No headlines found)";

/// Maximum response body bytes kept for diagnostics on HTTP errors
const ERROR_BODY_LIMIT: usize = 1024;

/// Element path (below the document root) of an item title
const ITEM_TITLE_PATH: [&[u8]; 3] = [b"channel", b"item", b"title"];

/// Source of feed headlines
///
/// Implemented by [`HttpFetcher`]; sessions are generic over it so the state
/// machine can run against canned headlines.
pub trait HeadlineSource: Send + Sync {
    /// Fetch at most `limit` sanitized titles from `url`
    ///
    /// Never returns an empty vector on success unless `limit` is zero: a
    /// feed without titles yields the [`NO_HEADLINES`] placeholder.
    fn fetch(
        &self,
        url: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, FetchError>> + Send;
}

/// HTTP feed fetcher with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests fail after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be
    /// initialized (e.g., the TLS backend fails to load).
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rss3270/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Use a preconfigured client (proxy settings, TLS roots, ...)
    ///
    /// `timeout` still bounds every fetch, whatever the client's own settings.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HeadlineSource for HttpFetcher {
    async fn fetch(&self, url: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        debug!("Fetching feed {}", url);
        timeout(self.timeout, self.fetch_inner(url, limit))
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

impl HttpFetcher {
    async fn fetch_inner(&self, url: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status().as_u16();
        if status >= 300 {
            let body = read_error_body(response).await;
            return Err(FetchError::RemoteStatus { status, body });
        }

        let body = response.text().await.map_err(map_request_error)?;
        trace!("Received {} bytes from {}", body.len(), url);

        parse_headlines(&body, limit)
    }
}

fn map_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Read at most [`ERROR_BODY_LIMIT`] bytes of an error response
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut buf = Vec::with_capacity(ERROR_BODY_LIMIT);
    while buf.len() < ERROR_BODY_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            _ => break,
        }
    }
    buf.truncate(ERROR_BODY_LIMIT);
    String::from_utf8_lossy(&buf).trim().to_string()
}

/// Decode up to `limit` item titles from an RSS document
///
/// Titles are trimmed and transliterated; empty ones are skipped. Text and
/// CDATA content are both accepted.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] if the XML is malformed or truncated
/// before the limit is reached, or if the document has no root element.
/// A zero `limit` returns no headlines without looking at the document.
///
/// # Example
///
/// ```
/// use rss3270::fetcher::parse_headlines;
///
/// let xml = "<rss><channel><item><title>Hi</title></item></channel></rss>";
/// assert_eq!(parse_headlines(xml, 18).unwrap(), vec!["Hi"]);
/// ```
pub fn parse_headlines(xml: &str, limit: usize) -> Result<Vec<String>, FetchError> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(xml);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut title: Option<String> = None;
    let mut headlines = Vec::with_capacity(limit.min(64));
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_root = true;
                path.push(e.local_name().as_ref().to_vec());
                if is_item_title(&path) {
                    title = Some(String::new());
                }
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Text(e)) => {
                if let Some(t) = title.as_mut() {
                    match e.unescape() {
                        Ok(text) => t.push_str(&text),
                        Err(_) => t.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(t) = title.as_mut() {
                    t.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                if is_item_title(&path) {
                    if let Some(raw) = title.take() {
                        let clean = transliterate(raw.trim()).trim().to_string();
                        if !clean.is_empty() {
                            headlines.push(clean);
                            if headlines.len() >= limit {
                                break;
                            }
                        }
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => {
                if let Some(open) = path.last() {
                    return Err(FetchError::Decode(format!(
                        "unexpected end of document inside <{}>",
                        String::from_utf8_lossy(open)
                    )));
                }
                break;
            }
            Err(e) => {
                return Err(FetchError::Decode(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(FetchError::Decode("document has no root element".to_string()));
    }

    if headlines.is_empty() {
        headlines.push(NO_HEADLINES.to_string());
    }
    Ok(headlines)
}

fn is_item_title(path: &[Vec<u8>]) -> bool {
    path.len() == ITEM_TITLE_PATH.len() + 1
        && path[1..]
            .iter()
            .zip(ITEM_TITLE_PATH)
            .all(|(seen, want)| seen.as_slice() == want)
}

/// Headlines to display for a fetch result
///
/// Errors become a single `"Error fetching feed: <detail>"` line.
pub fn headlines_or_diagnostic(result: Result<Vec<String>, FetchError>) -> Vec<String> {
    match result {
        Ok(headlines) => headlines,
        Err(e) => vec![format!("Error fetching feed: {}", e)],
    }
}
