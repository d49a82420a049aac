//! HTTP client for PageFetch

use crate::assemble::assemble;
use crate::body::read_body_bounded;
use crate::convert::ConverterKind;
use crate::encoding::decode_body;
use crate::error::FetchError;
use crate::negotiate::candidate_urls;
use crate::strategy::StrategyList;
use crate::types::{FetchRequest, FetchResult, OutputFormat};
use crate::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_RESPONSE_SIZE, MAX_TIMEOUT_SECS};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
image/avif,image/webp,image/apng,*/*;q=0.8";

const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Fetch options that can be configured via tool builder
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Body size cap in bytes
    pub max_response_size: u64,
    /// Conversion tier
    pub converter: ConverterKind,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            max_response_size: MAX_RESPONSE_SIZE,
            converter: ConverterKind::default(),
        }
    }
}

/// Resolve the caller's timeout: default when absent, clamped to the maximum
pub fn resolve_timeout(secs: Option<u64>) -> Result<Duration, FetchError> {
    match secs {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(0) => Err(FetchError::InvalidTimeout),
        Some(secs) => Ok(Duration::from_secs(secs.min(MAX_TIMEOUT_SECS))),
    }
}

/// Accept a signed timeout from bindings whose callers can pass negatives
///
/// Zero and negative values are `InvalidTimeout`; positive values go on to
/// [`resolve_timeout`] unchanged.
pub fn timeout_from_signed(secs: Option<i64>) -> Result<Option<u64>, FetchError> {
    match secs {
        None => Ok(None),
        Some(secs) if secs <= 0 => Err(FetchError::InvalidTimeout),
        Some(secs) => Ok(Some(secs.unsigned_abs())),
    }
}

/// Fetch a URL with default options
pub async fn fetch(req: FetchRequest) -> Result<FetchResult, FetchError> {
    fetch_with_options(req, FetchOptions::default()).await
}

/// Fetch a URL with custom options
pub async fn fetch_with_options(
    req: FetchRequest,
    options: FetchOptions,
) -> Result<FetchResult, FetchError> {
    let page = fetch_page(&req.url, req.timeout, &options).await?;
    Ok(page.into_result(req.format, options.converter))
}

/// Decoded body of a successful fetch, before format conversion
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL actually fetched, after scheme negotiation and redirects
    pub final_url: String,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Decoded body text
    pub text: String,
}

impl FetchedPage {
    /// Shape the page into the requested output format
    pub fn into_result(self, format: OutputFormat, converter: ConverterKind) -> FetchResult {
        assemble(
            format,
            &self.final_url,
            &self.content_type,
            self.text,
            converter,
        )
    }
}

/// Run the network phase and decode the body
///
/// Validation happens before any I/O. The whole network phase, including
/// both negotiation attempts and the body read, runs under one deadline.
pub async fn fetch_page(
    url: &str,
    timeout_secs: Option<u64>,
    options: &FetchOptions,
) -> Result<FetchedPage, FetchError> {
    let candidates = candidate_urls(url)?;
    let timeout = resolve_timeout(timeout_secs)?;

    let client = build_client(options.user_agent.as_deref(), timeout)?;

    debug!(url = %url, timeout_secs = timeout.as_secs(), "Starting fetch");

    let network = negotiate_and_read(&client, candidates, options.max_response_size, timeout);

    let fetched = tokio::time::timeout(timeout, network)
        .await
        .map_err(|_| {
            warn!(timeout_secs = timeout.as_secs(), url = %url, "Fetch timed out");
            FetchError::Timeout {
                secs: timeout.as_secs(),
            }
        })??;

    let decoded = decode_body(&fetched.body, Some(&fetched.content_type));

    Ok(FetchedPage {
        final_url: fetched.final_url,
        content_type: fetched.content_type,
        text: decoded.text,
    })
}

/// Body and headers of the response that ended negotiation
struct Fetched {
    final_url: String,
    content_type: String,
    body: Bytes,
}

/// Why one negotiation attempt did not succeed
enum AttemptError {
    /// No response at all
    Transport(FetchError),
    /// A response with a status outside 2xx, kept so its body can be drained
    Status(reqwest::Response),
}

/// Run the negotiation chain and read the winning (or last) response
async fn negotiate_and_read(
    client: &reqwest::Client,
    candidates: StrategyList<String>,
    limit: u64,
    timeout: Duration,
) -> Result<Fetched, FetchError> {
    let eval = candidates
        .evaluate_async(|url| attempt(client, url, timeout))
        .await;
    debug!(attempts = eval.attempts, "Scheme negotiation finished");

    let response = match eval.result {
        Ok(response) => response,
        // The status is reported after the body has been read under the cap
        Err(AttemptError::Status(response)) => response,
        Err(AttemptError::Transport(err)) => return Err(err),
    };

    let status = response.status();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = read_body_bounded(response, limit, timeout).await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), url = %final_url, "Request failed");
        return Err(FetchError::RequestFailed {
            status: status.as_u16(),
        });
    }

    Ok(Fetched {
        final_url,
        content_type,
        body,
    })
}

async fn attempt(
    client: &reqwest::Client,
    url: String,
    timeout: Duration,
) -> Result<reqwest::Response, AttemptError> {
    debug!(url = %url, "Sending request");

    let response = client.get(&url).send().await.map_err(|e| {
        debug!(url = %url, error = %e, "Attempt failed");
        AttemptError::Transport(FetchError::from_reqwest(e, timeout))
    })?;

    if response.status().is_success() {
        Ok(response)
    } else {
        debug!(
            url = %url,
            status = response.status().as_u16(),
            "Attempt returned non-success status"
        );
        Err(AttemptError::Status(response))
    }
}

/// Build a client for a single invocation; nothing is shared across calls
///
/// Transparent decompression is off: a decoded response loses its
/// `Content-Length`, and the declared-length cap check needs it.
fn build_client(
    user_agent: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

    reqwest::Client::builder()
        .default_headers(headers)
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .timeout(timeout)
        .build()
        .map_err(FetchError::ClientBuildError)
}
