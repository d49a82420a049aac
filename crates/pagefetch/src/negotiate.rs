//! Transport scheme negotiation
//!
//! An `http://` URL is first tried as `https://`; the original URL is the
//! only fallback. An `https://` URL is tried once.

use crate::error::FetchError;
use crate::strategy::StrategyList;
use url::Url;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Validate a URL and return the variants to request, in order
pub fn candidate_urls(url: &str) -> Result<StrategyList<String>, FetchError> {
    if url.is_empty() {
        return Err(FetchError::MissingUrl);
    }

    validate_scheme(url)?;
    Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    match url.strip_prefix(HTTP_PREFIX) {
        Some(rest) => {
            Ok(StrategyList::new(format!("{HTTPS_PREFIX}{rest}")).then(url.to_string()))
        }
        None => Ok(StrategyList::new(url.to_string())),
    }
}

/// Reject anything that does not start with `http://` or `https://`
pub fn validate_scheme(url: &str) -> Result<(), FetchError> {
    if url.starts_with(HTTP_PREFIX) || url.starts_with(HTTPS_PREFIX) {
        Ok(())
    } else {
        Err(FetchError::InvalidUrlScheme)
    }
}
