//! Size-capped body streaming
//!
//! The cap is enforced twice: against the declared `Content-Length` before
//! any body byte is read, and against the running byte count while
//! streaming. The response is owned by [`read_body_bounded`], so the
//! connection is released when it returns, whichever way it returns.

use crate::error::FetchError;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use std::time::Duration;
use tracing::{error, warn};

/// Byte buffer that refuses to grow past a limit
#[derive(Debug)]
pub struct BoundedSink {
    limit: u64,
    buf: Vec<u8>,
}

impl BoundedSink {
    /// Create an empty sink accepting at most `limit` bytes
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            buf: Vec::new(),
        }
    }

    /// Append a chunk, failing once the cumulative size crosses the limit
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), FetchError> {
        let next_len = self.buf.len() as u64 + chunk.len() as u64;
        if next_len > self.limit {
            warn!(limit = self.limit, received = next_len, "Body exceeded size cap");
            return Err(FetchError::ResponseTooLarge { limit: self.limit });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    /// Bytes accepted so far
    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    /// True if nothing has been accepted
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the sink and return its contents
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buf)
    }
}

/// Parse the declared `Content-Length`, ignoring malformed values
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Reject a response whose declared length exceeds the cap
pub fn check_declared_length(headers: &HeaderMap, limit: u64) -> Result<(), FetchError> {
    match declared_length(headers) {
        Some(declared) if declared > limit => {
            warn!(limit, declared, "Declared content length exceeds size cap");
            Err(FetchError::ResponseTooLarge { limit })
        }
        _ => Ok(()),
    }
}

/// Read the full body of `response` without exceeding `limit` bytes
pub async fn read_body_bounded(
    response: reqwest::Response,
    limit: u64,
    timeout: Duration,
) -> Result<Bytes, FetchError> {
    check_declared_length(response.headers(), limit)?;

    let mut sink = BoundedSink::new(limit);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            error!("Error reading body chunk: {}", e);
            FetchError::from_reqwest(e, timeout)
        })?;
        sink.push(&chunk)?;
    }

    Ok(sink.into_bytes())
}
