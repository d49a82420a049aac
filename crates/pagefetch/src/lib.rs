//! PageFetch - bounded web content retrieval for agents
//!
//! This crate fetches a single URL and returns its content normalized into
//! plain text, Markdown, or the raw markup.
//!
//! ## Pipeline
//!
//! 1. [`negotiate`] picks the URL variants to try (https upgrade, then the
//!    original http URL).
//! 2. [`client`] issues the request under a wall-clock timeout and streams the
//!    body through a size-capped sink ([`body`]).
//! 3. [`encoding`] resolves the charset and decodes without failing.
//! 4. [`convert`] reduces markup to text or converts it to Markdown, using the
//!    tier selected by [`ConverterKind`].
//! 5. [`assemble`] builds the [`FetchResult`].

pub mod assemble;
pub mod body;
pub mod client;
pub mod convert;
pub mod encoding;
mod error;
pub mod negotiate;
pub mod strategy;
mod tool;
mod types;

pub use client::{
    fetch, fetch_page, fetch_with_options, resolve_timeout, timeout_from_signed, FetchOptions,
    FetchedPage,
};
pub use convert::{html_to_markdown, html_to_text, ConverterKind, HtmlConverter};
pub use error::{ErrorKind, FetchError};
pub use tool::{Tool, ToolBuilder, ToolStatus};
pub use types::{FetchRequest, FetchResult, OutputFormat};

/// Browser-like User-Agent; servers commonly block clients without one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Maximum response size in bytes (5 MB)
pub const MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

/// Timeout used when the caller does not supply one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound for caller-supplied timeouts
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Fetches content from a URL and returns it as text, markdown, or html.

- http:// URLs are upgraded to https:// when possible
- HTML is reduced to plain text or converted to markdown
- Responses larger than 5MB are rejected
- Timeout defaults to 30 seconds, at most 120"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# WebFetch Tool

Fetches content from a URL and returns it as text, markdown, or html.

## Capabilities
- HTTP GET with browser-like headers
- Automatic https:// upgrade for http:// URLs, falling back to the original URL
- HTML to plain text (scripts, styles, and embedded objects removed)
- HTML to Markdown (ATX headings, `*` bullets, fenced code)
- Charset detection for non-UTF-8 pages

## Input Parameters
- `url` (required): The URL to fetch (must be http:// or https://)
- `format` (required): "text", "markdown", or "html"
- `timeout` (optional): Seconds to wait, default 30, at most 120

## Output Fields
- `title`: The fetched URL followed by the content type, e.g. `https://example.com (text/html)`
- `metadata`: Always an empty object
- `output`: The fetched/converted content

## Format Behavior
- `text`: HTML is reduced to plain text; other content is returned as-is
- `markdown`: HTML is converted to markdown; other content is wrapped in a code fence
- `html`: The decoded body is returned unchanged

## Examples

### Fetch a webpage as markdown
```json
{"url": "https://example.com", "format": "markdown"}
```

### Fetch plain text with a short timeout
```json
{"url": "https://example.com", "format": "text", "timeout": 10}
```

### Fetch raw content
```json
{"url": "https://api.example.com/data.json", "format": "html"}
```

## Error Handling
- Invalid URLs or formats are rejected before any request is made
- Non-2xx responses fail with the status code
- Responses over 5MB fail with a size error
- Timeouts fail without partial content
"#;
