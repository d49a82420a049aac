//! Core types for PageFetch

use crate::error::FetchError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Representation the fetched content is returned in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text; markup is reduced to its text content
    Text,
    /// Markdown; markup is converted, other content is fenced
    #[default]
    Markdown,
    /// Decoded body, unchanged
    Html,
}

impl FromStr for OutputFormat {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "markdown" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(FetchError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Request to fetch a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchRequest {
    /// The URL to fetch (required, must be http:// or https://)
    pub url: String,

    /// Output format: "text", "markdown", or "html"
    pub format: OutputFormat,

    /// Timeout in seconds (optional, default 30, at most 120)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl FetchRequest {
    /// Create a new request for the given URL, returning markdown
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Return plain text
    pub fn as_text(self) -> Self {
        self.format(OutputFormat::Text)
    }

    /// Return markdown
    pub fn as_markdown(self) -> Self {
        self.format(OutputFormat::Markdown)
    }

    /// Return the decoded body unchanged
    pub fn as_html(self) -> Self {
        self.format(OutputFormat::Html)
    }

    /// Set the timeout in seconds
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FetchResult {
    /// Fetched URL and content type, e.g. `https://example.com (text/html)`
    pub title: String,

    /// Reserved for future use; always empty
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// The fetched/converted content
    pub output: String,
}

impl FetchResult {
    /// Create a result with empty metadata
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            metadata: BTreeMap::new(),
            output: output.into(),
        }
    }
}
