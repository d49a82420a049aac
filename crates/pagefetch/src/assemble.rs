//! Result assembly

use crate::convert::{fenced, is_html, ConverterKind};
use crate::types::{FetchResult, OutputFormat};
use tracing::debug;

/// Build the result title from the fetched URL and its content type
pub fn title(final_url: &str, content_type: &str) -> String {
    format!("{} ({})", final_url, content_type)
}

/// Shape decoded text into the requested format
///
/// | format   | markup               | other            |
/// |----------|----------------------|------------------|
/// | text     | reduced to text      | verbatim         |
/// | markdown | converted            | fenced verbatim  |
/// | html     | verbatim             | verbatim         |
pub fn assemble(
    format: OutputFormat,
    final_url: &str,
    content_type: &str,
    text: String,
    converter: ConverterKind,
) -> FetchResult {
    let markup = is_html(content_type);
    debug!(%format, markup, "Assembling result");

    let output = match (format, markup) {
        (OutputFormat::Text, true) => converter.to_text(&text),
        (OutputFormat::Markdown, true) => converter.to_markdown(&text),
        (OutputFormat::Markdown, false) => fenced(&text),
        (OutputFormat::Text, false) | (OutputFormat::Html, _) => text,
    };

    FetchResult::new(title(final_url, content_type), output)
}
