//! HTML conversion
//!
//! Two tiers implement [`HtmlConverter`]:
//!
//! - `structural` (feature `structural`, on by default): builds a tree with
//!   `scraper` for text and converts with `htmd` for Markdown. Correct on
//!   nested and malformed markup.
//! - `pattern`: regex-based tag stripping. Never fails, degrades on odd
//!   markup.
//!
//! [`ConverterKind`] picks the tier at initialization. Markdown conversion
//! falls back to the pattern tier if the structural converter errors.

mod pattern;
#[cfg(feature = "structural")]
mod structural;

pub use pattern::PatternConverter;
#[cfg(feature = "structural")]
pub use structural::StructuralConverter;

use crate::strategy::StrategyList;
use thiserror::Error;
use tracing::{debug, warn};

/// Elements removed with their content before extracting text
pub const TEXT_REMOVED_ELEMENTS: &[&str] =
    &["script", "style", "noscript", "iframe", "object", "embed"];

/// Elements removed from the tree before Markdown conversion
pub const MARKDOWN_REMOVED_ELEMENTS: &[&str] = &["script", "style", "meta", "link"];

/// Markdown conversion failed in a tier that has a fallback
#[derive(Debug, Error)]
#[error("Markdown conversion failed: {0}")]
pub struct ConvertError(pub String);

/// A markup conversion tier
pub trait HtmlConverter: Send + Sync {
    /// Tier name (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Reduce markup to text: removed elements dropped, tags become spaces,
    /// whitespace collapsed and trimmed
    fn to_text(&self, html: &str) -> String;

    /// Convert markup to trimmed Markdown
    fn to_markdown(&self, html: &str) -> Result<String, ConvertError>;
}

/// Conversion tier selected at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    /// Tree-aware conversion, with the pattern tier as fallback
    Structural,
    /// Regex-based conversion only
    Pattern,
}

impl Default for ConverterKind {
    fn default() -> Self {
        if cfg!(feature = "structural") {
            ConverterKind::Structural
        } else {
            ConverterKind::Pattern
        }
    }
}

impl ConverterKind {
    /// Tiers in the order they are tried
    ///
    /// The pattern tier is always last. Without the `structural` feature,
    /// `Structural` resolves to the pattern tier alone.
    pub fn tiers(self) -> StrategyList<&'static dyn HtmlConverter> {
        match self {
            #[cfg(feature = "structural")]
            ConverterKind::Structural => {
                StrategyList::new(&StructuralConverter as &'static dyn HtmlConverter)
                    .then(&PatternConverter)
            }
            _ => StrategyList::new(&PatternConverter as &'static dyn HtmlConverter),
        }
    }

    /// Reduce markup to text with the preferred tier
    pub fn to_text(self, html: &str) -> String {
        let tier = *self.tiers().first();
        debug!(tier = tier.name(), "Reducing HTML to text");
        tier.to_text(html)
    }

    /// Convert markup to Markdown, falling back through the tiers
    pub fn to_markdown(self, html: &str) -> String {
        let eval = self.tiers().evaluate(|tier| {
            debug!(tier = tier.name(), "Converting HTML to markdown");
            tier.to_markdown(html).map_err(|e| {
                warn!(tier = tier.name(), error = %e, "Markdown conversion failed, falling back");
                e
            })
        });
        eval.result
            .unwrap_or_else(|_| fenced(&PatternConverter.to_text(html)))
    }
}

/// Convert HTML to plain text with the default tier
pub fn html_to_text(html: &str) -> String {
    ConverterKind::default().to_text(html)
}

/// Convert HTML to markdown with the default tier
pub fn html_to_markdown(html: &str) -> String {
    ConverterKind::default().to_markdown(html)
}

/// Wrap text in a fenced code block without a language hint
pub fn fenced(text: &str) -> String {
    format!("```\n{}\n```", text)
}

/// Collapse whitespace runs (newlines included) to one space and trim
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if a Content-Type value denotes HTML
pub fn is_html(content_type: &str) -> bool {
    content_type.to_lowercase().contains("text/html")
}
