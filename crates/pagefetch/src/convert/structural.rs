//! Tree-aware conversion tier

use super::{
    normalize_whitespace, ConvertError, HtmlConverter, MARKDOWN_REMOVED_ELEMENTS,
    TEXT_REMOVED_ELEMENTS,
};
use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use scraper::{Html, Node};

/// Converter backed by `scraper` (text) and `htmd` (Markdown)
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralConverter;

impl HtmlConverter for StructuralConverter {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn to_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        normalize_whitespace(&collect_text(document.tree.root()))
    }

    fn to_markdown(&self, html: &str) -> Result<String, ConvertError> {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(MARKDOWN_REMOVED_ELEMENTS.to_vec())
            .options(Options {
                heading_style: HeadingStyle::Atx,
                bullet_list_marker: BulletListMarker::Asterisk,
                code_block_style: CodeBlockStyle::Fenced,
                ..Default::default()
            })
            .build();

        let markdown = converter
            .convert(html)
            .map_err(|e| ConvertError(e.to_string()))?;

        Ok(strip_fence_info(markdown.trim()))
    }
}

fn is_removed(node: &NodeRef<'_, Node>) -> bool {
    node.value()
        .as_element()
        .is_some_and(|el| TEXT_REMOVED_ELEMENTS.contains(&el.name()))
}

/// Concatenate text nodes with a space between each, skipping removed
/// subtrees. Iterative so deeply nested documents cannot exhaust the stack.
fn collect_text(root: NodeRef<'_, Node>) -> String {
    let mut output = String::new();
    let mut skip_depth: usize = 0;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => {
                if is_removed(&node) {
                    skip_depth += 1;
                } else if skip_depth == 0 {
                    if let Node::Text(text) = node.value() {
                        output.push_str(text);
                        output.push(' ');
                    }
                }
            }
            Edge::Close(node) => {
                if is_removed(&node) {
                    skip_depth = skip_depth.saturating_sub(1);
                }
            }
        }
    }

    output
}

/// Drop the info string (language hint) from opening code fences
fn strip_fence_info(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len());
    let mut open_fence: Option<usize> = None;

    for (i, line) in markdown.split('\n').enumerate() {
        if i > 0 {
            output.push('\n');
        }

        let trimmed = line.trim_start();
        let ticks = trimmed.chars().take_while(|&c| c == '`').count();
        if ticks < 3 {
            output.push_str(line);
            continue;
        }

        match open_fence {
            None => {
                let indent = &line[..line.len() - trimmed.len()];
                output.push_str(indent);
                output.push_str(&trimmed[..ticks]);
                open_fence = Some(ticks);
            }
            Some(open) if ticks >= open && trimmed[ticks..].trim().is_empty() => {
                output.push_str(line);
                open_fence = None;
            }
            Some(_) => output.push_str(line),
        }
    }

    output
}
