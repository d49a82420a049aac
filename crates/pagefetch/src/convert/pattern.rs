//! Regex-based conversion tier
//!
//! Used when no tree-aware parser is configured. Unbalanced tags and `>`
//! inside attribute values degrade the output but never fail.

use super::{fenced, normalize_whitespace, ConvertError, HtmlConverter, TEXT_REMOVED_ELEMENTS};
use regex::Regex;
use std::sync::OnceLock;

/// Pattern-based converter
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternConverter;

impl HtmlConverter for PatternConverter {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn to_text(&self, html: &str) -> String {
        let mut cleaned = comment_pattern().replace_all(html, " ").into_owned();
        for pattern in removed_element_patterns() {
            cleaned = pattern.replace_all(&cleaned, " ").into_owned();
        }
        let stripped = tag_pattern().replace_all(&cleaned, " ");
        normalize_whitespace(&decode_entities(&stripped))
    }

    fn to_markdown(&self, html: &str) -> Result<String, ConvertError> {
        Ok(fenced(&self.to_text(html)))
    }
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// One pattern per element; the regex crate has no backreferences to pair
/// an opening tag with its own closing tag
fn removed_element_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TEXT_REMOVED_ELEMENTS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                    .expect("element pattern is valid")
            })
            .collect()
    })
}

/// Decode character references; unknown ones are kept verbatim
fn decode_entities(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        output.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&rest[1..=end]).map(|c| (c, end + 2)));

        match decoded {
            Some((c, consumed)) => {
                output.push(c);
                rest = &rest[consumed..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Decode a single reference body (without `&` and `;`)
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
