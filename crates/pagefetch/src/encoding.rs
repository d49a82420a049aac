//! Charset resolution and lossy decoding
//!
//! Precedence: the `charset` declared in the Content-Type, then a guess
//! from the bytes, then UTF-8. Decoding replaces malformed sequences and
//! never fails.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

/// Text decoded from a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    /// Name of the encoding actually used
    pub encoding: &'static str,
    /// True if any byte sequence was replaced
    pub had_errors: bool,
}

/// Extract the `charset` parameter from a Content-Type value
pub fn declared_charset(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(['"', '\''].as_ref()))
        })
        .find(|v| !v.is_empty())
}

/// Pick the encoding for a body
pub fn resolve_encoding(content_type: Option<&str>, bytes: &[u8]) -> &'static Encoding {
    if let Some(enc) = content_type
        .and_then(declared_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return enc;
    }

    if bytes.is_empty() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode a body, replacing malformed sequences
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedBody {
    let encoding = resolve_encoding(content_type, bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    debug!(
        encoding = used.name(),
        bytes = bytes.len(),
        had_errors,
        "Decoded response body"
    );
    DecodedBody {
        text: text.into_owned(),
        encoding: used.name(),
        had_errors,
    }
}
