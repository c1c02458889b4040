//! Dollar-delimited math span scanning.
//!
//! A span opens at a `$` that is not preceded by a backslash and closes at the
//! next such `$`. `\$` is a literal dollar sign everywhere and never delimits.

/// Literal dollar sign as written by the user.
pub const ESCAPED_DOLLAR: &str = "\\$";

/// One `$…$` region of the source text.
///
/// Offsets are byte offsets into the scanned string and point at the
/// delimiters themselves, so `&raw[start + 1..end]` is the untrimmed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    /// Offset of the opening `$`
    pub start: usize,
    /// Offset of the closing `$`
    pub end: usize,
    /// Trimmed content, ready to hand to a renderer
    pub fragment: String,
}

/// Find every non-overlapping math span in `raw`, left to right.
pub fn extract_spans(raw: &str) -> Vec<MathSpan> {
    let bytes = raw.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(open) = find_delimiter(bytes, pos) {
        let Some(close) = find_delimiter(bytes, open + 1) else {
            // unterminated opener, the rest is plain text
            break;
        };
        if close == open + 1 {
            // `$$` has no content; the second dollar may still open a span
            pos = close;
            continue;
        }
        spans.push(MathSpan {
            start: open,
            end: close,
            fragment: prepare_fragment(&raw[open + 1..close]),
        });
        pos = close + 1;
    }

    spans
}

/// Turn `\$` back into `$`.
pub fn unescape_dollars(text: &str) -> String {
    text.replace(ESCAPED_DOLLAR, "$")
}

/// Drop bare `$` characters left dangling at the end of a plain segment.
///
/// These come from an empty `$$` pair whose second dollar opened the next span.
pub(crate) fn strip_stray_delimiters(mut text: &str) -> &str {
    while text.ends_with('$') && !text.ends_with(ESCAPED_DOLLAR) {
        text = &text[..text.len() - 1];
    }
    text
}

// KaTeX mis-parses `\$` when another character follows directly
fn prepare_fragment(content: &str) -> String {
    content.trim().replace(ESCAPED_DOLLAR, "\\$ ")
}

fn is_delimiter(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'$' && (idx == 0 || bytes[idx - 1] != b'\\')
}

fn find_delimiter(bytes: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len()).find(|&idx| is_delimiter(bytes, idx))
}
