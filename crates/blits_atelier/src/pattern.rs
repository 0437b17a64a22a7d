//! Pattern strategy: scan for `template:` keys followed by a quoted value.
//!
//! Works on any text, including code that does not parse. The quoted value is
//! read respecting backslash escapes and, inside backticks, `${...}` nesting,
//! so an interpolation such as `${ {a: 1}.a }` does not end the scan early.

use blits_carton::FxHashSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::heuristic::looks_like_template;
use crate::types::{RegionKind, Span};

static TEMPLATE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btemplate\s*:").expect("template key regex"));

/// A quoted value found after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QuotedValue {
    quote: u8,
    /// First byte after the opening quote.
    start: usize,
    /// Offset of the closing quote.
    end: usize,
}

/// Every `template:` value in `text` that looks like a template.
///
/// Spans cover the text between the quotes. For `'` and `"` values the
/// content is unescaped; backtick values keep their raw text. Unterminated
/// values are discarded and identical ranges are reported once.
pub fn extract_all_template_like_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut seen = FxHashSet::default();

    for key in TEMPLATE_KEY.find_iter(text) {
        let Some(value) = read_quoted_value(text.as_bytes(), key.end()) else {
            continue;
        };

        let Some(raw) = text.get(value.start..value.end) else {
            tracing::warn!(
                start = value.start,
                end = value.end,
                "skipping template candidate with invalid bounds"
            );
            continue;
        };

        let content = if value.quote == b'`' {
            raw.to_string()
        } else {
            unescape(raw)
        };

        if content.is_empty() || !looks_like_template(&content) {
            continue;
        }

        if seen.insert((value.start, value.end)) {
            spans.push(Span {
                start: value.start,
                end: value.end,
                content,
                kind: RegionKind::TemplateLiteral,
            });
        }
    }

    spans
}

/// Read the quoted value starting at or after `from` (whitespace skipped).
fn read_quoted_value(bytes: &[u8], from: usize) -> Option<QuotedValue> {
    let mut cursor = from;
    while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
        cursor += 1;
    }

    let quote = *bytes.get(cursor)?;
    if !matches!(quote, b'"' | b'\'' | b'`') {
        return None;
    }

    let start = cursor + 1;
    let end = if quote == b'`' {
        find_backtick_close(bytes, start)?
    } else {
        find_quote_close(bytes, start, quote)?
    };

    Some(QuotedValue { quote, start, end })
}

fn find_quote_close(bytes: &[u8], start: usize, quote: u8) -> Option<usize> {
    let mut escaped = false;
    for (offset, &byte) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == quote {
            return Some(offset);
        }
    }
    None
}

fn find_backtick_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    let mut cursor = start;

    while cursor < bytes.len() {
        let byte = bytes[cursor];
        if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == b'`' && depth == 0 {
            return Some(cursor);
        } else if byte == b'$' && bytes.get(cursor + 1) == Some(&b'{') {
            depth += 1;
            cursor += 1;
        } else if byte == b'{' && depth > 0 {
            depth += 1;
        } else if byte == b'}' && depth > 0 {
            depth -= 1;
        }
        cursor += 1;
    }

    None
}

/// Resolve JavaScript string escapes. Unknown escapes keep the escaped char.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuation.
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex, 'x');
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex, 'u');
            }
            other => out.push(other),
        }
    }

    out
}

fn push_code_point(out: &mut String, hex: &str, marker: char) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(hex);
        }
    }
}
