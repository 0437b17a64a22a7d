//! LSP wire format spoken with the engine process.
//!
//! Only the handful of shapes the engine needs are modelled; everything else
//! is read straight out of `serde_json::Value`.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::engine::{
    CompletionEntry, CompletionKind, EngineDiagnostic, QuickInfo, Severity, SignatureHelp,
    SignatureInfo,
};

/// LSP position. `character` counts UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspPosition {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspRange {
    pub start: LspPosition,
    pub end: LspPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspLocation {
    pub uri: String,
    pub range: LspRange,
}

/// Diagnostic as published by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LspDiagnostic {
    pub range: LspRange,
    /// 1=Error, 2=Warning, 3=Info, 4=Hint
    pub severity: Option<u8>,
    pub code: Option<Value>,
    pub source: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcNotification<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Any message the engine sends us.
#[derive(Debug, Deserialize)]
pub(crate) struct IncomingMessage {
    pub id: Option<Value>,
    pub method: Option<String>,
    pub params: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

pub(crate) enum Incoming {
    Response {
        id: u64,
        result: Result<Value, JsonRpcError>,
    },
    Notification {
        method: String,
        params: Value,
    },
    /// A request from the engine to us.
    Request {
        id: Value,
        method: String,
        params: Value,
    },
    Unknown,
}

impl IncomingMessage {
    pub fn classify(self) -> Incoming {
        match (self.id, self.method) {
            (Some(id), Some(method)) => Incoming::Request {
                id,
                method,
                params: self.params.unwrap_or(Value::Null),
            },
            (None, Some(method)) => Incoming::Notification {
                method,
                params: self.params.unwrap_or(Value::Null),
            },
            (Some(id), None) => match id.as_u64() {
                Some(id) => Incoming::Response {
                    id,
                    result: match self.error {
                        Some(error) => Err(error),
                        None => Ok(self.result.unwrap_or(Value::Null)),
                    },
                },
                None => Incoming::Unknown,
            },
            (None, None) => Incoming::Unknown,
        }
    }
}

/// Frame a JSON body with a `Content-Length` header.
pub fn encode_message(body: &str) -> String {
    format!("Content-Length: {}\r\n\r\n{}", body.len(), body)
}

/// Read one framed message body. `None` at end of stream.
pub async fn read_message<R>(reader: &mut R) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            if line == "\r\n" || line == "\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        if content_length == 0 {
            continue;
        }

        let mut content = vec![0u8; content_length];
        reader.read_exact(&mut content).await?;
        return Ok(Some(content));
    }
}

/// Byte offset to LSP position.
pub fn offset_to_position(text: &str, offset: usize) -> LspPosition {
    let mut line = 0u32;
    let mut character = 0u32;

    for (index, ch) in text.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += ch.len_utf16() as u32;
        }
    }

    LspPosition { line, character }
}

/// LSP position to byte offset, clamped to the line end and text end.
pub fn position_to_offset(text: &str, position: LspPosition) -> usize {
    let mut line = 0u32;
    let mut character = 0u32;

    for (index, ch) in text.char_indices() {
        if line == position.line {
            if character >= position.character || ch == '\n' {
                return index;
            }
            character += ch.len_utf16() as u32;
        } else if ch == '\n' {
            line += 1;
        }
    }

    text.len()
}

fn range_to_span(text: &str, range: &LspRange) -> std::ops::Range<usize> {
    position_to_offset(text, range.start)..position_to_offset(text, range.end)
}

/// Documentation may be a plain string or `MarkupContent`.
fn documentation_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
    .filter(|text| !text.is_empty())
}

/// Decode a `textDocument/hover` result.
pub fn decode_hover(result: &Value, text: &str) -> Option<QuickInfo> {
    let contents = result.get("contents")?;

    let (contents, is_markdown) = match contents {
        Value::String(plain) => (plain.clone(), false),
        Value::Object(map) if map.contains_key("kind") => {
            let value = map.get("value").and_then(Value::as_str).unwrap_or_default();
            let is_markdown = map.get("kind").and_then(Value::as_str) == Some("markdown");
            (value.to_string(), is_markdown)
        }
        Value::Object(_) => (marked_string(contents)?, true),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(marked_string).collect();
            (parts.join("\n\n"), true)
        }
        _ => return None,
    };

    if contents.trim().is_empty() {
        return None;
    }

    let span = result
        .get("range")
        .and_then(|range| serde_json::from_value::<LspRange>(range.clone()).ok())
        .map(|range| range_to_span(text, &range));

    Some(QuickInfo {
        contents,
        is_markdown,
        span,
    })
}

/// Deprecated `MarkedString`: a markdown string or `{ language, value }`.
fn marked_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => {
            let code = map.get("value").and_then(Value::as_str)?;
            let language = map.get("language").and_then(Value::as_str).unwrap_or("");
            Some(format!("```{}\n{}\n```", language, code))
        }
        _ => None,
    }
}

/// Decode a `textDocument/completion` result (list or bare array).
pub fn decode_completions(result: &Value) -> Vec<CompletionEntry> {
    let items = match result {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let label = item.get("label")?.as_str()?;
            let kind = item
                .get("kind")
                .and_then(Value::as_u64)
                .map_or(CompletionKind::Other, |kind| {
                    CompletionKind::from_lsp(kind as u32)
                });

            let mut entry = CompletionEntry::new(label, kind);
            entry.detail = item
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string);
            entry.documentation = item.get("documentation").and_then(documentation_text);
            entry.insert_text = item
                .get("insertText")
                .or_else(|| item.get("textEdit").and_then(|edit| edit.get("newText")))
                .and_then(Value::as_str)
                .map(str::to_string);
            entry.sort_text = item
                .get("sortText")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(entry)
        })
        .collect()
}

/// Decode a `textDocument/definition` result into plain locations.
///
/// Accepts a single `Location`, an array of them, or `LocationLink`s.
pub fn decode_locations(result: &Value) -> Vec<LspLocation> {
    let items: Vec<&Value> = match result {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![result],
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| {
            if let Ok(location) = serde_json::from_value::<LspLocation>(item.clone()) {
                return Some(location);
            }
            let uri = item.get("targetUri")?.as_str()?;
            let range = item
                .get("targetSelectionRange")
                .or_else(|| item.get("targetRange"))?;
            Some(LspLocation {
                uri: uri.to_string(),
                range: serde_json::from_value(range.clone()).ok()?,
            })
        })
        .collect()
}

/// Decode a `textDocument/signatureHelp` result.
pub fn decode_signature_help(result: &Value) -> Option<SignatureHelp> {
    let signatures: Vec<SignatureInfo> = result
        .get("signatures")?
        .as_array()?
        .iter()
        .filter_map(|signature| {
            let label = signature.get("label")?.as_str()?;
            let parameters = signature
                .get("parameters")
                .and_then(Value::as_array)
                .map(|parameters| {
                    parameters
                        .iter()
                        .filter_map(|parameter| parameter_label(label, parameter.get("label")?))
                        .collect()
                })
                .unwrap_or_default();

            Some(SignatureInfo {
                label: label.to_string(),
                documentation: signature.get("documentation").and_then(documentation_text),
                parameters,
            })
        })
        .collect();

    if signatures.is_empty() {
        return None;
    }

    let index = |key: &str| result.get(key).and_then(Value::as_u64).unwrap_or(0) as u32;
    Some(SignatureHelp {
        signatures,
        active_signature: index("activeSignature"),
        active_parameter: index("activeParameter"),
    })
}

/// Parameter labels are either strings or UTF-16 offsets into the signature.
fn parameter_label(signature: &str, label: &Value) -> Option<String> {
    match label {
        Value::String(text) => Some(text.clone()),
        Value::Array(bounds) => {
            let start = bounds.first()?.as_u64()? as usize;
            let end = bounds.get(1)?.as_u64()? as usize;
            let units: Vec<u16> = signature.encode_utf16().collect();
            units
                .get(start..end)
                .map(String::from_utf16_lossy)
        }
        _ => None,
    }
}

/// Convert a published diagnostic into document offsets.
pub fn convert_diagnostic(diagnostic: &LspDiagnostic, text: &str) -> EngineDiagnostic {
    let code = diagnostic.code.as_ref().map(|code| match code {
        Value::String(code) => code.clone(),
        other => other.to_string(),
    });

    EngineDiagnostic {
        span: range_to_span(text, &diagnostic.range),
        severity: Severity::from_lsp(diagnostic.severity),
        code,
        message: diagnostic.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_conversion() {
        let text = "line1\nline2\nline3";

        assert_eq!(
            offset_to_position(text, 8),
            LspPosition {
                line: 1,
                character: 2
            }
        );
        assert_eq!(
            position_to_offset(
                text,
                LspPosition {
                    line: 2,
                    character: 0
                }
            ),
            12
        );
        // Past the end of a line clamps to the newline.
        assert_eq!(
            position_to_offset(
                text,
                LspPosition {
                    line: 0,
                    character: 40
                }
            ),
            5
        );
        assert_eq!(
            position_to_offset(
                text,
                LspPosition {
                    line: 9,
                    character: 0
                }
            ),
            text.len()
        );
    }

    #[test]
    fn test_position_conversion_utf16() {
        let text = "const s = '😀'; x";
        let offset = text.find('x').unwrap();
        let position = offset_to_position(text, offset);

        // The emoji is one char, four bytes, two UTF-16 units.
        assert_eq!(position.character, 16);
        assert_eq!(position_to_offset(text, position), offset);
    }

    #[tokio::test]
    async fn test_read_message_framing() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":null}"#;
        let stream = format!(
            "Content-Type: application/json\r\n{}{}",
            encode_message(body),
            encode_message("{}")
        );
        let mut reader = tokio::io::BufReader::new(stream.as_bytes());

        assert_eq!(
            read_message(&mut reader).await.unwrap().as_deref(),
            Some(body.as_bytes())
        );
        assert_eq!(
            read_message(&mut reader).await.unwrap().as_deref(),
            Some(&b"{}"[..])
        );
        assert_eq!(read_message(&mut reader).await.unwrap(), None);
    }

    #[test]
    fn test_classify_messages() {
        let notification: IncomingMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "textDocument/publishDiagnostics",
            "params": { "uri": "blits-virtual:///a.js", "diagnostics": [] }
        }))
        .unwrap();
        assert!(matches!(
            notification.classify(),
            Incoming::Notification { ref method, .. } if method == "textDocument/publishDiagnostics"
        ));

        let error: IncomingMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 4, "error": { "code": -32601, "message": "nope" }
        }))
        .unwrap();
        assert!(matches!(
            error.classify(),
            Incoming::Response { id: 4, result: Err(ref e) } if e.code == -32601
        ));

        let request: IncomingMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": "cfg", "method": "workspace/configuration", "params": {}
        }))
        .unwrap();
        assert!(matches!(request.classify(), Incoming::Request { .. }));
    }

    #[test]
    fn test_decode_hover() {
        let text = "const count = 1";
        let hover = decode_hover(
            &json!({
                "contents": { "kind": "plaintext", "value": "const count: 1" },
                "range": {
                    "start": { "line": 0, "character": 6 },
                    "end": { "line": 0, "character": 11 }
                }
            }),
            text,
        )
        .unwrap();

        assert_eq!(hover.contents, "const count: 1");
        assert!(!hover.is_markdown);
        assert_eq!(hover.span, Some(6..11));

        let marked = decode_hover(
            &json!({ "contents": [{ "language": "typescript", "value": "let a: string" }, "docs"] }),
            text,
        )
        .unwrap();
        assert_eq!(marked.contents, "```typescript\nlet a: string\n```\n\ndocs");
        assert!(marked.is_markdown);

        assert!(decode_hover(&json!({ "contents": "" }), text).is_none());
        assert!(decode_hover(&Value::Null, text).is_none());
    }

    #[test]
    fn test_decode_completions() {
        let list = json!({
            "isIncomplete": false,
            "items": [
                { "label": "mounted", "kind": 2, "detail": "() => void", "sortText": "11" },
                { "label": "state", "kind": 10, "textEdit": { "newText": "state()" },
                  "documentation": { "kind": "markdown", "value": "Reactive state" } },
                { "kind": 6 }
            ]
        });

        let entries = decode_completions(&list);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, CompletionKind::Method);
        assert_eq!(entries[0].detail.as_deref(), Some("() => void"));
        assert_eq!(entries[1].insert_text.as_deref(), Some("state()"));
        assert_eq!(entries[1].documentation.as_deref(), Some("Reactive state"));

        assert_eq!(decode_completions(&json!([{ "label": "x" }])).len(), 1);
        assert!(decode_completions(&Value::Null).is_empty());
    }

    #[test]
    fn test_decode_locations() {
        let range = json!({
            "start": { "line": 1, "character": 2 },
            "end": { "line": 1, "character": 5 }
        });

        let single = decode_locations(&json!({ "uri": "file:///a.ts", "range": range }));
        assert_eq!(single.len(), 1);

        let links = decode_locations(&json!([{
            "targetUri": "file:///b.ts",
            "targetRange": range,
            "targetSelectionRange": range
        }]));
        assert_eq!(links[0].uri, "file:///b.ts");
        assert_eq!(links[0].range.start.character, 2);
    }

    #[test]
    fn test_decode_signature_help() {
        let help = decode_signature_help(&json!({
            "signatures": [{
                "label": "fn(a: number, b: string): void",
                "parameters": [{ "label": [3, 12] }, { "label": "b: string" }]
            }],
            "activeParameter": 1
        }))
        .unwrap();

        assert_eq!(help.signatures[0].parameters, vec!["a: number", "b: string"]);
        assert_eq!(help.active_signature, 0);
        assert_eq!(help.active_parameter, 1);

        assert!(decode_signature_help(&json!({ "signatures": [] })).is_none());
    }

    #[test]
    fn test_convert_diagnostic() {
        let diagnostic = LspDiagnostic {
            range: LspRange {
                start: LspPosition {
                    line: 1,
                    character: 0,
                },
                end: LspPosition {
                    line: 1,
                    character: 3,
                },
            },
            severity: Some(2),
            code: Some(json!(6133)),
            source: Some("ts".to_string()),
            message: "unused".to_string(),
        };

        let converted = convert_diagnostic(&diagnostic, "a\nbcd");
        assert_eq!(converted.span, 2..5);
        assert_eq!(converted.severity, Severity::Warning);
        assert_eq!(converted.code.as_deref(), Some("6133"));
    }
}
