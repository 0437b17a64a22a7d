//! Position and range utilities for converting between LSP and internal representations.
//!
//! LSP characters are UTF-16 code units; internal offsets are bytes.

use std::ops::Range as ByteRange;

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};

/// Convert a byte offset to an LSP Position (0-based line and character).
pub fn offset_to_position(rope: &Rope, offset: usize) -> Option<Position> {
    if offset > rope.len_bytes() {
        return None;
    }

    let char_idx = rope.try_byte_to_char(offset).ok()?;
    let line = rope.char_to_line(char_idx);
    let line_start = rope.line_to_char(line);
    let character = rope.char_to_utf16_cu(char_idx) - rope.char_to_utf16_cu(line_start);

    Some(Position {
        line: line as u32,
        character: character as u32,
    })
}

/// Convert an LSP Position (0-based) to a byte offset.
///
/// A character past the end of the line clamps to the line end.
pub fn position_to_offset(rope: &Rope, position: Position) -> Option<usize> {
    let line = position.line as usize;

    if line >= rope.len_lines() {
        return None;
    }

    let line_start = rope.line_to_char(line);
    let line_slice = rope.line(line);
    let mut line_len = line_slice.len_chars();
    // Stay before the line break.
    if line_slice.chars().last() == Some('\n') {
        line_len -= 1;
        if line_len > 0 && line_slice.char(line_len - 1) == '\r' {
            line_len -= 1;
        }
    }

    let start_cu = rope.char_to_utf16_cu(line_start);
    let end_cu = rope.char_to_utf16_cu(line_start + line_len);
    let target_cu = (start_cu + position.character as usize).min(end_cu);
    let char_idx = rope.utf16_cu_to_char(target_cu);

    rope.try_char_to_byte(char_idx).ok()
}

/// Convert a byte range to an LSP Range.
pub fn offsets_to_range(rope: &Rope, range: ByteRange<usize>) -> Option<Range> {
    Some(Range {
        start: offset_to_position(rope, range.start)?,
        end: offset_to_position(rope, range.end)?,
    })
}

/// Byte range of the identifier-like word touching `offset`.
pub fn word_range_at(text: &str, offset: usize) -> Option<ByteRange<usize>> {
    if offset > text.len() || !text.is_char_boundary(offset) {
        return None;
    }

    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

    let start = text[..offset]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word(c))
        .last()
        .map_or(offset, |(i, _)| i);
    let end = text[offset..]
        .char_indices()
        .find(|&(_, c)| !is_word(c))
        .map_or(text.len(), |(i, _)| offset + i);

    (start < end).then_some(start..end)
}
