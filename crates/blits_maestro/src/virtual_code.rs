//! Virtual documents for script regions.
//!
//! The script block of a `.blits` component is handed to the script engine
//! as its own document. Its name is the real path plus a marker and the
//! extension of the declared language, so engines that sniff extensions pick
//! the right grammar and two real documents can never share a name.
//!
//! Paths that are not valid UTF-8, or that contain `%`, are written with
//! `%XX` escapes for `%` and every invalid byte.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use blits_atelier::{extract_script_region, ScriptLanguage, ScriptRegion};

const VIRTUAL_MARKER: &str = ".__script.";

/// Name of the virtual document holding the script region of `document`.
pub fn virtual_name(document: &Path, language: ScriptLanguage) -> String {
    format!(
        "{}{}{}",
        encode_path(document),
        VIRTUAL_MARKER,
        language.extension()
    )
}

/// The real document a virtual name was derived from.
pub fn document_path(name: &str) -> Option<PathBuf> {
    let (document, extension) = name.rsplit_once(VIRTUAL_MARKER)?;
    ScriptLanguage::from_attr(extension)?;
    if !document.contains('%') {
        return Some(PathBuf::from(document));
    }
    path_from_bytes(unescape(document)?)
}

fn encode_path(path: &Path) -> Cow<'_, str> {
    if let Some(text) = path.to_str() {
        if !text.contains('%') {
            return Cow::Borrowed(text);
        }
    }

    let bytes = path_bytes(path);
    let mut encoded = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        for ch in chunk.valid().chars() {
            match ch {
                '%' => encoded.push_str("%25"),
                _ => encoded.push(ch),
            }
        }
        for byte in chunk.invalid() {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    Cow::Owned(encoded)
}

fn unescape(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    Some(decoded)
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
        Cow::Owned(text) => Cow::Owned(text.into_bytes()),
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStringExt;
    Some(PathBuf::from(std::ffi::OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> Option<PathBuf> {
    String::from_utf8(bytes).ok().map(PathBuf::from)
}

/// The script region of one document, addressed as a virtual document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualScript {
    pub name: String,
    pub region: ScriptRegion,
}

impl VirtualScript {
    /// Extract the script block of a mixed-content document at `path`.
    pub fn extract(path: &Path, text: &str) -> Option<Self> {
        let region = extract_script_region(text)?;
        Some(Self {
            name: virtual_name(path, region.language),
            region,
        })
    }

    pub fn content(&self) -> &str {
        &self.region.span.content
    }

    pub fn language(&self) -> ScriptLanguage {
        self.region.language
    }

    /// Document offset to virtual offset, if it falls inside the region.
    pub fn to_virtual(&self, offset: usize) -> Option<usize> {
        let span = &self.region.span;
        span.contains(offset).then(|| offset - span.start)
    }

    /// Virtual offset back to a document offset.
    pub fn to_document(&self, offset: usize) -> usize {
        self.region.span.start + offset.min(self.region.span.len())
    }
}
