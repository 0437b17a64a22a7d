//! # blits_atelier
//!
//! Atelier - Region extraction for Blits components.
//!
//! ## Name Origin
//!
//! An **atelier** is the workshop where a piece is cut out of raw material
//! before it goes anywhere else. `blits_atelier` cuts template and script
//! regions out of raw document text so the rest of the toolchain can work on
//! them in isolation.
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                        blits_atelier                          |
//! +-------------------------------------------------------------+
//! |                                                               |
//! |   .blits document            .js / .ts document               |
//! |        |                          |                           |
//! |        v                          v                           |
//! |  +-------------+     +-------------------------------+       |
//! |  |   block     |     | pattern (always)  structural  |       |
//! |  | <template>  |     | `template:` scan  (oxc parse) |       |
//! |  | <script>    |     +-------------------------------+       |
//! |  +-------------+                  |                           |
//! |        |                          v                           |
//! |        |              looks_like_template (heuristic)         |
//! |        v                          v                           |
//! |  +-------------------------------------------------------+   |
//! |  |        Extraction { via: Structural | Pattern, spans } |   |
//! |  +-------------------------------------------------------+   |
//! +-------------------------------------------------------------+
//! ```
//!
//! Every entry point is a pure function over the document text. Nothing here
//! panics or returns an error for malformed input: absent regions are `None`
//! or empty, and a bad candidate is logged and skipped.
//!
//! ## Usage
//!
//! ```
//! use blits_atelier::{extract_script_region, ScriptLanguage};
//!
//! let text = "<template><Element /></template>\n<script lang=\"ts\">export default {}</script>";
//! let script = extract_script_region(text).unwrap();
//! assert_eq!(script.language, ScriptLanguage::Ts);
//! assert_eq!(&text[script.span.start..script.span.end], "export default {}");
//! ```

pub mod block;
pub mod heuristic;
pub mod pattern;
pub mod strategy;
pub mod structural;
mod types;

pub use block::{extract_script_region, extract_template_region};
pub use heuristic::looks_like_template;
pub use pattern::extract_all_template_like_spans;
pub use strategy::extract_templates;
pub use structural::extract_structural_spans;
pub use types::{DocumentKind, Extraction, RegionKind, ScriptLanguage, ScriptRegion, Span, Strategy};
