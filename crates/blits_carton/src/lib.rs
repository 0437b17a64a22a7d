//! Carton - The shared toolbox for Blits language tooling.
//!
//! Like the artist's portfolio case it is named after, this crate holds the
//! small, dependency-light pieces every other Blits crate reaches for:
//!
//! - **hash**: fast content hashing for change detection
//! - **path**: lexical path normalization and directory-boundary matching
//! - **debounce**: a debouncer keyed by a logical operation (e.g. a manifest path)

pub mod debounce;
pub mod hash;
pub mod path;

pub use debounce::KeyedDebouncer;
pub use path::{contains_component, is_within, normalize_path};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};
