//! # Blits
//!
//! Editor tooling for Lightning Blits apps, written in Rust.
//!
//! This crate re-exports all Blits sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`carton`] - Shared hashing, path and debounce utilities
//! - [`atelier`] - Template and script region extraction
//! - [`atlas`] - Project discovery and the file-to-project registry
//! - [`canon`] - Script engine contract and the tsgo engine
//! - [`maestro`] - Language Server Protocol (LSP) implementation

/// Shared hashing, path and debounce utilities.
pub use blits_carton as carton;

/// Template and script region extraction.
pub use blits_atelier as atelier;

/// Project discovery and the file-to-project registry.
pub use blits_atlas as atlas;

/// Script engine contract and the tsgo engine.
pub use blits_canon as canon;

/// Language Server Protocol (LSP) implementation.
pub use blits_maestro as maestro;
