//! Utility functions for the LSP server.

mod position;

pub use position::*;
