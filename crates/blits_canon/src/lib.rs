//! # blits_canon
//!
//! Canon - The script engine boundary for Blits.
//!
//! ## Name Origin
//!
//! **Canon** in art is the accepted standard a work is measured against.
//! `blits_canon` is where Blits script code is measured: it defines the
//! contract every script-analysis engine fulfils and ships one backed by
//! tsgo.
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------+
//! |                       blits_canon                          |
//! +----------------------------------------------------------+
//! |                                                            |
//! |  +----------------------+     +-----------------------+    |
//! |  | ScriptEngineFactory  |---->| ScriptEngine          |    |
//! |  | - create(root)       |     | - sync_document       |    |
//! |  +----------------------+     | - completions         |    |
//! |            |                  | - quick_info          |    |
//! |            v                  | - definition          |    |
//! |  +----------------------+     | - signature_help      |    |
//! |  | TsgoEngine           |     | - diagnostics         |    |
//! |  | LSP over stdio       |     +-----------------------+    |
//! |  +----------------------+     | StubEngine (empty)    |    |
//! |                               +-----------------------+    |
//! +----------------------------------------------------------+
//! ```
//!
//! Engines address virtual documents by name and take byte offsets into the
//! virtual text; line/character translation happens inside the engine.

mod config;
mod engine;
mod error;
pub mod protocol;
mod stub;
pub mod tsgo;

pub use config::TsgoEngineConfig;
pub use engine::{
    CompletionEntry, CompletionKind, DefinitionTarget, EngineDiagnostic, QuickInfo, ScriptEngine,
    ScriptEngineFactory, Severity, SignatureHelp, SignatureInfo, TextPosition,
};
pub use error::EngineError;
pub use stub::{StubEngine, StubEngineFactory};
pub use tsgo::{find_tsgo_path, TsgoEngine, TsgoEngineFactory, VIRTUAL_URI_SCHEME};
