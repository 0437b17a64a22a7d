//! # blits_atlas
//!
//! Atlas - Project discovery for Blits workspaces.
//!
//! ## Name Origin
//!
//! An **atlas** is a bound collection of maps. `blits_atlas` maps a workspace:
//! which directories are Blits projects, and which project any given file
//! belongs to.
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                          blits_atlas                           |
//! +--------------------------------------------------------------+
//! |                                                                |
//! |  +------------------+   discover()   +---------------------+  |
//! |  |  WorkspaceHost   |--------------->|   ProjectRegistry   |  |
//! |  |  roots / glob /  |                |  projects (by root) |  |
//! |  |  read / watch    |                |  file -> project    |  |
//! |  +------------------+                |  cache              |  |
//! |           |                          +---------------------+  |
//! |           | manifest events                    ^              |
//! |           v                                    |              |
//! |  +------------------+  keyed debounce  +-------------------+  |
//! |  |  ChangeWatcher   |----------------->| apply_manifest_   |  |
//! |  |                  |                  | change            |  |
//! |  +------------------+                  +-------------------+  |
//! +--------------------------------------------------------------+
//! ```
//!
//! Discovery runs at most once; concurrent callers share the same run.
//! Lookups never block on it: before discovery completes they answer from
//! whatever is known and leave the cache untouched.

mod config;
pub mod host;
mod manifest;
pub mod memory;
pub mod native;
mod registry;
mod watcher;

pub use config::AtlasConfig;
pub use host::{GlobFilter, HostError, ManifestWatch, WatchEvent, WorkspaceHost};
pub use manifest::{ManifestError, PackageManifest};
pub use memory::MemoryHost;
pub use native::NativeHost;
pub use registry::{ManifestChange, Project, ProjectRegistry};
pub use watcher::ChangeWatcher;
