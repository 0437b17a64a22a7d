//! Path helpers shared by the project registry and the service router.
//!
//! All matching here is lexical: paths are never canonicalized against the
//! file system, so lookups stay cheap and work for files that no longer exist.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path.
///
/// Removes `.` segments, resolves `..` against preceding normal segments and
/// drops trailing separators. `..` never climbs above the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Check whether `path` is `root` itself or lies below it.
///
/// The comparison respects directory boundaries: `/a/bc` is not within `/a/b`.
#[inline]
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Check whether any directory segment of `path` equals one of `names`.
pub fn contains_component(path: &Path, names: &[&str]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(segment) => names.iter().any(|name| segment == *name),
        _ => false,
    })
}
