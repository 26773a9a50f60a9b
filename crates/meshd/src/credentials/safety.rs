//! Path-safety predicate applied before any key file is opened.
//!
//! Only metadata is consulted, so a refused path is never opened. A path that
//! does not exist passes here and fails later as a read error, which keeps
//! "bad permissions" and "missing file" distinguishable for operators.
//!
//! Every directory leading to the key is checked too: none may be a symbolic
//! link, and none may be group- or world-writable unless its sticky bit is set.

use std::fs;
use std::io;

use camino::{Utf8Component, Utf8Path};

use super::errors::{UnsafePathError, UnsafeReason};

#[cfg(unix)]
const FOREIGN_WRITE_BITS: u32 = 0o022;
#[cfg(unix)]
const STICKY_BIT: u32 = 0o1000;

/// Checks that `path` is safe to read key material from.
pub fn check_key_path(path: &Utf8Path) -> Result<(), UnsafePathError> {
    unsafe_reason(path).map_or(Ok(()), |reason| {
        Err(UnsafePathError {
            path: path.to_path_buf(),
            reason,
        })
    })
}

fn unsafe_reason(path: &Utf8Path) -> Option<UnsafeReason> {
    if path
        .components()
        .any(|component| matches!(component, Utf8Component::ParentDir))
    {
        return Some(UnsafeReason::ParentTraversal);
    }

    #[cfg(unix)]
    {
        if let Some(reason) = unsafe_ancestor(path) {
            return Some(reason);
        }
    }

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
        Err(error) => {
            return Some(UnsafeReason::Uninspectable { kind: error.kind() });
        }
    };

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        return Some(UnsafeReason::Symlink);
    }
    if !file_type.is_file() {
        return Some(UnsafeReason::NotRegularFile);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode() & 0o7777;
        if mode & FOREIGN_WRITE_BITS != 0 {
            return Some(UnsafeReason::Writable { mode });
        }
    }

    None
}

#[cfg(unix)]
fn unsafe_ancestor(path: &Utf8Path) -> Option<UnsafeReason> {
    use std::os::unix::fs::PermissionsExt;

    path.ancestors()
        .skip(1)
        .filter(|ancestor| !ancestor.as_str().is_empty())
        .find_map(|ancestor| {
            let metadata = match fs::symlink_metadata(ancestor) {
                Ok(metadata) => metadata,
                Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
                Err(error) => return Some(UnsafeReason::Uninspectable { kind: error.kind() }),
            };
            if metadata.file_type().is_symlink() {
                return Some(UnsafeReason::SymlinkedAncestor {
                    ancestor: ancestor.to_path_buf(),
                });
            }
            let mode = metadata.permissions().mode() & 0o7777;
            (mode & FOREIGN_WRITE_BITS != 0 && mode & STICKY_BIT == 0).then(|| {
                UnsafeReason::WritableAncestor {
                    ancestor: ancestor.to_path_buf(),
                    mode,
                }
            })
        })
}
