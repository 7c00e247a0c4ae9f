use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::error::ClientError;
use crate::navigator::join_remote;
use crate::operations::FileOperations;

/// One pending transfer of an expanded upload task.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadEntry {
    pub local: PathBuf,
    pub remote: String,
}

/// Outcome of a best-effort batch. A failed entry never aborts the
/// remainder; `failed` carries one (remote path, reason) pair per failure.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl UploadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Expand a local file or directory into ordered (local, remote) pairs.
///
/// A single file becomes one pair under the prefix. A directory is walked
/// depth-first in sorted order; only files produce pairs, since the server
/// creates intermediate directories implicitly from the path string.
/// Platform separators are normalized to `/`. An unreadable subtree is
/// logged and skipped; the rest of the tree still expands.
pub fn expand(local_root: &Path, remote_prefix: &str) -> Result<Vec<UploadEntry>, ClientError> {
    if local_root.is_file() {
        let name = local_root
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::InvalidName(local_root.display().to_string()))?;
        return Ok(vec![UploadEntry {
            local: local_root.to_path_buf(),
            remote: join_remote(remote_prefix, name),
        }]);
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(local_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable path: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(local_root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(UploadEntry {
            local: entry.into_path(),
            remote: join_remote(remote_prefix, &relative),
        });
    }
    Ok(entries)
}

/// Read local content with text semantics. Bytes that do not decode as
/// UTF-8 are lossily substituted; binary files are not transferred
/// faithfully. Known limitation of the wire contract, not a bug here.
pub fn read_file_text(path: &Path) -> Result<String, ClientError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Submit an expanded task list sequentially, in order.
///
/// Each entry is attempted regardless of earlier failures. The caller is
/// expected to follow a batch with exactly one navigator refresh and one
/// quota re-poll, not one per file.
pub async fn run_batch(ops: &FileOperations, entries: &[UploadEntry]) -> UploadReport {
    let mut report = UploadReport::default();
    for entry in entries {
        let outcome = match read_file_text(&entry.local) {
            Ok(content) => ops.put_file(&entry.remote, &content).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                info!("uploaded {}", entry.remote);
                report.uploaded.push(entry.remote.clone());
            }
            Err(e) => {
                warn!("upload of {} failed: {}", entry.remote, e);
                report.failed.push((entry.remote.clone(), e.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let entries = expand(&file, "docs").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].remote, "docs/a.txt");
        assert_eq!(entries[0].local, file);
    }

    #[test]
    fn test_expand_single_file_at_root_prefix() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let entries = expand(&file, "").unwrap();
        assert_eq!(entries[0].remote, "a.txt");
    }

    #[test]
    fn test_expand_directory_is_ordered_and_slash_separated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "b").unwrap();

        let entries = expand(dir.path(), "docs").unwrap();
        let remotes: Vec<&str> = entries.iter().map(|e| e.remote.as_str()).collect();
        assert_eq!(remotes, vec!["docs/a.txt", "docs/sub/b.txt"]);
    }

    #[test]
    fn test_expand_skips_empty_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("z.txt"), "z").unwrap();

        let entries = expand(dir.path(), "").unwrap();
        let remotes: Vec<&str> = entries.iter().map(|e| e.remote.as_str()).collect();
        assert_eq!(remotes, vec!["z.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_survives_an_unreadable_subtree() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.txt"), "ok").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "h").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let entries = expand(dir.path(), "").unwrap();
        let remotes: Vec<&str> = entries.iter().map(|e| e.remote.as_str()).collect();
        assert!(remotes.contains(&"ok.txt"));

        // Restore so TempDir can clean up.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_read_file_text_substitutes_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("blob.bin");
        fs::write(&file, [b'o', b'k', 0xff, 0xfe]).unwrap();

        let text = read_file_text(&file).unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.contains('\u{fffd}'));
    }
}
