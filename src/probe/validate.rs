//! Input path validation

use crate::types::SyncError;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Validate a sync root and return its canonical form.
///
/// * missing path → `SyncError::InvalidPath`
/// * unreadable path → `SyncError::PermissionDenied`
/// * directory → trailing separator stripped (`left/` becomes `left`)
pub fn validate_path(path: &Path) -> Result<PathBuf, SyncError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::InvalidPath {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(SyncError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(SyncError::Io(e)),
    };

    if !is_readable(path) {
        return Err(SyncError::PermissionDenied {
            path: path.to_path_buf(),
        });
    }

    if metadata.is_dir() {
        Ok(strip_trailing_separator(path))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Whether the current user can read `path`.
///
/// Files must open for reading; directories must list.
pub fn is_readable(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::read_dir(path).is_ok(),
        Ok(metadata) if metadata.file_type().is_symlink() => fs::read_link(path).is_ok(),
        Ok(_) => File::open(path).is_ok(),
        Err(_) => false,
    }
}

fn strip_trailing_separator(path: &Path) -> PathBuf {
    // Rebuilding from components drops the trailing separator but keeps a bare root.
    let rebuilt: PathBuf = path.components().collect();
    if rebuilt.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path_is_invalid() {
        let dir = TempDir::new().expect("create tempdir");
        let missing = dir.path().join("nope");

        let err = validate_path(&missing).expect_err("missing path");
        assert!(matches!(err, SyncError::InvalidPath { .. }));
    }

    #[test]
    fn test_directory_trailing_separator_is_stripped() {
        let dir = TempDir::new().expect("create tempdir");
        let with_slash = PathBuf::from(format!("{}/", dir.path().display()));

        let validated = validate_path(&with_slash).expect("valid dir");
        assert_eq!(validated, dir.path());
        assert!(!validated.to_string_lossy().ends_with('/'));
    }

    #[test]
    fn test_directory_without_separator_is_unchanged() {
        let dir = TempDir::new().expect("create tempdir");
        let validated = validate_path(dir.path()).expect("valid dir");
        assert_eq!(validated, dir.path());
    }

    #[test]
    fn test_file_path_is_returned_as_is() {
        let dir = TempDir::new().expect("create tempdir");
        let file = dir.path().join("x.txt");
        fs::write(&file, b"x").expect("write file");

        assert_eq!(validate_path(&file).expect("valid file"), file);
    }

    #[test]
    #[cfg(unix)]
    fn test_root_keeps_its_separator() {
        assert_eq!(strip_trailing_separator(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    #[cfg(unix)]
    fn test_unreadable_file_is_permission_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("create tempdir");
        let file = dir.path().join("secret");
        fs::write(&file, b"hidden").expect("write secret");
        fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).expect("chmod 000");

        // Root ignores permission bits; nothing to assert there.
        if File::open(&file).is_ok() {
            return;
        }

        let err = validate_path(&file).expect_err("unreadable file");
        assert!(err.is_permission_error());
    }
}
