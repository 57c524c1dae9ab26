//! Copy implementation: atomic single files and whole trees

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Copy one planned entry, whatever its type.
///
/// Directories are copied recursively, symlinks are recreated without
/// following them, regular files go through `copy_file_atomic`.
pub fn copy_entry(src: &Path, dest: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(src)?;
    let file_type = metadata.file_type();

    if file_type.is_dir() {
        copy_tree(src, dest)
    } else if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else {
        copy_file_atomic(src, dest).map(|_| ())
    }
}

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Write to a fresh temporary sibling (`.dirsync-XXXXXX.part`, created
///    exclusively, so it never reuses an existing name)
/// 2. Flush and sync to disk
/// 3. Preserve metadata (permissions, mtime)
/// 4. Rename over the final destination
///
/// An existing destination file is replaced in the final rename. The
/// temporary file is removed on every error path.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
///
/// # Example
/// ```no_run
/// use dirsync::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> io::Result<u64> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut src_file = File::open(src)?;
    let src_metadata = src_file.metadata()?;

    let mut part = tempfile::Builder::new()
        .prefix(PART_PREFIX)
        .suffix(PART_SUFFIX)
        .tempfile_in(parent)?;
    let total_bytes = write_part(&mut src_file, part.as_file_mut())?;

    fs::set_permissions(part.path(), src_metadata.permissions())?;
    let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_mtime(part.path(), mtime)?;

    part.persist(dest).map_err(|e| e.error)?;
    Ok(total_bytes)
}

const PART_PREFIX: &str = ".dirsync-";
const PART_SUFFIX: &str = ".part";

fn write_part(src_file: &mut File, part_file: &mut File) -> io::Result<u64> {
    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        part_file.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;
    Ok(total_bytes)
}

/// Copy a directory tree.
///
/// Walks with an explicit stack. Directory permissions are applied last,
/// deepest first, so read-only source directories can still be filled.
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];
    let mut created: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    while let Some((src_dir, dest_dir)) = pending.pop() {
        // List before creating, so a destination inside the source is not
        // part of its own listing.
        let entries = fs::read_dir(&src_dir)?.collect::<io::Result<Vec<_>>>()?;
        fs::create_dir_all(&dest_dir)?;
        created.push((dest_dir.clone(), fs::metadata(&src_dir)?.permissions()));

        for entry in entries {
            let child_src = entry.path();
            if child_src == dest {
                continue;
            }
            let child_dest = dest_dir.join(entry.file_name());
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                pending.push((child_src, child_dest));
            } else if file_type.is_symlink() {
                copy_symlink(&child_src, &child_dest)?;
            } else {
                copy_file_atomic(&child_src, &child_dest)?;
            }
        }
    }

    for (dir, permissions) in created.into_iter().rev() {
        fs::set_permissions(&dir, permissions)?;
    }

    Ok(())
}

/// Recreate a symlink at `dest` pointing where `src` points.
///
/// If a destination path already exists it is removed first.
pub fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if fs::symlink_metadata(dest).is_ok() {
        super::relocate::remove_path_any(dest)?;
    }

    let target = fs::read_link(src)?;
    create_symlink(&target, dest)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link_path: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link_path)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link_path: &Path) -> io::Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};

    match symlink_file(target, link_path) {
        Ok(()) => Ok(()),
        Err(file_err) => symlink_dir(target, link_path).map_err(|_| file_err),
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, link_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot create symlink {}", link_path.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("list dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_copy_file_replaces_existing_destination() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"fresh").expect("write src");
        fs::write(&dest, b"stale-and-longer").expect("write dest");

        let bytes = copy_file_atomic(&src, &dest).expect("copy");

        assert_eq!(bytes, 5);
        assert_eq!(fs::read(&dest).expect("read dest"), b"fresh");
        assert_eq!(listing(dir.path()), vec!["dest.txt", "src.txt"]);
    }

    #[test]
    fn test_failed_copy_leaves_no_part_file() {
        let dir = TempDir::new().expect("create tempdir");
        let dest = dir.path().join("dest.txt");

        let result = copy_file_atomic(&dir.path().join("missing.txt"), &dest);

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(listing(dir.path()).is_empty(), "no temporary file left behind");
    }

    #[test]
    fn test_copy_leaves_similarly_named_siblings_alone() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir(&src).expect("create src");
        fs::write(src.join("a.txt"), b"real file").expect("write a");
        fs::write(src.join(".a.txt.part"), b"also a real file").expect("write part-like");

        copy_file_atomic(&src.join(".a.txt.part"), &dest.join(".a.txt.part"))
            .expect("copy part-like");
        copy_file_atomic(&src.join("a.txt"), &dest.join("a.txt")).expect("copy a");

        assert_eq!(listing(&dest), vec![".a.txt.part", "a.txt"]);
        assert_eq!(
            fs::read(dest.join(".a.txt.part")).expect("read part-like"),
            b"also a real file"
        );
        assert_eq!(fs::read(dest.join("a.txt")).expect("read a"), b"real file");
    }

    #[test]
    fn test_copy_tree_into_own_subdirectory_terminates() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("inner")).expect("create src tree");
        fs::write(src.join("inner/file.txt"), b"once").expect("write file");

        let dest = src.join("inner/copy");
        copy_tree(&src, &dest).expect("copy tree");

        assert_eq!(fs::read(dest.join("inner/file.txt")).expect("read copy"), b"once");
        assert!(!dest.join("inner/copy").exists(), "copy is not copied into itself");
    }

    #[test]
    fn test_copy_tree_copies_nested_content() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("a/b")).expect("create src tree");
        fs::create_dir(src.join("empty")).expect("create empty dir");
        fs::write(src.join("top.txt"), b"top").expect("write top");
        fs::write(src.join("a/b/deep.txt"), b"deep").expect("write deep");

        let dest = dir.path().join("dest");
        copy_tree(&src, &dest).expect("copy tree");

        assert_eq!(fs::read(dest.join("top.txt")).expect("read top"), b"top");
        assert_eq!(fs::read(dest.join("a/b/deep.txt")).expect("read deep"), b"deep");
        assert!(dest.join("empty").is_dir());
        assert!(src.join("a/b/deep.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_copy_tree_keeps_symlinks() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src");
        fs::create_dir(&src).expect("create src");
        fs::write(src.join("target.txt"), b"payload").expect("write target");
        std::os::unix::fs::symlink("target.txt", src.join("link.txt")).expect("symlink");

        let dest = dir.path().join("dest");
        copy_tree(&src, &dest).expect("copy tree");

        let link = dest.join("link.txt");
        let metadata = fs::symlink_metadata(&link).expect("link metadata");
        assert!(metadata.file_type().is_symlink());
        assert_eq!(fs::read_link(&link).expect("read link"), PathBuf::from("target.txt"));
    }

    #[test]
    #[cfg(unix)]
    fn test_copy_tree_preserves_read_only_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("locked")).expect("create src");
        fs::write(src.join("locked/file.txt"), b"inside").expect("write file");
        fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o555))
            .expect("chmod locked");

        let dest = dir.path().join("dest");
        copy_tree(&src, &dest).expect("copy tree");

        assert_eq!(
            fs::read(dest.join("locked/file.txt")).expect("read copied"),
            b"inside"
        );
        let mode = fs::metadata(dest.join("locked"))
            .expect("dest metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o555);

        fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o755))
            .expect("restore src perms");
        fs::set_permissions(dest.join("locked"), fs::Permissions::from_mode(0o755))
            .expect("restore dest perms");
    }
}
