//! Filesystem operations behind the shell commands.
//!
//! Every operation returns an [`Outcome`]. Relative paths are interpreted
//! against the process working directory at the time of the call.

use crate::error::FsError;
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Result of a filesystem operation.
pub type Outcome<T = ()> = Result<T, FsError>;

/// A single name produced by [`FsEngine::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_hidden: bool,
    pub is_dir: bool,
    /// Size in bytes as reported by the entry metadata.
    pub len: u64,
}

impl DirectoryEntry {
    fn pseudo(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_hidden: true,
            is_dir: true,
            len: 0,
        }
    }
}

/// Decides whether two paths name the same on-disk object.
pub trait PathIdentity {
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool>;
}

/// Compares device and inode numbers on Unix, canonical paths elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceInode;

impl PathIdentity for DeviceInode {
    #[cfg(unix)]
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        use std::os::unix::fs::MetadataExt;
        let (ma, mb) = (fs::metadata(a)?, fs::metadata(b)?);
        Ok(ma.dev() == mb.dev() && ma.ino() == mb.ino())
    }

    #[cfg(not(unix))]
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
    }
}

/// The filesystem operation engine.
///
/// Stateless apart from the path identity comparator used by [`FsEngine::move_path`].
#[derive(Debug, Default, Clone)]
pub struct FsEngine<I = DeviceInode> {
    identity: I,
}

impl FsEngine<DeviceInode> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: PathIdentity> FsEngine<I> {
    /// Build an engine with a custom same-file comparator.
    pub fn with_identity(identity: I) -> Self {
        Self { identity }
    }

    /// List a directory sorted by byte order of the names.
    ///
    /// Dot-names are skipped unless `include_hidden` is set, in which case
    /// `.` and `..` are always part of the result.
    pub fn list(&self, path: &Path, include_hidden: bool) -> Outcome<Vec<DirectoryEntry>> {
        debug!("list {} (hidden: {})", path.display(), include_hidden);
        let reader = fs::read_dir(path).map_err(|e| {
            warn!("list {}: {}", path.display(), e);
            FsError::from_open(path, &e)
        })?;

        let mut entries = Vec::new();
        if include_hidden {
            entries.push(DirectoryEntry::pseudo("."));
            entries.push(DirectoryEntry::pseudo(".."));
        }

        for entry in reader {
            let entry = entry.map_err(|e| FsError::from_open(path, &e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_hidden = name.starts_with('.');
            if is_hidden && !include_hidden {
                continue;
            }
            // DirEntry::metadata does not follow symlinks
            let meta = entry.metadata().ok();
            entries.push(DirectoryEntry {
                name,
                is_hidden,
                is_dir: meta.as_ref().is_some_and(|m| m.is_dir()),
                len: meta.as_ref().map_or(0, |m| m.len()),
            });
        }

        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        Ok(entries)
    }

    /// True when the directory holds nothing but `.` and `..`.
    pub fn is_empty_dir(&self, path: &Path) -> Outcome<bool> {
        Ok(self.list(path, true)?.len() <= 2)
    }

    /// Read the raw bytes of a file.
    fn read_bytes(&self, path: &Path) -> Outcome<Vec<u8>> {
        let mut file = File::open(path).map_err(|e| {
            warn!("open {}: {}", path.display(), e);
            FsError::NotFound(path.to_path_buf())
        })?;

        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        let mut buf = Vec::new();
        usize::try_from(size)
            .ok()
            .and_then(|n| buf.try_reserve_exact(n).ok())
            .ok_or_else(|| FsError::AllocationFailure {
                path: path.to_path_buf(),
                size,
            })?;

        file.read_to_end(&mut buf)
            .map_err(|source| FsError::ReadFailure {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(buf)
    }

    /// Read a whole file for display, dropping one trailing line-feed.
    pub fn read_all(&self, path: &Path) -> Outcome<Vec<u8>> {
        debug!("read {}", path.display());
        let mut content = self.read_bytes(path)?;
        if content.last() == Some(&b'\n') {
            content.pop();
        }
        Ok(content)
    }

    /// Create an empty file, leaving an existing one untouched.
    pub fn create_empty(&self, path: &Path) -> Outcome {
        debug!("touch {}", path.display());
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        options.open(path).map(drop).map_err(|source| {
            warn!("touch {}: {}", path.display(), source);
            FsError::OpenFailure {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Copy the exact bytes of `source` into `target`.
    pub fn copy(&self, source: &Path, target: &Path) -> Outcome {
        debug!("copy {} -> {}", source.display(), target.display());
        let bytes = self.read_bytes(source)?;

        let write_failure = |source: io::Error| {
            warn!("copy into {}: {}", target.display(), source);
            FsError::WriteFailure {
                path: target.to_path_buf(),
                source,
            }
        };
        let mut file = File::create(target).map_err(write_failure)?;
        file.write_all(&bytes).map_err(write_failure)?;
        file.flush().map_err(write_failure)
    }

    /// Create every `/`-separated prefix of `path` in order.
    ///
    /// Prefixes that already exist are skipped; the first other failure is
    /// reported. An existing final directory is an error.
    pub fn create_dir_tree(&self, path: &Path) -> Outcome {
        debug!("mkdir {}", path.display());
        let text = path.to_string_lossy();
        let segments: Vec<&str> = text.split('/').filter(|s| !s.is_empty()).collect();

        let mut prefix = if text.starts_with('/') {
            PathBuf::from("/")
        } else {
            PathBuf::new()
        };

        for (idx, segment) in segments.iter().enumerate() {
            prefix.push(segment);
            let is_last = idx + 1 == segments.len();
            match fs::create_dir(&prefix) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && !is_last => {}
                Err(source) => {
                    warn!("mkdir {}: {}", prefix.display(), source);
                    return Err(FsError::CreateDirFailure {
                        path: prefix,
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Remove a single non-directory entry.
    pub fn remove_file(&self, path: &Path) -> Outcome {
        debug!("rm {}", path.display());
        fs::remove_file(path).map_err(|source| {
            warn!("rm {}: {}", path.display(), source);
            FsError::RemoveFailure {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Remove a directory and everything below it.
    ///
    /// Stops at the first failing child; whatever was already removed stays removed.
    pub fn remove_dir_recursive(&self, path: &Path) -> Outcome {
        debug!("rmdir {}", path.display());
        let entries = self.list(path, true)?;

        for entry in entries.iter().filter(|e| e.name != "." && e.name != "..") {
            let child = path.join(&entry.name);
            let is_dir = fs::symlink_metadata(&child)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir {
                self.remove_dir_recursive(&child)?;
            } else {
                self.remove_file(&child)?;
            }
        }

        fs::remove_dir(path).map_err(|source| {
            warn!("rmdir {}: {}", path.display(), source);
            FsError::RemoveFailure {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn reject_same_file(&self, source: &Path, target: &Path) -> Outcome {
        if self.identity.same_file(source, target).unwrap_or(false) {
            warn!("move {} -> {}: same file", source.display(), target.display());
            return Err(FsError::SameFile {
                source_path: source.to_path_buf(),
                target: target.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Rename `source` to `target`, or into `target` when it is a directory.
    pub fn move_path(&self, source: &Path, target: &Path) -> Outcome {
        debug!("move {} -> {}", source.display(), target.display());
        if fs::symlink_metadata(source).is_err() {
            return Err(FsError::FileFailure(source.to_path_buf()));
        }

        let destination = match fs::metadata(target) {
            Ok(meta) => {
                self.reject_same_file(source, target)?;
                if meta.is_dir() {
                    match source.file_name() {
                        Some(name) => target.join(name),
                        None => target.to_path_buf(),
                    }
                } else {
                    target.to_path_buf()
                }
            }
            Err(_) => target.to_path_buf(),
        };
        // moving `dir/a` into `dir` lands on the source itself
        if destination != target && fs::symlink_metadata(&destination).is_ok() {
            self.reject_same_file(source, &destination)?;
        }

        fs::rename(source, &destination).map_err(|e| {
            warn!("move {} -> {}: {}", source.display(), destination.display(), e);
            FsError::RenameFailure {
                from: source.to_path_buf(),
                to: destination,
                source: e,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Treats every pair of paths as the same object.
    struct AlwaysSame;

    impl PathIdentity for AlwaysSame {
        fn same_file(&self, _a: &Path, _b: &Path) -> io::Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_list_sorted_and_hidden_filtered() {
        let tmp = TempDir::new().unwrap();
        for name in ["beta", "Alpha", ".secret", "alpha"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        fs::create_dir(tmp.path().join("dir")).unwrap();

        let engine = FsEngine::new();
        let visible = engine.list(tmp.path(), false).unwrap();
        assert_eq!(names(&visible), vec!["Alpha", "alpha", "beta", "dir"]);
        assert!(visible.iter().all(|e| !e.is_hidden));
        assert!(visible.iter().find(|e| e.name == "dir").unwrap().is_dir);

        let all = engine.list(tmp.path(), true).unwrap();
        assert_eq!(
            names(&all),
            vec![".", "..", ".secret", "Alpha", "alpha", "beta", "dir"]
        );
    }

    #[test]
    fn test_list_empty_dir_with_hidden_has_pseudo_entries() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();
        assert_eq!(names(&engine.list(tmp.path(), true).unwrap()), vec![".", ".."]);
        assert!(engine.list(tmp.path(), false).unwrap().is_empty());
        assert!(engine.is_empty_dir(tmp.path()).unwrap());
    }

    #[test]
    fn test_list_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let err = FsEngine::new()
            .list(&tmp.path().join("nope"), false)
            .unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
    }

    #[test]
    fn test_read_all_strips_one_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();

        let a = tmp.path().join("a.txt");
        fs::write(&a, "hello\nworld\n").unwrap();
        assert_eq!(engine.read_all(&a).unwrap(), b"hello\nworld");

        let b = tmp.path().join("b.txt");
        fs::write(&b, "no newline").unwrap();
        assert_eq!(engine.read_all(&b).unwrap(), b"no newline");

        let c = tmp.path().join("c.txt");
        fs::write(&c, "two\n\n").unwrap();
        assert_eq!(engine.read_all(&c).unwrap(), b"two\n");

        let empty = tmp.path().join("empty");
        fs::write(&empty, "").unwrap();
        assert!(engine.read_all(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_read_all_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = FsEngine::new()
            .read_all(&tmp.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
    }

    #[test]
    fn test_read_all_on_directory_is_read_failure() {
        let tmp = TempDir::new().unwrap();
        // opening a directory succeeds on Linux, reading it does not
        if cfg!(target_os = "linux") {
            let err = FsEngine::new().read_all(tmp.path()).unwrap_err();
            assert!(matches!(err, FsError::ReadFailure { .. }));
        }
    }

    #[test]
    fn test_create_empty_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();
        let path = tmp.path().join("note.txt");

        engine.create_empty(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"");

        fs::write(&path, "keep me").unwrap();
        engine.create_empty(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_create_empty_mode() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mode.txt");
        FsEngine::new().create_empty(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        // the umask may only remove bits
        assert_eq!(mode & !0o644, 0);
    }

    #[test]
    fn test_create_empty_in_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let err = FsEngine::new()
            .create_empty(&tmp.path().join("no/such/dir/file"))
            .unwrap_err();
        assert!(matches!(err, FsError::OpenFailure { .. }));
    }

    #[test]
    fn test_copy_round_trips_content() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        fs::write(&src, "line one\nline two\n\n").unwrap();
        fs::write(&dst, "previous content that is longer than the source").unwrap();

        let before = engine.read_all(&src).unwrap();
        engine.copy(&src, &dst).unwrap();

        assert_eq!(engine.read_all(&dst).unwrap(), before);
        assert_eq!(fs::read(&dst).unwrap(), fs::read(&src).unwrap());
    }

    #[test]
    fn test_copy_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = FsEngine::new()
            .copy(&tmp.path().join("nope"), &tmp.path().join("dst"))
            .unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
        assert!(!tmp.path().join("dst").exists());
    }

    #[test]
    fn test_copy_into_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::write(&src, "x").unwrap();
        let err = FsEngine::new()
            .copy(&src, &tmp.path().join("missing/dst"))
            .unwrap_err();
        assert!(matches!(err, FsError::WriteFailure { .. }));
    }

    #[test]
    fn test_create_dir_tree_nested() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();
        let deep = tmp.path().join("a/b/c");

        engine.create_dir_tree(&deep).unwrap();
        assert!(tmp.path().join("a").is_dir());
        assert!(tmp.path().join("a/b").is_dir());
        assert!(deep.is_dir());

        // intermediate directories may already exist
        engine.create_dir_tree(&tmp.path().join("a/b/d")).unwrap();
        assert!(tmp.path().join("a/b/d").is_dir());
    }

    #[test]
    fn test_create_dir_tree_existing_leaf_fails() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();
        let dir = tmp.path().join("x");
        engine.create_dir_tree(&dir).unwrap();
        assert!(matches!(
            engine.create_dir_tree(&dir),
            Err(FsError::CreateDirFailure { .. })
        ));
    }

    #[test]
    fn test_create_dir_tree_reports_first_failing_segment() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file"), "x").unwrap();

        let err = FsEngine::new()
            .create_dir_tree(&tmp.path().join("file/sub/leaf"))
            .unwrap_err();
        match err {
            FsError::CreateDirFailure { path, .. } => {
                assert_eq!(path, tmp.path().join("file/sub"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remove_file() {
        let tmp = TempDir::new().unwrap();
        let engine = FsEngine::new();
        let path = tmp.path().join("f");
        fs::write(&path, "x").unwrap();

        engine.remove_file(&path).unwrap();
        assert!(!path.exists());
        assert!(matches!(
            engine.remove_file(&path),
            Err(FsError::RemoveFailure { .. })
        ));
        assert!(matches!(
            engine.remove_file(tmp.path()),
            Err(FsError::RemoveFailure { .. })
        ));
    }

    #[test]
    fn test_remove_dir_recursive_removes_everything() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("tree");
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.txt"), "1").unwrap();
        fs::write(root.join(".hidden"), "2").unwrap();
        fs::write(root.join("sub/mid.txt"), "3").unwrap();
        fs::write(root.join("sub/deeper/leaf.txt"), "4").unwrap();

        FsEngine::new().remove_dir_recursive(&root).unwrap();
        assert!(!root.exists());
        assert!(tmp.path().exists());
    }

    /// True when permission bits do not restrict this process.
    #[cfg(unix)]
    fn running_as_root(dir: &Path) -> bool {
        use std::os::unix::fs::MetadataExt;
        let probe = dir.join(".owner");
        fs::write(&probe, "").unwrap();
        let uid = fs::metadata(&probe).unwrap().uid();
        fs::remove_file(&probe).unwrap();
        uid == 0
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_dir_recursive_stops_on_denied_child() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        if running_as_root(tmp.path()) {
            // root ignores permission bits; see the path-length case below
            return;
        }
        let root = tmp.path().join("tree");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("stuck.txt"), "x").unwrap();
        fs::write(root.join("aa_before.txt"), "w").unwrap();
        fs::write(root.join("zz_after.txt"), "y").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let result = FsEngine::new().remove_dir_recursive(&root);
        let _ = fs::set_permissions(&locked, fs::Permissions::from_mode(0o755));

        assert!(matches!(result, Err(FsError::RemoveFailure { .. })));
        assert!(!root.join("aa_before.txt").exists());
        assert!(locked.join("stuck.txt").exists());
        assert!(root.join("zz_after.txt").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_remove_dir_recursive_keeps_earlier_deletions() {
        use crate::test_support::{CwdGuard, lock_current_dir};

        let _lock = lock_current_dir();
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("tree");
        fs::create_dir_all(root.join("deep")).unwrap();
        fs::write(root.join("aa_before.txt"), "w").unwrap();
        fs::write(root.join("zz_after.txt"), "y").unwrap();

        // nest deep enough that the joined path exceeds PATH_MAX, which
        // fails for every user; relative steps keep each syscall short
        let segment = "d".repeat(200);
        {
            let _cwd = CwdGuard::enter(root.join("deep"));
            for _ in 0..24 {
                fs::create_dir(&segment).unwrap();
                std::env::set_current_dir(&segment).unwrap();
            }
        }

        let result = FsEngine::new().remove_dir_recursive(&root);

        assert!(result.is_err());
        assert!(!root.join("aa_before.txt").exists());
        assert!(root.join("deep").join(&segment).exists());
        assert!(root.join("zz_after.txt").exists());
    }

    #[test]
    fn test_move_renames_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        let dst = tmp.path().join("b.txt");
        fs::write(&src, "data").unwrap();

        FsEngine::new().move_path(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "data");
    }

    #[test]
    fn test_move_into_directory_keeps_name() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a b.txt");
        let dest = tmp.path().join("dest");
        fs::write(&src, "data").unwrap();
        fs::create_dir(&dest).unwrap();

        FsEngine::new().move_path(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dest.join("a b.txt")).unwrap(), "data");
    }

    #[test]
    fn test_move_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("new");
        let dst = tmp.path().join("old");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        FsEngine::new().move_path(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
        assert!(!src.exists());
    }

    #[test]
    fn test_move_same_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, "data").unwrap();

        let err = FsEngine::new().move_path(&src, &src).unwrap_err();
        assert!(matches!(err, FsError::SameFile { .. }));
        assert_eq!(fs::read_to_string(&src).unwrap(), "data");

        // same object reached through a different spelling
        let other_spelling = tmp.path().join(".").join("a.txt");
        let err = FsEngine::new().move_path(&src, &other_spelling).unwrap_err();
        assert!(matches!(err, FsError::SameFile { .. }));
    }

    #[test]
    fn test_move_into_own_parent_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("dest");
        let src = dest.join("a.txt");
        fs::create_dir(&dest).unwrap();
        fs::write(&src, "data").unwrap();

        let err = FsEngine::new().move_path(&src, &dest).unwrap_err();
        match err {
            FsError::SameFile { source_path, target } => {
                assert_eq!(source_path, src);
                assert_eq!(target, src);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(&src).unwrap(), "data");
    }

    #[test]
    fn test_move_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = FsEngine::new()
            .move_path(&tmp.path().join("ghost"), &tmp.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, FsError::FileFailure(_)));
    }

    #[test]
    fn test_move_uses_injected_identity() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a");
        let dst = tmp.path().join("b");
        fs::write(&src, "a").unwrap();
        fs::write(&dst, "b").unwrap();

        let engine = FsEngine::with_identity(AlwaysSame);
        assert!(matches!(
            engine.move_path(&src, &dst),
            Err(FsError::SameFile { .. })
        ));
        assert!(src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "b");
    }
}
