//! `opendir`/`readdir`/`lstat` backend.

use std::ffi::{CStr, CString, OsStr, OsString};
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use fswalk_core::{DepthMode, FileAttributes, FileMetadata, Timestamps, WalkError, WalkStats};

use crate::attributes::map_posix_mode;
use crate::frontier::WalkFrontier;
use crate::pattern::SearchPattern;
use crate::timestamps::unix_to_local;
use crate::walker::{DirectoryWalker, WalkEntries, normalize_root};

/// Walker for Linux, macOS and the BSDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixWalker;

impl DirectoryWalker for PosixWalker {
    type Entries = PosixEntries;

    fn walk(&self, root: &Path, pattern: SearchPattern, depth: DepthMode) -> PosixEntries {
        let root = normalize_root(root);
        let frontier = match CString::new(root.into_os_string().into_vec()) {
            Ok(root) if root.is_empty() => WalkFrontier::new(),
            Ok(root) => WalkFrontier::with_root(root),
            Err(err) => {
                tracing::debug!(target: "fswalk::posix", error = %err, "root path contains NUL, nothing to walk");
                WalkFrontier::new()
            }
        };

        PosixEntries {
            frontier,
            current: None,
            pattern,
            depth,
            stats: WalkStats::new(),
        }
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata, WalkError> {
        let native = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| WalkError::invalid_path(path))?;
        let st = lstat(&native).map_err(|e| WalkError::io(path, e))?;
        let name = path.file_name().unwrap_or(path.as_os_str()).as_bytes();
        let attributes = map_posix_mode(st.st_mode as u32, name);
        Ok(metadata_from_stat(path.to_path_buf(), &st, attributes))
    }
}

/// Iterator over one POSIX traversal.
///
/// Holds at most one open directory stream, which is closed as soon as it
/// is exhausted or when the iterator is dropped.
pub struct PosixEntries {
    frontier: WalkFrontier<CString>,
    current: Option<DirStream>,
    pattern: SearchPattern,
    depth: DepthMode,
    stats: WalkStats,
}

impl Iterator for PosixEntries {
    type Item = FileMetadata;

    fn next(&mut self) -> Option<FileMetadata> {
        loop {
            let stream = match self.current {
                Some(ref mut stream) => stream,
                None => {
                    let dir = self.frontier.pop()?;
                    match DirStream::open(dir) {
                        Ok(stream) => {
                            self.stats.record_opened();
                            self.current.insert(stream)
                        }
                        Err((dir, err)) => {
                            tracing::debug!(
                                target: "fswalk::posix",
                                path = %dir.to_string_lossy(),
                                error = %err,
                                "skipping unreadable directory"
                            );
                            self.stats.record_skipped();
                            continue;
                        }
                    }
                }
            };

            let Some(raw) = stream.read() else {
                // Closes the stream and frees its path buffer.
                self.current = None;
                continue;
            };
            let child = stream.child_path(&raw.name);

            if let Some(metadata) = self.visit(child, &raw) {
                self.stats.record_yielded();
                return Some(metadata);
            }
        }
    }
}

impl std::iter::FusedIterator for PosixEntries {}

impl WalkEntries for PosixEntries {
    fn stats(&self) -> WalkStats {
        self.stats
    }
}

impl PosixEntries {
    /// Classify one child, schedule it if it is a directory to descend
    /// into, and decide whether it is yielded.
    fn visit(&mut self, child: Vec<u8>, raw: &RawEntry) -> Option<FileMetadata> {
        let name = OsStr::from_bytes(&raw.name);

        // Files the pattern rejects are dropped before paying for a stat.
        if raw.hint == TypeHint::NotDirectory && !self.pattern.is_match(name) {
            self.stats.record_filtered();
            return None;
        }

        let Ok(child) = CString::new(child) else {
            self.stats.record_unreadable();
            return None;
        };
        let st = match lstat(&child) {
            Ok(st) => st,
            Err(err) => {
                tracing::trace!(
                    target: "fswalk::posix",
                    path = %child.to_string_lossy(),
                    error = %err,
                    "entry vanished or is unreadable"
                );
                self.stats.record_unreadable();
                return None;
            }
        };

        let attributes = map_posix_mode(st.st_mode as u32, &raw.name);
        let is_dir = attributes.contains(FileAttributes::DIRECTORY);

        if is_dir && self.depth.is_recursive() && attributes.is_traversable_dir() {
            self.frontier.push(child.clone());
        }
        if !is_dir && raw.hint != TypeHint::NotDirectory && !self.pattern.is_match(name) {
            self.stats.record_filtered();
            return None;
        }

        let path = PathBuf::from(OsString::from_vec(child.into_bytes()));
        Some(metadata_from_stat(path, &st, attributes))
    }
}

/// An open `DIR*` plus the path buffer it was opened from.
struct DirStream {
    dir: NonNull<libc::DIR>,
    path: CString,
}

// SAFETY: the DIR stream is owned exclusively by this value and is only
// touched through `&mut self`, so moving it to another thread is sound.
unsafe impl Send for DirStream {}

impl DirStream {
    fn open(path: CString) -> Result<Self, (CString, io::Error)> {
        // SAFETY: `path` is NUL-terminated and outlives the call.
        let dir = unsafe { libc::opendir(path.as_ptr()) };
        match NonNull::new(dir) {
            Some(dir) => Ok(Self { dir, path }),
            None => Err((path, io::Error::last_os_error())),
        }
    }

    /// Next entry other than `.` and `..`; `None` at the end of the stream
    /// or on a read error.
    fn read(&mut self) -> Option<RawEntry> {
        loop {
            // SAFETY: `self.dir` is a live stream owned by `self`.
            let entry = unsafe { libc::readdir(self.dir.as_ptr()) };
            if entry.is_null() {
                return None;
            }
            // SAFETY: readdir returned a non-null dirent that stays valid
            // until the next readdir/closedir on this stream; we copy the
            // name out before either happens.
            let entry = unsafe { &*entry };
            let name = unsafe { CStr::from_ptr(entry.d_name.as_ptr()) }.to_bytes();
            if name == b"." || name == b".." {
                continue;
            }
            return Some(RawEntry {
                name: name.to_vec(),
                hint: type_hint(entry),
            });
        }
    }

    fn child_path(&self, name: &[u8]) -> Vec<u8> {
        let parent = self.path.as_bytes();
        let mut child = Vec::with_capacity(parent.len() + 1 + name.len());
        child.extend_from_slice(parent);
        if !parent.ends_with(b"/") {
            child.push(b'/');
        }
        child.extend_from_slice(name);
        child
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        // SAFETY: the stream was opened by opendir and is closed exactly once.
        unsafe {
            libc::closedir(self.dir.as_ptr());
        }
    }
}

struct RawEntry {
    name: Vec<u8>,
    hint: TypeHint,
}

/// What `d_type` says about an entry before any stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeHint {
    Directory,
    NotDirectory,
    Unknown,
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn type_hint(entry: &libc::dirent) -> TypeHint {
    match entry.d_type {
        libc::DT_UNKNOWN => TypeHint::Unknown,
        libc::DT_DIR => TypeHint::Directory,
        _ => TypeHint::NotDirectory,
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn type_hint(_entry: &libc::dirent) -> TypeHint {
    TypeHint::Unknown
}

fn lstat(path: &CStr) -> io::Result<libc::stat> {
    let mut st = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: `path` is NUL-terminated and `st` is a valid out-pointer.
    if unsafe { libc::lstat(path.as_ptr(), st.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: lstat succeeded and filled the buffer.
    Ok(unsafe { st.assume_init() })
}

#[allow(clippy::unnecessary_cast)]
fn metadata_from_stat(path: PathBuf, st: &libc::stat, attributes: FileAttributes) -> FileMetadata {
    let timestamps = Timestamps::new(
        birth_time(st),
        unix_to_local(st.st_atime as i64, st.st_atime_nsec as i64),
        unix_to_local(st.st_mtime as i64, st.st_mtime_nsec as i64),
    );
    FileMetadata::new(path, timestamps, st.st_size.max(0) as u64, attributes)
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
#[allow(clippy::unnecessary_cast)]
fn birth_time(st: &libc::stat) -> chrono::DateTime<chrono::Local> {
    unix_to_local(st.st_birthtime as i64, st.st_birthtime_nsec as i64)
}

/// No birth time in `stat` here; the inode change time stands in.
#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
#[allow(clippy::unnecessary_cast)]
fn birth_time(st: &libc::stat) -> chrono::DateTime<chrono::Local> {
    unix_to_local(st.st_ctime as i64, st.st_ctime_nsec as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: impl Iterator<Item = FileMetadata>) -> Vec<String> {
        let mut names: Vec<String> = entries.map(|m| m.name().into_owned()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_child_path_joins_once() {
        let stream_path = CString::new("/").unwrap();
        let stream = DirStream::open(stream_path).unwrap();
        assert_eq!(stream.child_path(b"etc"), b"/etc".to_vec());
    }

    #[test]
    fn test_hidden_by_leading_dot() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".secret"), "x").unwrap();
        fs::write(temp.path().join("public"), "x").unwrap();

        let entries: Vec<_> = PosixWalker
            .walk(temp.path(), SearchPattern::any(), DepthMode::TopOnly)
            .collect();
        let hidden: Vec<_> = entries.iter().filter(|m| m.is_hidden()).collect();
        assert_eq!(hidden.len(), 1);
        assert_eq!(hidden[0].name(), ".secret");
    }

    #[test]
    fn test_symlink_is_reparse_point_and_not_descended() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("real");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner.txt"), "x").unwrap();
        std::os::unix::fs::symlink(&target, temp.path().join("link")).unwrap();

        let entries: Vec<_> = PosixWalker
            .walk(temp.path(), SearchPattern::any(), DepthMode::AllDirectories)
            .collect();

        let link = entries.iter().find(|m| m.name() == "link").unwrap();
        assert!(link.is_reparse_point());
        assert!(!link.is_dir());
        // inner.txt is reached once, through the real directory only
        assert_eq!(entries.iter().filter(|m| m.name() == "inner.txt").count(), 1);
    }

    #[test]
    fn test_read_only_from_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("locked.txt");
        fs::write(&file, "x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o444)).unwrap();

        let meta = PosixWalker.metadata(&file).unwrap();
        assert!(meta.is_read_only());
        assert_eq!(meta.attributes.primary(), FileAttributes::NORMAL);
    }

    #[test]
    fn test_pattern_filters_before_stat() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "x").unwrap();
        fs::write(temp.path().join("b.md"), "x").unwrap();

        let mut entries = PosixWalker.walk(temp.path(), SearchPattern::new("*.txt"), DepthMode::TopOnly);
        let found = names(entries.by_ref());
        assert_eq!(found, vec!["a.txt"]);
        assert_eq!(entries.stats().entries_filtered, 1);
        assert_eq!(entries.stats().entries_yielded, 1);
    }

    #[test]
    fn test_root_with_nul_is_empty() {
        let root = Path::new(OsStr::from_bytes(b"/tmp/bad\0name"));
        let entries: Vec<_> = PosixWalker
            .walk(root, SearchPattern::any(), DepthMode::TopOnly)
            .collect();
        assert!(entries.is_empty());
        assert!(matches!(
            PosixWalker.metadata(root),
            Err(WalkError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_trailing_slash_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("f"), "x").unwrap();
        let root = format!("{}/", temp.path().display());

        let entries: Vec<_> = PosixWalker
            .walk(Path::new(&root), SearchPattern::any(), DepthMode::TopOnly)
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, temp.path().join("f"));
    }
}
