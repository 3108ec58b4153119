//! `FindFirstFileW`/`FindNextFileW` backend.

use std::ffi::{OsStr, OsString, c_void};
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::{self, Component, Path, PathBuf};

use windows::Win32::Foundation::{FILETIME, HANDLE};
use windows::Win32::Storage::FileSystem::{
    FindClose, FindFirstFileW, FindNextFileW, GetFileAttributesExW, GetFileExInfoStandard,
    WIN32_FILE_ATTRIBUTE_DATA, WIN32_FIND_DATAW,
};
use windows::core::PCWSTR;

use fswalk_core::{DepthMode, FileAttributes, FileMetadata, Timestamps, WalkError, WalkStats};

use crate::attributes::map_windows_attributes;
use crate::frontier::WalkFrontier;
use crate::pattern::SearchPattern;
use crate::timestamps::{filetime_ticks, filetime_to_local};
use crate::walker::{DirectoryWalker, WalkEntries, normalize_root};

const BACKSLASH: u16 = b'\\' as u16;
const SLASH: u16 = b'/' as u16;
const STAR: u16 = b'*' as u16;
const DOT: u16 = b'.' as u16;
const QUESTION: u16 = b'?' as u16;
const COLON: u16 = b':' as u16;

/// `\\?\` turns off MAX_PATH limits and path normalization.
const VERBATIM_PREFIX: &[u16] = &[BACKSLASH, BACKSLASH, QUESTION, BACKSLASH];
/// `\\?\UNC\` replaces the leading `\\` of a UNC path.
const VERBATIM_UNC_PREFIX: &[u16] = &[
    BACKSLASH,
    BACKSLASH,
    QUESTION,
    BACKSLASH,
    b'U' as u16,
    b'N' as u16,
    b'C' as u16,
    BACKSLASH,
];

/// Walker for Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsWalker;

impl DirectoryWalker for WindowsWalker {
    type Entries = WindowsEntries;

    fn walk(&self, root: &Path, pattern: SearchPattern, depth: DepthMode) -> WindowsEntries {
        let frontier = match root_search(root) {
            Some(search) => WalkFrontier::with_root(search),
            None => WalkFrontier::new(),
        };

        WindowsEntries {
            frontier,
            current: None,
            pattern,
            depth,
            stats: WalkStats::new(),
        }
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata, WalkError> {
        if path.as_os_str().is_empty() || path.as_os_str().encode_wide().any(|c| c == 0) {
            return Err(WalkError::invalid_path(path));
        }
        let absolute = path::absolute(path).map_err(|e| WalkError::io(path, e))?;
        let native: Vec<u16> = absolute.as_os_str().encode_wide().collect();
        let wide = to_wide_nul(&verbatim(&native)).ok_or_else(|| WalkError::invalid_path(path))?;
        let mut data = WIN32_FILE_ATTRIBUTE_DATA::default();

        // SAFETY: `wide` is NUL-terminated and `data` matches the
        // GetFileExInfoStandard layout.
        unsafe {
            GetFileAttributesExW(
                PCWSTR(wide.as_ptr()),
                GetFileExInfoStandard,
                &mut data as *mut _ as *mut c_void,
            )
        }
        .map_err(|e| WalkError::io(path, e.into()))?;

        Ok(build_metadata(
            path.to_path_buf(),
            NativeRecord {
                attributes: data.dwFileAttributes,
                created: data.ftCreationTime,
                accessed: data.ftLastAccessTime,
                written: data.ftLastWriteTime,
                size_high: data.nFileSizeHigh,
                size_low: data.nFileSizeLow,
            },
        ))
    }
}

/// Iterator over one Windows traversal.
///
/// Holds at most one find handle, closed once exhausted or on drop.
pub struct WindowsEntries {
    frontier: WalkFrontier<SearchPath>,
    current: Option<FindHandle>,
    pattern: SearchPattern,
    depth: DepthMode,
    stats: WalkStats,
}

impl Iterator for WindowsEntries {
    type Item = FileMetadata;

    fn next(&mut self) -> Option<FileMetadata> {
        loop {
            let handle = match self.current {
                Some(ref mut handle) => handle,
                None => {
                    let search = self.frontier.pop()?;
                    match FindHandle::open(search) {
                        Ok(handle) => {
                            self.stats.record_opened();
                            self.current.insert(handle)
                        }
                        Err(search) => {
                            tracing::debug!(
                                target: "fswalk::windows",
                                path = %String::from_utf16_lossy(&search.dir),
                                "skipping unreadable directory"
                            );
                            self.stats.record_skipped();
                            continue;
                        }
                    }
                }
            };

            let Some(data) = handle.read() else {
                // Closes the find handle and frees its search buffer.
                self.current = None;
                continue;
            };
            let name = file_name(&data.cFileName);
            if name == [DOT] || name == [DOT, DOT] {
                continue;
            }
            let child = handle.search.child_path(name);
            let subdir = (self.depth.is_recursive()
                && map_windows_attributes(data.dwFileAttributes).is_traversable_dir())
            .then(|| handle.search.child(name));
            let name = OsString::from_wide(name);

            if let Some(metadata) = self.visit(child, subdir, &name, &data) {
                self.stats.record_yielded();
                return Some(metadata);
            }
        }
    }
}

impl std::iter::FusedIterator for WindowsEntries {}

impl WalkEntries for WindowsEntries {
    fn stats(&self) -> WalkStats {
        self.stats
    }
}

impl WindowsEntries {
    fn visit(
        &mut self,
        child: Vec<u16>,
        subdir: Option<SearchPath>,
        name: &OsStr,
        data: &WIN32_FIND_DATAW,
    ) -> Option<FileMetadata> {
        let record = NativeRecord {
            attributes: data.dwFileAttributes,
            created: data.ftCreationTime,
            accessed: data.ftLastAccessTime,
            written: data.ftLastWriteTime,
            size_high: data.nFileSizeHigh,
            size_low: data.nFileSizeLow,
        };
        let attributes = map_windows_attributes(record.attributes);
        let is_dir = attributes.contains(FileAttributes::DIRECTORY);

        // Subdirectories are scheduled whether or not their name matches.
        if let Some(search) = subdir {
            self.frontier.push(search);
        }
        if !is_dir && !self.pattern.is_match(name) {
            self.stats.record_filtered();
            return None;
        }

        Some(build_metadata(PathBuf::from(OsString::from_wide(&child)), record))
    }
}

/// A directory awaiting traversal.
///
/// `dir` is the path as yielded to callers. `native` is the same directory
/// made absolute and verbatim so that deep trees are not cut off at
/// MAX_PATH.
struct SearchPath {
    dir: Vec<u16>,
    native: Vec<u16>,
}

impl SearchPath {
    fn new(dir: Vec<u16>, native: Vec<u16>) -> Option<Self> {
        if dir.contains(&0) || native.contains(&0) {
            return None;
        }
        Some(Self { dir, native })
    }

    /// NUL-terminated `<native>\*` buffer for FindFirstFileW.
    fn pattern(&self) -> Vec<u16> {
        let mut wide = Vec::with_capacity(self.native.len() + 3);
        wide.extend_from_slice(&self.native);
        if !ends_with_separator(&self.native) {
            wide.push(BACKSLASH);
        }
        wide.push(STAR);
        wide.push(0);
        wide
    }

    fn child_path(&self, name: &[u16]) -> Vec<u16> {
        join(&self.dir, name)
    }

    fn child(&self, name: &[u16]) -> SearchPath {
        SearchPath {
            dir: join(&self.dir, name),
            native: join(&self.native, name),
        }
    }
}

/// Build the first frontier entry, or `None` when there is nothing to walk.
fn root_search(root: &Path) -> Option<SearchPath> {
    // An empty root would otherwise search the current drive's root.
    if root.as_os_str().is_empty() {
        return None;
    }
    let absolute = match path::absolute(root) {
        Ok(absolute) => absolute,
        Err(err) => {
            tracing::debug!(target: "fswalk::windows", path = %root.display(), error = %err, "cannot resolve root");
            return None;
        }
    };
    // `C:` means the current directory on drive C, not its root.
    let dir = if is_drive_relative(root) {
        absolute.clone()
    } else {
        normalize_root(root)
    };

    let dir: Vec<u16> = dir.as_os_str().encode_wide().collect();
    let native: Vec<u16> = absolute.as_os_str().encode_wide().collect();
    let search = SearchPath::new(dir, verbatim(&native));
    if search.is_none() {
        tracing::debug!(target: "fswalk::windows", "root path contains NUL, nothing to walk");
    }
    search
}

fn is_drive_relative(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::Prefix(_))) && !path.has_root()
}

/// Add the `\\?\` (or `\\?\UNC\`) prefix to an absolute path.
///
/// Paths that already carry a `\\?\` or `\\.\` prefix are returned as is.
fn verbatim(absolute: &[u16]) -> Vec<u16> {
    match absolute {
        [BACKSLASH, BACKSLASH, QUESTION | DOT, BACKSLASH, ..] => absolute.to_vec(),
        [BACKSLASH, BACKSLASH, rest @ ..] => [VERBATIM_UNC_PREFIX, rest].concat(),
        [_, COLON, BACKSLASH, ..] => [VERBATIM_PREFIX, absolute].concat(),
        _ => absolute.to_vec(),
    }
}

fn join(dir: &[u16], name: &[u16]) -> Vec<u16> {
    let mut child = Vec::with_capacity(dir.len() + 1 + name.len());
    child.extend_from_slice(dir);
    if !ends_with_separator(dir) {
        child.push(BACKSLASH);
    }
    child.extend_from_slice(name);
    child
}

/// An open find handle together with the search buffer it came from.
struct FindHandle {
    handle: HANDLE,
    search: SearchPath,
    data: WIN32_FIND_DATAW,
    /// FindFirstFileW already filled `data` with the first match.
    pending: bool,
}

// SAFETY: the find handle is owned exclusively by this value and is only
// used through `&mut self`.
unsafe impl Send for FindHandle {}

impl FindHandle {
    fn open(search: SearchPath) -> Result<Self, SearchPath> {
        let mut data = WIN32_FIND_DATAW::default();
        let pattern = search.pattern();
        // SAFETY: `pattern` is NUL-terminated and `data` is a valid
        // out-pointer.
        match unsafe { FindFirstFileW(PCWSTR(pattern.as_ptr()), &mut data) } {
            Ok(handle) => Ok(Self {
                handle,
                search,
                data,
                pending: true,
            }),
            Err(_) => Err(search),
        }
    }

    fn read(&mut self) -> Option<WIN32_FIND_DATAW> {
        if self.pending {
            self.pending = false;
            return Some(self.data);
        }
        // SAFETY: `self.handle` is a live find handle owned by `self`.
        unsafe { FindNextFileW(self.handle, &mut self.data) }.ok()?;
        Some(self.data)
    }
}

impl Drop for FindHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from FindFirstFileW and is closed once.
        unsafe {
            let _ = FindClose(self.handle);
        }
    }
}

/// Fields shared by `WIN32_FIND_DATAW` and `WIN32_FILE_ATTRIBUTE_DATA`.
struct NativeRecord {
    attributes: u32,
    created: FILETIME,
    accessed: FILETIME,
    written: FILETIME,
    size_high: u32,
    size_low: u32,
}

fn build_metadata(path: PathBuf, record: NativeRecord) -> FileMetadata {
    let timestamps = Timestamps::new(
        filetime(record.created),
        filetime(record.accessed),
        filetime(record.written),
    );
    let size = (u64::from(record.size_high) << 32) | u64::from(record.size_low);
    FileMetadata::new(path, timestamps, size, map_windows_attributes(record.attributes))
}

fn filetime(time: FILETIME) -> chrono::DateTime<chrono::Local> {
    filetime_to_local(filetime_ticks(time.dwHighDateTime, time.dwLowDateTime))
}

fn file_name(raw: &[u16]) -> &[u16] {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    &raw[..len]
}

fn ends_with_separator(path: &[u16]) -> bool {
    matches!(path.last(), Some(&BACKSLASH) | Some(&SLASH))
}

fn to_wide_nul(path: &[u16]) -> Option<Vec<u16>> {
    let mut wide = path.to_vec();
    if wide.contains(&0) {
        return None;
    }
    wide.push(0);
    Some(wide)
}
