//! Well-known folders and drive roots.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of well-known folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialDirectoryKind {
    Home,
    Desktop,
    Documents,
    Downloads,
    Pictures,
    Music,
    Videos,
}

/// A resolved well-known folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDirectory {
    /// Which folder this is.
    pub kind: SpecialDirectoryKind,
    /// Where it lives for the current user.
    pub path: PathBuf,
}

/// Snapshot of places shown next to a file list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Places {
    /// Well-known folders that exist on this machine.
    pub special_directories: Vec<SpecialDirectory>,
    /// Drive or filesystem roots.
    pub drives: Vec<PathBuf>,
}

impl Places {
    /// Resolve the current places.
    pub fn discover() -> Self {
        Self {
            special_directories: special_directories(),
            drives: drives(),
        }
    }
}

/// Well-known folders for the current user that exist on disk.
pub fn special_directories() -> Vec<SpecialDirectory> {
    [
        (SpecialDirectoryKind::Home, dirs::home_dir()),
        (SpecialDirectoryKind::Desktop, dirs::desktop_dir()),
        (SpecialDirectoryKind::Documents, dirs::document_dir()),
        (SpecialDirectoryKind::Downloads, dirs::download_dir()),
        (SpecialDirectoryKind::Pictures, dirs::picture_dir()),
        (SpecialDirectoryKind::Music, dirs::audio_dir()),
        (SpecialDirectoryKind::Videos, dirs::video_dir()),
    ]
    .into_iter()
    .filter_map(|(kind, path)| {
        let path = path?;
        path.is_dir().then_some(SpecialDirectory { kind, path })
    })
    .collect()
}

/// Mounted drive roots (`C:\`, `D:\`, ...).
#[cfg(windows)]
pub fn drives() -> Vec<PathBuf> {
    use windows::Win32::Storage::FileSystem::GetLogicalDrives;

    // SAFETY: GetLogicalDrives takes no arguments and returns a bitmask.
    let mask = unsafe { GetLogicalDrives() };
    (0..26u8)
        .filter(|bit| mask & (1u32 << *bit) != 0)
        .map(|bit| PathBuf::from(format!("{}:\\", (b'A' + bit) as char)))
        .collect()
}

/// The single filesystem root.
#[cfg(not(windows))]
pub fn drives() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}
