//! Native attribute bits to [`FileAttributes`].
//!
//! Both mappers are pure and compiled on every platform, so the raw
//! constants are spelled out here instead of pulled from `libc`/`windows`.

use fswalk_core::FileAttributes;

// Win32 FILE_ATTRIBUTE_* values.
const WIN_READONLY: u32 = 0x0001;
const WIN_HIDDEN: u32 = 0x0002;
const WIN_SYSTEM: u32 = 0x0004;
const WIN_DIRECTORY: u32 = 0x0010;
const WIN_DEVICE: u32 = 0x0040;
const WIN_NORMAL: u32 = 0x0080;
const WIN_REPARSE_POINT: u32 = 0x0400;

// POSIX st_mode file type and permission bits.
const S_IFMT: u32 = 0o170_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFREG: u32 = 0o100_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFCHR: u32 = 0o020_000;
const S_IFBLK: u32 = 0o060_000;
const S_IWUSR: u32 = 0o000_200;

/// Map a `dwFileAttributes` value.
///
/// Files without another classification are marked `NORMAL` even though
/// Windows itself only sets that bit when no other attribute is present.
pub fn map_windows_attributes(bits: u32) -> FileAttributes {
    let mut attributes = FileAttributes::empty();

    for (native, portable) in [
        (WIN_READONLY, FileAttributes::READ_ONLY),
        (WIN_HIDDEN, FileAttributes::HIDDEN),
        (WIN_SYSTEM, FileAttributes::SYSTEM),
        (WIN_DIRECTORY, FileAttributes::DIRECTORY),
        (WIN_DEVICE, FileAttributes::DEVICE),
        (WIN_NORMAL, FileAttributes::NORMAL),
        (WIN_REPARSE_POINT, FileAttributes::REPARSE_POINT),
    ] {
        if bits & native != 0 {
            attributes |= portable;
        }
    }

    if attributes.primary().is_empty() {
        attributes |= FileAttributes::NORMAL;
    }
    attributes
}

/// Map an `st_mode` value and the entry's file name.
///
/// POSIX has no hidden flag; a leading `.` in `name` stands in for it.
pub fn map_posix_mode(mode: u32, name: &[u8]) -> FileAttributes {
    let mut attributes = match mode & S_IFMT {
        S_IFDIR => FileAttributes::DIRECTORY,
        S_IFREG => FileAttributes::NORMAL,
        S_IFLNK => FileAttributes::REPARSE_POINT,
        S_IFCHR | S_IFBLK => FileAttributes::DEVICE,
        _ => FileAttributes::empty(),
    };

    if mode & S_IWUSR == 0 {
        attributes |= FileAttributes::READ_ONLY;
    }
    if is_dot_hidden(name) {
        attributes |= FileAttributes::HIDDEN;
    }
    attributes
}

fn is_dot_hidden(name: &[u8]) -> bool {
    name.first() == Some(&b'.') && name != b"." && name != b".."
}
