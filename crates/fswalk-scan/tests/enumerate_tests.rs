use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fswalk_scan::{DepthMode, FileMetadata, enumerate_entries, file_metadata};
use tempfile::TempDir;

/// `a.txt`, `b.md`, `sub/c.txt`
fn create_scenario_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("b.md"), "# beta").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/c.txt"), "gamma").unwrap();

    temp
}

/// Three levels deep with files at every level.
fn create_deep_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("one/two/three")).unwrap();
    fs::create_dir_all(root.join("other")).unwrap();
    fs::write(root.join("top.txt"), "0").unwrap();
    fs::write(root.join("one/first.txt"), "1").unwrap();
    fs::write(root.join("one/two/second.LOG"), "2").unwrap();
    fs::write(root.join("one/two/three/third.txt"), "3").unwrap();
    fs::write(root.join("other/fourth.bin"), "4").unwrap();

    temp
}

fn names(entries: &[FileMetadata]) -> HashSet<String> {
    entries.iter().map(|m| m.name().into_owned()).collect()
}

fn paths(entries: impl Iterator<Item = FileMetadata>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = entries.map(|m| m.path).collect();
    paths.sort();
    paths
}

#[test]
fn test_scenario_top_only_pattern() {
    let temp = create_scenario_tree();
    let entries: Vec<_> = enumerate_entries(temp.path(), "*.txt", DepthMode::TopOnly).collect();

    let files: HashSet<_> = names(&entries.iter().filter(|m| !m.is_dir()).cloned().collect::<Vec<_>>());
    assert_eq!(files, HashSet::from(["a.txt".to_string()]));

    // Directories are always yielded regardless of the pattern.
    assert!(entries.iter().any(|m| m.is_dir() && m.name() == "sub"));
}

#[test]
fn test_scenario_all_directories_pattern() {
    let temp = create_scenario_tree();
    let entries: Vec<_> =
        enumerate_entries(temp.path(), "*.txt", DepthMode::AllDirectories).collect();

    let files: HashSet<_> = entries
        .iter()
        .filter(|m| !m.is_dir())
        .map(|m| m.name().into_owned())
        .collect();
    assert_eq!(files, HashSet::from(["a.txt".to_string(), "c.txt".to_string()]));
}

#[test]
fn test_scenario_star_top_only() {
    let temp = create_scenario_tree();
    let entries: Vec<_> = enumerate_entries(temp.path(), "*", DepthMode::TopOnly).collect();

    assert_eq!(
        names(&entries),
        HashSet::from(["a.txt".to_string(), "b.md".to_string(), "sub".to_string()])
    );
    let sub = entries.iter().find(|m| m.name() == "sub").unwrap();
    assert!(sub.is_dir());
    assert_eq!(sub.size, 0);
    assert_eq!(sub.path, temp.path().join("sub"));
}

#[test]
fn test_files_only_directory() {
    let temp = TempDir::new().unwrap();
    let expected: HashSet<String> = (0..25).map(|i| format!("file_{i:02}.dat")).collect();
    for name in &expected {
        fs::write(temp.path().join(name), name.as_bytes()).unwrap();
    }

    let entries: Vec<_> = enumerate_entries(temp.path(), "*", DepthMode::TopOnly).collect();
    assert_eq!(entries.len(), expected.len());
    assert_eq!(names(&entries), expected);
    assert!(entries.iter().all(|m| !m.is_dir()));
    assert!(entries.iter().all(|m| m.size == 11));
}

#[test]
fn test_recursive_completeness_and_uniqueness() {
    let temp = create_deep_tree();
    let found = paths(enumerate_entries(temp.path(), "*", DepthMode::AllDirectories));

    let root = temp.path();
    let mut expected = vec![
        root.join("top.txt"),
        root.join("one"),
        root.join("one/first.txt"),
        root.join("one/two"),
        root.join("one/two/second.LOG"),
        root.join("one/two/three"),
        root.join("one/two/three/third.txt"),
        root.join("other"),
        root.join("other/fourth.bin"),
    ];
    expected.sort();

    assert_eq!(found, expected);
}

#[test]
fn test_pattern_case_insensitive_recursive() {
    let temp = create_deep_tree();
    let entries: Vec<_> = enumerate_entries(temp.path(), "*.log", DepthMode::AllDirectories)
        .filter(|m| !m.is_dir())
        .collect();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name(), "second.LOG");
}

#[test]
fn test_pattern_excludes_files_keeps_directories() {
    let temp = create_deep_tree();
    let entries: Vec<_> = enumerate_entries(temp.path(), "*.txt", DepthMode::AllDirectories).collect();

    for entry in &entries {
        if !entry.is_dir() {
            assert!(entry.name().to_lowercase().ends_with(".txt"), "{}", entry.path.display());
        }
    }
    let dirs = entries.iter().filter(|m| m.is_dir()).count();
    assert_eq!(dirs, 4);
}

#[test]
fn test_depth_first_order() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("only")).unwrap();
    fs::create_dir(temp.path().join("only/nested")).unwrap();
    fs::write(temp.path().join("only/nested/leaf"), "x").unwrap();

    let found: Vec<_> = enumerate_entries(temp.path(), "*", DepthMode::AllDirectories)
        .map(|m| m.path)
        .collect();
    assert_eq!(
        found,
        vec![
            temp.path().join("only"),
            temp.path().join("only/nested"),
            temp.path().join("only/nested/leaf"),
        ]
    );
}

#[test]
fn test_idempotent() {
    let temp = create_deep_tree();
    let first = paths(enumerate_entries(temp.path(), "*", DepthMode::AllDirectories));
    let second = paths(enumerate_entries(temp.path(), "*", DepthMode::AllDirectories));
    assert_eq!(first, second);
}

#[test]
fn test_nonexistent_root_is_empty() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does/not/exist");

    let mut entries = enumerate_entries(&missing, "*", DepthMode::TopOnly);
    assert!(entries.next().is_none());
    assert_eq!(entries.stats().directories_skipped, 1);

    assert_eq!(
        enumerate_entries(Path::new(""), "*", DepthMode::AllDirectories).count(),
        0
    );
}

#[test]
fn test_file_as_root_is_empty() {
    let temp = create_scenario_tree();
    let count = enumerate_entries(temp.path().join("a.txt"), "*", DepthMode::TopOnly).count();
    assert_eq!(count, 0);
}

#[test]
fn test_invalid_pattern_matches_no_files() {
    let temp = create_scenario_tree();
    let entries: Vec<_> = enumerate_entries(temp.path(), "sub/*.txt", DepthMode::AllDirectories).collect();
    assert!(entries.iter().all(|m| m.is_dir()));
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_timestamp_round_trip() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("fresh.txt");

    let before = SystemTime::now() - Duration::from_secs(2);
    fs::write(&file, "now").unwrap();
    let after = SystemTime::now() + Duration::from_secs(2);

    let meta = file_metadata(&file).unwrap();
    let written = SystemTime::from(meta.timestamps.modified);
    assert!(written >= before && written <= after);

    let from_walk = enumerate_entries(temp.path(), "fresh.txt", DepthMode::TopOnly)
        .next()
        .unwrap();
    assert_eq!(from_walk.timestamps.modified, meta.timestamps.modified);
    assert_eq!(from_walk.size, 3);
}

#[test]
fn test_early_stop_then_fresh_walk() {
    let temp = create_deep_tree();
    let partial: Vec<_> = enumerate_entries(temp.path(), "*", DepthMode::AllDirectories)
        .take(2)
        .collect();
    assert_eq!(partial.len(), 2);

    let full = enumerate_entries(temp.path(), "*", DepthMode::AllDirectories).count();
    assert_eq!(full, 9);
}

#[test]
fn test_entries_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<fswalk_scan::Entries>();
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp = create_deep_tree();
    let locked = temp.path().join("one/two");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let mut entries = enumerate_entries(temp.path(), "*", DepthMode::AllDirectories);
    let found = paths(entries.by_ref());
    let skipped = entries.stats().directories_skipped;

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    // The locked directory itself is still listed by its parent.
    assert!(found.contains(&locked));
    assert!(found.contains(&temp.path().join("other/fourth.bin")));

    // Root ignores permission bits, so only check the skip when enforced.
    if skipped > 0 {
        assert!(!found.contains(&temp.path().join("one/two/second.LOG")));
    }
}

#[test]
fn test_question_mark_matches_multibyte_names() {
    let temp = TempDir::new().unwrap();
    for name in ["file1.log", "fileé.log", "file日.log", "file12.log"] {
        fs::write(temp.path().join(name), "x").unwrap();
    }

    let entries: Vec<_> = enumerate_entries(temp.path(), "file?.log", DepthMode::TopOnly).collect();
    assert_eq!(
        names(&entries),
        HashSet::from([
            "file1.log".to_string(),
            "fileé.log".to_string(),
            "file日.log".to_string(),
        ])
    );
}

#[cfg(windows)]
#[test]
fn test_tree_deeper_than_max_path() {
    let temp = TempDir::new().unwrap();
    let segment = "a".repeat(50);
    let mut deepest = temp.path().to_path_buf();
    for _ in 0..7 {
        deepest.push(&segment);
    }
    fs::create_dir_all(&deepest).unwrap();
    fs::write(deepest.join("leaf.txt"), "x").unwrap();
    assert!(deepest.join("leaf.txt").as_os_str().len() > 260);

    let mut entries = enumerate_entries(temp.path(), "*", DepthMode::AllDirectories);
    let found = paths(entries.by_ref());

    assert!(found.contains(&deepest.join("leaf.txt")));
    assert_eq!(found.len(), 8);
    assert_eq!(entries.stats().directories_skipped, 0);

    let meta = file_metadata(deepest.join("leaf.txt")).unwrap();
    assert_eq!(meta.size, 1);
}
