// src/discovery/search.rs

//! Locating the workload directory under the project root.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{HerdsmanError, Result};
use crate::fs::FileSystem;

/// Resolve the directory that holds the workloads.
///
/// - An absolute `sub_dir`, or one with several path components, is taken
///   literally (relative ones are joined onto `root`).
/// - A bare name is searched for below `root` with [`find_dir`].
pub fn locate_workload_dir(
    fs: &dyn FileSystem,
    root: &Path,
    sub_dir: &str,
    ignore: &BTreeSet<String>,
) -> Result<PathBuf> {
    let candidate = Path::new(sub_dir);

    if candidate.is_absolute() || candidate.components().count() > 1 {
        let dir = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };
        return if fs.is_dir(&dir) {
            Ok(dir)
        } else {
            Err(HerdsmanError::Discovery(format!(
                "{:?} is not a directory",
                dir
            )))
        };
    }

    find_dir(fs, root, sub_dir, ignore).ok_or_else(|| {
        HerdsmanError::Discovery(format!(
            "no directory named '{}' under {:?}",
            sub_dir, root
        ))
    })
}

/// Breadth-first search for a directory called `name` below `start`.
///
/// The shallowest match wins; siblings are visited in name order. Hidden
/// directories, ignored names and directories already seen (by canonical
/// path, to survive symlink loops) are not descended into.
pub fn find_dir(
    fs: &dyn FileSystem,
    start: &Path,
    name: &str,
    ignore: &BTreeSet<String>,
) -> Option<PathBuf> {
    let mut queue = VecDeque::from([start.to_path_buf()]);
    let mut seen: HashSet<PathBuf> = HashSet::new();

    while let Some(dir) = queue.pop_front() {
        let key = fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !seen.insert(key) {
            continue;
        }

        let mut children = match fs.read_dir(&dir) {
            Ok(children) => children,
            Err(e) => {
                debug!(dir = ?dir, error = %e, "skipping unreadable directory");
                continue;
            }
        };
        children.retain(|p| fs.is_dir(p));
        children.sort();

        for child in children {
            let Some(child_name) = child.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if child_name == name {
                return Some(child);
            }
            if child_name.starts_with('.') || ignore.contains(child_name) {
                continue;
            }
            queue.push_back(child);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn no_ignore() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn finds_direct_child() {
        let fs = MockFileSystem::new();
        fs.add_dir("./sub_processes");

        assert_eq!(
            find_dir(&fs, Path::new("."), "sub_processes", &no_ignore()),
            Some(PathBuf::from("./sub_processes"))
        );
    }

    #[test]
    fn prefers_shallowest_match() {
        let fs = MockFileSystem::new();
        fs.add_dir("./a/b/c/jobs");
        fs.add_dir("./z/jobs");

        assert_eq!(
            find_dir(&fs, Path::new("."), "jobs", &no_ignore()),
            Some(PathBuf::from("./z/jobs"))
        );
    }

    #[test]
    fn does_not_descend_into_hidden_or_ignored_dirs() {
        let fs = MockFileSystem::new();
        fs.add_dir("./.git/jobs");
        fs.add_dir("./__pycache__/jobs");

        let ignore = BTreeSet::from(["__pycache__".to_string()]);
        assert_eq!(find_dir(&fs, Path::new("."), "jobs", &ignore), None);
    }

    #[test]
    fn path_like_sub_dir_is_taken_literally() {
        let fs = MockFileSystem::new();
        fs.add_dir("./deep/jobs");

        assert_eq!(
            locate_workload_dir(&fs, Path::new("."), "deep/jobs", &no_ignore()).unwrap(),
            PathBuf::from("./deep/jobs")
        );
        assert!(matches!(
            locate_workload_dir(&fs, Path::new("."), "other/jobs", &no_ignore()),
            Err(HerdsmanError::Discovery(_))
        ));
    }

    #[test]
    fn missing_name_is_a_discovery_error() {
        let fs = MockFileSystem::new();
        assert!(matches!(
            locate_workload_dir(&fs, Path::new("."), "sub_processes", &no_ignore()),
            Err(HerdsmanError::Discovery(_))
        ));
    }
}
