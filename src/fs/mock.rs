// src/fs/mock.rs

//! In-memory directory tree for discovery tests.

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(String),
    Dir(Vec<String>), // child names
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Add a file, creating its parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_to_parent(&mut entries, &path);
    }

    /// Add an (empty) directory, creating its parents implicitly.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dir(&mut entries, &path);
    }

    fn parent_of(path: &Path) -> Option<&Path> {
        let parent = path.parent()?;
        if parent.as_os_str().is_empty() {
            Some(Path::new("."))
        } else {
            Some(parent)
        }
    }

    fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = Self::parent_of(path) else {
            return;
        };
        if parent == path {
            return;
        }

        Self::ensure_dir(entries, parent);
        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            entries.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn ensure_dir(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        Self::link_to_parent(entries, path);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(
            self.entries.lock().unwrap().get(path),
            Some(MockEntry::File(_))
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.entries.lock().unwrap().get(path),
            Some(MockEntry::Dir(_))
        )
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("File not found: {:?}", path))
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_files_create_parent_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("./jobs/nightly/a.sh", "main() { :; }");

        assert!(fs.is_dir(Path::new("./jobs")));
        assert!(fs.is_dir(Path::new("./jobs/nightly")));
        assert!(fs.is_file(Path::new("./jobs/nightly/a.sh")));
        assert_eq!(
            fs.read_dir(Path::new("./jobs")).unwrap(),
            vec![PathBuf::from("./jobs/nightly")]
        );
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let fs = MockFileSystem::new();
        fs.add_dir("./empty");

        assert!(fs.read_dir(Path::new("./empty")).unwrap().is_empty());
        assert!(fs.read_to_string(Path::new("./empty")).is_err());
        assert!(fs.read_dir(Path::new("./missing")).is_err());
    }
}
