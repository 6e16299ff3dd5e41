//! Generated source files paired with their destination.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// A piece of generated source and the root-relative path it is saved under.
///
/// Created by whichever component produces the content, saved once, and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTwin {
    /// Path relative to the generation root, always with `/` separators
    pub file_name: String,
    pub content: String,
}

impl FileTwin {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Absolute path of this file under `root`.
    pub fn path_in(&self, root: &Path) -> PathBuf {
        self.file_name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Write the content under `root`, creating parent directories.
    pub fn save(&self, root: &Path) -> io::Result<PathBuf> {
        let path = self.path_in(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }

    /// Read a previously saved file back.
    pub fn load(root: &Path, file_name: impl Into<String>) -> io::Result<Self> {
        let file_name = file_name.into();
        let content = std::fs::read_to_string(Self::new(file_name.clone(), "").path_in(root))?;
        Ok(Self { file_name, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let twin = FileTwin::new("bank/transfer/guard_transfer.py", "x = 1\n");

        let path = twin.save(dir.path()).unwrap();

        assert_eq!(
            path,
            dir.path().join("bank").join("transfer").join("guard_transfer.py")
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let twin = FileTwin::new("tests/test_guard_transfer.py", "def test_x():\n    pass\n");
        twin.save(dir.path()).unwrap();

        let loaded = FileTwin::load(dir.path(), "tests/test_guard_transfer.py").unwrap();
        assert_eq!(loaded, twin);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileTwin::load(dir.path(), "nope.py").is_err());
    }
}
