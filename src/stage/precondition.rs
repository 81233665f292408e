// src/stage/precondition.rs

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;

/// A condition on the project tree that must hold before a stage runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    FileExists(PathBuf),
    DirExists(PathBuf),
    /// Directory exists and has at least one entry.
    NonEmptyDir(PathBuf),
}

impl Precondition {
    pub fn path(&self) -> &Path {
        match self {
            Precondition::FileExists(p)
            | Precondition::DirExists(p)
            | Precondition::NonEmptyDir(p) => p,
        }
    }

    /// Check against `fs`; the error names the offending path.
    pub fn check(&self, fs: &dyn FileSystem) -> Result<()> {
        match self {
            Precondition::FileExists(p) => {
                if !fs.is_file(p) {
                    return Err(PipelineError::Precondition(format!(
                        "required file not found: {}",
                        p.display()
                    )));
                }
            }
            Precondition::DirExists(p) => {
                if !fs.is_dir(p) {
                    return Err(PipelineError::Precondition(format!(
                        "required directory not found: {}",
                        p.display()
                    )));
                }
            }
            Precondition::NonEmptyDir(p) => {
                if !fs.is_dir(p) {
                    return Err(PipelineError::Precondition(format!(
                        "required directory not found: {}",
                        p.display()
                    )));
                }
                let entries = fs.read_dir(p).map_err(|e| {
                    PipelineError::Precondition(format!(
                        "required directory is unreadable: {}: {e:#}",
                        p.display()
                    ))
                })?;
                if entries.is_empty() {
                    return Err(PipelineError::Precondition(format!(
                        "required directory is empty: {}",
                        p.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::FileExists(p) => write!(f, "file {}", p.display()),
            Precondition::DirExists(p) => write!(f, "dir {}", p.display()),
            Precondition::NonEmptyDir(p) => write!(f, "non-empty dir {}", p.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    /// Every path is a directory, and listing any of them fails.
    #[derive(Debug)]
    struct UnreadableDirs;

    impl FileSystem for UnreadableDirs {
        fn exists(&self, _path: &Path) -> bool {
            true
        }
        fn is_file(&self, _path: &Path) -> bool {
            false
        }
        fn is_dir(&self, _path: &Path) -> bool {
            true
        }
        fn file_len(&self, path: &Path) -> anyhow::Result<u64> {
            anyhow::bail!("Is a directory: {:?}", path)
        }
        fn read_dir(&self, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
            anyhow::bail!("Permission denied: {:?}", path)
        }
        fn create_dir_all(&self, _path: &Path) -> anyhow::Result<()> {
            Ok(())
        }
        fn remove_file(&self, _path: &Path) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unreadable_dir_is_a_precondition_failure() {
        let err = Precondition::NonEmptyDir(PathBuf::from("/proj/images"))
            .check(&UnreadableDirs)
            .unwrap_err();

        assert!(matches!(err, PipelineError::Precondition(_)), "got {err:?}");
        assert_eq!(err.exit_code(), 2);
        let msg = err.to_string();
        assert!(msg.contains("/proj/images"), "{msg}");
        assert!(msg.contains("Permission denied"), "{msg}");
    }

    #[test]
    fn non_empty_dir_distinguishes_missing_and_empty() {
        let fs = MockFileSystem::new();
        let images = PathBuf::from("/proj/images");
        let cond = Precondition::NonEmptyDir(images.clone());

        let missing = cond.check(&fs).unwrap_err();
        assert!(missing.to_string().contains("not found"));

        fs.add_dir(&images);
        let empty = cond.check(&fs).unwrap_err();
        assert!(empty.to_string().contains("is empty"));

        fs.add_file(images.join("0001.jpg"), b"x".to_vec());
        cond.check(&fs).unwrap();
    }

    #[test]
    fn file_precondition_rejects_directories() {
        let fs = MockFileSystem::new();
        fs.add_dir("/proj/sparse/cameras.txt");
        let cond = Precondition::FileExists(PathBuf::from("/proj/sparse/cameras.txt"));
        match cond.check(&fs) {
            Err(PipelineError::Precondition(msg)) => assert!(msg.contains("cameras.txt")),
            other => panic!("expected precondition error, got {other:?}"),
        }
    }
}
