use std::fs;
use std::path::Path;

use crate::error::Result;

/// Copy `source` into `target` recursively, overwriting existing files.
///
/// Symlinks are followed; `target` and missing parents are created.
pub fn copy_dir_recursive(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if fs::metadata(&from)?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_nested_directories() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::create_dir_all(source.path().join("workflows/bot")).unwrap();
        fs::write(source.path().join("workflows/sync.yml"), "on: push").unwrap();
        fs::write(source.path().join("workflows/bot/readme.md"), "# bot").unwrap();

        copy_dir_recursive(source.path(), &target.path().join(".github")).unwrap();

        let copied = target.path().join(".github");
        assert_eq!(
            fs::read_to_string(copied.join("workflows/sync.yml")).unwrap(),
            "on: push"
        );
        assert_eq!(
            fs::read_to_string(copied.join("workflows/bot/readme.md")).unwrap(),
            "# bot"
        );
    }

    #[test]
    fn test_copy_overwrites() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::write(source.path().join("ci.yml"), "new").unwrap();
        fs::write(target.path().join("ci.yml"), "old").unwrap();
        fs::write(target.path().join("upstream.yml"), "kept").unwrap();

        copy_dir_recursive(source.path(), target.path()).unwrap();

        assert_eq!(fs::read_to_string(target.path().join("ci.yml")).unwrap(), "new");
        assert_eq!(
            fs::read_to_string(target.path().join("upstream.yml")).unwrap(),
            "kept"
        );
    }

    #[test]
    fn test_missing_source_fails() {
        let target = tempfile::tempdir().unwrap();
        assert!(copy_dir_recursive(&target.path().join("missing"), target.path()).is_err());
    }
}
