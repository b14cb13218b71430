//! JSON file IO
//!
//! Reads map a missing file to `NotFound` and malformed content to `Parse`.
//! Writes are staged into a temp file next to the target and committed by
//! rename, so a reader never sees a half-written collection.

use hgive_core::{GiveError, GiveResult, NotFoundError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> GiveResult<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(NotFoundError::File(path.to_path_buf()).into());
        }
        Err(e) => return Err(GiveError::io_error(path, e)),
    };
    serde_json::from_slice(&bytes).map_err(|e| GiveError::parse_error(path, e))
}

/// A serialized file waiting to be committed
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Final location of the file
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the staged content into place
    pub fn commit(self) -> GiveResult<()> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| GiveError::io_error(&target, e.error))?;
        Ok(())
    }
}

/// Serialize `value` (pretty-printed) into a temp file beside `target`.
pub fn stage_json<T: Serialize + ?Sized>(target: &Path, value: &T) -> GiveResult<StagedFile> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| GiveError::io_error(dir, e))?;

    let mut body = serde_json::to_vec_pretty(value).map_err(|e| GiveError::parse_error(target, e))?;
    body.push(b'\n');
    temp.write_all(&body)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| GiveError::io_error(temp.path(), e))?;

    Ok(StagedFile {
        temp,
        target: target.to_path_buf(),
    })
}

/// A [`commit_all`] that stopped partway
#[derive(Debug)]
pub struct PartialCommit {
    /// Leading files already moved into place
    pub committed: usize,
    pub error: GiveError,
}

/// Commit staged files in order, stopping at the first failed rename.
///
/// All content is already on disk when this runs; only renames remain.
/// Files after the failed one are discarded with their temp files.
pub fn commit_all(staged: Vec<StagedFile>) -> Result<(), PartialCommit> {
    for (committed, file) in staged.into_iter().enumerate() {
        file.commit().map_err(|error| PartialCommit { committed, error })?;
    }
    Ok(())
}

/// Stage and commit a single file.
pub fn write_json<T: Serialize + ?Sized>(target: &Path, value: &T) -> GiveResult<()> {
    stage_json(target, value)?.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<Vec<u32>>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, GiveError::NotFound(NotFoundError::File(_))));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2,").unwrap();
        let err = read_json::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, GiveError::Parse { .. }));
    }

    #[test]
    fn staged_file_invisible_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.json");
        write_json(&path, &vec![1u32]).unwrap();

        let staged = stage_json(&path, &vec![1u32, 2, 3]).unwrap();
        assert_eq!(read_json::<Vec<u32>>(&path).unwrap(), vec![1]);
        staged.commit().unwrap();
        assert_eq!(read_json::<Vec<u32>>(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn dropped_stage_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_json(&path, &BTreeMap::from([("a", 1)])).unwrap();
        drop(stage_json(&path, &BTreeMap::from([("b", 2)])).unwrap());

        let back: BTreeMap<String, u32> = read_json(&path).unwrap();
        assert_eq!(back.get("a"), Some(&1));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn commit_all_reports_files_committed_before_failure() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let blocked = dir.path().join("blocked.json");
        let last = dir.path().join("last.json");
        std::fs::create_dir(&blocked).unwrap();

        let staged = vec![
            stage_json(&first, &vec![1u32]).unwrap(),
            stage_json(&blocked, &vec![2u32]).unwrap(),
            stage_json(&last, &vec![3u32]).unwrap(),
        ];
        let partial = commit_all(staged).unwrap_err();

        assert_eq!(partial.committed, 1);
        assert!(matches!(partial.error, GiveError::Io { .. }));
        assert_eq!(read_json::<Vec<u32>>(&first).unwrap(), vec![1]);
        assert!(!last.exists());
        assert!(blocked.is_dir());
    }
}
