//! Temporary file management utilities.
//!
//! The merge operation hands ffmpeg's concat demuxer a list file. That file is
//! owned by a [`ConcatList`] guard: it is created with a random name (so
//! concurrent merges never collide) and removed when the guard is dropped,
//! whether the merge succeeded, failed or never started. Removal failures are
//! logged and never reach the caller.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder as TempFileBuilder, NamedTempFile};

use crate::error::{CoreError, CoreResult};

/// Renders concat demuxer lines: `file '<path>'` with single quotes escaped as `'\''`.
#[must_use]
pub fn concat_list_contents(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|path| {
            let escaped = path.to_string_lossy().replace('\'', r"'\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

/// Creates a temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

/// Scoped concat list file for the merge demuxer.
#[derive(Debug)]
pub struct ConcatList {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ConcatList {
    /// Writes the list for `inputs` into a uniquely named file under `dir`.
    pub fn create(dir: &Path, inputs: &[PathBuf]) -> CoreResult<Self> {
        let mut file = create_temp_file(dir, "mediaforge_concat", "txt")?;
        file.write_all(concat_list_contents(inputs).as_bytes())?;
        file.flush()?;

        let path = file.path().to_path_buf();
        log::debug!("Wrote concat list with {} entries to {}", inputs.len(), path.display());
        Ok(Self { file: Some(file), path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now, reporting a failure instead of logging it.
    pub fn close(mut self) -> CoreResult<()> {
        self.remove()
    }

    fn remove(&mut self) -> CoreResult<()> {
        match self.file.take() {
            Some(file) => file.close().map_err(|source| CoreError::TempResourceCleanup {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ConcatList {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            log::warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_contents_escapes_quotes() {
        let inputs = vec![PathBuf::from("/clips/a.mp4"), PathBuf::from("/clips/it's here.mp4")];
        assert_eq!(
            concat_list_contents(&inputs),
            "file '/clips/a.mp4'\nfile '/clips/it'\\''s here.mp4'\n"
        );
    }

    #[test]
    fn test_concat_list_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];

        let path = {
            let list = ConcatList::create(dir.path(), &inputs).unwrap();
            let written = std::fs::read_to_string(list.path()).unwrap();
            assert_eq!(written, "file 'a.mp4'\nfile 'b.mp4'\n");
            list.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_concat_lists_are_uniquely_named() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![PathBuf::from("a.mp4")];
        let first = ConcatList::create(dir.path(), &inputs).unwrap();
        let second = ConcatList::create(dir.path(), &inputs).unwrap();
        assert_ne!(first.path(), second.path());

        let path = first.path().to_path_buf();
        first.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_cleanup_failure_is_not_surfaced_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let list = ConcatList::create(dir.path(), &[PathBuf::from("a.mp4")]).unwrap();
        std::fs::remove_file(list.path()).unwrap();
        // close reports it; drop would only have logged it
        assert!(matches!(list.close(), Err(CoreError::TempResourceCleanup { .. })));
    }
}
