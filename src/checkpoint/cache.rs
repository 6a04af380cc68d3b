use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::JudgeError;

use super::artifact::{ArtifactRow, ARTIFACT_COLUMNS};
use super::key::CheckpointKey;
use super::DEFAULT_ROOT;

/// File-backed store of result artifacts.
#[derive(Debug, Clone)]
pub struct CheckpointCache {
    root: PathBuf,
    pretty_json: bool,
}

impl Default for CheckpointCache {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

fn count_rows(path: &Path) -> Result<usize, JudgeError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = 0usize;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok(rows)
}

impl CheckpointCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty_json: false,
        }
    }

    /// Re-indent JSON judge outputs when writing artifacts.
    pub fn pretty_json(mut self, enable: bool) -> Self {
        self.pretty_json = enable;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_pretty_json(&self) -> bool {
        self.pretty_json
    }

    pub fn path_for(&self, key: &CheckpointKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    /// Returns the artifact path when `key` already has at least one row.
    ///
    /// Missing, header-only and unreadable files all count as absent.
    pub fn lookup(&self, key: &CheckpointKey) -> Option<PathBuf> {
        let path = self.path_for(key);
        if !path.is_file() {
            return None;
        }
        match count_rows(&path) {
            Ok(0) => {
                log::debug!("Artifact {} has no rows", path.display());
                None
            }
            Ok(rows) => {
                log::info!("Using cached results for {key}: {} ({rows} rows)", path.display());
                Some(path)
            }
            Err(err) => {
                log::warn!("Ignoring unreadable artifact {}: {err}", path.display());
                None
            }
        }
    }

    pub fn load(&self, key: &CheckpointKey) -> Result<Vec<ArtifactRow>, JudgeError> {
        let mut reader = csv::Reader::from_path(self.path_for(key))?;
        let rows = reader
            .deserialize::<ArtifactRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Writes the artifact for `key` and returns its path.
    ///
    /// The rows go to a sibling temporary file that is renamed into place, so
    /// a reader never sees a partial artifact. An artifact that already holds
    /// rows is never replaced.
    pub fn write(&self, key: &CheckpointKey, rows: &[ArtifactRow]) -> Result<PathBuf, JudgeError> {
        if let Some(existing) = self.lookup(key) {
            return Err(JudgeError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("artifact {} already holds results", existing.display()),
            )));
        }

        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let partial = path.with_extension("csv.partial");

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&partial)?;
        writer.write_record(ARTIFACT_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&partial, &path)?;
        log::info!("Saved {} results for {key} to {}", rows.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn key() -> CheckpointKey {
        CheckpointKey::new("Doctors", "rule_breaking", NaiveDate::from_ymd_opt(2025, 8, 3).unwrap())
    }

    fn row(id: &str, output: &str) -> ArtifactRow {
        ArtifactRow {
            conversation_id: id.into(),
            conversation: "<conversation>\"quoted\", text\n</conversation>".into(),
            llm_output: output.into(),
            status: "success".into(),
            error: None,
            attempts: 1,
            input_tokens: Some(12),
            output_tokens: None,
        }
    }

    #[test]
    fn missing_artifact_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = CheckpointCache::new(dir.path());
        assert!(cache.lookup(&key()).is_none());
        assert_eq!(
            cache.path_for(&key()),
            dir.path().join("2025-08-03").join("rule_breaking_doctors_08_03.csv")
        );
    }

    #[test]
    fn header_only_artifact_is_absent_and_replaceable() {
        let dir = TempDir::new().unwrap();
        let cache = CheckpointCache::new(dir.path());

        let path = cache.write(&key(), &[]).unwrap();
        assert!(path.is_file());
        assert!(cache.lookup(&key()).is_none());

        cache.write(&key(), &[row("a", "PASS")]).unwrap();
        assert_eq!(cache.lookup(&key()), Some(path));
    }

    #[test]
    fn written_rows_load_back() {
        let dir = TempDir::new().unwrap();
        let cache = CheckpointCache::new(dir.path());
        let rows = vec![row("a", "{\n  \"x\": 1\n}"), row("b", "(empty)")];

        cache.write(&key(), &rows).unwrap();

        assert_eq!(cache.load(&key()).unwrap(), rows);
        let header = fs::read_to_string(cache.path_for(&key())).unwrap();
        assert!(header.starts_with(
            "conversation_id,conversation,llm_output,status,error,attempts,input_tokens,output_tokens\n"
        ));
        assert!(!cache.path_for(&key()).with_extension("csv.partial").exists());
    }

    #[test]
    fn refuses_to_overwrite_results() {
        let dir = TempDir::new().unwrap();
        let cache = CheckpointCache::new(dir.path());
        cache.write(&key(), &[row("a", "first")]).unwrap();

        let err = cache.write(&key(), &[row("a", "second")]).unwrap_err();

        assert!(matches!(err, JudgeError::Io(ref e) if e.kind() == io::ErrorKind::AlreadyExists));
        assert_eq!(cache.load(&key()).unwrap()[0].llm_output, "first");
    }

    #[test]
    fn unreadable_artifact_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = CheckpointCache::new(dir.path());
        let path = cache.path_for(&key());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"a,b\n1,2,3\n").unwrap();

        assert!(cache.lookup(&key()).is_none());
    }
}
