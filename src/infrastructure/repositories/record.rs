//! TOML Record Repository
//!
//! Implements the RecordRepository port using TOML format, one file per
//! stage: `{state_dir}/records/{stage}.lock`. The run lock lives directly
//! in `{state_dir}`, so no stage name can collide with it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{DeployedFunctionVersion, StageDeploymentRecord};
use crate::domain::ports::{RecordError, RecordRepository, RecordResult};
use crate::domain::value_objects::{ContentHash, FunctionVersion, Stage};
use crate::infrastructure::fs::atomic_write;

const RECORDS_DIR: &str = "records";

/// TOML-based record repository
pub struct TomlRecordRepository {
    state_dir: PathBuf,
}

impl TomlRecordRepository {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// File backing the record of `stage`
    pub fn path_for(&self, stage: &Stage) -> PathBuf {
        self.state_dir
            .join(RECORDS_DIR)
            .join(format!("{}.lock", stage))
    }
}

/// TOML representation of one function entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlFunctionEntry {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

/// TOML representation of the record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlRecord {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_compilation_timestamp: Option<String>,
    #[serde(default)]
    functions: BTreeMap<String, TomlFunctionEntry>,
}

fn io_error(path: &Path, err: std::io::Error) -> RecordError {
    RecordError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl RecordRepository for TomlRecordRepository {
    fn load(&self, stage: &Stage) -> RecordResult<StageDeploymentRecord> {
        let path = self.path_for(stage);
        if !path.exists() {
            return Ok(StageDeploymentRecord::new());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let toml_record: TomlRecord = toml::from_str(&content).map_err(|e| RecordError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if toml_record.version != StageDeploymentRecord::FORMAT_VERSION {
            return Err(RecordError::VersionMismatch {
                path,
                found: toml_record.version,
                expected: StageDeploymentRecord::FORMAT_VERSION,
            });
        }

        let functions = toml_record
            .functions
            .into_iter()
            .map(|(entry_point, entry)| {
                (
                    entry_point,
                    DeployedFunctionVersion::new(
                        FunctionVersion::from_recorded(entry.version),
                        entry.hash.map(ContentHash::from),
                    ),
                )
            })
            .collect();

        Ok(StageDeploymentRecord::restore(
            toml_record.version,
            toml_record.last_compilation_timestamp,
            functions,
        ))
    }

    fn save(&self, stage: &Stage, record: &StageDeploymentRecord) -> RecordResult<()> {
        let path = self.path_for(stage);

        let functions = record
            .functions()
            .map(|(entry_point, deployed)| {
                (
                    entry_point.to_string(),
                    TomlFunctionEntry {
                        version: deployed.version().as_str().to_string(),
                        hash: deployed.hash().map(|h| h.as_str().to_string()),
                    },
                )
            })
            .collect();

        let toml_record = TomlRecord {
            version: record.version(),
            last_compilation_timestamp: record.last_compilation_timestamp().map(str::to_string),
            functions,
        };

        let content = toml::to_string_pretty(&toml_record).map_err(|e| RecordError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        atomic_write(&path, content.as_bytes()).map_err(|e| io_error(&path, e))
    }

    fn delete(&self, stage: &Stage) -> RecordResult<()> {
        let path = self.path_for(stage);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stage(name: &str) -> Stage {
        Stage::new(name).unwrap()
    }

    #[test]
    fn load_nonexistent_returns_empty_record() {
        let dir = tempdir().unwrap();
        let repo = TomlRecordRepository::new(dir.path());

        let record = repo.load(&stage("dev")).unwrap();

        assert!(record.is_empty());
        assert_eq!(record.version(), 1);
        assert_eq!(record.last_compilation_timestamp(), None);
    }

    #[test]
    fn save_and_load_keeps_hashless_entries() {
        let dir = tempdir().unwrap();
        let repo = TomlRecordRepository::new(dir.path().join("state"));

        let mut record = StageDeploymentRecord::for_compilation("20240102T0304");
        record.set(
            "com.shop.Orders",
            DeployedFunctionVersion::new(
                FunctionVersion::mint("20240102T0304", "orders.jar"),
                Some(ContentHash::from_bytes(b"orders")),
            ),
        );
        record.set(
            "com.shop.Legacy",
            DeployedFunctionVersion::new(FunctionVersion::from_recorded("t0/legacy.jar"), None),
        );
        repo.save(&stage("prod"), &record).unwrap();

        let loaded = repo.load(&stage("prod")).unwrap();

        assert_eq!(loaded, record);
        assert!(loaded.get("com.shop.Legacy").unwrap().hash().is_none());
        assert!(repo.load(&stage("dev")).unwrap().is_empty());
    }

    #[test]
    fn version_mismatch_is_reported() {
        let dir = tempdir().unwrap();
        let repo = TomlRecordRepository::new(dir.path());
        atomic_write(&repo.path_for(&stage("dev")), b"version = 7\n").unwrap();

        let err = repo.load(&stage("dev")).unwrap_err();

        assert!(matches!(
            err,
            RecordError::VersionMismatch {
                found: 7,
                expected: 1,
                ..
            }
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let repo = TomlRecordRepository::new(dir.path());
        atomic_write(&repo.path_for(&stage("dev")), b"{{{{ not toml").unwrap();

        assert!(matches!(
            repo.load(&stage("dev")),
            Err(RecordError::Parse { .. })
        ));
    }

    #[test]
    fn delete_removes_the_stage_file_only() {
        let dir = tempdir().unwrap();
        let repo = TomlRecordRepository::new(dir.path());
        let record = StageDeploymentRecord::for_compilation("t1");
        repo.save(&stage("dev"), &record).unwrap();
        repo.save(&stage("prod"), &record).unwrap();

        repo.delete(&stage("dev")).unwrap();
        repo.delete(&stage("dev")).unwrap();

        assert!(!repo.path_for(&stage("dev")).exists());
        assert!(repo.path_for(&stage("prod")).exists());
    }

    #[test]
    fn stage_named_run_does_not_touch_the_run_lock() {
        use crate::infrastructure::fs::StateLock;

        let dir = tempdir().unwrap();
        let held = StateLock::acquire(dir.path()).unwrap();
        let repo = TomlRecordRepository::new(dir.path());
        let run = stage("run");

        assert_ne!(repo.path_for(&run), held.path());
        repo.save(&run, &StageDeploymentRecord::for_compilation("t1"))
            .unwrap();

        assert!(StateLock::acquire(dir.path()).is_err());

        repo.delete(&run).unwrap();
        assert!(held.path().exists());
        assert!(StateLock::acquire(dir.path()).is_err());
    }
}
