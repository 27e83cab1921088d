use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{AnalysisError, Result};
use crate::state::PredictionRecord;

const HISTORY_DIR: &str = "bet_analyser";
const HISTORY_FILE: &str = "history.json";
const LOCAL_HISTORY_FILE: &str = "bet_analyser_history.json";

/// Newest-first log of predictions, rewritten in full on every change.
/// Records are addressed by position; display order equals storage order.
#[derive(Debug)]
pub struct HistoryLedger {
    path: PathBuf,
    records: Vec<PredictionRecord>,
}

impl HistoryLedger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load(&path)?;
        debug!("loaded {} history records from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, record: PredictionRecord) -> Result<()> {
        self.records.insert(0, record);
        if let Err(err) = save(&self.path, &self.records) {
            self.records.remove(0);
            return Err(err);
        }
        info!(
            "recorded prediction {} ({} records)",
            self.records[0].match_label,
            self.records.len()
        );
        Ok(())
    }

    pub fn amend(&mut self, index: usize, actual_result: &str) -> Result<&PredictionRecord> {
        let len = self.records.len();
        let Some(record) = self.records.get_mut(index) else {
            return Err(AnalysisError::RecordNotFound { index, len });
        };
        let previous = std::mem::replace(&mut record.actual_result, actual_result.to_string());
        if let Err(err) = save(&self.path, &self.records) {
            self.records[index].actual_result = previous;
            return Err(err);
        }
        info!("history record {index} marked as {actual_result}");
        Ok(&self.records[index])
    }
}

/// Reads the history file. A missing file is an empty history.
pub fn load(path: &Path) -> Result<Vec<PredictionRecord>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(AnalysisError::HistoryIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|source| AnalysisError::HistoryFormat {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    let io_err = |source: std::io::Error| AnalysisError::HistoryIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut ser)
        .map_err(|source| AnalysisError::HistoryFormat {
            path: path.to_path_buf(),
            source,
        })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, buf).map_err(io_err)?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    Ok(())
}

/// Default location of the history file when none is configured.
pub fn default_history_path() -> PathBuf {
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return PathBuf::from(base).join(HISTORY_DIR).join(HISTORY_FILE);
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(HISTORY_DIR)
            .join(HISTORY_FILE);
    }
    PathBuf::from(LOCAL_HISTORY_FILE)
}
