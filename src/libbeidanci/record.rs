use crate::libbeidanci::quiz::QuizSummary;
use crate::libbeidanci::Error;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Best historical accuracy per title, backed by one JSON object file.
/// A missing or unreadable file is empty history, never an error.
pub(crate) struct RecordStore {
    path: PathBuf,
    records: BTreeMap<String, f64>,
}

impl RecordStore {
    pub fn load(path: &Path) -> RecordStore {
        let records = match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(records) => records,
                Err(err) => {
                    warn!("[Records] Ignoring malformed {:?}: {}", path, err);
                    BTreeMap::new()
                }
            },
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("[Records] Cannot read {:?}: {}", path, err);
                }
                BTreeMap::new()
            }
        };
        debug!("[Records] {} record(s) loaded from {:?}", records.len(), path);
        RecordStore {
            path: path.to_path_buf(),
            records,
        }
    }

    pub fn get_record(&self, title: &str) -> f64 {
        self.records.get(title).copied().unwrap_or(0.0)
    }

    /// Keeps the better of the stored and new accuracy, then rewrites the
    /// whole file. Returns the accuracy now on record for the title.
    pub fn update_record(&mut self, summary: &QuizSummary) -> Result<f64, Error> {
        let best = self.get_record(&summary.title).max(summary.accuracy);
        self.records.insert(summary.title.clone(), best);
        self.save()?;
        Ok(best)
    }

    // Whole-file overwrite through a temp file and rename, so a crash
    // mid-write cannot leave a half-written record file behind.
    fn save(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::Write {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|err| Error::Write {
            path: tmp.clone(),
            source: err,
        })?;
        fs::rename(&tmp, &self.path).map_err(|err| Error::Write {
            path: self.path.clone(),
            source: err,
        })?;
        debug!("[Records] Saved {} record(s) to {:?}", self.records.len(), self.path);
        Ok(())
    }
}
