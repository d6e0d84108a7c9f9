use crate::libbeidanci::Error;
use log::{debug, warn};
use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VocabularyEntry {
    pub eng: String,
    pub cht: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VocabularySet {
    pub title: String,
    pub vocabulary: Vec<VocabularyEntry>,
}

/// All vocabulary sets found under the data directory, in filename order.
#[derive(Debug)]
pub(crate) struct VocabularyStore {
    sets: Vec<VocabularySet>,
    titles: Vec<String>,
}

impl VocabularyStore {
    pub fn load(data_dir: &Path) -> Result<VocabularyStore, Error> {
        let mut files = Vec::new();
        if data_dir.is_dir() {
            collect_json_files(data_dir, &mut files)?;
            files.sort();
        } else {
            warn!("[Store] Data directory {:?} does not exist.", data_dir);
        }

        let mut sets = Vec::with_capacity(files.len());
        for path in files {
            let json = fs::read_to_string(&path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            let set: VocabularySet =
                serde_json::from_str(&json).map_err(|source| Error::MalformedSet {
                    path: path.clone(),
                    source,
                })?;
            debug!(
                "[Store] Loaded {:?} ({} entries) from {:?}",
                set.title,
                set.vocabulary.len(),
                path
            );
            sets.push(set);
        }

        let titles = sets.iter().map(|set| set.title.clone()).collect();
        Ok(VocabularyStore { sets, titles })
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Returns the set at `index` with its entries freshly shuffled. The
    /// shuffle mutates the stored set, so repeated calls yield new orders.
    pub fn get_vocabulary_set(&mut self, index: usize) -> Result<&VocabularySet, Error> {
        let len = self.sets.len();
        let set = self
            .sets
            .get_mut(index)
            .ok_or(Error::SetOutOfRange { index, len })?;
        set.vocabulary.shuffle(&mut rng());
        Ok(set)
    }
}

fn collect_json_files(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), Error> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            found.push(path);
        }
    }
    Ok(())
}
