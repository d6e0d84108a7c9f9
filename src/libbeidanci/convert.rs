use crate::libbeidanci::store::{VocabularyEntry, VocabularySet};
use crate::libbeidanci::Error;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Parses `term<TAB>translation` lines, keeping input order. Any line with
/// a field count other than two fails the whole parse.
pub(crate) fn parse_lines(text: &str) -> Result<Vec<VocabularyEntry>, Error> {
    let mut entries = Vec::new();
    for (idx, line) in text.trim().lines().enumerate() {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        match fields.as_slice() {
            [eng, cht] => entries.push(VocabularyEntry {
                eng: (*eng).to_string(),
                cht: (*cht).to_string(),
            }),
            other => {
                return Err(Error::BadLine {
                    line: idx + 1,
                    fields: other.len(),
                })
            }
        }
    }
    Ok(entries)
}

/// Converts one tab-separated source file into a vocabulary-set JSON file
/// named after the source's stem. Nothing is written when parsing fails.
pub(crate) fn convert_file(source: &Path, title: &str, data_dir: &Path) -> Result<PathBuf, Error> {
    let text = fs::read_to_string(source).map_err(|err| Error::Read {
        path: source.to_path_buf(),
        source: err,
    })?;
    if text.trim().is_empty() {
        return Err(Error::EmptyInput(source.to_path_buf()));
    }
    let vocabulary = parse_lines(&text)?;
    debug!("[Convert] Parsed {} entries from {:?}", vocabulary.len(), source);

    let set = VocabularySet {
        title: title.to_string(),
        vocabulary,
    };
    let stem = source
        .file_stem()
        .ok_or_else(|| Error::NoStem(source.to_path_buf()))?;
    let output = data_dir.join(stem).with_extension("json");

    fs::create_dir_all(data_dir).map_err(|err| Error::Write {
        path: data_dir.to_path_buf(),
        source: err,
    })?;
    let json = serde_json::to_string_pretty(&set)?;
    fs::write(&output, json).map_err(|err| Error::Write {
        path: output.clone(),
        source: err,
    })?;
    Ok(output)
}
