use std::path::PathBuf;
use thiserror::Error;

pub(crate) mod convert;
pub(crate) mod quiz;
pub(crate) mod record;
pub(crate) mod store;
pub(crate) mod voice;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed vocabulary set {path:?}: {source}")]
    MalformedSet {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: expected `term<TAB>translation`, found {fields} field(s)")]
    BadLine { line: usize, fields: usize },
    #[error("{0:?} is empty")]
    EmptyInput(PathBuf),
    #[error("{0:?} has no file stem to name the output after")]
    NoStem(PathBuf),
    #[error("no vocabulary set at index {index} (have {len})")]
    SetOutOfRange { index: usize, len: usize },
    #[error("cannot encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("voice cache unavailable: {0}")]
    Voice(#[from] voice::VoiceError),
}
