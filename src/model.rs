//! Locating and loading the chunker model resource.
//!
//! The model is a grammar file for [`PatternChunker`]. It is looked up once
//! at startup: an explicit path if given, otherwise the default file name in
//! the working directory, otherwise the per-user data directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::chunker::PatternChunker;
use crate::error::ChunkerError;

/// Default model file name
pub const DEFAULT_MODEL: &str = "en-chunker.tsv";

/// Get the default base path for models
/// Returns <data dir>/corefsub/models/
pub fn default_base_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("corefsub")
        .join("models")
}

/// Get the path to a model file under a base directory
pub fn model_path(name: &str, base_path: Option<&Path>) -> PathBuf {
    let base = base_path
        .map(PathBuf::from)
        .unwrap_or_else(default_base_path);
    base.join(name)
}

/// Candidate locations, in lookup order
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => vec![PathBuf::from(DEFAULT_MODEL), model_path(DEFAULT_MODEL, None)],
    }
}

/// Find the model file
pub fn locate_model(explicit: Option<&Path>) -> Result<PathBuf, ChunkerError> {
    let candidates = candidate_paths(explicit);
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| ChunkerError::ModelNotFound(candidates[0].clone()))
}

/// Read and compile a grammar file
pub fn load_model(path: &Path) -> Result<PatternChunker, ChunkerError> {
    if !path.is_file() {
        return Err(ChunkerError::ModelNotFound(path.to_path_buf()));
    }

    let grammar = fs::read_to_string(path).map_err(|source| ChunkerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let chunker = PatternChunker::from_grammar(&grammar)?;
    info!(path = %path.display(), rules = chunker.len(), "loaded chunker model");
    Ok(chunker)
}

/// Locate and load the model in one step
pub fn load_default_model(explicit: Option<&Path>) -> Result<PatternChunker, ChunkerError> {
    let path = locate_model(explicit)?;
    load_model(&path)
}
