//! Python bindings for corefsub-rs using PyO3
//!
//! Exposes the resolver and chunker over CoreNLP JSON input.

use std::path::Path;

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::annotation::parse_document;
use crate::chunker::PatternChunker;
use crate::error::{AnnotationError, ChunkerError};
use crate::model;
use crate::processor::DocumentProcessor;
use crate::resolver::resolve_sentence;

fn annotation_err(e: AnnotationError) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

fn chunker_err(e: ChunkerError) -> PyErr {
    match e {
        ChunkerError::ModelNotFound(_) | ChunkerError::Io { .. } => {
            PyErr::new::<PyIOError, _>(e.to_string())
        }
        _ => PyErr::new::<PyRuntimeError, _>(e.to_string()),
    }
}

/// Pronoun resolver with a loaded chunker model
///
/// Example:
///     >>> from corefsub_rs import Resolver
///     >>> r = Resolver()
///     >>> text, pos, chunks = r.process_json(corenlp_json)
#[pyclass(name = "Resolver")]
pub struct PyResolver {
    processor: DocumentProcessor<PatternChunker>,
}

#[pymethods]
impl PyResolver {
    /// Create a resolver.
    ///
    /// Args:
    ///     model_path: Chunker grammar file. When omitted the model is looked
    ///         up in the working directory, then the user data directory,
    ///         and finally the bundled English grammar is used.
    #[new]
    #[pyo3(signature = (model_path=None))]
    fn new(model_path: Option<&str>) -> PyResult<Self> {
        let chunker = match model_path {
            Some(path) => model::load_model(Path::new(path)).map_err(chunker_err)?,
            None => match model::load_default_model(None) {
                Ok(chunker) => chunker,
                Err(ChunkerError::ModelNotFound(_)) => {
                    PatternChunker::english().map_err(chunker_err)?
                }
                Err(e) => return Err(chunker_err(e)),
            },
        };

        Ok(PyResolver {
            processor: DocumentProcessor::new(chunker),
        })
    }

    /// Resolve and chunk one CoreNLP JSON document.
    ///
    /// Returns:
    ///     (text_lines, pos_lines, chunk_lines), one entry per sentence
    fn process_json(&self, json: &str) -> PyResult<(Vec<String>, Vec<String>, Vec<String>)> {
        let doc = parse_document(json).map_err(annotation_err)?;
        let out = self.processor.process(&doc).map_err(chunker_err)?;
        Ok((out.text_lines, out.pos_lines, out.chunk_lines))
    }

    /// Number of chunk rules in the loaded grammar
    fn __len__(&self) -> usize {
        self.processor.chunker().len()
    }

    fn __repr__(&self) -> String {
        format!("Resolver(rules={})", self.processor.chunker().len())
    }
}

/// Resolve a single sentence of a CoreNLP JSON document
///
/// Args:
///     json: CoreNLP JSON document
///     sentence: 1-based sentence number
///
/// Returns:
///     (tokens, tags) after substitution
#[pyfunction]
fn resolve_sentence_json(json: &str, sentence: usize) -> PyResult<(Vec<String>, Vec<String>)> {
    let doc = parse_document(json).map_err(annotation_err)?;

    let target = sentence
        .checked_sub(1)
        .and_then(|i| doc.sentences.get(i))
        .ok_or_else(|| {
            PyErr::new::<PyValueError, _>(format!(
                "sentence {} out of range (document has {})",
                sentence,
                doc.sentences.len()
            ))
        })?;

    let resolved = resolve_sentence(target, &doc.sentences, &doc.chains)
        .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;
    Ok((resolved.tokens, resolved.tags))
}

/// Create the Python module
#[pymodule]
fn corefsub_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyResolver>()?;
    m.add_function(wrap_pyfunction!(resolve_sentence_json, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
