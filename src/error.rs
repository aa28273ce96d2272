//! Error types.
//!
//! Resolution errors are scoped to a single sentence and are recovered by the
//! document processor. Everything else aborts the batch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A representative mention that cannot be read from its home sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The mention's sentence number is outside the document
    #[error("chain {chain}: representative mention points at sentence {sentence}, document has {available}")]
    SentenceOutOfRange {
        chain: u32,
        sentence: usize,
        available: usize,
    },

    /// The mention's token span is empty or outside its sentence
    #[error("chain {chain}: representative span [{start}, {end}) does not fit sentence {sentence} of {len} tokens")]
    SpanOutOfRange {
        chain: u32,
        sentence: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Errors from loading or running the chunk labeler.
#[derive(Debug, Error)]
pub enum ChunkerError {
    /// No model file at any of the searched locations
    #[error("chunker model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// The model file exists but could not be read
    #[error("failed to read chunker model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A grammar line could not be parsed
    #[error("grammar line {line}: {message}")]
    Grammar { line: usize, message: String },

    /// A grammar pattern compiled to an invalid regular expression
    #[error("grammar line {line}: invalid pattern: {source}")]
    Pattern {
        line: usize,
        #[source]
        source: regex::Error,
    },

    /// The grammar has no rules
    #[error("chunker grammar contains no rules")]
    EmptyGrammar,

    /// Word and tag sequences differ in length
    #[error("{words} words but {tags} tags")]
    LengthMismatch { words: usize, tags: usize },

    /// The labeler returned the wrong number of labels
    #[error("expected {expected} chunk labels, got {found}")]
    LabelCount { expected: usize, found: usize },
}

/// Errors from the annotation source.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// The annotation document is not valid JSON for the expected shape
    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The annotation parsed but violates a structural rule
    #[error("malformed annotation: {0}")]
    Malformed(String),

    /// The annotation server could not be reached or refused the request
    #[error("annotation server error: {0}")]
    Server(String),
}

/// Top-level error for document processing and batch runs.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Chunker(#[from] ChunkerError),

    #[error("paragraph {paragraph}: {source}")]
    Annotation {
        paragraph: usize,
        #[source]
        source: AnnotationError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for batch operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_error_display() {
        let error = ResolveError::SpanOutOfRange {
            chain: 4,
            sentence: 2,
            start: 3,
            end: 9,
            len: 5,
        };
        assert_eq!(
            error.to_string(),
            "chain 4: representative span [3, 9) does not fit sentence 2 of 5 tokens"
        );
    }

    #[test]
    fn test_model_not_found_display() {
        let error = ChunkerError::ModelNotFound(PathBuf::from("en-chunker.tsv"));
        assert_eq!(error.to_string(), "chunker model not found: en-chunker.tsv");
    }

    #[test]
    fn test_annotation_error_carries_paragraph() {
        let error = Error::Annotation {
            paragraph: 7,
            source: AnnotationError::Malformed("chain 2 has no representative mention".into()),
        };
        assert_eq!(
            error.to_string(),
            "paragraph 7: malformed annotation: chain 2 has no representative mention"
        );
    }
}
