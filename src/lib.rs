//! # corefsub-rs
//!
//! Pronoun substitution driven by coreference chains.
//!
//! Given text annotated with part-of-speech tags and coreference chains (in
//! the CoreNLP JSON format), every pronoun that belongs to a chain with more
//! than one mention is replaced by the wording of the chain's representative
//! mention. The rewritten sentences keep a parallel POS sequence and are
//! re-chunked by a shallow chunker.
//!
//! ## Quick Start
//!
//! ```rust
//! use corefsub_rs::{parse_document, DocumentProcessor, PatternChunker};
//!
//! let json = r#"{
//!   "sentences": [
//!     {"tokens": [{"index": 1, "word": "John", "pos": "NNP"},
//!                 {"index": 2, "word": "arrived", "pos": "VBD"}]},
//!     {"tokens": [{"index": 1, "word": "He", "pos": "PRP"},
//!                 {"index": 2, "word": "left", "pos": "VBD"}]}
//!   ],
//!   "corefs": {"1": [
//!     {"sentNum": 1, "startIndex": 1, "endIndex": 2, "isRepresentativeMention": true},
//!     {"sentNum": 2, "startIndex": 1, "endIndex": 2, "isRepresentativeMention": false}
//!   ]}
//! }"#;
//!
//! let doc = parse_document(json).unwrap();
//! let processor = DocumentProcessor::new(PatternChunker::english().unwrap());
//! let out = processor.process(&doc).unwrap();
//!
//! assert_eq!(out.text_lines[1], "John left");
//! assert_eq!(out.pos_lines[1], "NNP VBD");
//! assert_eq!(out.chunk_lines[1], "B-NP B-VP");
//! ```
//!
//! ## Python Bindings
//!
//! This library can be compiled as a Python extension module with the
//! `python` feature.

pub mod annotation;
pub mod batch;
pub mod chunker;
pub mod coref;
pub mod error;
pub mod model;
pub mod processor;
pub mod resolver;
pub mod sentence;
pub mod tags;
pub mod token;

// Python bindings (only compiled when the "python" feature is enabled)
#[cfg(feature = "python")]
pub mod python;

// Re-export main types for convenience
pub use annotation::{parse_document, AnnotationSource, CoreNlpJson};
#[cfg(feature = "server")]
pub use annotation::CoreNlpClient;
pub use batch::{run_batch, BatchConfig, BatchStats, OutputSinks};
pub use chunker::{Chunk, ChunkLabeler, PatternChunker};
pub use coref::{ChainTable, CorefChain, Mention};
pub use error::{AnnotationError, ChunkerError, Error, ResolveError, Result};
pub use processor::{DocumentProcessor, ProcessedDocument, SentenceFailure};
pub use resolver::{resolve_document, resolve_sentence, ResolvedSentence};
pub use sentence::{Document, Sentence};
pub use tags::{is_pronoun_tag, PRONOUN_TAGS};
pub use token::Token;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline() {
        let json = r#"{
            "sentences": [
                {"tokens": [
                    {"index": 1, "word": "The", "pos": "DT"},
                    {"index": 2, "word": "central", "pos": "JJ"},
                    {"index": 3, "word": "bank", "pos": "NN"},
                    {"index": 4, "word": "raised", "pos": "VBD"},
                    {"index": 5, "word": "rates", "pos": "NNS"},
                    {"index": 6, "word": ".", "pos": "."}
                ]},
                {"tokens": [
                    {"index": 1, "word": "It", "pos": "PRP"},
                    {"index": 2, "word": "cited", "pos": "VBD"},
                    {"index": 3, "word": "inflation", "pos": "NN"},
                    {"index": 4, "word": ".", "pos": "."}
                ]}
            ],
            "corefs": {"4": [
                {"sentNum": 1, "startIndex": 1, "endIndex": 4, "isRepresentativeMention": true},
                {"sentNum": 2, "startIndex": 1, "endIndex": 2, "isRepresentativeMention": false}
            ]}
        }"#;

        let doc = parse_document(json).unwrap();
        let processor = DocumentProcessor::new(PatternChunker::english().unwrap());
        let out = processor.process(&doc).unwrap();

        assert_eq!(out.text_lines[0], "The central bank raised rates .");
        assert_eq!(out.text_lines[1], "The central bank cited inflation .");
        assert_eq!(out.pos_lines[1], "DT JJ NN VBD NN .");
        assert_eq!(out.chunk_lines[1], "B-NP I-NP I-NP B-VP B-NP O");
        assert_eq!(out.substitutions, 1);
    }

    #[test]
    fn test_pronoun_tag_set() {
        assert!(is_pronoun_tag("PRP$"));
        assert!(!is_pronoun_tag("NNP"));
    }
}
