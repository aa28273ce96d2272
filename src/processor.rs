//! Per-document processing: resolve each sentence, then chunk it.
//!
//! The processor owns the chunk labeler for its whole lifetime, so the
//! labeler's model is loaded once and reused for every sentence of every
//! document.

use tracing::warn;

use crate::chunker::ChunkLabeler;
use crate::error::{ChunkerError, ResolveError};
use crate::resolver::{resolve_sentence, ResolvedSentence};
use crate::sentence::Document;

/// A sentence whose resolution failed and was emitted unresolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceFailure {
    /// 1-based sentence number
    pub sentence: usize,
    pub error: ResolveError,
}

/// Three parallel line sets, one line per sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub text_lines: Vec<String>,
    pub pos_lines: Vec<String>,
    pub chunk_lines: Vec<String>,
    /// Pronoun tokens substituted across the document
    pub substitutions: usize,
    /// Sentences that fell back to their unresolved form
    pub failures: Vec<SentenceFailure>,
}

impl ProcessedDocument {
    /// Number of sentences
    pub fn len(&self) -> usize {
        self.text_lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text_lines.is_empty()
    }
}

/// Resolves and chunks documents
pub struct DocumentProcessor<C> {
    chunker: C,
}

impl<C: ChunkLabeler> DocumentProcessor<C> {
    pub fn new(chunker: C) -> Self {
        DocumentProcessor { chunker }
    }

    pub fn chunker(&self) -> &C {
        &self.chunker
    }

    /// Process every sentence of a document in order.
    ///
    /// A sentence whose representative mention cannot be read is emitted
    /// unresolved and recorded in `failures`. Chunker errors abort the
    /// document.
    pub fn process(&self, doc: &Document) -> Result<ProcessedDocument, ChunkerError> {
        let mut out = ProcessedDocument::default();

        for sentence in &doc.sentences {
            let resolved = match resolve_sentence(sentence, &doc.sentences, &doc.chains) {
                Ok(resolved) => resolved,
                Err(error) => {
                    warn!(sentence = sentence.index, %error, "resolution failed, keeping sentence as is");
                    out.failures.push(SentenceFailure {
                        sentence: sentence.index,
                        error,
                    });
                    ResolvedSentence::unresolved(sentence)
                }
            };

            let chunks = self.chunker.label(&resolved.tokens, &resolved.tags)?;
            if chunks.len() != resolved.len() {
                return Err(ChunkerError::LabelCount {
                    expected: resolved.len(),
                    found: chunks.len(),
                });
            }

            out.substitutions += resolved.substitutions;
            out.text_lines.push(resolved.text());
            out.pos_lines.push(resolved.pos());
            out.chunk_lines.push(chunks.join(" "));
        }

        Ok(out)
    }
}
