//! Sentences and documents.
//!
//! A Document is one annotated paragraph: its sentences in order and the
//! coreference chains that span them. Both are read-only once built.

use serde::{Deserialize, Serialize};

use crate::coref::ChainTable;
use crate::token::Token;

/// An ordered run of tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// 1-based position within the document
    pub index: usize,
    /// The tokens in this sentence
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(index: usize, tokens: Vec<Token>) -> Self {
        Sentence { index, tokens }
    }

    /// Get the words of this sentence joined by single spaces
    pub fn text(&self) -> String {
        self.words().join(" ")
    }

    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.word.as_str()).collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.pos.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// An annotated paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The sentences in this document
    pub sentences: Vec<Sentence>,
    /// Coreference chains keyed by cluster id
    pub chains: ChainTable,
}

impl Document {
    /// Build a document, stamping tokens with the ids of the chains whose
    /// mentions cover them.
    pub fn new(mut sentences: Vec<Sentence>, chains: ChainTable) -> Self {
        chains.assign_cluster_ids(&mut sentences);
        Document { sentences, chains }
    }

    /// Build a document whose tokens already carry their cluster ids
    pub fn from_parts(sentences: Vec<Sentence>, chains: ChainTable) -> Self {
        Document { sentences, chains }
    }

    /// Total token count
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}
