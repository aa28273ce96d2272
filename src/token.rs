//! Token representation for annotated text.
//!
//! A Token is one word of a sentence as delivered by the annotation source,
//! carrying its part-of-speech tag and, when it sits inside a coreference
//! mention, the id of that mention's chain.

use serde::{Deserialize, Serialize};

/// A single annotated token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The word form
    pub word: String,

    /// 1-based position within the sentence
    pub index: usize,

    /// Part-of-speech tag
    pub pos: String,

    /// Lemma (base form) of the word
    pub lemma: Option<String>,

    /// Named-entity label
    pub ner: Option<String>,

    /// Coreference chain this token belongs to
    pub cluster_id: Option<u32>,
}

impl Token {
    /// Create a new empty token
    pub fn new() -> Self {
        Token::default()
    }

    /// Create a token with word, position and tag
    pub fn with_word(word: impl Into<String>, index: usize, pos: impl Into<String>) -> Self {
        Token {
            word: word.into(),
            index,
            pos: pos.into(),
            ..Default::default()
        }
    }

    /// Set the coreference chain id
    pub fn in_cluster(mut self, cluster_id: u32) -> Self {
        self.cluster_id = Some(cluster_id);
        self
    }

    /// Check if this token's tag is in the resolution pronoun tag set
    pub fn is_pronoun(&self) -> bool {
        crate::tags::is_pronoun_tag(&self.pos)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.word, self.pos)
    }
}
