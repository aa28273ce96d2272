//! Coreference chains and the per-document chain table.
//!
//! Mentions are coordinates into sentences: a 1-based sentence number and a
//! 1-based, end-exclusive token span. They never own tokens.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::sentence::Sentence;

/// A contiguous token span `[start, end)` inside one sentence.
///
/// Field order gives the derived ordering textual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mention {
    /// 1-based sentence number
    pub sentence: usize,
    /// 1-based index of the first token
    pub start: usize,
    /// 1-based index one past the last token
    pub end: usize,
}

impl Mention {
    pub fn new(sentence: usize, start: usize, end: usize) -> Self {
        Mention {
            sentence,
            start,
            end,
        }
    }

    /// Number of tokens covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The 0-based token range this mention covers in its sentence
    pub fn token_range(&self) -> std::ops::Range<usize> {
        self.start.saturating_sub(1)..self.end.saturating_sub(1)
    }
}

/// Mentions of one entity, with one of them designated representative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefChain {
    id: u32,
    mentions: Vec<Mention>,
    representative: usize,
}

impl CorefChain {
    /// Build a chain from its mentions and its representative mention.
    ///
    /// Mentions are kept in textual order with duplicates removed. The
    /// representative is added to the mention list if it is not already in it.
    pub fn new(id: u32, mut mentions: Vec<Mention>, representative: Mention) -> Self {
        mentions.push(representative);
        mentions.sort();
        mentions.dedup();

        let representative = mentions
            .binary_search(&representative)
            .unwrap_or_default();

        CorefChain {
            id,
            mentions,
            representative,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Mentions in textual order
    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    /// The canonical wording for the entity
    pub fn representative(&self) -> &Mention {
        &self.mentions[self.representative]
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// A chain with a single mention has nothing to substitute
    pub fn is_singleton(&self) -> bool {
        self.mentions.len() == 1
    }
}

/// Chains of one document, keyed by cluster id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTable {
    chains: BTreeMap<u32, CorefChain>,
}

impl ChainTable {
    pub fn new() -> Self {
        ChainTable::default()
    }

    /// Add a chain, replacing any chain with the same id
    pub fn insert(&mut self, chain: CorefChain) -> Option<CorefChain> {
        self.chains.insert(chain.id, chain)
    }

    pub fn get(&self, cluster_id: u32) -> Option<&CorefChain> {
        self.chains.get(&cluster_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Chains in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &CorefChain> {
        self.chains.values()
    }

    /// Stamp every token covered by a mention with its chain's id.
    ///
    /// Longer mentions are stamped first, so where spans overlap each token
    /// ends up with the id of the innermost mention covering it. Ties go to
    /// the higher chain id. Mentions that do not fit their sentence are
    /// skipped; the count of skipped mentions is returned.
    pub fn assign_cluster_ids(&self, sentences: &mut [Sentence]) -> usize {
        let mut skipped = 0;
        let mut stamps: Vec<(Mention, u32)> = Vec::new();

        for chain in self.iter() {
            for mention in chain.mentions() {
                let len = match mention.sentence.checked_sub(1).and_then(|i| sentences.get(i)) {
                    Some(sentence) => sentence.tokens.len(),
                    None => {
                        warn!(chain = chain.id, sentence = mention.sentence, "mention outside document");
                        skipped += 1;
                        continue;
                    }
                };

                if mention.start == 0 || mention.is_empty() || mention.end - 1 > len {
                    warn!(
                        chain = chain.id,
                        sentence = mention.sentence,
                        start = mention.start,
                        end = mention.end,
                        "mention span outside sentence"
                    );
                    skipped += 1;
                    continue;
                }

                stamps.push((*mention, chain.id));
            }
        }

        // Stable sort keeps ascending chain order among equal lengths
        stamps.sort_by_key(|(mention, _)| std::cmp::Reverse(mention.len()));

        for (mention, id) in stamps {
            if let Some(sentence) = sentences.get_mut(mention.sentence - 1) {
                for token in &mut sentence.tokens[mention.token_range()] {
                    token.cluster_id = Some(id);
                }
            }
        }

        skipped
    }
}

impl FromIterator<CorefChain> for ChainTable {
    fn from_iter<I: IntoIterator<Item = CorefChain>>(iter: I) -> Self {
        let mut table = ChainTable::new();
        for chain in iter {
            table.insert(chain);
        }
        table
    }
}
