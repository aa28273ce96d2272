//! Pronoun substitution from coreference chains.
//!
//! Each pronoun token whose chain has more than one mention is replaced by
//! the token span of the chain's representative mention, read from the
//! unresolved sentence it lives in. Resolution is single-pass: a substituted
//! span is never itself resolved again.

use tracing::debug;

use crate::coref::{ChainTable, CorefChain};
use crate::error::ResolveError;
use crate::sentence::{Document, Sentence};
use crate::token::Token;

/// Word and tag sequences for one resolved sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSentence {
    /// Word forms after substitution
    pub tokens: Vec<String>,
    /// POS tags, parallel to `tokens`
    pub tags: Vec<String>,
    /// Number of input tokens that were substituted
    pub substitutions: usize,
}

impl ResolvedSentence {
    /// The sentence as it was given, with no substitution
    pub fn unresolved(sentence: &Sentence) -> Self {
        let mut resolved = ResolvedSentence::default();
        for token in &sentence.tokens {
            resolved.push(token);
        }
        resolved
    }

    fn push(&mut self, token: &Token) {
        self.tokens.push(token.word.clone());
        self.tags.push(token.pos.clone());
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Words joined by single spaces
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Tags joined by single spaces
    pub fn pos(&self) -> String {
        self.tags.join(" ")
    }
}

/// What to emit for one input token
#[derive(Debug, PartialEq, Eq)]
enum Resolution<'a> {
    Keep,
    Replace(&'a [Token]),
}

/// Resolve one sentence against the document's sentences and chains.
///
/// `sentences` must be the document's full, unresolved sentence list in
/// order; representative mentions are looked up in it by sentence number.
pub fn resolve_sentence(
    sentence: &Sentence,
    sentences: &[Sentence],
    chains: &ChainTable,
) -> Result<ResolvedSentence, ResolveError> {
    let mut resolved = ResolvedSentence::default();

    for token in &sentence.tokens {
        match resolve_token(token, sentences, chains)? {
            Resolution::Keep => resolved.push(token),
            Resolution::Replace(span) => {
                debug!(
                    sentence = sentence.index,
                    token = token.index,
                    pronoun = %token.word,
                    replacement = %span.iter().map(|t| t.word.as_str()).collect::<Vec<_>>().join(" "),
                    "substituted pronoun"
                );
                for replacement in span {
                    resolved.push(replacement);
                }
                resolved.substitutions += 1;
            }
        }
    }

    Ok(resolved)
}

/// Resolve every sentence of a document independently
pub fn resolve_document(doc: &Document) -> Vec<Result<ResolvedSentence, ResolveError>> {
    doc.sentences
        .iter()
        .map(|sentence| resolve_sentence(sentence, &doc.sentences, &doc.chains))
        .collect()
}

fn resolve_token<'a>(
    token: &Token,
    sentences: &'a [Sentence],
    chains: &ChainTable,
) -> Result<Resolution<'a>, ResolveError> {
    let chain = match token.cluster_id.and_then(|id| chains.get(id)) {
        Some(chain) => chain,
        None => return Ok(Resolution::Keep),
    };

    if chain.is_singleton() || !token.is_pronoun() {
        return Ok(Resolution::Keep);
    }

    let span = representative_span(chain, sentences)?;

    // Lone pronoun representatives are kept as is
    match span {
        [single] if single.is_pronoun() => Ok(Resolution::Keep),
        _ => Ok(Resolution::Replace(span)),
    }
}

/// Tokens of the chain's representative mention
fn representative_span<'a>(
    chain: &CorefChain,
    sentences: &'a [Sentence],
) -> Result<&'a [Token], ResolveError> {
    let mention = chain.representative();

    let home = mention
        .sentence
        .checked_sub(1)
        .and_then(|i| sentences.get(i))
        .ok_or(ResolveError::SentenceOutOfRange {
            chain: chain.id(),
            sentence: mention.sentence,
            available: sentences.len(),
        })?;

    if mention.start == 0 || mention.is_empty() || mention.end - 1 > home.len() {
        return Err(ResolveError::SpanOutOfRange {
            chain: chain.id(),
            sentence: mention.sentence,
            start: mention.start,
            end: mention.end,
            len: home.len(),
        });
    }

    Ok(&home.tokens[mention.token_range()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coref::Mention;

    fn make_sentence(index: usize, words: &[(&str, &str)]) -> Sentence {
        Sentence::new(
            index,
            words
                .iter()
                .enumerate()
                .map(|(i, (w, p))| Token::with_word(*w, i + 1, *p))
                .collect(),
        )
    }

    fn document(sentences: Vec<Sentence>, chains: Vec<CorefChain>) -> Document {
        Document::new(sentences, chains.into_iter().collect())
    }

    #[test]
    fn test_single_token_representative() {
        let doc = document(
            vec![
                make_sentence(1, &[("John", "NNP"), ("arrived", "VBD"), (".", ".")]),
                make_sentence(2, &[("He", "PRP"), ("left", "VBD"), (".", ".")]),
            ],
            vec![CorefChain::new(1, vec![Mention::new(2, 1, 2)], Mention::new(1, 1, 2))],
        );

        let resolved = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved.tokens, vec!["John", "left", "."]);
        assert_eq!(resolved.tags, vec!["NNP", "VBD", "."]);
        assert_eq!(resolved.substitutions, 1);
    }

    #[test]
    fn test_multi_token_representative_expands() {
        let doc = document(
            vec![
                make_sentence(
                    1,
                    &[("the", "DT"), ("new", "JJ"), ("regulations", "NNS"), ("arrived", "VBD")],
                ),
                make_sentence(2, &[("They", "PRP"), ("passed", "VBD"), (".", ".")]),
            ],
            vec![CorefChain::new(1, vec![Mention::new(2, 1, 2)], Mention::new(1, 1, 4))],
        );

        let resolved = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved.tokens, vec!["the", "new", "regulations", "passed", "."]);
        assert_eq!(resolved.tags, vec!["DT", "JJ", "NNS", "VBD", "."]);
        assert_eq!(resolved.len(), 5);
    }

    #[test]
    fn test_pronoun_representative_is_kept() {
        let doc = document(
            vec![
                make_sentence(1, &[("it", "PRP"), ("works", "VBZ")]),
                make_sentence(2, &[("it", "PRP"), ("broke", "VBD")]),
            ],
            vec![CorefChain::new(1, vec![Mention::new(2, 1, 2)], Mention::new(1, 1, 2))],
        );

        let resolved = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved.tokens, vec!["it", "broke"]);
        assert_eq!(resolved.tags, vec!["PRP", "VBD"]);
        assert_eq!(resolved.substitutions, 0);
    }

    #[test]
    fn test_non_pronoun_in_chain_passes_through() {
        let doc = document(
            vec![
                make_sentence(1, &[("Seoul", "NNP"), ("grew", "VBD")]),
                make_sentence(2, &[("The", "DT"), ("city", "NN"), ("grew", "VBD")]),
            ],
            vec![CorefChain::new(1, vec![Mention::new(2, 1, 3)], Mention::new(1, 1, 2))],
        );

        let resolved = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved, ResolvedSentence::unresolved(&doc.sentences[1]));
    }

    #[test]
    fn test_singleton_chain_passes_through() {
        let doc = document(
            vec![make_sentence(1, &[("She", "PRP"), ("smiled", "VBD")])],
            vec![CorefChain::new(1, vec![], Mention::new(1, 1, 2))],
        );

        let resolved = resolve_sentence(&doc.sentences[0], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved.tokens, vec!["She", "smiled"]);
    }

    #[test]
    fn test_singleton_chain_with_multi_token_mention_passes_through() {
        let doc = document(
            vec![make_sentence(1, &[("she", "PRP"), ("herself", "PRP"), ("won", "VBD")])],
            vec![CorefChain::new(1, vec![], Mention::new(1, 1, 3))],
        );

        let resolved = resolve_sentence(&doc.sentences[0], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved.tokens, vec!["she", "herself", "won"]);
        assert_eq!(resolved.substitutions, 0);
    }

    #[test]
    fn test_unknown_cluster_passes_through() {
        let mut sentence = make_sentence(1, &[("It", "PRP"), ("rained", "VBD")]);
        sentence.tokens[0].cluster_id = Some(99);
        let sentences = vec![sentence];

        let resolved = resolve_sentence(&sentences[0], &sentences, &ChainTable::new()).unwrap();

        assert_eq!(resolved.tokens, vec!["It", "rained"]);
    }

    #[test]
    fn test_repeated_pronouns_resolve_identically() {
        let doc = document(
            vec![
                make_sentence(1, &[("Mary", "NNP"), ("Kim", "NNP"), ("sang", "VBD")]),
                make_sentence(
                    2,
                    &[("She", "PRP"), ("said", "VBD"), ("she", "PRP"), ("left", "VBD")],
                ),
            ],
            vec![CorefChain::new(
                1,
                vec![Mention::new(2, 1, 2), Mention::new(2, 3, 4)],
                Mention::new(1, 1, 3),
            )],
        );

        let resolved = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(
            resolved.tokens,
            vec!["Mary", "Kim", "said", "Mary", "Kim", "left"]
        );
        assert_eq!(resolved.substitutions, 2);
    }

    #[test]
    fn test_representative_is_not_re_resolved() {
        // "his father" is the representative of chain 1; "his" inside it is
        // a pronoun of chain 2 but is copied verbatim.
        let doc = document(
            vec![
                make_sentence(1, &[("Tom", "NNP"), ("met", "VBD"), ("his", "PRP$"), ("father", "NN")]),
                make_sentence(2, &[("He", "PRP"), ("smiled", "VBD")]),
            ],
            vec![
                CorefChain::new(1, vec![Mention::new(2, 1, 2)], Mention::new(1, 3, 5)),
                CorefChain::new(2, vec![Mention::new(1, 3, 4)], Mention::new(1, 1, 2)),
            ],
        );

        let resolved = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        assert_eq!(resolved.tokens, vec!["his", "father", "smiled"]);
        assert_eq!(resolved.tags, vec!["PRP$", "NN", "VBD"]);
    }

    #[test]
    fn test_span_out_of_range_is_an_error() {
        let mut sentences = vec![make_sentence(1, &[("They", "PRP"), ("left", "VBD")])];
        sentences[0].tokens[0].cluster_id = Some(1);
        let chains: ChainTable = vec![CorefChain::new(
            1,
            vec![Mention::new(1, 1, 2)],
            Mention::new(1, 2, 6),
        )]
        .into_iter()
        .collect();

        let err = resolve_sentence(&sentences[0], &sentences, &chains).unwrap_err();

        assert_eq!(
            err,
            ResolveError::SpanOutOfRange {
                chain: 1,
                sentence: 1,
                start: 2,
                end: 6,
                len: 2
            }
        );
    }

    #[test]
    fn test_sentence_out_of_range_is_an_error() {
        let mut sentences = vec![make_sentence(1, &[("They", "PRP"), ("left", "VBD")])];
        sentences[0].tokens[0].cluster_id = Some(1);
        let chains: ChainTable = vec![CorefChain::new(
            1,
            vec![Mention::new(1, 1, 2)],
            Mention::new(3, 1, 2),
        )]
        .into_iter()
        .collect();

        let err = resolve_sentence(&sentences[0], &sentences, &chains).unwrap_err();

        assert!(matches!(err, ResolveError::SentenceOutOfRange { sentence: 3, available: 1, .. }));
    }

    #[test]
    fn test_resolving_resolved_output_is_a_no_op() {
        let doc = document(
            vec![
                make_sentence(1, &[("John", "NNP"), ("arrived", "VBD")]),
                make_sentence(2, &[("He", "PRP"), ("left", "VBD")]),
            ],
            vec![CorefChain::new(1, vec![Mention::new(2, 1, 2)], Mention::new(1, 1, 2))],
        );
        let first = resolve_sentence(&doc.sentences[1], &doc.sentences, &doc.chains).unwrap();

        let reannotated = Sentence::new(
            1,
            first
                .tokens
                .iter()
                .zip(&first.tags)
                .enumerate()
                .map(|(i, (w, p))| Token::with_word(w.as_str(), i + 1, p.as_str()))
                .collect(),
        );
        let sentences = vec![reannotated];
        let second = resolve_sentence(&sentences[0], &sentences, &ChainTable::new()).unwrap();

        assert_eq!(second.tokens, first.tokens);
        assert_eq!(second.tags, first.tags);
    }

    #[test]
    fn test_resolve_document_keeps_sentence_order() {
        let doc = document(
            vec![
                make_sentence(1, &[("Apple", "NNP"), ("rose", "VBD")]),
                make_sentence(2, &[("It", "PRP"), ("fell", "VBD")]),
                make_sentence(3, &[("Markets", "NNS"), ("closed", "VBD")]),
            ],
            vec![CorefChain::new(1, vec![Mention::new(2, 1, 2)], Mention::new(1, 1, 2))],
        );

        let lines: Vec<String> = resolve_document(&doc)
            .into_iter()
            .map(|r| r.unwrap().text())
            .collect();

        assert_eq!(lines, vec!["Apple rose", "Apple fell", "Markets closed"]);
    }
}
