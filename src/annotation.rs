//! Annotation sources.
//!
//! Tokenization, tagging, parsing and coreference are done by an external
//! annotator. This module reads its output in the CoreNLP JSON format, either
//! from pre-annotated text or from a running CoreNLP server.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::coref::{ChainTable, CorefChain, Mention};
use crate::error::AnnotationError;
use crate::sentence::{Document, Sentence};
use crate::token::Token;

/// Turns one paragraph into an annotated document
pub trait AnnotationSource {
    fn annotate(&self, text: &str) -> Result<Document, AnnotationError>;
}

impl<T: AnnotationSource + ?Sized> AnnotationSource for &T {
    fn annotate(&self, text: &str) -> Result<Document, AnnotationError> {
        (**self).annotate(text)
    }
}

impl<T: AnnotationSource + ?Sized> AnnotationSource for Box<T> {
    fn annotate(&self, text: &str) -> Result<Document, AnnotationError> {
        (**self).annotate(text)
    }
}

#[derive(Debug, Deserialize)]
struct CoreNlpDocument {
    #[serde(default)]
    sentences: Vec<CoreNlpSentence>,
    #[serde(default)]
    corefs: BTreeMap<u32, Vec<CoreNlpMention>>,
}

#[derive(Debug, Deserialize)]
struct CoreNlpSentence {
    #[serde(default)]
    tokens: Vec<CoreNlpToken>,
}

#[derive(Debug, Deserialize)]
struct CoreNlpToken {
    index: usize,
    word: String,
    pos: String,
    #[serde(default)]
    lemma: Option<String>,
    #[serde(default)]
    ner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreNlpMention {
    sent_num: usize,
    start_index: usize,
    end_index: usize,
    #[serde(default)]
    is_representative_mention: bool,
}

impl CoreNlpDocument {
    fn into_document(self) -> Result<Document, AnnotationError> {
        let sentences: Vec<Sentence> = self
            .sentences
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let tokens = s
                    .tokens
                    .into_iter()
                    .map(|t| Token {
                        word: t.word,
                        index: t.index,
                        pos: t.pos,
                        lemma: t.lemma,
                        ner: t.ner,
                        cluster_id: None,
                    })
                    .collect();
                Sentence::new(i + 1, tokens)
            })
            .collect();

        let mut chains = ChainTable::new();
        for (id, mentions) in self.corefs {
            let representative = mentions
                .iter()
                .find(|m| m.is_representative_mention)
                .map(|m| Mention::new(m.sent_num, m.start_index, m.end_index))
                .ok_or_else(|| {
                    AnnotationError::Malformed(format!("chain {id} has no representative mention"))
                })?;

            let mentions = mentions
                .iter()
                .map(|m| Mention::new(m.sent_num, m.start_index, m.end_index))
                .collect();

            chains.insert(CorefChain::new(id, mentions, representative));
        }

        debug!(
            sentences = sentences.len(),
            chains = chains.len(),
            "parsed annotation"
        );

        Ok(Document::new(sentences, chains))
    }
}

/// Parse a CoreNLP JSON document
pub fn parse_document(json: &str) -> Result<Document, AnnotationError> {
    let raw: CoreNlpDocument = serde_json::from_str(json)?;
    raw.into_document()
}

/// Source whose input text is already a CoreNLP JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreNlpJson;

impl AnnotationSource for CoreNlpJson {
    fn annotate(&self, text: &str) -> Result<Document, AnnotationError> {
        parse_document(text)
    }
}

/// Default CoreNLP server address
pub const DEFAULT_SERVER_URL: &str = "http://localhost:9000";

#[cfg(feature = "server")]
pub use server::CoreNlpClient;

#[cfg(feature = "server")]
mod server {
    use std::time::Duration;

    use tracing::debug;

    use super::{parse_document, AnnotationSource};
    use crate::error::AnnotationError;
    use crate::sentence::Document;

    /// Annotator chain requested from the server
    const PROPERTIES: &str = r#"{"annotators":"tokenize,ssplit,pos,lemma,ner,parse,coref","coref.algorithm":"neural","outputFormat":"json"}"#;

    /// Client for a CoreNLP server
    pub struct CoreNlpClient {
        url: String,
        client: reqwest::blocking::Client,
    }

    impl CoreNlpClient {
        pub fn new(url: impl Into<String>) -> Result<Self, AnnotationError> {
            // Parsing with coref is slow on long paragraphs
            let client = reqwest::blocking::Client::builder()
                .user_agent(concat!("corefsub-rs/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(300))
                .build()
                .map_err(|e| AnnotationError::Server(e.to_string()))?;

            Ok(CoreNlpClient {
                url: url.into(),
                client,
            })
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl AnnotationSource for CoreNlpClient {
        fn annotate(&self, text: &str) -> Result<Document, AnnotationError> {
            debug!(url = %self.url, bytes = text.len(), "requesting annotation");

            let response = self
                .client
                .post(&self.url)
                .query(&[("properties", PROPERTIES)])
                .body(text.to_string())
                .send()
                .map_err(|e| AnnotationError::Server(e.to_string()))?;

            if !response.status().is_success() {
                return Err(AnnotationError::Server(format!(
                    "CoreNLP returned status: {}",
                    response.status()
                )));
            }

            let body = response
                .text()
                .map_err(|e| AnnotationError::Server(e.to_string()))?;

            parse_document(&body)
        }
    }
}
