//! Shallow chunking over part-of-speech tags.
//!
//! The chunk labeler is a seam: anything that maps parallel word and tag
//! sequences to parallel IOB chunk labels can be plugged into the document
//! processor. [`PatternChunker`] is a cascade of regular expressions over
//! the tag sequence, loaded from a grammar resource.

use regex::Regex;

use crate::error::ChunkerError;

/// Grammar embedded in the crate, identical to `models/en-chunker.tsv`
pub static ENGLISH_GRAMMAR: &str = include_str!("data/en-chunker.tsv");

/// Label for tokens outside every chunk
pub const OUTSIDE: &str = "O";

/// Assigns phrase-boundary labels to a tagged token sequence
pub trait ChunkLabeler {
    /// Label each token; the result has one label per word.
    fn label(&self, words: &[String], tags: &[String]) -> Result<Vec<String>, ChunkerError>;
}

impl<T: ChunkLabeler + ?Sized> ChunkLabeler for &T {
    fn label(&self, words: &[String], tags: &[String]) -> Result<Vec<String>, ChunkerError> {
        (**self).label(words, tags)
    }
}

impl<T: ChunkLabeler + ?Sized> ChunkLabeler for Box<T> {
    fn label(&self, words: &[String], tags: &[String]) -> Result<Vec<String>, ChunkerError> {
        (**self).label(words, tags)
    }
}

/// A labelled token span `[start, end)`, 0-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Phrase label such as `NP`
    pub label: String,
    /// Index of the first token
    pub start: usize,
    /// Index one past the last token
    pub end: usize,
}

impl Chunk {
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        Chunk {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One compiled grammar rule
#[derive(Debug, Clone)]
struct Rule {
    label: String,
    regex: Regex,
}

/// Regular-expression cascade chunker
#[derive(Debug, Clone)]
pub struct PatternChunker {
    rules: Vec<Rule>,
}

impl PatternChunker {
    /// Compile a grammar (`LABEL<TAB>PATTERN` per line)
    pub fn from_grammar(grammar: &str) -> Result<Self, ChunkerError> {
        let mut rules = Vec::new();

        for (i, line) in grammar.lines().enumerate() {
            let line_no = i + 1;

            // Skip comments and empty lines
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (label, pattern) = line
                .split_once('\t')
                .map(|(l, p)| (l.trim(), p.trim()))
                .ok_or_else(|| ChunkerError::Grammar {
                    line: line_no,
                    message: "expected LABEL<TAB>PATTERN".to_string(),
                })?;

            if label.is_empty() || pattern.is_empty() {
                return Err(ChunkerError::Grammar {
                    line: line_no,
                    message: "empty label or pattern".to_string(),
                });
            }

            let source = translate_pattern(pattern).map_err(|message| ChunkerError::Grammar {
                line: line_no,
                message,
            })?;
            let regex = Regex::new(&source).map_err(|source| ChunkerError::Pattern {
                line: line_no,
                source,
            })?;

            rules.push(Rule {
                label: label.to_string(),
                regex,
            });
        }

        if rules.is_empty() {
            return Err(ChunkerError::EmptyGrammar);
        }

        Ok(PatternChunker { rules })
    }

    /// The embedded English grammar
    pub fn english() -> Result<Self, ChunkerError> {
        Self::from_grammar(ENGLISH_GRAMMAR)
    }

    /// Number of rules in the cascade
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find chunk spans for a tag sequence, ordered by start
    pub fn chunks<S: AsRef<str>>(&self, tags: &[S]) -> Vec<Chunk> {
        let mut claimed: Vec<bool> = vec![false; tags.len()];
        let mut chunks = Vec::new();

        for rule in &self.rules {
            let mut i = 0;
            while i < tags.len() {
                if claimed[i] {
                    i += 1;
                    continue;
                }

                // Maximal run of unclaimed tokens
                let run_start = i;
                while i < tags.len() && !claimed[i] {
                    i += 1;
                }

                for (start, end) in match_run(&rule.regex, &tags[run_start..i]) {
                    let (start, end) = (run_start + start, run_start + end);
                    claimed[start..end].iter_mut().for_each(|c| *c = true);
                    chunks.push(Chunk::new(rule.label.as_str(), start, end));
                }
            }
        }

        chunks.sort_by_key(|c| c.start);
        chunks
    }
}

impl ChunkLabeler for PatternChunker {
    fn label(&self, words: &[String], tags: &[String]) -> Result<Vec<String>, ChunkerError> {
        if words.len() != tags.len() {
            return Err(ChunkerError::LengthMismatch {
                words: words.len(),
                tags: tags.len(),
            });
        }

        let mut labels = vec![OUTSIDE.to_string(); tags.len()];
        for chunk in self.chunks(tags) {
            labels[chunk.start] = format!("B-{}", chunk.label);
            for label in &mut labels[chunk.start + 1..chunk.end] {
                *label = format!("I-{}", chunk.label);
            }
        }

        Ok(labels)
    }
}

/// Non-empty matches of a rule over a run of tags, as token index pairs
fn match_run<S: AsRef<str>>(regex: &Regex, tags: &[S]) -> Vec<(usize, usize)> {
    // Encode as "<DT><JJ><NN>", remembering where each tag starts
    let mut encoded = String::new();
    let mut offsets = Vec::with_capacity(tags.len() + 1);
    for tag in tags {
        offsets.push(encoded.len());
        encoded.push('<');
        encoded.push_str(tag.as_ref());
        encoded.push('>');
    }
    offsets.push(encoded.len());

    regex
        .find_iter(&encoded)
        .filter_map(|m| {
            let start = offsets.binary_search(&m.start()).ok()?;
            let end = offsets.binary_search(&m.end()).ok()?;
            (end > start).then_some((start, end))
        })
        .collect()
}

/// Turn a tag pattern into a regular expression over encoded tag strings.
///
/// Inside `<...>`, `.` matches any character of one tag and a bare `$` is
/// literal (as in `PRP$`). Both are literal inside a `[...]` class, and a
/// negated class never matches `<` or `>`. Whitespace outside atoms is
/// ignored.
fn translate_pattern(pattern: &str) -> Result<String, String> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut atom = String::new();
                let mut closed = false;
                let mut in_class = false;
                while let Some(c) = chars.next() {
                    match c {
                        '>' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            atom.push('\\');
                            match chars.next() {
                                Some(escaped) => atom.push(escaped),
                                None => return Err("dangling escape".to_string()),
                            }
                        }
                        '<' => return Err("nested '<'".to_string()),
                        '[' if !in_class => {
                            in_class = true;
                            atom.push('[');
                            // A negated class must not match tag delimiters
                            if chars.clone().next() == Some('^') {
                                chars.next();
                                atom.push_str("^<>");
                            }
                        }
                        ']' if in_class => {
                            in_class = false;
                            atom.push(']');
                        }
                        // Literal inside a character class
                        '.' | '$' if in_class => atom.push(c),
                        '.' => atom.push_str("[^<>]"),
                        '$' => atom.push_str("\\$"),
                        _ => atom.push(c),
                    }
                }
                if !closed {
                    return Err("unclosed '<'".to_string());
                }
                if in_class {
                    return Err("unclosed '['".to_string());
                }
                if atom.is_empty() {
                    return Err("empty tag atom".to_string());
                }
                out.push_str("(?:<(?:");
                out.push_str(&atom);
                out.push_str(")>)");
            }
            '>' => return Err("unmatched '>'".to_string()),
            c if c.is_whitespace() => {}
            _ => out.push(c),
        }
    }

    Ok(out)
}
