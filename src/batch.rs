//! Batch processing of a paragraph file into three parallel output files.
//!
//! Paragraphs are annotated, resolved and chunked strictly in input order.
//! Each sentence becomes one line on each of the text, POS and chunk
//! channels.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, info_span};
use unicode_normalization::UnicodeNormalization;

use crate::annotation::AnnotationSource;
use crate::chunker::ChunkLabeler;
use crate::error::{Error, Result};
use crate::processor::{DocumentProcessor, ProcessedDocument};

/// Settings for one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Newline-delimited paragraph file
    pub input: PathBuf,
    /// Outputs go to `<prefix>-text.txt`, `<prefix>-pos.txt`, `<prefix>-chunk.txt`
    pub output_prefix: PathBuf,
    /// Write an empty line on every channel after each paragraph
    pub paragraph_breaks: bool,
}

impl BatchConfig {
    pub fn new(input: impl Into<PathBuf>, output_prefix: impl Into<PathBuf>) -> Self {
        BatchConfig {
            input: input.into(),
            output_prefix: output_prefix.into(),
            paragraph_breaks: false,
        }
    }

    pub fn with_paragraph_breaks(mut self, enabled: bool) -> Self {
        self.paragraph_breaks = enabled;
        self
    }

    /// Paths of the text, POS and chunk outputs
    pub fn output_paths(&self) -> [PathBuf; 3] {
        ["-text.txt", "-pos.txt", "-chunk.txt"].map(|suffix| {
            let mut name = OsString::from(self.output_prefix.as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        })
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub paragraphs: usize,
    /// Blank input lines, counted in `paragraphs` but not annotated
    pub blank_paragraphs: usize,
    pub sentences: usize,
    pub substitutions: usize,
    /// Sentences written unresolved after a resolution error
    pub failed_sentences: usize,
}

/// Read the input file, one NFC-normalized paragraph per line
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content.lines().map(|line| line.nfc().collect()).collect())
}

/// One append-only output channel
struct Channel<W> {
    path: PathBuf,
    writer: W,
}

impl<W: Write> Channel<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}").map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// The text, POS and chunk output channels
pub struct OutputSinks<W> {
    text: Channel<W>,
    pos: Channel<W>,
    chunk: Channel<W>,
}

impl OutputSinks<BufWriter<File>> {
    /// Create (truncating) the three output files
    pub fn create(config: &BatchConfig) -> Result<Self> {
        let [text, pos, chunk] = config.output_paths();
        Ok(OutputSinks {
            text: open_channel(text)?,
            pos: open_channel(pos)?,
            chunk: open_channel(chunk)?,
        })
    }
}

fn open_channel(path: PathBuf) -> Result<Channel<BufWriter<File>>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;

    Ok(Channel {
        path,
        writer: BufWriter::new(file),
    })
}

impl<W: Write> OutputSinks<W> {
    /// Wrap arbitrary writers
    pub fn from_writers(text: W, pos: W, chunk: W) -> Self {
        OutputSinks {
            text: Channel {
                path: PathBuf::from("text"),
                writer: text,
            },
            pos: Channel {
                path: PathBuf::from("pos"),
                writer: pos,
            },
            chunk: Channel {
                path: PathBuf::from("chunk"),
                writer: chunk,
            },
        }
    }

    /// Append one line per sentence to each channel
    pub fn write_document(&mut self, doc: &ProcessedDocument) -> Result<()> {
        for line in &doc.text_lines {
            self.text.write_line(line)?;
        }
        for line in &doc.pos_lines {
            self.pos.write_line(line)?;
        }
        for line in &doc.chunk_lines {
            self.chunk.write_line(line)?;
        }
        Ok(())
    }

    /// Append an empty line to each channel
    pub fn write_break(&mut self) -> Result<()> {
        self.text.write_line("")?;
        self.pos.write_line("")?;
        self.chunk.write_line("")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.text.flush()?;
        self.pos.flush()?;
        self.chunk.flush()
    }

    /// Recover the text, POS and chunk writers
    pub fn into_writers(self) -> (W, W, W) {
        (self.text.writer, self.pos.writer, self.chunk.writer)
    }
}

/// Process paragraphs in order, writing each one's lines before moving on.
///
/// `progress` is called with `(done, total)` after every paragraph.
pub fn run_batch<A, C, W, F>(
    paragraphs: &[String],
    source: &A,
    processor: &DocumentProcessor<C>,
    sinks: &mut OutputSinks<W>,
    paragraph_breaks: bool,
    mut progress: F,
) -> Result<BatchStats>
where
    A: AnnotationSource + ?Sized,
    C: ChunkLabeler,
    W: Write,
    F: FnMut(usize, usize),
{
    let total = paragraphs.len();
    let mut stats = BatchStats::default();

    for (i, paragraph) in paragraphs.iter().enumerate() {
        let _span = info_span!("paragraph", number = i + 1).entered();
        stats.paragraphs += 1;

        if paragraph.trim().is_empty() {
            stats.blank_paragraphs += 1;
        } else {
            let doc = source.annotate(paragraph).map_err(|source| Error::Annotation {
                paragraph: i + 1,
                source,
            })?;
            let processed = processor.process(&doc)?;

            stats.sentences += processed.len();
            stats.substitutions += processed.substitutions;
            stats.failed_sentences += processed.failures.len();

            sinks.write_document(&processed)?;
        }

        if paragraph_breaks {
            sinks.write_break()?;
        }

        info!("progress: {} / {}", i + 1, total);
        progress(i + 1, total);
    }

    sinks.flush()?;
    Ok(stats)
}

/// Read the input, create the outputs, and run the whole batch
pub fn run<A, C, F>(
    config: &BatchConfig,
    source: &A,
    processor: &DocumentProcessor<C>,
    progress: F,
) -> Result<BatchStats>
where
    A: AnnotationSource + ?Sized,
    C: ChunkLabeler,
    F: FnMut(usize, usize),
{
    // Input is read before any output file is touched
    let paragraphs = read_paragraphs(&config.input)?;
    info!(path = %config.input.display(), paragraphs = paragraphs.len(), "read input");

    let mut sinks = OutputSinks::create(config)?;
    run_batch(
        &paragraphs,
        source,
        processor,
        &mut sinks,
        config.paragraph_breaks,
        progress,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::CoreNlpJson;
    use crate::chunker::PatternChunker;
    use crate::error::AnnotationError;
    use crate::sentence::Document;

    const SIMPLE: &str = r#"{"sentences": [{"tokens": [
        {"index": 1, "word": "Prices", "pos": "NNS"},
        {"index": 2, "word": "rose", "pos": "VBD"}
    ]}]}"#;

    struct FailingSource;

    impl AnnotationSource for FailingSource {
        fn annotate(&self, _text: &str) -> std::result::Result<Document, AnnotationError> {
            Err(AnnotationError::Server("connection refused".to_string()))
        }
    }

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_output_paths() {
        let config = BatchConfig::new("in.txt", "out/economy-coref");
        let [text, pos, chunk] = config.output_paths();
        assert_eq!(text, PathBuf::from("out/economy-coref-text.txt"));
        assert_eq!(pos, PathBuf::from("out/economy-coref-pos.txt"));
        assert_eq!(chunk, PathBuf::from("out/economy-coref-chunk.txt"));
    }

    #[test]
    fn test_run_batch_writes_all_channels() {
        let processor = DocumentProcessor::new(PatternChunker::english().unwrap());
        let mut sinks = OutputSinks::from_writers(Vec::new(), Vec::new(), Vec::new());
        let paragraphs = vec![SIMPLE.to_string(), String::new(), SIMPLE.to_string()];
        let mut calls = Vec::new();

        let stats = run_batch(&paragraphs, &CoreNlpJson, &processor, &mut sinks, false, |done, total| {
            calls.push((done, total))
        })
        .unwrap();

        assert_eq!(stats.paragraphs, 3);
        assert_eq!(stats.blank_paragraphs, 1);
        assert_eq!(stats.sentences, 2);
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);

        let (text, pos, chunk) = sinks.into_writers();
        assert_eq!(lines(text), vec!["Prices rose", "Prices rose"]);
        assert_eq!(lines(pos), vec!["NNS VBD", "NNS VBD"]);
        assert_eq!(lines(chunk), vec!["B-NP B-VP", "B-NP B-VP"]);
    }

    #[test]
    fn test_paragraph_breaks() {
        let processor = DocumentProcessor::new(PatternChunker::english().unwrap());
        let mut sinks = OutputSinks::from_writers(Vec::new(), Vec::new(), Vec::new());
        let paragraphs = vec![SIMPLE.to_string(), SIMPLE.to_string()];

        run_batch(&paragraphs, &CoreNlpJson, &processor, &mut sinks, true, |_, _| {}).unwrap();

        let (text, _, _) = sinks.into_writers();
        assert_eq!(lines(text), vec!["Prices rose", "", "Prices rose", ""]);
    }

    #[test]
    fn test_annotation_failure_is_fatal() {
        let processor = DocumentProcessor::new(PatternChunker::english().unwrap());
        let mut sinks = OutputSinks::from_writers(Vec::new(), Vec::new(), Vec::new());
        let paragraphs = vec!["The economy grew.".to_string()];

        let err = run_batch(&paragraphs, &FailingSource, &processor, &mut sinks, false, |_, _| {})
            .unwrap_err();

        assert!(matches!(err, Error::Annotation { paragraph: 1, .. }));
    }

    #[test]
    fn test_missing_input_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(dir.path().join("missing.txt"), dir.path().join("out"));
        let processor = DocumentProcessor::new(PatternChunker::english().unwrap());

        let err = run(&config, &CoreNlpJson, &processor, |_, _| {}).unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        for path in config.output_paths() {
            assert!(!path.exists());
        }
    }
}
