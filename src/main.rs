//! Command-line interface for corefsub-rs
//!
//! Usage:
//!   corefsub [OPTIONS] <INPUT> <OUTPUT_PREFIX>
//!
//! Reads one paragraph per line, resolves pronouns against their coreference
//! chains and writes `<OUTPUT_PREFIX>-text.txt`, `-pos.txt` and `-chunk.txt`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use corefsub_rs::annotation::{AnnotationSource, CoreNlpJson};
use corefsub_rs::{batch, model, BatchConfig, DocumentProcessor};

#[derive(Parser, Debug)]
#[command(name = "corefsub")]
#[command(about = "Replace pronouns with their coreferent mentions and re-chunk the result")]
#[command(version)]
struct Args {
    /// Input file, one paragraph per line
    input: PathBuf,

    /// Output path prefix
    output_prefix: PathBuf,

    /// Chunker grammar file
    #[arg(long, value_name = "PATH")]
    chunker_model: Option<PathBuf>,

    /// Input lines are CoreNLP JSON documents; no server is contacted
    #[arg(long)]
    annotated: bool,

    /// CoreNLP server address
    #[arg(long, env = "COREFSUB_CORENLP_URL", default_value = corefsub_rs::annotation::DEFAULT_SERVER_URL)]
    corenlp_url: String,

    /// Write an empty line on every output after each paragraph
    #[arg(long)]
    paragraph_breaks: bool,

    /// Suppress the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn annotation_source(args: &Args) -> Result<Box<dyn AnnotationSource>> {
    if args.annotated {
        Ok(Box::new(CoreNlpJson))
    } else {
        server_source(&args.corenlp_url)
    }
}

#[cfg(feature = "server")]
fn server_source(url: &str) -> Result<Box<dyn AnnotationSource>> {
    let client = corefsub_rs::CoreNlpClient::new(url).context("failed to build CoreNLP client")?;
    info!(url = %client.url(), "using CoreNLP server");
    Ok(Box::new(client))
}

#[cfg(not(feature = "server"))]
fn server_source(_url: &str) -> Result<Box<dyn AnnotationSource>> {
    anyhow::bail!("built without the `server` feature; pass --annotated with CoreNLP JSON input")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    info!(?args, "Parsed CLI arguments");

    if !args.input.is_file() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    // Loaded once for the whole run
    let chunker = model::load_default_model(args.chunker_model.as_deref())
        .context("failed to load chunker model")?;
    let processor = DocumentProcessor::new(chunker);
    let source = annotation_source(&args)?;

    let config = BatchConfig::new(&args.input, &args.output_prefix)
        .with_paragraph_breaks(args.paragraph_breaks);

    let bar = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} paragraphs ({elapsed})")
                .context("invalid progress template")?,
        );
        bar
    };

    let stats = batch::run(&config, source.as_ref(), &processor, |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    })
    .with_context(|| format!("batch failed for {}", args.input.display()))?;
    bar.finish_and_clear();

    if stats.failed_sentences > 0 {
        warn!(count = stats.failed_sentences, "sentences written unresolved");
    }

    let [text, pos, chunk] = config.output_paths();
    println!("Processed {} paragraphs, {} sentences", stats.paragraphs, stats.sentences);
    println!("  Substituted pronouns: {}", stats.substitutions);
    println!("  Text:   {}", text.display());
    println!("  POS:    {}", pos.display());
    println!("  Chunks: {}", chunk.display());

    Ok(())
}
