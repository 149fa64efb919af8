//! tweetok: tokenize tweets and rebuild annotated tweet corpora.
//!
//! Usage:
//!   tweetok tokenize [--resources DIR] < tweets.txt
//!   tweetok annotate --idfile IDS --annot-file ANNOT.json --tweets TWEETS.tsv \
//!     --output OUT.conll [--edits EDITS] [--config CONFIG.json] [--resources DIR]
//!
//! Log verbosity follows `RUST_LOG` (default `warn`).

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rapid_tweet_tokenizer::annotate::{load_annotations, process_annotations, Edits};
use rapid_tweet_tokenizer::fetch::{crawl_tweets, read_ids, TsvTweetSource};
use rapid_tweet_tokenizer::{Tokenizer, TokenizerConfig};

#[derive(Parser, Debug)]
#[command(name = "tweetok", version)]
#[command(about = "Tokenize tweets and align them with stored annotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenize stdin line by line, printing space-joined tokens
    Tokenize {
        /// Directory with DOMAINS, EMOTICONS and NONBREAKING_PREFIXES
        #[arg(long)]
        resources: Option<PathBuf>,
    },

    /// Tokenize crawled tweets and write the aligned annotations
    Annotate {
        /// Whitespace-separated tweet ids
        #[arg(short, long)]
        idfile: PathBuf,

        /// Annotation JSON (tweet id -> record)
        #[arg(short, long = "annot-file")]
        annot_file: PathBuf,

        /// Tweet dump, one `id<TAB>text` per line
        #[arg(short, long)]
        tweets: PathBuf,

        /// Output file (CoNLL-style)
        #[arg(short, long)]
        output: PathBuf,

        /// Per-tweet text corrections
        #[arg(short, long)]
        edits: Option<PathBuf>,

        /// Configuration JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overrides `resources_dir` from the configuration
        #[arg(long)]
        resources: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match Cli::parse().command {
        Commands::Tokenize { resources } => {
            let config = with_resources(TokenizerConfig::default(), resources);
            config.validate()?;
            run_tokenize(&build_tokenizer(&config)?)
        }
        Commands::Annotate {
            idfile,
            annot_file,
            tweets,
            output,
            edits,
            config,
            resources,
        } => {
            let config = match config {
                Some(path) => TokenizerConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => TokenizerConfig::default(),
            };
            // Validated once, after the command-line override
            let config = with_resources(config, resources);
            config.validate()?;

            let tokenizer = build_tokenizer(&config)?;
            let ids = read_ids(&idfile)
                .with_context(|| format!("reading ids from {}", idfile.display()))?;
            let source = TsvTweetSource::from_file(&tweets)
                .with_context(|| format!("reading tweets from {}", tweets.display()))?;
            let crawled = crawl_tweets(&source, &ids, config.fetch.batch_size)?;
            let annotations = load_annotations(&annot_file)
                .with_context(|| format!("reading annotations from {}", annot_file.display()))?;
            let edits = match edits {
                Some(path) => Edits::from_file(&path)
                    .with_context(|| format!("reading edits from {}", path.display()))?,
                None => Edits::new(),
            };

            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut out = BufWriter::new(file);
            let summary =
                process_annotations(&tokenizer, &ids, &crawled, &annotations, &edits, &mut out)?;
            out.flush()?;

            eprintln!(
                "wrote {} tweets to {} ({} skipped)",
                summary.written,
                output.display(),
                summary.skipped
            );
            Ok(())
        }
    }
}

fn with_resources(config: TokenizerConfig, resources: Option<PathBuf>) -> TokenizerConfig {
    match resources {
        Some(dir) => config.with_resources_dir(dir),
        None => config,
    }
}

fn build_tokenizer(config: &TokenizerConfig) -> Result<Tokenizer> {
    Tokenizer::from_config(config).context("loading lexical resources")
}

fn run_tokenize(tokenizer: &Tokenizer) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line?;
        writeln!(out, "{}", tokenizer.tokenize(&line).join(" "))?;
    }
    out.flush()?;
    Ok(())
}
