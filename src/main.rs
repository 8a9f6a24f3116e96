use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use atomfeed::config::Config;
use atomfeed::feed::{FeedBuilder, MetadataOverrides, SummaryMode, DEFAULT_SUMMARY_WORDS};
use atomfeed::output::write_atomic;
use atomfeed::store::{DirectoryStore, RecordFilter};

#[derive(Parser, Debug)]
#[command(name = "atomfeed", about = "Generate an Atom feed from a markdown content directory")]
struct Args {
    /// Content items to include, in feed order. Defaults to the newest items.
    #[arg(value_name = "ID")]
    ids: Vec<String>,

    /// Configuration file
    #[arg(long, value_name = "FILE", default_value = "atomfeed.toml")]
    config: PathBuf,

    /// Content directory (overrides `content_dir`)
    #[arg(long, value_name = "DIR")]
    content: Option<PathBuf>,

    /// Output file (overrides `output`); stdout when neither is set
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Feed title (overrides the site title)
    #[arg(long)]
    title: Option<String>,

    /// Feed subtitle (overrides the site subtitle)
    #[arg(long)]
    subtitle: Option<String>,

    /// Feed author (overrides the newest item's creator)
    #[arg(long)]
    author: Option<String>,

    /// Feed document path below the feed server (overrides `feed_path`)
    #[arg(long, value_name = "PATH")]
    feed_path: Option<String>,

    /// Number of newest items to include when no IDs are given
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Summarize entries without a summary with their first N words
    /// (`--summary-words=N`; 20 when given bare)
    #[arg(long, value_name = "N", num_args = 0..=1, require_equals = true)]
    summary_words: Option<Option<usize>>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout may carry the feed itself
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
    config.validate()?;

    let content_dir = args.content.clone().unwrap_or_else(|| config.content_dir.clone());
    let store = DirectoryStore::load(&content_dir)
        .with_context(|| format!("Failed to load content from {}", content_dir.display()))?;

    let overrides = MetadataOverrides {
        title: args.title,
        subtitle: args.subtitle,
        author: args.author,
        feed_path: args.feed_path.or(config.overrides().feed_path),
    };
    let summary_mode = match args.summary_words {
        Some(words) => SummaryMode::TruncateWords(words.unwrap_or(DEFAULT_SUMMARY_WORDS)),
        None => config.summary_mode(),
    };

    let site = config.site();
    let builder = FeedBuilder::new(&store, &site).summary_mode(summary_mode);
    let xml = if args.ids.is_empty() {
        let limit = args.limit.unwrap_or(config.max_entries);
        builder.build_latest(&RecordFilter::feed_default(limit), &overrides)
    } else {
        builder.build(args.ids.as_slice(), &overrides)
    }
    .context("Failed to generate feed")?;

    match args.output.or(config.output) {
        Some(path) => write_atomic(&path, &xml)
            .with_context(|| format!("Failed to write feed to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(xml.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("Failed to write feed to stdout")?;
        }
    }

    Ok(())
}
