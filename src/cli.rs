use crate::docs_store::DocsStore;
use crate::error::Error;
use crate::merger::{operation_counts, MergeStrategy, ModifierStrategy, VersionMerger};
use crate::openapi_builder::{DocumentRoot, Tag};
use crate::serializer::OutputFormat;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://localhost/api";
pub const DEFAULT_TITLE: &str = "API";

/// OpenAPI DTO - Merge versioned path documents into OpenAPI 3.0 artifacts
#[derive(Parser, Debug)]
#[command(name = "openapi-dto")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the stored path documents into one document per version and bucket
    Merge(MergeArgs),
    /// Render merged documents into HTML pages
    Publish(PublishArgs),
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Documents directory
    #[arg(short = 'd', long = "docs", value_name = "DIR")]
    pub docs: PathBuf,

    /// Version to merge, or `*` for every version
    #[arg(long = "version", value_name = "N|*", default_value = "*")]
    pub version: VersionSelector,

    /// Latest API version (defaults to the highest version found)
    #[arg(long = "latest", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub latest: Option<u32>,

    /// Server url of the merged documents
    #[arg(long = "base-url", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Title of the merged documents
    #[arg(long = "title", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// JSON file with the root tags (`[{"name": .., "description": ..}]`)
    #[arg(long = "tags", value_name = "FILE")]
    pub tags: Option<PathBuf>,

    /// Output format of the merged documents
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Documents directory
    #[arg(short = 'd', long = "docs", value_name = "DIR")]
    pub docs: PathBuf,

    /// HTML template containing the `%%SPECS%%` marker
    #[arg(short = 't', long = "template", value_name = "FILE")]
    pub template: PathBuf,

    /// Version to publish, or `*` for every version
    #[arg(long = "version", value_name = "N|*", default_value = "*")]
    pub version: VersionSelector,

    /// Output directory of the pages (defaults to `build/` in the documents directory)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Format the merged documents were written in
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Version argument: a single version or every version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    All,
    Single(u32),
}

impl VersionSelector {
    /// Versions selected, checked against the latest version.
    pub fn resolve(&self, latest: u32) -> std::result::Result<Vec<u32>, Error> {
        match *self {
            VersionSelector::All => Ok((1..=latest).collect()),
            VersionSelector::Single(version) if version <= latest => Ok(vec![version]),
            VersionSelector::Single(version) => Err(Error::InvalidArgument(format!(
                "version {} is greater than the latest version {}",
                version, latest
            ))),
        }
    }
}

impl FromStr for VersionSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(VersionSelector::All);
        }
        match s.trim_start_matches('v').parse::<u32>() {
            Ok(version) if version > 0 => Ok(VersionSelector::Single(version)),
            _ => Err(format!("expected `*` or a positive integer, got `{}`", s)),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::All => f.write_str("*"),
            VersionSelector::Single(version) => write!(f, "{}", version),
        }
    }
}

/// File names of the merged JSON documents, excluded when loading path documents
fn reserved_names(strategy: &dyn MergeStrategy) -> Vec<String> {
    strategy
        .buckets()
        .into_iter()
        .map(|bucket| format!("{}.json", bucket))
        .collect()
}

fn load_tags(path: &Path) -> Result<Vec<Tag>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tags file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tags file: {}", path.display()))
}

/// Run the selected command
pub fn run(args: CliArgs) -> Result<()> {
    debug!("Parsed arguments: {:?}", args);
    match args.command {
        Command::Merge(merge) => run_merge(merge),
        Command::Publish(publish) => run_publish(publish),
    }
}

pub fn run_merge(args: MergeArgs) -> Result<()> {
    if !args.docs.is_dir() {
        anyhow::bail!("Documents directory does not exist: {}", args.docs.display());
    }

    let store = DocsStore::new(args.docs.clone()).with_format(args.format);
    let strategy = ModifierStrategy;

    info!("Loading path documents from {}", args.docs.display());
    let heap = store
        .load_heap(&reserved_names(&strategy))
        .context("Failed to load path documents")?;

    let latest = match args.latest.or_else(|| heap.latest_version()) {
        Some(0) => anyhow::bail!("The latest version must be a positive integer"),
        Some(latest) => latest,
        None => anyhow::bail!("No versioned path documents found in {}", args.docs.display()),
    };
    let versions = args.version.resolve(latest)?;

    let tags = match &args.tags {
        Some(path) => load_tags(path)?,
        None => Vec::new(),
    };
    let root = DocumentRoot::new(args.title, args.base_url).with_tags(tags);

    let merger = VersionMerger::new(heap, root)
        .with_strategy(strategy)
        .with_saver(store);

    for version in versions {
        info!("Merging version {}", version);
        let documents = merger
            .merge_and_save(version)
            .with_context(|| format!("Failed to merge version {}", version))?;
        for (bucket, count) in operation_counts(&documents) {
            info!("v{} {}: {} operations", version, bucket, count);
        }
    }

    Ok(())
}

pub fn run_publish(args: PublishArgs) -> Result<()> {
    let template = fs::read_to_string(&args.template)
        .with_context(|| format!("Failed to read template: {}", args.template.display()))?;

    let mut store = DocsStore::new(args.docs.clone()).with_format(args.format);
    if let Some(output) = args.output {
        store = store.with_build_dir(output);
    }

    let strategy = ModifierStrategy;
    let heap = store
        .load_heap(&reserved_names(&strategy))
        .context("Failed to load path documents")?;
    let latest = match heap.latest_version() {
        Some(latest) => latest,
        None => anyhow::bail!("No versioned path documents found in {}", args.docs.display()),
    };

    let mut published = 0;
    for version in args.version.resolve(latest)? {
        for bucket in strategy.buckets() {
            match store.publish(version, &bucket, &template) {
                Ok(_) => published += 1,
                Err(Error::InvalidArgument(message)) if args.version == VersionSelector::All => {
                    warn!("Skipping: {}", message);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to publish v{} {}", version, bucket))
                }
            }
        }
    }

    info!("Published {} pages", published);
    Ok(())
}
