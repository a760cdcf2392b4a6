//! pathtree - Build nested folder trees from flat file listings.
//!
//! Usage:
//!   pathtree build [INPUT]       Print the tree for a record listing
//!   pathtree root [INPUT]        Print the common root of a listing
//!   pathtree classify --name N   Print the type tag for a file
//!   pathtree --help              Show help
//!
//! INPUT is a JSON array of records or a stream of JSON objects; `-` or no
//! argument reads stdin.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use pathtree_core::{
    FileRecord, PathTreeBuilder, TreeConfig, TreeNode, TreeReport, classify_type, common_root,
    load_records, read_records,
};

#[derive(Parser)]
#[command(
    name = "pathtree",
    version,
    about = "Build nested folder trees from flat file listings",
    long_about = "pathtree turns a listing of stored files into the folder tree a \
                  file browser would show.\n\n\
                  Set RUST_LOG=debug to see dropped records and build statistics."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and print the tree
    Build {
        /// Record listing (defaults to stdin)
        input: Option<PathBuf>,

        /// JSON file with a tree config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum segments below the root
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Skip records whose path matches this glob (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print statistics and dropped records
        #[arg(short, long)]
        stats: bool,
    },

    /// Print the common root of a listing
    Root {
        /// Record listing (defaults to stdin)
        input: Option<PathBuf>,
    },

    /// Print the type tag for a file
    Classify {
        /// File name
        #[arg(short, long)]
        name: String,

        /// Content type, if known
        #[arg(short, long)]
        content_type: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordSource {
    Stdin,
    File(PathBuf),
}

impl RecordSource {
    fn from_arg(input: Option<PathBuf>) -> Self {
        match input {
            Some(path) if path.as_os_str() != "-" => Self::File(path),
            _ => Self::Stdin,
        }
    }

    fn load(&self) -> Result<Vec<FileRecord>> {
        let records = match self {
            Self::Stdin => read_records(std::io::stdin().lock()).context("Failed to read stdin")?,
            Self::File(path) => load_records(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        };
        tracing::debug!(source = ?self, count = records.len(), "loaded records");
        Ok(records)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            input,
            config,
            max_depth,
            exclude,
            format,
            output,
            stats,
        } => {
            let config = resolve_config(config, max_depth, exclude)?;
            let source = RecordSource::from_arg(input);
            run_build(&source, config, format, output, stats)?;
        }
        Command::Root { input } => {
            let records = RecordSource::from_arg(input).load()?;
            println!("{}", common_root(&records));
        }
        Command::Classify { name, content_type } => {
            let mut record = FileRecord::new(name.clone(), name);
            record.content_type = content_type;
            println!("{}", classify_type(&record));
        }
    }

    Ok(())
}

/// Merge a config file with command-line overrides.
fn resolve_config(
    path: Option<PathBuf>,
    max_depth: Option<usize>,
    exclude: Vec<String>,
) -> Result<TreeConfig> {
    let base = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<TreeConfig>(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => TreeConfig::default(),
    };

    let mut patterns = base.exclude_patterns;
    patterns.extend(exclude);

    let config = TreeConfig::builder()
        .max_depth(max_depth.unwrap_or(base.max_depth))
        .exclude_patterns(patterns)
        .build()
        .context("Invalid tree config")?;

    Ok(config)
}

/// Build the tree and write it out.
fn run_build(
    source: &RecordSource,
    config: TreeConfig,
    format: OutputFormat,
    output: Option<PathBuf>,
    show_stats: bool,
) -> Result<()> {
    let records = source.load()?;
    let report = PathTreeBuilder::with_config(config).build_with_report(&records);

    let rendered = match format {
        OutputFormat::Text => {
            let mut text = String::new();
            for node in &report.nodes {
                render_node(node, 0, &mut text);
            }
            text
        }
        OutputFormat::Json => serde_json::to_string_pretty(&report.nodes)? + "\n",
    };

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, rendered)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Wrote tree to {}", output_path.display());
        }
        None => {
            std::io::stdout().lock().write_all(rendered.as_bytes())?;
        }
    }

    if show_stats {
        print_stats(&report);
    }

    Ok(())
}

/// Append a node and its children as indented lines.
fn render_node(node: &TreeNode<'_>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);

    if node.is_folder() {
        let label = if node.label.is_empty() { "." } else { node.label.as_str() };
        out.push_str(&format!("{indent}▼ {label}/\n"));
        for child in node.children() {
            render_node(child, depth + 1, out);
        }
    } else {
        let tag = node.file_type.as_str();
        let tag = if tag.is_empty() { "-" } else { tag };
        out.push_str(&format!("{indent}  {:<40} {tag}\n", node.label.as_str()));
    }
}

/// Print build statistics to stderr.
fn print_stats(report: &TreeReport<'_>) {
    let stats = &report.stats;

    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(" root: {:?}", report.root);
    eprintln!(
        " {} folders, {} files, depth {}",
        stats.folders, stats.leaves, stats.max_depth
    );
    eprintln!(" {} dropped, {} excluded", stats.dropped, stats.excluded);
    for (file_type, count) in &stats.by_type {
        let tag = file_type.as_str();
        eprintln!("   {:<12} {count}", if tag.is_empty() { "(other)" } else { tag });
    }
    eprintln!("{}", "─".repeat(60));

    for warning in &report.warnings {
        eprintln!(" warning: {}", warning.message);
    }
}
