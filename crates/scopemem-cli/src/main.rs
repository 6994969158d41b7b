//! scopemem - operator CLI for tiered agent memory
//!
//! ## Commands
//!
//! - `resolve`: show the recall and write datasets for a scope
//! - `classify`: show the tier and privacy of a dataset name
//! - `decay`: score every entry of an activation index
//! - `prune`: run a maintenance pass over an activation index
//! - `query`: run a scoped query against a remote search backend

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use scopemem_core::activation::{
    decay_report, describe_entry, identify_prune_candidates, run_maintenance, ActivationStore,
    FsActivationStore,
};
use scopemem_core::query::{
    query_scoped_knowledge, DatasetIdMap, HttpExecutorConfig, HttpSearchExecutor, QueryOptions,
    SearchType,
};
use scopemem_core::scope::{
    classify_dataset, resolve_recall_datasets, resolve_write_dataset, ProjectRef, ScopeContext,
    ScopeTier,
};
use scopemem_core::{MemoryConfig, METRICS};

#[derive(Parser)]
#[command(name = "scopemem")]
#[command(version = scopemem_core::VERSION)]
#[command(about = "Tiered memory retention and scope-aware recall", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true, env = "SCOPEMEM_CONFIG")]
    config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Flags that build a [`ScopeContext`].
#[derive(Debug, Args)]
struct ScopeArgs {
    /// User the request runs as
    #[arg(short, long)]
    user: String,

    /// Scope tier: personal, project, or team
    #[arg(short, long, default_value = "personal")]
    tier: ScopeTier,

    /// Project id (project tier)
    #[arg(long)]
    project: Option<String>,

    /// Project display name
    #[arg(long)]
    project_name: Option<String>,

    /// Treat the request as coming from a group session
    #[arg(long)]
    group: bool,
}

impl ScopeArgs {
    fn to_scope(&self) -> ScopeContext {
        let project = self.project.as_deref().map(|id| {
            let name = self.project_name.as_deref().unwrap_or(id);
            ProjectRef::new(id, name)
        });
        ScopeContext {
            tier: self.tier,
            project,
            user_id: self.user.clone(),
            is_group_session: self.group,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show which datasets a scope reads from and writes to
    Resolve {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Classify a dataset name relative to a user
    Classify {
        /// Dataset name
        dataset: String,

        /// User the classification is relative to
        #[arg(short, long)]
        user: String,
    },

    /// Score every entry of an activation index
    Decay {
        /// Path to the activation index JSON
        #[arg(short, long)]
        index: PathBuf,
    },

    /// Remove entries whose decay score fell below the threshold
    Prune {
        /// Path to the activation index JSON
        #[arg(short, long)]
        index: PathBuf,

        /// Prune threshold (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// List candidates without modifying the index
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a scoped query against a remote search backend
    Query {
        /// Query text
        text: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Dataset name to backend id map: inline JSON object or path to a JSON file
        #[arg(short, long)]
        datasets: String,

        /// Search backend base URL
        #[arg(long, env = "SCOPEMEM_BACKEND_URL")]
        backend_url: String,

        /// Bearer token for the backend
        #[arg(long, env = "SCOPEMEM_BACKEND_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// GRAPH_COMPLETION, CHUNKS, or SUMMARIES (default from config)
        #[arg(long)]
        search_type: Option<SearchType>,

        /// Maximum results (default from config)
        #[arg(long)]
        max_results: Option<usize>,

        /// Minimum score (default from config)
        #[arg(long)]
        min_score: Option<f64>,

        /// Deadline in milliseconds (default from config)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    scopemem_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;
    let format = cli.format;

    let outcome = match cli.command {
        Commands::Resolve { scope } => cmd_resolve(&scope.to_scope(), format),
        Commands::Classify { dataset, user } => cmd_classify(&dataset, &user, format),
        Commands::Decay { index } => cmd_decay(&index, &config, format),
        Commands::Prune {
            index,
            threshold,
            dry_run,
        } => cmd_prune(
            &index,
            threshold.unwrap_or(config.retention.prune_threshold),
            dry_run,
            &config,
            format,
        ),
        Commands::Query {
            text,
            scope,
            datasets,
            backend_url,
            token,
            search_type,
            max_results,
            min_score,
            timeout_ms,
        } => {
            let mut options = QueryOptions::from(&config.router);
            if let Some(t) = search_type {
                options.search_type = t;
            }
            if let Some(n) = max_results {
                options.max_results = n;
            }
            if let Some(s) = min_score {
                options.min_score = s;
            }
            if let Some(ms) = timeout_ms {
                options.timeout = Duration::from_millis(ms);
            }
            let mut backend = HttpExecutorConfig::new(&backend_url);
            backend.token = token.filter(|t| !t.is_empty());
            cmd_query(&text, &scope.to_scope(), &datasets, backend, &options, format).await
        }
    };

    METRICS.flush();
    outcome
}

fn load_config(path: Option<&Path>) -> Result<MemoryConfig> {
    match path {
        Some(p) => MemoryConfig::load(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => MemoryConfig::from_env().context("Invalid SCOPEMEM_* environment override"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveOutput {
    scope: ScopeContext,
    recall: Vec<String>,
    write: String,
}

fn cmd_resolve(scope: &ScopeContext, format: OutputFormat) -> Result<()> {
    let out = ResolveOutput {
        scope: scope.clone(),
        recall: resolve_recall_datasets(scope),
        write: resolve_write_dataset(scope),
    };
    if format == OutputFormat::Json {
        return print_json(&out);
    }

    println!(
        "Scope:  {} (user {}, {})",
        scope.tier,
        scope.user_id,
        if scope.is_group_session { "group" } else { "1:1" }
    );
    println!("Recall:");
    for name in &out.recall {
        let class = classify_dataset(name, &scope.user_id);
        let privacy = if class.is_private { "private" } else { "shared" };
        println!("  {:<24} {:<9} {}", name, class.tier.to_string(), privacy);
    }
    println!("Write:  {}", out.write);
    Ok(())
}

fn cmd_classify(dataset: &str, user: &str, format: OutputFormat) -> Result<()> {
    let class = classify_dataset(dataset, user);
    if format == OutputFormat::Json {
        return print_json(&class);
    }
    println!("Dataset: {dataset}");
    println!("Tier:    {}", class.tier);
    println!("Private: {}", class.is_private);
    Ok(())
}

fn cmd_decay(index: &Path, config: &MemoryConfig, format: OutputFormat) -> Result<()> {
    let store = FsActivationStore::new(index);
    let idx = store
        .load()
        .with_context(|| format!("Failed to load activation index {}", index.display()))?;
    let now = Utc::now();

    let entries: Vec<_> = idx
        .entries()
        .map(|e| describe_entry(e, now, &config.decay))
        .collect();
    let summary = decay_report(&idx, now, &config.decay);

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "entries": entries, "summary": summary }));
    }

    if entries.is_empty() {
        println!("No entries in {}", index.display());
        return Ok(());
    }
    for e in &entries {
        let score = e
            .score
            .map(|s| format!("{s:.4}"))
            .unwrap_or_else(|| "pinned".to_string());
        println!(
            "{:<32} {:<11} {:>8}  {}",
            e.memory_id,
            e.memory_type.to_string(),
            score,
            e.tier
        );
    }
    println!();
    println!(
        "active {}  fading {}  dormant {}  archived {}  (pinned {})",
        summary.active, summary.fading, summary.dormant, summary.archived, summary.pinned
    );
    Ok(())
}

fn cmd_prune(
    index: &Path,
    threshold: f64,
    dry_run: bool,
    config: &MemoryConfig,
    format: OutputFormat,
) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        bail!("Prune threshold must be a non-negative number, got {threshold}");
    }

    let store = FsActivationStore::new(index);
    let mut idx = store
        .load()
        .with_context(|| format!("Failed to load activation index {}", index.display()))?;
    let now = Utc::now();

    if dry_run {
        let candidates = identify_prune_candidates(&idx, threshold, now, &config.decay);
        if format == OutputFormat::Json {
            return print_json(&serde_json::json!({
                "dryRun": true,
                "threshold": threshold,
                "candidates": candidates,
            }));
        }
        println!(
            "{} of {} entries would be pruned (threshold {threshold})",
            candidates.len(),
            idx.len()
        );
        for id in candidates {
            println!("  {id}");
        }
        return Ok(());
    }

    let report = run_maintenance(&mut idx, threshold, now, &config.decay);
    if !report.removed_ids.is_empty() {
        store
            .save(&idx)
            .with_context(|| format!("Failed to save activation index {}", index.display()))?;
    }
    info!(removed = report.removed_ids.len(), "prune complete");

    if format == OutputFormat::Json {
        return print_json(&report);
    }
    println!(
        "Pruned {} entries, {} remaining (threshold {})",
        report.removed_ids.len(),
        report.remaining_count,
        report.threshold
    );
    for id in &report.removed_ids {
        println!("  {id}");
    }
    Ok(())
}

/// Parse the `--datasets` argument: inline JSON when it starts with `{`,
/// otherwise a path to a JSON file.
fn parse_dataset_map(arg: &str) -> Result<DatasetIdMap> {
    let trimmed = arg.trim_start();
    let raw = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        std::fs::read_to_string(arg)
            .with_context(|| format!("Failed to read dataset map from {arg}"))?
    };
    serde_json::from_str(&raw).context("Dataset map must be a JSON object of name -> id strings")
}

async fn cmd_query(
    text: &str,
    scope: &ScopeContext,
    datasets: &str,
    backend: HttpExecutorConfig,
    options: &QueryOptions,
    format: OutputFormat,
) -> Result<()> {
    let dataset_ids = parse_dataset_map(datasets)?;
    let executor = Arc::new(
        HttpSearchExecutor::new(backend).context("Failed to create search backend client")?,
    );

    let out = query_scoped_knowledge(text, scope, executor, &dataset_ids, options).await;

    if format == OutputFormat::Json {
        return print_json(&out);
    }
    if out.datasets_queried == 0 {
        println!("No synced datasets for this scope; nothing queried.");
        return Ok(());
    }
    println!(
        "{} results ({} datasets queried, {} before filtering)",
        out.results.len(),
        out.datasets_queried,
        out.total_before_filter
    );
    for (i, r) in out.results.iter().enumerate() {
        println!();
        println!("{}. [{:.3}] {} ({})", i + 1, r.score, r.source_dataset, r.source_tier);
        println!("   {}", r.text.trim());
    }
    Ok(())
}
