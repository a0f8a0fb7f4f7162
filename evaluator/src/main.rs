use anyhow::Result;
use clap::Parser;
use ranklab_core::metrics::{evaluate_run, EvalConfig, DEFAULT_RECALL_CUTOFFS};
use ranklab_core::persist::{load_judgments, load_run};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Score a run file against relevance judgments", long_about = None)]
struct Cli {
    /// Relevance judgment file: <query_id> 0 <document_id> <grade>
    #[arg(long)]
    relevance: PathBuf,
    /// Run file: <query_id> Q0 <document_id> <rank> <score> <tag>
    #[arg(long)]
    run: PathBuf,
    /// Recall cutoffs, comma-separated
    #[arg(long, value_delimiter = ',')]
    cutoffs: Option<Vec<usize>>,
    /// Also print the pooled micro-recall diagnostic
    #[arg(long, default_value_t = false)]
    micro: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let judgments = load_judgments(&cli.relevance)?;
    let run = load_run(&cli.run)?;
    tracing::info!(num_queries = run.entries.len(), "run loaded");

    let config = EvalConfig {
        recall_cutoffs: cli.cutoffs.unwrap_or_else(|| DEFAULT_RECALL_CUTOFFS.to_vec()),
    };
    let report = evaluate_run(&run, &judgments, &config);
    print!("{report}");
    if cli.micro {
        println!();
        print!("{}", report.micro_recall_table());
    }
    Ok(())
}
