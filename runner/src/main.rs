use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ranklab_core::index::CollectionStats;
use ranklab_core::metrics::{evaluate_run, EvalConfig};
use ranklab_core::persist::{load_corpus, load_judgments, load_queries, write_run};
use ranklab_core::rank::run_queries;
use ranklab_core::scoring::{Bm25, Bm25Params, QueryLikelihood, ScoringModel};
use ranklab_core::tokenizer::tokenize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "runner")]
#[command(about = "Build ranked retrieval runs over a JSONL corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Corpus JSONL file, one {"id", "text"} object per line
    #[arg(long)]
    corpus: PathBuf,
    /// Queries JSON file, an array of {"query_id", "text"} objects
    #[arg(long)]
    queries: PathBuf,
    /// Optional file restricting the query set (first field per line is a query id)
    #[arg(long)]
    filter: Option<PathBuf>,
    /// Output run file
    #[arg(long)]
    output: PathBuf,
    /// Results kept per query
    #[arg(long, default_value_t = 1000)]
    top_k: usize,
    /// Run tag written in the last run-file column (defaults to the model name)
    #[arg(long)]
    tag: Option<String>,
    /// Judgment file; when given, print a micro-recall table after writing the run
    #[arg(long)]
    qrels: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank with Okapi BM25
    Bm25 {
        #[command(flatten)]
        common: CommonArgs,
        /// Term-frequency saturation
        #[arg(long, default_value_t = 1.5)]
        k1: f64,
        /// Length-normalization strength
        #[arg(long, default_value_t = 0.75)]
        b: f64,
    },
    /// Rank with a Dirichlet-smoothed query-likelihood model
    Ql {
        #[command(flatten)]
        common: CommonArgs,
        /// Dirichlet smoothing strength
        #[arg(long, default_value_t = 2000.0)]
        mu: f64,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Bm25 { common, k1, b } => {
            let (stats, queries) = prepare(&common)?;
            let model = Bm25::new(&stats, Bm25Params { k1, b })?;
            finish(&model, &queries, &common, "BM25")
        }
        Commands::Ql { common, mu } => {
            let (stats, queries) = prepare(&common)?;
            let model = QueryLikelihood::new(&stats, mu)?;
            finish(&model, &queries, &common, "QL")
        }
    }
}

fn prepare(common: &CommonArgs) -> Result<(CollectionStats, Vec<(String, Vec<String>)>)> {
    let corpus = load_corpus(&common.corpus)?;
    let docs = corpus.into_iter().map(|(id, text)| (id, tokenize(&text))).collect();
    let stats = CollectionStats::from_documents(docs);

    let queries = load_queries(&common.queries, common.filter.as_deref())?
        .into_iter()
        .map(|(qid, text)| (qid, tokenize(&text)))
        .collect();
    Ok((stats, queries))
}

fn finish<M: ScoringModel>(
    model: &M,
    queries: &[(String, Vec<String>)],
    common: &CommonArgs,
    default_tag: &str,
) -> Result<()> {
    let tag = common.tag.as_deref().unwrap_or(default_tag);
    let run = run_queries(model, queries, Some(common.top_k), tag)?;
    write_run(&common.output, &run)?;
    tracing::info!(output = %common.output.display(), tag, "run written");

    if let Some(qrels) = &common.qrels {
        let judgments = load_judgments(qrels)?;
        let report = evaluate_run(&run, &judgments, &EvalConfig::default());
        print!("{}", report.micro_recall_table());
    }
    Ok(())
}
