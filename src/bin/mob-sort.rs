#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mob_sort::config::{load_config_from_path, MobSortConfig};
use mob_sort::sort::{
    best_case_decisions, estimate_decisions, presorted_decisions, run_sort_with_trace,
    worst_case_decisions, write_card, JsonlSink, JsonlTraceSink, TerminalPresenter, TraceSink,
};
use mob_sort::tabular::{read_records, render_ranked_table, write_ranked, TabularFormat};
use mob_sort::workflow::Workflow;

#[derive(Parser)]
#[command(name = "mob-sort", version, about = "Rank a list one pairwise choice at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively rank records from a CSV, JSON or XLSX file
    Sort {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSONL decision trace output
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Header of the leading rank column
        #[arg(long)]
        rank_column: Option<String>,
        #[arg(long, value_enum)]
        input_format: Option<TabularFormat>,
        #[arg(long, value_enum)]
        output_format: Option<TabularFormat>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print decision estimates and bounds for N records
    Estimate {
        #[arg(long)]
        n: usize,
    },
    /// Run synthetic evaluation suite
    Eval {
        #[arg(long)]
        case: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    // A subscriber installed by an embedding process takes precedence.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sort {
            input,
            out,
            config,
            trace,
            rank_column,
            input_format,
            output_format,
            yes,
        } => {
            let mut cfg = match config {
                Some(path) => load_config_from_path(path)?,
                None => MobSortConfig::default(),
            };
            if let Some(rank_column) = rank_column {
                cfg.rank_column = rank_column;
            }
            if trace.is_some() {
                cfg.trace = trace;
            }
            cfg.input_format = input_format.or(cfg.input_format);
            cfg.output_format = output_format.or(cfg.output_format);
            cfg.validate()?;
            init_logging(&cfg.log_filter);

            run_interactive_sort(&cfg, input, out, yes).await?;
        }
        Commands::Estimate { n } => {
            println!("records: {n}");
            println!("estimated decisions (n ln n): {:.2}", estimate_decisions(n));
            println!("lower bound (n - 1): {}", best_case_decisions(n));
            println!("already ordered: {}", presorted_decisions(n));
            println!("worst case: {}", worst_case_decisions(n));
        }
        Commands::Eval { case, out } => {
            init_logging("mob_sort=warn");
            let results = mob_sort::sort::evaluation::run_synthetic_suite(case.as_deref()).await?;
            if results.is_empty() {
                return Err(format!("unknown case: {}", case.unwrap_or_default()).into());
            }
            let (sink, worker) = JsonlSink::new(&out)?;
            for result in results {
                sink.send(result)?;
            }
            drop(sink);
            let lines = worker.join()?;
            tracing::info!(path = %out.display(), lines, "wrote evaluation results");
        }
    }

    Ok(())
}

async fn run_interactive_sort(
    cfg: &MobSortConfig,
    input: PathBuf,
    out: PathBuf,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workflow = Workflow::new();
    workflow.load(read_records(&input, cfg.input_format)?);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if !yes {
        let pending = workflow.pending().unwrap_or_default();
        writeln!(stdout, "Loaded {} records.", pending.len())?;
        if let Some(first) = pending.first() {
            writeln!(stdout, "First record:")?;
            write_card(&mut stdout, None, first)?;
        }
        write!(stdout, "Start sorting? [Y/n]: ")?;
        stdout.flush()?;
        let mut line = String::new();
        stdin.read_line(&mut line)?;
        if line.trim().eq_ignore_ascii_case("n") {
            return Ok(());
        }
    }

    let ticket = workflow.begin_sort()?;
    let presenter = TerminalPresenter::new(io::BufReader::new(stdin), stdout);

    let trace_handle = match &cfg.trace {
        Some(path) => Some(JsonlTraceSink::new(path)?),
        None => None,
    };
    let trace_sink = trace_handle.as_ref().map(|(sink, _)| sink as &dyn TraceSink);

    let result = run_sort_with_trace(ticket.records, &presenter, trace_sink, None).await;

    if let Some((sink, worker)) = trace_handle {
        drop(sink);
        let lines = worker.join()?;
        tracing::debug!(lines, "decision trace flushed");
    }
    let resp = result?;

    println!(
        "\nDone after {} decisions (estimated {:.0}).",
        resp.meta.decisions_made, resp.meta.decisions_estimated
    );
    workflow.complete(ticket.generation, resp.ranked)?;
    if let Some(ranked) = workflow.results() {
        let options = cfg.export_options();
        println!("\n{}", render_ranked_table(ranked, &options));
        write_ranked(&out, cfg.output_format, ranked, &options)?;
        println!("Saved ranking to {}", out.display());
    }
    Ok(())
}
