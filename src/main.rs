use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use insights_core::{AppConfig, CoreError, ErrorExt, ErrorReporter};
use review_pipeline::{parse_review_date, BatchJob, ReportFilter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "review_insights=info,review_pipeline=info,sentiment_engine=info";

#[derive(Parser)]
#[command(name = "review-insights", version, about = "Categorize and score fetched app reviews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the fetched batch and write the report
    Run {
        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Fetched batch document
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the classified report
        #[arg(long)]
        output: Option<PathBuf>,
        /// Sentiment lexicon file
        #[arg(long)]
        lexicon: Option<PathBuf>,
        /// Never download the lexicon
        #[arg(long)]
        offline: bool,
    },
    /// Print the summary of the last report, optionally filtered
    Summarize {
        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Classified report to read
        #[arg(long)]
        report: Option<PathBuf>,
        /// Earliest review date to include
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Latest review date to include
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Only include these categories
        #[arg(long = "category")]
        categories: Vec<String>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_review_date(raw).ok_or_else(|| format!("unrecognized date '{raw}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reporter = ErrorReporter::new();

    let result = match cli.command {
        Command::Run {
            config,
            input,
            output,
            lexicon,
            offline,
        } => run(config, input, output, lexicon, offline).await,
        Command::Summarize {
            config,
            report,
            from,
            to,
            categories,
        } => {
            let filter = ReportFilter {
                from,
                to,
                categories,
            };
            summarize(config, report, filter).await
        }
    };

    if let Err(error) = result {
        reporter.report_error(&error);
        eprintln!("{}", error.user_friendly_message());
        return Err(error.into());
    }
    Ok(())
}

async fn run(
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    lexicon: Option<PathBuf>,
    offline: bool,
) -> Result<(), CoreError> {
    let mut config = AppConfig::load(config.as_deref())?;
    if let Some(input) = input {
        config.paths.input = input;
    }
    if let Some(output) = output {
        config.paths.output = output;
    }
    if let Some(lexicon) = lexicon {
        config.lexicon.path = lexicon;
    }
    if offline {
        config.lexicon.fetch_if_missing = false;
    }
    config.validate()?;

    tracing::info!("Starting review classification run");
    let summary = BatchJob::run(&config).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn summarize(
    config: Option<PathBuf>,
    report: Option<PathBuf>,
    filter: ReportFilter,
) -> Result<(), CoreError> {
    let mut config = AppConfig::load(config.as_deref())?;
    if let Some(report) = report {
        config.paths.output = report;
    }

    let summary = BatchJob::summarize(&config.paths, &filter).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
