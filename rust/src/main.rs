use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use recipe_timeline::logging::filter_directive;
use recipe_timeline::{BatchSummary, ScheduleConfig, TimelineScheduler};

#[derive(Debug, Parser)]
#[command(name = "recipe-timeline", about = "Schedule recipe steps on a timeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Schedule every recipe in a JSON file and write the timelines
    Schedule(ScheduleArgs),
    /// Schedule a batch and print a data-quality summary
    Analyze(CommonArgs),
}

#[derive(Debug, Args, Clone)]
struct CommonArgs {
    /// JSON array of recipe records, a single record, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// JSON config file; missing keys take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Increase log detail (-v changes, -vv checks, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Args, Clone)]
struct ScheduleArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

impl Cli {
    fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Schedule(args) => {
                let (scheduler, recipes) = prepare(&args.common)?;
                let scheduled = scheduler.schedule_batch(&recipes);
                let failed = scheduled
                    .iter()
                    .filter(|r| r.diagnostics.error.is_some())
                    .count();
                tracing::info!(
                    recipes = scheduled.len(),
                    failed,
                    "scheduled batch"
                );

                let text = if args.compact {
                    serde_json::to_string(&scheduled)?
                } else {
                    serde_json::to_string_pretty(&scheduled)?
                };
                write_output(args.output.as_deref(), &text)
            }
            Command::Analyze(args) => {
                let (scheduler, recipes) = prepare(&args)?;
                let scheduled = scheduler.schedule_batch(&recipes);
                print!("{}", BatchSummary::from_recipes(&scheduled));
                Ok(())
            }
        }
    }
}

fn prepare(args: &CommonArgs) -> anyhow::Result<(TimelineScheduler, Vec<Value>)> {
    let mut config = match &args.config {
        Some(path) => ScheduleConfig::from_path(path)?,
        None => ScheduleConfig::default(),
    };
    if args.verbose > 0 {
        config.verbosity = args.verbose;
    }
    init_tracing(config.verbosity);

    let recipes = read_recipes(&args.input)?;
    tracing::debug!(recipes = recipes.len(), input = %args.input.display(), "loaded input");
    Ok((TimelineScheduler::new(config), recipes))
}

fn init_tracing(verbosity: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(filter_directive(verbosity)))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_recipes(input: &Path) -> anyhow::Result<Vec<Value>> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;
    match value {
        Value::Array(recipes) => Ok(recipes),
        Value::Object(_) => Ok(vec![value]),
        _ => bail!(
            "{}: expected an array of recipes or a single recipe object",
            input.display()
        ),
    }
}

fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, format!("{}\n", text))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", text).context("failed to write stdout")
        }
    }
}

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
