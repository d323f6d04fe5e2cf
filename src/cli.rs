use crate::model::Metric;
use crate::plot::GroupBy;
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "countlines")]
#[command(about = "Line-count history of tagged releases, collected with cloc and plotted over time")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to config file (default: ./countlines.toml if present)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity (-v debug, -vv trace)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only log errors")]
    pub quiet: bool,
}

#[derive(Args, Clone, Default)]
pub struct CountArgs {
    #[arg(help = "Release identifiers or weekly ranges (e.g. w.2017.1..w.2017.10)")]
    pub releases: Vec<String>,

    #[arg(long, help = "File listing releases, one per line")]
    pub releases_file: Option<PathBuf>,

    #[arg(short, long, help = "Output directory, or an exact .csv path")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Repository substituted for {repo} in the checkout command")]
    pub repo: Option<String>,

    #[arg(long, help = "Line counter program (default: cloc)")]
    pub counter: Option<String>,

    #[arg(long = "language", help = "Only count this language (repeatable)")]
    pub languages: Vec<String>,

    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "manifest.txt",
        help = "Count only the products listed in this manifest inside the checkout"
    )]
    pub manifest: Option<String>,

    #[arg(long, help = "Keep each raw counter report in this directory")]
    pub keep_reports: Option<PathBuf>,

    #[arg(long, help = "Date undated releases from tag commits in this git repository")]
    pub dates_from: Option<PathBuf>,

    #[arg(long, help = "Parent directory for per-release checkouts")]
    pub scratch_dir: Option<PathBuf>,

    #[arg(long, help = "Output the run report as JSON")]
    pub json: bool,

    #[arg(long, help = "Disable the progress bar")]
    pub no_progress: bool,
}

#[derive(Args, Clone)]
pub struct PlotArgs {
    #[arg(required = true, help = "Results files or directories of them")]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Metric::Code, help = "Metric to plot")]
    pub metric: Metric,

    #[arg(long = "by", value_enum, default_value_t = GroupBy::Language, help = "One line per language, or one total line")]
    pub group_by: GroupBy,

    #[arg(long = "language", help = "Only plot this language (repeatable)")]
    pub languages: Vec<String>,

    #[arg(long, help = "Write the chart as SVG to this path")]
    pub svg: Option<PathBuf>,

    #[arg(long = "interactive", alias = "tui", help = "Show an interactive terminal chart")]
    pub interactive: bool,

    #[arg(long, help = "Output the chart series as JSON")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check out each release, count its lines and write a dated results table
    Count(CountArgs),
    /// Chart line counts from one or more results tables
    Plot(PlotArgs),
    /// Show the expanded release list with derived dates
    Releases {
        #[arg(help = "Release identifiers or weekly ranges")]
        releases: Vec<String>,

        #[arg(long, help = "File listing releases, one per line")]
        releases_file: Option<PathBuf>,

        #[arg(long, help = "Date undated releases from tag commits in this git repository")]
        dates_from: Option<PathBuf>,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<ExitCode> {
        match self.command {
            Commands::Count(args) => crate::count::exec(&self.common, args),
            Commands::Plot(args) => crate::plot::exec(args).map(|_| ExitCode::SUCCESS),
            Commands::Releases { releases, releases_file, dates_from, json } => {
                crate::listing::exec(
                    &self.common,
                    &releases,
                    releases_file.as_deref(),
                    dates_from.as_deref(),
                    json,
                )
                .map(|_| ExitCode::SUCCESS)
            }
        }
    }
}
