use crate::filter::ExclusionRules;
use crate::model::DateWindow;
use crate::util::{self, RepoSpec};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linetally")]
#[command(about = "Per-author, per-day lines added and deleted across git repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    #[arg(long = "repo", value_name = "[NAME=]PATH", help = "Repository to analyze (repeatable)")]
    pub repos: Vec<String>,

    #[arg(long, value_name = "FILE", help = "File listing one repository per line")]
    pub repos_file: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Base directory for relative repository paths")]
    pub projects_path: Option<PathBuf>,

    #[arg(long, help = "Detect copies and renames (git log -C -C -M)", default_value_t = false)]
    pub hard: bool,

    #[arg(long, conflicts_with_all = ["since", "until"], help = "Only report this calendar year")]
    pub year: Option<i32>,

    #[arg(long, help = "First date to report, inclusive (YYYY-MM-DD)")]
    pub since: Option<String>,

    #[arg(long, help = "Last date to report, exclusive (YYYY-MM-DD)")]
    pub until: Option<String>,

    #[arg(
        long,
        value_name = "RULE",
        help = "Exclusion regex: file:<re>, author:<re>, email:<re>, revision:<re> (bare = file)"
    )]
    pub exclude: Vec<String>,

    #[arg(short, long, action = ArgAction::Count, help = "More log output (-v info, -vv debug)")]
    pub verbose: u8,
}

impl CommonArgs {
    /// Repositories from `--repo` and `--repos-file`, or the current directory.
    pub fn repositories(&self) -> Result<Vec<RepoSpec>> {
        let mut repos = self
            .repos
            .iter()
            .map(|r| r.parse::<RepoSpec>())
            .collect::<crate::error::Result<Vec<_>>>()?;

        if let Some(file) = &self.repos_file {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read repository list {}", file.display()))?;
            repos.extend(util::parse_repo_list(&text)?);
        }

        if repos.is_empty() {
            repos.push(".".parse()?);
        }

        let base = self.projects_path.as_deref();
        Ok(repos.into_iter().map(|r| r.rooted_at(base)).collect())
    }

    pub fn window(&self) -> Result<DateWindow> {
        Ok(util::resolve_window(self.year, self.since.as_deref(), self.until.as_deref())?)
    }

    pub fn exclusion_rules(&self) -> Result<ExclusionRules> {
        Ok(ExclusionRules::parse(&self.exclude)?)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lines added/deleted per (author, date, repository)
    Report {
        #[arg(long, short, default_value = "git_stats.csv", help = "CSV output file, `-` for stdout")]
        out: PathBuf,

        #[arg(long, help = "Print JSON to stdout instead of CSV")]
        json: bool,

        #[arg(long, conflicts_with = "json", help = "Print NDJSON to stdout instead of CSV")]
        ndjson: bool,
    },
    /// Totals per author and repository
    Authors {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report { out, json, ndjson } => crate::report::exec(self.common, out, json, ndjson),
            Commands::Authors { json } => crate::authors::exec(self.common, json),
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
