use crate::changes::Changes;
use crate::cli::CommonArgs;
use crate::error::{Result, TallyError};
use crate::filter::FilterGate;
use crate::log::LogCommand;
use crate::model::{DateWindow, ReportOutput, ReportRow, COLUMN_HEADERS, SCHEMA_VERSION};
use crate::util::RepoSpec;
use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Results of running one pass per repository.
pub struct Passes<T> {
    pub items: Vec<T>,
    pub failures: Vec<TallyError>,
    pub total: usize,
}

impl<T> Passes<T> {
    /// Error out if any repository failed, after its rows were written.
    pub fn ensure_complete(&self) -> anyhow::Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        for failure in &self.failures {
            eprintln!("{} {}", style("failed:").red().bold(), failure);
        }
        anyhow::bail!("{} of {} repositories failed", self.failures.len(), self.total)
    }
}

/// Run `pass` for every repository in order.
///
/// A repository whose pass fails with a pass-fatal error is logged and
/// skipped; any other error stops the run.
pub fn run_passes<T, F>(repos: &[RepoSpec], mut pass: F) -> Result<Passes<T>>
where
    F: FnMut(&RepoSpec) -> Result<Vec<T>>,
{
    let pb = ProgressBar::new(repos.len() as u64);
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let mut items = Vec::new();
    let mut failures = Vec::new();

    for repo in repos {
        pb.set_message(format!("Reading {}", repo.name));
        match pass(repo) {
            Ok(mut found) => {
                info!(repository = %repo.name, rows = found.len(), "repository done");
                items.append(&mut found);
            }
            Err(e) if e.is_pass_fatal() => {
                error!(repository = %repo.name, error = %e, "repository skipped");
                failures.push(e.in_repository(&repo.name));
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.in_repository(&repo.name));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(Passes {
        items,
        failures,
        total: repos.len(),
    })
}

/// Collect one repository and turn its `(date, author)` totals inside
/// `window` into report rows tagged with the repository name.
pub fn repository_rows<G: FilterGate>(
    repo: &RepoSpec,
    hard: bool,
    gate: G,
    window: &DateWindow,
) -> Result<Vec<ReportRow>> {
    let command = LogCommand::new(&repo.path).hard(hard);
    let changes = Changes::collect(&command, gate).map_err(|e| e.in_repository(&repo.name))?;
    info!(
        repository = %repo.name,
        headers = changes.headers_seen(),
        commits = changes.commits().len(),
        first = ?changes.first_commit_date(),
        last = ?changes.last_commit_date(),
        "log segmented"
    );
    let aggregates = changes.compute_aggregates();

    Ok(aggregates
        .select(window)
        .into_iter()
        .map(|(key, info)| ReportRow {
            author: key.author,
            date: key.date,
            repository: repo.name.clone(),
            lines_added: info.insertions,
            lines_deleted: info.deletions,
        })
        .collect())
}

pub fn exec(common: CommonArgs, out: PathBuf, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let repos = common.repositories().context("Failed to resolve repositories")?;
    let window = common.window().context("Failed to resolve date window")?;
    let rules = common.exclusion_rules().context("Failed to parse exclusion rules")?;

    let passes = run_passes(&repos, |repo| repository_rows(repo, common.hard, &rules, &window))?;

    if json {
        output_json(&passes.items, &repos, &window)?;
    } else if ndjson {
        output_ndjson(&passes.items)?;
    } else {
        output_csv(&passes.items, &out).context("Failed to write CSV report")?;
    }

    passes.ensure_complete()
}

/// Write the header row and then every row in the given order.
pub fn write_csv<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(COLUMN_HEADERS)?;
    for row in rows {
        w.write_record(row.record())?;
    }
    w.flush()?;
    Ok(())
}

fn output_csv(rows: &[ReportRow], out: &Path) -> Result<()> {
    if out == Path::new("-") {
        return write_csv(io::stdout().lock(), rows);
    }

    let file = File::create(out)?;
    write_csv(file, rows)?;
    eprintln!(
        "Wrote {} rows to {}",
        style(rows.len()).cyan(),
        style(out.display()).bold()
    );
    Ok(())
}

fn output_json(rows: &[ReportRow], repos: &[RepoSpec], window: &DateWindow) -> anyhow::Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        window: *window,
        repositories: repos.iter().map(|r| r.name.clone()).collect(),
        rows: rows.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(rows: &[ReportRow]) -> anyhow::Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}
