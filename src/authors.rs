use crate::changes::Changes;
use crate::cli::CommonArgs;
use crate::error::Result;
use crate::filter::FilterGate;
use crate::log::LogCommand;
use crate::model::{AuthorRow, AuthorsOutput, DateWindow, SCHEMA_VERSION};
use crate::report::run_passes;
use crate::util::RepoSpec;
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let repos = common.repositories().context("Failed to resolve repositories")?;
    let window = common.window().context("Failed to resolve date window")?;
    let rules = common.exclusion_rules().context("Failed to parse exclusion rules")?;

    let passes = run_passes(&repos, |repo| author_rows(repo, common.hard, &rules, &window))?;

    if json {
        output_json(&passes.items)?;
    } else {
        output_table(&passes.items);
    }

    passes.ensure_complete()
}

/// Per-author totals for one repository, most lines changed first.
pub fn author_rows<G: FilterGate>(
    repo: &RepoSpec,
    hard: bool,
    gate: G,
    window: &DateWindow,
) -> Result<Vec<AuthorRow>> {
    let command = LogCommand::new(&repo.path).hard(hard);
    let changes = Changes::collect(&command, gate)
        .map_err(|e| e.in_repository(&repo.name))?
        .restrict_to(window);

    let aggregates = changes.compute_aggregates();
    let mut rows: Vec<AuthorRow> = aggregates
        .by_author()
        .iter()
        .map(|(author, info)| AuthorRow {
            repository: repo.name.clone(),
            author: author.clone(),
            email: changes.latest_email_by_author(author).map(str::to_string),
            commits: info.commits,
            insertions: info.insertions,
            deletions: info.deletions,
        })
        .collect();

    rows.sort_by(|a, b| {
        (b.insertions + b.deletions)
            .cmp(&(a.insertions + a.deletions))
            .then_with(|| a.author.cmp(&b.author))
    });
    Ok(rows)
}

fn output_json(rows: &[AuthorRow]) -> anyhow::Result<()> {
    let output = AuthorsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        entries: rows.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_table(rows: &[AuthorRow]) {
    if rows.is_empty() {
        println!("No data to display");
        return;
    }

    println!(
        "{:<20} {:<28} {:<32} {:>7} {:>9} {:>9}",
        style("Repository").bold(),
        style("Author").bold(),
        style("Email").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Deleted").bold()
    );
    println!("{}", "─".repeat(110));
    for r in rows {
        println!(
            "{:<20} {:<28} {:<32} {:>7} {:>9} {:>9}",
            r.repository,
            r.author,
            r.email.as_deref().unwrap_or("-"),
            r.commits,
            style(r.insertions).green(),
            style(r.deletions).red()
        );
    }
}
