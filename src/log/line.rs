use crate::error::{Result, TallyError};
use chrono::NaiveDate;

/// One classified line of `git log --pretty=%cd|%H|%aN|%aE --stat` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    CommitHeader(CommitHeader),
    FileDiffStat(FileDiffStat),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
    pub date: NaiveDate,
    pub sha: String,
    pub author: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiffStat {
    pub filename: String,
    pub insertions: u64,
    pub deletions: u64,
}

/// Classify a normalized line.
///
/// A header is `date|sha|author|email`: date and sha come from the front,
/// email from the back, and the author is everything in between, so it may
/// itself contain `|`. A diff-stat is `name | <count> <graph>` split on the
/// last `|`, so the name may contain `|`. A line with four or more fields
/// that is neither is a header with a malformed date, which is an error.
pub fn classify(line: &str) -> Result<LogLine> {
    if let Some(header) = parse_header(line) {
        return Ok(LogLine::CommitHeader(header));
    }

    if let Some((name, graph)) = line.rsplit_once('|') {
        if is_diff_graph(graph) {
            return Ok(LogLine::FileDiffStat(FileDiffStat {
                filename: resolve_filename(name),
                insertions: graph.matches('+').count() as u64,
                deletions: graph.matches('-').count() as u64,
            }));
        }
    }

    if line.split('|').count() >= 4 {
        return Err(TallyError::MalformedDate {
            line: line.to_string(),
        });
    }
    Ok(LogLine::Other)
}

fn parse_header(line: &str) -> Option<CommitHeader> {
    let mut front = line.splitn(3, '|');
    let date = NaiveDate::parse_from_str(front.next()?.trim(), "%Y-%m-%d").ok()?;
    let sha = front.next()?;
    let (author, email) = front.next()?.rsplit_once('|')?;
    Some(CommitHeader {
        date,
        sha: sha.trim().to_string(),
        author: author.trim().to_string(),
        email: email.trim().to_string(),
    })
}

/// `<count> <graph>`: digits, spaces and at least one `+` or `-`.
fn is_diff_graph(graph: &str) -> bool {
    graph.chars().all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-'))
        && (graph.contains('+') || graph.contains('-'))
}

/// Strip quoting and resolve rename notation to the destination path.
fn resolve_filename(raw: &str) -> String {
    let name = raw.trim().trim_matches('"');

    if let (Some(open), Some(close)) = (name.find('{'), name.rfind('}')) {
        if open < close {
            if let Some((_, to)) = name[open + 1..close].split_once(" => ") {
                let joined = format!("{}{}{}", &name[..open], to, &name[close + 1..]);
                return joined.replace("//", "/").trim_start_matches('/').to_string();
            }
        }
    }

    match name.split_once(" => ") {
        Some((_, to)) => to.trim().to_string(),
        None => name.to_string(),
    }
}
