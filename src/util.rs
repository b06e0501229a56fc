use crate::error::{Result, TallyError};
use crate::model::DateWindow;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A repository to process and the name its rows are tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub name: String,
    pub path: PathBuf,
}

impl RepoSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Resolve a relative path against `base`.
    pub fn rooted_at(mut self, base: Option<&Path>) -> Self {
        if let Some(base) = base {
            if self.path.is_relative() {
                self.path = base.join(&self.path);
            }
        }
        self
    }
}

impl FromStr for RepoSpec {
    type Err = TallyError;

    /// `PATH` or `NAME=PATH`. Without a name the directory name is used.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TallyError::InvalidRepository("empty entry".to_string()));
        }
        if let Some((name, path)) = s.split_once('=') {
            if !name.is_empty() && !path.is_empty() {
                return Ok(Self::new(name, path));
            }
        }
        let path = PathBuf::from(s);
        Ok(Self::new(display_name(&path), path))
    }
}

pub fn display_name(path: &Path) -> String {
    let named = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty() && n != "." && n != "..");
    if let Some(name) = named {
        return name;
    }
    path.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Parse a repositories list: one entry per line, `#` starts a comment.
pub fn parse_repo_list(text: &str) -> Result<Vec<RepoSpec>> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::parse::<RepoSpec>)
        .collect()
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| TallyError::InvalidDate(format!("'{input}' is not YYYY-MM-DD: {e}")))
}

/// Build the report window from `--year` or `--since`/`--until`.
pub fn resolve_window(year: Option<i32>, since: Option<&str>, until: Option<&str>) -> Result<DateWindow> {
    if let Some(year) = year {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| TallyError::InvalidDate(format!("Invalid year: {year}")))?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
            .ok_or_else(|| TallyError::InvalidDate(format!("Invalid year: {year}")))?;
        return Ok(DateWindow::new().with_start(start).with_end(end));
    }

    let mut window = DateWindow::new();
    if let Some(s) = since {
        window = window.with_start(parse_date(s)?);
    }
    if let Some(u) = until {
        window = window.with_end(parse_date(u)?);
    }

    if let (Some(s), Some(u)) = (window.start, window.end) {
        if s >= u {
            return Err(TallyError::InvalidDate(format!(
                "Invalid range: since ({s}) is not before until ({u})"
            )));
        }
    }

    Ok(window)
}
