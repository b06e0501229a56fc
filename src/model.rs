use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Header row of the CSV report.
pub const COLUMN_HEADERS: [&str; 5] = ["Author", "Date", "Repository", "Lines added", "Lines deleted"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiffRecord {
    pub filename: String,
    pub insertions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub date: NaiveDate,
    pub author: String,
    pub email: String,
    pub file_diffs: Vec<FileDiffRecord>,
}

impl CommitRecord {
    pub fn new(date: NaiveDate, sha: String, author: String, email: String) -> Self {
        Self {
            sha,
            date,
            author,
            email,
            file_diffs: Vec::new(),
        }
    }

    pub fn add_file_diff(&mut self, diff: FileDiffRecord) {
        self.file_diffs.push(diff);
    }

    pub fn is_empty(&self) -> bool {
        self.file_diffs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub commits: u32,
    pub insertions: u64,
    pub deletions: u64,
}

impl AuthorInfo {
    /// Fold one commit in. Commits without file diffs leave the totals untouched.
    pub fn add_commit(&mut self, commit: &CommitRecord) {
        if commit.is_empty() {
            return;
        }
        self.commits += 1;
        for diff in &commit.file_diffs {
            self.insertions += diff.insertions;
            self.deletions += diff.deletions;
        }
    }
}

/// `(date, author)` aggregation key. Field order gives the report ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateAuthorKey {
    pub date: NaiveDate,
    pub author: String,
}

impl DateAuthorKey {
    pub fn new(date: NaiveDate, author: impl Into<String>) -> Self {
        Self {
            date,
            author: author.into(),
        }
    }
}

/// Half-open `[start, end)` window over calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new() -> Self {
        Self { start: None, end: None }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < &start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date >= &end {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub author: String,
    pub date: NaiveDate,
    pub repository: String,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl ReportRow {
    pub fn record(&self) -> [String; 5] {
        [
            self.author.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.repository.clone(),
            self.lines_added.to_string(),
            self.lines_deleted.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub window: DateWindow,
    pub repositories: Vec<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRow {
    pub repository: String,
    pub author: String,
    pub email: Option<String>,
    pub commits: u32,
    pub insertions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<AuthorRow>,
}
