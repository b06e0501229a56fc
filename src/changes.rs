use crate::encoding::normalize_line;
use crate::error::Result;
use crate::filter::FilterGate;
use crate::log::{LogCommand, Segmenter};
use crate::model::{AuthorInfo, CommitRecord, DateAuthorKey, DateWindow};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Commits of one repository pass, after filtering.
#[derive(Debug, Clone, Default)]
pub struct Changes {
    commits: Vec<CommitRecord>,
    headers_seen: usize,
    emails_by_author: HashMap<String, String>,
    authors_by_email: HashMap<String, String>,
}

/// Totals derived from a [`Changes`]. Immutable once computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    by_author: BTreeMap<String, AuthorInfo>,
    by_date_author: BTreeMap<DateAuthorKey, AuthorInfo>,
}

impl Changes {
    /// Run `git log` for the repository and segment its output.
    pub fn collect<G: FilterGate>(command: &LogCommand, gate: G) -> Result<Self> {
        let raw = command.run()?;
        debug!(repo = %command.repo().display(), lines = raw.len(), "git log drained");
        Self::from_raw_lines(gate, &raw)
    }

    /// Normalize and segment raw log lines.
    pub fn from_raw_lines<G, L>(gate: G, raw: &[L]) -> Result<Self>
    where
        G: FilterGate,
        L: AsRef<[u8]>,
    {
        let mut segmenter = Segmenter::new(gate);
        for line in raw {
            segmenter.push(&normalize_line(line.as_ref()))?;
        }
        let segmented = segmenter.finish();

        Ok(Self {
            commits: segmented.commits,
            headers_seen: segmented.headers_seen,
            emails_by_author: segmented.emails_by_author,
            authors_by_email: segmented.authors_by_email,
        })
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn headers_seen(&self) -> usize {
        self.headers_seen
    }

    pub fn first_commit_date(&self) -> Option<NaiveDate> {
        self.commits.first().map(|c| c.date)
    }

    pub fn last_commit_date(&self) -> Option<NaiveDate> {
        self.commits.last().map(|c| c.date)
    }

    pub fn latest_email_by_author(&self, author: &str) -> Option<&str> {
        self.emails_by_author.get(author).map(String::as_str)
    }

    pub fn latest_author_by_email(&self, email: &str) -> Option<&str> {
        self.authors_by_email.get(email).map(String::as_str)
    }

    /// Keep only commits dated inside `window`.
    pub fn restrict_to(mut self, window: &DateWindow) -> Self {
        self.commits.retain(|c| window.contains(&c.date));
        self
    }

    pub fn compute_aggregates(&self) -> Aggregates {
        Aggregates {
            by_author: aggregate_by_author(&self.commits),
            by_date_author: aggregate_by_date_author(&self.commits),
        }
    }
}

impl Aggregates {
    pub fn by_author(&self) -> &BTreeMap<String, AuthorInfo> {
        &self.by_author
    }

    pub fn by_date_author(&self) -> &BTreeMap<DateAuthorKey, AuthorInfo> {
        &self.by_date_author
    }

    pub fn select(&self, window: &DateWindow) -> Vec<(DateAuthorKey, AuthorInfo)> {
        select_by_date_range(&self.by_date_author, window)
    }
}

pub fn aggregate_by_author(commits: &[CommitRecord]) -> BTreeMap<String, AuthorInfo> {
    fold(commits, |c| c.author.clone())
}

pub fn aggregate_by_date_author(commits: &[CommitRecord]) -> BTreeMap<DateAuthorKey, AuthorInfo> {
    fold(commits, |c| DateAuthorKey::new(c.date, c.author.as_str()))
}

fn fold<K: Ord>(commits: &[CommitRecord], key: impl Fn(&CommitRecord) -> K) -> BTreeMap<K, AuthorInfo> {
    let mut map = BTreeMap::new();
    for commit in commits.iter().filter(|c| !c.is_empty()) {
        map.entry(key(commit)).or_insert_with(AuthorInfo::default).add_commit(commit);
    }
    map
}

/// Entries with `start <= date < end`, ordered by date then author.
pub fn select_by_date_range(
    map: &BTreeMap<DateAuthorKey, AuthorInfo>,
    window: &DateWindow,
) -> Vec<(DateAuthorKey, AuthorInfo)> {
    map.iter()
        .filter(|(key, _)| window.contains(&key.date))
        .map(|(key, info)| (key.clone(), *info))
        .collect()
}
