use super::line::{classify, CommitHeader, FileDiffStat, LogLine};
use crate::error::Result;
use crate::filter::FilterGate;
use crate::model::{CommitRecord, FileDiffRecord};
use std::collections::HashMap;
use tracing::debug;

/// Groups a normalized line stream into commits.
///
/// One commit is buffered at a time: it is opened by its header line and
/// closed by the next header or by [`Segmenter::finish`]. Closed commits are
/// kept only if at least one file change passed the filter gate.
pub struct Segmenter<G: FilterGate> {
    gate: G,
    open: Option<CommitRecord>,
    closed: Vec<CommitRecord>,
    headers_seen: usize,
    emails_by_author: HashMap<String, String>,
    authors_by_email: HashMap<String, String>,
}

/// Everything one pass over a log stream produced.
#[derive(Debug, Clone, Default)]
pub struct Segmented {
    pub commits: Vec<CommitRecord>,
    pub headers_seen: usize,
    pub emails_by_author: HashMap<String, String>,
    pub authors_by_email: HashMap<String, String>,
}

impl<G: FilterGate> Segmenter<G> {
    pub fn new(gate: G) -> Self {
        Self {
            gate,
            open: None,
            closed: Vec::new(),
            headers_seen: 0,
            emails_by_author: HashMap::new(),
            authors_by_email: HashMap::new(),
        }
    }

    /// Feed one normalized line. Fails only on a header with a malformed date.
    pub fn push(&mut self, line: &str) -> Result<()> {
        match classify(line)? {
            LogLine::CommitHeader(header) => self.open_commit(header),
            LogLine::FileDiffStat(stat) => self.add_file_diff(stat, line),
            LogLine::Other => {}
        }
        Ok(())
    }

    /// End of stream: close the last open commit.
    pub fn finish(mut self) -> Segmented {
        self.close_open();
        Segmented {
            commits: self.closed,
            headers_seen: self.headers_seen,
            emails_by_author: self.emails_by_author,
            authors_by_email: self.authors_by_email,
        }
    }

    fn open_commit(&mut self, header: CommitHeader) {
        self.close_open();
        self.headers_seen += 1;

        self.emails_by_author.insert(header.author.clone(), header.email.clone());
        self.authors_by_email.insert(header.email.clone(), header.author.clone());

        self.open = Some(CommitRecord::new(header.date, header.sha, header.author, header.email));
    }

    fn close_open(&mut self) {
        if let Some(commit) = self.open.take() {
            if commit.is_empty() {
                debug!(sha = %commit.sha, "dropping commit with no accepted file changes");
            } else {
                self.closed.push(commit);
            }
        }
    }

    fn add_file_diff(&mut self, stat: FileDiffStat, line: &str) {
        let Some(commit) = self.open.as_mut() else {
            debug!(line, "diff-stat line before any commit header, skipping");
            return;
        };

        let excluded = self.gate.exclude_filename(&stat.filename)
            || self.gate.exclude_author(&commit.author)
            || self.gate.exclude_email(&commit.email)
            || self.gate.exclude_revision(&commit.sha);
        if excluded {
            return;
        }

        commit.add_file_diff(FileDiffRecord {
            filename: stat.filename,
            insertions: stat.insertions,
            deletions: stat.deletions,
        });
    }
}

/// Segment a whole stream of normalized lines.
pub fn segment<G, I, S>(gate: G, lines: I) -> Result<Segmented>
where
    G: FilterGate,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = Segmenter::new(gate);
    for line in lines {
        segmenter.push(line.as_ref())?;
    }
    Ok(segmenter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ExclusionRules, NoFilter};
    use pretty_assertions::assert_eq;

    #[test]
    fn header_alone_yields_nothing() {
        let out = segment(NoFilter, ["2019-02-10|abc123|Alice|alice@x.com"]).unwrap();
        assert!(out.commits.is_empty());
        assert_eq!(out.headers_seen, 1);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        let out = segment(NoFilter, Vec::<String>::new()).unwrap();
        assert!(out.commits.is_empty());
        assert_eq!(out.headers_seen, 0);
    }

    #[test]
    fn commit_closed_by_next_header_and_by_end_of_stream() {
        let out = segment(
            NoFilter,
            [
                "2019-02-10|abc123|Alice|alice@x.com",
                "",
                "foo.py | 4 +++-",
                "1 file changed, 3 insertions(+), 1 deletion(-)",
                "2019-02-11|def456|Bob|bob@x.com",
                "",
                "bar.py | 2 ++",
            ],
        )
        .unwrap();

        assert_eq!(out.commits.len(), 2);
        assert_eq!(out.commits[0].sha, "abc123");
        assert_eq!(
            out.commits[0].file_diffs,
            vec![FileDiffRecord {
                filename: "foo.py".to_string(),
                insertions: 3,
                deletions: 1,
            }]
        );
        assert_eq!(out.commits[1].sha, "def456");
        assert_eq!(out.commits[1].file_diffs[0].insertions, 2);
    }

    #[test]
    fn trailing_commit_without_changes_is_dropped() {
        let out = segment(
            NoFilter,
            [
                "2019-02-10|abc123|Alice|alice@x.com",
                "foo.py | 4 +++-",
                "2019-02-11|def456|Bob|bob@x.com",
            ],
        )
        .unwrap();
        assert_eq!(out.commits.len(), 1);
        assert_eq!(out.commits[0].author, "Alice");
    }

    #[test]
    fn diff_stat_before_header_is_discarded() {
        let out = segment(NoFilter, ["stray.py | 3 +++", "2019-02-10|abc123|Alice|alice@x.com", "foo.py | 1 +"]).unwrap();
        assert_eq!(out.commits.len(), 1);
        assert_eq!(out.commits[0].file_diffs.len(), 1);
        assert_eq!(out.commits[0].file_diffs[0].filename, "foo.py");
    }

    #[test]
    fn closed_commits_never_exceed_headers() {
        let lines = [
            "a.rs | 1 +",
            "2019-01-01|s1|A|a@x",
            "a.rs | 1 +",
            "2019-01-02|s2|B|b@x",
            "2019-01-03|s3|C|c@x",
            "c.rs | 2 --",
            "c.rs | 2 ++",
        ];
        let out = segment(NoFilter, lines).unwrap();
        assert!(out.commits.len() <= out.headers_seen);
        assert_eq!(out.commits.iter().map(|c| c.sha.as_str()).collect::<Vec<_>>(), vec!["s1", "s3"]);
    }

    #[test]
    fn excluded_files_are_not_recorded() {
        let rules = ExclusionRules::parse(&["\\.lock$"]).unwrap();
        let out = segment(
            &rules,
            [
                "2019-02-10|abc123|Alice|alice@x.com",
                "Cargo.lock | 10 ++++++++++",
                "2019-02-11|def456|Alice|alice@x.com",
                "Cargo.lock | 2 ++",
                "src/lib.rs | 1 -",
            ],
        )
        .unwrap();
        assert_eq!(out.commits.len(), 1);
        assert_eq!(out.commits[0].sha, "def456");
        assert_eq!(out.commits[0].file_diffs.len(), 1);
        assert_eq!(out.commits[0].file_diffs[0].filename, "src/lib.rs");
    }

    #[test]
    fn commit_dimensions_exclude_every_file() {
        for rule in ["author:^Bob$", "email:bob@", "revision:^def"] {
            let rules = ExclusionRules::parse(&[rule]).unwrap();
            let out = segment(
                &rules,
                [
                    "2019-02-10|abc123|Alice|alice@x.com",
                    "a.py | 1 +",
                    "2019-02-11|def456|Bob|bob@x.com",
                    "b.py | 1 +",
                ],
            )
            .unwrap();
            assert_eq!(out.commits.len(), 1, "rule {rule}");
            assert_eq!(out.commits[0].author, "Alice");
        }
    }

    #[test]
    fn malformed_header_date_fails_the_pass() {
        let result = segment(NoFilter, ["2019-02-10|abc|A|a@x", "a.py | 1 +", "yesterday|def|B|b@x"]);
        assert!(result.is_err());
    }

    #[test]
    fn identity_maps_track_latest_values() {
        let rules = ExclusionRules::parse(&["author:.*"]).unwrap();
        let out = segment(
            &rules,
            [
                "2019-01-01|s1|Alice|alice@old.com",
                "2019-01-02|s2|Alice|alice@new.com",
                "2019-01-03|s3|A. Smith|alice@new.com",
            ],
        )
        .unwrap();
        assert!(out.commits.is_empty());
        assert_eq!(out.emails_by_author["Alice"], "alice@new.com");
        assert_eq!(out.authors_by_email["alice@new.com"], "A. Smith");
        assert_eq!(out.authors_by_email["alice@old.com"], "Alice");
    }
}
