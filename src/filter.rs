use crate::error::{Result, TallyError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// What an exclusion rule is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Filename,
    Author,
    Email,
    Revision,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Filename,
        Dimension::Author,
        Dimension::Email,
        Dimension::Revision,
    ];

    fn index(self) -> usize {
        match self {
            Dimension::Filename => 0,
            Dimension::Author => 1,
            Dimension::Email => 2,
            Dimension::Revision => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Filename => "file",
            Dimension::Author => "author",
            Dimension::Email => "email",
            Dimension::Revision => "revision",
        };
        f.write_str(name)
    }
}

impl FromStr for Dimension {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "file" | "filename" => Ok(Dimension::Filename),
            "author" => Ok(Dimension::Author),
            "email" => Ok(Dimension::Email),
            "revision" | "sha" => Ok(Dimension::Revision),
            _ => Err(()),
        }
    }
}

/// Decides whether a file change is left out of the totals.
pub trait FilterGate {
    fn should_exclude(&self, dimension: Dimension, value: &str) -> bool;

    fn exclude_filename(&self, filename: &str) -> bool {
        self.should_exclude(Dimension::Filename, filename)
    }

    fn exclude_author(&self, author: &str) -> bool {
        self.should_exclude(Dimension::Author, author)
    }

    fn exclude_email(&self, email: &str) -> bool {
        self.should_exclude(Dimension::Email, email)
    }

    fn exclude_revision(&self, sha: &str) -> bool {
        self.should_exclude(Dimension::Revision, sha)
    }
}

impl<G: FilterGate + ?Sized> FilterGate for &G {
    fn should_exclude(&self, dimension: Dimension, value: &str) -> bool {
        (**self).should_exclude(dimension, value)
    }
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl FilterGate for NoFilter {
    fn should_exclude(&self, _dimension: Dimension, _value: &str) -> bool {
        false
    }
}

/// Regex exclusion lists, one per dimension.
///
/// Rules are written `file:<re>`, `author:<re>`, `email:<re>` or
/// `revision:<re>`; a rule without a known prefix is a filename pattern.
/// A value is excluded when any pattern of its dimension matches anywhere
/// in it.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    patterns: [Vec<Regex>; 4],
}

impl ExclusionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse<S: AsRef<str>>(rules: &[S]) -> Result<Self> {
        let mut parsed = Self::new();
        for rule in rules {
            parsed.add_rule(rule.as_ref())?;
        }
        Ok(parsed)
    }

    pub fn add_rule(&mut self, rule: &str) -> Result<()> {
        let (dimension, pattern) = match rule.split_once(':') {
            Some((prefix, rest)) => match prefix.parse::<Dimension>() {
                Ok(d) => (d, rest),
                Err(()) => (Dimension::Filename, rule),
            },
            None => (Dimension::Filename, rule),
        };
        self.add_pattern(dimension, pattern)
    }

    pub fn add_pattern(&mut self, dimension: Dimension, pattern: &str) -> Result<()> {
        let re = Regex::new(pattern).map_err(|source| TallyError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns[dimension.index()].push(re);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.iter().all(Vec::is_empty)
    }

    pub fn patterns(&self, dimension: Dimension) -> impl Iterator<Item = &str> {
        self.patterns[dimension.index()].iter().map(Regex::as_str)
    }
}

impl FilterGate for ExclusionRules {
    fn should_exclude(&self, dimension: Dimension, value: &str) -> bool {
        self.patterns[dimension.index()].iter().any(|re| re.is_match(value))
    }
}
