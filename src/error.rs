use thiserror::Error;

pub type Result<T> = std::result::Result<T, TallyError>;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{command}` failed ({status}): {stderr}")]
    Subprocess {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Malformed commit date in line {line:?}")]
    MalformedDate { line: String },
    #[error("Repository '{name}': {source}")]
    Repository {
        name: String,
        #[source]
        source: Box<TallyError>,
    },
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid repository entry: {0}")]
    InvalidRepository(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl TallyError {
    /// Attach the repository display name to a failed pass.
    pub fn in_repository(self, name: &str) -> Self {
        match self {
            TallyError::Repository { .. } => self,
            other => TallyError::Repository {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// True for failures that only abort the current repository.
    pub fn is_pass_fatal(&self) -> bool {
        match self {
            TallyError::Repository { source, .. } => source.is_pass_fatal(),
            TallyError::Subprocess { .. } | TallyError::MalformedDate { .. } | TallyError::Io(_) => true,
            _ => false,
        }
    }
}
