use crate::error::{Result, TallyError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Header format consumed by [`super::line::classify`]: `date|sha|author|email`.
pub const PRETTY_FORMAT: &str = "--pretty=%cd|%H|%aN|%aE";

/// `git log` invocation for one repository.
#[derive(Debug, Clone)]
pub struct LogCommand {
    repo: PathBuf,
    hard: bool,
}

impl LogCommand {
    pub fn new<P: AsRef<Path>>(repo: P) -> Self {
        Self {
            repo: repo.as_ref().to_path_buf(),
            hard: false,
        }
    }

    /// Enable copy and rename detection (`-C -C -M`).
    pub fn hard(mut self, hard: bool) -> Self {
        self.hard = hard;
        self
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "log".into(),
            "--reverse".into(),
            PRETTY_FORMAT.into(),
            "--stat=100000,8192".into(),
            "--no-merges".into(),
            "-w".into(),
        ];
        if self.hard {
            args.extend(["-C", "-C", "-M"].map(String::from));
        }
        args.push("--date=short".into());
        args
    }

    /// Run to completion and return stdout split into raw lines.
    ///
    /// The whole stream is drained and the child reaped before returning.
    /// A non-zero exit is an error even if some output was produced.
    pub fn run(&self) -> Result<Vec<Vec<u8>>> {
        let args = self.args();
        debug!(repo = %self.repo.display(), ?args, "running git log");

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(&args)
            .env("GIT_PAGER", "cat")
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(TallyError::Subprocess {
                command: format!("git -C {} {}", self.repo.display(), args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(split_lines(&output.stdout))
    }
}

pub fn split_lines(stdout: &[u8]) -> Vec<Vec<u8>> {
    if stdout.is_empty() {
        return Vec::new();
    }
    let body = stdout.strip_suffix(b"\n").unwrap_or(stdout);
    body.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
}
