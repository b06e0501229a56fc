//! Per-author, per-day line totals from `git log --stat` output.
//!
//! Raw log lines flow through [`encoding::normalize_line`], are grouped into
//! commits by [`log::Segmenter`] (consulting a [`filter::FilterGate`]), and
//! are folded into `(date, author)` totals by [`changes::Changes`].

pub mod authors;
pub mod changes;
pub mod cli;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod log;
pub mod model;
pub mod report;
pub mod util;

pub use changes::{Aggregates, Changes};
pub use error::{Result, TallyError};
pub use filter::{Dimension, ExclusionRules, FilterGate, NoFilter};
