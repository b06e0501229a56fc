pub mod command;
pub mod line;
pub mod segment;

pub use command::LogCommand;
pub use line::{classify, CommitHeader, FileDiffStat, LogLine};
pub use segment::{segment, Segmented, Segmenter};
