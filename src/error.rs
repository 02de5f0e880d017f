use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while building or writing fixtures.
///
/// Fixture generation never emits a partial set: any of these aborts the
/// whole `generate` / `extract` run before a file is persisted.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("empty quality range {lo}..{hi}")]
    EmptyRange { lo: u8, hi: u8 },
    #[error("quality {0} above the Phred maximum of {max}", max = crate::quality::PHRED_MAX)]
    QualityOverflow(u8),
    #[error("degraded bin {start}..{end} does not fit a read of length {length}")]
    BinBounds {
        start: usize,
        end: usize,
        length: usize,
    },
    #[error("mate count mismatch: {forward} forward vs {reverse} reverse records")]
    MateCount { forward: usize, reverse: usize },
    #[error("record {id:?}: sequence length {sequence} differs from quality length {quality}")]
    RecordLength {
        id: String,
        sequence: usize,
        quality: usize,
    },
    #[error("duplicate read identifier {0:?}")]
    DuplicateId(String),
    #[error("index {index} out of range for {available} read pairs (indices are 1-based)")]
    IndexOutOfRange { index: usize, available: usize },
    #[error("malformed FASTQ in {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}
