use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::Serialize;
use sha2::{Digest, Sha256};

const HASH_BLOCK_SIZE: usize = 1 << 20;

/// How an actual artifact is checked against its oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Digest of the raw bytes.
    Binary,
    /// Digest of the decompressed bytes.
    Gzip,
    /// Actual artifact must be zero bytes long.
    Empty,
}

/// One expected-vs-actual check of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSpec {
    /// Oracle file; `None` for [`CompareMode::Empty`].
    pub expected: Option<PathBuf>,
    pub actual: PathBuf,
    pub mode: CompareMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Match,
    HashMismatch { expected: String, actual: String },
    NotEmpty { size: u64 },
    Unreadable { message: String },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

/// Evaluate one [`DiffSpec`]. I/O failures on either side are reported as
/// [`Verdict::Unreadable`], never returned as errors.
pub fn compare(spec: &DiffSpec) -> Verdict {
    let result = match spec.mode {
        CompareMode::Binary => compare_digests(spec, |path| Ok(Box::new(File::open(path)?))),
        CompareMode::Gzip => compare_digests(spec, |path| {
            let file = File::open(path)?;
            // a zero-byte file reads as empty content, not as a broken stream
            if file.metadata()?.len() == 0 {
                return Ok(Box::new(io::empty()));
            }
            Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
        }),
        CompareMode::Empty => std::fs::metadata(&spec.actual).map(|meta| match meta.len() {
            0 => Verdict::Match,
            size => Verdict::NotEmpty { size },
        }),
    };
    result.unwrap_or_else(|e| Verdict::Unreadable {
        message: e.to_string(),
    })
}

fn compare_digests<F>(spec: &DiffSpec, open: F) -> io::Result<Verdict>
where
    F: Fn(&Path) -> io::Result<Box<dyn Read>>,
{
    let Some(expected) = spec.expected.as_deref() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no expected artifact to compare against",
        ));
    };
    let expected = hash_reader(open(expected)?)?;
    let actual = hash_reader(open(&spec.actual)?)?;
    if expected == actual {
        Ok(Verdict::Match)
    } else {
        Ok(Verdict::HashMismatch { expected, actual })
    }
}

/// Hex SHA-256 of everything `reader` yields, read in fixed-size blocks.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; HASH_BLOCK_SIZE];
    loop {
        let n = match reader.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&block[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Human-readable line for a failed comparison.
pub struct Mismatch<'a> {
    pub spec: &'a DiffSpec,
    pub verdict: &'a Verdict,
}

impl fmt::Display for Mismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = self
            .spec
            .expected
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let actual = self.spec.actual.display();
        match self.verdict {
            Verdict::Match => write!(f, "{expected} matches {actual}"),
            Verdict::HashMismatch {
                expected: h1,
                actual: h2,
            } => match self.spec.mode {
                CompareMode::Gzip => write!(
                    f,
                    "sha256(gunzip({expected})) == {h1} != {h2} == sha256(gunzip({actual}))"
                ),
                _ => write!(f, "sha256({expected}) == {h1} != {h2} == sha256({actual})"),
            },
            Verdict::NotEmpty { size } => write!(f, "file {actual} is not empty ({size} bytes)"),
            Verdict::Unreadable { message } => {
                write!(f, "error when trying to compare {expected} to {actual}: {message}")
            }
        }
    }
}
