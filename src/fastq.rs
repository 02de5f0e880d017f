use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use memchr::memchr;
use tempfile::NamedTempFile;

use crate::error::GenerateError;

/// Offset between a Phred score and its FASTQ character.
const PHRED_OFFSET: u8 = 33;

const IO_BUF_SIZE: usize = 64 * 1024;

/// One FASTQ read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    /// Free text after the first space of the header line.
    pub description: String,
    pub sequence: String,
    /// Phred scores, one per base.
    pub quality: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>, quality: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            sequence: sequence.into(),
            quality,
        }
    }

    pub fn check(&self) -> Result<(), GenerateError> {
        if self.sequence.len() != self.quality.len() {
            return Err(GenerateError::RecordLength {
                id: self.id.clone(),
                sequence: self.sequence.len(),
                quality: self.quality.len(),
            });
        }
        Ok(())
    }

    /// Write the record as four FASTQ lines.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(b"@")?;
        out.write_all(self.id.as_bytes())?;
        if !self.description.is_empty() {
            out.write_all(b" ")?;
            out.write_all(self.description.as_bytes())?;
        }
        out.write_all(b"\n")?;
        out.write_all(self.sequence.as_bytes())?;
        out.write_all(b"\n+\n")?;
        let encoded: Vec<u8> = self.quality.iter().map(|q| q + PHRED_OFFSET).collect();
        out.write_all(&encoded)?;
        out.write_all(b"\n")
    }
}

/// Both mates of one fragment. They share `forward.id == reverse.id`;
/// mate markers only appear once the pair is interleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    pub forward: SequenceRecord,
    pub reverse: SequenceRecord,
}

/// Build the alternating forward/reverse record list of an interleaved file.
pub fn interleave(forward: &[SequenceRecord], reverse: &[SequenceRecord]) -> Vec<SequenceRecord> {
    let mut out = Vec::with_capacity(forward.len() + reverse.len());
    for (f, r) in forward.iter().zip(reverse) {
        out.push(mate(f, "\\1"));
        out.push(mate(r, "\\2"));
    }
    out
}

fn mate(record: &SequenceRecord, marker: &str) -> SequenceRecord {
    SequenceRecord {
        id: format!("{}{}", record.id, marker),
        description: String::new(),
        sequence: record.sequence.clone(),
        quality: record.quality.clone(),
    }
}

/// Whether a path names a gzip-wrapped file.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Write records to `path` atomically, gzip-compressing when the path ends
/// in `.gz`. The file only appears once every record has been written.
pub fn write_records(path: &Path, records: &[SequenceRecord]) -> Result<(), GenerateError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GenerateError::io(dir, e))?;
    {
        let buffered = io::BufWriter::with_capacity(IO_BUF_SIZE, tmp.as_file_mut());
        let result = if is_gzip_path(path) {
            let mut encoder = GzEncoder::new(buffered, Compression::default());
            write_all_records(&mut encoder, records)
                .and_then(|_| encoder.finish())
                .and_then(|mut w| w.flush())
        } else {
            let mut w = buffered;
            write_all_records(&mut w, records).and_then(|_| w.flush())
        };
        result.map_err(|e| GenerateError::io(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| GenerateError::io(path, e.error))?;
    Ok(())
}

fn write_all_records<W: Write>(out: &mut W, records: &[SequenceRecord]) -> io::Result<()> {
    for record in records {
        record.write_to(out)?;
    }
    Ok(())
}

/// Open a file for reading, transparently decoding gzip by extension.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip_path(path) {
        let decoder = MultiGzDecoder::new(BufReader::with_capacity(IO_BUF_SIZE, file));
        Ok(Box::new(BufReader::with_capacity(IO_BUF_SIZE, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(IO_BUF_SIZE, file)))
    }
}

/// Read every record of a FASTQ file.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, GenerateError> {
    let input = open_reader(path).map_err(|e| GenerateError::io(path, e))?;
    parse_records(input).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => GenerateError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        _ => GenerateError::io(path, e),
    })
}

/// Parse 4-line FASTQ records from any buffered reader.
pub fn parse_records<R: BufRead>(mut input: R) -> io::Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut h = Vec::<u8>::with_capacity(256);
    let mut s = Vec::<u8>::with_capacity(256);
    let mut p = Vec::<u8>::with_capacity(256);
    let mut q = Vec::<u8>::with_capacity(256);

    loop {
        if read_line(&mut input, &mut h)? == 0 {
            break;
        }
        if read_line(&mut input, &mut s)? == 0
            || read_line(&mut input, &mut p)? == 0
            || read_line(&mut input, &mut q)? == 0
        {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated FASTQ record (expected 4 lines)",
            ));
        }
        records.push(decode_record(trim(&h), trim(&s), trim(&p), trim(&q))?);
    }
    Ok(records)
}

fn decode_record(header: &[u8], seq: &[u8], plus: &[u8], qual: &[u8]) -> io::Result<SequenceRecord> {
    let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidData, msg);

    let Some(header) = header.strip_prefix(b"@") else {
        return Err(invalid("header line does not start with '@'".to_string()));
    };
    if plus.first() != Some(&b'+') {
        return Err(invalid("separator line does not start with '+'".to_string()));
    }
    let header = std::str::from_utf8(header)
        .map_err(|_| invalid("header line is not valid UTF-8".to_string()))?;
    let (id, description) = match header.split_once(' ') {
        Some((id, desc)) => (id.to_string(), desc.to_string()),
        None => (header.to_string(), String::new()),
    };
    if seq.len() != qual.len() {
        return Err(invalid(format!(
            "record {id:?}: {} bases but {} quality characters",
            seq.len(),
            qual.len()
        )));
    }
    let sequence = String::from_utf8(seq.to_vec())
        .map_err(|_| invalid(format!("record {id:?}: sequence is not valid UTF-8")))?;
    let mut quality = Vec::with_capacity(qual.len());
    for &c in qual {
        if c < PHRED_OFFSET {
            return Err(invalid(format!("record {id:?}: invalid quality character {c:#04x}")));
        }
        quality.push(c - PHRED_OFFSET);
    }
    Ok(SequenceRecord {
        id,
        description,
        sequence,
        quality,
    })
}

fn trim(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Read one line (including the trailing '\n' if present) into buf.
/// Returns number of bytes read (0 on EOF).
fn read_line<R: BufRead>(r: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    buf.clear();
    let mut total = 0usize;
    loop {
        let available = r.fill_buf()?;
        if available.is_empty() {
            return Ok(total);
        }
        if let Some(pos) = memchr(b'\n', available) {
            buf.extend_from_slice(&available[..=pos]);
            let consume = pos + 1;
            r.consume(consume);
            total += consume;
            return Ok(total);
        } else {
            buf.extend_from_slice(available);
            let consume = available.len();
            r.consume(consume);
            total += consume;
        }
    }
}

/// Drain a reader to completion; used by tests that inspect gzip output.
#[cfg(test)]
pub(crate) fn read_to_vec(path: &Path) -> io::Result<Vec<u8>> {
    use std::io::Read;
    let mut buf = Vec::new();
    open_reader(path)?.read_to_end(&mut buf)?;
    Ok(buf)
}
