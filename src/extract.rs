use std::path::Path;

use tracing::info;

use crate::error::GenerateError;
use crate::fastq::read_records;
use crate::fixture::FixtureSet;

/// Pick read pairs out of a forward/reverse fixture by 1-based index, in the
/// order given. This is how expected outputs are assembled from an input
/// fixture once the surviving reads of a trimmer setting are known.
pub fn extract_pairs(
    forward: &Path,
    reverse: &Path,
    indices: &[usize],
) -> Result<FixtureSet, GenerateError> {
    let forward_records = read_records(forward)?;
    let reverse_records = read_records(reverse)?;
    if forward_records.len() != reverse_records.len() {
        return Err(GenerateError::MateCount {
            forward: forward_records.len(),
            reverse: reverse_records.len(),
        });
    }

    let mut set = FixtureSet::default();
    for &index in indices {
        let Some(i) = index.checked_sub(1).filter(|&i| i < forward_records.len()) else {
            return Err(GenerateError::IndexOutOfRange {
                index,
                available: forward_records.len(),
            });
        };
        set.forward.push(forward_records[i].clone());
        set.reverse.push(reverse_records[i].clone());
    }
    info!(
        "extracted {} of {} read pairs from {}",
        set.len(),
        forward_records.len(),
        forward.display()
    );
    Ok(set)
}
