//! Synthetic paired-end fixtures.
//!
//! A fixture set is fully determined by its [`Mode`] and seed. One
//! `ChaCha20Rng` is seeded per run and threaded through every draw in a fixed
//! order: for each pair the title first, then the degraded profile (if any),
//! then the forward record, then the reverse record. Each record draws its
//! bases followed by a uniform-good quality string, even when that string is
//! then replaced by a degraded profile.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, warn};

use crate::error::GenerateError;
use crate::fastq::{interleave, write_records, ReadPair, SequenceRecord};
use crate::quality::{QualityShape, Side, BAD, GOOD, MEAN};
use crate::title::TitleSynthesizer;

const BASES: [char; 4] = ['A', 'T', 'C', 'G'];

/// (read count, read length) entries of the bulk volume fixture.
const BULK_POOL: [(usize, usize); 5] = [(1500, 30), (2000, 40), (3000, 50), (1500, 75), (2000, 100)];

/// (forward length, reverse length) around the 20, 50 and 100 thresholds.
const LENGTH_POOL: [(usize, usize); 9] = [
    (20, 19),
    (20, 20),
    (20, 21),
    (49, 50),
    (51, 50),
    (50, 50),
    (100, 99),
    (100, 100),
    (101, 101),
];

const QUALSLD_LENGTH: usize = 100;
const QUALTAIL_LENGTH: usize = 150;

/// Profile of every base that is not deliberately degraded.
const CLEAN: QualityShape = QualityShape::Uniform(GOOD);

/// Kind of fixture to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// 10,000 pairs of five lengths, for threading and compression tests
    Big,
    /// One pair per length boundary around 20, 50 and 100
    Lengthmin,
    /// Degraded quality windows inside the read
    Qualsld,
    /// Degraded quality tails
    Qualtail,
    /// Low-complexity sequences with known dust scores
    Infodust,
    /// Sequences with known counts of ambiguous bases
    Infon,
}

impl Mode {
    /// File stem of the generated set, e.g. `LENGTHMIN`.
    pub fn stem(self) -> &'static str {
        match self {
            Mode::Big => "BIG",
            Mode::Lengthmin => "LENGTHMIN",
            Mode::Qualsld => "QUALSLD",
            Mode::Qualtail => "QUALTAIL",
            Mode::Infodust => "INFODUST",
            Mode::Infon => "INFON",
        }
    }
}

/// Forward and reverse mates, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    pub forward: Vec<SequenceRecord>,
    pub reverse: Vec<SequenceRecord>,
}

impl FixtureSet {
    fn push(&mut self, pair: ReadPair) {
        self.forward.push(pair.forward);
        self.reverse.push(pair.reverse);
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn interleaved(&self) -> Vec<SequenceRecord> {
        interleave(&self.forward, &self.reverse)
    }

    /// Check mate counts, per-record lengths and identifier uniqueness.
    pub fn check(&self) -> Result<(), GenerateError> {
        self.check_layout()?;
        let mut seen = HashSet::with_capacity(self.forward.len());
        for record in &self.forward {
            if !seen.insert(record.id.as_str()) {
                return Err(GenerateError::DuplicateId(record.id.clone()));
            }
        }
        Ok(())
    }

    fn check_layout(&self) -> Result<(), GenerateError> {
        if self.forward.len() != self.reverse.len() {
            return Err(GenerateError::MateCount {
                forward: self.forward.len(),
                reverse: self.reverse.len(),
            });
        }
        for (f, r) in self.forward.iter().zip(&self.reverse) {
            f.check()?;
            r.check()?;
        }
        Ok(())
    }

    /// Write `<stem>.R1.fastq`, `<stem>.R2.fastq` and
    /// `<stem>.Interleaved.fastq` into `outdir`; with `gzip`, also
    /// `<stem>.R1.fastq.gz` and `<stem>.R2.fastq.gz`.
    ///
    /// Mate counts and record lengths are checked before any file is
    /// touched. Identifiers may repeat, so an extracted set can pick the
    /// same pair twice. Each file is replaced atomically; if one of them
    /// fails, the files this call already wrote are removed again.
    pub fn write(&self, outdir: &Path, stem: &str, gzip: bool) -> Result<Vec<PathBuf>, GenerateError> {
        self.check_layout()?;
        std::fs::create_dir_all(outdir).map_err(|e| GenerateError::io(outdir, e))?;

        let path = |suffix: &str| outdir.join(format!("{stem}.{suffix}"));
        let interleaved = self.interleaved();
        let mut outputs = vec![
            (path("R1.fastq"), self.forward.as_slice()),
            (path("R2.fastq"), self.reverse.as_slice()),
            (path("Interleaved.fastq"), interleaved.as_slice()),
        ];
        if gzip {
            outputs.push((path("R1.fastq.gz"), self.forward.as_slice()));
            outputs.push((path("R2.fastq.gz"), self.reverse.as_slice()));
        }

        let mut written = Vec::with_capacity(outputs.len());
        for (file, records) in outputs {
            if let Err(e) = write_records(&file, records) {
                remove_partial(&written);
                return Err(e);
            }
            debug!("wrote {} records to {}", records.len(), file.display());
            written.push(file);
        }
        Ok(written)
    }
}

fn remove_partial(written: &[PathBuf]) {
    for file in written {
        if let Err(e) = std::fs::remove_file(file) {
            warn!("could not remove {}: {e}", file.display());
        }
    }
}

/// Build the fixture set of `mode` from `seed`.
pub fn generate(mode: Mode, seed: u64) -> Result<FixtureSet, GenerateError> {
    let mut generator = FixtureGenerator::new(seed);
    match mode {
        Mode::Big => generator.bulk()?,
        Mode::Lengthmin => generator.length_boundaries()?,
        Mode::Qualsld => generator.sliding_windows()?,
        Mode::Qualtail => generator.tails()?,
        Mode::Infodust => generator.low_complexity()?,
        Mode::Infon => generator.ambiguous_bases()?,
    }
    let set = generator.finish();
    set.check()?;
    info!("generated {} read pairs for {:?} (seed {seed})", set.len(), mode);
    Ok(set)
}

struct FixtureGenerator {
    rng: ChaCha20Rng,
    titles: TitleSynthesizer,
    set: FixtureSet,
}

impl FixtureGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            titles: TitleSynthesizer::new(),
            set: FixtureSet::default(),
        }
    }

    fn finish(self) -> FixtureSet {
        self.set
    }

    /// Random bases with a uniform-good quality string.
    fn random_record(&mut self, title: &str, length: usize) -> Result<SequenceRecord, GenerateError> {
        let sequence: String = (0..length)
            .map(|_| BASES[self.rng.gen_range(0..BASES.len())])
            .collect();
        let quality = CLEAN.profile(length, &mut self.rng)?;
        Ok(SequenceRecord::new(title, sequence, quality))
    }

    fn length_pair(&mut self, forward: usize, reverse: usize) -> Result<(), GenerateError> {
        let title = self.titles.next(&mut self.rng);
        let forward = self.random_record(&title, forward)?;
        let reverse = self.random_record(&title, reverse)?;
        self.set.push(ReadPair { forward, reverse });
        Ok(())
    }

    /// A pair whose mates both carry `shape`'s profile where its side says
    /// so, and a clean profile otherwise.
    fn shaped_pair(&mut self, length: usize, shape: QualityShape) -> Result<(), GenerateError> {
        let side = shape.side();
        let title = self.titles.next(&mut self.rng);
        let profile = shape.profile(length, &mut self.rng)?;
        let mut forward = self.random_record(&title, length)?;
        let mut reverse = self.random_record(&title, length)?;
        if side.is_some_and(Side::degrades_forward) {
            forward.quality = profile.clone();
        }
        if side.is_some_and(Side::degrades_reverse) {
            reverse.quality = profile;
        }
        self.set.push(ReadPair { forward, reverse });
        Ok(())
    }

    fn literal_pair(&mut self, forward: &str, reverse: &str) -> Result<(), GenerateError> {
        let title = self.titles.next(&mut self.rng);
        let qual_forward = CLEAN.profile(forward.len(), &mut self.rng)?;
        let qual_reverse = CLEAN.profile(reverse.len(), &mut self.rng)?;
        self.set.push(ReadPair {
            forward: SequenceRecord::new(title.as_str(), forward, qual_forward),
            reverse: SequenceRecord::new(title, reverse, qual_reverse),
        });
        Ok(())
    }

    /// Draws entries out of a shrinking pool. The number of draws is fixed
    /// to the initial pool size rather than looping until the pool is empty.
    fn bulk(&mut self) -> Result<(), GenerateError> {
        let mut pool = BULK_POOL.to_vec();
        for _ in 0..BULK_POOL.len() {
            let (count, length) = pool.remove(self.rng.gen_range(0..pool.len()));
            for _ in 0..count {
                self.length_pair(length, length)?;
            }
        }
        Ok(())
    }

    fn length_boundaries(&mut self) -> Result<(), GenerateError> {
        let mut pool = LENGTH_POOL.to_vec();
        for _ in 0..LENGTH_POOL.len() {
            let (forward, reverse) = pool.remove(self.rng.gen_range(0..pool.len()));
            self.length_pair(forward, reverse)?;
        }
        Ok(())
    }

    fn sliding_windows(&mut self) -> Result<(), GenerateError> {
        let window = |good, bad, bin, side| QualityShape::SlidingWindow {
            good,
            bad,
            bin,
            side,
        };
        self.length_pair(5, 15)?;
        self.length_pair(15, 5)?;
        let shapes = [
            window(GOOD, MEAN, 75..80, Side::Forward),
            window(GOOD, MEAN, 75..80, Side::Reverse),
            window(GOOD, MEAN, 75..80, Side::Same),
            window(GOOD, MEAN, 50..70, Side::Forward),
            window(MEAN, BAD, 70..80, Side::Reverse),
            window(MEAN, BAD, 3..6, Side::Forward),
        ];
        for shape in shapes {
            self.shaped_pair(QUALSLD_LENGTH, shape)?;
        }
        Ok(())
    }

    fn tails(&mut self) -> Result<(), GenerateError> {
        let tail = |bad, start, side| QualityShape::Tail {
            good: GOOD,
            bad,
            start,
            side,
        };
        self.length_pair(5, 15)?;
        self.length_pair(15, 5)?;
        let shapes = [
            tail(5, 100, Side::Forward),
            tail(5, 100, Side::Reverse),
            tail(5, 100, Side::Same),
            tail(10, 120, Side::Forward),
            QualityShape::SlidingWindow {
                good: MEAN,
                bad: BAD,
                bin: 70..80,
                side: Side::Same,
            },
        ];
        for shape in shapes {
            self.shaped_pair(QUALTAIL_LENGTH, shape)?;
        }
        Ok(())
    }

    fn low_complexity(&mut self) -> Result<(), GenerateError> {
        for (forward, reverse) in DUST_PAIRS {
            self.literal_pair(forward, reverse)?;
        }
        Ok(())
    }

    fn ambiguous_bases(&mut self) -> Result<(), GenerateError> {
        for (forward_ns, reverse_ns) in N_LAYOUT {
            let forward = mask_n(DUST_50_A, forward_ns);
            let reverse = mask_n(DUST_50_B, reverse_ns);
            self.literal_pair(&forward, &reverse)?;
        }
        Ok(())
    }
}

/// Replace the bases at `positions` with `N`.
fn mask_n(sequence: &str, positions: &[usize]) -> String {
    sequence
        .char_indices()
        .map(|(i, c)| if positions.contains(&i) { 'N' } else { c })
        .collect()
}

const DUST_50_A: &str = "GGCTGCAACAATCTTCCTTGTGTTAGCGTCATAAGAAATCAGGATCGTGT";
const DUST_50_B: &str = "TTCACATGGGAATGGCCGAAGAAAAGTAACGCGCCCGGGCGACCGTGTCG";

const DUST_150_A: &str = concat!(
    "TCCAACGCAACACTGGCCGCCTGAACACGTCGCACGGTATTGAGTAGAAA",
    "CCGCCTCCTTCCAACGTAACCCCCGTGATTCCACGACAAGAGCGCGCGT",
    "TCCCTTTACCGCTGACGGTTTGTTTTGTCTTTGTCAGTTTCGGAGTGAGAG",
);
const DUST_150_B: &str = concat!(
    "TATGGTTGACTTGATAAATAAGATTTGCCATTGCAGCACACCGACCAGCC",
    "CCATTTTGCCCTGATCCGCAGGACCAGCACGGCAGCACTCCACCCCATT",
    "GTCCTATAAGCAGGTCCCGATATTGGCAACAGGCTGCATGTTTTGGGCGTG",
);
const DUST_200: &str = concat!(
    "TGTATCCCTGGTTTCAATTGTACGAAAAATTTTACGGGTAAAAGTTGATT",
    "TTTTCTTGTCGAAATCCAATTCACAATTTTGAATTTTTAAAGATTTCTC",
    "GCATCCTATAGGTAATGGATGGCGATTGGTAATATGACTTGCTAACCGT",
    "ATGAACGTGAAAAGGAATAAATATTTATCATTTAATGATAAATTATAACCTG",
);
const DUST_300: &str = concat!(
    "GTATCTAAAAAGATCAACAATTTTAAGTATACCTAAAATACATATATAAA",
    "ACACAGTATAAACTATGAATCCAATGGACATTAATAAAAAATGATCTAA",
    "TTAATTACAAATCATACTTACTATACTAATTATACTCATTAATTCGTAA",
    "TACGAATTTATATATTATAAATACCAATATACTCTTTTAAACTAAATTA",
    "TATCTATAATAGATTACCTTAATGTTTATTTGAAGTCCTATCTATTCTT",
    "TTCCGATTATATATCTAGAATAACTCTATCTTATATATATTTTAACTAGCAAAC",
);
const DUST_HIGH: &str = concat!(
    "AGTGAAAAGGGTTTTAAAAGGTCACTAATAATAATATTACACATATTTTA",
    "GTCACGTATAAAAAATATATATTACTATAATAGATTATAATATAATGAG",
    "TTAATATTATTACATAAAATAAACTTATAAATATGTAAACTATATAATA",
    "TAATTAGGACATATTTTATAATATTTTATTTAGCAAAAGCTCTTTAATG",
    "CAAACATACCAATTTACATAATAGCTATTTATATTTAAAAATTTTTATT",
    "ATTTATAATAATTTAATTAAAATACTTTGCAAAAAATAAATATCAATAAATGTT",
);
const DUST_MID: &str = concat!(
    "GCTAAATTAAAAGACTAGTAGCCTATATATACAGTTTTTGGTATTTAAAT",
    "TACAGCTTGTGTTTAGAAAGAAACTTCTTTTTACTTATATTAAAATTTT",
    "TTTTTATATTTAACCGCTCATATAATAATTATGTAATAATTTTTGGAAA",
    "AATGATATTATACCTAGTAACAAACACTTCAACTATTTTCTTATCCTATCTA",
);

/// Forward/reverse pairs; trailing comments give their dust scores.
const DUST_PAIRS: [(&str, &str); 6] = [
    (DUST_50_A, DUST_50_A),   // 1.06 1.06
    (DUST_50_A, DUST_50_B),   // 1.06 1.42
    (DUST_150_A, DUST_150_B), // 1.98 2.40
    (DUST_200, DUST_300),     // 2.97 4.45
    (DUST_HIGH, DUST_150_B),  // 6.03 2.40
    (DUST_MID, DUST_300),     // 3.97 4.45
];

/// Positions masked with `N` on the forward and reverse mate.
const N_LAYOUT: [(&[usize], &[usize]); 6] = [
    (&[], &[]),
    (&[10], &[]),
    (&[3, 40], &[0, 49]),
    (&[5, 6, 7, 8], &[25]),
    (&[1, 11, 21, 31, 41], &[]),
    (&[0, 1, 2, 47, 48, 49], &[10, 20, 25, 30, 35, 40]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lengths(records: &[SequenceRecord]) -> Vec<usize> {
        records.iter().map(|r| r.sequence.len()).collect()
    }

    #[rstest]
    #[case::big(Mode::Big, 10_000)]
    #[case::lengthmin(Mode::Lengthmin, 9)]
    #[case::qualsld(Mode::Qualsld, 8)]
    #[case::qualtail(Mode::Qualtail, 7)]
    #[case::infodust(Mode::Infodust, 6)]
    #[case::infon(Mode::Infon, 6)]
    fn mode_contract(#[case] mode: Mode, #[case] pairs: usize) {
        let set = generate(mode, 0).unwrap();
        assert_eq!(set.forward.len(), pairs);
        assert_eq!(set.reverse.len(), pairs);
        for (f, r) in set.forward.iter().zip(&set.reverse) {
            assert_eq!(f.id, r.id);
            assert_eq!(f.sequence.len(), f.quality.len());
            assert_eq!(r.sequence.len(), r.quality.len());
            assert!(f.sequence.chars().all(|c| "ACGTN".contains(c)));
            assert!(f.quality.iter().chain(&r.quality).all(|&q| q <= 41));
        }
        let ids: HashSet<&str> = set.forward.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), pairs);
    }

    #[rstest]
    #[case(Mode::Lengthmin)]
    #[case(Mode::Qualsld)]
    #[case(Mode::Infodust)]
    fn same_seed_same_set(#[case] mode: Mode) {
        assert_eq!(generate(mode, 0).unwrap(), generate(mode, 0).unwrap());
        assert_ne!(generate(mode, 0).unwrap(), generate(mode, 1).unwrap());
    }

    #[test]
    fn length_boundaries_cover_every_entry_once() {
        let set = generate(Mode::Lengthmin, 0).unwrap();
        let mut drawn: Vec<(usize, usize)> = set
            .forward
            .iter()
            .zip(&set.reverse)
            .map(|(f, r)| (f.sequence.len(), r.sequence.len()))
            .collect();
        drawn.sort_unstable();
        let mut expected = LENGTH_POOL.to_vec();
        expected.sort_unstable();
        assert_eq!(drawn, expected);
        // every read is longer than the permissive threshold used by the catalog
        assert!(drawn.iter().all(|&(f, r)| f > 10 && r > 10));
    }

    #[test]
    fn uniform_shape_leaves_both_mates_clean() {
        let mut generator = FixtureGenerator::new(3);
        generator.shaped_pair(60, CLEAN).unwrap();
        generator
            .shaped_pair(60, QualityShape::Uniform(BAD))
            .unwrap();
        let set = generator.finish();

        assert_eq!(set.len(), 2);
        for record in set.forward.iter().chain(&set.reverse) {
            assert_eq!(record.quality.len(), 60);
            assert!(record.quality.iter().all(|q| GOOD.contains(q)));
        }
    }

    #[test]
    fn empty_uniform_range_is_fatal() {
        let mut generator = FixtureGenerator::new(0);
        let err = generator
            .shaped_pair(10, QualityShape::Uniform(30..30))
            .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyRange { lo: 30, hi: 30 }), "{err}");
        assert_eq!(generator.finish().len(), 0);
    }

    #[test]
    fn bulk_volume_per_length() {
        let set = generate(Mode::Big, 0).unwrap();
        for (count, length) in BULK_POOL {
            let n = set.forward.iter().filter(|r| r.sequence.len() == length).count();
            assert_eq!(n, count, "length {length}");
        }
        assert_eq!(lengths(&set.forward), lengths(&set.reverse));
    }

    #[test]
    fn sliding_window_sides() {
        let set = generate(Mode::Qualsld, 0).unwrap();
        assert_eq!(lengths(&set.forward[..2]), [5, 15]);
        assert_eq!(lengths(&set.reverse[..2]), [15, 5]);

        let band = |r: &SequenceRecord| r.quality[75..80].iter().all(|q| MEAN.contains(q));
        let clean = |r: &SequenceRecord| r.quality.iter().all(|q| GOOD.contains(q));
        // forward only
        assert!(band(&set.forward[2]) && clean(&set.reverse[2]));
        // reverse only
        assert!(clean(&set.forward[3]) && band(&set.reverse[3]));
        // both mates share one profile
        assert!(band(&set.forward[4]));
        assert_eq!(set.forward[4].quality, set.reverse[4].quality);
        assert_ne!(set.forward[4].sequence, set.reverse[4].sequence);
        // mean/bad window near the read start
        assert!(set.forward[7].quality[3..6].iter().all(|q| BAD.contains(q)));
        assert!(set.forward[7].quality[..3].iter().all(|q| MEAN.contains(q)));
    }

    #[test]
    fn tails_are_constant() {
        let set = generate(Mode::Qualtail, 0).unwrap();
        assert!(set.forward[2].quality[100..].iter().all(|&q| q == 5));
        assert!(set.reverse[2].quality.iter().all(|q| GOOD.contains(q)));
        assert!(set.reverse[3].quality[100..].iter().all(|&q| q == 5));
        assert!(set.forward[5].quality[120..].iter().all(|&q| q == 10));
        assert!(set.forward[5].quality[..120].iter().all(|q| GOOD.contains(q)));
        assert!(set.reverse[6].quality[70..80].iter().all(|q| BAD.contains(q)));
    }

    #[test]
    fn literal_sequences_kept() {
        let set = generate(Mode::Infodust, 0).unwrap();
        for ((f, r), (ef, er)) in set.forward.iter().zip(&set.reverse).zip(DUST_PAIRS) {
            assert_eq!(f.sequence, ef);
            assert_eq!(r.sequence, er);
        }
    }

    #[test]
    fn ambiguous_base_counts() {
        let set = generate(Mode::Infon, 0).unwrap();
        let count = |r: &SequenceRecord| r.sequence.matches('N').count();
        let forward: Vec<usize> = set.forward.iter().map(count).collect();
        let reverse: Vec<usize> = set.reverse.iter().map(count).collect();
        assert_eq!(forward, [0, 1, 2, 4, 5, 6]);
        assert_eq!(reverse, [0, 0, 2, 1, 0, 6]);
    }

    #[test]
    fn interleaved_pairs() {
        let set = generate(Mode::Lengthmin, 0).unwrap();
        let inter = set.interleaved();
        assert_eq!(inter.len(), 2 * set.len());
        for (i, chunk) in inter.chunks(2).enumerate() {
            assert_eq!(chunk[0].id, format!("{}\\1", set.forward[i].id));
            assert_eq!(chunk[1].id, format!("{}\\2", set.reverse[i].id));
            assert_eq!(chunk[0].sequence, set.forward[i].sequence);
            assert_eq!(chunk[1].sequence, set.reverse[i].sequence);
        }
    }

    #[test]
    fn check_rejects_broken_sets() {
        let mut set = generate(Mode::Lengthmin, 0).unwrap();
        set.reverse.pop();
        assert!(matches!(set.check(), Err(GenerateError::MateCount { .. })));

        let mut set = generate(Mode::Lengthmin, 0).unwrap();
        set.forward[3].quality.pop();
        assert!(matches!(set.check(), Err(GenerateError::RecordLength { .. })));

        let mut set = generate(Mode::Lengthmin, 0).unwrap();
        set.forward[1].id = set.forward[0].id.clone();
        assert!(matches!(set.check(), Err(GenerateError::DuplicateId(_))));
    }

    #[test]
    fn write_is_reproducible() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let written_a = generate(Mode::Qualtail, 0)
            .unwrap()
            .write(a.path(), Mode::Qualtail.stem(), true)
            .unwrap();
        generate(Mode::Qualtail, 0)
            .unwrap()
            .write(b.path(), Mode::Qualtail.stem(), true)
            .unwrap();

        let names: Vec<String> = written_a
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "QUALTAIL.R1.fastq",
                "QUALTAIL.R2.fastq",
                "QUALTAIL.Interleaved.fastq",
                "QUALTAIL.R1.fastq.gz",
                "QUALTAIL.R2.fastq.gz",
            ]
        );
        for name in names {
            assert_eq!(
                std::fs::read(a.path().join(&name)).unwrap(),
                std::fs::read(b.path().join(&name)).unwrap(),
                "{name}"
            );
        }
    }

    #[test]
    fn broken_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = generate(Mode::Lengthmin, 0).unwrap();
        set.reverse.pop();
        assert!(set.write(dir.path(), "BROKEN", false).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_write_removes_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in place of the interleaved file makes its rename fail
        std::fs::create_dir(dir.path().join("LENGTHMIN.Interleaved.fastq")).unwrap();

        let set = generate(Mode::Lengthmin, 0).unwrap();
        assert!(set.write(dir.path(), "LENGTHMIN", true).is_err());
        for name in ["LENGTHMIN.R1.fastq", "LENGTHMIN.R2.fastq", "LENGTHMIN.R1.fastq.gz"] {
            assert!(!dir.path().join(name).exists(), "{name}");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn repeated_pairs_can_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let full = generate(Mode::Lengthmin, 0).unwrap();
        let set = FixtureSet {
            forward: vec![full.forward[0].clone(), full.forward[0].clone()],
            reverse: vec![full.reverse[0].clone(), full.reverse[0].clone()],
        };
        assert!(matches!(set.check(), Err(GenerateError::DuplicateId(_))));

        let written = set.write(dir.path(), "TWICE", false).unwrap();
        assert_eq!(written.len(), 3);
        let r1 = std::fs::read_to_string(dir.path().join("TWICE.R1.fastq")).unwrap();
        assert_eq!(r1.lines().count(), 8);
    }
}
