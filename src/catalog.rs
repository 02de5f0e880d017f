//! Declarative catalog of trimmer invocations.
//!
//! Each [`CaseTemplate`] is plain data: the arguments to pass, how many
//! temporary outputs to allocate, and which artifact each output must match.
//! Templates name fixtures by file name; [`CaseTemplate::bind`] resolves them
//! against a [`Layout`] and a set of freshly allocated temp paths.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::compare::{CompareMode, DiffSpec};

use self::Arg::{Input, Lit, Temp};
use self::Check::{Binary, Empty, Gzip};
use self::Oracle::Golden;

/// Functional area a case exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum Category {
    /// Permissive/restrictive length filtering on single and paired input
    GenTrim,
    /// Discard stream contents
    GenDiscard,
    /// Separate-mate and interleaved layouts
    GenFormat,
    /// Output independence from the thread count
    GenThread,
    /// Gzip input and output
    GenCompress,
    TrimLengthMin,
    TrimQualSld,
    TrimQualTail,
    TrimInfoDust,
    TrimN,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One argument of a templated invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Lit(&'static str),
    /// File in the gold input directory.
    Input(&'static str),
    /// The n-th temp path allocated for the case.
    Temp(usize),
}

/// Where an oracle lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oracle {
    /// Unmodified input fixture, for no-op settings.
    Input(&'static str),
    /// Fixed expected output in the gold output directory.
    Golden(&'static str),
}

/// Comparison of the n-th temp output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Binary(Oracle, usize),
    Gzip(Oracle, usize),
    Empty(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct CaseTemplate {
    pub category: Category,
    pub name: &'static str,
    pub temp_suffix: &'static str,
    pub temp_count: usize,
    pub args: &'static [Arg],
    pub checks: &'static [Check],
}

/// Locations the catalog is resolved against.
#[derive(Debug, Clone)]
pub struct Layout {
    pub program: PathBuf,
    pub gold_input: PathBuf,
    pub gold_output: PathBuf,
}

/// A fully resolved invocation.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub program: PathBuf,
    pub category: Category,
    pub name: String,
    pub args: Vec<OsString>,
    pub diffs: Vec<DiffSpec>,
}

impl TestCase {
    /// Program and arguments joined by spaces, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CaseTemplate {
    /// Resolve the template. `temps` must hold `temp_count` paths.
    pub fn bind(&self, layout: &Layout, temps: &[PathBuf]) -> TestCase {
        debug_assert_eq!(temps.len(), self.temp_count);
        let args = self
            .args
            .iter()
            .map(|arg| match *arg {
                Arg::Lit(s) => OsString::from(s),
                Arg::Input(file) => layout.gold_input.join(file).into_os_string(),
                Arg::Temp(i) => temps[i].clone().into_os_string(),
            })
            .collect();
        let oracle = |oracle: Oracle| match oracle {
            Oracle::Input(file) => layout.gold_input.join(file),
            Oracle::Golden(file) => layout.gold_output.join(file),
        };
        let diffs = self
            .checks
            .iter()
            .map(|check| match *check {
                Check::Binary(o, i) => DiffSpec {
                    expected: Some(oracle(o)),
                    actual: temps[i].clone(),
                    mode: CompareMode::Binary,
                },
                Check::Gzip(o, i) => DiffSpec {
                    expected: Some(oracle(o)),
                    actual: temps[i].clone(),
                    mode: CompareMode::Gzip,
                },
                Check::Empty(i) => DiffSpec {
                    expected: None,
                    actual: temps[i].clone(),
                    mode: CompareMode::Empty,
                },
            })
            .collect();
        TestCase {
            program: layout.program.clone(),
            category: self.category,
            name: self.name.to_string(),
            args,
            diffs,
        }
    }
}

/// Catalog entries matching the filters; an empty category list keeps all.
pub fn select(categories: &[Category], name: Option<&str>) -> Vec<&'static CaseTemplate> {
    CATALOG
        .iter()
        .filter(|t| categories.is_empty() || categories.contains(&t.category))
        .filter(|t| name.map_or(true, |n| t.name == n))
        .collect()
}

const FASTQ: &str = ".fastq";
const FASTQ_GZ: &str = ".fastq.gz";

const IN_F: Arg = Lit("--input-fastq-forward");
const IN_R: Arg = Lit("--input-fastq-reverse");
const IN_I: Arg = Lit("--input-fastq-interleaved");
const OUT_F: Arg = Lit("--output-fastq-forward");
const OUT_R: Arg = Lit("--output-fastq-reverse");
const OUT_I: Arg = Lit("--output-fastq-interleaved");
const OUT_D: Arg = Lit("--output-fastq-discard");
const LENGTH_MIN: Arg = Lit("--length-min");

const LM_R1: &str = "LENGTHMIN.R1.fastq";
const LM_R2: &str = "LENGTHMIN.R2.fastq";
const LM_INTER: &str = "LENGTHMIN.Interleaved.fastq";
const BIG_R1: &str = "BIG.R1.fastq";
const BIG_R2: &str = "BIG.R2.fastq";

/// Paired input `<stem>.R1/R2.fastq` written to two temp outputs, plus one
/// option. The outputs must equal the input (`=> input`) or the
/// `<golden>.R1/R2.fastq` oracles.
macro_rules! paired {
    (@case $category:ident $name:literal, $stem:literal, $flag:literal $value:literal, $r1:expr, $r2:expr) => {
        CaseTemplate {
            category: Category::$category,
            name: $name,
            temp_suffix: FASTQ,
            temp_count: 2,
            args: &[
                IN_F, Input(concat!($stem, ".R1.fastq")),
                IN_R, Input(concat!($stem, ".R2.fastq")),
                OUT_F, Temp(0),
                OUT_R, Temp(1),
                Lit($flag), Lit($value),
            ],
            checks: &[Binary($r1, 0), Binary($r2, 1)],
        }
    };
    ($category:ident $name:literal, $stem:literal, $flag:literal $value:literal => input) => {
        paired!(@case $category $name, $stem, $flag $value,
            Oracle::Input(concat!($stem, ".R1.fastq")),
            Oracle::Input(concat!($stem, ".R2.fastq")))
    };
    ($category:ident $name:literal, $stem:literal, $flag:literal $value:literal => $golden:literal) => {
        paired!(@case $category $name, $stem, $flag $value,
            Golden(concat!($golden, ".R1.fastq")),
            Golden(concat!($golden, ".R2.fastq")))
    };
}

/// Bulk input run with a batch size and thread count.
macro_rules! threaded {
    ($name:literal, $threads:literal, $length:literal, $r1:expr, $r2:expr) => {
        CaseTemplate {
            category: Category::GenThread,
            name: $name,
            temp_suffix: FASTQ,
            temp_count: 2,
            args: &[
                IN_F, Input(BIG_R1),
                IN_R, Input(BIG_R2),
                OUT_F, Temp(0),
                OUT_R, Temp(1),
                Lit("--reads-batch"), Lit("100"),
                Lit("--threads"), Lit($threads),
                LENGTH_MIN, Lit($length),
            ],
            checks: &[Binary($r1, 0), Binary($r2, 1)],
        }
    };
}

#[rustfmt::skip]
pub static CATALOG: &[CaseTemplate] = &[
    // Single-end and paired length filtering.
    CaseTemplate {
        category: Category::GenTrim, name: "A", temp_suffix: FASTQ, temp_count: 1,
        args: &[IN_F, Input(LM_R1), OUT_F, Temp(0), LENGTH_MIN, Lit("10")],
        checks: &[Binary(Oracle::Input(LM_R1), 0)],
    },
    CaseTemplate {
        category: Category::GenTrim, name: "B", temp_suffix: FASTQ, temp_count: 1,
        args: &[IN_F, Input(LM_R1), OUT_F, Temp(0), LENGTH_MIN, Lit("21")],
        checks: &[Binary(Golden("LENGTHMIN-A.R1.fastq"), 0)],
    },
    CaseTemplate {
        category: Category::GenTrim, name: "C", temp_suffix: FASTQ, temp_count: 1,
        args: &[IN_F, Input(LM_R1), OUT_F, Temp(0), LENGTH_MIN, Lit("50")],
        checks: &[Binary(Golden("LENGTHMIN-B.R1.single.fastq"), 0)],
    },
    paired!(GenTrim "D", "LENGTHMIN", "--length-min" "10" => input),
    paired!(GenTrim "E", "LENGTHMIN", "--length-min" "20" => "LENGTHMIN-A"),
    CaseTemplate {
        category: Category::GenTrim, name: "F", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_F, Input(LM_R1), IN_R, Input(LM_R2), OUT_F, Temp(0), OUT_R, Temp(1),
            LENGTH_MIN, Lit("50")],
        checks: &[
            Binary(Golden("LENGTHMIN-B.R1.paired.fastq"), 0),
            Binary(Golden("LENGTHMIN-B.R2.fastq"), 1),
        ],
    },

    // Discard stream.
    CaseTemplate {
        category: Category::GenDiscard, name: "A", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_F, Input(LM_R1), OUT_D, Temp(0), OUT_F, Temp(1), LENGTH_MIN, Lit("10")],
        checks: &[Empty(0)],
    },
    CaseTemplate {
        category: Category::GenDiscard, name: "B", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_F, Input(LM_R1), OUT_D, Temp(0), OUT_F, Temp(1), LENGTH_MIN, Lit("20")],
        checks: &[Binary(Golden("LENGTHMIN-A.R1.single.discard.fastq"), 0)],
    },
    CaseTemplate {
        category: Category::GenDiscard, name: "C", temp_suffix: FASTQ, temp_count: 3,
        args: &[IN_F, Input(LM_R1), IN_R, Input(LM_R2), OUT_D, Temp(0), OUT_F, Temp(1),
            OUT_R, Temp(2), LENGTH_MIN, Lit("50")],
        checks: &[Binary(Golden("LENGTHMIN-B.discard.fastq"), 0)],
    },

    // Interleaved <-> separate mates.
    CaseTemplate {
        category: Category::GenFormat, name: "A", temp_suffix: FASTQ, temp_count: 1,
        args: &[IN_F, Input(LM_R1), IN_R, Input(LM_R2), OUT_I, Temp(0), LENGTH_MIN, Lit("10")],
        checks: &[Binary(Oracle::Input(LM_INTER), 0)],
    },
    CaseTemplate {
        category: Category::GenFormat, name: "B", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_I, Input(LM_INTER), OUT_F, Temp(0), OUT_R, Temp(1), LENGTH_MIN, Lit("10")],
        checks: &[Binary(Oracle::Input(LM_R1), 0), Binary(Oracle::Input(LM_R2), 1)],
    },
    CaseTemplate {
        category: Category::GenFormat, name: "C", temp_suffix: FASTQ, temp_count: 1,
        args: &[IN_F, Input(LM_R1), IN_R, Input(LM_R2), OUT_I, Temp(0), LENGTH_MIN, Lit("50")],
        checks: &[Binary(Golden("LENGTHMIN-B.Interleaved.fastq"), 0)],
    },
    CaseTemplate {
        category: Category::GenFormat, name: "D", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_I, Input(LM_INTER), OUT_F, Temp(0), OUT_R, Temp(1), LENGTH_MIN, Lit("50")],
        checks: &[
            Binary(Golden("LENGTHMIN-B.R1.paired.fastq"), 0),
            Binary(Golden("LENGTHMIN-B.R2.fastq"), 1),
        ],
    },

    // Thread count must not change the output.
    threaded!("A", "2", "10", Oracle::Input(BIG_R1), Oracle::Input(BIG_R2)),
    threaded!("B", "4", "10", Oracle::Input(BIG_R1), Oracle::Input(BIG_R2)),
    threaded!("C", "6", "10", Oracle::Input(BIG_R1), Oracle::Input(BIG_R2)),
    threaded!("D", "8", "10", Oracle::Input(BIG_R1), Oracle::Input(BIG_R2)),
    threaded!("E", "2", "55", Golden("BIG-B.R1.fastq"), Golden("BIG-B.R2.fastq")),
    threaded!("F", "4", "55", Golden("BIG-B.R1.fastq"), Golden("BIG-B.R2.fastq")),
    threaded!("G", "6", "55", Golden("BIG-B.R1.fastq"), Golden("BIG-B.R2.fastq")),
    threaded!("H", "8", "55", Golden("BIG-B.R1.fastq"), Golden("BIG-B.R2.fastq")),

    // Compressed and plain I/O are content-equivalent.
    CaseTemplate {
        category: Category::GenCompress, name: "A", temp_suffix: FASTQ_GZ, temp_count: 2,
        args: &[IN_F, Input(BIG_R1), IN_R, Input(BIG_R2), OUT_F, Temp(0), OUT_R, Temp(1),
            LENGTH_MIN, Lit("10")],
        checks: &[
            Gzip(Oracle::Input("BIG.R1.fastq.gz"), 0),
            Gzip(Oracle::Input("BIG.R2.fastq.gz"), 1),
        ],
    },
    CaseTemplate {
        category: Category::GenCompress, name: "B", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_F, Input("BIG.R1.fastq.gz"), IN_R, Input("BIG.R2.fastq.gz"), OUT_F, Temp(0),
            OUT_R, Temp(1), LENGTH_MIN, Lit("10")],
        checks: &[Binary(Oracle::Input(BIG_R1), 0), Binary(Oracle::Input(BIG_R2), 1)],
    },
    CaseTemplate {
        category: Category::GenCompress, name: "C", temp_suffix: FASTQ_GZ, temp_count: 2,
        args: &[IN_F, Input(BIG_R1), IN_R, Input(BIG_R2), OUT_F, Temp(0), OUT_R, Temp(1),
            LENGTH_MIN, Lit("55")],
        checks: &[
            Gzip(Golden("BIG-B.R1.fastq.gz"), 0),
            Gzip(Golden("BIG-B.R2.fastq.gz"), 1),
        ],
    },

    paired!(TrimLengthMin "A", "LENGTHMIN", "--length-min" "10" => input),
    CaseTemplate {
        category: Category::TrimLengthMin, name: "B", temp_suffix: FASTQ, temp_count: 2,
        args: &[IN_F, Input(LM_R1), IN_R, Input(LM_R2), OUT_F, Temp(0), OUT_R, Temp(1),
            LENGTH_MIN, Lit("50")],
        checks: &[
            Binary(Golden("LENGTHMIN-B.R1.paired.fastq"), 0),
            Binary(Golden("LENGTHMIN-B.R2.fastq"), 1),
        ],
    },
    paired!(TrimLengthMin "C", "LENGTHMIN", "--length-min" "100" => "LENGTHMIN-C"),

    paired!(TrimQualSld "A", "QUALSLD", "--quality-sliding-window" "1:5" => input),
    paired!(TrimQualSld "B", "QUALSLD", "--quality-sliding-window" "20:25" => "QUALSLD-A"),
    paired!(TrimQualSld "C", "QUALSLD", "--quality-sliding-window" "10:10" => "QUALSLD-B"),
    paired!(TrimQualSld "D", "QUALSLD", "--quality-sliding-window" "17:4" => "QUALSLD-C"),
    paired!(TrimQualSld "E", "QUALSLD", "--quality-sliding-window" "17:10" => "QUALSLD-D"),
    paired!(TrimQualSld "F", "QUALSLD", "--quality-sliding-window" "4:1" => "QUALSLD-E"),
    paired!(TrimQualSld "G", "QUALSLD", "--quality-sliding-window" "4:4" => "QUALSLD-F"),

    paired!(TrimQualTail "A", "QUALTAIL", "--quality-tail" "2:2" => "QUALTAIL-A"),
    paired!(TrimQualTail "B", "QUALTAIL", "--quality-tail" "5:2" => "QUALTAIL-B"),
    paired!(TrimQualTail "C", "QUALTAIL", "--quality-tail" "5:2:60" => "QUALTAIL-C"),
    paired!(TrimQualTail "D", "QUALTAIL", "--quality-tail" "5:5:60" => "QUALTAIL-C"),
    paired!(TrimQualTail "E", "QUALTAIL", "--quality-tail" "5:5:70" => "QUALTAIL-D"),
    paired!(TrimQualTail "F", "QUALTAIL", "--quality-tail" "3:10:46" => "QUALTAIL-E"),
    paired!(TrimQualTail "G", "QUALTAIL", "--quality-tail" "3:10:81" => "QUALTAIL-F"),

    paired!(TrimInfoDust "A", "INFODUST", "--information-dust" "7" => input),
    paired!(TrimInfoDust "B", "INFODUST", "--information-dust" "3" => "INFODUST-A"),
    paired!(TrimInfoDust "C", "INFODUST", "--information-dust" "5" => "INFODUST-B"),

    paired!(TrimN "A", "INFON", "--information-n" "5" => input),
    paired!(TrimN "B", "INFON", "--information-n" "1" => "INFON-A"),
    paired!(TrimN "C", "INFON", "--information-n" "4" => "INFON-B"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::ffi::OsStr;

    fn layout() -> Layout {
        Layout {
            program: PathBuf::from("/opt/HmnTrimmer"),
            gold_input: PathBuf::from("/gold/in"),
            gold_output: PathBuf::from("/gold/out"),
        }
    }

    fn temps(template: &CaseTemplate) -> Vec<PathBuf> {
        (0..template.temp_count)
            .map(|i| PathBuf::from(format!("/tmp/case{i}{}", template.temp_suffix)))
            .collect()
    }

    fn arg_after<'a>(case: &'a TestCase, flag: &str) -> Option<&'a OsStr> {
        case.args
            .iter()
            .position(|a| a == flag)
            .map(|i| case.args[i + 1].as_os_str())
    }

    #[test]
    fn case_count() {
        assert_eq!(CATALOG.len(), 47);
    }

    #[test]
    fn names_unique_within_category() {
        let mut seen = HashSet::new();
        for t in CATALOG {
            assert!(seen.insert((t.category, t.name)), "{} {}", t.category, t.name);
        }
    }

    #[test]
    fn temp_indices_in_bounds_and_all_checked_or_written() {
        for t in CATALOG {
            let mut used = HashSet::new();
            for arg in t.args {
                if let Arg::Temp(i) = arg {
                    assert!(*i < t.temp_count, "{} {}", t.category, t.name);
                    used.insert(*i);
                }
            }
            assert_eq!(used.len(), t.temp_count, "{} {}", t.category, t.name);
            assert!(!t.checks.is_empty());
            for check in t.checks {
                let (Check::Binary(_, i) | Check::Gzip(_, i) | Check::Empty(i)) = check;
                assert!(used.contains(i), "{} {}", t.category, t.name);
            }
        }
    }

    #[test]
    fn gzip_checks_use_gzip_temps() {
        for t in CATALOG {
            let gz = t.checks.iter().any(|c| matches!(c, Check::Gzip(..)));
            assert_eq!(gz, t.temp_suffix == FASTQ_GZ, "{} {}", t.category, t.name);
        }
    }

    #[test]
    fn bind_resolves_paths() {
        let t = select(&[Category::GenTrim], Some("E"))[0];
        let case = t.bind(&layout(), &temps(t));

        assert_eq!(case.program, PathBuf::from("/opt/HmnTrimmer"));
        assert_eq!(
            arg_after(&case, "--input-fastq-forward"),
            Some(OsStr::new("/gold/in/LENGTHMIN.R1.fastq"))
        );
        assert_eq!(
            arg_after(&case, "--output-fastq-reverse"),
            Some(OsStr::new("/tmp/case1.fastq"))
        );
        assert_eq!(arg_after(&case, "--length-min"), Some(OsStr::new("20")));
        assert_eq!(
            case.diffs[0].expected.as_deref(),
            Some(std::path::Path::new("/gold/out/LENGTHMIN-A.R1.fastq"))
        );
        assert_eq!(case.diffs[1].actual, PathBuf::from("/tmp/case1.fastq"));
        assert!(case.command_line().starts_with("/opt/HmnTrimmer --input-fastq-forward"));
    }

    #[test]
    fn permissive_length_uses_input_as_oracle() {
        let t = select(&[Category::TrimLengthMin], Some("A"))[0];
        let case = t.bind(&layout(), &temps(t));
        assert_eq!(arg_after(&case, "--length-min"), Some(OsStr::new("10")));
        for (diff, mate) in case.diffs.iter().zip(["R1", "R2"]) {
            assert_eq!(diff.mode, CompareMode::Binary);
            assert_eq!(
                diff.expected,
                Some(PathBuf::from(format!("/gold/in/LENGTHMIN.{mate}.fastq")))
            );
        }
    }

    #[test]
    fn thread_counts_share_oracles() {
        let cases: Vec<TestCase> = select(&[Category::GenThread], None)
            .into_iter()
            .map(|t| t.bind(&layout(), &temps(t)))
            .collect();
        assert_eq!(cases.len(), 8);

        for length in ["10", "55"] {
            let group: Vec<&TestCase> = cases
                .iter()
                .filter(|c| arg_after(c, "--length-min") == Some(OsStr::new(length)))
                .collect();
            let threads: Vec<&OsStr> = group
                .iter()
                .map(|c| arg_after(c, "--threads").unwrap())
                .collect();
            assert_eq!(threads, ["2", "4", "6", "8"]);
            let oracles: HashSet<_> = group
                .iter()
                .map(|c| c.diffs.iter().map(|d| d.expected.clone()).collect::<Vec<_>>())
                .collect();
            assert_eq!(oracles.len(), 1, "length {length}");
        }
    }

    #[test]
    fn discard_noop_expects_empty() {
        let t = select(&[Category::GenDiscard], Some("A"))[0];
        let case = t.bind(&layout(), &temps(t));
        assert_eq!(case.diffs.len(), 1);
        assert_eq!(case.diffs[0].mode, CompareMode::Empty);
        assert_eq!(case.diffs[0].expected, None);
        assert_eq!(
            arg_after(&case, "--output-fastq-discard"),
            Some(case.diffs[0].actual.as_os_str())
        );
    }

    #[test]
    fn select_filters() {
        assert_eq!(select(&[], None).len(), CATALOG.len());
        assert_eq!(select(&[Category::TrimQualSld], None).len(), 7);
        assert_eq!(
            select(&[Category::TrimN, Category::TrimInfoDust], None).len(),
            6
        );
        assert_eq!(select(&[], Some("H")).len(), 1);
        assert!(select(&[Category::GenFormat], Some("Z")).is_empty());
    }
}
