use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::TempPath;
use tracing::{debug, error, info, warn};

use crate::catalog::{CaseTemplate, Category, Layout, TestCase};
use crate::compare::{compare, DiffSpec, Mismatch, Verdict};
use crate::invoke::{invoke, Invocation};

/// Temporary output paths of a whole run.
///
/// Paths are created empty and stay on disk until [`TempPool::release`]
/// (or drop), so the artifacts of a failed case can be inspected while the
/// rest of the catalog runs.
pub struct TempPool {
    paths: Vec<TempPath>,
    keep: bool,
}

impl TempPool {
    pub fn new(keep: bool) -> Self {
        Self {
            paths: Vec::new(),
            keep,
        }
    }

    pub fn allocate(&mut self, suffix: &str, count: usize) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let path = tempfile::Builder::new()
                .prefix("hmntrimmer-")
                .suffix(suffix)
                .tempfile()?
                .into_temp_path();
            out.push(path.to_path_buf());
            self.paths.push(path);
        }
        Ok(out)
    }

    /// Remove every allocated path, or leave them all in place when the pool
    /// was created with `keep`.
    pub fn release(self) {
        debug!("Clean up.");
        if self.keep {
            info!("keeping {} temporary files", self.paths.len());
            for path in self.paths {
                if let Err(e) = path.keep() {
                    warn!("could not keep {}: {}", e.path.display(), e.error);
                }
            }
            return;
        }
        for path in self.paths {
            let shown = path.to_path_buf();
            if let Err(e) = path.close() {
                warn!("could not remove {}: {e}", shown.display());
            }
        }
    }
}

/// Why a case failed.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cause {
    Launch { error: String },
    ExitStatus,
    Diff { spec: DiffSpec, verdict: Verdict },
}

#[derive(Debug, Serialize)]
pub struct Failure {
    pub category: Category,
    pub name: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub cause: Cause,
}

#[derive(Debug, Default, Serialize)]
pub struct TestReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

impl TestReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    fn record(&mut self, case: &TestCase, failure: Option<Failure>) {
        self.total += 1;
        match failure {
            None => {
                info!("Test {} {}\tOK", case.category, case.name);
                self.passed += 1;
            }
            Some(failure) => {
                self.failed += 1;
                self.failures.push(failure);
            }
        }
    }

    pub fn log_summary(&self) {
        if !self.failures.is_empty() {
            info!("==============================");
            for failure in &self.failures {
                error!("Test {} {}\tFAILED", failure.category, failure.name);
                debug!("RunTest :\n{}", failure.command);
            }
            info!("==============================");
        }
        info!("==============================");
        info!("     total tests: {}", self.total);
        info!("    failed tests: {}", self.failed);
        info!("successful tests: {}", self.passed);
        info!("==============================");
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {:?}", path))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, self).context("Failed to serialize report")?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

/// Run one case: invoke the program, then check each diff in order. The
/// first failing check ends the case.
pub fn execute(case: &TestCase) -> Option<Failure> {
    let failure = |exit_code, stdout: &[u8], stderr: &[u8], cause| Failure {
        category: case.category,
        name: case.name.clone(),
        command: case.command_line(),
        exit_code,
        stdout: String::from_utf8_lossy(stdout).into_owned(),
        stderr: String::from_utf8_lossy(stderr).into_owned(),
        cause,
    };

    match invoke(case) {
        Invocation::LaunchFailed(e) => {
            error!("ERROR (when executing \"{}\"): {e}", case.command_line());
            Some(failure(None, b"", b"", Cause::Launch { error: e.to_string() }))
        }
        Invocation::Exited {
            code,
            stdout,
            stderr,
        } => {
            log_streams(code, &stdout, &stderr);
            Some(failure(code, &stdout, &stderr, Cause::ExitStatus))
        }
        Invocation::Completed { stdout, stderr } => {
            for spec in &case.diffs {
                let verdict = compare(spec);
                if !verdict.passed() {
                    error!("{}", Mismatch { spec, verdict: &verdict });
                    let cause = Cause::Diff {
                        spec: spec.clone(),
                        verdict,
                    };
                    return Some(failure(Some(0), &stdout, &stderr, cause));
                }
            }
            None
        }
    }
}

fn log_streams(code: Option<i32>, stdout: &[u8], stderr: &[u8]) {
    match code {
        Some(code) => error!("Return code is {code}"),
        None => error!("Terminated by signal"),
    }
    if !stdout.is_empty() {
        error!("--- stdout begin --");
        error!("{}", String::from_utf8_lossy(stdout));
        error!("--- stdout end --");
    }
    if !stderr.is_empty() {
        error!("-- stderr begin --");
        error!("{}", String::from_utf8_lossy(stderr));
        error!("-- stderr end --");
    }
}

/// Run bound cases one after another and tally the outcome.
pub fn execute_all(cases: &[TestCase]) -> TestReport {
    let mut report = TestReport::default();
    for case in cases {
        report.record(case, execute(case));
    }
    report
}

/// Binds catalog templates, runs them sequentially and owns their temp files.
pub struct TestRunner {
    layout: Layout,
    pool: TempPool,
}

impl TestRunner {
    pub fn new(layout: Layout, keep_temp: bool) -> Self {
        Self {
            layout,
            pool: TempPool::new(keep_temp),
        }
    }

    /// Temp paths for every case are allocated before the first case runs
    /// and released only after the last one.
    pub fn run(mut self, templates: &[&CaseTemplate]) -> Result<TestReport> {
        let mut cases = Vec::with_capacity(templates.len());
        for template in templates {
            let temps = self
                .pool
                .allocate(template.temp_suffix, template.temp_count)
                .with_context(|| {
                    format!(
                        "Failed to allocate temp files for {} {}",
                        template.category, template.name
                    )
                })?;
            cases.push(template.bind(&self.layout, &temps));
        }
        info!(
            "running {} cases against {}",
            cases.len(),
            self.layout.program.display()
        );

        let report = execute_all(&cases);
        self.pool.release();
        Ok(report)
    }
}
