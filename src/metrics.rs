//! Per-run statistics and the append-only log they are written to.

use crate::replay::{TranslatedMove, format_path};
use crate::solver::SolveResult;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};

pub const DEFAULT_METRICS_FILE: &str = "metrics.txt";

const SEPARATOR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    pub algorithm: String,
    pub elapsed: Duration,
    pub peak_memory_kb: f64,
    pub path: Vec<TranslatedMove>,
}

impl RunMetrics {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Algorithm: {}", self.algorithm)?;
        writeln!(out, "Execution Time: {:.4} seconds", self.elapsed.as_secs_f64())?;
        writeln!(out, "Memory Usage: {:.2} KB", self.peak_memory_kb)?;
        writeln!(out, "Solution Path: {}", format_path(&self.path))?;
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))
    }
}

impl From<&SolveResult> for RunMetrics {
    fn from(result: &SolveResult) -> Self {
        Self {
            algorithm: result.strategy.name().to_string(),
            elapsed: result.elapsed,
            peak_memory_kb: result.peak_memory_kb,
            path: result.path.clone(),
        }
    }
}

pub trait MetricsRecorder {
    fn record(&mut self, metrics: &RunMetrics) -> io::Result<()>;
}

/// Keeps records in memory.
impl MetricsRecorder for Vec<RunMetrics> {
    fn record(&mut self, metrics: &RunMetrics) -> io::Result<()> {
        self.push(metrics.clone());
        Ok(())
    }
}

/// Appends every record to a text file, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileMetricsRecorder {
    path: PathBuf,
}

impl Default for FileMetricsRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_FILE)
    }
}

impl FileMetricsRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetricsRecorder for FileMetricsRecorder {
    fn record(&mut self, metrics: &RunMetrics) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        metrics.write_to(&mut file)
    }
}

/// Tracks how far the resident set of this process grows above the level
/// seen at [`MemoryProbe::start`]. Reports zero where the process table
/// cannot be read.
#[derive(Debug)]
pub struct MemoryProbe {
    system: System,
    pid: Option<Pid>,
    baseline: u64,
    peak: u64,
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
            baseline: 0,
            peak: 0,
        }
    }

    pub fn start(&mut self) {
        let resident = self.resident().unwrap_or(0);
        self.baseline = resident;
        self.peak = resident;
    }

    pub fn sample(&mut self) {
        if let Some(resident) = self.resident() {
            self.peak = self.peak.max(resident);
        }
    }

    pub fn peak_kb(&self) -> f64 {
        self.peak.saturating_sub(self.baseline) as f64 / 1024.0
    }

    fn resident(&mut self) -> Option<u64> {
        let pid = self.pid?;
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system.process(pid).map(|process| process.memory())
    }
}
