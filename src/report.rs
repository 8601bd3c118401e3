//! Per-tree-size summaries and CSV output for the `bench` subcommand.

use layered_merkle::{Algorithm, Mode, Proof, Result};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

pub fn millis(d: Duration) -> f64 {
  d.as_nanos() as f64 / 1_000_000.0
}

/// Mean, median and population standard deviation of a series. All fields are NaN for an empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
  pub count: usize,
  pub mean: f64,
  pub median: f64,
  pub std_dev: f64,
}

impl Summary {
  pub fn of(values: &[f64]) -> Summary {
    let count = values.len();
    if count == 0 {
      return Summary { count, mean: f64::NAN, median: f64::NAN, std_dev: f64::NAN };
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let upper = sorted[count / 2];
    let median = if count % 2 == 0 { (sorted[count / 2 - 1] + upper) / 2.0 } else { upper };
    let std_dev = (sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64).sqrt();
    Summary { count, mean, median, std_dev }
  }

  pub fn of_durations(elapses: &[Duration]) -> Summary {
    Summary::of(&elapses.iter().map(|d| millis(*d)).collect::<Vec<_>>())
  }

  pub fn relative_spread(&self) -> f64 {
    self.std_dev / self.mean
  }
}

/// How often a construction is timed for one tree size.
#[derive(Debug, Clone, Copy)]
pub struct Trials {
  pub min: usize,
  pub max: usize,
  pub threshold: f64,
}

impl Trials {
  /// Calls `f` at least `min` times (and at least once). Stops at `max`, or earlier once the relative spread
  /// of the timings is at most `threshold`.
  pub fn run<F: FnMut() -> Duration>(&self, mut f: F) -> Vec<Duration> {
    let min = self.min.max(1);
    let max = self.max.max(min);
    let mut elapses = Vec::with_capacity(min);
    while elapses.len() < max {
      elapses.push(f());
      if elapses.len() >= min && Summary::of_durations(&elapses).relative_spread() <= self.threshold {
        break;
      }
    }
    elapses
  }
}

/// Tree sizes from 1 to `max` spread evenly on a log scale, ascending and without repeats.
pub fn tree_sizes(max: usize, division: usize) -> Vec<usize> {
  let max = max.max(1);
  let division = division.max(2);
  let ratio = (max as f64).powf(1.0 / (division - 1) as f64);
  let mut sizes = (0..division)
    .map(|k| if k + 1 == division { max } else { (ratio.powi(k as i32).round() as usize).clamp(1, max) })
    .collect::<Vec<_>>();
  sizes.dedup();
  sizes
}

/// One proof drawn from a tree, with the time taken to generate and to verify it.
#[derive(Debug, Clone)]
pub struct ProofSample {
  pub steps: usize,
  pub bytes: usize,
  pub prove: Duration,
  pub verify: Duration,
}

impl ProofSample {
  pub fn new(proof: &Proof, prove: Duration, verify: Duration) -> Self {
    ProofSample { steps: proof.len(), bytes: proof.data_size(), prove, verify }
  }
}

/// Everything measured for a tree of `leaves` leaves.
#[derive(Debug, Clone)]
pub struct Row {
  pub leaves: usize,
  pub depth: usize,
  pub build: Summary,
  pub prove: Summary,
  pub verify: Summary,
  pub steps: Summary,
  pub proof_bytes: Summary,
}

impl Row {
  pub fn new(leaves: usize, depth: usize, build: &[Duration], samples: &[ProofSample]) -> Row {
    let series = |f: fn(&ProofSample) -> f64| samples.iter().map(f).collect::<Vec<_>>();
    Row {
      leaves,
      depth,
      build: Summary::of_durations(build),
      prove: Summary::of(&series(|s| millis(s.prove))),
      verify: Summary::of(&series(|s| millis(s.verify))),
      steps: Summary::of(&series(|s| s.steps as f64)),
      proof_bytes: Summary::of(&series(|s| s.bytes as f64)),
    }
  }
}

impl Display for Row {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "n={} depth={}: build {:.3}ms ±{:.3} ({} runs); prove {:.4}ms; verify {:.4}ms; {:.1} steps / {:.0} bytes per proof",
      self.leaves,
      self.depth,
      self.build.median,
      self.build.std_dev,
      self.build.count,
      self.prove.median,
      self.verify.median,
      self.steps.mean,
      self.proof_bytes.mean
    )
  }
}

/// Rows of one session, for a single hash function and mode, ordered by tree size.
pub struct Report {
  algorithm: Algorithm,
  mode: Mode,
  rows: BTreeMap<usize, Row>,
}

impl Report {
  pub const HEADER: &'static str = "HASH,MODE,N,DEPTH,BUILD_MS,BUILD_SD_MS,PROVE_MS,VERIFY_MS,PROOF_STEPS,PROOF_BYTES";

  pub fn new(algorithm: Algorithm, mode: Mode) -> Self {
    Report { algorithm, mode, rows: BTreeMap::new() }
  }

  /// Adds a row, replacing any earlier one for the same tree size.
  pub fn insert(&mut self, row: Row) {
    self.rows.insert(row.leaves, row);
  }

  pub fn file_name(&self, session: &str) -> String {
    format!("{session}-{}-{}.csv", self.algorithm, self.mode)
  }

  pub fn save_csv(&self, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", Self::HEADER)?;
    for row in self.rows.values() {
      writeln!(
        writer,
        "{},{},{},{},{:.6},{:.6},{:.6},{:.6},{:.2},{:.1}",
        self.algorithm,
        self.mode,
        row.leaves,
        row.depth,
        row.build.median,
        row.build.std_dev,
        row.prove.median,
        row.verify.median,
        row.steps.mean,
        row.proof_bytes.mean
      )?;
    }
    writer.flush()?;
    Ok(())
  }
}
