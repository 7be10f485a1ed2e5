//! Observation log for offline training
//!
//! One sample per line, three whitespace-separated fields:
//! normalized y, normalized gap bottom, jump label (0 or 1). The log is only
//! ever appended to.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::settings::SimConfig;
use crate::sim::Observation;

/// A normalized, labelled observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub y: f32,
    pub gap_bottom: f32,
    pub jumped: bool,
}

impl Sample {
    pub fn from_observation(obs: &Observation, config: &SimConfig) -> Self {
        let [y, gap_bottom] = obs.normalized(config);
        Self {
            y,
            gap_bottom,
            jumped: obs.jumped,
        }
    }

    pub fn label(&self) -> u8 {
        u8::from(self.jumped)
    }

    /// Format as a newline-terminated log line
    pub fn to_line(&self) -> String {
        format!("{} {} {}\n", self.y, self.gap_bottom, self.label())
    }

    /// Parse one log line (without its newline). `line_no` is 1-based and
    /// only used for the error message.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |reason: String| Error::Malformed {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [y, gap_bottom, label] = fields.as_slice() else {
            return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
        };
        let y: f32 = y
            .parse()
            .map_err(|_| malformed(format!("y {y:?} is not a number")))?;
        let gap_bottom: f32 = gap_bottom
            .parse()
            .map_err(|_| malformed(format!("gap bottom {gap_bottom:?} is not a number")))?;
        if !(y.is_finite() && gap_bottom.is_finite()) {
            return Err(malformed(format!("non-finite value in {line:?}")));
        }
        let jumped = match label.parse::<i64>() {
            Ok(0) => false,
            Ok(1) => true,
            Ok(other) => return Err(malformed(format!("label {other} is not 0 or 1"))),
            Err(_) => return Err(malformed(format!("label {label:?} is not an integer"))),
        };
        Ok(Self {
            y,
            gap_bottom,
            jumped,
        })
    }
}

/// Append-only writer for the observation log
#[derive(Debug)]
pub struct DataLog {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl DataLog {
    /// Open (creating if needed) a log for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::info!("Appending observations to {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Samples written through this handle
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        self.writer.write_all(sample.to_line().as_bytes())?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Parse a whole log. Any malformed line fails the entire load.
pub fn parse_samples(text: &str) -> Result<Vec<Sample>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| Sample::parse_line(line, i + 1))
        .collect()
}

/// Read and parse a log file
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let samples = parse_samples(&text)?;
    log::info!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}
