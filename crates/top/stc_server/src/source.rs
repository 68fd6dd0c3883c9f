use std::path::PathBuf;

use anyhow::Context as _;

use stc_density::to_epoch_seconds;
use stc_engine::{DatasetSnapshot, TimestampSource};

/// Reads the dataset timestamps from a text file, on every load.
#[derive(Clone, Debug)]
pub struct FileTimestampSource {
    path: PathBuf,
}

impl FileTimestampSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimestampSource for FileTimestampSource {
    fn load(&self) -> anyhow::Result<DatasetSnapshot> {
        stc_tracing::profile_function!();

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        let timestamps = parse_timestamps(&contents)
            .with_context(|| format!("Failed to parse {:?}", self.path))?;

        stc_log::info!("Loaded {} timestamps from {:?}", timestamps.len(), self.path);
        Ok(DatasetSnapshot::new(timestamps))
    }
}

/// Numbers separated by commas and/or whitespace. Empty fields are skipped.
///
/// Millisecond epoch values are converted to seconds, see [`to_epoch_seconds`].
pub fn parse_timestamps(text: &str) -> anyhow::Result<Vec<f64>> {
    text.lines()
        .enumerate()
        .flat_map(|(line_idx, line)| {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|field| !field.is_empty())
                .map(move |field| (line_idx + 1, field))
        })
        .map(|(line_nr, field)| {
            field
                .parse::<f64>()
                .map(to_epoch_seconds)
                .with_context(|| format!("line {line_nr}: {field:?} is not a number"))
        })
        .collect()
}
