use crate::{
    compute::Strategy,
    data::{CityAverages, Error},
};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Runs an aggregation `Strategy` over the measurements file at a fixed path.
#[derive(Debug, Clone)]
pub struct TemperatureFileProcessor {
    path: PathBuf,
}

impl TemperatureFileProcessor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file and hands it over to `strategy`. The file is opened anew
    /// on every call and closed before returning, whatever the outcome.
    pub fn process(&self, strategy: Strategy) -> Result<CityAverages, Error> {
        let file = File::open(&self.path)?;
        debug!(path = %self.path.display(), ?strategy, "processing measurements file");
        strategy.process(BufReader::new(file))
    }
}
