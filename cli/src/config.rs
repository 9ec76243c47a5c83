use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub data_path: PathBuf,
}

impl Config {
    /// Resolve the data file. An explicit path wins; otherwise the file lives
    /// in the platform data directory, which is created on first use.
    pub fn load(data_override: Option<PathBuf>) -> Result<Self> {
        if let Some(data_path) = data_override {
            return Ok(Config { data_path });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "mealprep").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let data_path = data_dir.join("mealprep.json");
        tracing::debug!(path = %data_path.display(), "using default data file");

        Ok(Config { data_path })
    }
}
