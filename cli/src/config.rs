use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "foodlist").context("Could not determine home directory")?;
        Self::at(proj_dirs.data_dir())
    }

    /// Use `data_dir` for all state, creating it if needed.
    pub fn at(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("foodlist.db");

        Ok(Config {
            db_path,
            data_dir: data_dir.to_path_buf(),
        })
    }
}
