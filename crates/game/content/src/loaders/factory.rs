//! Content factory for building worlds from a data directory.

use std::path::{Path, PathBuf};

use lldm_core::{EngineConfig, LoadReport, World};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult};

/// Content factory that loads a whole world from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml     # optional EngineConfig
/// ├── world.ron       # optional CatalogFile
/// ├── templates/*.ron
/// └── entities/*.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`, or the defaults when
    /// the file is absent.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.is_file() {
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the configuration and then every catalog record.
    pub fn load_world(&self) -> LoadResult<(World, LoadReport)> {
        let config = self.load_config()?;
        CatalogLoader::load_dir(&self.data_dir, config)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
