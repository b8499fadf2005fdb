use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::planner::{Subject, SubjectPalette};
use crate::theme::ThemeConfig;

const APP_DIR: &str = "study-planner";
const TASK_FILE: &str = "tasks.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    /// Ring the terminal bell when a countdown finishes.
    pub bell: bool,
    pub theme: ThemeConfig,
    pub subjects: Vec<Subject>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "info".to_string(),
            bell: true,
            theme: ThemeConfig::default(),
            subjects: Vec::new(),
        }
    }
}

impl Config {
    /// Reads `path`, or the per-user config file when `None`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `--data-dir` wins over the config file, which wins over the platform default.
    pub fn resolve_data_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
    }

    pub fn palette(&self) -> SubjectPalette {
        SubjectPalette::new(self.subjects.clone())
    }
}

pub fn task_file(data_dir: &Path) -> PathBuf {
    data_dir.join(TASK_FILE)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}
