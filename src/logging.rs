use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "study-planner.log";
const FALLBACK_LEVEL: &str = "info";

/// Sends `tracing` output to a log file in `data_dir`; the terminal belongs
/// to the UI. `RUST_LOG` overrides `default_level`.
pub fn init(data_dir: &Path, default_level: &str) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)
        .wrap_err_with(|| format!("failed to create {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(default_level));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(path)
}

/// Like [`init`], but a log file that can't be opened just means no logging.
pub fn init_or_skip(data_dir: &Path, default_level: &str) -> Option<PathBuf> {
    init(data_dir, default_level).ok()
}

/// An unparsable `log_level` from the config falls back to `info`.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unusable_data_dir_skips_logging() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").expect("write");
        assert_eq!(init_or_skip(&blocker.join("data"), "info"), None);
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        let fallback = EnvFilter::new(FALLBACK_LEVEL).to_string();
        assert_eq!(level_filter("study_planner=loud").to_string(), fallback);
        assert_ne!(level_filter("warn").to_string(), fallback);
    }
}
