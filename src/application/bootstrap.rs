use crate::infrastructure::config::{ensure_default_configs, load_configs};
use crate::infrastructure::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
}

/// Prepares the on-disk workspace: config and log directories plus the
/// default config files, verified readable before use.
pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, StoreError> {
    let config_dir = workspace_root.join("config");
    let logs_dir = workspace_root.join("logs");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let _ = load_configs(&config_dir)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
    })
}
