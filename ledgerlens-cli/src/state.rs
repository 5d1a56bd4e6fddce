use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn ledgerlens_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ledgerlens"))
}

pub fn ensure_ledgerlens_home() -> Result<PathBuf> {
    let dir = ledgerlens_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// `~/.ledgerlens/logs/YYYY-MM-DD.log`, creating the directory.
pub fn daily_log_path() -> Result<PathBuf> {
    let dir = ensure_ledgerlens_home()?.join("logs");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    Ok(dir.join(format!("{today}.log")))
}
