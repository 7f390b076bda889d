use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn eventive_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".eventive"))
}

pub fn ensure_eventive_home() -> Result<PathBuf> {
    let dir = eventive_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn read_page(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

pub fn write_page(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("write {}", path.display()))
}
