use anyhow::{Context, Result};
use auszug_export::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use auszug_ingest::Extractor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractSection,
    pub scan: ScanSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    /// Text extractor, called as `<command> -layout <pdf> -`
    pub command: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Documents parsed concurrently
    pub jobs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: ExportFormat,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            command: auszug_ingest::extract::DEFAULT_COMMAND.to_string(),
            timeout_secs: auszug_ingest::extract::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for ScanSection {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

impl ExtractSection {
    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.command.clone(), Duration::from_secs(self.timeout_secs))
    }
}

pub fn auszug_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".auszug"))
}

pub fn ensure_auszug_home() -> Result<PathBuf> {
    let dir = auszug_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(auszug_home()?.join("config.toml"))
}

/// Load `~/.auszug/config.toml`, or defaults when there is none.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = ensure_auszug_home()?.join("config.toml");
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.extract.command, "pdftotext");
        assert_eq!(cfg.extract.timeout_secs, 30);
        assert_eq!(cfg.scan.jobs, 4);
        assert_eq!(cfg.output.format, ExportFormat::Csv);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[output]\nformat = \"moneymoney\"\n\n[scan]\njobs = 2\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.output.format, ExportFormat::MoneyMoney);
        assert_eq!(cfg.scan.jobs, 2);
        assert_eq!(cfg.extract.command, "pdftotext");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.extract.timeout_secs = 5;
        save_config_to(&cfg, &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_bad_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[output]\nformat = \"dkb\"\n").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
