use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::{ConfigOverrides, Field, ScoringConfig};

use crate::state::{default_ledger_path, ensure_tally_home, tally_home, user_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Overrides for per-field defaults and thresholds; empty means built-ins.
    #[serde(default)]
    pub scoring: ConfigOverrides,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    /// Feedback ledger file (default: ~/.tally/feedback.json). `~/` expands to
    /// the user's home; relative paths sit under the tally home.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<String>,
}

impl Config {
    /// Built-in table with this file's overrides applied and validated.
    pub fn scoring_config(&self) -> Result<ScoringConfig> {
        Ok(ScoringConfig::with_overrides(&self.scoring).context("invalid [scoring] section")?)
    }

    pub fn ledger_path(&self) -> Result<PathBuf> {
        let Some(raw) = self.storage.ledger_path.as_deref() else {
            return default_ledger_path();
        };
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("[storage] ledger_path is empty");
        }
        let path = match raw.strip_prefix("~/") {
            Some(rest) => user_home()?.join(rest),
            None => PathBuf::from(raw),
        };
        if path.is_relative() {
            return Ok(tally_home()?.join(path));
        }
        Ok(path)
    }

    /// Check both sections, so a bad file fails before any command touches
    /// the ledger.
    pub fn validate(&self) -> Result<()> {
        self.scoring_config()?;
        let ledger = self.ledger_path()?;
        if ledger.is_dir() {
            bail!("[storage] ledger_path {} is a directory", ledger.display());
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    let s = match fs::read_to_string(&p) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e).with_context(|| format!("read {}", p.display())),
    };
    let cfg = parse_config(&s).with_context(|| format!("in {}", p.display()))?;
    cfg.validate().with_context(|| format!("in {}", p.display()))?;
    Ok(cfg)
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s).context("parse config.toml")?)
}

/// Starter file: the effective ledger path plus the override keys as comments.
fn starter_config(ledger: &Path) -> Result<String> {
    let mut cfg = Config::default();
    cfg.storage.ledger_path = Some(ledger.display().to_string());
    let builtin = ScoringConfig::default();

    let mut out = String::from("# tally configuration\n#\n# [scoring]\n");
    out.push_str(&format!(
        "# low_confidence_threshold = {}\n# medium_confidence_threshold = {}\n#\n# [scoring.defaults]\n",
        builtin.low_confidence_threshold(),
        builtin.medium_confidence_threshold()
    ));
    for field in Field::ALL {
        out.push_str(&format!("# {} = {}\n", field, builtin.default_for(field)));
    }
    out.push('\n');
    out.push_str(&toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(out)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        let status = match load_config() {
            Ok(_) => "valid".to_string(),
            Err(e) => format!("invalid: {e:#}"),
        };
        println!("Config already exists: {} ({status})", p.display());
        return Ok(());
    }
    fs::write(&p, starter_config(&default_ledger_path()?)?).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}
