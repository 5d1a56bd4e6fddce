use anyhow::{Context, Result, bail};
use ledgerlens_client::ServiceEndpoint;
use ledgerlens_core::{CurrencyFormat, DEFAULT_MAX_FILES, Locale, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::ensure_ledgerlens_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub selector: SelectorSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub base_url: String,
    pub analyze_path: String,
    pub health_path: String,
    /// Upper bound for one analysis call
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSection {
    pub max_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// "de-DE" or "en-US"
    pub locale: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        let ep = ServiceEndpoint::default();
        Self {
            base_url: ep.base_url,
            analyze_path: ep.analyze_path,
            health_path: ep.health_path,
            timeout_secs: 120,
        }
    }
}

impl Default for SelectorSection {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            locale: Locale::default().tag().to_string(),
        }
    }
}

impl Config {
    pub fn endpoint(&self) -> ServiceEndpoint {
        ServiceEndpoint {
            base_url: self.service.base_url.clone(),
            analyze_path: self.service.analyze_path.clone(),
            health_path: self.service.health_path.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    pub fn selector(&self) -> SelectorConfig {
        SelectorConfig::default().with_max_files(self.selector.max_files)
    }

    pub fn currency_format(&self) -> Result<CurrencyFormat> {
        match Locale::parse(&self.display.locale) {
            Some(l) => Ok(CurrencyFormat::for_locale(l)),
            None => bail!(
                "unsupported locale {:?} (expected de-DE or en-US)",
                self.display.locale
            ),
        }
    }

    /// Reject values that would make the tool unusable.
    pub fn validate(&self) -> Result<()> {
        if self.selector.max_files == 0 {
            bail!("selector.max_files must be at least 1");
        }
        if self.service.timeout_secs == 0 {
            bail!("service.timeout_secs must be at least 1");
        }
        if !self.service.analyze_path.starts_with('/') {
            bail!("service.analyze_path must start with '/'");
        }
        self.currency_format()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ledgerlens_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_from(&config_path()?)
}

pub fn load_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
