//! Engine settings.
//!
//! Settings are read from YAML. Every field is optional:
//!
//! ```yaml
//! cache_dir: .sifter-cache
//! cache_version: "2024"
//! display_unit: meters
//! double_tolerance: 0.0001
//! ```
//!
//! `display_unit` is one of `feet`, `inches`, `meters`, `centimeters` or
//! `millimeters` and decides how bare numbers in unit expressions are read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sifter_convert::{ConvertContext, ConverterRegistry, LengthUnit};
use sifter_filter::{FilterError, RuleFactory, DEFAULT_DOUBLE_TOLERANCE};
use sifter_params::{ByteStore, ParamError};
use tracing::debug;

use crate::cache::MetadataCache;
use crate::error::Result;

/// Unit bare numbers are read in.
pub type DisplayUnit = LengthUnit;

/// Settings for caches and rule construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding version-scoped cache files.
    pub cache_dir: PathBuf,
    /// Host version the metadata cache belongs to.
    pub cache_version: String,
    pub display_unit: DisplayUnit,
    /// Tolerance for double equality and ordering.
    pub double_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_dir: PathBuf::from(".sifter-cache"),
            cache_version: "1".to_string(),
            display_unit: DisplayUnit::default(),
            double_tolerance: DEFAULT_DOUBLE_TOLERANCE,
        }
    }
}

impl Settings {
    /// Parses settings from YAML, filling in defaults for missing fields.
    ///
    /// # Example
    ///
    /// ```
    /// use sifter::{DisplayUnit, Settings};
    ///
    /// let settings = Settings::from_yaml_str("display_unit: meters\n").unwrap();
    /// assert_eq!(settings.display_unit, DisplayUnit::Meters);
    /// assert_eq!(settings.cache_version, "1");
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Settings = if yaml.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`, or returns the defaults when there is no
    /// file there.
    pub fn load<B: ByteStore>(bytes: &B, path: &Path) -> Result<Self> {
        if !bytes.exists(path) {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let text = bytes.read_text(path).map_err(ParamError::from)?;
        Self::from_yaml_str(&text)
    }

    /// Serializes the settings back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        if !self.double_tolerance.is_finite() || self.double_tolerance < 0.0 {
            return Err(FilterError::InvalidTolerance(self.double_tolerance).into());
        }
        Ok(())
    }

    /// Directory the metadata cache for this version lives in.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(&self.cache_version)
    }

    pub fn convert_context(&self) -> ConvertContext {
        ConvertContext::for_unit(self.display_unit)
    }

    /// A rule factory with the built-in converters, this display unit and
    /// this tolerance.
    pub fn rule_factory(&self) -> Result<RuleFactory> {
        let factory = RuleFactory::new(Arc::new(ConverterRegistry::with_builtins()))
            .with_context(self.convert_context())
            .with_tolerance(self.double_tolerance)?;
        Ok(factory)
    }

    /// A metadata cache under [`cache_path`](Self::cache_path).
    pub fn metadata_cache<B: ByteStore>(&self, bytes: B) -> MetadataCache<B> {
        MetadataCache::new(bytes, &self.cache_dir, &self.cache_version)
    }
}
