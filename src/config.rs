//! Configuration management for metatype extraction
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (metatype.toml)
//! - Environment variables (METATYPE__*)
//!
//! ## Example config file (metatype.toml):
//! ```toml
//! [extract]
//! nested = true
//! min_version = "1.2.0"
//! platform_packages = ["java.", "javax."]
//!
//! [output]
//! format = "compact"
//!
//! [[extensions]]
//! marker = "com.acme.Tuning"
//! namespace = "urn:acme:tuning"
//! prefix = "tn"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extension::MarkerRecognizer;
use crate::metatype::{ExtractOption, Options, DEFAULT_PLATFORM_PACKAGES};
use crate::version::MetatypeVersion;

/// Main configuration for metatype extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetatypeConfig {
    /// Extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Markers carried as extension attributes
    #[serde(default)]
    pub extensions: Vec<ExtensionConfig>,
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Accept interface-typed members
    #[serde(default)]
    pub nested: bool,

    /// Lowest version a produced OCD declares
    #[serde(default = "default_min_version")]
    pub min_version: String,

    /// Package prefixes never walked for inherited members
    #[serde(default = "default_platform_packages")]
    pub platform_packages: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// A marker type registered as an extension attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Fully qualified marker type
    pub marker: String,
    pub namespace: String,
    pub prefix: String,
}

fn default_min_version() -> String {
    MetatypeVersion::V1_2.to_string()
}

fn default_platform_packages() -> Vec<String> {
    DEFAULT_PLATFORM_PACKAGES.iter().map(|p| p.to_string()).collect()
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            nested: false,
            min_version: default_min_version(),
            platform_packages: default_platform_packages(),
        }
    }
}

impl MetatypeConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["metatype.toml", ".metatype.toml", "config/metatype.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "metatype", "metatype") {
            let xdg_config = config_dir.config_dir().join("metatype.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // METATYPE__EXTRACT__NESTED=true
        builder = builder.add_source(
            Environment::with_prefix("METATYPE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Extraction options selected by this configuration
    pub fn options(&self) -> Options {
        let mut options = Options::default();
        if self.extract.nested {
            options.insert(ExtractOption::Nested);
        }
        options
    }

    /// Parsed minimum version
    pub fn min_version(&self) -> Result<MetatypeVersion> {
        MetatypeVersion::parse(&self.extract.min_version)
    }

    /// Recognizer for the configured extension markers
    pub fn recognizer(&self) -> MarkerRecognizer {
        let mut recognizer = MarkerRecognizer::new();
        for ext in &self.extensions {
            recognizer.register(ext.marker.clone(), ext.namespace.clone(), ext.prefix.clone());
        }
        recognizer
    }
}
