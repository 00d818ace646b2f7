//! Metatype output-format versions
//!
//! The extracted schema is versioned to the lowest metatype revision able to
//! express every feature it uses. Extraction starts from a caller-supplied
//! floor and raises the watermark as features are exercised.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MetatypeError, Result};

/// A metatype document revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetatypeVersion {
    #[serde(rename = "1.2.0")]
    V1_2,
    #[serde(rename = "1.3.0")]
    V1_3,
    #[serde(rename = "1.4.0")]
    V1_4,
}

impl Default for MetatypeVersion {
    fn default() -> Self {
        Self::V1_2
    }
}

impl MetatypeVersion {
    /// All known revisions, oldest first
    pub const ALL: [MetatypeVersion; 3] = [Self::V1_2, Self::V1_3, Self::V1_4];

    /// The semantic version of this revision
    pub fn version(&self) -> Version {
        match self {
            Self::V1_2 => Version::new(1, 2, 0),
            Self::V1_3 => Version::new(1, 3, 0),
            Self::V1_4 => Version::new(1, 4, 0),
        }
    }

    /// XML namespace of the metatype document for this revision
    pub fn namespace(&self) -> String {
        format!("http://www.osgi.org/xmlns/metatype/v{}", self.version())
    }

    /// Parse "1.4", "1.4.0" or "v1.4.0"
    pub fn parse(version_str: &str) -> Result<Self> {
        let trimmed = version_str.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(MetatypeError::InvalidVersion(version_str.to_string()));
        }
        let normalized = match trimmed.matches('.').count() {
            0 => format!("{}.0.0", trimmed),
            1 => format!("{}.0", trimmed),
            _ => trimmed.to_string(),
        };
        let version = Version::parse(&normalized)?;
        Self::ALL
            .into_iter()
            .find(|v| v.version() == version)
            .ok_or_else(|| MetatypeError::UnsupportedVersion(version_str.to_string()))
    }
}

impl FromStr for MetatypeVersion {
    type Err = MetatypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MetatypeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!(MetatypeVersion::parse("1.4.0").unwrap(), MetatypeVersion::V1_4);
        assert_eq!(MetatypeVersion::parse("1.3").unwrap(), MetatypeVersion::V1_3);
        assert_eq!(MetatypeVersion::parse("v1.2.0").unwrap(), MetatypeVersion::V1_2);
    }

    #[test]
    fn test_unknown_version_rejected() {
        assert!(matches!(
            MetatypeVersion::parse("1.5"),
            Err(MetatypeError::UnsupportedVersion(_))
        ));
        assert!(MetatypeVersion::parse("banana").is_err());
        assert!(MetatypeVersion::parse("").is_err());
    }

    #[test]
    fn test_ordering_and_namespace() {
        assert!(MetatypeVersion::V1_2 < MetatypeVersion::V1_4);
        assert_eq!(
            MetatypeVersion::V1_4.namespace(),
            "http://www.osgi.org/xmlns/metatype/v1.4.0"
        );
        assert_eq!(MetatypeVersion::V1_3.to_string(), "1.3.0");
    }
}
