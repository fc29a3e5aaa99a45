//! Configuration structures for statement processing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detect::DEFAULT_DETECTION_PAGES;
use crate::error::{CardstmtError, Result};
use crate::pdf::{DEFAULT_MIN_TEXT_LENGTH, PdfFileProvider};
use crate::profiles::{ProfileRegistry, ProfileSpec, builtin_specs};

/// Main configuration for cardstmt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardstmtConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Statement extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Leading pages inspected for bank detection.
    pub max_detection_pages: usize,

    /// Minimum text length to consider PDF as text-based.
    pub min_text_length: usize,

    /// Password for encrypted statements (tried after the empty password).
    pub password: Option<String>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_detection_pages: DEFAULT_DETECTION_PAGES,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            password: None,
        }
    }
}

/// Statement extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// JSON profile files registered after the built-in banks.
    pub extra_profiles: Vec<PathBuf>,

    /// Currency label used when rendering amounts.
    pub currency: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extra_profiles: Vec::new(),
            currency: "INR".to_string(),
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; 1 processes documents sequentially.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for CSV files and batch reports.
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl CardstmtConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CardstmtError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| CardstmtError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Built-in profiles followed by any configured profile files.
    pub fn build_registry(&self) -> Result<ProfileRegistry> {
        let mut specs = builtin_specs();
        for path in &self.extraction.extra_profiles {
            specs.push(ProfileSpec::from_file(path)?);
        }
        Ok(ProfileRegistry::from_specs(specs)?)
    }

    /// Page text provider for the configured PDF settings.
    pub fn pdf_provider(&self) -> PdfFileProvider {
        PdfFileProvider::new()
            .with_password(self.pdf.password.clone())
            .with_min_text_length(self.pdf.min_text_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "batch": { "jobs": 8 } }"#).unwrap();

        let config = CardstmtConfig::from_file(&path).unwrap();
        assert_eq!(config.batch.jobs, 8);
        assert_eq!(config.pdf.max_detection_pages, 2);
        assert_eq!(config.extraction.currency, "INR");
        assert_eq!(config.output.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CardstmtConfig::default();
        config.pdf.password = Some("secret".to_string());
        config.save(&path).unwrap();

        assert_eq!(CardstmtConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CardstmtConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CardstmtError::Config(ref msg) if msg.contains("config.json")), "{}", err);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CardstmtConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CardstmtError::Io(_)));
    }

    #[test]
    fn test_broken_profile_file_fails_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[]").unwrap();

        let mut config = CardstmtConfig::default();
        config.extraction.extra_profiles.push(path);
        assert!(matches!(
            config.build_registry(),
            Err(CardstmtError::Profile(ProfileError::Load { .. }))
        ));
    }

    #[test]
    fn test_extra_profiles_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rbl.json");
        let mut spec = builtin_specs().remove(0);
        spec.name = "RBL Bank".to_string();
        spec.signature.all_of = vec!["rbl bank".to_string()];
        std::fs::write(&path, serde_json::to_string(&spec).unwrap()).unwrap();

        let mut config = CardstmtConfig::default();
        config.extraction.extra_profiles.push(path);
        let registry = config.build_registry().unwrap();

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.iter().last().map(|p| p.name()), Some("RBL Bank"));
    }
}
