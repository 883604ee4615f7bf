//! # Settings
//!
//! User preferences consumed by the resolver and the table loader.
//!
//! Loaded from an optional YAML file, then overridden from the environment:
//!
//! - `SALESTAX_DEFAULT_COUNTRY`: country hint used with the default region
//! - `SALESTAX_DEFAULT_REGION`: region used when an amount is given but no
//!   region can be determined
//! - `SALESTAX_TABLE`: path to a rate table replacing the built-in one
//!
//! An empty environment value clears the setting.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::non_blank;

/// Environment variable overriding [`Settings::default_country`].
pub const ENV_DEFAULT_COUNTRY: &str = "SALESTAX_DEFAULT_COUNTRY";
/// Environment variable overriding [`Settings::default_region`].
pub const ENV_DEFAULT_REGION: &str = "SALESTAX_DEFAULT_REGION";
/// Environment variable overriding [`Settings::tax_table`].
pub const ENV_TABLE: &str = "SALESTAX_TABLE";

/// Resolver defaults and table location.
///
/// ```yaml
/// defaultCountry: Canada
/// defaultRegion: Ontario
/// taxTable: ./rates.yaml
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    /// Country hint applied together with the default region.
    #[serde(default)]
    pub default_country: Option<String>,
    /// Region used when only an amount is available.
    #[serde(default)]
    pub default_region: Option<String>,
    /// Rate table file. Relative paths in a settings file are resolved
    /// against the file's directory.
    #[serde(default)]
    pub tax_table: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from a YAML document. Blank values are treated as
    /// absent.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid, empty configuration.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(source)?;
        Ok(settings.normalized())
    }

    /// Read settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_yaml_str(&source)?;
        if let Some(table) = settings.tax_table.take() {
            let base = path.parent().unwrap_or(Path::new("."));
            settings.tax_table = Some(if table.is_relative() {
                base.join(table)
            } else {
                table
            });
        }
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Apply `SALESTAX_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. A key that is present
    /// replaces the setting; a present but blank value clears it.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEFAULT_COUNTRY) {
            self.default_country = non_blank(&value);
        }
        if let Some(value) = lookup(ENV_DEFAULT_REGION) {
            self.default_region = non_blank(&value);
        }
        if let Some(value) = lookup(ENV_TABLE) {
            self.tax_table = non_blank(&value).map(PathBuf::from);
        }
        self
    }

    fn normalized(mut self) -> Self {
        self.default_country = self.default_country.as_deref().and_then(non_blank);
        self.default_region = self.default_region.as_deref().and_then(non_blank);
        self.tax_table = self.tax_table.filter(|p| !p.as_os_str().is_empty());
        self
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parses_camel_case_keys() {
        let settings = Settings::from_yaml_str(
            "defaultCountry: Canada\ndefaultRegion: Ontario\ntaxTable: rates.yaml\n",
        )
        .unwrap();
        assert_eq!(settings.default_country.as_deref(), Some("Canada"));
        assert_eq!(settings.default_region.as_deref(), Some("Ontario"));
        assert_eq!(settings.tax_table, Some(PathBuf::from("rates.yaml")));
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml_str("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn blank_values_are_absent() {
        let settings = Settings::from_yaml_str("defaultCountry: '  '\ndefaultRegion: ''\n").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Settings::from_yaml_str("defaultProvince: Ontario\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_and_clear() {
        let base = Settings {
            default_country: Some("Canada".into()),
            default_region: Some("Ontario".into()),
            tax_table: None,
        };
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DEFAULT_COUNTRY, ""),
            (ENV_DEFAULT_REGION, " Quebec "),
            (ENV_TABLE, "/etc/rates.yaml"),
        ]);
        let settings = base.with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.default_country, None);
        assert_eq!(settings.default_region.as_deref(), Some("Quebec"));
        assert_eq!(settings.tax_table, Some(PathBuf::from("/etc/rates.yaml")));
    }

    #[test]
    fn absent_overrides_keep_values() {
        let base = Settings {
            default_country: Some("Canada".into()),
            default_region: None,
            tax_table: None,
        };
        let settings = base.clone().with_overrides(|_| None);
        assert_eq!(settings, base);
    }

    #[test]
    fn file_resolves_relative_table_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salestax.yaml");
        std::fs::write(&path, "defaultRegion: Ontario\ntaxTable: data/rates.yaml\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.tax_table, Some(dir.path().join("data/rates.yaml")));
        assert_eq!(settings.default_region.as_deref(), Some("Ontario"));
    }

    #[test]
    fn file_keeps_absolute_table_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salestax.yaml");
        std::fs::write(&path, "taxTable: /srv/rates.yaml\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.tax_table, Some(PathBuf::from("/srv/rates.yaml")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::from_file(Path::new("/nonexistent/salestax.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
