use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{PrepError, Result};

/// Table shipped with the binary.
const BUILTIN_TABLE: &str = include_str!("../../data/normalization.toml");

fn default_fallback_region() -> String {
    "Other".to_string()
}

/// Canonical name and region for a known raw institution string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalInstitution {
    pub institution: String,
    pub region: String,
}

/// A region and the countries that fall into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRule {
    pub name: String,
    pub countries: Vec<String>,
}

/// Lookup data driving the normalizer.
///
/// Loaded from TOML so curators can add spellings and countries without
/// touching the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationTable {
    #[serde(default = "default_fallback_region")]
    pub fallback_region: String,
    #[serde(default)]
    pub institutions: HashMap<String, CanonicalInstitution>,
    #[serde(default)]
    pub regions: Vec<RegionRule>,
}

impl NormalizationTable {
    /// The table embedded from `data/normalization.toml`
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: NormalizationTable = toml::from_str(content)?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PrepError::Config(format!(
                "Failed to read normalization table '{}': {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_toml_str(&content)?;
        debug!(
            institutions = table.institutions.len(),
            regions = table.regions.len(),
            "Loaded normalization table from {}",
            path.display()
        );
        Ok(table)
    }

    pub fn lookup_institution(&self, raw: &str) -> Option<&CanonicalInstitution> {
        self.institutions.get(raw)
    }

    /// Region for a country; the fallback region when no rule lists it
    pub fn region_for_country(&self, country: Option<&str>) -> &str {
        country
            .and_then(|c| {
                self.regions
                    .iter()
                    .find(|rule| rule.countries.iter().any(|listed| listed == c))
            })
            .map(|rule| rule.name.as_str())
            .unwrap_or(self.fallback_region.as_str())
    }
}
