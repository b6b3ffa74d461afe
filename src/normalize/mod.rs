//! Institution and region normalization.
//!
//! A raw institution string is looked up verbatim in the [`NormalizationTable`];
//! a hit returns the curated `(institution, region)` pair as is. On a miss the
//! raw string is kept and the region comes from the record's country.

pub mod table;

pub use table::{CanonicalInstitution, NormalizationTable, RegionRule};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::UNKNOWN_INSTITUTION;

/// Canonical institution and coarse region for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedMetadata {
    pub institution: String,
    pub region: String,
}

pub struct Normalizer {
    table: NormalizationTable,
}

impl Normalizer {
    pub fn new(table: NormalizationTable) -> Self {
        Self { table }
    }

    /// Never fails: a missing institution becomes "Unknown", a missing or
    /// unlisted country lands in the fallback region.
    pub fn normalize(&self, institution: Option<&str>, country: Option<&str>) -> NormalizedMetadata {
        let raw_institution = institution.unwrap_or(UNKNOWN_INSTITUTION);

        if let Some(canonical) = self.table.lookup_institution(raw_institution) {
            return NormalizedMetadata {
                institution: canonical.institution.clone(),
                region: canonical.region.clone(),
            };
        }

        NormalizedMetadata {
            institution: raw_institution.to_string(),
            region: self.table.region_for_country(country).to_string(),
        }
    }

    /// Normalizes the `institution` and `country` fields of a raw record.
    ///
    /// Null is treated like an absent field; other non-string values are
    /// matched by their JSON text.
    pub fn normalize_record(&self, record: &Map<String, Value>) -> NormalizedMetadata {
        let institution = field_text(record, "institution");
        let country = field_text(record, "country");
        self.normalize(institution.as_deref(), country.as_deref())
    }
}

fn field_text(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}
