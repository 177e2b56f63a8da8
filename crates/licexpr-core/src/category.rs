//! License categories - coarse classification of licenses by obligations
//!
//! Categories come from an embedded dataset keyed by SPDX identifier,
//! alternate SPDX identifiers, and dataset license key. The dataset is
//! parsed once on first use; an unreadable dataset yields an empty index
//! and every lookup answers [`Category::Unknown`].

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

const CATEGORIES_JSON: &str = include_str!("../data/categories.json");

/// License category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Permissive,
    Copyleft,
    #[serde(rename = "Copyleft Limited")]
    CopyleftLimited,
    Commercial,
    #[serde(rename = "Proprietary Free")]
    ProprietaryFree,
    #[serde(rename = "Public Domain")]
    PublicDomain,
    #[serde(rename = "Patent License")]
    PatentLicense,
    #[serde(rename = "Source-available")]
    SourceAvailable,
    #[serde(rename = "Free Restricted")]
    FreeRestricted,
    #[serde(rename = "CLA")]
    Cla,
    #[serde(rename = "Unstated License")]
    Unstated,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Permissive => "Permissive",
            Category::Copyleft => "Copyleft",
            Category::CopyleftLimited => "Copyleft Limited",
            Category::Commercial => "Commercial",
            Category::ProprietaryFree => "Proprietary Free",
            Category::PublicDomain => "Public Domain",
            Category::PatentLicense => "Patent License",
            Category::SourceAvailable => "Source-available",
            Category::FreeRestricted => "Free Restricted",
            Category::Cla => "CLA",
            Category::Unstated => "Unstated License",
            Category::Unknown => "Unknown",
        }
    }

    /// Map a dataset category name; unrecognised names are `Unknown`
    pub fn from_name(name: &str) -> Self {
        match name {
            "Permissive" => Category::Permissive,
            "Copyleft" => Category::Copyleft,
            "Copyleft Limited" => Category::CopyleftLimited,
            "Commercial" => Category::Commercial,
            "Proprietary Free" => Category::ProprietaryFree,
            "Public Domain" => Category::PublicDomain,
            "Patent License" => Category::PatentLicense,
            "Source-available" => Category::SourceAvailable,
            "Free Restricted" => Category::FreeRestricted,
            "CLA" => Category::Cla,
            "Unstated License" => Category::Unstated,
            _ => Category::Unknown,
        }
    }

    pub fn is_permissive(&self) -> bool {
        matches!(self, Category::Permissive | Category::PublicDomain)
    }

    pub fn is_copyleft(&self) -> bool {
        matches!(self, Category::Copyleft | Category::CopyleftLimited)
    }

    pub fn is_commercial(&self) -> bool {
        matches!(self, Category::Commercial | Category::ProprietaryFree)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset details for one license or exception
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseInfo {
    pub key: String,
    pub spdx_key: String,
    pub category: Category,
    pub is_exception: bool,
    pub is_deprecated: bool,
}

// ── Dataset ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LicenseEntry {
    license_key: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    spdx_license_key: String,
    #[serde(default)]
    other_spdx_license_keys: Vec<String>,
    #[serde(default)]
    is_exception: bool,
    #[serde(default)]
    is_deprecated: bool,
}

impl LicenseEntry {
    fn category(&self) -> Category {
        Category::from_name(&self.category)
    }

    fn info(&self) -> LicenseInfo {
        LicenseInfo {
            key: self.license_key.clone(),
            spdx_key: self.spdx_license_key.clone(),
            category: self.category(),
            is_exception: self.is_exception,
            is_deprecated: self.is_deprecated,
        }
    }
}

#[derive(Debug, Default)]
struct CategoryIndex {
    entries: Vec<LicenseEntry>,
    by_key: HashMap<String, Category>,
}

impl CategoryIndex {
    fn from_json(json: &str) -> Self {
        let entries: Vec<LicenseEntry> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "license category dataset is unreadable");
                return CategoryIndex::default();
            }
        };

        let mut by_key = HashMap::with_capacity(entries.len() * 2);
        for entry in &entries {
            let category = entry.category();
            if !entry.spdx_license_key.is_empty() {
                by_key.insert(entry.spdx_license_key.to_lowercase(), category);
            }
            for key in &entry.other_spdx_license_keys {
                if !key.starts_with("LicenseRef-") {
                    by_key.insert(key.to_lowercase(), category);
                }
            }
            by_key.insert(entry.license_key.to_lowercase(), category);
        }

        debug!(entries = entries.len(), keys = by_key.len(), "loaded license categories");
        CategoryIndex { entries, by_key }
    }

    fn category(&self, license: &str) -> Category {
        if let Some(category) = self.by_key.get(&license.to_lowercase()) {
            return *category;
        }

        let base = license.strip_suffix("-only").unwrap_or(license);
        let base = base.strip_suffix("-or-later").unwrap_or(base);
        self.by_key
            .get(&base.to_lowercase())
            .copied()
            .unwrap_or(Category::Unknown)
    }

    fn info(&self, license: &str) -> Option<LicenseInfo> {
        let lower = license.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry.spdx_license_key.to_lowercase() == lower
                    || entry.license_key.to_lowercase() == lower
            })
            .map(LicenseEntry::info)
    }
}

fn index() -> &'static CategoryIndex {
    static INDEX: OnceLock<CategoryIndex> = OnceLock::new();
    INDEX.get_or_init(|| CategoryIndex::from_json(CATEGORIES_JSON))
}

// ── Per-license queries ────────────────────────────────────

/// Category of a license identifier or dataset key (case-insensitive)
///
/// `-only` / `-or-later` forms fall back to their bare identifier.
///
/// # Example
/// ```
/// use licexpr_core::category::{license_category, Category};
///
/// assert_eq!(license_category("MIT"), Category::Permissive);
/// assert_eq!(license_category("MPL-2.0"), Category::CopyleftLimited);
/// ```
pub fn license_category(license: &str) -> Category {
    index().category(license)
}

/// Permissive or public domain
pub fn is_permissive(license: &str) -> bool {
    license_category(license).is_permissive()
}

/// Copyleft or weak (limited) copyleft
pub fn is_copyleft(license: &str) -> bool {
    license_category(license).is_copyleft()
}

/// Commercial or proprietary-free
pub fn is_commercial(license: &str) -> bool {
    license_category(license).is_commercial()
}

pub fn license_info(license: &str) -> Option<LicenseInfo> {
    index().info(license)
}

// ── Per-expression queries ─────────────────────────────────

/// Unique categories of the licenses in an expression, first seen first
pub fn expression_categories(expression: &str) -> Result<Vec<Category>> {
    let mut categories = Vec::new();
    for license in crate::extract_licenses(expression)? {
        let category = license_category(&license);
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

/// Whether any license in the expression is copyleft; false if it does not parse
pub fn has_copyleft(expression: &str) -> bool {
    crate::extract_licenses(expression)
        .map(|licenses| licenses.iter().any(|license| is_copyleft(license)))
        .unwrap_or(false)
}

/// Whether the expression names at least one license and all are permissive;
/// false if it does not parse
pub fn is_fully_permissive(expression: &str) -> bool {
    crate::extract_licenses(expression)
        .map(|licenses| !licenses.is_empty() && licenses.iter().all(|license| is_permissive(license)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Lookup ─────────────────────────────────────────

    #[test]
    fn test_license_category_table() {
        let cases = [
            ("MIT", Category::Permissive),
            ("mit", Category::Permissive),
            ("Apache-2.0", Category::Permissive),
            ("BSD-3-Clause", Category::Permissive),
            ("BSD-2-Clause", Category::Permissive),
            ("ISC", Category::Permissive),
            ("GPL-2.0-only", Category::Copyleft),
            ("GPL-3.0-only", Category::Copyleft),
            ("GPL-3.0-or-later", Category::Copyleft),
            ("AGPL-3.0-only", Category::Copyleft),
            ("LGPL-2.1-only", Category::CopyleftLimited),
            ("LGPL-3.0-only", Category::CopyleftLimited),
            ("MPL-2.0", Category::CopyleftLimited),
            ("EPL-2.0", Category::CopyleftLimited),
            ("Unlicense", Category::PublicDomain),
            ("CC0-1.0", Category::PublicDomain),
        ];
        for (license, expected) in cases {
            assert_eq!(license_category(license), expected, "category of {}", license);
        }
    }

    #[test]
    fn test_alternate_and_dataset_keys() {
        assert_eq!(license_category("GPL-2.0"), Category::Copyleft);
        assert_eq!(license_category("gpl-2.0+"), Category::Copyleft);
        assert_eq!(license_category("bsd-new"), Category::Permissive);
        assert_eq!(license_category("SSPL-1.0"), Category::SourceAvailable);
    }

    #[test]
    fn test_license_ref_alternate_keys_are_skipped() {
        assert_eq!(license_category("LicenseRef-GPL-3.0-or-later"), Category::Unknown);
        assert_eq!(
            license_category("LicenseRef-scancode-public-domain"),
            Category::PublicDomain
        );
    }

    #[test]
    fn test_suffix_fallback() {
        assert_eq!(license_category("MIT-only"), Category::Permissive);
        assert_eq!(license_category("MPL-2.0-or-later"), Category::CopyleftLimited);
    }

    #[test]
    fn test_unknown_license() {
        assert_eq!(license_category("TOTALLY-FAKE-LICENSE-12345"), Category::Unknown);
    }

    #[test]
    fn test_category_predicates() {
        for license in ["MIT", "Apache-2.0", "BSD-3-Clause", "ISC", "Unlicense", "CC0-1.0"] {
            assert!(is_permissive(license), "{} should be permissive", license);
        }
        for license in ["GPL-3.0-only", "LGPL-2.1-only", "AGPL-3.0-only"] {
            assert!(!is_permissive(license), "{} should not be permissive", license);
        }
        for license in ["GPL-2.0-only", "LGPL-3.0-only", "MPL-2.0"] {
            assert!(is_copyleft(license), "{} should be copyleft", license);
        }
        assert!(!is_copyleft("MIT"));
        assert!(is_commercial("LicenseRef-scancode-commercial-license"));
        assert!(is_commercial("proprietary-license"));
        assert!(!is_commercial("MIT"));
    }

    // ── License info ───────────────────────────────────

    #[test]
    fn test_license_info() {
        let info = license_info("MIT").unwrap();
        assert_eq!(info.spdx_key, "MIT");
        assert_eq!(info.key, "mit");
        assert_eq!(info.category, Category::Permissive);
        assert!(!info.is_exception);

        let info = license_info("Classpath-exception-2.0").unwrap();
        assert!(info.is_exception);

        let info = license_info("bsd-2-clause-freebsd").unwrap();
        assert!(info.is_deprecated);

        assert!(license_info("Fakey-1.0").is_none());
    }

    // ── Expressions ────────────────────────────────────

    #[test]
    fn test_expression_categories() {
        assert_eq!(expression_categories("MIT").unwrap(), vec![Category::Permissive]);
        assert_eq!(
            expression_categories("MIT OR Apache-2.0").unwrap(),
            vec![Category::Permissive]
        );
        assert_eq!(
            expression_categories("MIT OR GPL-3.0-only").unwrap(),
            vec![Category::Copyleft, Category::Permissive]
        );
        assert_eq!(
            expression_categories("GPL-2.0-only OR GPL-3.0-only").unwrap(),
            vec![Category::Copyleft]
        );
        assert!(expression_categories("MIT AND").is_err());
    }

    #[test]
    fn test_has_copyleft() {
        let cases = [
            ("MIT", false),
            ("MIT OR Apache-2.0", false),
            ("MIT AND BSD-3-Clause", false),
            ("GPL-3.0-only", true),
            ("MIT OR GPL-3.0-only", true),
            ("MIT AND LGPL-2.1-only", true),
            ("Apache-2.0 OR MPL-2.0", true),
            ("Unlicense OR CC0-1.0", false),
            ("((MIT", false),
        ];
        for (expression, expected) in cases {
            assert_eq!(has_copyleft(expression), expected, "has_copyleft({})", expression);
        }
    }

    #[test]
    fn test_is_fully_permissive() {
        let cases = [
            ("MIT", true),
            ("MIT OR Apache-2.0", true),
            ("MIT AND BSD-3-Clause", true),
            ("Unlicense OR CC0-1.0", true),
            ("GPL-3.0-only", false),
            ("MIT OR GPL-3.0-only", false),
            ("Apache-2.0 OR MPL-2.0", false),
            ("NONE", false),
            ("", false),
        ];
        for (expression, expected) in cases {
            assert_eq!(
                is_fully_permissive(expression),
                expected,
                "is_fully_permissive({})",
                expression
            );
        }
    }

    // ── Dataset ────────────────────────────────────────

    #[test]
    fn test_unreadable_dataset_yields_empty_index() {
        let index = CategoryIndex::from_json("not json");
        assert_eq!(index.category("MIT"), Category::Unknown);
        assert!(index.info("MIT").is_none());
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::CopyleftLimited).unwrap(),
            "\"Copyleft Limited\""
        );
        let category: Category = serde_json::from_str("\"Source-available\"").unwrap();
        assert_eq!(category, Category::SourceAvailable);
        assert_eq!(Category::Cla.to_string(), "CLA");
    }
}
