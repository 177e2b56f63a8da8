//! licexpr Core - license expression normalizer and parser
//!
//! Turns exact or informal license text ("Apache 2", "GPL v3 or later",
//! "MIT License") into canonical SPDX license expressions.
//!
//! # Architecture
//!
//! ```text
//! Text → Tokenizer → Pre-processor → Parser → Expression → Renderer
//!                         ↓
//!                    Normalizer (exact → transforms → transpositions → last resorts)
//!                         ↓
//!                    Vocabulary (SPDX licenses, deprecated IDs, exceptions)
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces the same expression
//! - **Validated**: every license in a parsed tree is a vocabulary identifier
//!   (or a user-defined `LicenseRef-`)
//! - **Round-trip**: `parse(render(e))` renders back to `render(e)`
//! - **Bounded**: no I/O; work is bounded by input length and table sizes

pub mod category;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod satisfies;
pub mod vocabulary;

pub use category::{Category, LicenseInfo};
pub use error::{Error, ErrorKind, Result};
pub use parser::ast::{Expression, License, LicenseRef, SpecialValue};
pub use parser::{parse, parse_strict, parse_with, ParseMode, Parser};
pub use satisfies::satisfies;
pub use vocabulary::Vocabulary;

use normalizer::Normalizer;

/// Normalize a single license phrase to its canonical identifier
///
/// # Example
/// ```
/// assert_eq!(licexpr_core::normalize("Apache License, Version 2.0").unwrap(), "Apache-2.0");
/// assert_eq!(licexpr_core::normalize("GPL-2.0+").unwrap(), "GPL-2.0-or-later");
/// ```
pub fn normalize(license: &str) -> Result<String> {
    Normalizer::new(Vocabulary::builtin()).normalize(license)
}

/// Parse informal expression text and render it canonically
pub fn normalize_expression(expression: &str) -> Result<String> {
    Ok(parse(expression)?.to_string())
}

/// Parse canonical expression text and render it canonically
///
/// Only identifier case and operator spelling change; informal names fail.
pub fn normalize_expression_strict(expression: &str) -> Result<String> {
    Ok(parse_strict(expression)?.to_string())
}

/// Whether `expression` is a valid expression of exact identifiers
pub fn is_valid(expression: &str) -> bool {
    parse_strict(expression).is_ok()
}

/// Whether `license` is a known license identifier (case-insensitive)
pub fn is_valid_license(license: &str) -> bool {
    Vocabulary::builtin().lookup_license(license).is_some()
}

/// Licenses named by an expression, sorted and de-duplicated
///
/// # Example
/// ```
/// let licenses = licexpr_core::extract_licenses("(MIT AND GPL-2.0-only) OR Apache-2.0").unwrap();
/// assert_eq!(licenses, vec!["Apache-2.0", "GPL-2.0-only", "MIT"]);
/// ```
pub fn extract_licenses(expression: &str) -> Result<Vec<String>> {
    let mut licenses = parse(expression)?.licenses();
    licenses.sort();
    licenses.dedup();
    Ok(licenses)
}

/// Check identifiers against the vocabulary
///
/// Returns whether all are valid, and the invalid ones in input order.
pub fn validate_licenses<S: AsRef<str>>(licenses: &[S]) -> (bool, Vec<String>) {
    let invalid: Vec<String> = licenses
        .iter()
        .filter_map(|license| {
            let license: &str = license.as_ref();
            (!is_valid_license(license)).then(|| license.to_string())
        })
        .collect();
    (invalid.is_empty(), invalid)
}
