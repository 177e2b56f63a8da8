//! Expression tree - the canonical in-memory form of a license expression
//!
//! Trees are strict binary trees built bottom-up by the parser and never
//! mutated afterwards. `Display` renders the canonical string, inserting the
//! minimum parentheses needed for the grammar to read it back the same way:
//!
//! - an AND never parenthesizes an AND child, but does parenthesize an OR child
//! - an OR parenthesizes an AND child and a license carrying an exception
//!
//! All AST types derive: Debug, Clone, PartialEq, Eq, Serialize, Deserialize

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed license expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    License(License),
    LicenseRef(LicenseRef),
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Special { value: SpecialValue },
}

/// A single license identifier, already validated against the vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    #[serde(default)]
    pub plus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

/// A user-defined `LicenseRef-` (optionally scoped by a `DocumentRef-`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
    pub license_ref: String,
}

/// `NONE` or `NOASSERTION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpecialValue {
    None,
    NoAssertion,
}

const LICENSE_REF_PREFIX: &str = "LICENSEREF-";
const DOCUMENT_REF_PREFIX: &str = "DOCUMENTREF-";
const DOCUMENT_LICENSE_SEPARATOR: &str = ":LICENSEREF-";

impl License {
    pub fn new(id: impl Into<String>) -> Self {
        License {
            id: id.into(),
            plus: false,
            exception: None,
        }
    }
}

impl LicenseRef {
    /// Split a `LicenseRef-x` or `DocumentRef-d:LicenseRef-x` word
    ///
    /// Prefixes are matched case-insensitively. A `DocumentRef-` without
    /// its `:LicenseRef-` part, or a reference with an empty name, is `None`.
    pub fn parse(word: &str) -> Option<Self> {
        let upper = word.to_ascii_uppercase();

        let reference = if upper.starts_with(DOCUMENT_REF_PREFIX) {
            let rest = &word[DOCUMENT_REF_PREFIX.len()..];
            let rest_upper = &upper[DOCUMENT_REF_PREFIX.len()..];
            let idx = rest_upper.find(DOCUMENT_LICENSE_SEPARATOR)?;
            LicenseRef {
                document_ref: Some(rest[..idx].to_string()),
                license_ref: rest[idx + DOCUMENT_LICENSE_SEPARATOR.len()..].to_string(),
            }
        } else if upper.starts_with(LICENSE_REF_PREFIX) {
            LicenseRef {
                document_ref: None,
                license_ref: word[LICENSE_REF_PREFIX.len()..].to_string(),
            }
        } else {
            return None;
        };

        if reference.license_ref.is_empty() {
            return None;
        }
        Some(reference)
    }
}

impl SpecialValue {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "NONE" => Some(SpecialValue::None),
            "NOASSERTION" => Some(SpecialValue::NoAssertion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialValue::None => "NONE",
            SpecialValue::NoAssertion => "NOASSERTION",
        }
    }
}

impl Expression {
    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Expression::Special { .. })
    }

    /// License and LicenseRef leaves, left to right, not de-duplicated
    ///
    /// Exceptions are not included; special values contribute nothing.
    pub fn licenses(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_licenses(&mut out);
        out
    }

    fn collect_licenses(&self, out: &mut Vec<String>) {
        match self {
            Expression::License(license) => out.push(license.id.clone()),
            Expression::LicenseRef(reference) => out.push(reference.to_string()),
            Expression::And { left, right } | Expression::Or { left, right } => {
                left.collect_licenses(out);
                right.collect_licenses(out);
            }
            Expression::Special { .. } => {}
        }
    }

    fn needs_parens_under_and(&self) -> bool {
        matches!(self, Expression::Or { .. })
    }

    fn needs_parens_under_or(&self) -> bool {
        match self {
            Expression::And { .. } => true,
            Expression::License(license) => license.exception.is_some(),
            _ => false,
        }
    }
}

// ── Rendering ──────────────────────────────────────────────

fn write_child(f: &mut fmt::Formatter, child: &Expression, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::License(license) => write!(f, "{}", license),
            Expression::LicenseRef(reference) => write!(f, "{}", reference),
            Expression::And { left, right } => {
                write_child(f, left, left.needs_parens_under_and())?;
                f.write_str(" AND ")?;
                write_child(f, right, right.needs_parens_under_and())
            }
            Expression::Or { left, right } => {
                write_child(f, left, left.needs_parens_under_or())?;
                f.write_str(" OR ")?;
                write_child(f, right, right.needs_parens_under_or())
            }
            Expression::Special { value } => f.write_str(value.as_str()),
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.id)?;
        if self.plus {
            f.write_str("+")?;
        }
        if let Some(exception) = &self.exception {
            write!(f, " WITH {}", exception)?;
        }
        Ok(())
    }
}

impl fmt::Display for LicenseRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.document_ref {
            Some(document) => write!(f, "DocumentRef-{}:LicenseRef-{}", document, self.license_ref),
            None => write!(f, "LicenseRef-{}", self.license_ref),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lic(id: &str) -> Expression {
        Expression::License(License::new(id))
    }

    fn lic_with(id: &str, exception: &str) -> Expression {
        Expression::License(License {
            id: id.to_string(),
            plus: false,
            exception: Some(exception.to_string()),
        })
    }

    // ── Rendering ──────────────────────────────────────

    #[test]
    fn test_render_or_of_and_gets_parens() {
        let expr = Expression::or(lic("MIT"), Expression::and(lic("GPL-2.0-only"), lic("Apache-2.0")));
        assert_eq!(expr.to_string(), "MIT OR (GPL-2.0-only AND Apache-2.0)");
    }

    #[test]
    fn test_render_and_of_or_gets_parens() {
        let expr = Expression::and(Expression::or(lic("MIT"), lic("ISC")), lic("Apache-2.0"));
        assert_eq!(expr.to_string(), "(MIT OR ISC) AND Apache-2.0");
    }

    #[test]
    fn test_render_same_operator_is_flat() {
        let expr = Expression::and(Expression::and(lic("MIT"), lic("ISC")), lic("Zlib"));
        assert_eq!(expr.to_string(), "MIT AND ISC AND Zlib");
        let expr = Expression::or(lic("MIT"), Expression::or(lic("ISC"), lic("Zlib")));
        assert_eq!(expr.to_string(), "MIT OR ISC OR Zlib");
    }

    #[test]
    fn test_render_exception_under_or() {
        let expr = Expression::or(lic("EPL-2.0"), lic_with("GPL-2.0-only", "Classpath-exception-2.0"));
        assert_eq!(
            expr.to_string(),
            "EPL-2.0 OR (GPL-2.0-only WITH Classpath-exception-2.0)"
        );

        let expr = Expression::and(lic("MIT"), lic_with("Apache-2.0", "LLVM-exception"));
        assert_eq!(expr.to_string(), "MIT AND Apache-2.0 WITH LLVM-exception");
    }

    #[test]
    fn test_render_plus_and_refs() {
        let mut license = License::new("Apache-2.0");
        license.plus = true;
        assert_eq!(Expression::License(license).to_string(), "Apache-2.0+");

        let reference = LicenseRef {
            document_ref: Some("spdx-tool-1.2".into()),
            license_ref: "MIT-style-1".into(),
        };
        assert_eq!(
            reference.to_string(),
            "DocumentRef-spdx-tool-1.2:LicenseRef-MIT-style-1"
        );
        assert_eq!(
            Expression::Special { value: SpecialValue::NoAssertion }.to_string(),
            "NOASSERTION"
        );
    }

    // ── LicenseRef parsing ─────────────────────────────

    #[test]
    fn test_license_ref_parse() {
        assert_eq!(
            LicenseRef::parse("LicenseRef-custom"),
            Some(LicenseRef { document_ref: None, license_ref: "custom".into() })
        );
        assert_eq!(
            LicenseRef::parse("documentref-doc:licenseref-x-1"),
            Some(LicenseRef { document_ref: Some("doc".into()), license_ref: "x-1".into() })
        );
    }

    #[test]
    fn test_malformed_license_ref_is_rejected() {
        assert_eq!(LicenseRef::parse("DocumentRef-broken"), None);
        assert_eq!(LicenseRef::parse("LicenseRef-"), None);
        assert_eq!(LicenseRef::parse("DocumentRef-doc:LicenseRef-"), None);
        assert_eq!(LicenseRef::parse("MIT"), None);
    }

    // ── Licenses ───────────────────────────────────────

    #[test]
    fn test_licenses_left_to_right_with_duplicates() {
        let expr = Expression::or(
            Expression::and(lic("MIT"), lic_with("GPL-2.0-only", "Classpath-exception-2.0")),
            Expression::or(lic("MIT"), Expression::LicenseRef(LicenseRef::parse("LicenseRef-x").unwrap())),
        );
        assert_eq!(
            expr.licenses(),
            vec!["MIT", "GPL-2.0-only", "MIT", "LicenseRef-x"]
        );
        assert!(Expression::Special { value: SpecialValue::None }.licenses().is_empty());
    }

    // ── Serialization ──────────────────────────────────

    #[test]
    fn test_serde_round_trip() {
        let expr = Expression::and(lic("MIT"), lic_with("GPL-2.0-only", "Classpath-exception-2.0"));
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(lic("MIT")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "license", "id": "MIT", "plus": false}));

        let json = serde_json::to_value(Expression::Special { value: SpecialValue::None }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "special", "value": "NONE"}));
    }
}
