//! Allowed-set evaluation - does an expression permit use under a list of
//! approved licenses?
//!
//! An OR node is satisfied if either side is, an AND node only if both are.
//! Leaves are compared against the allowed terms by identifier and
//! exception; the `+` flag is not considered. Special values are never
//! satisfied.

use tracing::debug;

use crate::parser::ast::Expression;
use crate::{parse, Error, Result};

/// Check `expression` against a list of allowed license terms
///
/// Both the expression and the allowed entries accept informal text.
///
/// # Errors
/// Any parse error in the expression or an allowed entry; an allowed entry
/// that is not a single license term is reported as `InvalidLicense`.
///
/// # Example
/// ```
/// use licexpr_core::satisfies::satisfies;
///
/// assert!(satisfies("MIT OR GPL-3.0-only", &["MIT"]).unwrap());
/// assert!(!satisfies("MIT AND GPL-3.0-only", &["MIT"]).unwrap());
/// ```
pub fn satisfies<S: AsRef<str>>(expression: &str, allowed: &[S]) -> Result<bool> {
    let expr = parse(expression)?;
    let terms = allowed
        .iter()
        .map(|entry| allowed_term(entry.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let satisfied = evaluate(&expr, &terms);
    debug!(expression = %expr, allowed = terms.len(), satisfied, "evaluated allowed set");
    Ok(satisfied)
}

fn allowed_term(entry: &str) -> Result<Expression> {
    match parse(entry)? {
        Expression::License(mut license) => {
            license.plus = false;
            Ok(Expression::License(license))
        }
        reference @ Expression::LicenseRef(_) => Ok(reference),
        other => Err(Error::InvalidLicense(other.to_string())),
    }
}

fn evaluate(expr: &Expression, terms: &[Expression]) -> bool {
    match expr {
        Expression::Or { left, right } => evaluate(left, terms) || evaluate(right, terms),
        Expression::And { left, right } => evaluate(left, terms) && evaluate(right, terms),
        Expression::License(license) => terms.iter().any(|term| match term {
            Expression::License(allowed) => {
                allowed.id == license.id && allowed.exception == license.exception
            }
            _ => false,
        }),
        Expression::LicenseRef(reference) => terms
            .iter()
            .any(|term| matches!(term, Expression::LicenseRef(allowed) if allowed == reference)),
        Expression::Special { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    // ── Operators ──────────────────────────────────────

    #[test]
    fn test_or_needs_one_side() {
        assert!(satisfies("MIT OR Apache-2.0", &["MIT"]).unwrap());
        assert!(satisfies("MIT OR Apache-2.0", &["Apache-2.0"]).unwrap());
        assert!(!satisfies("MIT OR Apache-2.0", &["ISC"]).unwrap());
    }

    #[test]
    fn test_and_needs_both_sides() {
        assert!(!satisfies("MIT AND Apache-2.0", &["MIT"]).unwrap());
        assert!(satisfies("MIT AND Apache-2.0", &["MIT", "Apache-2.0"]).unwrap());
    }

    #[test]
    fn test_nested() {
        let expr = "(MIT OR GPL-2.0-only) AND Apache-2.0";
        assert!(satisfies(expr, &["GPL-2.0-only", "Apache-2.0"]).unwrap());
        assert!(!satisfies(expr, &["GPL-2.0-only", "MIT"]).unwrap());
    }

    // ── Leaves ─────────────────────────────────────────

    #[test]
    fn test_exception_must_match() {
        let expr = "GPL-2.0-only WITH Classpath-exception-2.0";
        assert!(!satisfies(expr, &["GPL-2.0-only"]).unwrap());
        assert!(satisfies(expr, &["GPL-2.0-only WITH Classpath-exception-2.0"]).unwrap());
        assert!(!satisfies("GPL-2.0-only", &[expr]).unwrap());
    }

    #[test]
    fn test_plus_is_ignored() {
        assert!(satisfies("Apache-2.0+", &["Apache-2.0"]).unwrap());
        assert!(satisfies("Apache-2.0", &["Apache-2.0+"]).unwrap());
    }

    #[test]
    fn test_informal_text_on_both_sides() {
        assert!(satisfies("mit or apache 2", &["Apache License 2.0"]).unwrap());
        assert!(satisfies("GPL v2", &["GPL-2.0-only"]).unwrap());
    }

    #[test]
    fn test_license_refs() {
        assert!(satisfies("LicenseRef-internal", &["LicenseRef-internal"]).unwrap());
        assert!(!satisfies("LicenseRef-internal", &["LicenseRef-other"]).unwrap());
        assert!(!satisfies("DocumentRef-a:LicenseRef-x", &["LicenseRef-x"]).unwrap());
    }

    #[test]
    fn test_special_values_never_satisfied() {
        assert!(!satisfies("NONE", &["MIT"]).unwrap());
        assert!(!satisfies("NOASSERTION", &["MIT"]).unwrap());
    }

    #[test]
    fn test_empty_allowed_list() {
        let none: [&str; 0] = [];
        assert!(!satisfies("MIT", &none).unwrap());
    }

    // ── Errors ─────────────────────────────────────────

    #[test]
    fn test_errors() {
        assert_eq!(
            satisfies("MIT AND", &["MIT"]).unwrap_err().kind(),
            ErrorKind::MissingOperand
        );
        assert_eq!(
            satisfies("MIT", &["TOTALLYINVALIDLICENSE"]).unwrap_err().kind(),
            ErrorKind::InvalidLicense
        );
        assert_eq!(
            satisfies("MIT", &["MIT OR ISC"]).unwrap_err(),
            Error::InvalidLicense("MIT OR ISC".into())
        );
        assert_eq!(
            satisfies("MIT", &["NONE"]).unwrap_err(),
            Error::InvalidLicense("NONE".into())
        );
    }
}
