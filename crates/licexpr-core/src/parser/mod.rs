//! License expression parser - tokenizer, pre-processor, AST types, and
//! recursive descent parser
//!
//! Grammar (`WITH` binds tightest, then `AND`, then `OR`):
//!
//! ```text
//! Expr     := AndTerm (OR AndTerm)*
//! AndTerm  := WithTerm (AND WithTerm)*
//! WithTerm := Atom (WITH ExceptionWord)?
//! Atom     := '(' Expr ')' | LicenseWord '+'? | LicenseRef | DocumentRef | NONE | NOASSERTION
//! ```
//!
//! In [`ParseMode::Lax`] the text first goes through the pre-processor so
//! informal names become canonical identifiers; [`ParseMode::Strict`]
//! accepts vocabulary identifiers only.

pub mod ast;
pub mod preprocess;
pub mod tokenizer;

use tracing::trace;

use crate::normalizer::Normalizer;
use crate::vocabulary::Vocabulary;
use crate::{Error, Result};
use ast::{Expression, License, LicenseRef, SpecialValue};
use tokenizer::{Span, SpannedToken, Token, Tokenizer};

/// Whether informal license text is normalized before parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Normalize informal names ("Apache 2", "MIT License") first
    #[default]
    Lax,
    /// Accept exact (case-insensitive) vocabulary identifiers only
    Strict,
}

/// Parse exact or informal license text with the builtin vocabulary
///
/// # Example
/// ```
/// let expr = licexpr_core::parse("mit OR apache 2").unwrap();
/// assert_eq!(expr.to_string(), "MIT OR Apache-2.0");
/// ```
pub fn parse(text: &str) -> Result<Expression> {
    parse_with(text, Vocabulary::builtin(), ParseMode::Lax)
}

/// Parse canonical license text only; no normalization pass
pub fn parse_strict(text: &str) -> Result<Expression> {
    parse_with(text, Vocabulary::builtin(), ParseMode::Strict)
}

/// Parse `text` against an explicit vocabulary and mode
pub fn parse_with(text: &str, vocabulary: &Vocabulary, mode: ParseMode) -> Result<Expression> {
    Parser::new(text, vocabulary, mode)?.parse()
}

/// Recursive descent parser over a single expression
///
/// Positions in errors refer to the text the parser reads, which in lax
/// mode is the pre-processed expression.
pub struct Parser<'v> {
    tokenizer: Tokenizer,
    current: SpannedToken,
    vocabulary: &'v Vocabulary,
}

impl<'v> Parser<'v> {
    /// Prepare `text` for parsing
    ///
    /// # Errors
    /// `EmptyExpression` for blank input; in lax mode, any error raised
    /// while normalizing a phrase.
    pub fn new(text: &str, vocabulary: &'v Vocabulary, mode: ParseMode) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyExpression);
        }

        let source = match mode {
            ParseMode::Strict => text.to_string(),
            ParseMode::Lax => {
                preprocess::normalize_expression_text(text, &Normalizer::new(vocabulary))?
            }
        };

        let mut tokenizer = Tokenizer::new(&source);
        let current = tokenizer.next_token();
        Ok(Parser {
            tokenizer,
            current,
            vocabulary,
        })
    }

    /// Parse the whole input as one expression
    pub fn parse(mut self) -> Result<Expression> {
        let expr = self.parse_or()?;

        match &self.current.token {
            Token::Eof => {
                trace!(expression = %expr, "parsed expression");
                Ok(expr)
            }
            Token::RParen => Err(Error::UnbalancedParentheses {
                span: self.current.span,
            }),
            other => Err(Error::UnexpectedToken {
                token: other.to_string(),
                span: self.current.span,
            }),
        }
    }

    // ── Token helpers ──────────────────────────────────────

    fn advance(&mut self) {
        self.current = self.tokenizer.next_token();
    }

    fn unexpected(&self) -> Error {
        Error::UnexpectedToken {
            token: self.current.token.to_string(),
            span: self.current.span,
        }
    }

    // ── Binary operators ───────────────────────────────────

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.current.token == Token::Or {
            reject_special(&left)?;
            self.advance();
            let right = self.parse_and()?;
            reject_special(&right)?;
            left = Expression::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_with()?;
        while self.current.token == Token::And {
            reject_special(&left)?;
            self.advance();
            let right = self.parse_with()?;
            reject_special(&right)?;
            left = Expression::and(left, right);
        }
        Ok(left)
    }

    // ── WITH ───────────────────────────────────────────────

    fn parse_with(&mut self) -> Result<Expression> {
        let parenthesized = self.current.token == Token::LParen;
        let atom = self.parse_atom()?;
        if self.current.token != Token::With {
            return Ok(atom);
        }
        reject_special(&atom)?;

        let mut license = match atom {
            Expression::License(license) if !parenthesized => license,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        license.exception = Some(self.parse_exception()?);
        Ok(Expression::License(license))
    }

    fn parse_exception(&mut self) -> Result<String> {
        let SpannedToken { token, span } = self.current.clone();
        match token {
            Token::Word(word) => {
                if let Some(value) = SpecialValue::from_word(&word) {
                    return Err(Error::InvalidSpecialValue(value.as_str().to_string()));
                }
                let id = self
                    .vocabulary
                    .lookup_exception(&word)
                    .ok_or(Error::InvalidException(word))?;
                self.advance();
                Ok(id.to_string())
            }
            Token::LicenseRef(word) | Token::DocumentRef(word) => {
                Err(Error::InvalidException(word))
            }
            Token::Eof | Token::And | Token::Or | Token::With => Err(missing("an exception", span)),
            Token::LParen | Token::RParen | Token::Plus => Err(self.unexpected()),
        }
    }

    // ── Atoms ──────────────────────────────────────────────

    fn parse_atom(&mut self) -> Result<Expression> {
        let SpannedToken { token, span } = self.current.clone();
        match token {
            Token::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                match self.current.token {
                    Token::RParen => {
                        self.advance();
                        Ok(inner)
                    }
                    Token::Eof => Err(Error::UnbalancedParentheses { span }),
                    _ => Err(self.unexpected()),
                }
            }
            Token::Word(word) => {
                self.advance();
                self.license_atom(&word)
            }
            Token::LicenseRef(word) | Token::DocumentRef(word) => {
                let reference =
                    LicenseRef::parse(&word).ok_or_else(|| Error::InvalidLicense(word.clone()))?;
                self.advance();
                Ok(Expression::LicenseRef(reference))
            }
            Token::Eof | Token::And | Token::Or | Token::With => Err(missing("a license", span)),
            Token::RParen | Token::Plus => Err(self.unexpected()),
        }
    }

    fn license_atom(&mut self, word: &str) -> Result<Expression> {
        if let Some(value) = SpecialValue::from_word(word) {
            return Ok(Expression::Special { value });
        }

        let id = self
            .vocabulary
            .lookup_license(word)
            .ok_or_else(|| Error::InvalidLicense(word.to_string()))?;
        let mut license = License::new(id);
        if self.current.token == Token::Plus {
            self.advance();
            license.plus = true;
        }
        Ok(Expression::License(license))
    }
}

/// NONE / NOASSERTION must be the entire expression
fn reject_special(expr: &Expression) -> Result<()> {
    match expr {
        Expression::Special { value } => {
            Err(Error::InvalidSpecialValue(value.as_str().to_string()))
        }
        _ => Ok(()),
    }
}

fn missing(what: &str, span: Span) -> Error {
    Error::MissingOperand(format!("expected {} at {}", what, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn render(text: &str) -> String {
        parse(text).unwrap().to_string()
    }

    fn render_strict(text: &str) -> String {
        parse_strict(text).unwrap().to_string()
    }

    fn kind(result: Result<Expression>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    // ── Precedence ─────────────────────────────────────

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            render("MIT OR GPL-2.0-only AND Apache-2.0"),
            "MIT OR (GPL-2.0-only AND Apache-2.0)"
        );
        assert_eq!(
            render("MIT AND GPL-2.0-only OR Apache-2.0"),
            "(MIT AND GPL-2.0-only) OR Apache-2.0"
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(
            render("(MIT OR ISC) AND Apache-2.0"),
            "(MIT OR ISC) AND Apache-2.0"
        );
        assert_eq!(render("((MIT))"), "MIT");
    }

    #[test]
    fn test_operators_are_left_associative() {
        let expr = parse_strict("MIT AND ISC AND Zlib").unwrap();
        let expected = Expression::and(
            Expression::and(
                Expression::License(License::new("MIT")),
                Expression::License(License::new("ISC")),
            ),
            Expression::License(License::new("Zlib")),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_render_round_trip() {
        for text in [
            "MIT",
            "MIT OR Apache-2.0",
            "MIT AND (ISC OR Zlib)",
            "(MIT OR ISC) AND (Zlib OR BSD-3-Clause)",
            "MIT OR (GPL-2.0-only WITH Classpath-exception-2.0)",
            "Apache-2.0+ AND LicenseRef-custom",
            "NOASSERTION",
        ] {
            let once = render_strict(text);
            assert_eq!(render_strict(&once), once, "round trip of {}", text);
        }
    }

    // ── WITH ───────────────────────────────────────────

    #[test]
    fn test_exception_attaches_to_license() {
        let expr = parse("GPL-2.0-only WITH Classpath-exception-2.0").unwrap();
        assert_eq!(expr.to_string(), "GPL-2.0-only WITH Classpath-exception-2.0");
        match expr {
            Expression::License(license) => {
                assert_eq!(license.id, "GPL-2.0-only");
                assert_eq!(license.exception.as_deref(), Some("Classpath-exception-2.0"));
            }
            other => panic!("expected license, got {:?}", other),
        }
    }

    #[test]
    fn test_with_binds_tighter_than_and() {
        assert_eq!(
            render_strict("Apache-2.0 WITH LLVM-exception AND MIT"),
            "Apache-2.0 WITH LLVM-exception AND MIT"
        );
        assert_eq!(
            render_strict("MIT OR Apache-2.0 WITH LLVM-exception"),
            "MIT OR (Apache-2.0 WITH LLVM-exception)"
        );
    }

    #[test]
    fn test_exception_case_is_canonicalized() {
        assert_eq!(
            render_strict("gpl-2.0-only with classpath-exception-2.0"),
            "GPL-2.0-only WITH Classpath-exception-2.0"
        );
    }

    #[test]
    fn test_with_after_parenthesized_atom_is_rejected() {
        let err = parse_strict("(MIT) WITH LLVM-exception").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { ref token, .. } if token == "WITH"));
    }

    #[test]
    fn test_with_requires_known_exception() {
        assert_eq!(
            parse_strict("MIT WITH Bogus-exception").unwrap_err(),
            Error::InvalidException("Bogus-exception".into())
        );
        assert_eq!(kind(parse_strict("MIT WITH LicenseRef-x")), ErrorKind::InvalidException);
        assert_eq!(kind(parse_strict("MIT WITH")), ErrorKind::MissingOperand);
        assert_eq!(kind(parse_strict("MIT WITH A WITH B")), ErrorKind::InvalidException);
    }

    #[test]
    fn test_double_with_is_rejected() {
        let err = parse_strict("GPL-2.0-only WITH Classpath-exception-2.0 WITH LLVM-exception")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
    }

    // ── Plus & refs ────────────────────────────────────

    #[test]
    fn test_plus_suffix() {
        let expr = parse_strict("Apache-2.0+").unwrap();
        assert_eq!(
            expr,
            Expression::License(License {
                id: "Apache-2.0".into(),
                plus: true,
                exception: None,
            })
        );
    }

    #[test]
    fn test_strict_keeps_deprecated_ids() {
        assert_eq!(render_strict("GPL-2.0"), "GPL-2.0");
        assert_eq!(render_strict("GPL-2.0+"), "GPL-2.0+");
        assert_eq!(render("GPL-2.0"), "GPL-2.0-only");
        assert_eq!(render("GPL-2.0+"), "GPL-2.0-or-later");
    }

    #[test]
    fn test_license_refs_are_accepted_anywhere() {
        assert_eq!(
            render_strict("LicenseRef-custom OR (MIT AND DocumentRef-doc:LicenseRef-x)"),
            "LicenseRef-custom OR (MIT AND DocumentRef-doc:LicenseRef-x)"
        );
    }

    #[test]
    fn test_document_ref_needs_license_ref() {
        assert_eq!(
            parse("DocumentRef-broken").unwrap_err(),
            Error::InvalidLicense("DocumentRef-broken".into())
        );
        assert_eq!(
            parse_strict("MIT OR DocumentRef-broken").unwrap_err(),
            Error::InvalidLicense("DocumentRef-broken".into())
        );
        assert_eq!(kind(parse_strict("LicenseRef-")), ErrorKind::InvalidLicense);
    }

    // ── Special values ─────────────────────────────────

    #[test]
    fn test_special_values_alone() {
        assert!(parse("NONE").unwrap().is_special());
        assert_eq!(render_strict("noassertion"), "NOASSERTION");
        assert_eq!(render_strict("(NONE)"), "NONE");
    }

    #[test]
    fn test_special_values_cannot_compose() {
        for text in [
            "NONE OR MIT",
            "MIT AND NOASSERTION",
            "(NONE) AND MIT",
            "NONE WITH LLVM-exception",
            "MIT WITH NONE",
        ] {
            assert_eq!(
                kind(parse_strict(text)),
                ErrorKind::InvalidSpecialValue,
                "strict {}",
                text
            );
            assert_eq!(
                kind(parse(text)),
                ErrorKind::InvalidSpecialValue,
                "lax {}",
                text
            );
        }
    }

    // ── Strict vs lax ──────────────────────────────────

    #[test]
    fn test_strict_rejects_informal_text() {
        assert_eq!(
            parse_strict("mit OR apache 2").unwrap_err(),
            Error::InvalidLicense("apache".into())
        );
        assert_eq!(render("mit OR apache 2"), "MIT OR Apache-2.0");
    }

    #[test]
    fn test_lax_normalizes_every_phrase() {
        assert_eq!(
            render("Apache License, Version 2.0 OR MIT License"),
            "Apache-2.0 OR MIT"
        );
        assert_eq!(render("New BSD License"), "BSD-3-Clause");
        assert_eq!(
            render("(GPL v3 OR LGPL 2.1) AND BSD 3-Clause"),
            "(GPL-3.0-or-later OR LGPL-2.1-only) AND BSD-3-Clause"
        );
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = Vocabulary::new(&["Foo-1.0", "Bar-2.0"], &[], &["Baz-exception"]);
        let expr = parse_with("foo-1.0 OR bar-2.0 WITH baz-exception", &vocab, ParseMode::Strict)
            .unwrap();
        assert_eq!(expr.to_string(), "Foo-1.0 OR (Bar-2.0 WITH Baz-exception)");
        assert_eq!(
            parse_with("MIT", &vocab, ParseMode::Strict).unwrap_err(),
            Error::InvalidLicense("MIT".into())
        );
    }

    // ── Malformed input ────────────────────────────────

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("").unwrap_err(), Error::EmptyExpression);
        assert_eq!(parse_strict("   \t").unwrap_err(), Error::EmptyExpression);
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(kind(parse("((MIT)")), ErrorKind::UnbalancedParentheses);
        assert_eq!(
            parse_strict("MIT )").unwrap_err(),
            Error::UnbalancedParentheses {
                span: Span { column: 5, offset: 4 },
            }
        );
        assert_eq!(
            parse_strict("(MIT OR ISC").unwrap_err(),
            Error::UnbalancedParentheses {
                span: Span { column: 1, offset: 0 },
            }
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(kind(parse("MIT AND")), ErrorKind::MissingOperand);
        assert_eq!(kind(parse_strict("OR MIT")), ErrorKind::MissingOperand);
        assert_eq!(kind(parse_strict("MIT AND OR ISC")), ErrorKind::MissingOperand);
    }

    #[test]
    fn test_unexpected_token() {
        assert_eq!(
            parse_strict("MIT ISC").unwrap_err(),
            Error::UnexpectedToken {
                token: "ISC".into(),
                span: Span { column: 5, offset: 4 },
            }
        );
        assert_eq!(kind(parse_strict("()")), ErrorKind::UnexpectedToken);
        assert_eq!(kind(parse("+ MIT")), ErrorKind::UnexpectedToken);
        assert_eq!(kind(parse_strict("MIT++")), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_unknown_license() {
        assert_eq!(
            parse_strict("MIT OR Fakey-1.0").unwrap_err(),
            Error::InvalidLicense("Fakey-1.0".into())
        );
        assert_eq!(kind(parse("TOTALLYINVALIDLICENSE")), ErrorKind::InvalidLicense);
    }

    // ── Licenses ───────────────────────────────────────

    #[test]
    fn test_licenses_flattening() {
        let expr = parse("MIT OR (Apache-2.0 AND MIT) OR GPL-2.0-only WITH Classpath-exception-2.0")
            .unwrap();
        assert_eq!(expr.licenses(), vec!["MIT", "Apache-2.0", "MIT", "GPL-2.0-only"]);
    }

    // ── Determinism ────────────────────────────────────

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = "(Apache 2 OR MIT License) AND GPL-2.0+ WITH Classpath-exception-2.0";
        let first = parse(input).unwrap();
        for i in 0..100 {
            let result = parse(input).unwrap();
            assert_eq!(first, result, "Determinism failure at iteration {}", i);
        }
    }
}
