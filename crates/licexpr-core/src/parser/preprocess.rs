//! Expression pre-processor - rewrites informal expression text so that
//! every word is a canonical identifier
//!
//! Consecutive words between structural tokens form one candidate phrase.
//! Phrases are flushed through the normalizer's multi-word splitter, except
//! directly after `WITH`, where they go through exact exception lookup.
//! Operators and parentheses are copied through unchanged, so the parser
//! sees the same structure the user wrote.

use tracing::debug;

use super::ast::SpecialValue;
use super::tokenizer::{Token, Tokenizer};
use crate::normalizer::Normalizer;
use crate::Result;

/// Rewrite `text` into canonical expression text
///
/// # Errors
/// The first phrase that fails to normalize aborts the rewrite with
/// `InvalidLicense`, or `InvalidException` for words following `WITH`.
pub fn normalize_expression_text(text: &str, normalizer: &Normalizer) -> Result<String> {
    let mut rewriter = Rewriter::new(normalizer);

    for spanned in Tokenizer::new(text).tokenize() {
        match spanned.token {
            Token::Word(word) | Token::LicenseRef(word) | Token::DocumentRef(word) => {
                rewriter.words.push(word);
            }
            Token::Plus => match rewriter.words.last_mut() {
                Some(last) => last.push('+'),
                None => rewriter.emit("+".to_string()),
            },
            Token::With => {
                rewriter.flush()?;
                rewriter.emit("WITH".to_string());
                rewriter.expect_exception = true;
            }
            Token::And | Token::Or | Token::LParen | Token::RParen => {
                rewriter.flush()?;
                rewriter.emit(spanned.token.to_string());
            }
            Token::Eof => rewriter.flush()?,
        }
    }

    let normalized = rewriter.finish();
    debug!(input = text, output = %normalized, "normalized expression");
    Ok(normalized)
}

struct Rewriter<'a, 'v> {
    normalizer: &'a Normalizer<'v>,
    words: Vec<String>,
    output: Vec<String>,
    expect_exception: bool,
}

impl<'a, 'v> Rewriter<'a, 'v> {
    fn new(normalizer: &'a Normalizer<'v>) -> Self {
        Rewriter {
            normalizer,
            words: Vec::new(),
            output: Vec::new(),
            expect_exception: false,
        }
    }

    fn emit(&mut self, atom: String) {
        self.output.push(atom);
    }

    fn flush(&mut self) -> Result<()> {
        let expect_exception = std::mem::replace(&mut self.expect_exception, false);
        if self.words.is_empty() {
            return Ok(());
        }
        let words = std::mem::take(&mut self.words);

        if expect_exception {
            // left for the parser to reject with the proper error
            if let [word] = words.as_slice() {
                if let Some(value) = SpecialValue::from_word(word) {
                    self.output.push(value.as_str().to_string());
                    return Ok(());
                }
            }
            let exception = self.normalizer.normalize_exception(&words)?;
            self.output.push(exception.to_string());
        } else {
            self.output.extend(self.normalizer.normalize_words(&words)?);
        }
        Ok(())
    }

    /// Join atoms with single spaces, none after `(` or before `)`
    fn finish(self) -> String {
        let mut out = String::new();
        let mut previous: Option<&str> = None;
        for atom in &self.output {
            let tight = matches!(previous, None | Some("(")) || atom == ")";
            if !tight {
                out.push(' ');
            }
            out.push_str(atom);
            previous = Some(atom);
        }
        out
    }
}
