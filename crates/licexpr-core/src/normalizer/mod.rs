//! Heuristic normalizer - maps informal license text to a canonical identifier
//!
//! # Pipeline
//!
//! Each tier runs only if every earlier one failed; the first hit wins:
//!
//! 1. exact lookup (plus `NONE` / `NOASSERTION` / `LicenseRef-` pass-through)
//! 2. exact lookup of the phrase with its trailing `+` removed
//! 3. transform chain
//! 4. transpositions, each followed by exact lookup and the transform chain
//! 5. last-resort substring table
//! 6. transpositions followed by the last-resort table
//!
//! Whatever tier produced the match, the result goes through [`upgrade`]
//! so deprecated GPL-family IDs come out as `-only` / `-or-later`.
//!
//! # Guarantees
//!
//! - **Deterministic**: tables are fixed and tried in a fixed order
//! - **Idempotent**: `normalize(normalize(x)) == normalize(x)` for canonical output
//! - **Bounded**: work is linear in phrase length times table size

pub mod rules;

use tracing::{debug, trace};

use crate::vocabulary::Vocabulary;
use crate::{Error, Result};

/// Which pipeline tier resolved a phrase (used for diagnostics)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exact,
    TrailingPlus,
    Transform,
    Transposition,
    LastResort,
    TranspositionLastResort,
}

/// Normalizer bound to a vocabulary
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> Normalizer<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Normalizer { vocabulary }
    }

    /// Normalize a single candidate phrase to a canonical identifier
    ///
    /// # Errors
    /// Returns `InvalidLicense` naming the phrase if no tier matches.
    ///
    /// # Example
    /// ```
    /// use licexpr_core::{normalizer::Normalizer, Vocabulary};
    ///
    /// let normalizer = Normalizer::new(Vocabulary::builtin());
    /// assert_eq!(normalizer.normalize("Apache 2").unwrap(), "Apache-2.0");
    /// assert_eq!(normalizer.normalize("GPL v3").unwrap(), "GPL-3.0-or-later");
    /// ```
    pub fn normalize(&self, license: &str) -> Result<String> {
        self.resolve(license).map(|(id, _)| id)
    }

    /// Like [`Normalizer::normalize`], also reporting the tier that matched
    pub fn resolve(&self, license: &str) -> Result<(String, Tier)> {
        let license = license.trim();
        if license.is_empty() {
            return Err(Error::InvalidLicense(String::new()));
        }

        if let Some(passed) = pass_through(license) {
            return Ok((passed, Tier::Exact));
        }

        let resolved = self.run_tiers(license);
        match resolved {
            Some((id, tier)) => {
                debug!(input = license, output = %id, ?tier, "normalized license");
                Ok((id, tier))
            }
            None => {
                debug!(input = license, "no normalization tier matched");
                Err(Error::InvalidLicense(license.to_string()))
            }
        }
    }

    fn run_tiers(&self, license: &str) -> Option<(String, Tier)> {
        if let Some(id) = self.lookup(license) {
            return Some((upgrade(id), Tier::Exact));
        }

        if let Some(base) = license.strip_suffix('+') {
            if let Some(id) = self.lookup(base.trim_end()) {
                return Some((upgrade(&format!("{}+", id)), Tier::TrailingPlus));
            }
        }

        if let Some(id) = self.try_transforms(license) {
            return Some((id, Tier::Transform));
        }
        if let Some(id) = self.try_transpositions(license) {
            return Some((id, Tier::Transposition));
        }
        if let Some(id) = self.try_last_resorts(license) {
            return Some((id, Tier::LastResort));
        }
        if let Some(id) = self.try_transpositions_with_last_resorts(license) {
            return Some((id, Tier::TranspositionLastResort));
        }
        None
    }

    /// Split an ordered run of words into one or more canonical identifiers
    ///
    /// At each offset the longest span that normalizes wins; failure only
    /// shortens the span, never revisits consumed words. Reference and
    /// special-value words always stand alone.
    ///
    /// # Errors
    /// `MissingOperand` for an empty run, `InvalidLicense` naming the first
    /// word that cannot start any matching span.
    pub fn normalize_words<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        if words.is_empty() {
            return Err(Error::MissingOperand("expected a license".to_string()));
        }

        let mut results = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let word = words[i].as_ref();
            if is_span_boundary(word) {
                results.push(pass_through(word).unwrap_or_else(|| word.to_string()));
                i += 1;
                continue;
            }

            let limit = words[i..]
                .iter()
                .position(|w| is_span_boundary(w.as_ref()))
                .map_or(words.len(), |p| i + p);

            let mut matched = None;
            for end in (i + 1..=limit).rev() {
                let candidate = join_words(&words[i..end], " ");
                trace!(candidate = %candidate, "trying span");
                if let Ok(id) = self.normalize(&candidate) {
                    matched = Some((id, end));
                    break;
                }
            }

            match matched {
                Some((id, end)) => {
                    results.push(id);
                    i = end;
                }
                None => return Err(Error::InvalidLicense(word.to_string())),
            }
        }

        Ok(results)
    }

    /// Resolve the words following WITH to an exception identifier
    ///
    /// Exceptions are matched exactly (case-insensitive), first with the
    /// words joined by `-`, then by spaces; they are never fuzzy-normalized.
    pub fn normalize_exception<S: AsRef<str>>(&self, words: &[S]) -> Result<&'static str> {
        let dashed = join_words(words, "-");
        if let Some(id) = self.vocabulary.lookup_exception(&dashed) {
            return Ok(id);
        }
        let spaced = join_words(words, " ");
        self.vocabulary
            .lookup_exception(&spaced)
            .ok_or(Error::InvalidException(spaced))
    }

    // ── Tiers ──────────────────────────────────────────────

    fn lookup(&self, s: &str) -> Option<&'static str> {
        self.vocabulary.lookup_license(s)
    }

    /// Apply each transform to `s` (and to `s` minus a trailing `+`,
    /// reattaching the `+` on success)
    fn try_transforms(&self, s: &str) -> Option<String> {
        let base = s.strip_suffix('+');

        for transform in rules::TRANSFORMS {
            let transformed = (transform.apply)(s);
            let transformed = transformed.trim();
            if transformed != s {
                if let Some(id) = self.lookup(transformed) {
                    trace!(transform = transform.name, "transform matched");
                    return Some(upgrade(id));
                }
            }

            if let Some(base) = base {
                let transformed = (transform.apply)(base);
                let transformed = transformed.trim();
                if transformed != base {
                    if let Some(id) = self.lookup(transformed) {
                        trace!(transform = transform.name, "transform matched without plus");
                        return Some(upgrade(&format!("{}+", id)));
                    }
                }
            }
        }
        None
    }

    fn try_transpositions(&self, s: &str) -> Option<String> {
        let upper = s.to_uppercase();
        for transposition in rules::transpositions() {
            if !transposition.matches(s, &upper) {
                continue;
            }
            let corrected = transposition.apply(s);
            if let Some(id) = self.lookup(&corrected) {
                return Some(upgrade(id));
            }
            if let Some(id) = self.try_transforms(&corrected) {
                return Some(id);
            }
        }
        None
    }

    /// First table entry whose substring occurs in `s` and whose target is
    /// in the vocabulary
    fn try_last_resorts(&self, s: &str) -> Option<String> {
        let upper = s.to_uppercase();
        rules::last_resorts()
            .iter()
            .filter(|entry| upper.contains(entry.substring))
            .find_map(|entry| self.lookup(entry.license))
            .map(upgrade)
    }

    fn try_transpositions_with_last_resorts(&self, s: &str) -> Option<String> {
        let upper = s.to_uppercase();
        rules::transpositions()
            .iter()
            .filter(|transposition| transposition.matches(s, &upper))
            .find_map(|transposition| self.try_last_resorts(&transposition.apply(s)))
    }
}

// ── Upgrade ────────────────────────────────────────────────

const UPGRADE_TO_ONLY: &[&str] = &[
    "GPL-1.0", "GPL-2.0", "LGPL-1.0", "LGPL-2.0", "LGPL-2.1", "AGPL-1.0", "AGPL-2.0",
];

const UPGRADE_TO_OR_LATER: &[&str] = &["GPL-3.0", "LGPL-3.0", "AGPL-3.0"];

/// Rewrite deprecated GPL-family IDs to their `-only` / `-or-later` forms
///
/// Bare 1.x/2.x versions gain `-only`, bare 3.0 gains `-or-later`, and any
/// of them carrying a trailing `+` drops it and gains `-or-later`. Every
/// other identifier is returned unchanged, so the rewrite is idempotent.
pub fn upgrade(license: &str) -> String {
    let is_family = |s: &str| UPGRADE_TO_ONLY.contains(&s) || UPGRADE_TO_OR_LATER.contains(&s);

    if let Some(base) = license.strip_suffix('+') {
        if is_family(base) {
            return format!("{}-or-later", base);
        }
        return license.to_string();
    }

    if UPGRADE_TO_ONLY.contains(&license) {
        format!("{}-only", license)
    } else if UPGRADE_TO_OR_LATER.contains(&license) {
        format!("{}-or-later", license)
    } else {
        license.to_string()
    }
}

// ── Helpers ────────────────────────────────────────────────

/// Words that bypass normalization entirely
fn pass_through(word: &str) -> Option<String> {
    if word.contains(char::is_whitespace) {
        return None;
    }
    let upper = word.to_ascii_uppercase();
    match upper.as_str() {
        "NONE" | "NOASSERTION" => Some(upper),
        _ if upper.starts_with("LICENSEREF-") || upper.starts_with("DOCUMENTREF-") => {
            Some(word.to_string())
        }
        _ => None,
    }
}

fn is_span_boundary(word: &str) -> bool {
    pass_through(word).is_some()
}

fn join_words<S: AsRef<str>>(words: &[S], separator: &str) -> String {
    words
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(separator)
}
