//! Identifier vocabulary - the controlled set of license and exception IDs
//!
//! Lookups are exact and case-insensitive and always return the canonical
//! spelling. Deprecated license IDs are accepted as licenses so that
//! historical metadata still resolves; the normalizer upgrades the
//! GPL-family ones afterwards.
//!
//! A vocabulary is immutable once built. [`Vocabulary::builtin`] hands out a
//! process-wide instance built on first use; everything else takes a
//! `&Vocabulary` so tests can inject their own.

mod data;

use std::collections::HashMap;
use std::sync::OnceLock;

/// Immutable case-insensitive mapping from identifier spellings to
/// canonical identifiers
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    licenses: HashMap<String, &'static str>,
    deprecated: HashMap<String, &'static str>,
    exceptions: HashMap<String, &'static str>,
}

impl Vocabulary {
    /// Build a vocabulary from identifier lists
    ///
    /// A deprecated ID that collides with a current one keeps the current
    /// spelling.
    pub fn new(
        licenses: &[&'static str],
        deprecated: &[&'static str],
        exceptions: &[&'static str],
    ) -> Self {
        let mut vocabulary = Vocabulary {
            licenses: HashMap::with_capacity(licenses.len() + deprecated.len()),
            deprecated: HashMap::with_capacity(deprecated.len()),
            exceptions: HashMap::with_capacity(exceptions.len()),
        };

        for id in licenses {
            vocabulary.licenses.insert(id.to_lowercase(), *id);
        }
        for id in deprecated {
            let lower = id.to_lowercase();
            vocabulary.deprecated.insert(lower.clone(), *id);
            vocabulary.licenses.entry(lower).or_insert(*id);
        }
        for id in exceptions {
            vocabulary.exceptions.insert(id.to_lowercase(), *id);
        }

        vocabulary
    }

    /// The SPDX license list shipped with this crate, built exactly once
    pub fn builtin() -> &'static Vocabulary {
        static BUILTIN: OnceLock<Vocabulary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Vocabulary::new(data::LICENSES, data::DEPRECATED, data::EXCEPTIONS)
        })
    }

    /// Canonical license ID for `s`, if it is a known license
    pub fn lookup_license(&self, s: &str) -> Option<&'static str> {
        self.licenses.get(&s.to_lowercase()).copied()
    }

    /// Canonical exception ID for `s`, if it is a known exception
    pub fn lookup_exception(&self, s: &str) -> Option<&'static str> {
        self.exceptions.get(&s.to_lowercase()).copied()
    }

    pub fn is_deprecated(&self, s: &str) -> bool {
        self.deprecated.contains_key(&s.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.lookup_license("mit"), Some("MIT"));
        assert_eq!(vocab.lookup_license("aPaChE-2.0"), Some("Apache-2.0"));
        assert_eq!(vocab.lookup_license("ZLIB"), Some("Zlib"));
    }

    #[test]
    fn test_deprecated_ids_resolve_as_licenses() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.lookup_license("gpl-2.0"), Some("GPL-2.0"));
        assert_eq!(vocab.lookup_license("GPL-2.0+"), Some("GPL-2.0+"));
        assert!(vocab.is_deprecated("LGPL-2.1"));
        assert!(!vocab.is_deprecated("LGPL-2.1-only"));
    }

    #[test]
    fn test_exceptions_are_separate_from_licenses() {
        let vocab = Vocabulary::builtin();
        assert_eq!(
            vocab.lookup_exception("classpath-exception-2.0"),
            Some("Classpath-exception-2.0")
        );
        assert_eq!(vocab.lookup_license("Classpath-exception-2.0"), None);
        assert_eq!(vocab.lookup_exception("MIT"), None);
        assert_eq!(vocab.lookup_exception("llvm-exception"), Some("LLVM-exception"));
    }

    #[test]
    fn test_unknown_lookup_fails() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.lookup_license("FAKEYLICENSE"), None);
        assert_eq!(vocab.lookup_license(""), None);
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = Vocabulary::new(&["Foo-1.0"], &["Foo"], &["Bar-exception"]);
        assert_eq!(vocab.lookup_license("foo-1.0"), Some("Foo-1.0"));
        assert_eq!(vocab.lookup_license("FOO"), Some("Foo"));
        assert_eq!(vocab.lookup_license("MIT"), None);
        assert_eq!(vocab.lookup_exception("bar-exception"), Some("Bar-exception"));
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = Vocabulary::builtin() as *const Vocabulary;
        let b = Vocabulary::builtin() as *const Vocabulary;
        assert_eq!(a, b);
    }
}
