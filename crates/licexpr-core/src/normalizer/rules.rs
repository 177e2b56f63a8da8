//! Ordered rule tables driving the normalizer
//!
//! Three tables, each tried in a fixed order:
//!
//! - [`TRANSFORMS`]: whole-string rewrites, each applied to the
//!   *original* candidate (they do not compose).
//! - [`transpositions`]: substring corrections (long-form names,
//!   misspellings, suffixes), longest source pattern first.
//! - [`last_resorts`]: substring → identifier guesses, longest
//!   substring first.
//!
//! Transpositions and last resorts are plain data sorted once on first use.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

// ── Transforms ─────────────────────────────────────────────

/// A named whole-string rewrite
pub struct Transform {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",?\s*(\d)").unwrap());
static RE_DIGIT_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",?\s*(\d)$").unwrap());
static RE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),?\s*(V\.?|Version)\s*(\d)").unwrap());
static RE_VERSION_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),?\s*(V\.?|Version)\s*(\d)$").unwrap());
static RE_TRAILING_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)$").unwrap());
static RE_BSD_NUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(-|\s)?(\d)$").unwrap());
static RE_BSD_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(-|\s)clause(-|\s)(\d)").unwrap());
static RE_NEW_BSD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Modified|New|Revised)(-|\s)?BSD((-|\s)License)?").unwrap()
});
static RE_SIMPLIFIED_BSD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSimplified(-|\s)?BSD((-|\s)License)?").unwrap());
static RE_FREE_NET_BSD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Free|Net)(-|\s)?BSD((-|\s)Licen[sc]e)?").unwrap());
static RE_CLEAR_BSD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bClear(-|\s)?BSD((-|\s)License)?").unwrap());
static RE_OLD_BSD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Old|Original)(-|\s)?BSD((-|\s)License)?").unwrap());
static RE_CC_SPACE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+(\d)").unwrap());
static RE_CC_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d\.\d").unwrap());

/// Whole-string rewrites in the order they are tried
pub static TRANSFORMS: &[Transform] = &[
    Transform { name: "uppercase", apply: |s| s.to_uppercase() },
    Transform { name: "trim", apply: |s| s.trim().to_string() },
    // M.I.T. -> MIT
    Transform { name: "strip-dots", apply: |s| s.replace('.', "") },
    // Apache- 2.0 -> Apache-2.0
    Transform { name: "strip-whitespace", apply: |s| RE_WHITESPACE.replace_all(s, "").into_owned() },
    // CC BY 4.0 -> CC-BY-4.0
    Transform { name: "whitespace-to-dash", apply: |s| RE_WHITESPACE.replace_all(s, "-").into_owned() },
    // LGPLv2.1 -> LGPL-2.1
    Transform { name: "first-v-to-dash", apply: |s| s.replacen('v', "-", 1) },
    // Apache 2.0 -> Apache-2.0
    Transform { name: "dash-before-digits", apply: |s| RE_DIGIT.replace_all(s, "-${1}").into_owned() },
    // GPL 2 -> GPL-2.0
    Transform { name: "dash-before-final-digit", apply: |s| RE_DIGIT_END.replace_all(s, "-${1}.0").into_owned() },
    // Apache Version 2.0 -> Apache-2.0
    Transform { name: "version-word", apply: |s| RE_VERSION.replace_all(s, "-${2}").into_owned() },
    // Apache Version 2 -> Apache-2.0
    Transform { name: "final-version-word", apply: |s| RE_VERSION_END.replace_all(s, "-${2}.0").into_owned() },
    // zlib -> Zlib
    Transform { name: "capitalize", apply: capitalize_first },
    // MPL/2.0 -> MPL-2.0
    Transform { name: "slash-to-dash", apply: |s| s.replace('/', "-") },
    // GPL-2.0 -> GPL-2.0-only, GPL-3.0 -> GPL-3.0-or-later
    Transform { name: "gpl-suffix", apply: |s| {
        if s.contains("3.0") {
            format!("{}-or-later", s)
        } else {
            format!("{}-only", s)
        }
    } },
    // GPL-2.0- -> GPL-2.0-only
    Transform { name: "complete-dangling-dash", apply: |s| {
        if s.ends_with('-') {
            format!("{}only", s)
        } else {
            s.to_string()
        }
    } },
    // GPL2 -> GPL-2.0
    Transform { name: "final-digit-version", apply: |s| RE_TRAILING_DIGIT.replace_all(s, "-${1}.0").into_owned() },
    // BSD 3 -> BSD-3-Clause
    Transform { name: "bsd-number", apply: |s| RE_BSD_NUM.replace_all(s, "-${2}-Clause").into_owned() },
    // BSD clause 3 -> BSD-3-Clause
    Transform { name: "bsd-clause-number", apply: |s| RE_BSD_CLAUSE.replace_all(s, "-${3}-Clause").into_owned() },
    Transform { name: "new-bsd", apply: |s| RE_NEW_BSD.replace_all(s, "BSD-3-Clause").into_owned() },
    Transform { name: "simplified-bsd", apply: |s| RE_SIMPLIFIED_BSD.replace_all(s, "BSD-2-Clause").into_owned() },
    Transform { name: "free-net-bsd", apply: free_net_bsd },
    Transform { name: "clear-bsd", apply: |s| RE_CLEAR_BSD.replace_all(s, "BSD-3-Clause-Clear").into_owned() },
    Transform { name: "old-bsd", apply: |s| RE_OLD_BSD.replace_all(s, "BSD-4-Clause").into_owned() },
    // BY-NC-4.0 -> CC-BY-NC-4.0
    Transform { name: "cc-prefix", apply: |s| {
        if s.to_uppercase().starts_with("BY-") {
            format!("CC-{}", s)
        } else {
            s.to_string()
        }
    } },
    // Attribution-NonCommercial -> CC-BY-NC-4.0
    Transform { name: "cc-attribution", apply: cc_attribution },
];

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// FreeBSD / NetBSD -> BSD-2-Clause-FreeBSD / BSD-2-Clause-NetBSD
fn free_net_bsd(s: &str) -> String {
    match RE_FREE_NET_BSD.captures(s) {
        Some(caps) => {
            let variant = &caps[1];
            let (head, tail) = variant.split_at(1);
            format!(
                "BSD-2-Clause-{}{}BSD",
                head.to_uppercase(),
                tail.to_lowercase()
            )
        }
        None => s.to_string(),
    }
}

fn cc_attribution(s: &str) -> String {
    let mut result = s
        .replace("Attribution", "BY")
        .replace("NonCommercial", "NC")
        .replace("NoDerivatives", "ND")
        .replace("ShareAlike", "SA");
    result = RE_CC_SPACE_DIGIT.replace_all(&result, "-${1}").into_owned();
    result = result.replace(" International", "");

    if result != s && !result.starts_with("CC-") {
        result = format!("CC-{}", result);
        if !RE_CC_VERSION.is_match(&result) {
            result.push_str("-4.0");
        }
    }
    result
}

// ── Transpositions ─────────────────────────────────────────

/// A substring correction, matched case-sensitively first and then
/// case-insensitively
pub struct Transposition {
    pub from: &'static str,
    pub from_upper: String,
    pub to: &'static str,
    pattern: Regex,
}

impl Transposition {
    pub fn matches(&self, s: &str, s_upper: &str) -> bool {
        s.contains(self.from) || s_upper.contains(&self.from_upper)
    }

    /// Replace every occurrence of `from` with `to`, case-sensitively if
    /// that changes anything, otherwise case-insensitively
    pub fn apply(&self, s: &str) -> String {
        let corrected = s.replace(self.from, self.to);
        if corrected != s {
            return corrected;
        }
        self.pattern.replace_all(s, NoExpand(self.to)).into_owned()
    }
}

const TRANSPOSITION_DATA: &[(&str, &str)] = &[
    ("The Apache Software License, Version 2.0", "Apache-2.0"),
    ("The Apache License, Version 2.0", "Apache-2.0"),
    ("Apache Software License, Version 2.0", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("The Apache Software License", "Apache"),
    ("Apache Software License", "Apache"),
    ("The MIT License", "MIT"),
    ("GNU Lesser General Public License v3.0", "LGPL-3.0"),
    ("GNU Lesser General Public License v3", "LGPL-3.0"),
    ("GNU Lesser General Public License v2.1", "LGPL-2.1"),
    ("GNU Lesser General Public License v2.0", "LGPL-2.0"),
    ("GNU Lesser General Public License v2", "LGPL-2.0"),
    // unversioned Lesser GPL means 2.1
    ("GNU LESSER GENERAL PUBLIC LICENSE", "LGPL-2.1"),
    ("GNU Lesser General Public License", "LGPL-2.1"),
    ("Lesser General Public License", "LGPL-2.1"),
    ("LESSER GENERAL PUBLIC LICENSE", "LGPL-2.1"),
    ("GNU AFFERO GENERAL PUBLIC LICENSE", "AGPL"),
    ("AFFERO GENERAL PUBLIC LICENSE", "AGPL"),
    ("GNU GENERAL PUBLIC LICENSE", "GPL"),
    ("GNU General Public License", "GPL"),
    ("Gnu public license", "GPL"),
    ("GNU Public License", "GPL"),
    ("Mozilla Public License", "MPL"),
    ("Universal Permissive License", "UPL"),
    ("Eclipse Public License", "EPL"),
    (" or later", "+"),
    ("-or-later", "+"),
    (" International", ""),
    ("GNU LGPL", "LGPL"),
    ("GNU GPL", "GPL"),
    ("GNU/GPL", "GPL"),
    ("GNU GLP", "GPL"),
    ("GNU/GPLv", "GPLv"),
    (" License", ""),
    ("-License", ""),
    ("WTFGPL", "WTFPL"),
    ("APGL", "AGPL"),
    ("GLP", "GPL"),
    // APLv2 -> Apache-2
    ("APLv", "Apache-"),
    ("APL", "Apache"),
    ("ISD", "ISC"),
    ("IST", "ISC"),
    ("MTI", "MIT"),
    ("GNU", "GPL"),
    ("GUN", "GPL"),
    ("Gpl", "GPL"),
    ("WTH", "WTF"),
    ("Claude", "Clause"),
    ("+", ""),
];

/// Transpositions sorted by descending source length, ties broken
/// lexicographically
pub fn transpositions() -> &'static [Transposition] {
    static TABLE: LazyLock<Vec<Transposition>> = LazyLock::new(|| {
        let mut table: Vec<Transposition> = TRANSPOSITION_DATA
            .iter()
            .map(|&(from, to)| Transposition {
                from,
                from_upper: from.to_uppercase(),
                to,
                pattern: Regex::new(&format!("(?i){}", regex::escape(from))).unwrap(),
            })
            .collect();
        table.sort_by(|a, b| b.from.len().cmp(&a.from.len()).then(a.from.cmp(b.from)));
        table
    });
    &TABLE
}

// ── Last resorts ───────────────────────────────────────────

/// Uppercase substring and the identifier it implies
pub struct LastResort {
    pub substring: &'static str,
    pub license: &'static str,
}

const LAST_RESORT_DATA: &[(&str, &str)] = &[
    ("MIT +NO-FALSE-ATTRIBS", "MITNFA"),
    ("PUBLIC DOMAIN", "Unlicense"),
    ("PUBLIC-DOMAIN", "Unlicense"),
    ("PUBLICDOMAIN", "Unlicense"),
    ("ECLIPSE PUBLIC LICENSE 2", "EPL-2.0"),
    ("ECLIPSE PUBLIC LICENSE, VERSION 2", "EPL-2.0"),
    ("ECLIPSE PUBLIC LICENSE V2", "EPL-2.0"),
    ("EPL-2", "EPL-2.0"),
    ("EPL 2", "EPL-2.0"),
    ("EPL2", "EPL-2.0"),
    ("ECLIPSE PUBLIC LICENSE 1", "EPL-1.0"),
    ("EPL-1", "EPL-1.0"),
    ("EPL 1", "EPL-1.0"),
    ("EPL1", "EPL-1.0"),
    ("ASL-2", "Apache-2.0"),
    ("ASL 2", "Apache-2.0"),
    ("ASL2", "Apache-2.0"),
    ("ALV2", "Apache-2.0"),
    ("AL2", "Apache-2.0"),
    ("ASL", "Apache-2.0"),
    ("2 CLAUSE", "BSD-2-Clause"),
    ("2-CLAUSE", "BSD-2-Clause"),
    ("3 CLAUSE", "BSD-3-Clause"),
    ("3-CLAUSE", "BSD-3-Clause"),
    ("AFFERO", "AGPL-3.0-or-later"),
    ("AGPL", "AGPL-3.0-or-later"),
    ("LGPL2.1+", "LGPL-2.1-or-later"),
    ("LGPL2.1", "LGPL-2.1-only"),
    ("LGPLV2.1", "LGPL-2.1-only"),
    // the Library GPL started at 2.0
    ("LGPLV1", "LGPL-2.0-only"),
    ("LGPL-1", "LGPL-2.0-only"),
    ("LGPLV2", "LGPL-2.0-only"),
    ("LGPL-2", "LGPL-2.0-only"),
    ("LGPL", "LGPL-3.0-or-later"),
    ("GPLV1", "GPL-1.0-only"),
    ("GPL-1", "GPL-1.0-only"),
    ("GPLV2", "GPL-2.0-only"),
    ("GPL-2", "GPL-2.0-only"),
    ("GPL", "GPL-3.0-or-later"),
    ("GNU", "GPL-3.0-or-later"),
    ("APACHE", "Apache-2.0"),
    ("ARTISTIC_2", "Artistic-2.0"),
    ("ARTISTIC_1", "Artistic-1.0"),
    ("ARTISTIC-2", "Artistic-2.0"),
    ("ARTISTIC-1", "Artistic-1.0"),
    ("ARTISTIC 2", "Artistic-2.0"),
    ("ARTISTIC 1", "Artistic-1.0"),
    ("ARTISTIC", "Artistic-2.0"),
    ("BEER", "Beerware"),
    ("BOOST", "BSL-1.0"),
    ("BSD", "BSD-2-Clause"),
    ("CC0", "CC0-1.0"),
    ("CDDL", "CDDL-1.1"),
    ("ECLIPSE", "EPL-1.0"),
    ("EPL", "EPL-1.0"),
    ("FUCK", "WTFPL"),
    ("MIT", "MIT"),
    ("MPL", "MPL-2.0"),
    ("UNLI", "Unlicense"),
    ("UPL", "UPL-1.0"),
    ("WTF", "WTFPL"),
    ("X11", "X11"),
    ("ZLIB", "Zlib"),
    ("ISCL", "ISC"),
    ("ICS", "ISC"),
    ("ISC", "ISC"),
    ("OPEN FONT", "OFL-1.1"),
    ("OFL", "OFL-1.1"),
    ("PHP-3", "PHP-3.01"),
    ("PHP", "PHP-3.01"),
    ("PYTHON SOFTWARE FOUNDATION", "PSF-2.0"),
    ("PSF-2", "PSF-2.0"),
    ("PSF", "PSF-2.0"),
    ("PYTHON", "Python-2.0"),
    ("PERL_5", "Artistic-1.0-Perl"),
    ("PERL5", "Artistic-1.0-Perl"),
    ("PERL 5", "Artistic-1.0-Perl"),
    ("ZPL", "ZPL-2.1"),
    ("EUROPEAN UNION PUBLIC", "EUPL-1.2"),
    ("EUPL", "EUPL-1.2"),
    ("WXWINDOWS", "wxWindows"),
    ("WXWIDGETS", "wxWindows"),
];

/// Last resorts sorted by descending substring length, ties broken
/// lexicographically
pub fn last_resorts() -> &'static [LastResort] {
    static TABLE: LazyLock<Vec<LastResort>> = LazyLock::new(|| {
        let mut table: Vec<LastResort> = LAST_RESORT_DATA
            .iter()
            .map(|&(substring, license)| LastResort { substring, license })
            .collect();
        table.sort_by(|a, b| {
            b.substring
                .len()
                .cmp(&a.substring.len())
                .then(a.substring.cmp(b.substring))
        });
        table
    });
    &TABLE
}
