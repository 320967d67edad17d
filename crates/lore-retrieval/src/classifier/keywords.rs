//! Versioned domain keyword table.
//!
//! Matching is case-insensitive substring. Changing any list bumps
//! `KEYWORD_TABLE_VERSION`.

use lore_core::constants::KEYWORD_TABLE_VERSION;
use lore_core::Domain;

pub struct KeywordTable {
    pub version: u32,
    /// One keyword list per domain, in tie-break priority order.
    pub entries: [(Domain, &'static [&'static str]); 3],
}

impl KeywordTable {
    pub fn keywords(&self, domain: Domain) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, words)| *words)
            .unwrap_or(&[])
    }
}

const DATABASE: &[&str] = &[
    "table",
    "column",
    "database",
    "sql",
    "query",
    "schema",
    "index",
    "foreign key",
    "primary key",
    "relationship",
    "join",
];

const SUPPORT: &[&str] = &[
    "error",
    "issue",
    "problem",
    "troubleshoot",
    "fix",
    "bug",
    "help",
    "support",
    "ticket",
    "resolve",
];

const DOCUMENTATION: &[&str] = &[
    "how to",
    "how do",
    "guide",
    "tutorial",
    "documentation",
    "manual",
    "instruction",
    "feature",
    "functionality",
    "set up",
    "setup",
    "configure",
    "install",
];

pub static DEFAULT_KEYWORDS: KeywordTable = KeywordTable {
    version: KEYWORD_TABLE_VERSION,
    entries: [
        (Domain::Database, DATABASE),
        (Domain::Support, SUPPORT),
        (Domain::Documentation, DOCUMENTATION),
    ],
};
