//! Resolving which company a question is about.
//!
//! Names are matched case-insensitively on word boundaries, tickers as exact
//! upper-case tokens. When several aliases match, the longest wins; equal
//! lengths go to the earliest occurrence in the question, then to the
//! alphabetically first ticker. "Meta Platforms" therefore beats "Meta", and
//! "Apple or Amazon?" resolves to Amazon (longer name) regardless of
//! directory order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use finsight_retrieval::SubjectId;

use crate::error::ConfigError;

/// One known company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEntry {
    /// Display name, also matched against questions.
    pub name: String,

    /// Ticker symbol, used as the subject identifier.
    pub ticker: String,
}

impl CompanyEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Outcome of subject resolution. A missing subject is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Identifier of the resolved subject.
    pub subject: Option<SubjectId>,

    /// Human-readable name of the resolved subject.
    pub display_name: Option<String>,
}

impl Resolution {
    /// Nothing matched.
    pub fn none() -> Self {
        Self::default()
    }

    /// A subject was found.
    pub fn found(subject: SubjectId, display_name: impl Into<String>) -> Self {
        Self {
            subject: Some(subject),
            display_name: Some(display_name.into()),
        }
    }
}

/// Identifies the subject of a free-text question.
#[async_trait]
pub trait SubjectResolver: Send + Sync {
    async fn resolve(&self, question: &str) -> Resolution;
}

/// Immutable set of known companies, keyed by lower-cased name.
#[derive(Debug, Clone, Default)]
pub struct CompanyDirectory {
    by_name: BTreeMap<String, CompanyEntry>,
}

impl CompanyDirectory {
    /// Build a directory, rejecting blank fields and duplicate names.
    pub fn new(entries: impl IntoIterator<Item = CompanyEntry>) -> Result<Self, ConfigError> {
        let mut by_name = BTreeMap::new();

        for entry in entries {
            let name = entry.name.trim();
            let ticker = entry.ticker.trim();
            if name.is_empty() || ticker.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "company entry needs both name and ticker: {entry:?}"
                )));
            }

            let key = name.to_lowercase();
            if by_name.contains_key(&key) {
                return Err(ConfigError::DuplicateCompany(name.to_string()));
            }
            by_name.insert(key, CompanyEntry::new(name, ticker));
        }

        Ok(Self { by_name })
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterate companies ordered by lower-cased name.
    pub fn iter(&self) -> impl Iterator<Item = &CompanyEntry> {
        self.by_name.values()
    }

    /// Look up a company by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&CompanyEntry> {
        self.by_name.get(&name.trim().to_lowercase())
    }

    /// Find the company a question is about.
    pub fn find(&self, question: &str) -> Option<&CompanyEntry> {
        let (lowered, origins) = lowercase_with_origins(question);
        let tokens = ticker_tokens(question);

        let mut best: Option<Candidate<'_>> = None;
        for entry in self.by_name.values() {
            let by_name = find_word(&lowered, &entry.name.to_lowercase()).map(|pos| Candidate {
                entry,
                len: entry.name.chars().count(),
                position: origins[pos],
            });
            let by_ticker = tokens
                .iter()
                .find(|(_, token)| *token == entry.ticker)
                .map(|(position, _)| Candidate {
                    entry,
                    len: entry.ticker.chars().count(),
                    position: *position,
                });

            for candidate in [by_name, by_ticker].into_iter().flatten() {
                if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
        }

        best.map(|c| c.entry)
    }
}

struct Candidate<'a> {
    entry: &'a CompanyEntry,
    len: usize,
    position: usize,
}

impl Candidate<'_> {
    fn beats(&self, other: &Candidate<'_>) -> bool {
        (other.len, self.position, &self.entry.ticker)
            < (self.len, other.position, &other.entry.ticker)
    }
}

/// Lower-case `text`, keeping for every byte of the result the byte offset
/// in `text` it came from. Lowering can change a character's encoded length
/// ('İ' becomes three bytes), so positions in the lowered text are mapped
/// back before they are compared with ticker positions.
fn lowercase_with_origins(text: &str) -> (String, Vec<usize>) {
    let mut lowered = String::with_capacity(text.len());
    let mut origins = Vec::with_capacity(text.len() + 1);

    for (offset, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            lowered.push(lower);
            origins.extend(std::iter::repeat_n(offset, lower.len_utf8()));
        }
    }
    origins.push(text.len());

    (lowered, origins)
}

/// First position of `needle` in `haystack` not embedded in a longer word.
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Upper-case tokens that could be tickers ("TSLA", "BRK.B"), with offsets.
fn ticker_tokens(question: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    let is_token_char = |c: char| c.is_ascii_alphanumeric() || c == '.';
    for (i, c) in question.char_indices().chain(std::iter::once((question.len(), ' '))) {
        match (start, is_token_char(c)) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                let token = question[s..i].trim_end_matches('.');
                if !token.is_empty() && token.chars().all(|c| !c.is_ascii_lowercase()) {
                    tokens.push((s, token));
                }
                start = None;
            }
            _ => {}
        }
    }

    tokens
}

/// Resolves subjects against a [`CompanyDirectory`].
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    directory: CompanyDirectory,
}

impl DirectoryResolver {
    /// Create a resolver over `directory`.
    pub fn new(directory: CompanyDirectory) -> Self {
        Self { directory }
    }

    /// The underlying directory.
    pub fn directory(&self) -> &CompanyDirectory {
        &self.directory
    }
}

#[async_trait]
impl SubjectResolver for DirectoryResolver {
    async fn resolve(&self, question: &str) -> Resolution {
        match self.directory.find(question) {
            Some(entry) => {
                debug!("Resolved subject {} ({})", entry.ticker, entry.name);
                Resolution::found(SubjectId::new(&entry.ticker), &entry.name)
            }
            None => Resolution::none(),
        }
    }
}
