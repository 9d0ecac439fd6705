use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::compliance::TriState;

/// User-selected filters over a session history table. Every axis defaults
/// to "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryFilter {
    /// Free-text torrent name search; spaces act as wildcard gaps.
    pub name: String,
    pub unsatisfied: TriState,
    pub active: TriState,
    /// Completed at least once (the `seeder` flag).
    pub completed: TriState,
    pub prewarn: TriState,
    pub hitrun: TriState,
    pub immune: TriState,
    /// Torrent was uploaded by the queried user.
    pub uploaded: TriState,
    /// Torrent status codes; empty means any status.
    pub status: BTreeSet<i32>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_unsatisfied(mut self, state: TriState) -> Self {
        self.unsatisfied = state;
        self
    }

    pub fn with_active(mut self, state: TriState) -> Self {
        self.active = state;
        self
    }

    pub fn with_completed(mut self, state: TriState) -> Self {
        self.completed = state;
        self
    }

    pub fn with_prewarn(mut self, state: TriState) -> Self {
        self.prewarn = state;
        self
    }

    pub fn with_hitrun(mut self, state: TriState) -> Self {
        self.hitrun = state;
        self
    }

    pub fn with_immune(mut self, state: TriState) -> Self {
        self.immune = state;
        self
    }

    pub fn with_uploaded(mut self, state: TriState) -> Self {
        self.uploaded = state;
        self
    }

    pub fn with_status(mut self, status: impl IntoIterator<Item = i32>) -> Self {
        self.status = status.into_iter().collect();
        self
    }
}

/// Case-insensitive name search: the query's space-separated fragments must
/// appear in order, with anything in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    fragments: Vec<String>,
}

impl NamePattern {
    /// `None` for an empty query.
    pub fn parse(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            fragments: query
                .split(' ')
                .filter(|f| !f.is_empty())
                .map(|f| f.to_lowercase())
                .collect(),
        })
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn matches(&self, name: &str) -> bool {
        let haystack = name.to_lowercase();
        let mut rest = haystack.as_str();
        for fragment in &self.fragments {
            match rest.find(fragment.as_str()) {
                Some(at) => rest = &rest[at + fragment.len()..],
                None => return false,
            }
        }
        true
    }

    /// SQL `LIKE` pattern using `\` as the escape character.
    pub fn to_like_pattern(&self) -> String {
        let mut pattern = String::from("%");
        for fragment in &self.fragments {
            for c in fragment.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
        }
        pattern
    }
}
