//! Status normalization and classification for the monitored line.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub mod extract;

pub use extract::StatusReport;

/// Operational classification of the monitored line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Normal,
    Problem,
    #[default]
    Unknown,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::Normal => "NORMAL",
            Classification::Problem => "PROBLEM",
            Classification::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

// "Operação Normal" arrives with or without accents and occasionally with
// underscores; all spellings fold into these after [`normalize`].
static NORMAL_ALIASES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["operacao normal", "operacao_normal", "normal"]
        .into_iter()
        .collect()
});

/// Lowercases, folds Portuguese diacritics and collapses whitespace runs.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_lowercase) {
        let ch = fold_diacritic(ch);
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        _ => ch,
    }
}

/// Maps a raw status phrase to a [`Classification`].
///
/// Only an exact clean "operação normal" (any accented or underscored
/// spelling) counts as Normal. Qualified variants such as
/// "Operação Normal - com restrições" have meant a real disruption
/// upstream, so any other non-empty phrase is Problem.
pub fn classify(status_text: &str) -> Classification {
    let normalized = normalize(status_text);
    if normalized.is_empty() {
        return Classification::Unknown;
    }
    if NORMAL_ALIASES.contains(normalized.as_str()) {
        return Classification::Normal;
    }
    Classification::Problem
}
