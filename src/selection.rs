//! Bookmaker allow-lists and the sources they come from.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::SelectionError;

/// Set of bookmaker keys whose quotes take part in aggregation.
///
/// An empty list allows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(BTreeSet<String>);

impl AllowList {
    /// Empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether quotes from this bookmaker are used.
    pub fn contains(&self, bookmaker: &str) -> bool {
        self.0.contains(bookmaker)
    }

    /// Whether no bookmaker is allowed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of allowed bookmakers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Allowed keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .map(|key: String| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
        )
    }
}

/// Parse line-oriented text: the first comma-separated field of each
/// non-blank line is one bookmaker key.
pub fn parse_allow_list(text: &str) -> AllowList {
    text.lines()
        .filter_map(|line| line.split(',').next())
        .collect()
}

/// Load an allow-list file.
///
/// An unreadable file is logged and degrades to an empty list, which
/// produces empty results rather than an error.
pub fn load_allow_list(path: impl AsRef<Path>) -> AllowList {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let list = parse_allow_list(&text);
            debug!(path = %path.display(), bookmakers = list.len(), "Loaded bookmaker list");
            list
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load bookmakers from file");
            AllowList::new()
        }
    }
}

/// Select bookmakers by 1-based index from the offered list, as typed at an
/// interactive prompt ("1, 3,4").
pub fn choose_by_indexes(available: &[String], input: &str) -> Result<AllowList, SelectionError> {
    let picks = input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let index: usize = part
                .parse()
                .map_err(|_| SelectionError::NotANumber(part.to_string()))?;
            index
                .checked_sub(1)
                .and_then(|i| available.get(i))
                .cloned()
                .ok_or(SelectionError::OutOfRange {
                    index,
                    available: available.len(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if picks.is_empty() {
        return Err(SelectionError::Empty);
    }

    Ok(picks.into_iter().collect())
}
