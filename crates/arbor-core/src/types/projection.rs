//! Column projection for listing operations.
//!
//! Callers may narrow list output to a subset of columns. Tree assembly
//! needs `id` and the parent-key column even when the caller did not ask
//! for them, so tree-mode listings pass the projection through
//! [`Projection::ensure_tree_columns`] before rows are shaped.

use serde::{Deserialize, Serialize};

/// The set of columns a listing should return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Return every column.
    All,
    /// Return only the named columns. Names may be plain (`name`) or
    /// table-qualified (`nodes.name`).
    Columns(Vec<String>),
}

impl Default for Projection {
    fn default() -> Self {
        Self::All
    }
}

impl Projection {
    /// Whether this projection selects every column.
    ///
    /// A column list containing `*` counts as selecting everything.
    pub fn is_all(&self) -> bool {
        match self {
            Self::All => true,
            Self::Columns(cols) => cols.is_empty() || cols.iter().any(|c| c == "*"),
        }
    }

    /// Whether the projection selects the given column, under any of its
    /// accepted spellings: exact, table-qualified (`<table>.<column>`), or
    /// appearing as a whole word inside a selected expression.
    pub fn selects(&self, column: &str) -> bool {
        match self {
            Self::All => true,
            Self::Columns(cols) => {
                if self.is_all() {
                    return true;
                }
                cols.iter().any(|selected| {
                    selected.eq_ignore_ascii_case(column)
                        || selected
                            .rsplit('.')
                            .next()
                            .is_some_and(|tail| tail.eq_ignore_ascii_case(column))
                        || contains_word(selected, column)
                })
            }
        }
    }

    /// Guarantee that `id` and the parent-key column are part of the
    /// projection, appending whichever is missing.
    ///
    /// No-op when every column is already selected. Active only for tree
    /// listings; flat listings return exactly what the caller asked for.
    pub fn ensure_tree_columns(&mut self, parent_key: &str) {
        if self.is_all() {
            return;
        }
        let Self::Columns(cols) = self else {
            return;
        };
        let mut missing = Vec::new();
        for required in ["id", parent_key] {
            let found = cols.iter().any(|selected| {
                selected.eq_ignore_ascii_case(required)
                    || selected
                        .rsplit('.')
                        .next()
                        .is_some_and(|tail| tail.eq_ignore_ascii_case(required))
                    || contains_word(selected, required)
            });
            if !found {
                missing.push(required.to_string());
            }
        }
        cols.extend(missing);
    }
}

/// Case-insensitive whole-word search: `needle` must appear in `haystack`
/// with no identifier character (letter, digit, underscore) on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let haystack_lower = haystack.to_ascii_lowercase();
    let needle_lower = needle.to_ascii_lowercase();
    let bytes = haystack_lower.as_bytes();
    let mut from = 0;
    while let Some(pos) = haystack_lower[from..].find(&needle_lower) {
        let start = from + pos;
        let end = start + needle_lower.len();
        let before_ok = start == 0 || !is_ident_char(bytes[start - 1]);
        let after_ok = end == bytes.len() || !is_ident_char(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
