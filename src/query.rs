//! Per-search query normalization.

/// One normalized search string, ephemeral to a single search.
///
/// `raw` is borrowed from the caller and must outlive the query; only the
/// lowercase copy is owned.
pub struct Query<'a> {
    raw: &'a str,
    lower: String,
    uses_full_path: bool,
}

impl<'a> Query<'a> {
    pub fn new(raw: &'a str) -> Self {
        let mut lower = raw.to_string();
        lower.make_ascii_lowercase();
        let uses_full_path = raw.bytes().any(|b| b == b'/' || b == b'\\');
        Self {
            raw,
            lower,
            uses_full_path,
        }
    }

    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// True when the query contains a path separator, in which case matching
    /// runs against the full path rather than the basename.
    pub fn uses_full_path(&self) -> bool {
        self.uses_full_path
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
