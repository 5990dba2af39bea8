//! Product specification lists.
//!
//! A product carries an ordered list of `(key, value)` rows such as
//! `("Resolusi Cetak", "5760 x 1440 dpi")`. The list is persisted as a single
//! JSON text column (`[{"key": .., "value": ..}, ..]`) and is `NULL` when
//! empty.

use serde::{Deserialize, Serialize};

/// One specification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecEntry {
    pub key: String,
    pub value: String,
}

impl SpecEntry {
    /// Convenience constructor.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Error decoding a stored specification column.
#[derive(Debug, thiserror::Error)]
#[error("invalid specification list: {0}")]
pub struct SpecificationsError(#[from] serde_json::Error);

/// Ordered specification list of a product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Specifications(Vec<SpecEntry>);

impl Specifications {
    /// Build a list from editor rows.
    ///
    /// Rows are trimmed; a row is kept only when both its key and its value
    /// are non-empty, so blank rows left over in the admin editor disappear.
    /// Order is preserved.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = SpecEntry>) -> Self {
        Self(
            entries
                .into_iter()
                .filter_map(|entry| {
                    let key = entry.key.trim();
                    let value = entry.value.trim();
                    (!key.is_empty() && !value.is_empty()).then(|| SpecEntry::new(key, value))
                })
                .collect(),
        )
    }

    /// Decode the stored column value.
    ///
    /// # Errors
    ///
    /// Returns `SpecificationsError` if the stored text is not a JSON list of
    /// `{key, value}` objects.
    pub fn from_stored(stored: Option<&str>) -> Result<Self, SpecificationsError> {
        match stored.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => Ok(Self(serde_json::from_str(text)?)),
        }
    }

    /// Encode for storage; `None` when the list is empty.
    #[must_use]
    pub fn to_stored(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        // Serializing plain string pairs cannot fail.
        serde_json::to_string(&self.0).ok()
    }

    /// The rows, in display order.
    #[must_use]
    pub fn entries(&self) -> &[SpecEntry] {
        &self.0
    }

    /// Whether the list has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a value by key (case-insensitive).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
            .map(|entry| entry.value.as_str())
    }
}
