//! Composite keys addressing per-user content state.
//!
//! Play records and favorites are stored under a key derived from the
//! content source identifier and the content item identifier:
//!
//! ```text
//! source + "+" + id
//!
//! douban+1292052
//! tmdb+tv:82856
//! ```
//!
//! # Examples
//!
//! ```
//! use mediastate_storage::key::{compose_key, split_key};
//!
//! let key = compose_key("douban", "1292052");
//! assert_eq!(key, "douban+1292052");
//! assert_eq!(split_key(&key), Some(("douban", "1292052")));
//! ```
//!
//! # Delimiter constraint
//!
//! Composition is plain concatenation; neither part is validated or
//! escaped. [`split_key`] splits on the *first* `+`, so an `id` containing
//! `+` still round-trips, but a `source` containing `+` does not. Callers
//! own the constraint that source identifiers never contain `+`.

/// Delimiter between the source and id parts of a composite key.
pub const KEY_DELIMITER: char = '+';

/// Compose the storage key for a (source, id) pair.
///
/// Pure and deterministic; performs no validation.
pub fn compose_key(source: &str, id: &str) -> String {
    format!("{}{}{}", source, KEY_DELIMITER, id)
}

/// Split a composite key back into its (source, id) pair.
///
/// Splits on the first delimiter. Returns `None` for keys that were not
/// produced by [`compose_key`] (no delimiter present).
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(KEY_DELIMITER)
}
