//! Query parameter handling: strict parsing and deterministic encoding.

use crate::{DsnError, Result};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Ordered set of connection parameters.
///
/// Keys are unique; setting an existing key overwrites its value. Iteration and
/// [`QueryParams::encode`] are always in lexicographic key order, independent of
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Serialize as `k1=v1&k2=v2`, sorted by key, form-escaped.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", query_escape(k), query_escape(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for QueryParams {
    /// Layer pairs on top of the current set; later pairs win.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse a raw `application/x-www-form-urlencoded` query string.
///
/// Pairs are returned in input order, duplicates included. Empty segments are
/// skipped and a segment without `=` gets an empty value. Semicolon separators,
/// malformed `%` escapes and escapes that decode to invalid UTF-8 are rejected
/// with [`DsnError::MalformedQuery`].
pub fn parse_query(raw: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            return Err(DsnError::MalformedQuery(
                "invalid semicolon separator in query".to_string(),
            ));
        }

        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        pairs.push((query_unescape(key)?, query_unescape(value)?));
    }

    Ok(pairs)
}

fn query_unescape(component: &str) -> Result<String> {
    if !has_valid_escapes(component) {
        return Err(DsnError::MalformedQuery(
            "invalid percent escape".to_string(),
        ));
    }

    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| DsnError::MalformedQuery(e.to_string()))
}

/// True when every `%` starts a two-digit hex escape.
pub(crate) fn has_valid_escapes(component: &str) -> bool {
    let mut rest = component;
    while let Some(pos) = rest.find('%') {
        match rest.get(pos + 1..pos + 3) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => rest = &rest[pos + 3..],
            _ => return false,
        }
    }
    true
}

/// Form-escape: unreserved characters stay, space becomes `+`, the rest is `%XX`.
fn query_escape(component: &str) -> String {
    urlencoding::encode(component).replace("%20", "+")
}
