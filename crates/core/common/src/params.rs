//! Ordered request parameters and their wire encodings
//!
//! Several signature schemes hash the exact bytes that go on the wire, so the
//! order of parameters is part of the contract. `Params` keeps insertion
//! order, and the builder and every signer derive the signed payload and its
//! encoding through the same two functions: [`Params::signed_payload`] and
//! [`Params::encode`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use url::form_urlencoded;

/// HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper case verb
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// True for verbs that carry a request body
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how a payload travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Appended to the URL as a query string
    Query,
    /// `application/x-www-form-urlencoded` body
    Form,
    /// JSON object body
    Json,
    /// Payload is carried in signature headers; no body, no query
    HeaderOnly,
}

impl Encoding {
    /// Content type of the body this encoding produces
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Form => Some("application/x-www-form-urlencoded"),
            Self::Json => Some("application/json"),
            Self::Query | Self::HeaderOnly => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
    // value is JSON text (number, object) rather than a string
    raw: bool,
}

/// Insertion-ordered string parameters
///
/// Values are strings on the wire except for entries added with
/// [`Params::insert_raw`], which are embedded verbatim in JSON bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<Entry>);

impl Params {
    /// Empty parameter list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a parameter; an existing key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key.into(), value.into(), false);
    }

    /// Set a parameter whose value is JSON text, such as an integer id or a
    /// nested object; form encodings still send the text as-is
    pub fn insert_raw(&mut self, key: impl Into<String>, json: impl Into<String>) {
        self.put(key.into(), json.into(), true);
    }

    fn put(&mut self, key: String, value: String, raw: bool) {
        match self.0.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.raw = raw;
            }
            None => self.0.push(Entry { key, value, raw }),
        }
    }

    /// Builder-style `insert`
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style `insert_raw`
    #[must_use]
    pub fn with_raw(mut self, key: impl Into<String>, json: impl Into<String>) -> Self {
        self.insert_raw(key, json);
        self
    }

    /// Value of a parameter
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Remove a parameter, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|entry| entry.key == key)?;
        Some(self.0.remove(index).value)
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Append every parameter of `other` in order
    pub fn extend(&mut self, other: &Self) {
        for entry in &other.0 {
            self.put(entry.key.clone(), entry.value.clone(), entry.raw);
        }
    }

    /// The payload that is signed and sent: signer additions first, then the
    /// caller's parameters
    #[must_use]
    pub fn signed_payload(additions: &Self, params: &Self) -> Self {
        let mut payload = additions.clone();
        payload.extend(params);
        payload
    }

    /// `application/x-www-form-urlencoded` rendering
    #[must_use]
    pub fn to_form(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.iter() {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// JSON object rendering in insertion order
    #[must_use]
    pub fn to_json(&self) -> String {
        // Serializing string and JSON values into a String cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Rendering for the given encoding; empty for `HeaderOnly`
    #[must_use]
    pub fn encode(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Query | Encoding::Form => self.to_form(),
            Encoding::Json => self.to_json(),
            Encoding::HeaderOnly => String::new(),
        }
    }

    /// Request body for `encoding`; `None` when nothing travels in the body
    ///
    /// An empty JSON payload is still sent as `{}`, an empty form is not sent.
    #[must_use]
    pub fn body(&self, encoding: Encoding) -> Option<String> {
        match encoding {
            Encoding::Json => Some(self.to_json()),
            Encoding::Form if !self.is_empty() => Some(self.to_form()),
            Encoding::Form | Encoding::Query | Encoding::HeaderOnly => None,
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            if entry.raw {
                match serde_json::from_str::<serde_json::Value>(&entry.value) {
                    Ok(value) => map.serialize_entry(&entry.key, &value)?,
                    Err(_) => map.serialize_entry(&entry.key, &entry.value)?,
                }
            } else {
                map.serialize_entry(&entry.key, &entry.value)?;
            }
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
