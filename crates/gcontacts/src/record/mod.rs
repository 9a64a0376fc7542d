//! The generic record model shared by every entity.
//!
//! A [`Record`] is the parsed form of one feed object: an ordered map from
//! raw key (`gd$email`, `$t`, ...) to a [`Value`]. Repeatable elements are
//! always [`Value::Sequence`], whatever the number of occurrences in the
//! source document.

mod field;

pub use field::{Field, TEXT_KEY, is_repeatable_key};

use crate::error::{ContactsError, ContactsResult};

/// A value stored under a record key.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Record(Record),
    Sequence(Vec<Record>),
}

impl Value {
    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The nested record, if this is an object.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The items of a repeatable key.
    pub fn as_sequence(&self) -> Option<&[Record]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar rendered as text: strings as-is, numbers without a trailing
    /// `.0` when integral, booleans as `true`/`false`.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Record(_) | Self::Sequence(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Self::Record(r)
    }
}

impl From<Vec<Record>> for Value {
    fn from(items: Vec<Record>) -> Self {
        Self::Sequence(items)
    }
}

/// An ordered map of raw keys to values.
///
/// Equality ignores key order.
#[derive(Debug, Clone, Default)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record holding only a text value.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new().with(TEXT_KEY, text.into())
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing any previous value under the same key in
    /// place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Looks up a raw key such as `gd$email`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Looks up a known [`Field`].
    pub fn get_field(&self, field: Field) -> Option<&Value> {
        self.get(field.key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// This record's own text (`$t`).
    pub fn text(&self) -> Option<&str> {
        self.string(TEXT_KEY)
    }

    /// A string stored directly under `key` (typically an attribute).
    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// A nested record stored under `key`.
    pub fn record(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(Value::as_record)
    }

    /// Text of the element stored under `key`, i.e. `self[key]["$t"]`.
    pub fn field_text(&self, key: &str) -> Option<&str> {
        self.record(key).and_then(Record::text)
    }

    /// `self[level1][level2]["$t"]`, or `None` if any level is missing.
    pub fn nested_text(&self, level1: &str, level2: &str) -> Option<&str> {
        self.record(level1)
            .and_then(|inner| inner.record(level2))
            .and_then(Record::text)
    }

    /// Elements of a repeatable field; empty when absent.
    ///
    /// A lone record stored under the key is treated as a one-element
    /// sequence.
    pub fn sequence(&self, key: &str) -> &[Record] {
        match self.get(key) {
            Some(Value::Sequence(items)) => items,
            Some(Value::Record(record)) => std::slice::from_ref(record),
            _ => &[],
        }
    }

    /// Integer text of the element stored under `key` (`self[key]["$t"]`).
    pub fn integer_text(&self, key: &str) -> Option<i64> {
        let value = self.record(key)?.get(TEXT_KEY)?;
        match value {
            Value::Number(n) => Some(*n as i64),
            other => other.scalar_text()?.trim().parse().ok(),
        }
    }

    /// Converts a decoded JSON object.
    ///
    /// `null` members are dropped. Scalar array items are wrapped as
    /// `{"$t": item}`, and a single object stored under a repeatable key is
    /// wrapped in a one-element sequence.
    pub fn from_json(value: serde_json::Value) -> ContactsResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self::from_json_map(map)),
            other => Err(ContactsError::invalid_response(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parses a JSON document whose root is an object.
    pub fn parse_json(body: &str) -> ContactsResult<Self> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            ContactsError::invalid_response(format!("invalid JSON response: {}", e)).with_source(e)
        })?;
        Self::from_json(value)
    }

    /// The `entry` of a single-entry response body.
    pub fn entry_from_json(body: &str) -> ContactsResult<Self> {
        let mut parsed = Self::parse_json(body)?;
        match parsed.remove(Field::Entry.key()) {
            Some(Value::Sequence(mut entries)) if !entries.is_empty() => Ok(entries.swap_remove(0)),
            Some(Value::Record(entry)) => Ok(entry),
            _ => Err(ContactsError::invalid_response("response has no entry")),
        }
    }

    fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut record = Record::new();
        for (key, value) in map {
            let repeatable = is_repeatable_key(&key);
            let converted = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::Array(items) => Value::Sequence(
                    items.into_iter().filter_map(record_from_json_item).collect(),
                ),
                serde_json::Value::Object(inner) if repeatable => {
                    Value::Sequence(vec![Self::from_json_map(inner)])
                }
                serde_json::Value::Object(inner) => Value::Record(Self::from_json_map(inner)),
                scalar if repeatable => match record_from_json_item(scalar) {
                    Some(item) => Value::Sequence(vec![item]),
                    None => continue,
                },
                serde_json::Value::String(s) => Value::String(s),
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(n) => Value::Number(n),
                    None => Value::String(n.to_string()),
                },
            };
            record.entries.push((key, converted));
        }
        record
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

fn record_from_json_item(item: serde_json::Value) -> Option<Record> {
    match item {
        serde_json::Value::Null | serde_json::Value::Array(_) => None,
        serde_json::Value::Object(map) => Some(Record::from_json_map(map)),
        serde_json::Value::String(s) => Some(Record::text_only(s)),
        serde_json::Value::Bool(b) => Some(Record::new().with(TEXT_KEY, b)),
        serde_json::Value::Number(n) => Some(Record::text_only(n.to_string())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
