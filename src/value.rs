//! Dynamic values read back from the script evaluator
//!
//! Prototype tables produced by the data scripts are loosely typed: any field
//! may be missing, and the same field can appear in several shapes. Every read
//! goes through one of the accessors below, which return an explicit default
//! instead of failing.

use std::collections::BTreeMap;

/// A value from the script namespace.
///
/// Tables whose keys are exactly `1..=n` are read back as [`Value::List`];
/// any other table becomes [`Value::Table`] with integer keys rendered as
/// decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Table(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view. Numeric strings are accepted, as the evaluator coerces them.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Value::Table(_) | Value::List(_))
    }

    /// Look up a named field. Lists have no named fields.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Table(t) => t.get(key),
            _ => None,
        }
    }

    /// Positional lookup, 1-based like the evaluator.
    pub fn index(&self, position: usize) -> Option<&Value> {
        match self {
            Value::List(items) => position.checked_sub(1).and_then(|i| items.get(i)),
            Value::Table(t) => t.get(&position.to_string()),
            _ => None,
        }
    }

    /// Iterate the element values of a list-like value.
    ///
    /// Tables yield their values in key order, so sparse arrays still work.
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Value::List(items) => Box::new(items.iter()),
            Value::Table(t) => Box::new(t.values()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// String field, absent or non-string yields `None`.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Numeric field, absent reads as the evaluator's zero-equivalent `default`.
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Field holding a list of strings. A bare string counts as a single entry,
    /// absence yields an empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(v) => v
                .elements()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// Build a [`Value::Table`] from key/value pairs. Handy for tests and fakes.
pub fn table<K, I>(entries: I) -> Value
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    Value::Table(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
}
