//! Entity attribute bag and the attribute-predicate used by stats queries.
//!
//! Attributes are free-form `String → AttrValue` pairs (e.g. `"priority"`,
//! `"type"`, `"vip"`).  A filter is itself an `Attributes` value: an entity
//! matches iff every key in the filter exists in the entity's attributes with
//! an equal value.

use std::collections::BTreeMap;
use std::fmt;

/// Priority attribute key.
pub const PRIORITY_KEY: &str = "priority";

/// Attribute key tagging an entity with its variant (set by `Source`).
pub const TYPE_KEY: &str = "type";

/// Priority assigned to entities that don't carry one.
///
/// Smaller is served first.  Keeping the default at 1 leaves 0 free so a
/// model can push an entity to the front of every queue.
pub const DEFAULT_PRIORITY: i64 = 1;

/// Priority reserved for queue-jumping entities.
pub const QUEUE_JUMP_PRIORITY: i64 = 0;

// ── AttrValue ─────────────────────────────────────────────────────────────────

/// One attribute value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl AttrValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Text(v) => write!(f, "{v:?}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

// ── Attributes ────────────────────────────────────────────────────────────────

/// Ordered attribute map.  Also used as the filter argument of stats queries.
///
/// ```
/// use qs_core::{AttrValue, Attributes};
///
/// let attrs = Attributes::new().with("priority", 0).with("vip", true);
/// let filter = Attributes::new().with("priority", 0);
/// assert!(attrs.matches(&filter));
/// assert_eq!(attrs.get("vip"), Some(&AttrValue::Bool(true)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The integer `priority` attribute, if present and integral.
    pub fn priority(&self) -> Option<i64> {
        self.get(PRIORITY_KEY).and_then(AttrValue::as_int)
    }

    /// `true` iff every key in `filter` exists here with an equal value.
    /// An empty filter matches everything.
    pub fn matches(&self, filter: &Attributes) -> bool {
        filter.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k:?}: {v}")?;
        }
        write!(f, "}}")
    }
}
