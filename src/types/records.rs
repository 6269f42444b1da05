//! Typed record bundles forming a message payload.
//!
//! [`Content`] is an ordered, string-keyed collection of records, each one
//! of three kinds: configuration scalars ([`ConfigsRecord`]), numeric
//! metrics ([`MetricsRecord`]), or opaque parameter arrays
//! ([`ParametersRecord`]). Record names are unique within one `Content`;
//! setting a name replaces any prior record under that name wholesale —
//! records are never partially merged.
//!
//! Iteration order is insertion order (`IndexMap`), which is what makes
//! pipeline traces observable: a mod that appends a record named after
//! itself leaves a readable footprint in `Content::keys`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A primitive configuration or property value.
///
/// # Examples
///
/// ```
/// use fedlink::Scalar;
///
/// let s: Scalar = "numpy.ndarray".into();
/// assert_eq!(s.as_str(), Some("numpy.ndarray"));
///
/// let n: Scalar = 42i64.into();
/// assert_eq!(n.as_i64(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Returns the string value, if this scalar is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this scalar is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float value, if this scalar is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// A numeric metric entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Integer metric (counts, example numbers).
    Int(i64),
    /// Floating-point metric (losses, accuracies).
    Float(f64),
}

impl MetricValue {
    /// Returns the integer value, if this metric is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float value, if this metric is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// An opaque numeric parameter array.
///
/// The payload `data` is a serialized tensor the core never inspects;
/// `dtype`, `shape`, and `stype` describe it for whichever numeric
/// runtime produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Array {
    /// Element dtype label (e.g. `"float32"`), empty when unknown.
    pub dtype: String,
    /// Tensor shape, empty when unknown.
    pub shape: Vec<u32>,
    /// Serialization type label (e.g. `"np"`).
    pub stype: String,
    /// Opaque serialized tensor bytes.
    pub data: Vec<u8>,
}

/// Ordered map of configuration scalars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigsRecord {
    values: IndexMap<String, Scalar>,
}

/// Ordered map of numeric metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    values: IndexMap<String, MetricValue>,
}

/// Ordered map of parameter arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametersRecord {
    arrays: IndexMap<String, Array>,
}

macro_rules! record_map_impl {
    ($record:ident, $value:ty, $field:ident) => {
        impl $record {
            /// Creates an empty record.
            pub fn new() -> Self {
                Self::default()
            }

            /// Sets `key`, replacing any prior value under that key.
            pub fn set(&mut self, key: impl Into<String>, value: impl Into<$value>) {
                self.$field.insert(key.into(), value.into());
            }

            /// Returns the value under `key`, if present.
            pub fn get(&self, key: &str) -> Option<&$value> {
                self.$field.get(key)
            }

            /// Number of entries.
            pub fn len(&self) -> usize {
                self.$field.len()
            }

            /// Returns `true` if the record holds no entries.
            pub fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }

            /// Iterates entries in insertion order.
            pub fn iter(&self) -> impl Iterator<Item = (&String, &$value)> {
                self.$field.iter()
            }
        }

        impl FromIterator<(String, $value)> for $record {
            fn from_iter<I: IntoIterator<Item = (String, $value)>>(iter: I) -> Self {
                Self {
                    $field: iter.into_iter().collect(),
                }
            }
        }
    };
}

record_map_impl!(ConfigsRecord, Scalar, values);
record_map_impl!(MetricsRecord, MetricValue, values);
record_map_impl!(ParametersRecord, Array, arrays);

/// One named record inside a [`Content`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Record {
    /// Configuration key-values.
    Configs(ConfigsRecord),
    /// Numeric metrics.
    Metrics(MetricsRecord),
    /// Numeric parameter arrays.
    Parameters(ParametersRecord),
}

/// The payload of one message: a named bundle of typed records.
///
/// Record names are unique at any point in time; [`Content::insert`] (and
/// the typed `set_*` helpers) replace any prior record under the same
/// name. Insertion order is preserved and observable via
/// [`Content::keys`].
///
/// # Examples
///
/// ```
/// use fedlink::{ConfigsRecord, Content};
///
/// let mut content = Content::new();
/// content.set_configs("round", ConfigsRecord::new());
/// content.set_configs("round", ConfigsRecord::new()); // replaces, no duplicate
/// assert_eq!(content.keys().collect::<Vec<_>>(), vec!["round"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    records: IndexMap<String, Record>,
}

impl Content {
    /// Creates an empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` under `name`, replacing any prior record there.
    pub fn insert(&mut self, name: impl Into<String>, record: Record) {
        self.records.insert(name.into(), record);
    }

    /// Sets a configs record under `name`.
    pub fn set_configs(&mut self, name: impl Into<String>, record: ConfigsRecord) {
        self.insert(name, Record::Configs(record));
    }

    /// Sets a metrics record under `name`.
    pub fn set_metrics(&mut self, name: impl Into<String>, record: MetricsRecord) {
        self.insert(name, Record::Metrics(record));
    }

    /// Sets a parameters record under `name`.
    pub fn set_parameters(&mut self, name: impl Into<String>, record: ParametersRecord) {
        self.insert(name, Record::Parameters(record));
    }

    /// Returns the record under `name`, if present.
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    /// Returns the configs record under `name`, if present and of that kind.
    pub fn configs(&self, name: &str) -> Option<&ConfigsRecord> {
        match self.records.get(name) {
            Some(Record::Configs(r)) => Some(r),
            _ => None,
        }
    }

    /// Returns the metrics record under `name`, if present and of that kind.
    pub fn metrics(&self, name: &str) -> Option<&MetricsRecord> {
        match self.records.get(name) {
            Some(Record::Metrics(r)) => Some(r),
            _ => None,
        }
    }

    /// Returns the parameters record under `name`, if present and of that kind.
    pub fn parameters(&self, name: &str) -> Option<&ParametersRecord> {
        match self.records.get(name) {
            Some(Record::Parameters(r)) => Some(r),
            _ => None,
        }
    }

    /// Record names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are present.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
