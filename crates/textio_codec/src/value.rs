//! Dynamic structured value type.

use indexmap::IndexMap;

/// Insertion-ordered mapping from string keys to values.
///
/// Inserting an existing key replaces its value but keeps the key's
/// original position.
pub type Map = IndexMap<String, Value>;

/// A numeric value.
///
/// Integers and floats are kept apart so that `1` and `1.0` survive a
/// round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer (full i64 range).
    Int(i64),
    /// Finite double-precision float.
    ///
    /// NaN and infinities can be constructed but are rejected by the
    /// encoder.
    Float(f64),
}

impl Number {
    /// Creates a float number, returning `None` for NaN or infinities.
    #[must_use]
    pub fn from_f64(f: f64) -> Option<Self> {
        f.is_finite().then_some(Number::Float(f))
    }

    /// Returns the number as an `i64` if it is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(*n),
            Number::Float(_) => None,
        }
    }

    /// Returns the number as an `f64`, converting integers.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Float(f) => *f,
        }
    }

    /// Returns true if this is a float.
    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }
}

/// A structured value.
///
/// This is the closed union the serialization layer accepts: null,
/// booleans, numbers, strings, arrays and string-keyed objects. An owned
/// `Value` tree cannot contain cycles.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer or float.
    Number(Number),
    /// Text string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Insertion-ordered object with unique string keys.
    Object(Map),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get this value as a float, converting integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Get this value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as an object, if it is one.
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key in this object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short name of this value's kind, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(Number::Int(_)) => "integer",
            Value::Number(Number::Float(_)) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(i64::from(n)))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(Number::Int(i64::from(n)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Object(m)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keeps_insertion_order() {
        let value: Value = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();

        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn reinserting_key_keeps_position() {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("b".to_string(), Value::from(2));
        map.insert("a".to_string(), Value::from(3));

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs[0], (&"a".to_string(), &Value::from(3)));
        assert_eq!(pairs[1], (&"b".to_string(), &Value::from(2)));
    }

    #[test]
    fn integers_and_floats_differ() {
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from(1).as_f64(), Some(1.0));
        assert_eq!(Value::from(1.5).as_i64(), None);
    }

    #[test]
    fn number_from_f64_rejects_non_finite() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
        assert_eq!(Number::from_f64(2.5), Some(Number::Float(2.5)));
    }

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from(42).as_bool(), None);

        assert_eq!(Value::from(42).as_i64(), Some(42));
        assert_eq!(Value::from("42").as_i64(), None);

        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::from(vec![1, 2]).as_array(),
            Some(&[Value::from(1), Value::from(2)][..])
        );
    }

    #[test]
    fn object_get() {
        let value: Value = [("name", Value::from("Alice")), ("age", Value::from(30))]
            .into_iter()
            .collect();

        assert_eq!(value.get("name"), Some(&Value::from("Alice")));
        assert_eq!(value.get("age"), Some(&Value::from(30)));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::Null.get("name"), None);
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Number(Number::Int(42)));
        assert_eq!(Value::from(42u32), Value::Number(Number::Int(42)));
        assert_eq!(Value::from("hi".to_string()), Value::String("hi".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::from(7));
        assert_eq!(Value::from(()), Value::Null);
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::from(1).type_name(), "integer");
        assert_eq!(Value::from(1.0).type_name(), "float");
        assert_eq!(Value::Object(Map::new()).type_name(), "object");
    }
}
