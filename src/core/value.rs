//! Captured argument values and the `(args, kwargs)` payload.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Keyword arguments in call order.
pub type Kwargs = IndexMap<String, Value>;

/// Self-describing value of one captured argument.
///
/// Maps keep insertion order and accept any value as a key, so data such as
/// `{3: ...}` survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    None,
    /// Stand-in for a value that was deliberately left out (rendered as `...`).
    Placeholder,
    Bool(bool),
    Int(i64),
    /// Unsigned integer above `i64::MAX`.
    #[serde(rename = "uint")]
    UInt(u64),
    Float(#[serde(with = "float_repr")] f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn map<K: ToValue, V: ToValue>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    /// Look up a map entry by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// The [`Value::Placeholder`] marker as a plain argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placeholder;

/// Conversion of a Rust value into a captured [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for Placeholder {
    fn to_value(&self) -> Value {
        Value::Placeholder
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! int_to_value {
    ($($t:ty),*) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        })*
    };
}

int_to_value!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! unsigned_to_value {
    ($($t:ty),*) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> Value {
                let wide = *self as u64;
                i64::try_from(wide).map(Value::Int).unwrap_or(Value::UInt(wide))
            }
        })*
    };
}

unsigned_to_value!(u64, usize);

impl ToValue for isize {
    fn to_value(&self) -> Value {
        // isize is at most 64 bits on every supported target.
        Value::Int(*self as i64)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::None,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::map(self.iter())
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::map(self.iter())
    }
}

macro_rules! tuple_to_value {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            fn to_value(&self) -> Value {
                Value::Tuple(vec![$(self.$idx.to_value()),+])
            }
        }
    };
}

tuple_to_value!(A.0);
tuple_to_value!(A.0, B.1);
tuple_to_value!(A.0, B.1, C.2);
tuple_to_value!(A.0, B.1, C.2, D.3);
tuple_to_value!(A.0, B.1, C.2, D.3, E.4);
tuple_to_value!(A.0, B.1, C.2, D.3, E.4, F.5);

/// JSON has no NaN or infinities: those are written as the strings `"nan"`,
/// `"inf"` and `"-inf"`. Finite values, `-0.0` included, stay plain numbers.
mod float_repr {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("nan")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(text) => match text.as_str() {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float '{}'", other))),
            },
        }
    }
}

/// Positional and keyword arguments of one captured call.
///
/// Stored on disk as the two-element array `[args, kwargs]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self { args, kwargs }
    }

    pub fn arg(mut self, value: impl ToValue) -> Self {
        self.args.push(value.to_value());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        self.kwargs.insert(name.into(), value.to_value());
        self
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.args, &self.kwargs).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (args, kwargs) = <(Vec<Value>, Kwargs)>::deserialize(deserializer)?;
        Ok(Self::from_parts(args, kwargs))
    }
}

/// Arguments a wrapped function can be called with.
///
/// Tuples of [`ToValue`] become positional arguments; a [`Payload`] is used as is.
pub trait ToPayload {
    fn to_payload(&self) -> Payload;
}

impl ToPayload for Payload {
    fn to_payload(&self) -> Payload {
        self.clone()
    }
}

impl ToPayload for () {
    fn to_payload(&self) -> Payload {
        Payload::default()
    }
}

macro_rules! tuple_to_payload {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: ToValue),+> ToPayload for ($($name,)+) {
            fn to_payload(&self) -> Payload {
                Payload {
                    args: vec![$(self.$idx.to_value()),+],
                    kwargs: Kwargs::new(),
                }
            }
        }
    };
}

tuple_to_payload!(A.0);
tuple_to_payload!(A.0, B.1);
tuple_to_payload!(A.0, B.1, C.2);
tuple_to_payload!(A.0, B.1, C.2, D.3);
tuple_to_payload!(A.0, B.1, C.2, D.3, E.4);
tuple_to_payload!(A.0, B.1, C.2, D.3, E.4, F.5);
tuple_to_payload!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
tuple_to_payload!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_tuple(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("(")?;
    write_seq(f, items)?;
    if items.len() == 1 {
        f.write_str(",")?;
    }
    f.write_str(")")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Placeholder => f.write_str("..."),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::List(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => write_tuple(f, items),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_tuple(f, &self.args)?;
        f.write_str(", {")?;
        for (i, (k, v)) in self.kwargs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {}", k, v)?;
        }
        f.write_str("})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_payload() -> Payload {
        Payload::new()
            .arg(1)
            .arg(vec![2])
            .kwarg("c", Value::map([(3, Placeholder)]))
    }

    #[test]
    fn test_payload_serializes_as_pair() {
        let json = serde_json::to_value(Payload::new().arg(true)).unwrap();
        let pair = json.as_array().expect("payload is an array");
        assert_eq!(pair.len(), 2);
        assert!(pair[0].is_array());
        assert!(pair[1].is_object());
    }

    #[test]
    fn test_nested_payload_survives_json() {
        let payload = nested_payload();
        let text = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);
        assert_eq!(
            back.kwargs["c"].get(&Value::Int(3)),
            Some(&Value::Placeholder)
        );
    }

    #[test]
    fn test_payload_display_reads_like_a_call() {
        assert_eq!(nested_payload().to_string(), r#"((1, [2]), {"c": {3: ...}})"#);
        assert_eq!(Payload::new().arg("x").to_string(), r#"(("x",), {})"#);
    }

    #[test]
    fn test_tuples_become_positional_args() {
        let payload = (3, "seven", Some(1.5)).to_payload();
        assert_eq!(
            payload.args,
            vec![Value::Int(3), Value::Str("seven".into()), Value::Float(1.5)]
        );
        assert!(payload.kwargs.is_empty());
    }

    #[test]
    fn test_nested_tuple_argument_is_a_tuple_value() {
        let payload = ((1, 2),).to_payload();
        assert_eq!(
            payload.args,
            vec![Value::Tuple(vec![Value::Int(1), Value::Int(2)])]
        );
    }

    #[test]
    fn test_wide_unsigned_ints_stay_exact() {
        assert_eq!(7u64.to_value(), Value::Int(7));
        assert_eq!(u64::MAX.to_value(), Value::UInt(u64::MAX));

        let payload = Payload::new().arg(18_446_744_073_709_551_614_u64);
        let back: Payload =
            serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();
        assert_eq!(back.args, vec![Value::UInt(18_446_744_073_709_551_614)]);
        assert_eq!(back.to_string(), "((18446744073709551614,), {})");
    }

    #[test]
    fn test_non_finite_and_negative_zero_floats_survive_json() {
        let payload = Payload::new()
            .arg(f64::NAN)
            .arg(f64::INFINITY)
            .arg(f64::NEG_INFINITY)
            .arg(-0.0_f64)
            .arg(2.5);
        let text = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&text).unwrap();

        let floats: Vec<f64> = back
            .args
            .iter()
            .map(|v| match v {
                Value::Float(x) => *x,
                other => panic!("expected float, got {:?}", other),
            })
            .collect();
        assert!(floats[0].is_nan());
        assert_eq!(floats[1], f64::INFINITY);
        assert_eq!(floats[2], f64::NEG_INFINITY);
        assert_eq!(floats[3], 0.0);
        assert!(floats[3].is_sign_negative());
        assert_eq!(floats[4], 2.5);
    }

    #[test]
    fn test_bad_float_text_is_rejected() {
        let err = serde_json::from_str::<Value>(r#"{"float":"lots"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_kwargs_keep_call_order() {
        let payload = Payload::new().kwarg("zeta", 1).kwarg("alpha", 2);
        let back: Payload =
            serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();
        let names: Vec<&str> = back.kwargs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(back.to_string(), r#"((), {"zeta": 1, "alpha": 2})"#);
    }

    #[test]
    fn test_map_keeps_insertion_order() {
        let v = Value::map([("b", 1), ("a", 2)]);
        assert_eq!(v.to_string(), r#"{"b": 1, "a": 2}"#);
    }
}
