//! Bridge from `serde::Serialize` types into [`Value`].
//!
//! Anything serde can describe is accepted as long as it stays inside the
//! value union. Shapes outside it fail with
//! [`CodecError::UnsupportedType`] instead of being coerced:
//! raw byte strings, map keys that are not strings (integers, booleans
//! and chars are stringified), integers that do not fit `i64`, and
//! sequences that cannot state their length (lazy iterators). Runaway
//! nesting, including reference cycles, stops at [`MAX_DEPTH`].

use crate::encoder::encode;
use crate::error::{CodecError, CodecResult};
use crate::value::{Map, Number, Value};
use crate::MAX_DEPTH;
use serde::ser::{self, Serialize, SerializeMap as _, Serializer};

/// Convert any serializable value into a [`Value`].
///
/// # Errors
///
/// See the module documentation.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> CodecResult<Value> {
    value.serialize(ValueSerializer { depth: 0 })
}

/// Serialize any serializable value straight to canonical text.
///
/// # Errors
///
/// Fails like [`to_value`] followed by [`encode`].
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> CodecResult<String> {
    encode(&to_value(value)?)
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(n) => serializer.serialize_i64(*n),
            Number::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

/// Serializer producing a [`Value`].
#[derive(Debug, Clone, Copy)]
struct ValueSerializer {
    depth: usize,
}

impl ValueSerializer {
    fn nested(self) -> CodecResult<Self> {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::RecursionLimit { limit: MAX_DEPTH });
        }
        Ok(Self {
            depth: self.depth + 1,
        })
    }
}

fn int<T: TryInto<i64>>(n: T, type_name: &str) -> CodecResult<Value> {
    n.try_into()
        .map(|n| Value::Number(Number::Int(n)))
        .map_err(|_| CodecError::unsupported_type(format!("{type_name} outside the i64 range")))
}

fn float(f: f64) -> CodecResult<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(CodecError::NonFiniteNumber)
}

fn tagged(variant: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(variant.to_string(), value);
    Value::Object(map)
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = CodecError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = MapBuilder;

    fn serialize_bool(self, v: bool) -> CodecResult<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> CodecResult<Value> {
        int(v, "i8")
    }

    fn serialize_i16(self, v: i16) -> CodecResult<Value> {
        int(v, "i16")
    }

    fn serialize_i32(self, v: i32) -> CodecResult<Value> {
        int(v, "i32")
    }

    fn serialize_i64(self, v: i64) -> CodecResult<Value> {
        int(v, "i64")
    }

    fn serialize_i128(self, v: i128) -> CodecResult<Value> {
        int(v, "i128")
    }

    fn serialize_u8(self, v: u8) -> CodecResult<Value> {
        int(v, "u8")
    }

    fn serialize_u16(self, v: u16) -> CodecResult<Value> {
        int(v, "u16")
    }

    fn serialize_u32(self, v: u32) -> CodecResult<Value> {
        int(v, "u32")
    }

    fn serialize_u64(self, v: u64) -> CodecResult<Value> {
        int(v, "u64")
    }

    fn serialize_u128(self, v: u128) -> CodecResult<Value> {
        int(v, "u128")
    }

    fn serialize_f32(self, v: f32) -> CodecResult<Value> {
        float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> CodecResult<Value> {
        float(v)
    }

    fn serialize_char(self, v: char) -> CodecResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> CodecResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> CodecResult<Value> {
        Err(CodecError::unsupported_type("bytes"))
    }

    fn serialize_none(self) -> CodecResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> CodecResult<Value> {
        value.serialize(self.nested()?)
    }

    fn serialize_unit(self) -> CodecResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> CodecResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> CodecResult<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> CodecResult<Value> {
        value.serialize(self.nested()?)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> CodecResult<Value> {
        Ok(tagged(variant, value.serialize(self.nested()?)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> CodecResult<SeqBuilder> {
        let len = len.ok_or_else(|| CodecError::unsupported_type("sequence of unknown length"))?;
        SeqBuilder::new(self, len, None)
    }

    fn serialize_tuple(self, len: usize) -> CodecResult<SeqBuilder> {
        SeqBuilder::new(self, len, None)
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> CodecResult<SeqBuilder> {
        SeqBuilder::new(self, len, None)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> CodecResult<SeqBuilder> {
        SeqBuilder::new(self, len, Some(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> CodecResult<MapBuilder> {
        MapBuilder::new(self, None)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> CodecResult<MapBuilder> {
        MapBuilder::new(self, None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> CodecResult<MapBuilder> {
        MapBuilder::new(self, Some(variant))
    }
}

/// Collects sequence-like shapes into an array.
struct SeqBuilder {
    inner: ValueSerializer,
    items: Vec<Value>,
    variant: Option<&'static str>,
}

impl SeqBuilder {
    fn new(outer: ValueSerializer, len: usize, variant: Option<&'static str>) -> CodecResult<Self> {
        Ok(Self {
            inner: outer.nested()?,
            items: Vec::with_capacity(len.min(4096)),
            variant,
        })
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        self.items.push(value.serialize(self.inner)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let array = Value::Array(self.items);
        match self.variant {
            Some(variant) => tagged(variant, array),
            None => array,
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        self.push(value)
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        self.push(value)
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        self.push(value)
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        self.push(value)
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

/// Collects map-like shapes into an object.
struct MapBuilder {
    inner: ValueSerializer,
    map: Map,
    pending_key: Option<String>,
    variant: Option<&'static str>,
}

impl MapBuilder {
    fn new(outer: ValueSerializer, variant: Option<&'static str>) -> CodecResult<Self> {
        Ok(Self {
            inner: outer.nested()?,
            map: Map::new(),
            pending_key: None,
            variant,
        })
    }

    fn finish(self) -> Value {
        let object = Value::Object(self.map);
        match self.variant {
            Some(variant) => tagged(variant, object),
            None => object,
        }
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> CodecResult<()> {
        self.pending_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| ser::Error::custom("map value serialized before its key"))?;
        let value = value.serialize(self.inner)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> CodecResult<()> {
        let value = value.serialize(self.inner)?;
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for MapBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> CodecResult<()> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> CodecResult<Value> {
        Ok(self.finish())
    }
}

/// Accepts only key shapes that have a faithful string form.
struct MapKeySerializer;

fn key_unsupported(shape: &str) -> CodecError {
    CodecError::unsupported_type(format!("{shape} as map key"))
}

impl Serializer for MapKeySerializer {
    type Ok = String;
    type Error = CodecError;

    type SerializeSeq = ser::Impossible<String, CodecError>;
    type SerializeTuple = ser::Impossible<String, CodecError>;
    type SerializeTupleStruct = ser::Impossible<String, CodecError>;
    type SerializeTupleVariant = ser::Impossible<String, CodecError>;
    type SerializeMap = ser::Impossible<String, CodecError>;
    type SerializeStruct = ser::Impossible<String, CodecError>;
    type SerializeStructVariant = ser::Impossible<String, CodecError>;

    fn serialize_bool(self, v: bool) -> CodecResult<String> {
        Ok(if v { "true" } else { "false" }.to_string())
    }

    fn serialize_i8(self, v: i8) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> CodecResult<String> {
        Err(key_unsupported("float"))
    }

    fn serialize_f64(self, _v: f64) -> CodecResult<String> {
        Err(key_unsupported("float"))
    }

    fn serialize_char(self, v: char) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> CodecResult<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> CodecResult<String> {
        Err(key_unsupported("bytes"))
    }

    fn serialize_none(self) -> CodecResult<String> {
        Err(key_unsupported("none"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> CodecResult<String> {
        Err(key_unsupported("option"))
    }

    fn serialize_unit(self) -> CodecResult<String> {
        Err(key_unsupported("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> CodecResult<String> {
        Err(key_unsupported("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> CodecResult<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> CodecResult<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> CodecResult<String> {
        Err(key_unsupported("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> CodecResult<Self::SerializeSeq> {
        Err(key_unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> CodecResult<Self::SerializeTuple> {
        Err(key_unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> CodecResult<Self::SerializeTupleStruct> {
        Err(key_unsupported("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> CodecResult<Self::SerializeTupleVariant> {
        Err(key_unsupported("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> CodecResult<Self::SerializeMap> {
        Err(key_unsupported("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> CodecResult<Self::SerializeStruct> {
        Err(key_unsupported("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> CodecResult<Self::SerializeStructVariant> {
        Err(key_unsupported("enum"))
    }
}
