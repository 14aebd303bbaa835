//! Session record wire format.
//!
//! The Identity Service stores each session as base64 text wrapping a
//! serialized mapping. This module is the only place that format is known.
//! Decoding fails closed: anything that is not a string-keyed mapping of
//! plain data is rejected rather than interpreted.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use serde_pickle::{DeOptions, HashableValue, SerOptions, Value as PickleValue};

use crate::error::DecodeError;
use crate::pickle_guard;
use crate::record::SessionRecord;

/// Deepest nesting accepted inside a session payload.
pub const MAX_DEPTH: usize = 16;

/// Largest stored record, in bytes of base64 text, accepted by default.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Serialization the Identity Service uses for session payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEncoding {
    /// base64 of a Python pickle of a `dict`.
    #[default]
    Pickle,
    /// base64 of a JSON object.
    Json,
}

impl std::str::FromStr for SessionEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pickle" => Ok(Self::Pickle),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown session encoding '{other}'")),
        }
    }
}

/// Encoder/decoder for stored session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCodec {
    encoding: SessionEncoding,
    max_payload_len: usize,
}

impl Default for SessionCodec {
    fn default() -> Self {
        Self::new(SessionEncoding::default())
    }
}

impl SessionCodec {
    /// Creates a codec for the given encoding.
    #[must_use]
    pub const fn new(encoding: SessionEncoding) -> Self {
        Self {
            encoding,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    /// Sets the largest stored record accepted by [`decode`](Self::decode).
    #[must_use]
    pub const fn with_max_payload_len(self, max_payload_len: usize) -> Self {
        Self {
            max_payload_len,
            ..self
        }
    }

    /// Returns the configured encoding.
    #[must_use]
    pub const fn encoding(&self) -> SessionEncoding {
        self.encoding
    }

    /// Returns the largest stored record accepted, in bytes.
    #[must_use]
    pub const fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Decodes raw store bytes into a validated record.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for an oversized record, malformed base64,
    /// a malformed or class-referencing payload, or a payload outside the
    /// accepted shape.
    pub fn decode(&self, raw: &[u8]) -> Result<SessionRecord, DecodeError> {
        let raw = raw.trim_ascii();
        if raw.len() > self.max_payload_len {
            return Err(DecodeError::TooLarge {
                len: raw.len(),
                max: self.max_payload_len,
            });
        }
        let payload = BASE64.decode(raw)?;

        let entries = match self.encoding {
            SessionEncoding::Pickle => {
                // Shape is checked before any value is built.
                pickle_guard::check_structure(&payload)?;
                let value = serde_pickle::value_from_slice(&payload, DeOptions::new())
                    .map_err(|e| DecodeError::Pickle(e.to_string()))?;
                match value {
                    PickleValue::Dict(map) => pickle_dict(map, 1)?,
                    other => return Err(DecodeError::NotAMapping(pickle_kind(&other))),
                }
            }
            SessionEncoding::Json => match serde_json::from_slice::<Value>(&payload)? {
                Value::Object(map) => {
                    for value in map.values() {
                        check_depth(value, 1)?;
                    }
                    map.into_iter().collect()
                }
                other => return Err(DecodeError::NotAMapping(json_kind(&other))),
            },
        };

        Ok(SessionRecord::from(entries))
    }

    /// Encodes a record the way the Identity Service writes it.
    ///
    /// Pickle output uses protocol 3. Lists come back as lists; tuples and
    /// sets are not produced.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Encode`] for values the wire format cannot carry.
    pub fn encode(&self, record: &SessionRecord) -> Result<Vec<u8>, DecodeError> {
        let payload = match self.encoding {
            SessionEncoding::Pickle => {
                let mut dict = BTreeMap::new();
                for (key, value) in record.iter() {
                    dict.insert(HashableValue::String(key.clone()), json_to_pickle(value)?);
                }
                serde_pickle::value_to_vec(&PickleValue::Dict(dict), SerOptions::new())
                    .map_err(|e| DecodeError::Encode(e.to_string()))?
            }
            SessionEncoding::Json => {
                serde_json::to_vec(record).map_err(|e| DecodeError::Encode(e.to_string()))?
            }
        };

        Ok(BASE64.encode(payload).into_bytes())
    }
}

fn pickle_dict(
    map: BTreeMap<HashableValue, PickleValue>,
    depth: usize,
) -> Result<BTreeMap<String, Value>, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::TooDeep(MAX_DEPTH));
    }
    map.into_iter()
        .map(|(key, value)| match key {
            HashableValue::String(key) => Ok((key, pickle_to_json(value, depth)?)),
            _ => Err(DecodeError::NonStringKey),
        })
        .collect()
}

fn pickle_to_json(value: PickleValue, depth: usize) -> Result<Value, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::TooDeep(MAX_DEPTH));
    }
    let value = match value {
        PickleValue::None => Value::Null,
        PickleValue::Bool(b) => Value::Bool(b),
        PickleValue::I64(n) => Value::from(n),
        PickleValue::F64(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or(DecodeError::UnsupportedValue("non-finite float"))?,
        PickleValue::String(s) => Value::String(s),
        PickleValue::List(items) | PickleValue::Tuple(items) => Value::Array(
            items
                .into_iter()
                .map(|item| pickle_to_json(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        PickleValue::Set(items) | PickleValue::FrozenSet(items) => Value::Array(
            items
                .into_iter()
                .map(|item| pickle_to_json(item.into_value(), depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        PickleValue::Dict(map) => {
            Value::Object(pickle_dict(map, depth + 1)?.into_iter().collect())
        }
        other => return Err(DecodeError::UnsupportedValue(pickle_kind(&other))),
    };
    Ok(value)
}

fn json_to_pickle(value: &Value) -> Result<PickleValue, DecodeError> {
    let value = match value {
        Value::Null => PickleValue::None,
        Value::Bool(b) => PickleValue::Bool(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => PickleValue::I64(i),
            (None, Some(f)) if n.is_f64() => PickleValue::F64(f),
            _ => return Err(DecodeError::Encode(format!("integer out of range: {n}"))),
        },
        Value::String(s) => PickleValue::String(s.clone()),
        Value::Array(items) => PickleValue::List(
            items
                .iter()
                .map(json_to_pickle)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut dict = BTreeMap::new();
            for (key, value) in map {
                dict.insert(HashableValue::String(key.clone()), json_to_pickle(value)?);
            }
            PickleValue::Dict(dict)
        }
    };
    Ok(value)
}

fn check_depth(value: &Value, depth: usize) -> Result<(), DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::TooDeep(MAX_DEPTH));
    }
    match value {
        Value::Array(items) => items.iter().try_for_each(|v| check_depth(v, depth + 1)),
        Value::Object(map) => map.values().try_for_each(|v| check_depth(v, depth + 1)),
        _ => Ok(()),
    }
}

fn pickle_kind(value: &PickleValue) -> &'static str {
    match value {
        PickleValue::None => "None",
        PickleValue::Bool(_) => "bool",
        PickleValue::I64(_) => "int",
        PickleValue::Int(_) => "big integer",
        PickleValue::F64(_) => "float",
        PickleValue::Bytes(_) => "bytes",
        PickleValue::String(_) => "str",
        PickleValue::List(_) => "list",
        PickleValue::Tuple(_) => "tuple",
        PickleValue::Set(_) => "set",
        PickleValue::FrozenSet(_) => "frozenset",
        PickleValue::Dict(_) => "dict",
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
