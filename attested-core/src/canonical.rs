//! Deterministic JSON canonicalization (RFC 8785 / JCS, restricted field set).
//!
//! The core only ever canonicalizes a message's signable view: eight named
//! string/integer fields (see [`crate::message`]). That restriction lets this
//! module sidestep JCS's floating-point formatting rules entirely — numbers
//! here are always `seq`, a non-negative integer bounded by
//! [`MAX_SAFE_INTEGER`]. Object keys are sorted by UTF-16 code-unit order
//! (not byte order, though for the ASCII field names the core uses the two
//! coincide) and the output carries no insignificant whitespace.
//!
//! RULE: the signed bytes and the chain-linking digest are both computed
//! over `canonical_json`'s output, never over whatever JSON style a producer
//! happened to serialize with on the wire.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Largest integer JCS can round-trip through an IEEE-754 double (`2^53 - 1`).
pub const MAX_SAFE_INTEGER: u64 = (1u64 << 53) - 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonicalizationError {
    #[error("number {0} exceeds the safe integer range (0..=2^53-1)")]
    UnsafeInteger(i128),
    #[error("non-finite or non-integer number is not representable")]
    NonFiniteNumber,
    #[error("value must serialize to a JSON object")]
    NotAnObject,
}

/// Canonicalize any `Serialize` value whose JSON form is an object containing
/// only strings, integers, booleans, null, and (recursively) the same.
pub fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalizationError> {
    let v = serde_json::to_value(value).map_err(|_| CanonicalizationError::NotAnObject)?;
    let mut out = String::new();
    write_canonical(&v, &mut out)?;
    Ok(out.into_bytes())
}

/// Canonicalize an already-built [`serde_json::Value`].
pub fn canonical_json(value: &Value) -> Result<String, CanonicalizationError> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_canonical_number(n, out)?,
        Value::String(s) => {
            // serde_json's string escaping matches JCS's minimal-escaping rules
            // (lowercase \uXXXX for control characters, no unnecessary escapes).
            out.push_str(&serde_json::to_string(s).expect("string serialization cannot fail"));
        }
        Value::Array(arr) => {
            out.push('[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            // serde_json::Map preserves insertion order; JCS requires sorting
            // by UTF-16 code-unit order, so we sort explicitly.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| {
                a.encode_utf16()
                    .collect::<Vec<u16>>()
                    .cmp(&b.encode_utf16().collect::<Vec<u16>>())
            });

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(*key).expect("key serialization cannot fail"));
                out.push(':');
                write_canonical(&map[*key], out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_canonical_number(n: &serde_json::Number, out: &mut String) -> Result<(), CanonicalizationError> {
    if let Some(u) = n.as_u64() {
        if u > MAX_SAFE_INTEGER {
            return Err(CanonicalizationError::UnsafeInteger(u as i128));
        }
        out.push_str(&u.to_string());
        return Ok(());
    }
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() > MAX_SAFE_INTEGER {
            return Err(CanonicalizationError::UnsafeInteger(i as i128));
        }
        out.push_str(&i.to_string());
        return Ok(());
    }
    // Only integers appear in the signable view the core builds; anything
    // else (float, NaN, infinity) is out of scope by construction.
    Err(CanonicalizationError::NonFiniteNumber)
}
