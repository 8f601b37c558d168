//! Quantity and byte-string codecs.
//!
//! Quantities travel as lowercase `0x`-prefixed hex strings. Natively they are
//! unsigned integers of at most 256 bits: values up to `u64::MAX` become JSON
//! numbers, larger ones decimal strings.

use alloy_primitives::U256;
use chaindispatch_core::FormatError;
use serde_json::Value;

/// Block tags accepted wherever a block number is.
pub const BLOCK_TAGS: &[&str] = &["latest", "earliest", "pending", "safe", "finalized"];

/// Parse a base-16 quantity (with or without `0x`).
pub fn hex_to_integer(value: &str) -> Result<U256, FormatError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FormatError::InvalidHex(value.to_string()));
    }
    U256::from_str_radix(digits, 16).map_err(|_| FormatError::Overflow(value.to_string()))
}

/// Render an integer as a lowercase `0x`-prefixed quantity.
pub fn hex(value: U256) -> String {
    format!("0x{value:x}")
}

/// Convert an integer to its native JSON form.
pub fn integer_to_value(value: U256) -> Value {
    match u64::try_from(value) {
        Ok(small) => Value::from(small),
        Err(_) => Value::String(value.to_string()),
    }
}

/// Read a native integer: a JSON number, a decimal string or a hex quantity.
pub fn value_to_integer(value: &Value) -> Result<U256, FormatError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| FormatError::TypeMismatch {
                expected: "unsigned integer",
                got: n.to_string(),
            }),
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => hex_to_integer(s),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            U256::from_str_radix(s, 10).map_err(|_| FormatError::Overflow(s.clone()))
        }
        other => Err(FormatError::mismatch("integer", other)),
    }
}

/// Hex quantity string → native integer. Numbers are already native.
pub fn to_integer(value: Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => Ok(integer_to_value(hex_to_integer(&s)?)),
        n @ Value::Number(_) => Ok(n),
        other => Err(FormatError::mismatch("hex quantity", &other)),
    }
}

/// Native integer → hex quantity. Hex strings pass through.
pub fn to_hex_quantity(value: Value) -> Result<Value, FormatError> {
    if let Value::String(s) = &value {
        if s.starts_with("0x") || s.starts_with("0X") {
            hex_to_integer(s)?;
            return Ok(value);
        }
    }
    Ok(Value::String(hex(value_to_integer(&value)?)))
}

/// Block number or tag → wire form. Tags pass through unchanged.
pub fn quantity_or_tag(value: Value) -> Result<Value, FormatError> {
    match &value {
        Value::String(s) if BLOCK_TAGS.contains(&s.as_str()) => Ok(value),
        _ => to_hex_quantity(value),
    }
}

/// Byte string → ASCII text.
///
/// Accepts a string that is already ASCII, or an array of byte values.
pub fn to_ascii(value: Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) if s.is_ascii() => Ok(Value::String(s)),
        Value::String(s) => Err(FormatError::NotAscii(s)),
        Value::Array(items) => {
            let bytes = items
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| FormatError::mismatch("byte array", &Value::Array(items.clone())))?;
            if !bytes.is_ascii() {
                return Err(FormatError::NotAscii(format!("{bytes:?}")));
            }
            // ASCII is valid UTF-8.
            Ok(Value::String(bytes.into_iter().map(char::from).collect()))
        }
        other => Err(FormatError::mismatch("byte string", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_small_and_boundary_values() {
        let samples = [
            U256::ZERO,
            U256::from(1u64),
            U256::from(255u64),
            U256::from(0x1234_5678u64),
            U256::from(u64::MAX),
            U256::from(u64::MAX) + U256::from(1u64),
            U256::MAX,
        ];
        for n in samples {
            assert_eq!(hex_to_integer(&hex(n)).unwrap(), n, "round trip of {n}");
        }
    }

    #[test]
    fn round_trip_powers_of_two() {
        for shift in 0..256 {
            let n = U256::from(1u64) << shift;
            assert_eq!(hex_to_integer(&hex(n)).unwrap(), n);
            let m = n - U256::from(1u64);
            assert_eq!(hex_to_integer(&hex(m)).unwrap(), m);
        }
    }

    #[test]
    fn hex_is_lowercase_prefixed() {
        assert_eq!(hex(U256::ZERO), "0x0");
        assert_eq!(hex(U256::from(0xABCDu64)), "0xabcd");
    }

    #[test]
    fn parse_accepts_prefix_variants() {
        assert_eq!(hex_to_integer("0x1f").unwrap(), U256::from(31u64));
        assert_eq!(hex_to_integer("0X1F").unwrap(), U256::from(31u64));
        assert_eq!(hex_to_integer("ff").unwrap(), U256::from(255u64));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(hex_to_integer("0x"), Err(FormatError::InvalidHex(_))));
        assert!(matches!(hex_to_integer("0xzz"), Err(FormatError::InvalidHex(_))));
        let too_big = format!("0x1{}", "0".repeat(64));
        assert!(matches!(hex_to_integer(&too_big), Err(FormatError::Overflow(_))));
    }

    #[test]
    fn large_integers_become_decimal_strings() {
        assert_eq!(to_integer(json!("0x3b9aca00")).unwrap(), json!(1_000_000_000u64));
        let big = to_integer(json!("0x10000000000000000")).unwrap();
        assert_eq!(big, json!("18446744073709551616"));
        // and back
        assert_eq!(to_hex_quantity(big).unwrap(), json!("0x10000000000000000"));
    }

    #[test]
    fn to_hex_quantity_inputs() {
        assert_eq!(to_hex_quantity(json!(21000)).unwrap(), json!("0x5208"));
        assert_eq!(to_hex_quantity(json!("21000")).unwrap(), json!("0x5208"));
        assert_eq!(to_hex_quantity(json!("0x5208")).unwrap(), json!("0x5208"));
        assert!(to_hex_quantity(json!(-1)).is_err());
        assert!(to_hex_quantity(json!(1.5)).is_err());
        assert!(to_hex_quantity(json!(null)).is_err());
    }

    #[test]
    fn block_tags_pass_through() {
        for tag in BLOCK_TAGS {
            assert_eq!(quantity_or_tag(json!(tag)).unwrap(), json!(tag));
        }
        assert_eq!(quantity_or_tag(json!(4096)).unwrap(), json!("0x1000"));
        assert!(quantity_or_tag(json!("newest")).is_err());
    }

    #[test]
    fn ascii_conversion() {
        assert_eq!(to_ascii(json!("0xabc")).unwrap(), json!("0xabc"));
        assert_eq!(to_ascii(json!([48, 120, 49])).unwrap(), json!("0x1"));
        assert!(matches!(to_ascii(json!("héllo")), Err(FormatError::NotAscii(_))));
        assert!(matches!(to_ascii(json!([200])), Err(FormatError::NotAscii(_))));
        assert!(to_ascii(json!([300])).is_err());
        assert!(to_ascii(json!(7)).is_err());
    }
}
