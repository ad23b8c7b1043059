/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Scalar conversion between wire text and typed values.
//!
//! | type | wire |
//! |------|------|
//! | boolean | `Y`/`N` (`1`/`0` accepted on decode) |
//! | char | exactly one character |
//! | byte, short, int, long | optional sign and digits, range-checked |
//! | float, double, decimal | optional sign, digits, at most one `.` |
//! | date | `YYYYMMDD` |
//! | time | `HH:MM:SS[.sss[sss]]` |
//! | date-time | `YYYYMMDD-HH:MM:SS[.sss[sss]]` |

use crate::options::CodecOptions;
use fixtree_core::error::{DecodeError, EncodeError};
use fixtree_core::time::{self, TimePrecision};
use fixtree_core::value::{Scalar, ValueType};
use fixtree_dictionary::schema::{FieldDescriptor, attributes};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts a raw wire value into a scalar.
///
/// # Errors
/// Returns `DecodeError::InvalidFieldValue` if `raw` does not parse as the
/// field's declared type.
pub fn decode_scalar(
    field: &FieldDescriptor,
    message: &str,
    raw: &str,
    options: &CodecOptions,
) -> Result<Scalar, DecodeError> {
    if options.ignore_field_type {
        return Ok(Scalar::String(raw.to_string()));
    }
    if options.symbolic_enums {
        if let Some(name) = field.enum_name(raw) {
            return Ok(Scalar::String(name.to_string()));
        }
    }

    parse_typed(field.value_type, raw).map_err(|reason| DecodeError::InvalidFieldValue {
        tag: field.tag.unwrap_or_default(),
        field: field.name.clone(),
        message: message.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    })
}

fn parse_typed(value_type: ValueType, raw: &str) -> Result<Scalar, &'static str> {
    match value_type {
        ValueType::Boolean => match raw {
            "Y" | "1" => Ok(Scalar::Bool(true)),
            "N" | "0" => Ok(Scalar::Bool(false)),
            _ => Err("expected Y or N"),
        },
        ValueType::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Scalar::Char(c)),
                _ => Err("expected exactly one character"),
            }
        }
        ValueType::Byte => parse_int(raw).map(Scalar::Byte),
        ValueType::Short => parse_int(raw).map(Scalar::Short),
        ValueType::Int => parse_int(raw).map(Scalar::Int),
        ValueType::Long => parse_int(raw).map(Scalar::Long),
        ValueType::Float => parse_float(raw).map(Scalar::Float),
        ValueType::Double => parse_float(raw).map(Scalar::Double),
        ValueType::Decimal => {
            if !is_decimal_text(raw) {
                return Err("expected a decimal number");
            }
            Decimal::from_str(raw)
                .map(Scalar::Decimal)
                .map_err(|_| "decimal out of range")
        }
        ValueType::String => Ok(Scalar::String(raw.to_string())),
        ValueType::Date => time::parse_date(raw)
            .map(Scalar::Date)
            .ok_or("expected YYYYMMDD"),
        ValueType::Time => time::parse_time(raw)
            .map(Scalar::Time)
            .ok_or("expected HH:MM:SS[.fff]"),
        ValueType::DateTime => time::parse_datetime(raw)
            .map(Scalar::DateTime)
            .ok_or("expected YYYYMMDD-HH:MM:SS[.fff]"),
        ValueType::Complex => Err("complex field carries no scalar value"),
    }
}

fn parse_int<T: FromStr>(raw: &str) -> Result<T, &'static str> {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected an integer");
    }
    raw.parse().map_err(|_| "integer out of range")
}

fn parse_float<T: FromStr>(raw: &str) -> Result<T, &'static str> {
    if !is_decimal_text(raw) {
        return Err("expected a decimal number");
    }
    raw.parse().map_err(|_| "expected a decimal number")
}

fn is_decimal_text(raw: &str) -> bool {
    let body = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Converts a scalar into wire text.
///
/// Enum fields accept their symbolic names. Decimal fields also accept
/// float and double values. Timestamps drop fractional seconds when the
/// field carries the `SecondsOnly` attribute. With `ignore_field_type`,
/// string values pass through verbatim whatever the declared type.
///
/// # Errors
/// Returns `EncodeError::TypeMismatch` if the scalar's type disagrees with
/// the declared type, or `EncodeError::InvalidFieldValue` for non-finite
/// floating point values.
pub fn encode_scalar(
    field: &FieldDescriptor,
    message: &str,
    value: &Scalar,
    options: &CodecOptions,
) -> Result<String, EncodeError> {
    if let Some(wire) = value.as_str().and_then(|name| field.enum_value(name)) {
        return Ok(wire.to_string());
    }
    if let (true, Scalar::String(raw)) = (options.ignore_field_type, value) {
        return Ok(raw.clone());
    }

    let precision = if field.has_flag(attributes::SECONDS_ONLY) {
        TimePrecision::Seconds
    } else {
        options.precision()
    };

    let text = match (field.value_type, value) {
        (ValueType::Boolean, Scalar::Bool(v)) => (if *v { "Y" } else { "N" }).to_string(),
        (ValueType::Char, Scalar::Char(c)) => c.to_string(),
        (ValueType::Byte, Scalar::Byte(v)) => v.to_string(),
        (ValueType::Short, Scalar::Short(v)) => v.to_string(),
        (ValueType::Int, Scalar::Int(v)) => v.to_string(),
        (ValueType::Long, Scalar::Long(v)) => v.to_string(),
        (ValueType::Float | ValueType::Decimal, Scalar::Float(v)) => {
            finite(field, message, f64::from(*v))?;
            v.to_string()
        }
        (ValueType::Double | ValueType::Decimal, Scalar::Double(v)) => {
            finite(field, message, *v)?;
            v.to_string()
        }
        (ValueType::Decimal, Scalar::Decimal(v)) => v.to_string(),
        (ValueType::String, Scalar::String(s)) => s.clone(),
        (ValueType::Date, Scalar::Date(d)) => time::format_date(d).to_string(),
        (ValueType::Time, Scalar::Time(t)) => time::format_time(t, precision).to_string(),
        (ValueType::DateTime, Scalar::DateTime(dt)) => {
            time::format_datetime(dt, precision).to_string()
        }
        (expected, found) => {
            return Err(EncodeError::TypeMismatch {
                field: field.name.clone(),
                message: message.to_string(),
                expected: expected.as_str().to_string(),
                found: found.value_type().as_str().to_string(),
            });
        }
    };
    Ok(text)
}

fn finite(field: &FieldDescriptor, message: &str, value: f64) -> Result<(), EncodeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EncodeError::InvalidFieldValue {
            field: field.name.clone(),
            message: message.to_string(),
            reason: format!("{} has no wire representation", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn side() -> FieldDescriptor {
        FieldDescriptor::field("Side", 54, ValueType::Char)
            .with_value("1", "Buy")
            .with_value("2", "Sell")
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_micro_opt(9, 30, 15, 123_456)
            .unwrap()
    }

    #[test]
    fn test_decode_enum_symbolic_and_typed() {
        let options = CodecOptions::default();
        assert_eq!(
            decode_scalar(&side(), "Order", "1", &options).unwrap(),
            Scalar::String("Buy".to_string())
        );
        // Undeclared enum values fall back to the typed scalar.
        assert_eq!(
            decode_scalar(&side(), "Order", "7", &options).unwrap(),
            Scalar::Char('7')
        );
        let typed = options.with_symbolic_enums(false);
        assert_eq!(
            decode_scalar(&side(), "Order", "1", &typed).unwrap(),
            Scalar::Char('1')
        );
    }

    #[test]
    fn test_decode_booleans() {
        let field = FieldDescriptor::field("PossDupFlag", 43, ValueType::Boolean);
        let options = CodecOptions::default();
        for (raw, expected) in [("Y", true), ("1", true), ("N", false), ("0", false)] {
            assert_eq!(
                decode_scalar(&field, "header", raw, &options).unwrap(),
                Scalar::Bool(expected)
            );
        }
        assert!(decode_scalar(&field, "header", "yes", &options).is_err());
    }

    #[test]
    fn test_decode_integer_width_is_checked() {
        let options = CodecOptions::default();
        let byte = FieldDescriptor::field("Small", 9000, ValueType::Byte);
        assert_eq!(
            decode_scalar(&byte, "M", "-128", &options).unwrap(),
            Scalar::Byte(-128)
        );
        match decode_scalar(&byte, "M", "128", &options) {
            Err(DecodeError::InvalidFieldValue {
                tag, value, reason, ..
            }) => {
                assert_eq!(tag, 9000);
                assert_eq!(value, "128");
                assert_eq!(reason, "integer out of range");
            }
            other => panic!("unexpected {:?}", other),
        }

        let int = FieldDescriptor::field("Qty", 38, ValueType::Int);
        assert!(decode_scalar(&int, "M", "1e3", &options).is_err());
        assert!(decode_scalar(&int, "M", "", &options).is_err());
        assert_eq!(
            decode_scalar(&int, "M", "+42", &options).unwrap(),
            Scalar::Int(42)
        );
    }

    #[test]
    fn test_decode_decimal_and_double() {
        let options = CodecOptions::default();
        let price = FieldDescriptor::field("Price", 44, ValueType::Decimal);
        assert_eq!(
            decode_scalar(&price, "M", "101.25", &options).unwrap(),
            Scalar::Decimal(Decimal::new(10125, 2))
        );
        assert!(decode_scalar(&price, "M", "NaN", &options).is_err());
        assert!(decode_scalar(&price, "M", "1.2.3", &options).is_err());

        let px = FieldDescriptor::field("Px", 9001, ValueType::Double);
        assert_eq!(
            decode_scalar(&px, "M", "-0.5", &options).unwrap(),
            Scalar::Double(-0.5)
        );
        assert!(decode_scalar(&px, "M", "inf", &options).is_err());
    }

    #[test]
    fn test_decode_temporal() {
        let options = CodecOptions::default();
        let field = FieldDescriptor::field("SendingTime", 52, ValueType::DateTime);
        assert_eq!(
            decode_scalar(&field, "header", "20240305-09:30:15.123456", &options).unwrap(),
            Scalar::DateTime(stamp())
        );
        assert!(decode_scalar(&field, "header", "20240305", &options).is_err());
    }

    #[test]
    fn test_ignore_field_type_keeps_text() {
        let options = CodecOptions::default().with_ignore_field_type(true);
        let field = FieldDescriptor::field("Qty", 38, ValueType::Int);
        assert_eq!(
            decode_scalar(&field, "M", "abc", &options).unwrap(),
            Scalar::String("abc".to_string())
        );
    }

    #[test]
    fn test_encode_enum_name_and_typed_value() {
        assert_eq!(
            encode_scalar(&side(), "Order", &Scalar::from("Sell"), &CodecOptions::default()).unwrap(),
            "2"
        );
        assert_eq!(
            encode_scalar(&side(), "Order", &Scalar::Char('1'), &CodecOptions::default()).unwrap(),
            "1"
        );
        assert!(matches!(
            encode_scalar(&side(), "Order", &Scalar::from("Hold"), &CodecOptions::default()),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_type_mismatch_names_field() {
        let field = FieldDescriptor::field("Qty", 38, ValueType::Int);
        let err = encode_scalar(&field, "Order", &Scalar::from("ten"), &CodecOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::TypeMismatch {
                field: "Qty".to_string(),
                message: "Order".to_string(),
                expected: "int".to_string(),
                found: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_encode_decimal_accepts_double() {
        let field = FieldDescriptor::field("Price", 44, ValueType::Decimal);
        assert_eq!(
            encode_scalar(&field, "M", &Scalar::Double(101.5), &CodecOptions::default()).unwrap(),
            "101.5"
        );
        assert_eq!(
            encode_scalar(
                &field,
                "M",
                &Scalar::Decimal(Decimal::new(10125, 2)),
                &CodecOptions::default()
            )
            .unwrap(),
            "101.25"
        );
        assert!(matches!(
            encode_scalar(&field, "M", &Scalar::Double(f64::NAN), &CodecOptions::default()),
            Err(EncodeError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_encode_precision_and_seconds_only() {
        let field = FieldDescriptor::field("SendingTime", 52, ValueType::DateTime);
        let value = Scalar::DateTime(stamp());
        assert_eq!(
            encode_scalar(&field, "header", &value, &CodecOptions::default()).unwrap(),
            "20240305-09:30:15.123"
        );
        assert_eq!(
            encode_scalar(&field, "header", &value, &CodecOptions::default().with_microseconds(true)).unwrap(),
            "20240305-09:30:15.123456"
        );

        let seconds_only = field.with_attribute(attributes::SECONDS_ONLY, "true");
        assert_eq!(
            encode_scalar(&seconds_only, "header", &value, &CodecOptions::default().with_microseconds(true)).unwrap(),
            "20240305-09:30:15"
        );
    }

    #[test]
    fn test_encode_boolean() {
        let field = FieldDescriptor::field("PossDupFlag", 43, ValueType::Boolean);
        assert_eq!(
            encode_scalar(&field, "header", &Scalar::Bool(false), &CodecOptions::default()).unwrap(),
            "N"
        );
    }

    #[test]
    fn test_encode_ignore_field_type_passes_strings_through() {
        let qty = FieldDescriptor::field("OrderQty", 38, ValueType::Decimal);
        let raw = CodecOptions::default().with_ignore_field_type(true);

        assert_eq!(
            encode_scalar(&qty, "Order", &Scalar::from("100"), &raw).unwrap(),
            "100"
        );
        assert_eq!(
            encode_scalar(&qty, "Order", &Scalar::Decimal(Decimal::new(5, 1)), &raw).unwrap(),
            "0.5"
        );
        assert!(matches!(
            encode_scalar(&qty, "Order", &Scalar::from("100"), &CodecOptions::default()),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }
}
