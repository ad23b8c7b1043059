/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Scalar value types.
//!
//! - [`ValueType`]: The declared type of a schema field
//! - [`Scalar`]: A typed leaf value held in a message tree

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a schema field.
///
/// `Complex` marks components and repeating groups; every other variant is a
/// scalar kind with a fixed wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    /// `Y`/`N` flag.
    Boolean,
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Exact decimal (prices, quantities, amounts).
    Decimal,
    /// Single character.
    Char,
    /// Free text.
    String,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time of day.
    DateTime,
    /// Component or repeating group.
    Complex,
}

impl ValueType {
    /// Returns the canonical lowercase name of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Complex => "complex",
        }
    }

    /// Returns true if this type represents a number.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }

    /// Returns true if this type represents a date, a time or both.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime)
    }
}

impl std::str::FromStr for ValueType {
    type Err = std::convert::Infallible;

    /// Creates a ValueType from a canonical name or a FIX dictionary type name.
    ///
    /// Unknown names map to `String`, as FIX treats unrecognised types as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "BYTE" => Self::Byte,
            "SHORT" => Self::Short,
            "INT" | "LENGTH" | "NUMINGROUP" | "TAGNUM" | "DAYOFMONTH" => Self::Int,
            "LONG" | "SEQNUM" => Self::Long,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "DECIMAL" | "QTY" | "QUANTITY" | "PRICE" | "PRICEOFFSET" | "AMT" | "AMOUNT"
            | "PERCENTAGE" => Self::Decimal,
            "CHAR" => Self::Char,
            "DATE" | "UTCDATEONLY" | "UTCDATE" | "LOCALMKTDATE" => Self::Date,
            "TIME" | "UTCTIMEONLY" => Self::Time,
            "DATE-TIME" | "DATETIME" | "UTCTIMESTAMP" => Self::DateTime,
            "COMPLEX" | "COMPONENT" | "GROUP" => Self::Complex,
            _ => Self::String,
        })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Boolean value.
    Bool(bool),
    /// 8-bit integer value.
    Byte(i8),
    /// 16-bit integer value.
    Short(i16),
    /// 32-bit integer value.
    Int(i32),
    /// 64-bit integer value.
    Long(i64),
    /// 32-bit float value.
    Float(f32),
    /// 64-bit float value.
    Double(f64),
    /// Decimal value.
    Decimal(Decimal),
    /// Single character value.
    Char(char),
    /// String value.
    String(String),
    /// Date value.
    Date(NaiveDate),
    /// Time of day value.
    Time(NaiveTime),
    /// Timestamp value.
    DateTime(NaiveDateTime),
}

impl Scalar {
    /// Returns the value type this scalar carries.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Boolean,
            Self::Byte(_) => ValueType::Byte,
            Self::Short(_) => ValueType::Short,
            Self::Int(_) => ValueType::Int,
            Self::Long(_) => ValueType::Long,
            Self::Float(_) => ValueType::Float,
            Self::Double(_) => ValueType::Double,
            Self::Decimal(_) => ValueType::Decimal,
            Self::Char(_) => ValueType::Char,
            Self::String(_) => ValueType::String,
            Self::Date(_) => ValueType::Date,
            Self::Time(_) => ValueType::Time,
            Self::DateTime(_) => ValueType::DateTime,
        }
    }

    /// Returns the value as a string, if it is a String variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a bool, if it is a Bool variant.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any integer variant widened to i64.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(*v as i64),
            Self::Short(v) => Some(*v as i64),
            Self::Int(v) => Some(*v as i64),
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a Decimal, if it is a Decimal variant.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a char, if it is a Char variant.
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a timestamp, if it is a DateTime variant.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", if *v { "Y" } else { "N" }),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Short(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Char(c) => write!(f, "{}", c),
            Self::String(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d.format("%Y%m%d")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y%m%d-%H:%M:%S%.f")),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    char => Char,
    String => String,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_value_type_from_fix_names() {
        assert_eq!("INT".parse::<ValueType>().unwrap(), ValueType::Int);
        assert_eq!("SEQNUM".parse::<ValueType>().unwrap(), ValueType::Long);
        assert_eq!("PRICE".parse::<ValueType>().unwrap(), ValueType::Decimal);
        assert_eq!(
            "UTCTIMESTAMP".parse::<ValueType>().unwrap(),
            ValueType::DateTime
        );
        assert_eq!("date-time".parse::<ValueType>().unwrap(), ValueType::DateTime);
        assert_eq!("MULTIPLECHARVALUE".parse::<ValueType>().unwrap(), ValueType::String);
    }

    #[test]
    fn test_value_type_serde_name() {
        let json = serde_json::to_string(&ValueType::DateTime).unwrap();
        assert_eq!(json, "\"date-time\"");
        let back: ValueType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ValueType::DateTime);
    }

    #[test]
    fn test_scalar_value_type() {
        assert_eq!(Scalar::from(42i32).value_type(), ValueType::Int);
        assert_eq!(Scalar::from("abc").value_type(), ValueType::String);
        assert_eq!(Scalar::from('1').value_type(), ValueType::Char);
    }

    #[test]
    fn test_scalar_as_i64_widens() {
        assert_eq!(Scalar::Byte(-3).as_i64(), Some(-3));
        assert_eq!(Scalar::Short(300).as_i64(), Some(300));
        assert_eq!(Scalar::String("1".to_string()).as_i64(), None);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Bool(true).to_string(), "Y");
        assert_eq!(
            Scalar::Decimal(Decimal::from_str("101.25").unwrap()).to_string(),
            "101.25"
        );
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(Scalar::DateTime(dt).to_string(), "20240305-09:30:00");
    }
}
