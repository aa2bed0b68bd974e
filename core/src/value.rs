//! Typed cell model (spec §3, component A).
//!
//! `Value` is a closed sum type over scalar SQL-ish types. Coercions never
//! panic: an out-of-range conversion saturates or wraps as documented per
//! variant, and `Null` always coerces to the factory's type-specific default.

use std::fmt;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{GatewayError, Result};

/// The declared SQL type of a [Field], independent of nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    F32,
    F64,
    Decimal,
    Date,
    Time,
    DateTime,
    Binary,
    String,
}

/// Describes one column. Immutable once constructed; equality by
/// case-insensitive name plus type (spec §3).
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    type_code: TypeCode,
    precision: u32,
    scale: u32,
    signed: bool,
    nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        let signed = !matches!(
            type_code,
            TypeCode::Uint8 | TypeCode::Uint16 | TypeCode::Uint32 | TypeCode::Uint64
        );
        Self {
            name: name.into(),
            type_code,
            precision: 0,
            scale: 0,
            signed,
            nullable: true,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.type_code == other.type_code
    }
}
impl Eq for Field {}

/// A nanosecond-of-day timestamp, with a declared display scale (§3 `Time`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub nanos_of_day: i64,
    pub scale: u32,
}

/// An instant with a declared display scale and optional UTC offset (seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    pub naive: NaiveDateTime,
    pub scale: u32,
    pub offset_seconds: Option<i32>,
}

/// A tagged union over scalar cell types (spec §3).
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    F32(f32),
    F64(f64),
    Decimal(BigDecimal, u32),
    Date(i32),
    Time(Time),
    DateTime(DateTime),
    Binary(Vec<u8>),
    /// UTF-8 text, with an optional fixed length: when set, [Value::as_string]
    /// pads with NUL to that length (spec §3).
    String(String, Option<usize>),
}

/// Per-type default values and formatting knobs, seeded once and shared by
/// every [Value] constructed through it (spec §3 "Value factory").
#[derive(Debug, Clone)]
pub struct Factory {
    pub default_date: i32,
    pub default_time: Time,
    pub default_decimal_scale: u32,
    pub default_rounding: RoundingMode,
}

impl Default for Factory {
    fn default() -> Self {
        Self {
            default_date: 0,
            default_time: Time {
                nanos_of_day: 0,
                scale: 0,
            },
            default_decimal_scale: 0,
            default_rounding: RoundingMode::HalfEven,
        }
    }
}

impl Factory {
    /// The type-specific default a `Null` of `type_code` coerces to.
    pub fn default_for(&self, type_code: TypeCode) -> Value {
        match type_code {
            TypeCode::Bool => Value::Bool(false),
            TypeCode::Int8 => Value::Int8(0),
            TypeCode::Int16 => Value::Int16(0),
            TypeCode::Int32 => Value::Int32(0),
            TypeCode::Int64 => Value::Int64(0),
            TypeCode::Uint8 => Value::Uint8(0),
            TypeCode::Uint16 => Value::Uint16(0),
            TypeCode::Uint32 => Value::Uint32(0),
            TypeCode::Uint64 => Value::Uint64(0),
            TypeCode::F32 => Value::F32(0.0),
            TypeCode::F64 => Value::F64(0.0),
            TypeCode::Decimal => {
                Value::Decimal(BigDecimal::from(0), self.default_decimal_scale)
            }
            TypeCode::Date => Value::Date(self.default_date),
            TypeCode::Time => Value::Time(self.default_time),
            TypeCode::DateTime => Value::DateTime(DateTime {
                naive: NaiveDateTime::new(
                    NaiveDate::from_num_days_from_ce_opt(self.default_date + 719163)
                        .unwrap_or(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
                    NaiveTime::from_num_seconds_from_midnight_opt(
                        (self.default_time.nanos_of_day / 1_000_000_000) as u32,
                        (self.default_time.nanos_of_day % 1_000_000_000) as u32,
                    )
                    .unwrap_or_default(),
                ),
                scale: self.default_time.scale,
                offset_seconds: None,
            }),
            TypeCode::Binary => Value::Binary(Vec::new()),
            TypeCode::String => Value::String(String::new(), None),
        }
    }
}

impl Value {
    pub fn type_code(&self) -> Option<TypeCode> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeCode::Bool),
            Value::Int8(_) => Some(TypeCode::Int8),
            Value::Int16(_) => Some(TypeCode::Int16),
            Value::Int32(_) => Some(TypeCode::Int32),
            Value::Int64(_) => Some(TypeCode::Int64),
            Value::Uint8(_) => Some(TypeCode::Uint8),
            Value::Uint16(_) => Some(TypeCode::Uint16),
            Value::Uint32(_) => Some(TypeCode::Uint32),
            Value::Uint64(_) => Some(TypeCode::Uint64),
            Value::F32(_) => Some(TypeCode::F32),
            Value::F64(_) => Some(TypeCode::F64),
            Value::Decimal(..) => Some(TypeCode::Decimal),
            Value::Date(_) => Some(TypeCode::Date),
            Value::Time(_) => Some(TypeCode::Time),
            Value::DateTime(_) => Some(TypeCode::DateTime),
            Value::Binary(_) => Some(TypeCode::Binary),
            Value::String(..) => Some(TypeCode::String),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Replaces the cell in place, returning the same cell (spec §3
    /// "explicit `set(new)` that returns the same cell").
    pub fn set(&mut self, new: Value) -> &mut Value {
        *self = new;
        self
    }

    /// Non-null textual rendering. `Null` renders as an empty string; callers
    /// that need the type-specific default should resolve it via [Factory]
    /// first.
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int8(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Uint8(v) => v.to_string(),
            Value::Uint16(v) => v.to_string(),
            Value::Uint32(v) => v.to_string(),
            Value::Uint64(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::Decimal(d, scale) => format!("{:.*}", *scale as usize, d),
            Value::Date(days) => epoch_days_to_date(*days)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Value::Time(t) => format_time(t),
            Value::DateTime(dt) => format_datetime(dt),
            Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Value::String(s, fixed) => match fixed {
                Some(len) if s.len() < *len => {
                    let mut padded = s.clone();
                    padded.push_str(&"\0".repeat(len - s.len()));
                    padded
                }
                _ => s.clone(),
            },
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int8(v) => *v != 0,
            Value::Int16(v) => *v != 0,
            Value::Int32(v) => *v != 0,
            Value::Int64(v) => *v != 0,
            Value::Uint8(v) => *v != 0,
            Value::Uint16(v) => *v != 0,
            Value::Uint32(v) => *v != 0,
            Value::Uint64(v) => *v != 0,
            Value::F32(v) => *v != 0.0,
            Value::F64(v) => *v != 0.0,
            Value::Decimal(d, _) => !d.is_zero(),
            Value::String(s, _) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "t" | "y" | "yes"),
            _ => true,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => *b as i64,
            Value::Int8(v) => *v as i64,
            Value::Int16(v) => *v as i64,
            Value::Int32(v) => *v as i64,
            Value::Int64(v) => *v,
            // Unsigned -> signed widening is zero-extension, so this is a
            // plain unsigned-to-signed cast; it can only overflow for Uint64
            // values above i64::MAX, which wrap per spec's narrowing rule.
            Value::Uint8(v) => *v as i64,
            Value::Uint16(v) => *v as i64,
            Value::Uint32(v) => *v as i64,
            Value::Uint64(v) => *v as i64,
            Value::F32(v) => *v as i64,
            Value::F64(v) => *v as i64,
            Value::Decimal(d, _) => d.to_i64().unwrap_or(0),
            Value::Date(days) => *days as i64,
            Value::Time(t) => t.nanos_of_day,
            Value::DateTime(dt) => dt.naive.and_utc().timestamp(),
            Value::Binary(_) => 0,
            Value::String(s, _) => s.trim().parse().unwrap_or(0),
        }
    }

    /// Unsigned 64-bit view, with wrap-around semantics for narrowing signed
    /// values and zero-extension for widening unsigned ones (spec §3, §8
    /// boundary behavior: `-2i8 -> 254`, `-2i16 -> 65534`, etc, generalized
    /// to 64 bits here and truncated to width by the `Uint*` constructors).
    pub fn as_u64(&self) -> u64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => *b as u64,
            Value::Int8(v) => *v as u8 as u64,
            Value::Int16(v) => *v as u16 as u64,
            Value::Int32(v) => *v as u32 as u64,
            Value::Int64(v) => *v as u64,
            Value::Uint8(v) => *v as u64,
            Value::Uint16(v) => *v as u64,
            Value::Uint32(v) => *v as u64,
            Value::Uint64(v) => *v,
            Value::F32(v) => v.max(0.0) as u64,
            Value::F64(v) => v.max(0.0) as u64,
            Value::Decimal(d, _) => d.to_u64().unwrap_or(0),
            Value::Date(days) => *days as u32 as u64,
            Value::Time(t) => t.nanos_of_day as u64,
            Value::DateTime(dt) => dt.naive.and_utc().timestamp() as u64,
            Value::Binary(_) => 0,
            Value::String(s, _) => s.trim().parse().unwrap_or(0),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int8(v) => *v as f64,
            Value::Int16(v) => *v as f64,
            Value::Int32(v) => *v as f64,
            Value::Int64(v) => *v as f64,
            Value::Uint8(v) => *v as f64,
            Value::Uint16(v) => *v as f64,
            Value::Uint32(v) => *v as f64,
            Value::Uint64(v) => *v as f64,
            Value::F32(v) => *v as f64,
            Value::F64(v) => *v,
            Value::Decimal(d, _) => d.to_f64().unwrap_or(0.0),
            Value::Date(days) => *days as f64,
            Value::Time(t) => t.nanos_of_day as f64,
            Value::DateTime(dt) => dt.naive.and_utc().timestamp() as f64,
            Value::Binary(_) => 0.0,
            Value::String(s, _) => s.trim().parse().unwrap_or(0.0),
        }
    }

    /// JSON rendering (spec §3, §4.9 json-sequence): binary is a byte-array
    /// of ints, everything else maps onto the closest native JSON type.
    pub fn as_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int8(v) => J::from(*v),
            Value::Int16(v) => J::from(*v),
            Value::Int32(v) => J::from(*v),
            Value::Int64(v) => J::from(*v),
            Value::Uint8(v) => J::from(*v),
            Value::Uint16(v) => J::from(*v),
            Value::Uint32(v) => J::from(*v),
            Value::Uint64(v) => J::from(*v),
            Value::F32(v) => serde_json::Number::from_f64(*v as f64)
                .map(J::Number)
                .unwrap_or(J::Null),
            Value::F64(v) => serde_json::Number::from_f64(*v)
                .map(J::Number)
                .unwrap_or(J::Null),
            Value::Decimal(..) => J::String(self.as_string()),
            Value::Date(_) => J::String(self.as_string()),
            Value::Time(_) => J::String(self.as_string()),
            Value::DateTime(_) => J::String(self.as_string()),
            Value::Binary(bytes) => {
                J::Array(bytes.iter().map(|b| J::from(*b as i64)).collect())
            }
            Value::String(..) => J::String(self.as_string()),
        }
    }

    /// SQL literal rendering (spec §3, §4.9 VALUES serializer): binary uses
    /// `'HEXPAIRS'` (no `0x` prefix), strings/dates/times are single-quoted
    /// with `'` doubled, everything else is its bare textual form.
    pub fn as_sql(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Binary(bytes) => format!("'{}'", hex::encode_upper(bytes)),
            Value::String(..) | Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                format!("'{}'", self.as_string().replace('\'', "''"))
            }
            Value::Decimal(..) => self.as_string(),
            _ => self.as_string(),
        }
    }

    /// Re-parses a textual value into the given type, per the idempotence
    /// invariant in spec §8 (`from_string(v.as_string()).as_string() ==
    /// v.as_string()`).
    pub fn from_string(type_code: TypeCode, s: &str) -> Result<Value> {
        match type_code {
            TypeCode::Bool => Ok(Value::Bool(matches!(
                s.to_ascii_lowercase().as_str(),
                "true" | "1" | "t" | "y" | "yes"
            ))),
            TypeCode::Int8 => parse_num(s).map(Value::Int8),
            TypeCode::Int16 => parse_num(s).map(Value::Int16),
            TypeCode::Int32 => parse_num(s).map(Value::Int32),
            TypeCode::Int64 => parse_num(s).map(Value::Int64),
            TypeCode::Uint8 => parse_num(s).map(Value::Uint8),
            TypeCode::Uint16 => parse_num(s).map(Value::Uint16),
            TypeCode::Uint32 => parse_num(s).map(Value::Uint32),
            TypeCode::Uint64 => parse_num(s).map(Value::Uint64),
            TypeCode::F32 => parse_num(s).map(Value::F32),
            TypeCode::F64 => parse_num(s).map(Value::F64),
            TypeCode::Decimal => {
                let d: BigDecimal = s
                    .parse()
                    .map_err(|_| GatewayError::Data(format!("invalid decimal: {s}")))?;
                let scale = d.fractional_digit_count().max(0) as u32;
                Ok(Value::Decimal(d, scale))
            }
            TypeCode::Date => {
                let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| GatewayError::Data(format!("invalid date: {s}")))?;
                Ok(Value::Date(date_to_epoch_days(date)))
            }
            TypeCode::Time => parse_time(s).map(Value::Time),
            TypeCode::DateTime => parse_datetime(s).map(Value::DateTime),
            TypeCode::Binary => Ok(Value::Binary(s.as_bytes().to_vec())),
            TypeCode::String => Ok(Value::String(s.to_string(), None)),
        }
    }
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.trim()
        .parse()
        .map_err(|_| GatewayError::Data(format!("invalid number: {s}")))
}

fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
}

fn date_to_epoch_days(date: NaiveDate) -> i32 {
    (date - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32
}

/// Formats nanos-of-day, truncating (not rounding) to the declared scale and
/// restoring `.<digits>` only when `scale > 0` and the fraction is non-zero
/// (spec §8 boundary behavior).
fn format_time(t: &Time) -> String {
    let total_secs = t.nanos_of_day / 1_000_000_000;
    let nanos = t.nanos_of_day % 1_000_000_000;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    let base = format!("{h:02}:{m:02}:{s:02}");
    append_fraction(base, nanos as u32, t.scale)
}

fn format_datetime(dt: &DateTime) -> String {
    let base = dt.naive.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = dt.naive.and_utc().timestamp_subsec_nanos();
    let mut out = append_fraction(base, nanos, dt.scale);
    if let Some(off) = dt.offset_seconds {
        let sign = if off < 0 { '-' } else { '+' };
        let off_abs = off.unsigned_abs();
        out.push_str(&format!(" {sign}{:02}:{:02}", off_abs / 3600, (off_abs % 3600) / 60));
    }
    out
}

fn append_fraction(mut base: String, nanos: u32, scale: u32) -> String {
    if scale == 0 {
        return base;
    }
    let truncated = nanos / 10u32.pow(9 - scale.min(9));
    if truncated == 0 {
        return base;
    }
    base.push('.');
    base.push_str(&format!("{truncated:0width$}", width = scale.min(9) as usize));
    base
}

fn parse_time(s: &str) -> Result<Time> {
    let (main, frac) = match s.split_once('.') {
        Some((m, f)) => (m, Some(f)),
        None => (s, None),
    };
    let parts: Vec<&str> = main.split(':').collect();
    if parts.len() != 3 {
        return Err(GatewayError::Data(format!("invalid time: {s}")));
    }
    let h: i64 = parse_num(parts[0])?;
    let m: i64 = parse_num(parts[1])?;
    let sec: i64 = parse_num(parts[2])?;
    let mut nanos_of_day = (h * 3600 + m * 60 + sec) * 1_000_000_000;
    let scale = frac.map(|f| f.len() as u32).unwrap_or(0);
    if let Some(f) = frac {
        let padded = format!("{f:0<9}");
        let frac_nanos: i64 = padded[..9].parse().unwrap_or(0);
        nanos_of_day += frac_nanos;
    }
    Ok(Time {
        nanos_of_day,
        scale,
    })
}

fn parse_datetime(s: &str) -> Result<DateTime> {
    let (date_time, offset_seconds) = split_offset(s);
    let (main, frac) = match date_time.split_once('.') {
        Some((m, f)) => (m, Some(f)),
        None => (date_time, None),
    };
    let naive = NaiveDateTime::parse_from_str(main, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(main, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| GatewayError::Data(format!("invalid timestamp: {s}")))?;
    let scale = frac.map(|f| f.len() as u32).unwrap_or(0);
    let naive = if let Some(f) = frac {
        let padded = format!("{f:0<9}");
        let nanos: u32 = padded[..9].parse().unwrap_or(0);
        naive.with_nanosecond(nanos).unwrap_or(naive)
    } else {
        naive
    };
    Ok(DateTime {
        naive,
        scale,
        offset_seconds,
    })
}

fn split_offset(s: &str) -> (&str, Option<i32>) {
    if let Some(idx) = s.rfind(['+', '-']) {
        // Only treat it as an offset if it occurs after a time separator,
        // not as part of the date (e.g. "2024-01-01").
        if idx > 10 {
            let (main, off) = s.split_at(idx);
            if let Some(secs) = parse_offset(off) {
                return (main.trim_end(), Some(secs));
            }
        }
    }
    (s, None)
}

fn parse_offset(off: &str) -> Option<i32> {
    let sign = if off.starts_with('-') { -1 } else { 1 };
    let rest = &off[1..];
    let (h, m) = rest.split_once(':')?;
    let h: i32 = h.parse().ok()?;
    let m: i32 = m.parse().ok()?;
    Some(sign * (h * 3600 + m * 60))
}

use chrono::Timelike;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn uint_narrowing_wraps_to_unsigned_string() {
        assert_eq!(Value::Int8(-2).as_u64() as u8, 254);
        assert_eq!(Value::Int16(-2).as_u64() as u16, 65534);
        assert_eq!(Value::Int32(-2).as_u64() as u32, 4294967295);
        assert_eq!(Value::Int64(-2).as_u64(), 18446744073709551614);
    }

    #[test]
    fn uint_string_never_negative() {
        let v = Value::Uint32(4294967295);
        assert!(!v.as_string().starts_with('-'));
        assert_eq!(v.as_string(), "4294967295");
    }

    #[test]
    fn textual_roundtrip_is_idempotent_for_int() {
        let v = Value::Int32(-42);
        let s1 = v.as_string();
        let parsed = Value::from_string(TypeCode::Int32, &s1).unwrap();
        assert_eq!(parsed.as_string(), s1);
    }

    #[test]
    fn textual_roundtrip_is_idempotent_for_decimal() {
        let v = Value::Decimal(BigDecimal::from(12345) / BigDecimal::from(100), 2);
        let s1 = v.as_string();
        let parsed = Value::from_string(TypeCode::Decimal, &s1).unwrap();
        assert_eq!(parsed.as_string(), s1);
    }

    #[test]
    fn time_truncates_fraction_instead_of_rounding() {
        // 1.999999999s truncated to scale 3 must read .999, never rounding up.
        let t = Time {
            nanos_of_day: 1_999_999_999,
            scale: 3,
        };
        assert_eq!(format_time(&t), "00:00:01.999");
    }

    #[test]
    fn time_omits_fraction_when_zero_and_scale_positive() {
        let t = Time {
            nanos_of_day: 5_000_000_000,
            scale: 3,
        };
        assert_eq!(format_time(&t), "00:00:05");
    }

    #[test]
    fn binary_json_is_byte_array_of_ints() {
        let v = Value::Binary(vec![1, 2, 255]);
        assert_eq!(v.as_json(), serde_json::json!([1, 2, 255]));
    }

    #[test]
    fn binary_sql_is_hex_pairs_without_0x() {
        let v = Value::Binary(vec![0xab, 0xcd]);
        assert_eq!(v.as_sql(), "'ABCD'");
    }

    #[test]
    fn field_equality_is_case_insensitive_name_plus_type() {
        let a = Field::new("Foo", TypeCode::Int32);
        let b = Field::new("foo", TypeCode::Int32);
        assert_eq!(a, b);
        let c = Field::new("foo", TypeCode::Int64);
        assert_ne!(a, c);
    }

    #[test]
    fn null_coerces_to_factory_default() {
        let factory = Factory::default();
        let v = factory.default_for(TypeCode::Int32);
        assert_eq!(v.as_string(), "0");
    }
}
