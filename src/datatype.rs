// used for temporal inline values
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
// used for numbers of arbitrary size
use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;

// used when parsing a label to a value
use std::str::FromStr;
// used to print out readable forms of a data type
use std::fmt;
// used to indicate that inline values need to be hashable
use std::hash::{Hash, Hasher};
use std::collections::HashMap;
use std::ops;

use lazy_static::lazy_static;

use crate::error::{Result, TesseraError};

pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";
pub const XSD_SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";
pub const XSD_INT: &str = "http://www.w3.org/2001/XMLSchema#int";
pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
pub const XSD_UNSIGNED_BYTE: &str = "http://www.w3.org/2001/XMLSchema#unsignedByte";
pub const XSD_UNSIGNED_SHORT: &str = "http://www.w3.org/2001/XMLSchema#unsignedShort";
pub const XSD_UNSIGNED_INT: &str = "http://www.w3.org/2001/XMLSchema#unsignedInt";
pub const XSD_UNSIGNED_LONG: &str = "http://www.w3.org/2001/XMLSchema#unsignedLong";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

pub trait DataType: fmt::Display + Sized {
    // static stuff which needs to be implemented downstream
    const UID: u8;
    const DATA_TYPE: &'static str;
    fn parse(label: &str) -> Option<Self>;
    fn into_inline(self) -> InlineValue;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
    fn identifier(&self) -> u8 {
        Self::UID
    }
    fn label(&self) -> String {
        self.to_string()
    }
}

fn decode<V: DataType>(label: &str) -> Result<InlineValue> {
    // xsd whitespace facet is "collapse" for every inline datatype
    V::parse(label.trim())
        .map(V::into_inline)
        .ok_or_else(|| TesseraError::decode(V::DATA_TYPE, label, "not a valid lexical form"))
}

// ------------- Data Types --------------
impl DataType for bool {
    const UID: u8 = 1;
    const DATA_TYPE: &'static str = XSD_BOOLEAN;
    fn parse(label: &str) -> Option<bool> {
        match label {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Boolean(self)
    }
}
impl DataType for i8 {
    const UID: u8 = 2;
    const DATA_TYPE: &'static str = XSD_BYTE;
    fn parse(label: &str) -> Option<i8> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Byte(self)
    }
}
impl DataType for i16 {
    const UID: u8 = 3;
    const DATA_TYPE: &'static str = XSD_SHORT;
    fn parse(label: &str) -> Option<i16> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Short(self)
    }
}
impl DataType for i32 {
    const UID: u8 = 4;
    const DATA_TYPE: &'static str = XSD_INT;
    fn parse(label: &str) -> Option<i32> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Int(self)
    }
}
impl DataType for i64 {
    const UID: u8 = 5;
    const DATA_TYPE: &'static str = XSD_LONG;
    fn parse(label: &str) -> Option<i64> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Long(self)
    }
}
impl DataType for u8 {
    const UID: u8 = 6;
    const DATA_TYPE: &'static str = XSD_UNSIGNED_BYTE;
    fn parse(label: &str) -> Option<u8> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::UnsignedByte(self)
    }
}
impl DataType for u16 {
    const UID: u8 = 7;
    const DATA_TYPE: &'static str = XSD_UNSIGNED_SHORT;
    fn parse(label: &str) -> Option<u16> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::UnsignedShort(self)
    }
}
impl DataType for u32 {
    const UID: u8 = 8;
    const DATA_TYPE: &'static str = XSD_UNSIGNED_INT;
    fn parse(label: &str) -> Option<u32> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::UnsignedInt(self)
    }
}
impl DataType for u64 {
    const UID: u8 = 9;
    const DATA_TYPE: &'static str = XSD_UNSIGNED_LONG;
    fn parse(label: &str) -> Option<u64> {
        label.parse().ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::UnsignedLong(self)
    }
}
impl DataType for f32 {
    const UID: u8 = 10;
    const DATA_TYPE: &'static str = XSD_FLOAT;
    fn parse(label: &str) -> Option<f32> {
        parse_float(label)
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Float(self)
    }
    fn label(&self) -> String {
        float_label(*self)
    }
}
impl DataType for f64 {
    const UID: u8 = 11;
    const DATA_TYPE: &'static str = XSD_DOUBLE;
    fn parse(label: &str) -> Option<f64> {
        parse_float(label)
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Double(self)
    }
    fn label(&self) -> String {
        float_label(*self)
    }
}
impl DataType for Integer {
    const UID: u8 = 12;
    const DATA_TYPE: &'static str = XSD_INTEGER;
    fn parse(label: &str) -> Option<Integer> {
        Integer::from_str(label)
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Integer(self)
    }
}
impl DataType for Decimal {
    const UID: u8 = 13;
    const DATA_TYPE: &'static str = XSD_DECIMAL;
    fn parse(label: &str) -> Option<Decimal> {
        Decimal::from_str(label)
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Decimal(self)
    }
}
impl DataType for DateTime<Utc> {
    const UID: u8 = 14;
    const DATA_TYPE: &'static str = XSD_DATE_TIME;
    fn parse(label: &str) -> Option<DateTime<Utc>> {
        // a missing timezone is read as UTC, the zone is not part of the value
        match DateTime::parse_from_rfc3339(label) {
            Ok(zoned) => Some(zoned.with_timezone(&Utc)),
            Err(_) => NaiveDateTime::parse_from_str(label, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|local| local.and_utc()),
        }
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::DateTime(self)
    }
    fn label(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}
impl DataType for NaiveDate {
    const UID: u8 = 15;
    const DATA_TYPE: &'static str = XSD_DATE;
    fn parse(label: &str) -> Option<NaiveDate> {
        // the zone is not part of the value, as for dateTime
        NaiveDate::parse_from_str(strip_zone(label)?, "%Y-%m-%d").ok()
    }
    fn into_inline(self) -> InlineValue {
        InlineValue::Date(self)
    }
    fn label(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

// the label without its `Z` or `±hh:mm` suffix, None if the zone is malformed
fn strip_zone(label: &str) -> Option<&str> {
    if let Some(date) = label.strip_suffix('Z') {
        return Some(date);
    }
    let bytes = label.as_bytes();
    let n = bytes.len();
    if n < 6 || !matches!(bytes[n - 6], b'+' | b'-') || bytes[n - 3] != b':' {
        return Some(label);
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u8> {
        label
            .get(range)
            .filter(|part| part.bytes().all(|b| b.is_ascii_digit()))?
            .parse()
            .ok()
    };
    let (hours, minutes) = (digits(n - 5..n - 3)?, digits(n - 2..n)?);
    if minutes > 59 || hours > 14 || (hours == 14 && minutes > 0) {
        return None;
    }
    label.get(..n - 6)
}

fn parse_float<F: FromStr + From<f32>>(label: &str) -> Option<F> {
    match label {
        "INF" | "+INF" => Some(F::from(f32::INFINITY)),
        "-INF" => Some(F::from(f32::NEG_INFINITY)),
        "NaN" => Some(F::from(f32::NAN)),
        // rust would also accept "inf" and "nan", which xsd does not
        other if other.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
        other => other.parse().ok(),
    }
}

fn float_label<F: fmt::Display + Into<f64> + Copy>(f: F) -> String {
    let wide: f64 = f.into();
    if wide.is_nan() {
        String::from("NaN")
    } else if wide.is_infinite() {
        String::from(if wide > 0. { "INF" } else { "-INF" })
    } else {
        f.to_string()
    }
}

// Special types below
#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Clone, Debug)]
pub struct Integer(BigInt);

impl Integer {
    pub fn from_str(s: &str) -> Option<Integer> {
        match BigInt::from_str(s) {
            Ok(integer) => Some(Integer(integer)),
            _ => None,
        }
    }
}
impl From<i64> for Integer {
    fn from(i: i64) -> Self {
        Integer(BigInt::from(i))
    }
}
impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl ops::Deref for Integer {
    type Target = BigInt;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Clone, Debug)]
pub struct Decimal(BigDecimal);

impl Decimal {
    pub fn from_str(s: &str) -> Option<Decimal> {
        // xsd:decimal has no exponent form
        if s.contains(['e', 'E']) {
            return None;
        }
        match BigDecimal::from_str(s) {
            Ok(decimal) => Some(Decimal(decimal)),
            _ => None,
        }
    }
}
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // never in exponent form, which xsd:decimal does not allow
        write!(f, "{}", self.0.to_plain_string())
    }
}
impl ops::Deref for Decimal {
    type Target = BigDecimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ------------- Dte -------------
/// The datatypes whose values are encoded directly into a handle.
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Dte {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
    UnsignedLong,
    Float,
    Double,
    Integer,
    Decimal,
    DateTime,
    Date,
}

lazy_static! {
    static ref DTE_BY_IRI: HashMap<&'static str, Dte> = Dte::ALL.iter().map(|dte| (dte.iri(), *dte)).collect();
}

impl Dte {
    pub const ALL: [Dte; 15] = [
        Dte::Boolean,
        Dte::Byte,
        Dte::Short,
        Dte::Int,
        Dte::Long,
        Dte::UnsignedByte,
        Dte::UnsignedShort,
        Dte::UnsignedInt,
        Dte::UnsignedLong,
        Dte::Float,
        Dte::Double,
        Dte::Integer,
        Dte::Decimal,
        Dte::DateTime,
        Dte::Date,
    ];
    pub fn of(datatype: &str) -> Option<Dte> {
        DTE_BY_IRI.get(datatype).copied()
    }
    pub fn from_uid(uid: u8) -> Option<Dte> {
        Dte::ALL.iter().copied().find(|dte| dte.uid() == uid)
    }
    pub fn uid(&self) -> u8 {
        match self {
            Dte::Boolean => bool::UID,
            Dte::Byte => i8::UID,
            Dte::Short => i16::UID,
            Dte::Int => i32::UID,
            Dte::Long => i64::UID,
            Dte::UnsignedByte => u8::UID,
            Dte::UnsignedShort => u16::UID,
            Dte::UnsignedInt => u32::UID,
            Dte::UnsignedLong => u64::UID,
            Dte::Float => f32::UID,
            Dte::Double => f64::UID,
            Dte::Integer => Integer::UID,
            Dte::Decimal => Decimal::UID,
            Dte::DateTime => <DateTime<Utc>>::UID,
            Dte::Date => NaiveDate::UID,
        }
    }
    pub fn iri(&self) -> &'static str {
        match self {
            Dte::Boolean => bool::DATA_TYPE,
            Dte::Byte => i8::DATA_TYPE,
            Dte::Short => i16::DATA_TYPE,
            Dte::Int => i32::DATA_TYPE,
            Dte::Long => i64::DATA_TYPE,
            Dte::UnsignedByte => u8::DATA_TYPE,
            Dte::UnsignedShort => u16::DATA_TYPE,
            Dte::UnsignedInt => u32::DATA_TYPE,
            Dte::UnsignedLong => u64::DATA_TYPE,
            Dte::Float => f32::DATA_TYPE,
            Dte::Double => f64::DATA_TYPE,
            Dte::Integer => Integer::DATA_TYPE,
            Dte::Decimal => Decimal::DATA_TYPE,
            Dte::DateTime => <DateTime<Utc>>::DATA_TYPE,
            Dte::Date => NaiveDate::DATA_TYPE,
        }
    }
    pub fn decode(&self, label: &str) -> Result<InlineValue> {
        match self {
            Dte::Boolean => decode::<bool>(label),
            Dte::Byte => decode::<i8>(label),
            Dte::Short => decode::<i16>(label),
            Dte::Int => decode::<i32>(label),
            Dte::Long => decode::<i64>(label),
            Dte::UnsignedByte => decode::<u8>(label),
            Dte::UnsignedShort => decode::<u16>(label),
            Dte::UnsignedInt => decode::<u32>(label),
            Dte::UnsignedLong => decode::<u64>(label),
            Dte::Float => decode::<f32>(label),
            Dte::Double => decode::<f64>(label),
            Dte::Integer => decode::<Integer>(label),
            Dte::Decimal => decode::<Decimal>(label),
            Dte::DateTime => decode::<DateTime<Utc>>(label),
            Dte::Date => decode::<NaiveDate>(label),
        }
    }
}
impl fmt::Display for Dte {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "xsd:{}", self.iri().trim_start_matches(XSD))
    }
}

// ------------- InlineValue -------------
/// A literal value carried inside its handle instead of in the lexicon.
#[derive(Clone, Debug)]
pub enum InlineValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    UnsignedByte(u8),
    UnsignedShort(u16),
    UnsignedInt(u32),
    UnsignedLong(u64),
    Float(f32),
    Double(f64),
    Integer(Integer),
    Decimal(Decimal),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl InlineValue {
    pub fn dte(&self) -> Dte {
        match self {
            InlineValue::Boolean(_) => Dte::Boolean,
            InlineValue::Byte(_) => Dte::Byte,
            InlineValue::Short(_) => Dte::Short,
            InlineValue::Int(_) => Dte::Int,
            InlineValue::Long(_) => Dte::Long,
            InlineValue::UnsignedByte(_) => Dte::UnsignedByte,
            InlineValue::UnsignedShort(_) => Dte::UnsignedShort,
            InlineValue::UnsignedInt(_) => Dte::UnsignedInt,
            InlineValue::UnsignedLong(_) => Dte::UnsignedLong,
            InlineValue::Float(_) => Dte::Float,
            InlineValue::Double(_) => Dte::Double,
            InlineValue::Integer(_) => Dte::Integer,
            InlineValue::Decimal(_) => Dte::Decimal,
            InlineValue::DateTime(_) => Dte::DateTime,
            InlineValue::Date(_) => Dte::Date,
        }
    }
    /// The canonical lexical form, which decodes back to an equal value.
    pub fn label(&self) -> String {
        match self {
            InlineValue::Boolean(v) => v.label(),
            InlineValue::Byte(v) => v.label(),
            InlineValue::Short(v) => v.label(),
            InlineValue::Int(v) => v.label(),
            InlineValue::Long(v) => v.label(),
            InlineValue::UnsignedByte(v) => v.label(),
            InlineValue::UnsignedShort(v) => v.label(),
            InlineValue::UnsignedInt(v) => v.label(),
            InlineValue::UnsignedLong(v) => v.label(),
            InlineValue::Float(v) => v.label(),
            InlineValue::Double(v) => v.label(),
            InlineValue::Integer(v) => v.label(),
            InlineValue::Decimal(v) => v.label(),
            InlineValue::DateTime(v) => v.label(),
            InlineValue::Date(v) => v.label(),
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            InlineValue::Byte(v) => Some(*v as i64),
            InlineValue::Short(v) => Some(*v as i64),
            InlineValue::Int(v) => Some(*v as i64),
            InlineValue::Long(v) => Some(*v),
            InlineValue::UnsignedByte(v) => Some(*v as i64),
            InlineValue::UnsignedShort(v) => Some(*v as i64),
            InlineValue::UnsignedInt(v) => Some(*v as i64),
            InlineValue::UnsignedLong(v) => i64::try_from(*v).ok(),
            InlineValue::Integer(v) => i64::try_from(&v.0).ok(),
            _ => None,
        }
    }

    /// Appends the binary key form: one flag byte carrying the datatype
    /// followed by the payload, order preserving for the fixed width types.
    /// Arbitrary precision values are length prefixed labels so that keys
    /// stay self delimiting.
    pub fn encode_key(&self, key: &mut Vec<u8>) {
        key.push(INLINE_FLAG | self.dte().uid());
        match self {
            InlineValue::Boolean(v) => key.push(*v as u8),
            InlineValue::Byte(v) => key.push((*v as u8) ^ 0x80),
            InlineValue::Short(v) => key.extend(((*v as u16) ^ 0x8000).to_be_bytes()),
            InlineValue::Int(v) => key.extend(((*v as u32) ^ 0x8000_0000).to_be_bytes()),
            InlineValue::Long(v) => key.extend(((*v as u64) ^ SIGN_64).to_be_bytes()),
            InlineValue::UnsignedByte(v) => key.push(*v),
            InlineValue::UnsignedShort(v) => key.extend(v.to_be_bytes()),
            InlineValue::UnsignedInt(v) => key.extend(v.to_be_bytes()),
            InlineValue::UnsignedLong(v) => key.extend(v.to_be_bytes()),
            InlineValue::Float(v) => {
                let bits = v.to_bits();
                let ordered = if bits & 0x8000_0000 != 0 { !bits } else { bits ^ 0x8000_0000 };
                key.extend(ordered.to_be_bytes());
            }
            InlineValue::Double(v) => {
                let bits = v.to_bits();
                let ordered = if bits & SIGN_64 != 0 { !bits } else { bits ^ SIGN_64 };
                key.extend(ordered.to_be_bytes());
            }
            InlineValue::Integer(v) => push_counted(key, v.to_string().as_bytes()),
            InlineValue::Decimal(v) => push_counted(key, v.normalized().to_plain_string().as_bytes()),
            InlineValue::DateTime(v) => {
                key.extend(((v.timestamp() as u64) ^ SIGN_64).to_be_bytes());
                key.extend(v.timestamp_subsec_nanos().to_be_bytes());
            }
            InlineValue::Date(v) => key.extend(((v.num_days_from_ce() as u32) ^ 0x8000_0000).to_be_bytes()),
        }
    }

    /// Reads one inline value from the front of `key`, returning it
    /// together with the number of bytes consumed.
    pub fn decode_key(key: &[u8]) -> Result<(InlineValue, usize)> {
        let flag = *key.first().ok_or_else(|| key_error("?", "empty key"))?;
        let dte = match flag & INLINE_FLAG {
            0 => None,
            _ => Dte::from_uid(flag & !INLINE_FLAG),
        }
        .ok_or_else(|| key_error("?", "not an inline key"))?;
        let body = &key[1..];
        let (value, used) = match dte {
            Dte::Boolean => (InlineValue::Boolean(take::<1>(dte, body)?[0] != 0), 1),
            Dte::Byte => (InlineValue::Byte((take::<1>(dte, body)?[0] ^ 0x80) as i8), 1),
            Dte::Short => (InlineValue::Short((u16::from_be_bytes(take(dte, body)?) ^ 0x8000) as i16), 2),
            Dte::Int => (InlineValue::Int((u32::from_be_bytes(take(dte, body)?) ^ 0x8000_0000) as i32), 4),
            Dte::Long => (InlineValue::Long((u64::from_be_bytes(take(dte, body)?) ^ SIGN_64) as i64), 8),
            Dte::UnsignedByte => (InlineValue::UnsignedByte(take::<1>(dte, body)?[0]), 1),
            Dte::UnsignedShort => (InlineValue::UnsignedShort(u16::from_be_bytes(take(dte, body)?)), 2),
            Dte::UnsignedInt => (InlineValue::UnsignedInt(u32::from_be_bytes(take(dte, body)?)), 4),
            Dte::UnsignedLong => (InlineValue::UnsignedLong(u64::from_be_bytes(take(dte, body)?)), 8),
            Dte::Float => {
                let ordered = u32::from_be_bytes(take(dte, body)?);
                let bits = if ordered & 0x8000_0000 != 0 { ordered ^ 0x8000_0000 } else { !ordered };
                (InlineValue::Float(f32::from_bits(bits)), 4)
            }
            Dte::Double => {
                let ordered = u64::from_be_bytes(take(dte, body)?);
                let bits = if ordered & SIGN_64 != 0 { ordered ^ SIGN_64 } else { !ordered };
                (InlineValue::Double(f64::from_bits(bits)), 8)
            }
            Dte::Integer | Dte::Decimal => {
                let (label, used) = take_counted(dte, body)?;
                (dte.decode(label)?, used)
            }
            Dte::DateTime => {
                let seconds = (u64::from_be_bytes(take(dte, body)?) ^ SIGN_64) as i64;
                let nanos = u32::from_be_bytes(take(dte, &body[8.min(body.len())..])?);
                let moment = DateTime::from_timestamp(seconds, nanos)
                    .ok_or_else(|| key_error(dte.iri(), "timestamp out of range"))?;
                (InlineValue::DateTime(moment), 12)
            }
            Dte::Date => {
                let days = (u32::from_be_bytes(take(dte, body)?) ^ 0x8000_0000) as i32;
                let date = NaiveDate::from_num_days_from_ce_opt(days)
                    .ok_or_else(|| key_error(dte.iri(), "day out of range"))?;
                (InlineValue::Date(date), 4)
            }
        };
        Ok((value, used + 1))
    }
}

pub const INLINE_FLAG: u8 = 0x40;
const SIGN_64: u64 = 0x8000_0000_0000_0000;

fn key_error(datatype: &str, message: &str) -> TesseraError {
    TesseraError::decode(datatype, "<key>", message)
}

fn take<const N: usize>(dte: Dte, body: &[u8]) -> Result<[u8; N]> {
    body.get(..N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or_else(|| key_error(dte.iri(), "truncated key"))
}

fn push_counted(key: &mut Vec<u8>, bytes: &[u8]) {
    key.extend((bytes.len() as u32).to_be_bytes());
    key.extend(bytes);
}

fn take_counted(dte: Dte, body: &[u8]) -> Result<(&str, usize)> {
    let length = u32::from_be_bytes(take(dte, body)?) as usize;
    let bytes = body
        .get(4..4 + length)
        .ok_or_else(|| key_error(dte.iri(), "truncated key"))?;
    let label = std::str::from_utf8(bytes).map_err(|e| key_error(dte.iri(), &e.to_string()))?;
    Ok((label, 4 + length))
}

// floats compare by bit pattern, so that a handle is a proper map key
impl PartialEq for InlineValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (InlineValue::Float(a), InlineValue::Float(b)) => a.to_bits() == b.to_bits(),
            (InlineValue::Double(a), InlineValue::Double(b)) => a.to_bits() == b.to_bits(),
            (InlineValue::Boolean(a), InlineValue::Boolean(b)) => a == b,
            (InlineValue::Byte(a), InlineValue::Byte(b)) => a == b,
            (InlineValue::Short(a), InlineValue::Short(b)) => a == b,
            (InlineValue::Int(a), InlineValue::Int(b)) => a == b,
            (InlineValue::Long(a), InlineValue::Long(b)) => a == b,
            (InlineValue::UnsignedByte(a), InlineValue::UnsignedByte(b)) => a == b,
            (InlineValue::UnsignedShort(a), InlineValue::UnsignedShort(b)) => a == b,
            (InlineValue::UnsignedInt(a), InlineValue::UnsignedInt(b)) => a == b,
            (InlineValue::UnsignedLong(a), InlineValue::UnsignedLong(b)) => a == b,
            (InlineValue::Integer(a), InlineValue::Integer(b)) => a == b,
            (InlineValue::Decimal(a), InlineValue::Decimal(b)) => a == b,
            (InlineValue::DateTime(a), InlineValue::DateTime(b)) => a == b,
            (InlineValue::Date(a), InlineValue::Date(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for InlineValue {}
impl Hash for InlineValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut key = Vec::new();
        self.encode_key(&mut key);
        key.hash(state);
    }
}
impl fmt::Display for InlineValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}::<{}>", self.label(), self.dte())
    }
}

// ------------- Codec registry -------------
/// Maps datatype IRIs to inline encodings.
pub trait InlineCodec: Send + Sync {
    fn inline_type(&self, datatype: &str) -> Option<Dte>;
    fn decode_inline(&self, dte: Dte, label: &str) -> Result<InlineValue> {
        dte.decode(label)
    }
    fn encode_inline(&self, value: &InlineValue) -> String {
        value.label()
    }
}

/// The XSD numeric, temporal and boolean datatypes.
#[derive(Debug, Default, Clone, Copy)]
pub struct XsdCodecs;

impl InlineCodec for XsdCodecs {
    fn inline_type(&self, datatype: &str) -> Option<Dte> {
        Dte::of(datatype)
    }
}
