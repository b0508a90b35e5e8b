//! Lenient deserializers for backend payloads.
//!
//! The backend is not strict about numeric fields: totals may arrive as numbers,
//! numeric strings, `null`, or be missing entirely. Every such value is read as
//! zero (or `None`) instead of failing the whole response.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::{self, Deserializer, Visitor};
use std::fmt;
use std::str::FromStr;

struct DecimalLenienteVisitor;

impl<'de> Visitor<'de> for DecimalLenienteVisitor {
    type Value = Option<Decimal>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Ok(None);
        }
        // The shortest round-trip text of an f64 avoids binary noise (0.1 stays 0.1).
        Ok(Decimal::from_str(&v.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let v = v.trim();
        Ok(Decimal::from_str(v)
            .or_else(|_| Decimal::from_scientific(v))
            .ok())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(DecimalLenienteVisitor)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// `Decimal` that falls back to zero. Pair with `#[serde(default)]` for missing keys.
pub mod decimal_leniente {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        Ok(d.deserialize_any(DecimalLenienteVisitor)?.unwrap_or_default())
    }
}

/// `Option<Decimal>` that maps anything unreadable to `None`.
pub mod decimal_opcional_leniente {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
        d.deserialize_any(DecimalLenienteVisitor)
    }
}

/// Integer counts (e.g. number of sales) with the same leniency. Fractions are truncated.
pub mod inteiro_leniente {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(d
            .deserialize_any(DecimalLenienteVisitor)?
            .and_then(|v| v.trunc().to_i64())
            .unwrap_or_default())
    }
}

fn parse_data(texto: &str) -> Option<NaiveDate> {
    // Accepts `YYYY-MM-DD` as well as full timestamps like `2024-03-05T10:00:00`.
    let prefixo = texto.trim().get(..10)?;
    NaiveDate::parse_from_str(prefixo, "%Y-%m-%d").ok()
}

/// Dates that may come as a plain date or as a timestamp. Serialized as `YYYY-MM-DD`.
pub mod data_flexivel {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(data: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&data.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let texto = <String as serde::Deserialize>::deserialize(d)?;
        parse_data(&texto).ok_or_else(|| de::Error::custom(format!("invalid date '{texto}'")))
    }
}

/// Optional variant of [`data_flexivel`]; unreadable values become `None`.
pub mod data_flexivel_opcional {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(data: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(data) => s.serialize_some(&data.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let texto = <Option<String> as serde::Deserialize>::deserialize(d)?;
        Ok(texto.as_deref().and_then(parse_data))
    }
}
