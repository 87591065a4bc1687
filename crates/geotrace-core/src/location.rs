//! Geo-location results and their typed metadata.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::subject::Subject;

pub const KEY_COUNTRY: &str = "country";
pub const KEY_CITY: &str = "city";

/// A metadata value attached to a [`GeoLocation`].
///
/// The set of variants is closed so that persisted caches have a stable,
/// deterministic encoding: `{"t": "<tag>", "v": <value>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum ParamValue {
    #[serde(rename = "l")]
    I64(i64),
    #[serde(rename = "i")]
    I32(i32),
    #[serde(rename = "s")]
    Str(String),
    #[serde(rename = "d")]
    F64(f64),
    #[serde(rename = "f")]
    F32(f32),
}

impl ParamValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::I64(v) => write!(f, "{v}"),
            ParamValue::I32(v) => write!(f, "{v}"),
            ParamValue::Str(v) => f.write_str(v),
            ParamValue::F64(v) => write!(f, "{v}"),
            ParamValue::F32(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::I64(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::I32(v)
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_owned())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::F64(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::F32(v)
    }
}

/// The location of a subject plus arbitrary typed metadata.
///
/// Equality and hashing consider the subject only. Caches rely on this: a
/// location is "the same entry" as another whenever they describe the same
/// subject, regardless of coordinates or validity.
#[derive(Debug, Clone)]
pub struct GeoLocation<S> {
    subject: S,
    coordinate: Coordinate,
    is_valid: bool,
    parameters: BTreeMap<String, ParamValue>,
}

impl<S: Subject> GeoLocation<S> {
    /// A location for a subject the provider could not place.
    ///
    /// The coordinate is [`Coordinate::ZERO`] and must not be trusted.
    #[must_use]
    pub fn invalid(subject: S) -> Self {
        Self::from_parts(subject, Coordinate::ZERO, false, BTreeMap::new())
    }

    #[must_use]
    pub fn new(subject: S, latitude_deg: f64, longitude_deg: f64) -> Self {
        Self::with_validity(subject, latitude_deg, longitude_deg, true)
    }

    #[must_use]
    pub fn with_validity(
        subject: S,
        latitude_deg: f64,
        longitude_deg: f64,
        is_valid: bool,
    ) -> Self {
        Self::from_parts(
            subject,
            Coordinate::new(latitude_deg, longitude_deg),
            is_valid,
            BTreeMap::new(),
        )
    }

    #[must_use]
    pub fn from_parts(
        subject: S,
        coordinate: Coordinate,
        is_valid: bool,
        parameters: BTreeMap<String, ParamValue>,
    ) -> Self {
        Self {
            subject,
            coordinate,
            is_valid,
            parameters,
        }
    }

    /// Copies this location with a fresh parameter map and the same subject.
    #[must_use]
    pub fn shallow_copy(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            coordinate: self.coordinate,
            is_valid: self.is_valid,
            parameters: self.parameters.clone(),
        }
    }

    #[must_use]
    pub fn set_parameter(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn subject(&self) -> &S {
        &self.subject
    }

    /// Only meaningful when [`GeoLocation::has_valid_coordinates`] is `true`.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude_deg
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude_deg
    }

    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    #[must_use]
    pub fn has_parameter(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    /// A short label such as `"Berlin, Germany"`, built from the well-known keys.
    #[must_use]
    pub fn place_label(&self) -> Option<String> {
        let city = self
            .parameter(KEY_CITY)
            .and_then(ParamValue::as_str)
            .filter(|s| !s.is_empty());
        let country = self
            .parameter(KEY_COUNTRY)
            .and_then(ParamValue::as_str)
            .filter(|s| !s.is_empty());
        match (city, country) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
            (None, None) => None,
        }
    }
}

impl<S: PartialEq> PartialEq for GeoLocation<S> {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
    }
}

impl<S: Eq> Eq for GeoLocation<S> {}

impl<S: Hash> Hash for GeoLocation<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subject.hash(state);
    }
}

impl<S: std::fmt::Display> std::fmt::Display for GeoLocation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [valid={}, {}]",
            self.subject, self.is_valid, self.coordinate
        )
    }
}
