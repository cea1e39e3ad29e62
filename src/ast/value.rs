//! Condition value model
//!
//! `Value` is the tagged union carried by search conditions. It mirrors the
//! JSON wire shape: scalars, RFC 3339 timestamps, lists, and raw JSON
//! documents (JSONB payloads and GeoJSON geometries). Geometry, bounding-box,
//! distance-pair, and range-pair inputs are shapes over these variants,
//! recovered on demand through the `as_*` views.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A condition value.
#[derive(Debug, Clone)]
pub enum Value {
    /// JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Instant in time, parsed from RFC 3339 strings
    Timestamp(DateTime<Utc>),
    /// Ordered list of values
    List(Vec<Value>),
    /// Arbitrary JSON document (JSONB payloads, GeoJSON geometries)
    Json(serde_json::Value),
}

impl Value {
    /// Converts a raw JSON value into a condition value.
    ///
    /// Strings that parse as RFC 3339 instants become `Timestamp`; objects
    /// are kept as raw JSON.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(ts) => Value::Timestamp(ts.with_timezone(&Utc)),
                Err(_) => Value::String(s),
            },
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Json(obj),
        }
    }

    /// Converts back into a raw JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => {
                serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Json(json) => json.clone(),
        }
    }

    /// Short kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Json(_) => "json",
        }
    }

    /// True for scalar variants (everything except lists and raw JSON).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Json(_))
    }

    /// True for variants with a defined ordering.
    pub fn is_ordered_scalar(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Float(_) | Value::String(_) | Value::Timestamp(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Interprets this value as a GeoJSON geometry.
    pub fn as_geometry(&self) -> Option<Geometry> {
        match self {
            Value::Json(json) => Geometry::from_geojson(json),
            _ => None,
        }
    }

    /// Interprets this value as a `[min_x, min_y, max_x, max_y]` bounding box.
    pub fn as_bbox(&self) -> Option<[f64; 4]> {
        match self {
            Value::List(items) if items.len() == 4 => {
                let mut bbox = [0.0; 4];
                for (slot, item) in bbox.iter_mut().zip(items) {
                    *slot = item.as_f64()?;
                }
                Some(bbox)
            }
            _ => None,
        }
    }

    /// Interprets this value as a `[geometry, distance_meters]` pair.
    pub fn as_dwithin(&self) -> Option<(Geometry, f64)> {
        match self {
            Value::List(items) if items.len() == 2 => {
                let geometry = items[0].as_geometry()?;
                let distance = items[1].as_f64()?;
                Some((geometry, distance))
            }
            _ => None,
        }
    }

    /// Interprets this value as an inclusive `[low, high]` range pair.
    pub fn as_range(&self) -> Option<(&Value, &Value)> {
        match self {
            Value::List(items) if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }

    /// Natural ordering between two values.
    ///
    /// Numbers compare numerically across integer/float variants, strings
    /// lexicographically, timestamps chronologically. Mixed kinds are never
    /// ordered.
    pub fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total ordering used for sorting result sets.
    ///
    /// Values of different kinds order by a fixed kind rank so that sorts
    /// stay deterministic on heterogeneous data.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        if let Some(ordering) = self.partial_cmp(other) {
            return ordering;
        }
        let rank = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::Timestamp(_) => 3,
                Value::String(_) => 4,
                Value::List(_) => 5,
                Value::Json(_) => 6,
            }
        };
        match rank(self).cmp(&rank(other)) {
            Ordering::Equal => match (self, other) {
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
            unequal => unequal,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        if let serde_json::Value::Number(n) = &json {
            if n.as_i64().is_none() && n.as_f64().is_none() {
                return Err(D::Error::custom("unrepresentable number"));
            }
        }
        Ok(Value::from_json(json))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        // Same inference as JSON decoding, so equality survives round-trips.
        Value::from_json(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::from_json(serde_json::Value::String(s))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// GeoJSON geometry kinds accepted by the spatial operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryKind {
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(GeometryKind::Point),
            "LineString" => Some(GeometryKind::LineString),
            "Polygon" => Some(GeometryKind::Polygon),
            "MultiPoint" => Some(GeometryKind::MultiPoint),
            "MultiLineString" => Some(GeometryKind::MultiLineString),
            "MultiPolygon" => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }
}

/// A validated GeoJSON geometry, kept in its raw JSON form for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    kind: GeometryKind,
    raw: serde_json::Value,
}

impl Geometry {
    /// Parses a GeoJSON object, requiring a known `type` and `coordinates`.
    pub fn from_geojson(json: &serde_json::Value) -> Option<Self> {
        let obj = json.as_object()?;
        let kind = GeometryKind::from_type_name(obj.get("type")?.as_str()?)?;
        if !obj.get("coordinates")?.is_array() {
            return None;
        }
        Some(Self {
            kind,
            raw: json.clone(),
        })
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// GeoJSON text, suitable for binding into `ST_GeomFromGeoJSON`.
    pub fn to_geojson_string(&self) -> String {
        self.raw.to_string()
    }
}
