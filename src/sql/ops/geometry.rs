//! Spatial operator emission
//!
//! PostGIS predicates over GeoJSON condition values. Geometries bind as
//! GeoJSON text wrapped in `ST_SetSRID(ST_GeomFromGeoJSON($n), 4326)`;
//! bounding boxes use the index-friendly `&&` operator against
//! `ST_MakeEnvelope`.

use crate::ast::{Geometry, Value};
use crate::operators::Operator;

use super::super::errors::{BackendError, BackendResult};
use super::super::statement::ParamBinder;
use super::require_value;

pub(crate) fn emit(
    operator: Operator,
    column: &str,
    value: Option<&Value>,
    params: &mut ParamBinder,
) -> BackendResult<String> {
    let value = require_value(operator, value)?;

    match operator {
        Operator::Intersects
        | Operator::Within
        | Operator::ContainsGeom
        | Operator::Touches
        | Operator::Crosses
        | Operator::Overlaps
        | Operator::Disjoint
        | Operator::GeomEquals => {
            let geometry = expect_geometry(operator, value)?;
            let geom_sql = bind_geometry(&geometry, params);
            let function = match operator {
                Operator::Intersects => "ST_Intersects",
                Operator::Within => "ST_Within",
                Operator::ContainsGeom => "ST_Contains",
                Operator::Touches => "ST_Touches",
                Operator::Crosses => "ST_Crosses",
                Operator::Overlaps => "ST_Overlaps",
                Operator::Disjoint => "ST_Disjoint",
                _ => "ST_Equals",
            };
            Ok(format!("{function}({column}, {geom_sql})"))
        }
        Operator::DistanceLt | Operator::Dwithin => {
            let (geometry, distance) = value.as_dwithin().ok_or_else(|| {
                BackendError::translation(
                    operator.as_str(),
                    "expected a [geometry, distance_meters] pair",
                )
            })?;
            let geom_sql = bind_geometry(&geometry, params);
            let distance = params.bind(Value::Float(distance));
            Ok(match operator {
                Operator::DistanceLt => {
                    format!("ST_Distance({column}, {geom_sql}) < {distance}")
                }
                _ => format!("ST_DWithin({column}, {geom_sql}, {distance})"),
            })
        }
        Operator::BboxIntersects => {
            let bbox = value.as_bbox().ok_or_else(|| {
                BackendError::translation(operator.as_str(), "expected a 4-element bounding box")
            })?;
            let corners = bbox
                .iter()
                .map(|c| params.bind(Value::Float(*c)))
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!("{column} && ST_MakeEnvelope({corners}, 4326)"))
        }
        other => Err(BackendError::translation(
            other.as_str(),
            "not a geometry operator",
        )),
    }
}

fn expect_geometry(operator: Operator, value: &Value) -> BackendResult<Geometry> {
    value.as_geometry().ok_or_else(|| {
        BackendError::translation(operator.as_str(), "expected a GeoJSON geometry")
    })
}

fn bind_geometry(geometry: &Geometry, params: &mut ParamBinder) -> String {
    let placeholder = params.bind(Value::String(geometry.to_geojson_string()));
    format!("ST_SetSRID(ST_GeomFromGeoJSON({placeholder}), 4326)")
}
