//! Operator registry
//!
//! The closed set of condition operators, with the arity, value shape,
//! backend support, and semantic family of each. The registry is a static
//! table consulted by the validator before execution and by both backends
//! during evaluation; it never changes at runtime.

use std::fmt;

use crate::fuzzy::closest_match;

/// Evaluator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-process predicate evaluation over JSON records
    Memory,
    /// Translation to parameterized SQL
    Sql,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Sql => "sql",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value (null/empty checks)
    Unary,
    /// Single value
    Binary,
    /// List of values
    NAry,
}

/// Shape the condition value must take for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// No value allowed
    NoValue,
    /// Any scalar
    Scalar,
    /// Number, string, or timestamp
    OrderedScalar,
    /// String with SQL wildcards or a regular expression
    Pattern,
    /// Plain string
    Text,
    /// List of values
    List,
    /// List of strings
    StringList,
    /// Two-element `[low, high]` list with `low <= high`
    RangePair,
    /// GeoJSON geometry object
    Geometry,
    /// `[min_x, min_y, max_x, max_y]` list of numbers
    Bbox,
    /// `[geometry, distance_meters]` pair
    DWithinPair,
    /// Arbitrary JSON document
    Json,
    /// Full-text search terms
    TokenText,
}

impl ValueShape {
    /// Human-readable expectation for error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            ValueShape::NoValue => "no value",
            ValueShape::Scalar => "a scalar",
            ValueShape::OrderedScalar => "an ordered scalar (number, string, or timestamp)",
            ValueShape::Pattern => "a pattern string",
            ValueShape::Text => "a string",
            ValueShape::List => "a list",
            ValueShape::StringList => "a list of strings",
            ValueShape::RangePair => "a [low, high] pair with low <= high",
            ValueShape::Geometry => "a GeoJSON geometry",
            ValueShape::Bbox => "a [min_x, min_y, max_x, max_y] bounding box",
            ValueShape::DWithinPair => "a [geometry, distance_meters] pair",
            ValueShape::Json => "a JSON value",
            ValueShape::TokenText => "a search string",
        }
    }
}

/// Semantic operator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Comparison,
    Set,
    String,
    Null,
    Jsonb,
    Geometry,
    FullText,
}

/// All supported operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    // Set
    In,
    NotIn,
    All,
    Between,
    NotBetween,
    // String
    Like,
    NotLike,
    Ilike,
    Contains,
    Icontains,
    Startswith,
    Istartswith,
    Endswith,
    Iendswith,
    Regex,
    Iregex,
    // Null / empty
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    // JSONB
    JsonbContains,
    JsonbContainedBy,
    JsonbHasKey,
    JsonbHasAnyKeys,
    JsonbHasAllKeys,
    JsonbPathExists,
    // Geometry
    Intersects,
    Within,
    ContainsGeom,
    Touches,
    Crosses,
    Overlaps,
    Disjoint,
    GeomEquals,
    DistanceLt,
    Dwithin,
    BboxIntersects,
    // Full-text
    Fts,
    FtsPhrase,
}

/// Word-form aliases mapped to canonical tags, tried before edit distance.
const ALIASES: &[(&str, &str)] = &[
    ("equals", "="),
    ("eq", "="),
    ("neq", "!="),
    ("not_equals", "!="),
    ("gt", ">"),
    ("lt", "<"),
    ("gte", ">="),
    ("lte", "<="),
];

impl Operator {
    /// Every operator, in matrix order.
    pub const ALL: [Operator; 45] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::All,
        Operator::Between,
        Operator::NotBetween,
        Operator::Like,
        Operator::NotLike,
        Operator::Ilike,
        Operator::Contains,
        Operator::Icontains,
        Operator::Startswith,
        Operator::Istartswith,
        Operator::Endswith,
        Operator::Iendswith,
        Operator::Regex,
        Operator::Iregex,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::JsonbContains,
        Operator::JsonbContainedBy,
        Operator::JsonbHasKey,
        Operator::JsonbHasAnyKeys,
        Operator::JsonbHasAllKeys,
        Operator::JsonbPathExists,
        Operator::Intersects,
        Operator::Within,
        Operator::ContainsGeom,
        Operator::Touches,
        Operator::Crosses,
        Operator::Overlaps,
        Operator::Disjoint,
        Operator::GeomEquals,
        Operator::DistanceLt,
        Operator::Dwithin,
        Operator::BboxIntersects,
        Operator::Fts,
        Operator::FtsPhrase,
    ];

    /// The operator's wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::All => "all",
            Operator::Between => "between",
            Operator::NotBetween => "not_between",
            Operator::Like => "like",
            Operator::NotLike => "not_like",
            Operator::Ilike => "ilike",
            Operator::Contains => "contains",
            Operator::Icontains => "icontains",
            Operator::Startswith => "startswith",
            Operator::Istartswith => "istartswith",
            Operator::Endswith => "endswith",
            Operator::Iendswith => "iendswith",
            Operator::Regex => "regex",
            Operator::Iregex => "iregex",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::JsonbContains => "jsonb_contains",
            Operator::JsonbContainedBy => "jsonb_contained_by",
            Operator::JsonbHasKey => "jsonb_has_key",
            Operator::JsonbHasAnyKeys => "jsonb_has_any_keys",
            Operator::JsonbHasAllKeys => "jsonb_has_all_keys",
            Operator::JsonbPathExists => "jsonb_path_exists",
            Operator::Intersects => "intersects",
            Operator::Within => "within",
            Operator::ContainsGeom => "contains_geom",
            Operator::Touches => "touches",
            Operator::Crosses => "crosses",
            Operator::Overlaps => "overlaps",
            Operator::Disjoint => "disjoint",
            Operator::GeomEquals => "geom_equals",
            Operator::DistanceLt => "distance_lt",
            Operator::Dwithin => "dwithin",
            Operator::BboxIntersects => "bbox_intersects",
            Operator::Fts => "fts",
            Operator::FtsPhrase => "fts_phrase",
        }
    }

    /// Looks up an operator by its wire tag.
    pub fn parse(tag: &str) -> Option<Operator> {
        Operator::ALL.iter().copied().find(|op| op.as_str() == tag)
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull | Operator::IsEmpty | Operator::IsNotEmpty => {
                Arity::Unary
            }
            Operator::In
            | Operator::NotIn
            | Operator::All
            | Operator::JsonbHasAnyKeys
            | Operator::JsonbHasAllKeys => Arity::NAry,
            _ => Arity::Binary,
        }
    }

    /// The value shape this operator requires.
    pub fn value_shape(&self) -> ValueShape {
        match self {
            Operator::Eq | Operator::Ne => ValueShape::Scalar,
            Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte => {
                ValueShape::OrderedScalar
            }
            Operator::In | Operator::NotIn | Operator::All => ValueShape::List,
            Operator::Between | Operator::NotBetween => ValueShape::RangePair,
            Operator::Like
            | Operator::NotLike
            | Operator::Ilike
            | Operator::Regex
            | Operator::Iregex => ValueShape::Pattern,
            Operator::Contains
            | Operator::Icontains
            | Operator::Startswith
            | Operator::Istartswith
            | Operator::Endswith
            | Operator::Iendswith => ValueShape::Text,
            Operator::IsNull | Operator::IsNotNull | Operator::IsEmpty | Operator::IsNotEmpty => {
                ValueShape::NoValue
            }
            Operator::JsonbContains | Operator::JsonbContainedBy => ValueShape::Json,
            Operator::JsonbHasKey | Operator::JsonbPathExists => ValueShape::Text,
            Operator::JsonbHasAnyKeys | Operator::JsonbHasAllKeys => ValueShape::StringList,
            Operator::Intersects
            | Operator::Within
            | Operator::ContainsGeom
            | Operator::Touches
            | Operator::Crosses
            | Operator::Overlaps
            | Operator::Disjoint
            | Operator::GeomEquals => ValueShape::Geometry,
            Operator::DistanceLt | Operator::Dwithin => ValueShape::DWithinPair,
            Operator::BboxIntersects => ValueShape::Bbox,
            Operator::Fts | Operator::FtsPhrase => ValueShape::TokenText,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Lt
            | Operator::Gte
            | Operator::Lte => Family::Comparison,
            Operator::In
            | Operator::NotIn
            | Operator::All
            | Operator::Between
            | Operator::NotBetween => Family::Set,
            Operator::Like
            | Operator::NotLike
            | Operator::Ilike
            | Operator::Contains
            | Operator::Icontains
            | Operator::Startswith
            | Operator::Istartswith
            | Operator::Endswith
            | Operator::Iendswith
            | Operator::Regex
            | Operator::Iregex => Family::String,
            Operator::IsNull | Operator::IsNotNull | Operator::IsEmpty | Operator::IsNotEmpty => {
                Family::Null
            }
            Operator::JsonbContains
            | Operator::JsonbContainedBy
            | Operator::JsonbHasKey
            | Operator::JsonbHasAnyKeys
            | Operator::JsonbHasAllKeys
            | Operator::JsonbPathExists => Family::Jsonb,
            Operator::Intersects
            | Operator::Within
            | Operator::ContainsGeom
            | Operator::Touches
            | Operator::Crosses
            | Operator::Overlaps
            | Operator::Disjoint
            | Operator::GeomEquals
            | Operator::DistanceLt
            | Operator::Dwithin
            | Operator::BboxIntersects => Family::Geometry,
            Operator::Fts | Operator::FtsPhrase => Family::FullText,
        }
    }

    /// Whether the operator is admissible on the given backend.
    pub fn supported_by(&self, backend: Backend) -> bool {
        match self.family() {
            Family::Jsonb | Family::Geometry | Family::FullText => backend == Backend::Sql,
            _ => true,
        }
    }

    /// Tags supported by a backend, in matrix order.
    pub fn supported_tags(backend: Backend) -> Vec<&'static str> {
        Operator::ALL
            .iter()
            .filter(|op| op.supported_by(backend))
            .map(|op| op.as_str())
            .collect()
    }

    /// Best-effort suggestion for an unknown tag: the alias table first,
    /// then the closest registered tag within edit distance 2.
    pub fn suggest(unknown: &str) -> Option<String> {
        let lowered = unknown.to_lowercase();
        for (alias, canonical) in ALIASES {
            if *alias == lowered {
                return Some((*canonical).to_string());
            }
        }
        closest_match(unknown, Operator::ALL.iter().map(|op| op.as_str()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(Operator::parse("equals"), None);
        assert_eq!(Operator::parse(""), None);
    }

    #[test]
    fn test_unary_operators_take_no_value() {
        for op in [
            Operator::IsNull,
            Operator::IsNotNull,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ] {
            assert_eq!(op.arity(), Arity::Unary);
            assert_eq!(op.value_shape(), ValueShape::NoValue);
        }
    }

    #[test]
    fn test_backend_support_matrix() {
        // Shared families run everywhere.
        assert!(Operator::Eq.supported_by(Backend::Memory));
        assert!(Operator::Eq.supported_by(Backend::Sql));
        assert!(Operator::Between.supported_by(Backend::Memory));
        assert!(Operator::Iregex.supported_by(Backend::Memory));

        // JSONB, geometry, and full-text are SQL-only.
        for op in [Operator::JsonbContains, Operator::Intersects, Operator::Fts] {
            assert!(!op.supported_by(Backend::Memory));
            assert!(op.supported_by(Backend::Sql));
        }
    }

    #[test]
    fn test_memory_subset_of_sql() {
        let sql: Vec<_> = Operator::supported_tags(Backend::Sql);
        for tag in Operator::supported_tags(Backend::Memory) {
            assert!(sql.contains(&tag), "memory operator {tag} missing from sql");
        }
        assert_eq!(sql.len(), Operator::ALL.len());
    }

    #[test]
    fn test_suggest_alias() {
        assert_eq!(Operator::suggest("equals"), Some("=".to_string()));
        assert_eq!(Operator::suggest("eq"), Some("=".to_string()));
        assert_eq!(Operator::suggest("neq"), Some("!=".to_string()));
    }

    #[test]
    fn test_suggest_edit_distance() {
        assert_eq!(Operator::suggest("betwen"), Some("between".to_string()));
        assert_eq!(Operator::suggest("ilke"), Some("ilike".to_string()));
        assert_eq!(Operator::suggest("xyzzy_nothing"), None);
    }
}
