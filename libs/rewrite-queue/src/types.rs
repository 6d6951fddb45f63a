//! Rule set type definitions
//!
//! Core value types shared by the register, the queue builder and the engine:
//! - RuleSetVersion: opaque, strictly compared version tag
//! - Placement: where a rule set wants to land in the build order
//! - Registration: one (name, version, placement) triple

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement key for rules that must be built first
pub const TOP_KEY: &str = "top";

/// Placement key for rules that must be built last
pub const BOTTOM_KEY: &str = "bottom";

/// Optional prefix accepted when parsing an "after" placement
pub const AFTER_PREFIX: &str = "after:";

// ============================================================================
// Version
// ============================================================================

/// Version tag supplied by the registrant
///
/// Only compared for equality, never parsed or ordered. Comparison is
/// type-sensitive: `Int(1)`, `Float(1.0)` and `Text("1")` are all different.
/// `Float(NaN)` never equals itself, so a NaN version always forces a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "VersionRepr", into = "VersionRepr")]
pub enum RuleSetVersion {
    /// No version supplied
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl RuleSetVersion {
    /// Version that never matches any stored version
    pub fn always_changed() -> Self {
        RuleSetVersion::Float(f64::NAN)
    }
}

/// Stored form of a version
///
/// JSON has no literal for non-finite floats, so those are written as
/// `{"$float": "inf" | "-inf" | "nan"}`; everything else stays untagged.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum VersionRepr {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    NonFinite {
        #[serde(rename = "$float")]
        float: NonFinite,
    },
}

#[derive(Serialize, Deserialize)]
enum NonFinite {
    #[serde(rename = "inf")]
    Infinity,
    #[serde(rename = "-inf")]
    NegInfinity,
    #[serde(rename = "nan")]
    NaN,
}

impl From<RuleSetVersion> for VersionRepr {
    fn from(v: RuleSetVersion) -> Self {
        match v {
            RuleSetVersion::Null => VersionRepr::Null,
            RuleSetVersion::Int(v) => VersionRepr::Int(v),
            RuleSetVersion::Float(v) if v.is_finite() => VersionRepr::Float(v),
            RuleSetVersion::Float(v) => VersionRepr::NonFinite {
                float: if v.is_nan() {
                    NonFinite::NaN
                } else if v > 0.0 {
                    NonFinite::Infinity
                } else {
                    NonFinite::NegInfinity
                },
            },
            RuleSetVersion::Text(v) => VersionRepr::Text(v),
        }
    }
}

impl From<VersionRepr> for RuleSetVersion {
    fn from(repr: VersionRepr) -> Self {
        match repr {
            VersionRepr::Null => RuleSetVersion::Null,
            VersionRepr::Int(v) => RuleSetVersion::Int(v),
            VersionRepr::Float(v) => RuleSetVersion::Float(v),
            VersionRepr::Text(v) => RuleSetVersion::Text(v),
            VersionRepr::NonFinite { float } => RuleSetVersion::Float(match float {
                NonFinite::Infinity => f64::INFINITY,
                NonFinite::NegInfinity => f64::NEG_INFINITY,
                NonFinite::NaN => f64::NAN,
            }),
        }
    }
}

impl fmt::Display for RuleSetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSetVersion::Null => write!(f, "null"),
            RuleSetVersion::Int(v) => write!(f, "{}", v),
            RuleSetVersion::Float(v) => write!(f, "{}", v),
            RuleSetVersion::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for RuleSetVersion {
    fn from(v: i64) -> Self {
        RuleSetVersion::Int(v)
    }
}

impl From<i32> for RuleSetVersion {
    fn from(v: i32) -> Self {
        RuleSetVersion::Int(i64::from(v))
    }
}

impl From<f64> for RuleSetVersion {
    fn from(v: f64) -> Self {
        RuleSetVersion::Float(v)
    }
}

impl From<&str> for RuleSetVersion {
    fn from(v: &str) -> Self {
        RuleSetVersion::Text(v.to_string())
    }
}

impl From<String> for RuleSetVersion {
    fn from(v: String) -> Self {
        RuleSetVersion::Text(v)
    }
}

impl<T: Into<RuleSetVersion>> From<Option<T>> for RuleSetVersion {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Requested position of a rule set in the build order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    /// Immediately after the named rule set
    After(String),
}

impl Placement {
    /// Create an "after" placement
    pub fn after(name: impl Into<String>) -> Self {
        Placement::After(name.into())
    }

    /// Internal register key: "top", "bottom", or the referenced name
    pub fn key(&self) -> &str {
        match self {
            Placement::Top => TOP_KEY,
            Placement::Bottom => BOTTOM_KEY,
            Placement::After(name) => name,
        }
    }

    /// Parse a register key back into a placement
    ///
    /// Accepts "top", "bottom", "after:<name>" or a bare rule set name.
    pub fn from_key(key: &str) -> Self {
        match key {
            TOP_KEY => Placement::Top,
            BOTTOM_KEY => Placement::Bottom,
            other => Placement::After(
                other
                    .strip_prefix(AFTER_PREFIX)
                    .unwrap_or(other)
                    .to_string(),
            ),
        }
    }
}

impl From<&str> for Placement {
    fn from(key: &str) -> Self {
        Placement::from_key(key)
    }
}

impl From<String> for Placement {
    fn from(key: String) -> Self {
        Placement::from_key(&key)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::After(name) => write!(f, "{}{}", AFTER_PREFIX, name),
            _ => f.write_str(self.key()),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// A single registration request
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub version: RuleSetVersion,
    pub placement: Placement,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<RuleSetVersion>,
        placement: impl Into<Placement>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            placement: placement.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_placement_keys() {
        assert_eq!(Placement::Top.key(), "top");
        assert_eq!(Placement::Bottom.key(), "bottom");
        assert_eq!(Placement::after("posts").key(), "posts");
        assert_eq!(Placement::default(), Placement::Bottom);
    }

    #[test]
    fn test_placement_from_key() {
        assert_eq!(Placement::from("top"), Placement::Top);
        assert_eq!(Placement::from("bottom"), Placement::Bottom);
        assert_eq!(Placement::from("after:posts"), Placement::after("posts"));
        assert_eq!(Placement::from("posts"), Placement::after("posts"));
        assert_eq!(Placement::after("posts").to_string(), "after:posts");
    }

    #[test]
    fn test_version_equality_is_type_sensitive() {
        assert_eq!(RuleSetVersion::from(1), RuleSetVersion::Int(1));
        assert_ne!(RuleSetVersion::from(1), RuleSetVersion::from("1"));
        assert_ne!(RuleSetVersion::from(1), RuleSetVersion::from(1.0));
        assert_eq!(RuleSetVersion::from(None::<&str>), RuleSetVersion::Null);
    }

    #[test]
    fn test_version_json_is_untagged() {
        let versions = vec![
            RuleSetVersion::Null,
            RuleSetVersion::Int(3),
            RuleSetVersion::Float(1.2),
            RuleSetVersion::from("rc3"),
        ];
        let json = serde_json::to_string(&versions).unwrap();
        assert_eq!(json, r#"[null,3,1.2,"rc3"]"#);

        let back: Vec<RuleSetVersion> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, versions);
    }

    #[test]
    fn test_non_finite_float_json() {
        let versions = vec![
            RuleSetVersion::Float(f64::INFINITY),
            RuleSetVersion::Float(f64::NEG_INFINITY),
        ];
        let json = serde_json::to_string(&versions).unwrap();
        assert_eq!(json, r#"[{"$float":"inf"},{"$float":"-inf"}]"#);

        let back: Vec<RuleSetVersion> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, versions);
    }

    #[test]
    fn test_nan_version_stays_nan_and_never_matches() {
        let json = serde_json::to_string(&RuleSetVersion::always_changed()).unwrap();
        assert_eq!(json, r#"{"$float":"nan"}"#);

        let back: RuleSetVersion = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, RuleSetVersion::Float(v) if v.is_nan()));
        assert_ne!(back, RuleSetVersion::always_changed());
    }
}
