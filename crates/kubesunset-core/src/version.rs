//! Kubernetes release versions and API version names
//!
//! Two kinds of versions show up when judging API deprecations:
//! - [`Version`]: a Kubernetes release such as `v1.26.0`, `1.27` or
//!   `v1.26.3-eks-a5565ad`. Parsing is tolerant of a leading `v` and a missing
//!   patch number; ordering follows SemVer precedence and ignores build
//!   metadata.
//! - [`ApiVersion`]: an API version name such as `v1beta1`, ordered by the
//!   priority Kubernetes itself uses (GA over beta over alpha).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{CoreError, Result};

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)(?:\.(\d+))?(?:-([0-9A-Za-z.-]+))?(?:\+([0-9A-Za-z.-]+))?$")
        .expect("valid regex")
});

static API_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v([1-9]\d*)(?:(alpha|beta)([1-9]\d*))?$").expect("valid regex"));

/// A Kubernetes release version
///
/// Equality, hashing and ordering look at `major.minor.patch` and the
/// pre-release only. Build metadata is retained for display.
#[derive(Debug, Clone)]
pub struct Version(semver::Version);

impl Version {
    /// Create a release version without pre-release or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse `vMAJOR.MINOR[.PATCH][-PRERELEASE][+BUILD]`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidVersionFormat {
            input: input.to_string(),
        };

        let caps = VERSION_RE.captures(input.trim()).ok_or_else(invalid)?;

        let mut normalized = format!(
            "{}.{}.{}",
            &caps[1],
            &caps[2],
            caps.get(3).map_or("0", |m| m.as_str())
        );
        if let Some(pre) = caps.get(4) {
            normalized.push('-');
            normalized.push_str(pre.as_str());
        }
        if let Some(build) = caps.get(5) {
            normalized.push('+');
            normalized.push_str(build.as_str());
        }

        // semver rejects leading zeros and empty identifiers the regex lets through
        semver::Version::parse(&normalized)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Pre-release component, if any
    pub fn pre(&self) -> Option<&str> {
        (!self.0.pre.is_empty()).then(|| self.0.pre.as_str())
    }

    /// `MAJOR.MINOR` form used in human-readable labels (`1.26`)
    pub fn release_line(&self) -> String {
        format!("{}.{}", self.0.major, self.0.minor)
    }

    /// Access the underlying SemVer value
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.major.hash(state);
        self.0.minor.hash(state);
        self.0.patch.hash(state);
        self.0.pre.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.major, self.0.minor, self.0.patch)
            .cmp(&(other.0.major, other.0.minor, other.0.patch))
            // An empty pre-release sorts above any non-empty one
            .then_with(|| self.0.pre.cmp(&other.0.pre))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Maturity level of an API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Stability {
    Alpha,
    Beta,
    Stable,
}

/// A Kubernetes API version name (`v1`, `v2beta2`, `v1alpha1`)
///
/// Ordered by Kubernetes priority: stable above beta above alpha, then by
/// major and minor number. Names that don't follow the convention (common for
/// CRDs) sort below all conventional names, lexicographically among
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    raw: String,
    level: Option<(Stability, u64, u64)>,
}

impl ApiVersion {
    pub fn parse(raw: &str) -> Self {
        let level = API_VERSION_RE.captures(raw).and_then(|caps| {
            let major = caps[1].parse::<u64>().ok()?;
            match caps.get(2).map(|m| m.as_str()) {
                None => Some((Stability::Stable, major, 0)),
                Some(stage) => {
                    let minor = caps[3].parse::<u64>().ok()?;
                    let stability = if stage == "alpha" {
                        Stability::Alpha
                    } else {
                        Stability::Beta
                    };
                    Some((stability, major, minor))
                }
            }
        });

        Self {
            raw: raw.to_string(),
            level,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.level, &other.level) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.raw.cmp(&other.raw),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full_version() {
        let version = v("v1.26.3");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 26);
        assert_eq!(version.patch(), 3);
        assert_eq!(version.pre(), None);
    }

    #[test]
    fn test_parse_without_v_prefix() {
        assert_eq!(v("1.22.0"), v("v1.22.0"));
    }

    #[test]
    fn test_parse_missing_patch() {
        assert_eq!(v("v1.25"), Version::new(1, 25, 0));
        assert_eq!(v("1.25-rc.1").pre(), Some("rc.1"));
    }

    #[test]
    fn test_parse_vendor_suffixes() {
        let eks = v("v1.26.3-eks-a5565ad");
        assert_eq!(eks.pre(), Some("eks-a5565ad"));

        let k3s = v("v1.27.1+k3s1");
        assert_eq!(k3s, Version::new(1, 27, 1));
        assert_eq!(k3s.to_string(), "v1.27.1+k3s1");
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "v", "1", "v1", "latest", "1.x.0", "v1.2.3.4", "1.02.0", "v1.2.3-"] {
            let err = Version::parse(input).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidVersionFormat { .. }),
                "expected InvalidVersionFormat for {input:?}"
            );
        }
    }

    #[test]
    fn test_ordering_numeric() {
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("1.26.0") < v("1.26.1"));
        assert!(v("1.26.9") < v("2.0.0"));
    }

    #[test]
    fn test_prerelease_below_release() {
        assert!(v("1.26.0-alpha.1") < v("1.26.0"));
        assert!(v("1.26.0-alpha.2") < v("1.26.0-beta.0"));
        assert!(v("1.26.0-alpha.2") < v("1.26.0-alpha.10"));
        assert!(v("1.25.9") < v("1.26.0-alpha.1"));
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert_eq!(v("1.26.0+a"), v("1.26.0+b"));
        assert_eq!(v("1.26.0+a").cmp(&v("1.26.0")), Ordering::Equal);
    }

    #[test]
    fn test_display_and_release_line() {
        assert_eq!(v("1.22").to_string(), "v1.22.0");
        assert_eq!(v("v1.22.4").release_line(), "1.22");
    }

    #[test]
    fn test_serde_as_string() {
        let version: Version = serde_yaml::from_str("\"1.16\"").unwrap();
        assert_eq!(version, Version::new(1, 16, 0));
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"v1.16.0\"");
    }

    #[test]
    fn test_api_version_priority() {
        let mut versions: Vec<ApiVersion> = ["v1", "v1alpha1", "v2beta2", "v1beta1", "v2", "v1beta2", "foo"]
            .iter()
            .map(|s| ApiVersion::parse(s))
            .collect();
        versions.sort();

        let names: Vec<_> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(
            names,
            ["foo", "v1alpha1", "v1beta1", "v1beta2", "v2beta2", "v1", "v2"]
        );
    }

    #[test]
    fn test_api_version_stability() {
        assert_eq!(ApiVersion::parse("v1").level, Some((Stability::Stable, 1, 0)));
        assert_eq!(ApiVersion::parse("v2beta2").level, Some((Stability::Beta, 2, 2)));
        assert_eq!(ApiVersion::parse("v1alpha3").level, Some((Stability::Alpha, 1, 3)));
        assert_eq!(ApiVersion::parse("v1beta0").level, None);
        assert_eq!(ApiVersion::parse("2021-01-01").level, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_version() -> impl Strategy<Value = Version> {
            let pre = prop_oneof![
                Just(String::new()),
                Just("-alpha".to_string()),
                Just("-alpha.1".to_string()),
                Just("-alpha.beta".to_string()),
                Just("-beta.2".to_string()),
                Just("-beta.11".to_string()),
                Just("-rc.1".to_string()),
                Just("-eks-a5565ad".to_string()),
                Just("-1".to_string()),
            ];
            let build = prop_oneof![Just(String::new()), Just("+k3s1".to_string())];

            (0u64..3, 0u64..30, 0u64..4, pre, build).prop_map(|(major, minor, patch, pre, build)| {
                Version::parse(&format!("v{major}.{minor}.{patch}{pre}{build}"))
                    .expect("generated version parses")
            })
        }

        proptest! {
            #[test]
            fn ordering_is_antisymmetric(a in arb_version(), b in arb_version()) {
                prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            }

            #[test]
            fn ordering_is_transitive(a in arb_version(), b in arb_version(), c in arb_version()) {
                if a <= b && b <= c {
                    prop_assert!(a <= c);
                }
            }

            #[test]
            fn exactly_one_relation_holds(a in arb_version(), b in arb_version()) {
                let relations = [a < b, a == b, a > b];
                prop_assert_eq!(relations.iter().filter(|r| **r).count(), 1);
            }

            #[test]
            fn display_reparses_to_equal_version(a in arb_version()) {
                prop_assert_eq!(Version::parse(&a.to_string()).unwrap(), a);
            }
        }
    }
}
