//! Version value object

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::VersionError;

static FULL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[1-9][0-9]*\.[0-9]+\.[0-9]+").expect("valid regex"));
static PARTIAL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[1-9][0-9]*\.[0-9]+").expect("valid regex"));

/// Dotted `major.minor.patch` version.
///
/// Ordering is lexicographic over (major, minor, patch), which is what the
/// derived `Ord` gives for this field order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Find a version inside arbitrary text such as a version banner.
    ///
    /// A full `N.N.N` match wins over a partial `N.N` one, wherever they are.
    pub fn extract(text: &str) -> Result<Self, VersionError> {
        let found = FULL_VERSION
            .find(text)
            .or_else(|| PARTIAL_VERSION.find(text))
            .ok_or_else(|| VersionError::NotFound {
                text: text.to_string(),
            })?;
        found.as_str().parse()
    }

    /// True when `self` is strictly lower than `other`.
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    /// True when `self` is strictly higher than `other`.
    ///
    /// Lexicographic: `5.0.2` is not after `5.1.1`.
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl FromStr for Version {
    type Err = VersionError;

    /// Accepts `N.N` or `N.N.N`; a missing patch is 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if !matches!(parts.len(), 2 | 3) {
            return Err(VersionError::FieldCount {
                input: s.to_string(),
                count: parts.len(),
            });
        }

        let field = |name: &'static str, value: &str| {
            value
                .parse::<u32>()
                .map_err(|source| VersionError::InvalidNumber {
                    field: name,
                    input: s.to_string(),
                    source,
                })
        };

        Ok(Self {
            major: field("major", parts[0])?,
            minor: field("minor", parts[1])?,
            patch: match parts.get(2) {
                Some(patch) => field("patch", patch)?,
                None => 0,
            },
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_version() {
        let version: Version = "5.0.1".parse().unwrap();
        assert_eq!(version, Version::new(5, 0, 1));
    }

    #[test]
    fn parse_partial_version_defaults_patch() {
        let version: Version = "6.1".parse().unwrap();
        assert_eq!(version, Version::new(6, 1, 0));
        assert_eq!(version.to_string(), "6.1.0");
    }

    #[test]
    fn parse_canonical_display() {
        for (input, expected) in [("1.2", "1.2.0"), ("10.20.30", "10.20.30"), ("0.0", "0.0.0")] {
            let version: Version = input.parse().unwrap();
            assert_eq!(version.to_string(), expected);
        }
    }

    #[test]
    fn parse_rejects_wrong_field_count() {
        let err = "1".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::FieldCount { count: 1, .. }));

        let err = "1.2.3.4".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::FieldCount { count: 4, .. }));
    }

    #[test]
    fn parse_rejects_bad_numbers() {
        let err = "1.x.3".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::InvalidNumber { field: "minor", .. }));

        let err = "-1.2.3".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::InvalidNumber { field: "major", .. }));

        // Does not fit 32 bits
        let err = "1.2.4294967296".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::InvalidNumber { field: "patch", .. }));
    }

    #[test]
    fn extract_from_banner() {
        let version =
            Version::extract("ffmpeg version 5.1.2-static https://johnvansickle.com/ffmpeg/")
                .unwrap();
        assert_eq!(version, Version::new(5, 1, 2));
    }

    #[test]
    fn extract_with_suffix() {
        assert_eq!(
            Version::extract("1.2.3-alpha.1").unwrap(),
            Version::new(1, 2, 3)
        );
    }

    #[test]
    fn extract_falls_back_to_partial() {
        assert_eq!(
            Version::extract("ffmpeg version n6.1-latest").unwrap(),
            Version::new(6, 1, 0)
        );
        assert_eq!(
            Version::extract("1.2-alpha.1").unwrap(),
            Version::new(1, 2, 0)
        );
    }

    #[test]
    fn extract_not_found() {
        let err = Version::extract("no version here").unwrap_err();
        assert_eq!(
            err,
            VersionError::NotFound {
                text: "no version here".to_string()
            }
        );
        assert_eq!(err.to_string(), "version not found in \"no version here\"");
    }

    #[test]
    fn before_is_strict() {
        assert!(Version::new(5, 0, 0).is_before(&Version::new(5, 0, 1)));
        assert!(!Version::new(5, 0, 1).is_before(&Version::new(5, 0, 1)));
        assert!(!Version::new(5, 1, 0).is_before(&Version::new(5, 0, 1)));
        assert!(Version::new(4, 9, 9).is_before(&Version::new(5, 0, 0)));
    }

    #[test]
    fn after_is_lexicographic() {
        assert!(Version::new(5, 1, 0).is_after(&Version::new(5, 0, 1)));
        assert!(!Version::new(5, 0, 1).is_after(&Version::new(5, 0, 1)));
        assert!(!Version::new(5, 0, 0).is_after(&Version::new(5, 0, 1)));
        assert!(!Version::new(5, 0, 2).is_after(&Version::new(5, 1, 1)));
    }
}
