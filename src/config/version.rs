//! Shopify API version definitions.
//!
//! This module provides the [`ApiVersion`] enum for specifying which version
//! of the Admin API to talk to, and the release-date ordering used to gate
//! version-dependent webhook features.

use crate::error::ConfigError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// First release that accepts Google Cloud Pub/Sub webhook subscriptions.
pub const PUBSUB_MINIMUM_RELEASE: (u16, u8) = (2021, 7);

/// Shopify API version.
///
/// Shopify releases new API versions quarterly (January, April, July, October).
/// Known releases have their own variants; any other well-formed `YYYY-MM`
/// string (older or newer) parses into `Custom`.
///
/// Versions are ordered by release date. `Unstable` sorts after every dated
/// release, since it tracks the newest schema.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::ApiVersion;
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2024_10);
/// assert_eq!(version.to_string(), "2024-10");
///
/// let old: ApiVersion = "2021-04".parse().unwrap();
/// assert!(old < ApiVersion::V2024_01);
/// assert!(!old.supports_pubsub());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2024-01 (January 2024)
    V2024_01,
    /// API version 2024-04 (April 2024)
    V2024_04,
    /// API version 2024-07 (July 2024)
    V2024_07,
    /// API version 2024-10 (October 2024)
    V2024_10,
    /// API version 2025-01 (January 2025)
    V2025_01,
    /// API version 2025-04 (April 2025)
    V2025_04,
    /// API version 2025-07 (July 2025)
    V2025_07,
    /// API version 2025-10 (October 2025)
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Any other `YYYY-MM` release, older or newer than the known variants.
    Custom(String),
}

impl ApiVersion {
    /// Returns the latest stable API version.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2025_10
    }

    /// Returns `true` if this is a known stable API version.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !matches!(self, Self::Unstable | Self::Custom(_))
    }

    /// Returns the `(year, month)` this version was released, if it has one.
    ///
    /// `Unstable` and malformed `Custom` strings have no release date.
    #[must_use]
    pub fn release(&self) -> Option<(u16, u8)> {
        match self {
            Self::V2024_01 => Some((2024, 1)),
            Self::V2024_04 => Some((2024, 4)),
            Self::V2024_07 => Some((2024, 7)),
            Self::V2024_10 => Some((2024, 10)),
            Self::V2025_01 => Some((2025, 1)),
            Self::V2025_04 => Some((2025, 4)),
            Self::V2025_07 => Some((2025, 7)),
            Self::V2025_10 => Some((2025, 10)),
            Self::Unstable => None,
            Self::Custom(s) => Self::parse_release(s),
        }
    }

    /// Returns `true` if this version accepts Pub/Sub webhook subscriptions.
    ///
    /// Versions without a release date are treated as newest.
    #[must_use]
    pub fn supports_pubsub(&self) -> bool {
        self.release()
            .map_or(true, |release| release >= PUBSUB_MINIMUM_RELEASE)
    }

    /// Ordering key: dated releases first, then `Unstable`, then undated
    /// custom strings. The trailing fields keep `Ord` consistent with `Eq`
    /// when a `Custom` spells out a known release.
    fn sort_key(&self) -> (u8, (u16, u8), bool, &str) {
        match (self.release(), self) {
            (Some(release), Self::Custom(s)) => (0, release, true, s.as_str()),
            (Some(release), _) => (0, release, false, ""),
            (None, Self::Unstable) => (1, (0, 0), false, ""),
            (None, Self::Custom(s)) => (2, (0, 0), true, s.as_str()),
            (None, _) => (3, (0, 0), false, ""),
        }
    }

    fn parse_release(s: &str) -> Option<(u16, u8)> {
        let (year, month) = s.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        // Shopify only releases in January, April, July and October
        let month = match month {
            "01" => 1,
            "04" => 4,
            "07" => 7,
            "10" => 10,
            _ => return None,
        };
        Some((year.parse().ok()?, month))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version_str = match self {
            Self::V2024_01 => "2024-01",
            Self::V2024_04 => "2024-04",
            Self::V2024_07 => "2024-07",
            Self::V2024_10 => "2024-10",
            Self::V2025_01 => "2025-01",
            Self::V2025_04 => "2025-04",
            Self::V2025_07 => "2025-07",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(s) => s,
        };
        f.write_str(version_str)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "2024-01" => Ok(Self::V2024_01),
            "2024-04" => Ok(Self::V2024_04),
            "2024-07" => Ok(Self::V2024_07),
            "2024-10" => Ok(Self::V2024_10),
            "2025-01" => Ok(Self::V2025_01),
            "2025-04" => Ok(Self::V2025_04),
            "2025-07" => Ok(Self::V2025_07),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            _ if Self::parse_release(&s).is_some() => Ok(Self::Custom(s)),
            _ => Err(ConfigError::InvalidApiVersion { version: s }),
        }
    }
}
