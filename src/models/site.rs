//! Canonical site keys

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed prefix carried by every canonical site key
pub const SITE_PREFIX: &str = "W";

static SITE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:w)?\s*([0-9]+)$").expect("valid site pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid site key '{0}': expected digits with an optional 'W' prefix")]
pub struct InvalidSiteId(pub String);

/// A site identifier in canonical form (`W` followed by digits, e.g. `W100`).
///
/// The unit of scoping for duplicate detection and category requirements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// Parse any accepted spelling (`w100`, ` W 100 `, `100`) into canonical form
    pub fn parse(raw: &str) -> Result<Self, InvalidSiteId> {
        let trimmed = raw.trim();
        let caps = SITE_PATTERN
            .captures(trimmed)
            .ok_or_else(|| InvalidSiteId(raw.to_string()))?;
        Ok(Self(format!("{}{}", SITE_PREFIX, &caps[1])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SiteId {
    type Err = InvalidSiteId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SiteId {
    type Error = InvalidSiteId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SiteId> for String {
    fn from(site: SiteId) -> Self {
        site.0
    }
}
