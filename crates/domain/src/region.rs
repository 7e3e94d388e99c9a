//! Region areas and their endpoint tables
//!
//! Each area maps to an ordered list of regional prefixes (the left-most DNS
//! label of an endpoint) and an ordered list of major domain suffixes with
//! the area-local suffix first. The table is static and every area has at
//! least one entry in each list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RestError;

/// Overseas major domain.
pub const AGORA_IO: &str = "agora.io";
/// Mainland China major domain.
pub const SD_RTN_COM: &str = "sd-rtn.com";

const OVERSEAS_SUFFIXES: &[&str] = &[AGORA_IO, SD_RTN_COM];
const MAINLAND_SUFFIXES: &[&str] = &[SD_RTN_COM, AGORA_IO];

const US_PREFIXES: &[&str] = &["api-us-west-1", "api-us-east-1"];
const EU_PREFIXES: &[&str] = &["api-eu-west-1", "api-eu-central-1"];
const AP_PREFIXES: &[&str] = &["api-ap-southeast-1", "api-ap-northeast-1"];
const CN_PREFIXES: &[&str] = &["api-cn-east-1", "api-cn-north-1"];

/// Top-level geographic grouping that selects eligible endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum RegionArea {
    /// United States
    US,
    /// Europe
    EU,
    /// Asia Pacific
    AP,
    /// Mainland China
    CN,
}

impl RegionArea {
    /// Every recognised area, in declaration order.
    pub const ALL: [RegionArea; 4] = [Self::US, Self::EU, Self::AP, Self::CN];

    /// Ordered regional prefixes for this area.
    pub const fn region_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::US => US_PREFIXES,
            Self::EU => EU_PREFIXES,
            Self::AP => AP_PREFIXES,
            Self::CN => CN_PREFIXES,
        }
    }

    /// Ordered major domain suffixes, area-local suffix first.
    pub const fn domain_suffixes(self) -> &'static [&'static str] {
        match self {
            Self::CN => MAINLAND_SUFFIXES,
            Self::US | Self::EU | Self::AP => OVERSEAS_SUFFIXES,
        }
    }

    /// Canonical upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::US => "US",
            Self::EU => "EU",
            Self::AP => "AP",
            Self::CN => "CN",
        }
    }
}

impl fmt::Display for RegionArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionArea {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::US),
            "EU" => Ok(Self::EU),
            "AP" => Ok(Self::AP),
            "CN" => Ok(Self::CN),
            _ => Err(RestError::InvalidArea(s.to_string())),
        }
    }
}

impl TryFrom<String> for RegionArea {
    type Error = RestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionArea> for &'static str {
    fn from(area: RegionArea) -> Self {
        area.as_str()
    }
}
