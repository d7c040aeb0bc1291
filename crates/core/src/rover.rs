//! Static registry of the rovers exposed by the manifests API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rover known to the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rover {
    Curiosity,
    Opportunity,
    Spirit,
}

const CURIOSITY_CAMERAS: &[&str] = &[
    "FHAZ", "RHAZ", "MAST", "CHEMCAM", "MAHLI", "MARDI", "NAVCAM",
];
const MER_CAMERAS: &[&str] = &["FHAZ", "RHAZ", "NAVCAM", "PANCAM", "MINITES"];

impl Rover {
    /// Every registered rover, in canonical order.
    pub const ALL: [Rover; 3] = [Rover::Curiosity, Rover::Opportunity, Rover::Spirit];

    /// Lowercase name, used as the URL path segment.
    pub fn name(&self) -> &'static str {
        match self {
            Rover::Curiosity => "curiosity",
            Rover::Opportunity => "opportunity",
            Rover::Spirit => "spirit",
        }
    }

    /// Camera identifiers carried by this rover.
    pub fn cameras(&self) -> &'static [&'static str] {
        match self {
            Rover::Curiosity => CURIOSITY_CAMERAS,
            Rover::Opportunity | Rover::Spirit => MER_CAMERAS,
        }
    }

    /// Key under which this rover's result is stored in the aggregate.
    pub fn manifest_key(&self) -> String {
        format!("{}_manifest_data", self.name())
    }
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown rover: {0}")]
pub struct UnknownRover(pub String);

impl FromStr for Rover {
    type Err = UnknownRover;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rover::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRover(s.to_string()))
    }
}
