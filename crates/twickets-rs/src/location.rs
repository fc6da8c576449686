//! Countries and regions understood by the catalogue feed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TwicketsError;

/// Countries the feed can be queried for. Only the UK is supported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "GB")]
    UnitedKingdom,
}

impl Country {
    pub const ALL: [Country; 1] = [Country::UnitedKingdom];

    pub fn code(self) -> &'static str {
        match self {
            Country::UnitedKingdom => "GB",
        }
    }

    /// Regions belonging to this country.
    pub fn regions(self) -> impl Iterator<Item = Region> {
        Region::ALL.into_iter().filter(move |r| r.country() == self)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = TwicketsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(TwicketsError::InvalidInput("country must be set".to_string()));
        }
        Country::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| TwicketsError::InvalidInput(format!("country '{}' is not valid", code)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "GBEA")]
    EastAnglia,
    #[serde(rename = "GBLO")]
    London,
    #[serde(rename = "GBMI")]
    Midlands,
    #[serde(rename = "GBNO")]
    North,
    #[serde(rename = "GBNE")]
    NorthEast,
    #[serde(rename = "GBNW")]
    NorthWest,
    #[serde(rename = "GBNI")]
    NorthernIreland,
    #[serde(rename = "GBSC")]
    Scotland,
    #[serde(rename = "GBSO")]
    South,
    #[serde(rename = "GBSW")]
    SouthWest,
    #[serde(rename = "GBWA")]
    Wales,
}

impl Region {
    pub const ALL: [Region; 11] = [
        Region::EastAnglia,
        Region::London,
        Region::Midlands,
        Region::North,
        Region::NorthEast,
        Region::NorthWest,
        Region::NorthernIreland,
        Region::Scotland,
        Region::South,
        Region::SouthWest,
        Region::Wales,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::EastAnglia => "GBEA",
            Region::London => "GBLO",
            Region::Midlands => "GBMI",
            Region::North => "GBNO",
            Region::NorthEast => "GBNE",
            Region::NorthWest => "GBNW",
            Region::NorthernIreland => "GBNI",
            Region::Scotland => "GBSC",
            Region::South => "GBSO",
            Region::SouthWest => "GBSW",
            Region::Wales => "GBWA",
        }
    }

    pub fn country(self) -> Country {
        Country::UnitedKingdom
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = TwicketsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| TwicketsError::InvalidInput(format!("region '{}' is not valid", code)))
    }
}
