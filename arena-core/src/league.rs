//! League definitions for fantasy sports markets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leagues with tradeable events on JockMkt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    /// National Basketball Association
    Nba,
    /// National Football League
    Nfl,
    /// National Hockey League
    Nhl,
    /// PGA Tour golf
    Pga,
    /// Major League Baseball
    Mlb,
    /// NASCAR Cup Series
    Nascar,
}

impl League {
    /// Wire identifier used in API paths and subscription keys
    pub fn as_str(&self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Nfl => "nfl",
            League::Nhl => "nhl",
            League::Pga => "pga",
            League::Mlb => "mlb",
            League::Nascar => "nascar",
        }
    }

    /// Get the full display name
    pub fn display_name(&self) -> &'static str {
        match self {
            League::Nba => "NBA",
            League::Nfl => "NFL",
            League::Nhl => "NHL",
            League::Pga => "PGA",
            League::Mlb => "MLB",
            League::Nascar => "NASCAR",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nba" => Ok(League::Nba),
            "nfl" => Ok(League::Nfl),
            "nhl" => Ok(League::Nhl),
            "pga" => Ok(League::Pga),
            "mlb" => Ok(League::Mlb),
            "nascar" => Ok(League::Nascar),
            _ => Err(format!("Unknown league: {}", s)),
        }
    }
}
