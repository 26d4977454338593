use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Roster position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    OT,
    OG,
    C,
    DE,
    DT,
    LB,
    CB,
    S,
    K,
    P,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown position: {0}")]
pub struct ParsePositionError(pub String);

impl Position {
    pub const ALL: [Position; 14] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::OT,
        Position::OG,
        Position::C,
        Position::DE,
        Position::DT,
        Position::LB,
        Position::CB,
        Position::S,
        Position::K,
        Position::P,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::OT => "OT",
            Position::OG => "OG",
            Position::C => "C",
            Position::DE => "DE",
            Position::DT => "DT",
            Position::LB => "LB",
            Position::CB => "CB",
            Position::S => "S",
            Position::K => "K",
            Position::P => "P",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Position::QB => "quarterback",
            Position::RB => "running_back",
            Position::WR => "wide_receiver",
            Position::TE => "tight_end",
            Position::OT => "offensive_tackle",
            Position::OG => "offensive_guard",
            Position::C => "center",
            Position::DE => "defensive_end",
            Position::DT => "defensive_tackle",
            Position::LB => "linebacker",
            Position::CB => "cornerback",
            Position::S => "safety",
            Position::K => "kicker",
            Position::P => "punter",
        }
    }

    pub fn is_specialist(&self) -> bool {
        matches!(self, Position::K | Position::P)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    /// Accepts abbreviations (`"QB"`) and snake-case names (`"quarterback"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let position = match normalized.as_str() {
            "qb" | "quarterback" => Position::QB,
            "rb" | "hb" | "running_back" | "halfback" => Position::RB,
            "wr" | "wide_receiver" => Position::WR,
            "te" | "tight_end" => Position::TE,
            "ot" | "lt" | "rt" | "offensive_tackle" | "tackle" => Position::OT,
            "og" | "lg" | "rg" | "offensive_guard" | "guard" => Position::OG,
            "c" | "center" => Position::C,
            "de" | "edge" | "defensive_end" => Position::DE,
            "dt" | "nt" | "defensive_tackle" => Position::DT,
            "lb" | "mlb" | "olb" | "linebacker" => Position::LB,
            "cb" | "cornerback" => Position::CB,
            "s" | "fs" | "ss" | "safety" => Position::S,
            "k" | "kicker" => Position::K,
            "p" | "punter" => Position::P,
            _ => return Err(ParsePositionError(s.to_string())),
        };
        Ok(position)
    }
}
