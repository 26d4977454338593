//! Positional need urgency derived from roster composition.
//!
//! Deterministic for a given roster: no randomness, ordered output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Player, Position};

/// Rating at which a player counts as a credible starter.
pub const STARTER_QUALITY: u8 = 70;

/// Age at which a starter starts to look like a succession problem.
const AGING_STARTER: u8 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NeedUrgency {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl NeedUrgency {
    /// Scalar weight in `[0, 1]` for scoring.
    pub fn weight(&self) -> f64 {
        match self {
            NeedUrgency::None => 0.0,
            NeedUrgency::Low => 0.25,
            NeedUrgency::Medium => 0.5,
            NeedUrgency::High => 0.75,
            NeedUrgency::Critical => 1.0,
        }
    }

    fn from_score(score: f64) -> Self {
        if score >= 2.0 {
            NeedUrgency::Critical
        } else if score >= 1.0 {
            NeedUrgency::High
        } else if score >= 0.5 {
            NeedUrgency::Medium
        } else if score > 0.0 {
            NeedUrgency::Low
        } else {
            NeedUrgency::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequirement {
    pub minimum: u32,
    pub recommended: u32,
    pub starters: u32,
}

pub fn requirement(position: Position) -> PositionRequirement {
    let (minimum, recommended, starters) = match position {
        Position::QB => (2, 3, 1),
        Position::RB => (2, 4, 1),
        Position::WR => (4, 6, 3),
        Position::TE => (2, 3, 1),
        Position::OT => (3, 4, 2),
        Position::OG => (3, 4, 2),
        Position::C => (1, 2, 1),
        Position::DE => (3, 5, 2),
        Position::DT => (3, 4, 2),
        Position::LB => (3, 5, 3),
        Position::CB => (4, 6, 3),
        Position::S => (3, 4, 2),
        Position::K => (1, 1, 1),
        Position::P => (1, 1, 1),
    };
    PositionRequirement { minimum, recommended, starters }
}

/// Urgency per position for one roster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamNeeds {
    needs: BTreeMap<Position, NeedUrgency>,
}

impl TeamNeeds {
    pub fn urgency(&self, position: Position) -> NeedUrgency {
        self.needs.get(&position).copied().unwrap_or(NeedUrgency::None)
    }

    pub fn weight(&self, position: Position) -> f64 {
        self.urgency(position).weight()
    }

    /// Positions sorted by urgency, most urgent first.
    pub fn top_needs(&self, count: usize) -> Vec<(Position, NeedUrgency)> {
        let mut ranked: Vec<_> = self
            .needs
            .iter()
            .filter(|(_, u)| **u > NeedUrgency::None)
            .map(|(p, u)| (*p, *u))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(count);
        ranked
    }

    pub fn positions_at_least(&self, level: NeedUrgency) -> Vec<Position> {
        self.needs.iter().filter(|(_, u)| **u >= level).map(|(p, _)| *p).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &NeedUrgency)> {
        self.needs.iter()
    }
}

pub struct TeamNeedsAnalyzer;

impl TeamNeedsAnalyzer {
    pub fn analyze<'a>(roster: impl IntoIterator<Item = &'a Player>) -> TeamNeeds {
        let mut by_position: BTreeMap<Position, Vec<&Player>> = BTreeMap::new();
        for player in roster {
            by_position.entry(player.position).or_default().push(player);
        }

        let needs = Position::ALL
            .iter()
            .map(|&position| {
                let players = by_position.get(&position).map(Vec::as_slice).unwrap_or(&[]);
                (position, NeedUrgency::from_score(Self::need_score(position, players)))
            })
            .collect();

        TeamNeeds { needs }
    }

    pub fn need_score(position: Position, players: &[&Player]) -> f64 {
        let req = requirement(position);
        let count = players.len() as u32;
        let quality = players.iter().filter(|p| p.overall >= STARTER_QUALITY).count() as u32;

        let quality_deficit = req.starters.saturating_sub(quality) as f64;
        let count_deficit = req.recommended.saturating_sub(count) as f64;

        let mut score = 2.0 * quality_deficit / req.starters as f64
            + count_deficit / req.recommended as f64;
        if count < req.minimum {
            score += 1.0;
        }

        let best = players.iter().max_by_key(|p| (p.overall, std::cmp::Reverse(p.age)));
        if best.is_some_and(|p| p.age >= AGING_STARTER) {
            score += 0.25;
        }
        score
    }
}
