//! Simulation events.
//!
//! Every event kind is one variant of [`SimEvent`] and goes through the single
//! `events` table. Each record carries a natural key (`game_id`) that makes
//! re-inserting the same event a no-op.

pub mod store;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Position;

pub use store::EventStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffRound {
    WildCard,
    Divisional,
    Conference,
    SuperBowl,
}

impl PlayoffRound {
    pub const ALL: [PlayoffRound; 4] = [
        PlayoffRound::WildCard,
        PlayoffRound::Divisional,
        PlayoffRound::Conference,
        PlayoffRound::SuperBowl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayoffRound::WildCard => "wild_card",
            PlayoffRound::Divisional => "divisional",
            PlayoffRound::Conference => "conference",
            PlayoffRound::SuperBowl => "super_bowl",
        }
    }

    /// Games played in the round across both conferences.
    pub fn game_count(&self) -> usize {
        match self {
            PlayoffRound::WildCard => 6,
            PlayoffRound::Divisional => 4,
            PlayoffRound::Conference => 2,
            PlayoffRound::SuperBowl => 1,
        }
    }
}

/// `playoff_<season>_<round>_<n>`, `n` starting at 1.
pub fn playoff_game_id(season: u32, round: PlayoffRound, n: usize) -> String {
    format!("playoff_{}_{}_{}", season, round.as_str(), n)
}

pub fn playoff_prefix(season: u32) -> String {
    format!("playoff_{}_", season)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub season: u32,
    pub week: Option<u32>,
    pub round: Option<PlayoffRound>,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_score: u32,
    pub away_score: u32,
}

impl GameEvent {
    /// `None` on a tie.
    pub fn winner(&self) -> Option<u32> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.home_team_id),
            std::cmp::Ordering::Less => Some(self.away_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn loser(&self) -> Option<u32> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.away_team_id),
            std::cmp::Ordering::Less => Some(self.home_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutingEvent {
    /// Draft year of the class
    pub season: u32,
    pub class_size: usize,
    pub top_prospect_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub proposal_id: String,
    pub proposing_team_id: u32,
    pub receiving_team_id: u32,
    /// Assets moving from the proposer to the receiver
    pub sent: Vec<String>,
    /// Assets moving from the receiver to the proposer
    pub received: Vec<String>,
    pub sent_value: f64,
    pub received_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseTagEvent {
    pub team_id: u32,
    pub player_id: String,
    pub position: Position,
    pub tag_cost: i64,
    pub league_year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningEvent {
    pub team_id: u32,
    pub player_id: String,
    pub aav: i64,
    pub years: u32,
    pub guaranteed: i64,
    pub league_year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub team_id: u32,
    pub player_id: String,
    pub dead_money: i64,
    pub league_year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSelectionEvent {
    pub season: u32,
    pub round: u32,
    pub overall_pick: u32,
    pub pick_id: String,
    pub team_id: u32,
    pub prospect_id: String,
}

/// One simulation event of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimEvent {
    Game(GameEvent),
    Scouting(ScoutingEvent),
    Trade(TradeEvent),
    FranchiseTag(FranchiseTagEvent),
    Signing(SigningEvent),
    Release(ReleaseEvent),
    DraftSelection(DraftSelectionEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Game,
    Scouting,
    Trade,
    FranchiseTag,
    Signing,
    Release,
    DraftSelection,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Game => "GAME",
            EventType::Scouting => "SCOUTING",
            EventType::Trade => "TRADE",
            EventType::FranchiseTag => "FRANCHISE_TAG",
            EventType::Signing => "SIGNING",
            EventType::Release => "RELEASE",
            EventType::DraftSelection => "DRAFT_SELECTION",
        }
    }
}

impl SimEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            SimEvent::Game(_) => EventType::Game,
            SimEvent::Scouting(_) => EventType::Scouting,
            SimEvent::Trade(_) => EventType::Trade,
            SimEvent::FranchiseTag(_) => EventType::FranchiseTag,
            SimEvent::Signing(_) => EventType::Signing,
            SimEvent::Release(_) => EventType::Release,
            SimEvent::DraftSelection(_) => EventType::DraftSelection,
        }
    }

    /// Deterministic key for events that are not games. Games carry their own id.
    pub fn natural_key(&self, date: NaiveDate) -> Option<String> {
        match self {
            SimEvent::Game(_) => None,
            SimEvent::Scouting(e) => Some(format!("scouting_{}", e.season)),
            SimEvent::Trade(e) => Some(format!("trade_{}", e.proposal_id)),
            SimEvent::FranchiseTag(e) => Some(format!("tag_{}_t{}", e.league_year, e.team_id)),
            SimEvent::Signing(e) => {
                Some(format!("signing_{}_t{}_{}", date, e.team_id, e.player_id))
            }
            SimEvent::Release(e) => Some(format!("release_{}_{}", date, e.player_id)),
            SimEvent::DraftSelection(e) => Some(format!("draft_{}_{}", e.season, e.overall_pick)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    Executed,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "SCHEDULED",
            EventStatus::Executed => "EXECUTED",
            EventStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SCHEDULED" => Some(EventStatus::Scheduled),
            "EXECUTED" => Some(EventStatus::Executed),
            "COMPLETED" => Some(EventStatus::Completed),
            _ => None,
        }
    }
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub game_id: String,
    pub date: NaiveDate,
    pub status: EventStatus,
    pub event: SimEvent,
}

impl EventRecord {
    /// Record keyed by the event's natural key.
    pub fn new(date: NaiveDate, event: SimEvent) -> Self {
        let game_id = event
            .natural_key(date)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self::with_game_id(game_id, date, event)
    }

    pub fn with_game_id(game_id: impl Into<String>, date: NaiveDate, event: SimEvent) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            game_id: game_id.into(),
            date,
            status: EventStatus::Completed,
            event,
        }
    }

    /// A played game, stored under `game_id`.
    pub fn game(game_id: impl Into<String>, date: NaiveDate, game: GameEvent) -> Self {
        Self::with_game_id(game_id, date, SimEvent::Game(game))
    }

    pub fn scheduled(mut self) -> Self {
        self.status = EventStatus::Scheduled;
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playoff_game_ids() {
        assert_eq!(playoff_game_id(2025, PlayoffRound::WildCard, 3), "playoff_2025_wild_card_3");
        let super_bowl = playoff_game_id(2025, PlayoffRound::SuperBowl, 1);
        assert!(super_bowl.starts_with(&playoff_prefix(2025)));
    }

    #[test]
    fn test_tagged_serialization() {
        let event = SimEvent::Release(ReleaseEvent {
            team_id: 4,
            player_id: "p9".into(),
            dead_money: 1_000_000,
            league_year: 2026,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RELEASE");
        assert_eq!(json["data"]["player_id"], "p9");
        let back: SimEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.event_type(), EventType::Release);
    }

    #[test]
    fn test_resigning_after_release_gets_its_own_key() {
        let signing = |team_id| {
            SimEvent::Signing(SigningEvent {
                team_id,
                player_id: "p4".into(),
                aav: 1_200_000,
                years: 1,
                guaranteed: 0,
                league_year: 2026,
            })
        };
        let march = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        let may = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();

        let first = EventRecord::new(march, signing(3));
        assert_eq!(first.game_id, EventRecord::new(march, signing(3)).game_id);
        assert_ne!(first.game_id, EventRecord::new(may, signing(3)).game_id);
        assert_ne!(first.game_id, EventRecord::new(march, signing(8)).game_id);
    }

    #[test]
    fn test_game_winner_and_tie() {
        let mut game = GameEvent {
            season: 2025,
            week: Some(3),
            round: None,
            home_team_id: 1,
            away_team_id: 2,
            home_score: 17,
            away_score: 24,
        };
        assert_eq!(game.winner(), Some(2));
        assert_eq!(game.loser(), Some(1));
        game.home_score = 24;
        assert_eq!(game.winner(), None);
    }
}
