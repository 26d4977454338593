//! League data types shared by every subsystem.

pub mod draft;
pub mod dynasty;
pub mod player;
pub mod position;
pub mod team;
pub mod transaction;

pub use draft::{DraftPick, DraftProspect};
pub use dynasty::{Dynasty, DynastyState};
pub use player::{Contract, Player, RosterEntry};
pub use position::{ParsePositionError, Position};
pub use team::{Conference, PlayoffPosition, Team, TeamContext, TeamStanding, LEAGUE_TEAMS};
pub use transaction::{CapEventType, FaOffer, OfferStatus, TransactionRecord, TransactionType};
