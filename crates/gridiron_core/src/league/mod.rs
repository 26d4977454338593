//! League seeding for new dynasties and test fixtures.

pub mod generator;

pub use generator::{LeagueGenerator, LeagueSummary};
