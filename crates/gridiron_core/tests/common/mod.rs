#![allow(dead_code)]

use chrono::Duration;
use gridiron_core::calendar::super_bowl_date;
use gridiron_core::db::{dynasty, roster, Database};
use gridiron_core::events::{playoff_game_id, EventRecord, GameEvent, PlayoffRound};
use gridiron_core::models::{Contract, Dynasty, Player, Position};
use gridiron_core::{DynastyConfig, LeagueGenerator, OffseasonPhase};

pub const SEASON: u32 = 2025;
pub const USER_TEAM: u32 = 1;

/// A seeded league whose clock sits on the Super Bowl of [`SEASON`].
pub fn new_league(db: &mut Database, config: &DynastyConfig) -> Dynasty {
    let d = Dynasty::new("Integration", USER_TEAM, SEASON);
    let start = super_bowl_date(SEASON);
    dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::PostSuperBowl).unwrap();
    let seed = config.seed;
    db.transaction(|tx| {
        LeagueGenerator::new(seed).seed_league(tx, &d.dynasty_id, SEASON, config).map(|_| ())
    })
    .unwrap();
    d
}

fn game(season: u32, round: PlayoffRound, winner: u32, loser: u32) -> GameEvent {
    GameEvent {
        season,
        week: None,
        round: Some(round),
        home_team_id: winner,
        away_team_id: loser,
        home_score: 24,
        away_score: 17,
    }
}

/// A full bracket for `season`: teams 19 to 32 qualify, 32 wins it all.
pub fn playoff_games(season: u32) -> Vec<EventRecord> {
    let wild_card_date = super_bowl_date(season) - Duration::days(28);
    let rounds: [(PlayoffRound, &[(u32, u32)]); 4] = [
        (PlayoffRound::WildCard, &[(30, 19), (29, 20), (28, 21), (27, 22), (26, 23), (25, 24)]),
        (PlayoffRound::Divisional, &[(32, 25), (31, 26), (30, 27), (29, 28)]),
        (PlayoffRound::Conference, &[(32, 29), (31, 30)]),
        (PlayoffRound::SuperBowl, &[(32, 31)]),
    ];
    let mut records = Vec::new();
    for (week, (round, games)) in rounds.into_iter().enumerate() {
        let date = wild_card_date + Duration::days(7 * week as i64);
        for (n, &(winner, loser)) in games.iter().enumerate() {
            let game_id = playoff_game_id(season, round, n + 1);
            records.push(EventRecord::game(game_id, date, game(season, round, winner, loser)));
        }
    }
    records
}

/// Put a player in the final year of a deal with `team_id`.
pub fn add_expiring_player(
    db: &Database,
    dynasty_id: &str,
    team_id: u32,
    player_id: &str,
    position: Position,
    overall: u8,
) {
    let player = Player {
        player_id: player_id.to_string(),
        team_id: Some(team_id),
        first_name: "Test".into(),
        last_name: player_id.to_string(),
        position,
        overall,
        potential: overall,
        age: 28,
        years_pro: 6,
    };
    roster::insert_player(db.conn(), dynasty_id, &player).unwrap();
    let contract = Contract {
        contract_id: format!("{player_id}_deal"),
        player_id: player_id.to_string(),
        team_id,
        start_season: SEASON - 3,
        end_season: SEASON,
        years: 4,
        total_value: 60_000_000,
        aav: 15_000_000,
        guaranteed: 20_000_000,
        signing_bonus: 8_000_000,
        is_franchise_tag: false,
    };
    roster::insert_contract(db.conn(), dynasty_id, &contract).unwrap();
}
