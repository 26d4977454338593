mod common;

use chrono::NaiveDate;
use common::{new_league, playoff_games, SEASON};
use gridiron_core::db::{dynasty, Database};
use gridiron_core::events::{
    playoff_game_id, playoff_prefix, EventRecord, EventStore, EventType, PlayoffRound,
    SigningEvent, SimEvent,
};
use gridiron_core::DynastyConfig;

#[test]
fn wild_card_games_inserted_twice_are_stored_once() {
    let config = DynastyConfig::testing();
    let mut db = Database::open_in_memory().unwrap();
    let d = new_league(&mut db, &config);
    let store = EventStore::new(db.conn(), &d.dynasty_id);

    let wild_card: Vec<_> = playoff_games(SEASON)
        .into_iter()
        .filter(|r| {
            matches!(&r.event, SimEvent::Game(g) if g.round == Some(PlayoffRound::WildCard))
        })
        .collect();
    assert_eq!(wild_card.len(), 6);

    assert_eq!(store.insert_many(&wild_card).unwrap(), 6);
    assert_eq!(store.insert_many(&wild_card).unwrap(), 0);
    assert_eq!(store.count(Some(EventType::Game)).unwrap(), 6);
    assert_eq!(store.dedupe_by_game_id().unwrap(), 0);

    let first = playoff_game_id(SEASON, PlayoffRound::WildCard, 1);
    let stored = store.by_prefix(&playoff_prefix(SEASON)).unwrap();
    assert_eq!(stored.iter().filter(|r| r.game_id == first).count(), 1);
}

#[test]
fn events_are_scoped_to_their_dynasty() {
    let config = DynastyConfig::testing();
    let mut db = Database::open_in_memory().unwrap();
    let a = new_league(&mut db, &config);
    let b = new_league(&mut db, &config);

    EventStore::new(db.conn(), &a.dynasty_id).insert_many(&playoff_games(SEASON)).unwrap();
    EventStore::new(db.conn(), &b.dynasty_id).insert_many(&playoff_games(SEASON)).unwrap();
    assert_eq!(EventStore::new(db.conn(), &a.dynasty_id).count(Some(EventType::Game)).unwrap(), 13);

    assert!(dynasty::delete_dynasty(db.conn(), &a.dynasty_id).unwrap());
    assert_eq!(EventStore::new(db.conn(), &a.dynasty_id).count(None).unwrap(), 0);
    assert_eq!(EventStore::new(db.conn(), &b.dynasty_id).count(Some(EventType::Game)).unwrap(), 13);
}

#[test]
fn release_and_resign_keeps_both_signings() {
    let config = DynastyConfig::testing();
    let mut db = Database::open_in_memory().unwrap();
    let d = new_league(&mut db, &config);
    let store = EventStore::new(db.conn(), &d.dynasty_id);
    let signing = |team_id| {
        SimEvent::Signing(SigningEvent {
            team_id,
            player_id: "journeyman".into(),
            aav: 1_100_000,
            years: 1,
            guaranteed: 0,
            league_year: SEASON + 1,
        })
    };
    let march = NaiveDate::from_ymd_opt(SEASON as i32 + 1, 3, 14).unwrap();
    let june = NaiveDate::from_ymd_opt(SEASON as i32 + 1, 6, 2).unwrap();

    let first = EventRecord::new(march, signing(5));
    assert!(store.insert(&first).unwrap());
    assert!(!store.insert(&EventRecord::new(march, signing(5))).unwrap());
    assert!(store.insert(&EventRecord::new(june, signing(5))).unwrap());
    assert_eq!(store.count(Some(EventType::Signing)).unwrap(), 2);
}
