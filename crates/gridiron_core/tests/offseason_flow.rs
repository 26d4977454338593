mod common;

use common::{new_league, playoff_games, SEASON, USER_TEAM};
use gridiron_core::db::{draft, dynasty, roster, transaction_log, Database};
use gridiron_core::events::{EventStore, EventType};
use gridiron_core::models::{TransactionRecord, TransactionType};
use gridiron_core::{DraftPick, DynastyConfig, OffseasonController, OffseasonPhase};
use rusqlite::Connection;

fn selections(conn: &Connection, dynasty_id: &str) -> usize {
    EventStore::new(conn, dynasty_id).count(Some(EventType::DraftSelection)).unwrap()
}

fn undrafted_signings(conn: &Connection, dynasty_id: &str) -> Vec<TransactionRecord> {
    let tx_type = Some(TransactionType::UndraftedSigning);
    transaction_log::transactions(conn, dynasty_id, None, tx_type).unwrap()
}

fn season_picks(conn: &Connection, dynasty_id: &str) -> Vec<DraftPick> {
    draft::season_picks(conn, dynasty_id, SEASON + 1).unwrap()
}

#[test]
fn full_offseason_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dynasty.db");
    let config = DynastyConfig::testing();

    let mut db = Database::open(&path).unwrap();
    let d = new_league(&mut db, &config);
    EventStore::new(db.conn(), &d.dynasty_id).insert_many(&playoff_games(SEASON)).unwrap();

    let mut controller = OffseasonController::new(db, d.dynasty_id.clone(), config.clone())
        .unwrap()
        .load_providers_from_database();
    assert!(controller.can_calculate_draft_order().unwrap());
    controller.begin_offseason(SEASON).unwrap();

    let results = controller.advance_to_phase(OffseasonPhase::Complete).unwrap();
    let failed = results.iter().find(|r| !r.success);
    assert!(failed.is_none(), "a day failed: {failed:?}");

    // Every transition fires once, in calendar order
    let transitions: Vec<OffseasonPhase> = results.iter().filter_map(|r| r.new_phase).collect();
    assert_eq!(transitions, OffseasonPhase::ALL[1..].to_vec());
    assert!(results.windows(2).all(|w| w[0].current_phase <= w[1].current_phase));
    assert!(results.iter().all(|r| r.phase_changed == r.new_phase.is_some()));

    let conn = controller.database().conn();
    let picks = season_picks(conn, &d.dynasty_id);
    assert_eq!(picks.len(), 32 * 7);
    assert!(picks.iter().all(DraftPick::is_used));
    assert_eq!(selections(conn, &d.dynasty_id), 224);

    for team_id in 1..=32 {
        let count = roster::roster_count(conn, &d.dynasty_id, team_id).unwrap();
        if team_id != USER_TEAM {
            let max = config.roster.regular_season_max;
            assert!(count <= max, "team {team_id} kept {count} players");
        }
    }

    // Nothing moves after the offseason is complete
    let idle = controller.advance_day();
    assert!(idle.success);
    assert_eq!(idle.current_phase, OffseasonPhase::Complete);
    assert!(!idle.phase_changed);

    let final_state = controller.state().unwrap();
    drop(controller);
    let reopened = Database::open(&path).unwrap();
    let persisted = dynasty::load_state(reopened.conn(), &d.dynasty_id).unwrap();
    assert_eq!(persisted, final_state);
    assert_eq!(persisted.current_phase, OffseasonPhase::Complete);
}

#[test]
fn draft_waits_for_playoff_results() {
    let config = DynastyConfig::testing();
    let mut db = Database::open_in_memory().unwrap();
    let d = new_league(&mut db, &config);
    let mut controller = OffseasonController::new(db, d.dynasty_id.clone(), config)
        .unwrap()
        .load_providers_from_database();
    controller.begin_offseason(SEASON).unwrap();
    assert!(!controller.can_calculate_draft_order().unwrap());

    let results = controller.advance_to_phase(OffseasonPhase::Draft).unwrap();
    let draft_day = results.last().unwrap();
    assert!(draft_day.success);
    assert_eq!(draft_day.new_phase, Some(OffseasonPhase::Draft));
    assert!(draft_day.results.iter().any(|r| r.message == "Draft order cannot yet be calculated"));
    let picks = season_picks(controller.database().conn(), &d.dynasty_id);
    assert!(picks.iter().all(|p| !p.is_used()));

    // Results arrive a day later and the draft runs on the next advance
    EventStore::new(controller.database().conn(), &d.dynasty_id)
        .insert_many(&playoff_games(SEASON))
        .unwrap();
    assert!(controller.can_calculate_draft_order().unwrap());
    let next = controller.advance_day();
    assert!(next.success);
    assert_eq!(next.current_phase, OffseasonPhase::Draft);
    assert_eq!(next.results.iter().map(|r| r.transactions).sum::<u32>(), 224);
    let picks = season_picks(controller.database().conn(), &d.dynasty_id);
    assert!(picks.iter().all(DraftPick::is_used));
}

#[test]
fn class_stays_undrafted_while_draft_order_is_missing() {
    let mut config = DynastyConfig::testing();
    config.draft.class_size = 240;
    let mut db = Database::open_in_memory().unwrap();
    let d = new_league(&mut db, &config);
    let mut controller = OffseasonController::new(db, d.dynasty_id.clone(), config)
        .unwrap()
        .load_providers_from_database();
    controller.begin_offseason(SEASON).unwrap();

    let results = controller.advance_to_phase(OffseasonPhase::PostDraft).unwrap();
    let post_draft = results.last().unwrap();
    assert_eq!(post_draft.new_phase, Some(OffseasonPhase::PostDraft));
    assert!(post_draft.results.iter().any(|r| r.message == "Draft order cannot yet be calculated"));
    let mut hooks = post_draft.results.iter().filter(|r| r.phase == OffseasonPhase::PostDraft);
    assert!(hooks.all(|r| r.transactions == 0));

    let conn = controller.database().conn();
    assert!(season_picks(conn, &d.dynasty_id).iter().all(|p| !p.is_used()));
    let prospects = draft::available_prospects(conn, &d.dynasty_id, SEASON + 1).unwrap();
    assert_eq!(prospects.len(), 240);
    assert!(undrafted_signings(conn, &d.dynasty_id).is_empty());

    // Late results: the draft is held first, and only the leftovers go undrafted
    EventStore::new(conn, &d.dynasty_id).insert_many(&playoff_games(SEASON)).unwrap();
    let next = controller.advance_day();
    assert!(next.success);
    assert_eq!(next.current_phase, OffseasonPhase::PostDraft);
    let conn = controller.database().conn();
    assert!(season_picks(conn, &d.dynasty_id).iter().all(DraftPick::is_used));
    assert_eq!(selections(conn, &d.dynasty_id), 224);
    let undrafted = undrafted_signings(conn, &d.dynasty_id);
    assert!(undrafted.len() <= 16);
    assert!(undrafted.iter().all(|t| t.team_id != USER_TEAM));
}
