mod common;

use common::{add_expiring_player, new_league, SEASON, USER_TEAM};
use gridiron_core::db::{roster, transaction_log, Database};
use gridiron_core::events::{EventStore, EventType};
use gridiron_core::models::{Position, TransactionRecord, TransactionType};
use gridiron_core::{
    calculate_franchise_tag_value, DynastyConfig, DynastyError, FranchiseTagManager,
    OffseasonController, OffseasonPhase, SalaryCapCalculator,
};
use rusqlite::Connection;

fn logged_tags(conn: &Connection, dynasty_id: &str, team_id: u32) -> Vec<TransactionRecord> {
    let tx_type = Some(TransactionType::FranchiseTag);
    transaction_log::transactions(conn, dynasty_id, Some(team_id), tx_type).unwrap()
}

#[test]
fn tagged_player_stays_through_free_agency() {
    let config = DynastyConfig::testing();
    let mut db = Database::open_in_memory().unwrap();
    let d = new_league(&mut db, &config);
    add_expiring_player(&db, &d.dynasty_id, USER_TEAM, "star_wr", Position::WR, 95);
    add_expiring_player(&db, &d.dynasty_id, USER_TEAM, "depth_te", Position::TE, 70);

    let mut controller =
        OffseasonController::new(db, d.dynasty_id.clone(), config.clone()).unwrap();
    controller.begin_offseason(SEASON).unwrap();

    let candidates = controller.franchise_tag_candidates(USER_TEAM).unwrap();
    let wr = candidates
        .iter()
        .find(|c| c.player_id == "star_wr")
        .expect("star_wr is a candidate");
    let tag_cost = calculate_franchise_tag_value("wide_receiver").unwrap();
    assert_eq!(wr.tag_cost, tag_cost);
    assert!(candidates.iter().any(|c| c.player_id == "depth_te"));

    controller.advance_to_phase(OffseasonPhase::FranchiseTagPeriod).unwrap();
    {
        let calendar = controller.calendar().unwrap();
        let today = controller.state().unwrap().current_date;
        let conn = controller.database().conn();
        let manager = FranchiseTagManager::new(conn, &d.dynasty_id, controller.config(), &calendar);
        let event = manager.apply_tag(USER_TEAM, "star_wr", today).unwrap();
        assert_eq!(event.tag_cost, tag_cost);
        assert_eq!(event.league_year, SEASON + 1);

        let second = manager.apply_tag(USER_TEAM, "depth_te", today);
        assert!(matches!(
            second,
            Err(DynastyError::DuplicateFranchiseTag { team_id: USER_TEAM, .. })
        ));
    }

    let results = controller.advance_to_phase(OffseasonPhase::FreeAgencyOpen).unwrap();
    assert!(results.iter().all(|r| r.success));

    let conn = controller.database().conn();
    let star = roster::get_player(conn, &d.dynasty_id, "star_wr").unwrap();
    assert_eq!(star.team_id, Some(USER_TEAM));
    let tag = roster::active_contract(conn, &d.dynasty_id, "star_wr").unwrap().unwrap();
    assert!(tag.is_franchise_tag);
    assert_eq!((tag.start_season, tag.end_season), (SEASON + 1, SEASON + 1));
    assert_eq!(tag.aav, tag_cost);

    // The untagged veteran hit the market
    let te = roster::get_player(conn, &d.dynasty_id, "depth_te").unwrap();
    assert_ne!(te.team_id, Some(USER_TEAM));

    let cap = SalaryCapCalculator::new(conn, &d.dynasty_id, config.salary_cap.clone());
    assert!(cap.cap_used(USER_TEAM, SEASON + 1).unwrap() >= tag_cost);

    assert_eq!(logged_tags(conn, &d.dynasty_id, USER_TEAM).len(), 1);
    let events = EventStore::new(conn, &d.dynasty_id).count(Some(EventType::FranchiseTag)).unwrap();
    assert!(events >= 1);
}

#[test]
fn ai_teams_tag_at_most_once() {
    let config = DynastyConfig::testing();
    let mut db = Database::open_in_memory().unwrap();
    let d = new_league(&mut db, &config);
    for team_id in 2..=6 {
        let (qb, de) = (format!("qb_{team_id}"), format!("de_{team_id}"));
        add_expiring_player(&db, &d.dynasty_id, team_id, &qb, Position::QB, 96);
        add_expiring_player(&db, &d.dynasty_id, team_id, &de, Position::DE, 94);
    }

    let mut controller = OffseasonController::new(db, d.dynasty_id.clone(), config).unwrap();
    controller.begin_offseason(SEASON).unwrap();
    let results = controller.advance_to_phase(OffseasonPhase::PreFreeAgency).unwrap();
    assert!(results.iter().all(|r| r.success));

    let conn = controller.database().conn();
    for team_id in 1..=32 {
        let tags = logged_tags(conn, &d.dynasty_id, team_id);
        assert!(tags.len() <= 1, "team {team_id} tagged {} players", tags.len());
    }
    assert!(logged_tags(conn, &d.dynasty_id, USER_TEAM).is_empty());
}
