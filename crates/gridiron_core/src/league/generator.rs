//! Seeded league content: teams, rosters, contracts, picks and draft classes.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::{DynastyConfig, SalaryCapConfig};
use crate::db::{draft, league, roster};
use crate::error::{DynastyError, Result};
use crate::models::{
    Conference, Contract, DraftPick, DraftProspect, Player, Position, Team, TeamStanding,
};
use crate::needs::requirement;
use crate::personality::GMArchetype;
use crate::valuation::MarketValueCalculator;

const CITIES: [(&str, &str); 32] = [
    ("Boston Minutemen", "BOS"),
    ("Brooklyn Bridges", "BKN"),
    ("Hartford Whalers", "HFD"),
    ("Buffalo Blizzard", "BUF"),
    ("Pittsburgh Ironmen", "PIT"),
    ("Cleveland Rockers", "CLE"),
    ("Cincinnati Queens", "CIN"),
    ("Columbus Explorers", "CLB"),
    ("Houston Wildcatters", "HOU"),
    ("San Antonio Missions", "SAT"),
    ("Memphis Blues", "MEM"),
    ("Orlando Suns", "ORL"),
    ("Denver Summit", "DEN"),
    ("Salt Lake Pioneers", "SLC"),
    ("Portland Lumberjacks", "POR"),
    ("Las Vegas Aces", "LVA"),
    ("Philadelphia Liberty", "PHI"),
    ("Washington Federals", "WAS"),
    ("Baltimore Clippers", "BAL"),
    ("Richmond Generals", "RIC"),
    ("Chicago Stockyards", "CHI"),
    ("Detroit Motormen", "DET"),
    ("Milwaukee Brewers", "MIL"),
    ("Minneapolis Lakers", "MPL"),
    ("Atlanta Firebirds", "ATL"),
    ("Charlotte Hornets", "CHA"),
    ("Nashville Sound", "NSH"),
    ("New Orleans Krewe", "NOL"),
    ("Seattle Sounders", "SEA"),
    ("San Diego Surf", "SDS"),
    ("Phoenix Firebirds", "PHX"),
    ("Sacramento Gold", "SAC"),
];

const DIVISIONS: [&str; 4] = ["East", "North", "South", "West"];

const FIRST_NAMES: [&str; 24] = [
    "Marcus", "Tyler", "Jalen", "Andre", "Cody", "Devin", "Isaiah", "Brandon", "Trent", "Malik",
    "Evan", "Darius", "Logan", "Caleb", "Terrell", "Mason", "Jordan", "Xavier", "Nate", "Quinton",
    "Reggie", "Shane", "Victor", "Zach",
];

const LAST_NAMES: [&str; 24] = [
    "Adams", "Brooks", "Carter", "Dawson", "Ellis", "Foster", "Griffin", "Hayes", "Irving",
    "Jenkins", "Kelly", "Lawson", "Mitchell", "Nelson", "Owens", "Parker", "Quarles", "Reed",
    "Simmons", "Turner", "Underwood", "Vaughn", "Washington", "Young",
];

/// Counts of what [`LeagueGenerator::seed_league`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSummary {
    pub teams: usize,
    pub players: usize,
    pub contracts: usize,
    pub picks: usize,
}

pub struct LeagueGenerator {
    rng: ChaCha8Rng,
    next_id: u64,
}

impl LeagueGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), next_id: 0 }
    }

    /// 32 teams, two conferences of four four-team divisions. Archetypes are
    /// dealt so every one of them appears at least four times.
    pub fn generate_teams(&mut self) -> Vec<Team> {
        let mut archetypes: Vec<GMArchetype> =
            GMArchetype::ALL.iter().copied().cycle().take(CITIES.len()).collect();
        archetypes.shuffle(&mut self.rng);

        CITIES
            .iter()
            .zip(archetypes)
            .enumerate()
            .map(|(i, ((name, abbreviation), archetype))| Team {
                team_id: i as u32 + 1,
                name: name.to_string(),
                abbreviation: abbreviation.to_string(),
                conference: if i < 16 { Conference::AFC } else { Conference::NFC },
                division: DIVISIONS[(i % 16) / 4].to_string(),
                gm_archetype: archetype,
            })
            .collect()
    }

    fn name(&mut self) -> (String, String) {
        let first = FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())];
        (first.to_string(), last.to_string())
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{:05}", prefix, self.next_id)
    }

    fn sample(&mut self, mean: f64, std_dev: f64, min: f64, max: f64) -> u8 {
        let value = match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        };
        value.round().clamp(min, max) as u8
    }

    /// A 53-man roster under contract for `season`, trimmed to `cap_share`
    /// of that season's cap.
    pub fn generate_roster(
        &mut self,
        team_id: u32,
        season: u32,
        cap: &SalaryCapConfig,
        cap_share: f64,
    ) -> Vec<(Player, Contract)> {
        let market = MarketValueCalculator::new(cap.clone(), season);
        let mut signed = Vec::new();
        for position in Position::ALL {
            let req = requirement(position);
            let depth = req.recommended + u32::from(position == Position::LB);
            for slot in 0..depth {
                let overall = if slot < req.starters {
                    self.sample(77.0, 6.0, 60.0, 97.0)
                } else {
                    self.sample(63.0, 6.0, 45.0, 76.0)
                };
                let age = self.sample(26.5, 3.0, 22.0, 36.0);
                let years_pro = age.saturating_sub(22).min(14);
                let (first_name, last_name) = self.name();
                let player = Player {
                    player_id: self.id("pl"),
                    team_id: Some(team_id),
                    first_name,
                    last_name,
                    position,
                    overall,
                    potential: overall.saturating_add(self.rng.gen_range(0..8)).min(99),
                    age,
                    years_pro,
                };
                let value = market.calculate_player_value(position, overall, age, years_pro);
                let into_deal = self.rng.gen_range(0..value.years);
                signed.push((player, value, season - into_deal));
            }
        }

        // Scale salaries down until the roster fits
        let target = (cap.cap_for_season(season) as f64 * cap_share) as i64;
        for _ in 0..3 {
            let total: i64 = signed
                .iter()
                .map(|(p, v, start)| v.to_contract(&p.player_id, team_id, *start).cap_hit(season))
                .sum();
            if total <= target || total == 0 {
                break;
            }
            let factor = target as f64 / total as f64;
            for (_, value, _) in signed.iter_mut() {
                *value = market.reprice(value, (value.aav as f64 * factor) as i64);
            }
        }

        signed
            .into_iter()
            .map(|(player, value, start)| {
                let contract = value.to_contract(&player.player_id, team_id, start);
                (player, contract)
            })
            .collect()
    }

    /// Plausible final records for a 17-game season.
    pub fn generate_standings(&mut self, team_ids: &[u32]) -> Vec<TeamStanding> {
        team_ids
            .iter()
            .map(|&team_id| {
                let wins = self.rng.gen_range(2..=15);
                let ties = u32::from(self.rng.gen_bool(0.05));
                let losses = 17 - wins - ties;
                let points_for = 17 * self.rng.gen_range(16..=30);
                let points_against = 17 * self.rng.gen_range(16..=30);
                let streak = self.rng.gen_range(-4..=4);
                TeamStanding { team_id, wins, losses, ties, points_for, points_against, streak }
            })
            .collect()
    }

    /// Draft class sorted best first. Ratings are normal around the
    /// projected round so early rounds carry the better players.
    pub fn generate_draft_class(
        &mut self,
        season: u32,
        size: u32,
        rounds: u32,
    ) -> Vec<DraftProspect> {
        let rounds = rounds.max(1);
        let per_round = (size / rounds).max(1);
        let mut class: Vec<DraftProspect> = (0..size)
            .map(|i| {
                let projected_round = (i / per_round + 1).min(rounds);
                let mean = 72.0 - 3.5 * (projected_round - 1) as f64;
                let overall = self.sample(mean, 4.0, 40.0, 85.0);
                let potential = overall.saturating_add(self.sample(10.0, 4.0, 0.0, 25.0)).min(99);
                let position = Position::ALL[self.rng.gen_range(0..Position::ALL.len())];
                let (first_name, last_name) = self.name();
                DraftProspect {
                    prospect_id: format!("dp_{}_{:03}", season, i + 1),
                    season,
                    first_name,
                    last_name,
                    position,
                    overall,
                    potential,
                    age: self.sample(21.5, 0.8, 20.0, 24.0),
                    projected_round,
                    drafted: false,
                }
            })
            .collect();
        class.sort_by(|a, b| {
            (b.overall, b.potential)
                .cmp(&(a.overall, a.potential))
                .then_with(|| a.prospect_id.cmp(&b.prospect_id))
        });
        class
    }

    /// Write a full league for a new dynasty: teams, rosters under contract
    /// for `season`, final standings for `season` and picks for the next two
    /// drafts.
    pub fn seed_league(
        &mut self,
        conn: &Connection,
        dynasty_id: &str,
        season: u32,
        config: &DynastyConfig,
    ) -> Result<LeagueSummary> {
        if !league::list_teams(conn, dynasty_id)?.is_empty() {
            return Err(DynastyError::InvalidParameter(format!(
                "dynasty {} already has a league",
                dynasty_id
            )));
        }

        let mut summary = LeagueSummary::default();

        let teams = self.generate_teams();
        for team in &teams {
            league::insert_team(conn, dynasty_id, team)?;
            let players = self.generate_roster(team.team_id, season, &config.salary_cap, 0.85);
            for (player, contract) in players {
                roster::insert_player(conn, dynasty_id, &player)?;
                roster::insert_contract(conn, dynasty_id, &contract)?;
                summary.players += 1;
                summary.contracts += 1;
            }
            for draft_season in [season + 1, season + 2] {
                for round in 1..=config.draft.rounds {
                    let pick = DraftPick::new(draft_season, round, team.team_id);
                    if draft::insert_pick(conn, dynasty_id, &pick)? {
                        summary.picks += 1;
                    }
                }
            }
        }
        summary.teams = teams.len();

        let ids: Vec<u32> = teams.iter().map(|t| t.team_id).collect();
        for standing in self.generate_standings(&ids) {
            league::upsert_standing(conn, dynasty_id, season, &standing)?;
        }

        log::info!(
            "Seeded league for dynasty {}: {} teams, {} players, {} picks",
            dynasty_id,
            summary.teams,
            summary.players,
            summary.picks
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cap::SalaryCapCalculator;
    use crate::db::{dynasty, Database};
    use crate::models::Dynasty;
    use crate::offseason::OffseasonPhase;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn test_teams_fill_every_division() {
        let teams = LeagueGenerator::new(1).generate_teams();
        assert_eq!(teams.len(), 32);
        let mut divisions: HashMap<(Conference, String), usize> = HashMap::new();
        for team in &teams {
            *divisions.entry((team.conference, team.division.clone())).or_default() += 1;
        }
        assert_eq!(divisions.len(), 8);
        assert!(divisions.values().all(|&n| n == 4));
    }

    #[test]
    fn test_draft_class_is_seeded_and_sorted() {
        let a = LeagueGenerator::new(9).generate_draft_class(2026, 224, 7);
        let b = LeagueGenerator::new(9).generate_draft_class(2026, 224, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 224);
        assert!(a.windows(2).all(|w| w[0].overall >= w[1].overall));
        assert!(a.iter().all(|p| p.potential >= p.overall));
    }

    #[test]
    fn test_seed_league_is_cap_legal() {
        let mut db = Database::open_in_memory().unwrap();
        let d = Dynasty::new("Seeded", 1, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::PostSuperBowl).unwrap();
        let config = DynastyConfig::testing();

        let summary = db
            .transaction(|tx| {
                LeagueGenerator::new(config.seed).seed_league(tx, &d.dynasty_id, 2025, &config)
            })
            .unwrap();
        assert_eq!(summary.teams, 32);
        assert_eq!(summary.players, 32 * 53);
        assert_eq!(summary.picks, 32 * 7 * 2);

        let cap = SalaryCapCalculator::new(db.conn(), &d.dynasty_id, config.salary_cap.clone());
        for team_id in 1..=32 {
            assert!(cap.cap_space(team_id, 2025).unwrap() > 0, "team {team_id} over the cap");
        }
        assert_eq!(league::season_standings(db.conn(), &d.dynasty_id, 2025).unwrap().len(), 32);

        // A second seed would duplicate the league
        let again = db.transaction(|tx| {
            LeagueGenerator::new(1).seed_league(tx, &d.dynasty_id, 2025, &config)
        });
        assert!(matches!(again, Err(DynastyError::InvalidParameter(_))));
    }
}
