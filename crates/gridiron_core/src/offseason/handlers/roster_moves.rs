//! Releases: cap casualties before free agency and cuts down to the
//! regular-season roster.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::PhaseContext;
use crate::db::{league, roster};
use crate::error::Result;
use crate::events::{EventRecord, ReleaseEvent, SimEvent};
use crate::models::{Position, RosterEntry, TransactionType};
use crate::needs::requirement;
use crate::personality::{DecisionContext, DecisionInputs, PlayerProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutCandidate {
    pub player_id: String,
    pub position: Position,
    /// Personality-adjusted worth of keeping the player
    pub keep_value: f64,
    pub cut_probability: f64,
    /// Cap room freed in the league year, net of accelerated bonus
    pub cap_savings: i64,
}

/// Every releasable player on the roster. Franchise-tagged players are
/// never released.
pub fn cut_candidates(ctx: &PhaseContext<'_>, team_id: u32) -> Result<Vec<CutCandidate>> {
    let league_year = ctx.league_year();
    let market = ctx.market();
    let modifiers = ctx.modifiers();
    let archetype = league::team_archetype(ctx.conn, ctx.dynasty_id, team_id)?;
    let context = ctx.team_context(team_id)?;

    Ok(roster::team_roster(ctx.conn, ctx.dynasty_id, team_id)?
        .into_iter()
        .filter(|entry| !entry.is_franchise_tagged())
        .map(|entry| {
            let p = &entry.player;
            let value = market
                .calculate_player_value(p.position, p.overall, p.age, p.years_pro)
                .aav as f64;
            let cap_hit = entry.cap_hit(league_year);
            let cost = cap_hit as f64;
            let probability = if cost + value > 0.0 { cost / (cost + value) } else { 0.5 };
            let profile = PlayerProfile::from(p);
            let inputs =
                DecisionInputs::new(DecisionContext::RosterCut, profile, value, cost, probability);
            let adjusted = modifiers.apply(inputs, archetype, &context);
            let accelerated = entry
                .contract
                .as_ref()
                .map(|c| c.remaining_bonus_proration(league_year))
                .unwrap_or(0);
            CutCandidate {
                player_id: p.player_id.clone(),
                position: p.position,
                keep_value: adjusted.value,
                cut_probability: adjusted.probability,
                cap_savings: cap_hit - accelerated,
            }
        })
        .collect())
}

fn position_counts(entries: &[RosterEntry]) -> HashMap<Position, u32> {
    let mut counts = HashMap::new();
    for entry in entries {
        *counts.entry(entry.player.position).or_insert(0) += 1;
    }
    counts
}

/// Whether releasing one more player at `position` keeps the minimum.
fn can_release(counts: &HashMap<Position, u32>, position: Position) -> bool {
    counts.get(&position).copied().unwrap_or(0) > requirement(position).minimum
}

fn release(ctx: &PhaseContext<'_>, team_id: u32, candidate: &CutCandidate) -> Result<i64> {
    let league_year = ctx.league_year();
    let player_id = candidate.player_id.as_str();
    let dead_money = ctx.cap().release_player(team_id, player_id, league_year, ctx.date)?;
    ctx.log(
        TransactionType::Release,
        team_id,
        Some(player_id),
        serde_json::json!({ "dead_money": dead_money, "cap_savings": candidate.cap_savings }),
    )?;
    let event = ReleaseEvent {
        team_id,
        player_id: player_id.to_string(),
        dead_money,
        league_year,
    };
    ctx.events().insert(&EventRecord::new(ctx.date, SimEvent::Release(event)))?;
    Ok(dead_money)
}

/// AI teams over the new league year's cap release the likeliest cuts that
/// actually save money until they are compliant.
pub fn release_cap_casualties(ctx: &PhaseContext<'_>) -> Result<u32> {
    let league_year = ctx.league_year();
    let cap = ctx.cap();
    let mut released = 0;

    for team in ctx.ai_teams()? {
        let mut space = cap.cap_space(team.team_id, league_year)?;
        if space >= 0 {
            continue;
        }
        let entries = roster::team_roster(ctx.conn, ctx.dynasty_id, team.team_id)?;
        let mut counts = position_counts(&entries);
        let mut candidates = cut_candidates(ctx, team.team_id)?;
        candidates.retain(|c| c.cap_savings > 0);
        candidates.sort_by(|a, b| {
            b.cut_probability
                .total_cmp(&a.cut_probability)
                .then(b.cap_savings.cmp(&a.cap_savings))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        for candidate in &candidates {
            if space >= 0 {
                break;
            }
            if !can_release(&counts, candidate.position) {
                continue;
            }
            release(ctx, team.team_id, candidate)?;
            if let Some(n) = counts.get_mut(&candidate.position) {
                *n -= 1;
            }
            space = cap.cap_space(team.team_id, league_year)?;
            released += 1;
        }
        if space < 0 {
            tracing::warn!(
                team_id = team.team_id,
                space,
                "Still over the cap after cap casualties"
            );
        }
    }
    Ok(released)
}

/// AI teams above the regular-season limit cut their least valuable
/// players, keeping every position at its minimum.
pub fn trim_rosters(ctx: &PhaseContext<'_>) -> Result<u32> {
    let limit = ctx.config.roster.regular_season_max;
    let mut released = 0;

    for team in ctx.ai_teams()? {
        let entries = roster::team_roster(ctx.conn, ctx.dynasty_id, team.team_id)?;
        let mut count = entries.len() as u32;
        if count <= limit {
            continue;
        }
        let mut counts = position_counts(&entries);
        let mut candidates = cut_candidates(ctx, team.team_id)?;
        candidates.sort_by(|a, b| {
            a.keep_value
                .total_cmp(&b.keep_value)
                .then(b.cut_probability.total_cmp(&a.cut_probability))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        for candidate in &candidates {
            if count <= limit {
                break;
            }
            if !can_release(&counts, candidate.position) {
                continue;
            }
            release(ctx, team.team_id, candidate)?;
            if let Some(n) = counts.get_mut(&candidate.position) {
                *n -= 1;
            }
            count -= 1;
            released += 1;
        }
        tracing::debug!(team_id = team.team_id, count, "Roster trimmed");
    }
    Ok(released)
}
