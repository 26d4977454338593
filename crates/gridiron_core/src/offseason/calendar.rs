use chrono::{Duration, NaiveDate};

use super::OffseasonPhase;
use crate::calendar::super_bowl_date;
use crate::config::OffseasonConfig;

/// Phase boundaries for one offseason, anchored on the Super Bowl.
#[derive(Debug, Clone, PartialEq)]
pub struct OffseasonCalendar {
    season: u32,
    starts: [NaiveDate; 9],
}

impl OffseasonCalendar {
    pub fn new(season: u32, config: &OffseasonConfig) -> Self {
        let anchor = super_bowl_date(season);
        let mut starts = [anchor; 9];
        for (slot, offset) in starts.iter_mut().skip(1).zip(config.offsets()) {
            *slot = anchor + Duration::days(offset);
        }
        Self { season, starts }
    }

    /// Season whose offseason this is.
    pub fn season(&self) -> u32 {
        self.season
    }

    /// Contracts signed this offseason start in the following season.
    pub fn league_year(&self) -> u32 {
        self.season + 1
    }

    pub fn super_bowl(&self) -> NaiveDate {
        self.starts[0]
    }

    pub fn start_of(&self, phase: OffseasonPhase) -> NaiveDate {
        self.starts[phase.index()]
    }

    /// Last day of a phase. `Complete` has no end.
    pub fn last_day_of(&self, phase: OffseasonPhase) -> Option<NaiveDate> {
        phase.next().map(|next| self.start_of(next) - Duration::days(1))
    }

    /// Phase in effect on `date`. Dates before the Super Bowl map to the first phase.
    pub fn phase_for(&self, date: NaiveDate) -> OffseasonPhase {
        OffseasonPhase::ALL
            .into_iter()
            .rev()
            .find(|p| self.start_of(*p) <= date)
            .unwrap_or(OffseasonPhase::PostSuperBowl)
    }

    pub fn franchise_tag_deadline(&self) -> NaiveDate {
        self.last_day_of(OffseasonPhase::FranchiseTagPeriod)
            .unwrap_or_else(|| self.start_of(OffseasonPhase::PreFreeAgency))
    }

    pub fn roster_cut_deadline(&self) -> NaiveDate {
        self.last_day_of(OffseasonPhase::RosterCuts)
            .unwrap_or_else(|| self.start_of(OffseasonPhase::Complete))
    }
}
