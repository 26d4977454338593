use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DynastyError;

/// Offseason phases in calendar order. The derived `Ord` is the only order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OffseasonPhase {
    PostSuperBowl,
    FranchiseTagPeriod,
    PreFreeAgency,
    FreeAgencyLegalTampering,
    FreeAgencyOpen,
    Draft,
    PostDraft,
    RosterCuts,
    Complete,
}

impl OffseasonPhase {
    pub const ALL: [OffseasonPhase; 9] = [
        OffseasonPhase::PostSuperBowl,
        OffseasonPhase::FranchiseTagPeriod,
        OffseasonPhase::PreFreeAgency,
        OffseasonPhase::FreeAgencyLegalTampering,
        OffseasonPhase::FreeAgencyOpen,
        OffseasonPhase::Draft,
        OffseasonPhase::PostDraft,
        OffseasonPhase::RosterCuts,
        OffseasonPhase::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OffseasonPhase::PostSuperBowl => "POST_SUPER_BOWL",
            OffseasonPhase::FranchiseTagPeriod => "FRANCHISE_TAG_PERIOD",
            OffseasonPhase::PreFreeAgency => "PRE_FREE_AGENCY",
            OffseasonPhase::FreeAgencyLegalTampering => "FREE_AGENCY_LEGAL_TAMPERING",
            OffseasonPhase::FreeAgencyOpen => "FREE_AGENCY_OPEN",
            OffseasonPhase::Draft => "DRAFT",
            OffseasonPhase::PostDraft => "POST_DRAFT",
            OffseasonPhase::RosterCuts => "ROSTER_CUTS",
            OffseasonPhase::Complete => "COMPLETE",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Following phase; `None` once complete.
    pub fn next(&self) -> Option<OffseasonPhase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        *self == OffseasonPhase::Complete
    }

    /// Phases in which AI teams may trade.
    pub fn allows_trades(&self) -> bool {
        !matches!(self, OffseasonPhase::Draft | OffseasonPhase::Complete)
    }

    /// Phases strictly after `self` up to and including `to`.
    pub fn span_to(&self, to: OffseasonPhase) -> impl Iterator<Item = OffseasonPhase> {
        let from = *self;
        Self::ALL.into_iter().filter(move |p| *p > from && *p <= to)
    }
}

impl fmt::Display for OffseasonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffseasonPhase {
    type Err = DynastyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                DynastyError::InvalidParameter(format!("unknown offseason phase '{}'", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_follows_calendar() {
        for pair in OffseasonPhase::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(OffseasonPhase::Complete.next(), None);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for phase in OffseasonPhase::ALL {
            assert_eq!(phase.as_str().parse::<OffseasonPhase>().unwrap(), phase);
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
        assert!("SPRING_BREAK".parse::<OffseasonPhase>().is_err());
    }

    #[test]
    fn test_span_to() {
        let skipped: Vec<_> =
            OffseasonPhase::PostSuperBowl.span_to(OffseasonPhase::PreFreeAgency).collect();
        assert_eq!(
            skipped,
            vec![OffseasonPhase::FranchiseTagPeriod, OffseasonPhase::PreFreeAgency]
        );
        assert_eq!(OffseasonPhase::Draft.span_to(OffseasonPhase::Draft).count(), 0);
    }
}
