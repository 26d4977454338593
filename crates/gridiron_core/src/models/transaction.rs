use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kinds of roster moves recorded in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Trade,
    Signing,
    Release,
    FranchiseTag,
    DraftSelection,
    UndraftedSigning,
    ContractExpired,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Trade => "TRADE",
            TransactionType::Signing => "SIGNING",
            TransactionType::Release => "RELEASE",
            TransactionType::FranchiseTag => "FRANCHISE_TAG",
            TransactionType::DraftSelection => "DRAFT_SELECTION",
            TransactionType::UndraftedSigning => "UNDRAFTED_SIGNING",
            TransactionType::ContractExpired => "CONTRACT_EXPIRED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "TRADE" => TransactionType::Trade,
            "SIGNING" => TransactionType::Signing,
            "RELEASE" => TransactionType::Release,
            "FRANCHISE_TAG" => TransactionType::FranchiseTag,
            "DRAFT_SELECTION" => TransactionType::DraftSelection,
            "UNDRAFTED_SIGNING" => TransactionType::UndraftedSigning,
            "CONTRACT_EXPIRED" => TransactionType::ContractExpired,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub season: u32,
    pub date: NaiveDate,
    pub tx_type: TransactionType,
    pub team_id: u32,
    pub other_team_id: Option<u32>,
    pub player_id: Option<String>,
    /// Free-form JSON payload
    pub details: serde_json::Value,
}

/// Salary cap ledger entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapEventType {
    Signing,
    DeadMoney,
    TradeIn,
    TradeOut,
    FranchiseTag,
}

impl CapEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapEventType::Signing => "SIGNING",
            CapEventType::DeadMoney => "DEAD_MONEY",
            CapEventType::TradeIn => "TRADE_IN",
            CapEventType::TradeOut => "TRADE_OUT",
            CapEventType::FranchiseTag => "FRANCHISE_TAG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "PENDING",
            OfferStatus::Accepted => "ACCEPTED",
            OfferStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(OfferStatus::Pending),
            "ACCEPTED" => Some(OfferStatus::Accepted),
            "REJECTED" => Some(OfferStatus::Rejected),
            _ => None,
        }
    }
}

/// A free agency offer made during the negotiating window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaOffer {
    pub offer_id: String,
    pub team_id: u32,
    pub player_id: String,
    /// League year the contract would start
    pub season: u32,
    pub aav: i64,
    pub years: u32,
    pub guaranteed: i64,
    pub signing_bonus: i64,
    pub status: OfferStatus,
}
