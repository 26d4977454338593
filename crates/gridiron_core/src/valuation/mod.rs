//! Contract valuation: market AAV, guarantees and franchise tag numbers.

pub mod benchmarks;
pub mod market_value;

pub use benchmarks::{benchmark, PositionBenchmark};
pub use market_value::{
    calculate_franchise_tag_value, calculate_player_value, ContractValue, MarketValueCalculator,
    ROOKIE_CONTRACT_YEARS,
};
