//! Static positional market tables.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::Position;

/// Market reference numbers for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBenchmark {
    /// AAV of a 99-rated player in his prime
    pub elite_aav: i64,
    /// Five largest cap hits at the position, used for the franchise tag
    pub top_five_salaries: [i64; 5],
    /// Age after which value declines
    pub peak_age: u8,
    /// Yearly value loss past `peak_age`
    pub decline_rate: f64,
    /// Positional scarcity weight used by trade valuation
    pub trade_multiplier: f64,
}

const M: i64 = 1_000_000;
const K: i64 = 1_000;

fn bench(
    elite: i64,
    top: [i64; 5],
    peak_age: u8,
    decline_rate: f64,
    trade_multiplier: f64,
) -> PositionBenchmark {
    PositionBenchmark {
        elite_aav: elite,
        top_five_salaries: top,
        peak_age,
        decline_rate,
        trade_multiplier,
    }
}

// elite AAV, top five cap hits, peak age, decline per year, trade weight
#[rustfmt::skip]
pub static POSITION_BENCHMARKS: Lazy<HashMap<Position, PositionBenchmark>> = Lazy::new(|| {
    HashMap::from([
        (Position::QB, bench(55 * M,    [45 * M,     42 * M,     40_500 * K, 38 * M,     35_500 * K], 33, 0.06, 1.60)),
        (Position::RB, bench(19 * M,    [14 * M,     12_500 * K, 12 * M,     11 * M,     10_250 * K], 26, 0.12, 0.70)),
        (Position::WR, bench(40 * M,    [28 * M,     25_500 * K, 24 * M,     22_500 * K, 20_500 * K], 29, 0.08, 1.05)),
        (Position::TE, bench(20 * M,    [17 * M,     15 * M,     14 * M,     12_750 * K, 11_750 * K], 29, 0.08, 0.85)),
        (Position::OT, bench(30 * M,    [29 * M,     27 * M,     25 * M,     24 * M,     22 * M],     30, 0.08, 1.10)),
        (Position::OG, bench(22 * M,    [21 * M,     20 * M,     19 * M,     18_500 * K, 17_500 * K], 30, 0.08, 0.75)),
        (Position::C,  bench(17 * M,    [14_500 * K, 13_500 * K, 13 * M,     12_500 * K, 12 * M],     30, 0.08, 0.70)),
        (Position::DE, bench(40 * M,    [28_500 * K, 25_500 * K, 23_500 * K, 22 * M,     20_500 * K], 29, 0.08, 1.15)),
        (Position::DT, bench(32 * M,    [29 * M,     27 * M,     25 * M,     23_500 * K, 22 * M],     29, 0.08, 0.95)),
        (Position::LB, bench(21 * M,    [20 * M,     18_500 * K, 17_500 * K, 16_500 * K, 15_500 * K], 29, 0.08, 0.80)),
        (Position::CB, bench(30 * M,    [23 * M,     21_500 * K, 20 * M,     19_500 * K, 18 * M],     29, 0.08, 1.00)),
        (Position::S,  bench(21 * M,    [21 * M,     19_500 * K, 18 * M,     17_500 * K, 17 * M],     29, 0.08, 0.80)),
        (Position::K,  bench(6_500 * K, [6_250 * K,  6 * M,      5_750 * K,  5_500 * K,  5_250 * K],  35, 0.03, 0.20)),
        (Position::P,  bench(4_500 * K, [4_250 * K,  4 * M,      3_750 * K,  3_500 * K,  3_250 * K],  35, 0.03, 0.15)),
    ])
});

pub fn benchmark(position: Position) -> &'static PositionBenchmark {
    &POSITION_BENCHMARKS[&position]
}
