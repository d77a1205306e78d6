//! Block-odds model.
//!
//! Derives the expected time-to-block and horizon probabilities from
//! the fleet's aggregate hashrate and the current network difficulty.
//!
//! The horizon probabilities use the linear approximation
//! `rate * t / hashes_per_block` rather than the Poisson
//! `1 - e^(-rate * t / hashes_per_block)`. The linear form matches the
//! dashboard's established numbers and is accurate in the
//! low-probability regime a home fleet lives in; values can exceed 1.0
//! for absurdly large fleets and are intentionally not clamped.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Expected hashes per block at difficulty 1 (2^32).
const HASHES_PER_DIFFICULTY: f64 = 4_294_967_296.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Published Powerball jackpot odds (1 in 292,201,338).
const POWERBALL_JACKPOT_PROB: f64 = 1.0 / 292_201_338.0;

/// Published Mega Millions jackpot odds (1 in 302,575,350).
const MEGA_MILLIONS_JACKPOT_PROB: f64 = 1.0 / 302_575_350.0;

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct OddsReport {
    /// Expected seconds to find one block; 0 when the fleet hashrate
    /// is 0 (undefined, not infinite).
    pub time_to_block_secs: f64,
    pub prob_day: f64,
    pub prob_month: f64,
    pub prob_year: f64,
    pub lottery: LotteryComparison,
}

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct LotteryComparison {
    pub powerball: f64,
    pub mega_millions: f64,
    pub comparison: String,
}

/// Compute the odds report.
///
/// Returns `None` until a successful network fetch has cached a
/// non-zero difficulty.
pub fn calculate(total_hashrate_mhs: f64, difficulty: f64) -> Option<OddsReport> {
    if difficulty <= 0.0 {
        return None;
    }

    let rate_hs = total_hashrate_mhs * 1e6;
    let hashes_per_block = difficulty * HASHES_PER_DIFFICULTY;

    let time_to_block_secs = if rate_hs > 0.0 {
        hashes_per_block / rate_hs
    } else {
        0.0
    };

    let day_hashes = rate_hs * SECONDS_PER_DAY;
    let prob_day = day_hashes / hashes_per_block;
    let prob_month = day_hashes * 30.0 / hashes_per_block;
    let prob_year = day_hashes * 365.0 / hashes_per_block;

    let comparison = if prob_day > 0.0 {
        format!(
            "You are {:.2}x more likely to find a block today than win Powerball!",
            prob_day / POWERBALL_JACKPOT_PROB
        )
    } else {
        "Start mining to compare!".to_string()
    };

    Some(OddsReport {
        time_to_block_secs,
        prob_day,
        prob_month,
        prob_year,
        lottery: LotteryComparison {
            powerball: POWERBALL_JACKPOT_PROB,
            mega_millions: MEGA_MILLIONS_JACKPOT_PROB,
            comparison,
        },
    })
}
