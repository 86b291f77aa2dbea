use crate::totals::{AggregateBattingTotals, AggregatePitchingTotals};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Batting rate stats, formatted to three decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedBattingMetrics {
    pub batting_average: String,
    pub on_base_percentage: String,
    pub slugging_percentage: String,
    pub ops: String,
}

/// Pitching rate stats. ERA, WHIP and K/BB carry two decimals, BAA three.
///
/// `strikeout_to_walk_ratio` is `"∞"` for a pitcher with strikeouts and no walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedPitchingMetrics {
    pub era: String,
    pub whip: String,
    pub strikeout_to_walk_ratio: String,
    pub batting_average_against: String,
}

/// Everything a dashboard or report shows for one selection of records.
///
/// `date` is `None` when the totals span all dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub date: Option<NaiveDate>,
    pub batting_totals: AggregateBattingTotals,
    pub batting: DerivedBattingMetrics,
    pub pitching_totals: AggregatePitchingTotals,
    pub pitching: DerivedPitchingMetrics,
}
