use crate::report::{DerivedBattingMetrics, DerivedPitchingMetrics, StatSummary};
use crate::totals::{AggregateBattingTotals, AggregatePitchingTotals};
use chrono::NaiveDate;
use core_types::{BattingRecord, PitchingRecord};
use rust_decimal::{Decimal, RoundingStrategy};

/// Shown for K/BB when a pitcher has strikeouts but has not walked anyone.
pub const INFINITE_RATIO: &str = "∞";

const BATTING_DECIMALS: u32 = 3;
const PITCHING_DECIMALS: u32 = 2;

/// A stateless calculator for deriving rate stats from counting stats.
///
/// Every formula guards its denominator: a player with no at-bats or a
/// pitcher with no innings sees zeros, never NaN or an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsCalculator {}

impl StatsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Aggregation ---

    /// Sums every counter across `records`. The dates are ignored.
    pub fn aggregate_batting(&self, records: &[BattingRecord]) -> AggregateBattingTotals {
        records.iter().collect()
    }

    /// Sums the records played on `date`, or all of them when `date` is `None`.
    pub fn aggregate_batting_on(
        &self,
        records: &[BattingRecord],
        date: Option<NaiveDate>,
    ) -> AggregateBattingTotals {
        records
            .iter()
            .filter(|r| date.is_none_or(|d| r.date == d))
            .collect()
    }

    pub fn aggregate_pitching(&self, records: &[PitchingRecord]) -> AggregatePitchingTotals {
        records.iter().collect()
    }

    pub fn aggregate_pitching_on(
        &self,
        records: &[PitchingRecord],
        date: Option<NaiveDate>,
    ) -> AggregatePitchingTotals {
        records
            .iter()
            .filter(|r| date.is_none_or(|d| r.date == d))
            .collect()
    }

    // --- Batting ---

    /// AVG = H / AB.
    pub fn batting_average(&self, totals: &AggregateBattingTotals) -> String {
        format_rate(self.batting_average_value(totals), BATTING_DECIMALS)
    }

    /// OBP = (H + BB) / (AB + BB). Sacrifice flies and hit-by-pitch are not tracked.
    pub fn on_base_percentage(&self, totals: &AggregateBattingTotals) -> String {
        format_rate(self.on_base_value(totals), BATTING_DECIMALS)
    }

    /// SLG = total bases / AB.
    pub fn slugging_percentage(&self, totals: &AggregateBattingTotals) -> String {
        format_rate(self.slugging_value(totals), BATTING_DECIMALS)
    }

    /// OPS = OBP + SLG, summed before rounding.
    pub fn ops(&self, totals: &AggregateBattingTotals) -> String {
        let obp = self.on_base_value(totals).unwrap_or(Decimal::ZERO);
        let slg = self.slugging_value(totals).unwrap_or(Decimal::ZERO);
        format_rate(Some(obp + slg), BATTING_DECIMALS)
    }

    pub fn batting_metrics(&self, totals: &AggregateBattingTotals) -> DerivedBattingMetrics {
        DerivedBattingMetrics {
            batting_average: self.batting_average(totals),
            on_base_percentage: self.on_base_percentage(totals),
            slugging_percentage: self.slugging_percentage(totals),
            ops: self.ops(totals),
        }
    }

    fn batting_average_value(&self, totals: &AggregateBattingTotals) -> Option<Decimal> {
        let c = &totals.counts;
        ratio(u64::from(c.hits), u64::from(c.at_bats))
    }

    fn on_base_value(&self, totals: &AggregateBattingTotals) -> Option<Decimal> {
        let c = &totals.counts;
        ratio(
            u64::from(c.hits) + u64::from(c.walks),
            u64::from(c.at_bats) + u64::from(c.walks),
        )
    }

    fn slugging_value(&self, totals: &AggregateBattingTotals) -> Option<Decimal> {
        ratio(total_bases(totals), u64::from(totals.counts.at_bats))
    }

    // --- Pitching ---

    /// ERA = ER × 9 / IP.
    pub fn era(&self, totals: &AggregatePitchingTotals) -> String {
        let c = &totals.counts;
        // ER × 9 / (outs / 3) == ER × 27 / outs
        let value = ratio(
            u64::from(c.earned_runs) * 27,
            u64::from(c.innings_pitched.outs()),
        );
        format_rate(value, PITCHING_DECIMALS)
    }

    /// WHIP = (H + BB) / IP.
    pub fn whip(&self, totals: &AggregatePitchingTotals) -> String {
        let c = &totals.counts;
        let value = ratio(
            (u64::from(c.hits_allowed) + u64::from(c.walks_allowed)) * 3,
            u64::from(c.innings_pitched.outs()),
        );
        format_rate(value, PITCHING_DECIMALS)
    }

    /// K/BB, or [`INFINITE_RATIO`] when there are strikeouts and no walks.
    pub fn strikeout_to_walk_ratio(&self, totals: &AggregatePitchingTotals) -> String {
        let c = &totals.counts;
        if c.walks_allowed == 0 && c.strikeouts > 0 {
            return INFINITE_RATIO.to_string();
        }
        format_rate(
            ratio(u64::from(c.strikeouts), u64::from(c.walks_allowed)),
            PITCHING_DECIMALS,
        )
    }

    /// BAA = H / (IP × 3), where IP × 3 is the number of outs recorded.
    pub fn batting_average_against(&self, totals: &AggregatePitchingTotals) -> String {
        let c = &totals.counts;
        let value = if c.hits_allowed == 0 {
            None
        } else {
            ratio(u64::from(c.hits_allowed), u64::from(c.innings_pitched.outs()))
        };
        format_rate(value, BATTING_DECIMALS)
    }

    pub fn pitching_metrics(&self, totals: &AggregatePitchingTotals) -> DerivedPitchingMetrics {
        DerivedPitchingMetrics {
            era: self.era(totals),
            whip: self.whip(totals),
            strikeout_to_walk_ratio: self.strikeout_to_walk_ratio(totals),
            batting_average_against: self.batting_average_against(totals),
        }
    }

    // --- Summary ---

    /// Totals and metrics for both sides of the ball, optionally limited to one date.
    pub fn summarize(
        &self,
        batting: &[BattingRecord],
        pitching: &[PitchingRecord],
        date: Option<NaiveDate>,
    ) -> StatSummary {
        let batting_totals = self.aggregate_batting_on(batting, date);
        let pitching_totals = self.aggregate_pitching_on(pitching, date);
        tracing::debug!(
            ?date,
            batting_games = batting_totals.games,
            pitching_games = pitching_totals.games,
            "Summarizing stat records."
        );

        StatSummary {
            date,
            batting: self.batting_metrics(&batting_totals),
            batting_totals,
            pitching: self.pitching_metrics(&pitching_totals),
            pitching_totals,
        }
    }
}

/// Singles, doubles, triples and home runs weighted 1-4.
///
/// Singles are clamped at zero so an inconsistent line (more extra-base hits
/// than hits) cannot drive total bases negative.
fn total_bases(totals: &AggregateBattingTotals) -> u64 {
    let c = &totals.counts;
    let singles = c.hits.saturating_sub(c.extra_base_hits());
    u64::from(singles)
        + 2 * u64::from(c.doubles)
        + 3 * u64::from(c.triples)
        + 4 * u64::from(c.home_runs)
}

fn ratio(numerator: u64, denominator: u64) -> Option<Decimal> {
    if denominator == 0 {
        return None;
    }
    Some(Decimal::from(numerator) / Decimal::from(denominator))
}

/// Rounds half away from zero and pads to exactly `decimals` places.
/// A missing value (zero denominator) prints as zero.
fn format_rate(value: Option<Decimal>, decimals: u32) -> String {
    let rounded = value
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{BattingLine, InningsPitched, PitchingLine};
    use std::str::FromStr;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn batting(ab: u32, h: u32, d: u32, t: u32, hr: u32, bb: u32) -> AggregateBattingTotals {
        AggregateBattingTotals::from_line(BattingLine {
            at_bats: ab,
            hits: h,
            doubles: d,
            triples: t,
            home_runs: hr,
            walks: bb,
            ..Default::default()
        })
    }

    fn pitching(ip: &str, er: u32, h: u32, bb: u32, k: u32) -> AggregatePitchingTotals {
        AggregatePitchingTotals::from_line(PitchingLine {
            innings_pitched: ip.parse().unwrap(),
            earned_runs: er,
            runs_allowed: er,
            hits_allowed: h,
            walks_allowed: bb,
            strikeouts: k,
            ..Default::default()
        })
    }

    #[test]
    fn batting_scenario_with_extra_base_hits() {
        let calc = StatsCalculator::new();
        let totals = batting(10, 3, 1, 0, 1, 2);

        assert_eq!(calc.batting_average(&totals), "0.300");
        assert_eq!(calc.on_base_percentage(&totals), "0.417");
        assert_eq!(calc.slugging_percentage(&totals), "0.700");
        assert_eq!(calc.ops(&totals), "1.117");
    }

    #[test]
    fn empty_batting_totals_are_all_zero_strings() {
        let calc = StatsCalculator::new();
        let metrics = calc.batting_metrics(&AggregateBattingTotals::default());

        assert_eq!(metrics.batting_average, "0.000");
        assert_eq!(metrics.on_base_percentage, "0.000");
        assert_eq!(metrics.slugging_percentage, "0.000");
        assert_eq!(metrics.ops, "0.000");
    }

    #[test]
    fn walks_alone_still_produce_an_on_base_percentage() {
        let calc = StatsCalculator::new();
        let totals = batting(0, 0, 0, 0, 0, 3);

        assert_eq!(calc.batting_average(&totals), "0.000");
        assert_eq!(calc.on_base_percentage(&totals), "1.000");
        assert_eq!(calc.slugging_percentage(&totals), "0.000");
    }

    #[test]
    fn ops_matches_sum_of_components() {
        let calc = StatsCalculator::new();
        for totals in [batting(10, 3, 1, 0, 1, 2), batting(37, 11, 2, 1, 3, 6), batting(4, 4, 0, 0, 4, 0)] {
            let obp = Decimal::from_str(&calc.on_base_percentage(&totals)).unwrap();
            let slg = Decimal::from_str(&calc.slugging_percentage(&totals)).unwrap();
            let ops = Decimal::from_str(&calc.ops(&totals)).unwrap();
            assert!((ops - (obp + slg)).abs() <= dec!(0.001), "{ops} vs {obp} + {slg}");
        }
    }

    #[test]
    fn slugging_clamps_negative_singles() {
        let calc = StatsCalculator::new();
        // 1 hit cannot include a double and a home run; singles clamp to 0.
        let totals = batting(4, 1, 1, 0, 1, 0);
        assert_eq!(calc.slugging_percentage(&totals), "1.500");
    }

    #[test]
    fn pitching_scenario_full_innings() {
        let calc = StatsCalculator::new();
        let totals = pitching("6", 2, 5, 1, 8);

        assert_eq!(calc.era(&totals), "3.00");
        assert_eq!(calc.whip(&totals), "1.00");
        assert_eq!(calc.strikeout_to_walk_ratio(&totals), "8.00");
        assert_eq!(calc.batting_average_against(&totals), "0.278");
    }

    #[test]
    fn empty_pitching_totals_are_all_zero_strings() {
        let calc = StatsCalculator::new();
        let metrics = calc.pitching_metrics(&AggregatePitchingTotals::default());

        assert_eq!(metrics.era, "0.00");
        assert_eq!(metrics.whip, "0.00");
        assert_eq!(metrics.strikeout_to_walk_ratio, "0.00");
        assert_eq!(metrics.batting_average_against, "0.000");
    }

    #[test]
    fn strikeouts_without_walks_is_infinite() {
        let calc = StatsCalculator::new();
        let totals = pitching("5", 0, 0, 0, 6);
        assert_eq!(calc.strikeout_to_walk_ratio(&totals), INFINITE_RATIO);
    }

    #[test]
    fn partial_innings_count_outs() {
        let calc = StatsCalculator::new();
        // 6.1 innings is 19 outs, not 6.1 × 3 = 18.3.
        let totals = pitching("6.1", 3, 4, 2, 5);

        assert_eq!(calc.batting_average_against(&totals), "0.211");
        assert_eq!(calc.era(&totals), "4.26");
        assert_eq!(calc.whip(&totals), "0.95");
        assert_eq!(calc.strikeout_to_walk_ratio(&totals), "2.50");
    }

    #[test]
    fn damage_without_outs_still_yields_zero_strings() {
        let calc = StatsCalculator::new();
        let totals = pitching("0.0", 3, 4, 2, 0);
        assert_eq!(calc.era(&totals), "0.00");
        assert_eq!(calc.whip(&totals), "0.00");
        assert_eq!(calc.batting_average_against(&totals), "0.000");
        assert_eq!(calc.strikeout_to_walk_ratio(&totals), "0.00");
    }

    #[test]
    fn innings_without_hits_has_zero_average_against() {
        let calc = StatsCalculator::new();
        assert_eq!(calc.batting_average_against(&pitching("9", 0, 0, 2, 10)), "0.000");
    }

    #[test]
    fn aggregating_nothing_gives_zeros() {
        let calc = StatsCalculator::new();
        assert_eq!(calc.aggregate_batting(&[]), AggregateBattingTotals::default());
        assert_eq!(calc.aggregate_pitching(&[]), AggregatePitchingTotals::default());
    }

    #[test]
    fn aggregating_one_record_returns_its_counters() {
        let calc = StatsCalculator::new();
        let line = BattingLine {
            at_bats: 4,
            hits: 2,
            doubles: 1,
            rbi: 3,
            runs: 1,
            walks: 1,
            strikeouts: 1,
            stolen_bases: 2,
            ..Default::default()
        };
        let record = BattingRecord::new(Uuid::new_v4(), date(1), line);

        let totals = calc.aggregate_batting(std::slice::from_ref(&record));
        assert_eq!(totals.counts, line);
        assert_eq!(totals.games, 1);
    }

    #[test]
    fn aggregation_sums_fields_and_filters_by_date() {
        let calc = StatsCalculator::new();
        let user = Uuid::new_v4();
        let line = |ab, h| BattingLine { at_bats: ab, hits: h, ..Default::default() };
        let records = vec![
            BattingRecord::new(user, date(1), line(4, 1)),
            BattingRecord::new(user, date(2), line(3, 2)),
            BattingRecord::new(user, date(2), line(5, 1)),
        ];

        let all = calc.aggregate_batting(&records);
        assert_eq!((all.games, all.counts.at_bats, all.counts.hits), (3, 12, 4));

        let day_two = calc.aggregate_batting_on(&records, Some(date(2)));
        assert_eq!((day_two.games, day_two.counts.at_bats, day_two.counts.hits), (2, 8, 3));
        assert_eq!(calc.batting_average(&day_two), "0.375");

        let none = calc.aggregate_batting_on(&records, Some(date(9)));
        assert_eq!(none, AggregateBattingTotals::default());
    }

    #[test]
    fn pitching_aggregation_adds_innings_by_outs() {
        let calc = StatsCalculator::new();
        let user = Uuid::new_v4();
        let outing = |ip: &str| PitchingLine {
            innings_pitched: ip.parse().unwrap(),
            strikeouts: 2,
            ..Default::default()
        };
        let records = vec![
            PitchingRecord::new(user, date(1), outing("6.2")),
            PitchingRecord::new(user, date(5), outing("0.1")),
        ];

        let totals = calc.aggregate_pitching(&records);
        assert_eq!(totals.counts.innings_pitched, InningsPitched::from_outs(21));
        assert_eq!(totals.counts.strikeouts, 4);
    }

    #[test]
    fn calculations_are_idempotent() {
        let calc = StatsCalculator::new();
        let b = batting(37, 11, 2, 1, 3, 6);
        let p = pitching("7.2", 3, 6, 2, 9);

        assert_eq!(calc.batting_metrics(&b), calc.batting_metrics(&b));
        assert_eq!(calc.pitching_metrics(&p), calc.pitching_metrics(&p));
    }

    #[test]
    fn summary_respects_date_scope() {
        let calc = StatsCalculator::new();
        let user = Uuid::new_v4();
        let batting = vec![
            BattingRecord::new(user, date(1), BattingLine { at_bats: 4, hits: 2, ..Default::default() }),
            BattingRecord::new(user, date(3), BattingLine { at_bats: 4, hits: 0, ..Default::default() }),
        ];

        let summary = calc.summarize(&batting, &[], Some(date(1)));
        assert_eq!(summary.date, Some(date(1)));
        assert_eq!(summary.batting.batting_average, "0.500");
        assert_eq!(summary.pitching.era, "0.00");

        let season = calc.summarize(&batting, &[], None);
        assert_eq!(season.batting.batting_average, "0.250");
        assert_eq!(season.batting_totals.games, 2);
    }

    #[test]
    fn format_pads_and_rounds_half_away_from_zero() {
        assert_eq!(format_rate(Some(dec!(0.3)), 3), "0.300");
        assert_eq!(format_rate(Some(dec!(0.0005)), 3), "0.001");
        assert_eq!(format_rate(Some(dec!(12)), 2), "12.00");
        assert_eq!(format_rate(None, 2), "0.00");
    }
}
