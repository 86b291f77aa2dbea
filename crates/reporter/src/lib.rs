//! # Dugout Reporter
//!
//! Lays out a player's profile and stat summary as a printable plain-text
//! document. The web server serves it for download and the CLI prints it.

use analytics::StatSummary;
use chrono::{DateTime, Utc};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{CellAlignment, ColumnConstraint, Table, Width};
use core_types::Profile;
use std::fmt::Write;

const TITLE: &str = "BASEBALL PLAYER STATISTICS REPORT";
const MISSING: &str = "—";
const LABEL_WIDTH: u16 = 28;

/// Renders the full report.
pub fn render_report(profile: &Profile, summary: &StatSummary, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(TITLE.len());

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{rule}\n{TITLE}\n{rule}");
    let _ = writeln!(out, "Scope: {}", scope_label(summary));
    let _ = writeln!(out, "Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M UTC"));

    section(&mut out, "PLAYER INFORMATION", player_table(profile));
    section(&mut out, "OFFENSIVE STATISTICS", offensive_table(summary));
    section(&mut out, "ADVANCED METRICS", batting_metrics_table(summary));
    section(&mut out, "PITCHING STATISTICS", pitching_table(summary));
    section(&mut out, "ADVANCED PITCHING METRICS", pitching_metrics_table(summary));

    out
}

/// One row for terminal output: games, innings pitched and the eight rate stats.
///
/// `G` is the larger of the batting and pitching game counts, since a
/// two-way player's dates usually overlap.
pub fn summary_table(summary: &StatSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(vec![
        "G", "AVG", "OBP", "SLG", "OPS", "IP", "ERA", "WHIP", "K/BB", "BAA",
    ]);
    let b = &summary.batting;
    let p = &summary.pitching;
    table.add_row(vec![
        summary.batting_totals.games.max(summary.pitching_totals.games).to_string(),
        b.batting_average.clone(),
        b.on_base_percentage.clone(),
        b.slugging_percentage.clone(),
        b.ops.clone(),
        summary.pitching_totals.counts.innings_pitched.to_string(),
        p.era.clone(),
        p.whip.clone(),
        p.strikeout_to_walk_ratio.clone(),
        p.batting_average_against.clone(),
    ]);
    table
}

fn scope_label(summary: &StatSummary) -> String {
    match summary.date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "All dates".to_string(),
    }
}

fn section(out: &mut String, heading: &str, table: Table) {
    let _ = writeln!(out, "{heading}\n{table}\n");
}

fn two_column(rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    // Constraints only apply to columns that already exist.
    table.set_constraints(vec![ColumnConstraint::LowerBoundary(Width::Fixed(LABEL_WIDTH))]);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

fn or_missing(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

fn player_table(profile: &Profile) -> Table {
    let position = profile
        .position
        .map(|p| format!("{} - {}", p.abbreviation(), p.label()));
    two_column(vec![
        ("Name", or_missing(Some(&profile.name))),
        ("Position", or_missing(position.as_deref())),
        ("Team", or_missing(profile.team.as_deref())),
    ])
}

fn offensive_table(summary: &StatSummary) -> Table {
    let t = &summary.batting_totals;
    let c = &t.counts;
    two_column(vec![
        ("Games (G)", t.games.to_string()),
        ("At Bats (AB)", c.at_bats.to_string()),
        ("Runs (R)", c.runs.to_string()),
        ("Hits (H)", c.hits.to_string()),
        ("Doubles (2B)", c.doubles.to_string()),
        ("Triples (3B)", c.triples.to_string()),
        ("Home Runs (HR)", c.home_runs.to_string()),
        ("Runs Batted In (RBI)", c.rbi.to_string()),
        ("Stolen Bases (SB)", c.stolen_bases.to_string()),
        ("Walks (BB)", c.walks.to_string()),
        ("Strikeouts (K)", c.strikeouts.to_string()),
    ])
}

fn batting_metrics_table(summary: &StatSummary) -> Table {
    let m = &summary.batting;
    two_column(vec![
        ("Batting Average (AVG)", m.batting_average.clone()),
        ("On-Base Percentage (OBP)", m.on_base_percentage.clone()),
        ("Slugging Percentage (SLG)", m.slugging_percentage.clone()),
        ("On-Base Plus Slugging (OPS)", m.ops.clone()),
    ])
}

fn pitching_table(summary: &StatSummary) -> Table {
    let t = &summary.pitching_totals;
    let c = &t.counts;
    two_column(vec![
        ("Games (G)", t.games.to_string()),
        ("Innings Pitched (IP)", c.innings_pitched.to_string()),
        ("Hits Allowed (H)", c.hits_allowed.to_string()),
        ("Runs Allowed (R)", c.runs_allowed.to_string()),
        ("Earned Runs (ER)", c.earned_runs.to_string()),
        ("Walks Allowed (BB)", c.walks_allowed.to_string()),
        ("Strikeouts (K)", c.strikeouts.to_string()),
        ("Hit Batters (HBP)", c.hit_batters.to_string()),
        ("Wild Pitches (WP)", c.wild_pitches.to_string()),
        ("Balks (BK)", c.balks.to_string()),
        ("Wins (W)", c.wins.to_string()),
        ("Losses (L)", c.losses.to_string()),
        ("Saves (SV)", c.saves.to_string()),
    ])
}

fn pitching_metrics_table(summary: &StatSummary) -> Table {
    let m = &summary.pitching;
    two_column(vec![
        ("Earned Run Average (ERA)", m.era.clone()),
        ("Walks + Hits per Inning (WHIP)", m.whip.clone()),
        ("Strikeouts per Walk (K/BB)", m.strikeout_to_walk_ratio.clone()),
        ("Batting Average Against (BAA)", m.batting_average_against.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::StatsCalculator;
    use chrono::{NaiveDate, TimeZone};
    use core_types::{BattingLine, BattingRecord, FieldPosition, PitchingLine, PitchingRecord};
    use uuid::Uuid;

    fn sample() -> (Profile, StatSummary) {
        let user = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let batting = vec![BattingRecord::new(
            user,
            day,
            BattingLine {
                at_bats: 10,
                hits: 3,
                doubles: 1,
                home_runs: 1,
                walks: 2,
                ..Default::default()
            },
        )];
        let pitching = vec![PitchingRecord::new(
            user,
            day,
            PitchingLine {
                innings_pitched: "6.1".parse().unwrap(),
                earned_runs: 2,
                runs_allowed: 2,
                strikeouts: 7,
                ..Default::default()
            },
        )];

        let mut profile = Profile::new(user, "Casey");
        profile.position = Some(FieldPosition::CenterField);
        let summary = StatsCalculator::new().summarize(&batting, &pitching, None);
        (profile, summary)
    }

    #[test]
    fn report_lists_profile_and_metrics() {
        let (profile, summary) = sample();
        let generated = Utc.with_ymd_and_hms(2024, 7, 5, 9, 30, 0).unwrap();
        let report = render_report(&profile, &summary, generated);

        assert!(report.starts_with('='));
        assert!(report.contains(TITLE));
        assert!(report.contains("Scope: All dates"));
        assert!(report.contains("Generated: 2024-07-05 09:30 UTC"));
        assert!(report.contains("Casey"));
        assert!(report.contains("CF - Center Field"));
        assert!(report.contains("1.117"));
        assert!(report.contains("6.1"));
        assert!(report.contains(analytics::INFINITE_RATIO));
    }

    #[test]
    fn missing_profile_fields_print_a_dash() {
        let (mut profile, summary) = sample();
        profile.team = Some("   ".to_string());
        let report = render_report(&profile, &summary, Utc::now());

        let team_line = report.lines().find(|l| l.contains("Team")).unwrap();
        assert!(team_line.contains(MISSING));
    }

    #[test]
    fn single_date_scope_is_printed() {
        let (profile, mut summary) = sample();
        summary.date = NaiveDate::from_ymd_opt(2024, 7, 4);
        let report = render_report(&profile, &summary, Utc::now());
        assert!(report.contains("Scope: 2024-07-04"));
    }

    #[test]
    fn summary_table_has_one_row_of_rates() {
        let (_, summary) = sample();
        let rendered = summary_table(&summary).to_string();
        assert!(rendered.contains("OPS"));
        assert!(rendered.contains("0.300"));
        assert!(rendered.contains("2.84"));
    }
}
