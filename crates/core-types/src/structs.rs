use crate::enums::{FieldPosition, PlanType, SubscriptionStatus};
use crate::error::CoreError;
use crate::innings::InningsPitched;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use uuid::Uuid;

/// The counting stats a batter accumulates in one game.
///
/// Doubles, triples and home runs are also hits, so a consistent line has
/// `hits >= doubles + triples + home_runs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattingLine {
    pub at_bats: u32,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub stolen_bases: u32,
}

/// Largest value a single counter may hold. Counters are stored as signed
/// 32-bit integers.
const MAX_COUNT: u32 = i32::MAX as u32;

fn check_counts(fields: &[(&str, u32)]) -> Result<(), CoreError> {
    match fields.iter().find(|(_, value)| *value > MAX_COUNT) {
        Some((field, value)) => Err(CoreError::InvalidInput(
            field.to_string(),
            format!("{value} exceeds the maximum of {MAX_COUNT}"),
        )),
        None => Ok(()),
    }
}

impl BattingLine {
    pub fn extra_base_hits(&self) -> u32 {
        self.doubles
            .saturating_add(self.triples)
            .saturating_add(self.home_runs)
    }

    /// Rejects lines that cannot have happened on a field.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_counts(&[
            ("at_bats", self.at_bats),
            ("hits", self.hits),
            ("doubles", self.doubles),
            ("triples", self.triples),
            ("home_runs", self.home_runs),
            ("rbi", self.rbi),
            ("runs", self.runs),
            ("walks", self.walks),
            ("strikeouts", self.strikeouts),
            ("stolen_bases", self.stolen_bases),
        ])?;
        if self.extra_base_hits() > self.hits {
            return Err(CoreError::InvalidInput(
                "hits".to_string(),
                format!(
                    "{} hits cannot include {} doubles, triples and home runs",
                    self.hits,
                    self.extra_base_hits()
                ),
            ));
        }
        if self.hits > self.at_bats {
            return Err(CoreError::InvalidInput(
                "hits".to_string(),
                format!("{} hits exceed {} at-bats", self.hits, self.at_bats),
            ));
        }
        Ok(())
    }
}

impl AddAssign<&BattingLine> for BattingLine {
    fn add_assign(&mut self, rhs: &BattingLine) {
        self.at_bats = self.at_bats.saturating_add(rhs.at_bats);
        self.hits = self.hits.saturating_add(rhs.hits);
        self.doubles = self.doubles.saturating_add(rhs.doubles);
        self.triples = self.triples.saturating_add(rhs.triples);
        self.home_runs = self.home_runs.saturating_add(rhs.home_runs);
        self.rbi = self.rbi.saturating_add(rhs.rbi);
        self.runs = self.runs.saturating_add(rhs.runs);
        self.walks = self.walks.saturating_add(rhs.walks);
        self.strikeouts = self.strikeouts.saturating_add(rhs.strikeouts);
        self.stolen_bases = self.stolen_bases.saturating_add(rhs.stolen_bases);
    }
}

/// One day's batting entry for a user. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub line: BattingLine,
    pub created_at: DateTime<Utc>,
}

impl BattingRecord {
    pub fn new(user_id: Uuid, date: NaiveDate, line: BattingLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            line,
            created_at: Utc::now(),
        }
    }
}

/// The counting stats a pitcher accumulates in one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchingLine {
    pub innings_pitched: InningsPitched,
    pub hits_allowed: u32,
    pub runs_allowed: u32,
    pub earned_runs: u32,
    pub walks_allowed: u32,
    pub strikeouts: u32,
    pub hit_batters: u32,
    pub wild_pitches: u32,
    pub balks: u32,
    pub wins: u32,
    pub losses: u32,
    pub saves: u32,
}

impl PitchingLine {
    pub fn validate(&self) -> Result<(), CoreError> {
        check_counts(&[
            ("innings_pitched", self.innings_pitched.outs()),
            ("hits_allowed", self.hits_allowed),
            ("runs_allowed", self.runs_allowed),
            ("earned_runs", self.earned_runs),
            ("walks_allowed", self.walks_allowed),
            ("strikeouts", self.strikeouts),
            ("hit_batters", self.hit_batters),
            ("wild_pitches", self.wild_pitches),
            ("balks", self.balks),
            ("wins", self.wins),
            ("losses", self.losses),
            ("saves", self.saves),
        ])?;
        if self.earned_runs > self.runs_allowed {
            return Err(CoreError::InvalidInput(
                "earned_runs".to_string(),
                format!(
                    "{} earned runs exceed {} runs allowed",
                    self.earned_runs, self.runs_allowed
                ),
            ));
        }
        Ok(())
    }
}

impl AddAssign<&PitchingLine> for PitchingLine {
    fn add_assign(&mut self, rhs: &PitchingLine) {
        self.innings_pitched += rhs.innings_pitched;
        self.hits_allowed = self.hits_allowed.saturating_add(rhs.hits_allowed);
        self.runs_allowed = self.runs_allowed.saturating_add(rhs.runs_allowed);
        self.earned_runs = self.earned_runs.saturating_add(rhs.earned_runs);
        self.walks_allowed = self.walks_allowed.saturating_add(rhs.walks_allowed);
        self.strikeouts = self.strikeouts.saturating_add(rhs.strikeouts);
        self.hit_batters = self.hit_batters.saturating_add(rhs.hit_batters);
        self.wild_pitches = self.wild_pitches.saturating_add(rhs.wild_pitches);
        self.balks = self.balks.saturating_add(rhs.balks);
        self.wins = self.wins.saturating_add(rhs.wins);
        self.losses = self.losses.saturating_add(rhs.losses);
        self.saves = self.saves.saturating_add(rhs.saves);
    }
}

/// One day's pitching entry for a user. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchingRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub line: PitchingLine,
    pub created_at: DateTime<Utc>,
}

impl PitchingRecord {
    pub fn new(user_id: Uuid, date: NaiveDate, line: PitchingLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            line,
            created_at: Utc::now(),
        }
    }
}

/// The player card shown on the dashboard and printed on reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub position: Option<FieldPosition>,
    pub team: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub const DEFAULT_NAME: &'static str = "Player";

    /// A blank profile for a user seen for the first time.
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        let name = name.into();
        Self {
            id,
            name: if name.trim().is_empty() { Self::DEFAULT_NAME.to_string() } else { name },
            position: None,
            team: None,
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub trial_end_date: DateTime<Utc>,
    pub checkout_id: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A completed checkout, recorded alongside the subscription it paid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub external_payment_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}
