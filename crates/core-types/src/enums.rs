use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The defensive position a player lists on their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPosition {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

impl FieldPosition {
    pub const ALL: [FieldPosition; 10] = [
        FieldPosition::Catcher,
        FieldPosition::FirstBase,
        FieldPosition::SecondBase,
        FieldPosition::ThirdBase,
        FieldPosition::Shortstop,
        FieldPosition::LeftField,
        FieldPosition::CenterField,
        FieldPosition::RightField,
        FieldPosition::Pitcher,
        FieldPosition::DesignatedHitter,
    ];

    /// The scorebook abbreviation, e.g. `"SS"`.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            FieldPosition::Catcher => "C",
            FieldPosition::FirstBase => "1B",
            FieldPosition::SecondBase => "2B",
            FieldPosition::ThirdBase => "3B",
            FieldPosition::Shortstop => "SS",
            FieldPosition::LeftField => "LF",
            FieldPosition::CenterField => "CF",
            FieldPosition::RightField => "RF",
            FieldPosition::Pitcher => "P",
            FieldPosition::DesignatedHitter => "DH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldPosition::Catcher => "Catcher",
            FieldPosition::FirstBase => "First Base",
            FieldPosition::SecondBase => "Second Base",
            FieldPosition::ThirdBase => "Third Base",
            FieldPosition::Shortstop => "Shortstop",
            FieldPosition::LeftField => "Left Field",
            FieldPosition::CenterField => "Center Field",
            FieldPosition::RightField => "Right Field",
            FieldPosition::Pitcher => "Pitcher",
            FieldPosition::DesignatedHitter => "Designated Hitter",
        }
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for FieldPosition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldPosition::ALL
            .into_iter()
            .find(|p| p.abbreviation().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownVariant("position", s.to_string()))
    }
}

/// Mirrors the `plan_type` enum in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "plan_type", rename_all = "lowercase")]
pub enum PlanType {
    Free,
    Premium,
}

/// Mirrors the `subscription_status` enum in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
    Trial,
}

/// How often a premium plan is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// Length of one paid period.
    pub fn period_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Yearly => 365,
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingCycle::Monthly => f.write_str("monthly"),
            BillingCycle::Yearly => f.write_str("yearly"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parses_abbreviations_case_insensitively() {
        assert_eq!("ss".parse::<FieldPosition>(), Ok(FieldPosition::Shortstop));
        assert_eq!(" 1B ".parse::<FieldPosition>(), Ok(FieldPosition::FirstBase));
        assert!("XX".parse::<FieldPosition>().is_err());
    }

    #[test]
    fn position_serializes_as_abbreviation() {
        let json = serde_json::to_string(&FieldPosition::DesignatedHitter).unwrap();
        assert_eq!(json, "\"DH\"");
        for p in FieldPosition::ALL {
            assert_eq!(p.to_string().parse::<FieldPosition>(), Ok(p));
        }
    }

    #[test]
    fn plan_and_status_use_lowercase_names() {
        assert_eq!(serde_json::to_string(&PlanType::Premium).unwrap(), "\"premium\"");
        assert_eq!(
            serde_json::from_str::<SubscriptionStatus>("\"trial\"").unwrap(),
            SubscriptionStatus::Trial
        );
        assert_eq!(BillingCycle::Yearly.period_days(), 365);
    }
}
