use crate::error::CoreError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

const OUTS_PER_INNING: u32 = 3;

/// Innings pitched, stored as outs recorded.
///
/// Scorebooks write partial innings with the digit after the point counting
/// outs, not tenths: `6.1` is six innings and one out (19 outs) and `6.2` is
/// 20 outs. Keeping the count in outs makes summation exact, so `6.2 + 0.1`
/// is `7.0` rather than `6.3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InningsPitched {
    outs: u32,
}

impl InningsPitched {
    pub fn from_outs(outs: u32) -> Self {
        Self { outs }
    }

    pub fn from_innings(whole: u32, partial_outs: u32) -> Result<Self, CoreError> {
        if partial_outs >= OUTS_PER_INNING {
            return Err(CoreError::InvalidInput(
                "innings_pitched".to_string(),
                format!("partial inning must be 0, 1 or 2 outs, got {partial_outs}"),
            ));
        }
        let outs = whole
            .checked_mul(OUTS_PER_INNING)
            .and_then(|o| o.checked_add(partial_outs))
            .ok_or_else(|| {
                CoreError::InvalidInput("innings_pitched".to_string(), "value too large".to_string())
            })?;
        Ok(Self { outs })
    }

    pub fn outs(&self) -> u32 {
        self.outs
    }

    pub fn whole_innings(&self) -> u32 {
        self.outs / OUTS_PER_INNING
    }

    pub fn partial_outs(&self) -> u32 {
        self.outs % OUTS_PER_INNING
    }
}

impl fmt::Display for InningsPitched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole_innings(), self.partial_outs())
    }
}

impl FromStr for InningsPitched {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| {
            CoreError::InvalidInput("innings_pitched".to_string(), format!("'{s}': {reason}"))
        };
        let trimmed = s.trim();
        let (whole, partial) = match trimmed.split_once('.') {
            Some((whole, partial)) => (whole, Some(partial)),
            None => (trimmed, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a whole number of innings"));
        }
        let whole: u32 = whole.parse().map_err(|_| invalid("value too large"))?;
        let partial_outs = match partial {
            None => 0,
            Some(p) if p.len() == 1 && p.as_bytes()[0].is_ascii_digit() => {
                u32::from(p.as_bytes()[0] - b'0')
            }
            Some(_) => return Err(invalid("expected a single digit after the point")),
        };
        InningsPitched::from_innings(whole, partial_outs)
    }
}

impl Add for InningsPitched {
    type Output = InningsPitched;

    fn add(self, rhs: Self) -> Self::Output {
        InningsPitched { outs: self.outs.saturating_add(rhs.outs) }
    }
}

impl AddAssign for InningsPitched {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Serialize for InningsPitched {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InningsPitched {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(InningsVisitor)
    }
}

/// Accepts `"6.1"`, `6.1` and `6`.
struct InningsVisitor;

impl<'de> Visitor<'de> for InningsVisitor {
    type Value = InningsPitched;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("innings pitched in scorebook notation, e.g. \"6.1\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let whole = u32::try_from(v).map_err(E::custom)?;
        InningsPitched::from_innings(whole, 0).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        let whole = u64::try_from(v).map_err(|_| E::custom("innings pitched cannot be negative"))?;
        self.visit_u64(whole)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // f64's Display is the shortest round-trip form, so 6.1 prints as "6.1".
        self.visit_str(&v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scorebook_notation() {
        assert_eq!("6.1".parse::<InningsPitched>().unwrap().outs(), 19);
        assert_eq!("6.2".parse::<InningsPitched>().unwrap().outs(), 20);
        assert_eq!("6".parse::<InningsPitched>().unwrap().outs(), 18);
        assert_eq!("0.0".parse::<InningsPitched>().unwrap(), InningsPitched::default());
    }

    #[test]
    fn rejects_malformed_innings() {
        for bad in ["6.3", "6.10", "-1", "", ".1", "abc", "6."] {
            assert!(bad.parse::<InningsPitched>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn sums_by_outs() {
        let a: InningsPitched = "6.2".parse().unwrap();
        let b: InningsPitched = "0.1".parse().unwrap();
        assert_eq!((a + b).to_string(), "7.0");

        let mut total = InningsPitched::default();
        for s in ["1.1", "1.1", "1.1"] {
            total += s.parse::<InningsPitched>().unwrap();
        }
        assert_eq!(total.to_string(), "4.0");
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_str: InningsPitched = serde_json::from_str("\"5.2\"").unwrap();
        let from_float: InningsPitched = serde_json::from_str("5.2").unwrap();
        let from_int: InningsPitched = serde_json::from_str("5").unwrap();
        assert_eq!(from_str.outs(), 17);
        assert_eq!(from_float, from_str);
        assert_eq!(from_int.outs(), 15);
        assert!(serde_json::from_str::<InningsPitched>("5.5").is_err());
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"5.2\"");
    }
}
