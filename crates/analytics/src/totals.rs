use core_types::{BattingLine, BattingRecord, PitchingLine, PitchingRecord};
use serde::{Deserialize, Serialize};

/// Field-wise sum of a set of batting records.
///
/// Derived on demand and never persisted. `games` counts the records that
/// went into the sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBattingTotals {
    pub games: u32,
    #[serde(flatten)]
    pub counts: BattingLine,
}

impl AggregateBattingTotals {
    pub fn from_line(counts: BattingLine) -> Self {
        Self { games: 1, counts }
    }

    pub fn add(&mut self, record: &BattingRecord) {
        self.games = self.games.saturating_add(1);
        self.counts += &record.line;
    }
}

impl<'a> FromIterator<&'a BattingRecord> for AggregateBattingTotals {
    fn from_iter<I: IntoIterator<Item = &'a BattingRecord>>(iter: I) -> Self {
        let mut totals = Self::default();
        for record in iter {
            totals.add(record);
        }
        totals
    }
}

/// Field-wise sum of a set of pitching records. Innings add by outs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatePitchingTotals {
    pub games: u32,
    #[serde(flatten)]
    pub counts: PitchingLine,
}

impl AggregatePitchingTotals {
    pub fn from_line(counts: PitchingLine) -> Self {
        Self { games: 1, counts }
    }

    pub fn add(&mut self, record: &PitchingRecord) {
        self.games = self.games.saturating_add(1);
        self.counts += &record.line;
    }
}

impl<'a> FromIterator<&'a PitchingRecord> for AggregatePitchingTotals {
    fn from_iter<I: IntoIterator<Item = &'a PitchingRecord>>(iter: I) -> Self {
        let mut totals = Self::default();
        for record in iter {
            totals.add(record);
        }
        totals
    }
}
