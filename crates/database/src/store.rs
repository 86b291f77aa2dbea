use crate::error::DbError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{BattingRecord, Payment, PitchingRecord, Profile, Subscription};
use uuid::Uuid;

/// User-scoped, append-only storage for stat records, plus the profile and
/// subscription rows that hang off the same user id.
///
/// The web server and CLI only talk to this trait, so the Postgres-backed
/// `DbRepository` and the `MemoryRepository` are interchangeable.
/// Record listings are ordered by date, then by creation time.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn save_batting(&self, record: &BattingRecord) -> Result<(), DbError>;

    async fn list_batting(&self, user_id: Uuid) -> Result<Vec<BattingRecord>, DbError>;

    async fn list_batting_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BattingRecord>, DbError>;

    async fn save_pitching(&self, record: &PitchingRecord) -> Result<(), DbError>;

    async fn list_pitching(&self, user_id: Uuid) -> Result<Vec<PitchingRecord>, DbError>;

    async fn list_pitching_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<PitchingRecord>, DbError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DbError>;

    /// Inserts the profile or replaces the existing one with the same id.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), DbError>;

    /// The most recently created subscription for the user, if any.
    async fn latest_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DbError>;

    /// Inserts the subscription or replaces the existing one with the same id.
    async fn save_subscription(&self, subscription: &Subscription) -> Result<(), DbError>;

    /// Stores an upgraded subscription together with the payment that paid for it.
    /// Either both are written or neither is.
    async fn save_activation(
        &self,
        subscription: &Subscription,
        payment: &Payment,
    ) -> Result<(), DbError>;

    /// All batting records, or only those on `date`.
    async fn batting_for(
        &self,
        user_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<BattingRecord>, DbError> {
        match date {
            Some(date) => self.list_batting_on(user_id, date).await,
            None => self.list_batting(user_id).await,
        }
    }

    /// All pitching records, or only those on `date`.
    async fn pitching_for(
        &self,
        user_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<PitchingRecord>, DbError> {
        match date {
            Some(date) => self.list_pitching_on(user_id, date).await,
            None => self.list_pitching(user_id).await,
        }
    }
}
