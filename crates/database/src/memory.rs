use crate::error::DbError;
use crate::store::StatsStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{BattingRecord, Payment, PitchingRecord, Profile, Subscription};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    batting: Vec<BattingRecord>,
    pitching: Vec<PitchingRecord>,
    profiles: HashMap<Uuid, Profile>,
    subscriptions: Vec<Subscription>,
    payments: Vec<Payment>,
}

/// A process-local `StatsStore`. Used by `dugout serve --in-memory` and by tests.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payments recorded for a subscription, oldest first.
    pub async fn payments_for(&self, subscription_id: Uuid) -> Vec<Payment> {
        let tables = self.tables.read().await;
        tables
            .payments
            .iter()
            .filter(|p| p.subscription_id == subscription_id)
            .cloned()
            .collect()
    }
}

fn sorted_by_date<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (NaiveDate, chrono::DateTime<chrono::Utc>),
{
    rows.sort_by_key(key);
    rows
}

fn upsert_subscription(rows: &mut Vec<Subscription>, subscription: &Subscription) {
    match rows.iter_mut().find(|s| s.id == subscription.id) {
        Some(existing) => *existing = subscription.clone(),
        None => rows.push(subscription.clone()),
    }
}

#[async_trait]
impl StatsStore for MemoryRepository {
    async fn save_batting(&self, record: &BattingRecord) -> Result<(), DbError> {
        self.tables.write().await.batting.push(record.clone());
        Ok(())
    }

    async fn list_batting(&self, user_id: Uuid) -> Result<Vec<BattingRecord>, DbError> {
        let tables = self.tables.read().await;
        let rows = tables
            .batting
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_date(rows, |r| (r.date, r.created_at)))
    }

    async fn list_batting_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BattingRecord>, DbError> {
        let tables = self.tables.read().await;
        let rows = tables
            .batting
            .iter()
            .filter(|r| r.user_id == user_id && r.date == date)
            .cloned()
            .collect();
        Ok(sorted_by_date(rows, |r| (r.date, r.created_at)))
    }

    async fn save_pitching(&self, record: &PitchingRecord) -> Result<(), DbError> {
        self.tables.write().await.pitching.push(record.clone());
        Ok(())
    }

    async fn list_pitching(&self, user_id: Uuid) -> Result<Vec<PitchingRecord>, DbError> {
        let tables = self.tables.read().await;
        let rows = tables
            .pitching
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_date(rows, |r| (r.date, r.created_at)))
    }

    async fn list_pitching_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<PitchingRecord>, DbError> {
        let tables = self.tables.read().await;
        let rows = tables
            .pitching
            .iter()
            .filter(|r| r.user_id == user_id && r.date == date)
            .cloned()
            .collect();
        Ok(sorted_by_date(rows, |r| (r.date, r.created_at)))
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DbError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        let created_at = tables
            .profiles
            .get(&profile.id)
            .map_or(profile.created_at, |p| p.created_at);
        let mut stored = profile.clone();
        stored.created_at = created_at;
        tables.profiles.insert(profile.id, stored);
        Ok(())
    }

    async fn latest_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn save_subscription(&self, subscription: &Subscription) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        upsert_subscription(&mut tables.subscriptions, subscription);
        Ok(())
    }

    async fn save_activation(
        &self,
        subscription: &Subscription,
        payment: &Payment,
    ) -> Result<(), DbError> {
        if payment.subscription_id != subscription.id {
            return Err(DbError::NotFound);
        }
        // Both writes happen under one lock, so readers never see half of it.
        let mut tables = self.tables.write().await;
        if tables
            .payments
            .iter()
            .any(|p| p.external_payment_id == payment.external_payment_id)
        {
            return Err(DbError::DuplicatePayment(payment.external_payment_id.clone()));
        }
        upsert_subscription(&mut tables.subscriptions, subscription);
        tables.payments.push(payment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use core_types::{BattingLine, PitchingLine, PlanType, SubscriptionStatus};
    use rust_decimal::Decimal;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn batting(user_id: Uuid, date: NaiveDate, hits: u32) -> BattingRecord {
        BattingRecord::new(
            user_id,
            date,
            BattingLine {
                at_bats: 4,
                hits,
                ..Default::default()
            },
        )
    }

    fn trial(user_id: Uuid) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_type: PlanType::Free,
            status: SubscriptionStatus::Trial,
            start_date: now,
            end_date: None,
            trial_end_date: now + Duration::days(7),
            checkout_id: None,
            amount: None,
            currency: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lists_are_scoped_to_the_user_and_ordered_by_date() {
        let store = MemoryRepository::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.save_batting(&batting(me, day(3), 1)).await.unwrap();
        store.save_batting(&batting(me, day(1), 2)).await.unwrap();
        store.save_batting(&batting(other, day(2), 4)).await.unwrap();

        let mine = store.list_batting(me).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].date, day(1));
        assert_eq!(mine[1].date, day(3));
        assert!(mine.iter().all(|r| r.user_id == me));
    }

    #[tokio::test]
    async fn date_filter_returns_only_that_day() {
        let store = MemoryRepository::new();
        let me = Uuid::new_v4();
        store.save_batting(&batting(me, day(1), 1)).await.unwrap();
        store.save_batting(&batting(me, day(2), 2)).await.unwrap();
        store.save_batting(&batting(me, day(2), 3)).await.unwrap();

        let on_second = store.batting_for(me, Some(day(2))).await.unwrap();
        assert_eq!(on_second.len(), 2);
        assert!(on_second.iter().all(|r| r.date == day(2)));

        assert_eq!(store.batting_for(me, None).await.unwrap().len(), 3);
        assert!(store.batting_for(me, Some(day(9))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pitching_round_trips_through_the_store() {
        let store = MemoryRepository::new();
        let me = Uuid::new_v4();
        let line = PitchingLine {
            innings_pitched: "6.1".parse().unwrap(),
            strikeouts: 7,
            ..Default::default()
        };
        store
            .save_pitching(&PitchingRecord::new(me, day(4), line))
            .await
            .unwrap();

        let rows = store.pitching_for(me, Some(day(4))).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line.innings_pitched.outs(), 19);
    }

    #[tokio::test]
    async fn profile_upsert_keeps_the_original_creation_time() {
        let store = MemoryRepository::new();
        let me = Uuid::new_v4();
        assert!(store.get_profile(me).await.unwrap().is_none());

        let first = Profile::new(me, "Casey");
        store.upsert_profile(&first).await.unwrap();

        let mut renamed = first.clone();
        renamed.name = "Casey Jones".to_string();
        renamed.created_at = first.created_at + Duration::hours(1);
        store.upsert_profile(&renamed).await.unwrap();

        let stored = store.get_profile(me).await.unwrap().unwrap();
        assert_eq!(stored.name, "Casey Jones");
        assert_eq!(stored.created_at, first.created_at);
    }

    #[tokio::test]
    async fn activation_replaces_subscription_and_records_payment() {
        let store = MemoryRepository::new();
        let me = Uuid::new_v4();
        let sub = trial(me);
        store.save_subscription(&sub).await.unwrap();

        let mut upgraded = sub.clone();
        upgraded.plan_type = PlanType::Premium;
        upgraded.status = SubscriptionStatus::Active;
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: me,
            subscription_id: sub.id,
            external_payment_id: "CHK-1".to_string(),
            amount: Decimal::new(399, 2),
            currency: "USD".to_string(),
            status: "completed".to_string(),
            payment_method: "paypal".to_string(),
            created_at: Utc::now(),
        };
        store.save_activation(&upgraded, &payment).await.unwrap();

        let latest = store.latest_subscription(me).await.unwrap().unwrap();
        assert_eq!(latest.id, sub.id);
        assert_eq!(latest.status, SubscriptionStatus::Active);
        assert_eq!(store.payments_for(sub.id).await.len(), 1);
    }

    #[tokio::test]
    async fn replayed_checkout_is_a_duplicate_payment() {
        let store = MemoryRepository::new();
        let sub = trial(Uuid::new_v4());
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: sub.user_id,
            subscription_id: sub.id,
            external_payment_id: "CHK-9".to_string(),
            amount: Decimal::new(399, 2),
            currency: "USD".to_string(),
            status: "completed".to_string(),
            payment_method: "paypal".to_string(),
            created_at: Utc::now(),
        };
        store.save_activation(&sub, &payment).await.unwrap();

        let replay = Payment {
            id: Uuid::new_v4(),
            ..payment.clone()
        };
        assert!(matches!(
            store.save_activation(&sub, &replay).await,
            Err(DbError::DuplicatePayment(id)) if id == "CHK-9"
        ));
        assert_eq!(store.payments_for(sub.id).await.len(), 1);
    }

    #[tokio::test]
    async fn mismatched_payment_is_rejected() {
        let store = MemoryRepository::new();
        let sub = trial(Uuid::new_v4());
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: sub.user_id,
            subscription_id: Uuid::new_v4(),
            external_payment_id: "CHK-2".to_string(),
            amount: Decimal::new(3000, 2),
            currency: "USD".to_string(),
            status: "completed".to_string(),
            payment_method: "paypal".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            store.save_activation(&sub, &payment).await,
            Err(DbError::NotFound)
        ));
        assert!(store.latest_subscription(sub.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_subscription_is_the_newest() {
        let store = MemoryRepository::new();
        let me = Uuid::new_v4();
        let older = trial(me);
        let mut newer = trial(me);
        newer.created_at = older.created_at + Duration::days(40);
        store.save_subscription(&newer).await.unwrap();
        store.save_subscription(&older).await.unwrap();

        let latest = store.latest_subscription(me).await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }
}
