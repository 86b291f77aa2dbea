use crate::error::SubscriptionError;
use chrono::{DateTime, Duration, Utc};
use configuration::SubscriptionSettings;
use core_types::{BillingCycle, Payment, PlanType, Subscription, SubscriptionStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

const PAYMENT_METHOD: &str = "paypal";
const PAYMENT_COMPLETED: &str = "completed";

/// One purchasable option in the plan catalogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOffer {
    pub plan_type: PlanType,
    pub billing_cycle: Option<BillingCycle>,
    pub price: Decimal,
    pub currency: String,
    pub period_days: i64,
}

/// A snapshot of what a subscription grants at a given moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessStatus {
    pub subscription: Subscription,
    pub trial_active: bool,
    pub trial_days_remaining: i64,
    pub premium_access: bool,
}

/// Applies the plan rules configured in `SubscriptionSettings`.
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    settings: SubscriptionSettings,
}

impl SubscriptionManager {
    pub fn new(settings: SubscriptionSettings) -> Result<Self, SubscriptionError> {
        if settings.trial_days < 0 {
            return Err(SubscriptionError::InvalidSettings(
                "trial_days cannot be negative".to_string(),
            ));
        }
        if settings.monthly_price <= Decimal::ZERO || settings.yearly_price <= Decimal::ZERO {
            return Err(SubscriptionError::InvalidSettings(
                "plan prices must be greater than 0".to_string(),
            ));
        }
        Ok(Self { settings })
    }

    pub fn price(&self, cycle: BillingCycle) -> Decimal {
        match cycle {
            BillingCycle::Monthly => self.settings.monthly_price,
            BillingCycle::Yearly => self.settings.yearly_price,
        }
    }

    /// The free plan followed by the premium billing options.
    pub fn plans(&self) -> Vec<PlanOffer> {
        let mut offers = vec![PlanOffer {
            plan_type: PlanType::Free,
            billing_cycle: None,
            price: Decimal::ZERO,
            currency: self.settings.currency.clone(),
            period_days: self.settings.trial_days,
        }];
        offers.extend([BillingCycle::Monthly, BillingCycle::Yearly].map(|cycle| PlanOffer {
            plan_type: PlanType::Premium,
            billing_cycle: Some(cycle),
            price: self.price(cycle),
            currency: self.settings.currency.clone(),
            period_days: cycle.period_days(),
        }));
        offers
    }

    /// The subscription every new user starts with: the free plan, on trial.
    pub fn start_trial(&self, user_id: Uuid, now: DateTime<Utc>) -> Subscription {
        tracing::info!(%user_id, trial_days = self.settings.trial_days, "Starting free trial.");
        Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_type: PlanType::Free,
            status: SubscriptionStatus::Trial,
            start_date: now,
            end_date: None,
            trial_end_date: now + Duration::days(self.settings.trial_days),
            checkout_id: None,
            amount: None,
            currency: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_trial_active(&self, sub: &Subscription, now: DateTime<Utc>) -> bool {
        sub.status == SubscriptionStatus::Trial && sub.trial_end_date > now
    }

    /// Whole days left in the trial, rounded up. Zero once the trial is over.
    pub fn trial_days_remaining(&self, sub: &Subscription, now: DateTime<Utc>) -> i64 {
        if !self.is_trial_active(sub, now) {
            return 0;
        }
        let remaining_ms = (sub.trial_end_date - now).num_milliseconds();
        let day_ms = Duration::days(1).num_milliseconds();
        ((remaining_ms + day_ms - 1) / day_ms).max(0)
    }

    /// Premium features are open during an active trial and for a paid plan
    /// until its end date. A cancelled plan keeps access until the period it
    /// paid for runs out.
    pub fn has_premium_access(&self, sub: &Subscription, now: DateTime<Utc>) -> bool {
        if self.is_trial_active(sub, now) {
            return true;
        }
        if sub.plan_type != PlanType::Premium {
            return false;
        }
        match sub.status {
            SubscriptionStatus::Active => sub.end_date.is_none_or(|end| end > now),
            SubscriptionStatus::Cancelled => sub.end_date.is_some_and(|end| end > now),
            SubscriptionStatus::Expired | SubscriptionStatus::Trial => false,
        }
    }

    /// Marks a lapsed trial or paid period as expired. Returns `None` if nothing changed.
    pub fn expire_if_lapsed(&self, sub: &Subscription, now: DateTime<Utc>) -> Option<Subscription> {
        let lapsed = match sub.status {
            SubscriptionStatus::Trial => sub.trial_end_date <= now,
            SubscriptionStatus::Active | SubscriptionStatus::Cancelled => {
                sub.end_date.is_some_and(|end| end <= now)
            }
            SubscriptionStatus::Expired => false,
        };
        lapsed.then(|| Subscription {
            status: SubscriptionStatus::Expired,
            updated_at: now,
            ..sub.clone()
        })
    }

    pub fn access(&self, sub: &Subscription, now: DateTime<Utc>) -> AccessStatus {
        AccessStatus {
            trial_active: self.is_trial_active(sub, now),
            trial_days_remaining: self.trial_days_remaining(sub, now),
            premium_access: self.has_premium_access(sub, now),
            subscription: sub.clone(),
        }
    }

    /// Upgrades `sub` to premium after an approved checkout.
    ///
    /// A renewal while a paid period is still running extends it from the
    /// current end date rather than from `now`.
    pub fn activate(
        &self,
        sub: &Subscription,
        cycle: BillingCycle,
        checkout_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Subscription, Payment), SubscriptionError> {
        let checkout_id = checkout_id.trim();
        if checkout_id.is_empty() {
            return Err(SubscriptionError::InvalidCheckout(
                "checkout id is empty".to_string(),
            ));
        }

        let period_start = match (sub.plan_type, sub.end_date) {
            (PlanType::Premium, Some(end)) if end > now => end,
            _ => now,
        };
        let amount = self.price(cycle);

        let upgraded = Subscription {
            plan_type: PlanType::Premium,
            status: SubscriptionStatus::Active,
            end_date: Some(period_start + Duration::days(cycle.period_days())),
            checkout_id: Some(checkout_id.to_string()),
            amount: Some(amount),
            currency: Some(self.settings.currency.clone()),
            updated_at: now,
            ..sub.clone()
        };

        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: sub.user_id,
            subscription_id: sub.id,
            external_payment_id: checkout_id.to_string(),
            amount,
            currency: self.settings.currency.clone(),
            status: PAYMENT_COMPLETED.to_string(),
            payment_method: PAYMENT_METHOD.to_string(),
            created_at: now,
        };

        tracing::info!(
            user_id = %sub.user_id,
            %cycle,
            %amount,
            "Premium subscription activated."
        );
        Ok((upgraded, payment))
    }

    /// Stops renewal. Access continues until the paid period ends.
    pub fn cancel(&self, sub: &Subscription, now: DateTime<Utc>) -> Result<Subscription, SubscriptionError> {
        if sub.plan_type != PlanType::Premium || sub.status != SubscriptionStatus::Active {
            return Err(SubscriptionError::NotCancellable(sub.status));
        }
        Ok(Subscription {
            status: SubscriptionStatus::Cancelled,
            updated_at: now,
            ..sub.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn manager() -> SubscriptionManager {
        SubscriptionManager::new(SubscriptionSettings::default()).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn rejects_non_positive_prices() {
        let settings = SubscriptionSettings {
            monthly_price: dec!(0),
            ..Default::default()
        };
        assert!(matches!(
            SubscriptionManager::new(settings),
            Err(SubscriptionError::InvalidSettings(_))
        ));
    }

    #[test]
    fn new_users_get_a_seven_day_trial() {
        let m = manager();
        let sub = m.start_trial(Uuid::new_v4(), at(1, 12));

        assert_eq!(sub.plan_type, PlanType::Free);
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.trial_end_date, at(8, 12));
        assert!(m.is_trial_active(&sub, at(8, 11)));
        assert!(!m.is_trial_active(&sub, at(8, 12)));
    }

    #[test]
    fn trial_days_round_up_and_bottom_out_at_zero() {
        let m = manager();
        let sub = m.start_trial(Uuid::new_v4(), at(1, 12));

        assert_eq!(m.trial_days_remaining(&sub, at(1, 12)), 7);
        assert_eq!(m.trial_days_remaining(&sub, at(1, 13)), 7);
        assert_eq!(m.trial_days_remaining(&sub, at(7, 13)), 1);
        assert_eq!(m.trial_days_remaining(&sub, at(9, 0)), 0);
    }

    #[test]
    fn expired_trial_loses_premium_access() {
        let m = manager();
        let sub = m.start_trial(Uuid::new_v4(), at(1, 0));

        assert!(m.has_premium_access(&sub, at(2, 0)));
        assert!(!m.has_premium_access(&sub, at(10, 0)));

        let expired = m.expire_if_lapsed(&sub, at(10, 0)).unwrap();
        assert_eq!(expired.status, SubscriptionStatus::Expired);
        assert!(m.expire_if_lapsed(&sub, at(2, 0)).is_none());
    }

    #[test]
    fn monthly_activation_grants_thirty_days() {
        let m = manager();
        let trial = m.start_trial(Uuid::new_v4(), at(1, 0));
        let (sub, payment) = m
            .activate(&trial, BillingCycle::Monthly, "I-CHECKOUT-1", at(3, 0))
            .unwrap();

        assert_eq!(sub.plan_type, PlanType::Premium);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.end_date, Some(at(3, 0) + Duration::days(30)));
        assert_eq!(sub.amount, Some(dec!(3.99)));
        assert_eq!(payment.amount, dec!(3.99));
        assert_eq!(payment.subscription_id, trial.id);
        assert_eq!(payment.status, "completed");

        assert!(m.has_premium_access(&sub, at(3, 0) + Duration::days(29)));
        assert!(!m.has_premium_access(&sub, at(3, 0) + Duration::days(31)));
    }

    #[test]
    fn renewal_extends_from_current_end_date() {
        let m = manager();
        let trial = m.start_trial(Uuid::new_v4(), at(1, 0));
        let (monthly, _) = m.activate(&trial, BillingCycle::Monthly, "A", at(1, 0)).unwrap();
        let (yearly, payment) = m.activate(&monthly, BillingCycle::Yearly, "B", at(10, 0)).unwrap();

        assert_eq!(yearly.end_date, Some(at(1, 0) + Duration::days(30 + 365)));
        assert_eq!(payment.amount, dec!(30.00));
    }

    #[test]
    fn empty_checkout_id_is_rejected() {
        let m = manager();
        let trial = m.start_trial(Uuid::new_v4(), at(1, 0));
        assert!(matches!(
            m.activate(&trial, BillingCycle::Monthly, "  ", at(1, 0)),
            Err(SubscriptionError::InvalidCheckout(_))
        ));
    }

    #[test]
    fn cancelled_plan_keeps_access_until_period_ends() {
        let m = manager();
        let trial = m.start_trial(Uuid::new_v4(), at(1, 0));
        let (active, _) = m.activate(&trial, BillingCycle::Monthly, "A", at(1, 0)).unwrap();
        let cancelled = m.cancel(&active, at(2, 0)).unwrap();

        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert!(m.has_premium_access(&cancelled, at(20, 0)));
        assert!(!m.has_premium_access(&cancelled, at(1, 0) + Duration::days(31)));
        assert!(m.cancel(&cancelled, at(3, 0)).is_err());
        assert!(m.cancel(&trial, at(3, 0)).is_err());
    }

    #[test]
    fn catalogue_lists_free_then_premium_cycles() {
        let plans = manager().plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].plan_type, PlanType::Free);
        assert_eq!(plans[1].billing_cycle, Some(BillingCycle::Monthly));
        assert_eq!(plans[2].price, dec!(30.00));
    }
}
