use core_types::SubscriptionStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscriptionError {
    #[error("Invalid subscription settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid checkout: {0}")]
    InvalidCheckout(String),

    #[error("A subscription in status {0:?} cannot be cancelled")]
    NotCancellable(SubscriptionStatus),
}
