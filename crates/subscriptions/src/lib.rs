//! # Dugout Subscriptions
//!
//! The rules behind the free trial and the premium plan: who currently has
//! premium access, how many trial days are left, and what a completed
//! checkout does to a subscription. Pure logic; persistence is the caller's job.

pub mod error;
pub mod manager;

pub use error::SubscriptionError;
pub use manager::{AccessStatus, PlanOffer, SubscriptionManager};
