//! # Dugout Core Types
//!
//! The shared vocabulary of the workspace: per-game stat records, player
//! profiles and subscription state. Every other crate depends on this one and
//! it depends on nothing inside the workspace.

pub mod enums;
pub mod error;
pub mod innings;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{BillingCycle, FieldPosition, PlanType, SubscriptionStatus};
pub use error::CoreError;
pub use innings::InningsPitched;
pub use structs::{
    BattingLine, BattingRecord, Payment, PitchingLine, PitchingRecord, Profile, Subscription,
};
