//! Delivery — decides whether an ad may be shown and which ad wins a
//! placement when several compete.

pub mod eligibility;
pub mod selector;

pub use eligibility::{ineligibility_reason, is_eligible, IneligibleReason};
pub use selector::{select_ad, select_ad_with, SelectionPolicy};
