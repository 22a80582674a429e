//! Business operations. Each one runs as a single unit of work on an [`EntityStore`].
//!
//! [`EntityStore`]: crate::repo::EntityStore

use crate::constants::{MONEY_LIMIT, MONEY_SCALE};
use bigdecimal::BigDecimal;

pub mod booking;
pub mod catalog;
pub mod topup;
pub mod user;

pub use booking::BookingService;
pub use catalog::CatalogService;
pub use topup::{TopupOutcome, TopupService};
pub use user::UserService;

/// Fits `amount` to the money column: at most two decimals and below 10^17.
/// Returns the amount at scale 2, or `None` if the column cannot hold it exactly.
pub fn to_money(amount: &BigDecimal) -> Option<BigDecimal> {
	let (_, scale) = amount.normalized().as_bigint_and_exponent();
	if scale > MONEY_SCALE || amount.abs() >= BigDecimal::from(MONEY_LIMIT) {
		return None;
	}
	Some(amount.with_scale(MONEY_SCALE))
}
