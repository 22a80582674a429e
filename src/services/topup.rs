use crate::{
	constants::SETTLEMENT_STATUS,
	context::RequestContext,
	error::AppError,
	models::{NewTopup, Topup, TopupNotification},
	repo::EntityStore,
	services::to_money,
};
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum TopupOutcome {
	Credited(Topup),
	/// The provider reported a status other than settlement; nothing was written.
	Ignored,
}

/// Extracts the user id from an order id shaped `<prefix>-<user id>-<reference>`.
pub fn parse_order_user_id(order_id: &str) -> Result<i32, AppError> {
	let parts: Vec<&str> = order_id.split('-').collect();
	if parts.len() != 3 {
		return Err(AppError::InvalidOrderIdFormat);
	}
	parts[1].parse::<i32>().map_err(|_| AppError::InvalidUserIdInOrderId)
}

/// Parses a positive amount that the balance column can store without rounding.
pub fn parse_gross_amount(raw: &str) -> Result<BigDecimal, AppError> {
	let amount = BigDecimal::from_str(raw.trim()).map_err(|_| AppError::InvalidAmountFormat)?;
	if amount <= BigDecimal::zero() {
		return Err(AppError::InvalidAmountFormat);
	}
	to_money(&amount).ok_or(AppError::InvalidAmountFormat)
}

#[derive(Clone)]
pub struct TopupService<S> {
	store: S,
}

impl<S: EntityStore> TopupService<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// Records a settled payment and credits the paying user's balance.
	///
	/// Repeated settlement notifications for the same order are each credited.
	pub fn process_notification(
		&self,
		ctx: &RequestContext,
		notification: &TopupNotification,
	) -> Result<TopupOutcome, AppError> {
		if notification.transaction_status != SETTLEMENT_STATUS {
			log::info!(
				"Ignoring notification for order {} with status {}",
				notification.order_id,
				notification.transaction_status
			);
			return Ok(TopupOutcome::Ignored);
		}

		let user_id = parse_order_user_id(&notification.order_id)?;
		let amount = parse_gross_amount(&notification.gross_amount)?;

		let topup = self.store.run_in_transaction(ctx, |tx| {
			let topup = tx.insert_topup(&NewTopup {
				user_id,
				transaction_id: notification.transaction_id.clone(),
				order_id: notification.order_id.clone(),
				amount: amount.clone(),
				status: notification.transaction_status.clone(),
			})?;

			let mut user = tx.get_user(user_id)?.ok_or(AppError::UserNotFound)?;
			user.balance = &user.balance + &amount;
			ctx.check()?;
			tx.update_user(&user)?;
			Ok(topup)
		})?;

		log::info!("Credited {} to user {} for order {}", topup.amount, user_id, topup.order_id);
		Ok(TopupOutcome::Credited(topup))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn order_id_needs_three_segments() {
		assert_eq!(parse_order_user_id("TOPUP-7-998877").unwrap(), 7);
		assert!(matches!(parse_order_user_id("BADFORMAT"), Err(AppError::InvalidOrderIdFormat)));
		assert!(matches!(
			parse_order_user_id("TOPUP-7-99-88"),
			Err(AppError::InvalidOrderIdFormat)
		));
		assert!(matches!(
			parse_order_user_id("TOPUP-abc-998877"),
			Err(AppError::InvalidUserIdInOrderId)
		));
	}

	#[test]
	fn gross_amount_must_be_positive_decimal() {
		assert_eq!(parse_gross_amount("50000.00").unwrap(), BigDecimal::from(50000));
		assert!(matches!(parse_gross_amount("fifty"), Err(AppError::InvalidAmountFormat)));
		assert!(matches!(parse_gross_amount("0"), Err(AppError::InvalidAmountFormat)));
		assert!(matches!(parse_gross_amount("-10"), Err(AppError::InvalidAmountFormat)));
	}

	#[test]
	fn gross_amount_must_fit_the_balance_column() {
		assert!(matches!(parse_gross_amount("0.004"), Err(AppError::InvalidAmountFormat)));
		assert!(matches!(parse_gross_amount("1000.001"), Err(AppError::InvalidAmountFormat)));
		assert!(matches!(parse_gross_amount("1e20"), Err(AppError::InvalidAmountFormat)));
		assert_eq!(parse_gross_amount("1000.10").unwrap().as_bigint_and_exponent().1, 2);
	}
}
