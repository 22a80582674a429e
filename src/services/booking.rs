use crate::{
	constants::BOOKING_DATE_FORMAT,
	context::RequestContext,
	error::AppError,
	models::{BookingDetail, NewBooking, RoomDetail},
	repo::EntityStore,
};
use chrono::NaiveDate;

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_booking_date(raw: &str) -> Result<NaiveDate, AppError> {
	NaiveDate::parse_from_str(raw.trim(), BOOKING_DATE_FORMAT).map_err(|_| AppError::InvalidDate)
}

pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
	if date < today {
		return Err(AppError::DateInPast);
	}
	Ok(())
}

#[derive(Clone)]
pub struct BookingService<S> {
	store: S,
}

impl<S: EntityStore> BookingService<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// Reserves `room_id` on `date` for `user_id` and debits the room type's current price
	/// from the user's balance. Nothing is written unless every step succeeds.
	pub fn create_booking(
		&self,
		ctx: &RequestContext,
		room_id: i32,
		user_id: i32,
		date: NaiveDate,
	) -> Result<BookingDetail, AppError> {
		self.store.run_in_transaction(ctx, |tx| {
			let (room, room_type) = tx.get_room(room_id)?.ok_or(AppError::RoomNotFound)?;
			let mut user = tx.get_user(user_id)?.ok_or(AppError::UserNotFound)?;

			if let Some(existing) = tx.find_booking(room_id, date)? {
				log::warn!(
					"Room {} already booked on {} (booking {})",
					room_id,
					date,
					existing.id
				);
				return Err(AppError::RoomAlreadyBooked);
			}

			let price = room_type.price.clone();
			if user.balance < price {
				log::warn!(
					"Insufficient balance for user {}: {} < {}",
					user_id,
					user.balance,
					price
				);
				return Err(AppError::InsufficientBalance);
			}
			ctx.check()?;

			user.balance = &user.balance - &price;
			let user = tx.update_user(&user)?;
			let booking = tx.insert_booking(&NewBooking { room_id, user_id, date, price })?;

			log::info!(
				"Booked room {} on {} for user {} at {}",
				room.room_number,
				date,
				user_id,
				booking.price
			);
			Ok(BookingDetail::new(booking, RoomDetail::new(room, room_type), &user))
		})
	}

	pub fn list_for_user(
		&self,
		ctx: &RequestContext,
		user_id: i32,
	) -> Result<Vec<BookingDetail>, AppError> {
		self.store.run_in_transaction(ctx, |tx| tx.list_bookings_for_user(user_id))
	}
}
