use crate::{
	context::RequestContext,
	error::AppError,
	models::{NewRoom, NewRoomType, Room, RoomDetail, RoomType},
	repo::EntityStore,
	services::to_money,
};
use bigdecimal::{BigDecimal, Zero};

fn checked_price(price: BigDecimal) -> Result<BigDecimal, AppError> {
	if price <= BigDecimal::zero() {
		return Err(AppError::Validation("price must be greater than 0".to_string()));
	}
	to_money(&price).ok_or_else(|| {
		AppError::Validation("price must have at most 2 decimals and 17 integer digits".to_string())
	})
}

/// Room type and room management.
#[derive(Clone)]
pub struct CatalogService<S> {
	store: S,
}

impl<S: EntityStore> CatalogService<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	pub fn create_room_type(
		&self,
		ctx: &RequestContext,
		name: &str,
		price: BigDecimal,
	) -> Result<RoomType, AppError> {
		let price = checked_price(price)?;
		self.store.run_in_transaction(ctx, |tx| {
			if tx.get_room_type_by_name(name)?.is_some() {
				return Err(AppError::RoomTypeNameTaken);
			}
			tx.insert_room_type(&NewRoomType { name: name.to_string(), price })
		})
	}

	pub fn list_room_types(&self, ctx: &RequestContext) -> Result<Vec<RoomType>, AppError> {
		self.store.run_in_transaction(ctx, |tx| tx.list_room_types())
	}

	pub fn get_room_type(&self, ctx: &RequestContext, id: i32) -> Result<RoomType, AppError> {
		self.store
			.run_in_transaction(ctx, |tx| tx.get_room_type(id)?.ok_or(AppError::RoomTypeNotFound))
	}

	/// Changing the price only affects future bookings.
	pub fn update_room_type(
		&self,
		ctx: &RequestContext,
		id: i32,
		name: &str,
		price: BigDecimal,
	) -> Result<RoomType, AppError> {
		let price = checked_price(price)?;
		self.store.run_in_transaction(ctx, |tx| {
			tx.get_room_type(id)?.ok_or(AppError::RoomTypeNotFound)?;
			if let Some(existing) = tx.get_room_type_by_name(name)? {
				if existing.id != id {
					return Err(AppError::RoomTypeNameTaken);
				}
			}
			tx.update_room_type(&RoomType { id, name: name.to_string(), price })
		})
	}

	pub fn delete_room_type(&self, ctx: &RequestContext, id: i32) -> Result<(), AppError> {
		self.store.run_in_transaction(ctx, |tx| {
			tx.get_room_type(id)?.ok_or(AppError::RoomTypeNotFound)?;
			if tx.count_rooms_with_type(id)? > 0 {
				return Err(AppError::RoomTypeInUse);
			}
			tx.delete_room_type(id)
		})
	}

	pub fn create_room(
		&self,
		ctx: &RequestContext,
		room_type_id: i32,
		room_number: &str,
	) -> Result<RoomDetail, AppError> {
		self.store.run_in_transaction(ctx, |tx| {
			let room_type = tx.get_room_type(room_type_id)?.ok_or(AppError::RoomTypeNotFound)?;
			if tx.get_room_by_number(room_number)?.is_some() {
				return Err(AppError::RoomNumberTaken);
			}
			let room =
				tx.insert_room(&NewRoom { room_type_id, room_number: room_number.to_string() })?;
			Ok(RoomDetail::new(room, room_type))
		})
	}

	pub fn list_rooms(&self, ctx: &RequestContext) -> Result<Vec<RoomDetail>, AppError> {
		let rooms = self.store.run_in_transaction(ctx, |tx| tx.list_rooms())?;
		Ok(rooms.into_iter().map(|(room, room_type)| RoomDetail::new(room, room_type)).collect())
	}

	pub fn get_room(&self, ctx: &RequestContext, id: i32) -> Result<RoomDetail, AppError> {
		let (room, room_type) = self
			.store
			.run_in_transaction(ctx, |tx| tx.get_room(id)?.ok_or(AppError::RoomNotFound))?;
		Ok(RoomDetail::new(room, room_type))
	}

	pub fn update_room(
		&self,
		ctx: &RequestContext,
		id: i32,
		room_type_id: i32,
		room_number: &str,
	) -> Result<RoomDetail, AppError> {
		self.store.run_in_transaction(ctx, |tx| {
			tx.get_room(id)?.ok_or(AppError::RoomNotFound)?;
			let room_type = tx.get_room_type(room_type_id)?.ok_or(AppError::RoomTypeNotFound)?;
			if let Some(existing) = tx.get_room_by_number(room_number)? {
				if existing.id != id {
					return Err(AppError::RoomNumberTaken);
				}
			}
			let room =
				tx.update_room(&Room { id, room_type_id, room_number: room_number.to_string() })?;
			Ok(RoomDetail::new(room, room_type))
		})
	}

	pub fn delete_room(&self, ctx: &RequestContext, id: i32) -> Result<(), AppError> {
		self.store.run_in_transaction(ctx, |tx| {
			tx.get_room(id)?.ok_or(AppError::RoomNotFound)?;
			if tx.room_has_bookings(id)? {
				return Err(AppError::RoomHasBookings);
			}
			tx.delete_room(id)
		})
	}
}
