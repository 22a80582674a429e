use super::{EntityStore, StoreResult, StoreTx};
use crate::{
	context::RequestContext,
	error::AppError,
	models::{
		Booking, BookingDetail, NewBooking, NewRoom, NewRoomType, NewTopup, NewUser, Room,
		RoomDetail, RoomType, Topup, User,
	},
};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use std::{
	collections::BTreeMap,
	sync::{Arc, Mutex},
};

#[derive(Debug, Default, Clone)]
struct MemoryState {
	users: BTreeMap<i32, User>,
	room_types: BTreeMap<i32, RoomType>,
	rooms: BTreeMap<i32, Room>,
	bookings: BTreeMap<i32, Booking>,
	topups: BTreeMap<i32, Topup>,
	last_id: i32,
}

impl MemoryState {
	fn next_id(&mut self) -> i32 {
		self.last_id += 1;
		self.last_id
	}
}

/// In-process store used by tests and local runs.
///
/// One mutex guards the committed state for the whole unit of work; the transaction
/// mutates a private copy that replaces the committed state only on success.
#[derive(Clone, Default)]
pub struct MemoryStore {
	state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	#[cfg(test)]
	pub fn topups(&self) -> Vec<Topup> {
		self.state.lock().map(|s| s.topups.values().cloned().collect()).unwrap_or_default()
	}

	#[cfg(test)]
	pub fn bookings(&self) -> Vec<Booking> {
		self.state.lock().map(|s| s.bookings.values().cloned().collect()).unwrap_or_default()
	}
}

impl EntityStore for MemoryStore {
	fn run_in_transaction<T, F>(&self, ctx: &RequestContext, f: F) -> StoreResult<T>
	where
		F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>,
	{
		ctx.check()?;
		let mut committed = self
			.state
			.lock()
			.map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))?;
		let mut tx = MemoryTx { state: committed.clone() };
		let value = f(&mut tx)?;
		ctx.check()?;
		*committed = tx.state;
		Ok(value)
	}
}

struct MemoryTx {
	state: MemoryState,
}

impl MemoryTx {
	fn room_type_of(&self, room: &Room) -> StoreResult<RoomType> {
		self.state
			.room_types
			.get(&room.room_type_id)
			.cloned()
			.ok_or_else(|| AppError::Internal(format!("room {} has no room type", room.id)))
	}
}

impl StoreTx for MemoryTx {
	fn insert_user(&mut self, user: &NewUser<'_>) -> StoreResult<User> {
		if self.state.users.values().any(|u| u.email == user.email) {
			return Err(AppError::EmailTaken);
		}
		let now = Utc::now();
		let created = User {
			id: self.state.next_id(),
			name: user.name.to_string(),
			email: user.email.to_string(),
			password: user.password.to_string(),
			balance: BigDecimal::from(0),
			created_at: now,
			updated_at: now,
		};
		self.state.users.insert(created.id, created.clone());
		Ok(created)
	}

	fn get_user(&mut self, id: i32) -> StoreResult<Option<User>> {
		Ok(self.state.users.get(&id).cloned())
	}

	fn get_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
		Ok(self.state.users.values().find(|u| u.email == email).cloned())
	}

	fn update_user(&mut self, user: &User) -> StoreResult<User> {
		if self.state.users.values().any(|u| u.email == user.email && u.id != user.id) {
			return Err(AppError::EmailTaken);
		}
		let stored = self.state.users.get_mut(&user.id).ok_or(AppError::UserNotFound)?;
		stored.name = user.name.clone();
		stored.email = user.email.clone();
		stored.balance = user.balance.clone();
		stored.updated_at = Utc::now();
		Ok(stored.clone())
	}

	fn insert_room_type(&mut self, room_type: &NewRoomType) -> StoreResult<RoomType> {
		if self.state.room_types.values().any(|t| t.name == room_type.name) {
			return Err(AppError::RoomTypeNameTaken);
		}
		let created = RoomType {
			id: self.state.next_id(),
			name: room_type.name.clone(),
			price: room_type.price.clone(),
		};
		self.state.room_types.insert(created.id, created.clone());
		Ok(created)
	}

	fn list_room_types(&mut self) -> StoreResult<Vec<RoomType>> {
		Ok(self.state.room_types.values().cloned().collect())
	}

	fn get_room_type(&mut self, id: i32) -> StoreResult<Option<RoomType>> {
		Ok(self.state.room_types.get(&id).cloned())
	}

	fn get_room_type_by_name(&mut self, name: &str) -> StoreResult<Option<RoomType>> {
		Ok(self.state.room_types.values().find(|t| t.name == name).cloned())
	}

	fn update_room_type(&mut self, room_type: &RoomType) -> StoreResult<RoomType> {
		if self.state.room_types.values().any(|t| t.name == room_type.name && t.id != room_type.id) {
			return Err(AppError::RoomTypeNameTaken);
		}
		let stored =
			self.state.room_types.get_mut(&room_type.id).ok_or(AppError::RoomTypeNotFound)?;
		*stored = room_type.clone();
		Ok(stored.clone())
	}

	fn delete_room_type(&mut self, id: i32) -> StoreResult<()> {
		if self.state.rooms.values().any(|r| r.room_type_id == id) {
			return Err(AppError::RoomTypeInUse);
		}
		self.state.room_types.remove(&id);
		Ok(())
	}

	fn insert_room(&mut self, room: &NewRoom) -> StoreResult<Room> {
		if !self.state.room_types.contains_key(&room.room_type_id) {
			return Err(AppError::RoomTypeNotFound);
		}
		if self.state.rooms.values().any(|r| r.room_number == room.room_number) {
			return Err(AppError::RoomNumberTaken);
		}
		let created = Room {
			id: self.state.next_id(),
			room_type_id: room.room_type_id,
			room_number: room.room_number.clone(),
		};
		self.state.rooms.insert(created.id, created.clone());
		Ok(created)
	}

	fn list_rooms(&mut self) -> StoreResult<Vec<(Room, RoomType)>> {
		self.state
			.rooms
			.values()
			.map(|room| Ok((room.clone(), self.room_type_of(room)?)))
			.collect()
	}

	fn get_room(&mut self, id: i32) -> StoreResult<Option<(Room, RoomType)>> {
		match self.state.rooms.get(&id) {
			Some(room) => Ok(Some((room.clone(), self.room_type_of(room)?))),
			None => Ok(None),
		}
	}

	fn get_room_by_number(&mut self, room_number: &str) -> StoreResult<Option<Room>> {
		Ok(self.state.rooms.values().find(|r| r.room_number == room_number).cloned())
	}

	fn update_room(&mut self, room: &Room) -> StoreResult<Room> {
		if !self.state.room_types.contains_key(&room.room_type_id) {
			return Err(AppError::RoomTypeNotFound);
		}
		if self.state.rooms.values().any(|r| r.room_number == room.room_number && r.id != room.id) {
			return Err(AppError::RoomNumberTaken);
		}
		let stored = self.state.rooms.get_mut(&room.id).ok_or(AppError::RoomNotFound)?;
		*stored = room.clone();
		Ok(stored.clone())
	}

	fn delete_room(&mut self, id: i32) -> StoreResult<()> {
		if self.state.bookings.values().any(|b| b.room_id == id) {
			return Err(AppError::RoomHasBookings);
		}
		self.state.rooms.remove(&id);
		Ok(())
	}

	fn count_rooms_with_type(&mut self, room_type_id: i32) -> StoreResult<i64> {
		Ok(self.state.rooms.values().filter(|r| r.room_type_id == room_type_id).count() as i64)
	}

	fn room_has_bookings(&mut self, room_id: i32) -> StoreResult<bool> {
		Ok(self.state.bookings.values().any(|b| b.room_id == room_id))
	}

	fn find_booking(&mut self, room_id: i32, date: NaiveDate) -> StoreResult<Option<Booking>> {
		Ok(self
			.state
			.bookings
			.values()
			.find(|b| b.room_id == room_id && b.date == date)
			.cloned())
	}

	fn insert_booking(&mut self, booking: &NewBooking) -> StoreResult<Booking> {
		if self.find_booking(booking.room_id, booking.date)?.is_some() {
			return Err(AppError::RoomAlreadyBooked);
		}
		let created = Booking {
			id: self.state.next_id(),
			room_id: booking.room_id,
			user_id: booking.user_id,
			date: booking.date,
			price: booking.price.clone(),
		};
		self.state.bookings.insert(created.id, created.clone());
		Ok(created)
	}

	fn list_bookings_for_user(&mut self, user_id: i32) -> StoreResult<Vec<BookingDetail>> {
		let user = match self.state.users.get(&user_id) {
			Some(user) => user,
			None => return Ok(Vec::new()),
		};
		let mut details = Vec::new();
		for booking in self.state.bookings.values().filter(|b| b.user_id == user_id) {
			let room = self
				.state
				.rooms
				.get(&booking.room_id)
				.ok_or_else(|| AppError::Internal(format!("booking {} has no room", booking.id)))?;
			let room_detail = RoomDetail::new(room.clone(), self.room_type_of(room)?);
			details.push(BookingDetail::new(booking.clone(), room_detail, user));
		}
		details.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
		Ok(details)
	}

	fn insert_topup(&mut self, topup: &NewTopup) -> StoreResult<Topup> {
		let now = Utc::now();
		let created = Topup {
			id: self.state.next_id(),
			user_id: topup.user_id,
			transaction_id: topup.transaction_id.clone(),
			order_id: topup.order_id.clone(),
			amount: topup.amount.clone(),
			status: topup.status.clone(),
			created_at: now,
			updated_at: now,
		};
		self.state.topups.insert(created.id, created.clone());
		Ok(created)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn room_type(tx: &mut dyn StoreTx, name: &str) -> RoomType {
		tx.insert_room_type(&NewRoomType { name: name.to_string(), price: BigDecimal::from(100) })
			.unwrap()
	}

	#[test]
	fn failed_unit_of_work_leaves_no_trace() {
		let store = MemoryStore::new();
		let ctx = RequestContext::background();

		let result: StoreResult<()> = store.run_in_transaction(&ctx, |tx| {
			room_type(tx, "Deluxe");
			Err(AppError::InsufficientBalance)
		});
		assert!(matches!(result, Err(AppError::InsufficientBalance)));

		let types = store.run_in_transaction(&ctx, |tx| tx.list_room_types()).unwrap();
		assert!(types.is_empty());
	}

	#[test]
	fn cancelled_context_rolls_back_before_commit() {
		let store = MemoryStore::new();
		let ctx = RequestContext::background();

		let result = store.run_in_transaction(&ctx, |tx| {
			let created = room_type(tx, "Suite");
			ctx.cancel();
			Ok(created)
		});
		assert!(matches!(result, Err(AppError::Cancelled)));

		let fresh = RequestContext::background();
		let types = store.run_in_transaction(&fresh, |tx| tx.list_room_types()).unwrap();
		assert!(types.is_empty());
	}

	#[test]
	fn unique_keys_are_enforced() {
		let store = MemoryStore::new();
		let ctx = RequestContext::background();

		let err = store
			.run_in_transaction(&ctx, |tx| {
				let t = room_type(tx, "Standard");
				tx.insert_room(&NewRoom { room_type_id: t.id, room_number: "101".to_string() })?;
				tx.insert_room(&NewRoom { room_type_id: t.id, room_number: "101".to_string() })
			})
			.unwrap_err();
		assert!(matches!(err, AppError::RoomNumberTaken));

		let err = store
			.run_in_transaction(&ctx, |tx| {
				tx.insert_user(&NewUser { name: "A", email: "a@hotel.test", password: "x" })?;
				tx.insert_user(&NewUser { name: "B", email: "a@hotel.test", password: "y" })
			})
			.unwrap_err();
		assert!(matches!(err, AppError::EmailTaken));
	}
}
