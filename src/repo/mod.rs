//! Persistence seam. Every engine talks to storage through a [`StoreTx`] obtained from
//! [`EntityStore::run_in_transaction`], so a whole operation commits or rolls back together.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use crate::{
	context::RequestContext,
	error::AppError,
	models::{
		Booking, BookingDetail, NewBooking, NewRoom, NewRoomType, NewTopup, NewUser, Room,
		RoomType, Topup, User,
	},
};
use chrono::NaiveDate;

pub type StoreResult<T> = Result<T, AppError>;

pub trait EntityStore: Clone + Send + Sync + 'static {
	/// Runs `f` as one unit of work: commits when it returns `Ok`, rolls back on any `Err`,
	/// and rolls back if `ctx` is cancelled or past its deadline before commit.
	fn run_in_transaction<T, F>(&self, ctx: &RequestContext, f: F) -> StoreResult<T>
	where
		F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>;
}

pub trait StoreTx {
	fn insert_user(&mut self, user: &NewUser<'_>) -> StoreResult<User>;
	/// Reads the user row and holds it for update until the transaction ends.
	fn get_user(&mut self, id: i32) -> StoreResult<Option<User>>;
	fn get_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
	fn update_user(&mut self, user: &User) -> StoreResult<User>;

	fn insert_room_type(&mut self, room_type: &NewRoomType) -> StoreResult<RoomType>;
	fn list_room_types(&mut self) -> StoreResult<Vec<RoomType>>;
	fn get_room_type(&mut self, id: i32) -> StoreResult<Option<RoomType>>;
	fn get_room_type_by_name(&mut self, name: &str) -> StoreResult<Option<RoomType>>;
	fn update_room_type(&mut self, room_type: &RoomType) -> StoreResult<RoomType>;
	fn delete_room_type(&mut self, id: i32) -> StoreResult<()>;

	fn insert_room(&mut self, room: &NewRoom) -> StoreResult<Room>;
	fn list_rooms(&mut self) -> StoreResult<Vec<(Room, RoomType)>>;
	fn get_room(&mut self, id: i32) -> StoreResult<Option<(Room, RoomType)>>;
	fn get_room_by_number(&mut self, room_number: &str) -> StoreResult<Option<Room>>;
	fn update_room(&mut self, room: &Room) -> StoreResult<Room>;
	fn delete_room(&mut self, id: i32) -> StoreResult<()>;
	fn count_rooms_with_type(&mut self, room_type_id: i32) -> StoreResult<i64>;
	fn room_has_bookings(&mut self, room_id: i32) -> StoreResult<bool>;

	fn find_booking(&mut self, room_id: i32, date: NaiveDate) -> StoreResult<Option<Booking>>;
	fn insert_booking(&mut self, booking: &NewBooking) -> StoreResult<Booking>;
	fn list_bookings_for_user(&mut self, user_id: i32) -> StoreResult<Vec<BookingDetail>>;

	fn insert_topup(&mut self, topup: &NewTopup) -> StoreResult<Topup>;
}
