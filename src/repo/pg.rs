use super::{EntityStore, StoreResult, StoreTx};
use crate::{
	context::RequestContext,
	db::DbPool,
	error::AppError,
	models::{
		Booking, BookingDetail, NewBooking, NewRoom, NewRoomType, NewTopup, NewUser, Room,
		RoomDetail, RoomType, Topup, User,
	},
	schema::{book_rooms, room_types, rooms, topups, users},
};
use chrono::{NaiveDate, Utc};
use diesel::{
	prelude::*,
	result::{DatabaseErrorKind, Error as DieselError},
};

/// Postgres-backed store. Read committed isolation, with the user row locked
/// `FOR NO KEY UPDATE` on read and a unique index on `(room_id, date)` settling concurrent
/// bookings. The user lock must stay compatible with the `FOR KEY SHARE` lock that topup and
/// booking inserts take on their parent user row.
#[derive(Clone)]
pub struct PgStore {
	pool: DbPool,
}

impl PgStore {
	pub fn new(pool: DbPool) -> Self {
		Self { pool }
	}
}

impl EntityStore for PgStore {
	fn run_in_transaction<T, F>(&self, ctx: &RequestContext, f: F) -> StoreResult<T>
	where
		F: FnOnce(&mut dyn StoreTx) -> StoreResult<T>,
	{
		ctx.check()?;
		let mut pooled = self.pool.get()?;
		let conn: &mut PgConnection = &mut pooled;
		conn.transaction::<T, AppError, _>(|conn| {
			if let Some(remaining) = ctx.remaining() {
				let millis = remaining.as_millis().max(1);
				diesel::sql_query(format!("SET LOCAL statement_timeout = {}", millis))
					.execute(conn)?;
			}
			let mut tx = PgTx { conn };
			let value = f(&mut tx)?;
			ctx.check()?;
			Ok(value)
		})
		.map_err(|err| match err {
			// statement_timeout fired
			AppError::Database(_) if matches!(ctx.check(), Err(AppError::DeadlineExceeded)) =>
				AppError::DeadlineExceeded,
			other => other,
		})
	}
}

struct PgTx<'a> {
	conn: &'a mut PgConnection,
}

fn on_unique_violation(mapped: AppError) -> impl FnOnce(DieselError) -> AppError {
	move |err| match err {
		DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => mapped,
		other => AppError::Database(other),
	}
}

fn on_foreign_key_violation(mapped: AppError) -> impl FnOnce(DieselError) -> AppError {
	move |err| match err {
		DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => mapped,
		other => AppError::Database(other),
	}
}

/// Inserting or updating a room can trip either the room number index or the room type FK.
fn on_room_violation(err: DieselError) -> AppError {
	match err {
		DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) =>
			AppError::RoomTypeNotFound,
		DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
			AppError::RoomNumberTaken,
		other => AppError::Database(other),
	}
}

impl StoreTx for PgTx<'_> {
	fn insert_user(&mut self, user: &NewUser<'_>) -> StoreResult<User> {
		diesel::insert_into(users::table)
			.values(user)
			.returning(User::as_returning())
			.get_result(self.conn)
			.map_err(on_unique_violation(AppError::EmailTaken))
	}

	fn get_user(&mut self, id: i32) -> StoreResult<Option<User>> {
		Ok(users::table
			.filter(users::id.eq(id))
			.select(User::as_select())
			.for_no_key_update()
			.get_result(self.conn)
			.optional()?)
	}

	fn get_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
		Ok(users::table
			.filter(users::email.eq(email))
			.select(User::as_select())
			.get_result(self.conn)
			.optional()?)
	}

	fn update_user(&mut self, user: &User) -> StoreResult<User> {
		diesel::update(users::table.filter(users::id.eq(user.id)))
			.set((
				users::name.eq(&user.name),
				users::email.eq(&user.email),
				users::balance.eq(&user.balance),
				users::updated_at.eq(Utc::now()),
			))
			.returning(User::as_returning())
			.get_result(self.conn)
			.map_err(on_unique_violation(AppError::EmailTaken))
	}

	fn insert_room_type(&mut self, room_type: &NewRoomType) -> StoreResult<RoomType> {
		diesel::insert_into(room_types::table)
			.values(room_type)
			.returning(RoomType::as_returning())
			.get_result(self.conn)
			.map_err(on_unique_violation(AppError::RoomTypeNameTaken))
	}

	fn list_room_types(&mut self) -> StoreResult<Vec<RoomType>> {
		Ok(room_types::table
			.order(room_types::id.asc())
			.select(RoomType::as_select())
			.load(self.conn)?)
	}

	fn get_room_type(&mut self, id: i32) -> StoreResult<Option<RoomType>> {
		Ok(room_types::table
			.filter(room_types::id.eq(id))
			.select(RoomType::as_select())
			.get_result(self.conn)
			.optional()?)
	}

	fn get_room_type_by_name(&mut self, name: &str) -> StoreResult<Option<RoomType>> {
		Ok(room_types::table
			.filter(room_types::name.eq(name))
			.select(RoomType::as_select())
			.get_result(self.conn)
			.optional()?)
	}

	fn update_room_type(&mut self, room_type: &RoomType) -> StoreResult<RoomType> {
		diesel::update(room_types::table.filter(room_types::id.eq(room_type.id)))
			.set((room_types::name.eq(&room_type.name), room_types::price.eq(&room_type.price)))
			.returning(RoomType::as_returning())
			.get_result(self.conn)
			.map_err(on_unique_violation(AppError::RoomTypeNameTaken))
	}

	fn delete_room_type(&mut self, id: i32) -> StoreResult<()> {
		diesel::delete(room_types::table.filter(room_types::id.eq(id)))
			.execute(self.conn)
			.map_err(on_foreign_key_violation(AppError::RoomTypeInUse))?;
		Ok(())
	}

	fn insert_room(&mut self, room: &NewRoom) -> StoreResult<Room> {
		diesel::insert_into(rooms::table)
			.values(room)
			.returning(Room::as_returning())
			.get_result(self.conn)
			.map_err(on_room_violation)
	}

	fn list_rooms(&mut self) -> StoreResult<Vec<(Room, RoomType)>> {
		Ok(rooms::table
			.inner_join(room_types::table)
			.order(rooms::id.asc())
			.select((Room::as_select(), RoomType::as_select()))
			.load(self.conn)?)
	}

	fn get_room(&mut self, id: i32) -> StoreResult<Option<(Room, RoomType)>> {
		Ok(rooms::table
			.inner_join(room_types::table)
			.filter(rooms::id.eq(id))
			.select((Room::as_select(), RoomType::as_select()))
			.get_result(self.conn)
			.optional()?)
	}

	fn get_room_by_number(&mut self, room_number: &str) -> StoreResult<Option<Room>> {
		Ok(rooms::table
			.filter(rooms::room_number.eq(room_number))
			.select(Room::as_select())
			.get_result(self.conn)
			.optional()?)
	}

	fn update_room(&mut self, room: &Room) -> StoreResult<Room> {
		diesel::update(rooms::table.filter(rooms::id.eq(room.id)))
			.set((rooms::room_type_id.eq(room.room_type_id), rooms::room_number.eq(&room.room_number)))
			.returning(Room::as_returning())
			.get_result(self.conn)
			.map_err(on_room_violation)
	}

	fn delete_room(&mut self, id: i32) -> StoreResult<()> {
		diesel::delete(rooms::table.filter(rooms::id.eq(id)))
			.execute(self.conn)
			.map_err(on_foreign_key_violation(AppError::RoomHasBookings))?;
		Ok(())
	}

	fn count_rooms_with_type(&mut self, room_type_id: i32) -> StoreResult<i64> {
		Ok(rooms::table
			.filter(rooms::room_type_id.eq(room_type_id))
			.count()
			.get_result(self.conn)?)
	}

	fn room_has_bookings(&mut self, room_id: i32) -> StoreResult<bool> {
		Ok(diesel::select(diesel::dsl::exists(
			book_rooms::table.filter(book_rooms::room_id.eq(room_id)),
		))
		.get_result(self.conn)?)
	}

	fn find_booking(&mut self, room_id: i32, date: NaiveDate) -> StoreResult<Option<Booking>> {
		Ok(book_rooms::table
			.filter(book_rooms::room_id.eq(room_id))
			.filter(book_rooms::date.eq(date))
			.select(Booking::as_select())
			.first(self.conn)
			.optional()?)
	}

	fn insert_booking(&mut self, booking: &NewBooking) -> StoreResult<Booking> {
		diesel::insert_into(book_rooms::table)
			.values(booking)
			.returning(Booking::as_returning())
			.get_result(self.conn)
			.map_err(on_unique_violation(AppError::RoomAlreadyBooked))
	}

	fn list_bookings_for_user(&mut self, user_id: i32) -> StoreResult<Vec<BookingDetail>> {
		let rows = book_rooms::table
			.inner_join(rooms::table.inner_join(room_types::table))
			.inner_join(users::table)
			.filter(book_rooms::user_id.eq(user_id))
			.order((book_rooms::date.asc(), book_rooms::id.asc()))
			.select((
				Booking::as_select(),
				Room::as_select(),
				RoomType::as_select(),
				User::as_select(),
			))
			.load::<(Booking, Room, RoomType, User)>(self.conn)?;

		Ok(rows
			.into_iter()
			.map(|(booking, room, room_type, user)| {
				BookingDetail::new(booking, RoomDetail::new(room, room_type), &user)
			})
			.collect())
	}

	fn insert_topup(&mut self, topup: &NewTopup) -> StoreResult<Topup> {
		diesel::insert_into(topups::table)
			.values(topup)
			.returning(Topup::as_returning())
			.get_result(self.conn)
			.map_err(on_foreign_key_violation(AppError::UserNotFound))
	}
}
