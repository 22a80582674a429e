use crate::schema::*;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
	pub id: i32,
	pub name: String,
	pub email: String,
	#[serde(skip_serializing, default)]
	pub password: String,
	pub balance: BigDecimal,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
	pub name: &'a str,
	pub email: &'a str,
	pub password: &'a str,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = room_types)]
#[diesel(check_for_backend(Pg))]
pub struct RoomType {
	pub id: i32,
	pub name: String,
	pub price: BigDecimal,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = room_types)]
pub struct NewRoomType {
	pub name: String,
	pub price: BigDecimal,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(Pg))]
pub struct Room {
	pub id: i32,
	pub room_type_id: i32,
	pub room_number: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = rooms)]
pub struct NewRoom {
	pub room_type_id: i32,
	pub room_number: String,
}

/// A booking row. `price` is what the guest paid, frozen at booking time.
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = book_rooms)]
#[diesel(check_for_backend(Pg))]
pub struct Booking {
	pub id: i32,
	pub room_id: i32,
	pub user_id: i32,
	pub date: NaiveDate,
	pub price: BigDecimal,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = book_rooms)]
pub struct NewBooking {
	pub room_id: i32,
	pub user_id: i32,
	pub date: NaiveDate,
	pub price: BigDecimal,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = topups)]
#[diesel(check_for_backend(Pg))]
pub struct Topup {
	pub id: i32,
	pub user_id: i32,
	pub transaction_id: String,
	pub order_id: String,
	pub amount: BigDecimal,
	pub status: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = topups)]
pub struct NewTopup {
	pub user_id: i32,
	pub transaction_id: String,
	pub order_id: String,
	pub amount: BigDecimal,
	pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
	pub id: i32,
	pub name: String,
	pub email: String,
	pub balance: BigDecimal,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			name: user.name.clone(),
			email: user.email.clone(),
			balance: user.balance.clone(),
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoomDetail {
	pub id: i32,
	pub room_type_id: i32,
	pub room_number: String,
	pub room_type: RoomType,
}

impl RoomDetail {
	pub fn new(room: Room, room_type: RoomType) -> Self {
		Self { id: room.id, room_type_id: room.room_type_id, room_number: room.room_number, room_type }
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookingDetail {
	pub id: i32,
	pub room_id: i32,
	pub user_id: i32,
	pub date: NaiveDate,
	pub price: BigDecimal,
	pub room: RoomDetail,
	pub user: UserSummary,
}

impl BookingDetail {
	pub fn new(booking: Booking, room: RoomDetail, user: &User) -> Self {
		Self {
			id: booking.id,
			room_id: booking.room_id,
			user_id: booking.user_id,
			date: booking.date,
			price: booking.price,
			room,
			user: UserSummary::from(user),
		}
	}
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
	#[validate(length(min = 1, max = 255))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8))]
	pub password: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct LoginRequest {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1))]
	pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResp {
	pub uid: String,
	pub token: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RoomTypeRequest {
	#[validate(length(min = 1, max = 100))]
	pub name: String,
	pub price: BigDecimal,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RoomRequest {
	#[validate(range(min = 1))]
	pub room_type_id: i32,
	#[validate(length(min = 1, max = 50))]
	pub room_number: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct BookRoomRequest {
	#[validate(range(min = 1))]
	pub room_id: i32,
	#[validate(length(min = 1))]
	pub date: String,
}

/// Payment provider notification body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopupNotification {
	pub transaction_status: String,
	pub status_code: String,
	pub transaction_id: String,
	pub order_id: String,
	pub gross_amount: String,
	pub signature_key: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
	pub status: String,
	pub data: Option<T>,
	pub error: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn success(data: T) -> Self {
		Self { status: "success".to_string(), data: Some(data), error: None }
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self { status: "error".to_string(), data: None, error: Some(message.into()) }
	}

	pub fn ignored() -> Self {
		Self { status: "ignored".to_string(), data: None, error: None }
	}
}
