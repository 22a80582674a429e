use crate::models::ApiResponse;
use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	NotFound,
	Conflict,
	InvalidInput,
	Unauthorized,
	Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
	#[error("Room not found")]
	RoomNotFound,
	#[error("Room type not found")]
	RoomTypeNotFound,
	#[error("User not found")]
	UserNotFound,

	#[error("Room is already booked for this date")]
	RoomAlreadyBooked,
	#[error("Room number already exists")]
	RoomNumberTaken,
	#[error("Room type name already exists")]
	RoomTypeNameTaken,
	#[error("Cannot delete room type that is being used by rooms")]
	RoomTypeInUse,
	#[error("Cannot delete room that has bookings")]
	RoomHasBookings,
	#[error("Email already exists")]
	EmailTaken,

	#[error("Invalid date format, use YYYY-MM-DD")]
	InvalidDate,
	#[error("Booking date must be today or in the future")]
	DateInPast,
	#[error("Invalid order id format")]
	InvalidOrderIdFormat,
	#[error("Invalid user id in order id")]
	InvalidUserIdInOrderId,
	#[error("Invalid amount format")]
	InvalidAmountFormat,
	#[error("Insufficient balance")]
	InsufficientBalance,
	#[error("{0}")]
	Validation(String),

	#[error("Invalid signature key")]
	InvalidSignature,
	#[error("Invalid credentials")]
	InvalidCredentials,
	#[error("Missing or invalid token")]
	InvalidToken,

	#[error("request cancelled")]
	Cancelled,
	#[error("request deadline exceeded")]
	DeadlineExceeded,
	#[error("database error: {0}")]
	Database(#[from] diesel::result::Error),
	#[error("connection pool error: {0}")]
	Pool(#[from] r2d2::Error),
	#[error("blocking task failed: {0}")]
	Blocking(#[from] BlockingError),
	#[error("{0}")]
	Internal(String),
}

impl AppError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			AppError::RoomNotFound | AppError::RoomTypeNotFound | AppError::UserNotFound =>
				ErrorKind::NotFound,
			AppError::RoomAlreadyBooked |
			AppError::RoomNumberTaken |
			AppError::RoomTypeNameTaken |
			AppError::RoomTypeInUse |
			AppError::RoomHasBookings |
			AppError::EmailTaken => ErrorKind::Conflict,
			AppError::InvalidDate |
			AppError::DateInPast |
			AppError::InvalidOrderIdFormat |
			AppError::InvalidUserIdInOrderId |
			AppError::InvalidAmountFormat |
			AppError::InsufficientBalance |
			AppError::Validation(_) => ErrorKind::InvalidInput,
			AppError::InvalidSignature | AppError::InvalidCredentials | AppError::InvalidToken =>
				ErrorKind::Unauthorized,
			AppError::Cancelled |
			AppError::DeadlineExceeded |
			AppError::Database(_) |
			AppError::Pool(_) |
			AppError::Blocking(_) |
			AppError::Internal(_) => ErrorKind::Internal,
		}
	}
}

impl ResponseError for AppError {
	fn status_code(&self) -> StatusCode {
		match self.kind() {
			ErrorKind::NotFound => StatusCode::NOT_FOUND,
			ErrorKind::Conflict => StatusCode::CONFLICT,
			ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
			ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
			ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		let message = match self.kind() {
			ErrorKind::Internal => {
				log::error!("Internal error: {:?}", self);
				"Internal server error".to_string()
			},
			_ => self.to_string(),
		};
		HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(message))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn conflicts_map_to_409() {
		assert_eq!(AppError::RoomAlreadyBooked.status_code(), StatusCode::CONFLICT);
		assert_eq!(AppError::RoomTypeInUse.kind(), ErrorKind::Conflict);
	}

	#[test]
	fn insufficient_balance_is_invalid_input() {
		assert_eq!(AppError::InsufficientBalance.kind(), ErrorKind::InvalidInput);
		assert_eq!(AppError::InsufficientBalance.status_code(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn internal_errors_do_not_leak_details() {
		let resp = AppError::Internal("password column missing".to_string()).error_response();
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
		let body = String::from_utf8_lossy(&body);
		assert!(body.contains("Internal server error"));
		assert!(!body.contains("password"));
	}
}
