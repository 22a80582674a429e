use crate::{handler::BookingHandler, repo::EntityStore};
use actix_web::web;

pub fn init<S: EntityStore>(cfg: &mut web::ServiceConfig) {
	cfg.route("/api/book-rooms", web::post().to(BookingHandler::create_booking_handler::<S>))
		.route(
			"/api/book-rooms/my-bookings",
			web::get().to(BookingHandler::my_bookings_handler::<S>),
		);
}
