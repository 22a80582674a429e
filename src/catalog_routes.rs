use crate::{
	handler::{RoomHandler, RoomTypeHandler},
	repo::EntityStore,
};
use actix_web::web;

pub fn init<S: EntityStore>(cfg: &mut web::ServiceConfig) {
	cfg
		// room types
		.route("/api/room-types", web::post().to(RoomTypeHandler::create_handler::<S>))
		.route("/api/room-types", web::get().to(RoomTypeHandler::list_handler::<S>))
		.route("/api/room-types/{id}", web::get().to(RoomTypeHandler::get_handler::<S>))
		.route("/api/room-types/{id}", web::put().to(RoomTypeHandler::update_handler::<S>))
		.route("/api/room-types/{id}", web::delete().to(RoomTypeHandler::delete_handler::<S>))
		// rooms
		.route("/api/rooms", web::post().to(RoomHandler::create_handler::<S>))
		.route("/api/rooms", web::get().to(RoomHandler::list_handler::<S>))
		.route("/api/rooms/{id}", web::get().to(RoomHandler::get_handler::<S>))
		.route("/api/rooms/{id}", web::put().to(RoomHandler::update_handler::<S>))
		.route("/api/rooms/{id}", web::delete().to(RoomHandler::delete_handler::<S>));
}
