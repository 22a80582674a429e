use crate::{
	handler::{TopupHandler, UserHandler},
	repo::EntityStore,
};
use actix_web::web;

pub fn init<S: EntityStore>(cfg: &mut web::ServiceConfig) {
	cfg
		// user mgmt routes
		.route("/api/users/register", web::post().to(UserHandler::register_handler::<S>))
		.route("/api/users/login", web::post().to(UserHandler::login_handler::<S>))
		.route("/api/users/me", web::get().to(UserHandler::me_handler::<S>))
		// payment provider callback, signature checked in the handler
		.route("/api/users/topup", web::post().to(TopupHandler::webhook_handler::<S>));
}
