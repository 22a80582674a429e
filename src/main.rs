mod booking_routes;
mod catalog_routes;
mod config;
mod constants;
mod context;
mod db;
mod error;
mod handler;
mod midware;
mod models;
mod repo;
mod schema;
mod services;
mod signature;
#[cfg(test)]
mod tests;
mod user_routes;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::{Config, StoreBackend};
use dotenv::dotenv;
use env_logger::Env;
use handler::AppState;
use midware::jwt::Authentication;
use repo::{EntityStore, MemoryStore, PgStore};
use signature::{Sha512Verifier, SignatureVerifier};
use std::{io, sync::Arc};

#[actix_web::main]
async fn main() -> io::Result<()> {
	dotenv().ok();
	env_logger::init_from_env(Env::default().default_filter_or("info"));

	let config = Config::from_env().map_err(|e| {
		log::error!("Invalid configuration: {}", e);
		io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
	})?;

	match config.store_backend {
		StoreBackend::Postgres => {
			let pool = db::get_db_pool(&config).map_err(|e| {
				log::error!("Unable to create the db pool: {}", e);
				io::Error::new(io::ErrorKind::Other, e.to_string())
			})?;
			if let Err(e) = db::init(&pool) {
				log::error!("Unable to initialize the db: {}", e);
				return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
			}
			serve(PgStore::new(pool), config).await
		},
		StoreBackend::Memory => {
			log::warn!("Running on the in-memory store, data is lost on shutdown");
			serve(MemoryStore::new(), config).await
		},
	}
}

async fn serve<S: EntityStore>(store: S, config: Config) -> io::Result<()> {
	let verifier: Arc<dyn SignatureVerifier> =
		Arc::new(Sha512Verifier::new(&config.payment_server_key));
	let state = web::Data::new(AppState::new(store, &config, verifier));
	let jwt_secret = config.jwt_secret.clone();
	log::info!("Listening on: {}..", config.socket_url);

	HttpServer::new(move || {
		App::new()
			.app_data(state.clone())
			.wrap(Authentication::new(&jwt_secret))
			.wrap(
				Cors::default()
					.allow_any_origin()
					.allow_any_method()
					.allow_any_header()
					.supports_credentials()
					.max_age(3600),
			)
			.wrap(actix_web::middleware::Logger::default())
			.configure(user_routes::init::<S>)
			.configure(catalog_routes::init::<S>)
			.configure(booking_routes::init::<S>)
	})
	.bind(&config.socket_url)?
	.run()
	.await
}
