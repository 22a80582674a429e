use crate::{
	config::{Config, StoreBackend},
	context::RequestContext,
	db::{self, DbPool},
	handler::AppState,
	midware::jwt::JWT,
	models::{NewRoom, NewRoomType, NewUser, Room, RoomType, User},
	repo::{EntityStore, MemoryStore, PgStore},
	signature::SignatureVerifier,
};
use actix_web::web;
use bigdecimal::BigDecimal;
use std::{
	env,
	sync::{
		atomic::{AtomicU32, Ordering},
		Arc, OnceLock,
	},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

pub const TEST_SECRET: &str = "test_secret";

/// Builds the full app (auth middleware plus every route) over a `MemoryStore` state.
macro_rules! test_app {
	($state:expr) => {
		actix_web::test::init_service(
			actix_web::App::new()
				.app_data($state.clone())
				.wrap(crate::midware::jwt::Authentication::new(
					crate::tests::test_utils::TEST_SECRET,
				))
				.configure(crate::user_routes::init::<crate::repo::MemoryStore>)
				.configure(crate::catalog_routes::init::<crate::repo::MemoryStore>)
				.configure(crate::booking_routes::init::<crate::repo::MemoryStore>),
		)
		.await
	};
}

pub fn test_config() -> Config {
	Config {
		store_backend: StoreBackend::Memory,
		database_url: String::new(),
		socket_url: "127.0.0.1:0".to_string(),
		jwt_secret: TEST_SECRET.to_string(),
		payment_server_key: "server-key".to_string(),
		request_timeout: Duration::from_secs(30),
		db_pool_size: 1,
		bcrypt_cost: 4,
	}
}

pub fn test_state(
	store: MemoryStore,
	verifier: impl SignatureVerifier + 'static,
) -> web::Data<AppState<MemoryStore>> {
	web::Data::new(AppState::new(store, &test_config(), Arc::new(verifier)))
}

pub fn generate_test_token(user_id: i32) -> String {
	JWT::new(TEST_SECRET).create_jwt(user_id).unwrap()
}

pub fn seed_user<S: EntityStore>(store: &S, email: &str, balance: i64) -> User {
	let ctx = RequestContext::background();
	store
		.run_in_transaction(&ctx, |tx| {
			let mut user =
				tx.insert_user(&NewUser { name: "Guest", email, password: "not-a-real-hash" })?;
			user.balance = BigDecimal::from(balance);
			tx.update_user(&user)
		})
		.unwrap()
}

pub fn seed_room<S: EntityStore>(
	store: &S,
	type_name: &str,
	room_number: &str,
	price: i64,
) -> (RoomType, Room) {
	let ctx = RequestContext::background();
	store
		.run_in_transaction(&ctx, |tx| {
			let room_type = match tx.get_room_type_by_name(type_name)? {
				Some(existing) => existing,
				None => tx.insert_room_type(&NewRoomType {
					name: type_name.to_string(),
					price: BigDecimal::from(price),
				})?,
			};
			let room = tx.insert_room(&NewRoom {
				room_type_id: room_type.id,
				room_number: room_number.to_string(),
			})?;
			Ok((room_type, room))
		})
		.unwrap()
}

pub fn balance_of<S: EntityStore>(store: &S, user_id: i32) -> BigDecimal {
	let ctx = RequestContext::background();
	store
		.run_in_transaction(&ctx, |tx| tx.get_user(user_id))
		.unwrap()
		.expect("user exists")
		.balance
}

/// Store over the database named by `DATABASE_URL`, or `None` when it is unset.
/// The schema is bootstrapped once per test binary.
pub fn pg_store() -> Option<PgStore> {
	static POOL: OnceLock<Option<DbPool>> = OnceLock::new();
	POOL.get_or_init(|| {
		dotenv::dotenv().ok();
		let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())?;
		let config = Config {
			store_backend: StoreBackend::Postgres,
			database_url,
			db_pool_size: 40,
			..test_config()
		};
		let pool = db::get_db_pool(&config).expect("postgres pool");
		db::init(&pool).expect("schema bootstrap");
		Some(pool)
	})
	.clone()
	.map(PgStore::new)
}

/// Distinct per call so tests sharing one database never collide on unique columns.
pub fn unique(tag: &str) -> String {
	static COUNTER: AtomicU32 = AtomicU32::new(0);
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
	format!("{}-{}-{}", tag, nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}
