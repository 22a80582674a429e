use crate::{config::Config, error::AppError};
use diesel::{
	prelude::*,
	r2d2::{self, ConnectionManager},
};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn get_db_pool(config: &Config) -> Result<DbPool, r2d2::PoolError> {
	let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
	r2d2::Pool::builder().max_size(config.db_pool_size).build(manager)
}

pub fn init(pool: &DbPool) -> Result<(), AppError> {
	let mut conn = pool.get()?;
	diesel::sql_query(
		"CREATE TABLE IF NOT EXISTS users (
		id SERIAL PRIMARY KEY,
		name VARCHAR(255) NOT NULL,
		email VARCHAR(255) NOT NULL UNIQUE,
		password TEXT NOT NULL,
		balance NUMERIC(19,2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	);",
	)
	.execute(&mut conn)?;
	diesel::sql_query(
		"CREATE TABLE IF NOT EXISTS room_types (
		id SERIAL PRIMARY KEY,
		name VARCHAR(100) NOT NULL UNIQUE,
		price NUMERIC(19,2) NOT NULL CHECK (price > 0)
	);",
	)
	.execute(&mut conn)?;
	diesel::sql_query(
		"CREATE TABLE IF NOT EXISTS rooms (
		id SERIAL PRIMARY KEY,
		room_type_id INTEGER NOT NULL REFERENCES room_types(id),
		room_number VARCHAR(50) NOT NULL UNIQUE
	);",
	)
	.execute(&mut conn)?;
	diesel::sql_query(
		"CREATE TABLE IF NOT EXISTS book_rooms (
		id SERIAL PRIMARY KEY,
		room_id INTEGER NOT NULL REFERENCES rooms(id),
		user_id INTEGER NOT NULL REFERENCES users(id),
		date DATE NOT NULL,
		price NUMERIC(19,2) NOT NULL,
		CONSTRAINT book_rooms_room_id_date_key UNIQUE (room_id, date)
	);",
	)
	.execute(&mut conn)?;
	diesel::sql_query(
		"CREATE TABLE IF NOT EXISTS topups (
		id SERIAL PRIMARY KEY,
		user_id INTEGER NOT NULL REFERENCES users(id),
		transaction_id VARCHAR(255) NOT NULL,
		order_id VARCHAR(255) NOT NULL,
		amount NUMERIC(19,2) NOT NULL,
		status VARCHAR(50) NOT NULL,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	);",
	)
	.execute(&mut conn)?;

	log::info!("Database schema is ready");
	Ok(())
}
