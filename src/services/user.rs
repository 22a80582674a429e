use crate::{
	context::RequestContext, error::AppError, models::NewUser, models::User, repo::EntityStore,
};
use bcrypt::{hash, verify};

#[derive(Clone)]
pub struct UserService<S> {
	store: S,
	bcrypt_cost: u32,
}

impl<S: EntityStore> UserService<S> {
	pub fn new(store: S, bcrypt_cost: u32) -> Self {
		Self { store, bcrypt_cost }
	}

	pub fn register(
		&self,
		ctx: &RequestContext,
		name: &str,
		email: &str,
		password: &str,
	) -> Result<User, AppError> {
		let hashed_password = hash(password.as_bytes(), self.bcrypt_cost).map_err(|e| {
			log::error!("Password hashing failed for email {}: {}", email, e);
			AppError::Internal("failed to hash password".to_string())
		})?;

		self.store.run_in_transaction(ctx, |tx| {
			if tx.get_user_by_email(email)?.is_some() {
				return Err(AppError::EmailTaken);
			}
			tx.insert_user(&NewUser { name, email, password: &hashed_password })
		})
	}

	/// Unknown email and wrong password are indistinguishable to the caller.
	pub fn login(&self, ctx: &RequestContext, email: &str, password: &str) -> Result<User, AppError> {
		let user = self
			.store
			.run_in_transaction(ctx, |tx| tx.get_user_by_email(email))?
			.ok_or(AppError::InvalidCredentials)?;

		match verify(password.as_bytes(), &user.password) {
			Ok(true) => Ok(user),
			Ok(false) => Err(AppError::InvalidCredentials),
			Err(e) => {
				log::error!("Password verification failed for user {}: {}", user.id, e);
				Err(AppError::InvalidCredentials)
			},
		}
	}

	pub fn get_by_id(&self, ctx: &RequestContext, id: i32) -> Result<User, AppError> {
		self.store.run_in_transaction(ctx, |tx| tx.get_user(id)?.ok_or(AppError::UserNotFound))
	}
}
