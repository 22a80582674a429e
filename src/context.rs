use crate::error::AppError;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::{Duration, Instant},
};

/// Identity proven by the bearer token, placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
	pub user_id: i32,
}

impl FromRequest for AuthenticatedUser {
	type Error = AppError;
	type Future = Ready<Result<Self, Self::Error>>;

	fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
		ready(req.extensions().get::<AuthenticatedUser>().copied().ok_or(AppError::InvalidToken))
	}
}

/// Per-request scope handed down to the engines and the store.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	pub user_id: Option<i32>,
	deadline: Option<Instant>,
	cancelled: Arc<AtomicBool>,
}

impl RequestContext {
	pub fn background() -> Self {
		Self::default()
	}

	pub fn for_user(user: AuthenticatedUser) -> Self {
		Self { user_id: Some(user.user_id), ..Self::default() }
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.deadline = Some(Instant::now() + timeout);
		self
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	/// Guard that cancels this context when the owning request future is dropped.
	pub fn cancel_on_drop(&self) -> CancelOnDrop {
		CancelOnDrop { cancelled: self.cancelled.clone() }
	}

	pub fn remaining(&self) -> Option<Duration> {
		self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
	}

	pub fn check(&self) -> Result<(), AppError> {
		if self.cancelled.load(Ordering::SeqCst) {
			return Err(AppError::Cancelled);
		}
		match self.deadline {
			Some(deadline) if Instant::now() >= deadline => Err(AppError::DeadlineExceeded),
			_ => Ok(()),
		}
	}
}

pub struct CancelOnDrop {
	cancelled: Arc<AtomicBool>,
}

impl Drop for CancelOnDrop {
	fn drop(&mut self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}
}
