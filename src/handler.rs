use crate::{
	config::Config,
	context::{AuthenticatedUser, RequestContext},
	error::AppError,
	midware::jwt::JWT,
	models::{
		ApiResponse, BookRoomRequest, LoginRequest, LoginResp, RegisterRequest, RoomRequest,
		RoomTypeRequest, Topup, TopupNotification, UserSummary,
	},
	repo::EntityStore,
	services::{
		booking::{ensure_not_past, parse_booking_date},
		BookingService, CatalogService, TopupOutcome, TopupService, UserService,
	},
	signature::SignatureVerifier,
};
use actix_web::{web, HttpResponse};
use chrono::Local;
use std::{sync::Arc, time::Duration};
use validator::Validate;

pub struct AppState<S> {
	pub users: UserService<S>,
	pub catalog: CatalogService<S>,
	pub bookings: BookingService<S>,
	pub topups: TopupService<S>,
	pub verifier: Arc<dyn SignatureVerifier>,
	pub jwt: JWT,
	pub request_timeout: Duration,
}

impl<S: EntityStore> AppState<S> {
	pub fn new(store: S, config: &Config, verifier: Arc<dyn SignatureVerifier>) -> Self {
		Self {
			users: UserService::new(store.clone(), config.bcrypt_cost),
			catalog: CatalogService::new(store.clone()),
			bookings: BookingService::new(store.clone()),
			topups: TopupService::new(store),
			verifier,
			jwt: JWT::new(&config.jwt_secret),
			request_timeout: config.request_timeout,
		}
	}

	fn context(&self, user: Option<AuthenticatedUser>) -> RequestContext {
		let ctx = match user {
			Some(user) => RequestContext::for_user(user),
			None => RequestContext::background(),
		};
		ctx.with_timeout(self.request_timeout)
	}
}

/// Runs a store-bound operation on the blocking pool. Dropping the returned future
/// (client went away) cancels `ctx`, which rolls back the unit of work before commit.
async fn run_blocking<T, F>(ctx: RequestContext, f: F) -> Result<T, AppError>
where
	F: FnOnce(&RequestContext) -> Result<T, AppError> + Send + 'static,
	T: Send + 'static,
{
	log::debug!("Dispatching store work for user {:?}", ctx.user_id);
	let _cancel = ctx.cancel_on_drop();
	web::block(move || f(&ctx)).await?
}

fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
	req.validate().map_err(|e| {
		log::warn!("Validation error: {:?}", e);
		AppError::Validation(e.to_string())
	})
}

pub struct UserHandler {}

impl UserHandler {
	pub async fn register_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		req: web::Json<RegisterRequest>,
	) -> Result<HttpResponse, AppError> {
		log::info!("Attempting to register user with email: {}", req.email);
		validate(&req.0)?;

		let ctx = state.context(None);
		let req = req.into_inner();
		let st = state.clone();
		let user = run_blocking(ctx, move |ctx| {
			st.users.register(ctx, &req.name, &req.email, &req.password)
		})
		.await?;

		log::info!("User registered successfully with ID: {}", user.id);
		Ok(HttpResponse::Created().json(ApiResponse::success(UserSummary::from(&user))))
	}

	pub async fn login_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		req: web::Json<LoginRequest>,
	) -> Result<HttpResponse, AppError> {
		validate(&req.0)?;

		let ctx = state.context(None);
		let req = req.into_inner();
		let st = state.clone();
		let email = req.email.clone();
		let user = run_blocking(ctx, move |ctx| st.users.login(ctx, &req.email, &req.password))
			.await
			.map_err(|e| {
				log::warn!("Login failed for email {}: {}", email, e);
				e
			})?;

		let token = state.jwt.create_jwt(user.id).map_err(|e| {
			log::error!("JWT creation error: {:?}", e);
			AppError::Internal("failed to create authentication token".to_string())
		})?;

		log::info!("Login successful for user ID: {}", user.id);
		Ok(HttpResponse::Ok().json(ApiResponse::success(LoginResp { uid: user.id.to_string(), token })))
	}

	pub async fn me_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
	) -> Result<HttpResponse, AppError> {
		let ctx = state.context(Some(user));
		let st = state.clone();
		let found = run_blocking(ctx, move |ctx| st.users.get_by_id(ctx, user.user_id)).await?;
		Ok(HttpResponse::Ok().json(ApiResponse::success(UserSummary::from(&found))))
	}
}

pub struct RoomTypeHandler {}

impl RoomTypeHandler {
	pub async fn create_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		req: web::Json<RoomTypeRequest>,
	) -> Result<HttpResponse, AppError> {
		validate(&req.0)?;
		let ctx = state.context(Some(user));
		let req = req.into_inner();
		let st = state.clone();
		let room_type =
			run_blocking(ctx, move |ctx| st.catalog.create_room_type(ctx, &req.name, req.price))
				.await?;

		log::info!("Room type {} created with ID: {}", room_type.name, room_type.id);
		Ok(HttpResponse::Created().json(ApiResponse::success(room_type)))
	}

	pub async fn list_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
	) -> Result<HttpResponse, AppError> {
		let ctx = state.context(Some(user));
		let st = state.clone();
		let room_types = run_blocking(ctx, move |ctx| st.catalog.list_room_types(ctx)).await?;
		Ok(HttpResponse::Ok().json(ApiResponse::success(room_types)))
	}

	pub async fn get_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		path: web::Path<i32>,
	) -> Result<HttpResponse, AppError> {
		let id = path.into_inner();
		let ctx = state.context(Some(user));
		let st = state.clone();
		let room_type = run_blocking(ctx, move |ctx| st.catalog.get_room_type(ctx, id)).await?;
		Ok(HttpResponse::Ok().json(ApiResponse::success(room_type)))
	}

	pub async fn update_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		path: web::Path<i32>,
		req: web::Json<RoomTypeRequest>,
	) -> Result<HttpResponse, AppError> {
		validate(&req.0)?;
		let id = path.into_inner();
		let ctx = state.context(Some(user));
		let req = req.into_inner();
		let st = state.clone();
		let room_type = run_blocking(ctx, move |ctx| {
			st.catalog.update_room_type(ctx, id, &req.name, req.price)
		})
		.await?;

		log::info!("Room type {} updated", id);
		Ok(HttpResponse::Ok().json(ApiResponse::success(room_type)))
	}

	pub async fn delete_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		path: web::Path<i32>,
	) -> Result<HttpResponse, AppError> {
		let id = path.into_inner();
		let ctx = state.context(Some(user));
		let st = state.clone();
		run_blocking(ctx, move |ctx| st.catalog.delete_room_type(ctx, id)).await?;

		log::info!("Room type {} deleted", id);
		Ok(HttpResponse::Ok().json(ApiResponse::success("Room type deleted successfully")))
	}
}

pub struct RoomHandler {}

impl RoomHandler {
	pub async fn create_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		req: web::Json<RoomRequest>,
	) -> Result<HttpResponse, AppError> {
		validate(&req.0)?;
		let ctx = state.context(Some(user));
		let req = req.into_inner();
		let st = state.clone();
		let room = run_blocking(ctx, move |ctx| {
			st.catalog.create_room(ctx, req.room_type_id, &req.room_number)
		})
		.await?;

		log::info!("Room {} created with ID: {}", room.room_number, room.id);
		Ok(HttpResponse::Created().json(ApiResponse::success(room)))
	}

	pub async fn list_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
	) -> Result<HttpResponse, AppError> {
		let ctx = state.context(Some(user));
		let st = state.clone();
		let rooms = run_blocking(ctx, move |ctx| st.catalog.list_rooms(ctx)).await?;
		Ok(HttpResponse::Ok().json(ApiResponse::success(rooms)))
	}

	pub async fn get_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		path: web::Path<i32>,
	) -> Result<HttpResponse, AppError> {
		let id = path.into_inner();
		let ctx = state.context(Some(user));
		let st = state.clone();
		let room = run_blocking(ctx, move |ctx| st.catalog.get_room(ctx, id)).await?;
		Ok(HttpResponse::Ok().json(ApiResponse::success(room)))
	}

	pub async fn update_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		path: web::Path<i32>,
		req: web::Json<RoomRequest>,
	) -> Result<HttpResponse, AppError> {
		validate(&req.0)?;
		let id = path.into_inner();
		let ctx = state.context(Some(user));
		let req = req.into_inner();
		let st = state.clone();
		let room = run_blocking(ctx, move |ctx| {
			st.catalog.update_room(ctx, id, req.room_type_id, &req.room_number)
		})
		.await?;

		log::info!("Room {} updated", id);
		Ok(HttpResponse::Ok().json(ApiResponse::success(room)))
	}

	pub async fn delete_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		path: web::Path<i32>,
	) -> Result<HttpResponse, AppError> {
		let id = path.into_inner();
		let ctx = state.context(Some(user));
		let st = state.clone();
		run_blocking(ctx, move |ctx| st.catalog.delete_room(ctx, id)).await?;

		log::info!("Room {} deleted", id);
		Ok(HttpResponse::Ok().json(ApiResponse::success("Room deleted successfully")))
	}
}

pub struct BookingHandler {}

impl BookingHandler {
	pub async fn create_booking_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
		req: web::Json<BookRoomRequest>,
	) -> Result<HttpResponse, AppError> {
		log::info!("Request to book room {} for user {}", req.room_id, user.user_id);
		validate(&req.0)?;

		let date = parse_booking_date(&req.date)?;
		ensure_not_past(date, Local::now().date_naive()).map_err(|e| {
			log::warn!("Booking date {} is in the past", date);
			e
		})?;

		let room_id = req.room_id;
		let ctx = state.context(Some(user));
		let st = state.clone();
		let booking = run_blocking(ctx, move |ctx| {
			st.bookings.create_booking(ctx, room_id, user.user_id, date)
		})
		.await
		.map_err(|e| {
			log::error!("Failed to create room booking: {}", e);
			e
		})?;

		log::info!("Room booking created successfully with ID: {}", booking.id);
		Ok(HttpResponse::Created().json(ApiResponse::success(booking)))
	}

	pub async fn my_bookings_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		user: AuthenticatedUser,
	) -> Result<HttpResponse, AppError> {
		let ctx = state.context(Some(user));
		let st = state.clone();
		let bookings =
			run_blocking(ctx, move |ctx| st.bookings.list_for_user(ctx, user.user_id)).await?;

		log::info!("Retrieved {} bookings for user ID: {}", bookings.len(), user.user_id);
		Ok(HttpResponse::Ok().json(ApiResponse::success(bookings)))
	}
}

pub struct TopupHandler {}

impl TopupHandler {
	pub async fn webhook_handler<S: EntityStore>(
		state: web::Data<AppState<S>>,
		req: web::Json<TopupNotification>,
	) -> Result<HttpResponse, AppError> {
		let notification = req.into_inner();
		log::info!(
			"Topup notification for order {} with status {}",
			notification.order_id,
			notification.transaction_status
		);

		if !state.verifier.verify(
			&notification.order_id,
			&notification.status_code,
			&notification.gross_amount,
			&notification.signature_key,
		) {
			log::warn!("Invalid signature for order {}", notification.order_id);
			return Err(AppError::InvalidSignature);
		}

		let ctx = state.context(None);
		let st = state.clone();
		let outcome =
			run_blocking(ctx, move |ctx| st.topups.process_notification(ctx, &notification))
				.await?;

		match outcome {
			TopupOutcome::Credited(topup) => {
				log::info!("Topup {} processed successfully", topup.id);
				Ok(HttpResponse::Ok().json(ApiResponse::success(topup)))
			},
			TopupOutcome::Ignored => Ok(HttpResponse::Ok().json(ApiResponse::<Topup>::ignored())),
		}
	}
}
