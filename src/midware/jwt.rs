use crate::{
	constants::{AUTHORIZATION, IGNORE_ROUTES, MESSAGE_INVALID_TOKEN, ONE_WEEK},
	context::AuthenticatedUser,
	models::ApiResponse,
};
use actix_service::forward_ready;
use actix_web::{
	body::EitherBody,
	dev::{Service, ServiceRequest, ServiceResponse, Transform},
	http::Method,
	Error as AxError, HttpMessage, HttpResponse,
};
use chrono::Utc;
use futures::future::{ok, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub iat: usize,
	pub exp: usize,
	pub sub: String,
}

#[derive(Clone)]
pub struct JWT {
	secret: String,
}

impl JWT {
	pub fn new(s: &str) -> Self {
		Self { secret: s.to_string() }
	}

	pub fn create_jwt(&self, user_id: i32) -> Result<String, Error> {
		let now = Utc::now().timestamp() as usize;
		let claims = Claims { iat: now, exp: now + ONE_WEEK, sub: user_id.to_string() };
		encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_ref()))
	}

	pub fn verify_jwt(&self, token: &str) -> Result<Claims, Error> {
		decode::<Claims>(
			token,
			&DecodingKey::from_secret(self.secret.as_ref()),
			&Validation::default(),
		)
		.map(|data| data.claims)
	}

	/// Resolves a bearer header value to the user it was issued for.
	pub fn authenticate(&self, header_value: &str) -> Option<AuthenticatedUser> {
		let token = header_value
			.strip_prefix("Bearer ")
			.or_else(|| header_value.strip_prefix("bearer "))?
			.trim();
		match self.verify_jwt(token) {
			Ok(claims) => claims.sub.parse::<i32>().ok().map(|user_id| AuthenticatedUser { user_id }),
			Err(e) => {
				warn!("Invalid token: {:?}", e);
				None
			},
		}
	}
}

pub struct Authentication {
	jwt: JWT,
}

impl Authentication {
	pub fn new(secret: &str) -> Self {
		Self { jwt: JWT::new(secret) }
	}
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type InitError = ();
	type Transform = AuthenticationMiddleware<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ok(AuthenticationMiddleware { jwt: self.jwt.clone(), service })
	}
}

pub struct AuthenticationMiddleware<S> {
	jwt: JWT,
	service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

	forward_ready!(service);

	fn call(&self, req: ServiceRequest) -> Self::Future {
		debug!("## Req: {}", req.path());

		let bypass = Method::OPTIONS == *req.method() ||
			IGNORE_ROUTES.iter().any(|route| req.path().starts_with(route));

		if !bypass {
			let user = req
				.headers()
				.get(AUTHORIZATION)
				.and_then(|h| h.to_str().ok())
				.and_then(|h| self.jwt.authenticate(h));

			match user {
				Some(user) => {
					req.extensions_mut().insert(user);
				},
				None => {
					let (request, _pl) = req.into_parts();
					let response = HttpResponse::Unauthorized()
						.json(ApiResponse::<()>::error(MESSAGE_INVALID_TOKEN))
						.map_into_right_body();

					return Box::pin(async { Ok(ServiceResponse::new(request, response)) });
				},
			}
		}

		let res = self.service.call(req);

		Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
	}
}
