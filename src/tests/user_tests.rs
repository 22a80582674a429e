use actix_web::{http::StatusCode, test};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};

use crate::{
	constants::MESSAGE_INVALID_TOKEN,
	models::{ApiResponse, LoginResp, UserSummary},
	repo::MemoryStore,
	signature::Sha512Verifier,
	tests::{
		fixtures::TestFixtures,
		test_utils::{generate_test_token, test_state},
	},
};

#[actix_web::test]
async fn test_register_handler() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);

	let resp = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&TestFixtures::valid_user_registration())
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::CREATED);
	let body: ApiResponse<UserSummary> = test::read_body_json(resp).await;
	let user = body.data.expect("user in response");
	assert_eq!(user.email, "test.user@gmail.com");
	assert_eq!(user.balance, BigDecimal::from(0));
}

#[actix_web::test]
async fn test_duplicate_email() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);

	let _ = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&TestFixtures::valid_user_registration())
		.send_request(&app)
		.await;
	let resp = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&TestFixtures::valid_user_registration())
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_invalid_email_format() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);

	let resp = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&json!({ "name": "Test", "email": "invalid_email", "password": "testpassword123" }))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_weak_password() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);

	let resp = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&json!({ "name": "Test", "email": "test@example.com", "password": "weak" }))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_and_me() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);
	let registration = TestFixtures::valid_user_registration();

	let _ = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&registration)
		.send_request(&app)
		.await;

	let resp = test::TestRequest::post()
		.uri("/api/users/login")
		.set_json(&json!({ "email": registration.email, "password": registration.password }))
		.send_request(&app)
		.await;
	assert!(resp.status().is_success(), "Login failed");
	let body: ApiResponse<LoginResp> = test::read_body_json(resp).await;
	let token = body.data.expect("Token not found in response").token;

	let resp = test::TestRequest::get()
		.uri("/api/users/me")
		.insert_header(("Authorization", format!("Bearer {}", token)))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<UserSummary> = test::read_body_json(resp).await;
	assert_eq!(body.data.unwrap().email, registration.email);
}

#[actix_web::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);
	let registration = TestFixtures::valid_user_registration();

	let _ = test::TestRequest::post()
		.uri("/api/users/register")
		.set_json(&registration)
		.send_request(&app)
		.await;

	let wrong_password = test::TestRequest::post()
		.uri("/api/users/login")
		.set_json(&json!({ "email": registration.email, "password": "not-the-password" }))
		.send_request(&app)
		.await;
	let unknown_email = test::TestRequest::post()
		.uri("/api/users/login")
		.set_json(&json!({ "email": "nobody@example.com", "password": "whatever123" }))
		.send_request(&app)
		.await;

	assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_requires_token() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);

	let resp = test::TestRequest::get().uri("/api/users/me").send_request(&app).await;
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	let body: ApiResponse<Value> = test::read_body_json(resp).await;
	assert_eq!(body.status, "error");
	assert_eq!(body.error.as_deref(), Some(MESSAGE_INVALID_TOKEN));
	assert!(body.data.is_none());

	let resp = test::TestRequest::get()
		.uri("/api/users/me")
		.insert_header(("Authorization", "Bearer not-a-jwt"))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_for_deleted_account_is_not_found() {
	let state = test_state(MemoryStore::new(), Sha512Verifier::new("server-key"));
	let app = test_app!(state);

	let resp = test::TestRequest::get()
		.uri("/api/users/me")
		.insert_header(("Authorization", format!("Bearer {}", generate_test_token(404))))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
