use crate::{
	context::RequestContext,
	error::AppError,
	repo::MemoryStore,
	services::{TopupOutcome, TopupService},
	tests::{
		fixtures::TestFixtures,
		test_utils::{balance_of, seed_user},
	},
};
use bigdecimal::BigDecimal;
use std::{sync::Arc, thread};

#[test]
fn settlement_credits_the_user_named_in_the_order_id() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 20000);
	let service = TopupService::new(store.clone());
	let order_id = format!("TOPUP-{}-998877", user.id);

	let outcome = service
		.process_notification(
			&RequestContext::background(),
			&TestFixtures::settlement(&order_id, "50000"),
		)
		.unwrap();

	let topup = match outcome {
		TopupOutcome::Credited(topup) => topup,
		TopupOutcome::Ignored => panic!("settlement must be credited"),
	};
	assert_eq!(topup.user_id, user.id);
	assert_eq!(topup.amount, BigDecimal::from(50000));
	assert_eq!(topup.order_id, order_id);
	assert_eq!(topup.status, "settlement");
	assert_eq!(balance_of(&store, user.id), BigDecimal::from(70000));
	assert_eq!(store.topups().len(), 1);
}

#[test]
fn other_statuses_are_ignored_without_side_effects() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 20000);
	let service = TopupService::new(store.clone());
	let order_id = format!("TOPUP-{}-998877", user.id);

	for status in ["pending", "expire", "cancel", "deny", "capture"] {
		let outcome = service
			.process_notification(
				&RequestContext::background(),
				&TestFixtures::with_status(status, &order_id, "50000"),
			)
			.unwrap();
		assert_eq!(outcome, TopupOutcome::Ignored);
	}

	assert!(store.topups().is_empty());
	assert_eq!(balance_of(&store, user.id), BigDecimal::from(20000));
}

#[test]
fn malformed_order_ids_are_rejected() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 20000);
	let service = TopupService::new(store.clone());
	let ctx = RequestContext::background();

	let err = service
		.process_notification(&ctx, &TestFixtures::settlement("BADFORMAT", "50000"))
		.unwrap_err();
	assert!(matches!(err, AppError::InvalidOrderIdFormat));

	let err = service
		.process_notification(&ctx, &TestFixtures::settlement("TOPUP-abc-998877", "50000"))
		.unwrap_err();
	assert!(matches!(err, AppError::InvalidUserIdInOrderId));

	assert!(store.topups().is_empty());
	assert_eq!(balance_of(&store, user.id), BigDecimal::from(20000));
}

#[test]
fn malformed_amount_is_rejected() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 20000);
	let service = TopupService::new(store.clone());
	let order_id = format!("TOPUP-{}-998877", user.id);

	let err = service
		.process_notification(
			&RequestContext::background(),
			&TestFixtures::settlement(&order_id, "50.000,00"),
		)
		.unwrap_err();

	assert!(matches!(err, AppError::InvalidAmountFormat));
	assert!(store.topups().is_empty());
}

#[test]
fn sub_cent_and_oversized_amounts_are_rejected() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 0);
	let service = TopupService::new(store.clone());
	let ctx = RequestContext::background();

	for raw in ["0.004", "1e20"] {
		let notification = TestFixtures::settlement(&format!("TOPUP-{}-1", user.id), raw);
		let err = service.process_notification(&ctx, &notification).unwrap_err();
		assert!(matches!(err, AppError::InvalidAmountFormat), "{}: {:?}", raw, err);
	}
	assert!(store.topups().is_empty());
	assert_eq!(balance_of(&store, user.id), BigDecimal::from(0));

	service
		.process_notification(&ctx, &TestFixtures::settlement(&format!("TOPUP-{}-2", user.id), "12.5"))
		.unwrap();
	assert_eq!(store.topups()[0].amount.as_bigint_and_exponent().1, 2);
}

#[test]
fn unknown_user_rolls_back_the_topup_row() {
	let store = MemoryStore::new();
	let service = TopupService::new(store.clone());

	let err = service
		.process_notification(
			&RequestContext::background(),
			&TestFixtures::settlement("TOPUP-404-998877", "50000"),
		)
		.unwrap_err();

	assert!(matches!(err, AppError::UserNotFound));
	assert!(store.topups().is_empty());
}

#[test]
fn repeated_settlement_is_credited_each_time() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 0);
	let service = TopupService::new(store.clone());
	let notification = TestFixtures::settlement(&format!("TOPUP-{}-1", user.id), "10000.00");
	let ctx = RequestContext::background();

	service.process_notification(&ctx, &notification).unwrap();
	service.process_notification(&ctx, &notification).unwrap();

	assert_eq!(store.topups().len(), 2);
	assert_eq!(balance_of(&store, user.id), BigDecimal::from(20000));
}

#[test]
fn concurrent_topups_do_not_lose_updates() {
	let store = MemoryStore::new();
	let user = seed_user(&store, "payer@hotel.test", 0);
	let service = Arc::new(TopupService::new(store.clone()));

	let handles: Vec<_> = (0..10)
		.map(|i| {
			let service = service.clone();
			let notification =
				TestFixtures::settlement(&format!("TOPUP-{}-{}", user.id, i), "1000");
			thread::spawn(move || {
				service.process_notification(&RequestContext::background(), &notification)
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap().unwrap();
	}

	assert_eq!(balance_of(&store, user.id), BigDecimal::from(10000));
	assert_eq!(store.topups().len(), 10);
}
