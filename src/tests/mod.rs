#[macro_use]
mod test_utils;
mod topup_tests;
mod user_tests;
