pub const AUTHORIZATION: &str = "Authorization";
pub const MESSAGE_INVALID_TOKEN: &str = "Invalid token, please login again";

// seconds
pub const ONE_WEEK: usize = 60 * 60 * 24 * 7;

pub const IGNORE_ROUTES: [&str; 3] = ["/api/users/register", "/api/users/login", "/api/users/topup"];

pub const SETTLEMENT_STATUS: &str = "settlement";
pub const BOOKING_DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_POOL_SIZE: u32 = 10;

// money columns are NUMERIC(19,2)
pub const MONEY_SCALE: i64 = 2;
pub const MONEY_LIMIT: i64 = 100_000_000_000_000_000;
