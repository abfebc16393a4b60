pub const APP_NAME: &str = "Putry";

// Limits
pub const MAX_POST_LENGTH: usize = 2000;
pub const MAX_REPLY_LENGTH: usize = 2000;
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_CHANNEL_LABEL_LENGTH: usize = 64;
pub const MAX_USERNAME_LENGTH: usize = 32;
pub const MIN_USERNAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 500;

// Listing
pub const FEED_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

// Search
pub const USER_SEARCH_LIMIT: i64 = 20;
pub const POST_SEARCH_LIMIT: i64 = 50;
pub const CHANNEL_SEARCH_LIMIT: i64 = 20;

// Trending
pub const TRENDING_LIMIT: i64 = 10;
pub const TRENDING_POST_HOURS: i64 = 24;
pub const TRENDING_CHANNEL_DAYS: i64 = 7;
pub const MAX_TRENDING_HOURS: i64 = 24 * 365;
pub const MAX_TRENDING_DAYS: i64 = 365;
