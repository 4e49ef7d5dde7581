pub mod cooldown;
pub mod time_utils;

pub use cooldown::with_store_cooldown;
pub use time_utils::{datetime_from_millis, previous_month, year_month_of};
